//! Theme slice.

use crate::models::ThemeMode;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeState {
    pub theme: ThemeMode,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl ThemeState {
    pub fn is_dark(&self) -> bool {
        self.theme.is_dark()
    }

    pub fn load_pending(&mut self) {
        self.is_loading = true;
    }

    pub fn load_fulfilled(&mut self, theme: ThemeMode) {
        self.theme = theme;
        self.is_loading = false;
    }

    pub fn load_rejected(&mut self, message: String) {
        self.is_loading = false;
        self.error = Some(message);
    }

    /// Toggle and explicit set both land here once the new mode is persisted.
    pub fn theme_changed(&mut self, theme: ThemeMode) {
        self.theme = theme;
        self.error = None;
    }

    pub fn change_rejected(&mut self, message: String) {
        self.error = Some(message);
    }
}
