//! Auth slice: the signed-in user and token.

use crate::models::{AuthSession, User};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Set once the stored session has been looked up at startup
    pub is_initialized: bool,
}

impl AuthState {
    pub fn session(&self) -> Option<AuthSession> {
        match (&self.token, &self.user) {
            (Some(token), Some(user)) => Some(AuthSession {
                token: token.clone(),
                user: user.clone(),
            }),
            _ => None,
        }
    }

    fn apply_session(&mut self, session: AuthSession) {
        self.token = Some(session.token);
        self.user = Some(session.user);
        self.is_authenticated = true;
    }

    // ===== Login / register =====

    pub fn sign_in_pending(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub fn sign_in_fulfilled(&mut self, session: AuthSession) {
        self.apply_session(session);
        self.is_loading = false;
        self.error = None;
    }

    pub fn sign_in_rejected(&mut self, message: String) {
        self.is_loading = false;
        self.error = Some(message);
    }

    // ===== Stored session =====

    pub fn load_stored_pending(&mut self) {
        self.is_loading = true;
    }

    pub fn load_stored_fulfilled(&mut self, session: AuthSession) {
        self.apply_session(session);
        self.is_loading = false;
        self.is_initialized = true;
    }

    /// Nothing stored is the normal first-run case, not an error.
    pub fn load_stored_rejected(&mut self) {
        self.is_loading = false;
        self.is_initialized = true;
    }

    // ===== Profile =====

    pub fn profile_pending(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub fn profile_fulfilled(&mut self, user: User) {
        self.user = Some(user);
        self.is_loading = false;
        self.error = None;
    }

    pub fn profile_rejected(&mut self, message: String) {
        self.is_loading = false;
        self.error = Some(message);
    }

    // ===== Logout =====

    pub fn logout_fulfilled(&mut self) {
        self.user = None;
        self.token = None;
        self.is_authenticated = false;
        self.error = None;
    }

    pub fn logout_rejected(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AuthSession {
        AuthSession {
            token: "tok".to_string(),
            user: User {
                id: 1,
                username: "emilys".to_string(),
                email: String::new(),
                first_name: "Emily".to_string(),
                last_name: "Johnson".to_string(),
                image: None,
                gender: None,
            },
        }
    }

    #[test]
    fn test_sign_in_lifecycle() {
        let mut state = AuthState {
            error: Some("old".to_string()),
            ..Default::default()
        };
        state.sign_in_pending();
        assert!(state.is_loading);
        assert!(state.error.is_none());

        state.sign_in_fulfilled(session());
        assert!(!state.is_loading);
        assert!(state.is_authenticated);
        assert_eq!(state.session(), Some(session()));
    }

    #[test]
    fn test_rejected_sign_in_stays_unauthenticated() {
        let mut state = AuthState::default();
        state.sign_in_pending();
        state.sign_in_rejected("Invalid username or password".to_string());
        assert!(!state.is_loading);
        assert!(!state.is_authenticated);
        assert_eq!(state.error.as_deref(), Some("Invalid username or password"));
        assert!(state.session().is_none());
    }

    #[test]
    fn test_load_stored_rejected_marks_initialized_without_error() {
        let mut state = AuthState::default();
        state.load_stored_pending();
        state.load_stored_rejected();
        assert!(state.is_initialized);
        assert!(!state.is_authenticated);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_logout_clears_token_and_user_together() {
        let mut state = AuthState::default();
        state.sign_in_fulfilled(session());
        state.logout_fulfilled();
        assert_eq!(state.user, None);
        assert_eq!(state.token, None);
        assert!(!state.is_authenticated);
    }

    #[test]
    fn test_logout_rejected_keeps_session() {
        let mut state = AuthState::default();
        state.sign_in_fulfilled(session());
        state.logout_rejected("keychain locked".to_string());
        assert!(state.is_authenticated);
        assert_eq!(state.error.as_deref(), Some("keychain locked"));
        state.clear_error();
        assert!(state.error.is_none());
    }
}
