//! Favorites slice.
//!
//! The list is ordered by insertion and unique by movie id. Mutations
//! compute the complete new list up front; the store persists that list
//! and then hands it to `mutation_fulfilled`.

use std::collections::HashSet;

use crate::models::Movie;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesState {
    pub favorites: Vec<Movie>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Drop later entries that repeat an earlier id.
pub fn dedupe_by_id(movies: Vec<Movie>) -> Vec<Movie> {
    let mut seen = HashSet::new();
    movies.into_iter().filter(|m| seen.insert(m.id)).collect()
}

impl FavoritesState {
    pub fn is_favorite(&self, movie_id: i64) -> bool {
        self.favorites.iter().any(|m| m.id == movie_id)
    }

    pub fn count(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    /// The list with `movie` appended, or unchanged if its id is present.
    pub fn with_added(&self, movie: Movie) -> Vec<Movie> {
        let mut updated = self.favorites.clone();
        if !self.is_favorite(movie.id) {
            updated.push(movie);
        }
        updated
    }

    /// The list without `movie_id`. Unchanged if the id is absent.
    pub fn with_removed(&self, movie_id: i64) -> Vec<Movie> {
        self.favorites
            .iter()
            .filter(|m| m.id != movie_id)
            .cloned()
            .collect()
    }

    // ===== Lifecycle =====

    pub fn pending(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub fn load_fulfilled(&mut self, favorites: Vec<Movie>) {
        self.favorites = dedupe_by_id(favorites);
        self.is_loading = false;
    }

    pub fn mutation_fulfilled(&mut self, favorites: Vec<Movie>) {
        self.favorites = favorites;
        self.is_loading = false;
    }

    pub fn rejected(&mut self, message: String) {
        self.is_loading = false;
        self.error = Some(message);
    }

    pub fn cleared(&mut self) {
        self.favorites.clear();
        self.is_loading = false;
    }
}
