//! Movies slice: category listings, search results and the selected movie.
//!
//! Search results live in their own slot, separate from the listings.

use std::collections::HashMap;

use crate::models::{Movie, MovieCategory, MovieDetails, MoviePage};

/// One paginated listing with its own loading/error flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingState {
    pub results: Vec<Movie>,
    pub page: u32,
    pub total_pages: u32,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            page: 1,
            total_pages: 0,
            is_loading: false,
            error: None,
        }
    }
}

impl ListingState {
    pub fn pending(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub fn fulfilled(&mut self, page: MoviePage) {
        self.results = page.results;
        self.page = page.page;
        self.total_pages = page.total_pages;
        self.is_loading = false;
        self.error = None;
    }

    pub fn rejected(&mut self, message: String) {
        self.is_loading = false;
        self.error = Some(message);
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub listing: ListingState,
}

impl SearchState {
    pub fn pending(&mut self) {
        self.listing.pending();
    }

    pub fn fulfilled(&mut self, query: String, page: MoviePage) {
        self.listing.fulfilled(page);
        self.query = query;
    }

    pub fn rejected(&mut self, message: String) {
        self.listing.rejected(message);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviesState {
    pub trending: ListingState,
    pub popular: ListingState,
    /// Listings fetched by category, created on first request
    pub categories: HashMap<MovieCategory, ListingState>,
    pub selected_movie: Option<MovieDetails>,
    pub search_results: SearchState,
    /// Loading/error for the movie details request
    pub is_loading: bool,
    pub error: Option<String>,
}

impl MoviesState {
    pub fn category(&self, category: MovieCategory) -> Option<&ListingState> {
        self.categories.get(&category)
    }

    pub fn category_pending(&mut self, category: MovieCategory) {
        self.categories.entry(category).or_default().pending();
    }

    pub fn category_fulfilled(&mut self, category: MovieCategory, page: MoviePage) {
        self.categories.entry(category).or_default().fulfilled(page);
    }

    pub fn category_rejected(&mut self, category: MovieCategory, message: String) {
        self.categories.entry(category).or_default().rejected(message);
    }

    pub fn details_pending(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub fn details_fulfilled(&mut self, details: MovieDetails) {
        self.selected_movie = Some(details);
        self.is_loading = false;
    }

    pub fn details_rejected(&mut self, message: String) {
        self.is_loading = false;
        self.error = Some(message);
    }

    pub fn clear_search_results(&mut self) {
        self.search_results = SearchState::default();
    }

    pub fn clear_selected_movie(&mut self) {
        self.selected_movie = None;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: &[i64], page: u32, total_pages: u32) -> MoviePage {
        serde_json::from_value(serde_json::json!({
            "page": page,
            "results": ids.iter().map(|id| serde_json::json!({"id": id, "title": "t"})).collect::<Vec<_>>(),
            "total_pages": total_pages,
            "total_results": ids.len()
        }))
        .unwrap()
    }

    #[test]
    fn test_listing_lifecycle() {
        let mut listing = ListingState::default();
        assert_eq!(listing.page, 1);

        listing.pending();
        assert!(listing.is_loading);

        listing.fulfilled(page(&[1, 2], 2, 5));
        assert!(!listing.is_loading);
        assert_eq!(listing.results.len(), 2);
        assert_eq!(listing.page, 2);
        assert!(listing.has_more());

        listing.pending();
        listing.rejected("Network error".to_string());
        assert_eq!(listing.results.len(), 2, "failure keeps previous results");
        assert_eq!(listing.error.as_deref(), Some("Network error"));
    }

    #[test]
    fn test_category_slots_are_created_lazily() {
        let mut state = MoviesState::default();
        assert!(state.category(MovieCategory::Upcoming).is_none());

        state.category_pending(MovieCategory::Upcoming);
        assert!(state.category(MovieCategory::Upcoming).unwrap().is_loading);

        state.category_fulfilled(MovieCategory::Upcoming, page(&[9], 1, 1));
        let upcoming = state.category(MovieCategory::Upcoming).unwrap();
        assert_eq!(upcoming.results[0].id, 9);
        assert!(!upcoming.has_more());

        // Listing slots stay independent of the category map
        assert!(state.trending.results.is_empty());
    }

    #[test]
    fn test_search_slot_is_separate_and_resettable() {
        let mut state = MoviesState::default();
        state.popular.fulfilled(page(&[1], 1, 1));

        state.search_results.pending();
        state.search_results.fulfilled("alien".to_string(), page(&[5, 6], 1, 3));
        assert_eq!(state.search_results.query, "alien");
        assert_eq!(state.search_results.listing.results.len(), 2);

        state.clear_search_results();
        assert_eq!(state.search_results, SearchState::default());
        assert_eq!(state.popular.results.len(), 1);
    }

    #[test]
    fn test_details_lifecycle() {
        let mut state = MoviesState::default();
        state.details_pending();
        assert!(state.is_loading);
        state.details_rejected("Resource not found: The resource you requested could not be found.".to_string());
        assert!(!state.is_loading);
        assert!(state.selected_movie.is_none());
        assert!(state.error.is_some());
        state.clear_error();
        assert!(state.error.is_none());
    }
}
