//! Plain-text rendering of store slices.

use streambox_core::api::ImageSize;
use streambox_core::models::{Movie, MovieDetails, User};
use streambox_core::store::ListingState;
use streambox_core::utils::{format_date, format_rating, format_runtime, release_year, truncate_string};
use streambox_core::AppStore;

/// Maximum title width in listing rows
const TITLE_WIDTH: usize = 40;

/// Maximum overview length in listings
const OVERVIEW_WIDTH: usize = 100;

/// Cast members shown on the details page
const CAST_LIMIT: usize = 5;

fn favorite_marker(store: &AppStore, movie: &Movie) -> &'static str {
    if store.favorites.is_favorite(movie.id) {
        "*"
    } else {
        " "
    }
}

fn movie_row(store: &AppStore, movie: &Movie) -> String {
    format!(
        "{} {:>8}  {:<width$}  {:>4}  {}",
        favorite_marker(store, movie),
        movie.id,
        truncate_string(&movie.title, TITLE_WIDTH),
        release_year(&movie.release_date).unwrap_or("----"),
        format_rating(movie.vote_average),
        width = TITLE_WIDTH,
    )
}

pub fn status(store: &AppStore) {
    match store.auth.user {
        Some(ref user) => println!("Signed in as {} ({})", user.full_name(), user.username),
        None => println!("Not signed in."),
    }
    println!("Theme: {}", store.theme.theme.as_str());
    println!("Favorites: {}", store.favorites.count());
    if let Some(ref error) = store.favorites.error {
        println!("Favorites could not be loaded: {}", error);
    }
}

pub fn listing(store: &AppStore, title: &str, listing: &ListingState) {
    println!("== {} (page {} of {}) ==", title, listing.page, listing.total_pages);
    if let Some(ref error) = listing.error {
        println!("  {}", error);
        return;
    }
    if listing.results.is_empty() {
        println!("  No movies found.");
        return;
    }
    for movie in &listing.results {
        println!("{}", movie_row(store, movie));
    }
    if listing.has_more() {
        println!("  ... more on page {}", listing.page + 1);
    }
}

pub fn details(store: &AppStore, details: &MovieDetails) {
    let movie = &details.movie;
    println!("{}{}", favorite_marker(store, movie), movie.title);
    if !details.tagline.is_empty() {
        println!("  \"{}\"", details.tagline);
    }

    let mut facts = vec![format_date(&movie.release_date), format_rating(movie.vote_average)];
    if let Some(runtime) = details.runtime.filter(|r| *r > 0) {
        facts.push(format_runtime(runtime));
    }
    let genres = details.genre_names();
    if !genres.is_empty() {
        facts.push(genres.join(", "));
    }
    println!("  {}", facts.join(" | "));

    if let Some(ref credits) = details.credits {
        let directors = credits.directors();
        if !directors.is_empty() {
            println!("  Directed by {}", directors.join(", "));
        }
        let cast: Vec<&str> = credits.cast.iter().take(CAST_LIMIT).map(|c| c.name.as_str()).collect();
        if !cast.is_empty() {
            println!("  Starring {}", cast.join(", "));
        }
    }

    if !movie.overview.is_empty() {
        println!("\n{}\n", movie.overview);
    }

    if let Some(poster) = store.api().image_url(movie.poster_path.as_deref(), ImageSize::PosterLarge) {
        println!("  Poster:  {}", poster);
    }
    if let Some(trailer) = details.videos.as_ref().and_then(|v| v.trailer()) {
        println!("  Trailer: https://www.youtube.com/watch?v={}", trailer.key);
    }
    if let Some(ref similar) = details.similar {
        if !similar.results.is_empty() {
            println!("\n  Similar:");
            for m in similar.results.iter().take(CAST_LIMIT) {
                println!("    {:>8}  {}", m.id, m.title);
            }
        }
    }
}

pub fn favorites(store: &AppStore) {
    if store.favorites.is_empty() {
        println!("No favorites yet.");
        return;
    }
    println!("== Favorites ({}) ==", store.favorites.count());
    for movie in &store.favorites.favorites {
        println!("{}", movie_row(store, movie));
        if !movie.overview.is_empty() {
            println!("             {}", truncate_string(&movie.overview, OVERVIEW_WIDTH));
        }
    }
}

pub fn user(user: &User) {
    println!("{} ({})", user.full_name(), user.username);
    if !user.email.is_empty() {
        println!("  Email:  {}", user.email);
    }
    if let Some(ref image) = user.image {
        println!("  Avatar: {}", image);
    }
}
