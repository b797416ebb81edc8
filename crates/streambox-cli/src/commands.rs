//! Command handlers. Each one drives the store and renders the touched slice.

use std::io::{self, Write};

use anyhow::{anyhow, Result};
use tracing::debug;

use streambox_core::models::{MovieCategory, RegisterData, ThemeMode};
use streambox_core::validation::{validate_login, validate_register, FormErrors};
use streambox_core::AppStore;

use crate::{render, Command, ThemeArg};

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

fn prompt_password(label: &str) -> Result<String> {
    Ok(rpassword::prompt_password(format!("{}: ", label))?)
}

fn form_error(errors: FormErrors) -> anyhow::Error {
    let lines: Vec<String> = errors
        .into_iter()
        .map(|(field, message)| format!("  {}: {}", field, message))
        .collect();
    anyhow!("Please fix the following:\n{}", lines.join("\n"))
}

/// Turn a store failure into a command failure.
fn check(result: Result<(), String>) -> Result<()> {
    result.map_err(|message| anyhow!(message))
}

pub async fn run(store: &mut AppStore, command: Command) -> Result<()> {
    debug!(?command, "Running command");
    match command {
        Command::Init => {
            render::status(store);
            Ok(())
        }
        Command::Login { username } => login(store, username).await,
        Command::Register => register(store).await,
        Command::Logout => {
            check(store.logout())?;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami { refresh } => whoami(store, refresh).await,
        Command::Movies { category, page } => {
            let category = MovieCategory::from_name(&category);
            check(store.fetch_category(category, page).await)?;
            if let Some(listing) = store.movies.category(category) {
                render::listing(store, category.label(), listing);
            }
            Ok(())
        }
        Command::Home => {
            let result = store.load_home().await;
            render::listing(store, MovieCategory::Trending.label(), &store.movies.trending);
            render::listing(store, MovieCategory::Popular.label(), &store.movies.popular);
            check(result)
        }
        Command::Search { query, page } => {
            check(store.search(&query, page).await)?;
            let title = format!("Results for \"{}\"", store.movies.search_results.query);
            render::listing(store, &title, &store.movies.search_results.listing);
            Ok(())
        }
        Command::Details { id } => {
            check(store.fetch_movie_details(id).await)?;
            if let Some(ref details) = store.movies.selected_movie {
                render::details(store, details);
            }
            Ok(())
        }
        Command::Favorites => {
            render::favorites(store);
            Ok(())
        }
        Command::Favorite { id } => {
            check(store.fetch_movie_details(id).await)?;
            let movie = store
                .movies
                .selected_movie
                .as_ref()
                .map(|d| d.movie.clone())
                .ok_or_else(|| anyhow!("Movie {} not found", id))?;
            let title = movie.title.clone();
            check(store.add_favorite(movie))?;
            println!("Added \"{}\" to favorites ({} total).", title, store.favorites.count());
            Ok(())
        }
        Command::Unfavorite { id } => {
            if !store.favorites.is_favorite(id) {
                println!("Movie {} is not a favorite.", id);
                return Ok(());
            }
            check(store.remove_favorite(id))?;
            println!("Removed movie {} from favorites ({} left).", id, store.favorites.count());
            Ok(())
        }
        Command::ClearFavorites => {
            check(store.clear_favorites())?;
            println!("Favorites cleared.");
            Ok(())
        }
        Command::Theme { mode } => theme(store, mode),
    }
}

async fn login(store: &mut AppStore, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(name) => name,
        None => prompt("Username")?,
    };
    let password = match std::env::var("STREAMBOX_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => prompt_password("Password")?,
    };

    validate_login(&username, &password).map_err(form_error)?;
    check(store.login(&username, &password).await)?;
    if let Some(ref user) = store.auth.user {
        println!("Welcome, {}!", user.full_name());
    }
    Ok(())
}

async fn register(store: &mut AppStore) -> Result<()> {
    let data = RegisterData {
        first_name: prompt("First name")?,
        last_name: prompt("Last name")?,
        username: prompt("Username")?,
        email: prompt("Email")?,
        password: prompt_password("Password")?,
        confirm_password: prompt_password("Confirm password")?,
    };

    validate_register(&data).map_err(form_error)?;
    check(store.register(&data).await)?;
    println!("Account created. Signed in as {}.", data.username);
    Ok(())
}

async fn whoami(store: &mut AppStore, refresh: bool) -> Result<()> {
    if !store.auth.is_authenticated {
        println!("Not signed in.");
        return Ok(());
    }
    if refresh {
        check(store.refresh_profile().await)?;
    }
    if let Some(ref user) = store.auth.user {
        render::user(user);
    }
    Ok(())
}

fn theme(store: &mut AppStore, mode: Option<ThemeArg>) -> Result<()> {
    match mode {
        None => {}
        Some(ThemeArg::Toggle) => check(store.toggle_theme())?,
        Some(ThemeArg::Light) => check(store.set_theme(ThemeMode::Light))?,
        Some(ThemeArg::Dark) => check(store.set_theme(ThemeMode::Dark))?,
    }
    println!("Theme: {}", store.theme.theme.as_str());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_error_lists_each_field() {
        let mut errors = FormErrors::new();
        errors.insert("username", "Username is required".to_string());
        errors.insert("password", "Password is required".to_string());
        let message = form_error(errors).to_string();
        assert!(message.starts_with("Please fix the following:"));
        assert!(message.contains("  password: Password is required"));
        assert!(message.contains("  username: Username is required"));
    }

    #[test]
    fn test_check_keeps_store_message() {
        assert!(check(Ok(())).is_ok());
        let err = check(Err("Invalid username or password".to_string())).unwrap_err();
        assert_eq!(err.to_string(), "Invalid username or password");
    }
}
