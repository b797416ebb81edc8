//! StreamBox CLI - browse the TMDB catalog and manage local favorites.
//!
//! Each invocation restores persisted state (theme, session, favorites),
//! runs one command against the store, and prints the result.

mod commands;
mod render;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use streambox_core::store::FIRST_PAGE;
use streambox_core::{AppStore, Config};

#[derive(Parser)]
#[command(name = "streambox")]
#[command(about = "StreamBox - browse movies and keep favorites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show restored state
    Init,

    /// Sign in (password from STREAMBOX_PASSWORD or a prompt)
    Login {
        /// Prompted for when omitted
        username: Option<String>,
    },

    /// Create a local account
    Register,

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Re-fetch the profile from the auth service
        #[arg(long)]
        refresh: bool,
    },

    /// List one category: trending, popular, top_rated, now_playing, upcoming
    Movies {
        /// Unknown names list popular movies
        category: String,

        #[arg(default_value_t = FIRST_PAGE, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Trending and popular together
    Home,

    /// Search the catalog
    Search {
        query: String,

        #[arg(default_value_t = FIRST_PAGE, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Show one movie
    Details { id: i64 },

    /// List favorites
    Favorites,

    /// Add a movie to favorites
    Favorite { id: i64 },

    /// Remove a movie from favorites
    Unfavorite { id: i64 },

    /// Remove all favorites
    ClearFavorites,

    /// Show or change the theme
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeArg>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ThemeArg {
    Light,
    Dark,
    Toggle,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Exits with status 2 on a bad command line
    let cli = Cli::parse();

    init_tracing();

    let config = Config::load()?;
    let mut store = AppStore::from_config(&config)?;
    store.initialize();
    info!(command = ?cli.command, "StreamBox starting");

    if let Err(e) = commands::run(&mut store, cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
