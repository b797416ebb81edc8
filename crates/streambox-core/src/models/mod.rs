//! Data models for StreamBox entities.
//!
//! - `Movie`, `MovieDetails`, `MoviePage`: TMDB catalog types
//! - `MovieCategory`: the listing endpoints the home screen offers
//! - `User`, `AuthSession`, `RegisterData`: account types
//! - `ThemeMode`: persisted light/dark preference

pub mod movie;
pub mod theme;
pub mod user;

pub use movie::{
    CastMember, Credits, CrewMember, Genre, Movie, MovieCategory, MovieDetails, MoviePage,
    ProductionCompany, ProductionCountry, SpokenLanguage, Video, VideoList,
};
pub use theme::ThemeMode;
pub use user::{AuthSession, RegisterData, User};
