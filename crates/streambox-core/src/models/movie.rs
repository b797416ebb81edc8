//! TMDB catalog models.
//!
//! These mirror the TMDB v3 wire format (snake_case). Optional fields that
//! TMDB sometimes omits carry `#[serde(default)]` so partial payloads parse,
//! and text fields TMDB may send as `null` read as empty strings.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// Helper to deserialize a nullable string as an empty one
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A movie as returned by listing and search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adult: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<bool>,
}

/// One page of a paginated TMDB listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCompany {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub origin_country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCountry {
    pub iso_3166_1: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpokenLanguage {
    pub iso_639_1: String,
    pub name: String,
    #[serde(default)]
    pub english_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

impl Credits {
    /// Names of crew members credited as director.
    pub fn directors(&self) -> Vec<&str> {
        self.crew
            .iter()
            .filter(|c| c.job.as_deref() == Some("Director"))
            .map(|c| c.name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub official: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

impl VideoList {
    /// First YouTube trailer, preferring official ones.
    pub fn trailer(&self) -> Option<&Video> {
        let mut trailers = self
            .results
            .iter()
            .filter(|v| v.site == "YouTube" && v.video_type == "Trailer");
        let first = trailers.clone().next();
        trailers.find(|v| v.official == Some(true)).or(first)
    }
}

/// Full details for one movie, including the appended credits, videos and
/// similar titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub budget: i64,
    #[serde(default)]
    pub revenue: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tagline: String,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
    #[serde(default)]
    pub production_countries: Vec<ProductionCountry>,
    #[serde(default)]
    pub spoken_languages: Vec<SpokenLanguage>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub videos: Option<VideoList>,
    #[serde(default)]
    pub similar: Option<MoviePage>,
}

impl MovieDetails {
    pub fn id(&self) -> i64 {
        self.movie.id
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }
}

/// Listing categories offered on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovieCategory {
    Trending,
    Popular,
    TopRated,
    NowPlaying,
    Upcoming,
}

impl MovieCategory {
    pub const ALL: [MovieCategory; 5] = [
        MovieCategory::Trending,
        MovieCategory::Popular,
        MovieCategory::TopRated,
        MovieCategory::NowPlaying,
        MovieCategory::Upcoming,
    ];

    /// Parse a category id. Unrecognized names fall back to `Popular`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "trending" => MovieCategory::Trending,
            "top_rated" => MovieCategory::TopRated,
            "now_playing" => MovieCategory::NowPlaying,
            "upcoming" => MovieCategory::Upcoming,
            _ => MovieCategory::Popular,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovieCategory::Trending => "trending",
            MovieCategory::Popular => "popular",
            MovieCategory::TopRated => "top_rated",
            MovieCategory::NowPlaying => "now_playing",
            MovieCategory::Upcoming => "upcoming",
        }
    }

    /// TMDB path for this listing, relative to the API base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            MovieCategory::Trending => "/trending/movie/week",
            MovieCategory::Popular => "/movie/popular",
            MovieCategory::TopRated => "/movie/top_rated",
            MovieCategory::NowPlaying => "/movie/now_playing",
            MovieCategory::Upcoming => "/movie/upcoming",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MovieCategory::Trending => "Trending",
            MovieCategory::Popular => "Popular",
            MovieCategory::TopRated => "Top Rated",
            MovieCategory::NowPlaying => "Now Playing",
            MovieCategory::Upcoming => "Upcoming",
        }
    }
}

impl fmt::Display for MovieCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
