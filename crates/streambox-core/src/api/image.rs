/// TMDB image renditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    PosterSmall,
    PosterMedium,
    PosterLarge,
    BackdropSmall,
    BackdropMedium,
    BackdropLarge,
    Original,
    Profile,
}

impl ImageSize {
    pub fn path_segment(&self) -> &'static str {
        match self {
            ImageSize::PosterSmall => "/w185",
            ImageSize::PosterMedium => "/w342",
            ImageSize::PosterLarge => "/w500",
            ImageSize::BackdropSmall => "/w300",
            ImageSize::BackdropMedium => "/w780",
            ImageSize::BackdropLarge => "/w1280",
            ImageSize::Original => "/original",
            ImageSize::Profile => "/w185",
        }
    }
}

/// Build a full image URL from a TMDB file path such as `/abc.jpg`.
/// Returns `None` when the movie has no image.
pub fn image_url(base_url: &str, path: Option<&str>, size: ImageSize) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    Some(format!(
        "{}{}{}",
        base_url.trim_end_matches('/'),
        size.path_segment(),
        path
    ))
}
