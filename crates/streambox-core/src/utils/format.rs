use chrono::NaiveDate;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a TMDB release date (`YYYY-MM-DD`) for display
pub fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%b %d, %Y").to_string(),
        Err(_) if date.is_empty() => "Unknown".to_string(),
        Err(_) => date.to_string(),
    }
}

/// Year part of a release date, if there is one
pub fn release_year(date: &str) -> Option<&str> {
    let year = date.get(0..4)?;
    year.chars().all(|c| c.is_ascii_digit()).then_some(year)
}

/// Vote average with one decimal, e.g. `8.2/10`
pub fn format_rating(vote_average: f64) -> String {
    format!("{:.1}/10", vote_average)
}

/// Runtime in minutes as `2h 28m`
pub fn format_runtime(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}
