//! Media URL extraction from reel page HTML.

use std::sync::LazyLock;

use regex::Regex;

/// `<meta property="og:video" content="...">`, matched case-insensitively.
static OG_VIDEO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+property="og:video"\s+content="([^"]+)""#)
        .expect("og:video pattern is valid")
});

/// Return the content of the first `og:video` meta tag, if any.
pub fn extract_og_video(html: &str) -> Option<String> {
    OG_VIDEO
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"))
}

/// Suggest a filename from the last path segment of a media URL.
///
/// The query string and fragment are ignored.
pub fn suggest_filename(media_url: &str) -> Option<String> {
    let segment = match url::Url::parse(media_url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => media_url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    };

    segment.filter(|s| !s.is_empty())
}
