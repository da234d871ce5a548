//! Translation of raw `Cookie` header strings into browser cookie records.

use serde::{Deserialize, Serialize};

/// Domain every translated cookie is scoped to.
pub const COOKIE_DOMAIN: &str = ".instagram.com";

/// Path every translated cookie is scoped to.
pub const COOKIE_PATH: &str = "/";

/// Cookie ready to be installed into a browser context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

impl CookieRecord {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: COOKIE_DOMAIN.to_string(),
            path: COOKIE_PATH.to_string(),
        }
    }
}

/// Parse a `name=value; name=value` header into cookie records.
///
/// Fragments without `=` (or with an empty name) are skipped. Only the first
/// `=` separates name from value, so values may contain `=` themselves.
pub fn parse_cookie_header(header: Option<&str>) -> Vec<CookieRecord> {
    let Some(header) = header else {
        return Vec::new();
    };

    header
        .split(';')
        .map(str::trim)
        .filter_map(|part| part.split_once('='))
        .filter_map(|(name, value)| {
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(CookieRecord::new(name, value.trim()))
        })
        .collect()
}

/// Join records back into a `Cookie` header value.
pub fn to_header(cookies: &[CookieRecord]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}
