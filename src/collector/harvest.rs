//! Pure pieces of the scroll-and-harvest loop: link canonicalization,
//! deduplication and the termination decision.

use std::collections::BTreeSet;

/// Path fragment that identifies a reel link.
pub const REEL_PATH_MARKER: &str = "/reel/";

/// Why collection stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured maximum number of reels was reached.
    CapReached,
    /// Too many consecutive rounds found nothing new.
    Exhausted,
}

/// Normalize a discovered link for set membership.
///
/// Returns `None` for links that are not reel links.
pub fn canonicalize_link(href: &str) -> Option<String> {
    let href = href.trim();
    if !href.contains(REEL_PATH_MARKER) {
        return None;
    }
    if href.ends_with('/') {
        Some(href.to_string())
    } else {
        Some(format!("{}/", href))
    }
}

/// Add unseen reel links to `seen`, returning how many were new.
///
/// With a `max`, harvesting stops as soon as `seen` reaches it; the rest of
/// the batch is ignored.
pub fn harvest_new_links<I>(seen: &mut BTreeSet<String>, links: I, max: Option<usize>) -> usize
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut new = 0;
    for link in links {
        if max.is_some_and(|max| seen.len() >= max) {
            break;
        }
        let Some(link) = canonicalize_link(link.as_ref()) else {
            continue;
        };
        if seen.insert(link) {
            new += 1;
        }
    }
    new
}

/// When to stop scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationPolicy {
    max: Option<usize>,
    idle_limit: u32,
}

impl TerminationPolicy {
    /// A `max` of zero means no cap.
    pub fn new(max: Option<usize>, idle_limit: u32) -> Self {
        Self {
            max: max.filter(|&m| m > 0),
            idle_limit,
        }
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    /// Decide whether to stop given the number of reels collected and the
    /// count of consecutive idle rounds.
    pub fn decide(&self, collected: usize, idle_rounds: u32) -> Option<StopReason> {
        if self.max.is_some_and(|max| collected >= max) {
            return Some(StopReason::CapReached);
        }
        if idle_rounds >= self.idle_limit {
            return Some(StopReason::Exhausted);
        }
        None
    }
}

/// Strip surrounding whitespace and leading `@` from an account name.
///
/// Returns `None` if nothing usable is left or the name would escape its
/// path segment.
pub fn canonicalize_account(account: &str) -> Option<String> {
    let account = account.trim().trim_start_matches('@');
    if account.is_empty()
        || account
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '\\'))
    {
        return None;
    }
    Some(account.to_string())
}

/// Reels listing page for an account.
pub fn listing_url(account: &str) -> String {
    format!("https://www.instagram.com/{}/reels/", account)
}
