//! Link extraction and sync-candidate classification
//!
//! A local item is linked to a remote task when its reference URL embeds
//! the task's 32-hex-digit id. Notion page URLs put the id at the end of a
//! `workspace/Title-Slug-<id>` path segment; that form is preferred over a
//! bare match anywhere in the URL.

use std::sync::OnceLock;

use regex::Regex;

use tasklink_core::domain::{LocalItem, RemoteId, SyncTag};

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)notion\.(?:so|site)/(?:[^/?#]+/)*(?:[^/?#]*-)?([0-9a-f]{32})(?:[/?#]|$)")
            .expect("Valid regex pattern")
    })
}

fn bare_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:^|[^0-9a-f])([0-9a-f]{32})(?:[^0-9a-f]|$)")
            .expect("Valid regex pattern")
    })
}

fn hyphenated_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
            .expect("Valid regex pattern")
    })
}

/// Finds the remote id embedded in a URL
pub fn extract_remote_id(url: &str) -> Option<RemoteId> {
    let candidate = slug_pattern()
        .captures(url)
        .or_else(|| bare_pattern().captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .or_else(|| hyphenated_pattern().find(url).map(|m| m.as_str()))?;
    RemoteId::new(candidate).ok()
}

/// The remote task a local item points at, if any
pub fn extract_link(item: &LocalItem) -> Option<RemoteId> {
    item.url.as_deref().and_then(extract_remote_id)
}

/// True if the item should be promoted to a new remote task
///
/// The item must carry the tag in its title or notes, have no reference
/// URL, and not be completed.
pub fn is_sync_candidate(item: &LocalItem, tag: &SyncTag) -> bool {
    if item.completed || item.has_url() {
        return false;
    }
    tag.is_present_in(&item.title)
        || item
            .notes
            .as_deref()
            .is_some_and(|notes| tag.is_present_in(notes))
}
