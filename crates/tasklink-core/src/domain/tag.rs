//! The sync tag marking local items for promotion to the remote store
//!
//! A user opts a local item into sync by writing the tag (for example
//! `#Notion`) into its title or notes. The tag is local-only metadata: it is
//! stripped before a title is compared with or pushed to the remote store.

use regex::{Regex, RegexBuilder};

use super::errors::DomainError;

/// Configured sync tag with its precompiled strip pattern
#[derive(Debug, Clone)]
pub struct SyncTag {
    /// Tag as configured, e.g. `#Notion`
    raw: String,
    /// Tag word without its `#` marker, e.g. `Notion`
    word: String,
    /// Lower-cased needles used for detection
    needles: Vec<String>,
    strip: Regex,
}

impl SyncTag {
    /// Build a tag from its configured text
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidTag`] if the tag is blank or is only
    /// `#` markers.
    pub fn new(tag: &str) -> Result<Self, DomainError> {
        let raw = tag.trim().to_string();
        let word = raw.trim_start_matches('#').to_string();
        if word.is_empty() || word.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidTag(tag.to_string()));
        }

        let hashed = format!("#{word}");
        let mut needles = vec![raw.to_lowercase()];
        if !needles.contains(&hashed.to_lowercase()) {
            needles.push(hashed.to_lowercase());
        }

        let alternatives: Vec<String> = needles
            .iter()
            .map(|needle| {
                let escaped = regex::escape(needle);
                if needle.chars().last().is_some_and(is_word_char) {
                    format!(r"{escaped}\b")
                } else {
                    escaped
                }
            })
            .collect();
        let pattern = format!(r"\s*(?:{})\s*", alternatives.join("|"));
        let strip = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| DomainError::InvalidTag(format!("{tag}: {e}")))?;

        Ok(Self {
            raw,
            word,
            needles,
            strip,
        })
    }

    /// Tag as configured
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Tag word without the `#` marker, used as the local tag marker
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Case-insensitive check for the tag, with or without its marker
    /// spelled as configured
    pub fn is_present_in(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.needles.iter().any(|needle| lower.contains(needle))
    }

    /// Remove every occurrence of the tag and collapse whitespace
    ///
    /// `"Renew license #notion"` becomes `"Renew license"`.
    pub fn strip(&self, title: &str) -> String {
        let replaced = self.strip.replace_all(title, " ");
        collapse_whitespace(&replaced)
    }

    /// Comparison key used to match titles across stores: tag stripped,
    /// whitespace collapsed, lower-cased
    pub fn normalize(&self, title: &str) -> String {
        self.strip(title).to_lowercase()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Trim and collapse internal runs of whitespace to a single space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
