//! Prefix trimming for link targets.
//!
//! [`TrimPrefix`] removes a configured literal prefix from a capture, e.g. to
//! turn absolute links into site-relative ones. It is attached to a tag code as
//! an ordinary transform hook, so it runs on the raw capture before ampersand
//! escaping.

use crate::error::Result;
use crate::tag_code::{Capture, TagCode};

/// Removes `prefix` from the start of `text`.
///
/// The text is left unchanged when it does not start with the prefix, or when
/// removing the prefix would leave nothing.
pub fn trim_prefix<'a>(text: &'a str, prefix: &str) -> &'a str {
    match text.strip_prefix(prefix) {
        Some(rest) if !rest.is_empty() => rest,
        _ => text,
    }
}

/// A configured prefix to strip from captures. An empty prefix is inert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrimPrefix {
    prefix: String,
}

impl TrimPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether trimming is disabled.
    pub fn is_inert(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Applies the trim to one value.
    pub fn apply(&self, text: &str) -> String {
        trim_prefix(text, &self.prefix).to_string()
    }

    /// Wraps the `capture` hook of `code` with this trim.
    ///
    /// Returns `code` untouched when the prefix is empty.
    pub fn decorate(&self, code: TagCode, capture: Capture) -> Result<TagCode> {
        if self.is_inert() {
            return Ok(code);
        }
        let trim = self.clone();
        code.with_transform(capture, move |value| trim.apply(value))
    }
}

impl From<&str> for TrimPrefix {
    fn from(prefix: &str) -> Self {
        Self::new(prefix)
    }
}
