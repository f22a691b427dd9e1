//! Ordered, name-keyed collection of tag codes.
//!
//! A tag name may be registered twice: once without an attribute (a simple or
//! standalone code) and once with one (an advanced code), so that `[url]` and
//! `[url=...]` can render differently. Registering a second code for an
//! occupied slot is a configuration error.

use crate::error::{HtmlifyError, Result};
use crate::tag_code::TagCode;

#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    codes: Vec<TagCode>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag code, failing if its name and attribute form are taken.
    pub fn register(&mut self, code: TagCode) -> Result<()> {
        let taken = self.codes.iter().any(|existing| {
            existing.name() == code.name()
                && existing.kind().takes_attribute() == code.kind().takes_attribute()
        });
        if taken {
            return Err(HtmlifyError::DuplicateTagCode {
                name: code.name().to_string(),
                kind: code.kind(),
            });
        }
        self.codes.push(code);
        Ok(())
    }

    /// Finds the code for an opening tag, case-insensitively.
    pub fn lookup(&self, name: &str, with_attribute: bool) -> Option<&TagCode> {
        self.codes.iter().find(|code| {
            code.name().eq_ignore_ascii_case(name)
                && code.kind().takes_attribute() == with_attribute
        })
    }

    /// Whether any code is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.codes
            .iter()
            .any(|code| code.name().eq_ignore_ascii_case(name))
    }

    /// Registered codes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TagCode> {
        self.codes.iter()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
