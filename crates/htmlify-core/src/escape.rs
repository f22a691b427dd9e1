//! Table-driven substitution of special characters with named HTML entities.
//!
//! A [`CharacterMap`] maps a small set of distinct characters to entity strings.
//! No entity may contain any key character, so substitutions never overlap,
//! always terminate, and escaping is idempotent:
//!
//! ```rust
//! use htmlify_core::escape_special_chars;
//!
//! let once = escape_special_chars("Grüße");
//! assert_eq!(once, "Gr&uuml;&szlig;e");
//! assert_eq!(escape_special_chars(&once), once);
//! ```

use std::borrow::Cow;

use crate::error::{HtmlifyError, Result};

/// German umlauts and sharp s, the characters htmlify has always escaped.
const GERMAN_ENTITIES: &[(char, &str)] = &[
    ('Ä', "&Auml;"),
    ('ä', "&auml;"),
    ('Ö', "&Ouml;"),
    ('ö', "&ouml;"),
    ('Ü', "&Uuml;"),
    ('ü', "&uuml;"),
    ('ß', "&szlig;"),
];

/// Mapping of distinct source characters to replacement entity strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterMap {
    entries: Vec<(char, Cow<'static, str>)>,
}

impl CharacterMap {
    /// Builds a map, rejecting duplicate keys and entities containing a key.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (char, S)>,
        S: Into<Cow<'static, str>>,
    {
        let entries: Vec<(char, Cow<'static, str>)> = entries
            .into_iter()
            .map(|(ch, entity)| (ch, entity.into()))
            .collect();

        for (i, (key, _)) in entries.iter().enumerate() {
            if entries[..i].iter().any(|(other, _)| other == key) {
                return Err(HtmlifyError::InvalidCharacterMap(format!(
                    "character '{key}' is mapped more than once"
                )));
            }
        }
        for (key, _) in &entries {
            if let Some((_, entity)) = entries.iter().find(|(_, e)| e.contains(*key)) {
                return Err(HtmlifyError::InvalidCharacterMap(format!(
                    "replacement \"{entity}\" contains mapped character '{key}'"
                )));
            }
        }

        Ok(Self { entries })
    }

    /// The umlaut map used by the htmlify command line tool.
    pub fn german() -> Self {
        Self {
            entries: GERMAN_ENTITIES
                .iter()
                .map(|&(ch, entity)| (ch, Cow::Borrowed(entity)))
                .collect(),
        }
    }

    /// The `(character, entity)` pairs in map order.
    pub fn entries(&self) -> impl Iterator<Item = (char, &str)> {
        self.entries.iter().map(|(ch, entity)| (*ch, entity.as_ref()))
    }

    /// Replaces every occurrence of every mapped character with its entity.
    pub fn escape(&self, text: &str) -> String {
        let mut output = text.to_string();
        for (ch, entity) in &self.entries {
            if output.contains(*ch) {
                output = output.replace(*ch, entity);
            }
        }
        output
    }
}

impl Default for CharacterMap {
    fn default() -> Self {
        Self::german()
    }
}

/// Escapes German umlauts and sharp s as named entities.
pub fn escape_special_chars(text: &str) -> String {
    CharacterMap::german().escape(text)
}
