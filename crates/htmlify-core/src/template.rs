//! Parsed output skeletons with `{name}` placeholders.
//!
//! A [`Template`] is parsed once from its source and is immutable afterwards.
//! Rendering walks the parsed segments and substitutes placeholder values,
//! leaving literal segments untouched.
//!
//! # Syntax
//!
//! - `{name}` - placeholder, surrounding whitespace is ignored
//! - `{{` and `}}` - literal braces
//!
//! # Example
//!
//! ```rust
//! use htmlify_core::Template;
//!
//! let template = Template::parse("<a href=\"{target}\">{ text }</a>").unwrap();
//! let output = template.render_with(|name| match name {
//!     "target" => Some("index.html"),
//!     "text" => Some("Home"),
//!     _ => None,
//! });
//!
//! assert_eq!(output, "<a href=\"index.html\">Home</a>");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{HtmlifyError, Result};

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied to the output verbatim.
    Literal(String),
    /// Name of a value substituted at render time.
    Placeholder(String),
}

/// A template parsed into literal and placeholder segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parses a template source string.
    ///
    /// Fails on an unclosed placeholder or an empty placeholder name.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    let mut found_close = false;

                    for inner_ch in chars.by_ref() {
                        if inner_ch == '}' {
                            found_close = true;
                            break;
                        }
                        name.push(inner_ch);
                    }

                    if !found_close {
                        return Err(HtmlifyError::UnclosedPlaceholder(name));
                    }

                    let name = name.trim();
                    if name.is_empty() {
                        return Err(HtmlifyError::EmptyPlaceholder);
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name.to_string()));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                _ => literal.push(ch),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The source string this template was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed segments in output order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in order of appearance, repeats included.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Renders the template, asking `lookup` for each placeholder value.
    ///
    /// Placeholders the lookup cannot resolve are written back as `{name}`.
    pub fn render_with<'v>(&self, mut lookup: impl FnMut(&str) -> Option<&'v str>) -> String {
        let mut output = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Placeholder(name) => match lookup(name) {
                    Some(value) => output.push_str(value),
                    None => {
                        output.push('{');
                        output.push_str(name);
                        output.push('}');
                    }
                },
            }
        }
        output
    }

    /// Escapes braces so `text` survives parsing as a literal.
    pub fn escape_literal(text: &str) -> String {
        text.replace('{', "{{").replace('}', "}}")
    }
}

impl FromStr for Template {
    type Err = HtmlifyError;

    fn from_str(source: &str) -> Result<Self> {
        Self::parse(source)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Loads a template from its source string.
pub fn load_template(source: &str) -> Result<Template> {
    Template::parse(source)
}
