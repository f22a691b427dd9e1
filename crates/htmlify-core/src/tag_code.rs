//! Tag codes: a tag name bound to a template and the captures it consumes.
//!
//! Rendering one occurrence runs three fixed steps:
//!
//! 1. each declared capture passes through its transform hook, if any
//! 2. every capture value is ampersand-escaped
//! 3. the escaped values are substituted into the template
//!
//! Hooks therefore always see the raw authored text and never undo escaping.
//!
//! ```rust
//! use htmlify_core::{Capture, Captures, TagCode};
//!
//! let code = TagCode::simple("b", "<b>{inner}</b>").unwrap();
//!
//! let mut captures = Captures::new();
//! captures.insert(Capture::Inner, "Fish & Chips".to_string());
//!
//! assert_eq!(code.render(&captures).unwrap(), "<b>Fish &amp; Chips</b>");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{HtmlifyError, Result};
use crate::template::Template;

/// Name of a value harvested from one tag occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capture {
    /// Text between the opening and the closing tag.
    Inner,
    /// Value after `=` in the opening tag, e.g. the target of `[url=...]`.
    Attribute,
}

impl Capture {
    /// The placeholder name used for this capture in templates.
    pub fn as_str(self) -> &'static str {
        match self {
            Capture::Inner => "inner",
            Capture::Attribute => "attribute",
        }
    }
}

impl fmt::Display for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capture {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "inner" => Ok(Capture::Inner),
            "attribute" => Ok(Capture::Attribute),
            _ => Err(()),
        }
    }
}

/// Captured values for one tag occurrence.
pub type Captures = BTreeMap<Capture, String>;

/// The closed set of tag code shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `[b]inner[/b]`
    Simple,
    /// `[url=attribute]inner[/url]`
    Advanced,
    /// `[hr]`, no closing tag and no captures.
    Standalone,
}

impl TagKind {
    /// Captures an occurrence of this kind must supply.
    pub fn captures(self) -> &'static [Capture] {
        match self {
            TagKind::Simple => &[Capture::Inner],
            TagKind::Advanced => &[Capture::Inner, Capture::Attribute],
            TagKind::Standalone => &[],
        }
    }

    /// Whether the opening tag carries `=attribute`.
    pub fn takes_attribute(self) -> bool {
        matches!(self, TagKind::Advanced)
    }

    /// Whether occurrences need a closing tag.
    pub fn has_closing_tag(self) -> bool {
        !matches!(self, TagKind::Standalone)
    }

    fn declares(self, capture: Capture) -> bool {
        self.captures().contains(&capture)
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TagKind::Simple => "simple",
            TagKind::Advanced => "advanced",
            TagKind::Standalone => "standalone",
        })
    }
}

/// A pre-substitution rewrite of one capture value.
pub type Transform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// How literal ampersands in capture values are escaped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmpersandPolicy {
    /// Every `&` becomes `&amp;`, including those that start an entity.
    #[default]
    Unconditional,
    /// An `&` that starts a well-formed entity such as `&szlig;` or `&#223;`
    /// is left alone.
    PreserveEntities,
}

impl AmpersandPolicy {
    /// Escapes the ampersands of `text` under this policy.
    pub fn escape(self, text: &str) -> String {
        match self {
            AmpersandPolicy::Unconditional => text.replace('&', "&amp;"),
            AmpersandPolicy::PreserveEntities => {
                let mut output = String::with_capacity(text.len());
                for (pos, ch) in text.char_indices() {
                    if ch == '&' && !starts_with_entity(&text[pos..]) {
                        output.push_str("&amp;");
                    } else {
                        output.push(ch);
                    }
                }
                output
            }
        }
    }
}

/// Checks whether `text` starts with `&name;`, `&#123;` or `&#x7B;`.
fn starts_with_entity(text: &str) -> bool {
    let Some(rest) = text.strip_prefix('&') else {
        return false;
    };
    let Some(end) = rest.find(';') else {
        return false;
    };
    let body = &rest[..end];

    if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
    } else if let Some(dec) = body.strip_prefix('#') {
        !dec.is_empty() && dec.chars().all(|c| c.is_ascii_digit())
    } else {
        let mut chars = body.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric())
    }
}

/// Checks tag name syntax: an ASCII letter followed by letters or digits.
pub(crate) fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

/// A registered tag: name, template, declared captures and transform hooks.
///
/// Names are matched case-insensitively and stored in lowercase.
#[derive(Clone)]
pub struct TagCode {
    name: String,
    kind: TagKind,
    template: Template,
    inner: Option<Transform>,
    attribute: Option<Transform>,
    ampersands: AmpersandPolicy,
}

impl TagCode {
    /// Creates a code for `[name]inner[/name]`.
    pub fn simple(name: &str, template: &str) -> Result<Self> {
        Self::new(name, TagKind::Simple, Template::parse(template)?)
    }

    /// Creates a code for `[name=attribute]inner[/name]`.
    pub fn advanced(name: &str, template: &str) -> Result<Self> {
        Self::new(name, TagKind::Advanced, Template::parse(template)?)
    }

    /// Creates a code for a lone `[name]` without closing tag.
    pub fn standalone(name: &str, template: &str) -> Result<Self> {
        Self::new(name, TagKind::Standalone, Template::parse(template)?)
    }

    /// Creates a code from an already parsed template.
    ///
    /// Every placeholder of the template must be a capture `kind` declares.
    pub fn new(name: &str, kind: TagKind, template: Template) -> Result<Self> {
        if !is_valid_tag_name(name) {
            return Err(HtmlifyError::InvalidTagName(name.to_string()));
        }
        let name = name.to_ascii_lowercase();

        for placeholder in template.placeholders() {
            let declared = placeholder
                .parse::<Capture>()
                .is_ok_and(|capture| kind.declares(capture));
            if !declared {
                return Err(HtmlifyError::UnknownPlaceholder {
                    tag: name,
                    placeholder: placeholder.to_string(),
                    kind,
                });
            }
        }

        Ok(Self {
            name,
            kind,
            template,
            inner: None,
            attribute: None,
            ampersands: AmpersandPolicy::default(),
        })
    }

    /// Adds a transform hook for `capture`.
    ///
    /// A hook added to a capture that already has one runs after it.
    pub fn with_transform<F>(mut self, capture: Capture, transform: F) -> Result<Self>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        if !self.kind.declares(capture) {
            return Err(HtmlifyError::UndeclaredTransform {
                tag: self.name,
                capture,
                kind: self.kind,
            });
        }

        let slot = match capture {
            Capture::Inner => &mut self.inner,
            Capture::Attribute => &mut self.attribute,
        };
        let combined: Transform = match slot.take() {
            Some(first) => Arc::new(move |value: &str| transform(first(value).as_str())),
            None => Arc::new(transform),
        };
        *slot = Some(combined);
        Ok(self)
    }

    /// Sets how ampersands in capture values are escaped.
    pub fn with_ampersand_policy(mut self, policy: AmpersandPolicy) -> Self {
        self.ampersands = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn ampersand_policy(&self) -> AmpersandPolicy {
        self.ampersands
    }

    /// Whether a transform hook is attached to `capture`.
    pub fn has_transform(&self, capture: Capture) -> bool {
        self.hook(capture).is_some()
    }

    fn hook(&self, capture: Capture) -> Option<&Transform> {
        match capture {
            Capture::Inner => self.inner.as_ref(),
            Capture::Attribute => self.attribute.as_ref(),
        }
    }

    /// Renders one occurrence from its raw captures.
    ///
    /// The captures must match the declared set exactly; a mismatch means the
    /// caller and the tag code disagree on the tag's shape.
    pub fn render(&self, captures: &Captures) -> Result<String> {
        if let Some(&capture) = captures.keys().find(|c| !self.kind.declares(**c)) {
            return Err(HtmlifyError::UnexpectedCapture {
                tag: self.name.clone(),
                capture,
            });
        }

        let mut values = Vec::with_capacity(self.kind.captures().len());
        for &capture in self.kind.captures() {
            let raw = captures
                .get(&capture)
                .ok_or_else(|| HtmlifyError::MissingCapture {
                    tag: self.name.clone(),
                    capture,
                })?;
            let transformed = match self.hook(capture) {
                Some(transform) => transform(raw.as_str()),
                None => raw.clone(),
            };
            values.push((capture.as_str(), self.ampersands.escape(&transformed)));
        }

        Ok(self.template.render_with(|placeholder| {
            values
                .iter()
                .find(|(name, _)| *name == placeholder)
                .map(|(_, value)| value.as_str())
        }))
    }
}

impl fmt::Debug for TagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagCode")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("template", &self.template.source())
            .field("inner_transform", &self.inner.is_some())
            .field("attribute_transform", &self.attribute.is_some())
            .field("ampersands", &self.ampersands)
            .finish()
    }
}
