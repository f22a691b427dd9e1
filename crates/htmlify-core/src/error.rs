//! Error types for the htmlify engine.
//!
//! Every variant is fatal for a run: configuration errors are raised while the
//! pipeline is being assembled, capture mismatches while a tag occurrence is
//! rendered. Text processors never fail and have no variants here.

use crate::tag_code::{Capture, TagKind};

/// Errors raised while configuring or driving the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HtmlifyError {
    /// A tag code with the same name and attribute form is already registered.
    #[error("tag code [{name}] ({kind}) is already registered")]
    DuplicateTagCode { name: String, kind: TagKind },

    /// Tag names are ASCII letters followed by letters or digits.
    #[error("invalid tag name '{0}'")]
    InvalidTagName(String),

    /// A template opened a placeholder and never closed it.
    #[error("unclosed placeholder in template: {{{0}")]
    UnclosedPlaceholder(String),

    /// A template contained `{}`.
    #[error("empty placeholder name in template")]
    EmptyPlaceholder,

    /// A template refers to a capture its tag code never receives.
    #[error("template of [{tag}] uses {{{placeholder}}}, which a {kind} code does not capture")]
    UnknownPlaceholder {
        tag: String,
        placeholder: String,
        kind: TagKind,
    },

    /// A transform hook was attached to a capture the tag code does not declare.
    #[error("cannot attach a transform for '{capture}' to {kind} code [{tag}]")]
    UndeclaredTransform {
        tag: String,
        capture: Capture,
        kind: TagKind,
    },

    /// The character map breaks the no-re-escaping invariant.
    #[error("invalid character map: {0}")]
    InvalidCharacterMap(String),

    /// A configuration option carries an unusable value.
    #[error("invalid value for option '{option}': {reason}")]
    InvalidOption { option: &'static str, reason: String },

    /// The scanner omitted a capture the tag code requires.
    #[error("tag code [{tag}] requires capture '{capture}', but none was supplied")]
    MissingCapture { tag: String, capture: Capture },

    /// The scanner supplied a capture the tag code does not declare.
    #[error("tag code [{tag}] does not declare capture '{capture}'")]
    UnexpectedCapture { tag: String, capture: Capture },
}

impl HtmlifyError {
    /// Create an invalid option error.
    pub fn invalid_option(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            reason: reason.into(),
        }
    }

    /// Returns `true` for capture mismatches between scanner and tag code.
    pub fn is_capture_mismatch(&self) -> bool {
        matches!(
            self,
            Self::MissingCapture { .. } | Self::UnexpectedCapture { .. }
        )
    }
}

/// Result type for htmlify operations.
pub type Result<T> = std::result::Result<T, HtmlifyError>;
