//! Whole-text rewrites run before and after tag substitution.
//!
//! A [`TextProcessor`] is a pure `text -> text` function. Processors never fail:
//! input that contains nothing to rewrite comes back unchanged. A
//! [`ProcessorChain`] runs processors strictly in registration order, feeding
//! each one the complete output of the previous one.
//!
//! The concrete processors live in [`pre`] (raw input) and [`post`] (rendered
//! markup).

pub mod post;
pub mod pre;

use std::fmt;

pub use post::{HugBlockTag, TableIndent};
pub use pre::{CollapseSpaces, ListNewlines, NormalizeLineEndings, TableNewlines, TrimTrailingSpaces};

/// A pure rewrite of a complete text buffer.
pub trait TextProcessor: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Rewrites `text`. Must not fail; unmatched input is returned unchanged.
    fn apply(&self, text: &str) -> String;
}

/// An ordered list of processors, assembled once and then only read.
#[derive(Default)]
pub struct ProcessorChain {
    processors: Vec<Box<dyn TextProcessor>>,
}

impl ProcessorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a processor to the end of the chain.
    pub fn push(&mut self, processor: impl TextProcessor + 'static) {
        self.processors.push(Box::new(processor));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, processor: impl TextProcessor + 'static) -> Self {
        self.push(processor);
        self
    }

    /// Runs every processor in order over `text`.
    pub fn run(&self, text: &str) -> String {
        let mut current = text.to_string();
        for processor in &self.processors {
            tracing::trace!(processor = processor.name(), "applying text processor");
            current = processor.apply(&current);
        }
        current
    }

    /// Processor names in run order.
    pub fn names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Replaces every occurrence of `needle` in `text` with `replacement`.
///
/// After each replacement the search resumes right behind the inserted text,
/// so the replacement itself is never rescanned while back-to-back occurrences
/// in the original text are all found.
pub fn replace_each(text: &str, needle: &str, replacement: &str) -> String {
    if needle.is_empty() {
        return text.to_string();
    }

    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(needle) {
        output.push_str(&rest[..pos]);
        output.push_str(replacement);
        rest = &rest[pos + needle.len()..];
    }
    output.push_str(rest);
    output
}
