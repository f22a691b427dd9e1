//! htmlify - convert bracket-tagged text into HTML or XHTML fragments.
//!
//! The engine turns `[tag]content[/tag]` markup into markup through registered
//! tag codes, wrapped in ordered chains of whole-text rewrites:
//!
//! - [`escape_special_chars`] replaces umlauts and sharp s with named entities
//! - [`Template`] and [`TagCode`] render one tag occurrence from its captures
//! - [`TrimPrefix`] strips a configured prefix from link targets
//! - [`processor`] holds the pre- and post-processors
//! - [`Scanner`] pairs tags and drives the tag codes and processors
//! - [`Options`] and [`PipelineConfig`] assemble all of the above for a run
//!
//! # Quick Start
//!
//! ```rust
//! use htmlify_core::{Options, PipelineConfig, Standard};
//!
//! let options = Options {
//!     standard: Standard::Xhtml,
//!     line_breaks: true,
//!     ..Options::default()
//! };
//! let pipeline = PipelineConfig::resolve(&options).unwrap();
//!
//! let html = pipeline.process("[b]Fish & Chips[/b]\n[hr]").unwrap();
//! assert_eq!(html, "<b>Fish &amp; Chips</b><br />\n<hr />");
//! ```
//!
//! # Escaping
//!
//! Authored text inside a tag is ampersand-escaped exactly once, after any
//! transform hook of the tag code ran. By default every `&` is escaped, even
//! one that already starts an entity; [`AmpersandPolicy::PreserveEntities`]
//! leaves well-formed entities alone. Text outside of any tag is passed
//! through as is.

mod codes;
mod config;
mod error;
mod escape;
pub mod processor;
mod registry;
mod scanner;
mod tag_code;
mod template;
mod trim;

// Re-export public API
pub use codes::default_tag_codes;
pub use config::{
    post_processors, pre_processors, Options, PipelineConfig, Standard, TableClasses,
    DEFAULT_CELL_CLASS, DEFAULT_MAX_TABLE_WIDTH, DEFAULT_ROW_CLASS, DEFAULT_TABLE_CLASS,
};
pub use error::{HtmlifyError, Result};
pub use escape::{escape_special_chars, CharacterMap};
pub use processor::{ProcessorChain, TextProcessor};
pub use registry::TagRegistry;
pub use scanner::Scanner;
pub use tag_code::{AmpersandPolicy, Capture, Captures, TagCode, TagKind, Transform};
pub use template::{load_template, Segment, Template};
pub use trim::{trim_prefix, TrimPrefix};
