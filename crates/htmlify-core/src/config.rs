//! Run configuration and its resolution into a ready pipeline.
//!
//! [`Options`] lists every knob the engine understands. It is resolved exactly
//! once into a [`PipelineConfig`], which owns the scanner with all tag codes
//! and processors registered and is then only read while files are converted.

use std::fmt;
use std::str::FromStr;

use crate::codes::default_tag_codes;
use crate::error::{HtmlifyError, Result};
use crate::escape::escape_special_chars;
use crate::processor::{
    CollapseSpaces, HugBlockTag, ListNewlines, NormalizeLineEndings, ProcessorChain,
    TableIndent, TableNewlines, TrimTrailingSpaces,
};
use crate::scanner::Scanner;
use crate::tag_code::AmpersandPolicy;
use crate::trim::TrimPrefix;

/// Class of generated `<table>` elements unless configured otherwise.
pub const DEFAULT_TABLE_CLASS: &str = "grid_table";
/// Class of generated `<tr>` elements unless configured otherwise.
pub const DEFAULT_ROW_CLASS: &str = "grid_tr";
/// Class of generated `<td>` elements unless configured otherwise.
pub const DEFAULT_CELL_CLASS: &str = "grid_td";
/// Widest `[table=N]` accepted unless configured otherwise. Zero lifts the limit.
pub const DEFAULT_MAX_TABLE_WIDTH: u32 = 600;

/// Target markup dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Standard {
    /// HTML 4.01: void elements end in `>`.
    #[default]
    Html4,
    /// XHTML: void elements end in ` />`.
    Xhtml,
}

impl Standard {
    /// Closing sequence of a void element such as `<img ...>`.
    pub fn void_close(self) -> &'static str {
        match self {
            Standard::Html4 => ">",
            Standard::Xhtml => " />",
        }
    }

    /// Line break element inserted for newlines.
    pub fn line_break(self) -> &'static str {
        match self {
            Standard::Html4 => "<br>",
            Standard::Xhtml => "<br />",
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Standard::Html4 => "html4",
            Standard::Xhtml => "xhtml",
        })
    }
}

impl FromStr for Standard {
    type Err = HtmlifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" | "html4" => Ok(Standard::Html4),
            "xhtml" => Ok(Standard::Xhtml),
            _ => Err(HtmlifyError::invalid_option(
                "standard",
                format!("'{s}' is neither html4 nor xhtml"),
            )),
        }
    }
}

/// CSS classes put on generated table, row and cell elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableClasses {
    table: String,
    row: String,
    cell: String,
}

impl TableClasses {
    /// Creates a validated class set.
    ///
    /// Class names must be non-empty and must not contain `"`, `<` or `>`.
    pub fn new(
        table: impl Into<String>,
        row: impl Into<String>,
        cell: impl Into<String>,
    ) -> Result<Self> {
        let classes = Self {
            table: table.into(),
            row: row.into(),
            cell: cell.into(),
        };
        validate_class("table class", &classes.table)?;
        validate_class("row class", &classes.row)?;
        validate_class("cell class", &classes.cell)?;
        Ok(classes)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn row(&self) -> &str {
        &self.row
    }

    pub fn cell(&self) -> &str {
        &self.cell
    }
}

impl Default for TableClasses {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE_CLASS.to_string(),
            row: DEFAULT_ROW_CLASS.to_string(),
            cell: DEFAULT_CELL_CLASS.to_string(),
        }
    }
}

fn validate_class(option: &'static str, class: &str) -> Result<()> {
    if class.is_empty() {
        return Err(HtmlifyError::invalid_option(option, "class name is empty"));
    }
    if let Some(c) = class.chars().find(|c| matches!(c, '"' | '<' | '>')) {
        return Err(HtmlifyError::invalid_option(
            option,
            format!("class name '{class}' contains '{c}'"),
        ));
    }
    Ok(())
}

/// Every option the engine understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Markup dialect of void elements and line breaks.
    pub standard: Standard,
    /// Prefix stripped from link and image targets. Empty disables trimming.
    pub trim_prefix: String,
    /// Whether `[list]` codes are registered.
    pub list_codes: bool,
    /// Whether newlines become line break elements.
    pub line_breaks: bool,
    /// Whether runs of spaces collapse into one.
    pub space_trim: bool,
    pub table_classes: TableClasses,
    /// Widest accepted `[table=N]`, zero for no limit.
    pub max_table_width: u32,
    pub ampersands: AmpersandPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            standard: Standard::default(),
            trim_prefix: String::new(),
            list_codes: true,
            line_breaks: false,
            space_trim: true,
            table_classes: TableClasses::default(),
            max_table_width: DEFAULT_MAX_TABLE_WIDTH,
            ampersands: AmpersandPolicy::default(),
        }
    }
}

impl Options {
    pub fn trim(&self) -> TrimPrefix {
        TrimPrefix::new(self.trim_prefix.as_str())
    }
}

/// Builds the pre-processor chain for `options`.
pub fn pre_processors(options: &Options) -> ProcessorChain {
    let mut chain = ProcessorChain::new();
    if options.line_breaks {
        chain.push(NormalizeLineEndings);
    }
    chain.push(TrimTrailingSpaces);
    if options.line_breaks && options.list_codes {
        chain.push(ListNewlines);
    }
    if options.space_trim {
        chain.push(CollapseSpaces);
    }
    if options.line_breaks {
        chain.push(TableNewlines);
    }
    chain
}

/// Builds the post-processor chain for `options`.
pub fn post_processors(options: &Options) -> ProcessorChain {
    let classes = &options.table_classes;
    ProcessorChain::new()
        .with(TableIndent::new(classes.row(), classes.cell()))
        .with(HugBlockTag::new("center"))
}

/// The resolved pipeline, shared read-only by every file of a batch.
#[derive(Debug)]
pub struct PipelineConfig {
    standard: Standard,
    line_breaks: bool,
    scanner: Scanner,
}

impl PipelineConfig {
    /// Assembles tag codes and processors. Fails on any configuration error.
    pub fn resolve(options: &Options) -> Result<Self> {
        let mut scanner = Scanner::new();
        for code in default_tag_codes(options)? {
            scanner.register_tag_code(code)?;
        }
        scanner.set_pre_processors(pre_processors(options));
        scanner.set_post_processors(post_processors(options));

        tracing::debug!(
            standard = %options.standard,
            pre = ?scanner.pre_processors().names(),
            post = ?scanner.post_processors().names(),
            "resolved text processors"
        );
        tracing::debug!(
            codes = scanner.registry().len(),
            trim = %options.trim_prefix,
            "registered tag codes"
        );

        Ok(Self {
            standard: options.standard,
            line_breaks: options.line_breaks,
            scanner,
        })
    }

    pub fn standard(&self) -> Standard {
        self.standard
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Converts one decoded text: special characters first, then tags.
    pub fn process(&self, text: &str) -> Result<String> {
        let escaped = escape_special_chars(text);
        self.scanner.parse(&escaped, self.standard, self.line_breaks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod standard {
        use super::*;

        #[test]
        fn void_elements() {
            assert_eq!(Standard::Html4.void_close(), ">");
            assert_eq!(Standard::Xhtml.void_close(), " />");
            assert_eq!(Standard::Xhtml.line_break(), "<br />");
        }

        #[test]
        fn parse_names() {
            assert_eq!("HTML".parse::<Standard>().unwrap(), Standard::Html4);
            assert_eq!("xhtml".parse::<Standard>().unwrap(), Standard::Xhtml);
            assert!("html5".parse::<Standard>().is_err());
        }
    }

    mod classes {
        use super::*;

        #[test]
        fn defaults() {
            let classes = TableClasses::default();
            assert_eq!(classes.table(), "grid_table");
            assert_eq!(classes.row(), "grid_tr");
            assert_eq!(classes.cell(), "grid_td");
        }

        #[test]
        fn invalid_names_rejected() {
            assert!(TableClasses::new("", "r", "c").is_err());
            assert_eq!(
                TableClasses::new("t", "a\"b", "c").unwrap_err(),
                HtmlifyError::invalid_option("row class", "class name 'a\"b' contains '\"'")
            );
            assert!(TableClasses::new("t", "r", "<c>").is_err());
            assert!(TableClasses::new("my table", "r{1}", "c").is_ok());
        }
    }

    mod chains {
        use super::*;

        #[test]
        fn default_pre_chain() {
            let chain = pre_processors(&Options::default());
            assert_eq!(chain.names(), vec!["trim-trailing-spaces", "collapse-spaces"]);
        }

        #[test]
        fn full_pre_chain_order() {
            let options = Options {
                line_breaks: true,
                ..Options::default()
            };
            assert_eq!(
                pre_processors(&options).names(),
                vec![
                    "normalize-line-endings",
                    "trim-trailing-spaces",
                    "list-newlines",
                    "collapse-spaces",
                    "table-newlines",
                ]
            );
        }

        #[test]
        fn list_newlines_need_list_codes() {
            let options = Options {
                line_breaks: true,
                list_codes: false,
                space_trim: false,
                ..Options::default()
            };
            assert_eq!(
                pre_processors(&options).names(),
                vec!["normalize-line-endings", "trim-trailing-spaces", "table-newlines"]
            );
        }

        #[test]
        fn post_chain() {
            assert_eq!(
                post_processors(&Options::default()).names(),
                vec!["table-indent", "hug-block-tag"]
            );
        }
    }

    mod pipeline {
        use super::*;

        #[test]
        fn end_to_end() {
            let pipeline = PipelineConfig::resolve(&Options::default()).unwrap();
            assert_eq!(
                pipeline.process("[B]Hello & welcome[/B]").unwrap(),
                "<b>Hello &amp; welcome</b>"
            );
        }

        #[test]
        fn special_characters_escaped_before_tags() {
            let pipeline = PipelineConfig::resolve(&Options::default()).unwrap();
            assert_eq!(
                pipeline.process("[b]Grüße[/b] ä").unwrap(),
                "<b>Gr&amp;uuml;&amp;szlig;e</b> &auml;"
            );
        }

        #[test]
        fn preserve_entities_opt_in() {
            let options = Options {
                ampersands: AmpersandPolicy::PreserveEntities,
                ..Options::default()
            };
            let pipeline = PipelineConfig::resolve(&options).unwrap();
            assert_eq!(
                pipeline.process("[b]Grüße & more[/b]").unwrap(),
                "<b>Gr&uuml;&szlig;e &amp; more</b>"
            );
        }
    }
}
