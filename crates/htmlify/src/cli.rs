//! Command line definition and its translation into engine options.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use htmlify_core::{
    AmpersandPolicy, Options, Standard, TableClasses, DEFAULT_CELL_CLASS,
    DEFAULT_MAX_TABLE_WIDTH, DEFAULT_ROW_CLASS, DEFAULT_TABLE_CLASS,
};

use crate::error::CliError;
use crate::io::Encoding;

/// Converts BBCode-style tag codes in text files to HTML 4.01 or XHTML.
///
/// Every FILE is converted into FILE_htmlified next to it.
#[derive(Debug, Parser)]
#[command(
    name = "htmlify",
    version,
    about,
    disable_version_flag = true,
    disable_help_flag = true
)]
pub(crate) struct Cli {
    /// Text files to convert.
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Write HTML 4.01 (default).
    #[arg(long, visible_alias = "html4", conflicts_with = "xhtml")]
    html: bool,

    /// Write XHTML.
    #[arg(long, alias = "XHTML")]
    xhtml: bool,

    /// Strip PREFIX from [url] and [img] targets.
    #[arg(short, long, value_name = "PREFIX")]
    trim: Option<String>,

    /// Read input as UTF-8 instead of ISO-8859-1.
    #[arg(long, alias = "UTF-8")]
    utf8: bool,

    /// Leave [list] codes untouched.
    #[arg(long)]
    no_list: bool,

    /// Turn line breaks into <br> elements.
    #[arg(long, visible_alias = "breaks", conflicts_with = "no_br")]
    br: bool,

    /// Keep line breaks as they are (default).
    #[arg(long, visible_alias = "no-breaks")]
    no_br: bool,

    /// Keep runs of spaces instead of collapsing them.
    #[arg(long, visible_alias = "leave-spaces-alone")]
    no_space_trim: bool,

    /// Class of generated <table> elements.
    #[arg(long, value_name = "CLASS")]
    table: Option<String>,

    /// Class of generated <tr> elements.
    #[arg(long, value_name = "CLASS")]
    row: Option<String>,

    /// Class of generated <td> elements.
    #[arg(long, value_name = "CLASS")]
    cell: Option<String>,

    /// Use the standard classes grid_table, grid_tr and grid_td.
    #[arg(
        long,
        visible_aliases = ["classes", "default-classes"],
        conflicts_with_all = ["table", "row", "cell"]
    )]
    std_classes: bool,

    /// Widest table accepted in [table=WIDTH], 0 for no limit [default: 600].
    #[arg(
        long,
        visible_alias = "width-limit",
        value_name = "WIDTH",
        conflicts_with = "no_table_limit"
    )]
    max_table_width: Option<u32>,

    /// Accept tables of any width.
    #[arg(long)]
    no_table_limit: bool,

    /// Do not escape ampersands that start an HTML entity.
    #[arg(long)]
    preserve_entities: bool,

    /// Log debug details.
    #[arg(long)]
    pub(crate) verbose: bool,

    /// Print version.
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Print help.
    #[arg(short = 'h', long, short_alias = '?', action = ArgAction::Help)]
    help: Option<bool>,
}

impl Cli {
    /// Builds the engine options from the flags.
    pub(crate) fn options(&self) -> Result<Options, CliError> {
        let table_classes = if self.std_classes {
            TableClasses::default()
        } else {
            TableClasses::new(
                self.table.as_deref().unwrap_or(DEFAULT_TABLE_CLASS),
                self.row.as_deref().unwrap_or(DEFAULT_ROW_CLASS),
                self.cell.as_deref().unwrap_or(DEFAULT_CELL_CLASS),
            )
            .map_err(|err| CliError::Parameter(err.to_string()))?
        };

        let max_table_width = if self.no_table_limit {
            0
        } else {
            self.max_table_width.unwrap_or(DEFAULT_MAX_TABLE_WIDTH)
        };

        Ok(Options {
            standard: if self.xhtml {
                Standard::Xhtml
            } else {
                Standard::Html4
            },
            trim_prefix: self.trim.clone().unwrap_or_default(),
            list_codes: !self.no_list,
            line_breaks: self.br,
            space_trim: !self.no_space_trim,
            table_classes,
            max_table_width,
            ampersands: if self.preserve_entities {
                AmpersandPolicy::PreserveEntities
            } else {
                AmpersandPolicy::Unconditional
            },
        })
    }

    /// Input decoding selected on the command line.
    pub(crate) fn encoding(&self) -> Encoding {
        if self.utf8 {
            Encoding::Utf8
        } else {
            Encoding::Latin1
        }
    }

    /// The input files in processing order.
    ///
    /// Every file must exist and be named only once. Files are ordered by their full path string, so `a.txt` comes
    /// before `a/b`.
    pub(crate) fn inputs(&self) -> Result<Vec<PathBuf>, CliError> {
        let mut seen = BTreeSet::new();
        for path in &self.files {
            if !path.is_file() {
                return Err(CliError::MissingFile(path.clone()));
            }
            if !seen.insert(path.as_os_str()) {
                return Err(CliError::DuplicateFile(path.clone()));
            }
        }
        Ok(seen.into_iter().map(PathBuf::from).collect())
    }
}
