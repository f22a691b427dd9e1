//! Rewrites applied to the rendered HTML or XHTML.

use super::{replace_each, TextProcessor};
use crate::config::{DEFAULT_CELL_CLASS, DEFAULT_ROW_CLASS};

/// Indents generated table markup: rows by two spaces, cells by four.
///
/// Rows and cells are recognised by their class attributes, so the classes
/// must match the ones the table tag codes render with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIndent {
    rewrites: Vec<(String, String)>,
}

impl TableIndent {
    pub fn new(row_class: &str, cell_class: &str) -> Self {
        let row = format!("<tr class=\"{row_class}\">");
        let cell = format!("<td class=\"{cell_class}\">");
        let rewrites = vec![
            (format!("\n{row}\n"), format!("\n  {row}\n")),
            ("\n</tr>\n".to_string(), "\n  </tr>\n".to_string()),
            (format!("\n{cell}"), format!("\n    {cell}")),
            ("><tr".to_string(), ">\n  <tr".to_string()),
            ("><td".to_string(), ">\n    <td".to_string()),
            ("></tr>".to_string(), ">\n  </tr>".to_string()),
            ("></table>".to_string(), ">\n</table>".to_string()),
        ];
        Self { rewrites }
    }
}

impl Default for TableIndent {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_CLASS, DEFAULT_CELL_CLASS)
    }
}

impl TextProcessor for TableIndent {
    fn name(&self) -> &str {
        "table-indent"
    }

    fn apply(&self, text: &str) -> String {
        self.rewrites
            .iter()
            .fold(text.to_string(), |current, (needle, replacement)| {
                replace_each(&current, needle, replacement)
            })
    }
}

/// Moves newlines out of a block wrapper so it hugs its content.
///
/// `<center>\ntext\n</center>` becomes `\n<center>text</center>\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HugBlockTag {
    open: String,
    close: String,
}

impl HugBlockTag {
    pub fn new(tag: &str) -> Self {
        Self {
            open: format!("<{tag}>"),
            close: format!("</{tag}>"),
        }
    }
}

impl TextProcessor for HugBlockTag {
    fn name(&self) -> &str {
        "hug-block-tag"
    }

    fn apply(&self, text: &str) -> String {
        let opened = replace_each(
            text,
            &format!("{}\n", self.open),
            &format!("\n{}", self.open),
        );
        replace_each(
            &opened,
            &format!("\n{}", self.close),
            &format!("{}\n", self.close),
        )
    }
}
