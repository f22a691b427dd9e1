//! Rewrites applied to raw input before tag substitution.

use super::{replace_each, TextProcessor};

/// Converts Windows line endings (`\r\n`) to `\n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeLineEndings;

impl TextProcessor for NormalizeLineEndings {
    fn name(&self) -> &str {
        "normalize-line-endings"
    }

    fn apply(&self, text: &str) -> String {
        replace_each(text, "\r\n", "\n")
    }
}

/// Removes spaces and tabs directly in front of a newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimTrailingSpaces;

impl TextProcessor for TrimTrailingSpaces {
    fn name(&self) -> &str {
        "trim-trailing-spaces"
    }

    fn apply(&self, text: &str) -> String {
        let mut output = String::with_capacity(text.len());
        let mut lines = text.split('\n').peekable();
        while let Some(line) = lines.next() {
            if lines.peek().is_some() {
                output.push_str(line.trim_end_matches([' ', '\t']));
                output.push('\n');
            } else {
                output.push_str(line);
            }
        }
        output
    }
}

/// Collapses every run of two or more spaces into a single space.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseSpaces;

impl TextProcessor for CollapseSpaces {
    fn name(&self) -> &str {
        "collapse-spaces"
    }

    fn apply(&self, text: &str) -> String {
        let mut output = String::with_capacity(text.len());
        let mut previous_space = false;
        for ch in text.chars() {
            if ch == ' ' && previous_space {
                continue;
            }
            previous_space = ch == ' ';
            output.push(ch);
        }
        output
    }
}

/// Drops the newlines around list markup so lists add no stray line breaks.
///
/// One newline is removed after `[list]` (or `[list=...]`), before `[*]`, and
/// on both sides of `[/list]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListNewlines;

const LIST_RULES: &[NewlineRule] = &[
    NewlineRule::new("list", false, true),
    NewlineRule::new("*", true, false),
    NewlineRule::new("/list", true, true),
];

impl TextProcessor for ListNewlines {
    fn name(&self) -> &str {
        "list-newlines"
    }

    fn apply(&self, text: &str) -> String {
        strip_newlines_around(text, LIST_RULES)
    }
}

/// Drops one newline on each side of table row and cell tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableNewlines;

const TABLE_RULES: &[NewlineRule] = &[
    NewlineRule::new("tr", true, true),
    NewlineRule::new("/tr", true, true),
    NewlineRule::new("td", true, true),
    NewlineRule::new("/td", true, true),
];

impl TextProcessor for TableNewlines {
    fn name(&self) -> &str {
        "table-newlines"
    }

    fn apply(&self, text: &str) -> String {
        strip_newlines_around(text, TABLE_RULES)
    }
}

/// Which adjacent newlines a bracket tag swallows.
///
/// `tag` is the lowercase text between the brackets up to any `=`, so `"/tr"`
/// matches `[/TR]` and `"list"` matches `[list=1]`.
#[derive(Debug, Clone, Copy)]
struct NewlineRule {
    tag: &'static str,
    before: bool,
    after: bool,
}

impl NewlineRule {
    const fn new(tag: &'static str, before: bool, after: bool) -> Self {
        Self { tag, before, after }
    }
}

fn strip_newlines_around(text: &str, rules: &[NewlineRule]) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']').map(|offset| open + offset) else {
            break;
        };
        let content = &rest[open + 1..close];
        if let Some(inner) = content.rfind('[') {
            let split = open + 1 + inner;
            output.push_str(&rest[..split]);
            rest = &rest[split..];
            continue;
        }
        let name = content.split('=').next().unwrap_or(content);
        let rule = rules.iter().find(|rule| rule.tag.eq_ignore_ascii_case(name));

        output.push_str(&rest[..open]);
        if rule.is_some_and(|rule| rule.before) && output.ends_with('\n') {
            output.pop();
        }
        output.push_str(&rest[open..=close]);

        rest = &rest[close + 1..];
        if rule.is_some_and(|rule| rule.after) {
            rest = rest.strip_prefix('\n').unwrap_or(rest);
        }
    }

    output.push_str(rest);
    output
}
