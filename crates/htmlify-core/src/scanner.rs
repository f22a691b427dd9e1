//! Bracket tag scanner driving the registered tag codes.
//!
//! The scanner tokenizes `[tag]content[/tag]` markup, pairs opening and
//! closing tags, and renders every occurrence through its [`TagCode`]. The
//! pre-processors run on the raw text first, the post-processors on the
//! rendered result.
//!
//! # Example
//!
//! ```rust
//! use htmlify_core::{Scanner, Standard, TagCode};
//!
//! let mut scanner = Scanner::new();
//! scanner.register_tag_code(TagCode::simple("b", "<b>{inner}</b>").unwrap()).unwrap();
//!
//! let output = scanner.parse("[B]Hello & welcome[/B]", Standard::Html4, false).unwrap();
//! assert_eq!(output, "<b>Hello &amp; welcome</b>");
//! ```
//!
//! # Tag Syntax
//!
//! - `[name]`, `[name=attribute]` and `[/name]`, names matched case-insensitively
//! - names start with an ASCII letter, followed by letters or digits
//! - an attribute wrapped in double quotes loses the quotes
//! - anything else in brackets, such as `[*]` or `[1]`, is plain text
//!
//! # Nesting
//!
//! Occurrences are rendered innermost first. Inside the `inner` capture of an
//! enclosing tag, nested output is represented by opaque markers. All markers
//! are expanded in a single pass once the whole input has been rendered. As a
//! result each piece of authored text is ampersand-escaped exactly once, by the
//! innermost tag around it, and text outside every tag is left as is. Marker
//! characters already present in the input are shielded before scanning and
//! come out unchanged.
//!
//! Every step is linear in the input: closing tags are paired in one pass up
//! front, and open tags are counted per name.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::config::Standard;
use crate::error::Result;
use crate::processor::{replace_each, ProcessorChain, TextProcessor};
use crate::registry::TagRegistry;
use crate::tag_code::{is_valid_tag_name, Capture, Captures, TagCode};

/// Opens a nested-output marker. Private Use Area, never produced by decoding
/// Latin-1 input.
const MARKER_OPEN: char = '\u{E000}';
/// Closes a nested-output marker.
const MARKER_CLOSE: char = '\u{E001}';

/// Tag codes plus the processor chains around them.
#[derive(Debug, Default)]
pub struct Scanner {
    registry: TagRegistry,
    pre: ProcessorChain,
    post: ProcessorChain,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tag code. Fails on a duplicate name and attribute form.
    pub fn register_tag_code(&mut self, code: TagCode) -> Result<()> {
        self.registry.register(code)
    }

    /// Appends a processor run on the raw text before substitution.
    pub fn register_pre_processor(&mut self, processor: impl TextProcessor + 'static) {
        self.pre.push(processor);
    }

    /// Appends a processor run on the rendered text after substitution.
    pub fn register_post_processor(&mut self, processor: impl TextProcessor + 'static) {
        self.post.push(processor);
    }

    /// Replaces the pre-processor chain.
    pub fn set_pre_processors(&mut self, chain: ProcessorChain) {
        self.pre = chain;
    }

    /// Replaces the post-processor chain.
    pub fn set_post_processors(&mut self, chain: ProcessorChain) {
        self.post = chain;
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn pre_processors(&self) -> &ProcessorChain {
        &self.pre
    }

    pub fn post_processors(&self) -> &ProcessorChain {
        &self.post
    }

    /// Converts raw tagged text into markup.
    ///
    /// Runs the pre-processors, substitutes tags, turns newlines into line
    /// breaks when `line_breaks` is set, then runs the post-processors.
    pub fn parse(&self, raw: &str, standard: Standard, line_breaks: bool) -> Result<String> {
        let prepared = self.pre.run(raw);
        let mut rendered = self.substitute(&prepared)?;
        if line_breaks {
            rendered = replace_each(&rendered, "\n", &format!("{}\n", standard.line_break()));
        }
        Ok(self.post.run(&rendered))
    }

    /// Substitutes all recognised tag occurrences, without any processors.
    pub fn substitute(&self, input: &str) -> Result<String> {
        let mut arena = Arena::default();
        let shielded = arena.shield(input);
        let tokens: Vec<Token> = Tokenizer::new(&shielded).collect();
        let closable = self.closable_openings(&tokens);

        let mut root = String::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut open: HashMap<String, usize> = HashMap::new();

        for (i, token) in tokens.iter().enumerate() {
            match *token {
                Token::Text(text) => current(&mut root, &mut stack).push_str(text),
                Token::Open {
                    raw,
                    name,
                    attribute,
                } => {
                    let code = self.registry.lookup(name, attribute.is_some());
                    match code {
                        Some(code) if !code.kind().has_closing_tag() => {
                            let rendered = code.render(&Captures::new())?;
                            let marker = arena.insert(Piece::Markup(rendered));
                            current(&mut root, &mut stack).push_str(&marker);
                        }
                        Some(code) if closable[i] => {
                            *open.entry(name.to_ascii_lowercase()).or_default() += 1;
                            stack.push(Frame {
                                name,
                                code,
                                attribute,
                                body: String::new(),
                            });
                        }
                        _ => current(&mut root, &mut stack).push_str(raw),
                    }
                }
                Token::Close { raw, name } => {
                    let is_open = open
                        .get(&name.to_ascii_lowercase())
                        .is_some_and(|count| *count > 0);
                    let position = if is_open {
                        stack
                            .iter()
                            .rposition(|frame| frame.name.eq_ignore_ascii_case(name))
                    } else {
                        None
                    };
                    match position {
                        Some(position) => {
                            // Tags opened inside the closed one end with it.
                            while stack.len() > position {
                                close_frame(&mut root, &mut stack, &mut arena, &mut open)?;
                            }
                        }
                        None => current(&mut root, &mut stack).push_str(raw),
                    }
                }
            }
        }

        while !stack.is_empty() {
            close_frame(&mut root, &mut stack, &mut arena, &mut open)?;
        }

        Ok(arena.expand(&root))
    }

    /// Marks the opening tags that have a closing tag later on.
    ///
    /// Per tag name, an opening tag is closable if the running depth after it
    /// drops below its own depth at some later closing tag. Openings the
    /// registry would not honour do not count towards the depth.
    fn closable_openings(&self, tokens: &[Token]) -> Vec<bool> {
        let mut events: HashMap<String, Vec<(usize, bool)>> = HashMap::new();
        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::Open {
                    name, attribute, ..
                } => {
                    let pairs = self
                        .registry
                        .lookup(name, attribute.is_some())
                        .is_some_and(|code| code.kind().has_closing_tag());
                    if pairs {
                        events
                            .entry(name.to_ascii_lowercase())
                            .or_default()
                            .push((i, true));
                    }
                }
                Token::Close { name, .. } => events
                    .entry(name.to_ascii_lowercase())
                    .or_default()
                    .push((i, false)),
                Token::Text(_) => {}
            }
        }

        let mut closable = vec![false; tokens.len()];
        for events in events.values() {
            let mut depth: i64 = 0;
            let depths: Vec<i64> = events
                .iter()
                .map(|&(_, opens)| {
                    depth += if opens { 1 } else { -1 };
                    depth
                })
                .collect();

            let mut lowest_after = i64::MAX;
            for (&(index, opens), &depth) in events.iter().zip(&depths).rev() {
                if opens && lowest_after < depth {
                    closable[index] = true;
                }
                lowest_after = lowest_after.min(depth);
            }
        }
        closable
    }
}

/// An open tag waiting for its closing tag.
struct Frame<'t, 'c> {
    name: &'t str,
    code: &'c TagCode,
    attribute: Option<&'t str>,
    body: String,
}

fn current<'a>(root: &'a mut String, stack: &'a mut [Frame]) -> &'a mut String {
    match stack.last_mut() {
        Some(frame) => &mut frame.body,
        None => root,
    }
}

/// Renders the innermost open tag and hands its output to the enclosing body.
fn close_frame(
    root: &mut String,
    stack: &mut Vec<Frame>,
    arena: &mut Arena,
    open: &mut HashMap<String, usize>,
) -> Result<()> {
    let Some(frame) = stack.pop() else {
        return Ok(());
    };
    if let Some(count) = open.get_mut(&frame.name.to_ascii_lowercase()) {
        *count = count.saturating_sub(1);
    }

    let mut captures = Captures::new();
    captures.insert(Capture::Inner, frame.body);
    if let Some(attribute) = frame.attribute {
        captures.insert(Capture::Attribute, attribute.to_string());
    }

    let rendered = frame.code.render(&captures)?;
    let marker = arena.insert(Piece::Markup(rendered));
    current(root, stack).push_str(&marker);
    Ok(())
}

/// What a marker stands for.
enum Piece {
    /// Rendered output of one occurrence, possibly holding further markers.
    Markup(String),
    /// A marker character that was part of the input.
    Literal(char),
}

/// Storage for everything markers refer to.
#[derive(Default)]
struct Arena {
    pieces: Vec<Piece>,
}

impl Arena {
    /// Stores `piece` and returns the marker standing for it.
    fn insert(&mut self, piece: Piece) -> String {
        let marker = format!("{MARKER_OPEN}{}{MARKER_CLOSE}", self.pieces.len());
        self.pieces.push(piece);
        marker
    }

    /// Replaces marker characters of the input with markers of their own.
    fn shield<'a>(&mut self, input: &'a str) -> Cow<'a, str> {
        let is_marker = |ch: char| ch == MARKER_OPEN || ch == MARKER_CLOSE;
        if !input.contains(is_marker) {
            return Cow::Borrowed(input);
        }

        let mut shielded = String::with_capacity(input.len());
        for ch in input.chars() {
            if is_marker(ch) {
                shielded.push_str(&self.insert(Piece::Literal(ch)));
            } else {
                shielded.push(ch);
            }
        }
        Cow::Owned(shielded)
    }

    /// Expands all markers in `text`, nested ones included, left to right.
    fn expand(&self, text: &str) -> String {
        let mut output = String::with_capacity(text.len());
        let mut pending: Vec<&str> = vec![text];

        while let Some(text) = pending.pop() {
            let Some(start) = text.find(MARKER_OPEN) else {
                output.push_str(text);
                continue;
            };
            output.push_str(&text[..start]);

            let rest = &text[start + MARKER_OPEN.len_utf8()..];
            let piece = rest.find(MARKER_CLOSE).and_then(|end| {
                let index = rest[..end].parse::<usize>().ok()?;
                Some((self.pieces.get(index)?, &rest[end + MARKER_CLOSE.len_utf8()..]))
            });
            match piece {
                Some((Piece::Markup(markup), after)) => {
                    pending.push(after);
                    pending.push(markup);
                }
                Some((Piece::Literal(ch), after)) => {
                    output.push(*ch);
                    pending.push(after);
                }
                None => {
                    output.push(MARKER_OPEN);
                    pending.push(rest);
                }
            }
        }
        output
    }
}

/// Token types produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// Plain text, including brackets that do not form a tag.
    Text(&'a str),
    /// `[name]` or `[name=attribute]`
    Open {
        raw: &'a str,
        name: &'a str,
        attribute: Option<&'a str>,
    },
    /// `[/name]`
    Close { raw: &'a str, name: &'a str },
}

/// Tokenizer for bracket tags.
struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Interprets the text between `[` and `]`.
    fn classify(raw: &'a str, content: &'a str) -> Token<'a> {
        if let Some(name) = content.strip_prefix('/') {
            if is_valid_tag_name(name) {
                return Token::Close { raw, name };
            }
            return Token::Text(raw);
        }

        let (name, attribute) = match content.split_once('=') {
            Some((name, value)) => (name, Some(unquote(value))),
            None => (content, None),
        };
        if is_valid_tag_name(name) {
            Token::Open {
                raw,
                name,
                attribute,
            }
        } else {
            Token::Text(raw)
        }
    }
}

/// Strips one pair of surrounding double quotes.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.pos..];

        let Some(bracket_pos) = remaining.find('[') else {
            self.pos = self.input.len();
            return Some(Token::Text(remaining));
        };

        if bracket_pos > 0 {
            self.pos += bracket_pos;
            return Some(Token::Text(&remaining[..bracket_pos]));
        }

        let Some(close_bracket) = remaining.find(']') else {
            self.pos = self.input.len();
            return Some(Token::Text(remaining));
        };

        let content = &remaining[1..close_bracket];
        if let Some(inner_open) = content.rfind('[') {
            // "[[b]": the first bracket is text, the tag starts later.
            let split = inner_open + 1;
            self.pos += split;
            return Some(Token::Text(&remaining[..split]));
        }

        self.pos += close_bracket + 1;
        Some(Self::classify(&remaining[..=close_bracket], content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{CollapseSpaces, TableIndent};

    fn scanner() -> Scanner {
        let mut scanner = Scanner::new();
        for code in [
            TagCode::simple("b", "<b>{inner}</b>"),
            TagCode::simple("i", "<i>{inner}</i>"),
            TagCode::simple("url", "<a href=\"{inner}\">{inner}</a>"),
            TagCode::advanced("url", "<a href=\"{attribute}\">{inner}</a>"),
            TagCode::standalone("hr", "<hr>"),
        ] {
            scanner.register_tag_code(code.unwrap()).unwrap();
        }
        scanner
    }

    fn substitute(input: &str) -> String {
        scanner().substitute(input).unwrap()
    }

    mod substitution {
        use super::*;

        #[test]
        fn plain_text_unchanged() {
            assert_eq!(substitute("hello & world"), "hello & world");
        }

        #[test]
        fn simple_tag() {
            assert_eq!(
                substitute("[B]Hello & welcome[/B]"),
                "<b>Hello &amp; welcome</b>"
            );
        }

        #[test]
        fn mixed_case_pairs() {
            assert_eq!(substitute("[b]x[/B] [I]y[/i]"), "<b>x</b> <i>y</i>");
        }

        #[test]
        fn advanced_tag() {
            assert_eq!(
                substitute("[url=http://a.b/?x=1&y=2]link[/url]"),
                "<a href=\"http://a.b/?x=1&amp;y=2\">link</a>"
            );
        }

        #[test]
        fn quoted_attribute() {
            assert_eq!(
                substitute("[url=\"http://a.b/\"]link[/url]"),
                "<a href=\"http://a.b/\">link</a>"
            );
        }

        #[test]
        fn simple_and_advanced_forms() {
            assert_eq!(
                substitute("[url]http://a.b/[/url] [url=http://c.d/]cd[/url]"),
                "<a href=\"http://a.b/\">http://a.b/</a> <a href=\"http://c.d/\">cd</a>"
            );
        }

        #[test]
        fn standalone_tag() {
            assert_eq!(substitute("above[HR]below"), "above<hr>below");
        }

        #[test]
        fn text_around_tags_not_escaped() {
            assert_eq!(substitute("a & [b]b & c[/b] & d"), "a & <b>b &amp; c</b> & d");
        }

        #[test]
        fn empty_content() {
            assert_eq!(substitute("[b][/b]"), "<b></b>");
        }

        #[test]
        fn multiline_content() {
            assert_eq!(substitute("[b]line1\nline2[/b]"), "<b>line1\nline2</b>");
        }
    }

    mod nesting {
        use super::*;

        #[test]
        fn nested_tags() {
            assert_eq!(substitute("[b][i]x[/i][/b]"), "<b><i>x</i></b>");
        }

        #[test]
        fn nested_text_escaped_once() {
            assert_eq!(
                substitute("[b]a & [i]b & c[/i] & d[/b]"),
                "<b>a &amp; <i>b &amp; c</i> &amp; d</b>"
            );
        }

        #[test]
        fn same_tag_nested() {
            assert_eq!(substitute("[b]a[b]b[/b]c[/b]"), "<b>a<b>b</b>c</b>");
        }

        #[test]
        fn nested_link_text() {
            assert_eq!(
                substitute("[url=http://x/][b]bold[/b] link[/url]"),
                "<a href=\"http://x/\"><b>bold</b> link</a>"
            );
        }

        #[test]
        fn adjacent_and_standalone_inside() {
            assert_eq!(
                substitute("[b]a[hr]b[/b][i]c[/i]"),
                "<b>a<hr>b</b><i>c</i>"
            );
        }

        #[test]
        fn overlapping_tags_auto_close() {
            assert_eq!(substitute("[b][i]x[/b][/i]"), "<b><i>x</i></b>[/i]");
        }
    }

    mod passthrough {
        use super::*;

        #[test]
        fn unknown_tags_kept() {
            assert_eq!(
                substitute("[quote]a & [b]b[/b][/quote]"),
                "[quote]a & <b>b</b>[/quote]"
            );
        }

        #[test]
        fn unclosed_tag_kept() {
            assert_eq!(substitute("[b]hello"), "[b]hello");
        }

        #[test]
        fn orphan_close_kept() {
            assert_eq!(substitute("hello[/b]"), "hello[/b]");
        }

        #[test]
        fn attribute_on_simple_only_tag_kept() {
            assert_eq!(substitute("[b=1]x[/b]"), "[b=1]x[/b]");
        }

        #[test]
        fn standalone_with_attribute_kept() {
            assert_eq!(substitute("[hr=2]"), "[hr=2]");
        }

        #[test]
        fn invalid_tag_syntax_kept() {
            assert_eq!(substitute("[*]item [1] [ ] [b c]"), "[*]item [1] [ ] [b c]");
        }

        #[test]
        fn unclosed_bracket() {
            assert_eq!(substitute("hello [b world"), "hello [b world");
        }

        #[test]
        fn doubled_bracket() {
            assert_eq!(substitute("[[b]x[/b]]"), "[<b>x</b>]");
        }

        #[test]
        fn empty_input() {
            assert_eq!(substitute(""), "");
        }

        #[test]
        fn unhonoured_opening_does_not_take_close() {
            assert_eq!(substitute("[b]x[b=1]y[/b]"), "<b>x[b=1]y</b>");
        }

        #[test]
        fn marker_characters_in_input_kept() {
            let input = "literal \u{E000}0\u{E001} then [b]x[/b]";
            assert_eq!(
                substitute(input),
                "literal \u{E000}0\u{E001} then <b>x</b>"
            );
        }

        #[test]
        fn marker_characters_inside_tag_kept() {
            assert_eq!(
                substitute("[b]\u{E000}[i]1[/i]\u{E001}[/b]"),
                "<b>\u{E000}<i>1</i>\u{E001}</b>"
            );
        }
    }

    mod scaling {
        use super::*;
        use std::time::{Duration, Instant};

        const LIMIT: Duration = Duration::from_secs(5);
        const COUNT: usize = 100_000;

        fn timed(input: &str) -> String {
            let started = Instant::now();
            let output = substitute(input);
            assert!(started.elapsed() < LIMIT, "took {:?}", started.elapsed());
            output
        }

        #[test]
        fn many_standalone_tags() {
            let output = timed(&"[hr]".repeat(COUNT));
            assert_eq!(output, "<hr>".repeat(COUNT));
        }

        #[test]
        fn many_unclosed_tags() {
            let input = "[b]".repeat(COUNT);
            assert_eq!(timed(&input), input);
        }

        #[test]
        fn many_orphan_closes() {
            let input = "[/b]".repeat(COUNT);
            assert_eq!(timed(&input), input);
        }

        #[test]
        fn deep_nesting() {
            let input = format!("{}x{}", "[b]".repeat(COUNT), "[/b]".repeat(COUNT));
            let expected = format!("{}x{}", "<b>".repeat(COUNT), "</b>".repeat(COUNT));
            assert_eq!(timed(&input), expected);
        }

        #[test]
        fn many_siblings() {
            let output = timed(&"[i]y[/i]".repeat(COUNT));
            assert_eq!(output, "<i>y</i>".repeat(COUNT));
        }
    }

    mod pipeline {
        use super::*;

        #[test]
        fn line_breaks_html4() {
            let output = scanner().parse("a\n[b]b[/b]\n", Standard::Html4, true).unwrap();
            assert_eq!(output, "a<br>\n<b>b</b><br>\n");
        }

        #[test]
        fn line_breaks_xhtml() {
            let output = scanner().parse("a\nb", Standard::Xhtml, true).unwrap();
            assert_eq!(output, "a<br />\nb");
        }

        #[test]
        fn line_breaks_off() {
            let output = scanner().parse("a\nb", Standard::Xhtml, false).unwrap();
            assert_eq!(output, "a\nb");
        }

        #[test]
        fn pre_processors_see_raw_text() {
            let mut scanner = scanner();
            scanner.register_pre_processor(CollapseSpaces);
            let output = scanner.parse("[b]a   b[/b]  c", Standard::Html4, false).unwrap();
            assert_eq!(output, "<b>a b</b> c");
        }

        #[test]
        fn post_processors_see_markup() {
            let mut scanner = scanner();
            scanner
                .register_tag_code(TagCode::simple("table", "<table>{inner}</table>").unwrap())
                .unwrap();
            scanner
                .register_tag_code(
                    TagCode::simple("tr", "<tr class=\"grid_tr\">{inner}</tr>").unwrap(),
                )
                .unwrap();
            scanner.register_post_processor(TableIndent::default());
            let output = scanner
                .parse("[table][tr]x[/tr][/table]", Standard::Html4, false)
                .unwrap();
            assert_eq!(output, "<table>\n  <tr class=\"grid_tr\">x</tr>\n</table>");
            assert_eq!(scanner.post_processors().names(), vec!["table-indent"]);
        }

        #[test]
        fn duplicate_registration_fails() {
            let mut scanner = scanner();
            assert!(scanner
                .register_tag_code(TagCode::simple("B", "<strong>{inner}</strong>").unwrap())
                .is_err());
            assert_eq!(scanner.registry().len(), 5);
        }
    }

    mod tokenizer {
        use super::*;

        #[test]
        fn tokenize_mixed() {
            let tokens: Vec<_> = Tokenizer::new("a[b]c[/b]d").collect();
            assert_eq!(
                tokens,
                vec![
                    Token::Text("a"),
                    Token::Open {
                        raw: "[b]",
                        name: "b",
                        attribute: None
                    },
                    Token::Text("c"),
                    Token::Close {
                        raw: "[/b]",
                        name: "b"
                    },
                    Token::Text("d"),
                ]
            );
        }

        #[test]
        fn tokenize_attribute() {
            let tokens: Vec<_> = Tokenizer::new("[url=a=b]").collect();
            assert_eq!(
                tokens,
                vec![Token::Open {
                    raw: "[url=a=b]",
                    name: "url",
                    attribute: Some("a=b")
                }]
            );
        }

        #[test]
        fn tokenize_empty_attribute() {
            let tokens: Vec<_> = Tokenizer::new("[url=]").collect();
            assert_eq!(
                tokens,
                vec![Token::Open {
                    raw: "[url=]",
                    name: "url",
                    attribute: Some("")
                }]
            );
        }

        #[test]
        fn tokenize_invalid() {
            let tokens: Vec<_> = Tokenizer::new("[*][/1]").collect();
            assert_eq!(tokens, vec![Token::Text("[*]"), Token::Text("[/1]")]);
        }

        #[test]
        fn tokenize_doubled_bracket() {
            let tokens: Vec<_> = Tokenizer::new("[[b]").collect();
            assert_eq!(
                tokens,
                vec![
                    Token::Text("["),
                    Token::Open {
                        raw: "[b]",
                        name: "b",
                        attribute: None
                    },
                ]
            );
        }
    }
}
