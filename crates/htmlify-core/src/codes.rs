//! The built-in tag code library.
//!
//! [`default_tag_codes`] returns the codes htmlify registers, in registration
//! order, with void elements written for the configured standard, the trim
//! prefix attached to link targets and the configured ampersand policy.

use crate::config::Options;
use crate::error::Result;
use crate::tag_code::{Capture, TagCode};
use crate::template::Template;

/// Plain inline formatting tags, each rendered as the HTML element of the same name.
const INLINE_TAGS: &[&str] = &["b", "u", "i", "s", "sup", "sub"];

/// List types `<ol type="...">` accepts.
const LIST_TYPES: &[&str] = &["1", "a", "A", "i", "I"];

/// Separator between list items.
const LIST_ITEM: &str = "[*]";

/// Builds the default tag codes for `options`.
pub fn default_tag_codes(options: &Options) -> Result<Vec<TagCode>> {
    let void = options.standard.void_close();
    let trim = options.trim();
    let mut codes = Vec::new();

    for name in INLINE_TAGS {
        codes.push(TagCode::simple(name, &format!("<{name}>{{inner}}</{name}>"))?);
    }
    codes.push(TagCode::simple("indent", "<blockquote>{inner}</blockquote>")?);
    codes.push(TagCode::simple("center", "<center>{inner}</center>")?);
    for align in ["left", "right"] {
        codes.push(TagCode::simple(
            align,
            &format!("<div align=\"{align}\">{{inner}}</div>"),
        )?);
    }

    let img = TagCode::simple("img", &format!("<img src=\"{{inner}}\" alt=\"\"{void}"))?;
    codes.push(trim.decorate(img, Capture::Inner)?);
    let img = TagCode::advanced(
        "img",
        &format!("<img src=\"{{inner}}\" align=\"{{attribute}}\" alt=\"\"{void}"),
    )?;
    codes.push(trim.decorate(img, Capture::Inner)?);

    let url = TagCode::simple("url", "<a href=\"{inner}\" target=\"_blank\">{inner}</a>")?;
    codes.push(trim.decorate(url, Capture::Inner)?);
    let url = TagCode::advanced("url", "<a href=\"{attribute}\" target=\"_blank\">{inner}</a>")?;
    codes.push(trim.decorate(url, Capture::Attribute)?);

    for (name, attribute) in [("color", "color"), ("size", "size"), ("font", "face")] {
        codes.push(TagCode::advanced(
            name,
            &format!("<font {attribute}=\"{{attribute}}\">{{inner}}</font>"),
        )?);
    }

    if options.list_codes {
        codes.push(
            TagCode::simple("list", "<ul>{inner}</ul>")?.with_transform(Capture::Inner, list_items)?,
        );
        codes.push(
            TagCode::advanced("list", "<ol type=\"{attribute}\">{inner}</ol>")?
                .with_transform(Capture::Inner, list_items)?
                .with_transform(Capture::Attribute, list_type)?,
        );
    }

    let classes = &options.table_classes;
    let table_class = Template::escape_literal(classes.table());
    codes.push(TagCode::simple(
        "table",
        &format!("<table class=\"{table_class}\">{{inner}}</table>"),
    )?);
    let max_width = options.max_table_width;
    codes.push(
        TagCode::advanced(
            "table",
            &format!("<table class=\"{table_class}\"{{attribute}}>{{inner}}</table>"),
        )?
        .with_transform(Capture::Attribute, move |value| table_width(value, max_width))?,
    );
    codes.push(TagCode::simple(
        "tr",
        &format!(
            "<tr class=\"{}\">{{inner}}</tr>",
            Template::escape_literal(classes.row())
        ),
    )?);
    codes.push(TagCode::simple(
        "td",
        &format!(
            "<td class=\"{}\">{{inner}}</td>",
            Template::escape_literal(classes.cell())
        ),
    )?);

    codes.push(TagCode::standalone("hr", &format!("<hr{void}"))?);

    Ok(codes
        .into_iter()
        .map(|code| code.with_ampersand_policy(options.ampersands))
        .collect())
}

/// Wraps every `[*]` item in `<li>`, dropping empty items.
///
/// Text in front of the first item is kept unless blank. Content without any
/// item marker is returned unchanged.
fn list_items(content: &str) -> String {
    if !content.contains(LIST_ITEM) {
        return content.to_string();
    }

    let mut parts = content.split(LIST_ITEM);
    let mut output = String::with_capacity(content.len());
    if let Some(lead) = parts.next() {
        output.push_str(lead.trim());
    }
    for item in parts.map(str::trim).filter(|item| !item.is_empty()) {
        output.push_str("<li>");
        output.push_str(item);
        output.push_str("</li>");
    }
    output
}

/// Normalises an ordered list type, falling back to decimal numbering.
fn list_type(attribute: &str) -> String {
    let attribute = attribute.trim();
    let kind = LIST_TYPES
        .iter()
        .find(|kind| **kind == attribute)
        .unwrap_or(&LIST_TYPES[0]);
    kind.to_string()
}

/// Turns `[table=N]` into a width style, or nothing if `N` is out of range.
fn table_width(attribute: &str, max_width: u32) -> String {
    let value = attribute.trim();
    let digits = value.strip_suffix("px").unwrap_or(value);
    match digits.parse::<u32>() {
        Ok(width) if width > 0 && (max_width == 0 || width <= max_width) => {
            format!(" style=\"width: {width}px\"")
        }
        _ => {
            tracing::warn!(width = value, max_width, "discarding table width");
            String::new()
        }
    }
}
