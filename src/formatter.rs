//! Printable rendering of values for failure messages.

use std::fmt::{self, Write};

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::value::{ObjectId, Value};

/// Display columns a rendered value may take before it is cut.
pub const MAX_WIDTH: usize = 300;

/// Object nesting rendered before members are elided.
pub const MAX_DEPTH: usize = 4;

const ELLIPSIS: &str = "…";

/// Formats `value` for inclusion in a failure message.
///
/// Cyclic object graphs are rendered once per branch; output wider than
/// [`MAX_WIDTH`] columns is truncated at a grapheme boundary.
pub fn format_value(value: &Value) -> String {
    let mut output = String::new();
    let mut visiting = Vec::new();
    // writing into a String cannot fail
    let _ = write_value(&mut output, value, 0, &mut visiting);
    truncate(output, MAX_WIDTH)
}

fn write_value(
    output: &mut String,
    value: &Value,
    depth: usize,
    visiting: &mut Vec<ObjectId>,
) -> fmt::Result {
    match value {
        Value::Null => output.push_str("<null>"),
        Value::Bool(b) => write!(output, "{}", b)?,
        Value::Int(i) => write!(output, "{}", i)?,
        Value::UInt(u) => write!(output, "{}", u)?,
        Value::Float(f) => write!(output, "{:?}", f)?,
        Value::Char(c) => write!(output, "'{}'", c)?,
        Value::Text(text) => write!(output, "\"{}\"", text)?,
        Value::DateTime(dt) => write!(output, "<{}>", dt.format("%Y-%m-%d %H:%M:%S%.f %:z"))?,
        Value::Enum(e) => write!(output, "{}::{}", e.type_info(), e.variant())?,
        Value::Sequence(items) => {
            if items.is_empty() {
                output.push_str("{empty}");
                return Ok(());
            }
            output.push('{');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    output.push_str(", ");
                }
                write_value(output, item, depth, visiting)?;
            }
            output.push('}');
        }
        Value::Map(entries) => {
            if entries.is_empty() {
                output.push_str("{empty}");
                return Ok(());
            }
            output.push('{');
            for (idx, (key, item)) in entries.iter().enumerate() {
                if idx > 0 {
                    output.push_str(", ");
                }
                output.push('[');
                write_value(output, key, depth, visiting)?;
                output.push_str("] = ");
                write_value(output, item, depth, visiting)?;
            }
            output.push('}');
        }
        Value::Object(object) => {
            let type_name = object.type_info().short_name();
            let id = object.id();
            if visiting.contains(&id) {
                write!(output, "{{cyclic reference to {}}}", type_name)?;
                return Ok(());
            }
            if depth >= MAX_DEPTH {
                write!(output, "{} {{ … }}", type_name)?;
                return Ok(());
            }

            let descriptor = object.descriptor();
            let members: Vec<_> = descriptor
                .members()
                .iter()
                .filter(|m| m.is_readable() && !m.is_indexer())
                .collect();
            if members.is_empty() {
                output.push_str(&type_name);
                return Ok(());
            }

            visiting.push(id);
            write!(output, "{} {{ ", type_name)?;
            for (idx, member) in members.iter().enumerate() {
                if idx > 0 {
                    output.push_str(", ");
                }
                write!(output, "{} = ", member.name())?;
                match object.get(member.name()) {
                    Some(item) => write_value(output, &item, depth + 1, visiting)?,
                    None => output.push_str("<unreadable>"),
                }
            }
            output.push_str(" }");
            visiting.pop();
        }
    }
    Ok(())
}

fn truncate(text: String, max_width: usize) -> String {
    if UnicodeWidthStr::width(text.as_str()) <= max_width {
        return text;
    }

    let budget = max_width.saturating_sub(UnicodeWidthStr::width(ELLIPSIS));
    let mut width = 0;
    let mut output = String::new();
    for grapheme in text.graphemes(true) {
        let grapheme_width = UnicodeWidthStr::width(grapheme);
        if width + grapheme_width > budget {
            break;
        }
        width += grapheme_width;
        output.push_str(grapheme);
    }
    output.push_str(ELLIPSIS);
    output
}
