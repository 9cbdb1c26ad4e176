//! Minimal CSV codec for worksheet tables.

use std::io::{self, Write};

/// Splits `content` into rows of fields. Handles quoted fields, doubled
/// quotes, embedded commas/newlines, and CRLF line endings.
pub(crate) fn parse(content: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                // CR is part of a CRLF terminator; LF ends the row.
                '\r' => {}
                '\n' => {
                    fields.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut fields));
                }
                _ => field.push(c),
            }
        }
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        rows.push(fields);
    }
    rows
}

/// Wraps a field in quotes when it contains a comma, quote, or newline.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Writes one row, escaping fields as needed.
pub(crate) fn write_row<W: Write>(out: &mut W, fields: &[String]) -> io::Result<()> {
    let escaped: Vec<String> = fields.iter().map(|f| escape(f)).collect();
    writeln!(out, "{}", escaped.join(","))
}
