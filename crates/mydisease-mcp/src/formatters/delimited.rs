//! CSV and TSV output.

use std::borrow::Cow;

use super::Table;

/// Render a table with the given delimiter, one `\n`-terminated line per row.
#[must_use]
pub fn format_delimited(table: &Table, delimiter: char) -> String {
    let mut output = String::new();
    push_line(&mut output, &table.header, delimiter);
    for row in &table.rows {
        push_line(&mut output, row, delimiter);
    }
    output
}

fn push_line(output: &mut String, cells: &[String], delimiter: char) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            output.push(delimiter);
        }
        output.push_str(&escape_cell(cell, delimiter));
    }
    output.push('\n');
}

/// Quote a cell containing the delimiter, a quote, or a line break,
/// doubling embedded quotes.
#[must_use]
pub fn escape_cell(value: &str, delimiter: char) -> Cow<'_, str> {
    if value.contains(delimiter) || value.contains(['"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("plain", ','), "plain");
        assert_eq!(escape_cell("a,b", ','), "\"a,b\"");
        assert_eq!(escape_cell("a,b", '\t'), "a,b");
        assert_eq!(escape_cell("tab\there", '\t'), "\"tab\there\"");
        assert_eq!(escape_cell("say \"hi\"", ','), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_cell("two\nlines", ','), "\"two\nlines\"");
    }

    #[test]
    fn test_header_only_table() {
        let table = Table { header: vec!["identifier".into(), "status".into()], rows: vec![] };
        assert_eq!(format_delimited(&table, ','), "identifier,status\n");
    }
}
