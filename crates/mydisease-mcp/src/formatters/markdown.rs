//! Markdown output formatting.

use std::borrow::Cow;

use super::Table;

/// Format a table as a GitHub-flavored Markdown table.
#[must_use]
pub fn format_table_markdown(table: &Table) -> String {
    let mut output = String::new();

    push_row(&mut output, &table.header);

    output.push('|');
    for _ in &table.header {
        output.push_str(" --- |");
    }
    output.push('\n');

    for row in &table.rows {
        push_row(&mut output, row);
    }

    output
}

fn push_row(output: &mut String, cells: &[String]) {
    output.push('|');
    for cell in cells {
        output.push(' ');
        output.push_str(&escape_cell(cell));
        output.push_str(" |");
    }
    output.push('\n');
}

/// Escape pipes and line breaks so a value stays inside its cell.
#[must_use]
pub fn escape_cell(value: &str) -> Cow<'_, str> {
    if !value.contains(['|', '\\', '\n', '\r']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '|' => escaped.push_str("\\|"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                escaped.push_str("<br>");
            }
            '\n' => escaped.push_str("<br>"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("plain"), "plain");
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell("one\r\ntwo\nthree"), "one<br>two<br>three");
        assert_eq!(escape_cell("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_table_layout() {
        let table = Table {
            header: vec!["identifier".into(), "status".into()],
            rows: vec![vec!["X".into(), "not_found".into()]],
        };
        assert_eq!(
            format_table_markdown(&table),
            "| identifier | status |\n| --- | --- |\n| X | not_found |\n"
        );
    }
}
