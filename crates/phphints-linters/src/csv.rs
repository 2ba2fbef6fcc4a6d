//! Minimal CSV reading and writing for the ruleset registry
//!
//! Comma separated, `"` quoting, doubled quotes inside quoted fields, and
//! either LF or CRLF row endings. Fields are quoted only when they contain
//! a comma, a quote or a line break.

/// A quoted field was still open at the end of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnterminatedQuote {
    /// One-based line on which the open field started
    pub line: usize,
}

/// A parsed row together with the one-based line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Parse every non-empty row of `input`
pub fn parse(input: &str) -> Result<Vec<Record>, UnterminatedQuote> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut row_has_content = false;
    let mut line = 1;
    let mut row_line = 1;
    let mut quote_line = 1;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                quote_line = line;
                row_has_content = true;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                row_has_content = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if row_has_content || !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                    records.push(Record {
                        line: row_line,
                        fields: std::mem::take(&mut fields),
                    });
                }
                row_has_content = false;
                line += 1;
                row_line = line;
            }
            _ => {
                field.push(c);
                row_has_content = true;
            }
        }
    }

    if in_quotes {
        return Err(UnterminatedQuote { line: quote_line });
    }

    if row_has_content || !field.is_empty() {
        fields.push(field);
        records.push(Record {
            line: row_line,
            fields,
        });
    }

    Ok(records)
}

/// Render one row, terminated by a newline
pub fn write_record(fields: &[&str]) -> String {
    let mut row = fields
        .iter()
        .map(|field| quote(field))
        .collect::<Vec<_>>()
        .join(",");
    row.push('\n');
    row
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
