//! Quoted, comma-delimited records.
//!
//! The dialect is RFC 4180-like: a `"` toggles quoting, a doubled `""` inside
//! a quoted run is one literal quote, and commas or newlines inside quotes are
//! field content. Splitting a line on `,` is wrong for this data and is never
//! done here.

use crate::error::DatasetError;

/// One logical record and the physical line it started on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Split `text` into records, skipping blank lines.
///
/// Line numbers count physical lines, so a record after a blank line or
/// after a multi-line quoted field keeps its position in the source file.
pub fn read_records(text: &str) -> Result<Vec<Record>, DatasetError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut builder = RecordBuilder::new(1);
    let mut line = 1usize;
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    builder.current.push('"');
                }
                '"' => in_quotes = false,
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    line += 1;
                    builder.current.push('\n');
                }
                _ => builder.current.push(ch),
            }
            continue;
        }

        match ch {
            '"' => {
                in_quotes = true;
                builder.quoted = true;
            }
            ',' => builder.end_field(),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                builder.finish_into(&mut records);
                line += 1;
                builder = RecordBuilder::new(line);
            }
            _ => builder.current.push(ch),
        }
    }

    if in_quotes {
        return Err(DatasetError::UnterminatedQuote {
            line: builder.start_line,
        });
    }
    builder.finish_into(&mut records);
    Ok(records)
}

struct RecordBuilder {
    start_line: usize,
    fields: Vec<String>,
    current: String,
    quoted: bool,
}

impl RecordBuilder {
    fn new(start_line: usize) -> Self {
        Self {
            start_line,
            fields: Vec::new(),
            current: String::new(),
            quoted: false,
        }
    }

    fn end_field(&mut self) {
        self.fields.push(std::mem::take(&mut self.current));
    }

    fn is_blank(&self) -> bool {
        self.fields.is_empty() && !self.quoted && self.current.trim().is_empty()
    }

    fn finish_into(mut self, records: &mut Vec<Record>) {
        if self.is_blank() {
            return;
        }
        self.end_field();
        records.push(Record {
            line: self.start_line,
            fields: self.fields,
        });
    }
}
