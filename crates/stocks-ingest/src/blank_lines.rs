//! Keep blank lines visible to the CSV tokenizer
//!
//! The `csv` reader drops lines with no content, so rows after a blank line
//! would be numbered as if it were not there. [`BlankLineMarker`] rewrites
//! every blank line outside a quoted field into `""`, which the reader yields
//! as a row with one empty cell. [`is_blank_line`] recognizes those rows.

use csv::ByteRecord;
use std::io::{self, Read};

const CHUNK: usize = 8 * 1024;

/// Where the scanner is within the current field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    FieldStart,
    Unquoted,
    Quoted,
    /// A `"` inside a quoted field: either an escaped quote or the closing one
    QuotedQuote,
}

/// [`Read`] adapter marking blank lines with an empty quoted cell
///
/// Follows the tokenizer's quoting rules: a quote opens a quoted field only at
/// the start of a field, `""` inside one is an escaped quote, and line breaks
/// inside a quoted field are data. `\n`, `\r` and `\r\n` all end a line.
pub(crate) struct BlankLineMarker<R> {
    inner: R,
    out: Vec<u8>,
    pos: usize,
    state: Lexeme,
    line_start: bool,
    after_cr: bool,
}

impl<R: Read> BlankLineMarker<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            out: Vec::with_capacity(CHUNK),
            pos: 0,
            state: Lexeme::FieldStart,
            line_start: true,
            after_cr: false,
        }
    }

    fn push(&mut self, byte: u8) {
        if self.state == Lexeme::QuotedQuote {
            if byte == b'"' {
                self.state = Lexeme::Quoted;
                self.out.push(byte);
                return;
            }
            self.state = Lexeme::Unquoted;
        }

        let after_cr = std::mem::replace(&mut self.after_cr, false);
        match (self.state, byte) {
            (Lexeme::Quoted, b'"') => self.state = Lexeme::QuotedQuote,
            (Lexeme::Quoted, _) => {},
            // second half of `\r\n`
            (_, b'\n') if after_cr => {},
            (_, b'\n' | b'\r') => {
                if self.line_start {
                    self.out.extend_from_slice(b"\"\"");
                }
                self.line_start = true;
                self.after_cr = byte == b'\r';
                self.state = Lexeme::FieldStart;
            },
            (Lexeme::FieldStart, b'"') => {
                self.state = Lexeme::Quoted;
                self.line_start = false;
            },
            (_, b',') => {
                self.state = Lexeme::FieldStart;
                self.line_start = false;
            },
            _ => {
                self.state = Lexeme::Unquoted;
                self.line_start = false;
            },
        }
        self.out.push(byte);
    }
}

impl<R: Read> Read for BlankLineMarker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos == self.out.len() {
            self.out.clear();
            self.pos = 0;

            let mut chunk = [0u8; CHUNK];
            let n = self.inner.read(&mut chunk)?;
            if n == 0 {
                return Ok(0);
            }
            for &byte in &chunk[..n] {
                self.push(byte);
            }
        }

        let n = buf.len().min(self.out.len() - self.pos);
        buf[..n].copy_from_slice(&self.out[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// A row holding a single empty cell, as produced for a blank line
pub(crate) fn is_blank_line(row: &ByteRecord) -> bool {
    row.len() == 1 && row.get(0).is_some_and(<[u8]>::is_empty)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn marked(input: &str) -> String {
        let mut out = String::new();
        BlankLineMarker::new(input.as_bytes())
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_blank_lines_are_marked() {
        assert_eq!(marked("a\n\nb\n"), "a\n\"\"\nb\n");
        assert_eq!(marked("\na\n"), "\"\"\na\n");
        assert_eq!(marked("a\r\n\r\nb\r\n"), "a\r\n\"\"\r\nb\r\n");
        assert_eq!(marked("a\r\rb"), "a\r\"\"\rb");
    }

    #[test]
    fn test_content_lines_are_untouched() {
        let input = "quarter,stock\n1,AA\n,\n 1,KO\n";
        assert_eq!(marked(input), input);
    }

    #[test]
    fn test_line_breaks_inside_quotes_are_data() {
        let input = "\"A\n\nB\",1\n\"say \"\"hi\"\"\n\n\",2\n";
        assert_eq!(marked(input), input);
        assert_eq!(marked("\"x\"\n\n"), "\"x\"\n\"\"\n");
    }

    #[test]
    fn test_mid_field_quote_is_literal() {
        assert_eq!(marked("5\" screen\n\nb\n"), "5\" screen\n\"\"\nb\n");
    }

    #[test]
    fn test_small_reads() {
        let mut reader = BlankLineMarker::new("a\n\nb\n".as_bytes());
        let mut out = Vec::new();
        let mut byte = [0u8; 1];
        while reader.read(&mut byte).unwrap() == 1 {
            out.push(byte[0]);
        }
        assert_eq!(out, b"a\n\"\"\nb\n");
    }

    #[test]
    fn test_blank_line_rows() {
        assert!(is_blank_line(&ByteRecord::from(vec![""])));
        assert!(!is_blank_line(&ByteRecord::new()));
        assert!(!is_blank_line(&ByteRecord::from(vec!["", ""])));
        assert!(!is_blank_line(&ByteRecord::from(vec!["AA"])));
    }
}
