//! Line-oriented byte input for the lexer.
//!
//! The lexer works strictly line by line: it asks for the next
//! newline-terminated run of bytes and scans within it. This adapter owns
//! the line buffer; token byte ranges index into it and are invalidated by
//! the next read. It also keeps the two counters the lexer's error
//! reporting needs: the 1-based line number and the width of the line just
//! replaced (errors detected at the start of a line point back into the
//! previous one).

use std::io::BufRead;

/// Outcome of a line read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStatus {
    /// A line is in the buffer, newline-terminated.
    Line,
    /// The source is exhausted.
    Eof,
    /// The source reported an I/O error.
    Err,
}

/// A byte source chopped into newline-terminated lines.
///
/// Any [`BufRead`] works: a `&[u8]` or `&str` borrowed in memory, or a
/// `BufReader` over a file.
#[derive(Debug)]
pub struct LineBuffer<R> {
    reader: R,
    line: Vec<u8>,
    lineno: usize,
    prev_width: usize,
}

impl<R: BufRead> LineBuffer<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: Vec::new(), lineno: 1, prev_width: 0 }
    }

    /// Replaces the buffer with the next line of the source.
    ///
    /// A read line always ends with `\n`; one is appended when the source
    /// ends without it. At EOF the buffer is left empty. The line counter
    /// advances whenever a non-empty buffer is replaced, so it counts the
    /// line currently in the buffer.
    pub fn read_line(&mut self) -> LineStatus {
        if !self.line.is_empty() {
            self.lineno += 1;
        }
        self.prev_width = self.line.len();
        self.line.clear();
        match self.reader.read_until(b'\n', &mut self.line) {
            Err(_) => {
                self.line.clear();
                LineStatus::Err
            }
            Ok(0) => LineStatus::Eof,
            Ok(_) => {
                if self.line.last() != Some(&b'\n') {
                    self.line.push(b'\n');
                }
                LineStatus::Line
            }
        }
    }

    /// The current line, including its trailing newline; empty before the
    /// first read and after EOF.
    pub fn line(&self) -> &[u8] {
        &self.line
    }

    /// 1-based number of the current line.
    pub fn lineno(&self) -> usize {
        self.lineno
    }

    /// Byte length (newline included) of the line the last read replaced.
    pub fn prev_width(&self) -> usize {
        self.prev_width
    }
}
