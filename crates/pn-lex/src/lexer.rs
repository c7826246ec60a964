//! The indentation-aware tokenizer.
//!
//! The lexer pulls newline-terminated lines from a [`LineBuffer`] and emits
//! a flat token stream. Layout is synthetic: before scanning a line's
//! content it compares the line's indentation column against a stack of
//! open levels and emits `LineIn`/`LineEq`/`LineOut` tokens as needed; at
//! EOF the stack unwinds to column zero and then reports `LineOut` forever.
//! Within a line, tokens come from the table-driven DFA in `states`.
//!
//! Two quirks are load-bearing for compatibility and kept exactly:
//! a tab advances the indentation column to the next even column at least
//! two past the current one, and a `*` token extends the effective
//! indentation to the column of whatever follows it on the line, which is
//! how `* * value` nests without explicit indent.

use std::io::BufRead;

use pn_util::{Error, ErrorCode};

use crate::classes::classify;
use crate::line::{LineBuffer, LineStatus};
use crate::states::{accept_kind, reject_code, FLAG_DONE, FLAG_OK, LEX_TABLE, START_STATE};
use crate::token::{Token, TokenKind};

/// Tokenizer over a line-oriented byte source.
///
/// Call [`next_token`](Lexer::next_token) repeatedly; inspect the returned
/// kind, and [`token_bytes`](Lexer::token_bytes) for lexeme-bearing kinds.
/// Token bytes borrow the internal line buffer and must be consumed before
/// the next call. After a `TokenKind::Error` the stream is dead: the error
/// record stays available and subsequent behavior is unspecified but safe.
pub struct Lexer<R> {
    source: LineBuffer<R>,
    token: Token,
    indent: isize,
    eq: bool,
    levels: Vec<isize>,
    error: Error,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            source: LineBuffer::new(reader),
            token: Token::default(),
            indent: -1,
            eq: false,
            levels: vec![-1],
            error: Error::new(ErrorCode::Internal, 0, 0),
        }
    }

    /// Advances to and returns the next token.
    pub fn next_token(&mut self) -> TokenKind {
        // Either initial, when no line has been read, or final, after EOF.
        if self.source.line().is_empty() {
            if self.next_line() {
                return self.token.kind;
            }
        } else if self.update_level() {
            return self.token.kind;
        }

        while let Some(&byte) = self.source.line().get(self.token.end) {
            if byte == b' ' || byte == b'\t' {
                self.token.end += 1;
            } else {
                break;
            }
        }
        if self.source.line().get(self.token.end) == Some(&b'\n') {
            if !self.next_line() {
                self.fail(self.token.end, ErrorCode::Internal);
            }
            return self.token.kind;
        }

        self.token.start = self.token.end;
        let mut state = START_STATE;
        while let Some(&byte) = self.source.line().get(self.token.end) {
            state = LEX_TABLE[state as usize][classify(byte) as usize];
            if state & FLAG_DONE != 0 {
                break;
            }
            self.token.end += 1;
        }
        if state & FLAG_DONE == 0 {
            // Every line ends in a newline and every state terminates on it.
            self.fail(self.token.end, ErrorCode::Internal);
            return self.token.kind;
        }

        if state & FLAG_OK != 0 {
            let kind = accept_kind(state);
            self.token.kind = kind;
            if kind == TokenKind::Star {
                // The rest of the line becomes a nested block.
                self.indent_extend();
                self.token.end = self.token.start + 1;
            }
            return kind;
        }

        let code = reject_code(state);
        let at = match code {
            ErrorCode::Partial => self.token.end.saturating_sub(1),
            ErrorCode::BadWord => self.token.start,
            ErrorCode::BadEsc | ErrorCode::BadUEsc => {
                let mut at = self.token.end;
                while at > 0 && self.source.line().get(at) != Some(&b'\\') {
                    at -= 1;
                }
                at
            }
            _ => self.token.end,
        };
        self.fail(at, code);
        TokenKind::Error
    }

    /// Kind of the current token.
    pub fn token_kind(&self) -> TokenKind {
        self.token.kind
    }

    /// Bytes of the current token within the current line. Valid only until
    /// the next call to [`next_token`](Lexer::next_token).
    pub fn token_bytes(&self) -> &[u8] {
        let line = self.source.line();
        let start = self.token.start.min(line.len());
        let end = self.token.end.min(line.len()).max(start);
        &line[start..end]
    }

    /// 0-based byte offset of the current token within its line.
    pub fn token_start(&self) -> usize {
        self.token.start
    }

    /// The error record of the last `TokenKind::Error`.
    pub fn error(&self) -> Error {
        self.error
    }

    /// 1-based number of the current line.
    pub fn lineno(&self) -> usize {
        self.source.lineno()
    }

    /// Width of the previous line, for errors reported at a line boundary.
    pub fn prev_width(&self) -> usize {
        self.source.prev_width()
    }

    fn fail(&mut self, at: usize, code: ErrorCode) {
        self.token.kind = TokenKind::Error;
        self.token.end = self.source.line().len().saturating_sub(1);
        self.error = Error::new(code, self.source.lineno(), at + 1);
    }

    /// Walks the blanks after the current token; if content follows on the
    /// line, adopts its column as the effective indentation and schedules a
    /// layout check. Tab columns round up to the next even column.
    fn indent_extend(&mut self) -> bool {
        let mut indent = self.indent + (self.token.end - self.token.start) as isize;
        let mut p = self.token.end;
        loop {
            let byte = match self.source.line().get(p) {
                Some(&byte) => byte,
                None => return false,
            };
            match byte {
                b' ' => indent += 1,
                b'\t' => indent = (indent ^ (indent & 1)) + 2,
                b'\n' => return false,
                _ => {
                    self.indent = indent;
                    self.eq = true;
                    self.token.end = p;
                    return true;
                }
            }
            p += 1;
        }
    }

    /// Emits one pending layout token, if any.
    fn update_level(&mut self) -> bool {
        let top = self.levels.last().copied().unwrap_or(-1);
        if self.indent > top {
            self.eq = false;
            if self.token.kind == TokenKind::LineOut {
                // Dedent landed between two open levels.
                self.indent = top;
                self.fail(self.token.end, ErrorCode::Outdent);
                return true;
            }
            self.levels.push(self.indent);
            self.token.kind = TokenKind::LineIn;
            return true;
        }
        if self.indent < top {
            self.levels.pop();
            self.token.kind = TokenKind::LineOut;
            return true;
        }
        if self.eq {
            self.eq = false;
            self.token.kind = TokenKind::LineEq;
            return true;
        }
        false
    }

    /// Reads lines until one has content (or EOF), emitting the layout
    /// token the new line calls for. Returns false only if no event is
    /// pending, which cannot happen for a fresh line.
    fn next_line(&mut self) -> bool {
        loop {
            let status = self.source.read_line();
            self.token.start = 0;
            self.token.end = 0;
            match status {
                LineStatus::Err => {
                    self.fail(0, ErrorCode::System);
                    return true;
                }
                LineStatus::Eof => {
                    self.indent = 0;
                    if self.update_level() {
                        return true;
                    }
                    self.token.kind = TokenKind::LineOut;
                    return true;
                }
                LineStatus::Line => {}
            }
            self.indent = 0;
            if self.indent_extend() {
                return self.update_level();
            }
        }
    }
}
