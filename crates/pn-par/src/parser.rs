//! The pushdown event parser.
//!
//! One call to [`Parser::next_event`] drives the machine until it either
//! emits an event, fails, or exhausts the document. Each step pops a
//! non-terminal from the bounded stack, pulls one token from the lexer, and
//! applies the transition the grammar table records for the pair.
//!
//! The parser owns three values between events: the data accumulator for
//! `$` blocks, the string accumulator for `>`/`|` blocks, and the pending
//! key. An emitting transition moves the pending key into the event first
//! and decodes a new key afterwards, so a container's own key rides on its
//! `In` event while its first entry's key becomes pending. Flush emissions
//! swap the accumulator out rather than copying it.

use std::io::BufRead;

use pn_lex::{Lexer, TokenKind};
use pn_util::float::FloatError;
use pn_util::{parse_float, parse_int, utf8, Error, ErrorCode};

use crate::event::{Event, EventKind, Form};
use crate::grammar::{Acc, Emit, KeyMode, Nt, PARSE_TABLE};

/// Default limit on parser stack depth, bounding nesting depth.
pub const DEFAULT_STACK_LIMIT: usize = 64;

/// Streaming parser over a lexer it borrows for its lifetime.
pub struct Parser<'l, R> {
    lex: &'l mut Lexer<R>,
    stack: Vec<Nt>,
    limit: usize,
    data_acc: Vec<u8>,
    str_acc: String,
    key: Option<String>,
    done: bool,
}

impl<'l, R: BufRead> Parser<'l, R> {
    pub fn new(lex: &'l mut Lexer<R>) -> Self {
        Self::with_stack_limit(lex, DEFAULT_STACK_LIMIT)
    }

    /// Creates a parser with a custom nesting limit.
    pub fn with_stack_limit(lex: &'l mut Lexer<R>, limit: usize) -> Self {
        Self {
            lex,
            stack: vec![Nt::Document],
            limit,
            data_acc: Vec::new(),
            str_acc: String::new(),
            key: None,
            done: false,
        }
    }

    /// Returns the next event, a terminal error, or `None` at end of
    /// document. After an error or the end, every later call is `None`.
    pub fn next_event(&mut self) -> Option<Result<Event, Error>> {
        if self.done {
            return None;
        }
        loop {
            let state = match self.stack.pop() {
                Some(state) => state,
                None => {
                    self.done = true;
                    return None;
                }
            };
            let kind = self.lex.next_token();
            if kind == TokenKind::Error {
                self.done = true;
                return Some(Err(self.lex.error()));
            }

            let transition = &PARSE_TABLE[state as usize][kind as usize];
            if let Some(code) = transition.error {
                self.done = true;
                return Some(Err(self.locate(code, kind)));
            }
            if self.stack.len() + transition.push_count() > self.limit {
                self.done = true;
                return Some(Err(self.locate_at_token(ErrorCode::Recursion)));
            }

            for acc in transition.acc {
                match acc {
                    Acc::None => {}
                    Acc::Data => append_data(&mut self.data_acc, self.lex.token_bytes()),
                    Acc::Str => append_block_line(&mut self.str_acc, self.lex.token_bytes()),
                    Acc::Space => self.str_acc.push(' '),
                    Acc::Newline => self.str_acc.push('\n'),
                }
            }

            let pending = if transition.emit != Emit::None {
                self.key.take()
            } else {
                None
            };
            match transition.key {
                KeyMode::None => {}
                KeyMode::Bare => {
                    let bytes = self.lex.token_bytes();
                    let bare = &bytes[..bytes.len().saturating_sub(1)];
                    self.key = Some(String::from_utf8_lossy(bare).into_owned());
                }
                KeyMode::Quoted => {
                    let bytes = self.lex.token_bytes();
                    let quoted = &bytes[1..bytes.len().saturating_sub(2)];
                    self.key = Some(decode_short_string(quoted));
                }
            }

            for nt in transition.extend.iter().flatten() {
                self.stack.push(*nt);
            }

            let event = match self.emit(transition.emit, pending) {
                Ok(None) => continue,
                Ok(Some(event)) => event,
                Err(error) => {
                    self.done = true;
                    return Some(Err(error));
                }
            };
            return Some(Ok(event));
        }
    }

    fn emit(&mut self, emit: Emit, key: Option<String>) -> Result<Option<Event>, Error> {
        let event = |form, kind| Ok(Some(Event::new(key, form, kind)));
        match emit {
            Emit::None => Ok(None),

            Emit::Null => event(Form::Short, EventKind::Null),
            Emit::True => event(Form::Short, EventKind::Bool(true)),
            Emit::False => event(Form::Short, EventKind::Bool(false)),
            Emit::Inf => {
                event(Form::Short, EventKind::Float { value: f64::INFINITY, clamped: false })
            }
            Emit::NegInf => {
                event(Form::Short, EventKind::Float { value: f64::NEG_INFINITY, clamped: false })
            }
            Emit::Nan => event(Form::Short, EventKind::Float { value: f64::NAN, clamped: false }),

            Emit::Int => match parse_int(self.lex.token_bytes()) {
                Ok(value) => event(Form::Short, EventKind::Int(value)),
                Err(code) => Err(self.locate_at_token(code)),
            },
            Emit::Float => match parse_float(self.lex.token_bytes()) {
                Ok(value) => event(Form::Short, EventKind::Float { value, clamped: false }),
                // Range failures are soft: the clamped value is usable and
                // the stream continues.
                Err(FloatError::Range(value)) => {
                    event(Form::Short, EventKind::Float { value, clamped: true })
                }
                Err(FloatError::Syntax) => Err(self.locate_at_token(ErrorCode::InvalidFloat)),
            },
            Emit::Str => {
                let bytes = self.lex.token_bytes();
                let content = &bytes[1..bytes.len().saturating_sub(1)];
                event(Form::Short, EventKind::Str(decode_short_string(content)))
            }
            Emit::Data => {
                let mut data = Vec::new();
                append_data(&mut data, self.lex.token_bytes());
                event(Form::Short, EventKind::Data(data))
            }
            Emit::FlushStr => {
                let text = std::mem::take(&mut self.str_acc);
                event(Form::Long, EventKind::Str(text))
            }
            Emit::FlushData => {
                let data = std::mem::take(&mut self.data_acc);
                event(Form::Long, EventKind::Data(data))
            }

            Emit::ShortArrayIn => event(Form::Short, EventKind::ArrayIn),
            Emit::ShortArrayOut => event(Form::Short, EventKind::ArrayOut),
            Emit::ShortMapIn => event(Form::Short, EventKind::MapIn),
            Emit::ShortMapOut => event(Form::Short, EventKind::MapOut),
            Emit::LongArrayIn => event(Form::Long, EventKind::ArrayIn),
            Emit::LongArrayOut => event(Form::Long, EventKind::ArrayOut),
            Emit::LongMapIn => event(Form::Long, EventKind::MapIn),
            Emit::LongMapOut => event(Form::Long, EventKind::MapOut),
        }
    }

    /// Error position for a failed transition. Layout tokens blame the end
    /// of the previous line; content tokens blame their own start.
    fn locate(&self, code: ErrorCode, kind: TokenKind) -> Error {
        if kind.is_layout() {
            let lineno = match self.lex.lineno() {
                n if n > 1 => n - 1,
                n => n,
            };
            Error::new(code, lineno, self.lex.prev_width().max(1))
        } else {
            self.locate_at_token(code)
        }
    }

    fn locate_at_token(&self, code: ErrorCode) -> Error {
        Error::new(code, self.lex.lineno(), self.lex.token_start() + 1)
    }
}

fn hex_value(byte: u8) -> u8 {
    match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'f' => byte - b'a' + 10,
        b'A'..=b'F' => byte - b'A' + 10,
        _ => 0,
    }
}

/// Appends the hex pairs of a `$` token. The lexer has already verified
/// pairing and the character set.
fn append_data(acc: &mut Vec<u8>, token: &[u8]) {
    let mut high = None;
    for &byte in &token[1..] {
        if byte == b' ' || byte == b'\t' {
            continue;
        }
        match high.take() {
            None => high = Some(hex_value(byte)),
            Some(h) => acc.push((h << 4) | hex_value(byte)),
        }
    }
}

/// Appends the content of a `>` or `|` token: the sigil goes, then one
/// blank directly after it if present; the rest is literal.
fn append_block_line(acc: &mut String, token: &[u8]) {
    let mut content = &token[1..];
    if let Some((&(b' ' | b'\t'), rest)) = content.split_first() {
        content = rest;
    }
    acc.push_str(&String::from_utf8_lossy(content));
}

/// Decodes the body of a quoted string or key (quotes already stripped).
/// Escapes were validated by the lexer; decoded code points are re-encoded
/// as UTF-8.
fn decode_short_string(content: &[u8]) -> String {
    let mut out = Vec::with_capacity(content.len());
    let mut i = 0;
    while i < content.len() {
        let byte = content[i];
        if byte != b'\\' {
            out.push(byte);
            i += 1;
            continue;
        }
        i += 1;
        let esc = content.get(i).copied().unwrap_or(b'\\');
        i += 1;
        let count = match esc {
            b'u' => 4,
            b'U' => 8,
            _ => {
                out.push(match esc {
                    b'b' => 0x08,
                    b'f' => 0x0C,
                    b'n' => b'\n',
                    b'r' => b'\r',
                    b't' => b'\t',
                    other => other,
                });
                continue;
            }
        };
        let mut rune: u32 = 0;
        for _ in 0..count {
            rune = (rune << 4) | u32::from(hex_value(content.get(i).copied().unwrap_or(b'0')));
            i += 1;
        }
        utf8::encode_rune(rune, &mut out);
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(input: &str) -> (Vec<Event>, Option<Error>) {
        let mut lexer = Lexer::new(input.as_bytes());
        let mut parser = Parser::new(&mut lexer);
        let mut events = Vec::new();
        while let Some(step) = parser.next_event() {
            match step {
                Ok(event) => events.push(event),
                Err(error) => return (events, Some(error)),
            }
        }
        (events, None)
    }

    fn ok_events(input: &str) -> Vec<Event> {
        let (events, error) = events(input);
        assert_eq!(error, None, "{input:?}");
        events
    }

    fn plain(form: Form, kind: EventKind) -> Event {
        Event::new(None, form, kind)
    }

    fn keyed(key: &str, form: Form, kind: EventKind) -> Event {
        Event::new(Some(key.to_string()), form, kind)
    }

    #[test]
    fn test_empty_short_map() {
        assert_eq!(
            ok_events("{}\n"),
            vec![
                plain(Form::Short, EventKind::MapIn),
                plain(Form::Short, EventKind::MapOut),
            ]
        );
    }

    #[test]
    fn test_block_array_of_ints() {
        assert_eq!(
            ok_events("* 1\n* 2\n* 3\n"),
            vec![
                plain(Form::Long, EventKind::ArrayIn),
                plain(Form::Short, EventKind::Int(1)),
                plain(Form::Short, EventKind::Int(2)),
                plain(Form::Short, EventKind::Int(3)),
                plain(Form::Long, EventKind::ArrayOut),
            ]
        );
    }

    #[test]
    fn test_multi_segment_string() {
        assert_eq!(
            ok_events("> Hello\n> world\n!\n"),
            vec![plain(Form::Long, EventKind::Str("Hello world".to_string()))]
        );
    }

    #[test]
    fn test_piped_and_wrapped_mix() {
        assert_eq!(
            ok_events("| Line one\n> wraps here\n| Line two\n"),
            vec![plain(
                Form::Long,
                EventKind::Str("Line one wraps here\nLine two\n".to_string()),
            )]
        );
    }

    #[test]
    fn test_nested_map_with_indented_value() {
        assert_eq!(
            ok_events("top:\n  inner: 42\n"),
            vec![
                plain(Form::Long, EventKind::MapIn),
                keyed("top", Form::Long, EventKind::MapIn),
                keyed("inner", Form::Short, EventKind::Int(42)),
                plain(Form::Long, EventKind::MapOut),
                plain(Form::Long, EventKind::MapOut),
            ]
        );
    }

    #[test]
    fn test_float_overflow_is_soft() {
        assert_eq!(
            ok_events("1e999\n"),
            vec![plain(
                Form::Short,
                EventKind::Float { value: f64::INFINITY, clamped: true },
            )]
        );
    }

    #[test]
    fn test_int_overflow_is_fatal() {
        let (events, error) = events("99999999999999999999\n");
        assert_eq!(events, vec![]);
        assert_eq!(error, Some(Error::new(ErrorCode::IntOverflow, 1, 1)));
    }

    #[test]
    fn test_containers_balance_or_error() {
        // A short array left open errors before any Out is produced.
        let (events, error) = events("[1, 2,\n");
        assert_eq!(
            events,
            vec![
                plain(Form::Short, EventKind::ArrayIn),
                plain(Form::Short, EventKind::Int(1)),
                plain(Form::Short, EventKind::Int(2)),
            ]
        );
        assert_eq!(error, Some(Error::new(ErrorCode::Short, 1, 7)));
    }

    #[test]
    fn test_keys_only_inside_maps() {
        // Array elements never carry keys.
        for event in ok_events("* 1\n* 2\n") {
            assert_eq!(event.key, None);
        }

        // A container's key rides on its In event; its elements are bare,
        // and Out events never carry keys.
        assert_eq!(
            ok_events("k:\n  * 5\n"),
            vec![
                plain(Form::Long, EventKind::MapIn),
                keyed("k", Form::Long, EventKind::ArrayIn),
                plain(Form::Short, EventKind::Int(5)),
                plain(Form::Long, EventKind::ArrayOut),
                plain(Form::Long, EventKind::MapOut),
            ]
        );

        assert_eq!(
            ok_events("[1, {a: 2}]\n"),
            vec![
                plain(Form::Short, EventKind::ArrayIn),
                plain(Form::Short, EventKind::Int(1)),
                plain(Form::Short, EventKind::MapIn),
                keyed("a", Form::Short, EventKind::Int(2)),
                plain(Form::Short, EventKind::MapOut),
                plain(Form::Short, EventKind::ArrayOut),
            ]
        );
    }

    #[test]
    fn test_stream_ends_after_error() {
        let mut lexer = Lexer::new(&b"[1"[..]);
        let mut parser = Parser::new(&mut lexer);
        let mut saw_error = false;
        while let Some(step) = parser.next_event() {
            if step.is_err() {
                saw_error = true;
            }
        }
        assert!(saw_error);
        assert!(parser.next_event().is_none());
        assert!(parser.next_event().is_none());
    }

    #[test]
    fn test_recursion_limit() {
        let input = format!("{}null", "*".repeat(64));
        let (_, error) = events(&input);
        assert_eq!(error, Some(Error::new(ErrorCode::Recursion, 1, 64)));

        let input = format!("{}null", "*".repeat(63));
        let (_, error) = events(&input);
        assert_eq!(error, None);
    }
}
