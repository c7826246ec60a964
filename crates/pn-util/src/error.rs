//! Error taxonomy shared by the lexer, parser, and codecs.
//!
//! Every failure surfaced through the token or event stream carries one of
//! these codes plus the line and column where it was detected. The message
//! strings are stable; downstream tools print them verbatim.

use thiserror::Error;

/// Stable error codes for every failure the core can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ErrorCode {
    /// An internal invariant was violated; never expected.
    #[error("internal error")]
    Internal,
    /// The underlying byte source reported an I/O failure.
    #[error("system error")]
    System,

    /// A dedent did not land on any open indentation level.
    #[error("unindent does not match any outer indentation level")]
    Outdent,

    /// An indented line appeared where no child may appear.
    #[error("unexpected child")]
    Child,
    /// A sibling line appeared where none may appear.
    #[error("unexpected sibling")]
    Sibling,
    /// Trailing content after a completed value.
    #[error("expected end-of-line")]
    Suffix,
    /// A value was expected in block context but none was found.
    #[error("expected value")]
    Long,
    /// A value was expected in bracketed context but none was found.
    #[error("expected value")]
    Short,
    /// A bracketed array was not continued or closed.
    #[error("expected ',' or ']'")]
    ArrayEnd,
    /// A bracketed map needed a key.
    #[error("expected key")]
    MapKey,
    /// A bracketed map was not continued or closed.
    #[error("expected ',' or '}}'")]
    MapEnd,

    /// A control byte outside a permitted position.
    #[error("invalid control character")]
    Ctrl,
    /// A non-ASCII byte outside string or data content.
    #[error("invalid non-ASCII character")]
    NonAscii,
    /// An invalid UTF-8 lead byte.
    #[error("invalid UTF-8 start byte")]
    Utf8Head,
    /// An invalid UTF-8 continuation byte.
    #[error("invalid UTF-8 continuation byte")]
    Utf8Tail,
    /// A byte that cannot start any token.
    #[error("invalid character")]
    BadChar,
    /// A word character inside `$` data.
    #[error("word char in data")]
    DataChar,
    /// `$` data ended after half of a hex pair.
    #[error("partial byte")]
    Partial,
    /// A word that is not a number, keyword, or key.
    #[error("unknown word")]
    BadWord,
    /// An unknown `\X` escape.
    #[error("invalid escape")]
    BadEsc,
    /// An invalid `\uXXXX` or `\UXXXXXXXX` escape.
    #[error("invalid \\uXXXX escape")]
    BadUEsc,
    /// A quoted string ran to the end of its line.
    #[error("eol while scanning string")]
    StrEol,
    /// Content followed `!` on the same line.
    #[error("expected eol after '!'")]
    BangSuffix,
    /// `!` was not the last line of its string block.
    #[error("expected eos after !")]
    BangLast,

    /// An integer literal exceeded the signed 64-bit range.
    #[error("integer overflow")]
    IntOverflow,
    /// An integer literal was malformed.
    #[error("invalid integer")]
    InvalidInt,

    /// A float literal rounded to infinity, a subnormal, or zero.
    #[error("float overflow")]
    FloatOverflow,
    /// A float literal was malformed.
    #[error("invalid float")]
    InvalidFloat,

    /// The parser stack limit was reached.
    #[error("recursion limit exceeded")]
    Recursion,
}

/// An error code located at a line and column of the input.
///
/// Lines and columns are 1-based. Columns count bytes within the line, so
/// they agree with what an editor shows only for ASCII content; tools that
/// format `line:col` messages depend on exactly these values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{lineno}:{column}: {code}")]
pub struct Error {
    /// What went wrong.
    pub code: ErrorCode,
    /// 1-based line of the offending byte.
    pub lineno: usize,
    /// 1-based column of the offending byte.
    pub column: usize,
}

impl Error {
    /// Creates an error at a specific location.
    pub fn new(code: ErrorCode, lineno: usize, column: usize) -> Self {
        Self { code, lineno, column }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_messages() {
        assert_eq!(
            ErrorCode::Outdent.to_string(),
            "unindent does not match any outer indentation level"
        );
        assert_eq!(ErrorCode::Long.to_string(), "expected value");
        assert_eq!(ErrorCode::Short.to_string(), "expected value");
        assert_eq!(ErrorCode::ArrayEnd.to_string(), "expected ',' or ']'");
        assert_eq!(ErrorCode::MapEnd.to_string(), "expected ',' or '}'");
        assert_eq!(ErrorCode::StrEol.to_string(), "eol while scanning string");
        assert_eq!(ErrorCode::DataChar.to_string(), "word char in data");
    }

    #[test]
    fn test_located_display() {
        let err = Error::new(ErrorCode::BadWord, 3, 7);
        assert_eq!(err.to_string(), "3:7: unknown word");
    }
}
