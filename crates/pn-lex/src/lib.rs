//! pn-lex - Lexical analysis for the Procyon data language.
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! Procyon is whitespace-significant: block structure comes from leading
//! indentation, not brackets. The lexer therefore does two jobs at once:
//!
//! 1. LAYOUT
//!    Before any token on a new line, the line's indentation column is
//!    compared against a stack of open levels and synthetic LineIn, LineEq,
//!    and LineOut tokens are emitted. A tab advances the column to the next
//!    even column at least two past the current one. A `*` extends the
//!    effective indentation to the column after itself, which is what lets
//!    `* * value` build nested arrays on one line.
//!
//! 2. SCANNING
//!    Within a line, tokens come from a DFA driven by a 256-entry byte to
//!    character-class table and a per-(state, class) next-state table. The
//!    tables encode everything: number syntax, keyword spellings, bare-key
//!    alphabet, hex pairing in `$` data, escape validity, and strict UTF-8
//!    (overlong forms, surrogate halves, and values past U+10FFFF are
//!    rejected at the first byte that proves them invalid).
//!
//! The lexer reads strictly line by line through `LineBuffer` and never
//! looks across lines except through the layout tokens. Token byte ranges
//! index the current line buffer and die with it; consumers decode or copy
//! before asking for the next token. Errors carry a stable code and a
//! 1-based line and column, and the lexer makes no attempt to recover.

mod classes;
mod edge_cases;
mod lexer;
mod line;
mod states;
mod token;

pub use lexer::Lexer;
pub use line::{LineBuffer, LineStatus};
pub use token::{TokenKind, TOKEN_KINDS};
