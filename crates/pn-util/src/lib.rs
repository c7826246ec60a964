//! pn-util - Foundation codecs for the Procyon data language.
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! Procyon documents are byte streams. Before the lexer and parser can do
//! anything useful with them, three content codecs have to exist, and they
//! have to be exact:
//!
//! 1. UTF-8
//!    Strings are sequences of Unicode scalar values stored as UTF-8.
//!    Decoding never fails: invalid sequences become U+FFFD and iteration
//!    always makes progress, forward or backward. Display width and
//!    printability support the error-reporting layers above.
//!
//! 2. DECIMAL FLOATS
//!    Parsing is correctly rounded: the result is the round-to-nearest,
//!    ties-to-even binary64 of the exact rational input, with overflow,
//!    subnormal, and underflow results reported as a range status distinct
//!    from syntax errors. Printing is shortest-round-trip: the fewest
//!    significant digits that re-parse to the identical bits.
//!
//! 3. INTEGERS
//!    Signed 64-bit decimal with exact overflow detection at the 19-digit
//!    boundary, so the entire i64 range round-trips and nothing else parses.
//!
//! The error taxonomy lives here too: a single code enum with stable message
//! strings, plus the (code, line, column) triple every lexer or parser
//! failure carries.
//!
//! Everything in this crate is pure computation over byte slices. No I/O,
//! no allocation beyond the returned buffers, no global state.

pub mod error;
pub mod float;
pub mod numeric;
pub mod utf8;

pub use error::{Error, ErrorCode};
pub use float::{parse_float, print_float, FloatError};
pub use numeric::parse_int;
