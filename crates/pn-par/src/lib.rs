//! pn-par - Event-streaming parser for the Procyon data language.
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! The parser is an LL-like pushdown automaton over the token stream of
//! pn-lex. A small table indexed by (non-terminal, token kind) drives every
//! step; each transition may push up to two non-terminals, tweak the data
//! or string accumulator, capture a key, and emit at most one event. The
//! stack is bounded (64 entries by default), so nesting depth is bounded
//! and a runaway document fails with a recursion error instead of
//! exhausting memory.
//!
//! The contract is the event stream, not a tree:
//!
//! - Leaf events (null, bool, int, float, data, string) own their decoded
//!   payloads. Floats that clamped to ±∞, a subnormal, or ±0 carry a flag
//!   and do not kill the stream; integer overflow does.
//! - ArrayIn/ArrayOut and MapIn/MapOut are always properly nested, each
//!   flagged as coming from the bracketed short form or the indented long
//!   form.
//! - Keys appear exactly on events directly inside a map; a container's
//!   key arrives on its In event.
//! - An error ends the stream; events before it are a trustworthy prefix.
//!
//! Pull model: the consumer calls `next_event`, the parser pulls tokens,
//! the lexer pulls lines. Nothing is buffered beyond one line, one pending
//! key, and the block-string/data accumulators.
//!
//! `value::parse` is the thin materializing consumer for callers that want
//! the whole document as one `Value`.

mod edge_cases;
mod event;
mod grammar;
mod parser;
pub mod value;

pub use event::{Event, EventKind, Form};
pub use parser::{Parser, DEFAULT_STACK_LIMIT};
pub use value::{parse, Value};
