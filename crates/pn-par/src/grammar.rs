//! Non-terminals and the (state × token) transition table.
//!
//! The parser is an LL-like pushdown automaton: it pops a non-terminal,
//! pulls one token, and looks the pair up here. A transition records an
//! error code (aborting), up to two non-terminals to push (the right one is
//! consumed first), up to two accumulator side effects, whether and what to
//! emit, and how to treat the token as a key. The table is built once from
//! the per-state rules below.
//!
//! The layering mirrors the grammar: every line-based construct owns
//! exactly one stack entry per indentation level, so each `LineOut` from
//! the lexer retires exactly one entry and dedents unwind for free. Block
//! strings and data accumulate across sibling lines within their own
//! level; inline values after `key:` are restricted to short forms, which
//! is what keeps one dedent token sufficient to both finish a value and
//! close its map.

use once_cell::sync::Lazy;
use pn_lex::{TokenKind, TOKEN_KINDS};
use pn_util::ErrorCode;

/// Parser non-terminals. Each occupies one slot of the bounded stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Nt {
    /// Start symbol; consumes the initial `LineIn`.
    Document = 0,
    /// A block-form value is expected.
    Value,
    /// A completed value: consume the level's `LineOut`, reject trailers.
    ValueEnd,
    /// After `LineEq` at a completed value: only comments may follow.
    Trailing,
    /// An indented block in which only comments may appear.
    CommentBlock,

    /// Long array: more elements or the closing dedent.
    ArrayNext,
    /// Sibling line of a long array: the next `*`.
    ArrayStar,
    /// After `*`: the element value, always introduced by `LineIn`.
    ArrayElem,

    /// Long map: more entries or the closing dedent.
    MapNext,
    /// Sibling line of a long map: the next key.
    MapKey,
    /// After a key: its value, inline or indented.
    MapValue,

    /// Block data: more `$` lines or the closing dedent.
    DataNext,
    /// Sibling line of block data.
    DataLine,

    /// Block string after a non-empty line.
    WrapCont,
    /// Block string after an empty `>`/`|` line (or at its start).
    WrapContEmpty,
    /// Sibling line of a block string, previous line non-empty.
    WrapLine,
    /// Sibling line of a block string, previous line empty.
    WrapLineEmpty,
    /// After `!`: nothing but comments until the block closes.
    BangEnd,

    /// First element of `[…]` or its `]`.
    ShortArrayFirst,
    /// Element after a comma in `[…]`.
    ShortValue,
    /// Between elements: `,` or `]`.
    ShortArrayNext,
    /// First key of `{…}` or its `}`.
    ShortMapFirst,
    /// Key after a comma in `{…}`.
    ShortMapKey,
    /// Value after a key in `{…}`.
    ShortMapValue,
    /// Between entries: `,` or `}`.
    ShortMapNext,
}

pub(crate) const NT_COUNT: usize = Nt::ShortMapNext as usize + 1;

/// What a transition emits, if anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Emit {
    None,
    Null,
    True,
    False,
    Inf,
    NegInf,
    Nan,
    /// Decode the token as an integer.
    Int,
    /// Decode the token as a float.
    Float,
    /// Decode the token as a quoted string.
    Str,
    /// Decode the token as inline data.
    Data,
    /// Emit and reset the string accumulator.
    FlushStr,
    /// Emit and reset the data accumulator.
    FlushData,
    ShortArrayIn,
    ShortArrayOut,
    ShortMapIn,
    ShortMapOut,
    LongArrayIn,
    LongArrayOut,
    LongMapIn,
    LongMapOut,
}

/// Accumulator side effects, applied before any emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Acc {
    None,
    /// Append the token's hex pairs to the data accumulator.
    Data,
    /// Append the token's text (sigil and one blank stripped) to the
    /// string accumulator.
    Str,
    /// Append a space to the string accumulator.
    Space,
    /// Append a newline to the string accumulator.
    Newline,
}

/// How the transition treats the current token as a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum KeyMode {
    None,
    Bare,
    Quoted,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Transition {
    pub error: Option<ErrorCode>,
    pub emit: Emit,
    pub extend: [Option<Nt>; 2],
    pub acc: [Acc; 2],
    pub key: KeyMode,
}

impl Transition {
    const fn fail(code: ErrorCode) -> Self {
        Self {
            error: Some(code),
            emit: Emit::None,
            extend: [None, None],
            acc: [Acc::None, Acc::None],
            key: KeyMode::None,
        }
    }

    /// Push the given non-terminals; the last one is consumed first.
    const fn push(extend: [Option<Nt>; 2]) -> Self {
        Self {
            error: None,
            emit: Emit::None,
            extend,
            acc: [Acc::None, Acc::None],
            key: KeyMode::None,
        }
    }

    const fn emit(self, emit: Emit) -> Self {
        Self { emit, ..self }
    }

    const fn acc(self, first: Acc) -> Self {
        Self { acc: [first, self.acc[1]], ..self }
    }

    const fn acc2(self, first: Acc, second: Acc) -> Self {
        Self { acc: [first, second], ..self }
    }

    const fn key(self, key: KeyMode) -> Self {
        Self { key, ..self }
    }

    pub fn push_count(&self) -> usize {
        self.extend.iter().flatten().count()
    }
}

fn none() -> Transition {
    Transition::push([None, None])
}

fn push1(a: Nt) -> Transition {
    Transition::push([Some(a), None])
}

fn push2(a: Nt, b: Nt) -> Transition {
    Transition::push([Some(a), Some(b)])
}

pub(crate) type ParseTable = [[Transition; TOKEN_KINDS]; NT_COUNT];

pub(crate) static PARSE_TABLE: Lazy<ParseTable> = Lazy::new(build);

fn fill(table: &mut ParseTable, state: Nt, transition: Transition) {
    table[state as usize] = [transition; TOKEN_KINDS];
}

fn set(table: &mut ParseTable, state: Nt, kind: TokenKind, transition: Transition) {
    table[state as usize][kind as usize] = transition;
}

fn set_all(table: &mut ParseTable, state: Nt, kinds: &[TokenKind], transition: Transition) {
    for &kind in kinds {
        set(table, state, kind, transition);
    }
}

/// Scalar tokens that emit directly, with their emit actions.
const SCALARS: [(TokenKind, Emit); 9] = [
    (TokenKind::Null, Emit::Null),
    (TokenKind::True, Emit::True),
    (TokenKind::False, Emit::False),
    (TokenKind::Inf, Emit::Inf),
    (TokenKind::NegInf, Emit::NegInf),
    (TokenKind::Nan, Emit::Nan),
    (TokenKind::Int, Emit::Int),
    (TokenKind::Float, Emit::Float),
    (TokenKind::Str, Emit::Str),
];

fn build() -> ParseTable {
    use Nt::*;
    use TokenKind as T;

    let mut t: ParseTable = [[Transition::fail(ErrorCode::Internal); TOKEN_KINDS]; NT_COUNT];

    // Document: the lexer opens every document, even an empty one, with a
    // LineIn at column zero.
    set(&mut t, Document, T::LineIn, push1(Value));

    // Value: a block-form value. Comments and blank-ish layout are
    // transparent until the first content token decides the shape.
    fill(&mut t, Value, Transition::fail(ErrorCode::Long));
    set(&mut t, Value, T::Comment, push1(Value));
    set(&mut t, Value, T::LineEq, push1(Value));
    set(&mut t, Value, T::LineIn, push2(Value, CommentBlock));
    for (kind, emit) in SCALARS {
        set(&mut t, Value, kind, push1(ValueEnd).emit(emit));
    }
    set(&mut t, Value, T::Star, push2(ArrayNext, ArrayElem).emit(Emit::LongArrayIn));
    set(&mut t, Value, T::Key, push2(MapNext, MapValue).emit(Emit::LongMapIn).key(KeyMode::Bare));
    set(
        &mut t,
        Value,
        T::QKey,
        push2(MapNext, MapValue).emit(Emit::LongMapIn).key(KeyMode::Quoted),
    );
    set(&mut t, Value, T::ArrayIn, push2(ValueEnd, ShortArrayFirst).emit(Emit::ShortArrayIn));
    set(&mut t, Value, T::MapIn, push2(ValueEnd, ShortMapFirst).emit(Emit::ShortMapIn));
    set(&mut t, Value, T::Data, push1(DataNext).acc(Acc::Data));
    set(&mut t, Value, T::Wrap, push1(WrapCont).acc(Acc::Str));
    set(&mut t, Value, T::Pipe, push1(WrapCont).acc(Acc::Str));
    set(&mut t, Value, T::WrapEmpty, push1(WrapContEmpty));
    set(&mut t, Value, T::PipeEmpty, push1(WrapContEmpty));
    set(&mut t, Value, T::Bang, push1(BangEnd).emit(Emit::FlushStr));

    // ValueEnd: the value on this level is complete.
    fill(&mut t, ValueEnd, Transition::fail(ErrorCode::Suffix));
    set(&mut t, ValueEnd, T::LineOut, none());
    set(&mut t, ValueEnd, T::LineEq, push2(ValueEnd, Trailing));
    set(&mut t, ValueEnd, T::LineIn, push2(ValueEnd, CommentBlock));
    set(&mut t, ValueEnd, T::Comment, push1(ValueEnd));

    fill(&mut t, Trailing, Transition::fail(ErrorCode::Sibling));
    set(&mut t, Trailing, T::Comment, none());
    set(&mut t, Trailing, T::LineOut, none());

    fill(&mut t, CommentBlock, Transition::fail(ErrorCode::Child));
    set(&mut t, CommentBlock, T::Comment, push1(CommentBlock));
    set(&mut t, CommentBlock, T::LineEq, push1(CommentBlock));
    set(&mut t, CommentBlock, T::LineIn, push2(CommentBlock, CommentBlock));
    set(&mut t, CommentBlock, T::LineOut, none());

    // Long arrays. A sibling line takes over the whole continuation: it
    // either starts the next element (re-opening ArrayNext) or closes the
    // array itself, so the block's one LineOut is never double-consumed.
    fill(&mut t, ArrayNext, Transition::fail(ErrorCode::Suffix));
    set(&mut t, ArrayNext, T::LineOut, none().emit(Emit::LongArrayOut));
    set(&mut t, ArrayNext, T::LineEq, push1(ArrayStar));
    set(&mut t, ArrayNext, T::LineIn, push2(ArrayNext, CommentBlock));
    set(&mut t, ArrayNext, T::Comment, push1(ArrayNext));

    fill(&mut t, ArrayStar, Transition::fail(ErrorCode::Sibling));
    set(&mut t, ArrayStar, T::Star, push2(ArrayNext, ArrayElem));
    set(&mut t, ArrayStar, T::Comment, push1(ArrayStar));
    set(&mut t, ArrayStar, T::LineEq, push1(ArrayStar));
    set(&mut t, ArrayStar, T::LineOut, none().emit(Emit::LongArrayOut));

    fill(&mut t, ArrayElem, Transition::fail(ErrorCode::Long));
    set(&mut t, ArrayElem, T::LineIn, push1(Value));

    // Long maps, same continuation scheme.
    fill(&mut t, MapNext, Transition::fail(ErrorCode::Suffix));
    set(&mut t, MapNext, T::LineOut, none().emit(Emit::LongMapOut));
    set(&mut t, MapNext, T::LineEq, push1(MapKey));
    set(&mut t, MapNext, T::LineIn, push2(MapNext, CommentBlock));
    set(&mut t, MapNext, T::Comment, push1(MapNext));

    fill(&mut t, MapKey, Transition::fail(ErrorCode::MapKey));
    set(&mut t, MapKey, T::Key, push2(MapNext, MapValue).key(KeyMode::Bare));
    set(&mut t, MapKey, T::QKey, push2(MapNext, MapValue).key(KeyMode::Quoted));
    set(&mut t, MapKey, T::Comment, push1(MapKey));
    set(&mut t, MapKey, T::LineEq, push1(MapKey));
    set(&mut t, MapKey, T::LineOut, none().emit(Emit::LongMapOut));

    // MapValue: the value after `key:`, inline on the same line or in an
    // indented block. Inline values are short forms only: `$` data emits
    // immediately, and the `>`/`|`/`!` block forms must be indented
    // (a `*` is fine because it opens its own nested level).
    fill(&mut t, MapValue, Transition::fail(ErrorCode::Long));
    set(&mut t, MapValue, T::LineIn, push1(Value));
    set(&mut t, MapValue, T::Comment, push1(MapValue));
    for (kind, emit) in SCALARS {
        set(&mut t, MapValue, kind, none().emit(emit));
    }
    set(&mut t, MapValue, T::Star, push2(ArrayNext, ArrayElem).emit(Emit::LongArrayIn));
    set(&mut t, MapValue, T::ArrayIn, push1(ShortArrayFirst).emit(Emit::ShortArrayIn));
    set(&mut t, MapValue, T::MapIn, push1(ShortMapFirst).emit(Emit::ShortMapIn));
    set(&mut t, MapValue, T::Data, none().emit(Emit::Data));

    // Block data, same continuation scheme.
    fill(&mut t, DataNext, Transition::fail(ErrorCode::Suffix));
    set(&mut t, DataNext, T::LineOut, none().emit(Emit::FlushData));
    set(&mut t, DataNext, T::LineEq, push1(DataLine));
    set(&mut t, DataNext, T::LineIn, push2(DataNext, CommentBlock));
    set(&mut t, DataNext, T::Comment, push1(DataNext));

    fill(&mut t, DataLine, Transition::fail(ErrorCode::Sibling));
    set(&mut t, DataLine, T::Data, push1(DataNext).acc(Acc::Data));
    set(&mut t, DataLine, T::Comment, push1(DataLine));
    set(&mut t, DataLine, T::LineEq, push1(DataLine));
    set(&mut t, DataLine, T::LineOut, none().emit(Emit::FlushData));

    // Block strings. Every line contributes content; the joiner before a
    // continuation line is a space only for a non-empty `>` line following
    // a non-empty line, a newline otherwise; the closing dedent supplies
    // the final newline unless `!` ended the block first.
    fill(&mut t, WrapCont, Transition::fail(ErrorCode::Suffix));
    set(&mut t, WrapCont, T::LineOut, none().emit(Emit::FlushStr).acc(Acc::Newline));
    set(&mut t, WrapCont, T::LineEq, push1(WrapLine));
    set(&mut t, WrapCont, T::LineIn, push2(WrapCont, CommentBlock));

    fill(&mut t, WrapContEmpty, Transition::fail(ErrorCode::Suffix));
    set(&mut t, WrapContEmpty, T::LineOut, none().emit(Emit::FlushStr).acc(Acc::Newline));
    set(&mut t, WrapContEmpty, T::LineEq, push1(WrapLineEmpty));
    set(&mut t, WrapContEmpty, T::LineIn, push2(WrapContEmpty, CommentBlock));

    fill(&mut t, WrapLine, Transition::fail(ErrorCode::Sibling));
    set(&mut t, WrapLine, T::Wrap, push1(WrapCont).acc2(Acc::Space, Acc::Str));
    set(&mut t, WrapLine, T::Pipe, push1(WrapCont).acc2(Acc::Newline, Acc::Str));
    set(&mut t, WrapLine, T::WrapEmpty, push1(WrapContEmpty).acc(Acc::Newline));
    set(&mut t, WrapLine, T::PipeEmpty, push1(WrapContEmpty).acc(Acc::Newline));
    set(&mut t, WrapLine, T::Bang, push1(BangEnd).emit(Emit::FlushStr));
    set(&mut t, WrapLine, T::Comment, push1(WrapLine));
    set(&mut t, WrapLine, T::LineEq, push1(WrapLine));
    set(&mut t, WrapLine, T::LineOut, none().emit(Emit::FlushStr).acc(Acc::Newline));

    fill(&mut t, WrapLineEmpty, Transition::fail(ErrorCode::Sibling));
    set(&mut t, WrapLineEmpty, T::Wrap, push1(WrapCont).acc2(Acc::Newline, Acc::Str));
    set(&mut t, WrapLineEmpty, T::Pipe, push1(WrapCont).acc2(Acc::Newline, Acc::Str));
    set(&mut t, WrapLineEmpty, T::WrapEmpty, push1(WrapContEmpty).acc(Acc::Newline));
    set(&mut t, WrapLineEmpty, T::PipeEmpty, push1(WrapContEmpty).acc(Acc::Newline));
    set(&mut t, WrapLineEmpty, T::Bang, push1(BangEnd).emit(Emit::FlushStr));
    set(&mut t, WrapLineEmpty, T::Comment, push1(WrapLineEmpty));
    set(&mut t, WrapLineEmpty, T::LineEq, push1(WrapLineEmpty));
    set(&mut t, WrapLineEmpty, T::LineOut, none().emit(Emit::FlushStr).acc(Acc::Newline));

    // After `!` only comments may follow within the block.
    fill(&mut t, BangEnd, Transition::fail(ErrorCode::BangLast));
    set(&mut t, BangEnd, T::LineOut, none());
    set(&mut t, BangEnd, T::LineEq, push1(BangEnd));
    set(&mut t, BangEnd, T::LineIn, push2(BangEnd, CommentBlock));
    set(&mut t, BangEnd, T::Comment, push1(BangEnd));

    // Bracketed short forms: single-line, so every layout token is the
    // context's own error.
    for state in [ShortArrayFirst, ShortValue] {
        fill(&mut t, state, Transition::fail(ErrorCode::Short));
        for (kind, emit) in SCALARS {
            set(&mut t, state, kind, push1(ShortArrayNext).emit(emit));
        }
        set(&mut t, state, T::Data, push1(ShortArrayNext).emit(Emit::Data));
        set(
            &mut t,
            state,
            T::ArrayIn,
            push2(ShortArrayNext, ShortArrayFirst).emit(Emit::ShortArrayIn),
        );
        set(
            &mut t,
            state,
            T::MapIn,
            push2(ShortArrayNext, ShortMapFirst).emit(Emit::ShortMapIn),
        );
    }
    set(&mut t, ShortArrayFirst, T::ArrayOut, none().emit(Emit::ShortArrayOut));

    fill(&mut t, ShortArrayNext, Transition::fail(ErrorCode::ArrayEnd));
    set(&mut t, ShortArrayNext, T::Comma, push1(ShortValue));
    set(&mut t, ShortArrayNext, T::ArrayOut, none().emit(Emit::ShortArrayOut));

    for state in [ShortMapFirst, ShortMapKey] {
        fill(&mut t, state, Transition::fail(ErrorCode::MapKey));
        set(
            &mut t,
            state,
            T::Key,
            push2(ShortMapNext, ShortMapValue).key(KeyMode::Bare),
        );
        set(
            &mut t,
            state,
            T::QKey,
            push2(ShortMapNext, ShortMapValue).key(KeyMode::Quoted),
        );
    }
    set(&mut t, ShortMapFirst, T::MapOut, none().emit(Emit::ShortMapOut));

    fill(&mut t, ShortMapValue, Transition::fail(ErrorCode::Short));
    for (kind, emit) in SCALARS {
        set(&mut t, ShortMapValue, kind, none().emit(emit));
    }
    set(&mut t, ShortMapValue, T::Data, none().emit(Emit::Data));
    set(&mut t, ShortMapValue, T::ArrayIn, push1(ShortArrayFirst).emit(Emit::ShortArrayIn));
    set(&mut t, ShortMapValue, T::MapIn, push1(ShortMapFirst).emit(Emit::ShortMapIn));

    fill(&mut t, ShortMapNext, Transition::fail(ErrorCode::MapEnd));
    set(&mut t, ShortMapNext, T::Comma, push1(ShortMapKey));
    set(&mut t, ShortMapNext, T::MapOut, none().emit(Emit::ShortMapOut));

    t
}
