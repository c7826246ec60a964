//! DFA states and the (state × class) transition table.
//!
//! The table is built once, at first use, from the per-state rules below;
//! the scanning loop afterwards is a single indexed load per byte. An entry
//! is either the next state, or a terminal value with the high bit set:
//!
//! ```text
//! bit 7 (DONE)  the DFA consumes no more bytes; emit now
//! bit 6 (OK)    low bits are the token kind; otherwise a lexical error
//! bits 0..=5    token kind or error payload
//! ```
//!
//! Token validity is entirely encoded here: which words are numbers,
//! keywords, or keys; where hex pairs may break in `$` data; which escape
//! and UTF-8 sequences are legal inside quoted strings (surrogate halves
//! and overlong forms are rejected by dedicated lead states). Each textual
//! context carries its own copies of the UTF-8 tail states so validation
//! stays a pure table walk.

use once_cell::sync::Lazy;
use pn_util::ErrorCode;
use static_assertions::const_assert;

use crate::classes::Class;
use crate::token::{TokenKind, ALL_KINDS, TOKEN_KINDS};

pub(crate) const FLAG_DONE: u8 = 0b1000_0000;
pub(crate) const FLAG_OK: u8 = 0b0100_0000;
pub(crate) const VALUE_MASK: u8 = 0b0011_1111;

/// Errors the DFA itself can produce, in packed form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum Reject {
    Internal = 0,
    Ctrl,
    NonAscii,
    Utf8Head,
    Utf8Tail,
    BadChar,
    DataChar,
    Partial,
    BadWord,
    BadEsc,
    BadUEsc,
    StrEol,
    BangSuffix,
}

const REJECT_CODES: [ErrorCode; 13] = [
    ErrorCode::Internal,
    ErrorCode::Ctrl,
    ErrorCode::NonAscii,
    ErrorCode::Utf8Head,
    ErrorCode::Utf8Tail,
    ErrorCode::BadChar,
    ErrorCode::DataChar,
    ErrorCode::Partial,
    ErrorCode::BadWord,
    ErrorCode::BadEsc,
    ErrorCode::BadUEsc,
    ErrorCode::StrEol,
    ErrorCode::BangSuffix,
];

/// Decodes the error payload of a non-OK terminal entry.
pub(crate) fn reject_code(value: u8) -> ErrorCode {
    REJECT_CODES
        .get((value & VALUE_MASK) as usize)
        .copied()
        .unwrap_or(ErrorCode::Internal)
}

/// Decodes the token kind of an OK terminal entry.
pub(crate) fn accept_kind(value: u8) -> TokenKind {
    ALL_KINDS
        .get((value & VALUE_MASK) as usize)
        .copied()
        .unwrap_or(TokenKind::Error)
}

fn accept(kind: TokenKind) -> u8 {
    FLAG_DONE | FLAG_OK | kind as u8
}

fn reject(code: Reject) -> u8 {
    FLAG_DONE | code as u8
}

/// DFA states. Scanning always starts at `Start`; single-token states named
/// `Q*` exist so every emitted token has consumed exactly its own bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum State {
    Start = 0,

    // Fixed single-byte tokens and the consumed-colon tails of keys.
    QStar,
    QArrayIn,
    QArrayOut,
    QMapIn,
    QMapOut,
    QComma,
    KeyDone,
    QKeyDone,

    // Numbers and unrecognized words.
    WPlus,
    WMinus,
    WZero,
    WInt,
    WDot,
    WFrac,
    WExp,
    WExpSign,
    WExpDigit,
    WordJunk,

    // Keyword spellings.
    KwN,
    KwNu,
    KwNul,
    KwNull,
    KwNa,
    KwNan,
    KwT,
    KwTr,
    KwTru,
    KwTrue,
    KwF,
    KwFa,
    KwFal,
    KwFals,
    KwFalse,
    KwI,
    KwIn,
    KwInf,
    KwPlusI,
    KwPlusIn,
    KwPlusInf,
    KwMinusI,
    KwMinusIn,
    KwMinusInf,

    // `$` data: even/odd number of hex digits in the current pair.
    DataEven,
    DataOdd,

    // Quoted strings and keys.
    StrBody,
    StrEsc,
    StrU4D,
    StrUD3,
    StrU4,
    StrU3,
    StrU2,
    StrU1,
    StrCap1,
    StrCap2,
    StrCap3,
    StrCap4A,
    StrCap4B,
    StrEnd,
    StrT1,
    StrT2,
    StrT3,
    StrE0,
    StrEd,
    StrF0,
    StrF4,

    // `>` lines.
    WrapBlank,
    WrapText,
    WrapT1,
    WrapT2,
    WrapT3,
    WrapE0,
    WrapEd,
    WrapF0,
    WrapF4,

    // `|` lines.
    PipeBlank,
    PipeText,
    PipeT1,
    PipeT2,
    PipeT3,
    PipeE0,
    PipeEd,
    PipeF0,
    PipeF4,

    // `!`
    BangLine,

    // `#` comments.
    CommentBody,
    ComT1,
    ComT2,
    ComT3,
    ComE0,
    ComEd,
    ComF0,
    ComF4,
}

const STATE_COUNT: usize = State::ComF4 as usize + 1;

// Non-terminal entries must never collide with the DONE flag.
const_assert!(STATE_COUNT <= 128);
const_assert!(TOKEN_KINDS < VALUE_MASK as usize);

pub(crate) const START_STATE: u8 = State::Start as u8;

pub(crate) type LexTable = [[u8; Class::COUNT]; STATE_COUNT];

pub(crate) static LEX_TABLE: Lazy<LexTable> = Lazy::new(build);

fn go(state: State) -> u8 {
    state as u8
}

fn fill(table: &mut LexTable, state: State, value: u8) {
    table[state as usize] = [value; Class::COUNT];
}

fn set(table: &mut LexTable, state: State, class: Class, value: u8) {
    table[state as usize][class as usize] = value;
}

fn set_all(table: &mut LexTable, state: State, classes: &[Class], value: u8) {
    for &class in classes {
        set(table, state, class, value);
    }
}

const DIGITS: &[Class] = &[Class::D0, Class::D1, Class::D2_7, Class::D8_9];

const HEX: &[Class] = &[
    Class::D0,
    Class::D1,
    Class::D2_7,
    Class::D8_9,
    Class::LowA,
    Class::LowB,
    Class::LowC,
    Class::LowD,
    Class::LowE,
    Class::LowF,
    Class::UpHex,
    Class::UpD,
    Class::UpE,
];

const LOWER: &[Class] = &[
    Class::LowA,
    Class::LowB,
    Class::LowC,
    Class::LowD,
    Class::LowE,
    Class::LowF,
    Class::LowI,
    Class::LowL,
    Class::LowN,
    Class::LowR,
    Class::LowS,
    Class::LowT,
    Class::LowU,
    Class::LowOther,
];

const UPPER: &[Class] = &[Class::UpHex, Class::UpD, Class::UpE, Class::UpU, Class::UpOther];

/// Everything a bare key or word may contain (`:` handled separately).
const WORD: &[Class] = &[
    Class::D0,
    Class::D1,
    Class::D2_7,
    Class::D8_9,
    Class::LowA,
    Class::LowB,
    Class::LowC,
    Class::LowD,
    Class::LowE,
    Class::LowF,
    Class::LowI,
    Class::LowL,
    Class::LowN,
    Class::LowR,
    Class::LowS,
    Class::LowT,
    Class::LowU,
    Class::LowOther,
    Class::UpHex,
    Class::UpD,
    Class::UpE,
    Class::UpU,
    Class::UpOther,
    Class::Plus,
    Class::Minus,
    Class::Dot,
    Class::Slash,
    Class::Underscore,
];

const CONT: &[Class] = &[Class::Cont8, Class::Cont9, Class::ContA];

const LEADS: &[Class] = &[
    Class::Lead2,
    Class::LeadE0,
    Class::LeadEd,
    Class::Lead3,
    Class::LeadF0,
    Class::Lead4,
    Class::LeadF4,
];

/// Default shape of a word state: anything outside the word alphabet ends
/// the token with `terminal`, an unexpected word character degrades to an
/// unknown word, and a colon turns the whole word into a key.
fn word_state(table: &mut LexTable, state: State, terminal: u8) {
    fill(table, state, terminal);
    set_all(table, state, WORD, go(State::WordJunk));
    set(table, state, Class::Colon, go(State::KeyDone));
}

/// Wires one textual context (string body, wrap/pipe text, comment) to its
/// private copies of the UTF-8 validation states. The split continuation
/// classes make overlong forms, surrogate halves, and post-U+10FFFF values
/// table-rejectable at the first byte that proves them invalid.
#[allow(clippy::too_many_arguments)]
fn utf8_states(
    table: &mut LexTable,
    body: State,
    t1: State,
    t2: State,
    t3: State,
    e0: State,
    ed: State,
    f0: State,
    f4: State,
) {
    utf8_hooks(table, body, t1, t2, t3, e0, ed, f0, f4);
    fill(table, t1, reject(Reject::Utf8Tail));
    set_all(table, t1, CONT, go(body));
    fill(table, t2, reject(Reject::Utf8Tail));
    set_all(table, t2, CONT, go(t1));
    fill(table, t3, reject(Reject::Utf8Tail));
    set_all(table, t3, CONT, go(t2));
    fill(table, e0, reject(Reject::Utf8Tail));
    set(table, e0, Class::ContA, go(t1));
    fill(table, ed, reject(Reject::Utf8Tail));
    set(table, ed, Class::Cont8, go(t1));
    set(table, ed, Class::Cont9, go(t1));
    fill(table, f0, reject(Reject::Utf8Tail));
    set(table, f0, Class::Cont9, go(t2));
    set(table, f0, Class::ContA, go(t2));
    fill(table, f4, reject(Reject::Utf8Tail));
    set(table, f4, Class::Cont8, go(t2));
}

/// Routes the lead classes of `state` into a context's UTF-8 states.
#[allow(clippy::too_many_arguments)]
fn utf8_hooks(
    table: &mut LexTable,
    state: State,
    t1: State,
    t2: State,
    t3: State,
    e0: State,
    ed: State,
    f0: State,
    f4: State,
) {
    set_all(table, state, CONT, reject(Reject::Utf8Head));
    set(table, state, Class::BadByte, reject(Reject::Utf8Head));
    set(table, state, Class::Lead2, go(t1));
    set(table, state, Class::LeadE0, go(e0));
    set(table, state, Class::LeadEd, go(ed));
    set(table, state, Class::Lead3, go(t2));
    set(table, state, Class::LeadF0, go(f0));
    set(table, state, Class::Lead4, go(t3));
    set(table, state, Class::LeadF4, go(f4));
}

fn build() -> LexTable {
    use Class as C;
    use State::*;

    let mut t: LexTable = [[0; Class::COUNT]; STATE_COUNT];

    // Start: dispatch on the first byte of a token. Blanks and newlines are
    // consumed by the driver before the DFA runs.
    fill(&mut t, Start, reject(Reject::BadChar));
    set(&mut t, Start, C::Blank, reject(Reject::Internal));
    set(&mut t, Start, C::Newline, reject(Reject::Internal));
    set(&mut t, Start, C::Ctrl, reject(Reject::Ctrl));
    set_all(&mut t, Start, CONT, reject(Reject::NonAscii));
    set_all(&mut t, Start, LEADS, reject(Reject::NonAscii));
    set(&mut t, Start, C::BadByte, reject(Reject::NonAscii));
    set(&mut t, Start, C::Star, go(QStar));
    set(&mut t, Start, C::BracketOpen, go(QArrayIn));
    set(&mut t, Start, C::BracketClose, go(QArrayOut));
    set(&mut t, Start, C::BraceOpen, go(QMapIn));
    set(&mut t, Start, C::BraceClose, go(QMapOut));
    set(&mut t, Start, C::Comma, go(QComma));
    set(&mut t, Start, C::Colon, go(KeyDone));
    set(&mut t, Start, C::Quote, go(StrBody));
    set(&mut t, Start, C::Dollar, go(DataEven));
    set(&mut t, Start, C::Hash, go(CommentBody));
    set(&mut t, Start, C::Wrap, go(WrapBlank));
    set(&mut t, Start, C::Pipe, go(PipeBlank));
    set(&mut t, Start, C::Bang, go(BangLine));
    set(&mut t, Start, C::Plus, go(WPlus));
    set(&mut t, Start, C::Minus, go(WMinus));
    set(&mut t, Start, C::D0, go(WZero));
    set_all(&mut t, Start, &[C::D1, C::D2_7, C::D8_9], go(WInt));
    set_all(&mut t, Start, LOWER, go(WordJunk));
    set_all(&mut t, Start, UPPER, go(WordJunk));
    set_all(&mut t, Start, &[C::Dot, C::Slash, C::Underscore], go(WordJunk));
    set(&mut t, Start, C::LowN, go(KwN));
    set(&mut t, Start, C::LowT, go(KwT));
    set(&mut t, Start, C::LowF, go(KwF));
    set(&mut t, Start, C::LowI, go(KwI));

    // Fixed sequences emit on the byte after them.
    fill(&mut t, QStar, accept(TokenKind::Star));
    fill(&mut t, QArrayIn, accept(TokenKind::ArrayIn));
    fill(&mut t, QArrayOut, accept(TokenKind::ArrayOut));
    fill(&mut t, QMapIn, accept(TokenKind::MapIn));
    fill(&mut t, QMapOut, accept(TokenKind::MapOut));
    fill(&mut t, QComma, accept(TokenKind::Comma));
    fill(&mut t, KeyDone, accept(TokenKind::Key));
    fill(&mut t, QKeyDone, accept(TokenKind::QKey));

    // Numbers. A `0` integer part takes no more digits; `.` needs digits on
    // both sides; an exponent needs at least one digit after its sign.
    word_state(&mut t, WPlus, reject(Reject::BadWord));
    set(&mut t, WPlus, C::D0, go(WZero));
    set_all(&mut t, WPlus, &[C::D1, C::D2_7, C::D8_9], go(WInt));
    set(&mut t, WPlus, C::LowI, go(KwPlusI));

    word_state(&mut t, WMinus, reject(Reject::BadWord));
    set(&mut t, WMinus, C::D0, go(WZero));
    set_all(&mut t, WMinus, &[C::D1, C::D2_7, C::D8_9], go(WInt));
    set(&mut t, WMinus, C::LowI, go(KwMinusI));

    word_state(&mut t, WZero, accept(TokenKind::Int));
    set(&mut t, WZero, C::Dot, go(WDot));
    set(&mut t, WZero, C::LowE, go(WExp));
    set(&mut t, WZero, C::UpE, go(WExp));

    word_state(&mut t, WInt, accept(TokenKind::Int));
    set_all(&mut t, WInt, DIGITS, go(WInt));
    set(&mut t, WInt, C::Dot, go(WDot));
    set(&mut t, WInt, C::LowE, go(WExp));
    set(&mut t, WInt, C::UpE, go(WExp));

    word_state(&mut t, WDot, reject(Reject::BadWord));
    set_all(&mut t, WDot, DIGITS, go(WFrac));

    word_state(&mut t, WFrac, accept(TokenKind::Float));
    set_all(&mut t, WFrac, DIGITS, go(WFrac));
    set(&mut t, WFrac, C::LowE, go(WExp));
    set(&mut t, WFrac, C::UpE, go(WExp));

    word_state(&mut t, WExp, reject(Reject::BadWord));
    set_all(&mut t, WExp, DIGITS, go(WExpDigit));
    set(&mut t, WExp, C::Plus, go(WExpSign));
    set(&mut t, WExp, C::Minus, go(WExpSign));

    word_state(&mut t, WExpSign, reject(Reject::BadWord));
    set_all(&mut t, WExpSign, DIGITS, go(WExpDigit));

    word_state(&mut t, WExpDigit, accept(TokenKind::Float));
    set_all(&mut t, WExpDigit, DIGITS, go(WExpDigit));

    word_state(&mut t, WordJunk, reject(Reject::BadWord));
    set_all(&mut t, WordJunk, WORD, go(WordJunk));

    // Keyword spellings; any divergence degrades to an unknown word.
    let chains: &[(State, C, State)] = &[
        (KwN, C::LowU, KwNu),
        (KwN, C::LowA, KwNa),
        (KwNu, C::LowL, KwNul),
        (KwNul, C::LowL, KwNull),
        (KwNa, C::LowN, KwNan),
        (KwT, C::LowR, KwTr),
        (KwTr, C::LowU, KwTru),
        (KwTru, C::LowE, KwTrue),
        (KwF, C::LowA, KwFa),
        (KwFa, C::LowL, KwFal),
        (KwFal, C::LowS, KwFals),
        (KwFals, C::LowE, KwFalse),
        (KwI, C::LowN, KwIn),
        (KwIn, C::LowF, KwInf),
        (KwPlusI, C::LowN, KwPlusIn),
        (KwPlusIn, C::LowF, KwPlusInf),
        (KwMinusI, C::LowN, KwMinusIn),
        (KwMinusIn, C::LowF, KwMinusInf),
    ];
    for s in [
        KwN, KwNu, KwNul, KwNa, KwT, KwTr, KwTru, KwF, KwFa, KwFal, KwFals, KwI, KwIn, KwPlusI,
        KwPlusIn, KwMinusI, KwMinusIn,
    ] {
        word_state(&mut t, s, reject(Reject::BadWord));
    }
    for s in [KwNull, KwNan, KwTrue, KwFalse, KwInf, KwPlusInf, KwMinusInf] {
        let kind = match s {
            KwNull => TokenKind::Null,
            KwNan => TokenKind::Nan,
            KwTrue => TokenKind::True,
            KwFalse => TokenKind::False,
            KwMinusInf => TokenKind::NegInf,
            _ => TokenKind::Inf,
        };
        word_state(&mut t, s, accept(kind));
    }
    for &(from, class, to) in chains {
        set(&mut t, from, class, go(to));
    }

    // `$` data: blanks may separate pairs, a half pair may not end at a
    // terminator, and word characters never belong in data.
    for s in [DataEven, DataOdd] {
        fill(&mut t, s, reject(Reject::BadChar));
        set_all(&mut t, s, WORD, reject(Reject::DataChar));
        set(&mut t, s, C::Colon, reject(Reject::DataChar));
        set(&mut t, s, C::Ctrl, reject(Reject::Ctrl));
        set_all(&mut t, s, CONT, reject(Reject::NonAscii));
        set_all(&mut t, s, LEADS, reject(Reject::NonAscii));
        set(&mut t, s, C::BadByte, reject(Reject::NonAscii));
    }
    set_all(&mut t, DataEven, HEX, go(DataOdd));
    set(&mut t, DataEven, C::Blank, go(DataEven));
    for class in [C::Newline, C::Comma, C::BracketClose, C::BraceClose, C::Hash, C::Dollar] {
        set(&mut t, DataEven, class, accept(TokenKind::Data));
        set(&mut t, DataOdd, class, reject(Reject::Partial));
    }
    set_all(&mut t, DataOdd, HEX, go(DataEven));
    set(&mut t, DataOdd, C::Blank, reject(Reject::Partial));

    // Quoted strings. The body accepts any printable byte; control bytes
    // and invalid UTF-8 stop at the offending byte.
    fill(&mut t, StrBody, go(StrBody));
    set(&mut t, StrBody, C::Quote, go(StrEnd));
    set(&mut t, StrBody, C::Backslash, go(StrEsc));
    set(&mut t, StrBody, C::Newline, reject(Reject::StrEol));
    set(&mut t, StrBody, C::Ctrl, reject(Reject::Ctrl));
    utf8_states(&mut t, StrBody, StrT1, StrT2, StrT3, StrE0, StrEd, StrF0, StrF4);

    fill(&mut t, StrEsc, reject(Reject::BadEsc));
    set(&mut t, StrEsc, C::Newline, reject(Reject::StrEol));
    for class in [C::Quote, C::Backslash, C::Slash, C::LowB, C::LowF, C::LowN, C::LowR, C::LowT] {
        set(&mut t, StrEsc, class, go(StrBody));
    }
    set(&mut t, StrEsc, C::LowU, go(StrU4D));
    set(&mut t, StrEsc, C::UpU, go(StrCap1));

    // `\uXXXX`: four hex digits; a leading D demands 0-7 next, which is
    // exactly the surrogate gap D800..DFFF.
    for s in [StrU4D, StrUD3, StrU4, StrU3, StrU2, StrU1, StrCap1, StrCap2, StrCap3, StrCap4A,
        StrCap4B]
    {
        fill(&mut t, s, reject(Reject::BadUEsc));
        set(&mut t, s, C::Newline, reject(Reject::StrEol));
    }
    set_all(&mut t, StrU4D, HEX, go(StrU3));
    set(&mut t, StrU4D, C::LowD, go(StrUD3));
    set(&mut t, StrU4D, C::UpD, go(StrUD3));
    set_all(&mut t, StrUD3, &[C::D0, C::D1, C::D2_7], go(StrU2));
    set_all(&mut t, StrU4, HEX, go(StrU3));
    set_all(&mut t, StrU3, HEX, go(StrU2));
    set_all(&mut t, StrU2, HEX, go(StrU1));
    set_all(&mut t, StrU1, HEX, go(StrBody));

    // `\UXXXXXXXX`: eight hex digits, at most 0010FFFF, no surrogates. The
    // 0000 prefix re-enters the four-digit machine for the surrogate check.
    set(&mut t, StrCap1, C::D0, go(StrCap2));
    set(&mut t, StrCap2, C::D0, go(StrCap3));
    set(&mut t, StrCap3, C::D0, go(StrCap4A));
    set(&mut t, StrCap3, C::D1, go(StrCap4B));
    set_all(&mut t, StrCap4A, HEX, go(StrU4));
    set(&mut t, StrCap4A, C::D0, go(StrU4D));
    set(&mut t, StrCap4B, C::D0, go(StrU4));

    fill(&mut t, StrEnd, accept(TokenKind::Str));
    set(&mut t, StrEnd, C::Colon, go(QKeyDone));

    // `>` and `|` lines run to the end of the line; a line holding only the
    // sigil and blanks is the empty-marker token.
    fill(&mut t, WrapBlank, go(WrapText));
    set(&mut t, WrapBlank, C::Blank, go(WrapBlank));
    set(&mut t, WrapBlank, C::Newline, accept(TokenKind::WrapEmpty));
    set(&mut t, WrapBlank, C::Ctrl, reject(Reject::Ctrl));
    utf8_hooks(&mut t, WrapBlank, WrapT1, WrapT2, WrapT3, WrapE0, WrapEd, WrapF0, WrapF4);
    fill(&mut t, WrapText, go(WrapText));
    set(&mut t, WrapText, C::Newline, accept(TokenKind::Wrap));
    set(&mut t, WrapText, C::Ctrl, reject(Reject::Ctrl));
    utf8_states(&mut t, WrapText, WrapT1, WrapT2, WrapT3, WrapE0, WrapEd, WrapF0, WrapF4);

    fill(&mut t, PipeBlank, go(PipeText));
    set(&mut t, PipeBlank, C::Blank, go(PipeBlank));
    set(&mut t, PipeBlank, C::Newline, accept(TokenKind::PipeEmpty));
    set(&mut t, PipeBlank, C::Ctrl, reject(Reject::Ctrl));
    utf8_hooks(&mut t, PipeBlank, PipeT1, PipeT2, PipeT3, PipeE0, PipeEd, PipeF0, PipeF4);
    fill(&mut t, PipeText, go(PipeText));
    set(&mut t, PipeText, C::Newline, accept(TokenKind::Pipe));
    set(&mut t, PipeText, C::Ctrl, reject(Reject::Ctrl));
    utf8_states(&mut t, PipeText, PipeT1, PipeT2, PipeT3, PipeE0, PipeEd, PipeF0, PipeF4);

    // `!` tolerates trailing blanks only.
    fill(&mut t, BangLine, reject(Reject::BangSuffix));
    set(&mut t, BangLine, C::Blank, go(BangLine));
    set(&mut t, BangLine, C::Newline, accept(TokenKind::Bang));

    // `#` comments run to the end of the line, UTF-8 validated.
    fill(&mut t, CommentBody, go(CommentBody));
    set(&mut t, CommentBody, C::Newline, accept(TokenKind::Comment));
    set(&mut t, CommentBody, C::Ctrl, reject(Reject::Ctrl));
    utf8_states(&mut t, CommentBody, ComT1, ComT2, ComT3, ComE0, ComEd, ComF0, ComF4);

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs the DFA alone over a line (which must end in `\n`), returning
    /// the terminal entry and how many bytes were consumed.
    fn scan(line: &[u8]) -> (u8, usize) {
        let mut state = START_STATE;
        let mut i = 0;
        while i < line.len() {
            let class = crate::classes::classify(line[i]);
            state = LEX_TABLE[state as usize][class as usize];
            if state & FLAG_DONE != 0 {
                return (state, i);
            }
            i += 1;
        }
        panic!("DFA ran off the end of {line:?}");
    }

    fn kind_of(line: &[u8]) -> TokenKind {
        let (result, _) = scan(line);
        assert!(result & FLAG_OK != 0, "{line:?} rejected: {result:#x}");
        accept_kind(result)
    }

    fn error_of(line: &[u8]) -> ErrorCode {
        let (result, _) = scan(line);
        assert!(result & FLAG_OK == 0, "{line:?} accepted");
        reject_code(result)
    }

    #[test]
    fn test_every_state_terminates_on_newline() {
        for state in 0..LEX_TABLE.len() {
            let entry = LEX_TABLE[state][Class::Newline as usize];
            assert!(entry & FLAG_DONE != 0, "state {state} loops on newline");
        }
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kind_of(b"0\n"), TokenKind::Int);
        assert_eq!(kind_of(b"-12\n"), TokenKind::Int);
        assert_eq!(kind_of(b"+7\n"), TokenKind::Int);
        assert_eq!(kind_of(b"1.5\n"), TokenKind::Float);
        assert_eq!(kind_of(b"0.0\n"), TokenKind::Float);
        assert_eq!(kind_of(b"1e0\n"), TokenKind::Float);
        assert_eq!(kind_of(b"1E0\n"), TokenKind::Float);
        assert_eq!(kind_of(b"1.5e-10\n"), TokenKind::Float);
        assert_eq!(error_of(b"1.\n"), ErrorCode::BadWord);
        assert_eq!(error_of(b"01\n"), ErrorCode::BadWord);
        assert_eq!(error_of(b"0x0\n"), ErrorCode::BadWord);
        assert_eq!(error_of(b"1e\n"), ErrorCode::BadWord);
        assert_eq!(error_of(b"1e-\n"), ErrorCode::BadWord);
        assert_eq!(error_of(b"1_\n"), ErrorCode::BadWord);
    }

    #[test]
    fn test_keywords_and_keys() {
        assert_eq!(kind_of(b"null\n"), TokenKind::Null);
        assert_eq!(kind_of(b"true\n"), TokenKind::True);
        assert_eq!(kind_of(b"false\n"), TokenKind::False);
        assert_eq!(kind_of(b"inf\n"), TokenKind::Inf);
        assert_eq!(kind_of(b"+inf\n"), TokenKind::Inf);
        assert_eq!(kind_of(b"-inf\n"), TokenKind::NegInf);
        assert_eq!(kind_of(b"nan\n"), TokenKind::Nan);
        assert_eq!(error_of(b"nul\n"), ErrorCode::BadWord);
        assert_eq!(error_of(b"nulll\n"), ErrorCode::BadWord);
        assert_eq!(error_of(b"floop\n"), ErrorCode::BadWord);

        assert_eq!(kind_of(b":\n"), TokenKind::Key);
        assert_eq!(kind_of(b"a:\n"), TokenKind::Key);
        assert_eq!(kind_of(b"null:\n"), TokenKind::Key);
        assert_eq!(kind_of(b"1.1e:\n"), TokenKind::Key);
        assert_eq!(kind_of(b"+-./_:\n"), TokenKind::Key);
    }

    #[test]
    fn test_strings() {
        assert_eq!(kind_of(b"\"\"\n"), TokenKind::Str);
        assert_eq!(kind_of(b"\"hi there\"\n"), TokenKind::Str);
        assert_eq!(kind_of(b"\"\\n\\t\\\\\\\"\\/\"\n"), TokenKind::Str);
        assert_eq!(kind_of(b"\"\\u0041\"\n"), TokenKind::Str);
        assert_eq!(kind_of(b"\"\\uD7FF\"\n"), TokenKind::Str);
        assert_eq!(kind_of(b"\"\\U0010FFFF\"\n"), TokenKind::Str);
        assert_eq!(kind_of(b"\"\\U0000D7FF\"\n"), TokenKind::Str);
        assert_eq!(kind_of(b"\"k\":\n"), TokenKind::QKey);

        assert_eq!(error_of(b"\"\n"), ErrorCode::StrEol);
        assert_eq!(error_of(b"\"\\q\"\n"), ErrorCode::BadEsc);
        assert_eq!(error_of(b"\"\\uD800\"\n"), ErrorCode::BadUEsc);
        assert_eq!(error_of(b"\"\\udfff\"\n"), ErrorCode::BadUEsc);
        assert_eq!(error_of(b"\"\\U0000D800\"\n"), ErrorCode::BadUEsc);
        assert_eq!(error_of(b"\"\\U00110000\"\n"), ErrorCode::BadUEsc);
        assert_eq!(error_of(b"\"\\U00200000\"\n"), ErrorCode::BadUEsc);
        assert_eq!(error_of(b"\"\\u123\"\n"), ErrorCode::BadUEsc);
    }

    #[test]
    fn test_string_utf8_validation() {
        assert_eq!(kind_of("\"é\"\n".as_bytes()), TokenKind::Str);
        assert_eq!(kind_of("\"亞\"\n".as_bytes()), TokenKind::Str);
        assert_eq!(kind_of(b"\"\xED\x9F\xBF\"\n"), TokenKind::Str);
        assert_eq!(kind_of(b"\"\xEE\x80\x80\"\n"), TokenKind::Str);
        assert_eq!(kind_of(b"\"\xF4\x8F\xBF\xBF\"\n"), TokenKind::Str);

        assert_eq!(error_of(b"\"\x80\"\n"), ErrorCode::Utf8Head);
        assert_eq!(error_of(b"\"\xFF\"\n"), ErrorCode::Utf8Head);
        assert_eq!(error_of(b"\"\xC0\x80\"\n"), ErrorCode::Utf8Head);
        assert_eq!(error_of(b"\"\xC2A\"\n"), ErrorCode::Utf8Tail);
        assert_eq!(error_of(b"\"\xE0\x9F\xBF\"\n"), ErrorCode::Utf8Tail);
        assert_eq!(error_of(b"\"\xED\xA0\x80\"\n"), ErrorCode::Utf8Tail);
        assert_eq!(error_of(b"\"\xF0\x8F\xBF\xBF\"\n"), ErrorCode::Utf8Tail);
        assert_eq!(error_of(b"\"\xF4\x90\x80\x80\"\n"), ErrorCode::Utf8Tail);
    }

    #[test]
    fn test_data() {
        assert_eq!(kind_of(b"$\n"), TokenKind::Data);
        assert_eq!(kind_of(b"$ab\n"), TokenKind::Data);
        assert_eq!(kind_of(b"$ ab cd\n"), TokenKind::Data);
        assert_eq!(kind_of(b"$ABCDEF\n"), TokenKind::Data);
        assert_eq!(error_of(b"$a\n"), ErrorCode::Partial);
        assert_eq!(error_of(b"$ a b\n"), ErrorCode::Partial);
        assert_eq!(error_of(b"$ag\n"), ErrorCode::DataChar);
        assert_eq!(error_of(b"$abcdefgh\n"), ErrorCode::DataChar);
    }

    #[test]
    fn test_line_tokens() {
        assert_eq!(kind_of(b">\n"), TokenKind::WrapEmpty);
        assert_eq!(kind_of(b"> \t\n"), TokenKind::WrapEmpty);
        assert_eq!(kind_of(b"> one\n"), TokenKind::Wrap);
        assert_eq!(kind_of(b">>\n"), TokenKind::Wrap);
        assert_eq!(kind_of(b"|\n"), TokenKind::PipeEmpty);
        assert_eq!(kind_of(b"| one\n"), TokenKind::Pipe);
        assert_eq!(kind_of(b"!\n"), TokenKind::Bang);
        assert_eq!(kind_of(b"! \t\n"), TokenKind::Bang);
        assert_eq!(error_of(b"!!\n"), ErrorCode::BangSuffix);
        assert_eq!(error_of(b"! one\n"), ErrorCode::BangSuffix);
        assert_eq!(kind_of(b"# comment\n"), TokenKind::Comment);
        assert_eq!(kind_of(b"#\n"), TokenKind::Comment);
    }
}
