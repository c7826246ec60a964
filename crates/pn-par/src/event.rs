//! Parse events: what the parser yields, one at a time.

/// Whether an event came from the bracketed inline syntax or the
/// indentation-based block syntax. Writers use this to reproduce shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Form {
    Short,
    Long,
}

/// Payload of one parse event.
///
/// Leaf variants own their decoded values. `Float` carries a flag for
/// values that were clamped to ±∞, a subnormal, or ±0 during conversion;
/// the stream continues past them and callers decide whether that is fatal.
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    Null,
    Bool(bool),
    Int(i64),
    Float { value: f64, clamped: bool },
    Data(Vec<u8>),
    Str(String),
    ArrayIn,
    ArrayOut,
    MapIn,
    MapOut,
}

/// One event of the stream.
///
/// `key` is present exactly when the event sits directly inside a map; a
/// container's key arrives on its `ArrayIn`/`MapIn`, never on the `Out`.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub key: Option<String>,
    pub form: Form,
    pub kind: EventKind,
}

impl Event {
    pub(crate) fn new(key: Option<String>, form: Form, kind: EventKind) -> Self {
        Self { key, form, kind }
    }
}
