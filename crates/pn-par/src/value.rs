//! Materialized value trees: a thin consumer of the event stream.
//!
//! The parser's contract is the event stream; this module is the optional
//! layer for callers that want the whole document as one value. It makes no
//! decisions of its own: containers nest as the In/Out events say, map
//! entries land in insertion order, and a repeated key keeps its first
//! position with its last value.

use std::io::BufRead;

use indexmap::IndexMap;
use pn_lex::Lexer;
use pn_util::Error;

use crate::event::EventKind;
use crate::parser::Parser;

/// A Procyon value.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Data(Vec<u8>),
    String(String),
    Array(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Shorthand for building array values in code.
    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Value {
        Value::Array(items.into_iter().collect())
    }

    /// Shorthand for building map values in code.
    pub fn map<'k, I: IntoIterator<Item = (&'k str, Value)>>(entries: I) -> Value {
        Value::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

/// Equality mirrors the canonical comparison: NaN equals NaN (so parsed
/// trees containing `nan` compare usefully), maps compare entry by entry in
/// order.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Data(a), Value::Data(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Data(value.to_vec())
    }
}

/// Parses a whole document into a value tree.
pub fn parse<R: BufRead>(reader: R) -> Result<Value, Error> {
    let mut lexer = Lexer::new(reader);
    let mut parser = Parser::new(&mut lexer);

    let mut root = Value::Null;
    let mut stack: Vec<(Option<String>, Value)> = Vec::new();
    while let Some(step) = parser.next_event() {
        let event = step?;
        match event.kind {
            EventKind::ArrayIn => stack.push((event.key, Value::Array(Vec::new()))),
            EventKind::MapIn => stack.push((event.key, Value::Map(IndexMap::new()))),
            EventKind::ArrayOut | EventKind::MapOut => {
                if let Some((key, value)) = stack.pop() {
                    attach(&mut stack, &mut root, key, value);
                }
            }
            leaf => {
                let value = match leaf {
                    EventKind::Null => Value::Null,
                    EventKind::Bool(b) => Value::Bool(b),
                    EventKind::Int(i) => Value::Int(i),
                    EventKind::Float { value, .. } => Value::Float(value),
                    EventKind::Data(bytes) => Value::Data(bytes),
                    EventKind::Str(text) => Value::String(text),
                    _ => Value::Null,
                };
                attach(&mut stack, &mut root, event.key, value);
            }
        }
    }
    Ok(root)
}

/// Adds a finished value to its container, or makes it the document root.
fn attach(
    stack: &mut [(Option<String>, Value)],
    root: &mut Value,
    key: Option<String>,
    value: Value,
) {
    match stack.last_mut() {
        None => *root = value,
        Some((_, Value::Array(items))) => items.push(value),
        Some((_, Value::Map(map))) => {
            map.insert(key.unwrap_or_default(), value);
        }
        Some(_) => {}
    }
}
