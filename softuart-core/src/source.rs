//! Byte source iterator
//!
//! Turns the values a caller may hand to a write (integers, text, nested
//! lists, repeat wrappers) into one flat sequence of bytes. This knows
//! nothing about serial framing.

use core::iter::FusedIterator;
use core::slice;

use heapless::Vec;

/// Deepest accepted nesting of lists and repeat wrappers
pub const MAX_NESTING: usize = 15;

/// One frame per nesting level plus the root
const STACK_DEPTH: usize = MAX_NESTING + 1;

/// Errors from turning a value into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceError {
    /// Value nests deeper than [`MAX_NESTING`]
    NestingTooDeep,
}

/// Heterogeneous byte-producing value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    /// Integer, sent as its low byte
    Int(i64),
    /// Text, sent as its UTF-8 bytes
    Text(&'a str),
    /// Raw bytes
    Bytes(&'a [u8]),
    /// Ordered sequence, flattened recursively
    List(&'a [Value<'a>]),
    /// `value` sent `count` times
    Repeat { value: &'a Value<'a>, count: usize },
}

impl<'a> Value<'a> {
    /// Check if this value nests deeper than `limit` levels
    ///
    /// A leaf is one level. Recursion stops once `limit` is used up, so
    /// the stack cost is bounded by `limit` however deep the value is.
    pub fn exceeds(&self, limit: usize) -> bool {
        let Some(inner) = limit.checked_sub(1) else {
            return true;
        };
        match self {
            Value::Int(_) | Value::Text(_) | Value::Bytes(_) => false,
            Value::List(items) => items.iter().any(|item| item.exceeds(inner)),
            Value::Repeat { value, .. } => value.exceeds(inner),
        }
    }

    /// Lazy iterator over the bytes of this value
    ///
    /// Fails before producing anything if the value nests too deeply.
    pub fn bytes(&'a self) -> Result<ByteIter<'a>, SourceError> {
        if self.exceeds(MAX_NESTING) {
            return Err(SourceError::NestingTooDeep);
        }
        let mut stack = Vec::new();
        let _ = stack.push(Frame::Values(slice::from_ref(self).iter()));
        Ok(ByteIter { stack })
    }
}

impl From<u8> for Value<'_> {
    fn from(byte: u8) -> Self {
        Value::Int(byte as i64)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(text: &'a str) -> Self {
        Value::Text(text)
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Value::Bytes(bytes)
    }
}

impl<'a> From<&'a [Value<'a>]> for Value<'a> {
    fn from(items: &'a [Value<'a>]) -> Self {
        Value::List(items)
    }
}

#[derive(Debug, Clone)]
enum Frame<'a> {
    Raw(slice::Iter<'a, u8>),
    Values(slice::Iter<'a, Value<'a>>),
    Repeat { value: &'a Value<'a>, remaining: usize },
}

enum Step<'a> {
    Byte(u8),
    Enter(&'a Value<'a>),
    Pop,
}

/// Flattening byte iterator, see [`Value::bytes`]
#[derive(Debug, Clone)]
pub struct ByteIter<'a> {
    stack: Vec<Frame<'a>, STACK_DEPTH>,
}

impl<'a> ByteIter<'a> {
    /// Descend into `value`, returning its byte if it is an integer
    fn enter(&mut self, value: &'a Value<'a>) -> Option<u8> {
        let frame = match value {
            Value::Int(n) => return Some(*n as u8),
            Value::Text(text) => Frame::Raw(text.as_bytes().iter()),
            Value::Bytes(bytes) => Frame::Raw(bytes.iter()),
            Value::List(items) => Frame::Values(items.iter()),
            Value::Repeat { value, count } => Frame::Repeat {
                value: *value,
                remaining: *count,
            },
        };
        // Depth was checked against the stack capacity in `Value::bytes`
        let _ = self.stack.push(frame);
        None
    }
}

impl Iterator for ByteIter<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            let step = match self.stack.last_mut()? {
                Frame::Raw(bytes) => bytes.next().map_or(Step::Pop, |b| Step::Byte(*b)),
                Frame::Values(values) => values.next().map_or(Step::Pop, Step::Enter),
                Frame::Repeat { value, remaining } => {
                    if *remaining == 0 {
                        Step::Pop
                    } else {
                        *remaining -= 1;
                        Step::Enter(*value)
                    }
                }
            };

            match step {
                Step::Byte(byte) => return Some(byte),
                Step::Pop => {
                    self.stack.pop();
                }
                Step::Enter(value) => {
                    if let Some(byte) = self.enter(value) {
                        return Some(byte);
                    }
                }
            }
        }
    }
}

impl FusedIterator for ByteIter<'_> {}
