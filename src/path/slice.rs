//! Signed array slices (`[[start]]`, `[[start,size]]`).
//!
//! A slice is a window of `|size|` consecutive positions beginning at
//! `start` (counted from the end when negative). A negative `size` walks the
//! same window backward: `[[1,-2]]` over `[10, 20, 30, 40, 50]` yields
//! `[30, 20]`. Reads and writes resolve the window with the same arithmetic,
//! so writing back what was read restores the addressed elements exactly.

use crate::path::MAX_PADDING;
use crate::value::Value;

/// Array slice segment. `size: None` runs to the natural end of the array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayIterator {
    pub start: i64,
    pub size: Option<i64>,
}

/// A resolved, forward-ordered window over an array of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    from: usize,
    count: usize,
    /// Window positions cut off before index 0.
    overhang: usize,
    backward: bool,
}

impl ArrayIterator {
    pub fn new(start: i64, size: Option<i64>) -> Self {
        ArrayIterator { start, size }
    }

    fn is_backward(&self) -> bool {
        matches!(self.size, Some(size) if size < 0)
    }

    /// Resolve the window against an array of length `len`.
    ///
    /// Positions that fall before index 0 shrink the window from the front;
    /// an explicit size whose window lies entirely before 0 is empty. The end
    /// of the window is not clamped to `len`.
    fn window(&self, len: usize) -> Window {
        let len = len as i64;
        let from = if self.start < 0 {
            len.saturating_add(self.start)
        } else {
            self.start
        };
        match self.size {
            None => Window {
                from: from.max(0) as usize,
                count: (len - from.clamp(0, len)) as usize,
                overhang: 0,
                backward: false,
            },
            Some(size) => {
                let span = size.unsigned_abs();
                let mut count = span;
                let mut overhang = 0;
                let mut from = from;
                if from < 0 {
                    overhang = from.unsigned_abs().min(span);
                    count -= overhang;
                    from = 0;
                }
                Window {
                    from: from as usize,
                    count: count as usize,
                    overhang: overhang as usize,
                    backward: size < 0,
                }
            }
        }
    }

    /// Read the addressed elements, in the slice's direction.
    ///
    /// A non-array source reads as an empty array. The result is always a
    /// fresh copy.
    pub fn get_value(&self, source: &Value) -> Vec<Value> {
        if self.size == Some(0) {
            return Vec::new();
        }
        let items: &[Value] = match source {
            Value::Array(items) => items,
            _ => &[],
        };
        let window = self.window(items.len());
        let from = window.from.min(items.len());
        let to = window.from.saturating_add(window.count).min(items.len());
        let mut out = items[from..to].to_vec();
        if window.backward {
            out.reverse();
        }
        out
    }

    /// Write `value` into the addressed window of `destination`.
    ///
    /// A non-array destination is replaced by an empty array first. A
    /// non-array `value` is written as a single element (nothing, for
    /// `Undefined`). At most `|size|` elements are written; writing past the
    /// end of the destination pads the gap with `null`, unless the gap is
    /// wider than [`MAX_PADDING`], in which case nothing is written.
    ///
    /// When the window overhangs index 0, the values are aligned to its end:
    /// leading values that land before index 0 are dropped, so the value
    /// that lands on index 0 is the one a read would put there.
    pub fn set_value(&self, destination: Value, value: Value) -> Value {
        let items = match destination {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        if self.size == Some(0) {
            return Value::Array(items);
        }

        let mut values = match value {
            Value::Array(values) => values,
            Value::Undefined => Vec::new(),
            other => vec![other],
        };
        if let Some(size) = self.size {
            values.truncate(usize::try_from(size.unsigned_abs()).unwrap_or(usize::MAX));
        }
        if self.is_backward() {
            values.reverse();
        }

        let window = match self.size {
            None => Window {
                count: values.len(),
                ..self.window(items.len())
            },
            Some(_) => self.window(items.len()),
        };
        let skip = window
            .overhang
            .min(values.len().saturating_sub(window.count));
        values.drain(..skip);
        values.truncate(window.count);
        if values.is_empty() {
            return Value::Array(items);
        }
        if window.from > items.len().saturating_add(MAX_PADDING) {
            tracing::warn!(
                from = window.from,
                len = items.len(),
                "slice write too far past the end of the array, skipped"
            );
            return Value::Array(items);
        }

        Value::Array(splice(items, window.from, values))
    }
}

/// Build `head ++ middle ++ tail`, where `middle` replaces as many elements
/// as it holds starting at `from`.
fn splice(items: Vec<Value>, from: usize, middle: Vec<Value>) -> Vec<Value> {
    let replaced_end = from.saturating_add(middle.len());
    let mut out = Vec::with_capacity(items.len().max(replaced_end));
    let mut rest = items.into_iter();

    out.extend(rest.by_ref().take(from));
    while out.len() < from {
        out.push(Value::Null);
    }
    out.extend(middle);
    out.extend(rest.skip(replaced_end - from));
    out
}
