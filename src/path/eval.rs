//! Extraction and injection along parsed paths.
//!
//! Both walks fan out over arrays. An iterator segment fans the rest of the
//! path over the elements it selects. An object-field segment that meets an
//! array it did not ask for applies itself, and everything after it, to each
//! element instead (auto-vectorization). Missing data is never an error: it
//! reads as `Undefined`.

use crate::path::ast::{Path, PathSegment, SegmentKind};
use crate::value::Value;

/// Read the value at `path` in `document`.
///
/// The document is not modified; the result is an independent copy.
pub fn extract_value(document: &Value, path: &Path) -> Value {
    extract(document, path.segments())
}

/// Write `value` at `path` in `destination`, returning the updated document.
///
/// Intermediate containers are created as needed. Writing `Undefined` is a
/// no-op at any depth, so a missing value never leaves an empty container
/// or a `null` slot behind. When `path` fans out over
/// an array, `value` is expected to be an array with one entry per branch,
/// exactly as [`extract_value`] would produce it.
pub fn inject_value(destination: &Value, value: Value, path: &Path) -> Value {
    inject_into(destination.clone(), value, path)
}

/// Like [`inject_value`], but takes ownership of `destination` instead of
/// copying it.
pub fn inject_into(destination: Value, value: Value, path: &Path) -> Value {
    inject(destination, value, path.segments())
}

fn extract(current: &Value, segments: &[PathSegment]) -> Value {
    let Some((first, rest)) = segments.split_first() else {
        return current.clone();
    };
    match (&first.kind, current) {
        (SegmentKind::ArrayIterator(iter), _) => Value::Array(
            iter.get_value(current)
                .iter()
                .map(|item| extract(item, rest))
                .collect(),
        ),
        (SegmentKind::ObjectIndex { .. }, Value::Array(items)) => Value::Array(
            items.iter().map(|item| extract(item, segments)).collect(),
        ),
        (kind, _) => extract(&kind.get_value(current), rest),
    }
}

fn inject(destination: Value, value: Value, segments: &[PathSegment]) -> Value {
    if value.is_undefined() {
        return destination;
    }
    let Some((first, rest)) = segments.split_first() else {
        return value;
    };
    match (&first.kind, destination) {
        (SegmentKind::ArrayIterator(iter), destination) => {
            let existing = iter.get_value(&destination);
            let branches = match value {
                Value::Array(values) => values,
                Value::Undefined => Vec::new(),
                other => vec![other],
            };
            let rebuilt: Vec<Value> = branches
                .into_iter()
                .enumerate()
                .map(|(i, branch)| {
                    let current = existing.get(i).cloned().unwrap_or_default();
                    inject(current, branch, rest)
                })
                .collect();
            iter.set_value(destination, Value::Array(rebuilt))
        }
        (SegmentKind::ObjectIndex { .. }, Value::Array(items)) => {
            Value::Array(inject_each(items, value, segments))
        }
        (kind, destination) => {
            let child = kind.get_value(&destination);
            let updated = inject(child, value, rest);
            kind.set_value(destination, updated)
        }
    }
}

/// Auto-vectorized write: an array `value` is distributed element by element
/// (elements without a counterpart stay as they are); anything else is
/// written into every element.
fn inject_each(items: Vec<Value>, value: Value, segments: &[PathSegment]) -> Vec<Value> {
    match value {
        Value::Array(values) => {
            let mut values = values.into_iter();
            items
                .into_iter()
                .map(|item| match values.next() {
                    Some(v) => inject(item, v, segments),
                    None => item,
                })
                .collect()
        }
        other => items
            .into_iter()
            .map(|item| inject(item, other.clone(), segments))
            .collect(),
    }
}
