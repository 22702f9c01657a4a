use crate::path::ast::SegmentKind;
use crate::path::MAX_PADDING;
use crate::value::Value;
use indexmap::IndexMap;

impl SegmentKind {
    /// Read this step from `input`. Missing data reads as `Undefined`; an
    /// iterator always reads as an array.
    pub fn get_value(&self, input: &Value) -> Value {
        match self {
            SegmentKind::ObjectIndex { name } => match input {
                Value::Map(map) => map.get(name).cloned().unwrap_or(Value::Undefined),
                _ => Value::Undefined,
            },
            SegmentKind::ArrayIndex { index } => match input {
                Value::Array(items) => resolve_index(*index, items.len())
                    .and_then(|i| items.get(i))
                    .cloned()
                    .unwrap_or(Value::Undefined),
                _ => Value::Undefined,
            },
            SegmentKind::ArrayIterator(iter) => Value::Array(iter.get_value(input)),
        }
    }

    /// Write `value` at this step of `destination` and return the result.
    ///
    /// A destination of the wrong shape is replaced by an empty map or array.
    /// Writing `Undefined` to an object member leaves the member absent. An
    /// index more than [`MAX_PADDING`] past the end is not written.
    pub fn set_value(&self, destination: Value, value: Value) -> Value {
        match self {
            SegmentKind::ObjectIndex { name } => {
                let mut map = match destination {
                    Value::Map(map) => map,
                    _ => IndexMap::new(),
                };
                if value.is_undefined() {
                    map.shift_remove(name);
                } else {
                    map.insert(name.clone(), value);
                }
                Value::Map(map)
            }
            SegmentKind::ArrayIndex { index } => {
                let mut items = match destination {
                    Value::Array(items) => items,
                    _ => Vec::new(),
                };
                // An index before the first element addresses nothing.
                if let Some(i) = resolve_index(*index, items.len()) {
                    if i > items.len().saturating_add(MAX_PADDING) {
                        tracing::warn!(
                            index = i,
                            len = items.len(),
                            "index too far past the end of the array, skipped"
                        );
                    } else if i >= items.len() {
                        items.resize(i, Value::Null);
                        items.push(value);
                    } else {
                        items[i] = value;
                    }
                }
                Value::Array(items)
            }
            SegmentKind::ArrayIterator(iter) => iter.set_value(destination, value),
        }
    }
}

/// Map a signed index onto `0..`, counting negative indices from `len`.
/// Returns `None` for negative indices reaching before the first element.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    if index >= 0 {
        usize::try_from(index).ok()
    } else {
        let back = usize::try_from(index.unsigned_abs()).ok()?;
        len.checked_sub(back)
    }
}
