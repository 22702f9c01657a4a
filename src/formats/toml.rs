use crate::error::{self, FieldmapError};
use crate::mapping::PlanFile;
use crate::value::Value;

/// Parse TOML text into a document. Datetimes become strings.
pub fn from_str(input: &str) -> error::Result<Value> {
    let table: toml::Value = toml::from_str(input)?;
    Ok(toml_to_value(table))
}

/// Serialize a document as TOML.
///
/// The document must be a map. TOML has no null, so null and missing map
/// members are left out. A null inside an array is an error, since dropping
/// it would shift the elements after it.
pub fn to_string(value: &Value) -> error::Result<String> {
    let table = match value_to_toml(value)? {
        Some(table @ toml::Value::Table(_)) => table,
        _ => {
            return Err(FieldmapError::format(
                "TOML requires a top-level table (map)",
            ))
        }
    };
    toml::to_string_pretty(&table).map_err(|e| FieldmapError::format(e.to_string()))
}

pub fn plan_from_str(input: &str) -> error::Result<PlanFile> {
    Ok(toml::from_str(input)?)
}

fn toml_to_value(t: toml::Value) -> Value {
    match t {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Int(i),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_value).collect()),
        toml::Value::Table(table) => Value::Map(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_value(v)))
                .collect(),
        ),
    }
}

fn value_to_toml(value: &Value) -> error::Result<Option<toml::Value>> {
    let converted = match value {
        Value::Undefined | Value::Null => return Ok(None),
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Int(i) => toml::Value::Integer(*i),
        Value::Float(f) => toml::Value::Float(*f),
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Array(arr) => {
            let mut out = Vec::with_capacity(arr.len());
            for (i, item) in arr.iter().enumerate() {
                match value_to_toml(item)? {
                    Some(item) => out.push(item),
                    None => {
                        return Err(FieldmapError::format(format!(
                            "TOML cannot represent null array elements (element {i})"
                        )))
                    }
                }
            }
            toml::Value::Array(out)
        }
        Value::Map(map) => {
            let mut table = toml::map::Map::new();
            for (k, v) in map {
                if let Some(v) = value_to_toml(v)? {
                    table.insert(k.clone(), v);
                }
            }
            toml::Value::Table(table)
        }
    };
    Ok(Some(converted))
}
