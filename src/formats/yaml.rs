use crate::error::{self, FieldmapError};
use crate::mapping::PlanFile;
use crate::value::Value;
use indexmap::IndexMap;
use serde::Deserialize;

/// Parse YAML text into a document.
///
/// A stream of several `---`-separated documents becomes an array; a single
/// document is returned as is, and an empty stream as `null`.
pub fn from_str(input: &str) -> error::Result<Value> {
    let mut docs = serde_yaml::Deserializer::from_str(input)
        .map(|de| {
            let yaml = serde_yaml::Value::deserialize(de).map_err(FieldmapError::from)?;
            Ok(yaml_to_value(yaml))
        })
        .collect::<error::Result<Vec<Value>>>()?;

    match docs.len() {
        0 => Ok(Value::Null),
        1 => Ok(docs.remove(0)),
        _ => Ok(Value::Array(docs)),
    }
}

/// Serialize a document as YAML.
pub fn to_string(value: &Value) -> error::Result<String> {
    Ok(serde_yaml::to_string(&serde_json::Value::from(value))?)
}

pub fn plan_from_str(input: &str) -> error::Result<PlanFile> {
    Ok(serde_yaml::from_str(input)?)
}

fn key_text(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => format!("{other:?}"),
    }
}

fn yaml_to_value(yaml: serde_yaml::Value) -> Value {
    match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.into_iter().map(yaml_to_value).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            // `<<` merge keys: merged entries never override explicit keys.
            let mut merged = IndexMap::new();
            let mut explicit = IndexMap::new();
            for (k, v) in mapping {
                match (key_text(k), v) {
                    (key, serde_yaml::Value::Mapping(m)) if key == "<<" => {
                        merge_into(&mut merged, m);
                    }
                    (key, serde_yaml::Value::Sequence(seq)) if key == "<<" => {
                        for item in seq {
                            if let serde_yaml::Value::Mapping(m) = item {
                                merge_into(&mut merged, m);
                            }
                        }
                    }
                    (key, v) => {
                        explicit.insert(key, yaml_to_value(v));
                    }
                }
            }
            merged.extend(explicit);
            Value::Map(merged)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_value(tagged.value),
    }
}

fn merge_into(target: &mut IndexMap<String, Value>, mapping: serde_yaml::Mapping) {
    for (k, v) in mapping {
        target.entry(key_text(k)).or_insert_with(|| yaml_to_value(v));
    }
}
