use crate::mapping::rule::Transform;
use crate::value::Value;
use anyhow::{anyhow, bail};
use std::collections::HashMap;

/// Named conversions that rules refer to by `format` (or, in plan files, by
/// `transform`).
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<String, Transform>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the `string` and `json` converters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("string", Transform::new(parse_scalar, stringify_scalar));
        registry.register("json", Transform::new(parse_json_text, to_json_text));
        registry
    }

    /// Register `transform` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, transform: Transform) {
        self.entries.insert(name.into(), transform);
    }

    pub fn get(&self, name: &str) -> Option<&Transform> {
        self.entries.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ---------------------------------------------------------------------------
// string: scalars <-> their text
// ---------------------------------------------------------------------------

fn stringify_scalar(value: Value) -> anyhow::Result<Value> {
    match value {
        Value::Int(i) => Ok(Value::String(i.to_string())),
        Value::Float(f) => Ok(Value::String(f.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        v @ (Value::String(_) | Value::Null | Value::Undefined) => Ok(v),
        other => bail!("cannot convert {} to string", other.type_name()),
    }
}

fn parse_scalar(value: Value) -> anyhow::Result<Value> {
    let Value::String(s) = value else {
        return Ok(value);
    };
    if let Ok(i) = s.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    if let Ok(f) = s.parse::<f64>() {
        return Ok(Value::Float(f));
    }
    match s.as_str() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Ok(Value::String(s)),
    }
}

// ---------------------------------------------------------------------------
// json: any value <-> JSON text
// ---------------------------------------------------------------------------

fn to_json_text(value: Value) -> anyhow::Result<Value> {
    let json = serde_json::Value::from(&value);
    Ok(Value::String(serde_json::to_string(&json)?))
}

fn parse_json_text(value: Value) -> anyhow::Result<Value> {
    match value {
        Value::String(s) => {
            let json: serde_json::Value =
                serde_json::from_str(&s).map_err(|e| anyhow!("invalid JSON text: {e}"))?;
            Ok(Value::from(json))
        }
        Value::Undefined => Ok(Value::Undefined),
        other => bail!("expected JSON text, found {}", other.type_name()),
    }
}
