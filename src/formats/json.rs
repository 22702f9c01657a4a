use crate::error;
use crate::mapping::PlanFile;
use crate::value::Value;

/// Parse JSON text into a document.
pub fn from_str(input: &str) -> error::Result<Value> {
    let json: serde_json::Value = serde_json::from_str(input)?;
    Ok(Value::from(json))
}

/// Serialize a document as pretty-printed JSON.
pub fn to_string_pretty(value: &Value) -> error::Result<String> {
    let json = serde_json::Value::from(value);
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Serialize a document as compact JSON.
pub fn to_string(value: &Value) -> error::Result<String> {
    let json = serde_json::Value::from(value);
    Ok(serde_json::to_string(&json)?)
}

pub fn plan_from_str(input: &str) -> error::Result<PlanFile> {
    Ok(serde_json::from_str(input)?)
}
