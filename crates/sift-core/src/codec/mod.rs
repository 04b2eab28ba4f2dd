mod decode;
mod encode;
mod tags;

#[cfg(test)]
mod tests;

use crate::{error::Error, model::FieldType, value::Value};
use serde::Serialize;

// re-exports
pub use decode::{
    ConditionSeed, ModificationSeed, ValueSeed, decode_condition, decode_modification,
    decode_value,
};

/// Encode any canonically-serializable value to its canonical text form.
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value).map_err(|e| Error::serialization(e.to_string()))
}

/// Canonical text form of a plain value.
pub fn value_to_canonical_json(value: &Value) -> Result<String, Error> {
    to_canonical_json(value)
}

/// Parse a plain value from canonical text, directed by its shape.
pub fn value_from_canonical_json(text: &str, ty: &FieldType) -> Result<Value, Error> {
    let json = parse(text)?;
    decode_value(&json, ty)
}

/// Parse a condition from canonical text, directed by the root shape.
pub fn condition_from_canonical_json(
    text: &str,
    ty: &FieldType,
) -> Result<crate::condition::ConditionNode, Error> {
    let json = parse(text)?;
    decode_condition(&json, ty)
}

/// Parse a modification from canonical text, directed by the root shape.
pub fn modification_from_canonical_json(
    text: &str,
    ty: &FieldType,
) -> Result<crate::modification::ModificationNode, Error> {
    let json = parse(text)?;
    decode_modification(&json, ty)
}

fn parse(text: &str) -> Result<serde_json::Value, Error> {
    serde_json::from_str(text).map_err(|e| Error::serialization(e.to_string()))
}
