use crate::{
    codec::tags::{condition_alias, modification_alias},
    condition::{Condition, ConditionNode, GEO_DISTANCE_UNLIMITED_KM},
    error::Error,
    model::{FieldType, IntWidth},
    modification::{Modification, ModificationNode},
    traits::FieldValue,
    value::{Float32, Float64, GeoPoint, Value},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::{DeserializeSeed, Error as DeError};
use serde::{Deserialize, Deserializer};
use serde_json::{Map as JsonMap, Value as Json};
use std::str::FromStr;
use ulid::Ulid;

/// Defaults applied when optional payload keys are absent.
const DEFAULT_LEVENSHTEIN_DISTANCE: u8 = 2;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Decode a self-describing value against its declared shape.
pub fn decode_value(json: &Json, ty: &FieldType) -> Result<Value, Error> {
    match ty {
        FieldType::Bool => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| type_error("boolean", json)),

        FieldType::Int(width) => {
            let raw = json
                .as_i64()
                .ok_or_else(|| type_error("integer", json))?;
            check_signed_width(raw, *width)?;
            Ok(Value::Int(raw))
        }
        FieldType::Uint(width) => {
            let raw = json
                .as_u64()
                .ok_or_else(|| type_error("unsigned integer", json))?;
            check_unsigned_width(raw, *width)?;
            Ok(Value::Uint(raw))
        }

        FieldType::Float32 => json
            .as_f64()
            .map(|v| Value::Float32(Float32::new(v as f32)))
            .ok_or_else(|| type_error("number", json)),
        FieldType::Float64 => json
            .as_f64()
            .map(|v| Value::Float64(Float64::new(v)))
            .ok_or_else(|| type_error("number", json)),

        FieldType::Char => {
            let text = json.as_str().ok_or_else(|| type_error("string", json))?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(_), None) => Ok(Value::Text(text.to_string())),
                _ => Err(Error::serialization(format!(
                    "expected a single character, found `{text}`"
                ))),
            }
        }

        FieldType::Text | FieldType::RawText => json
            .as_str()
            .map(|s| Value::Text(s.to_string()))
            .ok_or_else(|| type_error("string", json)),

        FieldType::Timestamp => {
            let text = json.as_str().ok_or_else(|| type_error("string", json))?;
            DateTime::parse_from_rfc3339(text)
                .map(|parsed| Value::Timestamp(parsed.with_timezone(&Utc)))
                .map_err(|e| Error::serialization(format!("invalid instant `{text}`: {e}")))
        }
        FieldType::Date => {
            let text = json.as_str().ok_or_else(|| type_error("string", json))?;
            NaiveDate::from_str(text)
                .map(Value::Date)
                .map_err(|e| Error::serialization(format!("invalid date `{text}`: {e}")))
        }
        FieldType::Time => {
            let text = json.as_str().ok_or_else(|| type_error("string", json))?;
            NaiveTime::from_str(text)
                .map(Value::Time)
                .map_err(|e| Error::serialization(format!("invalid time `{text}`: {e}")))
        }

        FieldType::Ulid => {
            let text = json.as_str().ok_or_else(|| type_error("string", json))?;
            Ulid::from_string(text)
                .map(Value::Ulid)
                .map_err(|e| Error::serialization(format!("invalid ulid `{text}`: {e}")))
        }

        FieldType::Geo => decode_geo(json).map(Value::Geo),

        FieldType::Enum(model) => {
            let text = json.as_str().ok_or_else(|| type_error("string", json))?;
            if !model.variants.is_empty() && !model.variants.iter().any(|v| v == text) {
                return Err(Error::serialization(format!(
                    "unknown variant `{text}` of `{}`",
                    model.serial_name
                )));
            }
            Ok(Value::Enum(text.to_string()))
        }

        FieldType::Option(inner) => {
            if json.is_null() {
                Ok(Value::Null)
            } else {
                decode_value(json, inner)
            }
        }

        FieldType::List(element) => {
            let items = json.as_array().ok_or_else(|| type_error("array", json))?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(decode_value(item, element)?);
            }
            Ok(Value::List(out))
        }
        FieldType::Set(element) => {
            let items = json.as_array().ok_or_else(|| type_error("array", json))?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(decode_value(item, element)?);
            }
            Ok(Value::set_of(out))
        }
        FieldType::Map(value_ty) => {
            let entries = json.as_object().ok_or_else(|| type_error("object", json))?;
            let mut out = Vec::with_capacity(entries.len());
            for (key, entry) in entries {
                out.push((
                    key.clone(),
                    decode_value(entry, value_ty).map_err(|e| e.with_segment(key))?,
                ));
            }
            Ok(Value::map_of(out))
        }

        FieldType::Record(model) => {
            let object = json.as_object().ok_or_else(|| type_error("object", json))?;

            for key in object.keys() {
                if model.field_index(key).is_none() {
                    return Err(Error::serialization(format!(
                        "unknown field `{key}` on `{}`",
                        model.serial_name
                    )));
                }
            }

            let mut entries = Vec::with_capacity(model.fields.len());
            for field in &model.fields {
                let slot = match object.get(&field.name) {
                    Some(raw) => decode_value(raw, &field.ty)
                        .map_err(|e| e.with_segment(&field.name))?,
                    None => match field.declared_default() {
                        Some(default) => default.clone(),
                        None if field.ty.is_nullable() => Value::Null,
                        None => {
                            return Err(Error::serialization(format!(
                                "missing field `{}` on `{}`",
                                field.name, model.serial_name
                            )));
                        }
                    },
                };
                entries.push((field.name.clone(), slot));
            }
            Ok(Value::Record(entries))
        }

        FieldType::Param(index) => Err(Error::GenericPlaceholder { index: *index }),
        FieldType::Unsupported => Err(Error::unsupported("Unsupported")),
    }
}

fn decode_geo(json: &Json) -> Result<GeoPoint, Error> {
    let object = json.as_object().ok_or_else(|| type_error("object", json))?;
    let read = |key: &str| -> Result<f64, Error> {
        object
            .get(key)
            .and_then(Json::as_f64)
            .ok_or_else(|| Error::serialization(format!("geo point missing `{key}`")))
    };

    Ok(GeoPoint::new(read("latitude")?, read("longitude")?))
}

fn type_error(expected: &str, found: &Json) -> Error {
    Error::serialization(format!("expected {expected}, found {found}"))
}

fn check_signed_width(value: i64, width: IntWidth) -> Result<(), Error> {
    let fits = match width {
        IntWidth::W8 => i8::try_from(value).is_ok(),
        IntWidth::W16 => i16::try_from(value).is_ok(),
        IntWidth::W32 => i32::try_from(value).is_ok(),
        IntWidth::W64 => true,
    };

    if fits {
        Ok(())
    } else {
        Err(Error::serialization(format!(
            "integer {value} out of range for Int{}",
            width.bits()
        )))
    }
}

fn check_unsigned_width(value: u64, width: IntWidth) -> Result<(), Error> {
    let fits = match width {
        IntWidth::W8 => u8::try_from(value).is_ok(),
        IntWidth::W16 => u16::try_from(value).is_ok(),
        IntWidth::W32 => u32::try_from(value).is_ok(),
        IntWidth::W64 => true,
    };

    if fits {
        Ok(())
    } else {
        Err(Error::serialization(format!(
            "integer {value} out of range for UInt{}",
            width.bits()
        )))
    }
}

// ---------------------------------------------------------------------------
// Variant envelopes
// ---------------------------------------------------------------------------

/// Read the single `(tag, payload)` entry of a variant object; zero or
/// multiple keys are serialization errors.
fn single_entry(json: &Json) -> Result<(&String, &Json), Error> {
    let object = json
        .as_object()
        .ok_or_else(|| type_error("variant object", json))?;

    let mut entries = object.iter();
    let first = entries
        .next()
        .ok_or_else(|| Error::serialization("variant object has no tag"))?;
    if entries.next().is_some() {
        return Err(Error::serialization(
            "variant object has more than one tag",
        ));
    }

    Ok(first)
}

/// Borrow a payload object, rejecting keys outside `allowed`.
fn payload_object<'a>(
    payload: &'a Json,
    tag: &str,
    allowed: &[&str],
) -> Result<&'a JsonMap<String, Json>, Error> {
    let object = payload
        .as_object()
        .ok_or_else(|| Error::serialization(format!("`{tag}` payload must be an object")))?;

    for key in object.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(Error::serialization(format!(
                "unknown key `{key}` in `{tag}` payload"
            )));
        }
    }

    Ok(object)
}

fn required<'a>(
    object: &'a JsonMap<String, Json>,
    tag: &str,
    key: &str,
) -> Result<&'a Json, Error> {
    object
        .get(key)
        .ok_or_else(|| Error::serialization(format!("`{tag}` payload missing `{key}`")))
}

fn optional_bool(
    object: &JsonMap<String, Json>,
    tag: &str,
    key: &str,
    default: bool,
) -> Result<bool, Error> {
    match object.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .as_bool()
            .ok_or_else(|| Error::serialization(format!("`{tag}`.`{key}` must be a boolean"))),
    }
}

fn optional_f64(
    object: &JsonMap<String, Json>,
    tag: &str,
    key: &str,
    default: f64,
) -> Result<f64, Error> {
    match object.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .as_f64()
            .ok_or_else(|| Error::serialization(format!("`{tag}`.`{key}` must be a number"))),
    }
}

fn expect_marker(payload: &Json, tag: &str) -> Result<(), Error> {
    match payload.as_bool() {
        Some(true) => Ok(()),
        _ => Err(Error::serialization(format!(
            "`{tag}` carries no payload and must encode as true"
        ))),
    }
}

fn string_field(payload: &Json, tag: &str, key: &str) -> Result<String, Error> {
    required(payload_object(payload, tag, &[key])?, tag, key)?
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| Error::serialization(format!("`{tag}`.`{key}` must be a string")))
}

fn element_ty(ty: &FieldType) -> &FieldType {
    match ty.unwrap_option() {
        FieldType::List(inner) | FieldType::Set(inner) => inner,
        _ => &FieldType::Unsupported,
    }
}

fn map_value_ty(ty: &FieldType) -> &FieldType {
    match ty.unwrap_option() {
        FieldType::Map(value) => value,
        _ => &FieldType::Unsupported,
    }
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// Decode a condition for a value of shape `ty`.
pub fn decode_condition(json: &Json, ty: &FieldType) -> Result<ConditionNode, Error> {
    let (tag, payload) = single_entry(json)?;
    decode_condition_tagged(tag, payload, ty)
}

fn decode_condition_tagged(
    tag: &str,
    payload: &Json,
    ty: &FieldType,
) -> Result<ConditionNode, Error> {
    let node = match tag {
        "Never" => {
            expect_marker(payload, tag)?;
            ConditionNode::Never
        }
        "Always" => {
            expect_marker(payload, tag)?;
            ConditionNode::Always
        }

        "And" | "Or" => {
            let children = payload
                .as_array()
                .ok_or_else(|| Error::serialization(format!("`{tag}` payload must be an array")))?
                .iter()
                .map(|child| decode_condition(child, ty))
                .collect::<Result<Vec<_>, _>>()?;
            if tag == "And" {
                ConditionNode::And(children)
            } else {
                ConditionNode::Or(children)
            }
        }

        "Not" => ConditionNode::Not(Box::new(decode_condition(payload, ty)?)),
        "IfNotNull" => {
            ConditionNode::IfNotNull(Box::new(decode_condition(payload, ty.unwrap_option())?))
        }

        "Equal" | "NotEqual" | "GreaterThan" | "LessThan" | "GreaterThanOrEqual"
        | "LessThanOrEqual" => {
            let object = payload_object(payload, tag, &["value"])?;
            let value = decode_value(required(object, tag, "value")?, ty)?;
            match tag {
                "Equal" => ConditionNode::Equal(value),
                "NotEqual" => ConditionNode::NotEqual(value),
                "GreaterThan" => ConditionNode::GreaterThan(value),
                "LessThan" => ConditionNode::LessThan(value),
                "GreaterThanOrEqual" => ConditionNode::GreaterThanOrEqual(value),
                _ => ConditionNode::LessThanOrEqual(value),
            }
        }

        "Inside" | "NotInside" => {
            let object = payload_object(payload, tag, &["values"])?;
            let values = required(object, tag, "values")?
                .as_array()
                .ok_or_else(|| {
                    Error::serialization(format!("`{tag}`.`values` must be an array"))
                })?
                .iter()
                .map(|raw| decode_value(raw, ty))
                .collect::<Result<Vec<_>, _>>()?;
            if tag == "Inside" {
                ConditionNode::Inside(values)
            } else {
                ConditionNode::NotInside(values)
            }
        }

        "StringContains" | "RawStringContains" => {
            let object = payload_object(payload, tag, &["value", "ignoreCase"])?;
            let value = required(object, tag, "value")?
                .as_str()
                .ok_or_else(|| {
                    Error::serialization(format!("`{tag}`.`value` must be a string"))
                })?
                .to_string();
            // Substring matching is case-insensitive unless stated.
            let ignore_case = optional_bool(object, tag, "ignoreCase", true)?;
            if tag == "StringContains" {
                ConditionNode::StringContains { value, ignore_case }
            } else {
                ConditionNode::RawStringContains { value, ignore_case }
            }
        }

        "RegexMatches" => {
            let object = payload_object(payload, tag, &["pattern", "ignoreCase"])?;
            let pattern = required(object, tag, "pattern")?
                .as_str()
                .ok_or_else(|| {
                    Error::serialization("`RegexMatches`.`pattern` must be a string")
                })?
                .to_string();
            ConditionNode::RegexMatches {
                pattern,
                ignore_case: optional_bool(object, tag, "ignoreCase", false)?,
            }
        }

        "FullTextSearch" => {
            let object = payload_object(
                payload,
                tag,
                &["query", "requireAllTermsPresent", "levenshteinDistance"],
            )?;
            let query = required(object, tag, "query")?
                .as_str()
                .ok_or_else(|| {
                    Error::serialization("`FullTextSearch`.`query` must be a string")
                })?
                .to_string();
            let require_all_terms =
                optional_bool(object, tag, "requireAllTermsPresent", true)?;
            let levenshtein_distance = match object.get("levenshteinDistance") {
                None => DEFAULT_LEVENSHTEIN_DISTANCE,
                Some(raw) => raw
                    .as_u64()
                    .and_then(|v| u8::try_from(v).ok())
                    .ok_or_else(|| {
                        Error::serialization(
                            "`FullTextSearch`.`levenshteinDistance` must be a small integer",
                        )
                    })?,
            };
            ConditionNode::FullTextSearch {
                query,
                require_all_terms,
                levenshtein_distance,
            }
        }

        "GeoDistance" => {
            let object = payload_object(
                payload,
                tag,
                &["value", "greaterThanKilometers", "lessThanKilometers"],
            )?;
            ConditionNode::GeoDistance {
                value: decode_geo(required(object, tag, "value")?)?,
                greater_than_km: Float64::new(optional_f64(
                    object,
                    tag,
                    "greaterThanKilometers",
                    0.0,
                )?),
                less_than_km: Float64::new(optional_f64(
                    object,
                    tag,
                    "lessThanKilometers",
                    GEO_DISTANCE_UNLIMITED_KM,
                )?),
            }
        }

        "IntBitsClear" | "IntBitsSet" | "IntBitsAnyClear" | "IntBitsAnySet" => {
            let object = payload_object(payload, tag, &["mask"])?;
            let mask = required(object, tag, "mask")?
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| {
                    Error::serialization(format!("`{tag}`.`mask` must be a 32-bit integer"))
                })?;
            match tag {
                "IntBitsClear" => ConditionNode::IntBitsClear { mask },
                "IntBitsSet" => ConditionNode::IntBitsSet { mask },
                "IntBitsAnyClear" => ConditionNode::IntBitsAnyClear { mask },
                _ => ConditionNode::IntBitsAnySet { mask },
            }
        }

        "ListAllElements" | "ListAnyElements" | "SetAllElements" | "SetAnyElements" => {
            let object = payload_object(payload, tag, &["condition"])?;
            let inner = Box::new(decode_condition(
                required(object, tag, "condition")?,
                element_ty(ty),
            )?);
            match tag {
                "ListAllElements" => ConditionNode::ListAllElements(inner),
                "ListAnyElements" => ConditionNode::ListAnyElements(inner),
                "SetAllElements" => ConditionNode::SetAllElements(inner),
                _ => ConditionNode::SetAnyElements(inner),
            }
        }

        "ListSizesEquals" | "SetSizesEquals" => {
            let object = payload_object(payload, tag, &["count"])?;
            let count = required(object, tag, "count")?
                .as_u64()
                .and_then(|v| usize::try_from(v).ok())
                .ok_or_else(|| {
                    Error::serialization(format!("`{tag}`.`count` must be an integer"))
                })?;
            if tag == "ListSizesEquals" {
                ConditionNode::ListSizesEquals(count)
            } else {
                ConditionNode::SetSizesEquals(count)
            }
        }

        "Exists" => ConditionNode::Exists {
            key: string_field(payload, tag, "key")?,
        },

        "OnKey" => {
            let object = payload_object(payload, tag, &["key", "condition"])?;
            let key = required(object, tag, "key")?
                .as_str()
                .ok_or_else(|| Error::serialization("`OnKey`.`key` must be a string"))?
                .to_string();
            let condition = Box::new(decode_condition(
                required(object, tag, "condition")?,
                map_value_ty(ty),
            )?);
            ConditionNode::OnKey { key, condition }
        }

        other => return decode_condition_fallback(other, payload, ty),
    };

    Ok(node)
}

/// Unknown tag: a field projection when the shape is a struct with that
/// field, else an alias, else a serialization error.
fn decode_condition_fallback(
    tag: &str,
    payload: &Json,
    ty: &FieldType,
) -> Result<ConditionNode, Error> {
    if let FieldType::Record(model) = ty.unwrap_option() {
        if let Some(field) = model.field_by_name(tag) {
            return Ok(ConditionNode::OnField {
                field: tag.to_string(),
                condition: Box::new(
                    decode_condition(payload, &field.ty).map_err(|e| e.with_segment(tag))?,
                ),
            });
        }
    }

    if let Some(canonical) = condition_alias(tag) {
        return decode_condition_tagged(canonical, payload, ty);
    }

    Err(Error::serialization(format!(
        "unknown condition tag `{tag}` for shape {ty}"
    )))
}

// ---------------------------------------------------------------------------
// Modifications
// ---------------------------------------------------------------------------

/// Decode a modification for a value of shape `ty`.
pub fn decode_modification(json: &Json, ty: &FieldType) -> Result<ModificationNode, Error> {
    let (tag, payload) = single_entry(json)?;
    decode_modification_tagged(tag, payload, ty)
}

fn decode_modification_tagged(
    tag: &str,
    payload: &Json,
    ty: &FieldType,
) -> Result<ModificationNode, Error> {
    let node = match tag {
        "Nothing" => {
            expect_marker(payload, tag)?;
            ModificationNode::Nothing
        }
        "ListDropFirst" | "ListDropLast" | "SetDropFirst" | "SetDropLast" => {
            expect_marker(payload, tag)?;
            match tag {
                "ListDropFirst" => ModificationNode::ListDropFirst,
                "ListDropLast" => ModificationNode::ListDropLast,
                "SetDropFirst" => ModificationNode::SetDropFirst,
                _ => ModificationNode::SetDropLast,
            }
        }

        "Chain" => {
            let children = payload
                .as_array()
                .ok_or_else(|| Error::serialization("`Chain` payload must be an array"))?
                .iter()
                .map(|child| decode_modification(child, ty))
                .collect::<Result<Vec<_>, _>>()?;
            ModificationNode::Chain(children)
        }

        "IfNotNull" => ModificationNode::IfNotNull(Box::new(decode_modification(
            payload,
            ty.unwrap_option(),
        )?)),

        "Assign" | "CoerceAtMost" | "CoerceAtLeast" => {
            let object = payload_object(payload, tag, &["value"])?;
            let value = decode_value(required(object, tag, "value")?, ty)?;
            match tag {
                "Assign" => ModificationNode::Assign(value),
                "CoerceAtMost" => ModificationNode::CoerceAtMost(value),
                _ => ModificationNode::CoerceAtLeast(value),
            }
        }

        "Increment" | "Multiply" => {
            let object = payload_object(payload, tag, &["by"])?;
            let by = decode_value(required(object, tag, "by")?, ty.unwrap_option())?;
            if tag == "Increment" {
                ModificationNode::Increment(by)
            } else {
                ModificationNode::Multiply(by)
            }
        }

        "AppendString" | "AppendRawString" => {
            let value = string_field(payload, tag, "value")?;
            if tag == "AppendString" {
                ModificationNode::AppendString(value)
            } else {
                ModificationNode::AppendRawString(value)
            }
        }

        "ListAppend" | "SetAppend" | "ListRemoveInstances" | "SetRemoveInstances" => {
            let object = payload_object(payload, tag, &["items"])?;
            let items = required(object, tag, "items")?
                .as_array()
                .ok_or_else(|| {
                    Error::serialization(format!("`{tag}`.`items` must be an array"))
                })?
                .iter()
                .map(|raw| decode_value(raw, element_ty(ty)))
                .collect::<Result<Vec<_>, _>>()?;
            match tag {
                "ListAppend" => ModificationNode::ListAppend(items),
                "SetAppend" => ModificationNode::SetAppend(items),
                "ListRemoveInstances" => ModificationNode::ListRemoveInstances(items),
                _ => ModificationNode::SetRemoveInstances(items),
            }
        }

        "ListRemove" | "SetRemove" => {
            let condition = Box::new(decode_condition(payload, element_ty(ty))?);
            if tag == "ListRemove" {
                ModificationNode::ListRemove(condition)
            } else {
                ModificationNode::SetRemove(condition)
            }
        }

        "ListPerElement" | "SetPerElement" => {
            let object = payload_object(payload, tag, &["condition", "modification"])?;
            let condition = Box::new(decode_condition(
                required(object, tag, "condition")?,
                element_ty(ty),
            )?);
            let modification = Box::new(decode_modification(
                required(object, tag, "modification")?,
                element_ty(ty),
            )?);
            if tag == "ListPerElement" {
                ModificationNode::ListPerElement {
                    condition,
                    modification,
                }
            } else {
                ModificationNode::SetPerElement {
                    condition,
                    modification,
                }
            }
        }

        "Combine" => {
            let entries = payload
                .as_object()
                .ok_or_else(|| Error::serialization("`Combine` payload must be an object"))?
                .iter()
                .map(|(key, raw)| {
                    decode_value(raw, map_value_ty(ty)).map(|value| (key.clone(), value))
                })
                .collect::<Result<Vec<_>, _>>()?;
            ModificationNode::Combine(entries)
        }

        "ModifyByKey" => {
            let entries = payload
                .as_object()
                .ok_or_else(|| {
                    Error::serialization("`ModifyByKey` payload must be an object")
                })?
                .iter()
                .map(|(key, raw)| {
                    decode_modification(raw, map_value_ty(ty))
                        .map(|modification| (key.clone(), modification))
                })
                .collect::<Result<Vec<_>, _>>()?;
            ModificationNode::ModifyByKey(entries)
        }

        "RemoveKeys" => {
            let object = payload_object(payload, tag, &["fields"])?;
            let fields = required(object, tag, "fields")?
                .as_array()
                .ok_or_else(|| {
                    Error::serialization("`RemoveKeys`.`fields` must be an array")
                })?
                .iter()
                .map(|raw| {
                    raw.as_str().map(ToString::to_string).ok_or_else(|| {
                        Error::serialization("`RemoveKeys`.`fields` must contain strings")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            ModificationNode::RemoveKeys(fields)
        }

        other => return decode_modification_fallback(other, payload, ty),
    };

    Ok(node)
}

fn decode_modification_fallback(
    tag: &str,
    payload: &Json,
    ty: &FieldType,
) -> Result<ModificationNode, Error> {
    if let FieldType::Record(model) = ty.unwrap_option() {
        if let Some(field) = model.field_by_name(tag) {
            return Ok(ModificationNode::OnField {
                field: tag.to_string(),
                modification: Box::new(
                    decode_modification(payload, &field.ty)
                        .map_err(|e| e.with_segment(tag))?,
                ),
            });
        }
    }

    if let Some(canonical) = modification_alias(tag) {
        return decode_modification_tagged(canonical, payload, ty);
    }

    Err(Error::serialization(format!(
        "unknown modification tag `{tag}` for shape {ty}"
    )))
}

// ---------------------------------------------------------------------------
// serde seeds and typed impls
// ---------------------------------------------------------------------------

///
/// ValueSeed
///
/// Context-carrying deserializer for values: the target shape directs
/// decoding, since the wire form of a value is not self-typing.
///

pub struct ValueSeed<'a> {
    pub ty: &'a FieldType,
}

impl<'de> DeserializeSeed<'de> for ValueSeed<'_> {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        let json = Json::deserialize(deserializer)?;
        decode_value(&json, self.ty).map_err(DeError::custom)
    }
}

///
/// ConditionSeed
///

pub struct ConditionSeed<'a> {
    pub ty: &'a FieldType,
}

impl<'de> DeserializeSeed<'de> for ConditionSeed<'_> {
    type Value = ConditionNode;

    fn deserialize<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<ConditionNode, D::Error> {
        let json = Json::deserialize(deserializer)?;
        decode_condition(&json, self.ty).map_err(DeError::custom)
    }
}

///
/// ModificationSeed
///

pub struct ModificationSeed<'a> {
    pub ty: &'a FieldType,
}

impl<'de> DeserializeSeed<'de> for ModificationSeed<'_> {
    type Value = ModificationNode;

    fn deserialize<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<ModificationNode, D::Error> {
        let json = Json::deserialize(deserializer)?;
        decode_modification(&json, self.ty).map_err(DeError::custom)
    }
}

impl<'de, T: FieldValue> Deserialize<'de> for Condition<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ty = T::field_type();
        ConditionSeed { ty: &ty }
            .deserialize(deserializer)
            .map(Self::from_node)
    }
}

impl<'de, T: FieldValue> Deserialize<'de> for Modification<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ty = T::field_type();
        ModificationSeed { ty: &ty }
            .deserialize(deserializer)
            .map(Self::from_node)
    }
}
