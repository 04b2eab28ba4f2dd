use crate::{
    condition::ConditionNode,
    condition::text::{derived_text, full_text_matches},
    error::Error,
    model::FieldType,
    value::{TextMode, Value, strict_order_cmp},
};
use regex::RegexBuilder;
use std::cmp::Ordering;

/// Evaluate a condition against a single value.
///
/// Pure, deterministic, short-circuiting. `ty` is the declared shape of
/// `on`; it drives field resolution and the full-text index. Shape
/// mismatches surface as `IncompatibleRecord`.
pub fn eval(condition: &ConditionNode, on: &Value, ty: &FieldType) -> Result<bool, Error> {
    match condition {
        ConditionNode::Never => Ok(false),
        ConditionNode::Always => Ok(true),

        ConditionNode::And(children) => {
            for child in children {
                if !eval(child, on, ty)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        ConditionNode::Or(children) => {
            for child in children {
                if eval(child, on, ty)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ConditionNode::Not(inner) => Ok(!eval(inner, on, ty)?),

        ConditionNode::Equal(value) => Ok(on == value),
        ConditionNode::NotEqual(value) => Ok(on != value),
        ConditionNode::Inside(values) => Ok(values.contains(on)),
        ConditionNode::NotInside(values) => Ok(!values.contains(on)),

        ConditionNode::GreaterThan(value) => ordered(on, value).map(Ordering::is_gt),
        ConditionNode::LessThan(value) => ordered(on, value).map(Ordering::is_lt),
        ConditionNode::GreaterThanOrEqual(value) => ordered(on, value).map(Ordering::is_ge),
        ConditionNode::LessThanOrEqual(value) => ordered(on, value).map(Ordering::is_le),

        ConditionNode::StringContains { value, ignore_case }
        | ConditionNode::RawStringContains { value, ignore_case } => {
            let mode = if *ignore_case { TextMode::Ci } else { TextMode::Cs };
            on.text_contains(value, mode)
                .ok_or_else(|| Error::incompatible("String", on.variant_name(), "this"))
        }

        ConditionNode::RegexMatches {
            pattern,
            ignore_case,
        } => {
            let text = on
                .as_text()
                .ok_or_else(|| Error::incompatible("String", on.variant_name(), "this"))?;
            // Full match, not substring: anchor the whole pattern.
            let regex = RegexBuilder::new(&format!("^(?:{pattern})$"))
                .case_insensitive(*ignore_case)
                .build()
                .map_err(|e| Error::serialization(format!("invalid regex: {e}")))?;
            Ok(regex.is_match(text))
        }

        ConditionNode::FullTextSearch {
            query,
            require_all_terms,
            levenshtein_distance,
        } => Ok(full_text_matches(
            query,
            *require_all_terms,
            *levenshtein_distance,
            &derived_text(on, ty),
        )),

        ConditionNode::GeoDistance {
            value,
            greater_than_km,
            less_than_km,
        } => {
            let Value::Geo(point) = on else {
                return Err(Error::incompatible("GeoPoint", on.variant_name(), "this"));
            };
            let distance = point.distance_km(value);
            Ok(distance >= greater_than_km.get() && distance <= less_than_km.get())
        }

        ConditionNode::IntBitsClear { mask } => int_bits(on, |bits| bits & mask == 0),
        ConditionNode::IntBitsSet { mask } => int_bits(on, |bits| bits & mask == *mask),
        ConditionNode::IntBitsAnyClear { mask } => int_bits(on, |bits| bits & mask != *mask),
        ConditionNode::IntBitsAnySet { mask } => int_bits(on, |bits| bits & mask != 0),

        ConditionNode::ListAllElements(inner) | ConditionNode::SetAllElements(inner) => {
            let (items, element_ty) = elements(on, ty)?;
            for item in items {
                if !eval(inner, item, element_ty)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        ConditionNode::ListAnyElements(inner) | ConditionNode::SetAnyElements(inner) => {
            let (items, element_ty) = elements(on, ty)?;
            for item in items {
                if eval(inner, item, element_ty)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }

        ConditionNode::ListSizesEquals(size) | ConditionNode::SetSizesEquals(size) => {
            let (items, _) = elements(on, ty)?;
            Ok(items.len() == *size)
        }

        ConditionNode::Exists { key } => {
            let entries = map_entries(on)?;
            Ok(entries.iter().any(|(k, _)| k == key))
        }
        ConditionNode::OnKey { key, condition } => {
            let entries = map_entries(on)?;
            let value_ty = match ty.unwrap_option() {
                FieldType::Map(value) => value.as_ref(),
                _ => &FieldType::Unsupported,
            };
            match entries.iter().find(|(k, _)| k == key) {
                Some((_, value)) => eval(condition, value, value_ty),
                None => Ok(false),
            }
        }

        ConditionNode::OnField { field, condition } => {
            let Value::Record(entries) = on else {
                return Err(Error::incompatible("Record", on.variant_name(), field));
            };

            let (slot, field_ty) = match ty.unwrap_option() {
                FieldType::Record(model) => {
                    let index = model.field_index(field).ok_or_else(|| {
                        Error::incompatible(
                            format!("field of `{}`", model.serial_name),
                            format!("`{field}`"),
                            field,
                        )
                    })?;
                    let entry = entries.get(index).ok_or_else(|| {
                        Error::incompatible(format!("field `{field}`"), "missing field", field)
                    })?;
                    (&entry.1, model.fields[index].ty.clone())
                }
                _ => {
                    // No model in scope: resolve by the names the record
                    // representation itself carries.
                    let entry = entries.iter().find(|(name, _)| name == field).ok_or_else(
                        || {
                            Error::incompatible(
                                format!("field `{field}`"),
                                "missing field",
                                field,
                            )
                        },
                    )?;
                    (&entry.1, FieldType::Unsupported)
                }
            };

            eval(condition, slot, &field_ty).map_err(|e| e.with_segment(field))
        }

        ConditionNode::IfNotNull(inner) => {
            if on.is_null() {
                Ok(false)
            } else {
                eval(inner, on, ty.unwrap_option())
            }
        }
    }
}

fn ordered(on: &Value, value: &Value) -> Result<Ordering, Error> {
    strict_order_cmp(on, value).ok_or_else(|| {
        Error::incompatible(value.variant_name(), on.variant_name(), "this")
    })
}

/// Bit predicates use 32-bit unsigned mask semantics.
fn int_bits(on: &Value, check: impl FnOnce(u32) -> bool) -> Result<bool, Error> {
    match on {
        Value::Int(v) => Ok(check(*v as u32)),
        Value::Uint(v) => Ok(check(*v as u32)),
        other => Err(Error::incompatible("Int32", other.variant_name(), "this")),
    }
}

fn elements<'a>(
    on: &'a Value,
    ty: &'a FieldType,
) -> Result<(&'a [Value], &'a FieldType), Error> {
    let element_ty = match ty.unwrap_option() {
        FieldType::List(inner) | FieldType::Set(inner) => inner.as_ref(),
        _ => &FieldType::Unsupported,
    };

    match on {
        Value::List(items) | Value::Set(items) => Ok((items, element_ty)),
        other => Err(Error::incompatible(
            "List or Set",
            other.variant_name(),
            "this",
        )),
    }
}

fn map_entries(on: &Value) -> Result<&[(String, Value)], Error> {
    match on {
        Value::Map(entries) => Ok(entries),
        other => Err(Error::incompatible("Map", other.variant_name(), "this")),
    }
}
