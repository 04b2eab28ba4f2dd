use crate::{
    condition::eval,
    error::Error,
    model::{FieldType, IntWidth},
    modification::ModificationNode,
    value::{Float32, Float64, Value, normalize_map, normalize_set, strict_order_cmp},
};
use std::cmp::Ordering;

/// Apply a modification to a single value, producing a new value.
///
/// Pure and fail-fast: on error the input is untouched. `ty` is the
/// declared shape of `on`; integer arithmetic wraps at the declared
/// width, floats follow IEEE-754.
pub fn apply(
    modification: &ModificationNode,
    on: &Value,
    ty: &FieldType,
) -> Result<Value, Error> {
    match modification {
        ModificationNode::Nothing => Ok(on.clone()),

        ModificationNode::Chain(children) => {
            let mut current = on.clone();
            for child in children {
                current = apply(child, &current, ty)?;
            }
            Ok(current)
        }

        ModificationNode::Assign(value) => Ok(value.clone()),

        ModificationNode::IfNotNull(inner) => {
            if on.is_null() {
                Ok(Value::Null)
            } else {
                apply(inner, on, ty.unwrap_option())
            }
        }

        ModificationNode::CoerceAtMost(bound) => coerce(on, bound, Ordering::Greater),
        ModificationNode::CoerceAtLeast(bound) => coerce(on, bound, Ordering::Less),

        ModificationNode::Increment(delta) => numeric(on, delta, ty, NumericOp::Add),
        ModificationNode::Multiply(factor) => numeric(on, factor, ty, NumericOp::Mul),

        ModificationNode::AppendString(suffix)
        | ModificationNode::AppendRawString(suffix) => match on {
            Value::Text(text) => {
                let mut out = text.clone();
                out.push_str(suffix);
                Ok(Value::Text(out))
            }
            other => Err(Error::incompatible("String", other.variant_name(), "this")),
        },

        ModificationNode::ListAppend(items) => {
            let current = list_items(on)?;
            let mut out = current.to_vec();
            out.extend(items.iter().cloned());
            Ok(Value::List(out))
        }
        ModificationNode::SetAppend(items) => {
            let current = set_items(on)?;
            let mut out = current.to_vec();
            out.extend(items.iter().cloned());
            Ok(Value::Set(normalize_set(out)))
        }

        ModificationNode::ListRemove(condition) => {
            let element_ty = element_ty(ty);
            let mut out = Vec::new();
            for item in list_items(on)? {
                if !eval(condition, item, element_ty)? {
                    out.push(item.clone());
                }
            }
            Ok(Value::List(out))
        }
        ModificationNode::SetRemove(condition) => {
            let element_ty = element_ty(ty);
            let mut out = Vec::new();
            for item in set_items(on)? {
                if !eval(condition, item, element_ty)? {
                    out.push(item.clone());
                }
            }
            Ok(Value::Set(out))
        }

        ModificationNode::ListRemoveInstances(instances) => {
            let out = list_items(on)?
                .iter()
                .filter(|item| !instances.contains(item))
                .cloned()
                .collect();
            Ok(Value::List(out))
        }
        ModificationNode::SetRemoveInstances(instances) => {
            let out = set_items(on)?
                .iter()
                .filter(|item| !instances.contains(item))
                .cloned()
                .collect();
            Ok(Value::Set(out))
        }

        ModificationNode::ListDropFirst => {
            let items = list_items(on)?;
            Ok(Value::List(items.iter().skip(1).cloned().collect()))
        }
        ModificationNode::ListDropLast => {
            let items = list_items(on)?;
            let keep = items.len().saturating_sub(1);
            Ok(Value::List(items.iter().take(keep).cloned().collect()))
        }
        ModificationNode::SetDropFirst => {
            // Sets are canonically ordered, so first/last are well-defined.
            let items = set_items(on)?;
            Ok(Value::Set(items.iter().skip(1).cloned().collect()))
        }
        ModificationNode::SetDropLast => {
            let items = set_items(on)?;
            let keep = items.len().saturating_sub(1);
            Ok(Value::Set(items.iter().take(keep).cloned().collect()))
        }

        ModificationNode::ListPerElement {
            condition,
            modification,
        } => {
            let element_ty = element_ty(ty);
            let mut out = Vec::with_capacity(list_items(on)?.len());
            for item in list_items(on)? {
                if eval(condition, item, element_ty)? {
                    out.push(apply(modification, item, element_ty)?);
                } else {
                    out.push(item.clone());
                }
            }
            Ok(Value::List(out))
        }
        ModificationNode::SetPerElement {
            condition,
            modification,
        } => {
            let element_ty = element_ty(ty);
            let mut out = Vec::with_capacity(set_items(on)?.len());
            for item in set_items(on)? {
                if eval(condition, item, element_ty)? {
                    out.push(apply(modification, item, element_ty)?);
                } else {
                    out.push(item.clone());
                }
            }
            Ok(Value::Set(normalize_set(out)))
        }

        ModificationNode::Combine(entries) => {
            let mut out = map_entries(on)?.to_vec();
            out.extend(entries.iter().cloned());
            Ok(Value::Map(normalize_map(out)))
        }

        ModificationNode::ModifyByKey(entries) => {
            let value_ty = map_value_ty(ty);
            let mut out = map_entries(on)?.to_vec();
            for (key, inner) in entries {
                let slot = out
                    .iter_mut()
                    .find(|(k, _)| k == key)
                    .ok_or_else(|| Error::missing_key(key.clone()))?;
                slot.1 = apply(inner, &slot.1, value_ty)?;
            }
            Ok(Value::Map(out))
        }

        ModificationNode::RemoveKeys(keys) => {
            let out = map_entries(on)?
                .iter()
                .filter(|(k, _)| !keys.contains(k))
                .cloned()
                .collect();
            Ok(Value::Map(out))
        }

        ModificationNode::OnField {
            field,
            modification,
        } => {
            let Value::Record(entries) = on else {
                return Err(Error::incompatible("Record", on.variant_name(), field));
            };

            let (index, field_ty) = match ty.unwrap_option() {
                FieldType::Record(model) => {
                    let index = model.field_index(field).ok_or_else(|| {
                        Error::incompatible(
                            format!("field of `{}`", model.serial_name),
                            format!("`{field}`"),
                            field,
                        )
                    })?;
                    (index, model.fields[index].ty.clone())
                }
                _ => {
                    let index = entries
                        .iter()
                        .position(|(name, _)| name == field)
                        .ok_or_else(|| {
                            Error::incompatible(
                                format!("field `{field}`"),
                                "missing field",
                                field,
                            )
                        })?;
                    (index, FieldType::Unsupported)
                }
            };

            let slot = entries.get(index).ok_or_else(|| {
                Error::incompatible(format!("field `{field}`"), "missing field", field)
            })?;
            let updated = apply(modification, &slot.1, &field_ty)
                .map_err(|e| e.with_segment(field))?;

            let mut entries = entries.clone();
            entries[index].1 = updated;
            Ok(Value::Record(entries))
        }
    }
}

enum NumericOp {
    Add,
    Mul,
}

/// Width-aware wrapping arithmetic on integers; IEEE-754 on floats.
fn numeric(on: &Value, rhs: &Value, ty: &FieldType, op: NumericOp) -> Result<Value, Error> {
    let width = match ty.unwrap_option() {
        FieldType::Int(width) | FieldType::Uint(width) => *width,
        _ => IntWidth::W64,
    };

    match (on, rhs) {
        (Value::Int(a), Value::Int(b)) => {
            let raw = match op {
                NumericOp::Add => a.wrapping_add(*b),
                NumericOp::Mul => a.wrapping_mul(*b),
            };
            Ok(Value::Int(truncate_signed(raw, width)))
        }
        (Value::Uint(a), Value::Uint(b)) => {
            let raw = match op {
                NumericOp::Add => a.wrapping_add(*b),
                NumericOp::Mul => a.wrapping_mul(*b),
            };
            Ok(Value::Uint(truncate_unsigned(raw, width)))
        }
        (Value::Float32(a), Value::Float32(b)) => {
            let raw = match op {
                NumericOp::Add => a.get() + b.get(),
                NumericOp::Mul => a.get() * b.get(),
            };
            Ok(Value::Float32(Float32::new(raw)))
        }
        (Value::Float64(a), Value::Float64(b)) => {
            let raw = match op {
                NumericOp::Add => a.get() + b.get(),
                NumericOp::Mul => a.get() * b.get(),
            };
            Ok(Value::Float64(Float64::new(raw)))
        }
        (on, rhs) => Err(Error::incompatible(
            on.variant_name(),
            rhs.variant_name(),
            "this",
        )),
    }
}

const fn truncate_signed(value: i64, width: IntWidth) -> i64 {
    match width {
        IntWidth::W8 => value as i8 as i64,
        IntWidth::W16 => value as i16 as i64,
        IntWidth::W32 => value as i32 as i64,
        IntWidth::W64 => value,
    }
}

const fn truncate_unsigned(value: u64, width: IntWidth) -> u64 {
    match width {
        IntWidth::W8 => value as u8 as u64,
        IntWidth::W16 => value as u16 as u64,
        IntWidth::W32 => value as u32 as u64,
        IntWidth::W64 => value,
    }
}

/// Clamp `on` against `bound`: replaced when the comparison matches
/// `exceeds`.
fn coerce(on: &Value, bound: &Value, exceeds: Ordering) -> Result<Value, Error> {
    let order = strict_order_cmp(on, bound).ok_or_else(|| {
        Error::incompatible(bound.variant_name(), on.variant_name(), "this")
    })?;

    if order == exceeds {
        Ok(bound.clone())
    } else {
        Ok(on.clone())
    }
}

fn list_items(on: &Value) -> Result<&[Value], Error> {
    match on {
        Value::List(items) => Ok(items),
        other => Err(Error::incompatible("List", other.variant_name(), "this")),
    }
}

fn set_items(on: &Value) -> Result<&[Value], Error> {
    match on {
        Value::Set(items) => Ok(items),
        other => Err(Error::incompatible("Set", other.variant_name(), "this")),
    }
}

fn map_entries(on: &Value) -> Result<&[(String, Value)], Error> {
    match on {
        Value::Map(entries) => Ok(entries),
        other => Err(Error::incompatible("Map", other.variant_name(), "this")),
    }
}

pub(crate) fn element_ty(ty: &FieldType) -> &FieldType {
    match ty.unwrap_option() {
        FieldType::List(inner) | FieldType::Set(inner) => inner,
        _ => &FieldType::Unsupported,
    }
}

pub(crate) fn map_value_ty(ty: &FieldType) -> &FieldType {
    match ty.unwrap_option() {
        FieldType::Map(value) => value,
        _ => &FieldType::Unsupported,
    }
}

pub(crate) fn field_ty(ty: &FieldType, field: &str) -> FieldType {
    match ty.unwrap_option() {
        FieldType::Record(model) => model
            .field_by_name(field)
            .map_or(FieldType::Unsupported, |f| f.ty.clone()),
        _ => FieldType::Unsupported,
    }
}
