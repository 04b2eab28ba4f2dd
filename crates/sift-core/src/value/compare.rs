use crate::value::Value;
use std::cmp::Ordering;

///
/// Total canonical comparator.
///
/// Ordering rules:
/// 1. Canonical variant rank
/// 2. Variant-specific comparison for same-ranked values
///
/// Mixed-variant comparisons are rank-only and deterministic.
///
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.canonical_rank().cmp(&right.canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

///
/// Strict comparator for identical orderable variants.
///
/// Returns `None` for mismatched or non-orderable variants; ordered
/// predicates surface that as an incompatible-record failure.
///
#[must_use]
pub fn strict_order_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Uint(a), Value::Uint(b)) => Some(a.cmp(b)),
        (Value::Float32(a), Value::Float32(b)) => Some(a.cmp(b)),
        (Value::Float64(a), Value::Float64(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
        (Value::Ulid(a), Value::Ulid(b)) => Some(a.cmp(b)),
        (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    if let Some(order) = strict_order_cmp(left, right) {
        return order;
    }

    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Geo(a), Value::Geo(b)) => a.cmp(b),
        (Value::List(a), Value::List(b)) | (Value::Set(a), Value::Set(b)) => {
            canonical_cmp_seq(a, b)
        }
        (Value::Map(a), Value::Map(b)) | (Value::Record(a), Value::Record(b)) => {
            canonical_cmp_entries(a, b)
        }
        // Same rank implies same variant; every variant is handled above.
        _ => Ordering::Equal,
    }
}

fn canonical_cmp_seq(left: &[Value], right: &[Value]) -> Ordering {
    for (a, b) in left.iter().zip(right.iter()) {
        let order = canonical_cmp(a, b);
        if order != Ordering::Equal {
            return order;
        }
    }
    left.len().cmp(&right.len())
}

fn canonical_cmp_entries(left: &[(String, Value)], right: &[(String, Value)]) -> Ordering {
    for ((ka, va), (kb, vb)) in left.iter().zip(right.iter()) {
        let key_order = ka.cmp(kb);
        if key_order != Ordering::Equal {
            return key_order;
        }
        let value_order = canonical_cmp(va, vb);
        if value_order != Ordering::Equal {
            return value_order;
        }
    }
    left.len().cmp(&right.len())
}
