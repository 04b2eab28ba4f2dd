use crate::{
    condition::{Condition, ConditionNode},
    modification::{Modification, ModificationNode},
    value::{GeoPoint, Value},
};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Uint(v) => serializer.serialize_u64(*v),
            Self::Float32(v) => serializer.serialize_f32(v.get()),
            Self::Float64(v) => serializer.serialize_f64(v.get()),
            Self::Text(v) | Self::Enum(v) => serializer.serialize_str(v),
            Self::Timestamp(v) => serializer.serialize_str(&v.to_rfc3339()),
            Self::Date(v) => serializer.serialize_str(&v.to_string()),
            Self::Time(v) => serializer.serialize_str(&v.to_string()),
            Self::Ulid(v) => serializer.serialize_str(&v.to_string()),
            Self::Geo(v) => v.serialize(serializer),
            Self::List(items) | Self::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) | Self::Record(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Variant payload shapes (camelCase wire keys)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ValuePayload<'a> {
    value: &'a Value,
}

#[derive(Serialize)]
struct ValuesPayload<'a> {
    values: &'a [Value],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextPayload<'a> {
    value: &'a str,
    ignore_case: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegexPayload<'a> {
    pattern: &'a str,
    ignore_case: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FullTextPayload<'a> {
    query: &'a str,
    require_all_terms_present: bool,
    levenshtein_distance: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeoPayload<'a> {
    value: &'a GeoPoint,
    greater_than_kilometers: f64,
    less_than_kilometers: f64,
}

#[derive(Serialize)]
struct MaskPayload {
    mask: u32,
}

#[derive(Serialize)]
struct ConditionPayload<'a> {
    condition: &'a ConditionNode,
}

#[derive(Serialize)]
struct CountPayload {
    count: usize,
}

#[derive(Serialize)]
struct KeyPayload<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct OnKeyPayload<'a> {
    key: &'a str,
    condition: &'a ConditionNode,
}

#[derive(Serialize)]
struct ByPayload<'a> {
    by: &'a Value,
}

#[derive(Serialize)]
struct ItemsPayload<'a> {
    items: &'a [Value],
}

#[derive(Serialize)]
struct PerElementPayload<'a> {
    condition: &'a ConditionNode,
    modification: &'a ModificationNode,
}

#[derive(Serialize)]
struct FieldsPayload<'a> {
    fields: &'a [String],
}

struct EntriesPayload<'a, T>(&'a [(String, T)]);

impl<T: Serialize> Serialize for EntriesPayload<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn tagged<S: Serializer, P: Serialize>(
    serializer: S,
    tag: &str,
    payload: &P,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(tag, payload)?;
    map.end()
}

///
/// Canonical single-key encoding for conditions.
///
/// Payload-less variants encode as `{tag: true}`; `OnField` projects the
/// field name itself as the tag.
///
impl Serialize for ConditionNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tag = self.variant_tag();
        match self {
            Self::Never | Self::Always => tagged(serializer, tag, &true),

            Self::And(children) | Self::Or(children) => tagged(serializer, tag, children),
            Self::Not(inner) | Self::IfNotNull(inner) => {
                tagged(serializer, tag, inner.as_ref())
            }

            Self::Equal(value)
            | Self::NotEqual(value)
            | Self::GreaterThan(value)
            | Self::LessThan(value)
            | Self::GreaterThanOrEqual(value)
            | Self::LessThanOrEqual(value) => {
                tagged(serializer, tag, &ValuePayload { value })
            }

            Self::Inside(values) | Self::NotInside(values) => {
                tagged(serializer, tag, &ValuesPayload { values })
            }

            Self::StringContains { value, ignore_case }
            | Self::RawStringContains { value, ignore_case } => tagged(
                serializer,
                tag,
                &TextPayload {
                    value,
                    ignore_case: *ignore_case,
                },
            ),

            Self::RegexMatches {
                pattern,
                ignore_case,
            } => tagged(
                serializer,
                tag,
                &RegexPayload {
                    pattern,
                    ignore_case: *ignore_case,
                },
            ),

            Self::FullTextSearch {
                query,
                require_all_terms,
                levenshtein_distance,
            } => tagged(
                serializer,
                tag,
                &FullTextPayload {
                    query,
                    require_all_terms_present: *require_all_terms,
                    levenshtein_distance: *levenshtein_distance,
                },
            ),

            Self::GeoDistance {
                value,
                greater_than_km,
                less_than_km,
            } => tagged(
                serializer,
                tag,
                &GeoPayload {
                    value,
                    greater_than_kilometers: greater_than_km.get(),
                    less_than_kilometers: less_than_km.get(),
                },
            ),

            Self::IntBitsClear { mask }
            | Self::IntBitsSet { mask }
            | Self::IntBitsAnyClear { mask }
            | Self::IntBitsAnySet { mask } => {
                tagged(serializer, tag, &MaskPayload { mask: *mask })
            }

            Self::ListAllElements(condition)
            | Self::ListAnyElements(condition)
            | Self::SetAllElements(condition)
            | Self::SetAnyElements(condition) => tagged(
                serializer,
                tag,
                &ConditionPayload {
                    condition,
                },
            ),

            Self::ListSizesEquals(count) | Self::SetSizesEquals(count) => {
                tagged(serializer, tag, &CountPayload { count: *count })
            }

            Self::Exists { key } => tagged(serializer, tag, &KeyPayload { key }),
            Self::OnKey { key, condition } => tagged(
                serializer,
                tag,
                &OnKeyPayload {
                    key,
                    condition,
                },
            ),

            Self::OnField { field, condition } => {
                tagged(serializer, field, condition.as_ref())
            }
        }
    }
}

///
/// Canonical single-key encoding for modifications; mirrors conditions.
///
impl Serialize for ModificationNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tag = self.variant_tag();
        match self {
            Self::Nothing
            | Self::ListDropFirst
            | Self::ListDropLast
            | Self::SetDropFirst
            | Self::SetDropLast => tagged(serializer, tag, &true),

            Self::Chain(children) => tagged(serializer, tag, children),
            Self::IfNotNull(inner) => tagged(serializer, tag, inner.as_ref()),

            Self::Assign(value) | Self::CoerceAtMost(value) | Self::CoerceAtLeast(value) => {
                tagged(serializer, tag, &ValuePayload { value })
            }

            Self::Increment(by) | Self::Multiply(by) => {
                tagged(serializer, tag, &ByPayload { by })
            }

            Self::AppendString(value) | Self::AppendRawString(value) => tagged(
                serializer,
                tag,
                &ValuePayload {
                    value: &Value::Text(value.clone()),
                },
            ),

            Self::ListAppend(items)
            | Self::SetAppend(items)
            | Self::ListRemoveInstances(items)
            | Self::SetRemoveInstances(items) => {
                tagged(serializer, tag, &ItemsPayload { items })
            }

            Self::ListRemove(condition) | Self::SetRemove(condition) => {
                tagged(serializer, tag, condition.as_ref())
            }

            Self::ListPerElement {
                condition,
                modification,
            }
            | Self::SetPerElement {
                condition,
                modification,
            } => tagged(
                serializer,
                tag,
                &PerElementPayload {
                    condition,
                    modification,
                },
            ),

            Self::Combine(entries) => tagged(serializer, tag, &EntriesPayload(entries)),
            Self::ModifyByKey(entries) => tagged(serializer, tag, &EntriesPayload(entries)),
            Self::RemoveKeys(fields) => {
                tagged(serializer, tag, &FieldsPayload { fields })
            }

            Self::OnField {
                field,
                modification,
            } => tagged(serializer, field, modification.as_ref()),
        }
    }
}

impl<T> Serialize for Condition<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.node().serialize(serializer)
    }
}

impl<T> Serialize for Modification<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.node().serialize(serializer)
    }
}
