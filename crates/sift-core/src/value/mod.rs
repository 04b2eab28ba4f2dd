mod compare;
mod float;
mod geo;
mod rank;

#[cfg(test)]
mod tests;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use derive_more::{Deref, Display, From};
use std::fmt;
use ulid::Ulid;

// re-exports
pub use compare::{canonical_cmp, strict_order_cmp};
pub use float::{Float32, Float64};
pub use geo::GeoPoint;

///
/// TextMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextMode {
    Cs, // case-sensitive
    Ci, // case-insensitive
}

///
/// RawText
///
/// Inline wrapper around a plain string. Raw-string predicates and
/// modifications (`RawStringContains`, `AppendRawString`) target the
/// underlying text of wrapper types like this one.
///

#[derive(Clone, Debug, Default, Deref, Display, Eq, From, Ord, PartialEq, PartialOrd)]
pub struct RawText(pub String);

impl RawText {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for RawText {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

///
/// Value
///
/// Dynamic representation every record, field, and predicate literal
/// lowers to. Structural equality; total canonical ordering via
/// [`canonical_cmp`].
///
/// - `List` preserves order.
/// - `Set` is kept sorted and deduplicated under canonical order.
/// - `Map` is string-keyed, sorted by key, unique keys.
/// - `Record` holds `(field name, value)` pairs in declaration order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float32(Float32),
    Float64(Float64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
    Ulid(Ulid),
    Geo(GeoPoint),
    Enum(String),
    List(Vec<Self>),
    Set(Vec<Self>),
    Map(Vec<(String, Self)>),
    Record(Vec<(String, Self)>),
}

impl Value {
    /// Build a canonical set value: sorted, deduplicated.
    #[must_use]
    pub fn set_of(items: Vec<Self>) -> Self {
        Self::Set(normalize_set(items))
    }

    /// Build a canonical map value: sorted by key, last write wins.
    #[must_use]
    pub fn map_of(entries: Vec<(String, Self)>) -> Self {
        Self::Map(normalize_map(entries))
    }

    /// Stable variant label, used in error context.
    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Uint(_) => "Uint",
            Self::Float32(_) => "Float32",
            Self::Float64(_) => "Float64",
            Self::Text(_) => "Text",
            Self::Timestamp(_) => "Timestamp",
            Self::Date(_) => "Date",
            Self::Time(_) => "Time",
            Self::Ulid(_) => "Ulid",
            Self::Geo(_) => "Geo",
            Self::Enum(_) => "Enum",
            Self::List(_) => "List",
            Self::Set(_) => "Set",
            Self::Map(_) => "Map",
            Self::Record(_) => "Record",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Substring match on text values.
    ///
    /// Returns `None` when either side is not text.
    #[must_use]
    pub fn text_contains(&self, needle: &str, mode: TextMode) -> Option<bool> {
        let haystack = self.as_text()?;

        let matched = match mode {
            TextMode::Cs => haystack.contains(needle),
            TextMode::Ci => haystack
                .to_lowercase()
                .contains(needle.to_lowercase().as_str()),
        };

        Some(matched)
    }
}

/// Sort and deduplicate set members under canonical order.
pub(crate) fn normalize_set(mut items: Vec<Value>) -> Vec<Value> {
    items.sort_by(canonical_cmp);
    items.dedup();
    items
}

/// Sort map entries by key; a later entry for the same key wins.
pub(crate) fn normalize_map(entries: Vec<(String, Value)>) -> Vec<(String, Value)> {
    let mut out: Vec<(String, Value)> = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        match out.binary_search_by(|(existing, _)| existing.as_str().cmp(key.as_str())) {
            Ok(at) => out[at] = (key, value),
            Err(at) => out.insert(at, (key, value)),
        }
    }
    out
}

impl fmt::Display for Value {
    /// Flat, search-friendly rendering: primitives as written, containers
    /// and records joined with single spaces. This is the derived text the
    /// full-text fallback tokenizes when no text index is declared.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Text(v) | Self::Enum(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Date(v) => write!(f, "{v}"),
            Self::Time(v) => write!(f, "{v}"),
            Self::Ulid(v) => write!(f, "{v}"),
            Self::Geo(v) => write!(f, "{} {}", v.latitude, v.longitude),
            Self::List(items) | Self::Set(items) => {
                let mut first = true;
                for item in items {
                    if !first {
                        write!(f, " ")?;
                    }
                    first = false;
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Map(entries) | Self::Record(entries) => {
                let mut first = true;
                for (_, value) in entries {
                    if !first {
                        write!(f, " ")?;
                    }
                    first = false;
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}
