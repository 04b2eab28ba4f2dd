mod field_type;
mod runtime;


use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// re-exports
pub use field_type::{EnumModel, FieldType, IntWidth};
pub use runtime::{FieldDescription, RecordDescription, TypeRef, VirtualRecord};

/// Struct-level annotation naming the field paths joined into the derived
/// text for the full-text fallback.
pub const TEXT_INDEX_ANNOTATION: &str = "text_index";

///
/// RecordKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RecordKind {
    Struct,
    Enum,
    Alias,
    Primitive,
}

///
/// Annotation
///
/// Open metadata attached to records and fields. Unknown annotations are
/// tolerated everywhere; only `text_index` is interpreted by the core.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl Annotation {
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

///
/// DefaultMarker
///
/// Closed set of dynamic-default markers. A field whose default cannot be
/// materialized as a stable value (fresh id, current instant/date/time)
/// carries one of these; the marker is opaque to the core and exists for
/// external tooling.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DefaultMarker {
    FreshIdentifier,
    CurrentInstant,
    CurrentLocalDate,
    CurrentLocalTime,
}

impl DefaultMarker {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FreshIdentifier => "FreshIdentifier",
            Self::CurrentInstant => "CurrentInstant",
            Self::CurrentLocalDate => "CurrentLocalDate",
            Self::CurrentLocalTime => "CurrentLocalTime",
        }
    }

    /// Classify a dynamic default by the runtime shape of its samples.
    #[must_use]
    pub fn for_type(ty: &FieldType) -> Option<Self> {
        match ty.unwrap_option() {
            FieldType::Ulid => Some(Self::FreshIdentifier),
            FieldType::Timestamp => Some(Self::CurrentInstant),
            FieldType::Date => Some(Self::CurrentLocalDate),
            FieldType::Time => Some(Self::CurrentLocalTime),
            _ => None,
        }
    }
}

impl fmt::Display for DefaultMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DefaultMarker {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FreshIdentifier" => Ok(Self::FreshIdentifier),
            "CurrentInstant" => Ok(Self::CurrentInstant),
            "CurrentLocalDate" => Ok(Self::CurrentLocalDate),
            "CurrentLocalTime" => Ok(Self::CurrentLocalTime),
            _ => Err(()),
        }
    }
}

///
/// FieldModel
///
/// One field of a struct record: stable index, name unique within the
/// struct, runtime type shape, and default metadata. For statically-typed
/// records the default metadata is detected by double instantiation; for
/// virtual records it is declared up front in the description.
///

#[derive(Clone, Debug)]
pub struct FieldModel {
    pub index: usize,
    pub name: String,
    pub ty: FieldType,
    /// Whether the field has a declarable default.
    pub optional: bool,
    pub annotations: Vec<Annotation>,
    pub(crate) declared_default: Option<Value>,
    pub(crate) declared_marker: Option<DefaultMarker>,
}

impl FieldModel {
    /// Pre-declared static default, if any (virtual records only; static
    /// records detect defaults through `Property`).
    #[must_use]
    pub const fn declared_default(&self) -> Option<&Value> {
        self.declared_default.as_ref()
    }

    #[must_use]
    pub const fn declared_marker(&self) -> Option<DefaultMarker> {
        self.declared_marker
    }

    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }
}

///
/// RecordModel
///
/// Structural type information for a record: stable serial name, kind,
/// ordered immutable field list, generic parameters, and annotations.
/// Field lookup by name is O(1). Two models are equal iff their serial
/// names and ordered parameter lists are equal.
///

#[derive(Debug)]
pub struct RecordModel {
    pub serial_name: String,
    pub kind: RecordKind,
    pub fields: Vec<FieldModel>,
    pub params: Vec<FieldType>,
    pub annotations: Vec<Annotation>,
    by_name: HashMap<String, usize>,
}

impl RecordModel {
    #[must_use]
    pub fn new(serial_name: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            serial_name: serial_name.into(),
            kind,
            fields: Vec::new(),
            params: Vec::new(),
            annotations: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Append a required field. The index is the declaration position.
    #[must_use]
    pub fn field(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.push_field(name, ty, false, Vec::new(), None, None)
    }

    /// Append a field with a declarable default.
    #[must_use]
    pub fn optional_field(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.push_field(name, ty, true, Vec::new(), None, None)
    }

    #[must_use]
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn param(mut self, ty: FieldType) -> Self {
        self.params.push(ty);
        self
    }

    #[must_use]
    pub(crate) fn push_field(
        mut self,
        name: impl Into<String>,
        ty: FieldType,
        optional: bool,
        annotations: Vec<Annotation>,
        declared_default: Option<Value>,
        declared_marker: Option<DefaultMarker>,
    ) -> Self {
        let name = name.into();
        let index = self.fields.len();
        // Field names are unique per struct; the first declaration wins.
        self.by_name.entry(name.clone()).or_insert(index);
        self.fields.push(FieldModel {
            index,
            name,
            ty,
            optional,
            annotations,
            declared_default,
            declared_marker,
        });
        self
    }

    /// Ordered field enumeration; empty iff the model is not a struct.
    #[must_use]
    pub fn fields_of(&self) -> &[FieldModel] {
        &self.fields
    }

    /// O(1) index lookup by field name.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldModel> {
        self.field_index(name).map(|index| &self.fields[index])
    }

    /// Field paths declared by the struct-level `text_index` annotation.
    #[must_use]
    pub fn text_index(&self) -> Option<&[String]> {
        self.annotations
            .iter()
            .find(|a| a.name == TEXT_INDEX_ANNOTATION)
            .map(|a| a.values.as_slice())
    }
}

impl PartialEq for RecordModel {
    fn eq(&self, other: &Self) -> bool {
        self.serial_name == other.serial_name && self.params == other.params
    }
}

impl Eq for RecordModel {}
