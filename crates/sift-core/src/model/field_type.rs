use crate::model::RecordModel;
use std::fmt;
use std::sync::Arc;

///
/// IntWidth
///
/// Declared bit width of an integer field. Wrapping arithmetic and bit
/// predicates truncate at this width.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::W8 => 8,
            Self::W16 => 16,
            Self::W32 => 32,
            Self::W64 => 64,
        }
    }
}

///
/// EnumModel
///
/// Runtime shape of a closed enum: serial name plus ordered variant names.
/// Equality is by serial name.
///

#[derive(Clone, Debug)]
pub struct EnumModel {
    pub serial_name: String,
    pub variants: Vec<String>,
}

impl EnumModel {
    #[must_use]
    pub fn new(serial_name: impl Into<String>, variants: Vec<String>) -> Self {
        Self {
            serial_name: serial_name.into(),
            variants,
        }
    }
}

impl PartialEq for EnumModel {
    fn eq(&self, other: &Self) -> bool {
        self.serial_name == other.serial_name
    }
}

impl Eq for EnumModel {}

///
/// FieldType
///
/// Runtime type shape of a field. This is the smallest surface needed to
/// route predicates, modifications, paths, and the canonical codec; it is
/// aligned with `Value` variants and intentionally lossy beyond that.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldType {
    Bool,
    Int(IntWidth),
    Uint(IntWidth),
    Float32,
    Float64,
    Char,
    Text,
    /// Inline wrapper around a plain string (see `RawText`).
    RawText,
    Timestamp,
    Date,
    Time,
    Ulid,
    Geo,
    Enum(Arc<EnumModel>),
    Option(Box<Self>),
    List(Box<Self>),
    Set(Box<Self>),
    /// String-keyed map; the boxed type is the value type.
    Map(Box<Self>),
    Record(Arc<RecordModel>),
    /// Generic placeholder awaiting a concrete argument.
    Param(usize),
    /// Not filterable, not modifiable, not addressable.
    Unsupported,
}

impl FieldType {
    #[must_use]
    pub fn option_of(inner: Self) -> Self {
        Self::Option(Box::new(inner))
    }

    #[must_use]
    pub fn list_of(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    #[must_use]
    pub fn set_of(inner: Self) -> Self {
        Self::Set(Box::new(inner))
    }

    #[must_use]
    pub fn map_of(value: Self) -> Self {
        Self::Map(Box::new(value))
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Option(_))
    }

    /// Strip one level of nullability, if present.
    #[must_use]
    pub fn unwrap_option(&self) -> &Self {
        match self {
            Self::Option(inner) => inner,
            other => other,
        }
    }

    /// Canonical serial name of the shape head (no parameters).
    #[must_use]
    pub fn serial_name(&self) -> String {
        match self {
            Self::Bool => "Bool".to_string(),
            Self::Int(width) => format!("Int{}", width.bits()),
            Self::Uint(width) => format!("UInt{}", width.bits()),
            Self::Float32 => "Float32".to_string(),
            Self::Float64 => "Float64".to_string(),
            Self::Char => "Char".to_string(),
            Self::Text => "String".to_string(),
            Self::RawText => "RawString".to_string(),
            Self::Timestamp => "Instant".to_string(),
            Self::Date => "LocalDate".to_string(),
            Self::Time => "LocalTime".to_string(),
            Self::Ulid => "Ulid".to_string(),
            Self::Geo => "GeoPoint".to_string(),
            Self::Enum(model) => model.serial_name.clone(),
            Self::Option(_) => "Option".to_string(),
            Self::List(_) => "List".to_string(),
            Self::Set(_) => "Set".to_string(),
            Self::Map(_) => "Map".to_string(),
            Self::Record(model) => model.serial_name.clone(),
            Self::Param(index) => format!("Param{index}"),
            Self::Unsupported => "Unsupported".to_string(),
        }
    }

    /// Deterministic structural identity: serial name, nullability marker,
    /// and ordered parameters. Stable across processes sharing a registry.
    #[must_use]
    pub fn signature(&self) -> String {
        match self {
            Self::Option(inner) => format!("{}?", inner.signature()),
            Self::List(inner) => format!("List<{}>", inner.signature()),
            Self::Set(inner) => format!("Set<{}>", inner.signature()),
            Self::Map(value) => format!("Map<String,{}>", value.signature()),
            Self::Record(model) => {
                if model.params.is_empty() {
                    model.serial_name.clone()
                } else {
                    let params: Vec<String> =
                        model.params.iter().map(Self::signature).collect();
                    format!("{}<{}>", model.serial_name, params.join(","))
                }
            }
            other => other.serial_name(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}
