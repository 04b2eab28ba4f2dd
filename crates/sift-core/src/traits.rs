use crate::{
    error::Error,
    model::{FieldType, IntWidth, RecordKind, RecordModel},
    value::{Float32, Float64, GeoPoint, RawText, Value},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::sync::Arc;
use ulid::Ulid;

///
/// FieldValue
///
/// Conversion boundary between typed field values and the dynamic `Value`
/// representation. Everything that can appear in a record field, a
/// predicate literal, or a modification payload implements this.
///

pub trait FieldValue: Sized {
    /// Runtime shape of this type.
    fn field_type() -> FieldType;

    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Result<Self, Error>;
}

///
/// Record
///
/// A reflectable struct record. The model is the sole source of truth for
/// wire names and field dispatch; it is built once and shared.
///
/// `default_record` powers default detection by double instantiation:
/// types with a `Default` impl return a fresh instance per call, so fields
/// whose defaults are dynamic (fresh id, current instant) differ between
/// two calls and are classified by their runtime shape.
///

pub trait Record: FieldValue {
    fn model() -> Arc<RecordModel>;

    fn default_record() -> Option<Self> {
        None
    }
}

/// Read one field value by stable index.
///
/// Implemented as a single pass through the record's `Value` layout; the
/// record itself is never mutated.
pub fn get_field<R: Record>(record: &R, index: usize) -> Result<Value, Error> {
    let value = record.to_value();
    let Value::Record(fields) = value else {
        return Err(Error::incompatible(
            "Record",
            value.variant_name(),
            "this",
        ));
    };

    fields
        .into_iter()
        .nth(index)
        .map(|(_, slot)| slot)
        .ok_or_else(|| {
            Error::incompatible(
                format!("field index < {}", R::model().fields.len()),
                format!("index {index}"),
                "this",
            )
        })
}

/// Replace one field value by stable index, returning a new record.
///
/// All other fields are preserved exactly; the original is unchanged.
pub fn set_field<R: Record>(record: &R, index: usize, value: Value) -> Result<R, Error> {
    let mut repr = record.to_value();
    let Value::Record(fields) = &mut repr else {
        return Err(Error::incompatible(
            "Record",
            repr.variant_name(),
            "this",
        ));
    };

    let slot = fields.get_mut(index).ok_or_else(|| {
        Error::incompatible(
            format!("field index < {}", R::model().fields.len()),
            format!("index {index}"),
            "this",
        )
    })?;
    slot.1 = value;

    R::from_value(&repr)
}

// ---------------------------------------------------------------------------
// FieldValue impls: primitives
// ---------------------------------------------------------------------------

impl FieldValue for bool {
    fn field_type() -> FieldType {
        FieldType::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Bool(v) => Ok(*v),
            other => Err(Error::incompatible("Bool", other.variant_name(), "this")),
        }
    }
}

// impl_int_field_value
macro_rules! impl_int_field_value {
    ( $( $ty:ty => $variant:ident, $width:ident ),* $(,)? ) => {
        $(
            impl FieldValue for $ty {
                fn field_type() -> FieldType {
                    FieldType::$variant(IntWidth::$width)
                }

                fn to_value(&self) -> Value {
                    Value::$variant((*self).into())
                }

                fn from_value(value: &Value) -> Result<Self, Error> {
                    match value {
                        Value::$variant(v) => (*v).try_into().map_err(|_| {
                            Error::incompatible(
                                stringify!($ty),
                                format!("out-of-range {v}"),
                                "this",
                            )
                        }),
                        other => Err(Error::incompatible(
                            stringify!($ty),
                            other.variant_name(),
                            "this",
                        )),
                    }
                }
            }
        )*
    };
}

impl_int_field_value!(
    i8 => Int, W8,
    i16 => Int, W16,
    i32 => Int, W32,
    i64 => Int, W64,
    u8 => Uint, W8,
    u16 => Uint, W16,
    u32 => Uint, W32,
    u64 => Uint, W64,
);

impl FieldValue for f32 {
    fn field_type() -> FieldType {
        FieldType::Float32
    }

    fn to_value(&self) -> Value {
        Value::Float32(Float32::new(*self))
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Float32(v) => Ok(v.get()),
            other => Err(Error::incompatible("Float32", other.variant_name(), "this")),
        }
    }
}

impl FieldValue for f64 {
    fn field_type() -> FieldType {
        FieldType::Float64
    }

    fn to_value(&self) -> Value {
        Value::Float64(Float64::new(*self))
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Float64(v) => Ok(v.get()),
            other => Err(Error::incompatible("Float64", other.variant_name(), "this")),
        }
    }
}

impl FieldValue for char {
    fn field_type() -> FieldType {
        FieldType::Char
    }

    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        let text = value
            .as_text()
            .ok_or_else(|| Error::incompatible("Char", value.variant_name(), "this"))?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::incompatible("Char", "multi-character text", "this")),
        }
    }
}

impl FieldValue for String {
    fn field_type() -> FieldType {
        FieldType::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Text(v) => Ok(v.clone()),
            other => Err(Error::incompatible("String", other.variant_name(), "this")),
        }
    }
}

impl FieldValue for RawText {
    fn field_type() -> FieldType {
        FieldType::RawText
    }

    fn to_value(&self) -> Value {
        Value::Text(self.0.clone())
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Text(v) => Ok(Self(v.clone())),
            other => Err(Error::incompatible(
                "RawString",
                other.variant_name(),
                "this",
            )),
        }
    }
}

impl FieldValue for DateTime<Utc> {
    fn field_type() -> FieldType {
        FieldType::Timestamp
    }

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Timestamp(v) => Ok(*v),
            other => Err(Error::incompatible(
                "Instant",
                other.variant_name(),
                "this",
            )),
        }
    }
}

impl FieldValue for NaiveDate {
    fn field_type() -> FieldType {
        FieldType::Date
    }

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Date(v) => Ok(*v),
            other => Err(Error::incompatible(
                "LocalDate",
                other.variant_name(),
                "this",
            )),
        }
    }
}

impl FieldValue for NaiveTime {
    fn field_type() -> FieldType {
        FieldType::Time
    }

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Time(v) => Ok(*v),
            other => Err(Error::incompatible(
                "LocalTime",
                other.variant_name(),
                "this",
            )),
        }
    }
}

impl FieldValue for Ulid {
    fn field_type() -> FieldType {
        FieldType::Ulid
    }

    fn to_value(&self) -> Value {
        Value::Ulid(*self)
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Ulid(v) => Ok(*v),
            other => Err(Error::incompatible("Ulid", other.variant_name(), "this")),
        }
    }
}

impl FieldValue for GeoPoint {
    fn field_type() -> FieldType {
        FieldType::Geo
    }

    fn to_value(&self) -> Value {
        Value::Geo(*self)
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Geo(v) => Ok(*v),
            other => Err(Error::incompatible(
                "GeoPoint",
                other.variant_name(),
                "this",
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldValue impls: wrappers and containers
// ---------------------------------------------------------------------------

impl<T: FieldValue> FieldValue for Option<T> {
    fn field_type() -> FieldType {
        FieldType::option_of(T::field_type())
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        if value.is_null() {
            return Ok(None);
        }

        T::from_value(value).map(Some)
    }
}

impl<T: FieldValue> FieldValue for Box<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        T::from_value(value).map(Self::new)
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::list_of(T::field_type())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        let Value::List(items) = value else {
            return Err(Error::incompatible("List", value.variant_name(), "this"));
        };

        let mut out = Self::with_capacity(items.len());
        for item in items {
            out.push(T::from_value(item)?);
        }

        Ok(out)
    }
}

impl<T: FieldValue + Ord> FieldValue for BTreeSet<T> {
    fn field_type() -> FieldType {
        FieldType::set_of(T::field_type())
    }

    fn to_value(&self) -> Value {
        Value::set_of(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        let Value::Set(items) = value else {
            return Err(Error::incompatible("Set", value.variant_name(), "this"));
        };

        let mut out = Self::new();
        for item in items {
            out.insert(T::from_value(item)?);
        }

        Ok(out)
    }
}

impl<T: FieldValue> FieldValue for BTreeMap<String, T> {
    fn field_type() -> FieldType {
        FieldType::map_of(T::field_type())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        )
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        let Value::Map(entries) = value else {
            return Err(Error::incompatible("Map", value.variant_name(), "this"));
        };

        let mut out = Self::new();
        for (key, entry) in entries {
            out.insert(
                key.clone(),
                T::from_value(entry).map_err(|e| e.with_segment(key))?,
            );
        }

        Ok(out)
    }
}

// Synthetic struct models for tuple-like shapes the registry pre-populates.
fn tuple_model(serial_name: &str, fields: Vec<(&str, FieldType)>) -> Arc<RecordModel> {
    let mut model = RecordModel::new(serial_name, RecordKind::Struct);
    let params: Vec<FieldType> = fields.iter().map(|(_, ty)| ty.clone()).collect();
    for (name, ty) in fields {
        model = model.field(name, ty);
    }
    for param in params {
        model = model.param(param);
    }
    Arc::new(model)
}

impl<A: FieldValue, B: FieldValue> FieldValue for (A, B) {
    fn field_type() -> FieldType {
        FieldType::Record(tuple_model(
            "Pair",
            vec![("first", A::field_type()), ("second", B::field_type())],
        ))
    }

    fn to_value(&self) -> Value {
        Value::Record(vec![
            ("first".to_string(), self.0.to_value()),
            ("second".to_string(), self.1.to_value()),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        let Value::Record(entries) = value else {
            return Err(Error::incompatible("Pair", value.variant_name(), "this"));
        };
        let [first, second] = entries.as_slice() else {
            return Err(Error::incompatible("Pair", "wrong arity", "this"));
        };

        Ok((A::from_value(&first.1)?, B::from_value(&second.1)?))
    }
}

impl<A: FieldValue, B: FieldValue, C: FieldValue> FieldValue for (A, B, C) {
    fn field_type() -> FieldType {
        FieldType::Record(tuple_model(
            "Triple",
            vec![
                ("first", A::field_type()),
                ("second", B::field_type()),
                ("third", C::field_type()),
            ],
        ))
    }

    fn to_value(&self) -> Value {
        Value::Record(vec![
            ("first".to_string(), self.0.to_value()),
            ("second".to_string(), self.1.to_value()),
            ("third".to_string(), self.2.to_value()),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        let Value::Record(entries) = value else {
            return Err(Error::incompatible("Triple", value.variant_name(), "this"));
        };
        let [first, second, third] = entries.as_slice() else {
            return Err(Error::incompatible("Triple", "wrong arity", "this"));
        };

        Ok((
            A::from_value(&first.1)?,
            B::from_value(&second.1)?,
            C::from_value(&third.1)?,
        ))
    }
}

impl<T: FieldValue> FieldValue for RangeInclusive<T> {
    fn field_type() -> FieldType {
        FieldType::Record(tuple_model(
            "ClosedRange",
            vec![
                ("start", T::field_type()),
                ("endInclusive", T::field_type()),
            ],
        ))
    }

    fn to_value(&self) -> Value {
        Value::Record(vec![
            ("start".to_string(), self.start().to_value()),
            ("endInclusive".to_string(), self.end().to_value()),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, Error> {
        let Value::Record(entries) = value else {
            return Err(Error::incompatible(
                "ClosedRange",
                value.variant_name(),
                "this",
            ));
        };
        let [start, end] = entries.as_slice() else {
            return Err(Error::incompatible("ClosedRange", "wrong arity", "this"));
        };

        Ok(T::from_value(&start.1)?..=T::from_value(&end.1)?)
    }
}

///
/// impl_record_value
///
/// Generates the `FieldValue` impl for a struct whose `Record` impl is
/// written by hand. Fields must be listed in declaration order, matching
/// the model.
///

#[macro_export]
macro_rules! impl_record_value {
    ( $ty:ident { $( $field:ident ),+ $(,)? } ) => {
        impl $crate::traits::FieldValue for $ty {
            fn field_type() -> $crate::model::FieldType {
                $crate::model::FieldType::Record(<$ty as $crate::traits::Record>::model())
            }

            fn to_value(&self) -> $crate::value::Value {
                $crate::value::Value::Record(vec![
                    $(
                        (
                            stringify!($field).to_string(),
                            $crate::traits::FieldValue::to_value(&self.$field),
                        ),
                    )+
                ])
            }

            fn from_value(
                value: &$crate::value::Value,
            ) -> Result<Self, $crate::error::Error> {
                let $crate::value::Value::Record(entries) = value else {
                    return Err($crate::error::Error::incompatible(
                        "Record",
                        value.variant_name(),
                        "this",
                    ));
                };

                let mut entries = entries.iter();
                $(
                    let $field = {
                        let (name, slot) = entries.next().ok_or_else(|| {
                            $crate::error::Error::incompatible(
                                stringify!($field),
                                "missing field",
                                "this",
                            )
                        })?;
                        if name != stringify!($field) {
                            return Err($crate::error::Error::incompatible(
                                stringify!($field),
                                name.as_str(),
                                "this",
                            ));
                        }
                        $crate::traits::FieldValue::from_value(slot)
                            .map_err(|e| e.with_segment(stringify!($field)))?
                    };
                )+

                Ok(Self { $( $field ),+ })
            }
        }
    };
}
