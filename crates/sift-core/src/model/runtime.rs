use crate::{
    codec,
    error::Error,
    model::{Annotation, DefaultMarker, FieldType, RecordKind, RecordModel},
    registry::Registry,
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

///
/// TypeRef
///
/// Wire-portable reference to a registered type: serial name, ordered
/// type arguments, and a nullability flag.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeRef {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Self>,
    #[serde(default)]
    pub nullable: bool,
}

impl TypeRef {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            nullable: false,
        }
    }

    #[must_use]
    pub fn with_args(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            args,
            nullable: false,
        }
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Resolve against a registry into a concrete runtime shape.
    pub fn resolve(&self, registry: &Registry) -> Result<FieldType, Error> {
        let mut args = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            args.push(arg.resolve(registry)?);
        }

        let ty = registry.lookup(&self.name, &args)?;
        if self.nullable {
            Ok(FieldType::option_of(ty))
        } else {
            Ok(ty)
        }
    }

    /// Best-effort inverse of `resolve`, used when virtualizing a model.
    pub fn from_field_type(ty: &FieldType) -> Result<Self, Error> {
        let reference = match ty {
            FieldType::Option(inner) => return Ok(Self::from_field_type(inner)?.nullable()),
            FieldType::List(inner) => {
                Self::with_args("List", vec![Self::from_field_type(inner)?])
            }
            FieldType::Set(inner) => Self::with_args("Set", vec![Self::from_field_type(inner)?]),
            FieldType::Map(value) => {
                Self::with_args("Map", vec![Self::named("String"), Self::from_field_type(value)?])
            }
            FieldType::Param(index) => return Err(Error::GenericPlaceholder { index: *index }),
            other => Self::named(other.serial_name()),
        };

        Ok(reference)
    }
}

///
/// FieldDescription
///
/// One field of a virtual record: name, type reference, optional flag,
/// annotations, and default metadata. The static default is carried as
/// canonical-codec text; the dynamic marker as its string form.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub default_marker: Option<String>,
}

///
/// RecordDescription
///
/// Runtime description of a record type: the data from which a virtual
/// struct, enum, or alias model is reconstructed on the far side of a
/// process boundary.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RecordDescription {
    pub serial_name: String,
    pub kind: RecordKind,
    #[serde(default)]
    pub fields: Vec<FieldDescription>,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub alias_of: Option<TypeRef>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl RecordDescription {
    /// Resolve into a concrete runtime shape against `registry`.
    ///
    /// Structs become `FieldType::Record` with a fully-built model; enums
    /// become `FieldType::Enum`; aliases resolve to their target shape.
    pub fn resolve(&self, registry: &Registry) -> Result<FieldType, Error> {
        match self.kind {
            RecordKind::Enum => Ok(FieldType::Enum(Arc::new(crate::model::EnumModel::new(
                self.serial_name.clone(),
                self.variants.clone(),
            )))),
            RecordKind::Alias | RecordKind::Primitive => self
                .alias_of
                .as_ref()
                .ok_or_else(|| {
                    Error::serialization(format!(
                        "alias record `{}` has no target type",
                        self.serial_name
                    ))
                })?
                .resolve(registry),
            RecordKind::Struct => Ok(FieldType::Record(Arc::new(
                self.resolve_struct(registry)?,
            ))),
        }
    }

    fn resolve_struct(&self, registry: &Registry) -> Result<RecordModel, Error> {
        let mut model = RecordModel::new(self.serial_name.clone(), RecordKind::Struct);
        for annotation in &self.annotations {
            model = model.annotation(annotation.clone());
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if seen.contains(&field.name.as_str()) {
                return Err(Error::serialization(format!(
                    "duplicate field `{}` in record `{}`",
                    field.name, self.serial_name
                )));
            }
            seen.push(field.name.as_str());

            let ty = field.ty.resolve(registry)?;

            let declared_default = match &field.default {
                Some(text) => Some(codec::value_from_canonical_json(text, &ty)?),
                None => None,
            };
            let declared_marker = match &field.default_marker {
                Some(marker) => Some(DefaultMarker::from_str(marker).map_err(|()| {
                    Error::serialization(format!(
                        "unknown default marker `{marker}` on field `{}`",
                        field.name
                    ))
                })?),
                None => None,
            };

            model = model.push_field(
                field.name.clone(),
                ty,
                field.optional,
                field.annotations.clone(),
                declared_default,
                declared_marker,
            );
        }

        Ok(model)
    }

    /// Reconstruct a description from a live model (`virtualize` support).
    pub fn from_model(model: &RecordModel) -> Result<Self, Error> {
        let mut fields = Vec::with_capacity(model.fields.len());
        for field in &model.fields {
            let default = match &field.declared_default {
                Some(value) => Some(codec::value_to_canonical_json(value)?),
                None => None,
            };

            fields.push(FieldDescription {
                name: field.name.clone(),
                ty: TypeRef::from_field_type(&field.ty)?,
                optional: field.optional,
                annotations: field.annotations.clone(),
                default,
                default_marker: field.declared_marker.map(|m| m.as_str().to_string()),
            });
        }

        Ok(Self {
            serial_name: model.serial_name.clone(),
            kind: model.kind,
            fields,
            variants: Vec::new(),
            alias_of: None,
            annotations: model.annotations.clone(),
        })
    }
}

///
/// VirtualRecord
///
/// Instance of a runtime-described struct: an ordered vector of slot
/// values sharing the parent model. Index-based access; functional `set`.
/// Integrates with the same Condition/Modification/Path machinery as
/// statically-typed records through its `Value` form.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VirtualRecord {
    model: Arc<RecordModel>,
    slots: Vec<Value>,
}

impl VirtualRecord {
    pub fn new(model: Arc<RecordModel>, slots: Vec<Value>) -> Result<Self, Error> {
        if slots.len() != model.fields.len() {
            return Err(Error::incompatible(
                format!("{} slots", model.fields.len()),
                format!("{} slots", slots.len()),
                model.serial_name.clone(),
            ));
        }

        Ok(Self { model, slots })
    }

    #[must_use]
    pub const fn model(&self) -> &Arc<RecordModel> {
        &self.model
    }

    pub fn get(&self, index: usize) -> Result<&Value, Error> {
        self.slots.get(index).ok_or_else(|| {
            Error::incompatible(
                format!("field index < {}", self.slots.len()),
                format!("index {index}"),
                self.model.serial_name.clone(),
            )
        })
    }

    /// Functional slot replacement; the original record is unchanged.
    pub fn set(&self, index: usize, value: Value) -> Result<Self, Error> {
        if index >= self.slots.len() {
            return Err(Error::incompatible(
                format!("field index < {}", self.slots.len()),
                format!("index {index}"),
                self.model.serial_name.clone(),
            ));
        }

        let mut next = self.clone();
        next.slots[index] = value;
        Ok(next)
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Record(
            self.model
                .fields
                .iter()
                .zip(self.slots.iter())
                .map(|(field, slot)| (field.name.clone(), slot.clone()))
                .collect(),
        )
    }

    pub fn from_value(model: Arc<RecordModel>, value: &Value) -> Result<Self, Error> {
        let Value::Record(entries) = value else {
            return Err(Error::incompatible(
                model.serial_name.clone(),
                value.variant_name(),
                "this",
            ));
        };

        let mut slots = Vec::with_capacity(model.fields.len());
        for field in &model.fields {
            let slot = entries
                .iter()
                .find(|(name, _)| *name == field.name)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| {
                    Error::incompatible(
                        format!("field `{}`", field.name),
                        "missing field",
                        model.serial_name.clone(),
                    )
                })?;
            slots.push(slot);
        }

        Self::new(model, slots)
    }

    /// Runtime shape of this record, for evaluation entry points.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        FieldType::Record(Arc::clone(&self.model))
    }

    /// Evaluate a condition against this record.
    pub fn matches(&self, condition: &crate::condition::ConditionNode) -> Result<bool, Error> {
        crate::condition::eval(condition, &self.to_value(), &self.field_type())
    }

    /// Apply a modification, producing a new record.
    pub fn modify(
        &self,
        modification: &crate::modification::ModificationNode,
    ) -> Result<Self, Error> {
        let updated =
            crate::modification::apply(modification, &self.to_value(), &self.field_type())?;
        Self::from_value(Arc::clone(&self.model), &updated)
    }
}
