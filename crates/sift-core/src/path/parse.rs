use crate::{
    error::Error,
    model::FieldType,
    path::{FieldPath, PathStep},
    traits::{FieldValue, Record},
};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Parse a dotted path against a root shape, strictly left-to-right.
///
/// Grammar per component: a field name resolves against the current record
/// model; `*` descends into list/set elements; each trailing `?` narrows a
/// nullable shape. The empty string is the identity path.
///
/// Returns the steps and the leaf shape they terminate in.
pub fn parse_path(root: &FieldType, text: &str) -> Result<(Vec<PathStep>, FieldType), Error> {
    let mut steps = Vec::new();
    let mut current = root.clone();

    if text.is_empty() {
        return Ok((steps, current));
    }

    for component in text.split('.') {
        let mut name = component;
        let mut narrowings = 0usize;
        while let Some(stripped) = name.strip_suffix('?') {
            name = stripped;
            narrowings += 1;
        }

        if name.is_empty() {
            return Err(Error::serialization(format!(
                "empty path component in `{text}`"
            )));
        }

        if name == "*" {
            current = match current {
                FieldType::List(inner) => {
                    steps.push(PathStep::ListElements);
                    *inner
                }
                FieldType::Set(inner) => {
                    steps.push(PathStep::SetElements);
                    *inner
                }
                other => {
                    return Err(Error::serialization(format!(
                        "`*` applied to non-collection shape {other} in `{text}`"
                    )));
                }
            };
        } else {
            let next = {
                let FieldType::Record(model) = &current else {
                    return Err(Error::serialization(format!(
                        "`{name}` applied to non-record shape {current} in `{text}`"
                    )));
                };

                let field = model.field_by_name(name).ok_or_else(|| {
                    Error::serialization(format!(
                        "unknown field `{name}` on `{}` in `{text}`",
                        model.serial_name
                    ))
                })?;

                steps.push(PathStep::Field {
                    name: field.name.clone(),
                    index: field.index,
                    ty: field.ty.clone(),
                });
                field.ty.clone()
            };
            current = next;
        }

        for _ in 0..narrowings {
            current = match current {
                FieldType::Option(inner) => {
                    steps.push(PathStep::NotNull);
                    *inner
                }
                other => {
                    return Err(Error::serialization(format!(
                        "`?` applied to non-nullable shape {other} in `{text}`"
                    )));
                }
            };
        }
    }

    Ok((steps, current))
}

impl<Root: Record, Leaf: FieldValue> FieldPath<Root, Leaf> {
    /// Parse the dotted wire form into a typed path, checking the leaf
    /// shape against `Leaf`.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let root = FieldType::Record(Root::model());
        let (steps, leaf) = parse_path(&root, text)?;

        if leaf != Leaf::field_type() {
            return Err(Error::incompatible(
                Leaf::field_type().signature(),
                leaf.signature(),
                text,
            ));
        }

        Ok(Self::from_steps(steps))
    }
}

impl<Root, Leaf> Serialize for FieldPath<Root, Leaf> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.wire_name())
    }
}

impl<'de, Root: Record, Leaf: FieldValue> Deserialize<'de> for FieldPath<Root, Leaf> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(DeError::custom)
    }
}
