mod parse;

#[cfg(test)]
mod tests;

use crate::{
    condition::{Condition, ConditionNode},
    error::Error,
    model::{Annotation, DefaultMarker, FieldType},
    modification::{Modification, ModificationNode},
    traits::{FieldValue, Record, get_field, set_field},
    value::Value,
};
use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;

pub use parse::parse_path;

///
/// Property
///
/// One field of a record: the pair (parent model, field index) plus the
/// typed conversion through the child shape. `get` never mutates; `set`
/// is a functional copy preserving every other field.
///

pub struct Property<R, L> {
    index: usize,
    _marker: PhantomData<fn(&R) -> L>,
}

impl<R, L> Clone for Property<R, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, L> Copy for Property<R, L> {}

impl<R, L> fmt::Debug for Property<R, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property").field("index", &self.index).finish()
    }
}

impl<R: Record, L: FieldValue> Property<R, L> {
    /// Property at a declaration index; checks the index and the leaf shape
    /// against the parent model.
    pub fn at(index: usize) -> Result<Self, Error> {
        let model = R::model();
        let field = model.fields.get(index).ok_or_else(|| {
            Error::incompatible(
                format!("field index < {}", model.fields.len()),
                format!("index {index}"),
                model.serial_name.clone(),
            )
        })?;

        if field.ty != L::field_type() {
            return Err(Error::incompatible(
                field.ty.signature(),
                L::field_type().signature(),
                field.name.clone(),
            ));
        }

        Ok(Self {
            index,
            _marker: PhantomData,
        })
    }

    /// Property by field name; O(1) against the model's name index.
    pub fn named(name: &str) -> Result<Self, Error> {
        let model = R::model();
        let index = model.field_index(name).ok_or_else(|| {
            Error::incompatible(
                format!("field of `{}`", model.serial_name),
                format!("`{name}`"),
                model.serial_name.clone(),
            )
        })?;

        Self::at(index)
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn name(&self) -> String {
        R::model().fields[self.index].name.clone()
    }

    #[must_use]
    pub fn annotations(&self) -> Vec<Annotation> {
        R::model().fields[self.index].annotations.clone()
    }

    pub fn get(&self, record: &R) -> Result<L, Error> {
        let value = get_field(record, self.index)?;
        L::from_value(&value).map_err(|e| e.with_segment(&self.name()))
    }

    pub fn set(&self, record: &R, value: L) -> Result<R, Error> {
        set_field(record, self.index, value.to_value())
    }

    /// Static default of this field, when one is derivable by instantiating
    /// the parent default twice and observing equality at this index.
    #[must_use]
    pub fn default(&self) -> Option<L> {
        let (first, second) = self.default_samples()?;
        if first == second {
            L::from_value(&first).ok()
        } else {
            None
        }
    }

    /// Dynamic-default marker: set when two parent defaults disagree at
    /// this field and the field shape names a known dynamic source.
    #[must_use]
    pub fn default_marker(&self) -> Option<DefaultMarker> {
        if let Some(marker) = R::model().fields[self.index].declared_marker() {
            return Some(marker);
        }

        let (first, second) = self.default_samples()?;
        if first == second {
            None
        } else {
            DefaultMarker::for_type(&L::field_type())
        }
    }

    fn default_samples(&self) -> Option<(Value, Value)> {
        let first = R::default_record()?;
        let second = R::default_record()?;
        let first = get_field(&first, self.index).ok()?;
        let second = get_field(&second, self.index).ok()?;
        Some((first, second))
    }

    /// Lift this property into a single-step path.
    #[must_use]
    pub fn path(&self) -> FieldPath<R, L> {
        FieldPath::<R, R>::root().then(*self)
    }
}

///
/// PathStep
///
/// One erased traversal step. `Field` carries everything evaluation and
/// the codec need; the wrapper steps adjust nullability and cardinality.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathStep {
    Field {
        name: String,
        index: usize,
        ty: FieldType,
    },
    NotNull,
    ListElements,
    SetElements,
}

///
/// FieldPath
///
/// Typed lens from a root record into a leaf, and a serializable
/// identifier for that lens. Paths never own the records they traverse;
/// `get` borrows, `set` returns a fresh root.
///

pub struct FieldPath<Root, Leaf> {
    steps: Vec<PathStep>,
    _marker: PhantomData<fn(&Root) -> Leaf>,
}

impl<Root, Leaf> Clone for FieldPath<Root, Leaf> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
            _marker: PhantomData,
        }
    }
}

impl<Root, Leaf> fmt::Debug for FieldPath<Root, Leaf> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldPath")
            .field("steps", &self.steps)
            .finish()
    }
}

impl<Root, Leaf> PartialEq for FieldPath<Root, Leaf> {
    fn eq(&self, other: &Self) -> bool {
        self.steps == other.steps
    }
}

impl<Root, Leaf> Eq for FieldPath<Root, Leaf> {}

impl<T: FieldValue> FieldPath<T, T> {
    /// The identity lens, printed as `this`.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            steps: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<Root, Leaf> FieldPath<Root, Leaf> {
    pub(crate) const fn from_steps(steps: Vec<PathStep>) -> Self {
        Self {
            steps,
            _marker: PhantomData,
        }
    }

    /// Ordered traversal steps; field steps are the traversed properties.
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Names of the traversed properties, in order.
    #[must_use]
    pub fn property_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                PathStep::Field { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Dot-separated wire form; empty for the identity lens.
    #[must_use]
    pub fn wire_name(&self) -> String {
        render_steps(&self.steps)
    }
}

impl<Root: FieldValue, Mid: Record> FieldPath<Root, Mid> {
    /// Extend through a field of the current leaf record.
    #[must_use]
    pub fn then<L: FieldValue>(&self, prop: Property<Mid, L>) -> FieldPath<Root, L> {
        let model = Mid::model();
        let field = &model.fields[prop.index()];

        let mut steps = self.steps.clone();
        steps.push(PathStep::Field {
            name: field.name.clone(),
            index: field.index,
            ty: field.ty.clone(),
        });

        FieldPath::from_steps(steps)
    }
}

impl<Root: FieldValue, Leaf: FieldValue> FieldPath<Root, Option<Leaf>> {
    /// Narrow a nullable leaf; absent values short-circuit `get` to `None`
    /// and leave `set` roots untouched.
    #[must_use]
    pub fn not_null(&self) -> FieldPath<Root, Leaf> {
        let mut steps = self.steps.clone();
        steps.push(PathStep::NotNull);
        FieldPath::from_steps(steps)
    }
}

impl<Root: FieldValue, E: FieldValue> FieldPath<Root, Vec<E>> {
    /// Navigate into list elements.
    ///
    /// As a lens base this reads the first element and `set` replaces the
    /// whole list with a singleton; use the `ListAllElements` /
    /// `ListAnyElements` conditions for exact element semantics.
    #[must_use]
    pub fn elements(&self) -> FieldPath<Root, E> {
        let mut steps = self.steps.clone();
        steps.push(PathStep::ListElements);
        FieldPath::from_steps(steps)
    }
}

impl<Root: FieldValue, E: FieldValue + Ord> FieldPath<Root, BTreeSet<E>> {
    /// Navigate into set elements; same lens-base caveats as lists.
    #[must_use]
    pub fn elements(&self) -> FieldPath<Root, E> {
        let mut steps = self.steps.clone();
        steps.push(PathStep::SetElements);
        FieldPath::from_steps(steps)
    }
}

impl<Root: FieldValue, Leaf: FieldValue> FieldPath<Root, Leaf> {
    /// Read the leaf; `None` when an intermediate step is absent.
    pub fn get(&self, root: &Root) -> Result<Option<Leaf>, Error> {
        let value = root.to_value();
        match get_in(&self.steps, &value)? {
            Some(leaf) => Ok(Some(Leaf::from_value(&leaf)?)),
            None => Ok(None),
        }
    }

    /// Write the leaf, returning a new root; absent intermediate steps
    /// preserve the root unchanged.
    pub fn set(&self, root: &Root, leaf: Leaf) -> Result<Root, Error> {
        let value = root.to_value();
        let updated = set_in(&self.steps, &value, leaf.to_value())?;
        Root::from_value(&updated)
    }

    /// Wrap a leaf condition into a root condition along this path.
    #[must_use]
    pub fn map_condition(&self, inner: Condition<Leaf>) -> Condition<Root> {
        let mut node = inner.into_node();
        for step in self.steps.iter().rev() {
            node = match step {
                PathStep::Field { name, .. } => ConditionNode::OnField {
                    field: name.clone(),
                    condition: Box::new(node),
                },
                PathStep::NotNull => ConditionNode::IfNotNull(Box::new(node)),
                PathStep::ListElements => ConditionNode::ListAllElements(Box::new(node)),
                PathStep::SetElements => ConditionNode::SetAllElements(Box::new(node)),
            };
        }

        Condition::from_node(node)
    }

    /// Wrap a leaf modification into a root modification along this path.
    #[must_use]
    pub fn map_modification(&self, inner: Modification<Leaf>) -> Modification<Root> {
        let mut node = inner.into_node();
        for step in self.steps.iter().rev() {
            node = match step {
                PathStep::Field { name, .. } => ModificationNode::OnField {
                    field: name.clone(),
                    modification: Box::new(node),
                },
                PathStep::NotNull => ModificationNode::IfNotNull(Box::new(node)),
                PathStep::ListElements => ModificationNode::ListPerElement {
                    condition: Box::new(ConditionNode::Always),
                    modification: Box::new(node),
                },
                PathStep::SetElements => ModificationNode::SetPerElement {
                    condition: Box::new(ConditionNode::Always),
                    modification: Box::new(node),
                },
            };
        }

        Modification::from_node(node)
    }
}

impl<Root, Leaf> fmt::Display for FieldPath<Root, Leaf> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            write!(f, "this")
        } else {
            write!(f, "{}", self.wire_name())
        }
    }
}

/// Render steps to the dotted wire form.
pub(crate) fn render_steps(steps: &[PathStep]) -> String {
    let mut out = String::new();
    for step in steps {
        match step {
            PathStep::Field { name, .. } => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            PathStep::NotNull => out.push('?'),
            PathStep::ListElements | PathStep::SetElements => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push('*');
            }
        }
    }
    out
}

/// Walk `steps` into `value`, cloning the leaf out.
pub(crate) fn get_in(steps: &[PathStep], value: &Value) -> Result<Option<Value>, Error> {
    let Some((step, rest)) = steps.split_first() else {
        return Ok(Some(value.clone()));
    };

    match step {
        PathStep::Field { name, index, .. } => {
            let Value::Record(fields) = value else {
                return Err(Error::incompatible("Record", value.variant_name(), name));
            };
            let slot = fields.get(*index).ok_or_else(|| {
                Error::incompatible(format!("field `{name}`"), "missing field", name)
            })?;
            get_in(rest, &slot.1).map_err(|e| e.with_segment(name))
        }
        PathStep::NotNull => {
            if value.is_null() {
                Ok(None)
            } else {
                get_in(rest, value)
            }
        }
        PathStep::ListElements | PathStep::SetElements => {
            let items = match value {
                Value::List(items) | Value::Set(items) => items,
                other => {
                    return Err(Error::incompatible(
                        "List or Set",
                        other.variant_name(),
                        "*",
                    ));
                }
            };
            match items.first() {
                Some(first) => get_in(rest, first),
                None => Ok(None),
            }
        }
    }
}

/// Walk `steps` into `value`, writing `leaf` at the end.
pub(crate) fn set_in(steps: &[PathStep], value: &Value, leaf: Value) -> Result<Value, Error> {
    let Some((step, rest)) = steps.split_first() else {
        return Ok(leaf);
    };

    match step {
        PathStep::Field { name, index, .. } => {
            let Value::Record(fields) = value else {
                return Err(Error::incompatible("Record", value.variant_name(), name));
            };
            let slot = fields.get(*index).ok_or_else(|| {
                Error::incompatible(format!("field `{name}`"), "missing field", name)
            })?;
            let updated = set_in(rest, &slot.1, leaf).map_err(|e| e.with_segment(name))?;

            let mut fields = fields.clone();
            fields[*index].1 = updated;
            Ok(Value::Record(fields))
        }
        PathStep::NotNull => {
            if value.is_null() {
                Ok(value.clone())
            } else {
                set_in(rest, value, leaf)
            }
        }
        PathStep::ListElements => {
            let Value::List(items) = value else {
                return Err(Error::incompatible("List", value.variant_name(), "*"));
            };
            if rest.is_empty() {
                return Ok(Value::List(vec![leaf]));
            }
            match items.first() {
                Some(first) => Ok(Value::List(vec![set_in(rest, first, leaf)?])),
                None => Ok(value.clone()),
            }
        }
        PathStep::SetElements => {
            let Value::Set(items) = value else {
                return Err(Error::incompatible("Set", value.variant_name(), "*"));
            };
            if rest.is_empty() {
                return Ok(Value::set_of(vec![leaf]));
            }
            match items.first() {
                Some(first) => Ok(Value::set_of(vec![set_in(rest, first, leaf)?])),
                None => Ok(value.clone()),
            }
        }
    }
}
