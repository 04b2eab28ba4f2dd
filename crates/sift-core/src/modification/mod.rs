mod analyze;
mod apply;
mod ast;
mod simplify;


use crate::{
    condition::Condition,
    error::Error,
    path::FieldPath,
    traits::FieldValue,
};

// re-exports
pub use analyze::{affects, guaranteed_after};
pub use apply::apply;
pub use ast::{Modification, ModificationNode};
pub use simplify::simplify;

impl<T: FieldValue> Modification<T> {
    /// Apply to an in-memory record, producing a new record.
    pub fn apply(&self, on: &T) -> Result<T, Error> {
        let updated = apply(self.node(), &on.to_value(), &T::field_type())?;
        T::from_value(&updated)
    }

    /// Semantics-preserving normal form; see [`simplify`].
    #[must_use]
    pub fn simplify(&self) -> Self {
        Self::from_node(simplify(self.node(), &T::field_type()))
    }

    /// Whether this modification potentially writes under `path`.
    #[must_use]
    pub fn affects<L: FieldValue>(&self, path: &FieldPath<T, L>) -> bool {
        affects(self.node(), path.steps())
    }

    /// Whether `condition` is guaranteed to hold after applying this
    /// modification, regardless of the input record.
    #[must_use]
    pub fn guaranteed_after(&self, condition: &Condition<T>) -> bool {
        guaranteed_after(self.node(), condition.node(), &T::field_type())
    }
}
