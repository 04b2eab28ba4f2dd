mod ast;
mod eval;
pub(crate) mod text;

#[cfg(test)]
mod tests;

use crate::{error::Error, traits::FieldValue};

// re-exports
pub use ast::{Condition, ConditionNode, GEO_DISTANCE_UNLIMITED_KM};
pub use eval::eval;

impl<T: FieldValue> Condition<T> {
    /// Evaluate against an in-memory record.
    ///
    /// Deterministic, side-effect-free, total on well-formed records.
    pub fn apply(&self, on: &T) -> Result<bool, Error> {
        eval(self.node(), &on.to_value(), &T::field_type())
    }
}
