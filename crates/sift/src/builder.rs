use sift_core::{
    modification::{Modification, ModificationNode},
    traits::FieldValue,
};
use std::marker::PhantomData;

///
/// ModificationBuilder
///
/// Accumulates modifications of one record shape and emits a single
/// value: a lone operation is returned directly, anything else becomes a
/// `Chain` applied left to right.
///

pub struct ModificationBuilder<R> {
    ops: Vec<ModificationNode>,
    _marker: PhantomData<fn(&R) -> R>,
}

impl<R: FieldValue> ModificationBuilder<R> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ops: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Append one accumulated operation.
    #[must_use]
    pub fn then(mut self, modification: Modification<R>) -> Self {
        self.ops.push(modification.into_node());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[must_use]
    pub fn build(mut self) -> Modification<R> {
        match self.ops.len() {
            0 => Modification::nothing(),
            1 => Modification::from_node(self.ops.remove(0)),
            _ => Modification::from_node(ModificationNode::Chain(self.ops)),
        }
    }
}

impl<R: FieldValue> Default for ModificationBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}
