//! Core of the sift query and update algebra: dynamic values, record
//! models, reflection traits, field paths, the Condition and Modification
//! sum types, the canonical codec, and the serializer registry.
//!
//! This crate is a pure value layer. Nothing here performs I/O, suspends,
//! or mutates its inputs; the registry is the only shared mutable state.

pub mod codec;
pub mod condition;
pub mod error;
pub mod model;
pub mod modification;
pub mod path;
pub mod registry;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Domain vocabulary only; helpers and codec internals stay one level
/// down.
///

pub mod prelude {
    pub use crate::{
        condition::{Condition, ConditionNode},
        error::Error,
        model::{FieldType, RecordKind, RecordModel},
        modification::{Modification, ModificationNode},
        path::{FieldPath, Property},
        registry::Registry,
        traits::{FieldValue, Record},
        value::Value,
    };
}
