//! User-facing surface of the sift query and update algebra: the fluent
//! path expression traits, the modification builder, and a prelude over
//! the core types.
//!
//! The core lives in `sift-core`; this crate adds construction ergonomics
//! and re-exports everything a typical caller needs.

mod builder;
mod expr;


pub use builder::ModificationBuilder;
pub use expr::{
    FullTextPathExpr, GeoPathExpr, ListPathExpr, MapPathExpr, NumericPathExpr, NumericValue,
    PathExpr, RawStringPathExpr, SetPathExpr, StringPathExpr,
};

// re-export the core wholesale; callers should not need both crates.
pub use sift_core::{codec, condition, error, model, modification, path, registry, traits, value};

///
/// Prelude
///

pub mod prelude {
    pub use crate::builder::ModificationBuilder;
    pub use crate::expr::{
        FullTextPathExpr, GeoPathExpr, ListPathExpr, MapPathExpr, NumericPathExpr, PathExpr,
        RawStringPathExpr, SetPathExpr, StringPathExpr,
    };
    pub use sift_core::prelude::*;
}
