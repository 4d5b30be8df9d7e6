//! The recursive configuration tree.
//!
//! This module handles:
//! - Plain values and mappings (`value`)
//! - Deep merging of plain mappings (`merge`)
//! - The `ConfigTree` container itself (`node`)

pub mod merge;
pub mod node;
pub mod value;

pub use merge::{deep_merge, merge_layers, merge_value};
pub use node::{ConfigTree, ConfigValue, Iter};
pub use value::{Mapping, Scalar, Value};
