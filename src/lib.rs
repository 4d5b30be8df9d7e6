//! Spark config - recursive configuration tree with layered deep merge.
//!
//! This library provides:
//! - `ConfigTree`, an ordered, recursive key/value container with a
//!   per-node merge policy
//! - Deep merging of plain nested mappings
//! - TOML/JSON source loading and a directory cascade of `.spark.toml` files
//!
//! # Example
//!
//! ```
//! use spark_config::tree::{ConfigTree, Mapping, Value};
//!
//! let mut base = Mapping::new();
//! let mut router = Mapping::new();
//! router.insert("default_page".into(), Value::from("home"));
//! router.insert("default_action".into(), Value::from("index"));
//! base.insert("router".into(), Value::from(router));
//!
//! let mut config = ConfigTree::from(base);
//!
//! let mut overlay = Mapping::new();
//! let mut router = Mapping::new();
//! router.insert("default_action".into(), Value::from("list"));
//! overlay.insert("router".into(), Value::from(router));
//! config.merge_from(overlay);
//!
//! assert_eq!(config.lookup("router.default_page").and_then(|v| v.as_str()), Some("home"));
//! assert_eq!(config.lookup("router.default_action").and_then(|v| v.as_str()), Some("list"));
//! assert_eq!(config.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod tree;

pub use error::{ConfigError, Result};
pub use tree::{ConfigTree, ConfigValue, Mapping, Scalar, Value};
