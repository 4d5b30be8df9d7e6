use crate::tree::{ConfigTree, Mapping, Scalar, Value};
use std::path::PathBuf;

/// Name of the per-directory config file picked up by the cascade.
pub const CONFIG_FILE_NAME: &str = ".spark.toml";

/// Top-level key that stops the cascade from walking further up.
pub const ROOT_MARKER_KEY: &str = "root";

/// Environment variable that, if truthy, skips the user layer.
pub const NO_USER_CONFIG_ENV_VAR: &str = "SPARK_NO_USER_CONFIG";

/// A parsed config layer with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedSource {
	/// The layer's data as a plain mapping.
	pub mapping: Mapping,

	/// The path this layer was loaded from.
	pub path: PathBuf,

	/// Whether this layer carried `root = true`.
	pub root: bool,
}

/// Merged configuration from multiple layers.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
	/// The effective configuration.
	pub tree: ConfigTree,

	/// Layer paths in the order they were merged (lowest precedence first).
	pub sources: Vec<PathBuf>,
}

impl LoadedSource {
	/// Wrap a file named explicitly by the caller. Its data is kept as is.
	pub fn explicit(mapping: Mapping, path: PathBuf) -> Self {
		Self {
			mapping,
			path,
			root: false,
		}
	}

	/// Wrap a cascade layer, stripping a boolean cascade marker out of the data.
	pub fn new(mut mapping: Mapping, path: PathBuf) -> Self {
		let marker = mapping
			.get(ROOT_MARKER_KEY)
			.and_then(Value::as_scalar)
			.and_then(Scalar::as_bool);

		let root = match marker {
			Some(flag) => {
				mapping.shift_remove(ROOT_MARKER_KEY);
				flag
			}
			None => false,
		};

		Self { mapping, path, root }
	}
}
