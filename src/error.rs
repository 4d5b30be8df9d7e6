use std::path::PathBuf;

/// Library-level structured errors for spark-config.
///
/// Lookups never produce errors; these cover loading sources from disk and
/// values handed across the API boundary with the wrong shape.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Config file not found: {path}")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse TOML config file: {path}")]
	TomlParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to parse JSON config file: {path}")]
	JsonParseError {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("Unsupported config file format: {path} (expected .toml or .json)")]
	UnsupportedFormat { path: PathBuf },

	#[error("Invalid argument for {context}: expected a mapping, found {found}")]
	InvalidArgument { context: String, found: &'static str },

	#[error("Failed to serialize config as TOML")]
	TomlSerializeError {
		#[source]
		source: toml::ser::Error,
	},

	#[error("Failed to serialize config as JSON")]
	JsonSerializeError {
		#[source]
		source: serde_json::Error,
	},

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;
