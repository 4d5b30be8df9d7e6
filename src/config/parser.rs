use crate::error::{ConfigError, Result};
use crate::tree::{Mapping, Value};
use serde::Serialize;
use std::path::Path;

/// Document formats a source file can be read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
	Toml,
	Json,
}

impl SourceFormat {
	/// Pick the format from the file extension.
	pub fn from_path(path: &Path) -> Result<Self> {
		let ext = path
			.extension()
			.and_then(|e| e.to_str())
			.map(str::to_ascii_lowercase);

		match ext.as_deref() {
			Some("toml") => Ok(SourceFormat::Toml),
			Some("json") => Ok(SourceFormat::Json),
			_ => Err(ConfigError::UnsupportedFormat {
				path: path.to_path_buf(),
			}),
		}
	}
}

/// Parse a source file from the given path into a plain mapping.
pub fn parse_source_file(path: &Path) -> Result<Mapping> {
	let format = SourceFormat::from_path(path)?;

	if !path.exists() {
		return Err(ConfigError::ConfigNotFound {
			path: path.to_path_buf(),
		});
	}

	let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigReadError {
		path: path.to_path_buf(),
		source,
	})?;

	match format {
		SourceFormat::Toml => parse_toml_str(&content, path),
		SourceFormat::Json => parse_json_str(&content, path),
	}
}

/// Parse a TOML document (useful for testing).
pub fn parse_toml_str(content: &str, path: &Path) -> Result<Mapping> {
	let table: toml::Table =
		toml::from_str(content).map_err(|source| ConfigError::TomlParseError {
			path: path.to_path_buf(),
			source,
		})?;

	Value::from(toml::Value::Table(table)).into_mapping(&path.display().to_string())
}

/// Parse a JSON document. The top level must be an object.
pub fn parse_json_str(content: &str, path: &Path) -> Result<Mapping> {
	let document: serde_json::Value =
		serde_json::from_str(content).map_err(|source| ConfigError::JsonParseError {
			path: path.to_path_buf(),
			source,
		})?;

	if !document.is_object() {
		return Err(ConfigError::InvalidArgument {
			context: path.display().to_string(),
			found: json_type_name(&document),
		});
	}

	Value::from(document).into_mapping(&path.display().to_string())
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
	match value {
		serde_json::Value::Null => "null",
		serde_json::Value::Bool(_) => "boolean",
		serde_json::Value::Number(_) => "number",
		serde_json::Value::String(_) => "text",
		serde_json::Value::Array(_) => "array",
		serde_json::Value::Object(_) => "mapping",
	}
}

/// Render any serializable config as pretty JSON.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
	serde_json::to_string_pretty(value).map_err(|source| ConfigError::JsonSerializeError { source })
}

/// Render any serializable config as TOML. Fails on null leaves.
pub fn to_toml_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
	toml::to_string(value).map_err(|source| ConfigError::TomlSerializeError { source })
}
