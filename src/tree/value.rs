use crate::error::{ConfigError, Result};
use indexmap::IndexMap;
use serde::Serialize;

/// Plain, detached nested mapping. Key order is insertion order.
pub type Mapping = IndexMap<String, Value>;

/// A leaf value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
	Null,
	Bool(bool),
	Integer(i64),
	Float(f64),
	Text(String),
}

/// A plain configuration value: either a leaf or a nested mapping.
///
/// This is the shape sources are handed in as and the shape
/// [`ConfigTree::to_mapping`](crate::tree::ConfigTree::to_mapping) hands back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
	Scalar(Scalar),
	Map(Mapping),
}

impl Scalar {
	pub fn type_name(&self) -> &'static str {
		match self {
			Scalar::Null => "null",
			Scalar::Bool(_) => "boolean",
			Scalar::Integer(_) => "integer",
			Scalar::Float(_) => "float",
			Scalar::Text(_) => "text",
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Scalar::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Scalar::Integer(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Scalar::Float(f) => Some(*f),
			Scalar::Integer(i) => Some(*i as f64),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Scalar::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Scalar::Null)
	}
}

impl std::fmt::Display for Scalar {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Scalar::Null => f.write_str("null"),
			Scalar::Bool(b) => write!(f, "{b}"),
			Scalar::Integer(i) => write!(f, "{i}"),
			Scalar::Float(x) => write!(f, "{x}"),
			Scalar::Text(s) => f.write_str(s),
		}
	}
}

impl Value {
	pub fn null() -> Self {
		Value::Scalar(Scalar::Null)
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Scalar(s) => s.type_name(),
			Value::Map(_) => "mapping",
		}
	}

	pub fn as_mapping(&self) -> Option<&Mapping> {
		match self {
			Value::Map(m) => Some(m),
			Value::Scalar(_) => None,
		}
	}

	pub fn as_scalar(&self) -> Option<&Scalar> {
		match self {
			Value::Scalar(s) => Some(s),
			Value::Map(_) => None,
		}
	}

	/// Unwrap a mapping, failing fast when a scalar is handed in where a
	/// mapping is required.
	pub fn into_mapping(self, context: &str) -> Result<Mapping> {
		match self {
			Value::Map(m) => Ok(m),
			Value::Scalar(s) => Err(ConfigError::InvalidArgument {
				context: context.to_string(),
				found: s.type_name(),
			}),
		}
	}
}

impl Default for Value {
	fn default() -> Self {
		Value::null()
	}
}

impl From<Scalar> for Value {
	fn from(s: Scalar) -> Self {
		Value::Scalar(s)
	}
}

impl From<Mapping> for Value {
	fn from(m: Mapping) -> Self {
		Value::Map(m)
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Scalar(Scalar::Bool(b))
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Scalar(Scalar::Integer(i))
	}
}

impl From<i32> for Value {
	fn from(i: i32) -> Self {
		Value::Scalar(Scalar::Integer(i64::from(i)))
	}
}

impl From<f64> for Value {
	fn from(x: f64) -> Self {
		Value::Scalar(Scalar::Float(x))
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::Scalar(Scalar::Text(s.to_string()))
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::Scalar(Scalar::Text(s))
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map_or_else(Value::null, Into::into)
	}
}

/// Arrays become mappings keyed by their decimal index.
fn array_to_mapping<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Mapping {
	items
		.into_iter()
		.enumerate()
		.map(|(i, item)| (i.to_string(), item.into()))
		.collect()
}

impl From<toml::Value> for Value {
	fn from(v: toml::Value) -> Self {
		match v {
			toml::Value::String(s) => Value::from(s),
			toml::Value::Integer(i) => Value::from(i),
			toml::Value::Float(x) => Value::from(x),
			toml::Value::Boolean(b) => Value::from(b),
			toml::Value::Datetime(dt) => Value::from(dt.to_string()),
			toml::Value::Array(items) => Value::Map(array_to_mapping(items)),
			toml::Value::Table(table) => Value::Map(
				table
					.into_iter()
					.map(|(k, v)| (k, Value::from(v)))
					.collect(),
			),
		}
	}
}

impl From<serde_json::Value> for Value {
	fn from(v: serde_json::Value) -> Self {
		match v {
			serde_json::Value::Null => Value::null(),
			serde_json::Value::Bool(b) => Value::from(b),
			serde_json::Value::Number(n) => match n.as_i64() {
				Some(i) => Value::from(i),
				None => n.as_f64().map_or_else(Value::null, Value::from),
			},
			serde_json::Value::String(s) => Value::from(s),
			serde_json::Value::Array(items) => Value::Map(array_to_mapping(items)),
			serde_json::Value::Object(object) => Value::Map(
				object
					.into_iter()
					.map(|(k, v)| (k, Value::from(v)))
					.collect(),
			),
		}
	}
}
