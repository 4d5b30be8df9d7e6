use crate::tree::merge::deep_merge;
use crate::tree::value::{Mapping, Scalar, Value};
use indexmap::IndexMap;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// A value stored inside a [`ConfigTree`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
	Scalar(Scalar),
	Subtree(ConfigTree),
}

impl ConfigValue {
	pub fn as_scalar(&self) -> Option<&Scalar> {
		match self {
			ConfigValue::Scalar(s) => Some(s),
			ConfigValue::Subtree(_) => None,
		}
	}

	pub fn as_tree(&self) -> Option<&ConfigTree> {
		match self {
			ConfigValue::Subtree(t) => Some(t),
			ConfigValue::Scalar(_) => None,
		}
	}

	pub fn as_tree_mut(&mut self) -> Option<&mut ConfigTree> {
		match self {
			ConfigValue::Subtree(t) => Some(t),
			ConfigValue::Scalar(_) => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		self.as_scalar().and_then(Scalar::as_str)
	}

	pub fn as_i64(&self) -> Option<i64> {
		self.as_scalar().and_then(Scalar::as_i64)
	}

	pub fn as_f64(&self) -> Option<f64> {
		self.as_scalar().and_then(Scalar::as_f64)
	}

	pub fn as_bool(&self) -> Option<bool> {
		self.as_scalar().and_then(Scalar::as_bool)
	}

	/// Detach into a plain value, copying every nested level.
	pub fn to_value(&self) -> Value {
		match self {
			ConfigValue::Scalar(s) => Value::Scalar(s.clone()),
			ConfigValue::Subtree(t) => Value::Map(t.to_mapping()),
		}
	}
}

impl From<Scalar> for ConfigValue {
	fn from(s: Scalar) -> Self {
		ConfigValue::Scalar(s)
	}
}

/// Recursive, insertion-ordered configuration container.
///
/// Every nested mapping handed to the tree is stored as an owned subtree, so
/// each level supports the same get/set/merge/iterate operations. Each node
/// carries its own merge policy, which only affects direct [`set`] calls
/// where the caller passes `Some(false)`:
///
/// | `merge` | node policy | key exists | result    |
/// |---------|-------------|------------|-----------|
/// | `None`  | any         | yes        | overwrite |
/// | `true`  | any         | yes        | overwrite |
/// | `false` | `true`      | yes        | overwrite |
/// | `false` | `false`     | yes        | kept      |
/// | any     | any         | no         | insert    |
///
/// [`set`]: ConfigTree::set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
	entries: IndexMap<String, ConfigValue>,
	merge_by_default: bool,
}

impl ConfigTree {
	/// Create an empty tree with the merge policy off.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a tree populated from `initial`.
	///
	/// `merge` is forwarded to every [`set`](ConfigTree::set) call, including
	/// the ones that build nested subtrees. It does not set the node policy.
	pub fn from_mapping(initial: Mapping, merge: Option<bool>) -> Self {
		let mut tree = Self::new();
		tree.set_many(initial, merge);
		tree
	}

	/// Set a single entry, returning whether the value was applied.
	pub fn set(
		&mut self,
		key: impl Into<String>,
		value: impl Into<Value>,
		merge: Option<bool>,
	) -> bool {
		let key = key.into();
		let exists = self.entries.contains_key(&key);

		if exists && !self.allows_overwrite(merge) {
			tracing::trace!(key = %key, "keeping existing config value");
			return false;
		}

		let stored = match value.into() {
			Value::Scalar(s) => ConfigValue::Scalar(s),
			Value::Map(m) => ConfigValue::Subtree(ConfigTree::from_mapping(m, merge)),
		};

		// IndexMap::insert keeps the original position of an existing key
		self.entries.insert(key, stored);
		true
	}

	/// Set every entry of `mapping`, in its iteration order.
	pub fn set_many(&mut self, mapping: impl Into<Mapping>, merge: Option<bool>) {
		for (key, value) in mapping.into() {
			self.set(key, value, merge);
		}
	}

	/// Chaining form of [`set_many`](ConfigTree::set_many).
	pub fn append(&mut self, source: impl Into<Mapping>, merge: Option<bool>) -> &mut Self {
		self.set_many(source, merge);
		self
	}

	pub fn get(&self, key: &str) -> Option<&ConfigValue> {
		self.entries.get(key)
	}

	pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
		self.entries.get_mut(key)
	}

	/// Get an entry, falling back to `default` for unknown keys.
	pub fn get_or<'a>(&'a self, key: &str, default: &'a ConfigValue) -> &'a ConfigValue {
		self.entries.get(key).unwrap_or(default)
	}

	pub fn has(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	/// Look up a dotted path such as `"database.primary.host"`.
	///
	/// Each segment but the last must name a subtree.
	pub fn lookup(&self, path: &str) -> Option<&ConfigValue> {
		let mut segments = path.split('.');
		let first = segments.next()?;
		let mut current = self.get(first)?;
		for segment in segments {
			current = current.as_tree()?.get(segment)?;
		}
		Some(current)
	}

	/// Deep merge `source` into this tree.
	///
	/// The tree is flattened, merged as plain data, then rebuilt with
	/// overwrite forced, so per-node policies never block a merge. Rebuilt
	/// subtrees come back with the policy off; this node keeps its own.
	pub fn merge_from(&mut self, source: impl Into<Mapping>) {
		let incoming = source.into();
		tracing::debug!(
			existing = self.entries.len(),
			incoming = incoming.len(),
			"merging config"
		);
		let merged = deep_merge(self.to_mapping(), incoming);
		self.set_many(merged, Some(true));
	}

	/// Flatten into a plain nested mapping that shares nothing with the tree.
	pub fn to_mapping(&self) -> Mapping {
		self.entries
			.iter()
			.map(|(k, v)| (k.clone(), v.to_value()))
			.collect()
	}

	/// Set the merge policy for this node only. Existing subtrees keep theirs.
	pub fn set_merge_policy(&mut self, on: bool) {
		self.merge_by_default = on;
	}

	pub fn merge_policy(&self) -> bool {
		self.merge_by_default
	}

	/// Number of top-level keys.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// Iterate over top-level entries in insertion order.
	pub fn iter(&self) -> Iter<'_> {
		Iter {
			inner: self.entries.iter(),
		}
	}

	fn allows_overwrite(&self, merge: Option<bool>) -> bool {
		match merge {
			None | Some(true) => true,
			Some(false) => self.merge_by_default,
		}
	}
}

/// Iterator over the entries of a [`ConfigTree`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
	inner: indexmap::map::Iter<'a, String, ConfigValue>,
}

impl<'a> Iterator for Iter<'a> {
	type Item = (&'a str, &'a ConfigValue);

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|(k, v)| (k.as_str(), v))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.inner.size_hint()
	}
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a ConfigTree {
	type Item = (&'a str, &'a ConfigValue);
	type IntoIter = Iter<'a>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl From<Mapping> for ConfigTree {
	fn from(mapping: Mapping) -> Self {
		ConfigTree::from_mapping(mapping, None)
	}
}

impl From<&ConfigTree> for ConfigTree {
	/// Copy another tree value by value. Subtrees are rebuilt, never shared.
	fn from(source: &ConfigTree) -> Self {
		ConfigTree::from_mapping(source.to_mapping(), None)
	}
}

impl From<&ConfigTree> for Mapping {
	fn from(tree: &ConfigTree) -> Self {
		tree.to_mapping()
	}
}

impl From<ConfigTree> for Mapping {
	fn from(tree: ConfigTree) -> Self {
		tree.to_mapping()
	}
}

impl From<&ConfigTree> for Value {
	fn from(tree: &ConfigTree) -> Self {
		Value::Map(tree.to_mapping())
	}
}

impl From<ConfigTree> for Value {
	fn from(tree: ConfigTree) -> Self {
		Value::Map(tree.to_mapping())
	}
}

impl Serialize for ConfigTree {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.entries.len()))?;
		for (key, value) in &self.entries {
			map.serialize_entry(key, value)?;
		}
		map.end()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn map(v: serde_json::Value) -> Mapping {
		Value::from(v).into_mapping("test").unwrap()
	}

	fn keys_of(mapping: &Mapping) -> Vec<&str> {
		mapping.keys().map(String::as_str).collect()
	}

	#[test]
	fn test_count_is_top_level_only() {
		let tree = ConfigTree::from(map(json!({"a": 1, "b": {"c": 2, "d": 3}})));
		assert_eq!(tree.len(), 2);
		assert_eq!(tree.get("b").unwrap().as_tree().unwrap().len(), 2);
	}

	#[test]
	fn test_unknown_key_default() {
		let tree = ConfigTree::new();
		let fallback = ConfigValue::Scalar(Scalar::Text("fallback".into()));
		assert_eq!(tree.get_or("missing", &fallback).as_str(), Some("fallback"));
		assert!(tree.get("missing").is_none());
		assert!(!tree.has("missing"));
	}

	#[test]
	fn test_no_merge_policy_on_direct_set() {
		let mut tree = ConfigTree::from_mapping(Mapping::new(), Some(false));
		assert!(tree.set("k", 1i64, None));
		assert!(!tree.set("k", 2i64, Some(false)));
		assert_eq!(tree.get("k").unwrap().as_i64(), Some(1));
		assert!(tree.set("k", 3i64, Some(true)));
		assert_eq!(tree.get("k").unwrap().as_i64(), Some(3));
	}

	#[test]
	fn test_node_policy_allows_overwrite() {
		let mut tree = ConfigTree::new();
		tree.set_merge_policy(true);
		tree.set("k", "old", None);
		assert!(tree.set("k", "new", Some(false)));
		assert_eq!(tree.get("k").unwrap().as_str(), Some("new"));
	}

	#[test]
	fn test_unspecified_merge_overwrites() {
		let mut tree = ConfigTree::new();
		tree.set("k", "old", None);
		assert!(tree.set("k", "new", None));
		assert_eq!(tree.get("k").unwrap().as_str(), Some("new"));
		assert_eq!(tree.len(), 1);
	}

	#[test]
	fn test_insert_ignores_merge_flag() {
		let mut tree = ConfigTree::new();
		assert!(tree.set("fresh", true, Some(false)));
		assert_eq!(tree.get("fresh").unwrap().as_bool(), Some(true));
	}

	#[test]
	fn test_nested_mapping_becomes_subtree() {
		let mut tree = ConfigTree::new();
		tree.set("db", map(json!({"host": "localhost", "port": 5432})), None);
		let db = tree.get("db").unwrap().as_tree().unwrap();
		assert_eq!(db.get("host").unwrap().as_str(), Some("localhost"));
		assert_eq!(db.get("port").unwrap().as_i64(), Some(5432));
	}

	#[test]
	fn test_new_subtree_policy_is_off() {
		let mut tree = ConfigTree::new();
		tree.set("db", map(json!({"host": "a"})), None);
		tree.get_mut("db")
			.and_then(ConfigValue::as_tree_mut)
			.unwrap()
			.set("host", "b", Some(false));
		// the subtree policy is off, so the explicit no-merge set is dropped
		let db = tree.get("db").unwrap().as_tree().unwrap();
		assert_eq!(db.get("host").unwrap().as_str(), Some("a"));
	}

	#[test]
	fn test_set_merge_policy_does_not_cascade() {
		let mut tree = ConfigTree::from(map(json!({"inner": {"k": 1}})));
		tree.set_merge_policy(true);
		assert!(tree.merge_policy());
		assert!(!tree.get("inner").unwrap().as_tree().unwrap().merge_policy());
	}

	#[test]
	fn test_round_trip_preserves_order() {
		let source = map(json!({"z": 1, "a": {"y": true, "b": null}, "m": "text"}));
		let flattened = ConfigTree::from(source.clone()).to_mapping();
		assert_eq!(flattened, source);
		assert_eq!(keys_of(&flattened), vec!["z", "a", "m"]);
		assert_eq!(
			keys_of(flattened["a"].as_mapping().unwrap()),
			vec!["y", "b"]
		);
	}

	#[test]
	fn test_to_mapping_is_detached() {
		let tree = ConfigTree::from(map(json!({"a": {"x": 1}})));
		let mut flat = tree.to_mapping();
		flat.insert("b".into(), Value::from(2i64));
		assert_eq!(tree.len(), 1);
	}

	#[test]
	fn test_merge_from_deep() {
		let mut tree = ConfigTree::from(map(json!({"a": {"x": 1, "y": 2}, "b": 3})));
		tree.merge_from(map(json!({"a": {"y": 5}})));
		assert_eq!(tree.to_mapping(), map(json!({"a": {"x": 1, "y": 5}, "b": 3})));
	}

	#[test]
	fn test_merge_from_scalar_replaces_subtree() {
		let mut tree = ConfigTree::from(map(json!({"a": {"x": 1}})));
		tree.merge_from(map(json!({"a": 7})));
		assert_eq!(tree.to_mapping(), map(json!({"a": 7})));
	}

	#[test]
	fn test_merge_from_is_idempotent() {
		let mut once = ConfigTree::from(map(json!({"a": {"x": 1}, "b": 2})));
		let incoming = map(json!({"a": {"z": 3}, "c": {"d": "e"}}));
		once.merge_from(incoming.clone());
		let mut twice = ConfigTree::from(&once);
		twice.merge_from(incoming);
		assert_eq!(once.to_mapping(), twice.to_mapping());
	}

	#[test]
	fn test_merge_from_ignores_node_policy() {
		let mut tree = ConfigTree::from_mapping(map(json!({"k": 1})), Some(false));
		tree.merge_from(map(json!({"k": 2})));
		assert_eq!(tree.get("k").unwrap().as_i64(), Some(2));
	}

	#[test]
	fn test_merge_from_keeps_node_policy() {
		let mut tree = ConfigTree::new();
		tree.set_merge_policy(true);
		tree.merge_from(map(json!({"k": 1})));
		assert!(tree.merge_policy());
	}

	#[test]
	fn test_merge_from_other_tree() {
		let mut base = ConfigTree::from(map(json!({"page": "home", "action": "index"})));
		let other = ConfigTree::from(map(json!({"action": "list"})));
		base.merge_from(&other);
		assert_eq!(base.get("page").unwrap().as_str(), Some("home"));
		assert_eq!(base.get("action").unwrap().as_str(), Some("list"));
	}

	#[test]
	fn test_copy_from_tree_does_not_alias() {
		let original = ConfigTree::from(map(json!({"a": {"x": 1}})));
		let mut copy = ConfigTree::from(&original);
		copy.get_mut("a")
			.and_then(ConfigValue::as_tree_mut)
			.unwrap()
			.set("x", 2i64, None);
		assert_eq!(original.lookup("a.x").unwrap().as_i64(), Some(1));
		assert_eq!(copy.lookup("a.x").unwrap().as_i64(), Some(2));
	}

	#[test]
	fn test_set_tree_as_value() {
		let inner = ConfigTree::from(map(json!({"x": 1})));
		let mut outer = ConfigTree::new();
		outer.set("inner", &inner, None);
		assert_eq!(outer.lookup("inner.x").unwrap().as_i64(), Some(1));
	}

	#[test]
	fn test_append_chains() {
		let mut tree = ConfigTree::new();
		tree.append(map(json!({"a": 1})), None)
			.append(map(json!({"b": 2})), None);
		assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["a", "b"]);
	}

	#[test]
	fn test_lookup_paths() {
		let tree = ConfigTree::from(map(json!({"db": {"primary": {"host": "h"}}, "flat": 1})));
		assert_eq!(tree.lookup("db.primary.host").unwrap().as_str(), Some("h"));
		assert!(tree.lookup("db.primary.port").is_none());
		assert!(tree.lookup("flat.deeper").is_none());
		assert!(tree.lookup("db").unwrap().as_tree().is_some());
	}

	#[test]
	fn test_iteration_is_ordered_and_restartable() {
		let tree = ConfigTree::from(map(json!({"b": 1, "a": 2, "c": 3})));
		let first: Vec<_> = tree.iter().map(|(k, _)| k).collect();
		let second: Vec<_> = (&tree).into_iter().map(|(k, _)| k).collect();
		assert_eq!(first, vec!["b", "a", "c"]);
		assert_eq!(first, second);
		assert_eq!(tree.iter().len(), 3);
	}

	#[test]
	fn test_overwrite_keeps_position() {
		let mut tree = ConfigTree::from(map(json!({"a": 1, "b": 2})));
		tree.set("a", 10i64, None);
		assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["a", "b"]);
	}

	#[test]
	fn test_tree_is_send_and_sync() {
		fn assert_send_sync<T: Send + Sync>() {}
		assert_send_sync::<ConfigTree>();
	}

	#[test]
	fn test_serialize_tree() {
		let tree = ConfigTree::from(map(json!({"a": {"b": 1}, "c": "d"})));
		let out = serde_json::to_string(&tree).unwrap();
		assert_eq!(out, r#"{"a":{"b":1},"c":"d"}"#);
	}
}
