//! Deep merge over plain mappings.
//!
//! Merge semantics:
//! - Mappings: merge by key, recursively
//! - Anything else: incoming replaces base at that level
//! - Keys only present in the base are kept where they are

use crate::tree::value::{Mapping, Value};

/// Deep merge `incoming` into `base`.
///
/// New keys are appended in the order `incoming` lists them; existing keys
/// keep their position in `base`.
pub fn deep_merge(mut base: Mapping, incoming: Mapping) -> Mapping {
	for (key, incoming_value) in incoming {
		match base.get_mut(&key) {
			Some(slot) => {
				let current = std::mem::take(slot);
				*slot = merge_value(current, incoming_value);
			}
			None => {
				base.insert(key, incoming_value);
			}
		}
	}
	base
}

/// Deep merge two values. A non-mapping incoming value always wins.
pub fn merge_value(base: Value, incoming: Value) -> Value {
	match (base, incoming) {
		(Value::Map(base), Value::Map(incoming)) => Value::Map(deep_merge(base, incoming)),
		(_, incoming) => incoming,
	}
}

/// Merge layers in order (first is the base, last has highest precedence).
pub fn merge_layers(layers: impl IntoIterator<Item = Mapping>) -> Mapping {
	layers.into_iter().fold(Mapping::new(), deep_merge)
}
