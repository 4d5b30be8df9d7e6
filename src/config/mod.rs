//! Loading config layers from disk.
//!
//! This module handles:
//! - TOML and JSON source files, adapted into plain mappings
//! - Directory cascade discovery
//! - Layer merging into a `ConfigTree`

pub mod cascade;
pub mod parser;
pub mod types;

pub use cascade::{
	discover_sources, discover_sources_with_user, load_files, load_merged_config, load_source,
	merge_sources, user_config_path,
};
pub use parser::{
	SourceFormat, parse_json_str, parse_source_file, parse_toml_str, to_json_string, to_toml_string,
};
pub use types::{LoadedSource, MergedConfig};
