use crate::config::parser::parse_source_file;
use crate::config::types::{
	CONFIG_FILE_NAME, LoadedSource, MergedConfig, NO_USER_CONFIG_ENV_VAR,
};
use crate::error::{ConfigError, Result};
use crate::tree::ConfigTree;
use std::path::{Path, PathBuf};

/// Discover and load all config layers in the cascade.
///
/// The cascade order is:
/// 1. Start from `start_dir` and look for `.spark.toml`
/// 2. If found and it carries `root = true`, stop walking up
/// 3. Otherwise, continue up the directory tree
/// 4. Finally, check ~/.spark.toml (unless disabled)
///
/// Returns layers in cascade order (most specific first).
pub fn discover_sources(start_dir: &Path) -> Result<Vec<LoadedSource>> {
	let user_path = if is_env_truthy(NO_USER_CONFIG_ENV_VAR) {
		tracing::debug!("user config disabled by {}", NO_USER_CONFIG_ENV_VAR);
		None
	} else {
		Some(user_config_path()?)
	};

	discover_sources_with_user(start_dir, user_path.as_deref())
}

/// Walk the cascade from `start_dir`, then add the layer at `user_path`
/// when one is given and exists.
pub fn discover_sources_with_user(
	start_dir: &Path,
	user_path: Option<&Path>,
) -> Result<Vec<LoadedSource>> {
	let mut sources = Vec::new();
	let mut current_dir = start_dir.to_path_buf();

	loop {
		let config_path = current_dir.join(CONFIG_FILE_NAME);

		if config_path.is_file() {
			let loaded = load_layer(&config_path)?;
			let stop = loaded.root;
			sources.push(loaded);

			if stop {
				tracing::debug!(path = %config_path.display(), "root layer reached");
				break;
			}
		}

		match current_dir.parent() {
			Some(parent) => current_dir = parent.to_path_buf(),
			None => break,
		}
	}

	if let Some(user_path) = user_path {
		// A project living directly in $HOME already picked this file up
		let seen = sources.iter().any(|s| s.path.as_path() == user_path);
		if !seen && user_path.is_file() {
			sources.push(load_layer(user_path)?);
		}
	}

	Ok(sources)
}

/// Load a file named explicitly by the caller. No cascade marker applies.
pub fn load_source(path: &Path) -> Result<LoadedSource> {
	let mapping = parse_source_file(path)?;
	tracing::debug!(path = %path.display(), keys = mapping.len(), "loaded config file");
	Ok(LoadedSource::explicit(mapping, path.to_path_buf()))
}

/// Load a cascade layer, consuming its `root` marker.
fn load_layer(path: &Path) -> Result<LoadedSource> {
	let mapping = parse_source_file(path)?;
	tracing::debug!(path = %path.display(), keys = mapping.len(), "loaded config layer");
	Ok(LoadedSource::new(mapping, path.to_path_buf()))
}

/// Check if an environment variable is set to a truthy value.
fn is_env_truthy(var_name: &str) -> bool {
	match std::env::var(var_name) {
		Ok(value) => {
			let lower = value.to_lowercase();
			!value.is_empty() && lower != "0" && lower != "false" && lower != "no"
		}
		Err(_) => false,
	}
}

/// Merge layers into a single effective config.
///
/// `sources` is expected most specific first, as returned by
/// [`discover_sources`]; layers are applied in reverse so the closest
/// layer wins.
pub fn merge_sources(sources: &[LoadedSource]) -> MergedConfig {
	let mut merged = MergedConfig::default();

	for loaded in sources.iter().rev() {
		merged.tree.merge_from(loaded.mapping.clone());
		merged.sources.push(loaded.path.clone());
	}

	merged
}

/// Load explicit files and merge them in the given order (later wins).
pub fn load_files(paths: &[PathBuf]) -> Result<MergedConfig> {
	let mut merged = MergedConfig {
		tree: ConfigTree::new(),
		sources: Vec::with_capacity(paths.len()),
	};

	for path in paths {
		let loaded = load_source(path)?;
		merged.tree.merge_from(loaded.mapping);
		merged.sources.push(loaded.path);
	}

	Ok(merged)
}

/// Convenience function to discover, load, and merge layers from a directory.
pub fn load_merged_config(start_dir: &Path) -> Result<MergedConfig> {
	let sources = discover_sources(start_dir)?;
	Ok(merge_sources(&sources))
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(ConfigError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(CONFIG_FILE_NAME))
}
