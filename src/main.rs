use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use spark_config::config::{
	LoadedSource, MergedConfig, discover_sources, load_files, load_merged_config, load_source,
	to_json_string, to_toml_string, user_config_path,
};
use spark_config::ConfigValue;

#[derive(Parser)]
#[command(name = "sparkcfg")]
#[command(
	author,
	version,
	about = "Inspect layered configuration merged into a single config tree"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Log merge and discovery details to stderr
	#[arg(short, long, global = true)]
	verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Display the merged effective configuration
	Show {
		/// Output format
		#[arg(long, value_enum, default_value_t = Format::Json)]
		format: Format,

		/// Files to merge in order (defaults to the .spark.toml cascade)
		files: Vec<PathBuf>,
	},
	/// Print a single value by dotted path, e.g. `router.default_page`
	Get {
		key: String,

		/// Value to print when the key is missing
		#[arg(long)]
		default: Option<String>,

		/// Files to merge in order (defaults to the .spark.toml cascade)
		files: Vec<PathBuf>,
	},
	/// Check all config layers for errors without printing them
	Validate {
		/// Files to check (defaults to the .spark.toml cascade)
		files: Vec<PathBuf>,
	},
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
	Json,
	Toml,
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	match run(cli.command) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_logging(verbose: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_env("SPARK_LOG")
		.unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

fn run(command: Commands) -> Result<ExitCode> {
	match command {
		Commands::Show { format, files } => handle_show(format, &files),
		Commands::Get {
			key,
			default,
			files,
		} => handle_get(&key, default.as_deref(), &files),
		Commands::Validate { files } => handle_validate(&files),
	}
}

fn load(files: &[PathBuf]) -> Result<MergedConfig> {
	if files.is_empty() {
		let cwd = std::env::current_dir().context("Failed to get current directory")?;
		load_merged_config(&cwd).context("Failed to load configuration cascade")
	} else {
		load_files(files).context("Failed to load configuration files")
	}
}

fn handle_show(format: Format, files: &[PathBuf]) -> Result<ExitCode> {
	let merged = load(files)?;

	if merged.sources.is_empty() {
		println!("No configuration files found.");
		return Ok(ExitCode::SUCCESS);
	}

	let rendered = match format {
		Format::Json => to_json_string(&merged.tree),
		Format::Toml => to_toml_string(&merged.tree),
	}
	.context("Failed to render configuration")?;

	println!("{}", rendered.trim_end());
	Ok(ExitCode::SUCCESS)
}

fn handle_get(key: &str, default: Option<&str>, files: &[PathBuf]) -> Result<ExitCode> {
	let merged = load(files)?;

	match (merged.tree.lookup(key), default) {
		(Some(ConfigValue::Scalar(scalar)), _) => println!("{}", scalar),
		(Some(ConfigValue::Subtree(subtree)), _) => {
			let rendered = to_json_string(subtree).context("Failed to render configuration")?;
			println!("{}", rendered);
		}
		(None, Some(default)) => println!("{}", default),
		(None, None) => {
			eprintln!("Key not found: {}", key);
			return Ok(ExitCode::FAILURE);
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn load_each(files: &[PathBuf]) -> spark_config::Result<Vec<LoadedSource>> {
	let mut sources = Vec::with_capacity(files.len());
	for path in files {
		sources.push(load_source(path)?);
	}
	Ok(sources)
}

fn handle_validate(files: &[PathBuf]) -> Result<ExitCode> {
	let result = if files.is_empty() {
		let cwd = std::env::current_dir().context("Failed to get current directory")?;
		discover_sources(&cwd)
	} else {
		load_each(files)
	};

	match result {
		Ok(sources) => {
			if sources.is_empty() {
				println!("No configuration files found.");
			} else {
				println!("All configuration files are valid:");
				for loaded in &sources {
					println!(
						"  {} ({} keys)",
						loaded.path.display(),
						loaded.mapping.len()
					);
				}
			}

			if files.is_empty()
				&& let Ok(user_path) = user_config_path()
			{
				let state = if user_path.exists() {
					"exists"
				} else {
					"not found"
				};
				println!("User config path: {} ({})", user_path.display(), state);
			}

			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Configuration error: {}", e);
			Ok(ExitCode::FAILURE)
		}
	}
}
