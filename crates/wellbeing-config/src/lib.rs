//! Configuration module for the Wellbeing-360 pharmacy client.
//!
//! Configuration is read from TOML. `${VAR}` and `${VAR:-default}` references
//! are replaced from the environment before parsing, and a file may pull in
//! other files with `include = ["backend.toml"]`. Each top-level section must
//! be defined in exactly one file.

mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub use loader::ConfigLoader;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Configuration error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Pharmacy backend connection.
	pub backend: BackendConfig,
	/// Order workflow behaviour.
	#[serde(default)]
	pub workflow: WorkflowConfig,
	/// CSV export settings.
	#[serde(default)]
	pub export: ExportConfig,
}

/// Connection settings for the pharmacy backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
	/// Which implementation to use (`http` or `memory`).
	#[serde(default = "default_backend_primary")]
	pub primary: String,
	/// Base URL every endpoint path is appended to.
	#[serde(default = "default_base_url")]
	pub base_url: String,
	/// Per-request deadline. Requests wait indefinitely when unset.
	#[serde(default)]
	pub request_timeout_seconds: Option<u64>,
	/// Raw TOML tables keyed by implementation name.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
	/// Directory of the loaded configuration file. Relative paths in
	/// implementation tables are resolved against it.
	#[serde(skip)]
	pub config_dir: Option<PathBuf>,
}

impl BackendConfig {
	/// Base URL without a trailing slash.
	pub fn base_url(&self) -> &str {
		self.base_url.trim_end_matches('/')
	}

	pub fn request_timeout(&self) -> Option<Duration> {
		self.request_timeout_seconds.map(Duration::from_secs)
	}

	/// Table configured for the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}

	/// Resolves a path from an implementation table. Relative paths are
	/// taken from the configuration file's directory when one is known.
	pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
		let path = path.as_ref();
		match &self.config_dir {
			Some(dir) if path.is_relative() => dir.join(path),
			_ => path.to_path_buf(),
		}
	}
}

/// Order workflow behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
	/// Refuse a second advance for an order while one is outstanding.
	#[serde(default = "default_single_flight")]
	pub single_flight: bool,
}

impl Default for WorkflowConfig {
	fn default() -> Self {
		Self {
			single_flight: default_single_flight(),
		}
	}
}

/// CSV export settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
	/// Directory employee order exports are written to.
	#[serde(default = "default_export_directory")]
	pub directory: PathBuf,
}

impl Default for ExportConfig {
	fn default() -> Self {
		Self {
			directory: default_export_directory(),
		}
	}
}

fn default_backend_primary() -> String {
	"http".to_string()
}

fn default_base_url() -> String {
	"http://localhost:8599/v1/wellbeing360".to_string()
}

fn default_single_flight() -> bool {
	true
}

fn default_export_directory() -> PathBuf {
	PathBuf::from(".")
}

/// Longest accepted request timeout, in seconds.
const MAX_REQUEST_TIMEOUT_SECONDS: u64 = 600;

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`, or with `default` for
/// `${VAR_NAME:-default}` when the variable is unset.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut missing = None;
	let resolved = re.replace_all(input, |caps: &regex::Captures| {
		let var_name = &caps[1];
		match (std::env::var(var_name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				missing.get_or_insert_with(|| var_name.to_string());
				String::new()
			},
		}
	});

	match missing {
		Some(var_name) => Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			var_name
		))),
		None => Ok(resolved.into_owned()),
	}
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
		let file_name = path
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path.display())))?;

		let mut loader = ConfigLoader::new(base_dir);
		loader.load_config(file_name).await
	}

	/// Checks cross-field constraints serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		let backend = &self.backend;
		if backend.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Backend primary implementation cannot be empty".into(),
			));
		}
		if !backend.implementations.contains_key(&backend.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary backend '{}' not found in implementations",
				backend.primary
			)));
		}

		let base_url = backend.base_url();
		if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
			return Err(ConfigError::Validation(format!(
				"Backend base_url must start with http:// or https://, got '{}'",
				backend.base_url
			)));
		}

		if let Some(timeout) = backend.request_timeout_seconds {
			if timeout == 0 || timeout > MAX_REQUEST_TIMEOUT_SECONDS {
				return Err(ConfigError::Validation(format!(
					"request_timeout_seconds must be between 1 and {}",
					MAX_REQUEST_TIMEOUT_SECONDS
				)));
			}
		}

		if self.export.directory.as_os_str().is_empty() {
			return Err(ConfigError::Validation(
				"Export directory cannot be empty".into(),
			));
		}

		Ok(())
	}
}

/// Parses a TOML string, resolving environment variables and validating.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
