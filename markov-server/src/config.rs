use std::path::PathBuf;
use std::{env, fs};

use log::warn;
use serde::Deserialize;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MARKOV_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "markov.toml";

/// Server settings, read from a TOML file.
///
/// Every field is optional in the file; missing ones keep their default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
	pub host: String,
	pub port: u16,
	/// Directory holding `.txt` corpora (and their `.bin` snapshots).
	pub data_dir: PathBuf,
	/// Used when a request omits `min_len`.
	pub default_min_len: usize,
	/// Used when a request omits `max_len`.
	pub default_max_len: usize,
	/// Accept cross-origin requests from any origin.
	pub cors_permissive: bool,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_owned(),
			port: 5000,
			data_dir: PathBuf::from("./data"),
			default_min_len: 0,
			default_max_len: 30,
			cors_permissive: true,
		}
	}
}

impl ServerConfig {
	/// Loads the file named by `MARKOV_CONFIG`, or `markov.toml`.
	///
	/// A missing file gives the defaults. An unreadable or invalid file is
	/// logged and also gives the defaults.
	pub fn load() -> Self {
		let path = env::var_os(CONFIG_ENV)
			.map(PathBuf::from)
			.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
		if !path.exists() {
			return Self::default();
		}

		let content = match fs::read_to_string(&path) {
			Ok(content) => content,
			Err(err) => {
				warn!("Failed to read config at {:?}: {}", path, err);
				return Self::default();
			}
		};

		match Self::parse(&content) {
			Ok(config) => config,
			Err(err) => {
				warn!("Failed to parse config at {:?}: {}", path, err);
				Self::default()
			}
		}
	}

	pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(content)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_file_keeps_defaults() {
		let config = ServerConfig::parse("port = 8080\ndefault_max_len = 12\n").expect("valid toml");
		assert_eq!(config.port, 8080);
		assert_eq!(config.default_max_len, 12);
		assert_eq!(config.host, "127.0.0.1");
		assert_eq!(config.data_dir, PathBuf::from("./data"));
	}

	#[test]
	fn empty_file_is_default() {
		assert_eq!(ServerConfig::parse("").expect("valid toml"), ServerConfig::default());
	}

	#[test]
	fn wrong_type_is_rejected() {
		assert!(ServerConfig::parse("port = \"eighty\"").is_err());
	}
}
