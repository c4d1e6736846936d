//! Configuration module for the SA Commerce service.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required values are properly set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the commerce service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this service instance.
	pub service: ServiceConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for order processing.
	#[serde(default)]
	pub order: OrderConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to this service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Identifier for this instance, used in logs.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use, e.g. "memory" or "file".
	pub backend: String,
	/// Map of storage implementation names to their configurations.
	/// Each implementation has its own format stored as raw TOML values.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for order processing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderConfig {
	/// How many times identifier generation retries after a uniqueness
	/// conflict before the creation fails.
	#[serde(default = "default_max_claim_attempts")]
	pub max_claim_attempts: u32,
	/// Records per page when the listing request does not specify one.
	#[serde(default = "default_page_size")]
	pub default_page_size: u32,
}

impl Default for OrderConfig {
	fn default() -> Self {
		Self {
			max_claim_attempts: default_max_claim_attempts(),
			default_page_size: default_page_size(),
		}
	}
}

/// Returns the default number of identifier-claim attempts.
fn default_max_claim_attempts() -> u32 {
	8
}

/// Returns the default listing page size.
fn default_page_size() -> u32 {
	10
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server should be started.
	#[serde(default = "default_api_enabled")]
	pub enabled: bool,
	/// Address to bind to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_enabled() -> bool {
	true
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

impl Config {
	/// Parses configuration from a TOML string and validates it.
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(content)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads, parses, and validates configuration from a file.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path).await?;
		Self::from_toml_str(&content)
	}

	/// Checks cross-field constraints the type system cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.trim().is_empty() {
			return Err(ConfigError::Validation(
				"service.id must not be empty".to_string(),
			));
		}

		if self.storage.backend.trim().is_empty() {
			return Err(ConfigError::Validation(
				"storage.backend must not be empty".to_string(),
			));
		}

		if self.order.max_claim_attempts == 0 {
			return Err(ConfigError::Validation(
				"order.max_claim_attempts must be at least 1".to_string(),
			));
		}

		if self.order.default_page_size == 0 {
			return Err(ConfigError::Validation(
				"order.default_page_size must be at least 1".to_string(),
			));
		}

		if let Some(api) = &self.api {
			if api.enabled && api.port == 0 {
				return Err(ConfigError::Validation(
					"api.port must be non-zero when the API is enabled".to_string(),
				));
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_full_configuration() {
		let config = Config::from_toml_str(
			r#"
			[service]
			id = "sa-commerce"

			[storage]
			backend = "file"

			[storage.implementations.file]
			storage_path = "./data/storage"

			[order]
			max_claim_attempts = 5
			default_page_size = 20

			[api]
			host = "0.0.0.0"
			port = 8080
			"#,
		)
		.unwrap();

		assert_eq!(config.service.id, "sa-commerce");
		assert_eq!(config.storage.backend, "file");
		assert_eq!(config.order.max_claim_attempts, 5);
		assert_eq!(config.order.default_page_size, 20);
		let api = config.api.unwrap();
		assert!(api.enabled);
		assert_eq!(api.port, 8080);

		let file_config = config.storage.implementations.get("file").unwrap();
		assert_eq!(
			file_config.get("storage_path").and_then(|v| v.as_str()),
			Some("./data/storage")
		);
	}

	#[test]
	fn order_section_is_optional_with_defaults() {
		let config = Config::from_toml_str(
			r#"
			[service]
			id = "sa-commerce"

			[storage]
			backend = "memory"
			"#,
		)
		.unwrap();

		assert_eq!(config.order.max_claim_attempts, 8);
		assert_eq!(config.order.default_page_size, 10);
		assert!(config.api.is_none());
	}

	#[test]
	fn rejects_zero_claim_attempts() {
		let err = Config::from_toml_str(
			r#"
			[service]
			id = "sa-commerce"

			[storage]
			backend = "memory"

			[order]
			max_claim_attempts = 0
			"#,
		)
		.unwrap_err();

		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn rejects_blank_backend() {
		let err = Config::from_toml_str(
			r#"
			[service]
			id = "sa-commerce"

			[storage]
			backend = "  "
			"#,
		)
		.unwrap_err();

		assert!(matches!(err, ConfigError::Validation(_)));
	}
}
