//! Error types for the catalog.

use sgx_types::file::SgxError;
use thiserror::Error;

/// Errors that can occur when configuring or loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
	/// A collection failed to load
	#[error("Failed to load collection '{name}': {source}")]
	Load {
		/// Archive base name
		name: String,
		/// Underlying archive error
		#[source]
		source: SgxError,
	},

	/// Enemy id has no configured archive
	#[error("Unknown enemy id {id}, {count} enemy archives configured")]
	UnknownEnemy {
		/// Requested enemy id
		id: usize,
		/// Number of configured enemy archives
		count: usize,
	},

	/// Configuration is structurally valid but unusable
	#[error("Invalid catalog configuration: {0}")]
	InvalidConfig(String),

	/// Configuration could not be read or deserialized
	#[error(transparent)]
	Config(#[from] config::ConfigError),
}
