//! Engine configuration (spec.md §6), loaded from the environment the
//! way `ArunaStorage-aruna` loads its own Postgres + S3 settings with
//! `envy`.

use serde::Deserialize;

fn default_pool_max() -> u32 {
	20
}

fn default_blob_concurrency() -> usize {
	5
}

fn default_root_max_bytes() -> u64 {
	50 * 1024 * 1024
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	#[serde(rename = "db_url")]
	pub db_url: String,

	#[serde(rename = "db_pool_max", default = "default_pool_max")]
	pub db_pool_max: u32,

	#[serde(rename = "blob_endpoint")]
	pub blob_endpoint: String,
	#[serde(rename = "blob_region")]
	pub blob_region: String,
	#[serde(rename = "blob_access_key")]
	pub blob_access_key: String,
	#[serde(rename = "blob_secret_key")]
	pub blob_secret_key: String,
	#[serde(rename = "blob_bucket")]
	pub blob_bucket: String,

	#[serde(rename = "blob_concurrency", default = "default_blob_concurrency")]
	pub blob_concurrency: usize,

	#[serde(rename = "root_default_max_bytes", default = "default_root_max_bytes")]
	pub root_default_max_bytes: u64,
}

impl Config {
	/// Load configuration from environment variables using the
	/// `ENGINE_` prefix, e.g. `ENGINE_DB_URL`, `ENGINE_BLOB_CONCURRENCY`.
	pub fn from_env() -> Result<Self, envy::Error> {
		envy::prefixed("ENGINE_").from_env::<Self>()
	}
}

/// Installs a `tracing_subscriber` formatter honouring `RUST_LOG`, falling
/// back to `sd_vfs_engine=info` when unset — the same `EnvFilter` fallback
/// shape `core-new`'s own CLI entrypoint uses for its default log level.
pub fn init_tracing() {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sd_vfs_engine=info"));
	tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_apply_when_env_omits_optional_keys() {
		// SAFETY: test-only, single-threaded test process.
		unsafe {
			std::env::set_var("ENGINE_DB_URL", "postgres://localhost/engine");
			std::env::set_var("ENGINE_BLOB_ENDPOINT", "http://localhost:9000");
			std::env::set_var("ENGINE_BLOB_REGION", "us-east-1");
			std::env::set_var("ENGINE_BLOB_ACCESS_KEY", "key");
			std::env::set_var("ENGINE_BLOB_SECRET_KEY", "secret");
			std::env::set_var("ENGINE_BLOB_BUCKET", "bucket");
			std::env::remove_var("ENGINE_DB_POOL_MAX");
			std::env::remove_var("ENGINE_BLOB_CONCURRENCY");
			std::env::remove_var("ENGINE_ROOT_DEFAULT_MAX_BYTES");
		}

		let config = Config::from_env().expect("config should load");
		assert_eq!(config.db_pool_max, 20);
		assert_eq!(config.blob_concurrency, 5);
		assert_eq!(config.root_default_max_bytes, 50 * 1024 * 1024);
	}
}
