use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub query: Query,
	#[serde(default)]
	pub preview: Preview,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub backend: StorageBackend,
	pub postgres: Option<Postgres>,
	pub snapshot: Option<Snapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
	Postgres,
	Snapshot,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// A JSON content dump served from memory, typically exported from a WordPress install.
#[derive(Debug, Deserialize)]
pub struct Snapshot {
	pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Query {
	/// Post types used when a query names none.
	pub default_post_types: Vec<String>,
	/// Limit used when a query names none. Zero means unbounded.
	pub default_limit: u32,
	/// Minimum fetch size while a search term is active.
	pub search_limit_floor: u32,
	/// Hard cap applied to unbounded queries.
	pub max_page_size: Option<u32>,
}
impl Default for Query {
	fn default() -> Self {
		Self {
			default_post_types: vec!["page".to_string()],
			default_limit: 0,
			search_limit_floor: 50,
			max_page_size: None,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Preview {
	pub search_debounce_ms: u64,
}
impl Default for Preview {
	fn default() -> Self {
		Self { search_debounce_ms: 1_000 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Security {
	pub bind_localhost_only: bool,
}
impl Default for Security {
	fn default() -> Self {
		Self { bind_localhost_only: true }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}
