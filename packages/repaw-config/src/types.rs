use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub matching: Matching,
	#[serde(default)]
	pub sweep: Sweep,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Absent or blank selects the deterministic offline embedder.
	#[serde(default)]
	pub api_key: Option<String>,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Deployment-wide scoring policy. Not overridable per request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Matching {
	pub text_weight: f64,
	pub geo_weight: f64,
	pub time_weight: f64,
	pub accept_threshold: f64,
	pub geo_cap_meters: f64,
	pub time_decay_days: f64,
	pub candidate_window_days: i64,
	pub candidate_limit: i64,
	pub knn_limit: i64,
	pub persist_limit: usize,
	pub summary_limit: usize,
}
impl Default for Matching {
	fn default() -> Self {
		Self {
			text_weight: 0.5,
			geo_weight: 0.3,
			time_weight: 0.2,
			accept_threshold: 0.35,
			geo_cap_meters: 16_093.4,
			time_decay_days: 30.0,
			candidate_window_days: 30,
			candidate_limit: 400,
			knn_limit: 100,
			persist_limit: 20,
			summary_limit: 3,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Sweep {
	pub window_days: i64,
	pub batch_limit: i64,
	pub interval_seconds: u64,
}
impl Default for Sweep {
	fn default() -> Self {
		Self { window_days: 7, batch_limit: 500, interval_seconds: 600 }
	}
}
