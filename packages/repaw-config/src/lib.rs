mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, EmbeddingProviderConfig, Matching, Postgres, Providers, Service, Storage, Sweep};

use std::{fs, path::Path};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}

	let matching = &cfg.matching;

	for (label, weight) in [
		("matching.text_weight", matching.text_weight),
		("matching.geo_weight", matching.geo_weight),
		("matching.time_weight", matching.time_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	let weight_sum = matching.text_weight + matching.geo_weight + matching.time_weight;

	if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
		return Err(Error::Validation {
			message: "matching weights must sum to 1.0.".to_string(),
		});
	}

	if !matching.accept_threshold.is_finite() || !(0.0..1.0).contains(&matching.accept_threshold) {
		return Err(Error::Validation {
			message: "matching.accept_threshold must be in the range 0.0-1.0 (exclusive).".to_string(),
		});
	}
	if !matching.geo_cap_meters.is_finite() || matching.geo_cap_meters <= 0.0 {
		return Err(Error::Validation {
			message: "matching.geo_cap_meters must be greater than zero.".to_string(),
		});
	}
	if !matching.time_decay_days.is_finite() || matching.time_decay_days <= 0.0 {
		return Err(Error::Validation {
			message: "matching.time_decay_days must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("matching.candidate_window_days", matching.candidate_window_days),
		("matching.candidate_limit", matching.candidate_limit),
		("matching.knn_limit", matching.knn_limit),
	] {
		if value <= 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if matching.persist_limit == 0 {
		return Err(Error::Validation {
			message: "matching.persist_limit must be greater than zero.".to_string(),
		});
	}
	if matching.summary_limit == 0 {
		return Err(Error::Validation {
			message: "matching.summary_limit must be greater than zero.".to_string(),
		});
	}

	if cfg.sweep.window_days <= 0 {
		return Err(Error::Validation {
			message: "sweep.window_days must be greater than zero.".to_string(),
		});
	}
	if cfg.sweep.batch_limit <= 0 {
		return Err(Error::Validation {
			message: "sweep.batch_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.sweep.interval_seconds == 0 {
		return Err(Error::Validation {
			message: "sweep.interval_seconds must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.providers
		.embedding
		.api_key
		.as_deref()
		.map(|key| key.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.embedding.api_key = None;
	}
}
