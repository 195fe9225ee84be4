use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

// FNV-1a 32-bit, matching the wire-tested offline vectors.
const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;
const COORDINATE_STRIDE: f64 = 374_761_393.0;
const COORDINATE_MODULUS: f64 = 104_729.0;

/// Embeds every text into a vector of exactly `cfg.dimensions` floats.
///
/// With an api_key configured this calls the remote embeddings API;
/// otherwise it falls back to the deterministic offline embedder, so a
/// vector is always produced. The offline vectors are hash-derived and
/// carry no real semantic signal.
pub async fn embed(
	cfg: &repaw_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let Some(api_key) = cfg.api_key.as_deref() else {
		return Ok(texts
			.iter()
			.map(|text| offline_embedding(text, cfg.dimensions as usize))
			.collect());
	};

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_embedding_response(json, cfg.dimensions as usize)
}

/// Total, deterministic mapping from text to a vector with every
/// coordinate in [0, 1]. The empty string is valid input.
pub fn offline_embedding(text: &str, dimensions: usize) -> Vec<f32> {
	let mut hash = FNV_OFFSET_BASIS;

	for byte in text.bytes() {
		hash ^= u32::from(byte);
		hash = hash.wrapping_mul(FNV_PRIME);
	}

	(0..dimensions)
		.map(|i| {
			let phase = (f64::from(hash) + i as f64 * COORDINATE_STRIDE) % COORDINATE_MODULUS;

			(phase.sin() * 0.5 + 0.5) as f32
		})
		.collect()
}

fn parse_embedding_response(json: Value, dimensions: usize) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| Error::InvalidResponse {
		message: "Embedding response is missing data array.".to_string(),
	})?;

	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding =
			item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
				Error::InvalidResponse {
					message: "Embedding item missing embedding array.".to_string(),
				}
			})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		// Never truncate or pad; downstream nearest-neighbor comparison
		// assumes a uniform dimension.
		if vec.len() != dimensions {
			return Err(Error::InvalidResponse {
				message: format!(
					"Embedding dimension {} does not match configured dimension {dimensions}.",
					vec.len()
				),
			});
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}
