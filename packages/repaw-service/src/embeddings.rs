//! Embedding provisioning: every report entering a match run must carry a
//! stored TEXT embedding first.

use tokio::task::JoinSet;
use tracing::warn;
use uuid::Uuid;

use repaw_config::EmbeddingProviderConfig;
use repaw_storage::{db::Db, models::Report, queries};

use crate::{Error, Providers, RepawService, Result, vector_to_pg};

const PROVISION_WORKERS: usize = 8;

impl RepawService {
	/// Idempotent: an existing embedding short-circuits before any provider
	/// call. Returns true when a new row was written.
	pub async fn ensure_text_embedding(&self, report: &Report) -> Result<bool> {
		ensure_text_embedding(
			&self.db,
			&self.providers,
			&self.cfg.providers.embedding,
			report.report_id,
			&report.description,
		)
		.await
	}

	/// Fans candidate provisioning out over a fixed worker count. A failed
	/// candidate is logged and left un-embedded; it then simply never
	/// surfaces in the nearest-neighbor result for this run.
	pub(crate) async fn provision_candidates(&self, candidates: &[Report]) {
		let mut tasks: JoinSet<(Uuid, Result<bool>)> = JoinSet::new();

		for report in candidates {
			if tasks.len() >= PROVISION_WORKERS {
				reap_provision_task(&mut tasks).await;
			}

			let db = self.db.clone();
			let providers = self.providers.clone();
			let embedding_cfg = self.cfg.providers.embedding.clone();
			let report_id = report.report_id;
			let description = report.description.clone();

			tasks.spawn(async move {
				let written =
					ensure_text_embedding(&db, &providers, &embedding_cfg, report_id, &description)
						.await;

				(report_id, written)
			});
		}

		while !tasks.is_empty() {
			reap_provision_task(&mut tasks).await;
		}
	}
}

async fn reap_provision_task(tasks: &mut JoinSet<(Uuid, Result<bool>)>) {
	match tasks.join_next().await {
		Some(Ok((report_id, Err(err)))) => {
			warn!(%report_id, error = %err, "Candidate embedding provisioning failed.");
		},
		Some(Err(err)) => {
			warn!(error = %err, "Candidate embedding provisioning task panicked.");
		},
		_ => {},
	}
}

async fn ensure_text_embedding(
	db: &Db,
	providers: &Providers,
	cfg: &EmbeddingProviderConfig,
	report_id: Uuid,
	description: &str,
) -> Result<bool> {
	if queries::text_embedding_exists(db, report_id).await? {
		return Ok(false);
	}

	let vectors = providers.embedding.embed(cfg, &[description.to_string()]).await?;
	let Some(vec) = vectors.into_iter().next() else {
		return Err(Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		});
	};

	if vec.len() != cfg.dimensions as usize {
		return Err(Error::Provider {
			message: "Embedding vector dimension mismatch.".to_string(),
		});
	}

	let vec_text = vector_to_pg(&vec);

	queries::insert_text_embedding(db, report_id, vec.len() as i32, &vec_text).await?;

	Ok(true)
}
