//! The match run: score one target report against its candidate pool and
//! persist the surviving top pairs.

use std::collections::HashMap;

use time::{Duration, OffsetDateTime};
use tracing::warn;
use uuid::Uuid;

use repaw_domain::{ReportKind, scoring};
use repaw_storage::{models::Report, queries};

use crate::{Error, RepawService, Result};

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct MatchExplanation {
	pub text_score: f64,
	pub geo_score: f64,
	pub time_score: f64,
}

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct MatchCandidate {
	pub lost: Uuid,
	pub found: Uuid,
	pub score: f64,
	pub explanation: MatchExplanation,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MatchSummary {
	pub count: usize,
	pub top: Vec<MatchCandidate>,
}

impl RepawService {
	pub async fn match_report(&self, report_id: Uuid) -> Result<MatchSummary> {
		let matching = self.cfg.matching.clone();
		let Some(target) = queries::fetch_report(&self.db, report_id).await? else {
			return Err(Error::NotFound { message: format!("Unknown report {report_id}.") });
		};
		let Some(target_kind) = ReportKind::parse(&target.kind) else {
			return Err(Error::InvalidRequest {
				message: format!("Report {report_id} has unsupported kind {:?}.", target.kind),
			});
		};

		// Text scoring is meaningless without the target's own vector, so a
		// provider failure here fails the whole run.
		self.ensure_text_embedding(&target).await?;

		let cutoff = OffsetDateTime::now_utc() - Duration::days(matching.candidate_window_days);
		let candidates = queries::select_candidates(
			&self.db,
			target.report_id,
			target_kind.opposite().as_str(),
			cutoff,
			matching.candidate_limit,
		)
		.await?;

		self.provision_candidates(&candidates).await;

		let neighbors = queries::knn_text(&self.db, target.report_id, matching.knn_limit).await?;
		let pool: HashMap<Uuid, &Report> =
			candidates.iter().map(|candidate| (candidate.report_id, candidate)).collect();
		let mut accepted = Vec::new();

		for neighbor in neighbors {
			// The pool, not the vector index, decides eligibility; neighbors
			// outside it are other kinds or outside the window.
			let Some(candidate) = pool.get(&neighbor.other_id) else {
				continue;
			};

			let geo_score = match self.geo_score(&target, candidate).await {
				Ok(score) => score,
				Err(err) => {
					warn!(
						candidate_id = %candidate.report_id,
						error = %err,
						"Skipping candidate after distance failure.",
					);

					continue;
				},
			};
			let days = days_between(target.event_time, candidate.event_time);
			let time_score = scoring::time_decay(days, matching.time_decay_days);
			let text_score = neighbor.cos_sim.clamp(0.0, 1.0);
			let score = scoring::composite(&matching, text_score, geo_score, time_score);

			if !scoring::accepts(&matching, score) {
				continue;
			}

			// Role slots follow each report's own kind, never which side
			// triggered the run, so a pair always lands on the same key.
			let (lost, found) = match target_kind {
				ReportKind::Lost => (target.report_id, candidate.report_id),
				ReportKind::Found => (candidate.report_id, target.report_id),
			};

			accepted.push(MatchCandidate {
				lost,
				found,
				score,
				explanation: MatchExplanation { text_score, geo_score, time_score },
			});
		}

		let ranked = rank(accepted);

		for candidate in ranked.iter().take(matching.persist_limit) {
			let explanation =
				serde_json::to_value(candidate.explanation).map_err(|err| Error::Storage {
					message: format!("Failed to encode match explanation: {err}."),
				})?;

			queries::upsert_match(
				&self.db,
				candidate.lost,
				candidate.found,
				candidate.score,
				&explanation,
			)
			.await?;
		}

		let top = ranked.iter().take(matching.summary_limit).copied().collect();

		Ok(MatchSummary { count: ranked.len(), top })
	}

	async fn geo_score(&self, target: &Report, candidate: &Report) -> Result<f64> {
		if target.lat.is_none()
			|| target.lng.is_none()
			|| candidate.lat.is_none()
			|| candidate.lng.is_none()
		{
			return Ok(0.0);
		}

		let meters = queries::geo_distance_m(&self.db, target.report_id, candidate.report_id).await?;

		Ok(match meters {
			Some(meters) => scoring::geo_score(meters, self.cfg.matching.geo_cap_meters),
			None => 0.0,
		})
	}
}

// Score descending, then (lost, found) ids ascending — with a fixed target
// that is candidate-id order — so equal scores rank reproducibly.
fn rank(mut accepted: Vec<MatchCandidate>) -> Vec<MatchCandidate> {
	accepted.sort_by(|a, b| {
		b.score
			.partial_cmp(&a.score)
			.unwrap_or(std::cmp::Ordering::Equal)
			.then_with(|| (a.lost, a.found).cmp(&(b.lost, b.found)))
	});

	accepted
}

fn days_between(a: OffsetDateTime, b: OffsetDateTime) -> f64 {
	((a - b).whole_seconds() as f64 / SECONDS_PER_DAY).abs()
}
