//! Periodic match recomputation: every interval, resubmit each report
//! created in the trailing window to the match engine, one run per report.

use std::time::Duration as StdDuration;

use color_eyre::Result;
use time::{Duration, OffsetDateTime};
use tokio::time as tokio_time;

use repaw_config::Sweep;
use repaw_service::RepawService;
use repaw_storage::queries;

pub struct WorkerState {
	pub sweep: Sweep,
	pub service: RepawService,
}

pub async fn run_sweeper(state: WorkerState) -> Result<()> {
	let interval = StdDuration::from_secs(state.sweep.interval_seconds);

	loop {
		if let Err(err) = sweep_once(&state).await {
			tracing::error!(error = %err, "Match sweep failed.");
		}

		tokio_time::sleep(interval).await;
	}
}

async fn sweep_once(state: &WorkerState) -> Result<()> {
	let cutoff = OffsetDateTime::now_utc() - Duration::days(state.sweep.window_days);
	let report_ids =
		queries::reports_created_since(&state.service.db, cutoff, state.sweep.batch_limit).await?;

	if report_ids.is_empty() {
		return Ok(());
	}

	tracing::info!(count = report_ids.len(), "Recomputing matches for recent reports.");

	// A failed run must not starve the rest of the batch.
	for report_id in report_ids {
		match state.service.match_report(report_id).await {
			Ok(summary) => {
				tracing::debug!(%report_id, accepted = summary.count, "Match run complete.");
			},
			Err(err) => {
				tracing::warn!(%report_id, error = %err, "Match run failed.");
			},
		}
	}

	Ok(())
}
