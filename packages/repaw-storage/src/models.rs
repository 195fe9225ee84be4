use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Report {
	pub report_id: Uuid,
	pub kind: String,
	pub description: String,
	pub lat: Option<f64>,
	pub lng: Option<f64>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub country: Option<String>,
	pub contact_email: Option<String>,
	pub source: String,
	pub event_time: OffsetDateTime,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewReport {
	pub kind: String,
	pub description: String,
	pub lat: Option<f64>,
	pub lng: Option<f64>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub country: Option<String>,
	pub contact_email: Option<String>,
	pub source: String,
	pub event_time: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchRow {
	pub lost_report_id: Uuid,
	pub found_report_id: Uuid,
	pub score: f64,
	pub explanation: Value,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

/// One row of the nearest-neighbor query: a report close to the origin in
/// text-embedding space, with cosine similarity already derived from the
/// pgvector distance.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct KnnNeighbor {
	pub other_id: Uuid,
	pub cos_sim: f64,
}
