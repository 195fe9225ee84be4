use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Result,
	db::Db,
	models::{KnnNeighbor, NewReport, Report},
};

const REPORT_COLUMNS: &str = "\
report_id, kind, description, lat, lng, city, state, country, contact_email, source, event_time, created_at";

pub async fn insert_report(db: &Db, report: &NewReport) -> Result<Uuid> {
	let report_id = Uuid::new_v4();

	sqlx::query(
		"\
INSERT INTO reports (
	report_id,
	kind,
	description,
	lat,
	lng,
	city,
	state,
	country,
	contact_email,
	source,
	event_time,
	geom
)
VALUES (
	$1,
	$2,
	$3,
	$4,
	$5,
	$6,
	$7,
	$8,
	$9,
	$10,
	$11,
	CASE
		WHEN $4::float8 IS NOT NULL AND $5::float8 IS NOT NULL
			THEN ST_SetSRID(ST_MakePoint($5::float8, $4::float8), 4326)
	END
)",
	)
	.bind(report_id)
	.bind(report.kind.as_str())
	.bind(report.description.as_str())
	.bind(report.lat)
	.bind(report.lng)
	.bind(report.city.as_deref())
	.bind(report.state.as_deref())
	.bind(report.country.as_deref())
	.bind(report.contact_email.as_deref())
	.bind(report.source.as_str())
	.bind(report.event_time)
	.execute(&db.pool)
	.await?;

	Ok(report_id)
}

pub async fn fetch_report(db: &Db, report_id: Uuid) -> Result<Option<Report>> {
	let report = sqlx::query_as(&format!(
		"SELECT {REPORT_COLUMNS} FROM reports WHERE report_id = $1"
	))
	.bind(report_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(report)
}

pub async fn recent_reports(db: &Db, kind: Option<&str>, limit: i64) -> Result<Vec<Report>> {
	let reports = sqlx::query_as(&format!(
		"\
SELECT {REPORT_COLUMNS}
FROM reports
WHERE ($1::text IS NULL OR kind = $1)
ORDER BY created_at DESC
LIMIT $2"
	))
	.bind(kind)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(reports)
}

pub async fn reports_near(
	db: &Db,
	lat: f64,
	lng: f64,
	radius_m: f64,
	kind: Option<&str>,
	limit: i64,
) -> Result<Vec<Report>> {
	let reports = sqlx::query_as(&format!(
		"\
SELECT {REPORT_COLUMNS}
FROM reports
WHERE geom IS NOT NULL
	AND ($4::text IS NULL OR kind = $4)
	AND ST_DWithin(geom::geography, ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography, $3)
ORDER BY created_at DESC
LIMIT $5"
	))
	.bind(lat)
	.bind(lng)
	.bind(radius_m)
	.bind(kind)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(reports)
}

/// The bounded comparison pool for one match run: opposite-kind reports
/// created after the cutoff, excluding the target itself. No ordering
/// guarantee.
pub async fn select_candidates(
	db: &Db,
	target_id: Uuid,
	kind: &str,
	created_after: OffsetDateTime,
	limit: i64,
) -> Result<Vec<Report>> {
	let reports = sqlx::query_as(&format!(
		"\
SELECT {REPORT_COLUMNS}
FROM reports
WHERE report_id <> $1
	AND kind = $2
	AND created_at >= $3
LIMIT $4"
	))
	.bind(target_id)
	.bind(kind)
	.bind(created_after)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(reports)
}

pub async fn text_embedding_exists(db: &Db, report_id: Uuid) -> Result<bool> {
	let exists: bool = sqlx::query_scalar(
		"SELECT EXISTS (SELECT 1 FROM report_embeddings WHERE report_id = $1 AND modality = 'TEXT')",
	)
	.bind(report_id)
	.fetch_one(&db.pool)
	.await?;

	Ok(exists)
}

/// First write wins; a concurrent provisioner racing for the same report
/// leaves exactly one row.
pub async fn insert_text_embedding(
	db: &Db,
	report_id: Uuid,
	embedding_dim: i32,
	vec_text: &str,
) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO report_embeddings (report_id, modality, embedding_dim, vec)
VALUES ($1, 'TEXT', $2, $3::text::vector)
ON CONFLICT (report_id, modality) DO NOTHING",
	)
	.bind(report_id)
	.bind(embedding_dim)
	.bind(vec_text)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Top-k reports nearest to the origin report by cosine distance over TEXT
/// embeddings. Reports without an embedding never appear.
pub async fn knn_text(db: &Db, report_id: Uuid, k: i64) -> Result<Vec<KnnNeighbor>> {
	let neighbors = sqlx::query_as(
		"\
SELECT
	e.report_id AS other_id,
	(1 - (e.vec <=> t.vec))::float8 AS cos_sim
FROM report_embeddings e
JOIN report_embeddings t
	ON t.report_id = $1 AND t.modality = 'TEXT'
WHERE e.modality = 'TEXT' AND e.report_id <> $1
ORDER BY e.vec <=> t.vec
LIMIT $2",
	)
	.bind(report_id)
	.bind(k)
	.fetch_all(&db.pool)
	.await?;

	Ok(neighbors)
}

/// Great-circle distance in meters between two stored report geometries.
/// None when either report has no geometry.
pub async fn geo_distance_m(db: &Db, a: Uuid, b: Uuid) -> Result<Option<f64>> {
	let meters: Option<Option<f64>> = sqlx::query_scalar(
		"\
SELECT ST_DistanceSphere(a.geom, b.geom)::float8
FROM reports a, reports b
WHERE a.report_id = $1 AND b.report_id = $2",
	)
	.bind(a)
	.bind(b)
	.fetch_optional(&db.pool)
	.await?;

	Ok(meters.flatten())
}

/// Last write wins for a repeated (lost, found) pair.
pub async fn upsert_match(
	db: &Db,
	lost_report_id: Uuid,
	found_report_id: Uuid,
	score: f64,
	explanation: &Value,
) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO matches (lost_report_id, found_report_id, score, explanation)
VALUES ($1, $2, $3, $4)
ON CONFLICT (lost_report_id, found_report_id) DO UPDATE
SET
	score = EXCLUDED.score,
	explanation = EXCLUDED.explanation,
	updated_at = now()",
	)
	.bind(lost_report_id)
	.bind(found_report_id)
	.bind(score)
	.bind(explanation)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn reports_created_since(
	db: &Db,
	cutoff: OffsetDateTime,
	limit: i64,
) -> Result<Vec<Uuid>> {
	let ids = sqlx::query_scalar(
		"SELECT report_id FROM reports WHERE created_at >= $1 ORDER BY created_at ASC LIMIT $2",
	)
	.bind(cutoff)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(ids)
}
