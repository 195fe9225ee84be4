//! Report intake and listing. Thin validation over storage; the matching
//! engine only ever reads these rows.

use time::OffsetDateTime;
use uuid::Uuid;

use repaw_domain::ReportKind;
use repaw_storage::{
	models::{NewReport, Report},
	queries,
};

use crate::{Error, RepawService, Result};

const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 200;
const DEFAULT_RADIUS_MILES: f64 = 25.0;
const METERS_PER_MILE: f64 = 1_609.34;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateReportRequest {
	pub kind: String,
	pub description: Option<String>,
	pub lat: Option<f64>,
	pub lng: Option<f64>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub country: Option<String>,
	pub contact_email: Option<String>,
	pub source: Option<String>,
	#[serde(default, with = "crate::time_serde::option")]
	pub event_time: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateReportResponse {
	pub id: Uuid,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ListReportsRequest {
	pub kind: Option<String>,
	/// "lat,lng" center for a proximity filter.
	pub near: Option<String>,
	pub radius_mi: Option<f64>,
	pub limit: Option<i64>,
}

/// Public projection of a report; contact details stay out of listings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReportView {
	pub id: Uuid,
	pub kind: String,
	pub description: String,
	pub lat: Option<f64>,
	pub lng: Option<f64>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub country: Option<String>,
	pub source: String,
	#[serde(with = "crate::time_serde")]
	pub event_time: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ListReportsResponse {
	pub reports: Vec<ReportView>,
}

impl RepawService {
	pub async fn create_report(&self, req: CreateReportRequest) -> Result<CreateReportResponse> {
		let Some(kind) = ReportKind::parse(&req.kind) else {
			return Err(Error::InvalidRequest {
				message: format!("kind must be LOST or FOUND, got {:?}.", req.kind),
			});
		};

		match (req.lat, req.lng) {
			(Some(lat), Some(lng)) => {
				if !(-90.0..=90.0).contains(&lat) {
					return Err(Error::InvalidRequest {
						message: "lat must be between -90 and 90.".to_string(),
					});
				}
				if !(-180.0..=180.0).contains(&lng) {
					return Err(Error::InvalidRequest {
						message: "lng must be between -180 and 180.".to_string(),
					});
				}
			},
			(None, None) => {},
			_ => {
				return Err(Error::InvalidRequest {
					message: "lat and lng must be provided together.".to_string(),
				});
			},
		}

		let report = NewReport {
			kind: kind.as_str().to_string(),
			description: req.description.unwrap_or_default(),
			lat: req.lat,
			lng: req.lng,
			city: req.city,
			state: req.state,
			country: req.country,
			contact_email: req.contact_email,
			source: req.source.unwrap_or_else(|| "USER".to_string()),
			event_time: req.event_time.unwrap_or_else(OffsetDateTime::now_utc),
		};
		let id = queries::insert_report(&self.db, &report).await?;

		Ok(CreateReportResponse { id })
	}

	pub async fn list_reports(&self, req: ListReportsRequest) -> Result<ListReportsResponse> {
		let kind = match req.kind.as_deref() {
			Some(raw) => {
				let Some(kind) = ReportKind::parse(raw) else {
					return Err(Error::InvalidRequest {
						message: format!("kind must be LOST or FOUND, got {raw:?}."),
					});
				};

				Some(kind.as_str())
			},
			None => None,
		};
		let limit = req.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
		let reports = match req.near.as_deref() {
			Some(near) => {
				let (lat, lng) = parse_near(near)?;
				let radius_m = req.radius_mi.unwrap_or(DEFAULT_RADIUS_MILES) * METERS_PER_MILE;

				queries::reports_near(&self.db, lat, lng, radius_m, kind, limit).await?
			},
			None => queries::recent_reports(&self.db, kind, limit).await?,
		};

		Ok(ListReportsResponse { reports: reports.into_iter().map(report_view).collect() })
	}
}

fn parse_near(raw: &str) -> Result<(f64, f64)> {
	let mut parts = raw.splitn(2, ',');
	let lat = parts.next().and_then(|part| part.trim().parse::<f64>().ok());
	let lng = parts.next().and_then(|part| part.trim().parse::<f64>().ok());

	match (lat, lng) {
		(Some(lat), Some(lng)) => Ok((lat, lng)),
		_ => Err(Error::InvalidRequest {
			message: "near must be formatted as lat,lng.".to_string(),
		}),
	}
}

fn report_view(report: Report) -> ReportView {
	ReportView {
		id: report.report_id,
		kind: report.kind,
		description: report.description,
		lat: report.lat,
		lng: report.lng,
		city: report.city,
		state: report.state,
		country: report.country,
		source: report.source,
		event_time: report.event_time,
		created_at: report.created_at,
	}
}
