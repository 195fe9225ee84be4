use serde::{Deserialize, Serialize};

/// Whether a report describes a pet that went missing or one that was
/// picked up. Immutable once the report exists.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportKind {
	Lost,
	Found,
}
impl ReportKind {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"LOST" => Some(Self::Lost),
			"FOUND" => Some(Self::Found),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Lost => "LOST",
			Self::Found => "FOUND",
		}
	}

	/// The kind a report of this kind is matched against.
	pub fn opposite(self) -> Self {
		match self {
			Self::Lost => Self::Found,
			Self::Found => Self::Lost,
		}
	}
}
