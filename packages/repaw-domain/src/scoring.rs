//! Pure sub-score and composite math. All inputs are plain numbers; the
//! policy values (weights, caps, threshold) come from `[matching]` config.

use repaw_config::Matching;

/// Linear decay from 1 at zero meters to 0 at the cap, clamped.
pub fn geo_score(distance_m: f64, cap_m: f64) -> f64 {
	let capped = distance_m.min(cap_m);

	(1.0 - capped / cap_m).max(0.0)
}

/// Linear decay from 1 at identical event times to 0 at the window,
/// clamped for anything older.
pub fn time_decay(days: f64, window_days: f64) -> f64 {
	(1.0 - days / window_days).max(0.0)
}

pub fn composite(cfg: &Matching, text_score: f64, geo_score: f64, time_score: f64) -> f64 {
	cfg.text_weight * text_score + cfg.geo_weight * geo_score + cfg.time_weight * time_score
}

/// Strictly greater than the threshold; a composite sitting exactly on it
/// is rejected.
pub fn accepts(cfg: &Matching, score: f64) -> bool {
	score > cfg.accept_threshold
}

#[cfg(test)]
mod tests {
	use super::*;

	fn policy() -> Matching {
		Matching::default()
	}

	#[test]
	fn geo_score_is_one_at_zero_distance() {
		assert_eq!(geo_score(0.0, policy().geo_cap_meters), 1.0);
	}

	#[test]
	fn geo_score_is_zero_at_and_beyond_cap() {
		let cap = policy().geo_cap_meters;

		assert_eq!(geo_score(cap, cap), 0.0);
		assert_eq!(geo_score(32_187.0, cap), 0.0);
	}

	#[test]
	fn geo_score_decays_linearly() {
		let cap = policy().geo_cap_meters;
		let half = geo_score(cap / 2.0, cap);

		assert!((half - 0.5).abs() < 1e-12);
	}

	#[test]
	fn time_decay_is_one_at_identical_times() {
		assert_eq!(time_decay(0.0, 30.0), 1.0);
	}

	#[test]
	fn time_decay_is_zero_at_and_beyond_window() {
		assert_eq!(time_decay(30.0, 30.0), 0.0);
		assert_eq!(time_decay(40.0, 30.0), 0.0);
	}

	#[test]
	fn time_decay_is_linear_in_between() {
		assert!((time_decay(15.0, 30.0) - 0.5).abs() < 1e-12);
		assert!((time_decay(3.0, 30.0) - 0.9).abs() < 1e-12);
	}

	#[test]
	fn composite_is_exact_weighted_sum() {
		let cfg = policy();
		let score = composite(&cfg, 0.9, 1.0, 1.0);

		assert_eq!(score, 0.5 * 0.9 + 0.3 * 1.0 + 0.2 * 1.0);
		assert!((score - 0.95).abs() < 1e-12);
	}

	#[test]
	fn perfect_pair_beyond_geo_cap_still_accepts() {
		let cfg = policy();
		let geo = geo_score(32_187.0, cfg.geo_cap_meters);
		let score = composite(&cfg, 0.9, geo, 1.0);

		assert!((score - 0.65).abs() < 1e-12);
		assert!(accepts(&cfg, score));
	}

	#[test]
	fn threshold_boundary_is_exclusive() {
		let cfg = policy();

		// cos 0.1, zero meters, 40 days apart lands exactly on the threshold.
		let score = composite(&cfg, 0.1, 1.0, time_decay(40.0, cfg.time_decay_days));

		assert_eq!(score, 0.35);
		assert!(!accepts(&cfg, score));
		assert!(accepts(&cfg, 0.36));
	}
}
