//! Generation of the two customer-facing order identifiers.
//!
//! Both identifiers are computed once, immediately before the record's
//! first persistence, and never recomputed. Uniqueness is not guaranteed
//! here: the caller claims each candidate in a unique index and retries
//! with a fresh candidate on a conflict.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Constant prefix of every tracking number.
pub const TRACKING_PREFIX: &str = "SA";
/// Constant prefix of every order number.
pub const ORDER_NUMBER_PREFIX: &str = "ORD-";
/// Total length of a tracking number: prefix + YYMMDD + 4-digit suffix.
pub const TRACKING_NUMBER_LEN: usize = 12;

/// Produces a tracking number candidate for the given creation time.
///
/// Format: `SA` + YYMMDD + 4 random decimal digits, zero-padded, always
/// 12 characters. The 4-digit suffix collides easily under load, which is
/// why candidates must be claimed before use.
pub fn tracking_number(created_at: DateTime<Utc>) -> String {
	let suffix: u32 = rand::rng().random_range(0..10_000);
	format!(
		"{}{}{:04}",
		TRACKING_PREFIX,
		created_at.format("%y%m%d"),
		suffix
	)
}

/// Formats an order number from a sequence value.
///
/// Format: `ORD-` + 6-digit zero-padded sequence, e.g. `ORD-000042`.
pub fn order_number(sequence: u64) -> String {
	format!("{}{:06}", ORDER_NUMBER_PREFIX, sequence)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn tracking_number_has_fixed_shape() {
		let created = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
		for _ in 0..100 {
			let tn = tracking_number(created);
			assert_eq!(tn.len(), TRACKING_NUMBER_LEN);
			assert!(tn.starts_with("SA240603"));
			assert!(tn[2..].chars().all(|c| c.is_ascii_digit()));
		}
	}

	#[test]
	fn order_number_is_zero_padded() {
		assert_eq!(order_number(1), "ORD-000001");
		assert_eq!(order_number(42), "ORD-000042");
		assert_eq!(order_number(123_456), "ORD-123456");
	}
}
