//! String formatting utilities for display.

/// Truncates an identifier for log output.
///
/// Shows only the first 8 characters followed by ".." for longer strings.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((end, _)) => format!("{}..", &id[..end]),
		None => id.to_string(),
	}
}

/// Formats an amount in pounds with two decimals, `£0.00` when absent.
pub fn format_currency(amount: Option<f64>) -> String {
	format!("£{:.2}", amount.unwrap_or(0.0))
}

/// Keeps only the `YYYY-MM-DD` part of a backend timestamp.
pub fn date_part(timestamp: Option<&str>) -> &str {
	match timestamp {
		Some(ts) => match ts.char_indices().nth(10) {
			Some((end, _)) => &ts[..end],
			None => ts,
		},
		None => "",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_id() {
		assert_eq!(truncate_id("1234"), "1234");
		assert_eq!(truncate_id("12345678"), "12345678");
		assert_eq!(truncate_id("123456789abc"), "12345678..");
	}

	#[test]
	fn test_format_currency() {
		assert_eq!(format_currency(Some(19.5)), "£19.50");
		assert_eq!(format_currency(None), "£0.00");
	}

	#[test]
	fn test_date_part() {
		assert_eq!(date_part(Some("2025-04-03T10:11:12.000Z")), "2025-04-03");
		assert_eq!(date_part(Some("2025")), "2025");
		assert_eq!(date_part(None), "");
	}
}
