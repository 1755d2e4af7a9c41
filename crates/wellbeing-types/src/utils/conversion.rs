//! Lenient decoders for backend fields.
//!
//! The backend is not consistent about numeric encodings: identifiers arrive
//! as integers or strings and money amounts as numbers or decimal strings.

use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
	Integer(i64),
	Text(String),
}

impl From<IdValue> for String {
	fn from(value: IdValue) -> Self {
		match value {
			IdValue::Integer(n) => n.to_string(),
			IdValue::Text(s) => s,
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberValue {
	Number(f64),
	Text(String),
}

/// Decodes an identifier given either as an integer or a string.
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	IdValue::deserialize(deserializer).map(String::from)
}

/// Optional variant of [`id_string`]; `null` decodes to `None`.
pub fn optional_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<IdValue>::deserialize(deserializer)?.map(String::from))
}

/// Decodes a number given either as a JSON number or a decimal string.
///
/// Empty strings decode to `None`.
pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<NumberValue>::deserialize(deserializer)? {
		None => Ok(None),
		Some(NumberValue::Number(n)) => Ok(Some(n)),
		Some(NumberValue::Text(s)) if s.trim().is_empty() => Ok(None),
		Some(NumberValue::Text(s)) => s
			.trim()
			.parse::<f64>()
			.map(Some)
			.map_err(|e| D::Error::custom(format!("invalid decimal '{}': {}", s, e))),
	}
}

/// Decodes a non-negative count given as a number or a string.
pub fn optional_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	match optional_decimal(deserializer)? {
		None => Ok(None),
		Some(n) if n < 0.0 || n.fract() != 0.0 => {
			Err(D::Error::custom(format!("invalid count: {}", n)))
		},
		Some(n) => Ok(Some(n as u64)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[derive(Deserialize)]
	struct Sample {
		#[serde(deserialize_with = "id_string")]
		id: String,
		#[serde(default, deserialize_with = "optional_decimal")]
		amount: Option<f64>,
		#[serde(default, deserialize_with = "optional_count")]
		count: Option<u64>,
	}

	#[test]
	fn test_mixed_encodings() {
		let sample: Sample =
			serde_json::from_value(json!({"id": 7, "amount": "12.40", "count": "3"})).unwrap();
		assert_eq!(sample.id, "7");
		assert_eq!(sample.amount, Some(12.4));
		assert_eq!(sample.count, Some(3));

		let sample: Sample =
			serde_json::from_value(json!({"id": "ORD-1", "amount": 5, "count": null})).unwrap();
		assert_eq!(sample.id, "ORD-1");
		assert_eq!(sample.amount, Some(5.0));
		assert_eq!(sample.count, None);
	}

	#[test]
	fn test_missing_and_empty_values() {
		let sample: Sample = serde_json::from_value(json!({"id": "x", "amount": ""})).unwrap();
		assert_eq!(sample.amount, None);
		assert_eq!(sample.count, None);
	}

	#[test]
	fn test_invalid_values_are_rejected() {
		assert!(serde_json::from_value::<Sample>(json!({"id": "x", "amount": "abc"})).is_err());
		assert!(serde_json::from_value::<Sample>(json!({"id": "x", "count": 1.5})).is_err());
	}
}
