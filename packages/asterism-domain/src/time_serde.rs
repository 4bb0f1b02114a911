//! Serde helpers for content timestamps.
//!
//! Output is always RFC 3339. Input also accepts the offset-less `YYYY-MM-DDTHH:MM:SS` form that
//! WordPress exports for `date_gmt`, read as UTC.

use serde::{Deserialize, Deserializer, Serializer};
use time::{
	OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
	macros::format_description,
};

pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;

	parse(&raw).map_err(serde::de::Error::custom)
}

pub fn parse(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
	let trimmed = raw.trim();

	match OffsetDateTime::parse(trimmed, &Rfc3339) {
		Ok(value) => Ok(value),
		Err(err) => {
			let naive = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

			PrimitiveDateTime::parse(trimmed, naive)
				.map(PrimitiveDateTime::assume_utc)
				.map_err(|_| err)
		},
	}
}
