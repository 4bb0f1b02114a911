//! Query normalization.
//!
//! Queries are often built incrementally by an editor, so every malformed piece is defaulted or
//! dropped instead of rejected.

use serde_json::Value;

use crate::{
	content::ContentId,
	query::{
		Comparator, ContentOrder, ContentQuery, OneOrMany, QueryMethod, RawContentQuery,
		RawTaxonomyFilter, TaxonomyFilter,
	},
};

pub const DEFAULT_POST_TYPE: &str = "page";
pub const DEFAULT_SEARCH_LIMIT_FLOOR: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
	pub default_post_types: Vec<String>,
	pub default_limit: u32,
	pub search_limit_floor: u32,
	pub default_method: QueryMethod,
}
impl NormalizeOptions {
	pub fn from_config(cfg: &asterism_config::Query) -> Self {
		let default_post_types = if cfg.default_post_types.is_empty() {
			vec![DEFAULT_POST_TYPE.to_string()]
		} else {
			cfg.default_post_types.clone()
		};

		Self {
			default_post_types,
			default_limit: cfg.default_limit,
			search_limit_floor: cfg.search_limit_floor,
			default_method: QueryMethod::Inclusive,
		}
	}

	/// Content pickers select items rather than build a feed, so they start out exclusive.
	pub fn picker(mut self) -> Self {
		self.default_method = QueryMethod::Exclusive;

		self
	}
}
impl Default for NormalizeOptions {
	fn default() -> Self {
		Self {
			default_post_types: vec![DEFAULT_POST_TYPE.to_string()],
			default_limit: 0,
			search_limit_floor: DEFAULT_SEARCH_LIMIT_FLOOR,
			default_method: QueryMethod::Inclusive,
		}
	}
}

pub fn normalize(raw: RawContentQuery, options: &NormalizeOptions) -> ContentQuery {
	let post_types = normalize_post_types(raw.post_type, options);
	let method =
		raw.method.as_deref().and_then(QueryMethod::parse).unwrap_or(options.default_method);
	let order = raw.order.as_deref().and_then(ContentOrder::parse).unwrap_or_default();
	let search = raw.search.map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
	let mut limit = raw
		.limit
		.as_ref()
		.and_then(parse_u64)
		.map(|value| u32::try_from(value).unwrap_or(u32::MAX))
		.unwrap_or(options.default_limit);
	let isolated = normalize_ids(raw.isolated);
	let mut fixed = normalize_ids(raw.fixed);
	let filters = raw
		.filters
		.map(OneOrMany::into_vec)
		.unwrap_or_default()
		.into_iter()
		.filter_map(normalize_filter)
		.collect();
	let seed = raw.seed.as_ref().and_then(parse_u64).unwrap_or(0);

	if search.is_some() {
		fixed.clear();

		limit = search_limit(limit, options.search_limit_floor);
	}

	ContentQuery { post_types, method, order, limit, isolated, fixed, filters, search, seed }
}

/// Field-by-field overlay: every field set in `overrides` replaces the one in `raw`.
pub fn merge_overrides(raw: RawContentQuery, overrides: &RawContentQuery) -> RawContentQuery {
	RawContentQuery {
		post_type: overrides.post_type.clone().or(raw.post_type),
		method: overrides.method.clone().or(raw.method),
		order: overrides.order.clone().or(raw.order),
		limit: overrides.limit.clone().or(raw.limit),
		isolated: overrides.isolated.clone().or(raw.isolated),
		fixed: overrides.fixed.clone().or(raw.fixed),
		filters: overrides.filters.clone().or(raw.filters),
		search: overrides.search.clone().or(raw.search),
		seed: overrides.seed.clone().or(raw.seed),
	}
}

/// Effective limit while a search is active. Zero stays unbounded.
pub fn search_limit(limit: u32, floor: u32) -> u32 {
	if limit == 0 { 0 } else { limit.max(floor) }
}

fn normalize_post_types(
	raw: Option<OneOrMany<String>>,
	options: &NormalizeOptions,
) -> Vec<String> {
	let mut post_types: Vec<String> = Vec::new();

	for value in raw.map(OneOrMany::into_vec).unwrap_or_default() {
		for part in value.split(',') {
			let part = part.trim();

			if !part.is_empty() && !post_types.iter().any(|existing| existing == part) {
				post_types.push(part.to_string());
			}
		}
	}

	if post_types.is_empty() {
		return options.default_post_types.clone();
	}

	post_types
}

fn normalize_ids(raw: Option<OneOrMany<Value>>) -> Vec<ContentId> {
	let mut ids: Vec<ContentId> = Vec::new();
	let mut push = |id: ContentId| {
		if id != 0 && !ids.contains(&id) {
			ids.push(id);
		}
	};

	for value in raw.map(OneOrMany::into_vec).unwrap_or_default() {
		match &value {
			Value::String(text) =>
				for part in text.split(',') {
					if let Ok(id) = part.trim().parse::<ContentId>() {
						push(id);
					}
				},
			other =>
				if let Some(id) = parse_u64(other) {
					push(id);
				},
		}
	}

	ids
}

fn normalize_filter(raw: RawTaxonomyFilter) -> Option<TaxonomyFilter> {
	let taxonomy = raw.key.as_deref().map(str::trim).filter(|value| !value.is_empty())?;
	let term = raw.value.as_ref().and_then(parse_u64)?;
	let comparator = match raw.comparator.as_deref() {
		None => Comparator::Eq,
		Some(value) => Comparator::parse(value)?,
	};
	let post_type = raw
		.post_type
		.as_deref()
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.map(str::to_string);

	Some(TaxonomyFilter {
		post_type,
		taxonomy: taxonomy.to_string(),
		comparator,
		term,
		key_label: raw.key_label,
		value_label: raw.value_label,
	})
}

fn parse_u64(value: &Value) -> Option<u64> {
	match value {
		Value::Number(number) => number.as_u64().or_else(|| {
			number
				.as_f64()
				.filter(|value| *value >= 0.0 && value.fract() == 0.0)
				.map(|value| value as u64)
		}),
		Value::String(text) => text.trim().parse().ok(),
		_ => None,
	}
}
