use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
	content::{ContentId, TermId},
	normalize::{self, NormalizeOptions},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMethod {
	/// Show everything except isolated items.
	#[default]
	Inclusive,
	/// Show only isolated items.
	Exclusive,
}
impl QueryMethod {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Inclusive => "inclusive",
			Self::Exclusive => "exclusive",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"inclusive" => Some(Self::Inclusive),
			"exclusive" => Some(Self::Exclusive),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentOrder {
	#[default]
	Newest,
	Oldest,
	Az,
	Za,
	Random,
}
impl ContentOrder {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Newest => "newest",
			Self::Oldest => "oldest",
			Self::Az => "az",
			Self::Za => "za",
			Self::Random => "random",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"newest" => Some(Self::Newest),
			"oldest" => Some(Self::Oldest),
			"az" => Some(Self::Az),
			"za" => Some(Self::Za),
			"random" => Some(Self::Random),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
	#[default]
	#[serde(rename = "=")]
	Eq,
	#[serde(rename = "!=")]
	Neq,
}
impl Comparator {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Eq => "=",
			Self::Neq => "!=",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim() {
			"=" | "==" | "eq" => Some(Self::Eq),
			"!=" | "<>" | "≠" | "neq" => Some(Self::Neq),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyFilter {
	/// `None` applies the filter to every queried post type.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub post_type: Option<String>,
	#[serde(rename = "key")]
	pub taxonomy: String,
	pub comparator: Comparator,
	#[serde(rename = "value")]
	pub term: TermId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key_label: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value_label: Option<String>,
}

/// A fully populated query. Construct one with [`normalize::normalize`] or deserialize it; both
/// go through the same lenient reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawContentQuery")]
pub struct ContentQuery {
	#[serde(rename = "postType")]
	pub post_types: Vec<String>,
	pub method: QueryMethod,
	pub order: ContentOrder,
	pub limit: u32,
	pub isolated: Vec<ContentId>,
	pub fixed: Vec<ContentId>,
	pub filters: Vec<TaxonomyFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub search: Option<String>,
	pub seed: u64,
}
impl ContentQuery {
	pub fn search_term(&self) -> Option<&str> {
		self.search.as_deref()
	}

	pub fn is_searching(&self) -> bool {
		self.search.is_some()
	}

	pub fn is_pinned(&self, id: ContentId) -> bool {
		self.fixed.contains(&id)
	}

	pub fn is_isolated(&self, id: ContentId) -> bool {
		self.isolated.contains(&id)
	}

	/// The query behind the editor's results table: every candidate stays visible so that
	/// isolation can be toggled, and the table search narrows the list.
	pub fn editor_preview(&self, search: Option<&str>, options: &NormalizeOptions) -> Self {
		let raw = RawContentQuery {
			method: Some(QueryMethod::Inclusive.as_str().to_string()),
			isolated: Some(OneOrMany::Many(Vec::new())),
			search: search.map(str::to_string),
			..RawContentQuery::from(self)
		};

		normalize::normalize(raw, options)
	}
}
impl From<RawContentQuery> for ContentQuery {
	fn from(raw: RawContentQuery) -> Self {
		normalize::normalize(raw, &NormalizeOptions::default())
	}
}

/// A value that may arrive as a scalar or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
	Many(Vec<T>),
	One(T),
}
impl<T> OneOrMany<T> {
	pub fn into_vec(self) -> Vec<T> {
		match self {
			Self::One(value) => vec![value],
			Self::Many(values) => values,
		}
	}
}

/// The query as it arrives from block attributes, a query string or an editor. Every field is
/// optional and loosely typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContentQuery {
	#[serde(default, alias = "postTypes", skip_serializing_if = "Option::is_none")]
	pub post_type: Option<OneOrMany<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub method: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub order: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub limit: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub isolated: Option<OneOrMany<Value>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fixed: Option<OneOrMany<Value>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filters: Option<OneOrMany<RawTaxonomyFilter>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub search: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub seed: Option<Value>,
}
impl From<&ContentQuery> for RawContentQuery {
	fn from(query: &ContentQuery) -> Self {
		Self {
			post_type: Some(OneOrMany::Many(query.post_types.clone())),
			method: Some(query.method.as_str().to_string()),
			order: Some(query.order.as_str().to_string()),
			limit: Some(Value::from(query.limit)),
			isolated: Some(OneOrMany::Many(ids_to_values(&query.isolated))),
			fixed: Some(OneOrMany::Many(ids_to_values(&query.fixed))),
			filters: Some(OneOrMany::Many(
				query.filters.iter().map(RawTaxonomyFilter::from).collect(),
			)),
			search: query.search.clone(),
			seed: Some(Value::from(query.seed)),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTaxonomyFilter {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub post_type: Option<String>,
	#[serde(default, alias = "taxonomy", skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
	#[serde(default, alias = "by", skip_serializing_if = "Option::is_none")]
	pub comparator: Option<String>,
	#[serde(default, alias = "term", skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key_label: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value_label: Option<String>,
}
impl From<&TaxonomyFilter> for RawTaxonomyFilter {
	fn from(filter: &TaxonomyFilter) -> Self {
		Self {
			post_type: filter.post_type.clone(),
			key: Some(filter.taxonomy.clone()),
			comparator: Some(filter.comparator.as_str().to_string()),
			value: Some(Value::from(filter.term)),
			key_label: filter.key_label.clone(),
			value_label: filter.value_label.clone(),
		}
	}
}

fn ids_to_values(ids: &[ContentId]) -> Vec<Value> {
	ids.iter().copied().map(Value::from).collect()
}
