use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

pub type ContentId = u64;
pub type TermId = u64;

/// A single post, page or custom post type entry as returned by a content repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
	pub id: ContentId,
	pub post_type: String,
	pub title: String,
	#[serde(default)]
	pub slug: String,
	#[serde(default)]
	pub content: String,
	#[serde(with = "crate::time_serde")]
	pub published_at: OffsetDateTime,
	/// Term ids keyed by taxonomy slug.
	#[serde(default)]
	pub taxonomy_terms: BTreeMap<String, Vec<TermId>>,
	/// Opaque per-item metadata (custom fields and the like).
	#[serde(default)]
	pub meta: Value,
}
impl ContentItem {
	pub fn has_term(&self, taxonomy: &str, term: TermId) -> bool {
		self.taxonomy_terms.get(taxonomy).map(|terms| terms.contains(&term)).unwrap_or(false)
	}

	/// Case-insensitive substring match against title and body.
	pub fn matches_search(&self, search: &str) -> bool {
		let needle = search.trim().to_lowercase();

		if needle.is_empty() {
			return true;
		}

		self.title.to_lowercase().contains(&needle) || self.content.to_lowercase().contains(&needle)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostType {
	pub slug: String,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
	pub slug: String,
	pub name: String,
	/// Post types this taxonomy is registered for.
	#[serde(default)]
	pub types: Vec<String>,
}
impl Taxonomy {
	pub fn applies_to(&self, post_type: &str) -> bool {
		self.types.iter().any(|value| value == post_type)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
	pub id: TermId,
	pub taxonomy: String,
	pub name: String,
	#[serde(default)]
	pub slug: String,
	/// Parent term in a hierarchical taxonomy.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent: Option<TermId>,
}
