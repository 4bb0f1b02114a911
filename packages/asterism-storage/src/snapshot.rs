//! In-memory content served from a JSON export.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use asterism_domain::{ContentItem, IdFetch, PostType, RankedFetch, Taxonomy, Term};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentSnapshot {
	#[serde(default)]
	pub types: Vec<PostType>,
	#[serde(default)]
	pub taxonomies: Vec<Taxonomy>,
	#[serde(default)]
	pub terms: Vec<Term>,
	#[serde(default)]
	pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
	snapshot: ContentSnapshot,
}
impl SnapshotStore {
	pub fn new(mut snapshot: ContentSnapshot) -> Self {
		let before = snapshot.items.len();

		snapshot.items.sort_by_key(|item| item.id);
		snapshot.items.dedup_by_key(|item| item.id);

		if snapshot.items.len() != before {
			tracing::warn!(
				dropped = before - snapshot.items.len(),
				"Snapshot contains duplicate item ids. Keeping the first of each."
			);
		}

		Self { snapshot }
	}

	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadSnapshot { path: path.to_path_buf(), source: err })?;
		let snapshot: ContentSnapshot = serde_json::from_str(&raw)
			.map_err(|err| Error::ParseSnapshot { path: path.to_path_buf(), source: err })?;

		tracing::info!(
			path = %path.display(),
			items = snapshot.items.len(),
			types = snapshot.types.len(),
			"Loaded content snapshot."
		);

		Ok(Self::new(snapshot))
	}

	pub fn snapshot(&self) -> &ContentSnapshot {
		&self.snapshot
	}

	pub fn fetch_by_ids(&self, fetch: &IdFetch<'_>) -> Vec<ContentItem> {
		fetch.apply(&self.snapshot.items)
	}

	pub fn fetch_by_query(&self, fetch: &RankedFetch<'_>) -> Vec<ContentItem> {
		fetch.apply(&self.snapshot.items)
	}

	pub fn list_types(&self) -> Vec<PostType> {
		let mut types = self.snapshot.types.clone();

		types.sort_by(|a, b| a.slug.cmp(&b.slug));

		types
	}

	pub fn list_taxonomies(&self, post_type: Option<&str>) -> Vec<Taxonomy> {
		let mut taxonomies: Vec<Taxonomy> = self
			.snapshot
			.taxonomies
			.iter()
			.filter(|taxonomy| post_type.is_none_or(|value| taxonomy.applies_to(value)))
			.cloned()
			.collect();

		taxonomies.sort_by(|a, b| a.slug.cmp(&b.slug));

		taxonomies
	}

	pub fn list_terms(&self, taxonomy: &str) -> Vec<Term> {
		let mut terms: Vec<Term> =
			self.snapshot.terms.iter().filter(|term| term.taxonomy == taxonomy).cloned().collect();

		terms.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

		terms
	}
}
