//! Arguments of the two content repository fetches, with the in-memory predicates every adapter
//! must agree with.

use crate::{
	content::{ContentId, ContentItem},
	filter::TaxonomyClause,
	order,
	query::ContentOrder,
};

/// Fetch of explicitly named items. Taxonomy filters never apply here.
#[derive(Debug, Clone, Copy)]
pub struct IdFetch<'a> {
	pub post_types: &'a [String],
	pub ids: &'a [ContentId],
	/// Return items in the order of `ids` instead of by id.
	pub preserve_order: bool,
	pub search: Option<&'a str>,
}
impl IdFetch<'_> {
	pub fn matches(&self, item: &ContentItem) -> bool {
		self.post_types.contains(&item.post_type)
			&& self.ids.contains(&item.id)
			&& self.search.is_none_or(|search| item.matches_search(search))
	}

	/// Filters and orders a candidate list the way a repository must.
	pub fn apply<'i, I>(&self, candidates: I) -> Vec<ContentItem>
	where
		I: IntoIterator<Item = &'i ContentItem>,
	{
		let mut items: Vec<ContentItem> =
			candidates.into_iter().filter(|item| self.matches(item)).cloned().collect();

		if self.preserve_order {
			items.sort_by_key(|item| self.ids.iter().position(|id| *id == item.id));
		} else {
			items.sort_by_key(|item| item.id);
		}

		items
	}
}

/// Fetch of the ranked pool.
#[derive(Debug, Clone, Copy)]
pub struct RankedFetch<'a> {
	pub post_types: &'a [String],
	pub clause: &'a TaxonomyClause,
	/// When set, only these ids may be returned.
	pub include_ids: Option<&'a [ContentId]>,
	pub exclude_ids: &'a [ContentId],
	pub order: ContentOrder,
	pub seed: u64,
	/// `None` is unbounded.
	pub limit: Option<usize>,
	pub search: Option<&'a str>,
}
impl RankedFetch<'_> {
	pub fn matches(&self, item: &ContentItem) -> bool {
		self.post_types.contains(&item.post_type)
			&& !self.exclude_ids.contains(&item.id)
			&& self.include_ids.is_none_or(|ids| ids.contains(&item.id))
			&& self.clause.matches(item)
			&& self.search.is_none_or(|search| item.matches_search(search))
	}

	pub fn apply<'i, I>(&self, candidates: I) -> Vec<ContentItem>
	where
		I: IntoIterator<Item = &'i ContentItem>,
	{
		let mut items: Vec<ContentItem> =
			candidates.into_iter().filter(|item| self.matches(item)).cloned().collect();

		order::sort_items(&mut items, self.order, self.seed);

		if let Some(limit) = self.limit {
			items.truncate(limit);
		}

		items
	}
}
