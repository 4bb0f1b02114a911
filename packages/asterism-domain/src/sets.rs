use crate::{
	content::ContentId,
	query::{ContentQuery, QueryMethod},
};

/// The id sets an evaluation works with, derived from a query's pins and isolation list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSets {
	/// Never returned by the ranked phase.
	pub exclude_ids: Vec<ContentId>,
	/// The only ids the ranked phase may return in exclusive mode.
	pub include_ids: Vec<ContentId>,
	/// Fetched first, in pin order.
	pub fixed_to_top_ids: Vec<ContentId>,
}
impl ResolvedSets {
	pub fn is_excluded(&self, id: ContentId) -> bool {
		self.exclude_ids.contains(&id)
	}

	pub fn is_included(&self, id: ContentId) -> bool {
		self.include_ids.contains(&id)
	}
}

/// Reconciles pins with isolation.
///
/// In exclusive mode only isolated pins are shown; in inclusive mode an isolated (hidden) item
/// stays hidden even when pinned. Pinned ids never reach the ranked phase in either mode.
pub fn resolve_sets(query: &ContentQuery) -> ResolvedSets {
	let pinned = &query.fixed;
	let items = &query.isolated;
	let exclude_ids = match query.method {
		QueryMethod::Exclusive => pinned.clone(),
		QueryMethod::Inclusive => {
			let mut ids = pinned.clone();

			ids.extend(items.iter().copied().filter(|id| !pinned.contains(id)));

			ids
		},
	};
	let include_ids = items.iter().copied().filter(|id| !pinned.contains(id)).collect();
	let fixed_to_top_ids = pinned
		.iter()
		.copied()
		.filter(|id| match query.method {
			QueryMethod::Exclusive => items.contains(id),
			QueryMethod::Inclusive => !items.contains(id),
		})
		.collect();

	ResolvedSets { exclude_ids, include_ids, fixed_to_top_ids }
}
