//! Preview evaluation over a single unfiltered fetch.
//!
//! The candidate list already carries the query's order, post types and search, so resolving the
//! plan in memory gives the same sequence as the two-phase path.

use asterism_domain::{ContentItem, RankedFetch, TaxonomyClause};

use crate::{ContentRepository, executor::QueryPlan, merge};

pub async fn execute_local(repo: &dyn ContentRepository, plan: &QueryPlan) -> Vec<ContentItem> {
	let unfiltered = TaxonomyClause::default();
	let fetch = RankedFetch {
		post_types: &plan.query.post_types,
		clause: &unfiltered,
		include_ids: None,
		exclude_ids: &[],
		order: plan.query.order,
		seed: plan.query.seed,
		limit: None,
		search: plan.query.search_term(),
	};

	match repo.fetch_by_query(fetch).await {
		Ok(candidates) => rank_locally(&candidates, plan),
		Err(err) => {
			tracing::warn!(error = %err, "Preview candidate fetch failed.");

			Vec::new()
		},
	}
}

/// Resolves a plan against candidates that are already in query order.
pub fn rank_locally(candidates: &[ContentItem], plan: &QueryPlan) -> Vec<ContentItem> {
	let fixed: Vec<ContentItem> = plan
		.sets
		.fixed_to_top_ids
		.iter()
		.filter_map(|id| candidates.iter().find(|item| item.id == *id))
		.cloned()
		.collect();
	let remaining = plan.remaining(fixed.len());
	let ranked = if remaining == Some(0) || !plan.has_ranked_pool() {
		Vec::new()
	} else {
		let pool = plan.ranked_fetch(remaining);

		candidates
			.iter()
			.filter(|item| pool.matches(item))
			.take(remaining.unwrap_or(usize::MAX))
			.cloned()
			.collect()
	};

	merge(fixed, ranked, plan.limit)
}
