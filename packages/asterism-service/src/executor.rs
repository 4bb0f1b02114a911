//! Two-phase query execution: pinned items first, then the ranked pool.

use ahash::AHashSet;

use asterism_domain::{
	ContentId, ContentItem, ContentQuery, IdFetch, QueryMethod, RankedFetch, ResolvedSets,
	TaxonomyClause, compile_filters, resolve_sets,
};

use crate::ContentRepository;

/// Everything an evaluation derives from a normalized query before touching a repository.
#[derive(Debug, Clone)]
pub struct QueryPlan {
	pub query: ContentQuery,
	pub sets: ResolvedSets,
	pub clause: TaxonomyClause,
	/// `None` is unbounded.
	pub limit: Option<usize>,
}
impl QueryPlan {
	/// `max_page_size` caps queries that ask for everything.
	pub fn new(query: ContentQuery, max_page_size: Option<u32>) -> Self {
		let sets = resolve_sets(&query);
		let clause = compile_filters(&query.filters, &query.post_types);
		let limit = match query.limit {
			0 => max_page_size.map(|value| value as usize),
			limit => Some(limit as usize),
		};

		Self { query, sets, clause, limit }
	}

	pub(crate) fn id_fetch(&self) -> IdFetch<'_> {
		IdFetch {
			post_types: &self.query.post_types,
			ids: &self.sets.fixed_to_top_ids,
			preserve_order: true,
			search: self.query.search_term(),
		}
	}

	pub(crate) fn ranked_fetch(&self, limit: Option<usize>) -> RankedFetch<'_> {
		RankedFetch {
			post_types: &self.query.post_types,
			clause: &self.clause,
			include_ids: match self.query.method {
				QueryMethod::Exclusive => Some(self.sets.include_ids.as_slice()),
				QueryMethod::Inclusive => None,
			},
			exclude_ids: &self.sets.exclude_ids,
			order: self.query.order,
			seed: self.query.seed,
			limit,
			search: self.query.search_term(),
		}
	}

	/// Exclusive queries whose isolation list is all pins have no pool to rank.
	pub(crate) fn has_ranked_pool(&self) -> bool {
		!(self.query.method == QueryMethod::Exclusive && self.sets.include_ids.is_empty())
	}

	/// Budget left for the ranked phase after `fixed_count` pinned items.
	pub(crate) fn remaining(&self, fixed_count: usize) -> Option<usize> {
		self.limit.map(|limit| limit.saturating_sub(fixed_count))
	}
}

pub async fn execute(repo: &dyn ContentRepository, plan: &QueryPlan) -> Vec<ContentItem> {
	let fixed = fetch_fixed(repo, plan).await;
	let remaining = plan.remaining(fixed.len());
	let ranked = if remaining == Some(0) || !plan.has_ranked_pool() {
		Vec::new()
	} else {
		fetch_ranked(repo, plan, remaining).await
	};
	let items = merge(fixed, ranked, plan.limit);

	tracing::debug!(
		post_types = ?plan.query.post_types,
		method = plan.query.method.as_str(),
		order = plan.query.order.as_str(),
		pinned = plan.sets.fixed_to_top_ids.len(),
		returned = items.len(),
		"Evaluated content query."
	);

	items
}

/// Issues both phases at once. The ranked phase is budgeted at the full limit since the pinned
/// count is not known yet; [`merge`] trims the surplus.
pub async fn execute_concurrent(
	repo: &dyn ContentRepository,
	plan: &QueryPlan,
) -> Vec<ContentItem> {
	let ranked = async {
		if plan.has_ranked_pool() {
			fetch_ranked(repo, plan, plan.limit).await
		} else {
			Vec::new()
		}
	};
	let (fixed, ranked) = tokio::join!(fetch_fixed(repo, plan), ranked);

	merge(fixed, ranked, plan.limit)
}

/// Pinned items first, then the pool, first occurrence of each id wins.
pub fn merge(
	fixed: Vec<ContentItem>,
	ranked: Vec<ContentItem>,
	limit: Option<usize>,
) -> Vec<ContentItem> {
	let mut seen: AHashSet<ContentId> = AHashSet::new();

	fixed
		.into_iter()
		.chain(ranked)
		.filter(|item| seen.insert(item.id))
		.take(limit.unwrap_or(usize::MAX))
		.collect()
}

async fn fetch_fixed(repo: &dyn ContentRepository, plan: &QueryPlan) -> Vec<ContentItem> {
	if plan.sets.fixed_to_top_ids.is_empty() {
		return Vec::new();
	}

	match repo.fetch_by_ids(plan.id_fetch()).await {
		Ok(items) => items,
		Err(err) => {
			tracing::warn!(
				error = %err,
				ids = ?plan.sets.fixed_to_top_ids,
				"Pinned item fetch failed. Continuing without pinned items."
			);

			Vec::new()
		},
	}
}

async fn fetch_ranked(
	repo: &dyn ContentRepository,
	plan: &QueryPlan,
	limit: Option<usize>,
) -> Vec<ContentItem> {
	match repo.fetch_by_query(plan.ranked_fetch(limit)).await {
		Ok(items) => items,
		Err(err) => {
			tracing::warn!(
				error = %err,
				post_types = ?plan.query.post_types,
				"Ranked pool fetch failed. Continuing with pinned items only."
			);

			Vec::new()
		},
	}
}
