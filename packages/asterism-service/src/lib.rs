pub mod catalogue;
pub mod executor;
pub mod preview;
pub mod session;

mod error;

pub use error::{Error, Result};
pub use executor::{QueryPlan, execute, execute_concurrent, merge};
pub use preview::{execute_local, rank_locally};
pub use session::{PreviewResult, PreviewSession};

use std::{future::Future, pin::Pin, sync::Arc};

use asterism_config::Config;
use asterism_domain::{
	ContentItem, ContentQuery, IdFetch, NormalizeOptions, PostType, RankedFetch, RawContentQuery,
	Taxonomy, Term,
};
use asterism_storage::{db::Db, queries, snapshot::SnapshotStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Where content comes from. Implementations must honour the predicates of [`IdFetch`] and
/// [`RankedFetch`] exactly, since the server and preview paths rely on them agreeing.
pub trait ContentRepository
where
	Self: Send + Sync,
{
	fn fetch_by_ids<'a>(
		&'a self,
		fetch: IdFetch<'a>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ContentItem>>>;

	fn fetch_by_query<'a>(
		&'a self,
		fetch: RankedFetch<'a>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ContentItem>>>;

	fn list_types<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<PostType>>>;

	fn list_taxonomies<'a>(
		&'a self,
		post_type: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Taxonomy>>>;

	fn list_terms<'a>(
		&'a self,
		taxonomy: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Term>>>;
}

pub struct QueryService {
	pub cfg: Config,
	pub repo: Arc<dyn ContentRepository>,
}
impl QueryService {
	pub fn new(cfg: Config, repo: Arc<dyn ContentRepository>) -> Self {
		Self { cfg, repo }
	}

	pub fn normalize_options(&self) -> NormalizeOptions {
		NormalizeOptions::from_config(&self.cfg.query)
	}

	pub fn normalize(&self, raw: RawContentQuery) -> ContentQuery {
		asterism_domain::normalize(raw, &self.normalize_options())
	}

	/// Like [`QueryService::normalize`], with every field set in `fixed_value` replacing the one
	/// in `raw`. Editors use it for attributes a block locks.
	pub fn normalize_fixed(
		&self,
		raw: RawContentQuery,
		fixed_value: &RawContentQuery,
	) -> ContentQuery {
		self.normalize(asterism_domain::merge_overrides(raw, fixed_value))
	}

	/// Resolves the query and widens its taxonomy conditions to child terms. A taxonomy whose
	/// terms cannot be listed keeps its conditions on the named terms only.
	pub async fn plan(&self, query: ContentQuery) -> QueryPlan {
		let mut plan = QueryPlan::new(query, self.cfg.query.max_page_size);

		for taxonomy in plan.clause.taxonomies() {
			match self.repo.list_terms(&taxonomy).await {
				Ok(terms) => plan.clause.expand_children(&terms),
				Err(err) => tracing::warn!(
					error = %err,
					taxonomy = %taxonomy,
					"Term listing failed. Filtering without child terms."
				),
			}
		}

		plan
	}

	/// The authoritative path: both phases, one after the other.
	pub async fn evaluate(&self, query: &ContentQuery) -> Vec<ContentItem> {
		let plan = self.plan(query.clone()).await;

		executor::execute(self.repo.as_ref(), &plan).await
	}

	/// Both phases issued at once.
	pub async fn evaluate_concurrent(&self, query: &ContentQuery) -> Vec<ContentItem> {
		let plan = self.plan(query.clone()).await;

		executor::execute_concurrent(self.repo.as_ref(), &plan).await
	}

	/// One unfiltered fetch, resolved in memory.
	pub async fn evaluate_local(&self, query: &ContentQuery) -> Vec<ContentItem> {
		let plan = self.plan(query.clone()).await;

		preview::execute_local(self.repo.as_ref(), &plan).await
	}
}

impl ContentRepository for Db {
	fn fetch_by_ids<'a>(
		&'a self,
		fetch: IdFetch<'a>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ContentItem>>> {
		Box::pin(async move { Ok(queries::fetch_items_by_ids(self, &fetch).await?) })
	}

	fn fetch_by_query<'a>(
		&'a self,
		fetch: RankedFetch<'a>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ContentItem>>> {
		Box::pin(async move { Ok(queries::fetch_items_by_query(self, &fetch).await?) })
	}

	fn list_types<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<PostType>>> {
		Box::pin(async move { Ok(queries::list_post_types(self).await?) })
	}

	fn list_taxonomies<'a>(
		&'a self,
		post_type: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Taxonomy>>> {
		Box::pin(async move { Ok(queries::list_taxonomies(self, post_type).await?) })
	}

	fn list_terms<'a>(
		&'a self,
		taxonomy: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Term>>> {
		Box::pin(async move { Ok(queries::list_terms(self, taxonomy).await?) })
	}
}

impl ContentRepository for SnapshotStore {
	fn fetch_by_ids<'a>(
		&'a self,
		fetch: IdFetch<'a>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ContentItem>>> {
		let items = SnapshotStore::fetch_by_ids(self, &fetch);

		Box::pin(async move { Ok(items) })
	}

	fn fetch_by_query<'a>(
		&'a self,
		fetch: RankedFetch<'a>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ContentItem>>> {
		let items = SnapshotStore::fetch_by_query(self, &fetch);

		Box::pin(async move { Ok(items) })
	}

	fn list_types<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<PostType>>> {
		let types = SnapshotStore::list_types(self);

		Box::pin(async move { Ok(types) })
	}

	fn list_taxonomies<'a>(
		&'a self,
		post_type: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Taxonomy>>> {
		let taxonomies = SnapshotStore::list_taxonomies(self, post_type);

		Box::pin(async move { Ok(taxonomies) })
	}

	fn list_terms<'a>(
		&'a self,
		taxonomy: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Term>>> {
		let terms = SnapshotStore::list_terms(self, taxonomy);

		Box::pin(async move { Ok(terms) })
	}
}
