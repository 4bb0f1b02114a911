use std::sync::{Arc, Mutex};

use serde_json::json;
use time::macros::datetime;

use asterism_config::{Config, Preview, Query, Security, Service, Snapshot, Storage, StorageBackend};
use asterism_domain::{
	ContentItem, ContentOrder, ContentQuery, IdFetch, PostType, QueryEdit, QueryMethod, RankedFetch,
	Taxonomy, Term,
	editing::{Visibility, visibility},
};
use asterism_service::{BoxFuture, ContentRepository, Error, PreviewSession, QueryService};
use asterism_storage::snapshot::{ContentSnapshot, SnapshotStore};
use asterism_testkit::fixtures;

fn test_config(max_page_size: Option<u32>, search_debounce_ms: u64) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			backend: StorageBackend::Snapshot,
			postgres: None,
			snapshot: Some(Snapshot { path: "content.json".to_string() }),
		},
		query: Query { max_page_size, ..Query::default() },
		preview: Preview { search_debounce_ms },
		security: Security::default(),
	}
}

fn snapshot_store() -> SnapshotStore {
	let snapshot: ContentSnapshot = serde_json::from_value(fixtures::snapshot_json())
		.expect("Failed to read fixture snapshot.");

	SnapshotStore::new(snapshot)
}

fn service_with(repo: Arc<dyn ContentRepository>) -> QueryService {
	QueryService::new(test_config(None, 0), repo)
}

fn service() -> QueryService {
	service_with(Arc::new(snapshot_store()))
}

fn query(value: serde_json::Value) -> ContentQuery {
	serde_json::from_value(value).expect("Failed to read query.")
}

fn ids(items: &[ContentItem]) -> Vec<u64> {
	items.iter().map(|item| item.id).collect()
}

/// Records every ranked fetch budget and can be told to fail either phase.
struct SpyRepository {
	inner: SnapshotStore,
	fail_ids: bool,
	fail_query: bool,
	ranked_limits: Mutex<Vec<Option<usize>>>,
}
impl SpyRepository {
	fn new() -> Self {
		Self {
			inner: snapshot_store(),
			fail_ids: false,
			fail_query: false,
			ranked_limits: Mutex::new(Vec::new()),
		}
	}

	fn ranked_limits(&self) -> Vec<Option<usize>> {
		self.ranked_limits.lock().expect("Spy lock poisoned.").clone()
	}
}
impl ContentRepository for SpyRepository {
	fn fetch_by_ids<'a>(
		&'a self,
		fetch: IdFetch<'a>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ContentItem>>> {
		if self.fail_ids {
			return Box::pin(async { Err(color_eyre::eyre::eyre!("Pinned fetch is down.")) });
		}

		ContentRepository::fetch_by_ids(&self.inner, fetch)
	}

	fn fetch_by_query<'a>(
		&'a self,
		fetch: RankedFetch<'a>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ContentItem>>> {
		self.ranked_limits.lock().expect("Spy lock poisoned.").push(fetch.limit);

		if self.fail_query {
			return Box::pin(async { Err(color_eyre::eyre::eyre!("Ranked fetch is down.")) });
		}

		ContentRepository::fetch_by_query(&self.inner, fetch)
	}

	fn list_types<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<PostType>>> {
		ContentRepository::list_types(&self.inner)
	}

	fn list_taxonomies<'a>(
		&'a self,
		post_type: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Taxonomy>>> {
		ContentRepository::list_taxonomies(&self.inner, post_type)
	}

	fn list_terms<'a>(
		&'a self,
		taxonomy: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Term>>> {
		ContentRepository::list_terms(&self.inner, taxonomy)
	}
}

#[tokio::test]
async fn inclusive_query_hides_isolated_items() {
	let service = service();
	let query = query(json!({
		"postType": ["post"],
		"method": "inclusive",
		"isolated": [5],
		"fixed": [],
		"limit": 3,
		"order": "newest",
	}));

	assert_eq!(ids(&service.evaluate(&query).await), vec![4, 3, 2]);
}

#[tokio::test]
async fn exclusive_query_puts_isolated_pins_first() {
	let service = service();
	let query = query(json!({
		"postType": ["post"],
		"method": "exclusive",
		"isolated": [2, 4],
		"fixed": [4],
		"limit": 0,
	}));

	assert_eq!(ids(&service.evaluate(&query).await), vec![4, 2]);
}

#[tokio::test]
async fn pinned_items_keep_pin_order_under_every_order() {
	let service = service();

	for order in ["newest", "oldest", "az", "za", "random"] {
		let query = query(json!({
			"postType": ["page"],
			"fixed": [20, 10],
			"limit": 2,
			"order": order,
		}));

		assert_eq!(ids(&service.evaluate(&query).await), vec![20, 10], "Order {order}.");
	}
}

#[tokio::test]
async fn search_raises_the_ranked_budget() {
	let spy = Arc::new(SpyRepository::new());
	let service = service_with(spy.clone());
	let bounded = query(json!({ "postType": ["post", "page"], "limit": 5, "search": "hello" }));
	let unbounded = query(json!({ "postType": ["post", "page"], "search": "hello" }));

	assert_eq!(bounded.limit, 50);
	assert_eq!(unbounded.limit, 0);

	let found = service.evaluate(&bounded).await;

	service.evaluate(&unbounded).await;

	assert_eq!(spy.ranked_limits(), vec![Some(50), None]);
	assert_eq!(ids(&found), vec![5, 3, 30]);
}

#[tokio::test]
async fn taxonomy_filters_skip_pinned_items() {
	let service = service();
	let query = query(json!({
		"postType": ["post"],
		"fixed": [1],
		"filters": [
			{ "postType": "post", "key": "category", "comparator": "!=", "value": "3" },
		],
	}));

	assert_eq!(ids(&service.evaluate(&query).await), vec![1, 4, 2]);
}

#[tokio::test]
async fn inclusive_pins_that_are_isolated_stay_hidden() {
	let service = service();
	let query = query(json!({ "postType": ["post"], "isolated": [3], "fixed": [3, 1] }));

	assert_eq!(ids(&service.evaluate(&query).await), vec![1, 5, 4, 2]);
}

#[tokio::test]
async fn exclusive_query_with_only_pins_skips_the_pool() {
	let spy = Arc::new(SpyRepository::new());
	let service = service_with(spy.clone());
	let query = query(json!({
		"postType": ["post"],
		"method": "exclusive",
		"isolated": [4],
		"fixed": [4],
	}));

	assert_eq!(ids(&service.evaluate(&query).await), vec![4]);
	assert!(spy.ranked_limits().is_empty());
}

#[tokio::test]
async fn exhausted_budget_skips_the_pool() {
	let spy = Arc::new(SpyRepository::new());
	let service = service_with(spy.clone());
	let query = query(json!({ "postType": ["post"], "fixed": [2, 3], "limit": 2 }));

	assert_eq!(ids(&service.evaluate(&query).await), vec![2, 3]);
	assert!(spy.ranked_limits().is_empty());
}

#[tokio::test]
async fn failing_phases_degrade_to_partial_results() {
	let query = query(json!({ "postType": ["post"], "fixed": [2], "limit": 3 }));
	let pinned_down = SpyRepository { fail_ids: true, ..SpyRepository::new() };
	let pool_down = SpyRepository { fail_query: true, ..SpyRepository::new() };

	assert_eq!(ids(&service_with(Arc::new(pinned_down)).evaluate(&query).await), vec![5, 4, 3]);
	assert_eq!(ids(&service_with(Arc::new(pool_down)).evaluate(&query).await), vec![2]);
}

#[tokio::test]
async fn page_size_cap_bounds_unbounded_queries() {
	let service = QueryService::new(test_config(Some(2), 0), Arc::new(snapshot_store()));
	let query = query(json!({ "postType": ["post"] }));

	assert_eq!(ids(&service.evaluate(&query).await), vec![5, 4]);
	assert_eq!(ids(&service.evaluate_local(&query).await), vec![5, 4]);
}

#[tokio::test]
async fn evaluation_is_deterministic_without_duplicates() {
	let service = service();
	let query = query(json!({
		"postType": ["post", "page", "event"],
		"order": "random",
		"seed": 17,
		"fixed": [30, 2],
		"limit": 6,
	}));
	let first = ids(&service.evaluate(&query).await);
	let second = ids(&service.evaluate(&query).await);
	let mut unique = first.clone();

	unique.sort_unstable();
	unique.dedup();

	assert_eq!(first, second);
	assert_eq!(first.len(), 6);
	assert_eq!(unique.len(), first.len());
	assert_eq!(&first[..2], &[30, 2]);
}

#[tokio::test]
async fn parent_category_filters_reach_child_terms() {
	let mut snapshot: ContentSnapshot = serde_json::from_value(fixtures::snapshot_json())
		.expect("Failed to read fixture snapshot.");

	snapshot.items.push(fixtures::item(
		6,
		"post",
		"Zeta advisory",
		datetime!(2024-01-07 09:00 UTC),
		&[("category", &[fixtures::CATEGORY_SECURITY])],
	));

	let service = service_with(Arc::new(SnapshotStore::new(snapshot)));
	let news = query(json!({
		"postType": ["post"],
		"filters": [{ "postType": "post", "key": "category", "comparator": "=", "value": 3 }],
	}));
	let not_news = query(json!({
		"postType": ["post"],
		"filters": [{ "postType": "post", "key": "category", "comparator": "!=", "value": 3 }],
	}));
	let security = query(json!({
		"postType": ["post"],
		"filters": [{ "postType": "post", "key": "category", "comparator": "=", "value": 5 }],
	}));

	let cases = [(&news, vec![6, 5, 3, 1]), (&not_news, vec![4, 2]), (&security, vec![6])];

	for (query, expected) in cases {
		assert_eq!(ids(&service.evaluate(query).await), expected);
		assert_eq!(ids(&service.evaluate_concurrent(query).await), expected);
		assert_eq!(ids(&service.evaluate_local(query).await), expected);
	}
}

#[tokio::test]
async fn every_path_agrees() {
	let service = service();
	let filter_sets = [
		json!([]),
		json!([{ "postType": "post", "key": "category", "comparator": "=", "value": 4 }]),
		json!([
			{ "postType": "post", "key": "category", "comparator": "!=", "value": 3 },
			{ "postType": "event", "key": "venue", "comparator": "=", "value": 11 },
		]),
	];
	let mut checked = 0;

	for method in ["inclusive", "exclusive"] {
		for order in ["newest", "oldest", "az", "za", "random"] {
			for (isolated, fixed) in
				[(json!([]), json!([])), (json!([2, 10, 40]), json!([10, 5])), (json!([3]), json!([3]))]
			{
				for limit in [0, 1, 3] {
					for filters in &filter_sets {
						for search in [json!(null), json!("hello")] {
							let query = query(json!({
								"postType": ["post", "page", "event"],
								"method": method,
								"order": order,
								"isolated": isolated,
								"fixed": fixed,
								"limit": limit,
								"filters": filters,
								"search": search,
								"seed": 3,
							}));
							let server = ids(&service.evaluate(&query).await);
							let concurrent = ids(&service.evaluate_concurrent(&query).await);
							let local = ids(&service.evaluate_local(&query).await);

							assert_eq!(server, concurrent, "Concurrent path diverged for {query:?}.");
							assert_eq!(server, local, "Local path diverged for {query:?}.");

							if query.limit > 0 {
								assert!(server.len() <= query.limit as usize);
							}
							if query.method == QueryMethod::Exclusive {
								assert!(server.iter().all(|id| query.isolated.contains(id)));
							} else {
								assert!(server.iter().all(|id| !query.isolated.contains(id)));
							}

							checked += 1;
						}
					}
				}
			}
		}
	}

	assert_eq!(checked, 2 * 5 * 3 * 3 * 3 * 2);
}

#[tokio::test]
async fn newer_refresh_wins() {
	let service = Arc::new(QueryService::new(test_config(None, 20), Arc::new(snapshot_store())));
	let session = PreviewSession::new(service);
	let query = query(json!({ "postType": ["post"], "limit": 2, "order": "az" }));
	let (stale, fresh) = tokio::join!(
		session.refresh(&query, Some("alpha")),
		session.refresh(&query, Some("hello"))
	);

	assert!(stale.is_none());

	let fresh = fresh.expect("Latest refresh must complete.");

	assert_eq!(fresh.generation, 2);
	assert_eq!(ids(&fresh.preview), vec![5, 3]);
	assert_eq!(ids(&fresh.render), vec![1, 2]);
	assert_eq!(session.current_generation(), 2);
}

#[tokio::test]
async fn editor_preview_lists_hidden_items_too() {
	let service = Arc::new(QueryService::new(test_config(None, 0), Arc::new(snapshot_store())));
	let session = PreviewSession::new(service);
	let query = query(json!({ "postType": ["post"], "method": "exclusive", "isolated": [2] }));
	let result = session.refresh(&query, None).await.expect("Refresh must complete.");

	assert_eq!(ids(&result.preview), vec![5, 4, 3, 2, 1]);
	assert_eq!(ids(&result.render), vec![2]);
}

#[tokio::test]
async fn session_edits_refresh_the_render() {
	let service = Arc::new(QueryService::new(test_config(None, 0), Arc::new(snapshot_store())));
	let session = PreviewSession::new(service);
	let query = query(json!({ "postType": ["post"], "limit": 3 }));
	let (pinned, result) = session.edit(&query, QueryEdit::ToggleFixed(1), None).await;
	let result = result.expect("Refresh must complete.");

	assert_eq!(pinned.fixed, vec![1]);
	assert_eq!(ids(&result.render), vec![1, 5, 4]);

	let (hidden, result) = session.edit(&pinned, QueryEdit::ToggleIsolation(5), None).await;
	let result = result.expect("Refresh must complete.");

	assert_eq!(visibility(&hidden, 5), Visibility::Hidden);
	assert_eq!(ids(&result.preview), vec![1, 5, 4]);
	assert_eq!(ids(&result.render), vec![1, 4, 3]);
	assert_eq!(result.generation, 2);
}

#[tokio::test]
async fn catalogue_lookups_pass_through() {
	let service = service();
	let types = service.list_types().await.expect("Types must load.");
	let taxonomies = service.list_taxonomies(Some(" event ")).await.expect("Taxonomies.");
	let terms = service.list_terms("post_tag").await.expect("Terms must load.");

	assert_eq!(types.len(), 3);
	assert_eq!(taxonomies.iter().map(|value| value.slug.as_str()).collect::<Vec<_>>(), ["venue"]);
	assert_eq!(terms.iter().map(|value| value.id).collect::<Vec<_>>(), [fixtures::TAG_RUST]);
	assert!(matches!(service.list_terms("  ").await, Err(Error::InvalidRequest { .. })));
}

#[test]
fn fixture_orders_match_expectations() {
	let mut items = fixtures::items();

	items.retain(|item| item.post_type == "post");
	asterism_domain::sort_items(&mut items, ContentOrder::Newest, 0);

	assert_eq!(ids(&items), vec![5, 4, 3, 2, 1]);
}
