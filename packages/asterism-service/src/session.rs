//! Editor preview refreshes with last-query-wins semantics.

use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicU64, Ordering},
	},
	time::Duration,
};

use asterism_domain::{ContentItem, ContentQuery, QueryEdit};

use crate::QueryService;

/// The two lists an editor shows: every candidate (for toggling isolation and pins) and what the
/// block will actually render.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewResult {
	pub generation: u64,
	pub preview: Vec<ContentItem>,
	pub render: Vec<ContentItem>,
}

pub struct PreviewSession {
	service: Arc<QueryService>,
	generation: AtomicU64,
	last_search: Mutex<Option<String>>,
}
impl PreviewSession {
	pub fn new(service: Arc<QueryService>) -> Self {
		Self { service, generation: AtomicU64::new(0), last_search: Mutex::new(None) }
	}

	pub fn current_generation(&self) -> u64 {
		self.generation.load(Ordering::SeqCst)
	}

	/// Returns `None` when a later refresh started before this one finished.
	///
	/// A changed search term is debounced first, so typing settles before anything is fetched.
	pub async fn refresh(
		&self,
		query: &ContentQuery,
		search: Option<&str>,
	) -> Option<PreviewResult> {
		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
		let search = search.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string);
		let search_changed = {
			let mut last = self.last_search.lock().unwrap_or_else(|err| err.into_inner());
			let changed = *last != search;

			*last = search.clone();

			changed
		};
		let debounce_ms = self.service.cfg.preview.search_debounce_ms;

		if search_changed && debounce_ms > 0 {
			tokio::time::sleep(Duration::from_millis(debounce_ms)).await;

			if !self.is_current(generation) {
				tracing::debug!(generation, "Preview superseded while debouncing search.");

				return None;
			}
		}

		let preview_query =
			query.editor_preview(search.as_deref(), &self.service.normalize_options());
		let preview = self.service.evaluate(&preview_query).await;

		if !self.is_current(generation) {
			return None;
		}

		let render = self.service.evaluate(query).await;

		if !self.is_current(generation) {
			return None;
		}

		Some(PreviewResult { generation, preview, render })
	}

	/// Applies one editor action and refreshes with the edited query, which is returned either way.
	pub async fn edit(
		&self,
		query: &ContentQuery,
		edit: QueryEdit,
		search: Option<&str>,
	) -> (ContentQuery, Option<PreviewResult>) {
		let next = edit.apply(query);
		let result = self.refresh(&next, search).await;

		(next, result)
	}

	fn is_current(&self, generation: u64) -> bool {
		self.generation.load(Ordering::SeqCst) == generation
	}
}
