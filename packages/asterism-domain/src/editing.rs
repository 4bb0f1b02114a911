//! Edits an editor applies to a query. Each edit returns a new query and leaves the input alone.
//!
//! [`QueryEdit`] names one action so a preview session can apply it and refresh in one step.
//! The free functions and labels are also the surface a block editor drives directly.

use crate::{
	content::ContentId,
	query::{ContentQuery, QueryMethod, TaxonomyFilter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
	Shown,
	Hidden,
}
impl Visibility {
	/// Label of the action that flips this state.
	pub fn action_label(self) -> &'static str {
		match self {
			Self::Shown => "Exclude from results",
			Self::Hidden => "Include in results",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
	Up,
	Down,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEdit {
	ToggleIsolation(ContentId),
	ToggleFixed(ContentId),
	MoveFixed { index: usize, direction: MoveDirection },
	AddFilter(TaxonomyFilter),
	RemoveFilter(usize),
}
impl QueryEdit {
	pub fn apply(self, query: &ContentQuery) -> ContentQuery {
		match self {
			Self::ToggleIsolation(id) => toggle_isolation(query, id),
			Self::ToggleFixed(id) => toggle_fixed(query, id),
			Self::MoveFixed { index, direction } => move_fixed(query, index, direction),
			Self::AddFilter(filter) => add_filter(query, filter),
			Self::RemoveFilter(index) => remove_filter(query, index),
		}
	}
}

/// Whether the isolation list currently lets `id` through.
pub fn visibility(query: &ContentQuery, id: ContentId) -> Visibility {
	match (query.method, query.is_isolated(id)) {
		(QueryMethod::Exclusive, true) | (QueryMethod::Inclusive, false) => Visibility::Shown,
		(QueryMethod::Exclusive, false) | (QueryMethod::Inclusive, true) => Visibility::Hidden,
	}
}

pub fn pin_label(query: &ContentQuery, id: ContentId) -> &'static str {
	if query.is_pinned(id) { "Unpin" } else { "Pin" }
}

pub fn toggle_isolation(query: &ContentQuery, id: ContentId) -> ContentQuery {
	let mut next = query.clone();

	if next.is_isolated(id) {
		next.isolated.retain(|value| *value != id);
	} else {
		next.isolated.push(id);
	}

	next
}

pub fn toggle_fixed(query: &ContentQuery, id: ContentId) -> ContentQuery {
	let mut next = query.clone();

	if next.is_pinned(id) {
		next.fixed.retain(|value| *value != id);
	} else {
		next.fixed.push(id);
	}

	next
}

/// Swaps the pin at `index` with its neighbour. Moves past either end leave the query unchanged.
pub fn move_fixed(query: &ContentQuery, index: usize, direction: MoveDirection) -> ContentQuery {
	let mut next = query.clone();
	let target = match direction {
		MoveDirection::Up => index.checked_sub(1),
		MoveDirection::Down => index.checked_add(1),
	};

	if let Some(target) = target
		&& index < next.fixed.len()
		&& target < next.fixed.len()
	{
		next.fixed.swap(index, target);
	}

	next
}

pub fn add_filter(query: &ContentQuery, filter: TaxonomyFilter) -> ContentQuery {
	let mut next = query.clone();

	next.filters.push(filter);

	next
}

pub fn remove_filter(query: &ContentQuery, index: usize) -> ContentQuery {
	let mut next = query.clone();

	if index < next.filters.len() {
		next.filters.remove(index);
	}

	next
}
