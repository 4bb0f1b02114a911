//! Taxonomy filter compilation.
//!
//! Filters compile into one clause per query: a disjunction of per-post-type groups, each group
//! a conjunction of term conditions. Items of a queried type without a group pass unconditionally.
//! Storage adapters render the same clause as SQL, and the preview path evaluates it in memory.
//!
//! A condition on a term also covers its descendants once the clause has been expanded against
//! the taxonomy's terms with [`TaxonomyClause::expand_children`].

use std::collections::VecDeque;

use crate::{
	content::{ContentItem, Term, TermId},
	query::{Comparator, TaxonomyFilter},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermCondition {
	pub taxonomy: String,
	pub comparator: Comparator,
	pub term: TermId,
	/// `term` followed by every known descendant.
	pub terms: Vec<TermId>,
}
impl TermCondition {
	pub fn new(taxonomy: String, comparator: Comparator, term: TermId) -> Self {
		Self { taxonomy, comparator, term, terms: vec![term] }
	}

	pub fn matches(&self, item: &ContentItem) -> bool {
		let has_term = self.terms.iter().any(|term| item.has_term(&self.taxonomy, *term));

		match self.comparator {
			Comparator::Eq => has_term,
			Comparator::Neq => !has_term,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGroup {
	pub post_type: String,
	pub conditions: Vec<TermCondition>,
}
impl FilterGroup {
	pub fn matches(&self, item: &ContentItem) -> bool {
		item.post_type == self.post_type
			&& self.conditions.iter().all(|condition| condition.matches(item))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyClause {
	pub groups: Vec<FilterGroup>,
}
impl TaxonomyClause {
	pub fn is_noop(&self) -> bool {
		self.groups.is_empty()
	}

	pub fn group_for(&self, post_type: &str) -> Option<&FilterGroup> {
		self.groups.iter().find(|group| group.post_type == post_type)
	}

	/// Post types that carry at least one condition.
	pub fn filtered_post_types(&self) -> Vec<String> {
		self.groups.iter().map(|group| group.post_type.clone()).collect()
	}

	/// Distinct taxonomies named by any condition.
	pub fn taxonomies(&self) -> Vec<String> {
		let mut taxonomies: Vec<String> = Vec::new();

		for condition in self.groups.iter().flat_map(|group| &group.conditions) {
			if !taxonomies.contains(&condition.taxonomy) {
				taxonomies.push(condition.taxonomy.clone());
			}
		}

		taxonomies
	}

	/// Widens every condition on `catalogue`'s taxonomy to the term's descendants.
	pub fn expand_children(&mut self, catalogue: &[Term]) {
		for condition in self.groups.iter_mut().flat_map(|group| &mut group.conditions) {
			let terms: Vec<&Term> =
				catalogue.iter().filter(|term| term.taxonomy == condition.taxonomy).collect();

			if !terms.is_empty() {
				condition.terms = descendants(&terms, condition.term);
			}
		}
	}

	pub fn matches(&self, item: &ContentItem) -> bool {
		match self.group_for(&item.post_type) {
			Some(group) => group.matches(item),
			None => true,
		}
	}
}

/// `root` and everything below it, breadth first. Parent cycles are cut.
pub fn descendants(terms: &[&Term], root: TermId) -> Vec<TermId> {
	let mut found = vec![root];
	let mut queue = VecDeque::from([root]);

	while let Some(parent) = queue.pop_front() {
		for term in terms.iter().filter(|term| term.parent == Some(parent)) {
			if !found.contains(&term.id) {
				found.push(term.id);
				queue.push_back(term.id);
			}
		}
	}

	found
}

pub fn compile_filters(filters: &[TaxonomyFilter], post_types: &[String]) -> TaxonomyClause {
	let mut groups: Vec<FilterGroup> = Vec::new();

	for post_type in post_types {
		let conditions: Vec<TermCondition> = filters
			.iter()
			.filter(|filter| filter.post_type.as_deref().is_none_or(|value| value == post_type))
			.map(|filter| {
				TermCondition::new(filter.taxonomy.clone(), filter.comparator, filter.term)
			})
			.fold(Vec::new(), |mut acc, condition| {
				if !acc.contains(&condition) {
					acc.push(condition);
				}

				acc
			});

		if !conditions.is_empty() {
			groups.push(FilterGroup { post_type: post_type.clone(), conditions });
		}
	}

	TaxonomyClause { groups }
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use serde_json::Value;
	use time::macros::datetime;

	use crate::{
		content::{ContentItem, Term},
		filter::{compile_filters, descendants},
		query::{Comparator, TaxonomyFilter},
	};

	fn item(id: u64, post_type: &str, terms: &[(&str, &[u64])]) -> ContentItem {
		ContentItem {
			id,
			post_type: post_type.to_string(),
			title: format!("Item {id}"),
			slug: String::new(),
			content: String::new(),
			published_at: datetime!(2024-01-01 00:00 UTC),
			taxonomy_terms: terms
				.iter()
				.map(|(taxonomy, ids)| (taxonomy.to_string(), ids.to_vec()))
				.collect::<BTreeMap<_, _>>(),
			meta: Value::Null,
		}
	}

	fn filter(
		post_type: Option<&str>,
		taxonomy: &str,
		comparator: Comparator,
		term: u64,
	) -> TaxonomyFilter {
		TaxonomyFilter {
			post_type: post_type.map(str::to_string),
			taxonomy: taxonomy.to_string(),
			comparator,
			term,
			key_label: None,
			value_label: None,
		}
	}

	fn types(values: &[&str]) -> Vec<String> {
		values.iter().map(|value| value.to_string()).collect()
	}

	#[test]
	fn no_filters_is_a_noop() {
		let clause = compile_filters(&[], &types(&["post"]));

		assert!(clause.is_noop());
		assert!(clause.matches(&item(1, "post", &[])));
	}

	#[test]
	fn conditions_in_a_group_are_anded() {
		let clause = compile_filters(
			&[
				filter(Some("post"), "category", Comparator::Eq, 3),
				filter(Some("post"), "post_tag", Comparator::Neq, 7),
			],
			&types(&["post"]),
		);

		assert!(clause.matches(&item(1, "post", &[("category", &[3])])));
		assert!(!clause.matches(&item(2, "post", &[("category", &[3]), ("post_tag", &[7])])));
		assert!(!clause.matches(&item(3, "post", &[("category", &[4])])));
	}

	#[test]
	fn unfiltered_types_pass() {
		let clause = compile_filters(
			&[filter(Some("post"), "category", Comparator::Eq, 3)],
			&types(&["post", "page"]),
		);

		assert_eq!(clause.filtered_post_types(), vec!["post".to_string()]);
		assert!(clause.matches(&item(1, "page", &[])));
		assert!(!clause.matches(&item(2, "post", &[])));
	}

	#[test]
	fn filters_for_unqueried_types_are_ignored() {
		let clause = compile_filters(
			&[filter(Some("event"), "venue", Comparator::Eq, 1)],
			&types(&["post"]),
		);

		assert!(clause.is_noop());
	}

	#[test]
	fn untyped_filters_apply_to_every_queried_type() {
		let clause = compile_filters(
			&[filter(None, "category", Comparator::Eq, 3)],
			&types(&["post", "page"]),
		);

		assert_eq!(clause.groups.len(), 2);
		assert!(!clause.matches(&item(1, "page", &[])));
		assert!(clause.matches(&item(2, "page", &[("category", &[3])])));
	}

	#[test]
	fn duplicate_conditions_collapse() {
		let clause = compile_filters(
			&[
				filter(Some("post"), "category", Comparator::Eq, 3),
				filter(None, "category", Comparator::Eq, 3),
			],
			&types(&["post"]),
		);

		assert_eq!(clause.groups[0].conditions.len(), 1);
	}

	fn term(id: u64, taxonomy: &str, parent: Option<u64>) -> Term {
		Term {
			id,
			taxonomy: taxonomy.to_string(),
			name: format!("Term {id}"),
			slug: String::new(),
			parent,
		}
	}

	#[test]
	fn descendants_walk_the_whole_subtree() {
		let catalogue = [
			term(1, "category", None),
			term(2, "category", Some(1)),
			term(3, "category", Some(2)),
			term(4, "category", None),
		];
		let refs: Vec<&Term> = catalogue.iter().collect();

		assert_eq!(descendants(&refs, 1), vec![1, 2, 3]);
		assert_eq!(descendants(&refs, 4), vec![4]);
	}

	#[test]
	fn parent_cycles_terminate() {
		let catalogue = [term(1, "category", Some(2)), term(2, "category", Some(1))];
		let refs: Vec<&Term> = catalogue.iter().collect();

		assert_eq!(descendants(&refs, 1), vec![1, 2]);
	}

	#[test]
	fn expanded_conditions_cover_child_terms() {
		let mut clause = compile_filters(
			&[
				filter(Some("post"), "category", Comparator::Eq, 1),
				filter(Some("page"), "category", Comparator::Neq, 1),
			],
			&types(&["post", "page"]),
		);
		let child_only = item(9, "post", &[("category", &[3])]);
		let child_page = item(10, "page", &[("category", &[2])]);

		assert!(!clause.matches(&child_only));
		assert!(clause.matches(&child_page));

		clause.expand_children(&[
			term(1, "category", None),
			term(2, "category", Some(1)),
			term(3, "category", Some(2)),
			term(5, "post_tag", Some(1)),
		]);

		assert_eq!(clause.taxonomies(), vec!["category".to_string()]);
		assert_eq!(clause.groups[0].conditions[0].terms, vec![1, 2, 3]);
		assert!(clause.matches(&child_only));
		assert!(!clause.matches(&child_page));
	}
}
