//! A small site used across test suites.
//!
//! Posts `1..=5` are published one day apart, so newest-first they read `5, 4, 3, 2, 1`.
//! Categories: `3` (News) on posts 1, 3 and 5; `4` (Releases) on posts 2, 3 and 4. Tag `7` sits
//! on posts 2 and 4. Category `5` (Security) is a child of News that no fixture item carries.
//! Pages are `10`, `20` and `30`; event `40` has venue `11`.

use serde_json::{Value, json};
use time::{Duration, OffsetDateTime, macros::datetime};

use asterism_domain::{ContentId, ContentItem, PostType, Taxonomy, Term, TermId};

pub const CATEGORY_NEWS: TermId = 3;
pub const CATEGORY_RELEASES: TermId = 4;
pub const CATEGORY_SECURITY: TermId = 5;
pub const TAG_RUST: TermId = 7;
pub const VENUE_HALL: TermId = 11;

pub fn post_types() -> Vec<PostType> {
	[("page", "Pages"), ("post", "Posts"), ("event", "Events")]
		.into_iter()
		.map(|(slug, name)| PostType { slug: slug.to_string(), name: name.to_string() })
		.collect()
}

pub fn taxonomies() -> Vec<Taxonomy> {
	vec![
		taxonomy("category", "Categories", &["post"]),
		taxonomy("post_tag", "Tags", &["post"]),
		taxonomy("venue", "Venues", &["event"]),
	]
}

pub fn terms() -> Vec<Term> {
	vec![
		term(CATEGORY_NEWS, "category", "News"),
		term(CATEGORY_RELEASES, "category", "Releases"),
		Term { parent: Some(CATEGORY_NEWS), ..term(CATEGORY_SECURITY, "category", "Security") },
		term(TAG_RUST, "post_tag", "rust"),
		term(VENUE_HALL, "venue", "Hall"),
	]
}

pub fn items() -> Vec<ContentItem> {
	let base = datetime!(2024-01-01 09:00 UTC);

	vec![
		item(
			1,
			"post",
			"Alpha launch",
			base + Duration::days(1),
			&[("category", &[CATEGORY_NEWS])],
		),
		item(
			2,
			"post",
			"beta notes",
			base + Duration::days(2),
			&[("category", &[CATEGORY_RELEASES]), ("post_tag", &[TAG_RUST])],
		),
		item(
			3,
			"post",
			"Gamma says hello world",
			base + Duration::days(3),
			&[("category", &[CATEGORY_NEWS, CATEGORY_RELEASES])],
		),
		item(
			4,
			"post",
			"Delta",
			base + Duration::days(4),
			&[("category", &[CATEGORY_RELEASES]), ("post_tag", &[TAG_RUST])],
		),
		item(
			5,
			"post",
			"Epsilon: Hello again",
			base + Duration::days(5),
			&[("category", &[CATEGORY_NEWS])],
		),
		item(10, "page", "About", datetime!(2023-05-01 12:00 UTC), &[]),
		item(20, "page", "Contact", datetime!(2023-04-01 12:00 UTC), &[]),
		item(30, "page", "hello page", datetime!(2023-06-01 12:00 UTC), &[]),
		item(40, "event", "Concert", datetime!(2024-02-01 19:30 UTC), &[("venue", &[VENUE_HALL])]),
	]
}

pub fn item(
	id: ContentId,
	post_type: &str,
	title: &str,
	published_at: OffsetDateTime,
	terms: &[(&str, &[TermId])],
) -> ContentItem {
	ContentItem {
		id,
		post_type: post_type.to_string(),
		title: title.to_string(),
		slug: title.to_lowercase().replace(' ', "-"),
		content: format!("Body of {title}."),
		published_at,
		taxonomy_terms: terms
			.iter()
			.map(|(taxonomy, ids)| (taxonomy.to_string(), ids.to_vec()))
			.collect(),
		meta: Value::Null,
	}
}

/// The whole site in the JSON layout snapshot stores read.
pub fn snapshot_json() -> Value {
	json!({
		"types": post_types(),
		"taxonomies": taxonomies(),
		"terms": terms(),
		"items": items(),
	})
}

fn taxonomy(slug: &str, name: &str, types: &[&str]) -> Taxonomy {
	Taxonomy {
		slug: slug.to_string(),
		name: name.to_string(),
		types: types.iter().map(|value| value.to_string()).collect(),
	}
}

fn term(id: TermId, taxonomy: &str, name: &str) -> Term {
	Term {
		id,
		taxonomy: taxonomy.to_string(),
		name: name.to_string(),
		slug: name.to_lowercase(),
		parent: None,
	}
}

#[cfg(test)]
mod tests {
	use super::{CATEGORY_NEWS, CATEGORY_SECURITY, items, terms};

	#[test]
	fn parents_live_in_the_same_taxonomy() {
		let terms = terms();

		for term in &terms {
			if let Some(parent) = term.parent {
				let found = terms.iter().find(|other| other.id == parent);

				assert_eq!(found.map(|other| other.taxonomy.as_str()), Some(term.taxonomy.as_str()));
			}
		}

		assert_eq!(
			terms.iter().find(|term| term.id == CATEGORY_SECURITY).and_then(|term| term.parent),
			Some(CATEGORY_NEWS)
		);
		assert!(items().iter().all(|item| !item.has_term("category", CATEGORY_SECURITY)));
	}
}
