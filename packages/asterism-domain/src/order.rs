//! The ordering table shared by every repository adapter and the local preview path.
//!
//! Each order is total: ties on the primary key break on the item id in the same direction, so a
//! given set of items always sorts into one sequence.

use std::cmp::Ordering;

use crate::{
	content::{ContentId, ContentItem},
	query::ContentOrder,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKey {
	PublishedAt,
	/// Lowercased title, compared by code point.
	Title,
	/// Keyed hash of the seed and the item id.
	Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
	Asc,
	Desc,
}
impl OrderDirection {
	pub fn as_sql(self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}

	fn apply(self, ordering: Ordering) -> Ordering {
		match self {
			Self::Asc => ordering,
			Self::Desc => ordering.reverse(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec {
	pub key: OrderKey,
	pub direction: OrderDirection,
}

pub const fn order_spec(order: ContentOrder) -> OrderSpec {
	match order {
		ContentOrder::Newest =>
			OrderSpec { key: OrderKey::PublishedAt, direction: OrderDirection::Desc },
		ContentOrder::Oldest =>
			OrderSpec { key: OrderKey::PublishedAt, direction: OrderDirection::Asc },
		ContentOrder::Az => OrderSpec { key: OrderKey::Title, direction: OrderDirection::Asc },
		ContentOrder::Za => OrderSpec { key: OrderKey::Title, direction: OrderDirection::Desc },
		ContentOrder::Random => OrderSpec { key: OrderKey::Random, direction: OrderDirection::Asc },
	}
}

pub fn title_key(title: &str) -> String {
	title.to_lowercase()
}

pub fn random_key(seed: u64, id: ContentId) -> u64 {
	let mut hasher = blake3::Hasher::new();

	hasher.update(&seed.to_le_bytes());
	hasher.update(&id.to_le_bytes());

	let hash = hasher.finalize();
	let mut prefix = [0_u8; 8];

	prefix.copy_from_slice(&hash.as_bytes()[..8]);

	u64::from_be_bytes(prefix)
}

pub fn compare(a: &ContentItem, b: &ContentItem, order: ContentOrder, seed: u64) -> Ordering {
	let spec = order_spec(order);
	let primary = match spec.key {
		OrderKey::PublishedAt => a.published_at.cmp(&b.published_at),
		OrderKey::Title => title_key(&a.title).cmp(&title_key(&b.title)),
		OrderKey::Random => random_key(seed, a.id).cmp(&random_key(seed, b.id)),
	};

	spec.direction.apply(primary.then_with(|| a.id.cmp(&b.id)))
}

pub fn sort_items(items: &mut [ContentItem], order: ContentOrder, seed: u64) {
	items.sort_by(|a, b| compare(a, b, order, seed));
}
