use serde_json::Value;
use time::OffsetDateTime;

#[derive(Debug, sqlx::FromRow)]
pub struct ContentItemRow {
	pub id: i64,
	pub post_type: String,
	pub title: String,
	pub slug: String,
	pub content: String,
	pub published_at: OffsetDateTime,
	pub meta: Value,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ItemTermRow {
	pub item_id: i64,
	pub taxonomy: String,
	pub term_id: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub struct PostTypeRow {
	pub slug: String,
	pub name: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct TaxonomyRow {
	pub slug: String,
	pub name: String,
	pub types: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct TermRow {
	pub id: i64,
	pub taxonomy: String,
	pub name: String,
	pub slug: String,
	pub parent: Option<i64>,
}
