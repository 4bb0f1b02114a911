use std::collections::{BTreeMap, HashMap};

use sqlx::{PgExecutor, Postgres, QueryBuilder};

use asterism_domain::{
	Comparator, ContentId, ContentItem, IdFetch, OrderKey, PostType, RankedFetch, Taxonomy,
	TaxonomyClause, Term, TermId, order::title_key, order_spec, sort_items,
};

use crate::{
	Error, Result,
	db::Db,
	models::{ContentItemRow, ItemTermRow, PostTypeRow, TaxonomyRow, TermRow},
};

const LIST_TERMS_SQL: &str = r#"
SELECT id, taxonomy, name, slug, parent
FROM content_terms
WHERE taxonomy = $1
ORDER BY name COLLATE "C", id"#;

const ITEM_COLUMNS: &str =
	"SELECT i.id, i.post_type, i.title, i.slug, i.content, i.published_at, i.meta FROM content_items i";

pub async fn fetch_items_by_ids(db: &Db, fetch: &IdFetch<'_>) -> Result<Vec<ContentItem>> {
	let ids = to_db_ids(fetch.ids);

	if ids.is_empty() || fetch.post_types.is_empty() {
		return Ok(Vec::new());
	}

	let mut builder = QueryBuilder::<Postgres>::new(ITEM_COLUMNS);

	builder.push(" WHERE i.post_type = ANY(");
	builder.push_bind(fetch.post_types.to_vec());
	builder.push(") AND i.id = ANY(");
	builder.push_bind(ids.clone());
	builder.push(")");

	push_search(&mut builder, fetch.search);

	if fetch.preserve_order {
		builder.push(" ORDER BY array_position(");
		builder.push_bind(ids);
		builder.push(", i.id)");
	} else {
		builder.push(" ORDER BY i.id ASC");
	}

	let rows: Vec<ContentItemRow> = builder.build_query_as().fetch_all(&db.pool).await?;

	attach_terms(&db.pool, rows).await
}

pub async fn fetch_items_by_query(db: &Db, fetch: &RankedFetch<'_>) -> Result<Vec<ContentItem>> {
	if fetch.post_types.is_empty() || fetch.limit == Some(0) {
		return Ok(Vec::new());
	}

	let mut builder = QueryBuilder::<Postgres>::new(ITEM_COLUMNS);

	builder.push(" WHERE i.post_type = ANY(");
	builder.push_bind(fetch.post_types.to_vec());
	builder.push(")");

	if let Some(include_ids) = fetch.include_ids {
		builder.push(" AND i.id = ANY(");
		builder.push_bind(to_db_ids(include_ids));
		builder.push(")");
	}
	if !fetch.exclude_ids.is_empty() {
		builder.push(" AND NOT (i.id = ANY(");
		builder.push_bind(to_db_ids(fetch.exclude_ids));
		builder.push("))");
	}

	push_taxonomy_clause(&mut builder, fetch.clause);
	push_search(&mut builder, fetch.search);

	let spec = order_spec(fetch.order);
	let direction = spec.direction.as_sql();
	// Random keys are computed in Rust, so that order is applied after the fetch.
	let sorted_in_sql = match spec.key {
		OrderKey::PublishedAt => {
			builder.push(format!(" ORDER BY i.published_at {direction}, i.id {direction}"));

			true
		},
		OrderKey::Title => {
			builder.push(format!(
				" ORDER BY i.title_key COLLATE \"C\" {direction}, i.id {direction}"
			));

			true
		},
		OrderKey::Random => false,
	};

	if sorted_in_sql && let Some(limit) = fetch.limit {
		builder.push(" LIMIT ");
		builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
	}

	let rows: Vec<ContentItemRow> = builder.build_query_as().fetch_all(&db.pool).await?;
	let mut items = attach_terms(&db.pool, rows).await?;

	if !sorted_in_sql {
		sort_items(&mut items, fetch.order, fetch.seed);

		if let Some(limit) = fetch.limit {
			items.truncate(limit);
		}
	}

	Ok(items)
}

pub async fn list_post_types(db: &Db) -> Result<Vec<PostType>> {
	let rows: Vec<PostTypeRow> =
		sqlx::query_as("SELECT slug, name FROM content_types ORDER BY slug")
			.fetch_all(&db.pool)
			.await?;

	Ok(rows.into_iter().map(|row| PostType { slug: row.slug, name: row.name }).collect())
}

pub async fn list_taxonomies(db: &Db, post_type: Option<&str>) -> Result<Vec<Taxonomy>> {
	let rows: Vec<TaxonomyRow> = sqlx::query_as(
		"\
SELECT slug, name, types
FROM content_taxonomies
WHERE $1::text IS NULL OR $1 = ANY(types)
ORDER BY slug",
	)
	.bind(post_type)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows
		.into_iter()
		.map(|row| Taxonomy { slug: row.slug, name: row.name, types: row.types })
		.collect())
}

pub async fn list_terms(db: &Db, taxonomy: &str) -> Result<Vec<Term>> {
	let rows: Vec<TermRow> = sqlx::query_as(LIST_TERMS_SQL)
		.bind(taxonomy)
		.fetch_all(&db.pool)
		.await?;

	rows.into_iter()
		.map(|row| {
			Ok(Term {
				id: from_db_id(row.id)?,
				taxonomy: row.taxonomy,
				name: row.name,
				slug: row.slug,
				parent: row.parent.map(from_db_id).transpose()?,
			})
		})
		.collect()
}

pub async fn upsert_post_type(db: &Db, post_type: &PostType) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO content_types (slug, name)
VALUES ($1, $2)
ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name",
	)
	.bind(post_type.slug.as_str())
	.bind(post_type.name.as_str())
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn upsert_taxonomy(db: &Db, taxonomy: &Taxonomy) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO content_taxonomies (slug, name, types)
VALUES ($1, $2, $3)
ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name, types = EXCLUDED.types",
	)
	.bind(taxonomy.slug.as_str())
	.bind(taxonomy.name.as_str())
	.bind(taxonomy.types.as_slice())
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn upsert_term(db: &Db, term: &Term) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO content_terms (id, taxonomy, name, slug, parent)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (id) DO UPDATE
SET
	taxonomy = EXCLUDED.taxonomy,
	name = EXCLUDED.name,
	slug = EXCLUDED.slug,
	parent = EXCLUDED.parent",
	)
	.bind(to_db_id(term.id)?)
	.bind(term.taxonomy.as_str())
	.bind(term.name.as_str())
	.bind(term.slug.as_str())
	.bind(term.parent.map(to_db_id).transpose()?)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Writes an item and replaces its term assignments in one transaction.
pub async fn upsert_item(db: &Db, item: &ContentItem) -> Result<()> {
	let id = to_db_id(item.id)?;
	let mut tx = db.pool.begin().await?;

	sqlx::query(
		"\
INSERT INTO content_items (id, post_type, title, title_key, slug, content, published_at, meta)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
ON CONFLICT (id) DO UPDATE
SET
	post_type = EXCLUDED.post_type,
	title = EXCLUDED.title,
	title_key = EXCLUDED.title_key,
	slug = EXCLUDED.slug,
	content = EXCLUDED.content,
	published_at = EXCLUDED.published_at,
	meta = EXCLUDED.meta",
	)
	.bind(id)
	.bind(item.post_type.as_str())
	.bind(item.title.as_str())
	.bind(title_key(&item.title))
	.bind(item.slug.as_str())
	.bind(item.content.as_str())
	.bind(item.published_at)
	.bind(&item.meta)
	.execute(&mut *tx)
	.await?;
	sqlx::query("DELETE FROM content_item_terms WHERE item_id = $1")
		.bind(id)
		.execute(&mut *tx)
		.await?;

	for (taxonomy, terms) in &item.taxonomy_terms {
		for term in terms {
			sqlx::query(
				"\
INSERT INTO content_item_terms (item_id, taxonomy, term_id)
VALUES ($1, $2, $3)
ON CONFLICT DO NOTHING",
			)
			.bind(id)
			.bind(taxonomy.as_str())
			.bind(to_db_id(*term)?)
			.execute(&mut *tx)
			.await?;
		}
	}

	tx.commit().await?;

	Ok(())
}

/// Renders a compiled taxonomy clause as an `AND (...)` predicate over `content_items i`.
pub fn push_taxonomy_clause(builder: &mut QueryBuilder<'_, Postgres>, clause: &TaxonomyClause) {
	if clause.is_noop() {
		return;
	}

	builder.push(" AND (NOT (i.post_type = ANY(");
	builder.push_bind(clause.filtered_post_types());
	builder.push("))");

	for group in &clause.groups {
		builder.push(" OR (i.post_type = ");
		builder.push_bind(group.post_type.clone());

		for condition in &group.conditions {
			builder.push(match condition.comparator {
				Comparator::Eq => " AND EXISTS (",
				Comparator::Neq => " AND NOT EXISTS (",
			});
			builder.push(
				"SELECT 1 FROM content_item_terms t WHERE t.item_id = i.id AND t.taxonomy = ",
			);
			builder.push_bind(condition.taxonomy.clone());
			builder.push(" AND t.term_id = ANY(");
			builder.push_bind(
				condition
					.terms
					.iter()
					.map(|term| i64::try_from(*term).unwrap_or(-1))
					.collect::<Vec<_>>(),
			);
			builder.push("))");
		}

		builder.push(")");
	}

	builder.push(")");
}

fn push_search(builder: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
	let Some(search) = search.map(str::trim).filter(|value| !value.is_empty()) else {
		return;
	};
	let pattern = format!("%{}%", escape_like(search));

	builder.push(" AND (i.title ILIKE ");
	builder.push_bind(pattern.clone());
	builder.push(" ESCAPE '\\' OR i.content ILIKE ");
	builder.push_bind(pattern);
	builder.push(" ESCAPE '\\')");
}

fn escape_like(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());

	for ch in raw.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out
}

async fn attach_terms<'e, E>(executor: E, rows: Vec<ContentItemRow>) -> Result<Vec<ContentItem>>
where
	E: PgExecutor<'e>,
{
	if rows.is_empty() {
		return Ok(Vec::new());
	}

	let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
	let term_rows: Vec<ItemTermRow> = sqlx::query_as(
		"\
SELECT item_id, taxonomy, term_id
FROM content_item_terms
WHERE item_id = ANY($1)
ORDER BY item_id, taxonomy, term_id",
	)
	.bind(ids)
	.fetch_all(executor)
	.await?;
	let mut terms: HashMap<i64, BTreeMap<String, Vec<TermId>>> = HashMap::new();

	for row in term_rows {
		terms
			.entry(row.item_id)
			.or_default()
			.entry(row.taxonomy)
			.or_default()
			.push(from_db_id(row.term_id)?);
	}

	rows.into_iter()
		.map(|row| {
			Ok(ContentItem {
				id: from_db_id(row.id)?,
				taxonomy_terms: terms.remove(&row.id).unwrap_or_default(),
				post_type: row.post_type,
				title: row.title,
				slug: row.slug,
				content: row.content,
				published_at: row.published_at,
				meta: row.meta,
			})
		})
		.collect()
}

// Ids above `i64::MAX` cannot be stored, so they cannot match anything either.
fn to_db_ids(ids: &[ContentId]) -> Vec<i64> {
	ids.iter().filter_map(|id| i64::try_from(*id).ok()).collect()
}

fn to_db_id(id: u64) -> Result<i64> {
	i64::try_from(id).map_err(|_| Error::InvalidArgument(format!("Id {id} is out of range.")))
}

fn from_db_id(id: i64) -> Result<u64> {
	u64::try_from(id).map_err(|_| Error::InvalidArgument(format!("Stored id {id} is negative.")))
}
