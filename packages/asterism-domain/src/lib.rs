pub mod content;
pub mod editing;
pub mod fetch;
pub mod filter;
pub mod normalize;
pub mod order;
pub mod query;
pub mod sets;
pub mod time_serde;

pub use content::{ContentId, ContentItem, PostType, Taxonomy, Term, TermId};
pub use editing::{MoveDirection, QueryEdit};
pub use fetch::{IdFetch, RankedFetch};
pub use filter::{FilterGroup, TaxonomyClause, TermCondition, compile_filters, descendants};
pub use normalize::{NormalizeOptions, merge_overrides, normalize};
pub use order::{OrderDirection, OrderKey, OrderSpec, order_spec, sort_items};
pub use query::{
	Comparator, ContentOrder, ContentQuery, OneOrMany, QueryMethod, RawContentQuery,
	RawTaxonomyFilter, TaxonomyFilter,
};
pub use sets::{ResolvedSets, resolve_sets};
