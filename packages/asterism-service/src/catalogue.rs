use asterism_domain::{PostType, Taxonomy, Term};

use crate::{Error, QueryService, Result};

impl QueryService {
	pub async fn list_types(&self) -> Result<Vec<PostType>> {
		Ok(self.repo.list_types().await?)
	}

	pub async fn list_taxonomies(&self, post_type: Option<&str>) -> Result<Vec<Taxonomy>> {
		let post_type = post_type.map(str::trim).filter(|value| !value.is_empty());

		Ok(self.repo.list_taxonomies(post_type).await?)
	}

	pub async fn list_terms(&self, taxonomy: &str) -> Result<Vec<Term>> {
		let taxonomy = taxonomy.trim();

		if taxonomy.is_empty() {
			return Err(Error::InvalidRequest {
				message: "taxonomy must be non-empty.".to_string(),
			});
		}

		Ok(self.repo.list_terms(taxonomy).await?)
	}
}
