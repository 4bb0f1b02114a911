use std::{path::Path, sync::Arc};

use color_eyre::eyre;

use asterism_config::{Config, StorageBackend};
use asterism_service::{ContentRepository, QueryService};
use asterism_storage::{db::Db, snapshot::SnapshotStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<QueryService>,
}
impl AppState {
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let repo: Arc<dyn ContentRepository> = match config.storage.backend {
			StorageBackend::Postgres => {
				let Some(postgres) = config.storage.postgres.as_ref() else {
					return Err(eyre::eyre!("storage.postgres is missing."));
				};
				let db = Db::connect(postgres).await?;

				db.ensure_schema().await?;

				Arc::new(db)
			},
			StorageBackend::Snapshot => {
				let Some(snapshot) = config.storage.snapshot.as_ref() else {
					return Err(eyre::eyre!("storage.snapshot is missing."));
				};
				let store = SnapshotStore::load(Path::new(&snapshot.path))?;

				tracing::info!(
					path = %snapshot.path,
					items = store.snapshot().items.len(),
					"Loaded content snapshot."
				);

				Arc::new(store)
			},
		};

		Ok(Self::from_service(QueryService::new(config, repo)))
	}

	pub fn from_service(service: QueryService) -> Self {
		Self { service: Arc::new(service) }
	}
}
