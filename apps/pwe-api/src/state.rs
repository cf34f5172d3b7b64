use std::sync::Arc;

use pwe_config::{Config, StorageBackend};
use pwe_service::PweService;
use pwe_storage::{RecordStore, db::Db, memory::MemoryStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<PweService>,
}
impl AppState {
	/// Opens the configured store (bootstrapping the Postgres schema when needed) and builds the
	/// service around it.
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let store: Arc<dyn RecordStore> = match config.storage.backend {
			StorageBackend::Postgres => {
				let Some(postgres) = config.storage.postgres.as_ref() else {
					return Err(color_eyre::eyre::eyre!(
						"storage.postgres is required when storage.backend is postgres."
					));
				};
				let db = Db::connect(postgres).await?;

				db.ensure_schema().await?;

				Arc::new(db)
			},
			StorageBackend::Memory => {
				tracing::warn!("Using the in-memory store. Records are lost on restart.");

				Arc::new(MemoryStore::new())
			},
		};

		Ok(Self::from_service(PweService::new(config, store)?))
	}

	pub fn from_service(service: PweService) -> Self {
		Self { service: Arc::new(service) }
	}
}
