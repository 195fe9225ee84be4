use std::sync::Arc;

use repaw_service::RepawService;
use repaw_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RepawService>,
}
impl AppState {
	pub async fn new(config: repaw_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.providers.embedding.dimensions).await?;

		let service = RepawService::new(config, db);

		Ok(Self { service: Arc::new(service) })
	}
}
