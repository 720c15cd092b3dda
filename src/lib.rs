pub mod api;
pub mod config;
pub mod db;
pub mod notifications;
pub mod session;
pub mod storage;
pub mod tiers;

pub use db::DbPool;

use config::Config;
use notifications::Notifier;
use storage::AssetStore;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub assets: AssetStore,
    pub notifier: Notifier,
}

impl AppState {
    pub async fn new(config: Config, db: DbPool) -> Self {
        let assets = AssetStore::new(&config.storage).await;
        let notifier = Notifier::new(
            config.email.clone(),
            config.admin.notification_address.clone(),
        );
        Self {
            config,
            db,
            assets,
            notifier,
        }
    }
}
