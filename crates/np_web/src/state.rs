use np_core::{DashboardState, KeyValueStore};
use np_sources::SourceManager;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct AppState {
    pub sources: SourceManager,
    pub storage: Arc<dyn KeyValueStore>,
    /// Only held for reducer steps, never across an upstream fetch.
    pub dashboard: RwLock<DashboardState>,
}

impl AppState {
    /// Restores persisted rates and the logged-in user from `storage`.
    pub async fn load(sources: SourceManager, storage: Arc<dyn KeyValueStore>) -> Self {
        let rates = np_storage::load_rates(storage.as_ref()).await;
        let session = np_storage::load_session(storage.as_ref()).await;
        Self {
            sources,
            storage,
            dashboard: RwLock::new(DashboardState::new(rates, session)),
        }
    }
}
