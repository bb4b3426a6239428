use async_trait::async_trait;
use np_core::{Error, KeyValueStore, Result};
use std::sync::Arc;
use tracing::info;

pub mod backends;
pub mod settings;

pub use backends::*;
pub use settings::{clear_user, load_rates, load_session, save_rates, save_user};

#[async_trait]
pub trait StorageBackend: KeyValueStore + Sized {
    fn get_error_message() -> &'static str;

    /// Opens the backend at `location`, or at its default place when `None`.
    async fn open(location: Option<&str>) -> Result<Self>;
}

async fn open_backend<T: StorageBackend + 'static>(location: Option<&str>) -> Result<Arc<dyn KeyValueStore>> {
    match T::open(location).await {
        Ok(storage) => Ok(Arc::new(storage)),
        Err(e) => Err(Error::Storage(format!("{} ({})", T::get_error_message(), e))),
    }
}

/// Opens a backend by name: `memory`, `file` or `sqlite`.
pub async fn create_storage(kind: &str, location: Option<&str>) -> Result<Arc<dyn KeyValueStore>> {
    let storage = match kind {
        "memory" => open_backend::<MemoryStorage>(location).await?,
        "file" => open_backend::<FileStorage>(location).await?,
        #[cfg(feature = "sqlite")]
        "sqlite" => open_backend::<SqliteStorage>(location).await?,
        other => return Err(Error::Storage(format!("Unknown storage backend: {}", other))),
    };
    info!("🏦 Storage backend initialized (using {})", kind);
    Ok(storage)
}
