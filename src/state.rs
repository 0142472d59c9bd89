use crate::detect::DetectionClient;
use crate::errors::AppError;
use crate::kv::StoreError;
use crate::storage::RecordStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<RecordStore>>,
    pub detector: Arc<DetectionClient>,
}

impl AppState {
    pub fn new(store: RecordStore, detector: DetectionClient) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            detector: Arc::new(detector),
        }
    }

    /// Runs a mutating store operation off the async workers. The store lock
    /// is held until the file write completes.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut RecordStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let mut store = Arc::clone(&self.store).lock_owned().await;
        tokio::task::spawn_blocking(move || op(&mut store))
            .await
            .map_err(AppError::internal)?
            .map_err(AppError::from)
    }
}
