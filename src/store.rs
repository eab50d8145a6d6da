use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::{
    config::{AppConfig, StoreBackend},
    db::{self, SqliteTripStore},
    error::AppError,
    models::trip::{Trip, TripParticipant},
    services::storage::FileTripStore,
};

/// Document store holding trip records.
///
/// Writes carry no concurrency token, the last update wins. Store-side
/// failures come back as `AppError::TransportFailure`.
#[async_trait]
pub trait TripStore: Send + Sync {
    /// `Ok(None)` when no trip has this id.
    async fn fetch_trip_by_id(&self, id: &str) -> Result<Option<Trip>, AppError>;

    /// Replaces the participant list of an existing trip.
    async fn update_trip_participants(
        &self,
        id: &str,
        participants: &[TripParticipant],
    ) -> Result<(), AppError>;

    /// Creates or overwrites a whole trip document. Trips are normally created
    /// by hand in the store; this is for seeding.
    async fn insert_trip(&self, id: &str, trip: &Trip) -> Result<(), AppError>;
}

pub type SharedTripStore = Arc<dyn TripStore>;

pub async fn open_store(config: &AppConfig) -> Result<SharedTripStore, AppError> {
    match config.trip_store {
        StoreBackend::Sqlite => {
            let pool = db::init_pool(&config.database_url).await?;
            db::run_migrations(&pool).await?;
            info!("using sqlite trip store");
            Ok(Arc::new(SqliteTripStore::new(pool)))
        }
        StoreBackend::Files => {
            let store = FileTripStore::new(config.data_root.clone());
            store.ensure_structure().await?;
            info!("using file trip store at {}", config.data_root.display());
            Ok(Arc::new(store))
        }
    }
}
