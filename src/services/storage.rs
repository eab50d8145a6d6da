use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::{
    error::AppError,
    models::trip::{Trip, TripParticipant},
    store::TripStore,
};

const TRIPS_DIR: &str = "trips";

/// Trips kept as one pretty-printed JSON file each, `<root>/trips/<id>.json`.
#[derive(Clone)]
pub struct FileTripStore {
    root: Arc<PathBuf>,
}

impl FileTripStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_structure(&self) -> Result<(), AppError> {
        fs::create_dir_all(self.root().join(TRIPS_DIR)).await?;
        Ok(())
    }

    /// `None` for ids that are not a single plain path segment.
    fn trip_path(&self, id: &str) -> Option<PathBuf> {
        let plain = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\', '\0']);
        plain.then(|| self.root().join(TRIPS_DIR).join(format!("{id}.json")))
    }

    async fn load(&self, path: &Path) -> Result<Option<Trip>, AppError> {
        if !fs::try_exists(path).await.map_err(AppError::transport)? {
            return Ok(None);
        }
        let raw = fs::read(path).await.map_err(AppError::transport)?;
        let trip = serde_json::from_slice(&raw).map_err(AppError::transport)?;
        Ok(Some(trip))
    }

    /// Writes a sibling `.tmp` file and renames it over `path`, so readers see
    /// either the old or the new document.
    async fn save(&self, path: &Path, trip: &Trip) -> Result<(), AppError> {
        let data = serde_json::to_vec_pretty(trip).map_err(AppError::transport)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, data).await.map_err(AppError::transport)?;
        fs::rename(&staging, path).await.map_err(AppError::transport)?;
        Ok(())
    }
}

#[async_trait]
impl TripStore for FileTripStore {
    async fn fetch_trip_by_id(&self, id: &str) -> Result<Option<Trip>, AppError> {
        match self.trip_path(id) {
            Some(path) => self.load(&path).await,
            None => Ok(None),
        }
    }

    async fn update_trip_participants(
        &self,
        id: &str,
        participants: &[TripParticipant],
    ) -> Result<(), AppError> {
        let path = self.trip_path(id).ok_or(AppError::NotFound)?;
        let mut trip = self.load(&path).await?.ok_or(AppError::NotFound)?;
        trip.participants = participants.to_vec();
        self.save(&path, &trip).await?;
        debug!(trip = id, participants = participants.len(), "participants updated");
        Ok(())
    }

    async fn insert_trip(&self, id: &str, trip: &Trip) -> Result<(), AppError> {
        let path = self
            .trip_path(id)
            .ok_or_else(|| AppError::BadRequest(format!("invalid trip id `{id}`")))?;
        self.ensure_structure().await?;
        self.save(&path, trip).await
    }
}
