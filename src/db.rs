use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::debug;

use crate::{
    error::AppError,
    models::trip::{Trip, TripParticipant},
    store::TripStore,
};

pub type DbPool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<DbPool, AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|err| AppError::Other(err.into()))
}

/// Trips kept as JSON documents in the `trips` table.
#[derive(Clone)]
pub struct SqliteTripStore {
    pool: DbPool,
}

impl SqliteTripStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripStore for SqliteTripStore {
    async fn fetch_trip_by_id(&self, id: &str) -> Result<Option<Trip>, AppError> {
        let document: Option<String> =
            sqlx::query_scalar("SELECT document FROM trips WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::transport)?;
        let Some(document) = document else {
            return Ok(None);
        };
        let trip = serde_json::from_str(&document).map_err(AppError::transport)?;
        Ok(Some(trip))
    }

    async fn update_trip_participants(
        &self,
        id: &str,
        participants: &[TripParticipant],
    ) -> Result<(), AppError> {
        let encoded = serde_json::to_string(participants).map_err(AppError::transport)?;
        let result = sqlx::query(
            r#"UPDATE trips
               SET document = json_set(document, '$.participants', json(?1)), updated_at = ?2
               WHERE id = ?3"#,
        )
        .bind(encoded)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::transport)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        debug!(trip = id, participants = participants.len(), "participants updated");
        Ok(())
    }

    async fn insert_trip(&self, id: &str, trip: &Trip) -> Result<(), AppError> {
        let document = serde_json::to_string(trip).map_err(AppError::transport)?;
        sqlx::query(
            r#"INSERT INTO trips (id, document, updated_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(id) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at"#,
        )
        .bind(id)
        .bind(document)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(AppError::transport)?;
        Ok(())
    }
}
