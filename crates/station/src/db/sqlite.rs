use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{future::Future, path::Path, str::FromStr, time::Duration};
use tokio::{
    fs::create_dir_all,
    sync::{mpsc, oneshot},
};

use super::{NewObservation, Observation, ObservationData};

type WriteOperation = std::pin::Pin<Box<dyn Future<Output = ()> + Send>>;

/// Serializes all mutating statements through one task so concurrent appends
/// cannot interleave between the max-id read and the insert.
pub struct DatabaseWriter {
    write_tx: mpsc::UnboundedSender<WriteOperation>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for DatabaseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseWriter {
    pub fn new() -> Self {
        let (write_tx, mut write_rx) = mpsc::unbounded_channel::<WriteOperation>();

        let handle = tokio::spawn(async move {
            while let Some(future) = write_rx.recv().await {
                future.await;
            }
        });

        Self {
            write_tx,
            _handle: handle,
        }
    }

    pub async fn execute<T, F, Fut>(&self, pool: SqlitePool, operation: F) -> Result<T, sqlx::Error>
    where
        T: Send + 'static,
        F: FnOnce(SqlitePool) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, sqlx::Error>> + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel::<Result<T, sqlx::Error>>();

        let write_op = Box::pin(async move {
            let result = operation(pool).await;
            let _ = result_tx.send(result);
        });

        self.write_tx
            .send(write_op)
            .map_err(|_| sqlx::Error::WorkerCrashed)?;

        result_rx.await.map_err(|_| sqlx::Error::WorkerCrashed)?
    }
}

pub struct Database {
    pool: SqlitePool,
    writer: DatabaseWriter,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            writer: DatabaseWriter::new(),
        }
    }
}

impl Database {
    pub async fn new(path: &str) -> anyhow::Result<Self> {
        let db_path = format!("{}/wxobs.sqlite", path);

        if let Some(parent) = Path::new(&db_path).parent() {
            create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))?
            .create_if_missing(true)
            .pragma("journal_mode", "WAL")
            .pragma("synchronous", "NORMAL")
            .pragma("busy_timeout", "5000")
            .pragma("foreign_keys", "ON")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let db = Self {
            pool,
            writer: DatabaseWriter::new(),
        };

        db.run_migrations().await?;
        info!("SQLite database initialized at: {}", db_path);

        Ok(db)
    }

    async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database connectivity and integrity.
    pub async fn health_check(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;

        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await?;
        if result != "ok" {
            anyhow::bail!("database integrity check failed: {}", result);
        }

        Ok(())
    }

    /// Checkpoint WAL to the main database file before shutdown so the last
    /// readings are flushed.
    pub async fn checkpoint(&self) {
        match sqlx::query("PRAGMA wal_checkpoint(TRUNCATE);")
            .execute(&self.pool)
            .await
        {
            Ok(_) => info!("WAL checkpoint completed"),
            Err(e) => log::error!("WAL checkpoint failed: {}", e),
        }
    }
}

#[async_trait]
impl ObservationData for Database {
    async fn append(&self, observation: NewObservation) -> Result<i64, sqlx::Error> {
        let pool = self.pool.clone();

        self.writer
            .execute(pool, move |pool| async move {
                // Id assignment and insert as one statement keeps max+1
                // atomic even outside the writer serialization.
                let id: i64 = sqlx::query_scalar(
                    "INSERT INTO observations (
                        id, recorded_at, temperature, relative_humidity, pressure,
                        wind_speed, wind_direction, solar_radiation, precip_rate, strike_rate
                     )
                     VALUES (
                        (SELECT COALESCE(MAX(id), 0) + 1 FROM observations),
                        ?, ?, ?, ?, ?, ?, ?, ?, ?
                     )
                     RETURNING id",
                )
                .bind(observation.recorded_at)
                .bind(observation.temperature)
                .bind(observation.relative_humidity)
                .bind(observation.pressure)
                .bind(observation.wind_speed)
                .bind(observation.wind_direction)
                .bind(observation.solar_radiation)
                .bind(observation.precip_rate)
                .bind(observation.strike_rate)
                .fetch_one(&pool)
                .await?;
                Ok(id)
            })
            .await
    }

    async fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Observation>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM observations
             WHERE recorded_at >= ? AND recorded_at <= ?
             ORDER BY recorded_at ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    async fn latest(&self) -> Result<Option<Observation>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM observations ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
    }

    async fn earliest(&self) -> Result<Option<Observation>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM observations ORDER BY id ASC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
    }
}
