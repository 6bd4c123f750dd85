use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sqlx::{
    postgres::{PgListener, PgPoolOptions},
    types::Json,
    Executor, Pool, Postgres, Row,
};
use tokio::sync::broadcast;

use super::{DocumentChange, DocumentStore, CHANGE_CHANNEL_CAPACITY};
use crate::error::Error;

const NOTIFY_CHANNEL: &str = "document_changes";

/// Documents in one JSONB table; changes fan out through LISTEN/NOTIFY.
pub struct PgStore {
    pool: Pool<Postgres>,
    changes: broadcast::Sender<DocumentChange>,
}

#[derive(Deserialize)]
struct ChangedKey {
    collection: String,
    key: String,
}

impl PgStore {
    #[tracing::instrument(name = "PgStore::new", skip(db_uri))]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        pool.execute(
            "CREATE TABLE IF NOT EXISTS documents (collection VARCHAR NOT NULL, key VARCHAR NOT NULL, data JSONB NOT NULL, PRIMARY KEY (collection, key))",
        )
        .await?;

        // payloads carry only the key; NOTIFY caps payload size
        pool.execute(
            "CREATE OR REPLACE FUNCTION notify_document_change() RETURNS trigger AS $$
            BEGIN
                PERFORM pg_notify('document_changes', json_build_object('collection', NEW.collection, 'key', NEW.key)::text);
                RETURN NEW;
            END;
            $$ LANGUAGE plpgsql",
        )
        .await?;
        pool.execute("DROP TRIGGER IF EXISTS documents_notify ON documents")
            .await?;
        pool.execute("CREATE TRIGGER documents_notify AFTER INSERT OR UPDATE ON documents FOR EACH ROW EXECUTE FUNCTION notify_document_change()")
            .await?;

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(NOTIFY_CHANNEL).await?;

        tokio::spawn(forward_changes(listener, pool.clone(), changes.clone()));

        Ok(Self { pool, changes })
    }
}

async fn forward_changes(
    mut listener: PgListener,
    pool: Pool<Postgres>,
    changes: broadcast::Sender<DocumentChange>,
) {
    loop {
        let notification = match listener.recv().await {
            Ok(notification) => notification,
            Err(err) => {
                tracing::error!(%err, "document change listener stopped");
                return;
            }
        };

        let changed: ChangedKey = match serde_json::from_str(notification.payload()) {
            Ok(changed) => changed,
            Err(err) => {
                tracing::warn!(%err, payload = notification.payload(), "malformed change notification");
                continue;
            }
        };

        match fetch(&pool, &changed.collection, &changed.key).await {
            Ok(Some(data)) => {
                let _ = changes.send(DocumentChange {
                    collection: changed.collection,
                    key: changed.key,
                    data,
                });
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, "failed to load changed document"),
        }
    }
}

async fn fetch(pool: &Pool<Postgres>, collection: &str, key: &str) -> Result<Option<Value>, Error> {
    let mut conn = pool.acquire().await?;

    let maybe_result = conn
        .fetch_optional(
            sqlx::query("SELECT data FROM documents WHERE collection = $1 AND key = $2")
                .bind(collection)
                .bind(key),
        )
        .await?;

    match maybe_result {
        Some(row) => {
            let Json(data): Json<Value> = row.try_get("data")?;
            Ok(Some(data))
        }
        None => Ok(None),
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, Error> {
        fetch(&self.pool, collection, key).await
    }

    #[tracing::instrument(skip(self, data))]
    async fn set(&self, collection: &str, key: &str, data: Value) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO documents (collection, key, data) VALUES ($1, $2, $3) ON CONFLICT (collection, key) DO UPDATE SET data = EXCLUDED.data")
                .bind(collection)
                .bind(key)
                .bind(Json(&data)),
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, data))]
    async fn create(&self, collection: &str, key: &str, data: Value) -> Result<bool, Error> {
        let mut conn = self.pool.acquire().await?;

        let result = conn
            .execute(
                sqlx::query("INSERT INTO documents (collection, key, data) VALUES ($1, $2, $3) ON CONFLICT (collection, key) DO NOTHING")
                    .bind(collection)
                    .bind(key)
                    .bind(Json(&data)),
            )
            .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self, patch))]
    async fn merge(
        &self,
        collection: &str,
        key: &str,
        patch: Value,
    ) -> Result<Option<Value>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(
                sqlx::query("UPDATE documents SET data = data || $3 WHERE collection = $1 AND key = $2 RETURNING data")
                    .bind(collection)
                    .bind(key)
                    .bind(Json(&patch)),
            )
            .await?;

        match maybe_result {
            Some(row) => {
                let Json(data): Json<Value> = row.try_get("data")?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT key, data FROM documents WHERE collection = $1 ORDER BY key")
                    .bind(collection),
            )
            .await?;

        rows.into_iter()
            .map(|row| -> Result<(String, Value), Error> {
                let key: String = row.try_get("key")?;
                let Json(data): Json<Value> = row.try_get("data")?;
                Ok((key, data))
            })
            .collect()
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentChange> {
        self.changes.subscribe()
    }
}
