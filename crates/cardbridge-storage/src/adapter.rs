// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ConversationStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use cardbridge_config::model::StorageConfig;
use cardbridge_core::{
    AdapterType, BridgeError, ConversationStore, HealthStatus, PluginAdapter, SenderId, TicketId,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed conversation state store.
///
/// The database is opened lazily on [`ConversationStore::initialize`]. Any
/// backend failure during `get`/`set`/`clear` is reported as
/// [`BridgeError::StoreUnavailable`] so callers never mistake an outage for
/// a missing entry.
pub struct SqliteConversationStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteConversationStore {
    /// Create a store for the configured database path. Nothing is opened yet.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, BridgeError> {
        self.db.get().ok_or_else(|| BridgeError::StoreUnavailable {
            source: "conversation store not initialized -- call initialize() first".into(),
        })
    }
}

/// Re-label backend failures as an unavailable store.
fn unavailable(err: BridgeError) -> BridgeError {
    match err {
        BridgeError::Storage { source } => BridgeError::StoreUnavailable { source },
        other => other,
    }
}

#[async_trait]
impl PluginAdapter for SqliteConversationStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        let probe = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        Ok(match probe {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn initialize(&self) -> Result<(), BridgeError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| BridgeError::Storage {
            source: "conversation store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "conversation store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), BridgeError> {
        self.db()?.checkpoint().await
    }

    async fn get(&self, sender: &SenderId) -> Result<Option<TicketId>, BridgeError> {
        let ticket = queries::conversations::get_ticket(self.db()?, &sender.0)
            .await
            .map_err(unavailable)?;
        Ok(ticket.map(TicketId))
    }

    async fn set(&self, sender: &SenderId, ticket: &TicketId) -> Result<(), BridgeError> {
        queries::conversations::upsert_ticket(self.db()?, &sender.0, &ticket.0)
            .await
            .map_err(unavailable)?;
        debug!(sender = %sender, ticket = %ticket, "conversation state updated");
        Ok(())
    }

    async fn clear(&self, sender: &SenderId) -> Result<bool, BridgeError> {
        queries::conversations::delete_ticket(self.db()?, &sender.0)
            .await
            .map_err(unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &std::path::Path) -> StorageConfig {
        StorageConfig {
            database_path: path.to_str().unwrap().to_string(),
            wal_mode: true,
        }
    }

    fn sender(s: &str) -> SenderId {
        SenderId(s.to_string())
    }

    #[tokio::test]
    async fn implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let store = SqliteConversationStore::new(make_config(&dir.path().join("a.db")));
        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.adapter_type(), AdapterType::Store);
    }

    #[tokio::test]
    async fn get_before_initialize_is_unavailable() {
        let dir = tempdir().unwrap();
        let store = SqliteConversationStore::new(make_config(&dir.path().join("a.db")));
        let err = store.get(&sender("x@s.whatsapp.net")).await.unwrap_err();
        assert!(matches!(err, BridgeError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let store = SqliteConversationStore::new(make_config(&dir.path().join("a.db")));
        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_reflects_initialization() {
        let dir = tempdir().unwrap();
        let store = SqliteConversationStore::new(make_config(&dir.path().join("a.db")));
        assert!(matches!(
            store.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        store.initialize().await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn set_then_get_returns_last_value() {
        let dir = tempdir().unwrap();
        let store = SqliteConversationStore::new(make_config(&dir.path().join("a.db")));
        store.initialize().await.unwrap();

        let s = sender("4915112345678@s.whatsapp.net");
        assert_eq!(store.get(&s).await.unwrap(), None);
        store.set(&s, &TicketId("T1".into())).await.unwrap();
        store.set(&s, &TicketId("T2".into())).await.unwrap();
        assert_eq!(store.get(&s).await.unwrap(), Some(TicketId("T2".into())));
    }

    #[tokio::test]
    async fn state_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("restart.db");
        let s = sender("4915112345678@s.whatsapp.net");

        {
            let store = SqliteConversationStore::new(make_config(&path));
            store.initialize().await.unwrap();
            store.set(&s, &TicketId("T1".into())).await.unwrap();
            store.close().await.unwrap();
        }

        let store = SqliteConversationStore::new(make_config(&path));
        store.initialize().await.unwrap();
        assert_eq!(store.get(&s).await.unwrap(), Some(TicketId("T1".into())));
    }

    #[tokio::test]
    async fn clear_removes_entry() {
        let dir = tempdir().unwrap();
        let store = SqliteConversationStore::new(make_config(&dir.path().join("a.db")));
        store.initialize().await.unwrap();
        let s = sender("a@s.whatsapp.net");
        store.set(&s, &TicketId("T1".into())).await.unwrap();
        assert!(store.clear(&s).await.unwrap());
        assert_eq!(store.get(&s).await.unwrap(), None);
        store.shutdown().await.unwrap();
    }
}
