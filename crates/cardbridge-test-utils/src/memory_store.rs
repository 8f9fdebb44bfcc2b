// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use cardbridge_core::{
    AdapterType, BridgeError, ConversationStore, HealthStatus, PluginAdapter, SenderId, TicketId,
};

use crate::call_log::CallLog;

/// `HashMap`-backed store. `make_unavailable()` turns every call into
/// [`BridgeError::StoreUnavailable`].
pub struct MemoryStore {
    entries: Mutex<HashMap<SenderId, TicketId>>,
    unavailable: AtomicBool,
    set_calls: AtomicUsize,
    log: CallLog,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_log(CallLog::new())
    }

    pub fn with_log(log: CallLog) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
            set_calls: AtomicUsize::new(0),
            log,
        }
    }

    /// Seed an entry without counting it as a `set` call.
    pub async fn seed(&self, sender: SenderId, ticket: TicketId) {
        self.entries.lock().await.insert(sender, ticket);
    }

    pub fn make_unavailable(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    /// Number of `set` calls the store received.
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Current entry for a sender, bypassing availability and the call log.
    pub async fn peek(&self, sender: &SenderId) -> Option<TicketId> {
        self.entries.lock().await.get(sender).cloned()
    }

    fn check(&self) -> Result<(), BridgeError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BridgeError::StoreUnavailable {
                source: "memory store marked unavailable".into(),
            });
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        Ok(if self.unavailable.load(Ordering::SeqCst) {
            HealthStatus::Unhealthy("marked unavailable".into())
        } else {
            HealthStatus::Healthy
        })
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn initialize(&self) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn get(&self, sender: &SenderId) -> Result<Option<TicketId>, BridgeError> {
        self.log.record("store_get").await;
        self.check()?;
        Ok(self.entries.lock().await.get(sender).cloned())
    }

    async fn set(&self, sender: &SenderId, ticket: &TicketId) -> Result<(), BridgeError> {
        self.log.record("store_set").await;
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.entries
            .lock()
            .await
            .insert(sender.clone(), ticket.clone());
        Ok(())
    }

    async fn clear(&self, sender: &SenderId) -> Result<bool, BridgeError> {
        self.check()?;
        Ok(self.entries.lock().await.remove(sender).is_some())
    }
}
