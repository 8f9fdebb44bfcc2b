// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered call record shared between mocks.

use std::sync::Arc;

use tokio::sync::Mutex;

/// Cloneable handle to one ordered list of call names.
///
/// Every mock built with the same `CallLog` appends to it, so a test can
/// assert the order of side effects across transport, tracker and store.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, entry: impl Into<String>) {
        self.0.lock().await.push(entry.into());
    }

    pub async fn entries(&self) -> Vec<String> {
        self.0.lock().await.clone()
    }

    /// Position of the first entry starting with `prefix`.
    pub async fn position(&self, prefix: &str) -> Option<usize> {
        self.0.lock().await.iter().position(|e| e.starts_with(prefix))
    }

    /// Number of entries starting with `prefix`.
    pub async fn count(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .await
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}
