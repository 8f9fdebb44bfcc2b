// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-sender serialization of message handling.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use cardbridge_core::SenderId;

/// One async mutex per sender, created on first use.
///
/// Messages from the same sender take turns from the state read to the
/// state write. Different senders never contend.
#[derive(Debug, Default)]
pub struct SenderLocks {
    locks: DashMap<SenderId, Arc<Mutex<()>>>,
}

impl SenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, sender: &SenderId) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(sender.clone()).or_default().clone();
        lock.lock_owned().await
    }

    /// Drop the sender's entry once nobody holds or waits for it.
    pub fn release(&self, sender: &SenderId) {
        self.locks
            .remove_if(sender, |_, lock| Arc::strong_count(lock) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sender(n: &str) -> SenderId {
        SenderId(format!("{n}@s.whatsapp.net"))
    }

    #[tokio::test]
    async fn same_sender_waits() {
        let locks = Arc::new(SenderLocks::new());
        let guard = locks.acquire(&sender("1")).await;

        let other = Arc::clone(&locks);
        let waiter = tokio::spawn(async move {
            let _g = other.acquire(&sender("1")).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn different_senders_do_not_contend() {
        let locks = SenderLocks::new();
        let _a = locks.acquire(&sender("1")).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(&sender("2"))).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn release_only_drops_idle_entries() {
        let locks = SenderLocks::new();
        let guard = locks.acquire(&sender("1")).await;
        locks.release(&sender("1"));
        assert_eq!(locks.len(), 1);

        drop(guard);
        locks.release(&sender("1"));
        assert!(locks.is_empty());
    }
}
