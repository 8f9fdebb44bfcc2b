// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring mock adapters into a [`BridgeEngine`].
//!
//! ```rust,ignore
//! let harness = TestHarness::builder()
//!     .with_info_room("ops@g.us")
//!     .with_entry("4915", "T7")
//!     .build()
//!     .await?;
//! let outcome = harness.send(fixtures::text("4915", "still waiting")).await;
//! ```

use std::sync::Arc;

use cardbridge_config::model::BridgeConfig;
use cardbridge_core::{BridgeError, ChatId, ContactInfo, InboundMessage, TicketId};
use cardbridge_engine::{BridgeEngine, EngineSettings, HandleOutcome};

use crate::call_log::CallLog;
use crate::fixtures;
use crate::memory_store::MemoryStore;
use crate::mock_tracker::MockTracker;
use crate::mock_transport::MockTransport;

pub const BOARD_ID: &str = "board-1";
pub const LIST_ID: &str = "list-1";

/// A fully wired engine over mock adapters.
pub struct TestHarness {
    pub engine: Arc<BridgeEngine>,
    pub transport: Arc<MockTransport>,
    pub tracker: Arc<MockTracker>,
    pub store: Arc<MemoryStore>,
    /// Calls across transport, tracker and store in the order they happened.
    pub log: CallLog,
    /// Kept alive so attachments stay on disk for the test's lifetime.
    pub temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::default()
    }

    /// Runs one message through the engine.
    pub async fn send(&self, msg: InboundMessage) -> HandleOutcome {
        self.engine.handle(&msg).await
    }

    /// Texts the engine sent back to a sender's chat.
    pub async fn replies_to(&self, number: &str) -> Vec<String> {
        let chat = ChatId(fixtures::sender(number).0);
        self.transport.sent_to(&chat).await
    }

    /// Texts sent to the operator room, empty without one.
    pub async fn operator_notices(&self) -> Vec<String> {
        match &self.engine.settings().info_room {
            Some(room) => self.transport.sent_to(room).await,
            None => Vec::new(),
        }
    }
}

/// Builder for [`TestHarness`].
#[derive(Default)]
pub struct TestHarnessBuilder {
    info_room: Option<String>,
    /// `(number, ticket, fetchable)`.
    entries: Vec<(String, String, bool)>,
    contacts: Vec<(String, ContactInfo)>,
    cleanup_attachments: bool,
}

impl TestHarnessBuilder {
    /// Send operator notifications to this chat.
    pub fn with_info_room(mut self, room: &str) -> Self {
        self.info_room = Some(room.to_string());
        self
    }

    /// Seed an open ticket for a sender. The ticket is fetchable from the tracker.
    pub fn with_entry(mut self, number: &str, ticket: &str) -> Self {
        self.entries
            .push((number.to_string(), ticket.to_string(), true));
        self
    }

    /// Seed a store entry whose ticket the tracker does not know.
    pub fn with_stale_entry(mut self, number: &str, ticket: &str) -> Self {
        self.entries
            .push((number.to_string(), ticket.to_string(), false));
        self
    }

    pub fn with_contact(mut self, number: &str, contact: ContactInfo) -> Self {
        self.contacts.push((number.to_string(), contact));
        self
    }

    pub fn with_cleanup(mut self) -> Self {
        self.cleanup_attachments = true;
        self
    }

    pub async fn build(self) -> Result<TestHarness, BridgeError> {
        let temp_dir = tempfile::tempdir().map_err(|e| BridgeError::Storage {
            source: Box::new(e),
        })?;

        let log = CallLog::new();
        let transport = Arc::new(MockTransport::with_log(log.clone()));
        let tracker = Arc::new(MockTracker::with_log(log.clone()));
        let store = Arc::new(MemoryStore::with_log(log.clone()));

        for (number, ticket, fetchable) in self.entries {
            if fetchable {
                tracker.insert_ticket(&ticket).await;
            }
            store.seed(fixtures::sender(&number), TicketId(ticket)).await;
        }
        for (number, contact) in self.contacts {
            transport.add_contact(fixtures::sender(&number), contact).await;
        }

        let mut config = BridgeConfig::default();
        config.trello.board_id = Some(BOARD_ID.into());
        config.trello.list_id = Some(LIST_ID.into());
        config.bridge.info_room = self.info_room;
        config.bridge.cleanup_attachments = self.cleanup_attachments;
        config.bridge.temp_dir = temp_dir.path().to_string_lossy().into_owned();
        let settings = EngineSettings::from_config(&config)?;

        let engine = Arc::new(BridgeEngine::new(
            transport.clone(),
            tracker.clone(),
            store.clone(),
            settings,
        ));

        Ok(TestHarness {
            engine,
            transport,
            tracker,
            store,
            log,
            temp_dir,
        })
    }
}
