// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for cardbridge integration tests.
//!
//! Provides mock adapters and a test harness for fast, deterministic tests
//! without a chat sidecar or a Trello account.
//!
//! # Components
//!
//! - [`MockTransport`] - chat transport with message injection and captured sends
//! - [`MockTracker`] - ticket tracker recording every call, with per-operation failure injection
//! - [`MemoryStore`] - in-memory conversation store with an unavailable mode
//! - [`CallLog`] - shared, ordered record of calls across all mocks
//! - [`TestHarness`] - wires the mocks into a `BridgeEngine`

pub mod call_log;
pub mod fixtures;
pub mod harness;
pub mod memory_store;
pub mod mock_tracker;
pub mod mock_transport;

pub use call_log::CallLog;
pub use harness::TestHarness;
pub use memory_store::MemoryStore;
pub use mock_tracker::{MockTracker, TrackerCall, TrackerOp};
pub use mock_transport::MockTransport;
