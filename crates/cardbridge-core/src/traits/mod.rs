// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits the bridging engine is written against.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod state;
pub mod tracker;
pub mod transport;

pub use adapter::PluginAdapter;
pub use state::ConversationStore;
pub use tracker::TicketTracker;
pub use transport::ChatTransport;
