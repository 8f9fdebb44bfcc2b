// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite conversation state for the cardbridge bridge.
//!
//! Maps each sender to the ticket their conversation is appended to. Writes
//! go through `tokio-rusqlite`'s single background thread, the schema is
//! managed by embedded refinery migrations, and the store survives restarts.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteConversationStore;
pub use database::Database;
