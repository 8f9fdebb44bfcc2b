// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock ticket tracker recording every call.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use cardbridge_core::{
    AdapterType, BridgeError, CommentRef, HealthStatus, NewTicket, PluginAdapter, SenderId, Ticket,
    TicketId, TicketTracker,
};

use crate::call_log::CallLog;

/// Tracker operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerOp {
    Create,
    CustomField,
    Comment,
    Attach,
    Fetch,
}

/// One recorded tracker call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    CreateTicket(NewTicket),
    SetCustomField {
        ticket: TicketId,
        sender: SenderId,
    },
    AddComment {
        ticket: TicketId,
        text: String,
    },
    AttachFile {
        ticket: TicketId,
        path: PathBuf,
        display_name: String,
    },
    FetchTicket(TicketId),
}

/// In-memory tracker. Created tickets get ids `T1`, `T2`, ... and become fetchable.
pub struct MockTracker {
    tickets: Mutex<HashMap<TicketId, Ticket>>,
    calls: Mutex<Vec<TrackerCall>>,
    failing: Mutex<HashSet<TrackerOp>>,
    next_id: AtomicUsize,
    omit_comment_links: AtomicBool,
    log: CallLog,
}

impl MockTracker {
    pub fn new() -> Self {
        Self::with_log(CallLog::new())
    }

    pub fn with_log(log: CallLog) -> Self {
        Self {
            tickets: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            next_id: AtomicUsize::new(1),
            omit_comment_links: AtomicBool::new(false),
            log,
        }
    }

    /// Make an existing ticket fetchable without recording a create call.
    pub async fn insert_ticket(&self, id: &str) {
        let ticket = make_ticket(id);
        self.tickets.lock().await.insert(ticket.id.clone(), ticket);
    }

    /// Make every subsequent call of `op` fail with its error variant.
    pub async fn fail(&self, op: TrackerOp) {
        self.failing.lock().await.insert(op);
    }

    /// Return comments without a ticket link, like a tracker response missing the card.
    pub fn omit_comment_links(&self) {
        self.omit_comment_links.store(true, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<TrackerCall> {
        self.calls.lock().await.clone()
    }

    pub async fn created(&self) -> Vec<NewTicket> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                TrackerCall::CreateTicket(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn comments(&self) -> Vec<(TicketId, String)> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                TrackerCall::AddComment { ticket, text } => Some((ticket.clone(), text.clone())),
                _ => None,
            })
            .collect()
    }

    pub async fn attachments(&self) -> Vec<(TicketId, PathBuf, String)> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                TrackerCall::AttachFile {
                    ticket,
                    path,
                    display_name,
                } => Some((ticket.clone(), path.clone(), display_name.clone())),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded calls of one kind.
    pub async fn count(&self, op: TrackerOp) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| op_of(c) == op)
            .count()
    }

    async fn record(&self, call: TrackerCall) -> Result<(), BridgeError> {
        let op = op_of(&call);
        self.log.record(log_name(op)).await;
        self.calls.lock().await.push(call);
        if self.failing.lock().await.contains(&op) {
            return Err(injected(op));
        }
        Ok(())
    }
}

impl Default for MockTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn make_ticket(id: &str) -> Ticket {
    Ticket {
        id: TicketId(id.to_string()),
        title: format!("ticket {id}"),
        url: format!("https://trello.com/c/{id}"),
    }
}

fn op_of(call: &TrackerCall) -> TrackerOp {
    match call {
        TrackerCall::CreateTicket(_) => TrackerOp::Create,
        TrackerCall::SetCustomField { .. } => TrackerOp::CustomField,
        TrackerCall::AddComment { .. } => TrackerOp::Comment,
        TrackerCall::AttachFile { .. } => TrackerOp::Attach,
        TrackerCall::FetchTicket(_) => TrackerOp::Fetch,
    }
}

fn log_name(op: TrackerOp) -> &'static str {
    match op {
        TrackerOp::Create => "create_ticket",
        TrackerOp::CustomField => "set_custom_field",
        TrackerOp::Comment => "add_comment",
        TrackerOp::Attach => "attach_file",
        TrackerOp::Fetch => "fetch_ticket",
    }
}

fn injected(op: TrackerOp) -> BridgeError {
    let message = "injected failure".to_string();
    match op {
        TrackerOp::Create => BridgeError::CreateFailed {
            message,
            source: None,
        },
        TrackerOp::CustomField => BridgeError::FieldUpdateFailed {
            message,
            source: None,
        },
        TrackerOp::Comment => BridgeError::CommentFailed {
            message,
            source: None,
        },
        TrackerOp::Attach => BridgeError::AttachFailed {
            message,
            source: None,
        },
        TrackerOp::Fetch => BridgeError::Tracker {
            message,
            source: None,
        },
    }
}

#[async_trait]
impl PluginAdapter for MockTracker {
    fn name(&self) -> &str {
        "mock-tracker"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Tracker
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        Ok(())
    }
}

#[async_trait]
impl TicketTracker for MockTracker {
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket, BridgeError> {
        self.record(TrackerCall::CreateTicket(ticket.clone())).await?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut created = make_ticket(&format!("T{n}"));
        created.title = ticket.title.clone();
        self.tickets
            .lock()
            .await
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn set_custom_field(
        &self,
        ticket: &TicketId,
        sender: &SenderId,
    ) -> Result<(), BridgeError> {
        self.record(TrackerCall::SetCustomField {
            ticket: ticket.clone(),
            sender: sender.clone(),
        })
        .await
    }

    async fn add_comment(&self, ticket: &TicketId, text: &str) -> Result<CommentRef, BridgeError> {
        self.record(TrackerCall::AddComment {
            ticket: ticket.clone(),
            text: text.to_string(),
        })
        .await?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let ticket_url = if self.omit_comment_links.load(Ordering::SeqCst) {
            String::new()
        } else {
            make_ticket(&ticket.0).url
        };
        Ok(CommentRef {
            id: format!("C{n}"),
            ticket_id: ticket.clone(),
            ticket_url,
        })
    }

    async fn attach_file(
        &self,
        ticket: &TicketId,
        path: &Path,
        display_name: &str,
    ) -> Result<(), BridgeError> {
        self.record(TrackerCall::AttachFile {
            ticket: ticket.clone(),
            path: path.to_path_buf(),
            display_name: display_name.to_string(),
        })
        .await
    }

    async fn fetch_ticket(&self, ticket: &TicketId) -> Result<Ticket, BridgeError> {
        self.record(TrackerCall::FetchTicket(ticket.clone())).await?;
        self.tickets
            .lock()
            .await
            .get(ticket)
            .cloned()
            .ok_or_else(|| BridgeError::TicketNotFound {
                ticket_id: ticket.0.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_ticket() -> NewTicket {
        NewTicket {
            title: "Alice (4915)".into(),
            description: "need help".into(),
            board_id: "board".into(),
            list_id: "list".into(),
        }
    }

    #[tokio::test]
    async fn created_tickets_are_fetchable() {
        let tracker = MockTracker::new();
        let ticket = tracker.create_ticket(&new_ticket()).await.unwrap();
        assert_eq!(ticket.id, TicketId("T1".into()));
        let fetched = tracker.fetch_ticket(&ticket.id).await.unwrap();
        assert_eq!(fetched.title, "Alice (4915)");
        assert_eq!(tracker.count(TrackerOp::Create).await, 1);
        assert_eq!(tracker.count(TrackerOp::Fetch).await, 1);
    }

    #[tokio::test]
    async fn unknown_ticket_is_not_found() {
        let tracker = MockTracker::new();
        let err = tracker.fetch_ticket(&TicketId("gone".into())).await.unwrap_err();
        assert!(matches!(err, BridgeError::TicketNotFound { .. }));
    }

    #[tokio::test]
    async fn injected_failures_use_operation_variant() {
        let tracker = MockTracker::new();
        tracker.fail(TrackerOp::Create).await;
        tracker.fail(TrackerOp::Comment).await;
        assert!(matches!(
            tracker.create_ticket(&new_ticket()).await,
            Err(BridgeError::CreateFailed { .. })
        ));
        assert!(matches!(
            tracker.add_comment(&TicketId("T9".into()), "x").await,
            Err(BridgeError::CommentFailed { .. })
        ));
        // Failed calls are still recorded.
        assert_eq!(tracker.calls().await.len(), 2);
    }
}
