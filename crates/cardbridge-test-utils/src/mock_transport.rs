// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat transport for deterministic testing.
//!
//! `MockTransport` implements `ChatTransport` with injectable inbound
//! messages, canned attachments and contacts, and captured outbound texts.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Notify};

use cardbridge_core::{
    AdapterType, BridgeError, ChatId, ChatTransport, ContactInfo, HealthStatus, InboundMessage,
    JoinedChannel, MediaRef, MessageId, PluginAdapter, SenderId,
};

use crate::call_log::CallLog;

/// A mock chat transport.
///
/// - **inbound**: messages injected via `inject_message()` are returned by `receive()`
/// - **sent**: texts passed to `send_text()` are captured with their chat id
/// - **media** / **contacts**: canned responses for `download()` and `resolve_contact()`
pub struct MockTransport {
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    notify: Arc<Notify>,
    sent: Arc<Mutex<Vec<(ChatId, String)>>>,
    receipts: Arc<Mutex<Vec<Vec<MessageId>>>>,
    media: Mutex<HashMap<String, Vec<u8>>>,
    contacts: Mutex<HashMap<SenderId, ContactInfo>>,
    channels: Mutex<Vec<JoinedChannel>>,
    fail_downloads: AtomicBool,
    fail_sends: AtomicBool,
    next_id: AtomicUsize,
    log: CallLog,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_log(CallLog::new())
    }

    /// Create a transport that records its calls into a shared log.
    pub fn with_log(log: CallLog) -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            notify: Arc::new(Notify::new()),
            sent: Arc::new(Mutex::new(Vec::new())),
            receipts: Arc::new(Mutex::new(Vec::new())),
            media: Mutex::new(HashMap::new()),
            contacts: Mutex::new(HashMap::new()),
            channels: Mutex::new(Vec::new()),
            fail_downloads: AtomicBool::new(false),
            fail_sends: AtomicBool::new(false),
            next_id: AtomicUsize::new(1),
            log,
        }
    }

    /// Queue an inbound message for the next `receive()`.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.notify.notify_one();
    }

    /// Register attachment bytes under a media reference.
    pub async fn add_media(&self, reference: &str, bytes: Vec<u8>) {
        self.media.lock().await.insert(reference.to_string(), bytes);
    }

    /// Register a contact entry for a sender.
    pub async fn add_contact(&self, sender: SenderId, contact: ContactInfo) {
        self.contacts.lock().await.insert(sender, contact);
    }

    pub async fn add_channel(&self, channel: JoinedChannel) {
        self.channels.lock().await.push(channel);
    }

    /// Make every subsequent `download()` fail.
    pub fn fail_downloads(&self) {
        self.fail_downloads.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent `send_text()` fail.
    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    /// All `(chat, text)` pairs sent so far.
    pub async fn sent_messages(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().await.clone()
    }

    /// Texts sent to one chat, in order.
    pub async fn sent_to(&self, chat: &ChatId) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(c, _)| c == chat)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Message id batches passed to `mark_read()`.
    pub async fn read_receipts(&self) -> Vec<Vec<MessageId>> {
        self.receipts.lock().await.clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn receive(&self) -> Result<InboundMessage, BridgeError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(msg);
                }
            }
            self.notify.notified().await;
        }
    }

    async fn mark_read(
        &self,
        message_ids: &[MessageId],
        _timestamp: DateTime<Utc>,
        _chat: &ChatId,
        _sender: &SenderId,
    ) -> Result<(), BridgeError> {
        self.log.record("mark_read").await;
        self.receipts.lock().await.push(message_ids.to_vec());
        Ok(())
    }

    async fn download(&self, media: &MediaRef) -> Result<Vec<u8>, BridgeError> {
        self.log.record("download").await;
        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(BridgeError::Download {
                message: "injected download failure".into(),
                source: None,
            });
        }
        self.media
            .lock()
            .await
            .get(&media.reference)
            .cloned()
            .ok_or_else(|| BridgeError::Download {
                message: format!("no media registered for `{}`", media.reference),
                source: None,
            })
    }

    async fn send_text(&self, chat: &ChatId, text: &str) -> Result<MessageId, BridgeError> {
        self.log.record(format!("send_text:{chat}")).await;
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(BridgeError::Transport {
                message: "injected send failure".into(),
                source: None,
            });
        }
        self.sent.lock().await.push((chat.clone(), text.to_string()));
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(MessageId(format!("mock-msg-{n}")))
    }

    async fn resolve_contact(
        &self,
        sender: &SenderId,
    ) -> Result<Option<ContactInfo>, BridgeError> {
        self.log.record("resolve_contact").await;
        Ok(self.contacts.lock().await.get(sender).cloned())
    }

    async fn list_joined_channels(&self) -> Result<Vec<JoinedChannel>, BridgeError> {
        Ok(self.channels.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn receive_returns_injected_messages_in_order() {
        let transport = MockTransport::new();
        transport.inject_message(fixtures::text("1", "first")).await;
        transport.inject_message(fixtures::text("2", "second")).await;
        assert_eq!(transport.receive().await.unwrap().sender, fixtures::sender("1"));
        assert_eq!(transport.receive().await.unwrap().sender, fixtures::sender("2"));
    }

    #[tokio::test]
    async fn send_text_captures_chat_and_text() {
        let transport = MockTransport::new();
        let chat = ChatId("1@s.whatsapp.net".into());
        let id = transport.send_text(&chat, "hello").await.unwrap();
        assert!(id.0.starts_with("mock-msg-"));
        assert_eq!(transport.sent_to(&chat).await, vec!["hello"]);
    }

    #[tokio::test]
    async fn download_unknown_reference_fails() {
        let transport = MockTransport::new();
        let media = MediaRef {
            reference: "missing".into(),
            mime_type: "image/png".into(),
        };
        assert!(matches!(
            transport.download(&media).await,
            Err(BridgeError::Download { .. })
        ));
        transport.add_media("missing", vec![1, 2]).await;
        assert_eq!(transport.download(&media).await.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn shared_log_records_calls() {
        let log = CallLog::new();
        let transport = MockTransport::with_log(log.clone());
        let chat = ChatId("1@s.whatsapp.net".into());
        transport
            .mark_read(&[MessageId("m".into())], Utc::now(), &chat, &fixtures::sender("1"))
            .await
            .unwrap();
        transport.send_text(&chat, "x").await.unwrap();
        assert_eq!(log.entries().await, vec!["mark_read", "send_text:1@s.whatsapp.net"]);
    }
}
