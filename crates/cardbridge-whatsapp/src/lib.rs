// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp transport for the cardbridge bridge.
//!
//! The WhatsApp Web session (pairing, encryption, reconnects) lives in a
//! sidecar process. This crate talks to it in both directions: outbound
//! calls go to the sidecar's REST API through [`client::SidecarClient`], and
//! inbound events arrive on a signed webhook served by [`server`] and are
//! queued for [`WhatsAppTransport::receive`].

pub mod client;
pub mod server;
pub mod signature;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use cardbridge_config::model::WhatsAppConfig;
use cardbridge_core::{
    AdapterType, BridgeError, ChatId, ChatTransport, ContactInfo, HealthStatus, InboundMessage,
    JoinedChannel, MediaRef, MessageId, PluginAdapter, SenderId,
};

use crate::client::SidecarClient;
use crate::server::WebhookState;

/// [`ChatTransport`] backed by a WhatsApp Web sidecar.
pub struct WhatsAppTransport {
    config: WhatsAppConfig,
    client: SidecarClient,
    inbound_tx: mpsc::Sender<InboundMessage>,
    inbound_rx: Mutex<mpsc::Receiver<InboundMessage>>,
}

impl WhatsAppTransport {
    pub fn new(config: WhatsAppConfig) -> Result<Self, BridgeError> {
        let client = SidecarClient::new(&config.sidecar_url, config.sidecar_token.as_deref())?;
        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_buffer.max(1));
        Ok(Self {
            config,
            client,
            inbound_tx,
            inbound_rx: Mutex::new(inbound_rx),
        })
    }

    /// State for the webhook receiver, wired to this transport's inbound queue.
    pub fn webhook_state(&self) -> WebhookState {
        WebhookState {
            inbound_tx: self.inbound_tx.clone(),
            secret: self.config.webhook_secret.as_deref().map(Arc::from),
            own_jid: self.config.own_jid.as_deref().map(Arc::from),
        }
    }

    /// Serve the webhook receiver on the configured address until `cancel` fires.
    pub async fn serve_webhook(&self, cancel: CancellationToken) -> Result<(), BridgeError> {
        server::start_server(
            &self.config.bind_address,
            self.config.port,
            self.webhook_state(),
            cancel,
        )
        .await
    }
}

#[async_trait]
impl PluginAdapter for WhatsAppTransport {
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        Ok(match self.client.health().await {
            Ok(h) if h.connected => HealthStatus::Healthy,
            Ok(_) => HealthStatus::Degraded("sidecar is not connected to WhatsApp".into()),
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        self.inbound_rx.lock().await.close();
        debug!("whatsapp inbound queue closed");
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for WhatsAppTransport {
    async fn receive(&self) -> Result<InboundMessage, BridgeError> {
        self.inbound_rx
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| BridgeError::Transport {
                message: "inbound queue closed".into(),
                source: None,
            })
    }

    async fn mark_read(
        &self,
        message_ids: &[MessageId],
        timestamp: DateTime<Utc>,
        chat: &ChatId,
        sender: &SenderId,
    ) -> Result<(), BridgeError> {
        let ids: Vec<&str> = message_ids.iter().map(|m| m.0.as_str()).collect();
        self.client
            .mark_read(&ids, timestamp, &chat.0, &sender.0)
            .await
    }

    async fn download(&self, media: &MediaRef) -> Result<Vec<u8>, BridgeError> {
        self.client.download(&media.reference).await
    }

    async fn send_text(&self, chat: &ChatId, text: &str) -> Result<MessageId, BridgeError> {
        self.client.send_text(&chat.0, text).await.map(MessageId)
    }

    async fn resolve_contact(
        &self,
        sender: &SenderId,
    ) -> Result<Option<ContactInfo>, BridgeError> {
        self.client.contact(&sender.0, sender.number()).await
    }

    async fn list_joined_channels(&self) -> Result<Vec<JoinedChannel>, BridgeError> {
        self.client.groups().await
    }
}
