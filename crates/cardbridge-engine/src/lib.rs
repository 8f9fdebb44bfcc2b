// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The bridging engine.
//!
//! [`BridgeEngine`] takes one inbound chat message at a time and decides what
//! happens to it:
//! - group messages and the bridge's own messages are ignored
//! - the message is marked read and its attachment, if any, is downloaded
//! - a sender without an open ticket gets a new ticket
//! - a sender with an open ticket gets a comment on it
//! - the operator room is notified and the sender is acknowledged
//!
//! Failures never leave a handling invocation. They are logged, reported to
//! the operator room and answered with a generic reply.

pub mod display_name;
pub mod format;
pub mod sender_locks;
pub mod settings;
pub mod shutdown;

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use cardbridge_core::{
    BridgeError, ChatId, ChatTransport, ConversationStore, InboundMessage, NewTicket, SenderId,
    Ticket, TicketId, TicketTracker,
};
use cardbridge_media::{remove_attachment, Extracted, MediaExtractor};

use crate::display_name::display_name;
use crate::sender_locks::SenderLocks;

pub use crate::settings::EngineSettings;

/// What handling one message amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Group message or sent by the bridge account.
    Ignored,
    /// Payload kind cannot be forwarded. The sender has been told.
    Unsupported,
    /// The attachment could not be downloaded or stored.
    AttachmentFailed,
    /// A new ticket was created and linked to the sender.
    Created(TicketId),
    CreateFailed,
    /// The message was added to the sender's open ticket.
    Appended(TicketId),
    ForwardFailed,
}

/// Routes inbound chat messages onto tracker tickets.
pub struct BridgeEngine {
    transport: Arc<dyn ChatTransport>,
    tracker: Arc<dyn TicketTracker>,
    store: Arc<dyn ConversationStore>,
    extractor: MediaExtractor,
    settings: EngineSettings,
    locks: SenderLocks,
}

impl BridgeEngine {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        tracker: Arc<dyn TicketTracker>,
        store: Arc<dyn ConversationStore>,
        settings: EngineSettings,
    ) -> Self {
        let extractor = MediaExtractor::new(
            Arc::clone(&transport),
            settings.temp_dir.clone(),
            settings.replies.unsupported.clone(),
        );
        info!(
            transport = transport.name(),
            tracker = tracker.name(),
            store = store.name(),
            operator_room = settings.info_room.is_some(),
            "bridge engine initialized"
        );
        Self {
            transport,
            tracker,
            store,
            extractor,
            settings,
            locks: SenderLocks::new(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Receives messages until `cancel` fires or the transport closes,
    /// handling each one on its own task.
    ///
    /// In-flight messages are allowed to finish before this returns.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) -> Result<(), BridgeError> {
        info!("bridge engine running");
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                msg = self.transport.receive() => match msg {
                    Ok(msg) => {
                        let engine = Arc::clone(&self);
                        tasks.spawn(async move {
                            engine.handle(&msg).await;
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "transport receive failed, stopping engine");
                        break;
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "message handler task failed");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping bridge engine");
                    break;
                }
            }
        }

        if !tasks.is_empty() {
            info!(count = tasks.len(), "waiting for in-flight messages");
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "message handler task failed");
            }
        }

        info!("bridge engine stopped");
        Ok(())
    }

    /// Handles one inbound message from start to finish.
    pub async fn handle(&self, msg: &InboundMessage) -> HandleOutcome {
        if msg.is_group || msg.is_from_me {
            debug!(
                message_id = %msg.id,
                group = msg.is_group,
                from_me = msg.is_from_me,
                "ignoring message"
            );
            return HandleOutcome::Ignored;
        }

        if let Err(e) = self
            .transport
            .mark_read(&[msg.id.clone()], Utc::now(), &msg.chat, &msg.sender)
            .await
        {
            warn!(message_id = %msg.id, error = %e, "failed to mark message as read");
        }

        let extracted = match self.extractor.extract(msg).await {
            Ok(extracted) => extracted,
            Err(e) if e.is_unsupported_type() => {
                info!(sender = %msg.sender, kind = msg.payload.kind(), "unsupported message type");
                return HandleOutcome::Unsupported;
            }
            Err(e) => {
                warn!(
                    sender = %msg.sender,
                    kind = msg.payload.kind(),
                    mime_type = msg.payload.media().map(|m| m.mime_type.as_str()),
                    error = %e,
                    "attachment extraction failed"
                );
                self.reply(&msg.chat, &self.settings.replies.attachment_failed)
                    .await;
                return HandleOutcome::AttachmentFailed;
            }
        };

        let text = format::resolve_text(&msg.payload, &extracted);

        let guard = self.locks.acquire(&msg.sender).await;
        let outcome = match self.open_ticket(&msg.sender).await {
            None => self.create_ticket(msg, text, &extracted).await,
            Some(ticket) => self.append_message(msg, ticket, text, &extracted).await,
        };
        drop(guard);
        self.locks.release(&msg.sender);

        if self.settings.cleanup_attachments {
            if let Some(path) = &extracted.path {
                if let Err(e) = remove_attachment(path).await {
                    warn!(path = %path.display(), error = %e, "failed to remove attachment");
                }
            }
        }

        outcome
    }

    async fn open_ticket(&self, sender: &SenderId) -> Option<TicketId> {
        match self.store.get(sender).await {
            Ok(ticket) => ticket,
            Err(e) => {
                warn!(sender = %sender, error = %e, "conversation state unavailable, treating sender as new");
                None
            }
        }
    }

    async fn create_ticket(
        &self,
        msg: &InboundMessage,
        text: &str,
        extracted: &Extracted,
    ) -> HandleOutcome {
        let number = msg.sender.number();
        let contact = match self.transport.resolve_contact(&msg.sender).await {
            Ok(contact) => contact,
            Err(e) => {
                debug!(sender = %msg.sender, error = %e, "contact lookup failed");
                None
            }
        };
        let new_ticket = NewTicket {
            title: display_name(contact.as_ref(), msg.push_name.as_deref(), number),
            description: text.to_string(),
            board_id: self.settings.board_id.clone(),
            list_id: self.settings.list_id.clone(),
        };

        let ticket = match self.create_chain(&new_ticket, &msg.sender, extracted).await {
            Ok(ticket) => ticket,
            Err(e) => {
                error!(sender = %msg.sender, error = %e, "failed to create ticket");
                self.notify_operator(&format::create_failed_notice(number))
                    .await;
                self.reply(&msg.chat, &self.settings.replies.create_failed)
                    .await;
                return HandleOutcome::CreateFailed;
            }
        };

        if let Err(e) = self.store.set(&msg.sender, &ticket.id).await {
            error!(
                sender = %msg.sender,
                ticket_id = %ticket.id,
                error = %e,
                "ticket created but conversation state not saved"
            );
        }
        info!(sender = %msg.sender, ticket_id = %ticket.id, "ticket created");

        self.notify_operator(&format::new_ticket_notice(number, &ticket.url))
            .await;
        self.reply(&msg.chat, &self.settings.replies.ticket_created)
            .await;
        HandleOutcome::Created(ticket.id)
    }

    async fn create_chain(
        &self,
        new_ticket: &NewTicket,
        sender: &SenderId,
        extracted: &Extracted,
    ) -> Result<Ticket, BridgeError> {
        let ticket = self.tracker.create_ticket(new_ticket).await?;

        let linked: Result<(), BridgeError> = async {
            self.tracker.set_custom_field(&ticket.id, sender).await?;
            self.attach(&ticket.id, extracted).await
        }
        .await;

        if let Err(e) = linked {
            error!(
                sender = %sender,
                ticket_id = %ticket.id,
                "ticket left orphaned, it is not linked to the sender"
            );
            return Err(e);
        }
        Ok(ticket)
    }

    async fn append_message(
        &self,
        msg: &InboundMessage,
        ticket_id: TicketId,
        text: &str,
        extracted: &Extracted,
    ) -> HandleOutcome {
        match self.append_chain(&ticket_id, text, extracted).await {
            Ok(ticket_url) => {
                info!(sender = %msg.sender, ticket_id = %ticket_id, "message appended to ticket");
                self.notify_operator(&format::new_message_notice(
                    msg.sender.number(),
                    &ticket_url,
                ))
                .await;
                self.reply(&msg.chat, &self.settings.replies.message_appended)
                    .await;
                HandleOutcome::Appended(ticket_id)
            }
            Err(e) => {
                error!(sender = %msg.sender, ticket_id = %ticket_id, error = %e, "failed to forward message");
                self.notify_operator(&format::forward_failed_notice(msg.sender.number()))
                    .await;
                self.reply(&msg.chat, &self.settings.replies.forward_failed)
                    .await;
                HandleOutcome::ForwardFailed
            }
        }
    }

    /// Returns the link of the ticket the comment landed on.
    async fn append_chain(
        &self,
        ticket_id: &TicketId,
        text: &str,
        extracted: &Extracted,
    ) -> Result<String, BridgeError> {
        let ticket = self.tracker.fetch_ticket(ticket_id).await?;

        let replies = &self.settings.replies;
        let note = extracted
            .has_attachment
            .then_some(replies.attachment_note.as_str());
        let body = format::comment_body(&replies.comment_prefix, text, note);
        let comment = self.tracker.add_comment(&ticket.id, &body).await?;

        self.attach(&ticket.id, extracted).await?;
        if comment.ticket_url.is_empty() {
            return Ok(ticket.url);
        }
        Ok(comment.ticket_url)
    }

    async fn attach(&self, ticket: &TicketId, extracted: &Extracted) -> Result<(), BridgeError> {
        if let Some(path) = &extracted.path {
            self.tracker
                .attach_file(ticket, path, &extracted.suggested_name)
                .await?;
        }
        Ok(())
    }

    async fn reply(&self, chat: &ChatId, text: &str) {
        if let Err(e) = self.transport.send_text(chat, text).await {
            warn!(chat = %chat, error = %e, "failed to send reply");
        }
    }

    async fn notify_operator(&self, text: &str) {
        let Some(room) = &self.settings.info_room else {
            return;
        };
        if let Err(e) = self.transport.send_text(room, text).await {
            warn!(room = %room, error = %e, "failed to notify operator room");
        }
    }
}
