// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trello adapter for the cardbridge bridge.
//!
//! Implements [`TicketTracker`] over the Trello REST API: tickets are cards
//! in a configured list, follow-ups are card comments, and the sender's
//! address is kept in a text custom field on each card.

pub mod client;
pub mod types;

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, warn};

use cardbridge_config::model::TrelloConfig;
use cardbridge_core::{
    AdapterType, BridgeError, CommentRef, HealthStatus, NewTicket, PluginAdapter, SenderId, Ticket,
    TicketId, TicketTracker,
};

use crate::client::TrelloClient;

/// Trello implementation of [`TicketTracker`].
pub struct TrelloTracker {
    client: TrelloClient,
    board_id: String,
    sender_field_id: String,
}

impl TrelloTracker {
    /// Builds the tracker from the `[trello]` config section.
    ///
    /// Fails with [`BridgeError::Config`] if credentials, board or sender field are unset.
    pub fn new(config: &TrelloConfig) -> Result<Self, BridgeError> {
        let api_key = required(&config.api_key, "trello.api_key")?;
        let api_token = required(&config.api_token, "trello.api_token")?;
        let board_id = required(&config.board_id, "trello.board_id")?;
        let sender_field_id = required(&config.sender_field_id, "trello.sender_field_id")?;

        Ok(Self {
            client: TrelloClient::new(api_key, api_token, &config.api_base)?,
            board_id: board_id.to_string(),
            sender_field_id: sender_field_id.to_string(),
        })
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, BridgeError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| BridgeError::Config(format!("{key} is required")))
}

fn card_to_ticket(card: types::Card) -> Ticket {
    Ticket {
        url: card.link().to_string(),
        id: TicketId(card.id),
        title: card.name,
    }
}

// Client errors are re-wrapped so the engine can tell which step failed.

fn create_failed(e: BridgeError) -> BridgeError {
    BridgeError::CreateFailed {
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}

fn field_failed(e: BridgeError) -> BridgeError {
    BridgeError::FieldUpdateFailed {
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}

fn comment_failed(e: BridgeError) -> BridgeError {
    BridgeError::CommentFailed {
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}

fn attach_failed(e: BridgeError) -> BridgeError {
    BridgeError::AttachFailed {
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl PluginAdapter for TrelloTracker {
    fn name(&self) -> &str {
        "trello"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Tracker
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        Ok(match self.client.get_board(&self.board_id).await {
            Ok(board) if board.closed => {
                HealthStatus::Degraded(format!("board `{}` is closed", board.name))
            }
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        Ok(())
    }
}

#[async_trait]
impl TicketTracker for TrelloTracker {
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket, BridgeError> {
        let card = self
            .client
            .create_card(&ticket.title, &ticket.description, &ticket.list_id)
            .await
            .map_err(create_failed)?;

        if !card.id_board.is_empty() && card.id_board != ticket.board_id {
            warn!(
                card = %card.id,
                expected_board = %ticket.board_id,
                actual_board = %card.id_board,
                "card created on a different board than configured"
            );
        }
        debug!(card = %card.id, "trello card created");
        Ok(card_to_ticket(card))
    }

    async fn set_custom_field(
        &self,
        ticket: &TicketId,
        sender: &SenderId,
    ) -> Result<(), BridgeError> {
        self.client
            .set_custom_field_text(&ticket.0, &self.sender_field_id, &sender.0)
            .await
            .map_err(field_failed)
    }

    async fn add_comment(&self, ticket: &TicketId, text: &str) -> Result<CommentRef, BridgeError> {
        let action = self
            .client
            .add_comment(&ticket.0, text)
            .await
            .map_err(comment_failed)?;

        let ticket_url = action
            .data
            .card
            .as_ref()
            .and_then(|c| c.short_link.as_deref())
            .map(|link| format!("https://trello.com/c/{link}"))
            .unwrap_or_default();

        Ok(CommentRef {
            id: action.id,
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
        let bytes = tokio::fs::read(path).await.map_err(|e| BridgeError::AttachFailed {
            message: format!("cannot read {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        let attachment = self
            .client
            .upload_attachment(&ticket.0, bytes, display_name)
            .await
            .map_err(attach_failed)?;
        debug!(card = %ticket, attachment = %attachment.id, "attachment uploaded");
        Ok(())
    }

    async fn fetch_ticket(&self, ticket: &TicketId) -> Result<Ticket, BridgeError> {
        match self.client.get_card(&ticket.0).await? {
            Some(card) => Ok(card_to_ticket(card)),
            None => Err(BridgeError::TicketNotFound {
                ticket_id: ticket.0.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base: &str) -> TrelloConfig {
        TrelloConfig {
            api_key: Some("key".into()),
            api_token: Some("token".into()),
            board_id: Some("board-1".into()),
            list_id: Some("list-1".into()),
            sender_field_id: Some("field-1".into()),
            api_base: base.to_string(),
        }
    }

    fn new_ticket() -> NewTicket {
        NewTicket {
            title: "4915112345678".into(),
            description: "need help".into(),
            board_id: "board-1".into(),
            list_id: "list-1".into(),
        }
    }

    #[test]
    fn missing_credentials_are_config_errors() {
        let mut cfg = config("http://localhost");
        cfg.api_token = None;
        let err = TrelloTracker::new(&cfg).err().unwrap();
        assert!(matches!(err, BridgeError::Config(msg) if msg.contains("api_token")));
    }

    #[tokio::test]
    async fn create_ticket_maps_card() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cards"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "card-1",
                "name": "4915112345678",
                "shortUrl": "https://trello.com/c/abc",
                "idBoard": "board-1"
            })))
            .mount(&server)
            .await;

        let tracker = TrelloTracker::new(&config(&server.uri())).unwrap();
        let ticket = tracker.create_ticket(&new_ticket()).await.unwrap();
        assert_eq!(ticket.id, TicketId("card-1".into()));
        assert_eq!(ticket.url, "https://trello.com/c/abc");
    }

    #[tokio::test]
    async fn create_rejection_is_create_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cards"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid value for idList"))
            .mount(&server)
            .await;

        let tracker = TrelloTracker::new(&config(&server.uri())).unwrap();
        let err = tracker.create_ticket(&new_ticket()).await.unwrap_err();
        assert!(matches!(err, BridgeError::CreateFailed { .. }));
        assert!(err.to_string().contains("idList"));
    }

    #[tokio::test]
    async fn custom_field_failure_is_field_update_failed() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/cards/card-1/customField/field-1/item"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let tracker = TrelloTracker::new(&config(&server.uri())).unwrap();
        let err = tracker
            .set_custom_field(&TicketId("card-1".into()), &SenderId("s@s.whatsapp.net".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::FieldUpdateFailed { .. }));
    }

    #[tokio::test]
    async fn comment_returns_ticket_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cards/card-1/actions/comments"))
            .and(body_json(serde_json::json!({"text": "**[USER]** still waiting"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "action-1",
                "data": {"card": {"id": "card-1", "shortLink": "abc"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tracker = TrelloTracker::new(&config(&server.uri())).unwrap();
        let comment = tracker
            .add_comment(&TicketId("card-1".into()), "**[USER]** still waiting")
            .await
            .unwrap();
        assert_eq!(comment.id, "action-1");
        assert_eq!(comment.ticket_url, "https://trello.com/c/abc");
    }

    #[tokio::test]
    async fn fetch_missing_card_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards/stale"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tracker = TrelloTracker::new(&config(&server.uri())).unwrap();
        let err = tracker
            .fetch_ticket(&TicketId("stale".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::TicketNotFound { ticket_id } if ticket_id == "stale"));
    }

    #[tokio::test]
    async fn attach_reads_local_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cards/card-1/attachments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "att-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("msg-media1");
        std::fs::write(&file, b"bytes").unwrap();

        let tracker = TrelloTracker::new(&config(&server.uri())).unwrap();
        tracker
            .attach_file(&TicketId("card-1".into()), &file, "image.png")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn attach_missing_file_is_attach_failed() {
        let tracker = TrelloTracker::new(&config("http://127.0.0.1:1")).unwrap();
        let err = tracker
            .attach_file(
                &TicketId("card-1".into()),
                Path::new("/nonexistent/msg-media"),
                "x.png",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::AttachFailed { .. }));
    }

    #[tokio::test]
    async fn health_check_reports_closed_board() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/boards/board-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "board-1", "name": "Support", "closed": true
            })))
            .mount(&server)
            .await;

        let tracker = TrelloTracker::new(&config(&server.uri())).unwrap();
        assert!(matches!(
            tracker.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }
}
