// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Trello REST API.
//!
//! Credentials travel in an `Authorization: OAuth ...` header on every
//! request. No request is retried.

use std::time::Duration;

use cardbridge_core::BridgeError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{
    Attachment, Board, Card, CommentAction, CommentRequest, CreateCardRequest, CustomFieldItem,
    CustomFieldText,
};

/// Thin typed wrapper over the Trello endpoints the bridge uses.
#[derive(Debug, Clone)]
pub struct TrelloClient {
    client: reqwest::Client,
    base_url: String,
}

impl TrelloClient {
    /// Creates a client for `base_url` (normally `https://api.trello.com/1`).
    pub fn new(api_key: &str, api_token: &str, base_url: &str) -> Result<Self, BridgeError> {
        let auth = format!(r#"OAuth oauth_consumer_key="{api_key}", oauth_token="{api_token}""#);
        let mut auth = HeaderValue::from_str(&auth)
            .map_err(|e| BridgeError::Config(format!("invalid Trello credentials: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| BridgeError::Tracker {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `POST /cards`, appended to the bottom of the list.
    pub async fn create_card(
        &self,
        name: &str,
        desc: &str,
        list_id: &str,
    ) -> Result<Card, BridgeError> {
        let body = CreateCardRequest {
            name,
            desc,
            id_list: list_id,
            pos: "bottom",
        };
        let response = self
            .client
            .post(self.url("/cards"))
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;
        read_json(response).await
    }

    /// `GET /cards/{id}`. `None` when Trello answers 404.
    pub async fn get_card(&self, card_id: &str) -> Result<Option<Card>, BridgeError> {
        let response = self
            .client
            .get(self.url(&format!("/cards/{card_id}")))
            .send()
            .await
            .map_err(request_failed)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }

    /// `PUT /cards/{id}/customField/{field}/item` with a text value.
    pub async fn set_custom_field_text(
        &self,
        card_id: &str,
        field_id: &str,
        text: &str,
    ) -> Result<(), BridgeError> {
        let body = CustomFieldItem {
            value: CustomFieldText { text },
        };
        let response = self
            .client
            .put(self.url(&format!("/cards/{card_id}/customField/{field_id}/item")))
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;
        check_status(response).await.map(|_| ())
    }

    /// `POST /cards/{id}/actions/comments`.
    pub async fn add_comment(&self, card_id: &str, text: &str) -> Result<CommentAction, BridgeError> {
        let response = self
            .client
            .post(self.url(&format!("/cards/{card_id}/actions/comments")))
            .json(&CommentRequest { text })
            .send()
            .await
            .map_err(request_failed)?;
        read_json(response).await
    }

    /// `POST /cards/{id}/attachments` as multipart upload.
    pub async fn upload_attachment(
        &self,
        card_id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<Attachment, BridgeError> {
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime.essence_str())
            .map_err(|e| BridgeError::Tracker {
                message: format!("invalid attachment content type: {e}"),
                source: Some(Box::new(e)),
            })?;
        let form = Form::new()
            .part("file", part)
            .text("name", file_name.to_string());

        let response = self
            .client
            .post(self.url(&format!("/cards/{card_id}/attachments")))
            .multipart(form)
            .send()
            .await
            .map_err(request_failed)?;
        read_json(response).await
    }

    /// `GET /boards/{id}`.
    pub async fn get_board(&self, board_id: &str) -> Result<Board, BridgeError> {
        let response = self
            .client
            .get(self.url(&format!("/boards/{board_id}")))
            .send()
            .await
            .map_err(request_failed)?;
        read_json(response).await
    }
}

fn request_failed(e: reqwest::Error) -> BridgeError {
    BridgeError::Tracker {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Pass 2xx responses through, turn anything else into a tracker error with the body text.
async fn check_status(response: Response) -> Result<Response, BridgeError> {
    let status = response.status();
    debug!(status = %status, url = %response.url().path(), "trello response received");
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BridgeError::Tracker {
        message: format!("Trello returned {status}: {}", body.trim()),
        source: None,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BridgeError> {
    let body = check_status(response)
        .await?
        .text()
        .await
        .map_err(|e| BridgeError::Tracker {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
    serde_json::from_str(&body).map_err(|e| BridgeError::Tracker {
        message: format!("failed to parse Trello response: {e}"),
        source: Some(Box::new(e)),
    })
}
