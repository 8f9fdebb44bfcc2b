// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the sidecar's REST API.

use std::time::Duration;

use cardbridge_core::{BridgeError, ContactInfo, JoinedChannel, ChatId};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{
    ContactResponse, GroupEntry, ReceiptRequest, SendMessageRequest, SendMessageResponse,
    SidecarHealth,
};

/// Client for the sidecar that holds the WhatsApp Web session.
#[derive(Debug, Clone)]
pub struct SidecarClient {
    client: reqwest::Client,
    base_url: Url,
}

impl SidecarClient {
    /// Creates a client. `token`, when set, is sent as a bearer token on every call.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self, BridgeError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BridgeError::Config(format!("invalid sidecar URL `{base_url}`: {e}")))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| BridgeError::Config(format!("invalid sidecar token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| BridgeError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { client, base_url })
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, BridgeError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BridgeError::Config(format!("sidecar URL `{}` cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `POST /messages`.
    pub async fn send_text(&self, chat: &str, text: &str) -> Result<String, BridgeError> {
        let response = self
            .client
            .post(self.url(&["messages"])?)
            .json(&SendMessageRequest { chat, text })
            .send()
            .await
            .map_err(request_failed)?;
        let sent: SendMessageResponse = read_json(response).await?;
        Ok(sent.id)
    }

    /// `POST /receipts`.
    pub async fn mark_read(
        &self,
        message_ids: &[&str],
        timestamp: DateTime<Utc>,
        chat: &str,
        sender: &str,
    ) -> Result<(), BridgeError> {
        let body = ReceiptRequest {
            message_ids: message_ids.to_vec(),
            timestamp: timestamp.timestamp(),
            chat,
            sender,
        };
        let response = self
            .client
            .post(self.url(&["receipts"])?)
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;
        check_status(response).await.map(|_| ())
    }

    /// `GET /media/{ref}`, returning the decrypted attachment bytes.
    pub async fn download(&self, media_ref: &str) -> Result<Vec<u8>, BridgeError> {
        let response = self
            .client
            .get(self.url(&["media", media_ref])?)
            .send()
            .await
            .map_err(|e| BridgeError::Download {
                message: format!("media request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        let response = check_status(response).await.map_err(|e| BridgeError::Download {
            message: e.to_string(),
            source: Some(Box::new(e)),
        })?;
        let bytes = response.bytes().await.map_err(|e| BridgeError::Download {
            message: format!("failed to read media body: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(bytes.to_vec())
    }

    /// `GET /contacts/{jid}`. `None` on 404 or when the sidecar has no entry.
    pub async fn contact(&self, jid: &str, number: &str) -> Result<Option<ContactInfo>, BridgeError> {
        let response = self
            .client
            .get(self.url(&["contacts", jid])?)
            .send()
            .await
            .map_err(request_failed)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let contact: ContactResponse = read_json(response).await?;
        if !contact.found {
            return Ok(None);
        }
        Ok(Some(ContactInfo {
            business_name: contact.business_name,
            full_name: contact.full_name,
            push_name: contact.push_name,
            number: number.to_string(),
        }))
    }

    /// `GET /groups`.
    pub async fn groups(&self) -> Result<Vec<JoinedChannel>, BridgeError> {
        let response = self
            .client
            .get(self.url(&["groups"])?)
            .send()
            .await
            .map_err(request_failed)?;
        let groups: Vec<GroupEntry> = read_json(response).await?;
        Ok(groups
            .into_iter()
            .map(|g| JoinedChannel {
                id: ChatId(g.jid),
                name: g.name,
            })
            .collect())
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<SidecarHealth, BridgeError> {
        let response = self
            .client
            .get(self.url(&["health"])?)
            .send()
            .await
            .map_err(request_failed)?;
        read_json(response).await
    }
}

fn request_failed(e: reqwest::Error) -> BridgeError {
    BridgeError::Transport {
        message: format!("sidecar request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

async fn check_status(response: Response) -> Result<Response, BridgeError> {
    let status = response.status();
    debug!(status = %status, path = %response.url().path(), "sidecar response received");
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BridgeError::Transport {
        message: format!("sidecar returned {status}: {}", body.trim()),
        source: None,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BridgeError> {
    let body = check_status(response)
        .await?
        .text()
        .await
        .map_err(|e| BridgeError::Transport {
            message: format!("failed to read sidecar response: {e}"),
            source: Some(Box::new(e)),
        })?;
    serde_json::from_str(&body).map_err(|e| BridgeError::Transport {
        message: format!("failed to parse sidecar response: {e}"),
        source: Some(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn send_text_posts_chat_and_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(serde_json::json!({"chat": "1@s.whatsapp.net", "text": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "out-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = SidecarClient::new(&server.uri(), Some("tok")).unwrap();
        assert_eq!(client.send_text("1@s.whatsapp.net", "hello").await.unwrap(), "out-1");
    }

    #[tokio::test]
    async fn receipts_carry_unix_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/receipts"))
            .and(body_json(serde_json::json!({
                "message_ids": ["m1"],
                "timestamp": 1718000000,
                "chat": "1@s.whatsapp.net",
                "sender": "1@s.whatsapp.net"
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = SidecarClient::new(&server.uri(), None).unwrap();
        let ts = DateTime::<Utc>::from_timestamp(1718000000, 0).unwrap();
        client
            .mark_read(&["m1"], ts, "1@s.whatsapp.net", "1@s.whatsapp.net")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn download_encodes_reference_and_returns_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/abc%2Fdef"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let client = SidecarClient::new(&server.uri(), None).unwrap();
        assert_eq!(client.download("abc/def").await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn download_failure_is_download_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/gone"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let client = SidecarClient::new(&server.uri(), None).unwrap();
        assert!(matches!(
            client.download("gone").await,
            Err(BridgeError::Download { .. })
        ));
    }

    #[tokio::test]
    async fn contact_lookup_handles_missing_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contacts/1@s.whatsapp.net"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "found": true, "business_name": "ACME GmbH"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contacts/2@s.whatsapp.net"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contacts/3@s.whatsapp.net"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"found": false})))
            .mount(&server)
            .await;

        let client = SidecarClient::new(&server.uri(), None).unwrap();
        let found = client.contact("1@s.whatsapp.net", "1").await.unwrap().unwrap();
        assert_eq!(found.business_name.as_deref(), Some("ACME GmbH"));
        assert_eq!(found.number, "1");
        assert!(client.contact("2@s.whatsapp.net", "2").await.unwrap().is_none());
        assert!(client.contact("3@s.whatsapp.net", "3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn groups_map_to_joined_channels() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/groups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"jid": "1203@g.us", "name": "Support team"}
            ])))
            .mount(&server)
            .await;

        let client = SidecarClient::new(&server.uri(), None).unwrap();
        let groups = client.groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, ChatId("1203@g.us".into()));
        assert_eq!(groups[0].name, "Support team");
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        assert!(matches!(
            SidecarClient::new("not a url", None),
            Err(BridgeError::Config(_))
        ));
    }
}
