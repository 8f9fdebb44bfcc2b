// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trello REST request and response bodies.
//!
//! Only the fields the bridge reads are modelled; everything else in
//! Trello's responses is ignored.

use serde::{Deserialize, Serialize};

/// Body of `POST /cards`.
#[derive(Debug, Serialize)]
pub struct CreateCardRequest<'a> {
    pub name: &'a str,
    pub desc: &'a str,
    #[serde(rename = "idList")]
    pub id_list: &'a str,
    pub pos: &'a str,
}

/// A Trello card.
#[derive(Debug, Clone, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "shortUrl", default)]
    pub short_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "idBoard", default)]
    pub id_board: String,
    #[serde(default)]
    pub closed: bool,
}

impl Card {
    /// Short link if Trello sent one, else the long URL.
    pub fn link(&self) -> &str {
        if self.short_url.is_empty() {
            &self.url
        } else {
            &self.short_url
        }
    }
}

/// Body of `PUT /cards/{id}/customField/{field}/item` for a text field.
#[derive(Debug, Serialize)]
pub struct CustomFieldItem<'a> {
    pub value: CustomFieldText<'a>,
}

#[derive(Debug, Serialize)]
pub struct CustomFieldText<'a> {
    pub text: &'a str,
}

/// Body of `POST /cards/{id}/actions/comments`.
#[derive(Debug, Serialize)]
pub struct CommentRequest<'a> {
    pub text: &'a str,
}

/// The `commentCard` action Trello returns for a new comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentAction {
    pub id: String,
    #[serde(default)]
    pub data: ActionData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionData {
    #[serde(default)]
    pub card: Option<ActionCard>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionCard {
    pub id: String,
    #[serde(rename = "shortLink", default)]
    pub short_link: Option<String>,
}

/// An uploaded card attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A Trello board, used for health checks.
#[derive(Debug, Clone, Deserialize)]
pub struct Board {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub closed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_prefers_short_url() {
        let card: Card = serde_json::from_str(
            r#"{"id":"c1","name":"Alice","shortUrl":"https://trello.com/c/abc","url":"https://trello.com/c/abc/1-alice","idBoard":"b1"}"#,
        )
        .unwrap();
        assert_eq!(card.link(), "https://trello.com/c/abc");
        assert!(!card.closed);
    }

    #[test]
    fn comment_action_reads_card_short_link() {
        let action: CommentAction = serde_json::from_str(
            r#"{"id":"a1","type":"commentCard","data":{"text":"hi","card":{"id":"c1","shortLink":"abc","name":"x"}}}"#,
        )
        .unwrap();
        let card = action.data.card.unwrap();
        assert_eq!(card.id, "c1");
        assert_eq!(card.short_link.as_deref(), Some("abc"));
    }

    #[test]
    fn create_request_uses_trello_field_names() {
        let body = serde_json::to_value(CreateCardRequest {
            name: "n",
            desc: "d",
            id_list: "l",
            pos: "bottom",
        })
        .unwrap();
        assert_eq!(body["idList"], "l");
        assert_eq!(body["desc"], "d");
    }
}
