// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the bridge.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level bridge configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values; credentials are
/// only demanded by [`validate_for_serve`](crate::validation::validate_for_serve).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Engine behavior and operator channel settings.
    #[serde(default)]
    pub bridge: BridgeSection,

    /// Texts sent back to senders.
    #[serde(default)]
    pub replies: RepliesConfig,

    /// WhatsApp Web sidecar and webhook settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Trello board settings.
    #[serde(default)]
    pub trello: TrelloConfig,

    /// Conversation state database settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Engine behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSection {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory downloaded attachments are written to.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,

    /// Chat or group id that receives operator status lines. `None` disables them.
    #[serde(default)]
    pub info_room: Option<String>,

    /// Delete downloaded attachments once a message has been handled.
    #[serde(default)]
    pub cleanup_attachments: bool,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            temp_dir: default_temp_dir(),
            info_room: None,
            cleanup_attachments: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_temp_dir() -> String {
    "./tmp".to_string()
}

/// Sender-visible reply texts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepliesConfig {
    /// Sent when the message kind cannot be forwarded.
    #[serde(default = "default_unsupported")]
    pub unsupported: String,

    /// Sent when an attachment could not be downloaded or stored.
    #[serde(default = "default_attachment_failed")]
    pub attachment_failed: String,

    /// Sent after a new ticket was opened.
    #[serde(default = "default_ticket_created")]
    pub ticket_created: String,

    /// Sent when opening a ticket failed.
    #[serde(default = "default_create_failed")]
    pub create_failed: String,

    /// Sent after a follow-up was added to the open ticket.
    #[serde(default = "default_message_appended")]
    pub message_appended: String,

    /// Sent when a follow-up could not be added.
    #[serde(default = "default_forward_failed")]
    pub forward_failed: String,

    /// Prefix marking a ticket comment as written by the sender.
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,

    /// Line appended to a comment that came with an attachment.
    #[serde(default = "default_attachment_note")]
    pub attachment_note: String,
}

impl Default for RepliesConfig {
    fn default() -> Self {
        Self {
            unsupported: default_unsupported(),
            attachment_failed: default_attachment_failed(),
            ticket_created: default_ticket_created(),
            create_failed: default_create_failed(),
            message_appended: default_message_appended(),
            forward_failed: default_forward_failed(),
            comment_prefix: default_comment_prefix(),
            attachment_note: default_attachment_note(),
        }
    }
}

fn default_unsupported() -> String {
    "Sorry, this message type is not supported :(".to_string()
}

fn default_attachment_failed() -> String {
    "The attachment of your message could not be downloaded :(".to_string()
}

fn default_ticket_created() -> String {
    "Your request has been forwarded. We will take care of it as soon as possible.".to_string()
}

fn default_create_failed() -> String {
    "Your request could not be forwarded :( Please try again later.".to_string()
}

fn default_message_appended() -> String {
    "Your message has been added to your request.".to_string()
}

fn default_forward_failed() -> String {
    "Your message could not be forwarded :( Please try again later.".to_string()
}

fn default_comment_prefix() -> String {
    "**[USER]** ".to_string()
}

fn default_attachment_note() -> String {
    "*(new attachment)*".to_string()
}

/// WhatsApp Web sidecar configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Base URL of the sidecar REST API.
    #[serde(default = "default_sidecar_url")]
    pub sidecar_url: String,

    /// Bearer token sent to the sidecar. `None` sends no Authorization header.
    #[serde(default)]
    pub sidecar_token: Option<String>,

    /// HMAC-SHA256 key the sidecar signs webhook bodies with. `None` disables verification.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Address the webhook receiver binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port the webhook receiver listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The bridge account's own address, used to drop self-sent events the
    /// sidecar did not flag.
    #[serde(default)]
    pub own_jid: Option<String>,

    /// Capacity of the inbound event queue.
    #[serde(default = "default_inbound_buffer")]
    pub inbound_buffer: usize,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            sidecar_url: default_sidecar_url(),
            sidecar_token: None,
            webhook_secret: None,
            bind_address: default_bind_address(),
            port: default_port(),
            own_jid: None,
            inbound_buffer: default_inbound_buffer(),
        }
    }
}

fn default_sidecar_url() -> String {
    "http://127.0.0.1:8765".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8780
}

fn default_inbound_buffer() -> usize {
    100
}

/// Trello board configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrelloConfig {
    /// Trello API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Trello API token for the bridge's member account.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Board new tickets are created on.
    #[serde(default)]
    pub board_id: Option<String>,

    /// List new tickets are created in.
    #[serde(default)]
    pub list_id: Option<String>,

    /// Text custom field that stores the sender address on each card.
    #[serde(default)]
    pub sender_field_id: Option<String>,

    /// Trello REST API base URL.
    #[serde(default = "default_trello_api_base")]
    pub api_base: String,
}

impl Default for TrelloConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_token: None,
            board_id: None,
            list_id: None,
            sender_field_id: None,
            api_base: default_trello_api_base(),
        }
    }
}

fn default_trello_api_base() -> String {
    "https://api.trello.com/1".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("cardbridge").join("cardbridge.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("cardbridge.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: BridgeConfig = toml::from_str("").unwrap();
        assert_eq!(config.bridge.log_level, "info");
        assert_eq!(config.bridge.temp_dir, "./tmp");
        assert!(config.bridge.info_room.is_none());
        assert!(!config.bridge.cleanup_attachments);
        assert_eq!(config.replies, RepliesConfig::default());
        assert_eq!(config.whatsapp.port, 8780);
        assert_eq!(config.trello.api_base, "https://api.trello.com/1");
        assert!(config.storage.wal_mode);
    }

    #[test]
    fn partial_replies_keep_other_defaults() {
        let config: BridgeConfig = toml::from_str(
            r#"
[replies]
ticket_created = "Danke!"
"#,
        )
        .unwrap();
        assert_eq!(config.replies.ticket_created, "Danke!");
        assert_eq!(config.replies.comment_prefix, "**[USER]** ");
    }

    #[test]
    fn unknown_trello_key_is_rejected() {
        let result: Result<BridgeConfig, _> = toml::from_str(
            r#"
[trello]
list = "abc"
"#,
        );
        assert!(result.is_err());
    }
}
