// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine settings derived from the loaded configuration.

use std::path::PathBuf;

use cardbridge_config::model::{BridgeConfig, RepliesConfig};
use cardbridge_core::{BridgeError, ChatId};

/// Everything the engine needs from the configuration, validated up front.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Board new tickets are created on.
    pub board_id: String,
    /// List new tickets are created in.
    pub list_id: String,
    /// Operator notification chat, device suffix already stripped.
    pub info_room: Option<ChatId>,
    pub replies: RepliesConfig,
    pub temp_dir: PathBuf,
    /// Delete downloaded attachments once a message has been handled.
    pub cleanup_attachments: bool,
}

impl EngineSettings {
    pub fn from_config(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let board_id = required(config.trello.board_id.as_deref(), "trello.board_id")?;
        let list_id = required(config.trello.list_id.as_deref(), "trello.list_id")?;
        let info_room = config
            .bridge
            .info_room
            .as_deref()
            .map(str::trim)
            .filter(|room| !room.is_empty())
            .map(|room| ChatId(room.to_string()).non_device());

        Ok(Self {
            board_id,
            list_id,
            info_room,
            replies: config.replies.clone(),
            temp_dir: PathBuf::from(&config.bridge.temp_dir),
            cleanup_attachments: config.bridge.cleanup_attachments,
        })
    }
}

fn required(value: Option<&str>, key: &str) -> Result<String, BridgeError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(BridgeError::Config(format!("`{key}` must be set"))),
    }
}
