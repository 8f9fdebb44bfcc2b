// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cardbridge channels` command implementation.

use cardbridge_config::model::BridgeConfig;
use cardbridge_core::{BridgeError, ChatTransport};
use cardbridge_whatsapp::WhatsAppTransport;

/// Prints every chat the account has joined, one `id<TAB>name` per line.
///
/// Any of the ids can be used as `bridge.info_room`.
pub async fn run_channels(config: &BridgeConfig) -> Result<(), BridgeError> {
    let transport = WhatsAppTransport::new(config.whatsapp.clone())?;
    let channels = transport.list_joined_channels().await?;

    if channels.is_empty() {
        println!("no joined chats or groups");
        return Ok(());
    }
    for channel in channels {
        println!("{}\t{}", channel.id, channel.name);
    }
    Ok(())
}
