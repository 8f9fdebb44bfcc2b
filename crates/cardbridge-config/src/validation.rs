// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Both entry points collect every error instead of failing fast.

use crate::diagnostic::ConfigError;
use crate::model::BridgeConfig;

/// Validate semantic constraints that serde attributes cannot express.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.bridge.temp_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "bridge.temp_dir must not be empty".to_string(),
        });
    }

    if let Some(room) = &config.bridge.info_room
        && room.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "bridge.info_room must not be empty when set; remove the key to disable operator notices".to_string(),
        });
    }

    if config.whatsapp.port == 0 {
        errors.push(ConfigError::Validation {
            message: "whatsapp.port must be non-zero".to_string(),
        });
    }

    if config.whatsapp.inbound_buffer == 0 {
        errors.push(ConfigError::Validation {
            message: "whatsapp.inbound_buffer must be at least 1".to_string(),
        });
    }

    let addr = config.whatsapp.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::Validation {
            message: "whatsapp.bind_address must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "whatsapp.bind_address `{addr}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    for (key, value) in [
        ("whatsapp.sidecar_url", &config.whatsapp.sidecar_url),
        ("trello.api_base", &config.trello.api_base),
    ] {
        if !is_http_url(value) {
            errors.push(ConfigError::Validation {
                message: format!("{key} `{value}` must be an http:// or https:// URL"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check the keys `serve` cannot run without.
///
/// The Trello credentials and the board, list and sender field ids have no
/// usable defaults, so they are only demanded once the bridge is started.
pub fn validate_for_serve(config: &BridgeConfig) -> Result<(), Vec<ConfigError>> {
    let required = [
        ("trello.api_key", &config.trello.api_key),
        ("trello.api_token", &config.trello.api_token),
        ("trello.board_id", &config.trello.board_id),
        ("trello.list_id", &config.trello.list_id),
        ("trello.sender_field_id", &config.trello.sender_field_id),
    ];

    let errors: Vec<ConfigError> = required
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(key, _)| ConfigError::MissingKey {
            key: key.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}
