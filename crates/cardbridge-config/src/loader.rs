// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered config loading with Figment.
//!
//! Merge order, later wins: compiled defaults, `/etc/cardbridge/cardbridge.toml`,
//! `~/.config/cardbridge/cardbridge.toml`, `./cardbridge.toml`, then `CARDBRIDGE_*`
//! environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::BridgeConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG: &str = "/etc/cardbridge/cardbridge.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "cardbridge.toml";

/// Config sections that environment variables can address.
const SECTIONS: &[&str] = &["bridge", "replies", "whatsapp", "trello", "storage"];

/// Per-user config file under the XDG config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cardbridge").join(LOCAL_CONFIG))
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<BridgeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<BridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BridgeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BridgeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(BridgeConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider mapping `CARDBRIDGE_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")`: keys contain underscores,
/// so `CARDBRIDGE_TRELLO_SENDER_FIELD_ID` must become `trello.sender_field_id`.
fn env_provider() -> Env {
    Env::prefixed("CARDBRIDGE_").map(|key| map_env_key(key.as_str()).into())
}

/// Replace the first `<section>_` prefix of a lowercased env key with `<section>.`.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
