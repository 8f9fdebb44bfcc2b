// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content type to file extension lookup.

use cardbridge_core::BridgeError;

/// Extension (with leading dot) registered for a content type.
///
/// Parameters such as `; codecs=opus` are ignored. When several extensions
/// are registered the last one wins.
pub fn extension_for(mime_type: &str) -> Result<String, BridgeError> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime_guess::get_mime_extensions_str(&essence)
        .and_then(|exts| exts.last())
        .map(|ext| format!(".{ext}"))
        .ok_or_else(|| BridgeError::NoExtension {
            mime_type: mime_type.to_string(),
        })
}
