// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HMAC-SHA256 webhook signatures.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature as `sha256=<hex>`.
pub const SIGNATURE_HEADER: &str = "x-signature-256";

/// Check `signature_header` against the HMAC of `body` keyed with `secret`.
pub fn verify_signature(body: &[u8], signature_header: &str, secret: &str) -> bool {
    let Some(expected) = signature_header.strip_prefix("sha256=") else {
        warn!("webhook signature header lacks the sha256= prefix");
        return false;
    };
    constant_time_eq(sign(body, secret).as_bytes(), expected.to_ascii_lowercase().as_bytes())
}

/// Hex HMAC-SHA256 of `body`. Also used by tests and tooling to sign payloads.
pub fn sign(body: &[u8], secret: &str) -> String {
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
