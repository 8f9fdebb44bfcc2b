// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket titles from contact details.

use cardbridge_core::ContactInfo;

/// Picks the best known name for a sender, suffixed with the phone number.
///
/// Business name wins over full name, which wins over push name. A push name
/// carried on the message itself is used when the contact has none. Without
/// any name the bare number is returned.
pub fn display_name(contact: Option<&ContactInfo>, push_name: Option<&str>, number: &str) -> String {
    let number = contact
        .map(|c| c.number.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(number);

    let name = contact
        .and_then(|c| {
            non_blank(c.business_name.as_deref())
                .or_else(|| non_blank(c.full_name.as_deref()))
                .or_else(|| non_blank(c.push_name.as_deref()))
        })
        .or_else(|| non_blank(push_name));

    match name {
        Some(name) => format!("{name} ({number})"),
        None => number.to_string(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
