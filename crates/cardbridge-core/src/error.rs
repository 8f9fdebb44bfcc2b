// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the cardbridge workspace.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all adapter traits and the bridging engine.
///
/// Variants map one-to-one onto the failure kinds the engine reacts to. The
/// engine never shows these to a sender; it logs them and replies with a
/// generic text instead.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration errors (invalid TOML, missing credentials, bad URLs).
    #[error("configuration error: {0}")]
    Config(String),

    /// The inbound payload is not text and not one of the attachment kinds.
    #[error("message type unsupported: {kind}")]
    UnsupportedType { kind: String },

    /// No filesystem extension is registered for the declared content type.
    #[error("no extension registered for content type `{mime_type}`")]
    NoExtension { mime_type: String },

    /// Local storage failed: the attachment temp file or the state database.
    #[error("storage error: {source}")]
    Storage { source: BoxError },

    /// Fetching attachment bytes from the chat transport failed.
    #[error("attachment download failed: {message}")]
    Download {
        message: String,
        source: Option<BoxError>,
    },

    /// The conversation state store could not be reached.
    #[error("conversation store unavailable: {source}")]
    StoreUnavailable { source: BoxError },

    /// The tracker rejected ticket creation.
    #[error("ticket creation failed: {message}")]
    CreateFailed {
        message: String,
        source: Option<BoxError>,
    },

    /// Recording the sender identity on the ticket failed.
    #[error("custom field update failed: {message}")]
    FieldUpdateFailed {
        message: String,
        source: Option<BoxError>,
    },

    /// Adding a comment to the ticket failed.
    #[error("comment failed: {message}")]
    CommentFailed {
        message: String,
        source: Option<BoxError>,
    },

    /// Uploading the attachment to the ticket failed.
    #[error("attachment upload failed: {message}")]
    AttachFailed {
        message: String,
        source: Option<BoxError>,
    },

    /// The ticket does not exist any more on the tracker side.
    #[error("ticket not found: {ticket_id}")]
    TicketNotFound { ticket_id: String },

    /// Other tracker failures (connection, unexpected response body).
    #[error("tracker error: {message}")]
    Tracker {
        message: String,
        source: Option<BoxError>,
    },

    /// Chat transport failures (sidecar unreachable, send rejected).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<BoxError>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Returns true for the unsupported-payload condition.
    ///
    /// The extractor has already notified the sender when this is returned,
    /// so callers must not send a second notice.
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self, BridgeError::UnsupportedType { .. })
    }
}
