// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment extraction for inbound chat messages.
//!
//! [`MediaExtractor`] classifies a message payload, downloads any attachment
//! through the chat transport and writes it to a uniquely named file in the
//! configured temp directory.

pub mod extractor;
pub mod mime;

pub use extractor::{ensure_temp_dir, remove_attachment, Extracted, MediaExtractor};
pub use mime::extension_for;
