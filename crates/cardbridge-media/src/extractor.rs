// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payload classification and attachment download.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use cardbridge_core::{BridgeError, ChatTransport, InboundMessage, MediaRef, Payload};

use crate::mime::extension_for;

/// Prefix of every attachment file written to the temp directory.
const TEMP_PREFIX: &str = "msg-media";

/// What the extractor found in one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub has_attachment: bool,
    /// Local copy of the attachment. Set exactly when `has_attachment` is.
    pub path: Option<PathBuf>,
    /// Original file name to show on the ticket, empty without an attachment.
    pub suggested_name: String,
    /// Image or video caption, empty for every other kind.
    pub caption: String,
}

impl Extracted {
    fn text_only() -> Self {
        Self {
            has_attachment: false,
            path: None,
            suggested_name: String::new(),
            caption: String::new(),
        }
    }
}

/// Classifies payloads and stores attachments in a temp directory.
pub struct MediaExtractor {
    transport: Arc<dyn ChatTransport>,
    temp_dir: PathBuf,
    unsupported_notice: String,
}

impl MediaExtractor {
    /// `unsupported_notice` is sent to the sender when a payload kind cannot be forwarded.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        temp_dir: impl Into<PathBuf>,
        unsupported_notice: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            temp_dir: temp_dir.into(),
            unsupported_notice: unsupported_notice.into(),
        }
    }

    /// Inspect a message and download its attachment, if any.
    ///
    /// For payloads that are neither text nor an attachment kind the sender
    /// is told so here, and [`BridgeError::UnsupportedType`] is returned.
    pub async fn extract(&self, msg: &InboundMessage) -> Result<Extracted, BridgeError> {
        let (media, stem, declared_name, caption) = match &msg.payload {
            Payload::Text(body) if body.is_empty() => {
                return Err(self.reject(msg, "empty").await);
            }
            Payload::Text(_) | Payload::ExtendedText(_) => return Ok(Extracted::text_only()),
            Payload::Image { media, caption } => (media, "image", None, caption.clone()),
            Payload::Video { media, caption } => (media, "video", None, caption.clone()),
            Payload::Audio { media } => (media, "audio", None, None),
            Payload::Document { media, file_name } => {
                (media, "document", file_name.clone(), None)
            }
            Payload::Unsupported { kind } => return Err(self.reject(msg, kind).await),
        };

        let ext = extension_for(&media.mime_type)?;
        let suggested_name = declared_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("{stem}{ext}"));

        let path = self.download_to_temp(media).await?;
        debug!(
            message_id = %msg.id,
            kind = msg.payload.kind(),
            path = %path.display(),
            "attachment stored"
        );

        Ok(Extracted {
            has_attachment: true,
            path: Some(path),
            suggested_name,
            caption: caption.unwrap_or_default(),
        })
    }

    async fn reject(&self, msg: &InboundMessage, kind: &str) -> BridgeError {
        if let Err(e) = self
            .transport
            .send_text(&msg.chat, &self.unsupported_notice)
            .await
        {
            warn!(error = %e, chat = %msg.chat, "failed to send unsupported-type notice");
        }
        BridgeError::UnsupportedType {
            kind: kind.to_string(),
        }
    }

    async fn download_to_temp(&self, media: &MediaRef) -> Result<PathBuf, BridgeError> {
        let bytes = self.transport.download(media).await?;
        let dir = self.temp_dir.clone();

        tokio::task::spawn_blocking(move || -> std::io::Result<PathBuf> {
            let mut file = tempfile::Builder::new()
                .prefix(TEMP_PREFIX)
                .tempfile_in(&dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            let (_, path) = file.keep().map_err(|e| e.error)?;
            Ok(path)
        })
        .await
        .map_err(|e| BridgeError::Internal(format!("attachment writer panicked: {e}")))?
        .map_err(|e| BridgeError::Storage {
            source: Box::new(e),
        })
    }
}

/// Create the attachment temp directory if it does not exist.
pub async fn ensure_temp_dir(path: &Path) -> Result<(), BridgeError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| BridgeError::Storage {
            source: Box::new(e),
        })
}

/// Delete a stored attachment. A file that is already gone is not an error.
pub async fn remove_attachment(path: &Path) -> Result<(), BridgeError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BridgeError::Storage {
            source: Box::new(e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardbridge_core::{ChatId, MediaRef};
    use cardbridge_test_utils::{fixtures, MockTransport};

    const NOTICE: &str = "Sorry, this message type is not supported :(";

    fn setup() -> (Arc<MockTransport>, MediaExtractor, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::new());
        let extractor = MediaExtractor::new(transport.clone(), dir.path(), NOTICE);
        (transport, extractor, dir)
    }

    fn media(reference: &str, mime_type: &str) -> MediaRef {
        MediaRef {
            reference: reference.into(),
            mime_type: mime_type.into(),
        }
    }

    #[tokio::test]
    async fn text_has_no_attachment() {
        let (transport, extractor, _dir) = setup();
        let out = extractor
            .extract(&fixtures::text("1", "need help"))
            .await
            .unwrap();
        assert!(!out.has_attachment);
        assert!(out.path.is_none());
        assert!(out.caption.is_empty());
        assert!(transport.sent_messages().await.is_empty());
    }

    #[tokio::test]
    async fn image_with_caption_is_downloaded() {
        let (transport, extractor, dir) = setup();
        transport.add_media("img-1", b"\x89PNG".to_vec()).await;

        let out = extractor
            .extract(&fixtures::image("2", "img-1", "image/png", Some("broken part")))
            .await
            .unwrap();

        assert!(out.has_attachment);
        assert_eq!(out.suggested_name, "image.png");
        assert_eq!(out.caption, "broken part");
        let path = out.path.unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("msg-media"));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG");
    }

    #[tokio::test]
    async fn video_keeps_caption_and_uses_kind_name() {
        let (transport, extractor, _dir) = setup();
        transport.add_media("vid-1", vec![0, 0, 0, 24]).await;
        let msg = fixtures::message(
            "4",
            Payload::Video {
                media: media("vid-1", "video/mp4"),
                caption: Some("see the noise".into()),
            },
        );

        let out = extractor.extract(&msg).await.unwrap();

        assert!(out.has_attachment);
        assert_eq!(
            out.suggested_name,
            format!("video{}", extension_for("video/mp4").unwrap())
        );
        assert!(out.suggested_name.starts_with("video."));
        assert_eq!(out.caption, "see the noise");
        assert_eq!(std::fs::read(out.path.unwrap()).unwrap(), vec![0, 0, 0, 24]);
    }

    #[tokio::test]
    async fn extraction_is_repeatable() {
        let (transport, extractor, _dir) = setup();
        transport.add_media("img-1", vec![1, 2, 3]).await;
        let msg = fixtures::image("2", "img-1", "image/png", Some("broken part"));

        let first = extractor.extract(&msg).await.unwrap();
        let second = extractor.extract(&msg).await.unwrap();
        assert_eq!(
            (first.has_attachment, &first.suggested_name, &first.caption),
            (second.has_attachment, &second.suggested_name, &second.caption)
        );
        assert_ne!(first.path, second.path);
    }

    #[tokio::test]
    async fn document_keeps_declared_name_and_drops_caption() {
        let (transport, extractor, _dir) = setup();
        transport.add_media("doc-1", b"%PDF".to_vec()).await;
        let msg = fixtures::message(
            "3",
            Payload::Document {
                media: media("doc-1", "application/pdf"),
                file_name: Some("invoice-42.pdf".into()),
            },
        );
        let out = extractor.extract(&msg).await.unwrap();
        assert_eq!(out.suggested_name, "invoice-42.pdf");
        assert!(out.caption.is_empty());
    }

    #[tokio::test]
    async fn unnamed_document_and_audio_use_kind_names() {
        let (transport, extractor, _dir) = setup();
        transport.add_media("doc-2", vec![0]).await;
        transport.add_media("aud-1", vec![0]).await;

        let doc = fixtures::message(
            "3",
            Payload::Document {
                media: media("doc-2", "application/pdf"),
                file_name: None,
            },
        );
        assert_eq!(
            extractor.extract(&doc).await.unwrap().suggested_name,
            "document.pdf"
        );

        let audio = fixtures::message(
            "3",
            Payload::Audio {
                media: media("aud-1", "audio/mpeg"),
            },
        );
        let out = extractor.extract(&audio).await.unwrap();
        assert!(out.suggested_name.starts_with("audio."));
        assert!(out.caption.is_empty());
    }

    #[tokio::test]
    async fn unsupported_kind_notifies_sender_once() {
        let (transport, extractor, _dir) = setup();
        let msg = fixtures::message(
            "4",
            Payload::Unsupported {
                kind: "sticker".into(),
            },
        );
        let err = extractor.extract(&msg).await.unwrap_err();
        assert!(err.is_unsupported_type());
        let sent = transport.sent_to(&ChatId(msg.sender.0.clone())).await;
        assert_eq!(sent, vec![NOTICE.to_string()]);
    }

    #[tokio::test]
    async fn empty_text_is_unsupported() {
        let (transport, extractor, _dir) = setup();
        let err = extractor
            .extract(&fixtures::text("5", ""))
            .await
            .unwrap_err();
        assert!(err.is_unsupported_type());
        assert_eq!(transport.sent_messages().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_extended_text_is_still_text() {
        let (_transport, extractor, _dir) = setup();
        let msg = fixtures::message("5", Payload::ExtendedText(String::new()));
        assert!(!extractor.extract(&msg).await.unwrap().has_attachment);
    }

    #[tokio::test]
    async fn unknown_content_type_fails_before_download() {
        let (transport, extractor, _dir) = setup();
        let msg = fixtures::image("6", "img-x", "image/x-cardbridge-unknown", None);
        let err = extractor.extract(&msg).await.unwrap_err();
        assert!(matches!(err, BridgeError::NoExtension { .. }));
        assert!(transport.sent_messages().await.is_empty());
    }

    #[tokio::test]
    async fn download_failure_is_reported() {
        let (transport, extractor, _dir) = setup();
        transport.fail_downloads();
        let err = extractor
            .extract(&fixtures::image("7", "img-1", "image/png", None))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Download { .. }));
    }

    #[tokio::test]
    async fn missing_temp_dir_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::new());
        transport.add_media("img-1", vec![1]).await;
        let extractor = MediaExtractor::new(transport, dir.path().join("absent"), NOTICE);
        let err = extractor
            .extract(&fixtures::image("8", "img-1", "image/png", None))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Storage { .. }));
    }

    #[tokio::test]
    async fn ensure_and_remove_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("tmp");
        ensure_temp_dir(&nested).await.unwrap();
        assert!(nested.is_dir());

        let file = nested.join("msg-media123");
        std::fs::write(&file, b"x").unwrap();
        remove_attachment(&file).await.unwrap();
        assert!(!file.exists());
        remove_attachment(&file).await.unwrap();
    }
}
