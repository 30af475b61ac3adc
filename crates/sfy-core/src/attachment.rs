//! # Attachment References and Evidence Bundles
//!
//! Evidence images (payment proofs, completion photos, dispute reports)
//! are uploaded to object storage asynchronously. A lifecycle transition
//! may be recorded while its attachments are still on the device, so an
//! attachment reference has two phases:
//!
//! - [`AttachmentRef::Local`] — a device-side handle, not yet durable.
//! - [`AttachmentRef::Stored`] — a durable object-storage URL.
//!
//! Local handles are back-filled to stored URLs after upload completes.
//! Consumers must tolerate bundles that are briefly incomplete.

use serde::{Deserialize, Serialize};

/// A reference to one evidence attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "ref", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentRef {
    /// A device-local handle (e.g. `file://...`), pending upload.
    Local(String),
    /// A durable object-storage URL.
    Stored(String),
}

impl AttachmentRef {
    /// Whether the attachment has been durably stored.
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }

    /// The durable URL, if the attachment has been stored.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Stored(url) => Some(url),
            Self::Local(_) => None,
        }
    }
}

/// A list of attachments plus a free-text remark.
///
/// One bundle per evidence concern on a booking: notes to the settler,
/// payment evidence, completion evidence, dispute reports and resolutions,
/// cancellation evidence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvidenceBundle {
    /// Attachment references, in submission order.
    pub attachments: Vec<AttachmentRef>,
    /// Free-text remark accompanying the attachments.
    pub remark: String,
}

impl EvidenceBundle {
    /// Create a bundle with a remark and no attachments.
    pub fn remark_only(remark: impl Into<String>) -> Self {
        Self {
            attachments: Vec::new(),
            remark: remark.into(),
        }
    }

    /// Create a bundle from local device handles.
    pub fn from_local<I, S>(handles: I, remark: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attachments: handles
                .into_iter()
                .map(|h| AttachmentRef::Local(h.into()))
                .collect(),
            remark: remark.into(),
        }
    }

    /// Whether every attachment has been durably stored.
    ///
    /// An empty bundle is trivially uploaded.
    pub fn is_fully_uploaded(&self) -> bool {
        self.attachments.iter().all(AttachmentRef::is_stored)
    }

    /// Whether the bundle carries neither attachments nor a remark.
    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty() && self.remark.is_empty()
    }
}
