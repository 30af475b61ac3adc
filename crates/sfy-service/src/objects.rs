//! # Object Storage and Attachment Backfill
//!
//! Evidence attachments follow allow-then-backfill: a transition is
//! recorded with device-local attachment handles, then the handles are
//! uploaded and rewritten to durable URLs. A failed upload leaves its
//! handle local and is retried on the next backfill pass; it never rolls
//! back the transition that carried it.

use thiserror::Error;

use sfy_core::{AttachmentRef, BookingId, EvidenceBundle};

/// Errors raised by an object store.
#[derive(Error, Debug)]
pub enum ObjectError {
    /// The upload failed (network, quota, corrupt source).
    #[error("attachment upload failed for {handle}: {reason}")]
    Upload {
        /// The local handle that failed.
        handle: String,
        /// Backend-reported reason.
        reason: String,
    },
}

/// Upload seam for evidence attachments.
pub trait ObjectStore {
    /// Upload one device-local attachment for a booking and return its
    /// durable URL.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectError::Upload`] if the backend rejects the upload.
    fn put(&self, booking: BookingId, handle: &str) -> Result<String, ObjectError>;
}

/// Rewrite every [`AttachmentRef::Local`] in a bundle to
/// [`AttachmentRef::Stored`] by uploading it.
///
/// Failures are tolerated per attachment: the failing handle stays local,
/// a warning is logged, and the pass continues. Returns how many
/// attachments were uploaded; the caller persists the bundle and re-runs
/// the pass later if `bundle.is_fully_uploaded()` is still false.
pub fn backfill_attachments(
    objects: &dyn ObjectStore,
    booking: BookingId,
    bundle: &mut EvidenceBundle,
) -> usize {
    let mut uploaded = 0;
    for attachment in &mut bundle.attachments {
        let AttachmentRef::Local(handle) = attachment else {
            continue;
        };
        match objects.put(booking, handle) {
            Ok(url) => {
                *attachment = AttachmentRef::Stored(url);
                uploaded += 1;
            }
            Err(e) => {
                tracing::warn!(booking = %booking, error = %e, "attachment backfill failed, will retry");
            }
        }
    }
    uploaded
}

/// In-memory object store. Uploads succeed with a deterministic `mem://`
/// URL unless the handle has been marked to fail.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    failing: std::sync::RwLock<Vec<String>>,
}

impl MemoryObjectStore {
    /// An object store where every upload succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make uploads of the given handle fail until cleared.
    pub fn fail_handle(&self, handle: impl Into<String>) {
        if let Ok(mut failing) = self.failing.write() {
            failing.push(handle.into());
        }
    }

    /// Clear all injected failures.
    pub fn clear_failures(&self) {
        if let Ok(mut failing) = self.failing.write() {
            failing.clear();
        }
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put(&self, booking: BookingId, handle: &str) -> Result<String, ObjectError> {
        let failing = self
            .failing
            .read()
            .map(|f| f.iter().any(|h| h == handle))
            .unwrap_or(false);
        if failing {
            return Err(ObjectError::Upload {
                handle: handle.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        let name = handle.rsplit('/').next().unwrap_or(handle);
        Ok(format!("mem://bookings/{}/{name}", booking.as_uuid()))
    }
}
