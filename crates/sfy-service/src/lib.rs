//! # sfy-service — Application Services
//!
//! The layer between the pure lifecycle engine in `sfy-booking` and the
//! outside world:
//!
//! - [`store`] — booking persistence with compare-and-swap versioning.
//! - [`objects`] — attachment upload and the allow-then-backfill pass.
//! - [`notify`] — best-effort push notifications per recorded transition.
//! - [`service`] — the load/apply/write/notify pipeline.

pub mod notify;
pub mod objects;
pub mod service;
pub mod store;

pub use notify::{notifications_for, LogNotifier, Notification, Notifier, NotifyError};
pub use objects::{backfill_attachments, MemoryObjectStore, ObjectError, ObjectStore};
pub use service::{BookingService, ServiceError};
pub use store::{BookingStore, MemoryStore, StoreError};
