//! # sfy-core — Foundational Types for the Settisfy Booking Stack
//!
//! This crate is the leaf of the workspace DAG. It defines the domain
//! primitives every other `sfy-*` crate builds on; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `BookingId`, `CustomerId`,
//!    `SettlerId`, `CatalogueId`, `SettlerServiceId`, `ActivityId` — all
//!    newtypes over UUIDs. No bare strings for identifiers; a customer id
//!    cannot be passed where a settler id is expected.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision. Booking timelines are ordered by these
//!    timestamps, so local offsets are rejected at construction.
//!
//! 3. **No floats for money.** `Money` stores integer minor units (sen).
//!    The mobile predecessor kept booking totals as doubles; that defect
//!    class is excluded here by construction.
//!
//! 4. **Two-phase attachments.** Evidence images start as `Local` device
//!    handles and are back-filled to `Stored` URLs once object storage
//!    confirms the upload. Consumers must tolerate bundles that are briefly
//!    incomplete.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sfy-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod attachment;
pub mod error;
pub mod identity;
pub mod money;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use attachment::{AttachmentRef, EvidenceBundle};
pub use error::CoreError;
pub use identity::{
    ActivityId, BookingId, CatalogueId, CustomerId, SettlerId, SettlerServiceId,
};
pub use money::Money;
pub use temporal::Timestamp;
