//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all identifiers in the booking stack. These prevent
//! accidental identifier confusion — you cannot pass a `CustomerId` where a
//! `SettlerId` is expected, which matters in a system where both parties act
//! on the same booking.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a booking (one customer–settler engagement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

/// Unique identifier for a customer profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(Uuid);

/// Unique identifier for a settler (service provider) profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlerId(Uuid);

/// Unique identifier for a catalogue service offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogueId(Uuid);

/// Unique identifier for a settler's listed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlerServiceId(Uuid);

/// Unique identifier for one activity log entry in a booking timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(Uuid);

macro_rules! impl_uuid_id {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

impl_uuid_id!(BookingId, "booking");
impl_uuid_id!(CustomerId, "customer");
impl_uuid_id!(SettlerId, "settler");
impl_uuid_id!(CatalogueId, "catalogue");
impl_uuid_id!(SettlerServiceId, "settler-service");
impl_uuid_id!(ActivityId, "activity");
