//! # Booking Store — Optimistic Concurrency
//!
//! Bookings are shared documents: the customer and the settler act on the
//! same aggregate from separate devices. The store therefore writes with
//! compare-and-swap on the aggregate's `version` counter; a stale write
//! fails with [`StoreError::Conflict`] and the caller reloads and retries.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use sfy_booking::Booking;
use sfy_core::BookingId;

/// Errors raised by a booking store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No booking with the given id.
    #[error("booking {0} not found")]
    NotFound(BookingId),

    /// The booking changed since it was loaded.
    #[error("version conflict on booking {booking}: expected {expected}, stored {stored}")]
    Conflict {
        /// The booking.
        booking: BookingId,
        /// The version the writer loaded.
        expected: u64,
        /// The version currently stored.
        stored: u64,
    },

    /// A booking with the same id already exists.
    #[error("booking {0} already exists")]
    AlreadyExists(BookingId),

    /// The store's lock was poisoned by a panicking writer.
    #[error("booking store lock poisoned")]
    Poisoned,
}

/// Persistence seam for booking aggregates.
///
/// `update` is compare-and-swap: the write succeeds only if the stored
/// version still equals `expected_version`, and bumps the stored version by
/// one. The engine never touches `version`; only the store does.
pub trait BookingStore {
    /// Persist a new booking.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if the id is taken.
    fn insert(&self, booking: Booking) -> Result<(), StoreError>;

    /// Load a booking by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if absent.
    fn get(&self, id: BookingId) -> Result<Booking, StoreError>;

    /// Write a modified booking if the stored version still matches.
    /// Returns the new stored version on success.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] on a stale write and
    /// [`StoreError::NotFound`] if the booking vanished.
    fn update(&self, booking: Booking, expected_version: u64) -> Result<u64, StoreError>;
}

/// In-memory booking store. Reference implementation and test double; a
/// production deployment backs this trait with a document database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bookings: RwLock<HashMap<BookingId, Booking>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bookings held.
    pub fn len(&self) -> usize {
        self.bookings.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BookingStore for MemoryStore {
    fn insert(&self, booking: Booking) -> Result<(), StoreError> {
        let mut map = self.bookings.write().map_err(|_| StoreError::Poisoned)?;
        if map.contains_key(&booking.id) {
            return Err(StoreError::AlreadyExists(booking.id));
        }
        map.insert(booking.id, booking);
        Ok(())
    }

    fn get(&self, id: BookingId) -> Result<Booking, StoreError> {
        let map = self.bookings.read().map_err(|_| StoreError::Poisoned)?;
        map.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn update(&self, mut booking: Booking, expected_version: u64) -> Result<u64, StoreError> {
        let mut map = self.bookings.write().map_err(|_| StoreError::Poisoned)?;
        let stored = map
            .get(&booking.id)
            .ok_or(StoreError::NotFound(booking.id))?;
        if stored.version != expected_version {
            return Err(StoreError::Conflict {
                booking: booking.id,
                expected: expected_version,
                stored: stored.version,
            });
        }
        booking.version = expected_version + 1;
        let new_version = booking.version;
        map.insert(booking.id, booking);
        Ok(new_version)
    }
}
