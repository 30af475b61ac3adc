//! # Booking Service
//!
//! The application-level entry point: load the aggregate, run the
//! lifecycle engine, write back with compare-and-swap, then fan out
//! notifications best-effort. A version conflict surfaces as
//! [`ServiceError::ConcurrentModification`]; the caller reloads the
//! booking and resubmits against fresh state.

use thiserror::Error;

use sfy_booking::{
    Booking, CustomerDetails, LifecycleError, PaymentDetails, QuoteRequest, TransitionRequest,
};
use sfy_core::{BookingId, Timestamp};

use crate::notify::{notifications_for, Notifier};
use crate::store::{BookingStore, StoreError};

/// Errors raised by the booking service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No booking with the given id.
    #[error("booking {0} not found")]
    NotFound(BookingId),

    /// The booking was modified between load and write; reload and retry.
    #[error("booking {0} was modified concurrently")]
    ConcurrentModification(BookingId),

    /// The lifecycle engine rejected the transition.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// The store failed for a non-conflict reason.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Conflict { booking, .. } => Self::ConcurrentModification(booking),
            other => Self::Store(other),
        }
    }
}

/// Booking application service over a store and a notifier.
#[derive(Debug)]
pub struct BookingService<S, N> {
    store: S,
    notifier: N,
}

impl<S: BookingStore, N: Notifier> BookingService<S, N> {
    /// Build a service over the given backends.
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open a new booking and persist it.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn open(
        &self,
        customer: CustomerDetails,
        quote: QuoteRequest,
        payment: PaymentDetails,
    ) -> Result<Booking, ServiceError> {
        let booking = Booking::open(customer, quote, payment, Timestamp::now());
        self.store.insert(booking.clone())?;
        tracing::info!(booking = %booking.id, "booking opened");
        Ok(booking)
    }

    /// Load a booking.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if absent.
    pub fn get(&self, id: BookingId) -> Result<Booking, ServiceError> {
        Ok(self.store.get(id)?)
    }

    /// Apply one transition to a booking: load, run the engine, CAS-write,
    /// notify. Returns the updated booking.
    ///
    /// Notification delivery is best-effort; a failed send is logged and
    /// the transition still succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ConcurrentModification`] if the booking
    /// changed between load and write, or the engine's rejection.
    pub fn submit(
        &self,
        id: BookingId,
        request: TransitionRequest,
    ) -> Result<Booking, ServiceError> {
        let mut booking = self.store.get(id)?;
        let loaded_version = booking.version;
        let activity = request.activity;

        let entry_id = booking.apply(request)?;
        booking.version = self.store.update(booking.clone(), loaded_version)?;
        tracing::info!(
            booking = %booking.id,
            activity = activity.tag(),
            status = %booking.status,
            version = booking.version,
            "transition recorded"
        );

        if let Some(entry) = booking.timeline.iter().find(|e| e.id == entry_id) {
            for notification in notifications_for(&booking, entry) {
                if let Err(e) = self.notifier.send(&notification) {
                    tracing::warn!(
                        booking = %booking.id,
                        recipient = %notification.recipient,
                        error = %e,
                        "notification dropped"
                    );
                }
            }
        }

        Ok(booking)
    }
}
