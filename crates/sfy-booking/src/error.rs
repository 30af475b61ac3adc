//! # Lifecycle Errors
//!
//! Everything [`crate::Booking::apply`] can reject. Each variant names the
//! validation step that failed; the engine guarantees that a returned error
//! means the booking was not mutated at all.

use thiserror::Error;

use sfy_core::{BookingId, CoreError, Timestamp};

use crate::activity::Actor;
use crate::status::BookingStatus;

/// Errors raised by the booking lifecycle engine.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The activity is not legal from the current status for this actor.
    #[error("invalid transition: {activity} by {actor} from {status}")]
    InvalidTransition {
        /// Status the booking was in.
        status: BookingStatus,
        /// Wire tag of the rejected activity.
        activity: &'static str,
        /// Role that attempted it.
        actor: Actor,
    },

    /// The booking is in a terminal status; no activity applies.
    #[error("booking {booking} is terminal ({status}); no further transitions")]
    Terminal {
        /// The booking.
        booking: BookingId,
        /// The terminal status.
        status: BookingStatus,
    },

    /// The submitting party is not a participant of this booking.
    #[error("party {party} is not a participant of booking {booking}")]
    NotParticipant {
        /// The booking.
        booking: BookingId,
        /// Rendered party identity.
        party: String,
    },

    /// The payload shape does not match the activity.
    #[error("payload mismatch for {activity}")]
    PayloadMismatch {
        /// Wire tag of the activity.
        activity: &'static str,
    },

    /// The presented access code does not match the booking's.
    #[error("access code mismatch for {activity}")]
    AccessCodeMismatch {
        /// Wire tag of the activity.
        activity: &'static str,
    },

    /// A cooldown dispute was raised after the grace window closed.
    #[error("cooldown window closed: opened {opened_at}, attempted {attempted_at}")]
    CooldownWindowClosed {
        /// When the cooldown opened.
        opened_at: Timestamp,
        /// When the dispute was attempted.
        attempted_at: Timestamp,
    },

    /// Completion was attempted while the grace window is still running.
    #[error("cooldown window still open: opened {opened_at}, attempted {attempted_at}")]
    CooldownWindowOpen {
        /// When the cooldown opened.
        opened_at: Timestamp,
        /// When completion was attempted.
        attempted_at: Timestamp,
    },

    /// A payment decision was recorded twice.
    #[error("payment already decided: {state}")]
    PaymentAlreadyDecided {
        /// Current payment state.
        state: &'static str,
    },

    /// Payment release requires an approved payment.
    #[error("payment not approved: {state}")]
    PaymentNotApproved {
        /// Current payment state.
        state: &'static str,
    },

    /// A foundational type rejected its input.
    #[error(transparent)]
    Core(#[from] CoreError),
}
