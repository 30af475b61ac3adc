//! # sfy-booking — Booking Lifecycle Engine
//!
//! The status machine for Settisfy bookings: a closed [`BookingStatus`]
//! set, a table-driven legal-transition function, and the [`Booking`]
//! aggregate whose [`Booking::apply`] entry point validates actor-gated
//! [`TransitionRequest`]s and records them on an append-only timeline.
//!
//! ## Design
//!
//! - **One mutation path.** Clients never set a status; they submit an
//!   activity and the engine derives the next status from the table in
//!   [`transitions`].
//! - **Actor gating before the table.** Each activity names the one role
//!   allowed to issue it; the table itself is keyed on status only.
//! - **Parameterized disputes.** The incompletion and cooldown flows share
//!   one sub-flow parameterized by [`DisputeKind`].
//! - **All-or-nothing.** A rejected request leaves the aggregate untouched.
//!
//! Persistence, notifications, and attachment uploads live in
//! `sfy-service`; this crate is pure domain logic.

pub mod activity;
pub mod booking;
pub mod error;
pub mod status;
pub mod transitions;

pub use activity::{
    ActivityEntry, ActivityPayload, ActivityType, Actor, Party, TransitionRequest,
};
pub use booking::{
    AccessCode, AddonSelection, Booking, CancellationRecord, CustomerDetails, DisputeCase,
    DisputeOutcome, PaymentDetails, PaymentMethod, PaymentState, ProblemReport, QuoteRequest,
    SettlerAssignment, COOLDOWN_WINDOW_SECS,
};
pub use error::LifecycleError;
pub use status::{BookingStatus, DisputeKind};
pub use transitions::{legal_activities, next_status};
