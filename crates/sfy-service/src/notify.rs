//! # Lifecycle Notifications
//!
//! Every recorded transition fans out a push notification to the other
//! side of the booking. Dispatch is best-effort and fire-and-forget: a
//! failed send is logged and dropped, never retried, and never affects
//! the transition that triggered it. The timeline is the system of
//! record; notifications are a convenience.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sfy_booking::{ActivityEntry, ActivityType, Actor, Booking};
use sfy_core::BookingId;

/// Errors raised by a notification backend.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The push gateway rejected or failed the send.
    #[error("notification send failed: {0}")]
    Send(String),
}

/// One push notification about a booking event. Serialized as-is into the
/// push gateway payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// The booking concerned.
    pub booking: BookingId,
    /// Which role receives it.
    pub recipient: Actor,
    /// Wire tag of the triggering activity.
    pub activity: String,
    /// Human-readable message.
    pub message: String,
}

/// Push-delivery seam.
pub trait Notifier {
    /// Deliver one notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Send`] if delivery fails; callers drop the
    /// notification on error.
    fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// The notifications a recorded entry fans out to.
///
/// The counterpart of the acting role is notified; platform activities
/// notify the customer, plus the settler for money movements. Settler
/// notifications are suppressed while no settler is engaged.
pub fn notifications_for(booking: &Booking, entry: &ActivityEntry) -> Vec<Notification> {
    let recipients: Vec<Actor> = match entry.actor {
        Actor::Customer => vec![Actor::Settler],
        Actor::Settler => vec![Actor::Customer],
        Actor::System => match entry.activity {
            ActivityType::PaymentReleased => vec![Actor::Customer, Actor::Settler],
            _ => vec![Actor::Customer],
        },
    };

    recipients
        .into_iter()
        .filter(|r| *r != Actor::Settler || booking.assignment.is_some())
        .map(|recipient| Notification {
            booking: booking.id,
            recipient,
            activity: entry.activity.tag().to_string(),
            message: message_for(entry.activity),
        })
        .collect()
}

fn message_for(activity: ActivityType) -> String {
    let text = match activity {
        ActivityType::QuoteCreated => "A new quote request is available.",
        ActivityType::SettlerQuoteUpdated => "Your quote has been revised.",
        ActivityType::NotesToSettlerUpdated => "The customer updated their notes.",
        ActivityType::PaymentApproved => "Your payment has been approved.",
        ActivityType::PaymentRejected => "Your payment was rejected and the booking cancelled.",
        ActivityType::SettlerAccept | ActivityType::SettlerSelected => {
            "A settler has taken your booking."
        }
        ActivityType::SettlerServiceStart => "Your service has started.",
        ActivityType::SettlerServiceEnd => "Your service has ended.",
        ActivityType::SettlerEvidenceSubmitted | ActivityType::SettlerEvidenceUpdated => {
            "Completion evidence has been submitted for your review."
        }
        ActivityType::CustomerConfirmCompletion => "The customer confirmed completion.",
        ActivityType::DisputeRaised(_) => "The customer reported a problem with the job.",
        ActivityType::DisputeReportUpdated(_) => "The customer updated their report.",
        ActivityType::DisputeResolutionProposed(_) => "The settler proposed a resolution.",
        ActivityType::DisputeResolutionEvidenceUpdated(_) => {
            "The settler updated their resolution."
        }
        ActivityType::DisputeRejected(_) => "The settler rejected the report.",
        ActivityType::DisputeResolutionRejected(_) => "The customer rejected the resolution.",
        ActivityType::CooldownResolutionAccepted => "The customer accepted the resolution.",
        ActivityType::BookingCompleted => "Your booking is complete.",
        ActivityType::PaymentReleased => "Payment has been released.",
        ActivityType::BookingCancelledByCustomer | ActivityType::BookingCancelledBySettler => {
            "The booking has been cancelled."
        }
        ActivityType::ProblemReportSubmitted => "A problem report was filed.",
    };
    text.to_string()
}

/// Notifier that logs each send through `tracing`. Default backend for the
/// CLI and for deployments without a push gateway configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            booking = %notification.booking,
            recipient = %notification.recipient,
            activity = %notification.activity,
            "{}",
            notification.message
        );
        Ok(())
    }
}
