//! # The Legal-Transition Table
//!
//! One total function from `(current status, activity)` to the derived next
//! status. A `None` result means the transition is illegal from that status;
//! actor gating and payload/guard validation happen in
//! [`crate::Booking::apply`] around this lookup.
//!
//! The table is the single source of truth for the state machine: the
//! engine, the CLI table printer, and the property tests all read it.

use crate::activity::ActivityType;
use crate::status::BookingStatus;

/// The status a booking moves to when `activity` is applied while in
/// `current`, or `None` if the transition is illegal.
///
/// Terminal statuses have no legal activities. Self-loops (evidence
/// updates, quote revisions, problem reports) are deliberate: they append a
/// timeline entry without changing status.
pub fn next_status(current: BookingStatus, activity: ActivityType) -> Option<BookingStatus> {
    use ActivityType as A;
    use BookingStatus as S;

    if current.is_terminal() {
        return None;
    }

    // Cancellation is legal from every non-terminal status and is recorded
    // distinctly per actor.
    if matches!(
        activity,
        A::BookingCancelledByCustomer | A::BookingCancelledBySettler
    ) {
        return Some(S::Cancelled);
    }

    match (current, activity) {
        // ── Quote phase ──────────────────────────────────────────────
        (S::QuotePending, A::SettlerQuoteUpdated) => Some(S::QuotePending),
        (S::QuotePending | S::AwaitingService, A::NotesToSettlerUpdated) => Some(current),
        (S::QuotePending, A::PaymentApproved) => Some(S::QuotePending),
        (S::QuotePending, A::PaymentRejected) => Some(S::Cancelled),
        (S::QuotePending, A::SettlerAccept | A::SettlerSelected) => Some(S::AwaitingService),

        // ── Service phase ────────────────────────────────────────────
        (S::AwaitingService, A::SettlerServiceStart) => Some(S::InProgress),
        (S::InProgress, A::SettlerServiceEnd) => Some(S::EvidenceSubmitted),
        (
            S::EvidenceSubmitted,
            A::SettlerEvidenceSubmitted | A::SettlerEvidenceUpdated,
        ) => Some(S::EvidenceSubmitted),

        // ── Completion and cooldown ──────────────────────────────────
        (S::EvidenceSubmitted, A::CustomerConfirmCompletion) => Some(S::Cooldown),
        (S::Cooldown, A::BookingCompleted | A::PaymentReleased) => Some(S::Completed),

        // ── Parameterized dispute sub-flow ───────────────────────────
        (S::EvidenceSubmitted, A::DisputeRaised(kind)) if kind.origin_status() == current => {
            Some(S::Disputed(kind))
        }
        (S::Cooldown, A::DisputeRaised(kind)) if kind.origin_status() == current => {
            Some(S::Disputed(kind))
        }
        (S::Disputed(open), A::DisputeReportUpdated(kind)) if open == kind => {
            Some(S::Disputed(kind))
        }
        (S::Disputed(open), A::DisputeResolutionProposed(kind)) if open == kind => {
            Some(S::ResolutionProposed(kind))
        }
        (S::Disputed(open), A::DisputeRejected(kind)) if open == kind => {
            Some(kind.origin_status())
        }
        (S::ResolutionProposed(open), A::DisputeResolutionEvidenceUpdated(kind)) if open == kind => {
            Some(S::ResolutionProposed(kind))
        }
        (S::ResolutionProposed(open), A::DisputeResolutionRejected(kind)) if open == kind => {
            Some(S::Disputed(kind))
        }
        (
            S::ResolutionProposed(crate::DisputeKind::Incompletion),
            A::CustomerConfirmCompletion,
        ) => Some(S::Cooldown),
        (
            S::ResolutionProposed(crate::DisputeKind::Cooldown),
            A::CooldownResolutionAccepted,
        ) => Some(S::Cooldown),

        // ── Non-status-changing extras ───────────────────────────────
        (_, A::ProblemReportSubmitted) => Some(current),

        _ => None,
    }
}

/// The activities legal from a status, paired with their derived next
/// status. Used by the CLI table printer.
pub fn legal_activities(status: BookingStatus) -> Vec<(ActivityType, BookingStatus)> {
    ActivityType::all()
        .into_iter()
        .filter_map(|a| next_status(status, a).map(|next| (a, next)))
        .collect()
}
