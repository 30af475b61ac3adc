//! # Activities, Actors, and the Timeline
//!
//! An activity is one tagged lifecycle event. The booking timeline is an
//! append-only sequence of [`ActivityEntry`] records; insertion order is the
//! sole ordering signal.
//!
//! ## Wire Tags
//!
//! Activity types serialize as the SCREAMING_SNAKE labels the mobile clients
//! already persist (`QUOTE_CREATED`, `SETTLER_ACCEPT`, `JOB_INCOMPLETE`,
//! ...). The dispute-flow variants carry a [`DisputeKind`] in memory but
//! keep their historical per-kind tags on the wire, so existing documents
//! parse unchanged.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use sfy_core::{ActivityId, CustomerId, EvidenceBundle, Money, SettlerId, SettlerServiceId, Timestamp};

use crate::status::DisputeKind;

// ── Actors ───────────────────────────────────────────────────────────

/// Which role produced a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    /// The booking customer.
    Customer,
    /// The assigned (or accepting) settler.
    Settler,
    /// Platform automation (payment review, cooldown expiry).
    System,
}

impl Actor {
    /// The canonical name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Settler => "SETTLER",
            Self::System => "SYSTEM",
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated party submitting a transition.
///
/// The engine never reads ambient session state; the caller resolves the
/// current user against the identity provider and passes the party in
/// explicitly with every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Party {
    /// A customer, identified by profile id.
    Customer(CustomerId),
    /// A settler, identified by profile id.
    Settler(SettlerId),
    /// Platform automation.
    System,
}

impl Party {
    /// The role this party acts as.
    pub fn role(&self) -> Actor {
        match self {
            Self::Customer(_) => Actor::Customer,
            Self::Settler(_) => Actor::Settler,
            Self::System => Actor::System,
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer(id) => write!(f, "{id}"),
            Self::Settler(id) => write!(f, "{id}"),
            Self::System => f.write_str("system"),
        }
    }
}

// ── Activity Types ───────────────────────────────────────────────────

/// The closed set of booking lifecycle events.
///
/// Dispute-flow variants are parameterized by [`DisputeKind`]; everything
/// else is a plain tag. [`ActivityType::required_actor`] partitions the set
/// by which role may issue each event — the transition table in
/// [`crate::transitions`] is keyed on status only, actor gating happens
/// before the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    /// Customer created the quote. Recorded once, by [`crate::Booking::open`].
    QuoteCreated,
    /// Settler revised the manual quote price.
    SettlerQuoteUpdated,
    /// Customer updated the notes-to-settler bundle.
    NotesToSettlerUpdated,
    /// Platform approved the payment evidence.
    PaymentApproved,
    /// Platform rejected the payment evidence; cancels the booking.
    PaymentRejected,
    /// A settler accepted the broadcast quote.
    SettlerAccept,
    /// The customer assigned a settler directly.
    SettlerSelected,
    /// Settler started the service (start code verified).
    SettlerServiceStart,
    /// Settler ended the service (end code verified).
    SettlerServiceEnd,
    /// Settler submitted completion evidence.
    SettlerEvidenceSubmitted,
    /// Settler replaced the completion evidence bundle.
    SettlerEvidenceUpdated,
    /// Customer confirmed completion; opens (or re-enters) the cooldown.
    CustomerConfirmCompletion,
    /// Customer raised a dispute of the given kind.
    DisputeRaised(DisputeKind),
    /// Customer updated an open dispute report.
    DisputeReportUpdated(DisputeKind),
    /// Settler proposed a resolution for an open dispute.
    DisputeResolutionProposed(DisputeKind),
    /// Settler revised the proposed resolution evidence.
    DisputeResolutionEvidenceUpdated(DisputeKind),
    /// Settler rejected the dispute outright.
    DisputeRejected(DisputeKind),
    /// Customer rejected the proposed resolution.
    DisputeResolutionRejected(DisputeKind),
    /// Customer accepted a cooldown resolution; the window keeps running.
    CooldownResolutionAccepted,
    /// Platform closed the booking after the cooldown window elapsed.
    BookingCompleted,
    /// Platform released the payment, closing the booking.
    PaymentReleased,
    /// Customer cancelled the booking.
    BookingCancelledByCustomer,
    /// Settler cancelled the booking.
    BookingCancelledBySettler,
    /// Customer filed a problem report (non-status-changing).
    ProblemReportSubmitted,
}

impl ActivityType {
    /// The wire tag, matching the labels persisted by the mobile clients.
    pub fn tag(&self) -> &'static str {
        use DisputeKind::{Cooldown, Incompletion};
        match self {
            Self::QuoteCreated => "QUOTE_CREATED",
            Self::SettlerQuoteUpdated => "SETTLER_QUOTE_UPDATED",
            Self::NotesToSettlerUpdated => "NOTES_TO_SETTLER_UPDATED",
            Self::PaymentApproved => "PAYMENT_APPROVED",
            Self::PaymentRejected => "PAYMENT_REJECTED",
            Self::SettlerAccept => "SETTLER_ACCEPT",
            Self::SettlerSelected => "SETTLER_SELECTED",
            Self::SettlerServiceStart => "SETTLER_SERVICE_START",
            Self::SettlerServiceEnd => "SETTLER_SERVICE_END",
            Self::SettlerEvidenceSubmitted => "SETTLER_EVIDENCE_SUBMITTED",
            Self::SettlerEvidenceUpdated => "SETTLER_EVIDENCE_UPDATED",
            Self::CustomerConfirmCompletion => "CUSTOMER_CONFIRM_COMPLETION",
            Self::DisputeRaised(Incompletion) => "JOB_INCOMPLETE",
            Self::DisputeRaised(Cooldown) => "COOLDOWN_REPORT_SUBMITTED",
            Self::DisputeReportUpdated(Incompletion) => "CUSTOMER_JOB_INCOMPLETE_UPDATED",
            Self::DisputeReportUpdated(Cooldown) => "CUSTOMER_COOLDOWN_REPORT_UPDATED",
            Self::DisputeResolutionProposed(Incompletion) => "SETTLER_RESOLVE_INCOMPLETION",
            Self::DisputeResolutionProposed(Cooldown) => "SETTLER_RESOLVE_COOLDOWN_REPORT",
            Self::DisputeResolutionEvidenceUpdated(Incompletion) => {
                "SETTLER_UPDATE_INCOMPLETION_EVIDENCE"
            }
            Self::DisputeResolutionEvidenceUpdated(Cooldown) => {
                "SETTLER_UPDATE_COOLDOWN_REPORT_EVIDENCE"
            }
            Self::DisputeRejected(Incompletion) => "SETTLER_REJECT_INCOMPLETION",
            Self::DisputeRejected(Cooldown) => "SETTLER_REJECT_COOLDOWN_REPORT",
            Self::DisputeResolutionRejected(Incompletion) => "CUSTOMER_REJECT_INCOMPLETION_RESOLVE",
            Self::DisputeResolutionRejected(Cooldown) => "CUSTOMER_COOLDOWN_REPORT_NOT_RESOLVED",
            Self::CooldownResolutionAccepted => "COOLDOWN_REPORT_COMPLETED",
            Self::BookingCompleted => "BOOKING_COMPLETED",
            Self::PaymentReleased => "PAYMENT_RELEASED",
            Self::BookingCancelledByCustomer => "BOOKING_CANCELLED_BY_CUSTOMER",
            Self::BookingCancelledBySettler => "BOOKING_CANCELLED_BY_SETTLER",
            Self::ProblemReportSubmitted => "REPORT_SUBMITTED",
        }
    }

    /// Resolve a wire tag back to an activity type.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::all().into_iter().find(|a| a.tag() == tag)
    }

    /// The only role allowed to issue this activity.
    pub fn required_actor(&self) -> Actor {
        match self {
            Self::QuoteCreated
            | Self::NotesToSettlerUpdated
            | Self::SettlerSelected
            | Self::CustomerConfirmCompletion
            | Self::DisputeRaised(_)
            | Self::DisputeReportUpdated(_)
            | Self::DisputeResolutionRejected(_)
            | Self::CooldownResolutionAccepted
            | Self::BookingCancelledByCustomer
            | Self::ProblemReportSubmitted => Actor::Customer,

            Self::SettlerQuoteUpdated
            | Self::SettlerAccept
            | Self::SettlerServiceStart
            | Self::SettlerServiceEnd
            | Self::SettlerEvidenceSubmitted
            | Self::SettlerEvidenceUpdated
            | Self::DisputeResolutionProposed(_)
            | Self::DisputeResolutionEvidenceUpdated(_)
            | Self::DisputeRejected(_)
            | Self::BookingCancelledBySettler => Actor::Settler,

            Self::PaymentApproved
            | Self::PaymentRejected
            | Self::BookingCompleted
            | Self::PaymentReleased => Actor::System,
        }
    }

    /// Every activity type, dispute variants expanded per kind.
    pub fn all() -> Vec<ActivityType> {
        let mut out = vec![
            Self::QuoteCreated,
            Self::SettlerQuoteUpdated,
            Self::NotesToSettlerUpdated,
            Self::PaymentApproved,
            Self::PaymentRejected,
            Self::SettlerAccept,
            Self::SettlerSelected,
            Self::SettlerServiceStart,
            Self::SettlerServiceEnd,
            Self::SettlerEvidenceSubmitted,
            Self::SettlerEvidenceUpdated,
            Self::CustomerConfirmCompletion,
            Self::CooldownResolutionAccepted,
            Self::BookingCompleted,
            Self::PaymentReleased,
            Self::BookingCancelledByCustomer,
            Self::BookingCancelledBySettler,
            Self::ProblemReportSubmitted,
        ];
        for kind in DisputeKind::all() {
            out.push(Self::DisputeRaised(kind));
            out.push(Self::DisputeReportUpdated(kind));
            out.push(Self::DisputeResolutionProposed(kind));
            out.push(Self::DisputeResolutionEvidenceUpdated(kind));
            out.push(Self::DisputeRejected(kind));
            out.push(Self::DisputeResolutionRejected(kind));
        }
        out
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for ActivityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Self::from_tag(&tag)
            .ok_or_else(|| D::Error::custom(format!("unknown activity tag: {tag:?}")))
    }
}

// ── Payloads ─────────────────────────────────────────────────────────

/// Event-specific data carried by a transition request and recorded on the
/// resulting timeline entry.
///
/// Each activity type expects exactly one payload shape; a mismatch is
/// rejected with [`crate::LifecycleError::PayloadMismatch`] before anything
/// is mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityPayload {
    /// No event-specific data.
    None,
    /// Replacement notes-to-settler bundle.
    Notes { bundle: EvidenceBundle },
    /// Completion evidence bundle.
    Evidence { bundle: EvidenceBundle },
    /// Dispute report bundle (raise or update).
    DisputeReport { bundle: EvidenceBundle },
    /// Dispute resolution bundle (proposal, revision, or rejection rationale).
    DisputeResolution { bundle: EvidenceBundle },
    /// Revised manual quote.
    QuoteRevision {
        /// Updated work description.
        description: String,
        /// Updated base price.
        price: Money,
    },
    /// Settler assignment (accept or direct selection).
    Assignment {
        /// The settler taking the job.
        settler_id: SettlerId,
        /// The settler's service listing the job runs under.
        settler_service_id: SettlerServiceId,
        /// Display name copied onto the booking.
        first_name: String,
        /// Display name copied onto the booking.
        last_name: String,
    },
    /// Start or end access code presented by the settler.
    ServiceCode {
        /// The code as read out by the customer.
        code: String,
    },
    /// Cancellation evidence.
    Cancellation {
        /// Structured cancellation reasons.
        reasons: Vec<String>,
        /// Free-text and photo evidence.
        bundle: EvidenceBundle,
    },
    /// Problem report bundle.
    ProblemReport { bundle: EvidenceBundle },
}

// ── Timeline Entries ─────────────────────────────────────────────────

/// One immutable fact on a booking timeline.
///
/// Created once by the engine, never mutated or deleted. The booking is the
/// sole owner; entries are not separately addressable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Unique entry identifier.
    pub id: ActivityId,
    /// What happened.
    #[serde(rename = "type")]
    pub activity: ActivityType,
    /// Which role produced the event.
    pub actor: Actor,
    /// Event time (UTC).
    pub timestamp: Timestamp,
    /// Event-specific data.
    pub payload: ActivityPayload,
}

/// A proposed transition, submitted by an authenticated party.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    /// The requested activity.
    pub activity: ActivityType,
    /// The party issuing it.
    pub party: Party,
    /// Event-specific data.
    pub payload: ActivityPayload,
    /// Event time. Defaults to now; explicit for replays and tests.
    pub timestamp: Timestamp,
}

impl TransitionRequest {
    /// Build a request timestamped now.
    pub fn new(activity: ActivityType, party: Party, payload: ActivityPayload) -> Self {
        Self {
            activity,
            party,
            payload,
            timestamp: Timestamp::now(),
        }
    }

    /// Override the event time.
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}
