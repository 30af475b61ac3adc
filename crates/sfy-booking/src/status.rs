//! # Booking Status
//!
//! The closed set of booking lifecycle states.
//!
//! ## States
//!
//! ```text
//! QuotePending ──▶ AwaitingService ──▶ InProgress ──▶ EvidenceSubmitted
//!                                                          │      │
//!                                     Disputed(Incompletion)◀┘     │
//!                                        │        ▲                │
//!                        ResolutionProposed(Inc.) │                ▼
//!                                        │        │            Cooldown ──▶ Completed
//!                                        └────────┴──▶ Cooldown   │
//!                                                                 ▼
//!                                                      Disputed(Cooldown) ⇄ ...
//!
//! any non-terminal state ──▶ Cancelled
//! ```
//!
//! ## Design Decision
//!
//! The incompletion and cooldown dispute flows of the predecessor app were
//! two structurally identical code paths with parallel field names. Here
//! they are one sub-flow parameterized by [`DisputeKind`]: the disputed and
//! resolution-proposed states carry the kind, and the transition table in
//! [`crate::transitions`] is written once against it.

use serde::{Deserialize, Serialize};

/// Which post-event dispute flow a state or activity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeKind {
    /// Pre-completion dispute: the customer claims the service was not
    /// properly delivered.
    Incompletion,
    /// Post-confirmation dispute raised within the cooldown grace window.
    Cooldown,
}

impl DisputeKind {
    /// The canonical name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incompletion => "INCOMPLETION",
            Self::Cooldown => "COOLDOWN",
        }
    }

    /// The status a rejected dispute of this kind falls back to.
    pub fn origin_status(&self) -> BookingStatus {
        match self {
            Self::Incompletion => BookingStatus::EvidenceSubmitted,
            Self::Cooldown => BookingStatus::Cooldown,
        }
    }

    /// Both dispute kinds.
    pub fn all() -> [DisputeKind; 2] {
        [Self::Incompletion, Self::Cooldown]
    }
}

impl std::fmt::Display for DisputeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Quote created by the customer, broadcast to settlers.
    QuotePending,
    /// A settler has been assigned; service not yet started.
    AwaitingService,
    /// Service in progress (start code verified).
    InProgress,
    /// Settler ended the service and completion evidence is on record.
    EvidenceSubmitted,
    /// A dispute of the given kind is open, awaiting the settler.
    Disputed(DisputeKind),
    /// The settler proposed a resolution, awaiting the customer's verdict.
    ResolutionProposed(DisputeKind),
    /// Customer confirmed completion; the grace window is running.
    Cooldown,
    /// Booking completed (terminal).
    Completed,
    /// Booking cancelled (terminal).
    Cancelled,
}

impl BookingStatus {
    /// The numeric status code persisted by clients.
    ///
    /// The predecessor app wrote loosely-typed numbers ad hoc; this is the
    /// closed replacement set.
    pub fn code(&self) -> u8 {
        match self {
            Self::QuotePending => 0,
            Self::AwaitingService => 1,
            Self::InProgress => 2,
            Self::EvidenceSubmitted => 3,
            Self::Disputed(DisputeKind::Incompletion) => 4,
            Self::ResolutionProposed(DisputeKind::Incompletion) => 5,
            Self::Cooldown => 6,
            Self::Disputed(DisputeKind::Cooldown) => 7,
            Self::ResolutionProposed(DisputeKind::Cooldown) => 8,
            Self::Completed => 9,
            Self::Cancelled => 10,
        }
    }

    /// Resolve a numeric status code back to a status.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::all().iter().copied().find(|s| s.code() == code)
    }

    /// The canonical name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuotePending => "QUOTE_PENDING",
            Self::AwaitingService => "AWAITING_SERVICE",
            Self::InProgress => "IN_PROGRESS",
            Self::EvidenceSubmitted => "EVIDENCE_SUBMITTED",
            Self::Disputed(DisputeKind::Incompletion) => "DISPUTED_INCOMPLETION",
            Self::Disputed(DisputeKind::Cooldown) => "DISPUTED_COOLDOWN",
            Self::ResolutionProposed(DisputeKind::Incompletion) => {
                "RESOLUTION_PROPOSED_INCOMPLETION"
            }
            Self::ResolutionProposed(DisputeKind::Cooldown) => "RESOLUTION_PROPOSED_COOLDOWN",
            Self::Cooldown => "COOLDOWN",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a dispute of the given kind is currently in flight.
    pub fn dispute_kind(&self) -> Option<DisputeKind> {
        match self {
            Self::Disputed(kind) | Self::ResolutionProposed(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Every status, in code order.
    pub fn all() -> [BookingStatus; 11] {
        [
            Self::QuotePending,
            Self::AwaitingService,
            Self::InProgress,
            Self::EvidenceSubmitted,
            Self::Disputed(DisputeKind::Incompletion),
            Self::ResolutionProposed(DisputeKind::Incompletion),
            Self::Cooldown,
            Self::Disputed(DisputeKind::Cooldown),
            Self::ResolutionProposed(DisputeKind::Cooldown),
            Self::Completed,
            Self::Cancelled,
        ]
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
