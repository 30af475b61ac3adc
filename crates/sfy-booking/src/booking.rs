//! # The Booking Aggregate
//!
//! A booking owns its full lifecycle state: quote, payment record, settler
//! assignment, service access codes, evidence, dispute cases, and the
//! append-only activity timeline. All mutation goes through
//! [`Booking::apply`], which validates a [`TransitionRequest`] in five steps
//! and either records exactly one timeline entry or rejects with a
//! [`LifecycleError`] leaving the aggregate untouched.
//!
//! The `version` counter is never advanced here; the store layer bumps it on
//! each successful compare-and-swap write.

use rand::Rng;
use serde::{Deserialize, Serialize};

use sfy_core::{
    ActivityId, BookingId, CatalogueId, CoreError, CustomerId, EvidenceBundle, Money, SettlerId,
    SettlerServiceId, Timestamp,
};

use crate::activity::{ActivityEntry, ActivityPayload, ActivityType, Actor, Party, TransitionRequest};
use crate::error::LifecycleError;
use crate::status::{BookingStatus, DisputeKind};
use crate::transitions::next_status;

/// Grace window after completion confirmation during which the customer may
/// still raise a cooldown dispute. 72 hours. The window is half-open:
/// disputes are legal strictly before the 72h mark, completion from it
/// onward, so the boundary instant belongs to exactly one regime.
pub const COOLDOWN_WINDOW_SECS: i64 = 72 * 60 * 60;

// ── Access Codes ─────────────────────────────────────────────────────

/// A six-digit numeric code the customer reads out to the settler to start
/// or end the service on site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessCode(String);

impl AccessCode {
    /// Generate a fresh random code.
    pub fn generate() -> Self {
        let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
        Self(format!("{n:06}"))
    }

    /// Build a code from a known digit string. Test and replay use.
    pub fn from_digits(digits: impl Into<String>) -> Self {
        Self(digits.into())
    }

    /// The code digits, for rendering to the customer.
    pub fn digits(&self) -> &str {
        &self.0
    }

    /// Whether a presented code matches.
    pub fn matches(&self, presented: &str) -> bool {
        self.0 == presented
    }
}

// ── Quote ────────────────────────────────────────────────────────────

/// An optional add-on the customer selected with the base service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonSelection {
    /// Add-on name as listed in the catalogue.
    pub name: String,
    /// Add-on price.
    pub price: Money,
}

/// The customer's service request, fixed at booking creation except for the
/// settler-revisable description and base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// The catalogue service requested.
    pub catalogue_id: CatalogueId,
    /// Work description.
    pub description: String,
    /// Base price.
    pub base_price: Money,
    /// Selected add-ons.
    pub addons: Vec<AddonSelection>,
    /// Requested service time (UTC).
    pub scheduled_at: Timestamp,
    /// Service address, rendered for the settler.
    pub service_address: String,
}

impl QuoteRequest {
    /// Base price plus all add-ons, overflow-checked.
    pub fn total(&self) -> Result<Money, CoreError> {
        let addons = Money::checked_sum(self.addons.iter().map(|a| a.price))?;
        self.base_price.checked_add(addons)
    }
}

// ── Payment ──────────────────────────────────────────────────────────

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Manual bank transfer with uploaded receipt.
    BankTransfer,
    /// Card payment through the gateway.
    Card,
    /// E-wallet payment through the gateway.
    EWallet,
}

/// Review state of the booking's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    /// Evidence uploaded, awaiting platform review.
    Pending,
    /// Approved by the platform.
    Approved,
    /// Rejected by the platform; the booking is cancelled.
    Rejected,
    /// Released to the settler after completion.
    Released,
}

impl PaymentState {
    /// The canonical name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Released => "RELEASED",
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The booking's payment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Payment method.
    pub method: PaymentMethod,
    /// Gateway or bank reference.
    pub reference: String,
    /// Uploaded payment evidence (receipt photos).
    pub evidence: EvidenceBundle,
    /// Review state.
    pub state: PaymentState,
}

impl PaymentDetails {
    /// A payment awaiting platform review.
    pub fn pending(method: PaymentMethod, reference: impl Into<String>, evidence: EvidenceBundle) -> Self {
        Self {
            method,
            reference: reference.into(),
            evidence,
            state: PaymentState::Pending,
        }
    }
}

// ── Participants ─────────────────────────────────────────────────────

/// The booking customer, denormalized for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Customer profile id.
    pub id: CustomerId,
    /// Display name.
    pub first_name: String,
    /// Display name.
    pub last_name: String,
}

/// The settler engaged for the booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlerAssignment {
    /// Settler profile id.
    pub settler_id: SettlerId,
    /// The settler's service listing the job runs under.
    pub settler_service_id: SettlerServiceId,
    /// Display name, denormalized.
    pub first_name: String,
    /// Display name, denormalized.
    pub last_name: String,
    /// When the settler was engaged.
    pub accepted_at: Timestamp,
}

// ── Disputes, Reports, Cancellation ──────────────────────────────────

/// How a dispute case ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeOutcome {
    /// The customer accepted the settler's resolution.
    Resolved,
    /// The settler rejected the dispute and the rejection stood.
    Rejected,
}

/// One dispute case on a booking. A booking may accumulate several (a
/// rejected incompletion dispute followed by a cooldown dispute, say); at
/// most one is open at a time, enforced by the status machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeCase {
    /// Which flow this case belongs to.
    pub kind: DisputeKind,
    /// The customer's report.
    pub report: EvidenceBundle,
    /// The settler's latest proposed resolution, if any.
    pub resolution: Option<EvidenceBundle>,
    /// When the case was opened.
    pub opened_at: Timestamp,
    /// When the case was settled, if it is.
    pub settled_at: Option<Timestamp>,
    /// How the case ended, if it did.
    pub outcome: Option<DisputeOutcome>,
}

impl DisputeCase {
    /// Whether the case is still open.
    pub fn is_open(&self) -> bool {
        self.outcome.is_none()
    }
}

/// A customer problem report. Non-status-changing; routed to support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemReport {
    /// Report content.
    pub bundle: EvidenceBundle,
    /// When it was filed.
    pub reported_at: Timestamp,
}

/// Why and by whom the booking was cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationRecord {
    /// Who cancelled.
    pub actor: Actor,
    /// Structured cancellation reasons.
    pub reasons: Vec<String>,
    /// Free-text and photo evidence.
    pub bundle: EvidenceBundle,
    /// When.
    pub cancelled_at: Timestamp,
}

// ── The Aggregate ────────────────────────────────────────────────────

/// A booking and its full lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// The customer.
    pub customer: CustomerDetails,
    /// The service request.
    pub quote: QuoteRequest,
    /// Customer notes to the settler.
    pub notes_to_settler: EvidenceBundle,
    /// Payment record.
    pub payment: PaymentDetails,
    /// The engaged settler, once one accepts or is selected.
    pub assignment: Option<SettlerAssignment>,
    /// Code verified at service start.
    pub start_code: AccessCode,
    /// Code verified at service end.
    pub end_code: AccessCode,
    /// The settler's completion evidence, once submitted.
    pub completion_evidence: Option<EvidenceBundle>,
    /// Dispute cases, in the order opened.
    pub disputes: Vec<DisputeCase>,
    /// Problem reports, in the order filed.
    pub problem_reports: Vec<ProblemReport>,
    /// Cancellation record, if the booking was cancelled by a party.
    pub cancellation: Option<CancellationRecord>,
    /// Current lifecycle status. Derived; set only by [`Booking::apply`].
    pub status: BookingStatus,
    /// Append-only activity timeline.
    pub timeline: Vec<ActivityEntry>,
    /// When the customer confirmed completion and the grace window opened.
    /// Set once; re-entering cooldown after a dispute keeps the original.
    pub cooldown_opened_at: Option<Timestamp>,
    /// Optimistic-concurrency version, bumped by the store on write.
    pub version: u64,
    /// Creation time.
    pub created_at: Timestamp,
    /// Time of the last applied activity.
    pub updated_at: Timestamp,
}

impl Booking {
    /// Open a new booking from a customer's quote request.
    ///
    /// The booking starts in [`BookingStatus::QuotePending`] with a single
    /// `QUOTE_CREATED` timeline entry and freshly generated access codes.
    pub fn open(
        customer: CustomerDetails,
        quote: QuoteRequest,
        payment: PaymentDetails,
        at: Timestamp,
    ) -> Self {
        let entry = ActivityEntry {
            id: ActivityId::new(),
            activity: ActivityType::QuoteCreated,
            actor: Actor::Customer,
            timestamp: at,
            payload: ActivityPayload::None,
        };
        Self {
            id: BookingId::new(),
            customer,
            quote,
            notes_to_settler: EvidenceBundle::default(),
            payment,
            assignment: None,
            start_code: AccessCode::generate(),
            end_code: AccessCode::generate(),
            completion_evidence: None,
            disputes: Vec::new(),
            problem_reports: Vec::new(),
            cancellation: None,
            status: BookingStatus::QuotePending,
            timeline: vec![entry],
            cooldown_opened_at: None,
            version: 0,
            created_at: at,
            updated_at: at,
        }
    }

    /// Apply a transition request.
    ///
    /// Validation runs in five steps, in order: terminal check, actor-role
    /// gate, participant check, transition-table lookup, then per-activity
    /// payload and guard validation. Nothing is mutated until every step
    /// passes; on success exactly one timeline entry is appended, the status
    /// is set to the table's derived next status, and `updated_at` moves to
    /// the request timestamp.
    ///
    /// # Errors
    ///
    /// See [`LifecycleError`]; every variant leaves the booking unchanged.
    pub fn apply(&mut self, req: TransitionRequest) -> Result<ActivityId, LifecycleError> {
        let activity = req.activity;
        let tag = activity.tag();

        // 1. Terminal bookings accept nothing.
        if self.status.is_terminal() {
            return Err(LifecycleError::Terminal {
                booking: self.id,
                status: self.status,
            });
        }

        // 2. Actor-role gate.
        let actor = req.party.role();
        if activity.required_actor() != actor {
            return Err(LifecycleError::InvalidTransition {
                status: self.status,
                activity: tag,
                actor,
            });
        }

        // 3. Participant check. SettlerAccept is the one activity a settler
        // not yet on the booking may issue; it is checked against the
        // assignment payload in step 5 instead.
        match req.party {
            Party::Customer(id) if id != self.customer.id => {
                return Err(LifecycleError::NotParticipant {
                    booking: self.id,
                    party: req.party.to_string(),
                });
            }
            Party::Settler(id) if activity != ActivityType::SettlerAccept => {
                let assigned = self.assignment.as_ref().map(|a| a.settler_id);
                if assigned != Some(id) {
                    return Err(LifecycleError::NotParticipant {
                        booking: self.id,
                        party: req.party.to_string(),
                    });
                }
            }
            _ => {}
        }

        // 4. Transition-table lookup.
        let next = next_status(self.status, activity).ok_or(LifecycleError::InvalidTransition {
            status: self.status,
            activity: tag,
            actor,
        })?;

        // 5. Payload and guard validation, then mutation. Each arm returns
        // before touching the aggregate if anything is wrong.
        match (activity, &req.payload) {
            (ActivityType::SettlerQuoteUpdated, ActivityPayload::QuoteRevision { description, price }) => {
                self.quote.description = description.clone();
                self.quote.base_price = *price;
            }

            (ActivityType::NotesToSettlerUpdated, ActivityPayload::Notes { bundle }) => {
                self.notes_to_settler = bundle.clone();
            }

            (ActivityType::PaymentApproved, ActivityPayload::None) => {
                if self.payment.state != PaymentState::Pending {
                    return Err(LifecycleError::PaymentAlreadyDecided {
                        state: self.payment.state.as_str(),
                    });
                }
                self.payment.state = PaymentState::Approved;
            }

            (ActivityType::PaymentRejected, ActivityPayload::None) => {
                if self.payment.state != PaymentState::Pending {
                    return Err(LifecycleError::PaymentAlreadyDecided {
                        state: self.payment.state.as_str(),
                    });
                }
                self.payment.state = PaymentState::Rejected;
            }

            (
                ActivityType::SettlerAccept | ActivityType::SettlerSelected,
                ActivityPayload::Assignment {
                    settler_id,
                    settler_service_id,
                    first_name,
                    last_name,
                },
            ) => {
                if let Party::Settler(id) = req.party {
                    if id != *settler_id {
                        return Err(LifecycleError::NotParticipant {
                            booking: self.id,
                            party: req.party.to_string(),
                        });
                    }
                }
                self.assignment = Some(SettlerAssignment {
                    settler_id: *settler_id,
                    settler_service_id: *settler_service_id,
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    accepted_at: req.timestamp,
                });
            }

            (ActivityType::SettlerServiceStart, ActivityPayload::ServiceCode { code }) => {
                if !self.start_code.matches(code) {
                    return Err(LifecycleError::AccessCodeMismatch { activity: tag });
                }
            }

            (ActivityType::SettlerServiceEnd, ActivityPayload::ServiceCode { code }) => {
                if !self.end_code.matches(code) {
                    return Err(LifecycleError::AccessCodeMismatch { activity: tag });
                }
            }

            (
                ActivityType::SettlerEvidenceSubmitted | ActivityType::SettlerEvidenceUpdated,
                ActivityPayload::Evidence { bundle },
            ) => {
                self.completion_evidence = Some(bundle.clone());
            }

            (ActivityType::CustomerConfirmCompletion, ActivityPayload::None) => {
                if let Some(case) = self.open_dispute_mut(DisputeKind::Incompletion) {
                    case.outcome = Some(DisputeOutcome::Resolved);
                    case.settled_at = Some(req.timestamp);
                }
                if self.cooldown_opened_at.is_none() {
                    self.cooldown_opened_at = Some(req.timestamp);
                }
            }

            (ActivityType::DisputeRaised(kind), ActivityPayload::DisputeReport { bundle }) => {
                if kind == DisputeKind::Cooldown {
                    if let Some(opened_at) = self.cooldown_opened_at {
                        if req.timestamp.secs_since(opened_at) >= COOLDOWN_WINDOW_SECS {
                            return Err(LifecycleError::CooldownWindowClosed {
                                opened_at,
                                attempted_at: req.timestamp,
                            });
                        }
                    }
                }
                self.disputes.push(DisputeCase {
                    kind,
                    report: bundle.clone(),
                    resolution: None,
                    opened_at: req.timestamp,
                    settled_at: None,
                    outcome: None,
                });
            }

            (ActivityType::DisputeReportUpdated(kind), ActivityPayload::DisputeReport { bundle }) => {
                let report = bundle.clone();
                let case = self.require_open_dispute(kind, tag, actor)?;
                case.report = report;
            }

            (
                ActivityType::DisputeResolutionProposed(kind)
                | ActivityType::DisputeResolutionEvidenceUpdated(kind),
                ActivityPayload::DisputeResolution { bundle },
            ) => {
                let resolution = bundle.clone();
                let case = self.require_open_dispute(kind, tag, actor)?;
                case.resolution = Some(resolution);
            }

            (ActivityType::DisputeRejected(kind), ActivityPayload::DisputeResolution { bundle }) => {
                let rationale = bundle.clone();
                let at = req.timestamp;
                let case = self.require_open_dispute(kind, tag, actor)?;
                case.resolution = Some(rationale);
                case.outcome = Some(DisputeOutcome::Rejected);
                case.settled_at = Some(at);
            }

            (ActivityType::DisputeResolutionRejected(kind), ActivityPayload::None) => {
                // The case stays open; the settler must re-resolve.
                self.require_open_dispute(kind, tag, actor)?;
            }

            (ActivityType::CooldownResolutionAccepted, ActivityPayload::None) => {
                let at = req.timestamp;
                let case = self.require_open_dispute(DisputeKind::Cooldown, tag, actor)?;
                case.outcome = Some(DisputeOutcome::Resolved);
                case.settled_at = Some(at);
            }

            (ActivityType::BookingCompleted, ActivityPayload::None) => {
                self.require_window_elapsed(req.timestamp)?;
            }

            (ActivityType::PaymentReleased, ActivityPayload::None) => {
                self.require_window_elapsed(req.timestamp)?;
                if self.payment.state != PaymentState::Approved {
                    return Err(LifecycleError::PaymentNotApproved {
                        state: self.payment.state.as_str(),
                    });
                }
                self.payment.state = PaymentState::Released;
            }

            (
                ActivityType::BookingCancelledByCustomer | ActivityType::BookingCancelledBySettler,
                ActivityPayload::Cancellation { reasons, bundle },
            ) => {
                self.cancellation = Some(CancellationRecord {
                    actor,
                    reasons: reasons.clone(),
                    bundle: bundle.clone(),
                    cancelled_at: req.timestamp,
                });
            }

            (ActivityType::ProblemReportSubmitted, ActivityPayload::ProblemReport { bundle }) => {
                self.problem_reports.push(ProblemReport {
                    bundle: bundle.clone(),
                    reported_at: req.timestamp,
                });
            }

            _ => return Err(LifecycleError::PayloadMismatch { activity: tag }),
        }

        let entry = ActivityEntry {
            id: ActivityId::new(),
            activity,
            actor,
            timestamp: req.timestamp,
            payload: req.payload,
        };
        let entry_id = entry.id;
        self.timeline.push(entry);
        self.status = next;
        self.updated_at = req.timestamp;
        Ok(entry_id)
    }

    /// The latest open dispute case of the given kind, if any.
    pub fn open_dispute(&self, kind: DisputeKind) -> Option<&DisputeCase> {
        self.disputes.iter().rev().find(|c| c.kind == kind && c.is_open())
    }

    fn open_dispute_mut(&mut self, kind: DisputeKind) -> Option<&mut DisputeCase> {
        self.disputes.iter_mut().rev().find(|c| c.kind == kind && c.is_open())
    }

    fn require_open_dispute(
        &mut self,
        kind: DisputeKind,
        tag: &'static str,
        actor: Actor,
    ) -> Result<&mut DisputeCase, LifecycleError> {
        let status = self.status;
        self.open_dispute_mut(kind).ok_or(LifecycleError::InvalidTransition {
            status,
            activity: tag,
            actor,
        })
    }

    fn require_window_elapsed(&self, at: Timestamp) -> Result<(), LifecycleError> {
        if let Some(opened_at) = self.cooldown_opened_at {
            if at.secs_since(opened_at) < COOLDOWN_WINDOW_SECS {
                return Err(LifecycleError::CooldownWindowOpen {
                    opened_at,
                    attempted_at: at,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfy_core::AttachmentRef;

    // ── Fixtures ─────────────────────────────────────────────────────

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn test_booking() -> (Booking, CustomerId) {
        let customer_id = CustomerId::new();
        let customer = CustomerDetails {
            id: customer_id,
            first_name: "Aina".into(),
            last_name: "Rahman".into(),
        };
        let quote = QuoteRequest {
            catalogue_id: CatalogueId::new(),
            description: "deep-clean two-bedroom apartment".into(),
            base_price: Money::from_sen(18_000),
            addons: vec![AddonSelection {
                name: "balcony".into(),
                price: Money::from_sen(3_000),
            }],
            scheduled_at: ts("2026-03-10T02:00:00Z"),
            service_address: "12 Jalan Ampang, KL".into(),
        };
        let payment = PaymentDetails::pending(
            PaymentMethod::BankTransfer,
            "MBB-7781",
            EvidenceBundle::remark_only("receipt attached"),
        );
        let mut booking = Booking::open(customer, quote, payment, ts("2026-03-09T08:00:00Z"));
        booking.start_code = AccessCode::from_digits("111111");
        booking.end_code = AccessCode::from_digits("222222");
        (booking, customer_id)
    }

    fn assign_settler(booking: &mut Booking, at: Timestamp) -> SettlerId {
        let settler_id = SettlerId::new();
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::SettlerAccept,
                    Party::Settler(settler_id),
                    ActivityPayload::Assignment {
                        settler_id,
                        settler_service_id: SettlerServiceId::new(),
                        first_name: "Farid".into(),
                        last_name: "Osman".into(),
                    },
                )
                .at(at),
            )
            .unwrap();
        settler_id
    }

    fn run_to_evidence_submitted(booking: &mut Booking) -> SettlerId {
        let settler_id = assign_settler(booking, ts("2026-03-09T09:00:00Z"));
        let settler = Party::Settler(settler_id);
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::SettlerServiceStart,
                    settler,
                    ActivityPayload::ServiceCode { code: "111111".into() },
                )
                .at(ts("2026-03-10T02:05:00Z")),
            )
            .unwrap();
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::SettlerServiceEnd,
                    settler,
                    ActivityPayload::ServiceCode { code: "222222".into() },
                )
                .at(ts("2026-03-10T05:00:00Z")),
            )
            .unwrap();
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::SettlerEvidenceSubmitted,
                    settler,
                    ActivityPayload::Evidence {
                        bundle: EvidenceBundle::remark_only("all rooms done"),
                    },
                )
                .at(ts("2026-03-10T05:10:00Z")),
            )
            .unwrap();
        settler_id
    }

    // ── Opening ──────────────────────────────────────────────────────

    #[test]
    fn test_open_records_quote_created() {
        let (booking, _) = test_booking();
        assert_eq!(booking.status, BookingStatus::QuotePending);
        assert_eq!(booking.timeline.len(), 1);
        assert_eq!(booking.timeline[0].activity, ActivityType::QuoteCreated);
        assert_eq!(booking.version, 0);
    }

    #[test]
    fn test_quote_total() {
        let (booking, _) = test_booking();
        assert_eq!(booking.quote.total().unwrap(), Money::from_sen(21_000));
    }

    // ── Happy path ───────────────────────────────────────────────────

    #[test]
    fn test_settler_accept_assigns_and_advances() {
        let (mut booking, _) = test_booking();
        let settler_id = assign_settler(&mut booking, ts("2026-03-09T09:00:00Z"));
        assert_eq!(booking.status, BookingStatus::AwaitingService);
        let assignment = booking.assignment.as_ref().unwrap();
        assert_eq!(assignment.settler_id, settler_id);
        assert_eq!(booking.timeline.len(), 2);
    }

    #[test]
    fn test_full_lifecycle_to_completed() {
        let (mut booking, customer_id) = test_booking();
        run_to_evidence_submitted(&mut booking);
        assert_eq!(booking.status, BookingStatus::EvidenceSubmitted);

        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::CustomerConfirmCompletion,
                    Party::Customer(customer_id),
                    ActivityPayload::None,
                )
                .at(ts("2026-03-10T06:00:00Z")),
            )
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Cooldown);
        assert_eq!(booking.cooldown_opened_at, Some(ts("2026-03-10T06:00:00Z")));

        // Window still open.
        let err = booking
            .apply(
                TransitionRequest::new(
                    ActivityType::BookingCompleted,
                    Party::System,
                    ActivityPayload::None,
                )
                .at(ts("2026-03-11T06:00:00Z")),
            )
            .unwrap_err();
        assert!(matches!(err, LifecycleError::CooldownWindowOpen { .. }));

        // 72h later the platform closes it.
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::BookingCompleted,
                    Party::System,
                    ActivityPayload::None,
                )
                .at(ts("2026-03-13T06:00:00Z")),
            )
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
        assert!(booking.status.is_terminal());
    }

    #[test]
    fn test_payment_release_closes_and_marks_released() {
        let (mut booking, customer_id) = test_booking();
        booking
            .apply(TransitionRequest::new(
                ActivityType::PaymentApproved,
                Party::System,
                ActivityPayload::None,
            ))
            .unwrap();
        run_to_evidence_submitted(&mut booking);
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::CustomerConfirmCompletion,
                    Party::Customer(customer_id),
                    ActivityPayload::None,
                )
                .at(ts("2026-03-10T06:00:00Z")),
            )
            .unwrap();
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::PaymentReleased,
                    Party::System,
                    ActivityPayload::None,
                )
                .at(ts("2026-03-13T06:00:01Z")),
            )
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
        assert_eq!(booking.payment.state, PaymentState::Released);
    }

    // ── Guards ───────────────────────────────────────────────────────

    #[test]
    fn test_service_start_rejects_wrong_code() {
        let (mut booking, _) = test_booking();
        let settler_id = assign_settler(&mut booking, ts("2026-03-09T09:00:00Z"));
        let err = booking
            .apply(TransitionRequest::new(
                ActivityType::SettlerServiceStart,
                Party::Settler(settler_id),
                ActivityPayload::ServiceCode { code: "999999".into() },
            ))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::AccessCodeMismatch { .. }));
        assert_eq!(booking.status, BookingStatus::AwaitingService);
        assert_eq!(booking.timeline.len(), 2);
    }

    #[test]
    fn test_payment_decided_once() {
        let (mut booking, _) = test_booking();
        booking
            .apply(TransitionRequest::new(
                ActivityType::PaymentApproved,
                Party::System,
                ActivityPayload::None,
            ))
            .unwrap();
        let err = booking
            .apply(TransitionRequest::new(
                ActivityType::PaymentApproved,
                Party::System,
                ActivityPayload::None,
            ))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::PaymentAlreadyDecided { .. }));
    }

    #[test]
    fn test_payment_rejection_cancels_booking() {
        let (mut booking, _) = test_booking();
        booking
            .apply(TransitionRequest::new(
                ActivityType::PaymentRejected,
                Party::System,
                ActivityPayload::None,
            ))
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(booking.payment.state, PaymentState::Rejected);
    }

    #[test]
    fn test_release_requires_approved_payment() {
        let (mut booking, customer_id) = test_booking();
        run_to_evidence_submitted(&mut booking);
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::CustomerConfirmCompletion,
                    Party::Customer(customer_id),
                    ActivityPayload::None,
                )
                .at(ts("2026-03-10T06:00:00Z")),
            )
            .unwrap();
        let err = booking
            .apply(
                TransitionRequest::new(
                    ActivityType::PaymentReleased,
                    Party::System,
                    ActivityPayload::None,
                )
                .at(ts("2026-03-14T06:00:00Z")),
            )
            .unwrap_err();
        assert!(matches!(err, LifecycleError::PaymentNotApproved { .. }));
        assert_eq!(booking.status, BookingStatus::Cooldown);
    }

    // ── Actor and participant gating ─────────────────────────────────

    #[test]
    fn test_wrong_role_rejected() {
        let (mut booking, customer_id) = test_booking();
        // A customer cannot issue a settler activity.
        let err = booking
            .apply(TransitionRequest::new(
                ActivityType::SettlerServiceStart,
                Party::Customer(customer_id),
                ActivityPayload::ServiceCode { code: "111111".into() },
            ))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[test]
    fn test_foreign_customer_rejected() {
        let (mut booking, _) = test_booking();
        let err = booking
            .apply(TransitionRequest::new(
                ActivityType::NotesToSettlerUpdated,
                Party::Customer(CustomerId::new()),
                ActivityPayload::Notes {
                    bundle: EvidenceBundle::remark_only("gate code is 4411"),
                },
            ))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotParticipant { .. }));
    }

    #[test]
    fn test_unassigned_settler_rejected() {
        let (mut booking, _) = test_booking();
        assign_settler(&mut booking, ts("2026-03-09T09:00:00Z"));
        let intruder = SettlerId::new();
        let err = booking
            .apply(TransitionRequest::new(
                ActivityType::SettlerServiceStart,
                Party::Settler(intruder),
                ActivityPayload::ServiceCode { code: "111111".into() },
            ))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotParticipant { .. }));
    }

    #[test]
    fn test_accept_party_must_match_assignment_payload() {
        let (mut booking, _) = test_booking();
        let err = booking
            .apply(TransitionRequest::new(
                ActivityType::SettlerAccept,
                Party::Settler(SettlerId::new()),
                ActivityPayload::Assignment {
                    settler_id: SettlerId::new(),
                    settler_service_id: SettlerServiceId::new(),
                    first_name: "Farid".into(),
                    last_name: "Osman".into(),
                },
            ))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotParticipant { .. }));
        assert!(booking.assignment.is_none());
    }

    #[test]
    fn test_payload_mismatch_rejected_before_mutation() {
        let (mut booking, _) = test_booking();
        let settler_id = assign_settler(&mut booking, ts("2026-03-09T09:00:00Z"));
        let before = booking.clone();
        let err = booking
            .apply(TransitionRequest::new(
                ActivityType::SettlerServiceStart,
                Party::Settler(settler_id),
                ActivityPayload::None,
            ))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::PayloadMismatch { .. }));
        assert_eq!(booking, before);
    }

    #[test]
    fn test_replayed_transition_rejected_not_duplicated() {
        let (mut booking, _) = test_booking();
        let settler_id = assign_settler(&mut booking, ts("2026-03-09T09:00:00Z"));
        // A delivery retry replays the accept against the updated status.
        let err = booking
            .apply(TransitionRequest::new(
                ActivityType::SettlerAccept,
                Party::Settler(settler_id),
                ActivityPayload::Assignment {
                    settler_id,
                    settler_service_id: SettlerServiceId::new(),
                    first_name: "Farid".into(),
                    last_name: "Osman".into(),
                },
            ))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
        assert_eq!(booking.timeline.len(), 2);
    }

    // ── Terminal invariant ───────────────────────────────────────────

    #[test]
    fn test_terminal_booking_rejects_everything() {
        let (mut booking, customer_id) = test_booking();
        booking
            .apply(TransitionRequest::new(
                ActivityType::BookingCancelledByCustomer,
                Party::Customer(customer_id),
                ActivityPayload::Cancellation {
                    reasons: vec!["found another provider".into()],
                    bundle: EvidenceBundle::default(),
                },
            ))
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);

        let before = booking.clone();
        let err = booking
            .apply(TransitionRequest::new(
                ActivityType::NotesToSettlerUpdated,
                Party::Customer(customer_id),
                ActivityPayload::Notes {
                    bundle: EvidenceBundle::remark_only("too late"),
                },
            ))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Terminal { .. }));
        assert_eq!(booking, before);
    }

    // ── Dispute flows ────────────────────────────────────────────────

    #[test]
    fn test_incompletion_dispute_resolved_then_confirmed() {
        let (mut booking, customer_id) = test_booking();
        let settler_id = run_to_evidence_submitted(&mut booking);
        let customer = Party::Customer(customer_id);
        let settler = Party::Settler(settler_id);

        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::DisputeRaised(DisputeKind::Incompletion),
                    customer,
                    ActivityPayload::DisputeReport {
                        bundle: EvidenceBundle::remark_only("kitchen untouched"),
                    },
                )
                .at(ts("2026-03-10T06:00:00Z")),
            )
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Disputed(DisputeKind::Incompletion));
        assert!(booking.open_dispute(DisputeKind::Incompletion).is_some());

        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::DisputeResolutionProposed(DisputeKind::Incompletion),
                    settler,
                    ActivityPayload::DisputeResolution {
                        bundle: EvidenceBundle::remark_only("returned and redone"),
                    },
                )
                .at(ts("2026-03-10T10:00:00Z")),
            )
            .unwrap();
        assert_eq!(
            booking.status,
            BookingStatus::ResolutionProposed(DisputeKind::Incompletion)
        );

        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::CustomerConfirmCompletion,
                    customer,
                    ActivityPayload::None,
                )
                .at(ts("2026-03-10T11:00:00Z")),
            )
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Cooldown);
        let case = &booking.disputes[0];
        assert_eq!(case.outcome, Some(DisputeOutcome::Resolved));
        assert_eq!(case.settled_at, Some(ts("2026-03-10T11:00:00Z")));
    }

    #[test]
    fn test_incompletion_rejection_falls_back() {
        let (mut booking, customer_id) = test_booking();
        let settler_id = run_to_evidence_submitted(&mut booking);
        booking
            .apply(TransitionRequest::new(
                ActivityType::DisputeRaised(DisputeKind::Incompletion),
                Party::Customer(customer_id),
                ActivityPayload::DisputeReport {
                    bundle: EvidenceBundle::remark_only("kitchen untouched"),
                },
            ))
            .unwrap();
        booking
            .apply(TransitionRequest::new(
                ActivityType::DisputeRejected(DisputeKind::Incompletion),
                Party::Settler(settler_id),
                ActivityPayload::DisputeResolution {
                    bundle: EvidenceBundle::remark_only("kitchen was out of scope"),
                },
            ))
            .unwrap();
        assert_eq!(booking.status, BookingStatus::EvidenceSubmitted);
        assert_eq!(booking.disputes[0].outcome, Some(DisputeOutcome::Rejected));
    }

    #[test]
    fn test_cooldown_dispute_within_window() {
        let (mut booking, customer_id) = test_booking();
        let settler_id = run_to_evidence_submitted(&mut booking);
        let customer = Party::Customer(customer_id);
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::CustomerConfirmCompletion,
                    customer,
                    ActivityPayload::None,
                )
                .at(ts("2026-03-10T06:00:00Z")),
            )
            .unwrap();

        // 71 hours in: still inside the window.
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::DisputeRaised(DisputeKind::Cooldown),
                    customer,
                    ActivityPayload::DisputeReport {
                        bundle: EvidenceBundle::remark_only("stain reappeared"),
                    },
                )
                .at(ts("2026-03-13T05:00:00Z")),
            )
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Disputed(DisputeKind::Cooldown));

        // Resolve, accept, and the original window timing still governs
        // completion.
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::DisputeResolutionProposed(DisputeKind::Cooldown),
                    Party::Settler(settler_id),
                    ActivityPayload::DisputeResolution {
                        bundle: EvidenceBundle::remark_only("treated again"),
                    },
                )
                .at(ts("2026-03-13T08:00:00Z")),
            )
            .unwrap();
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::CooldownResolutionAccepted,
                    customer,
                    ActivityPayload::None,
                )
                .at(ts("2026-03-13T09:00:00Z")),
            )
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Cooldown);
        assert_eq!(booking.cooldown_opened_at, Some(ts("2026-03-10T06:00:00Z")));

        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::BookingCompleted,
                    Party::System,
                    ActivityPayload::None,
                )
                .at(ts("2026-03-13T09:30:00Z")),
            )
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
    }

    #[test]
    fn test_cooldown_dispute_after_window_rejected() {
        let (mut booking, customer_id) = test_booking();
        run_to_evidence_submitted(&mut booking);
        let customer = Party::Customer(customer_id);
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::CustomerConfirmCompletion,
                    customer,
                    ActivityPayload::None,
                )
                .at(ts("2026-03-10T06:00:00Z")),
            )
            .unwrap();
        let err = booking
            .apply(
                TransitionRequest::new(
                    ActivityType::DisputeRaised(DisputeKind::Cooldown),
                    customer,
                    ActivityPayload::DisputeReport {
                        bundle: EvidenceBundle::remark_only("too late now"),
                    },
                )
                .at(ts("2026-03-13T06:00:01Z")),
            )
            .unwrap_err();
        assert!(matches!(err, LifecycleError::CooldownWindowClosed { .. }));
        assert_eq!(booking.status, BookingStatus::Cooldown);
        assert!(booking.disputes.is_empty());
    }

    #[test]
    fn test_window_boundary_belongs_to_completion() {
        // At exactly 72h the dispute window has closed and the completion
        // window has opened; the instant is never in both regimes.
        let (mut booking, customer_id) = test_booking();
        run_to_evidence_submitted(&mut booking);
        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::CustomerConfirmCompletion,
                    Party::Customer(customer_id),
                    ActivityPayload::None,
                )
                .at(ts("2026-03-10T06:00:00Z")),
            )
            .unwrap();

        let boundary = ts("2026-03-13T06:00:00Z");
        let err = booking
            .apply(
                TransitionRequest::new(
                    ActivityType::DisputeRaised(DisputeKind::Cooldown),
                    Party::Customer(customer_id),
                    ActivityPayload::DisputeReport {
                        bundle: EvidenceBundle::remark_only("on the line"),
                    },
                )
                .at(boundary),
            )
            .unwrap_err();
        assert!(matches!(err, LifecycleError::CooldownWindowClosed { .. }));

        booking
            .apply(
                TransitionRequest::new(
                    ActivityType::BookingCompleted,
                    Party::System,
                    ActivityPayload::None,
                )
                .at(boundary),
            )
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
    }

    #[test]
    fn test_resolution_rejection_keeps_case_open() {
        let (mut booking, customer_id) = test_booking();
        let settler_id = run_to_evidence_submitted(&mut booking);
        let kind = DisputeKind::Incompletion;
        booking
            .apply(TransitionRequest::new(
                ActivityType::DisputeRaised(kind),
                Party::Customer(customer_id),
                ActivityPayload::DisputeReport {
                    bundle: EvidenceBundle::remark_only("incomplete"),
                },
            ))
            .unwrap();
        booking
            .apply(TransitionRequest::new(
                ActivityType::DisputeResolutionProposed(kind),
                Party::Settler(settler_id),
                ActivityPayload::DisputeResolution {
                    bundle: EvidenceBundle::remark_only("fixed"),
                },
            ))
            .unwrap();
        booking
            .apply(TransitionRequest::new(
                ActivityType::DisputeResolutionRejected(kind),
                Party::Customer(customer_id),
                ActivityPayload::None,
            ))
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Disputed(kind));
        assert!(booking.open_dispute(kind).is_some());
    }

    // ── Timeline and misc ────────────────────────────────────────────

    #[test]
    fn test_timeline_is_append_only_and_ordered() {
        let (mut booking, _) = test_booking();
        run_to_evidence_submitted(&mut booking);
        assert_eq!(booking.timeline.len(), 5);
        for pair in booking.timeline.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn test_problem_report_does_not_change_status() {
        let (mut booking, customer_id) = test_booking();
        booking
            .apply(TransitionRequest::new(
                ActivityType::ProblemReportSubmitted,
                Party::Customer(customer_id),
                ActivityPayload::ProblemReport {
                    bundle: EvidenceBundle::remark_only("app crashed during upload"),
                },
            ))
            .unwrap();
        assert_eq!(booking.status, BookingStatus::QuotePending);
        assert_eq!(booking.problem_reports.len(), 1);
    }

    #[test]
    fn test_quote_revision_updates_price() {
        let (mut booking, _) = test_booking();
        let settler_id = assign_settler(&mut booking, ts("2026-03-09T09:00:00Z"));
        // Revision is only legal before acceptance.
        let err = booking
            .apply(TransitionRequest::new(
                ActivityType::SettlerQuoteUpdated,
                Party::Settler(settler_id),
                ActivityPayload::QuoteRevision {
                    description: "larger scope".into(),
                    price: Money::from_sen(25_000),
                },
            ))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
        assert_eq!(booking.quote.base_price, Money::from_sen(18_000));
    }

    #[test]
    fn test_access_codes_are_six_digits() {
        for _ in 0..32 {
            let code = AccessCode::generate();
            assert_eq!(code.0.len(), 6);
            assert!(code.0.chars().all(|c| c.is_ascii_digit()));
        }
    }

    // ── Properties ───────────────────────────────────────────────────

    /// A booking forced into an arbitrary status, with the supporting
    /// fields (assignment, cooldown clock, open dispute case) a booking in
    /// that status would carry.
    fn booking_forced_into(status: BookingStatus) -> (Booking, CustomerId, SettlerId) {
        let (mut booking, customer_id) = test_booking();
        let settler_id = assign_settler(&mut booking, ts("2026-03-09T09:00:00Z"));
        booking.status = status;
        if matches!(
            status,
            BookingStatus::Cooldown
                | BookingStatus::Disputed(DisputeKind::Cooldown)
                | BookingStatus::ResolutionProposed(DisputeKind::Cooldown)
        ) {
            booking.cooldown_opened_at = Some(ts("2026-03-10T06:00:00Z"));
        }
        if let Some(kind) = status.dispute_kind() {
            booking.disputes.push(DisputeCase {
                kind,
                report: EvidenceBundle::remark_only("report"),
                resolution: None,
                opened_at: ts("2026-03-10T07:00:00Z"),
                settled_at: None,
                outcome: None,
            });
        }
        (booking, customer_id, settler_id)
    }

    proptest::proptest! {
        #[test]
        fn prop_illegal_triples_reject_without_mutation(
            status_idx in 0usize..11,
            activity_idx in 0usize..30,
            actor_idx in 0usize..3,
        ) {
            let status = BookingStatus::all()[status_idx];
            let activity = ActivityType::all()[activity_idx];
            let (mut booking, customer_id, settler_id) = booking_forced_into(status);
            let party = match actor_idx {
                0 => Party::Customer(customer_id),
                1 => Party::Settler(settler_id),
                _ => Party::System,
            };

            let before = booking.clone();
            let illegal = next_status(status, activity).is_none()
                || activity.required_actor() != party.role();
            let result = booking.apply(
                TransitionRequest::new(activity, party, ActivityPayload::None)
                    .at(ts("2026-03-10T08:00:00Z")),
            );

            if illegal {
                proptest::prop_assert!(result.is_err());
            }
            // Any rejection, including payload and guard failures on
            // otherwise-legal triples, leaves the aggregate untouched.
            if result.is_err() {
                proptest::prop_assert_eq!(&booking, &before);
            }
        }
    }

    #[test]
    fn test_booking_serde_roundtrip() {
        let (mut booking, customer_id) = test_booking();
        booking
            .apply(TransitionRequest::new(
                ActivityType::NotesToSettlerUpdated,
                Party::Customer(customer_id),
                ActivityPayload::Notes {
                    bundle: EvidenceBundle {
                        attachments: vec![AttachmentRef::Local("file:///photo.jpg".into())],
                        remark: "front gate, unit 12".into(),
                    },
                },
            ))
            .unwrap();
        let json = serde_json::to_string(&booking).unwrap();
        let parsed: Booking = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, booking);
    }
}
