//! # Simulate Subcommand
//!
//! Runs a scripted booking lifecycle against the in-memory store and
//! prints the resulting activity timeline. Useful for demoing the status
//! machine and for eyeballing notification fan-out (enable
//! `RUST_LOG=info` to see the log notifier fire).

use clap::{Args, ValueEnum};

use sfy_booking::{
    ActivityPayload, ActivityType, AddonSelection, CustomerDetails, DisputeKind, Party,
    PaymentDetails, PaymentMethod, QuoteRequest, TransitionRequest,
};
use sfy_core::{CatalogueId, CustomerId, EvidenceBundle, Money, SettlerId, SettlerServiceId, Timestamp};
use sfy_service::{BookingService, LogNotifier, MemoryStore};

/// Which dispute flow to exercise during the run.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DisputeFlow {
    /// Raise and resolve an incompletion dispute before confirmation.
    Incompletion,
    /// Raise and resolve a cooldown dispute after confirmation.
    Cooldown,
}

impl DisputeFlow {
    fn kind(self) -> DisputeKind {
        match self {
            Self::Incompletion => DisputeKind::Incompletion,
            Self::Cooldown => DisputeKind::Cooldown,
        }
    }
}

/// Arguments for the simulate subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Exercise a dispute flow during the run.
    #[arg(long, value_enum)]
    pub dispute: Option<DisputeFlow>,

    /// Cancel the booking (as the customer) once it reaches this status,
    /// e.g. AWAITING_SERVICE.
    #[arg(long)]
    pub cancel_at: Option<String>,

    /// Emit the final booking as JSON instead of a timeline listing.
    #[arg(long)]
    pub json: bool,
}

/// Run the scripted lifecycle.
pub fn run(args: &SimulateArgs) -> anyhow::Result<()> {
    let service = BookingService::new(MemoryStore::new(), LogNotifier);

    let customer_id = CustomerId::new();
    let customer_party = Party::Customer(customer_id);
    let booking = service.open(
        CustomerDetails {
            id: customer_id,
            first_name: "Aina".into(),
            last_name: "Rahman".into(),
        },
        QuoteRequest {
            catalogue_id: CatalogueId::new(),
            description: "deep-clean two-bedroom apartment".into(),
            base_price: Money::from_sen(18_000),
            addons: vec![AddonSelection {
                name: "balcony".into(),
                price: Money::from_sen(3_000),
            }],
            scheduled_at: Timestamp::now(),
            service_address: "12 Jalan Ampang, KL".into(),
        },
        PaymentDetails::pending(
            PaymentMethod::BankTransfer,
            "MBB-7781",
            EvidenceBundle::remark_only("receipt attached"),
        ),
    )?;
    let id = booking.id;
    let base = booking.created_at.epoch_secs();
    let at = |hours: i64| Timestamp::from_epoch_secs(base + hours * 3600);

    let settler_id = SettlerId::new();
    let settler = Party::Settler(settler_id);
    let kind = args.dispute.map(DisputeFlow::kind);

    // The scripted run, as (hour offset, activity, party, payload).
    let mut script: Vec<(i64, ActivityType, Party, ActivityPayload)> = vec![
        (0, ActivityType::PaymentApproved, Party::System, ActivityPayload::None),
        (
            1,
            ActivityType::SettlerAccept,
            settler,
            ActivityPayload::Assignment {
                settler_id,
                settler_service_id: SettlerServiceId::new(),
                first_name: "Farid".into(),
                last_name: "Osman".into(),
            },
        ),
        (
            18,
            ActivityType::SettlerServiceStart,
            settler,
            ActivityPayload::ServiceCode {
                code: booking.start_code.digits().to_string(),
            },
        ),
        (
            21,
            ActivityType::SettlerServiceEnd,
            settler,
            ActivityPayload::ServiceCode {
                code: booking.end_code.digits().to_string(),
            },
        ),
        (
            21,
            ActivityType::SettlerEvidenceSubmitted,
            settler,
            ActivityPayload::Evidence {
                bundle: EvidenceBundle::remark_only("all rooms done"),
            },
        ),
    ];

    if kind == Some(DisputeKind::Incompletion) {
        script.extend([
            (
                22,
                ActivityType::DisputeRaised(DisputeKind::Incompletion),
                customer_party,
                ActivityPayload::DisputeReport {
                    bundle: EvidenceBundle::remark_only("kitchen untouched"),
                },
            ),
            (
                26,
                ActivityType::DisputeResolutionProposed(DisputeKind::Incompletion),
                settler,
                ActivityPayload::DisputeResolution {
                    bundle: EvidenceBundle::remark_only("returned and redone"),
                },
            ),
        ]);
    }

    script.push((
        27,
        ActivityType::CustomerConfirmCompletion,
        customer_party,
        ActivityPayload::None,
    ));

    if kind == Some(DisputeKind::Cooldown) {
        script.extend([
            (
                40,
                ActivityType::DisputeRaised(DisputeKind::Cooldown),
                customer_party,
                ActivityPayload::DisputeReport {
                    bundle: EvidenceBundle::remark_only("stain reappeared"),
                },
            ),
            (
                44,
                ActivityType::DisputeResolutionProposed(DisputeKind::Cooldown),
                settler,
                ActivityPayload::DisputeResolution {
                    bundle: EvidenceBundle::remark_only("treated again"),
                },
            ),
            (
                46,
                ActivityType::CooldownResolutionAccepted,
                customer_party,
                ActivityPayload::None,
            ),
        ]);
    }

    // Cooldown window runs from confirmation at hour 27.
    script.push((27 + 73, ActivityType::PaymentReleased, Party::System, ActivityPayload::None));

    let mut current = booking;
    for (hours, activity, party, payload) in script {
        if let Some(cancel_at) = &args.cancel_at {
            if current.status.as_str().eq_ignore_ascii_case(cancel_at) {
                current = service.submit(
                    id,
                    TransitionRequest::new(
                        ActivityType::BookingCancelledByCustomer,
                        customer_party,
                        ActivityPayload::Cancellation {
                            reasons: vec!["simulated cancellation".into()],
                            bundle: EvidenceBundle::default(),
                        },
                    )
                    .at(at(hours)?),
                )?;
                break;
            }
        }
        current = service.submit(
            id,
            TransitionRequest::new(activity, party, payload).at(at(hours)?),
        )?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&current)?);
        return Ok(());
    }

    println!("booking {id}");
    for entry in &current.timeline {
        println!("  {}  {:<40} {}", entry.timestamp, entry.activity.tag(), entry.actor);
    }
    println!("final status: {} (version {})", current.status, current.version);
    Ok(())
}
