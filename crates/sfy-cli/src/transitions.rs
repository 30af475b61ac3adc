//! # Transitions Subcommand
//!
//! Prints the legal-transition table: for each status, the activities it
//! accepts, the role gate, and the derived next status.

use clap::Args;

use sfy_booking::{legal_activities, BookingStatus};

/// Arguments for the transitions subcommand.
#[derive(Args, Debug)]
pub struct TransitionsArgs {
    /// Emit the table as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Print the transition table.
pub fn run(args: &TransitionsArgs) -> anyhow::Result<()> {
    if args.json {
        let table: Vec<serde_json::Value> = BookingStatus::all()
            .into_iter()
            .map(|status| {
                let rows: Vec<serde_json::Value> = legal_activities(status)
                    .into_iter()
                    .map(|(activity, next)| {
                        serde_json::json!({
                            "activity": activity.tag(),
                            "actor": activity.required_actor().as_str(),
                            "next": next.as_str(),
                        })
                    })
                    .collect();
                serde_json::json!({ "status": status.as_str(), "transitions": rows })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    for status in BookingStatus::all() {
        let rows = legal_activities(status);
        if rows.is_empty() {
            println!("{status}  (terminal)");
            continue;
        }
        println!("{status}");
        for (activity, next) in rows {
            println!(
                "  {:<40} [{:<8}] -> {}",
                activity.tag(),
                activity.required_actor().as_str(),
                next.as_str()
            );
        }
    }
    Ok(())
}
