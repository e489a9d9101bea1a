//! Plain-text rendering of round reports and payment outcomes.

use qd_payments::{NotificationSink, PaymentEvent, PaymentOutcome, StatusSummary};
use qd_rewards::Distribution;
use qd_types::{format_ether, ContributorEntry};
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Write as _};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

/// The operator's pre-disbursement overview.
pub fn render_report(
    total_sqrt_votes: f64,
    missing: &[ContributorEntry],
    distribution: Option<&Distribution>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total sqrt votes: {total_sqrt_votes:.2}");

    if !missing.is_empty() {
        let _ = writeln!(out, "\nPending votes from:");
        for entry in missing {
            let _ = writeln!(out, "  {} ({})", entry.wallet.short(), entry.name);
        }
    }

    let Some(distribution) = distribution else {
        let _ = writeln!(out, "\nNo votes cast yet; nothing to distribute.");
        return out;
    };

    let _ = writeln!(
        out,
        "\nReward pool: {}",
        format_ether(distribution.reward_pool)
    );
    for a in &distribution.allocations {
        let _ = write!(
            out,
            "  {:<20} {}  sqrt votes {:>8.2} ({:>6.2}%)  {}",
            a.name,
            a.wallet.short(),
            a.sqrt_vote_sum,
            a.share * 100.0,
            format_ether(a.amount)
        );
        if !a.has_voted {
            let _ = write!(out, "  [has not voted yet]");
        }
        out.push('\n');
    }
    out
}

pub fn render_outcome(outcome: &PaymentOutcome) -> String {
    match outcome {
        PaymentOutcome::Completed {
            wallet,
            amount,
            receipt,
        } => format!("paid     {} {} ({})", wallet, format_ether(*amount), receipt.reference),
        PaymentOutcome::Failed {
            wallet,
            amount,
            error,
        } => format!("FAILED   {} {}: {error}", wallet, format_ether(*amount)),
        PaymentOutcome::Skipped { wallet, reason } => format!("skipped  {wallet}: {reason}"),
    }
}

pub fn render_summary(summary: &StatusSummary) -> String {
    format!(
        "{} completed, {} failed, {} pending, {} in flight",
        summary.completed, summary.failed, summary.pending, summary.in_flight
    )
}

/// Notification sink that writes payment events to the log.
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, event: &PaymentEvent) {
        match event {
            PaymentEvent::Sent {
                wallet, receipt, ..
            } => info!(wallet = %wallet, reference = %receipt.reference, "Payment sent!"),
            PaymentEvent::Failed { wallet, error, .. } => {
                warn!(wallet = %wallet, %error, "Payment transaction error")
            }
        }
    }
}

/// Notification sink that appends each payment event as one JSON line.
pub struct EventLog {
    file: Mutex<File>,
}

impl EventLog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl NotificationSink for EventLog {
    fn notify(&self, event: &PaymentEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!("Could not encode payment event: {e}");
                return;
            }
        };
        let Ok(mut file) = self.file.lock() else {
            warn!("Event log lock poisoned; dropping event");
            return;
        };
        if let Err(e) = writeln!(file, "{line}") {
            warn!("Could not write payment event: {e}");
        }
    }
}
