//! Reward disbursement.
//!
//! Each recipient's payment moves through
//! `Pending → InFlight → {Completed | Failed}`, with `Failed → InFlight`
//! allowed as a retry. `Completed` is terminal: paying a completed recipient
//! again is a no-op that never reaches the gateway.
//!
//! External collaborators sit behind traits:
//! - [`PaymentGateway`] moves funds (signing and broadcasting live there).
//! - [`AccessProvider`] decides who may trigger payments.
//! - [`NotificationSink`] receives success/failure events, fire-and-forget.

pub mod access;
pub mod error;
pub mod gateway;
pub mod machine;
pub mod metrics;
pub mod notify;
pub mod session;
pub mod spans;
pub mod status;

pub use access::{AccessGate, AccessProvider};
pub use error::PaymentError;
pub use gateway::{GatewayError, PaymentGateway, TransferReceipt};
pub use machine::PaymentStateMachine;
pub use metrics::PaymentMetrics;
pub use notify::{EventBus, NotificationSink, PaymentEvent};
pub use session::{DisbursementSession, StatusSummary};
pub use status::{PaymentOutcome, PaymentStatus, SkipReason};
