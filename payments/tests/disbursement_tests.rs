//! End-to-end disbursement sessions against nullable collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use qd_nullables::{NullAccess, NullGateway, NullNotifier, NullVoteSource};
use qd_payments::{
    AccessProvider, DisbursementSession, EventBus, GatewayError, PaymentError, PaymentEvent, PaymentOutcome,
    PaymentStateMachine, PaymentStatus, SkipReason, StatusSummary,
};
use qd_rewards::RewardError;
use qd_types::{ContributorEntry, VoteRecord, WalletAddress};

fn addr(n: u8) -> WalletAddress {
    WalletAddress::parse(&format!("0x{:0>40}", n)).unwrap()
}

fn operator() -> WalletAddress {
    addr(200)
}

fn vote(voter: u8, contributor: u8, amount: f64) -> VoteRecord {
    VoteRecord {
        voter_wallet: addr(voter),
        voting_address: addr(voter),
        contributor_wallet: addr(contributor),
        contributor_name: format!("member-{contributor}"),
        amount,
    }
}

fn contributor(n: u8) -> ContributorEntry {
    ContributorEntry {
        wallet: addr(n),
        name: format!("member-{n}"),
    }
}

/// Contributor 1 ends with sqrt sum 5 (4 and 9), contributor 2 with 3 (9).
/// Contributor 3 is eligible but nobody voted for or as them.
fn round_votes() -> Vec<VoteRecord> {
    vec![vote(1, 1, 4.0), vote(2, 1, 9.0), vote(1, 2, 9.0)]
}

struct Harness {
    gateway: Arc<NullGateway>,
    notifier: Arc<NullNotifier>,
    session: DisbursementSession,
}

fn open_session(gateway: NullGateway, pool: f64) -> Harness {
    let gateway = Arc::new(gateway);
    let notifier = Arc::new(NullNotifier::new());
    let machine = PaymentStateMachine::new(
        Arc::clone(&gateway) as _,
        Arc::new(NullAccess::allow([&operator()])),
        Arc::clone(&notifier) as _,
    );
    let session = DisbursementSession::open(
        &round_votes(),
        vec![contributor(1), contributor(2), contributor(3)],
        pool,
        machine,
    )
    .unwrap();
    Harness {
        gateway,
        notifier,
        session,
    }
}

#[tokio::test]
async fn pool_of_340_pays_250_and_90() {
    let h = open_session(NullGateway::new(), 340.0);

    let outcomes = h.session.pay_all(&operator()).await.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.is_completed()));

    let one = h.gateway.transfers_to(&addr(1));
    let two = h.gateway.transfers_to(&addr(2));
    assert_eq!(one.len(), 1);
    assert_eq!(two.len(), 1);
    assert!((one[0] - 250.0).abs() < 1e-9);
    assert!((two[0] - 90.0).abs() < 1e-9);
}

#[tokio::test]
async fn missing_participant_is_reported_and_never_paid() {
    let h = open_session(NullGateway::new(), 340.0);

    let missing: Vec<_> = h
        .session
        .missing_participants()
        .into_iter()
        .map(|e| e.wallet)
        .collect();
    // Contributor 2 received votes but never voted as themselves.
    assert_eq!(missing, vec![addr(2), addr(3)]);

    h.session.pay_all(&operator()).await.unwrap();
    assert!(h.gateway.transfers_to(&addr(3)).is_empty());
    assert_eq!(
        h.session.pay(&operator(), &addr(3)).await,
        Err(PaymentError::UnknownRecipient(addr(3)))
    );
}

#[tokio::test]
async fn paying_twice_calls_gateway_once() {
    let h = open_session(NullGateway::new(), 340.0);

    let first = h.session.pay(&operator(), &addr(1)).await.unwrap();
    let second = h.session.pay(&operator(), &addr(1)).await.unwrap();

    assert!(first.is_completed());
    assert_eq!(
        second,
        PaymentOutcome::Skipped {
            wallet: addr(1),
            reason: SkipReason::AlreadyCompleted
        }
    );
    assert_eq!(h.gateway.call_count(), 1);
    assert_eq!(h.session.status(&addr(1)).await, PaymentStatus::Completed);
}

#[tokio::test]
async fn failed_then_retried_payment_transfers_once() {
    let gateway = NullGateway::new();
    gateway.fail_next(&addr(1), GatewayError::InsufficientFunds("0 ETH".into()));
    let h = open_session(gateway, 340.0);

    let first = h.session.pay(&operator(), &addr(1)).await.unwrap();
    assert!(matches!(first, PaymentOutcome::Failed { .. }));
    assert_eq!(h.session.status(&addr(1)).await, PaymentStatus::Failed);

    let retry = h.session.pay(&operator(), &addr(1)).await.unwrap();
    assert!(retry.is_completed());
    assert_eq!(h.session.status(&addr(1)).await, PaymentStatus::Completed);

    assert_eq!(h.gateway.call_count(), 2);
    assert_eq!(h.gateway.transfers_to(&addr(1)).len(), 1);

    let events = h.notifier.events();
    assert!(matches!(
        &events[0],
        PaymentEvent::Failed { error: GatewayError::InsufficientFunds(detail), .. } if detail == "0 ETH"
    ));
    assert!(matches!(&events[1], PaymentEvent::Sent { .. }));
}

#[tokio::test]
async fn aggregate_failure_does_not_roll_back_others() {
    let gateway = NullGateway::new();
    gateway.fail_next(&addr(1), GatewayError::Network("rpc unreachable".into()));
    let h = open_session(gateway, 340.0);

    let outcomes = h.session.pay_all(&operator()).await.unwrap();
    assert!(matches!(outcomes[0], PaymentOutcome::Failed { .. }));
    assert!(outcomes[1].is_completed());
    assert_eq!(
        h.session.summary().await,
        StatusSummary {
            pending: 0,
            in_flight: 0,
            completed: 1,
            failed: 1
        }
    );

    // A second aggregate pass retries only the failed recipient.
    let outcomes = h.session.pay_all(&operator()).await.unwrap();
    assert!(outcomes[0].is_completed());
    assert!(matches!(
        outcomes[1],
        PaymentOutcome::Skipped {
            reason: SkipReason::AlreadyCompleted,
            ..
        }
    ));
    assert_eq!(h.gateway.transfers().len(), 2);
    assert_eq!(h.notifier.sent_count(), 2);
    assert_eq!(h.notifier.failed_count(), 1);
}

#[tokio::test]
async fn unauthorized_caller_has_read_only_view() {
    let h = open_session(NullGateway::new(), 340.0);
    let stranger = addr(99);

    assert!(!h.session.is_authorized(&stranger));
    assert_eq!(h.session.allocations().await.len(), 2);

    assert_eq!(
        h.session.pay(&stranger, &addr(1)).await,
        Err(PaymentError::Unauthorized {
            caller: stranger.clone()
        })
    );
    assert!(matches!(
        h.session.pay_all(&stranger).await,
        Err(PaymentError::Unauthorized { .. })
    ));
    assert!(matches!(
        h.session.set_reward_pool(&stranger, 1.0).await,
        Err(PaymentError::Unauthorized { .. })
    ));
    // Unauthorized wins even for wallets with no allocation.
    assert!(matches!(
        h.session.pay(&stranger, &addr(3)).await,
        Err(PaymentError::Unauthorized { .. })
    ));

    assert_eq!(h.gateway.call_count(), 0);
    assert_eq!(h.session.reward_pool().await, 340.0);
}

#[tokio::test]
async fn changing_pool_reprices_remaining_recipients() {
    let h = open_session(NullGateway::new(), 340.0);

    h.session.pay(&operator(), &addr(1)).await.unwrap();
    h.session.set_reward_pool(&operator(), 680.0).await.unwrap();

    assert_eq!(h.session.reward_pool().await, 680.0);
    assert_eq!(h.session.status(&addr(1)).await, PaymentStatus::Completed);

    h.session.pay_all(&operator()).await.unwrap();
    let two = h.gateway.transfers_to(&addr(2));
    assert!((two[0] - 180.0).abs() < 1e-9);
    // Recipient 1 stays paid at the amount owed when it was paid.
    assert_eq!(h.gateway.transfers_to(&addr(1)).len(), 1);
}

#[tokio::test]
async fn invalid_pool_is_rejected_and_keeps_previous_allocation() {
    let h = open_session(NullGateway::new(), 340.0);

    let result = h.session.set_reward_pool(&operator(), -5.0).await;
    assert_eq!(
        result,
        Err(PaymentError::Rewards(RewardError::InvalidRewardPool(-5.0)))
    );
    assert_eq!(h.session.reward_pool().await, 340.0);
}

#[tokio::test]
async fn zero_pool_skips_every_recipient() {
    let h = open_session(NullGateway::new(), 0.0);

    let outcomes = h.session.pay_all(&operator()).await.unwrap();
    assert!(outcomes.iter().all(|o| matches!(
        o,
        PaymentOutcome::Skipped {
            reason: SkipReason::InvalidAmount,
            ..
        }
    )));
    assert_eq!(h.gateway.call_count(), 0);
}

#[tokio::test]
async fn concurrent_clicks_for_one_recipient_pay_once() {
    let h = Arc::new(open_session(
        NullGateway::with_delay(Duration::from_millis(30)),
        340.0,
    ));

    let mut handles = Vec::new();
    for _ in 0..3 {
        let h = Arc::clone(&h);
        handles.push(tokio::spawn(async move {
            h.session.pay(&operator(), &addr(1)).await.unwrap()
        }));
    }
    let h2 = Arc::clone(&h);
    handles.push(tokio::spawn(async move {
        h2.session.pay(&operator(), &addr(2)).await.unwrap()
    }));

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    assert_eq!(h.gateway.transfers_to(&addr(1)).len(), 1);
    assert_eq!(h.gateway.transfers_to(&addr(2)).len(), 1);
    let in_flight = outcomes
        .iter()
        .filter(|o| {
            matches!(
                o,
                PaymentOutcome::Skipped {
                    reason: SkipReason::InFlight,
                    ..
                }
            )
        })
        .count();
    assert_eq!(in_flight, 2);
}

#[tokio::test]
async fn metrics_track_attempts_and_skips() {
    let h = open_session(NullGateway::new(), 340.0);

    h.session.pay_all(&operator()).await.unwrap();
    h.session.pay_all(&operator()).await.unwrap();

    let metrics = h.session.metrics();
    assert_eq!(metrics.transfers_attempted.get(), 2);
    assert_eq!(metrics.transfers_completed.get(), 2);
    assert_eq!(metrics.payments_skipped.get(), 2);
    assert!(metrics.encode_text().contains("qd_payments_skipped_total 2"));
}

#[test]
fn session_without_votes_cannot_open() {
    let machine = PaymentStateMachine::new(
        Arc::new(NullGateway::new()),
        Arc::new(NullAccess::allow_all()),
        Arc::new(NullNotifier::new()),
    );
    let result = DisbursementSession::open(&[], vec![contributor(1)], 10.0, machine);
    assert!(matches!(
        result,
        Err(PaymentError::Rewards(RewardError::NoVotesCast))
    ));
}

#[test]
fn session_surfaces_invalid_vote_records() {
    let machine = PaymentStateMachine::new(
        Arc::new(NullGateway::new()),
        Arc::new(NullAccess::allow_all()),
        Arc::new(NullNotifier::new()),
    );
    let source = NullVoteSource::new(vec![vote(1, 1, 1.0), vote(1, 2, f64::NAN)], vec![]);
    let result = DisbursementSession::from_source(&source, 10.0, machine);
    assert!(matches!(
        result,
        Err(PaymentError::Rewards(RewardError::InvalidVoteRecord { index: 1, .. }))
    ));
}

#[test]
fn session_surfaces_source_failures() {
    let machine = PaymentStateMachine::new(
        Arc::new(NullGateway::new()),
        Arc::new(NullAccess::allow_all()),
        Arc::new(NullNotifier::new()),
    );
    let source = NullVoteSource::failing("subgraph unavailable");
    let result = DisbursementSession::from_source(&source, 10.0, machine);
    assert_eq!(
        result.err(),
        Some(PaymentError::Rewards(RewardError::Source(
            "subgraph unavailable".into()
        )))
    );
}

/// Allows one operator and counts every lookup.
#[derive(Default)]
struct CountingAccess {
    lookups: AtomicUsize,
}

impl AccessProvider for CountingAccess {
    fn is_authorized(&self, caller: &WalletAddress) -> bool {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        *caller == operator()
    }
}

#[tokio::test]
async fn per_recipient_pay_consults_access_once() {
    let access = Arc::new(CountingAccess::default());
    let machine = PaymentStateMachine::new(
        Arc::new(NullGateway::new()),
        Arc::clone(&access) as _,
        Arc::new(NullNotifier::new()),
    );
    let session =
        DisbursementSession::open(&round_votes(), vec![contributor(1)], 340.0, machine).unwrap();

    assert!(session.pay(&operator(), &addr(1)).await.unwrap().is_completed());
    assert_eq!(access.lookups.load(Ordering::SeqCst), 1);

    assert_eq!(
        session.pay(&operator(), &addr(3)).await,
        Err(PaymentError::UnknownRecipient(addr(3)))
    );
    assert_eq!(access.lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn event_bus_fans_session_events_out_to_every_sink() {
    let gateway = Arc::new(NullGateway::new());
    gateway.fail_next(&addr(2), GatewayError::Network("timeout".into()));
    let display = Arc::new(NullNotifier::new());
    let audit = Arc::new(NullNotifier::new());
    let bus = EventBus::new()
        .with(Arc::clone(&display) as _)
        .with(Arc::clone(&audit) as _);
    let machine = PaymentStateMachine::new(
        Arc::clone(&gateway) as _,
        Arc::new(NullAccess::allow([&operator()])),
        Arc::new(bus),
    );
    let session = DisbursementSession::open(
        &round_votes(),
        vec![contributor(1), contributor(2)],
        340.0,
        machine,
    )
    .unwrap();

    session.pay_all(&operator()).await.unwrap();

    for sink in [&display, &audit] {
        assert_eq!(sink.sent_count(), 1);
        assert_eq!(sink.failed_count(), 1);
    }
    assert_eq!(display.events(), audit.events());
}
