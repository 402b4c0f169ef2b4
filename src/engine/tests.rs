//! Tests for the pagination engine
//!
//! Timing-sensitive tests run on tokio's paused clock: sleeps complete as soon
//! as every task is idle, so retry delays cost no wall time.

use super::*;
use crate::fetch::ScriptedFetcher;
use crate::types::BackoffType;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use test_case::test_case;
use tokio::time::Instant;

const WAIT: Duration = Duration::from_secs(120);

fn rec(id: &str, name: &str) -> Record {
    Record::new(id, name)
}

fn engine_with(fetcher: &Arc<ScriptedFetcher>) -> PaginationEngine {
    PaginationEngine::new(fetcher.clone(), RetryPolicy::default())
}

async fn next(sub: &mut Subscription) -> EngineEvent {
    tokio::time::timeout(WAIT, sub.next_event())
        .await
        .expect("timed out waiting for event")
        .expect("subscription ended")
}

/// Collect events up to and including the first one matching `done`
async fn collect_until(
    sub: &mut Subscription,
    done: impl Fn(&EngineEvent) -> bool,
) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    loop {
        let event = next(sub).await;
        let finished = done(&event);
        events.push(event);
        if finished {
            return events;
        }
    }
}

async fn cycle(sub: &mut Subscription) -> Vec<EngineEvent> {
    collect_until(sub, EngineEvent::ends_cycle).await
}

async fn ended(sub: &mut Subscription) -> bool {
    matches!(
        tokio::time::timeout(WAIT, sub.next_event()).await,
        Ok(None)
    )
}

// ============================================================================
// RetryPolicy Tests
// ============================================================================

#[test]
fn test_retry_policy_default() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.delay, Duration::from_secs(2));
    assert_eq!(policy.backoff, BackoffType::Constant);
}

#[test_case(BackoffType::Constant, 1, 2 ; "constant first")]
#[test_case(BackoffType::Constant, 3, 2 ; "constant third")]
#[test_case(BackoffType::Linear, 1, 2 ; "linear first")]
#[test_case(BackoffType::Linear, 3, 6 ; "linear third")]
#[test_case(BackoffType::Exponential, 1, 2 ; "exponential first")]
#[test_case(BackoffType::Exponential, 3, 8 ; "exponential third")]
#[test_case(BackoffType::Exponential, 10, 60 ; "exponential capped")]
fn test_retry_policy_delay_for(backoff: BackoffType, attempt: u32, expected_secs: u64) {
    let policy = RetryPolicy::default().with_backoff(backoff, Duration::from_secs(60));
    assert_eq!(policy.delay_for(attempt), Duration::from_secs(expected_secs));
}

#[test]
fn test_retry_policy_messages_follow_limit() {
    let policy = RetryPolicy::default().with_max_attempts(5);
    assert_eq!(
        policy.retry_message("offline", 4),
        "Error occurred: offline. Retrying... (4/5)"
    );
    assert_eq!(
        policy.exhausted_message(),
        "Error occurred after 5 attempts. Please try again later."
    );
    assert_eq!(RetryPolicy::default().with_max_attempts(0).max_attempts, 1);
}

// ============================================================================
// Paging Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_two_page_scenario() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher
        .push_page(Page::with_next(vec![rec("1", "Ann")], "p2"))
        .push_page(Page::last(Vec::new()));
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    assert!(engine.fetch_next().await);
    assert_eq!(
        cycle(&mut sub).await,
        vec![
            EngineEvent::DataChanged(vec![rec("1", "Ann")]),
            EngineEvent::EmptyStateChanged(false),
        ]
    );
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.items, vec![rec("1", "Ann")]);
    assert_eq!(snapshot.cursor.as_deref(), Some("p2"));
    assert!(!snapshot.is_pagination_finished);

    assert!(engine.fetch_next().await);
    assert_eq!(
        cycle(&mut sub).await,
        vec![
            EngineEvent::DataChanged(Vec::new()),
            EngineEvent::EmptyStateChanged(true),
        ]
    );
    assert!(engine.items().await.is_empty());
    assert!(engine.is_pagination_finished().await);
    assert_eq!(fetcher.calls(), vec![None, Some("p2".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn test_items_stay_unique_across_repeating_pages() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    let pages = [
        vec!["1", "2", "3"],
        vec!["3", "4", "1"],
        vec!["4", "4", "5"],
        vec!["2", "6"],
    ];
    for (i, page_ids) in pages.iter().enumerate() {
        let records = page_ids.iter().map(|id| rec(id, "n")).collect();
        let next = (i + 1 < pages.len()).then(|| format!("p{}", i + 2));
        fetcher.push_page(Page::new(records, next));
    }
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    for _ in 0..pages.len() {
        engine.fetch_next().await;
        cycle(&mut sub).await;
        let items = engine.items().await;
        let unique: HashSet<_> = items.iter().map(|r| r.id.clone()).collect();
        assert_eq!(unique.len(), items.len());
    }

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.ids(), vec!["1", "2", "3", "4", "5", "6"]);
    assert!(snapshot.is_pagination_finished);
}

#[tokio::test(start_paused = true)]
async fn test_no_concurrent_fetch() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.push_delayed_page(
        Page::with_next((0..5).map(|i| rec(&i.to_string(), "n")).collect(), "p2"),
        Duration::from_secs(1),
    );
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    assert!(engine.fetch_next().await);
    assert!(engine.is_busy().await);
    assert!(!engine.fetch_next().await);
    assert!(!engine.fetch_next().await);

    cycle(&mut sub).await;
    assert_eq!(fetcher.call_count(), 1);
    assert!(!engine.is_busy().await);
}

#[tokio::test(start_paused = true)]
async fn test_near_end_of_list_triggers_one_fetch() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher
        .push_page(Page::with_next(
            (1..=5).map(|i| rec(&i.to_string(), "n")).collect(),
            "p2",
        ))
        .push_page(Page::last(vec![rec("6", "n")]));
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    engine.fetch_next().await;
    cycle(&mut sub).await;

    assert!(!engine.on_near_end_of_list(3).await);
    assert!(!engine.on_near_end_of_list(1).await);
    assert!(engine.on_near_end_of_list(2).await);
    assert!(!engine.on_near_end_of_list(2).await);
    cycle(&mut sub).await;

    assert_eq!(fetcher.call_count(), 2);
    assert_eq!(engine.items().await.len(), 6);
    // finished: the threshold row of the longer list no longer fetches
    assert!(!engine.on_near_end_of_list(3).await);
    assert_eq!(fetcher.call_count(), 2);
}

// ============================================================================
// Retry Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_three_timeouts_exhaust_retries() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher
        .push_failure("timeout")
        .push_failure("timeout")
        .push_failure("timeout");
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;
    let start = Instant::now();

    engine.fetch_next().await;
    let events = collect_until(&mut sub, |e| *e == EngineEvent::FetchEnded).await;

    assert_eq!(
        events,
        vec![
            EngineEvent::error("Error occurred: timeout. Retrying... (1/3)"),
            EngineEvent::RetryScheduled,
            EngineEvent::error("Error occurred: timeout. Retrying... (2/3)"),
            EngineEvent::RetryScheduled,
            EngineEvent::error("Error occurred after 3 attempts. Please try again later."),
            EngineEvent::FetchEnded,
        ]
    );
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(fetcher.call_count(), 3);
    assert!(sub.try_next_event().is_none());

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.retry_count, 3);
    assert!(!snapshot.fetch_in_flight);
}

#[tokio::test(start_paused = true)]
async fn test_retry_then_success_resets_count() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher
        .push_failure("offline")
        .push_page(Page::with_next(vec![rec("1", "Ann")], "p2"));
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    engine.fetch_next().await;
    assert_eq!(
        next(&mut sub).await,
        EngineEvent::error("Error occurred: offline. Retrying... (1/3)")
    );
    assert_eq!(next(&mut sub).await, EngineEvent::RetryScheduled);

    // the pending retry counts as in flight
    assert!(engine.snapshot().await.fetch_in_flight);
    assert!(!engine.fetch_next().await);

    assert_eq!(
        cycle(&mut sub).await,
        vec![
            EngineEvent::DataChanged(vec![rec("1", "Ann")]),
            EngineEvent::EmptyStateChanged(false),
        ]
    );
    assert_eq!(engine.snapshot().await.retry_count, 0);
    assert_eq!(fetcher.calls(), vec![None, None]);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_fetch_after_exhaustion_rearms() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher
        .push_failure("x")
        .push_failure("x")
        .push_failure("x")
        .push_failure("y");
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    engine.fetch_next().await;
    collect_until(&mut sub, |e| *e == EngineEvent::FetchEnded).await;

    assert!(engine.fetch_next().await);
    assert_eq!(
        next(&mut sub).await,
        EngineEvent::error("Error occurred: y. Retrying... (1/3)")
    );
    assert_eq!(engine.snapshot().await.retry_count, 1);
    engine.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_exponential_backoff_spaces_retries() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher
        .push_failure("x")
        .push_failure("x")
        .push_page(Page::last(Vec::new()));
    let policy = RetryPolicy::default()
        .with_delay(Duration::from_secs(1))
        .with_backoff(BackoffType::Exponential, Duration::from_secs(30));
    let engine = PaginationEngine::new(fetcher.clone(), policy);
    let mut sub = engine.subscribe().await;
    let start = Instant::now();

    engine.fetch_next().await;
    collect_until(&mut sub, EngineEvent::is_data).await;

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4));
}

// ============================================================================
// Refresh Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_refresh_failure_preserves_items() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.push_page(Page::with_next(vec![rec("A", "a"), rec("B", "b")], "p2"));
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    engine.fetch_next().await;
    cycle(&mut sub).await;

    fetcher.push_failure("offline");
    engine.refresh().await;
    assert_eq!(
        collect_until(&mut sub, |e| *e == EngineEvent::RetryScheduled).await,
        vec![
            EngineEvent::error("Error occurred: offline. Retrying... (1/3)"),
            EngineEvent::RetryScheduled,
        ]
    );

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.ids(), vec!["A", "B"]);
    assert!(snapshot.cursor.is_none());
    assert!(!snapshot.is_pagination_finished);
    assert_eq!(fetcher.calls(), vec![None, None]);
    engine.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_refresh_first_page_replaces_items() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher
        .push_page(Page::with_next(vec![rec("A", "a"), rec("B", "b")], "p2"))
        .push_page(Page::last(vec![rec("C", "c")]));
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    engine.fetch_next().await;
    cycle(&mut sub).await;
    engine.refresh().await;

    assert_eq!(
        cycle(&mut sub).await,
        vec![
            EngineEvent::DataChanged(vec![rec("C", "c")]),
            EngineEvent::EmptyStateChanged(false),
        ]
    );
    assert!(engine.is_pagination_finished().await);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_cancels_pending_retry() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.push_failure("offline");
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    engine.fetch_next().await;
    collect_until(&mut sub, |e| *e == EngineEvent::RetryScheduled).await;

    fetcher.push_page(Page::last(vec![rec("A", "a")]));
    engine.refresh().await;
    cycle(&mut sub).await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(fetcher.call_count(), 2);
    assert!(sub.try_next_event().is_none());
    assert_eq!(engine.snapshot().await.retry_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_discards_in_flight_result() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher
        .push_delayed_page(Page::with_next(vec![rec("old", "o")], "p2"), Duration::from_secs(5))
        .push_page(Page::with_next(vec![rec("new", "n")], "p2"));
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    engine.fetch_next().await;
    tokio::task::yield_now().await;
    engine.refresh().await;

    assert_eq!(
        cycle(&mut sub).await,
        vec![
            EngineEvent::DataChanged(vec![rec("new", "n")]),
            EngineEvent::EmptyStateChanged(false),
        ]
    );

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(sub.try_next_event().is_none());
    assert_eq!(engine.snapshot().await.ids(), vec!["new"]);
    assert_eq!(fetcher.call_count(), 2);
}

// ============================================================================
// Teardown Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_pending_retry() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.push_failure("offline");
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    engine.fetch_next().await;
    collect_until(&mut sub, |e| *e == EngineEvent::RetryScheduled).await;
    drop(engine);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(fetcher.call_count(), 1);
    assert!(ended(&mut sub).await);
}

#[tokio::test(start_paused = true)]
async fn test_drop_turns_in_flight_fetch_into_noop() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.push_delayed_page(Page::last(vec![rec("A", "a")]), Duration::from_secs(5));
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    engine.fetch_next().await;
    tokio::task::yield_now().await;
    drop(engine);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(ended(&mut sub).await);
}

#[tokio::test(start_paused = true)]
async fn test_close_ends_subscriptions_and_ignores_calls() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.push_page(Page::last(Vec::new()));
    let engine = engine_with(&fetcher);
    let mut sub = engine.subscribe().await;

    engine.close().await;
    assert!(engine.is_closed());
    assert!(!engine.fetch_next().await);
    engine.refresh().await;

    assert!(ended(&mut sub).await);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_after_close_is_already_ended() {
    let engine = PaginationEngine::with_fetcher(ScriptedFetcher::new());
    engine.close().await;

    let mut sub = engine.subscribe().await;
    assert!(ended(&mut sub).await);
    assert_eq!(engine.subscriber_count().await, 0);
}

#[tokio::test]
async fn test_dropped_subscription_unsubscribes() {
    let engine = PaginationEngine::with_fetcher(ScriptedFetcher::new());
    let first = engine.subscribe().await;
    let _second = engine.subscribe().await;
    assert_eq!(engine.subscriber_count().await, 2);

    drop(first);
    assert_eq!(engine.subscriber_count().await, 1);
}
