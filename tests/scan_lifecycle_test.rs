// tests/scan_lifecycle_test.rs
// Scan job lifecycle: queueing, single-scan-per-shop, progress monotonicity,
// report gating, and failure recording.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Semaphore;

use sherlock::db::{ScanStatus, ScanType};
use sherlock::error::Error;

use common::{script_tag, test_state, wait_for_terminal, StubShopify, SHOP, TOKEN};

#[tokio::test]
async fn full_scan_runs_to_completion() {
    let stub = StubShopify::with_tags(vec![script_tag(
        1,
        "https://cdn.pagefly.io/pagefly.js",
        Some(Utc::now() - Duration::days(2)),
    )]);
    let state = test_state(stub).await;

    let job = state
        .orchestrator
        .start_scan(SHOP, TOKEN, ScanType::Full)
        .await
        .expect("scan starts");
    assert_eq!(job.status, ScanStatus::Queued);
    assert_eq!(job.progress, 0);

    let done = wait_for_terminal(&state, &job.id).await;
    assert_eq!(done.status, ScanStatus::Completed);
    assert_eq!(done.progress, 100);
    assert_eq!(done.apps_scanned, 1);
    assert!(done.completed_at.is_some());

    let report = state
        .orchestrator
        .get_report(&job.id)
        .await
        .expect("report available");
    assert_eq!(report["shop"], SHOP);
    assert_eq!(report["scan_type"], "full");
    assert!(report["diagnosis"]["status"].is_string());

    // The app rows landed and the suspect flag matches the threshold.
    let apps = state.apps.for_scan(&job.id).await.expect("apps");
    assert_eq!(apps.len(), 1);
    for app in &apps {
        assert_eq!(
            app.is_suspect,
            app.risk_score >= state.config.suspect_threshold
        );
    }
}

#[tokio::test]
async fn quick_scan_skips_theme_and_performance() {
    let stub = StubShopify::with_tags(vec![script_tag(
        1,
        "https://cdn.judge.me/widget.js",
        None,
    )]);
    let state = test_state(stub).await;

    let job = state
        .orchestrator
        .start_scan(SHOP, TOKEN, ScanType::Quick)
        .await
        .expect("scan starts");
    let done = wait_for_terminal(&state, &job.id).await;

    assert_eq!(done.status, ScanStatus::Completed);
    assert!(state.issues.for_scan(&job.id).await.unwrap().is_empty());
    assert!(state.perf.for_shop(SHOP).await.unwrap().is_empty());
}

#[tokio::test]
async fn second_scan_for_same_shop_is_rejected() {
    let gate = Arc::new(Semaphore::new(0));
    let mut stub = StubShopify::with_tags(vec![]);
    stub.gate = Some(gate.clone());
    let state = test_state(stub).await;

    let first = state
        .orchestrator
        .start_scan(SHOP, TOKEN, ScanType::Full)
        .await
        .expect("first scan starts");

    let second = state
        .orchestrator
        .start_scan(SHOP, TOKEN, ScanType::Full)
        .await;
    assert!(matches!(second, Err(Error::Conflict(_))));

    // A different shop is unaffected by the running scan.
    let other = state
        .orchestrator
        .start_scan("other.myshopify.com", TOKEN, ScanType::Quick)
        .await;
    assert!(other.is_ok());

    gate.add_permits(2);
    let done = wait_for_terminal(&state, &first.id).await;
    assert_eq!(done.status, ScanStatus::Completed);

    // Once terminal, the shop can scan again.
    let again = state
        .orchestrator
        .start_scan(SHOP, TOKEN, ScanType::Quick)
        .await;
    assert!(again.is_ok());
    gate.add_permits(1);
    wait_for_terminal(&state, &again.unwrap().id).await;
}

#[tokio::test]
async fn racing_starts_accept_exactly_one_job() {
    let gate = Arc::new(Semaphore::new(0));
    let mut stub = StubShopify::with_tags(vec![]);
    stub.gate = Some(gate.clone());
    let state = test_state(stub).await;

    // Both starts in flight at once; the unique index over active jobs picks
    // the winner even when both pass the pre-check.
    let (a, b) = tokio::join!(
        state.orchestrator.start_scan(SHOP, TOKEN, ScanType::Quick),
        state.orchestrator.start_scan(SHOP, TOKEN, ScanType::Quick),
    );

    let accepted = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1, "one winner: {a:?} / {b:?}");
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(Error::Conflict(_))));

    let history = state.scans.history(SHOP, 10).await.unwrap();
    assert_eq!(history.len(), 1);

    gate.add_permits(1);
    let winner_id = history[0].id.clone();
    let done = wait_for_terminal(&state, &winner_id).await;
    assert_eq!(done.status, ScanStatus::Completed);
}

#[tokio::test]
async fn report_is_gated_until_completion() {
    let gate = Arc::new(Semaphore::new(0));
    let mut stub = StubShopify::with_tags(vec![]);
    stub.gate = Some(gate.clone());
    let state = test_state(stub).await;

    let job = state
        .orchestrator
        .start_scan(SHOP, TOKEN, ScanType::Quick)
        .await
        .expect("scan starts");

    let early = state.orchestrator.get_report(&job.id).await;
    assert!(matches!(early, Err(Error::NotReady(_))));

    gate.add_permits(1);
    wait_for_terminal(&state, &job.id).await;
    assert!(state.orchestrator.get_report(&job.id).await.is_ok());
}

#[tokio::test]
async fn upstream_failure_marks_the_job_failed() {
    let mut stub = StubShopify::with_tags(vec![]);
    stub.script_tags_error = Some("script_tags.json returned HTTP 401 for acme".to_string());
    let state = test_state(stub).await;

    let job = state
        .orchestrator
        .start_scan(SHOP, TOKEN, ScanType::Full)
        .await
        .expect("scan starts");
    let done = wait_for_terminal(&state, &job.id).await;

    assert_eq!(done.status, ScanStatus::Failed);
    let error = done.error.expect("error recorded");
    assert!(error.contains("HTTP 401"));

    // No partial results from the failed pass.
    assert!(state.apps.for_scan(&job.id).await.unwrap().is_empty());

    // The report surfaces the failure instead of a stale body.
    let report = state.orchestrator.get_report(&job.id).await;
    assert!(matches!(report, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn invalid_shop_or_token_never_creates_a_job() {
    let state = test_state(StubShopify::with_tags(vec![])).await;

    for (shop, token) in [
        ("", TOKEN),
        ("acme.example.com", TOKEN),
        ("bad shop.myshopify.com", TOKEN),
        (SHOP, "  "),
    ] {
        let result = state
            .orchestrator
            .start_scan(shop, token, ScanType::Full)
            .await;
        assert!(matches!(result, Err(Error::Validation(_))), "{shop:?}");
    }

    let history = state.scans.history(SHOP, 10).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn unknown_job_id_is_not_found() {
    let state = test_state(StubShopify::with_tags(vec![])).await;
    let result = state.orchestrator.get_status("no-such-job").await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}
