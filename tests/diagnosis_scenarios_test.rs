// tests/diagnosis_scenarios_test.rs
// Full diagnostic scenarios a merchant would actually hit: a known app
// conflict, orphan code from an uninstalled app, and a performance drop
// lining up with an install date.

mod common;

use std::collections::HashMap;

use chrono::{Duration, Utc};

use sherlock::db::{PerformanceSnapshot, ScanType};
use sherlock::shopify::types::PageCategory;
use sherlock::timeline;

use common::{main_theme, script_tag, test_state, wait_for_terminal, StubShopify, SHOP, TOKEN};

#[tokio::test]
async fn known_conflict_names_both_apps_in_the_top_action() {
    // Two page builders installed together, one of them recently, plus a
    // harmless bystander app.
    let stub = StubShopify::with_tags(vec![
        script_tag(
            1,
            "https://cdn.pagefly.io/pagefly.js",
            Some(Utc::now() - Duration::days(60)),
        ),
        script_tag(
            2,
            "https://cdn.gempages.net/gempages.js",
            Some(Utc::now() - Duration::days(1)),
        ),
        script_tag(
            3,
            "https://cdn.aftership.com/track.js",
            Some(Utc::now() - Duration::days(200)),
        ),
    ]);
    let state = test_state(stub).await;

    let job = state
        .orchestrator
        .start_scan(SHOP, TOKEN, ScanType::Full)
        .await
        .unwrap();
    wait_for_terminal(&state, &job.id).await;
    let report = state.orchestrator.get_report(&job.id).await.unwrap();

    let diagnosis = &report["diagnosis"];
    assert_eq!(diagnosis["status"], "issues_found");
    assert!(!diagnosis["known_conflicts"].as_array().unwrap().is_empty());

    // The recently installed side of the conflict is the primary suspect.
    let suspect = diagnosis["primary_suspect"]["app_name"].as_str().unwrap();
    assert!(suspect.to_lowercase().contains("gempages"));

    let first_action = diagnosis["recommended_actions"][0]["action"]
        .as_str()
        .unwrap()
        .to_lowercase();
    assert!(first_action.contains("pagefly"));
    assert!(first_action.contains("gempages"));
}

#[tokio::test]
async fn orphan_code_from_an_uninstalled_app_is_attributed() {
    // Klaviyo left its snippet in the layout but has no script tag anymore.
    let mut assets = HashMap::new();
    assets.insert(
        "layout/theme.liquid".to_string(),
        "<html><head><script>var _learnq = _learnq || [];</script></head></html>".to_string(),
    );
    assets.insert(
        "templates/product.liquid".to_string(),
        "{{ product.title }}".to_string(),
    );

    let mut stub = StubShopify::with_tags(vec![script_tag(
        1,
        "https://cdn.judge.me/widget.js",
        Some(Utc::now() - Duration::days(90)),
    )]);
    stub.theme = Some(main_theme());
    stub.assets = assets;
    let state = test_state(stub).await;

    let job = state
        .orchestrator
        .start_scan(SHOP, TOKEN, ScanType::Full)
        .await
        .unwrap();
    let done = wait_for_terminal(&state, &job.id).await;
    assert!(done.issues_found >= 1);

    let issues = state.issues.for_scan(&job.id).await.unwrap();
    let orphan = issues
        .iter()
        .find(|i| i.likely_source.as_deref() == Some("Klaviyo"))
        .expect("orphan issue attributed to Klaviyo");
    assert_eq!(orphan.file_path, "layout/theme.liquid");
    assert!(orphan.description.contains("no longer installed"));

    let report = state.orchestrator.get_report(&job.id).await.unwrap();
    let actions = report["diagnosis"]["recommended_actions"]
        .as_array()
        .unwrap();
    assert!(actions
        .iter()
        .any(|a| a["action"].as_str().unwrap().contains("Klaviyo")));
}

#[tokio::test]
async fn performance_drop_after_install_ranks_the_app_negative() {
    let installed_on = Utc::now() - Duration::days(5);
    let stub = StubShopify::with_tags(vec![script_tag(
        1,
        "https://cdn.pagefly.io/pagefly.js",
        Some(installed_on),
    )]);
    let state = test_state(stub).await;

    // Seed the series: healthy before the install, slow after it.
    for (days_ago, load_ms, score) in [(10, 1500, 100.0), (8, 1600, 100.0), (2, 3800, 64.0)] {
        state
            .perf
            .insert(&PerformanceSnapshot {
                id: String::new(),
                shop: SHOP.to_string(),
                page: PageCategory::Home,
                load_time_ms: load_ms,
                score,
                annotation: None,
                recorded_at: Utc::now() - Duration::days(days_ago),
            })
            .await
            .unwrap();
    }

    // A scan records the app with its install date.
    let job = state
        .orchestrator
        .start_scan(SHOP, TOKEN, ScanType::Quick)
        .await
        .unwrap();
    wait_for_terminal(&state, &job.id).await;

    let apps = state.apps.with_install_dates(SHOP).await.unwrap();
    let snapshots = state.perf.for_shop(SHOP).await.unwrap();
    let ranking = timeline::impact_ranking(&apps, &snapshots, &state.config);

    assert_eq!(ranking.len(), 1);
    let impact = &ranking[0];
    assert!(impact.app_name.to_lowercase().contains("pagefly"));
    assert!(impact.load_delta_ms > 0.0);
    assert!(impact.score_delta < 0.0);
    assert!(impact.is_negative);
}
