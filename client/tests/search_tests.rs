mod common;

use std::fs;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tempfile::TempDir;

use client::ErrorCategory;
use client::search::{
    JsonFileStore, RATE_LIMITED_MESSAGE, RateLimitCounters, RecentSearches, RecentStore,
    SearchCoordinator, run_search,
};
use client::vehicle::SectionId;

use common::{Log, Reply, api_client, spawn_server};

// ---------------------------------------------------------------------------
// Search flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_search_is_sectioned_and_remembered() {
    let log = Log::default();
    let seen = log.clone();
    let base = spawn_server(move |r| {
        seen.push(r);
        Reply::json(
            200,
            json!({
                "success": true,
                "fromCache": true,
                "registrationNumber": "MH******34",
                "data": {
                    "owner": "Asha Rao",
                    "vehicleInsuranceUpto": "2026-03-01",
                    "fitnessUpto": "2030-01-01"
                }
            }),
        )
    })
    .await;
    let api = api_client(&base, 2_000, Some("t"));
    let coordinator = SearchCoordinator::new();
    let mut recent = RecentSearches::in_memory(5);

    let result = run_search(&api, &coordinator, &mut recent, "  mh12ab1234 ").await.unwrap();

    assert!(result.is_success());
    assert!(result.response.is_cached());
    assert_eq!(result.registration_number, "mh12ab1234");
    assert_eq!(
        result.sections().ids(),
        vec![SectionId::Owner, SectionId::Insurance, SectionId::Other]
    );

    assert_eq!(log.all()[0].json(), json!({"registrationNumber": "mh12ab1234"}));
    assert_eq!(coordinator.text(), "mh12ab1234");
    assert!(!coordinator.is_busy());
    assert_eq!(recent.terms(), &["MH12AB1234"]);
}

#[tokio::test]
async fn blank_number_sends_nothing() {
    let log = Log::default();
    let seen = log.clone();
    let base = spawn_server(move |r| {
        seen.push(r);
        Reply::empty(200)
    })
    .await;
    let api = api_client(&base, 2_000, Some("t"));
    let mut recent = RecentSearches::in_memory(5);

    assert!(run_search(&api, &SearchCoordinator::new(), &mut recent, "   ").await.is_none());
    assert_eq!(log.count(), 0);
    assert!(recent.terms().is_empty());
}

#[tokio::test]
async fn domain_failure_passes_through() {
    let base = spawn_server(|_| {
        Reply::json(
            200,
            json!({"success": false, "errorMessage": "No data found for this registration"}),
        )
    })
    .await;
    let api = api_client(&base, 2_000, Some("t"));
    let mut recent = RecentSearches::in_memory(5);

    let result = run_search(&api, &SearchCoordinator::new(), &mut recent, "KA01").await.unwrap();

    assert!(!result.is_success());
    assert_eq!(result.error_message(), Some("No data found for this registration"));
    assert_eq!(result.error_category(), Some(ErrorCategory::NotFound));
}

#[tokio::test]
async fn rate_limited_search_is_classified() {
    let base = spawn_server(|_| Reply::empty(429)).await;
    let api = api_client(&base, 2_000, Some("t"));
    let mut recent = RecentSearches::in_memory(5);

    let result = run_search(&api, &SearchCoordinator::new(), &mut recent, "KA01").await.unwrap();

    assert_eq!(result.status, 429);
    assert!(!result.response.success);
    assert_eq!(result.error_category(), Some(ErrorCategory::RateLimited));
    // A failed search is still remembered.
    assert_eq!(recent.terms(), &["KA01"]);
}

#[tokio::test]
async fn structured_code_drives_classification() {
    let base = spawn_server(|_| {
        Reply::json(429, json!({"error": "Slow down, friend", "code": "COOLDOWN"}))
    })
    .await;
    let api = api_client(&base, 2_000, Some("t"));
    let mut recent = RecentSearches::in_memory(5);

    let result = run_search(&api, &SearchCoordinator::new(), &mut recent, "KA01").await.unwrap();

    assert_eq!(result.code.as_deref(), Some("COOLDOWN"));
    assert_eq!(result.error_message(), Some("Slow down, friend"));
    assert_eq!(result.error_category(), Some(ErrorCategory::RateLimited));
    assert_ne!(result.error_message(), Some(RATE_LIMITED_MESSAGE));
}

#[tokio::test]
async fn busy_flag_is_set_while_in_flight() {
    let coordinator = SearchCoordinator::new();
    let observed = Arc::new(Mutex::new(None));

    let probe = coordinator.clone();
    let slot = observed.clone();
    let base = spawn_server(move |_| {
        *slot.lock().unwrap() = Some(probe.is_busy());
        Reply::json(200, json!({"success": true, "data": {"regNo": "X"}}))
    })
    .await;
    let api = api_client(&base, 2_000, Some("t"));
    let mut recent = RecentSearches::in_memory(5);

    run_search(&api, &coordinator, &mut recent, "X").await.unwrap();

    assert_eq!(*observed.lock().unwrap(), Some(true));
    assert!(!coordinator.is_busy());
}

// ---------------------------------------------------------------------------
// Rate-limit counters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn counters_shown_only_when_configured() {
    let configured = Arc::new(Mutex::new(true));
    let flag = configured.clone();
    let base = spawn_server(move |_| {
        Reply::json(
            200,
            json!({
                "remainingSearchesToday": 7,
                "dailyLimit": 10,
                "adminConfigured": *flag.lock().unwrap()
            }),
        )
    })
    .await;
    let api = api_client(&base, 2_000, Some("t"));
    let coordinator = SearchCoordinator::new();

    let counters = coordinator.refresh_rate_limit(&api).await;
    assert_eq!(
        counters,
        Some(RateLimitCounters {
            remaining: 7,
            daily_limit: 10
        })
    );

    *configured.lock().unwrap() = false;
    assert_eq!(coordinator.refresh_rate_limit(&api).await, None);
    assert_eq!(coordinator.rate_limit(), None);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_counters() {
    let fail = Arc::new(Mutex::new(false));
    let flag = fail.clone();
    let base = spawn_server(move |_| {
        if *flag.lock().unwrap() {
            Reply::empty(500)
        } else {
            Reply::json(
                200,
                json!({"remainingSearchesToday": 3, "dailyLimit": 5, "adminConfigured": true}),
            )
        }
    })
    .await;
    let api = api_client(&base, 2_000, Some("t"));
    let coordinator = SearchCoordinator::new();

    coordinator.refresh_rate_limit(&api).await;
    *fail.lock().unwrap() = true;
    coordinator.refresh_rate_limit(&api).await;

    assert_eq!(
        coordinator.rate_limit(),
        Some(RateLimitCounters {
            remaining: 3,
            daily_limit: 5
        })
    );
}

// ---------------------------------------------------------------------------
// Recent searches on disk
// ---------------------------------------------------------------------------

#[test]
fn recent_searches_survive_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("recent.json");

    {
        let mut recent = RecentSearches::load(Box::new(JsonFileStore::new(&path)), 5);
        recent.add("mh12ab1234").unwrap();
        recent.add("KA01").unwrap();
        recent.add("Mh12AB1234").unwrap();
    }

    let stored: Vec<String> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored, vec!["MH12AB1234", "KA01"]);

    let recent = RecentSearches::load(Box::new(JsonFileStore::new(&path)), 5);
    assert_eq!(recent.terms(), &["MH12AB1234", "KA01"]);
}

#[test]
fn corrupt_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("recent.json");
    fs::write(&path, "{not json").unwrap();

    let store = JsonFileStore::new(&path);
    assert!(store.load().is_err());

    let mut recent = RecentSearches::load(Box::new(store), 5);
    assert!(recent.terms().is_empty());

    // The next write replaces the corrupt file.
    recent.add("DL3C").unwrap();
    let stored: Vec<String> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored, vec!["DL3C"]);
}

#[test]
fn missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let recent = RecentSearches::load(Box::new(JsonFileStore::new(dir.path().join("none.json"))), 5);
    assert!(recent.terms().is_empty());
}

#[test]
fn oversized_file_is_truncated_to_capacity() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("recent.json");
    fs::write(&path, r#"["A","B","C","D","E","F","G"]"#).unwrap();

    let recent = RecentSearches::load(Box::new(JsonFileStore::new(&path)), 5);
    assert_eq!(recent.terms(), &["A", "B", "C", "D", "E"]);
}
