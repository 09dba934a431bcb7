//! Integration tests for the file-backed store.
//!
//! Uses tempfile::TempDir for isolated SQLite databases.

use std::collections::HashSet;
use std::sync::Arc;
use wdbot_core::mock::StaticLabelResolver;
use wdbot_core::{HistoryCategory, WdbotConfig, WizardPhase};
use wdbot_memory::{HistoryLog, InteractionState, PathLog, QueryWizard, SqliteStore};

async fn open_state(dir: &tempfile::TempDir) -> InteractionState {
    let mut config = WdbotConfig::default();
    config.database.path = dir.path().join("state.db").to_str().unwrap().to_string();
    InteractionState::open(&config, Arc::new(StaticLabelResolver::wikidata_sample()))
        .await
        .unwrap()
}

/// Test 1: Everything written survives closing and reopening the database
#[tokio::test]
async fn test_state_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();

    {
        let state = open_state(&dir).await;
        for v in ["Q1", "Q2", "Q3"] {
            state.history.record(7, HistoryCategory::Entity, v).await.unwrap();
            state.paths.append_token(7, v).await.unwrap();
        }
        state.wizard.start(7).await.unwrap();
        state.wizard.submit_text(7, "Authors").await.unwrap();
        state.store().close().await;
    }

    let state = open_state(&dir).await;
    assert_eq!(
        state.history.list(7, HistoryCategory::Entity).await.unwrap(),
        vec!["Q3", "Q2", "Q1"]
    );
    assert_eq!(state.paths.list(7).await.unwrap(), vec!["Q3", "Q2", "Q1"]);

    let wizard = state.wizard.state(7).await.unwrap().unwrap();
    assert_eq!(wizard.phase, WizardPhase::AwaitingPredicate);
    assert_eq!(wizard.subject, "authors");

    // The wizard picks up where it left off
    assert_eq!(
        state.wizard.submit_text(7, "occupation").await.unwrap(),
        Some(WizardPhase::AwaitingObject)
    );
}

/// Test 2: Concurrent records on one key never break the window
#[tokio::test]
async fn test_concurrent_records_same_key() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = SqliteStore::new(dir.path().join("race.db")).await.unwrap();
    let log = Arc::new(HistoryLog::new(store, 5));

    let mut handles = Vec::new();
    for i in 0..20 {
        let log = log.clone();
        handles.push(tokio::spawn(async move {
            log.record(1, HistoryCategory::Entity, &format!("Q{}", i % 12)).await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let entries = log.entries(1, HistoryCategory::Entity).await.unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(
        entries.iter().map(|e| e.rank).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );
    let distinct: HashSet<&str> = entries.iter().map(|e| e.value.as_str()).collect();
    assert_eq!(distinct.len(), 5);
}

/// Test 3: Concurrent appends for one user keep the trail distinct and bounded
#[tokio::test]
async fn test_concurrent_appends_same_user() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = SqliteStore::new(dir.path().join("trail.db")).await.unwrap();
    let log = Arc::new(PathLog::new(store, 5));

    let mut handles = Vec::new();
    for i in 0..24 {
        let log = log.clone();
        handles.push(tokio::spawn(async move {
            log.append_token(1, &format!("t{}", i % 9)).await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let tokens = log.list(1).await.unwrap();
    assert_eq!(tokens.len(), 5);
    let distinct: HashSet<&str> = tokens.iter().map(String::as_str).collect();
    assert_eq!(distinct.len(), tokens.len());
    assert!(tokens.iter().all(|t| t.starts_with('t')));
}

/// Test 4: Concurrent wizard turns for one user advance one phase each
#[tokio::test]
async fn test_concurrent_wizard_turns_same_user() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = SqliteStore::new(dir.path().join("wizard.db")).await.unwrap();
    let wizard = Arc::new(QueryWizard::new(
        store,
        Arc::new(StaticLabelResolver::wikidata_sample()),
    ));
    wizard.start(1).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let wizard = wizard.clone();
        handles.push(tokio::spawn(async move {
            let text = format!("turn{}", i);
            let phase = wizard.submit_text(1, &text).await;
            (text, phase)
        }));
    }
    let mut turns = Vec::new();
    for h in handles {
        let (text, phase) = h.await.unwrap();
        turns.push((text, phase.unwrap().unwrap()));
    }

    let took = |phase: WizardPhase| {
        turns
            .iter()
            .filter(|(_, p)| *p == phase)
            .map(|(t, _)| t.as_str())
            .collect::<Vec<_>>()
    };
    let to_predicate = took(WizardPhase::AwaitingPredicate);
    let to_object = took(WizardPhase::AwaitingObject);
    assert_eq!(to_predicate.len(), 1);
    assert_eq!(to_object.len(), 1);
    assert_eq!(took(WizardPhase::Ready).len(), 8);
    assert!(took(WizardPhase::AwaitingSubject).is_empty());

    let state = wizard.state(1).await.unwrap().unwrap();
    assert_eq!(state.phase, WizardPhase::Ready);
    // Each slot holds the text of the turn that filled it
    assert_eq!(state.subject, to_predicate[0]);
    assert_eq!(state.predicate, to_object[0]);
    assert!(state.object.starts_with("turn"));
    let slots: HashSet<&str> = [
        state.subject.as_str(),
        state.predicate.as_str(),
        state.object.as_str(),
    ]
    .into_iter()
    .collect();
    assert_eq!(slots.len(), 3);
}

/// Test 5: Concurrent appends from many users stay isolated
#[tokio::test]
async fn test_concurrent_paths_many_users() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = SqliteStore::new(dir.path().join("paths.db")).await.unwrap();
    let log = Arc::new(PathLog::new(store, 5));

    let mut handles = Vec::new();
    for user in 0..8i64 {
        let log = log.clone();
        handles.push(tokio::spawn(async move {
            for step in 0..7 {
                log.append_token(user, &format!("Q{}{}", user, step)).await?;
            }
            Ok::<_, wdbot_memory::StoreError>(())
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    for user in 0..8i64 {
        let expected: Vec<String> = (2..7).rev().map(|step| format!("Q{}{}", user, step)).collect();
        assert_eq!(log.list(user).await.unwrap(), expected);
    }
}

/// Test 6: A smaller window after restart trims on the next insert
#[tokio::test]
async fn test_window_shrink_between_runs() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("shrink.db");

    let store = SqliteStore::new(&path).await.unwrap();
    let wide = HistoryLog::new(store.clone(), 5);
    for v in ["a", "b", "c", "d", "e"] {
        wide.record(3, HistoryCategory::Location, v).await.unwrap();
    }
    store.close().await;

    let store = SqliteStore::new(&path).await.unwrap();
    let narrow = HistoryLog::new(store, 3);
    narrow.record(3, HistoryCategory::Location, "f").await.unwrap();

    let entries = narrow.entries(3, HistoryCategory::Location).await.unwrap();
    assert_eq!(
        entries.iter().map(|e| e.value.as_str()).collect::<Vec<_>>(),
        vec!["f", "e", "d"]
    );
    assert_eq!(
        entries.iter().map(|e| e.rank).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}
