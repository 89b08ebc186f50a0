use pretty_assertions::assert_eq;
use proptest::prelude::*;
use relist_plan::{PlanObserver, Planner};
use relist_sync::{
    ContainerStore, InMemoryStore, ReconcileConfig, ReconcileError, Reconciler, SyncError,
};
use relist_types::{ContainerId, ContentId, Entry, TargetOrder};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

fn playlist() -> ContainerId {
    ContainerId::from("PL1")
}

fn ids(values: &[&str]) -> Vec<ContentId> {
    values.iter().map(|v| ContentId::from(*v)).collect()
}

fn target(values: &[&str]) -> TargetOrder {
    values.iter().copied().collect()
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn config_defaults() {
    let cfg = ReconcileConfig::default();
    assert!(!cfg.dry_run);
    assert!(cfg.verify);
}

#[test]
fn config_missing_fields_use_defaults() {
    let cfg: ReconcileConfig = serde_json::from_str(r#"{"dry_run": true}"#).unwrap();
    assert!(cfg.dry_run);
    assert!(cfg.verify);
}

// ── reconcile ───────────────────────────────────────────────────

#[tokio::test]
async fn reconcile_applies_and_verifies() {
    let store = Arc::new(InMemoryStore::new().with_container(playlist(), ["a", "b", "c"]));
    let reconciler = Reconciler::new(store.clone(), ReconcileConfig::default());

    let outcome = reconciler.reconcile(&playlist(), &target(&["b", "c", "d"])).await.unwrap();

    assert!(outcome.verified);
    assert_eq!(outcome.final_order, ids(&["b", "c", "d"]));
    let report = outcome.committed.unwrap();
    assert_eq!((report.deleted, report.inserted), (1, 1));
    assert_eq!(store.calls().await.len(), outcome.plan.len());
}

#[tokio::test]
async fn dry_run_issues_no_calls() {
    let store = Arc::new(InMemoryStore::new().with_container(playlist(), ["a", "b", "c"]));
    let config = ReconcileConfig {
        dry_run: true,
        ..Default::default()
    };
    let reconciler = Reconciler::new(store.clone(), config);

    let outcome = reconciler.reconcile(&playlist(), &target(&["c", "a"])).await.unwrap();

    assert!(outcome.committed.is_none());
    assert!(!outcome.verified);
    assert_eq!(outcome.final_order, ids(&["c", "a"]));
    assert!(!outcome.plan.is_empty());
    assert!(store.calls().await.is_empty());
    assert_eq!(
        store.list(&playlist()).await.unwrap().content_ids(),
        ids(&["a", "b", "c"])
    );
}

#[tokio::test]
async fn verify_can_be_disabled() {
    let store = Arc::new(InMemoryStore::new().with_container(playlist(), ["a", "b"]));
    let config = ReconcileConfig {
        verify: false,
        ..Default::default()
    };
    let outcome = Reconciler::new(store, config)
        .reconcile(&playlist(), &target(&["b", "a"]))
        .await
        .unwrap();

    assert!(!outcome.verified);
    assert_eq!(outcome.final_order, ids(&["b", "a"]));
}

#[tokio::test]
async fn reconcile_is_idempotent() {
    let store = Arc::new(InMemoryStore::new().with_container(playlist(), ["a", "b", "a"]));
    let reconciler = Reconciler::new(store.clone(), ReconcileConfig::default());
    let goal = target(&["b", "a", "a", "c"]);

    reconciler.reconcile(&playlist(), &goal).await.unwrap();
    store.clear_calls().await;

    let again = reconciler.reconcile(&playlist(), &goal).await.unwrap();
    assert!(again.plan.is_empty());
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn plan_does_not_mutate() {
    let store = Arc::new(InMemoryStore::new().with_container(playlist(), ["a", "b"]));
    let reconciler = Reconciler::new(store.clone(), ReconcileConfig::default());

    let (current, plan) = reconciler.plan(&playlist(), &target(&["b"])).await.unwrap();

    assert_eq!(plan.snapshot(), &current.fingerprint());
    assert_eq!(plan.deletes().len(), 1);
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn unknown_container_is_a_store_error() {
    let reconciler = Reconciler::new(Arc::new(InMemoryStore::new()), ReconcileConfig::default());
    let err = reconciler.reconcile(&playlist(), &target(&["a"])).await.unwrap_err();

    assert!(matches!(err, ReconcileError::Store(SyncError::NotFound(_))));
    assert!(!err.is_invariant_violation());
}

#[tokio::test]
async fn custom_planner_observer_sees_titles() {
    #[derive(Clone, Default)]
    struct Deleted(Arc<Mutex<Vec<String>>>);

    impl PlanObserver for Deleted {
        fn on_delete(&self, _op: &relist_plan::Delete, entry: &Entry) {
            self.0.lock().unwrap().push(entry.title.clone());
        }
    }

    let store = Arc::new(
        InMemoryStore::new()
            .with_container(playlist(), ["a", "b"])
            .with_title("a", "Alpha"),
    );
    let seen = Deleted::default();
    let reconciler = Reconciler::new(store, ReconcileConfig::default())
        .with_planner(Planner::new().with_observer(seen.clone()));

    reconciler.reconcile(&playlist(), &target(&["b"])).await.unwrap();
    assert_eq!(*seen.0.lock().unwrap(), vec!["Alpha".to_string()]);
}

// ── Round trip through the store ────────────────────────────────

fn order_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(str::to_string),
        0..12,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reconcile_round_trips(current in order_strategy(), goal in order_strategy()) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let store = Arc::new(
                InMemoryStore::new().with_container(playlist(), current.iter().cloned()),
            );
            let before = store.list(&playlist()).await.unwrap();
            let wanted: TargetOrder = goal.iter().cloned().collect();

            let outcome = Reconciler::new(store.clone(), ReconcileConfig::default())
                .reconcile(&playlist(), &wanted)
                .await
                .unwrap();
            let after = store.list(&playlist()).await.unwrap();

            assert!(outcome.verified);
            assert_eq!(after.content_ids(), wanted.as_slice().to_vec());

            // Every surviving slot either existed before or was inserted by
            // this commit; no slot is listed twice.
            let old: HashSet<_> = before.entries().iter().map(|e| e.slot_id.clone()).collect();
            let kept = after.entries().iter().filter(|e| old.contains(&e.slot_id)).count();
            let report = outcome.committed.unwrap();
            assert_eq!(kept + report.inserted, after.len());
            assert_eq!(before.len() - report.deleted, kept);
        });
    }
}
