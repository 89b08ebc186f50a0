use pretty_assertions::assert_eq;
use relist_plan::{PlanError, Planner};
use relist_sync::{
    CommitError, CommitPhase, Committer, ContainerStore, InMemoryStore, ReconcileConfig,
    Reconciler, StoreCall, SyncError,
};
use relist_types::{ContainerId, ContentId, Sequence, SlotId, TargetOrder};
use std::collections::HashSet;
use std::sync::Arc;

fn playlist() -> ContainerId {
    ContainerId::from("PL1")
}

fn ids(values: &[&str]) -> Vec<ContentId> {
    values.iter().map(|v| ContentId::from(*v)).collect()
}

fn target(values: &[&str]) -> TargetOrder {
    values.iter().copied().collect()
}

fn store_with(values: &[&str]) -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new().with_container(playlist(), values.iter().copied()))
}

fn slots(seq: &Sequence) -> HashSet<SlotId> {
    seq.entries().iter().map(|e| e.slot_id.clone()).collect()
}

// ── Successful commits ──────────────────────────────────────────

#[tokio::test]
async fn commit_reaches_target_and_shadow_matches_store() {
    let store = store_with(&["a", "b", "c", "a"]);
    let current = store.list(&playlist()).await.unwrap();
    let goal = target(&["c", "d", "a", "b"]);
    let plan = Planner::new().plan(&goal, &current).unwrap();

    let mut committer = Committer::new(store.clone());
    let report = committer.commit(&plan, &current).await.unwrap();

    assert_eq!(committer.phase(), CommitPhase::Done);
    assert_eq!(committer.completed(), plan.len());
    assert_eq!((report.deleted, report.inserted), (1, 1));

    let listed = store.list(&playlist()).await.unwrap();
    assert_eq!(listed.content_ids(), ids(&["c", "d", "a", "b"]));
    // The shadow tracked every slot id the store assigned.
    assert_eq!(report.shadow, listed);
}

#[tokio::test]
async fn pure_reorder_keeps_every_slot() {
    let values = [
        "h63qnV0B0jc",
        "xz0L3KknMU0",
        "Yq8t3sFao4s",
        "SeZl4r8F6hM",
        "s2BSE3LvLpc",
    ];
    let store = store_with(&values);
    let current = store.list(&playlist()).await.unwrap();
    let goal = target(&[values[3], values[0], values[4], values[2], values[1]]);
    let plan = Planner::new().plan(&goal, &current).unwrap();
    assert!(plan.deletes().is_empty() && plan.inserts().is_empty());

    Committer::new(store.clone()).commit(&plan, &current).await.unwrap();

    let listed = store.list(&playlist()).await.unwrap();
    assert_eq!(listed.content_ids(), goal.as_slice().to_vec());
    assert_eq!(slots(&listed), slots(&current));
    assert!(store
        .calls()
        .await
        .iter()
        .all(|c| matches!(c, StoreCall::UpdatePosition { .. })));
}

#[tokio::test]
async fn duplicate_move_uses_the_relocated_slot() {
    // [a, b, a] -> [a, a, b] moves the second `a` forward. The first `a`
    // must keep its place.
    let store = store_with(&["a", "b", "a"]);
    let current = store.list(&playlist()).await.unwrap();
    let first_a = current.entries()[0].slot_id.clone();
    let second_a = current.entries()[2].slot_id.clone();
    let plan = Planner::new().plan(&target(&["a", "a", "b"]), &current).unwrap();

    Committer::new(store.clone()).commit(&plan, &current).await.unwrap();

    assert_eq!(
        store.calls().await,
        vec![StoreCall::UpdatePosition {
            slot: second_a.clone(),
            container: playlist(),
            content: ContentId::from("a"),
            position: 1,
        }]
    );
    let listed = store.list(&playlist()).await.unwrap();
    assert_eq!(listed.content_ids(), ids(&["a", "a", "b"]));
    assert_eq!(listed.entries()[0].slot_id, first_a);
    assert_eq!(listed.entries()[1].slot_id, second_a);
}

#[tokio::test]
async fn surplus_duplicates_are_deleted_by_slot() {
    let store = store_with(&["a", "a", "a"]);
    let current = store.list(&playlist()).await.unwrap();
    let plan = Planner::new().plan(&target(&["a"]), &current).unwrap();

    Committer::new(store.clone()).commit(&plan, &current).await.unwrap();

    let listed = store.list(&playlist()).await.unwrap();
    assert_eq!(listed.content_ids(), ids(&["a"]));
    assert!(slots(&current).contains(&listed.entries()[0].slot_id));
}

#[tokio::test]
async fn empty_plan_issues_no_calls() {
    let store = store_with(&["a", "b"]);
    let current = store.list(&playlist()).await.unwrap();
    let plan = Planner::new().plan(&target(&["a", "b"]), &current).unwrap();

    let report = Committer::new(store.clone()).commit(&plan, &current).await.unwrap();
    assert_eq!(report.shadow, current);
    assert!(store.calls().await.is_empty());
}

// ── Refusals ────────────────────────────────────────────────────

#[tokio::test]
async fn stale_snapshot_is_refused() {
    let store = store_with(&["a", "b"]);
    let current = store.list(&playlist()).await.unwrap();
    let plan = Planner::new().plan(&target(&["b", "a"]), &current).unwrap();

    store.insert_at(&playlist(), &ContentId::from("z"), 0).await.unwrap();
    store.clear_calls().await;
    let changed = store.list(&playlist()).await.unwrap();

    let mut committer = Committer::new(store.clone());
    let err = committer.commit(&plan, &changed).await.unwrap_err();
    assert!(matches!(
        err,
        CommitError::StaleSnapshot(PlanError::SnapshotMismatch { .. })
    ));
    assert!(store.calls().await.is_empty());
    // Refusal happens before any state change.
    assert_eq!(committer.phase(), CommitPhase::Idle);
}

#[tokio::test]
async fn plan_for_other_container_is_refused() {
    let store = Arc::new(
        InMemoryStore::new()
            .with_container(playlist(), ["a"])
            .with_container(ContainerId::from("PL2"), ["a"]),
    );
    let current = store.list(&playlist()).await.unwrap();
    let other = store.list(&ContainerId::from("PL2")).await.unwrap();
    let plan = Planner::new().plan(&target(&["a"]), &current).unwrap();

    let err = Committer::new(store).commit(&plan, &other).await.unwrap_err();
    assert!(matches!(
        err,
        CommitError::StaleSnapshot(PlanError::ContainerMismatch { .. })
    ));
}

#[tokio::test]
async fn committer_is_single_use() {
    let store = store_with(&["a"]);
    let current = store.list(&playlist()).await.unwrap();
    let plan = Planner::new().plan(&target(&["a"]), &current).unwrap();

    let mut committer = Committer::new(store);
    committer.commit(&plan, &current).await.unwrap();
    let err = committer.commit(&plan, &current).await.unwrap_err();
    assert!(matches!(err, CommitError::AlreadyUsed(CommitPhase::Done)));
}

// ── Aborts ──────────────────────────────────────────────────────

#[tokio::test]
async fn failed_call_aborts_and_reconcile_recovers() {
    let store = store_with(&["a", "b", "c"]);
    let current = store.list(&playlist()).await.unwrap();
    let goal = target(&["c", "d", "a"]);
    let plan = Planner::new().plan(&goal, &current).unwrap();
    assert_eq!((plan.deletes().len(), plan.inserts().len()), (1, 1));

    // The delete goes through, the insert fails.
    store.fail_after(1).await;
    let mut committer = Committer::new(store.clone());
    let err = committer.commit(&plan, &current).await.unwrap_err();

    match err {
        CommitError::Remote {
            phase,
            completed,
            source,
            ..
        } => {
            assert_eq!(phase, CommitPhase::DeletesApplied);
            assert_eq!(completed, 1);
            assert!(matches!(source, SyncError::Network(_)));
        }
        other => panic!("expected remote error, got {other:?}"),
    }
    assert_eq!(committer.phase(), CommitPhase::Aborted);
    assert_eq!(committer.completed(), 1);

    // Hybrid state: `b` is gone, `d` never arrived.
    let hybrid = store.list(&playlist()).await.unwrap();
    assert_eq!(hybrid.content_ids(), ids(&["a", "c"]));

    // An aborted committer stays aborted.
    let err = committer.commit(&plan, &hybrid).await.unwrap_err();
    assert!(matches!(err, CommitError::AlreadyUsed(CommitPhase::Aborted)));

    store.heal().await;
    let outcome = Reconciler::new(store.clone(), ReconcileConfig::default())
        .reconcile(&playlist(), &goal)
        .await
        .unwrap();
    assert!(outcome.verified);
    assert!(outcome.plan.deletes().is_empty());
    assert_eq!(
        store.list(&playlist()).await.unwrap().content_ids(),
        ids(&["c", "d", "a"])
    );
}

#[tokio::test]
async fn failure_during_moves_reports_inserts_applied() {
    let store = store_with(&["a", "b", "c"]);
    let current = store.list(&playlist()).await.unwrap();
    let plan = Planner::new().plan(&target(&["c", "b", "a"]), &current).unwrap();
    assert!(plan.moves().len() >= 2);

    store.fail_after(1).await;
    let err = Committer::new(store.clone())
        .commit(&plan, &current)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommitError::Remote {
            phase: CommitPhase::InsertsApplied,
            completed: 1,
            ..
        }
    ));
}
