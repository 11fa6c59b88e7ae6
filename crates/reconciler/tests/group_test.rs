//! Group reconciliation against the in-memory remote.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::arithmetic_side_effects)]

use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use tagsync_client::{InMemoryResource, Operation, RemoteCall, RemoteResource};
use tagsync_core::Attr;
use tagsync_model::{
    ManagedObject, ParameterNode, ParameterSchema, ResourceGroup, Trigger, WireTrigger,
};
use tagsync_reconciler::{Error, GroupReconciler, Phase, ReconcileAction};
use tokio_util::sync::CancellationToken;

type Remote = Arc<InMemoryResource<WireTrigger>>;

fn reconciler(remote: &Remote) -> GroupReconciler<Trigger> {
    GroupReconciler::<Trigger>::builder()
        .with_remote(remote.clone())
        .with_schema(Arc::new(ParameterSchema::standard()))
        .build()
        .unwrap()
}

/// Remote and tracked state holding `objects` with ids 1, 2, 3...
fn seed(objects: Vec<Trigger>) -> (Remote, ResourceGroup<Trigger>) {
    let tracked: Vec<Trigger> = objects
        .into_iter()
        .enumerate()
        .map(|(i, mut trigger)| {
            trigger.remote_id = Attr::value((i + 1).to_string());
            trigger
        })
        .collect();
    let remote = Arc::new(InMemoryResource::from_objects(
        tracked.iter().map(ManagedObject::to_wire),
    ));
    (remote, ResourceGroup::from_objects(tracked).unwrap())
}

fn group(objects: impl IntoIterator<Item = Trigger>) -> ResourceGroup<Trigger> {
    ResourceGroup::from_objects(objects).unwrap()
}

fn call(operation: Operation, target: &str) -> RemoteCall {
    RemoteCall {
        operation,
        target: target.to_string(),
    }
}

fn names(state: &ResourceGroup<Trigger>) -> Vec<&str> {
    state.names().collect()
}

#[tokio::test]
async fn test_create_from_empty_state() {
    let remote: Remote = Arc::new(InMemoryResource::new());
    let desired = group([Trigger::new("t1", "click")]);

    let outcome = reconciler(&remote).create(&desired).await;

    assert!(outcome.all_succeeded());
    assert_eq!(remote.calls().await, vec![call(Operation::Create, "t1")]);
    let created = outcome.state.get("t1").unwrap();
    assert_eq!(created.remote_id, Attr::value("1"));
    assert!(created.content_eq(desired.get("t1").unwrap()));
    assert_eq!(
        outcome.actions,
        vec![ReconcileAction::Create {
            name: "t1".to_string()
        }]
    );
}

#[tokio::test]
async fn test_update_changed_notes() {
    let (remote, tracked) = seed(vec![Trigger::new("t1", "click").with_notes("old")]);
    let desired = group([Trigger::new("t1", "click").with_notes("new")]);

    let outcome = reconciler(&remote).update(&desired, &tracked).await;

    assert!(outcome.all_succeeded());
    assert_eq!(remote.calls().await, vec![call(Operation::Update, "1")]);
    let updated = outcome.state.get("t1").unwrap();
    assert_eq!(updated.notes, Attr::value("new"));
    assert_eq!(updated.remote_id, Attr::value("1"));
}

#[tokio::test]
async fn test_update_deletes_undeclared() {
    let (remote, tracked) = seed(vec![
        Trigger::new("t1", "click"),
        Trigger::new("t2", "pageview"),
    ]);
    let desired = group([Trigger::new("t2", "pageview")]);

    let outcome = reconciler(&remote).update(&desired, &tracked).await;

    assert!(outcome.all_succeeded());
    assert_eq!(remote.calls().await, vec![call(Operation::Delete, "1")]);
    assert_eq!(names(&outcome.state), vec!["t2"]);
    assert_eq!(outcome.state.get("t2"), tracked.get("t2"));
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let remote: Remote = Arc::new(InMemoryResource::new());
    let reconciler = reconciler(&remote);
    let desired = group([
        Trigger::new("All Pages", "pageview"),
        Trigger::new("Purchase", "customEvent").with_notes("checkout"),
    ]);

    let first = reconciler.create(&desired).await;
    assert!(first.all_succeeded());
    remote.clear_calls().await;

    let second = reconciler.update(&desired, &first.state).await;

    assert!(second.converged());
    assert_eq!(remote.call_count().await, 0);
    assert_eq!(second.state, first.state);
}

#[tokio::test]
async fn test_final_state_independent_of_insertion_order() {
    let declared = vec![
        Trigger::new("a", "click").with_notes("changed"),
        Trigger::new("c", "pageview"),
        Trigger::new("d", "customEvent"),
    ];
    let existing = vec![
        Trigger::new("a", "click"),
        Trigger::new("b", "click"),
        Trigger::new("c", "pageview"),
    ];

    let mut outcomes = Vec::new();
    for (desired_order, tracked_order) in declared
        .iter()
        .permutations(declared.len())
        .zip(existing.iter().permutations(existing.len()))
    {
        let (remote, tracked) = seed(existing.clone());
        let tracked: ResourceGroup<Trigger> = tracked_order
            .into_iter()
            .map(|t| tracked.get(&t.name).unwrap().clone())
            .collect();
        let desired = group(desired_order.into_iter().cloned());

        let outcome = reconciler(&remote).update(&desired, &tracked).await;
        assert!(outcome.all_succeeded());
        outcomes.push((outcome.state, remote.calls().await));
    }

    assert!(outcomes.iter().all_equal());
}

#[tokio::test]
async fn test_failed_delete_does_not_block_later_phases() {
    let (remote, tracked) = seed(vec![
        Trigger::new("a", "click"),
        Trigger::new("b", "click"),
        Trigger::new("c", "click"),
        Trigger::new("keep", "click"),
    ]);
    remote.fail_on(Operation::Delete, "c").await;
    let desired = group([
        Trigger::new("keep", "click").with_notes("edited"),
        Trigger::new("new", "pageview"),
    ]);

    let outcome = reconciler(&remote).update(&desired, &tracked).await;

    assert_eq!(names(&outcome.state), vec!["c", "keep", "new"]);
    assert_eq!(
        outcome.state.get("keep").unwrap().notes,
        Attr::value("edited")
    );
    assert_eq!(outcome.errors.len(), 1);
    assert!(matches!(
        &outcome.errors[0],
        Error::Remote { phase: Phase::Delete, name, .. } if name == "c"
    ));
    assert_eq!(
        outcome.actions.iter().map(ReconcileAction::phase).collect_vec(),
        vec![Phase::Delete, Phase::Delete, Phase::Create, Phase::Update]
    );
}

#[tokio::test]
async fn test_failure_stops_rest_of_phase() {
    let (remote, tracked) = seed(vec![
        Trigger::new("a", "click"),
        Trigger::new("b", "click"),
        Trigger::new("c", "click"),
    ]);
    remote.fail_on(Operation::Delete, "b").await;

    let outcome = reconciler(&remote).delete(&tracked).await;

    assert_eq!(names(&outcome.state), vec!["b", "c"]);
    assert_eq!(
        remote.calls().await,
        vec![call(Operation::Delete, "1"), call(Operation::Delete, "2")]
    );
    assert_eq!(outcome.errors.len(), 1);
}

#[tokio::test]
async fn test_create_failure_keeps_created_prefix() {
    let remote: Remote = Arc::new(InMemoryResource::new());
    remote.fail_on(Operation::Create, "b").await;
    let desired = group([
        Trigger::new("a", "click"),
        Trigger::new("b", "click"),
        Trigger::new("c", "click"),
    ]);

    let outcome = reconciler(&remote).create(&desired).await;

    assert_eq!(names(&outcome.state), vec!["a"]);
    assert_eq!(
        remote.calls().await,
        vec![call(Operation::Create, "a"), call(Operation::Create, "b")]
    );
    assert!(matches!(
        &outcome.errors[..],
        [Error::Remote { phase: Phase::Create, .. }]
    ));
}

#[tokio::test]
async fn test_invalid_desired_issues_no_calls() {
    let (remote, tracked) = seed(vec![Trigger::new("t1", "click")]);
    let too_deep = (1..6).fold(ParameterNode::scalar("boolean", "true"), |inner, _| {
        ParameterNode::list(vec![inner])
    });
    let condition = tagsync_model::ConditionNode::new("equals").with_parameter(too_deep);
    let desired = group([
        Trigger::new("t1", "click").with_filter(condition),
        Trigger::new("t2", "click"),
    ]);

    let outcome = reconciler(&remote).update(&desired, &tracked).await;

    assert_eq!(remote.call_count().await, 0);
    assert_eq!(outcome.state, tracked);
    assert!(matches!(
        &outcome.errors[..],
        [Error::Validation {
            source: tagsync_core::Error::DepthExceeded { depth: 6, .. },
            ..
        }]
    ));

    let created = reconciler(&remote).create(&desired).await;
    assert!(created.state.is_empty());
    assert_eq!(remote.call_count().await, 0);
}

#[tokio::test]
async fn test_container_kind_with_scalar_value_is_rejected() {
    let (remote, tracked) = seed(vec![Trigger::new("t1", "click")]);
    let condition = tagsync_model::ConditionNode::new("equals")
        .with_parameter(ParameterNode::scalar("list", "x").with_key("arg0"));
    let desired = group([Trigger::new("t1", "click").with_filter(condition)]);

    let outcome = reconciler(&remote).update(&desired, &tracked).await;

    assert_eq!(remote.call_count().await, 0);
    assert_eq!(outcome.state, tracked);
    assert!(matches!(
        &outcome.errors[..],
        [Error::Validation {
            source: tagsync_core::Error::InvalidRecord { .. },
            ..
        }]
    ));
}

#[tokio::test]
async fn test_failed_create_does_not_block_updates() {
    let (remote, tracked) = seed(vec![Trigger::new("keep", "click")]);
    remote.fail_on(Operation::Create, "new").await;
    let desired = group([
        Trigger::new("keep", "click").with_notes("edited"),
        Trigger::new("new", "pageview"),
    ]);

    let outcome = reconciler(&remote).update(&desired, &tracked).await;

    assert_eq!(
        remote.calls().await,
        vec![call(Operation::Create, "new"), call(Operation::Update, "1")]
    );
    assert_eq!(names(&outcome.state), vec!["keep"]);
    assert_eq!(
        outcome.state.get("keep").unwrap().notes,
        Attr::value("edited")
    );
    assert!(matches!(
        &outcome.errors[..],
        [Error::Remote { phase: Phase::Create, name, .. }] if name == "new"
    ));
    assert_eq!(
        outcome.actions,
        vec![ReconcileAction::Update {
            name: "keep".to_string(),
            id: "1".to_string()
        }]
    );
}

#[tokio::test]
async fn test_update_failure_keeps_earlier_replacements() {
    let (remote, tracked) = seed(vec![
        Trigger::new("a", "click"),
        Trigger::new("b", "click"),
        Trigger::new("c", "click"),
    ]);
    remote.fail_on(Operation::Update, "b").await;
    let desired = group(
        ["a", "b", "c"].map(|name| Trigger::new(name, "click").with_notes("changed")),
    );

    let outcome = reconciler(&remote).update(&desired, &tracked).await;

    assert_eq!(
        remote.calls().await,
        vec![call(Operation::Update, "1"), call(Operation::Update, "2")]
    );
    assert_eq!(names(&outcome.state), vec!["a", "b", "c"]);
    let a = outcome.state.get("a").unwrap();
    assert_eq!(a.notes, Attr::value("changed"));
    assert_eq!(a.remote_id, Attr::value("1"));
    assert_eq!(outcome.state.get("b"), tracked.get("b"));
    assert_eq!(outcome.state.get("c"), tracked.get("c"));
    assert!(matches!(
        &outcome.errors[..],
        [Error::Remote { phase: Phase::Update, name, .. }] if name == "b"
    ));
}

#[tokio::test]
async fn test_cancelled_before_pass() {
    let (remote, tracked) = seed(vec![Trigger::new("a", "click")]);
    let token = CancellationToken::new();
    let reconciler = GroupReconciler::<Trigger>::builder()
        .with_remote(remote.clone())
        .with_cancellation(token.clone())
        .build()
        .unwrap();
    token.cancel();

    let desired = group([Trigger::new("b", "click")]);
    let outcome = reconciler.update(&desired, &tracked).await;

    assert_eq!(remote.call_count().await, 0);
    assert_eq!(outcome.state, tracked);
    assert!(matches!(
        &outcome.errors[..],
        [Error::Cancelled {
            phase: Phase::Delete,
            ..
        }]
    ));

    let read = reconciler.read(&tracked).await;
    assert_eq!(read.state, tracked);
    assert!(read.errors[0].is_cancelled());
}

/// Cancels the token once the first create completes.
struct CancelAfterCreate {
    inner: InMemoryResource<WireTrigger>,
    token: CancellationToken,
}

#[async_trait]
impl RemoteResource<WireTrigger> for CancelAfterCreate {
    async fn create(&self, object: &WireTrigger) -> tagsync_client::Result<WireTrigger> {
        let created = self.inner.create(object).await;
        self.token.cancel();
        created
    }

    async fn list(&self) -> tagsync_client::Result<Vec<WireTrigger>> {
        self.inner.list().await
    }

    async fn get(&self, id: &str) -> tagsync_client::Result<WireTrigger> {
        self.inner.get(id).await
    }

    async fn update(&self, id: &str, object: &WireTrigger) -> tagsync_client::Result<WireTrigger> {
        self.inner.update(id, object).await
    }

    async fn delete(&self, id: &str) -> tagsync_client::Result<()> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn test_cancelled_mid_pass_keeps_completed_work() {
    let token = CancellationToken::new();
    let remote = Arc::new(CancelAfterCreate {
        inner: InMemoryResource::new(),
        token: token.clone(),
    });
    let reconciler = GroupReconciler::<Trigger>::builder()
        .with_remote(remote.clone())
        .with_cancellation(token)
        .build()
        .unwrap();
    let desired = group([
        Trigger::new("a", "click"),
        Trigger::new("b", "click"),
        Trigger::new("c", "click"),
    ]);

    let outcome = reconciler.update(&desired, &ResourceGroup::new()).await;

    assert_eq!(names(&outcome.state), vec!["a"]);
    assert_eq!(remote.inner.call_count().await, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert!(matches!(
        &outcome.errors[0],
        Error::Cancelled {
            phase: Phase::Create,
            ..
        }
    ));
}

#[tokio::test]
async fn test_read_refreshes_tracked_names_only() {
    let (remote, tracked) = seed(vec![
        Trigger::new("t1", "click"),
        Trigger::new("t2", "click"),
    ]);
    let mut edited = remote.find_by_name("t1").await.unwrap();
    edited.notes = "edited in the UI".to_string();
    remote.update("1", &edited).await.unwrap();
    remote.delete("2").await.unwrap();
    remote
        .create(&Trigger::new("t3", "click").to_wire())
        .await
        .unwrap();
    remote.clear_calls().await;

    let outcome = reconciler(&remote).read(&tracked).await;

    assert!(outcome.all_succeeded());
    assert_eq!(remote.calls().await, vec![call(Operation::List, "")]);
    assert_eq!(names(&outcome.state), vec!["t1"]);
    assert_eq!(
        outcome.state.get("t1").unwrap().notes,
        Attr::value("edited in the UI")
    );
}

#[tokio::test]
async fn test_read_failure_keeps_state() {
    let (remote, tracked) = seed(vec![Trigger::new("t1", "click")]);
    remote.fail_on(Operation::List, "").await;

    let outcome = reconciler(&remote).read(&tracked).await;

    assert_eq!(outcome.state, tracked);
    assert!(matches!(&outcome.errors[..], [Error::ListFailed { .. }]));
}

#[tokio::test]
async fn test_delete_all() {
    let (remote, tracked) = seed(vec![
        Trigger::new("a", "click"),
        Trigger::new("b", "click"),
    ]);

    let outcome = reconciler(&remote).delete(&tracked).await;

    assert!(outcome.all_succeeded());
    assert!(outcome.state.is_empty());
    assert_eq!(
        remote.calls().await,
        vec![call(Operation::Delete, "1"), call(Operation::Delete, "2")]
    );
    assert!(remote.objects().await.is_empty());
}

#[tokio::test]
async fn test_created_object_keyed_by_returned_name() {
    let remote: Remote = Arc::new(InMemoryResource::new());
    remote.rename_on_write("all pages", "All Pages").await;
    let desired = group([Trigger::new("all pages", "pageview")]);

    let outcome = reconciler(&remote).create(&desired).await;

    assert_eq!(names(&outcome.state), vec!["All Pages"]);
    assert_eq!(
        outcome.actions,
        vec![ReconcileAction::Create {
            name: "All Pages".to_string()
        }]
    );
}

#[tokio::test]
async fn test_untracked_id_stops_phase() {
    let remote: Remote = Arc::new(InMemoryResource::new());
    let tracked = group([Trigger::new("ghost", "click")]);

    let outcome = reconciler(&remote).delete(&tracked).await;

    assert_eq!(remote.call_count().await, 0);
    assert_eq!(outcome.state, tracked);
    assert!(matches!(&outcome.errors[..], [Error::MissingId { .. }]));
}

#[tokio::test]
async fn test_plan_matches_update() {
    let (remote, tracked) = seed(vec![
        Trigger::new("a", "click"),
        Trigger::new("b", "click"),
    ]);
    let desired = group([
        Trigger::new("b", "click").with_notes("x"),
        Trigger::new("c", "click"),
    ]);
    let reconciler = reconciler(&remote);

    let plan = reconciler.plan(&desired, &tracked);
    assert_eq!(remote.call_count().await, 0);

    let outcome = reconciler.update(&desired, &tracked).await;
    assert_eq!(plan, outcome.actions);
}

#[tokio::test]
async fn test_create_renamed_onto_tracked_name_replaces_it() {
    let (remote, tracked) = seed(vec![Trigger::new("All Pages", "pageview")]);
    remote.rename_on_write("all pages", "All Pages").await;
    let desired = group([
        Trigger::new("All Pages", "pageview"),
        Trigger::new("all pages", "pageview"),
    ]);

    let outcome = reconciler(&remote).update(&desired, &tracked).await;

    assert!(outcome.all_succeeded());
    assert_eq!(remote.calls().await, vec![call(Operation::Create, "all pages")]);
    assert_eq!(names(&outcome.state), vec!["All Pages"]);
    assert_eq!(
        outcome.state.get("All Pages").unwrap().remote_id,
        Attr::value("2")
    );
}
