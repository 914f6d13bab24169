use super::*;
use serde_json::json;

fn dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(CommandStore::new()), Duration::from_secs(30))
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_resolves_on_reported_success() {
    let dispatcher = dispatcher();
    let store = dispatcher.store().clone();

    let reporter = tokio::spawn({
        let store = store.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(800)).await;
            let pending = store.list_pending().await;
            assert_eq!(pending.len(), 1);
            store
                .set_result(
                    pending[0].id,
                    CommandOutcome::Completed(json!({"clicked": true})),
                )
                .await;
        }
    });

    let started = Instant::now();
    let result = dispatcher
        .dispatch_with_timeout(
            "click_element",
            json!({"selector": "#go"}),
            Duration::from_millis(2000),
        )
        .await
        .unwrap();

    assert_eq!(result, json!({"clicked": true}));
    // Resolved when the report landed, not at the deadline.
    assert!(started.elapsed() < Duration::from_millis(2000));
    assert!(started.elapsed() >= Duration::from_millis(800));

    // Record removed after resolution.
    assert!(store.is_empty().await);
    reporter.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_times_out_without_peer() {
    let dispatcher = dispatcher();
    let store = dispatcher.store().clone();

    let started = Instant::now();
    let err = dispatcher
        .dispatch_with_timeout("navigate_to", json!({"url": "x"}), Duration::from_millis(1000))
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Timeout { waited_ms: 1000 }));
    assert!(started.elapsed() >= Duration::from_millis(1000));

    // Delete-on-timeout: the store no longer knows the id.
    assert!(store.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_late_report_after_timeout_has_no_effect() {
    let dispatcher = dispatcher();
    let store = dispatcher.store().clone();

    let err = dispatcher
        .dispatch_with_timeout("navigate_to", json!({}), Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Timeout { .. }));

    // The id was 1; a late report is silently dropped.
    let accepted = store
        .set_result(1, CommandOutcome::Completed(json!({"late": true})))
        .await;
    assert!(!accepted);
    assert!(store.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_surfaces_action_error_verbatim() {
    let dispatcher = dispatcher();
    let store = dispatcher.store().clone();

    tokio::spawn({
        let store = store.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let pending = store.list_pending().await;
            store
                .set_result(
                    pending[0].id,
                    CommandOutcome::Failed("Element not found: #missing".into()),
                )
                .await;
        }
    });

    let err = dispatcher
        .dispatch_with_timeout(
            "click_element",
            json!({"selector": "#missing"}),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

    match err {
        RelayError::Action(message) => assert_eq!(message, "Element not found: #missing"),
        other => panic!("expected Action error, got {other:?}"),
    }
    assert!(store.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_dispatches_are_independent() {
    let dispatcher = dispatcher();
    let store = dispatcher.store().clone();

    let first = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move {
            dispatcher
                .dispatch_with_timeout("get_text", json!({"n": 1}), Duration::from_secs(5))
                .await
        }
    });
    let second = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move {
            dispatcher
                .dispatch_with_timeout("get_text", json!({"n": 2}), Duration::from_secs(5))
                .await
        }
    });

    // Let both dispatches enqueue.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let pending = store.list_pending().await;
    assert_eq!(pending.len(), 2);

    // Complete them out of order, echoing each command's own params so the
    // correlation is observable.
    for command in pending.iter().rev() {
        store
            .set_result(command.id, CommandOutcome::Completed(command.params.clone()))
            .await;
    }

    assert_eq!(first.await.unwrap().unwrap(), json!({"n": 1}));
    assert_eq!(second.await.unwrap().unwrap(), json!({"n": 2}));
    assert!(store.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_default_timeout_applies() {
    let dispatcher = Dispatcher::new(Arc::new(CommandStore::new()), Duration::from_millis(200));

    let err = dispatcher
        .dispatch("screenshot", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Timeout { waited_ms: 200 }));
}
