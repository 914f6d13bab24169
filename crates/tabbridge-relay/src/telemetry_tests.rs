use super::*;
use serde_json::json;

fn store_with_capacities(network: usize, console: usize, performance: usize) -> TelemetryStore {
    TelemetryStore::new(&RelayConfig {
        network_buffer_capacity: network,
        console_buffer_capacity: console,
        performance_buffer_capacity: performance,
        ..Default::default()
    })
}

#[tokio::test]
async fn test_push_and_query() {
    let store = store_with_capacities(10, 10, 10);
    store
        .push(
            TelemetryKind::Console,
            Some("tab-1".into()),
            json!({"level": "error", "message": "boom"}),
        )
        .await;

    let records = store
        .query(TelemetryKind::Console, &TelemetryQuery::default())
        .await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tab_id.as_deref(), Some("tab-1"));
    assert_eq!(records[0].data["message"], "boom");

    // Other categories untouched.
    assert_eq!(store.len(TelemetryKind::Network).await, 0);
    assert_eq!(store.len(TelemetryKind::Performance).await, 0);
}

#[tokio::test]
async fn test_capacity_evicts_oldest_first() {
    let store = store_with_capacities(5000, 10, 10);
    for i in 0..5001u32 {
        store
            .push(TelemetryKind::Network, None, json!({"seq": i}))
            .await;
    }

    assert_eq!(store.len(TelemetryKind::Network).await, 5000);

    let records = store
        .query(TelemetryKind::Network, &TelemetryQuery::default())
        .await;
    // Entry 0 was evicted; arrival order preserved.
    assert_eq!(records.first().unwrap().data["seq"], 1);
    assert_eq!(records.last().unwrap().data["seq"], 5000);
}

#[tokio::test]
async fn test_filter_by_tab() {
    let store = store_with_capacities(10, 10, 10);
    store
        .push(TelemetryKind::Network, Some("tab-1".into()), json!({"url": "a"}))
        .await;
    store
        .push(TelemetryKind::Network, Some("tab-2".into()), json!({"url": "b"}))
        .await;
    store
        .push(TelemetryKind::Network, None, json!({"url": "c"}))
        .await;

    let query = TelemetryQuery {
        tab_id: Some("tab-2".into()),
        ..Default::default()
    };
    let records = store.query(TelemetryKind::Network, &query).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].data["url"], "b");
}

#[tokio::test]
async fn test_filter_by_substring() {
    let store = store_with_capacities(10, 10, 10);
    store
        .push(
            TelemetryKind::Console,
            None,
            json!({"message": "TypeError: x is undefined"}),
        )
        .await;
    store
        .push(TelemetryKind::Console, None, json!({"message": "all good"}))
        .await;

    let query = TelemetryQuery {
        contains: Some("TypeError".into()),
        ..Default::default()
    };
    let records = store.query(TelemetryKind::Console, &query).await;
    assert_eq!(records.len(), 1);
    assert!(records[0].data["message"].as_str().unwrap().contains("TypeError"));
}

#[tokio::test]
async fn test_limit_takes_most_recent() {
    let store = store_with_capacities(10, 10, 10);
    for i in 0..8u32 {
        store
            .push(TelemetryKind::Performance, None, json!({"seq": i}))
            .await;
    }

    let query = TelemetryQuery {
        limit: Some(3),
        ..Default::default()
    };
    let records = store.query(TelemetryKind::Performance, &query).await;
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].data["seq"], 5);
    assert_eq!(records[2].data["seq"], 7);
}

#[tokio::test]
async fn test_limit_larger_than_matches() {
    let store = store_with_capacities(10, 10, 10);
    store
        .push(TelemetryKind::Network, None, json!({"url": "a"}))
        .await;

    let query = TelemetryQuery {
        limit: Some(50),
        ..Default::default()
    };
    let records = store.query(TelemetryKind::Network, &query).await;
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_last_update_tracks_pushes() {
    let store = store_with_capacities(10, 10, 10);
    assert!(store.last_update().await.is_none());

    store
        .push(TelemetryKind::Console, None, json!({"m": 1}))
        .await;
    assert!(store.last_update().await.is_some());
}

#[test]
fn test_kind_parsing() {
    assert_eq!("network".parse::<TelemetryKind>().unwrap(), TelemetryKind::Network);
    assert_eq!("console".parse::<TelemetryKind>().unwrap(), TelemetryKind::Console);
    assert_eq!(
        "performance".parse::<TelemetryKind>().unwrap(),
        TelemetryKind::Performance
    );
    assert!("screenshot".parse::<TelemetryKind>().is_err());
}
