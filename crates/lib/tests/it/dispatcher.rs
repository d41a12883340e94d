//! Tests for command scheduling and result output.

use std::sync::Arc;

use lightblocks::{
    Command, Dispatcher, OrderedMap,
    dispatcher::Dispatched,
    queue,
    sink::MemorySink,
};

use crate::helpers::*;

fn setup() -> (Dispatcher, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let dispatcher = Dispatcher::new(Arc::new(OrderedMap::new()), sink.clone());
    (dispatcher, sink)
}

fn add(key: &str, value: &str) -> Command {
    Command::AddItem {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[tokio::test]
async fn test_add_item_is_applied_synchronously() {
    let (dispatcher, sink) = setup();

    let dispatched = dispatcher.dispatch(add("one", "one_value"));

    assert!(matches!(dispatched, Dispatched::Applied));
    assert_eq!(dispatcher.map().get("one").as_deref(), Some("one_value"));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_reads_are_scheduled() {
    let (dispatcher, sink) = setup();
    dispatcher.dispatch(add("one", "one_value"));
    dispatcher.dispatch(add("two", "two_value"));

    let get = dispatcher.dispatch(Command::GetItem {
        key: "two".to_string(),
    });
    assert!(matches!(get, Dispatched::Scheduled(_)));
    get.wait().await;
    assert_eq!(sink.lines(), vec!["two_value"]);

    dispatcher.dispatch(Command::GetAllItems).wait().await;
    assert_eq!(sink.lines(), vec!["two_value", "one_value", "two_value"]);
}

#[tokio::test]
async fn test_get_missing_key_emits_empty_line() {
    let (dispatcher, sink) = setup();

    dispatcher
        .dispatch(Command::GetItem {
            key: "nope".to_string(),
        })
        .wait()
        .await;

    assert_eq!(sink.lines(), vec![String::new()]);
}

#[tokio::test]
async fn test_get_all_on_empty_map_emits_nothing() {
    let (dispatcher, sink) = setup();
    dispatcher.dispatch(Command::GetAllItems).wait().await;
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_delete_item_is_scheduled() {
    let (dispatcher, _sink) = setup();
    dispatcher.dispatch(add("one", "one_value"));
    dispatcher.dispatch(add("two", "two_value"));

    let delete = dispatcher.dispatch(Command::DeleteItem {
        key: "one".to_string(),
    });
    assert!(matches!(delete, Dispatched::Scheduled(_)));
    delete.wait().await;

    assert_eq!(dispatcher.map().values(), vec!["two_value"]);
}

#[tokio::test]
async fn test_inserts_follow_intake_order() {
    let (dispatcher, _sink) = setup();
    for i in 0..100 {
        dispatcher.dispatch(add(&format!("k{i}"), &i.to_string()));
    }
    let expected: Vec<String> = (0..100).map(|i| i.to_string()).collect();
    assert_eq!(dispatcher.map().values(), expected);
}

#[tokio::test]
async fn test_dispatch_raw_rejects_invalid_messages() {
    let (dispatcher, _sink) = setup();

    let err = dispatcher
        .dispatch_raw(&message("addItem", &["missing_value"]))
        .unwrap_err();
    assert!(err.is_command_error());
    assert!(err.is_validation_error());

    assert!(dispatcher.dispatch_raw(b"garbage").is_err());
    assert!(dispatcher.map().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_run_consumes_until_queue_closes() {
    let (dispatcher, sink) = setup();
    let (publisher, consumer) = queue::channel(16);

    for body in [
        message("addItem", &["one", "one_value"]),
        message("addItem", &["two", "two_value"]),
        message("addItem", &["three", "three_value"]),
        b"not json".to_vec(),
        message("getItem", &[]),
        message("getAllItems", &[]),
    ] {
        publisher.publish(body).await.unwrap();
    }
    drop(publisher);

    let summary = dispatcher.run(consumer, std::future::pending()).await;

    assert_eq!(summary.received, 6);
    assert_eq!(summary.rejected, 2);
    assert_eq!(summary.dispatched(), 4);

    // The read was scheduled after all inserts were applied
    let lines = wait_for_lines(&sink, 3).await;
    assert_eq!(lines, vec!["one_value", "two_value", "three_value"]);
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let (dispatcher, _sink) = setup();
    let (publisher, consumer) = queue::channel(4);
    publisher
        .publish(message("addItem", &["a", "1"]))
        .await
        .unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let runner = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            dispatcher
                .run(consumer, async {
                    let _ = shutdown_rx.await;
                })
                .await
        })
    };

    // Wait for the queued insert to be applied before shutting down
    while dispatcher.map().is_empty() {
        tokio::task::yield_now().await;
    }
    shutdown_tx.send(()).unwrap();
    let summary = runner.await.unwrap();

    assert_eq!(summary.received, 1);
    assert!(publisher.is_closed());
    assert_eq!(dispatcher.map().values(), vec!["1"]);
}
