//! Lifecycle tests for the server group coordinator.

use std::sync::Arc;
use std::time::Duration;

use server_group::{Deadline, GroupError, ServerGroup, Status};

mod common;

use common::ScriptedServer;

fn server_error_text(result: Result<(), GroupError>) -> String {
    match result {
        Err(GroupError::Server(err)) => err.to_string(),
        other => panic!("expected a server error, got {other:?}"),
    }
}

#[tokio::test]
async fn group_stops_cleanly_when_told_to() {
    common::init_tracing();

    let a = Arc::new(ScriptedServer::blocking("a"));
    let b = Arc::new(ScriptedServer::blocking("b"));
    let group = ServerGroup::builder()
        .server(a.clone())
        .server(b.clone())
        .build();

    let runner = {
        let group = group.clone();
        tokio::spawn(async move { group.start().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(group.status(), Status::Started);

    group.shutdown(Deadline::background()).await.unwrap();

    let result = runner.await.unwrap();
    assert!(result.is_ok(), "clean stops must aggregate to ok: {result:?}");
    assert_eq!(group.status(), Status::Stopped);
    assert!(a.stop_invoked());
    assert!(b.stop_invoked());
}

#[tokio::test]
async fn first_server_error_wins_regardless_of_delay() {
    for round in 0..5u64 {
        let delay = Duration::from_millis(5 * round);
        let failing = Arc::new(ScriptedServer::failing_after("failing", delay, "boom"));
        let waiting = Arc::new(ScriptedServer::blocking("waiting"));
        let group = ServerGroup::builder()
            .server(failing.clone())
            .server(waiting.clone())
            .shutdown_timeout(Duration::from_millis(500))
            .build();

        let result = group.start().await;
        assert_eq!(
            server_error_text(result),
            "boom",
            "round with delay {delay:?}"
        );
        assert!(waiting.stop_invoked(), "peer must be cascaded down");
    }
}

#[tokio::test]
async fn second_start_is_rejected_while_running() {
    let server = Arc::new(ScriptedServer::blocking("only"));
    let group = ServerGroup::builder().server(server.clone()).build();

    let runner = {
        let group = group.clone();
        tokio::spawn(async move { group.start().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let second = group.start().await;
    assert!(matches!(second, Err(GroupError::AlreadyStarted)));
    assert_eq!(server.serve_calls(), 1, "rejected start must not touch servers");

    group.shutdown(Deadline::background()).await.unwrap();
    runner.await.unwrap().unwrap();
}

#[tokio::test]
async fn concurrent_starts_take_exactly_one_transition() {
    let server = Arc::new(ScriptedServer::blocking("only"));
    let group = ServerGroup::builder().server(server.clone()).build();

    let first = {
        let group = group.clone();
        tokio::spawn(async move { group.start().await })
    };
    let second = {
        let group = group.clone();
        tokio::spawn(async move { group.start().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.serve_calls(), 1);

    group.shutdown(Deadline::background()).await.unwrap();

    let outcomes = [first.await.unwrap(), second.await.unwrap()];
    let rejected = outcomes
        .iter()
        .filter(|r| matches!(r, Err(GroupError::AlreadyStarted)))
        .count();
    let accepted = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!((accepted, rejected), (1, 1), "got {outcomes:?}");
}

#[tokio::test]
async fn shutdown_before_start_is_rejected() {
    let server = Arc::new(ScriptedServer::blocking("only"));
    let group = ServerGroup::builder().server(server.clone()).build();

    let result = group.shutdown(Deadline::background()).await;
    assert!(matches!(result, Err(GroupError::AlreadyStopping)));
    assert!(!server.stop_invoked(), "rejected shutdown must not touch servers");
    assert_eq!(group.status(), Status::Stopped);
}

#[tokio::test]
async fn one_failure_cascades_to_the_peers() {
    let failing = Arc::new(ScriptedServer::failing("failing", "boom"));
    let waiting = Arc::new(ScriptedServer::blocking("waiting"));
    let group = ServerGroup::builder()
        .server(failing.clone())
        .server(waiting.clone())
        .shutdown_timeout(Duration::from_millis(500))
        .build();

    // Returns only once the cascade has unblocked the waiting peer.
    let result = group.start().await;
    assert_eq!(server_error_text(result), "boom");
    assert!(waiting.stop_invoked());
}

#[tokio::test]
async fn cancellation_signal_stops_the_group() {
    let server = Arc::new(ScriptedServer::closing_with("only", "server closed"));
    let group = ServerGroup::builder().server(server.clone()).build();

    let result = group
        .start_with_shutdown(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
        })
        .await;

    assert_eq!(server_error_text(result), "server closed");
    assert!(server.stop_invoked());
}

#[tokio::test]
async fn start_with_shutdown_is_rejected_while_running() {
    let server = Arc::new(ScriptedServer::blocking("only"));
    let group = ServerGroup::builder().server(server.clone()).build();

    let runner = {
        let group = group.clone();
        tokio::spawn(async move { group.start().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let second = group.start_with_shutdown(std::future::pending()).await;
    assert!(matches!(second, Err(GroupError::AlreadyStarted)));
    assert_eq!(server.serve_calls(), 1);

    group.shutdown(Deadline::background()).await.unwrap();
    runner.await.unwrap().unwrap();
}

#[tokio::test]
async fn group_is_reusable_after_a_full_cycle() {
    let server = Arc::new(ScriptedServer::blocking("only"));
    let group = ServerGroup::builder().server(server.clone()).build();

    for cycle in 1..=2 {
        let runner = {
            let group = group.clone();
            tokio::spawn(async move { group.start().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        group.shutdown(Deadline::background()).await.unwrap();
        runner.await.unwrap().unwrap();
        assert_eq!(group.status(), Status::Stopped);
        assert_eq!(server.serve_calls(), cycle);
    }
}
