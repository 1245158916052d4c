//! Query integration tests: request/reply round-trips, timeouts, and
//! temp-reference bookkeeping.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

// Layer 1: Standard library imports
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Layer 2: Third-party crate imports
use tokio::time::sleep;

// Layer 3: Internal module imports
use arbor_rt::prelude::*;

#[derive(Debug, Clone)]
struct Get(ReplyRef<i64>);

#[tokio::test]
async fn test_round_trip_resolves_with_handler_value() {
    let system = ActorSystem::new("test");
    let saved_reply = Arc::new(Mutex::new(None));

    let behavior = {
        let saved_reply = Arc::clone(&saved_reply);
        move |state: i64, message: Get, _ctx: Context| {
            let saved_reply = Arc::clone(&saved_reply);
            async move {
                saved_reply.lock().unwrap().replace(message.0.clone());
                message.0.resolve(state);
                Ok(state)
            }
        }
    };
    let actor = spawn(&system, behavior, Props::new().with_initial_state(5)).unwrap();

    let answer = actor.query(Get, Duration::from_millis(100)).await.unwrap();
    assert_eq!(answer, 5);

    // The temp reference was deregistered when the reply settled; resolving
    // again through a kept clone finds nothing.
    let reply = saved_reply.lock().unwrap().take().unwrap();
    assert!(!reply.resolve(9));
}

#[tokio::test]
async fn test_unanswered_query_times_out_with_the_timeout_value() {
    let system = ActorSystem::new("test");
    let saved_reply = Arc::new(Mutex::new(None));

    let behavior = {
        let saved_reply = Arc::clone(&saved_reply);
        move |state: i64, message: Get, _ctx: Context| {
            let saved_reply = Arc::clone(&saved_reply);
            async move {
                // Keep the reply but never resolve it.
                saved_reply.lock().unwrap().replace(message.0);
                Ok(state)
            }
        }
    };
    let actor = spawn(&system, behavior, Props::new().with_initial_state(0)).unwrap();

    let err = actor
        .query(Get, Duration::from_millis(10))
        .await
        .unwrap_err();
    assert!(matches!(err, ActorError::QueryTimeout { .. }));
    assert!(err.to_string().contains("10"));

    // Timing out deregistered the temp reference.
    sleep(Duration::from_millis(30)).await;
    let reply = saved_reply.lock().unwrap().take().unwrap();
    assert!(!reply.resolve(1));
}

#[tokio::test]
async fn test_timeout_does_not_cancel_in_flight_work() {
    let system = ActorSystem::new("test");
    let handled = Arc::new(AtomicUsize::new(0));
    let late_resolve = Arc::new(Mutex::new(None));

    let behavior = {
        let handled = Arc::clone(&handled);
        let late_resolve = Arc::clone(&late_resolve);
        move |state: i64, message: Get, _ctx: Context| {
            let handled = Arc::clone(&handled);
            let late_resolve = Arc::clone(&late_resolve);
            async move {
                sleep(Duration::from_millis(50)).await;
                handled.fetch_add(1, Ordering::SeqCst);
                late_resolve
                    .lock()
                    .unwrap()
                    .replace(message.0.resolve(state));
                Ok(state)
            }
        }
    };
    let actor = spawn(&system, behavior, Props::new().with_initial_state(3)).unwrap();

    let err = actor
        .query(Get, Duration::from_millis(10))
        .await
        .unwrap_err();
    assert!(matches!(err, ActorError::QueryTimeout { .. }));

    sleep(Duration::from_millis(100)).await;
    // The handler still ran to completion; its late reply found nothing.
    assert_eq!(handled.load(Ordering::SeqCst), 1);
    assert_eq!(*late_resolve.lock().unwrap(), Some(false));
    assert!(actor.is_live());
}

#[tokio::test]
async fn test_query_to_stopped_actor_fails() {
    let system = ActorSystem::new("test");
    let actor = spawn(
        &system,
        |state: i64, message: Get, _ctx: Context| async move {
            message.0.resolve(state);
            Ok(state)
        },
        Props::new().with_initial_state(0),
    )
    .unwrap();

    actor.stop().unwrap();
    let result = actor.query(Get, Duration::from_millis(50)).await;
    assert!(result.is_err());
    assert!(!result.unwrap_err().is_timeout());
}

#[tokio::test]
async fn test_sub_millisecond_timeout_clamps_to_zero() {
    let system = ActorSystem::new("test");
    let actor = spawn(
        &system,
        |state: i64, _message: Get, _ctx: Context| async move { Ok(state) },
        Props::new().with_initial_state(0),
    )
    .unwrap();

    // 500us truncates toward zero; the window elapses immediately.
    let err = actor
        .query(Get, Duration::from_micros(500))
        .await
        .unwrap_err();
    assert!(matches!(err, ActorError::QueryTimeout { .. }));
}

#[tokio::test]
async fn test_concurrent_queries_use_distinct_temp_references() {
    let system = ActorSystem::new("test");

    #[derive(Debug, Clone)]
    struct Next(ReplyRef<i64>);

    let actor = spawn(
        &system,
        |state: i64, message: Next, _ctx: Context| async move {
            let next = state + 1;
            message.0.resolve(next);
            Ok(next)
        },
        Props::new().with_initial_state(0),
    )
    .unwrap();

    let (a, b) = tokio::join!(
        actor.query(Next, Duration::from_millis(200)),
        actor.query(Next, Duration::from_millis(200)),
    );
    let answers: HashSet<i64> = [a.unwrap(), b.unwrap()].into_iter().collect();
    assert_eq!(answers, HashSet::from([1, 2]));
}

#[tokio::test]
async fn test_stateless_handler_answers_queries() {
    let system = ActorSystem::new("test");
    let actor = spawn_stateless(
        &system,
        |message: Get, _ctx: Context| async move {
            message.0.resolve(7);
            Ok(())
        },
        Props::new(),
    )
    .unwrap();

    let answer = actor.query(Get, Duration::from_millis(200)).await.unwrap();
    assert_eq!(answer, 7);
}

#[tokio::test]
async fn test_reply_is_first_resolution_wins() {
    let system = ActorSystem::new("test");
    let second_attempt = Arc::new(Mutex::new(None));

    let behavior = {
        let second_attempt = Arc::clone(&second_attempt);
        move |state: i64, message: Get, _ctx: Context| {
            let second_attempt = Arc::clone(&second_attempt);
            async move {
                assert!(message.0.resolve(1));
                second_attempt.lock().unwrap().replace(message.0.resolve(2));
                Ok(state)
            }
        }
    };
    let actor = spawn(&system, behavior, Props::new().with_initial_state(0)).unwrap();

    let answer = actor.query(Get, Duration::from_millis(200)).await.unwrap();
    assert_eq!(answer, 1);
    assert_eq!(*second_attempt.lock().unwrap(), Some(false));
}
