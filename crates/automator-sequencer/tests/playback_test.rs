//! Playback behaviour of the sequencer: ordering, iterations, delays,
//! cancellation and deferred handler results.
//!
//! Time-dependent tests run on a paused Tokio clock, so the recorded
//! timestamps are exact.

use automator_input::KeyEventBus;
use automator_sequencer::{
    do_number, Action, Context, Deferred, HandlerResult, IterationCallback, Phase, Resolver,
    RunConfig, Sequencer, SequencerError, Settlement,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

type Log = Arc<Mutex<Vec<(String, Duration)>>>;

/// Config whose string and number handlers record what ran and when
fn recording_config(log: &Log, start: Instant) -> RunConfig {
    let strings = log.clone();
    let numbers = log.clone();
    RunConfig::new()
        .with_string_handler(move |command, _| {
            strings
                .lock()
                .unwrap()
                .push((command.to_string(), start.elapsed()));
            HandlerResult::none()
        })
        .with_number_handler(move |duration| {
            numbers
                .lock()
                .unwrap()
                .push((format!("{}ms", duration.as_millis()), start.elapsed()));
            do_number(duration)
        })
}

fn recorded(log: &Log) -> Vec<String> {
    log.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
}

fn recorded_at(log: &Log, name: &str) -> Vec<Duration> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(n, _)| n == name)
        .map(|(_, t)| *t)
        .collect()
}

fn logging_callback(log: &Log, name: &str, start: Instant) -> Action {
    let log = log.clone();
    let name = name.to_string();
    Action::callback(move || {
        log.lock().unwrap().push((name.clone(), start.elapsed()));
    })
}

#[tokio::test(start_paused = true)]
async fn test_actions_run_once_each_in_order() {
    let log: Log = Default::default();
    let start = Instant::now();
    let sequencer = Sequencer::new(recording_config(&log, start));

    let done = sequencer.run(
        vec![
            Action::delay_ms(10),
            Action::from("a"),
            logging_callback(&log, "fn", start),
        ],
        2,
        None,
    );

    assert_eq!(done.await, Value::Null);
    assert_eq!(
        recorded(&log),
        vec!["10ms", "a", "fn", "10ms", "a", "fn"]
    );
    assert_eq!(sequencer.phase(), Phase::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_iteration_callback_indices_and_final_value() {
    let indices = Arc::new(Mutex::new(Vec::new()));
    let seen = indices.clone();
    let sequencer = Sequencer::new(RunConfig::new().with_string_handler(|_, _| ().into()));

    let done = sequencer.run(
        vec![Action::from("a")],
        3,
        Some(IterationCallback::new(move |i| {
            seen.lock().unwrap().push(i);
            json!(format!("done {}", i))
        })),
    );

    assert_eq!(done.await, json!("done 2"));
    assert_eq!(*indices.lock().unwrap(), vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_no_step_delay_around_numeric_actions() {
    let log: Log = Default::default();
    let start = Instant::now();
    let config = recording_config(&log, start).with_step_delay(Duration::from_millis(100));
    let sequencer = Sequencer::new(config);

    sequencer
        .run_once(vec![Action::from("a"), Action::delay_ms(5), Action::from("b")])
        .await;

    assert_eq!(recorded_at(&log, "a"), vec![Duration::ZERO]);
    assert_eq!(recorded_at(&log, "5ms"), vec![Duration::ZERO]);
    assert_eq!(recorded_at(&log, "b"), vec![Duration::from_millis(5)]);
}

#[tokio::test(start_paused = true)]
async fn test_step_delay_between_plain_actions_but_not_after_last() {
    let log: Log = Default::default();
    let start = Instant::now();
    let config = recording_config(&log, start).with_step_delay(Duration::from_millis(100));
    let sequencer = Sequencer::new(config);

    sequencer
        .run(vec![Action::from("a"), Action::from("b")], 2, None)
        .await;

    assert_eq!(
        recorded_at(&log, "a"),
        vec![Duration::ZERO, Duration::from_millis(100)]
    );
    assert_eq!(
        recorded_at(&log, "b"),
        vec![Duration::from_millis(100), Duration::from_millis(200)]
    );
    assert_eq!(start.elapsed(), Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_iteration_delay_between_passes() {
    let log: Log = Default::default();
    let start = Instant::now();
    let config = recording_config(&log, start).with_iteration_delay(Duration::from_millis(300));
    let sequencer = Sequencer::new(config);

    sequencer.run(vec![Action::from("a")], 3, None).await;

    assert_eq!(
        recorded_at(&log, "a"),
        vec![
            Duration::ZERO,
            Duration::from_millis(300),
            Duration::from_millis(600)
        ]
    );
    // No iteration delay after the last pass
    assert_eq!(start.elapsed(), Duration::from_millis(600));
}

#[tokio::test(start_paused = true)]
async fn test_kill_before_third_action() {
    let log: Log = Default::default();
    let start = Instant::now();
    let sequencer = Arc::new(Sequencer::new(
        RunConfig::new().with_step_delay(Duration::from_millis(10)),
    ));

    let killer = sequencer.clone();
    let kill_log = log.clone();
    let actions = vec![
        logging_callback(&log, "0", start),
        Action::callback(move || {
            kill_log
                .lock()
                .unwrap()
                .push(("1".to_string(), start.elapsed()));
            killer.kill();
        }),
        logging_callback(&log, "2", start),
        logging_callback(&log, "3", start),
        logging_callback(&log, "4", start),
    ];

    let done = sequencer.run_once(actions);
    let outcome = tokio::time::timeout(Duration::from_secs(60), done).await;

    assert!(outcome.is_err(), "completion of a killed run must not settle");
    assert_eq!(recorded(&log), vec!["0", "1"]);
    assert_eq!(sequencer.phase(), Phase::Killed);
}

#[tokio::test(start_paused = true)]
async fn test_kill_during_step_delay() {
    let log: Log = Default::default();
    let start = Instant::now();
    let config = recording_config(&log, start).with_step_delay(Duration::from_millis(100));
    let sequencer = Sequencer::new(config);

    let done = sequencer.run_once(vec![
        Action::from("a"),
        Action::from("b"),
        Action::from("c"),
    ]);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(sequencer.phase(), Phase::Delaying);
    sequencer.kill();

    assert!(tokio::time::timeout(Duration::from_secs(10), done)
        .await
        .is_err());
    assert_eq!(recorded(&log), vec!["a", "b"]);
    assert_eq!(sequencer.phase(), Phase::Killed);
}

#[tokio::test(start_paused = true)]
async fn test_pending_result_gates_next_action() {
    let log: Log = Default::default();
    let start = Instant::now();
    let slot: Arc<Mutex<Option<Resolver>>> = Default::default();
    let sequencer = Sequencer::new(recording_config(&log, start));

    let handoff = slot.clone();
    let done = sequencer.run_once(vec![
        Action::callback(move || {
            let (resolver, deferred) = Deferred::channel();
            *handoff.lock().unwrap() = Some(resolver);
            deferred
        }),
        Action::from("b"),
    ]);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(recorded(&log).is_empty());
    assert_eq!(sequencer.phase(), Phase::AwaitingAsync);

    // A failure continues the sequence exactly like a success
    let resolver = slot.lock().unwrap().take().unwrap();
    resolver.reject(json!("handler failed"));

    done.await;
    assert_eq!(recorded_at(&log, "b"), vec![Duration::from_secs(5)]);
}

#[tokio::test(start_paused = true)]
async fn test_deferred_final_result_settles_completion() {
    let sequencer = Sequencer::default();
    let start = Instant::now();

    let done = sequencer.run(
        vec![Action::Skip],
        1,
        Some(IterationCallback::new(|_| {
            Deferred::new(async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Settlement::Resolved(json!("late"))
            })
        })),
    );

    assert_eq!(done.await, json!("late"));
    assert_eq!(start.elapsed(), Duration::from_millis(50));
}

#[tokio::test]
async fn test_rejected_final_result_still_settles() {
    let sequencer = Sequencer::default();

    let done = sequencer.run(
        Vec::new(),
        1,
        Some(IterationCallback::new(|_| Deferred::rejected(json!("nope")))),
    );

    assert_eq!(
        done.into_deferred().await,
        Settlement::Resolved(json!("nope"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_pending_iteration_result_delays_next_pass() {
    let log: Log = Default::default();
    let start = Instant::now();
    let config = recording_config(&log, start).with_iteration_delay(Duration::from_millis(10));
    let sequencer = Sequencer::new(config);

    let done = sequencer.run(
        vec![Action::from("a")],
        3,
        Some(IterationCallback::new(|i| {
            Deferred::new(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                // A failed candidate still lets the next pass start
                if i == 0 {
                    Settlement::Rejected(json!("first pass failed"))
                } else {
                    Settlement::Resolved(json!(i))
                }
            })
        })),
    );

    assert_eq!(done.await, json!(2));
    assert_eq!(
        recorded_at(&log, "a"),
        vec![
            Duration::ZERO,
            Duration::from_millis(110),
            Duration::from_millis(220)
        ]
    );
    assert_eq!(start.elapsed(), Duration::from_millis(320));
}

#[tokio::test]
async fn test_completion_uses_configured_deferred() {
    let calls = Arc::new(Mutex::new(0));
    let settled = Arc::new(Mutex::new(Vec::new()));
    let (counter, seen) = (calls.clone(), settled.clone());
    let config = RunConfig::new().with_deferred(move || {
        *counter.lock().unwrap() += 1;
        let (inner, deferred) = Deferred::channel();
        let seen = seen.clone();
        let resolver = Resolver::new(move |settlement: Settlement| {
            seen.lock().unwrap().push(settlement.clone());
            inner.settle(settlement);
        });
        let tagged = deferred.then(|settlement| {
            Settlement::Resolved(json!({ "via": "factory", "value": settlement.into_value() }))
        });
        (resolver, tagged)
    });
    let sequencer = Sequencer::new(config);

    let first = sequencer.run(
        Vec::new(),
        1,
        Some(IterationCallback::new(|_| json!("one"))),
    );
    assert_eq!(first.await, json!({ "via": "factory", "value": "one" }));
    assert_eq!(*calls.lock().unwrap(), 1);

    let second = sequencer.run(
        Vec::new(),
        2,
        Some(IterationCallback::new(|i| json!(i))),
    );
    assert_eq!(second.await, json!({ "via": "factory", "value": 1 }));
    assert_eq!(*calls.lock().unwrap(), 2);
    assert_eq!(
        *settled.lock().unwrap(),
        vec![
            Settlement::Resolved(json!("one")),
            Settlement::Resolved(json!(1))
        ]
    );
}

#[tokio::test]
async fn test_unsupported_value_fails_before_running() {
    let sequencer = Sequencer::default();

    let result = sequencer.run_values(vec![json!("a"), json!(true)], 1, None);

    assert!(matches!(result, Err(SequencerError::UnsupportedAction(_))));
    assert_eq!(sequencer.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_raw_values_with_skips_and_objects() {
    let log: Log = Default::default();
    let start = Instant::now();
    let objects = Arc::new(Mutex::new(0));
    let counted = objects.clone();
    let config = recording_config(&log, start).with_object_handler(move |_| {
        *counted.lock().unwrap() += 1;
        HandlerResult::none()
    });
    let sequencer = Sequencer::new(config);

    let done = sequencer
        .run_values(
            vec![
                Value::Null,
                json!("up x2"),
                json!({"reserved": 1}),
                Value::Null,
                json!(20),
            ],
            1,
            None,
        )
        .unwrap();
    done.await;

    assert_eq!(recorded(&log), vec!["up", "up", "20ms"]);
    assert_eq!(*objects.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_new_run_supersedes_previous() {
    let log: Log = Default::default();
    let start = Instant::now();
    let sequencer = Sequencer::new(recording_config(&log, start));

    let first = sequencer.run_once(vec![
        Action::from("a"),
        Action::delay_ms(1000),
        Action::from("b"),
    ]);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let second = sequencer.run_once(vec![Action::from("c")]);
    assert_ne!(first.context(), second.context());
    second.await;

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(recorded(&log), vec!["a", "1000ms", "c"]);
    assert!(tokio::time::timeout(Duration::from_secs(1), first)
        .await
        .is_err());
}

#[tokio::test]
async fn test_default_string_handler_presses_keys() {
    let bus = Arc::new(KeyEventBus::new());
    let mut keys = bus.subscribe_all();
    let sequencer = Sequencer::new(RunConfig::new().with_injector(bus.clone()));

    let done = sequencer.run_once(vec![
        Action::from("right x2"),
        Action::from("jump"),
        Action::from("enter"),
    ]);
    let run: Context = done.context().clone();
    done.await;

    let mut codes = Vec::new();
    while let Ok(event) = keys.try_recv() {
        assert_eq!(event.context, run);
        codes.push(event.key_code);
    }
    assert_eq!(codes, vec![39, 39, 13]);
    assert_eq!(bus.dispatched_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_debug_does_not_change_playback() {
    let log: Log = Default::default();
    let start = Instant::now();
    let sequencer = Sequencer::new(recording_config(&log, start).with_debug(true));

    sequencer
        .run(vec![Action::from("a"), Action::Skip, Action::from("b")], 2, None)
        .await;

    assert_eq!(recorded(&log), vec!["a", "b", "a", "b"]);
}
