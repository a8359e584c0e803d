//! End-to-end command round trips over a local group.
//!
//! Each test drives full sessions (dispatch, option parsing,
//! marshalling, backend) across OS threads, one session per rank.

use commlink_engine::Session;
use commlink_backend::LocalGroup;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

fn sessions(ranks: usize) -> Vec<Session> {
    LocalGroup::connect(ranks)
        .into_iter()
        .map(Session::new)
        .collect()
}

#[test]
fn scalar_round_trip_integer() {
    let mut group = sessions(2);
    let mut receiver = group.pop().unwrap();
    let mut sender = group.pop().unwrap();

    let recv_side = thread::spawn(move || {
        receiver.dispatch("init", &[]).unwrap();
        let value = receiver
            .dispatch("recv", &[json!("-type"), json!("integer"), json!(0)])
            .unwrap();
        receiver.dispatch("finalize", &[]).unwrap();
        value
    });

    sender.dispatch("init", &[]).unwrap();
    let ack = sender
        .dispatch(
            "send",
            &[json!("-type"), json!("integer"), json!(-17), json!(1)],
        )
        .unwrap();
    assert_eq!(ack, json!(1));
    sender.dispatch("finalize", &[]).unwrap();

    assert_eq!(recv_side.join().unwrap(), json!(-17));
}

#[test]
fn scalar_round_trip_double() {
    let mut group = sessions(2);
    let mut receiver = group.pop().unwrap();
    let mut sender = group.pop().unwrap();

    let recv_side = thread::spawn(move || {
        receiver.dispatch("init", &[]).unwrap();
        receiver
            .dispatch("recv", &[json!("-type"), json!("double"), json!(0)])
            .unwrap()
    });

    sender.dispatch("init", &[]).unwrap();
    sender
        .dispatch(
            "send",
            &[json!("-type"), json!("double"), json!(3.25), json!(1)],
        )
        .unwrap();

    assert_eq!(recv_side.join().unwrap(), json!(3.25));
}

#[test]
fn list_round_trip_preserves_order() {
    let payload = json!([5, 3, 8, 1]);
    let mut group = sessions(2);
    let mut receiver = group.pop().unwrap();
    let mut sender = group.pop().unwrap();

    let expected = payload.clone();
    let recv_side = thread::spawn(move || {
        receiver.dispatch("init", &[]).unwrap();
        let value = receiver
            .dispatch(
                "recv",
                &[
                    json!("-type"),
                    json!("integer"),
                    json!("-length"),
                    json!(4),
                    json!(0),
                ],
            )
            .unwrap();
        assert_eq!(value, expected);
    });

    sender.dispatch("init", &[]).unwrap();
    sender
        .dispatch(
            "send",
            &[
                json!("-type"),
                json!("integer"),
                json!("-list"),
                payload,
                json!(1),
            ],
        )
        .unwrap();

    recv_side.join().unwrap();
}

#[test]
fn length_one_receive_is_a_list_not_a_scalar() {
    let mut group = sessions(2);
    let mut receiver = group.pop().unwrap();
    let mut sender = group.pop().unwrap();

    let recv_side = thread::spawn(move || {
        receiver.dispatch("init", &[]).unwrap();
        receiver
            .dispatch(
                "recv",
                &[
                    json!("-type"),
                    json!("integer"),
                    json!("-length"),
                    json!(1),
                    json!(0),
                ],
            )
            .unwrap()
    });

    sender.dispatch("init", &[]).unwrap();
    sender
        .dispatch(
            "send",
            &[
                json!("-type"),
                json!("integer"),
                json!("-list"),
                json!([42]),
                json!(1),
            ],
        )
        .unwrap();

    // One element was transmitted, but the receiver asked for a list.
    assert_eq!(recv_side.join().unwrap(), json!([42]));
}

#[test]
fn barrier_holds_every_rank_until_the_last_arrival() {
    const RANKS: usize = 3;
    let arrivals = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for mut session in sessions(RANKS) {
        let arrivals = Arc::clone(&arrivals);
        handles.push(thread::spawn(move || {
            session.dispatch("init", &[]).unwrap();
            arrivals.fetch_add(1, Ordering::SeqCst);
            assert_eq!(session.dispatch("barrier", &[]).unwrap(), json!(1));
            assert_eq!(arrivals.load(Ordering::SeqCst), RANKS);
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn every_rank_sees_its_own_rank_and_the_group_size() {
    const RANKS: usize = 4;
    let mut handles = Vec::new();
    for (rank, mut session) in sessions(RANKS).into_iter().enumerate() {
        handles.push(thread::spawn(move || {
            session.dispatch("init", &[]).unwrap();
            assert_eq!(session.dispatch("rank", &[]).unwrap(), json!(rank));
            assert_eq!(session.dispatch("size", &[]).unwrap(), json!(RANKS));
            session.dispatch("finalize", &[]).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn mixed_type_traffic_between_the_same_pair() {
    let mut group = sessions(2);
    let mut receiver = group.pop().unwrap();
    let mut sender = group.pop().unwrap();

    let recv_side = thread::spawn(move || {
        receiver.dispatch("init", &[]).unwrap();
        let ints = receiver
            .dispatch(
                "recv",
                &[
                    json!("-type"),
                    json!("integer"),
                    json!("-length"),
                    json!(2),
                    json!(0),
                ],
            )
            .unwrap();
        let float: Value = receiver
            .dispatch("recv", &[json!("-type"), json!("double"), json!(0)])
            .unwrap();
        (ints, float)
    });

    sender.dispatch("init", &[]).unwrap();
    sender
        .dispatch(
            "send",
            &[
                json!("-type"),
                json!("integer"),
                json!("-list"),
                json!([10, 20]),
                json!(1),
            ],
        )
        .unwrap();
    sender
        .dispatch(
            "send",
            &[json!("-type"), json!("double"), json!(0.125), json!(1)],
        )
        .unwrap();

    let (ints, float) = recv_side.join().unwrap();
    assert_eq!(ints, json!([10, 20]));
    assert_eq!(float, json!(0.125));
}

#[test]
fn send_to_missing_rank_is_a_backend_error() {
    let mut group = sessions(1);
    let mut session = group.pop().unwrap();
    session.dispatch("init", &[]).unwrap();
    let err = session
        .dispatch(
            "send",
            &[json!("-type"), json!("integer"), json!(1), json!(6)],
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "send failed: no such rank 6");
}
