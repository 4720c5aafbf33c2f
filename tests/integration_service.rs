//! Timer-driven service tests on tokio's paused clock.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::sleep;

use microgrid_sim::service::SimulationService;
use microgrid_sim::sim::generator::InitialState;

fn service(seed: u64) -> SimulationService {
    SimulationService::new(common::default_engine(seed))
}

fn counter(service: &SimulationService) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let _sub = service.on_reading(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    count
}

#[tokio::test(start_paused = true)]
async fn ticks_once_per_interval() {
    let mut s = service(common::SEED);
    let count = counter(&s);

    s.start("mg", Duration::from_millis(1_000)).unwrap();
    assert!(s.is_running());
    sleep(Duration::from_millis(10_500)).await;

    assert_eq!(count.load(Ordering::SeqCst), 10);
    assert_eq!(s.ticks(), 10);
}

#[tokio::test(start_paused = true)]
async fn restart_keeps_a_single_timer() {
    let mut s = service(common::SEED);
    let count = counter(&s);

    s.start("mg", Duration::from_millis(1_000)).unwrap();
    sleep(Duration::from_millis(500)).await;
    s.start("mg", Duration::from_millis(1_000)).unwrap();
    sleep(Duration::from_millis(1_100)).await;

    // Only the restarted timer fired, at 1500 ms.
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_halts_delivery_and_is_idempotent() {
    let mut s = service(common::SEED);
    let count = counter(&s);

    s.start("mg", Duration::from_millis(100)).unwrap();
    sleep(Duration::from_millis(350)).await;
    s.stop();
    s.stop();
    tokio::task::yield_now().await;
    assert!(!s.is_running());

    let seen = count.load(Ordering::SeqCst);
    assert_eq!(seen, 3);
    sleep(Duration::from_millis(1_000)).await;
    assert_eq!(count.load(Ordering::SeqCst), seen);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_service_stops_the_timer() {
    let mut s = service(common::SEED);
    let count = counter(&s);

    s.start("mg", Duration::from_millis(100)).unwrap();
    sleep(Duration::from_millis(250)).await;
    drop(s);

    let seen = count.load(Ordering::SeqCst);
    sleep(Duration::from_millis(1_000)).await;
    assert_eq!(count.load(Ordering::SeqCst), seen);
}

#[tokio::test(start_paused = true)]
async fn alerts_follow_their_reading() {
    let mut s = SimulationService::new(common::engine_with(
        InitialState {
            battery_soc: 12.0,
            ..InitialState::default()
        },
        common::SEED,
    ));
    let log = Arc::new(Mutex::new(Vec::new()));

    let l = Arc::clone(&log);
    let _r = s.on_reading(move |r| l.lock().push(format!("reading:{}", r.id)));
    let l = Arc::clone(&log);
    let _a = s.on_alert(move |a| l.lock().push(format!("alert:{}", a.rule.as_str())));

    s.start("mg", Duration::from_millis(1_000)).unwrap();
    sleep(Duration::from_millis(1_500)).await;
    s.stop();

    let log = log.lock();
    assert!(log[0].starts_with("reading:"));
    assert!(log.iter().any(|e| e == "alert:battery_low"));
    assert!(log[1..].iter().all(|e| e.starts_with("alert:")));
}

#[tokio::test(start_paused = true)]
async fn advisories_are_available_while_running() {
    let mut s = service(common::SEED);
    let latest = Arc::new(Mutex::new(None));
    let l = Arc::clone(&latest);
    let _sub = s.on_reading(move |r| *l.lock() = Some(r.clone()));

    s.start("mg", Duration::from_millis(200)).unwrap();
    sleep(Duration::from_millis(250)).await;

    let reading = latest.lock().clone().unwrap();
    let predictions = s.generate_predictions("mg", &reading);
    let analytics = s.generate_daily_analytics("mg");
    s.stop();

    assert!(predictions.len() >= 2);
    assert!(predictions.iter().all(|p| p.created_at == reading.timestamp));
    assert!((88.0..96.0).contains(&analytics.efficiency_percent));
}

#[tokio::test(start_paused = true)]
async fn predictions_refresh_from_the_latest_reading() {
    let mut s = service(common::SEED);
    s.set_prediction_interval(Some(Duration::from_millis(2_300)));

    let latest = Arc::new(Mutex::new(None));
    let l = Arc::clone(&latest);
    let _r = s.on_reading(move |r| *l.lock() = Some(r.timestamp));

    let batches = Arc::new(Mutex::new(Vec::new()));
    let b = Arc::clone(&batches);
    let l = Arc::clone(&latest);
    let _p = s.on_predictions(move |batch| {
        let newest = l.lock().expect("a reading precedes every batch");
        b.lock().push((batch.len(), batch[0].created_at == newest));
    });

    s.start("mg", Duration::from_millis(1_000)).unwrap();
    sleep(Duration::from_millis(10_500)).await;
    s.stop();

    // Refreshes at 2.3 s, 4.6 s, 6.9 s and 9.2 s.
    let batches = batches.lock();
    assert_eq!(batches.len(), 4);
    assert!(batches.iter().all(|(len, _)| *len >= 2));
    assert!(batches.iter().all(|(_, from_latest)| *from_latest));
    assert_eq!(s.ticks(), 10);
}

#[tokio::test(start_paused = true)]
async fn no_predictions_before_the_first_reading() {
    let mut s = service(common::SEED);
    s.set_prediction_interval(Some(Duration::from_millis(700)));
    let batches = Arc::new(AtomicUsize::new(0));
    let b = Arc::clone(&batches);
    let _p = s.on_predictions(move |_| {
        b.fetch_add(1, Ordering::SeqCst);
    });

    s.start("mg", Duration::from_millis(2_000)).unwrap();
    sleep(Duration::from_millis(1_600)).await;
    assert_eq!(batches.load(Ordering::SeqCst), 0);

    // Reading at 2.0 s, then refreshes at 2.1 s and 2.8 s.
    sleep(Duration::from_millis(1_600)).await;
    s.stop();
    assert_eq!(batches.load(Ordering::SeqCst), 2);
}
