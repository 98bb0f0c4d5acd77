use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn counting_callback(hits: &Arc<AtomicUsize>) -> impl FnOnce(Generation) + Send + 'static {
    let hits = Arc::clone(hits);
    move |_| {
        hits.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// schedule / elapse
// =============================================================================

#[tokio::test(start_paused = true)]
async fn fires_once_after_delay() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut timer = TypingTimer::new("test", Handle::current());
    timer.schedule(ms(1000), counting_callback(&hits));
    assert!(timer.is_armed());

    tokio::time::sleep(ms(999)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    tokio::time::sleep(ms(2)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!timer.is_armed());

    tokio::time::sleep(ms(5000)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_delay_fires_on_next_tick() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut timer = TypingTimer::new("test", Handle::current());
    timer.schedule(Duration::ZERO, counting_callback(&hits));

    tokio::time::sleep(ms(1)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// =============================================================================
// cancel
// =============================================================================

#[tokio::test(start_paused = true)]
async fn cancel_before_elapse_prevents_fire() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut timer = TypingTimer::new("test", Handle::current());
    timer.schedule(ms(100), counting_callback(&hits));

    tokio::time::sleep(ms(50)).await;
    assert!(timer.cancel());
    assert!(!timer.is_armed());

    tokio::time::sleep(ms(500)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_is_idempotent() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut timer = TypingTimer::new("test", Handle::current());
    assert!(!timer.cancel(), "idle timer has nothing to cancel");

    timer.schedule(ms(10), counting_callback(&hits));
    assert!(timer.cancel());
    assert!(!timer.cancel());
}

#[tokio::test(start_paused = true)]
async fn cancel_after_fire_is_noop() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut timer = TypingTimer::new("test", Handle::current());
    timer.schedule(ms(10), counting_callback(&hits));

    tokio::time::sleep(ms(20)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!timer.cancel());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn drop_cancels_pending_callback() {
    let hits = Arc::new(AtomicUsize::new(0));
    {
        let mut timer = TypingTimer::new("test", Handle::current());
        timer.schedule(ms(100), counting_callback(&hits));
    }

    tokio::time::sleep(ms(500)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

// =============================================================================
// replacement / generations
// =============================================================================

#[tokio::test(start_paused = true)]
async fn rescheduling_replaces_predecessor() {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let mut timer = TypingTimer::new("test", Handle::current());

    let first = {
        let fired = Arc::clone(&fired);
        timer.schedule(ms(100), move |g| fired.lock().unwrap().push(g))
    };
    tokio::time::sleep(ms(60)).await;
    let second = {
        let fired = Arc::clone(&fired);
        timer.schedule(ms(100), move |g| fired.lock().unwrap().push(g))
    };
    assert_ne!(first, second);

    // First would have fired at 100ms; the second fires at 160ms.
    tokio::time::sleep(ms(60)).await;
    assert!(fired.lock().unwrap().is_empty());

    tokio::time::sleep(ms(50)).await;
    assert_eq!(*fired.lock().unwrap(), vec![second]);
}

#[tokio::test(start_paused = true)]
async fn claim_rejects_stale_generation() {
    let mut timer = TypingTimer::new("test", Handle::current());
    let first = timer.arm(|_| std::future::pending::<()>());
    let second = timer.arm(|_| std::future::pending::<()>());

    assert!(!timer.is_current(first));
    assert!(timer.is_current(second));
    assert!(!timer.claim(first));
    assert!(timer.claim(second));
    assert!(!timer.claim(second), "a generation can only be claimed once");
    assert!(!timer.is_current(second));
}

#[tokio::test(start_paused = true)]
async fn claim_fails_after_cancel() {
    let mut timer = TypingTimer::new("test", Handle::current());
    let generation = timer.arm(|_| std::future::pending::<()>());
    timer.cancel();
    assert!(!timer.claim(generation));
}
