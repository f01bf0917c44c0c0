//! Shared 1 Hz wall-clock tick.
//!
//! Both engines evaluate against time once per second. Running them off a
//! single broadcast tick keeps reminder-checking and elapsed-time accrual
//! from drifting against each other the way N independent interval timers
//! would. Each subscriber sees each tick at most once.

use chrono::{Local, NaiveDateTime};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

/// Broadcast channel depth. Subscribers that fall further behind than this
/// observe a lag and resume with the most recent ticks.
const TICK_CHANNEL_CAPACITY: usize = 8;

/// One wall-clock tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Local wall-clock time the tick was produced at.
    pub at: NaiveDateTime,
}

/// A shared 1 Hz tick source.
///
/// The ticking task runs for the lifetime of the `Clock`; `shutdown` (or
/// drop) cancels it, so no exit path leaves the timer running.
pub struct Clock {
    tick_tx: broadcast::Sender<Tick>,
    ticker: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl Clock {
    /// Creates a clock without starting it.
    #[must_use]
    pub fn new() -> Self {
        let (tick_tx, _) = broadcast::channel(TICK_CHANNEL_CAPACITY);
        Self {
            tick_tx,
            ticker: std::sync::Mutex::new(None),
        }
    }

    /// Starts ticking. Idempotent; must be called within a tokio runtime.
    pub fn start(&self) {
        let mut ticker = self.ticker.lock().unwrap();
        if ticker.is_some() {
            return;
        }

        let tick_tx = self.tick_tx.clone();
        *ticker = Some(tokio::spawn(async move {
            let mut timer = interval(Duration::from_secs(1));
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                timer.tick().await;
                // Send fails only while no subscriber exists; ticking
                // continues so late subscribers pick up immediately.
                let _ = tick_tx.send(Tick {
                    at: Local::now().naive_local(),
                });
            }
        }));
        debug!("Clock started");
    }

    /// Subscribes to ticks. Dropping the receiver unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Tick> {
        self.tick_tx.subscribe()
    }

    /// Returns true if the ticking task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.ticker.lock().unwrap().is_some()
    }

    /// Stops the ticking task. Idempotent.
    pub fn shutdown(&self) {
        if let Some(handle) = self.ticker.lock().unwrap().take() {
            handle.abort();
            debug!("Clock stopped");
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_subscribers_receive_ticks() {
        let clock = Clock::new();
        let mut rx = clock.subscribe();
        clock.start();

        let tick = timeout(Duration::from_secs(3), rx.recv())
            .await
            .expect("should tick within 3s")
            .expect("channel open");

        // The tick carries a plausible wall-clock time.
        let now = Local::now().naive_local();
        assert!((now - tick.at).num_seconds().abs() < 5);

        clock.shutdown();
    }

    #[tokio::test]
    async fn test_each_subscriber_sees_each_tick() {
        let clock = Clock::new();
        let mut rx_a = clock.subscribe();
        let mut rx_b = clock.subscribe();
        clock.start();

        let tick_a = timeout(Duration::from_secs(3), rx_a.recv())
            .await
            .unwrap()
            .unwrap();
        let tick_b = timeout(Duration::from_secs(3), rx_b.recv())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(tick_a, tick_b);
        clock.shutdown();
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let clock = Clock::new();
        clock.start();
        clock.start();
        assert!(clock.is_running());
        clock.shutdown();
        assert!(!clock.is_running());
    }

    #[tokio::test]
    async fn test_shutdown_stops_ticking() {
        let clock = Clock::new();
        let mut rx = clock.subscribe();
        clock.start();

        // Consume one tick to ensure the task was live.
        let _ = timeout(Duration::from_secs(3), rx.recv()).await.unwrap();

        clock.shutdown();
        assert!(!clock.is_running());

        // Drain anything already in flight, then expect silence.
        while rx.try_recv().is_ok() {}
        let result = timeout(Duration::from_millis(1500), rx.recv()).await;
        assert!(result.is_err(), "no ticks should arrive after shutdown");
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let clock = Clock::new();
        clock.start();
        clock.shutdown();
        clock.shutdown();
        assert!(!clock.is_running());
    }

    #[tokio::test]
    async fn test_drop_aborts_ticker() {
        let mut rx = {
            let clock = Clock::new();
            clock.start();
            clock.subscribe()
            // clock dropped here
        };

        while rx.try_recv().is_ok() {}
        let result = timeout(Duration::from_millis(1500), rx.recv()).await;
        // Sender is dropped with the clock, so the channel closes.
        match result {
            Ok(Err(broadcast::error::RecvError::Closed)) => {}
            Ok(Ok(_)) => panic!("no ticks should arrive after drop"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
