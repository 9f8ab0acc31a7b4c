// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Blocking wait primitives.
//!
//! A timeout of `None` waits indefinitely; `Some(Duration::ZERO)` polls.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Result of a wait: the awaited condition held, or the timeout expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    Satisfied(T),
    TimedOut,
}

impl<T> WaitOutcome<T> {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, WaitOutcome::Satisfied(_))
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, WaitOutcome::TimedOut)
    }

    /// Value carried by a satisfied wait.
    pub fn satisfied(self) -> Option<T> {
        match self {
            WaitOutcome::Satisfied(v) => Some(v),
            WaitOutcome::TimedOut => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> WaitOutcome<U> {
        match self {
            WaitOutcome::Satisfied(v) => WaitOutcome::Satisfied(f(v)),
            WaitOutcome::TimedOut => WaitOutcome::TimedOut,
        }
    }
}

/// Absolute deadline for a relative timeout.
pub fn deadline(timeout: Option<Duration>) -> Option<Instant> {
    timeout.and_then(|t| Instant::now().checked_add(t))
}

/// Block on `cond` until notified or `deadline` passes.
///
/// Returns `false` once the deadline has passed.
pub(crate) fn wait_on<T>(
    cond: &Condvar,
    guard: &mut parking_lot::MutexGuard<'_, T>,
    deadline: Option<Instant>,
) -> bool {
    match deadline {
        None => {
            cond.wait(guard);
            true
        }
        Some(d) => {
            if Instant::now() >= d {
                return false;
            }
            !cond.wait_until(guard, d).timed_out()
        }
    }
}

/// "New data" notification: a generation counter bumped on every arrival.
#[derive(Debug, Default)]
pub struct DataSignal {
    generation: Mutex<u64>,
    cond: Condvar,
}

impl DataSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake every waiter.
    pub fn notify(&self) {
        let mut generation = self.generation.lock();
        *generation = generation.wrapping_add(1);
        self.cond.notify_all();
    }

    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Wait until `ready()` holds.
    ///
    /// `ready` is evaluated without the signal lock held; a notification
    /// racing with the evaluation is caught by the generation counter.
    pub fn wait_for<F>(&self, timeout: Option<Duration>, mut ready: F) -> WaitOutcome<()>
    where
        F: FnMut() -> bool,
    {
        let deadline = deadline(timeout);
        loop {
            let seen = self.generation();
            if ready() {
                return WaitOutcome::Satisfied(());
            }
            let mut generation = self.generation.lock();
            while *generation == seen {
                if !wait_on(&self.cond, &mut generation, deadline) {
                    drop(generation);
                    return if ready() {
                        WaitOutcome::Satisfied(())
                    } else {
                        WaitOutcome::TimedOut
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_poll_returns_immediately() {
        let signal = DataSignal::new();
        let start = Instant::now();
        let outcome = signal.wait_for(Some(Duration::ZERO), || false);
        assert!(outcome.is_timed_out());
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_ready_condition_short_circuits() {
        let signal = DataSignal::new();
        assert!(signal.wait_for(None, || true).is_satisfied());
    }

    #[test]
    fn test_notify_wakes_waiter() {
        let signal = Arc::new(DataSignal::new());
        let flag = Arc::new(AtomicBool::new(false));

        let (s, f) = (signal.clone(), flag.clone());
        let notifier = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            f.store(true, Ordering::SeqCst);
            s.notify();
        });

        let outcome = signal.wait_for(Some(Duration::from_secs(5)), || flag.load(Ordering::SeqCst));
        assert!(outcome.is_satisfied());
        notifier.join().expect("notifier thread");
    }

    #[test]
    fn test_timeout_elapses() {
        let signal = DataSignal::new();
        let start = Instant::now();
        let outcome = signal.wait_for(Some(Duration::from_millis(30)), || false);
        assert!(outcome.is_timed_out());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_outcome_helpers() {
        assert_eq!(WaitOutcome::Satisfied(2).map(|v| v * 2).satisfied(), Some(4));
        assert_eq!(WaitOutcome::<u8>::TimedOut.satisfied(), None);
    }
}
