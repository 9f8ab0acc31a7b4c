// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reliable-delivery acknowledgment tracking.
//!
//! A writer issues one [`AckToken`] per sample delivered to a reliable
//! reader. The reader acknowledges the token the first time the sample is
//! read or taken; a token dropped unacknowledged (sample evicted, reader
//! deleted) resolves without counting.

use super::condition::{deadline, wait_on, WaitOutcome};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct AckState {
    pending: u64,
    acknowledged: u64,
}

/// Per-writer acknowledgment counters.
#[derive(Debug, Default)]
pub struct AckTracker {
    state: Mutex<AckState>,
    cond: Condvar,
}

impl AckTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Issue a token for one delivery.
    pub fn issue(self: &Arc<Self>) -> AckToken {
        self.state.lock().pending += 1;
        AckToken {
            tracker: Arc::clone(self),
            resolved: false,
        }
    }

    fn resolve(&self, acknowledged: bool) {
        let mut state = self.state.lock();
        state.pending = state.pending.saturating_sub(1);
        if acknowledged {
            state.acknowledged += 1;
        }
        self.cond.notify_all();
    }

    /// Deliveries not yet resolved.
    pub fn pending(&self) -> u64 {
        self.state.lock().pending
    }

    /// Cumulative acknowledgments.
    pub fn acknowledged(&self) -> u64 {
        self.state.lock().acknowledged
    }

    /// Wait until nothing is pending; yields the cumulative ack count.
    pub fn wait_all(&self, timeout: Option<Duration>) -> WaitOutcome<u64> {
        let deadline = deadline(timeout);
        let mut state = self.state.lock();
        while state.pending > 0 {
            if !wait_on(&self.cond, &mut state, deadline) && state.pending > 0 {
                return WaitOutcome::TimedOut;
            }
        }
        WaitOutcome::Satisfied(state.acknowledged)
    }
}

/// One outstanding delivery.
#[derive(Debug)]
pub struct AckToken {
    tracker: Arc<AckTracker>,
    resolved: bool,
}

impl AckToken {
    pub fn acknowledge(mut self) {
        self.resolved = true;
        self.tracker.resolve(true);
    }
}

impl Drop for AckToken {
    fn drop(&mut self) {
        if !self.resolved {
            self.tracker.resolve(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_acknowledge_and_drop() {
        let tracker = AckTracker::new();
        let a = tracker.issue();
        let b = tracker.issue();
        assert_eq!(tracker.pending(), 2);

        a.acknowledge();
        drop(b);
        assert_eq!(tracker.pending(), 0);
        assert_eq!(tracker.acknowledged(), 1);
        assert_eq!(tracker.wait_all(Some(Duration::ZERO)), WaitOutcome::Satisfied(1));
    }

    #[test]
    fn test_wait_times_out_while_pending() {
        let tracker = AckTracker::new();
        let _token = tracker.issue();
        assert_eq!(
            tracker.wait_all(Some(Duration::from_millis(10))),
            WaitOutcome::TimedOut
        );
    }

    #[test]
    fn test_wait_wakes_on_ack() {
        let tracker = AckTracker::new();
        let token = tracker.issue();
        let acker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            token.acknowledge();
        });
        assert_eq!(
            tracker.wait_all(Some(Duration::from_secs(5))),
            WaitOutcome::Satisfied(1)
        );
        acker.join().expect("acker thread");
    }
}
