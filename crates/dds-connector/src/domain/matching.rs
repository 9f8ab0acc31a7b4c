// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Matched-peer bookkeeping for one endpoint.

use super::condition::{deadline, wait_on, WaitOutcome};
use super::guid::Guid;
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::time::Duration;

/// One matched remote endpoint, as reported to applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedEndpoint {
    pub participant_id: String,
    pub endpoint_name: String,
    pub topic_name: String,
}

#[derive(Debug, Default)]
struct MatchInner {
    peers: Vec<(Guid, MatchedEndpoint)>,
    /// Count reported by the last completed wait.
    observed: usize,
}

/// Matched peers of a reader (publications) or writer (subscriptions).
#[derive(Debug, Default)]
pub struct MatchState {
    inner: Mutex<MatchInner>,
    cond: Condvar,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, guid: Guid, peer: MatchedEndpoint) {
        let mut inner = self.inner.lock();
        if inner.peers.iter().any(|(g, _)| *g == guid) {
            return;
        }
        inner.peers.push((guid, peer));
        self.cond.notify_all();
    }

    pub fn remove(&self, guid: Guid) {
        let mut inner = self.inner.lock();
        let before = inner.peers.len();
        inner.peers.retain(|(g, _)| *g != guid);
        if inner.peers.len() != before {
            self.cond.notify_all();
        }
    }

    pub fn count(&self) -> usize {
        self.inner.lock().peers.len()
    }

    pub fn contains(&self, guid: Guid) -> bool {
        self.inner.lock().peers.iter().any(|(g, _)| *g == guid)
    }

    pub fn snapshot(&self) -> Vec<MatchedEndpoint> {
        self.inner
            .lock()
            .peers
            .iter()
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Wait until the matched count differs from the last observation.
    ///
    /// Yields the signed change and records the new count as observed.
    pub fn wait_for_change(&self, timeout: Option<Duration>) -> WaitOutcome<i64> {
        let deadline = deadline(timeout);
        let mut inner = self.inner.lock();
        loop {
            let current = inner.peers.len();
            if current != inner.observed {
                let delta = current as i64 - inner.observed as i64;
                inner.observed = current;
                return WaitOutcome::Satisfied(delta);
            }
            if !wait_on(&self.cond, &mut inner, deadline) && inner.peers.len() == inner.observed {
                return WaitOutcome::TimedOut;
            }
        }
    }
}
