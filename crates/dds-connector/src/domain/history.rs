// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reader delivery queues and writer durability history.

use super::ack::AckToken;
use super::guid::Guid;
use super::sample::{
    Change, ChangeKind, InstanceHandle, InstanceState, SampleInfo, SampleState, ViewState,
};
use crate::dynamic::DynamicData;
use crate::qos::{EndpointQos, History};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// A sample handed to the application: shared data plus its info.
pub type LoanedSample = (Arc<DynamicData>, SampleInfo);

struct QueuedSample {
    data: Arc<DynamicData>,
    info: SampleInfo,
    ack: Option<AckToken>,
    read: bool,
}

#[derive(Debug)]
struct InstanceRecord {
    state: InstanceState,
    viewed: bool,
    writers: HashSet<Guid>,
    queued: usize,
}

impl InstanceRecord {
    fn new() -> Self {
        Self {
            state: InstanceState::Alive,
            viewed: false,
            writers: HashSet::new(),
            queued: 0,
        }
    }
}

/// Why a change did not enter the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `max_samples` reached.
    SamplesLimit,
    /// `max_instances` reached.
    InstancesLimit,
    /// `max_samples_per_instance` reached.
    PerInstanceLimit,
    /// Unregister from one of several writers: no visible state change.
    NoStateChange,
}

/// The delivery queue of one reader.
pub struct ReaderQueue {
    qos: EndpointQos,
    samples: VecDeque<QueuedSample>,
    instances: HashMap<InstanceHandle, InstanceRecord>,
}

impl ReaderQueue {
    pub fn new(qos: EndpointQos) -> Self {
        Self {
            qos,
            samples: VecDeque::new(),
            instances: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Any sample not yet returned by read or take.
    pub fn has_unread(&self) -> bool {
        self.samples.iter().any(|s| !s.read)
    }

    /// Enqueue a change, applying history and resource limits.
    pub fn push(&mut self, change: &Change, ack: Option<AckToken>) -> Result<(), Rejection> {
        let limits = self.qos.resource_limits;
        let queued = match self.instances.get(&change.instance) {
            Some(record) => record.queued,
            None if self.instances.len() >= limits.max_instances => {
                return Err(Rejection::InstancesLimit)
            }
            None => 0,
        };

        let evict = match self.qos.history {
            History::KeepLast(depth) => {
                queued >= (depth as usize).clamp(1, limits.max_samples_per_instance.max(1))
            }
            History::KeepAll if queued >= limits.max_samples_per_instance => {
                return Err(Rejection::PerInstanceLimit)
            }
            History::KeepAll => false,
        };
        if !evict && self.samples.len() >= limits.max_samples {
            return Err(Rejection::SamplesLimit);
        }

        let record = self
            .instances
            .entry(change.instance)
            .or_insert_with(InstanceRecord::new);
        match change.kind {
            ChangeKind::Write => {
                if record.state != InstanceState::Alive {
                    record.state = InstanceState::Alive;
                    record.viewed = false;
                }
                record.writers.insert(change.writer);
            }
            ChangeKind::Dispose => {
                record.state = InstanceState::NotAliveDisposed;
            }
            ChangeKind::Unregister => {
                record.writers.remove(&change.writer);
                if !record.writers.is_empty() || record.state != InstanceState::Alive {
                    return Err(Rejection::NoStateChange);
                }
                record.state = InstanceState::NotAliveNoWriters;
            }
        }
        record.queued += 1;

        if evict {
            self.evict_oldest(change.instance);
        }
        self.samples.push_back(QueuedSample {
            data: Arc::clone(&change.data),
            info: change.info(),
            ack,
            read: false,
        });
        Ok(())
    }

    fn evict_oldest(&mut self, instance: InstanceHandle) {
        if let Some(pos) = self
            .samples
            .iter()
            .position(|s| s.info.instance_handle == instance)
        {
            // Dropping the entry resolves an unacknowledged token.
            self.samples.remove(pos);
            if let Some(record) = self.instances.get_mut(&instance) {
                record.queued = record.queued.saturating_sub(1);
            }
        }
    }

    /// Stamp the per-access states into each sample's info.
    fn stamp(&self, sample: &QueuedSample) -> SampleInfo {
        let mut info = sample.info.clone();
        if let Some(record) = self.instances.get(&info.instance_handle) {
            info.instance_state = record.state;
            info.view_state = if record.viewed {
                ViewState::NotNew
            } else {
                ViewState::New
            };
        }
        info.sample_state = if sample.read {
            SampleState::Read
        } else {
            SampleState::NotRead
        };
        info
    }

    fn mark_viewed(&mut self, handles: impl IntoIterator<Item = InstanceHandle>) {
        for handle in handles {
            if let Some(record) = self.instances.get_mut(&handle) {
                record.viewed = true;
            }
        }
    }

    /// Non-destructive access to every queued sample.
    pub fn read(&mut self) -> Vec<LoanedSample> {
        let out: Vec<LoanedSample> = self
            .samples
            .iter()
            .map(|s| (Arc::clone(&s.data), self.stamp(s)))
            .collect();
        for sample in self.samples.iter_mut() {
            sample.read = true;
            if let Some(token) = sample.ack.take() {
                token.acknowledge();
            }
        }
        self.mark_viewed(out.iter().map(|(_, info)| info.instance_handle));
        out
    }

    /// Remove and return every queued sample.
    pub fn take(&mut self) -> Vec<LoanedSample> {
        let drained: Vec<QueuedSample> = self.samples.drain(..).collect();
        let mut out = Vec::with_capacity(drained.len());
        for mut sample in drained {
            out.push((Arc::clone(&sample.data), self.stamp(&sample)));
            if let Some(token) = sample.ack.take() {
                token.acknowledge();
            }
        }
        self.mark_viewed(out.iter().map(|(_, info)| info.instance_handle));
        for record in self.instances.values_mut() {
            record.queued = 0;
        }
        // Forget instances that are no longer alive and have nothing queued.
        self.instances
            .retain(|_, record| record.state == InstanceState::Alive);
        out
    }

    /// A matched writer went away: its instances may lose their last writer.
    ///
    /// Returns true when some instance changed state.
    pub fn writer_gone(&mut self, writer: Guid) -> bool {
        let mut changed = false;
        for record in self.instances.values_mut() {
            if record.writers.remove(&writer)
                && record.writers.is_empty()
                && record.state == InstanceState::Alive
            {
                record.state = InstanceState::NotAliveNoWriters;
                changed = true;
            }
        }
        changed
    }
}

/// History kept by a `TransientLocal` writer for late-joining readers.
pub struct WriterHistory {
    history: History,
    max_samples: usize,
    changes: VecDeque<Change>,
}

impl WriterHistory {
    pub fn new(qos: &EndpointQos) -> Self {
        Self {
            history: qos.history,
            max_samples: qos.resource_limits.max_samples,
            changes: VecDeque::new(),
        }
    }

    pub fn record(&mut self, change: &Change) {
        if let History::KeepLast(depth) = self.history {
            let kept = self
                .changes
                .iter()
                .filter(|c| c.instance == change.instance)
                .count();
            if kept >= depth as usize {
                if let Some(pos) = self.changes.iter().position(|c| c.instance == change.instance) {
                    self.changes.remove(pos);
                }
            }
        }
        if self.changes.len() >= self.max_samples {
            self.changes.pop_front();
        }
        self.changes.push_back(change.clone());
    }

    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
