// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Local reader and writer endpoints.
//!
//! Lock order: domain endpoint map, then `WriterEndpoint::history`, then
//! `WriterEndpoint::readers`, then `ReaderEndpoint::queue`. Publishing never
//! takes the domain map.

use super::ack::AckTracker;
use super::condition::{DataSignal, WaitOutcome};
use super::guid::Guid;
use super::history::{LoanedSample, ReaderQueue, Rejection, WriterHistory};
use super::matching::{MatchState, MatchedEndpoint};
use super::sample::Change;
use crate::dynamic::TypeDescriptor;
use crate::qos::{qos_compatible, Durability, EndpointQos, Reliability};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Identity and contract of an endpoint.
#[derive(Debug, Clone)]
pub struct EndpointInfo {
    pub guid: Guid,
    pub name: String,
    pub topic: Arc<str>,
    pub type_desc: Arc<TypeDescriptor>,
    pub qos: EndpointQos,
}

impl EndpointInfo {
    fn as_matched(&self) -> MatchedEndpoint {
        MatchedEndpoint {
            participant_id: self.guid.prefix_hex(),
            endpoint_name: self.name.clone(),
            topic_name: self.topic.to_string(),
        }
    }
}

/// Whether `writer` may deliver to `reader` (same key assumed).
pub fn endpoints_compatible(writer: &EndpointInfo, reader: &EndpointInfo) -> bool {
    if *writer.type_desc != *reader.type_desc {
        log::warn!(
            "[Matching] '{}' and '{}' share type name '{}' but not its definition",
            writer.name,
            reader.name,
            writer.type_desc.name
        );
        return false;
    }
    if !qos_compatible(&writer.qos, &reader.qos) {
        log::warn!(
            "[Matching] incompatible QoS: writer '{}' {:?}/{:?}, reader '{}' {:?}/{:?}",
            writer.name,
            writer.qos.reliability,
            writer.qos.durability,
            reader.name,
            reader.qos.reliability,
            reader.qos.durability
        );
        return false;
    }
    true
}

/// A local writer.
pub struct WriterEndpoint {
    info: EndpointInfo,
    readers: RwLock<Vec<Arc<ReaderEndpoint>>>,
    history: Option<Mutex<WriterHistory>>,
    last_sequence: AtomicI64,
    acks: Arc<AckTracker>,
    matches: MatchState,
}

impl WriterEndpoint {
    pub fn new(info: EndpointInfo) -> Arc<Self> {
        let history = (info.qos.durability == Durability::TransientLocal)
            .then(|| Mutex::new(WriterHistory::new(&info.qos)));
        Arc::new(Self {
            info,
            readers: RwLock::new(Vec::new()),
            history,
            last_sequence: AtomicI64::new(0),
            acks: AckTracker::new(),
            matches: MatchState::new(),
        })
    }

    pub fn info(&self) -> &EndpointInfo {
        &self.info
    }

    pub fn guid(&self) -> Guid {
        self.info.guid
    }

    /// Allocate the next sequence number (starting at 1).
    pub fn next_sequence_number(&self) -> i64 {
        self.last_sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn acks(&self) -> &AckTracker {
        &self.acks
    }

    pub fn matches(&self) -> &MatchState {
        &self.matches
    }

    /// Deliver `change` to every matched reader; returns how many accepted it.
    pub fn publish(&self, change: Change) -> usize {
        // Held across delivery so a concurrent bind cannot replay this change twice.
        let mut history = self.history.as_ref().map(|h| h.lock());
        if let Some(ref mut history) = history {
            history.record(&change);
        }
        let readers = self.readers.read();
        let delivered = readers
            .iter()
            .filter(|reader| self.deliver_to(reader, &change))
            .count();
        log::debug!(
            "[Writer] '{}' seq={} {:?} delivered to {}/{} readers",
            self.info.name,
            change.identity.sequence_number,
            change.kind,
            delivered,
            readers.len()
        );
        delivered
    }

    fn deliver_to(&self, reader: &ReaderEndpoint, change: &Change) -> bool {
        let reliable = reader.info.qos.reliability == Reliability::Reliable;
        let ack = reliable.then(|| self.acks.issue());
        reader.deliver(change, ack)
    }

    /// Bind a compatible reader; replays durable history to durable readers.
    pub(crate) fn bind(&self, reader: &Arc<ReaderEndpoint>) {
        let history = self.history.as_ref().map(|h| h.lock());
        let mut readers = self.readers.write();
        if readers.iter().any(|r| r.guid() == reader.guid()) {
            return;
        }
        readers.push(Arc::clone(reader));
        self.matches.add(reader.guid(), reader.info.as_matched());
        reader.matches.add(self.guid(), self.info.as_matched());

        if let Some(history) = history {
            if reader.info.qos.durability == Durability::TransientLocal {
                let replayed = history
                    .changes()
                    .filter(|change| self.deliver_to(reader, change))
                    .count();
                log::debug!(
                    "[Writer] '{}' replayed {} samples to late joiner '{}'",
                    self.info.name,
                    replayed,
                    reader.info.name
                );
            }
        }
        log::debug!(
            "[Matching] bound reader '{}' to writer '{}' on topic '{}'",
            reader.info.name,
            self.info.name,
            self.info.topic
        );
    }

    /// Forget a reader that is going away.
    pub(crate) fn unbind(&self, reader: &ReaderEndpoint) {
        self.readers.write().retain(|r| r.guid() != reader.guid());
        self.matches.remove(reader.guid());
        reader.matches.remove(self.guid());
    }

    /// Detach every reader; each sees this writer disappear.
    pub(crate) fn unbind_all(&self) {
        let readers = std::mem::take(&mut *self.readers.write());
        for reader in readers {
            self.matches.remove(reader.guid());
            reader.writer_gone(self.guid());
        }
    }
}

impl std::fmt::Debug for WriterEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterEndpoint")
            .field("guid", &self.info.guid)
            .field("name", &self.info.name)
            .field("topic", &self.info.topic)
            .field("matched", &self.matches.count())
            .finish()
    }
}

/// A local reader.
pub struct ReaderEndpoint {
    info: EndpointInfo,
    queue: Mutex<ReaderQueue>,
    signal: DataSignal,
    listener: Option<Arc<DataSignal>>,
    matches: MatchState,
}

impl ReaderEndpoint {
    /// `listener` is notified on every accepted sample in addition to the
    /// reader's own signal.
    pub fn new(info: EndpointInfo, listener: Option<Arc<DataSignal>>) -> Arc<Self> {
        let queue = Mutex::new(ReaderQueue::new(info.qos));
        Arc::new(Self {
            info,
            queue,
            signal: DataSignal::new(),
            listener,
            matches: MatchState::new(),
        })
    }

    pub fn info(&self) -> &EndpointInfo {
        &self.info
    }

    pub fn guid(&self) -> Guid {
        self.info.guid
    }

    pub fn matches(&self) -> &MatchState {
        &self.matches
    }

    /// Enqueue one change; returns whether it was accepted.
    pub fn deliver(&self, change: &Change, ack: Option<super::ack::AckToken>) -> bool {
        let pushed = self.queue.lock().push(change, ack);
        match pushed {
            Ok(()) => {
                self.signal.notify();
                if let Some(ref listener) = self.listener {
                    listener.notify();
                }
                true
            }
            Err(Rejection::NoStateChange) => false,
            Err(reason) => {
                log::warn!(
                    "[Reader] '{}' rejected sample seq={} from {}: {:?}",
                    self.info.name,
                    change.identity.sequence_number,
                    change.writer,
                    reason
                );
                false
            }
        }
    }

    fn writer_gone(&self, writer: Guid) {
        self.matches.remove(writer);
        if self.queue.lock().writer_gone(writer) {
            log::debug!(
                "[Reader] '{}' lost its last writer for some instances",
                self.info.name
            );
        }
    }

    /// Snapshot of the delivery queue (non-destructive).
    pub fn read(&self) -> Vec<LoanedSample> {
        self.queue.lock().read()
    }

    /// Drain the delivery queue.
    pub fn take(&self) -> Vec<LoanedSample> {
        self.queue.lock().take()
    }

    pub fn has_unread(&self) -> bool {
        self.queue.lock().has_unread()
    }

    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    /// Wait until a sample not yet read or taken is queued.
    pub fn wait_for_data(&self, timeout: Option<Duration>) -> WaitOutcome<()> {
        self.signal.wait_for(timeout, || self.has_unread())
    }
}

impl std::fmt::Debug for ReaderEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderEndpoint")
            .field("guid", &self.info.guid)
            .field("name", &self.info.name)
            .field("topic", &self.info.topic)
            .field("queued", &self.queued())
            .finish()
    }
}
