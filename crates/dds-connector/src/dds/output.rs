// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Outputs: a writer plus the instance staged for the next write.

use super::index::IndexBase;
use super::objects::ObjectSlot;
use super::write_params::WriteParams;
use super::{Error, Result};
use crate::domain::sample::now_nanos;
use crate::domain::{
    BindToken, Change, ChangeKind, InstanceHandle, MatchedEndpoint, SampleIdentity, WaitOutcome,
    WriterEndpoint,
};
use crate::dynamic::{DynamicData, MemberPath};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use serde_json::Value;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct OutputEntity {
    writer: Arc<WriterEndpoint>,
    instance: Mutex<DynamicData>,
    checked_out: AtomicBool,
    _token: BindToken,
}

impl OutputEntity {
    pub(crate) fn new(writer: Arc<WriterEndpoint>, token: BindToken) -> Self {
        let instance = DynamicData::new(&writer.info().type_desc);
        Self {
            writer,
            instance: Mutex::new(instance),
            checked_out: AtomicBool::new(false),
            _token: token,
        }
    }
}

/// Handle to a named output; borrows its [`Connector`](super::Connector).
#[derive(Clone, Copy)]
pub struct Output<'a> {
    name: &'a str,
    entity: &'a OutputEntity,
    base: IndexBase,
}

impl<'a> Output<'a> {
    pub(crate) fn new(name: &'a str, entity: &'a OutputEntity, base: IndexBase) -> Self {
        Self { name, entity, base }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Underlying writer endpoint.
    pub fn endpoint(&self) -> &'a Arc<WriterEndpoint> {
        &self.entity.writer
    }

    pub fn set_boolean(&self, path: &str, value: bool) -> Result<()> {
        let _slot = ObjectSlot::acquire()?;
        let path = self.member_path(path)?;
        Ok(self.staged()?.set_boolean(&path, value)?)
    }

    /// Numeric and enum members (enums by value).
    pub fn set_number(&self, path: &str, value: f64) -> Result<()> {
        let _slot = ObjectSlot::acquire()?;
        let path = self.member_path(path)?;
        Ok(self.staged()?.set_number(&path, value)?)
    }

    /// String and char members, and enums by enumerator name.
    pub fn set_string(&self, path: &str, value: &str) -> Result<()> {
        let _slot = ObjectSlot::acquire()?;
        let path = self.member_path(path)?;
        Ok(self.staged()?.set_string(&path, value)?)
    }

    /// Apply the members present in a JSON object; others keep their value.
    ///
    /// On error the staged instance is left unchanged.
    pub fn set_json_instance(&self, json: &str) -> Result<()> {
        let _slot = ObjectSlot::acquire()?;
        let mut instance = self.staged()?;
        let mut staged = instance.clone();
        staged
            .apply_json_str(json)
            .map_err(|e| Error::InvalidJson(e.to_string()))?;
        *instance = staged;
        Ok(())
    }

    /// Stage a serde value through the JSON bridge.
    pub fn set_typed<T: Serialize>(&self, value: &T) -> Result<()> {
        let _slot = ObjectSlot::acquire()?;
        let json = serde_json::to_value(value).map_err(|e| Error::InvalidJson(e.to_string()))?;
        if !matches!(json, Value::Object(_)) {
            return Err(Error::InvalidJson("value must serialize to an object".into()));
        }
        let mut instance = self.staged()?;
        let mut staged = instance.clone();
        staged
            .apply_json(&json)
            .map_err(|e| Error::InvalidJson(e.to_string()))?;
        *instance = staged;
        Ok(())
    }

    /// Reset one primitive, enum or sequence member to its default.
    pub fn clear_member(&self, path: &str) -> Result<()> {
        let _slot = ObjectSlot::acquire()?;
        let path = self.member_path(path)?;
        Ok(self.staged()?.clear_member(&path)?)
    }

    /// Staged instance as JSON.
    pub fn get_json_instance(&self) -> Result<String> {
        let _slot = ObjectSlot::acquire()?;
        Ok(self.staged()?.to_json().to_string())
    }

    /// Publish the staged instance and reset it to defaults.
    pub fn write(&self) -> Result<()> {
        self.write_params(WriteParams::default())
    }

    /// Publish with JSON write parameters; see [`WriteParams`].
    pub fn write_with_params(&self, params_json: &str) -> Result<()> {
        self.write_params(WriteParams::from_json(params_json)?)
    }

    pub fn write_params(&self, params: WriteParams) -> Result<()> {
        let _slot = ObjectSlot::acquire()?;
        let writer = &self.entity.writer;

        let data = {
            let mut instance = self.staged()?;
            let data = match params.action {
                ChangeKind::Write => instance.clone(),
                ChangeKind::Dispose | ChangeKind::Unregister => instance.key_only(),
            };
            instance.reset();
            data
        };

        let sequence_number = writer.next_sequence_number();
        let identity = params.identity.unwrap_or(SampleIdentity {
            writer_guid: writer.guid(),
            sequence_number,
        });
        let change = Change {
            kind: params.action,
            instance: InstanceHandle::of(&data),
            data: Arc::new(data),
            writer: writer.guid(),
            source_timestamp: params.source_timestamp.unwrap_or_else(now_nanos),
            identity,
            related: params.related_sample_identity,
        };
        writer.publish(change);
        Ok(())
    }

    /// Direct access to the staged instance.
    ///
    /// While the guard is alive, every other staging operation on this
    /// output (including a second `native_instance`) fails with
    /// [`Error::UnsupportedOperation`].
    pub fn native_instance(&self) -> Result<NativeInstance<'a>> {
        let slot = ObjectSlot::acquire()?;
        let entity = self.entity;
        if entity
            .checked_out
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(self.checked_out_error());
        }
        Ok(NativeInstance {
            guard: entity.instance.lock(),
            checked_out: &entity.checked_out,
            _slot: slot,
        })
    }

    /// Wait until every delivered sample is acknowledged or dropped; yields
    /// the cumulative acknowledgment count.
    pub fn wait_for_acknowledgments(&self, timeout: Option<Duration>) -> Result<WaitOutcome<u64>> {
        let _slot = ObjectSlot::acquire()?;
        Ok(self.entity.writer.acks().wait_all(timeout))
    }

    /// Wait for the matched-reader count to change; yields the signed change.
    pub fn wait_for_matched_subscription(
        &self,
        timeout: Option<Duration>,
    ) -> Result<WaitOutcome<i64>> {
        let _slot = ObjectSlot::acquire()?;
        Ok(self.entity.writer.matches().wait_for_change(timeout))
    }

    pub fn matched_subscriptions(&self) -> Vec<MatchedEndpoint> {
        self.entity.writer.matches().snapshot()
    }

    /// Matched readers as a JSON array.
    pub fn get_matched_subscriptions(&self) -> Result<String> {
        let _slot = ObjectSlot::acquire()?;
        serde_json::to_string(&self.matched_subscriptions())
            .map_err(|e| Error::Runtime(e.to_string()))
    }

    /// Lock the staged instance unless a native instance holds it.
    fn staged(&self) -> Result<MutexGuard<'a, DynamicData>> {
        if self.entity.checked_out.load(Ordering::Acquire) {
            return Err(self.checked_out_error());
        }
        Ok(self.entity.instance.lock())
    }

    fn checked_out_error(&self) -> Error {
        Error::UnsupportedOperation(format!("native instance of '{}' is checked out", self.name))
    }

    fn member_path(&self, path: &str) -> Result<MemberPath> {
        self.base.translate_path(MemberPath::parse(path)?)
    }
}

impl std::fmt::Debug for Output<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("name", &self.name)
            .field("writer", &self.entity.writer)
            .finish()
    }
}

/// Locked staged instance. Holds one per-thread object slot.
pub struct NativeInstance<'a> {
    guard: MutexGuard<'a, DynamicData>,
    checked_out: &'a AtomicBool,
    _slot: ObjectSlot,
}

impl Drop for NativeInstance<'_> {
    fn drop(&mut self) {
        self.checked_out.store(false, Ordering::Release);
    }
}

impl Deref for NativeInstance<'_> {
    type Target = DynamicData;

    fn deref(&self) -> &DynamicData {
        &self.guard
    }
}

impl DerefMut for NativeInstance<'_> {
    fn deref_mut(&mut self) -> &mut DynamicData {
        &mut self.guard
    }
}
