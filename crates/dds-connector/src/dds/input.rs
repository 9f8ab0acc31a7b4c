// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Inputs: a reader plus the samples of its last read or take.

use super::index::IndexBase;
use super::objects::ObjectSlot;
use super::{Error, Result};
use crate::domain::{
    BindToken, LoanedSample, MatchedEndpoint, ReaderEndpoint, SampleInfo, WaitOutcome,
};
use crate::dynamic::{member_type, DynamicData, FieldValue, MemberPath};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct InputEntity {
    reader: Arc<ReaderEndpoint>,
    samples: Mutex<Vec<LoanedSample>>,
    _token: BindToken,
}

impl InputEntity {
    pub(crate) fn new(reader: Arc<ReaderEndpoint>, token: BindToken) -> Self {
        Self {
            reader,
            samples: Mutex::new(Vec::new()),
            _token: token,
        }
    }

    pub(crate) fn reader(&self) -> &Arc<ReaderEndpoint> {
        &self.reader
    }
}

/// Handle to a named input; borrows its [`Connector`](super::Connector).
#[derive(Clone, Copy)]
pub struct Input<'a> {
    name: &'a str,
    entity: &'a InputEntity,
    base: IndexBase,
}

impl<'a> Input<'a> {
    pub(crate) fn new(name: &'a str, entity: &'a InputEntity, base: IndexBase) -> Self {
        Self { name, entity, base }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Underlying reader endpoint.
    pub fn endpoint(&self) -> &'a Arc<ReaderEndpoint> {
        &self.entity.reader
    }

    /// Load every available sample, leaving them in the reader.
    pub fn read(&self) -> Result<()> {
        let _slot = ObjectSlot::acquire()?;
        let loaned = self.entity.reader.read();
        log::debug!("[Input] '{}' read {} samples", self.name, loaned.len());
        *self.entity.samples.lock() = loaned;
        Ok(())
    }

    /// Load every available sample, removing them from the reader.
    pub fn take(&self) -> Result<()> {
        let _slot = ObjectSlot::acquire()?;
        let loaned = self.entity.reader.take();
        log::debug!("[Input] '{}' took {} samples", self.name, loaned.len());
        *self.entity.samples.lock() = loaned;
        Ok(())
    }

    /// Forget the loaded samples; the reader is untouched.
    pub fn clear(&self) -> Result<()> {
        let _slot = ObjectSlot::acquire()?;
        self.entity.samples.lock().clear();
        Ok(())
    }

    /// Number of loaded samples.
    pub fn sample_count(&self) -> Result<usize> {
        let _slot = ObjectSlot::acquire()?;
        Ok(self.entity.samples.lock().len())
    }

    pub fn get_boolean(&self, index: usize, path: &str) -> Result<bool> {
        let _slot = ObjectSlot::acquire()?;
        let path = self.member_path(path)?;
        Ok(self.sample(index)?.0.get_boolean(&path)?)
    }

    /// Numeric and enum members; `#seq` yields a sequence length.
    pub fn get_number(&self, index: usize, path: &str) -> Result<f64> {
        let _slot = ObjectSlot::acquire()?;
        let path = self.member_path(path)?;
        Ok(self.sample(index)?.0.get_number(&path)?)
    }

    pub fn get_string(&self, index: usize, path: &str) -> Result<String> {
        let _slot = ObjectSlot::acquire()?;
        let path = self.member_path(path)?;
        Ok(self.sample(index)?.0.get_string(&path)?)
    }

    /// Any primitive member, tagged with its kind.
    pub fn get_value(&self, index: usize, path: &str) -> Result<FieldValue> {
        let _slot = ObjectSlot::acquire()?;
        let path = self.member_path(path)?;
        Ok(self.sample(index)?.0.get_value(&path)?)
    }

    /// Boolean field of the sample info (`valid_data`).
    pub fn get_info_boolean(&self, index: usize, name: &str) -> Result<bool> {
        let _slot = ObjectSlot::acquire()?;
        self.info_member(index, name)?.as_bool().ok_or_else(|| {
            Error::TypeMismatch(format!("sample info field '{}' is not a boolean", name))
        })
    }

    /// One sample info field as JSON text.
    pub fn get_info_json(&self, index: usize, name: &str) -> Result<String> {
        let _slot = ObjectSlot::acquire()?;
        Ok(self.info_member(index, name)?.to_string())
    }

    pub fn get_info(&self, index: usize) -> Result<SampleInfo> {
        let _slot = ObjectSlot::acquire()?;
        Ok(self.sample(index)?.1)
    }

    pub fn get_json_sample(&self, index: usize) -> Result<String> {
        let _slot = ObjectSlot::acquire()?;
        Ok(self.sample(index)?.0.to_json().to_string())
    }

    pub fn get_json_member(&self, index: usize, path: &str) -> Result<String> {
        let _slot = ObjectSlot::acquire()?;
        let path = self.member_path(path)?;
        Ok(self.sample(index)?.0.member_to_json(&path)?.to_string())
    }

    /// Deserialize a loaded sample into a serde type.
    pub fn get_typed<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        let _slot = ObjectSlot::acquire()?;
        let json = self.sample(index)?.0.to_json();
        serde_json::from_value(json).map_err(|e| Error::InvalidJson(e.to_string()))
    }

    /// Direct access to a loaded sample. The guard holds a per-thread slot.
    pub fn native_sample(&self, index: usize) -> Result<NativeSample> {
        let slot = ObjectSlot::acquire()?;
        let (data, info) = self.sample(index)?;
        Ok(NativeSample {
            data,
            info,
            _slot: slot,
        })
    }

    /// Wait until the reader holds a sample not yet read or taken.
    pub fn wait_for_data(&self, timeout: Option<Duration>) -> Result<WaitOutcome<()>> {
        let _slot = ObjectSlot::acquire()?;
        Ok(self.entity.reader.wait_for_data(timeout))
    }

    /// Wait for the matched-writer count to change; yields the signed change.
    pub fn wait_for_matched_publication(
        &self,
        timeout: Option<Duration>,
    ) -> Result<WaitOutcome<i64>> {
        let _slot = ObjectSlot::acquire()?;
        Ok(self.entity.reader.matches().wait_for_change(timeout))
    }

    pub fn matched_publications(&self) -> Vec<MatchedEndpoint> {
        self.entity.reader.matches().snapshot()
    }

    /// Matched writers as a JSON array.
    pub fn get_matched_publications(&self) -> Result<String> {
        let _slot = ObjectSlot::acquire()?;
        serde_json::to_string(&self.matched_publications())
            .map_err(|e| Error::Runtime(e.to_string()))
    }

    fn sample(&self, index: usize) -> Result<LoanedSample> {
        let samples = self.entity.samples.lock();
        let i = self.base.to_internal(index, samples.len())?;
        samples
            .get(i)
            .cloned()
            .ok_or_else(|| Error::IndexOutOfRange(format!("sample index {}", index)))
    }

    /// Parse and schema-check a path before any sample is touched.
    fn member_path(&self, path: &str) -> Result<MemberPath> {
        let parsed = MemberPath::parse(path)?;
        member_type(&self.entity.reader.info().type_desc, &parsed)?;
        self.base.translate_path(parsed)
    }

    fn info_member(&self, index: usize, name: &str) -> Result<Value> {
        if !SampleInfo::FIELD_NAMES.contains(&name) {
            return Err(Error::FieldNotFound(format!("sample info field '{}'", name)));
        }
        let (_, info) = self.sample(index)?;
        info.member_json(name)
            .ok_or_else(|| Error::FieldNotFound(format!("sample info field '{}'", name)))
    }
}

impl std::fmt::Debug for Input<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Input")
            .field("name", &self.name)
            .field("reader", &self.entity.reader)
            .field("loaded", &self.entity.samples.lock().len())
            .finish()
    }
}

/// A loaned sample with its info. Holds one per-thread object slot.
pub struct NativeSample {
    data: Arc<DynamicData>,
    info: SampleInfo,
    _slot: ObjectSlot,
}

impl NativeSample {
    pub fn info(&self) -> &SampleInfo {
        &self.info
    }

    pub fn data(&self) -> &Arc<DynamicData> {
        &self.data
    }
}

impl Deref for NativeSample {
    type Target = DynamicData;

    fn deref(&self) -> &DynamicData {
        &self.data
    }
}

impl std::fmt::Debug for NativeSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeSample")
            .field("type", &self.data.type_name())
            .field("info", &self.info)
            .finish()
    }
}
