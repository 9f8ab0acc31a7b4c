// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sample metadata and the changes exchanged between endpoints.

use super::guid::Guid;
use crate::dynamic::{value_to_json, DynamicData};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in nanoseconds since the Unix epoch.
pub fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Identity of one published sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleIdentity {
    pub writer_guid: Guid,
    pub sequence_number: i64,
}

/// Instance handle: MD5 of the canonical JSON of the key members.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceHandle([u8; 16]);

impl InstanceHandle {
    /// Compute the handle of the instance `data` belongs to.
    pub fn of(data: &DynamicData) -> Self {
        use md5::{Digest, Md5};
        let descriptor = data.descriptor();
        let mut key = Map::new();
        for field in descriptor.key_fields() {
            if let Some(v) = data.value().get_field(&field.name) {
                key.insert(field.name.clone(), value_to_json(&field.type_desc, v));
            }
        }
        let canonical = Value::Object(key).to_string();
        let mut hasher = Md5::new();
        hasher.update(canonical.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceHandle(")?;
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "...)")
    }
}

/// Instance lifecycle state, as seen by a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceState {
    Alive,
    NotAliveDisposed,
    NotAliveNoWriters,
}

/// Whether the reader has seen this instance before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewState {
    New,
    NotNew,
}

/// Whether this sample was returned by an earlier read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SampleState {
    Read,
    NotRead,
}

/// Metadata delivered alongside each sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleInfo {
    pub valid_data: bool,
    pub source_timestamp: i64,
    pub reception_timestamp: i64,
    pub sample_identity: SampleIdentity,
    pub related_sample_identity: Option<SampleIdentity>,
    pub instance_handle: InstanceHandle,
    pub instance_state: InstanceState,
    pub view_state: ViewState,
    pub sample_state: SampleState,
}

impl SampleInfo {
    /// Names accepted by [`SampleInfo::member_json`].
    pub const FIELD_NAMES: [&'static str; 9] = [
        "valid_data",
        "source_timestamp",
        "reception_timestamp",
        "sample_identity",
        "related_sample_identity",
        "instance_handle",
        "instance_state",
        "view_state",
        "sample_state",
    ];

    /// All fields as a JSON object.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// One field as JSON, `None` for unknown names.
    pub fn member_json(&self, name: &str) -> Option<Value> {
        match self.to_json() {
            Value::Object(mut map) => map.remove(name),
            _ => None,
        }
    }
}

/// What a change does to its instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    #[default]
    Write,
    Dispose,
    Unregister,
}

/// One published change, shared by every matched reader.
#[derive(Debug, Clone)]
pub struct Change {
    pub kind: ChangeKind,
    pub data: Arc<DynamicData>,
    pub instance: InstanceHandle,
    pub writer: Guid,
    pub source_timestamp: i64,
    pub identity: SampleIdentity,
    pub related: Option<SampleIdentity>,
}

impl Change {
    /// Info for a freshly received change; states are filled in on access.
    pub(crate) fn info(&self) -> SampleInfo {
        SampleInfo {
            valid_data: self.kind == ChangeKind::Write,
            source_timestamp: self.source_timestamp,
            reception_timestamp: now_nanos(),
            sample_identity: self.identity,
            related_sample_identity: self.related,
            instance_handle: self.instance,
            instance_state: InstanceState::Alive,
            view_state: ViewState::New,
            sample_state: SampleState::NotRead,
        }
    }
}
