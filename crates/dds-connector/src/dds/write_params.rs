// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Optional parameters of a write, supplied as JSON.
//!
//! ```json
//! { "action": "dispose", "source_timestamp": 1700000000000000000,
//!   "identity": { "writer_guid": [0, 1, ...], "sequence_number": 12 },
//!   "related_sample_identity": { "writer_guid": [...], "sequence_number": 3 } }
//! ```

use super::{Error, Result};
use crate::domain::{ChangeKind, SampleIdentity};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriteParams {
    /// `write` (default), `dispose` or `unregister`.
    pub action: ChangeKind,
    /// Nanoseconds since the Unix epoch; now when absent.
    pub source_timestamp: Option<i64>,
    /// Overrides the writer-assigned identity.
    pub identity: Option<SampleIdentity>,
    pub related_sample_identity: Option<SampleIdentity>,
}

impl WriteParams {
    /// Parse; blank input means no parameters.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| Error::InvalidJson(format!("write params: {}", e)))
    }
}
