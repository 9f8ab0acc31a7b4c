// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Endpoint GUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Entity kind byte for user writers (with key), as in RTPS.
pub const ENTITY_KIND_WRITER: u8 = 0x02;
/// Entity kind byte for user readers (with key), as in RTPS.
pub const ENTITY_KIND_READER: u8 = 0x07;

static PARTICIPANT_COUNTER: AtomicU32 = AtomicU32::new(1);

/// 16-byte identifier: 12-byte participant prefix + 4-byte entity id.
///
/// # Display Format
/// Hex with dots: "01.0f.ac.10.00.00.00.00.00.00.00.01.00.00.01.c1"
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 16]", into = "[u8; 16]")]
pub struct Guid {
    pub prefix: [u8; 12],
    pub entity_id: [u8; 4],
}

impl Guid {
    /// Create GUID from raw bytes (16 bytes total)
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut prefix = [0u8; 12];
        let mut entity_id = [0u8; 4];
        prefix.copy_from_slice(&bytes[0..12]);
        entity_id.copy_from_slice(&bytes[12..16]);
        Self { prefix, entity_id }
    }

    /// Create GUID from separate prefix and entity ID
    pub fn new(prefix: [u8; 12], entity_id: [u8; 4]) -> Self {
        Self { prefix, entity_id }
    }

    /// Endpoint GUID under `prefix`: 3-byte index followed by the kind byte.
    pub fn endpoint(prefix: [u8; 12], index: u32, kind: u8) -> Self {
        let idx = index.to_be_bytes();
        Self::new(prefix, [idx[1], idx[2], idx[3], kind])
    }

    /// Convert GUID to 16-byte array
    pub fn as_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..12].copy_from_slice(&self.prefix);
        bytes[12..16].copy_from_slice(&self.entity_id);
        bytes
    }

    /// Create GUID with all zeros (invalid/placeholder)
    pub fn zero() -> Self {
        Self {
            prefix: [0; 12],
            entity_id: [0; 4],
        }
    }

    /// Check if GUID is zero (invalid)
    pub fn is_zero(&self) -> bool {
        self.prefix.iter().all(|&b| b == 0) && self.entity_id.iter().all(|&b| b == 0)
    }

    /// Participant prefix as a contiguous hex string.
    pub fn prefix_hex(&self) -> String {
        self.prefix.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Allocate a prefix unique within this process and unlikely to collide
/// across processes.
///
/// # Layout
/// - bytes 0-3: process id
/// - bytes 4-7: per-process participant counter
/// - bytes 8-11: low bits of the creation time (ns)
pub fn new_participant_prefix() -> [u8; 12] {
    let mut prefix = [0u8; 12];
    prefix[0..4].copy_from_slice(&std::process::id().to_be_bytes());
    let counter = PARTICIPANT_COUNTER.fetch_add(1, Ordering::Relaxed);
    prefix[4..8].copy_from_slice(&counter.to_be_bytes());
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    prefix[8..12].copy_from_slice(&nanos.to_be_bytes());
    prefix
}

impl From<[u8; 16]> for Guid {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Guid> for [u8; 16] {
    fn from(guid: Guid) -> Self {
        guid.as_bytes()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.as_bytes();
        for (i, byte) in bytes.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GUID({})", self)
    }
}
