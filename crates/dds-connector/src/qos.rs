// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS policies honoured by the in-process runtime.

/// Reliability policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reliability {
    BestEffort,
    #[default]
    Reliable,
}

/// Durability policy. Ordered: a writer offers at least what a reader requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Durability {
    #[default]
    Volatile,
    TransientLocal,
}

/// History policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum History {
    /// Keep the last `n` samples per instance.
    KeepLast(u32),
    /// Keep everything up to `ResourceLimits::max_samples`.
    KeepAll,
}

impl Default for History {
    fn default() -> Self {
        History::KeepLast(1)
    }
}

/// Resource limits; `usize::MAX` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    pub max_samples: usize,
    pub max_instances: usize,
    pub max_samples_per_instance: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_samples: usize::MAX,
            max_instances: usize::MAX,
            max_samples_per_instance: usize::MAX,
        }
    }
}

/// QoS for one reader or writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndpointQos {
    pub reliability: Reliability,
    pub durability: Durability,
    pub history: History,
    pub resource_limits: ResourceLimits,
}

impl EndpointQos {
    pub fn reliable() -> Self {
        Self::default()
    }

    pub fn best_effort() -> Self {
        Self {
            reliability: Reliability::BestEffort,
            ..Self::default()
        }
    }

    pub fn keep_last(mut self, depth: u32) -> Self {
        self.history = History::KeepLast(depth);
        self
    }

    pub fn keep_all(mut self) -> Self {
        self.history = History::KeepAll;
        self
    }

    pub fn transient_local(mut self) -> Self {
        self.durability = Durability::TransientLocal;
        self
    }

    pub fn max_samples(mut self, max: usize) -> Self {
        self.resource_limits.max_samples = max;
        self
    }
}

/// Check QoS compatibility between writer and reader
///
/// - Reliable writer -> any reader: compatible
/// - BestEffort writer + BestEffort reader: compatible
/// - BestEffort writer + Reliable reader: INCOMPATIBLE
/// - Durability offered must be at least the durability requested
pub fn qos_compatible(writer: &EndpointQos, reader: &EndpointQos) -> bool {
    let reliability_ok = match (writer.reliability, reader.reliability) {
        (Reliability::Reliable, _) => true,
        (Reliability::BestEffort, Reliability::BestEffort) => true,
        (Reliability::BestEffort, Reliability::Reliable) => false,
    };
    reliability_ok && writer.durability >= reader.durability
}
