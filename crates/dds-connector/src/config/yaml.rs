// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML configuration loader.
//!
//! One document describes types, named QoS profiles and participants with
//! their readers and writers. JSON documents are accepted as well, since
//! YAML is a superset.
//!
//! # Example YAML
//!
//! ```yaml
//! types:
//!   ShapeType:
//!     members:
//!       - { name: color, type: string, key: true, string_max_length: 128 }
//!       - { name: x, type: int32 }
//!       - { name: y, type: int32 }
//!
//! qos_profiles:
//!   reliable_shapes:
//!     reliability: RELIABLE
//!     durability: TRANSIENT_LOCAL
//!     history:
//!       kind: KEEP_LAST
//!       depth: 10
//!
//! participants:
//!   "MyParticipantLibrary::Zero":
//!     domain_id: 0
//!     writers:
//!       - name: "MyPublisher::MySquareWriter"
//!         topic: Square
//!         type: ShapeType
//!         qos_profile: reliable_shapes
//!     readers:
//!       - name: "MySubscriber::MySquareReader"
//!         topic: Square
//!         type: ShapeType
//! ```

use crate::config::ConfigError;
use crate::qos::{Durability, EndpointQos, History, Reliability};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// YAML configuration loader.
pub struct YamlLoader;

/// Root document structure.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigDocument {
    /// Named struct and enum types.
    pub types: HashMap<String, YamlType>,

    /// Named QoS profiles.
    pub qos_profiles: HashMap<String, YamlQosProfile>,

    /// Participants keyed by configuration name.
    pub participants: HashMap<String, YamlParticipant>,
}

/// A named type: a struct (`members`) or an enum (`enumerators`).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlType {
    #[serde(default)]
    pub members: Option<Vec<YamlMember>>,
    #[serde(default)]
    pub enumerators: Option<Vec<YamlEnumerator>>,
}

/// One struct member.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlMember {
    pub name: String,
    /// Primitive name or the name of another type
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub key: bool,
    #[serde(default)]
    pub string_max_length: Option<usize>,
    /// -1 = unbounded
    #[serde(default)]
    pub sequence_max_length: Option<i64>,
    #[serde(default)]
    pub array_dimensions: Option<Vec<usize>>,
}

/// One enumerator; values auto-increment when omitted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlEnumerator {
    pub name: String,
    #[serde(default)]
    pub value: Option<i64>,
}

/// A QoS profile (or inline endpoint QoS).
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct YamlQosProfile {
    /// Reliability: RELIABLE or BEST_EFFORT
    pub reliability: Option<String>,

    /// Durability: VOLATILE or TRANSIENT_LOCAL
    pub durability: Option<String>,

    /// History configuration
    pub history: Option<YamlHistory>,

    /// Resource limits
    pub resource_limits: Option<YamlResourceLimits>,
}

/// History QoS in YAML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlHistory {
    /// KEEP_LAST or KEEP_ALL
    pub kind: String,
    /// Depth for KEEP_LAST
    #[serde(default = "default_history_depth")]
    pub depth: u32,
}

fn default_history_depth() -> u32 {
    1
}

/// Resource limits in YAML (-1 = unlimited).
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct YamlResourceLimits {
    pub max_samples: i32,
    pub max_instances: i32,
    pub max_samples_per_instance: i32,
}

impl Default for YamlResourceLimits {
    fn default() -> Self {
        Self {
            max_samples: -1,
            max_instances: -1,
            max_samples_per_instance: -1,
        }
    }
}

/// A participant definition.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct YamlParticipant {
    pub domain_id: u32,
    pub writers: Vec<YamlEndpoint>,
    pub readers: Vec<YamlEndpoint>,
}

/// A reader or writer definition.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlEndpoint {
    pub name: String,
    pub topic: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub qos_profile: Option<String>,
    #[serde(default)]
    pub qos: Option<YamlQosProfile>,
}

impl YamlLoader {
    /// Load a configuration document from a file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ConfigDocument, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse_yaml(&content)
    }

    /// Parse YAML content.
    pub fn parse_yaml(yaml_content: &str) -> Result<ConfigDocument, ConfigError> {
        serde_yaml::from_str(yaml_content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Fold `other` into `base`; definitions in `other` win by name.
    pub fn merge(base: &mut ConfigDocument, other: ConfigDocument) {
        base.types.extend(other.types);
        base.qos_profiles.extend(other.qos_profiles);
        base.participants.extend(other.participants);
    }

    /// QoS for an endpoint: named profile first, then inline overrides.
    pub fn endpoint_qos(
        doc: &ConfigDocument,
        endpoint: &YamlEndpoint,
    ) -> Result<EndpointQos, ConfigError> {
        let mut qos = EndpointQos::default();
        if let Some(ref name) = endpoint.qos_profile {
            let profile = doc
                .qos_profiles
                .get(name)
                .ok_or_else(|| ConfigError::UnknownQosProfile(name.clone()))?;
            Self::apply_profile(&mut qos, profile)?;
        }
        if let Some(ref inline) = endpoint.qos {
            Self::apply_profile(&mut qos, inline)?;
        }
        Ok(qos)
    }

    /// Convert YAML profile to QoS.
    pub fn profile_to_qos(profile: &YamlQosProfile) -> Result<EndpointQos, ConfigError> {
        let mut qos = EndpointQos::default();
        Self::apply_profile(&mut qos, profile)?;
        Ok(qos)
    }

    fn apply_profile(qos: &mut EndpointQos, profile: &YamlQosProfile) -> Result<(), ConfigError> {
        // Reliability
        if let Some(ref rel) = profile.reliability {
            qos.reliability = match rel.to_uppercase().as_str() {
                "RELIABLE" => Reliability::Reliable,
                "BEST_EFFORT" => Reliability::BestEffort,
                other => {
                    return Err(ConfigError::InvalidQos(format!(
                        "Invalid reliability: {}",
                        other
                    )))
                }
            };
        }

        // Durability
        if let Some(ref dur) = profile.durability {
            qos.durability = match dur.to_uppercase().as_str() {
                "VOLATILE" => Durability::Volatile,
                "TRANSIENT_LOCAL" => Durability::TransientLocal,
                other => {
                    return Err(ConfigError::InvalidQos(format!(
                        "Invalid durability: {}",
                        other
                    )))
                }
            };
        }

        // History
        if let Some(ref hist) = profile.history {
            qos.history = match hist.kind.to_uppercase().as_str() {
                "KEEP_LAST" if hist.depth == 0 => {
                    return Err(ConfigError::InvalidQos(
                        "KEEP_LAST depth must be at least 1".into(),
                    ))
                }
                "KEEP_LAST" => History::KeepLast(hist.depth),
                "KEEP_ALL" => History::KeepAll,
                other => {
                    return Err(ConfigError::InvalidQos(format!(
                        "Invalid history kind: {}",
                        other
                    )))
                }
            };
        }

        // Resource limits
        if let Some(ref limits) = profile.resource_limits {
            let unlimited = |v: i32| usize::try_from(v).unwrap_or(usize::MAX);
            if limits.max_samples == 0 {
                return Err(ConfigError::InvalidQos(
                    "max_samples must be positive or -1".into(),
                ));
            }
            qos.resource_limits.max_samples = unlimited(limits.max_samples);
            qos.resource_limits.max_instances = unlimited(limits.max_instances);
            qos.resource_limits.max_samples_per_instance =
                unlimited(limits.max_samples_per_instance);
        }

        Ok(())
    }
}
