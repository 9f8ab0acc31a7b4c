// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connector configuration.
//!
//! A configuration source is either inline text (`str://"..."`) or a
//! `;`-separated list of files merged in order. The selected participant's
//! readers and writers are resolved into [`ParticipantConfig`].

mod types;
mod yaml;

pub use types::TypeResolver;
pub use yaml::{
    ConfigDocument, YamlEndpoint, YamlEnumerator, YamlHistory, YamlLoader, YamlMember,
    YamlParticipant, YamlQosProfile, YamlResourceLimits, YamlType,
};

use crate::dynamic::TypeDescriptor;
use crate::qos::EndpointQos;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

const INLINE_PREFIX: &str = "str://";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A configuration file could not be read.
    Io { path: String, message: String },
    /// Document is not valid YAML or has an unexpected shape.
    Parse(String),
    /// No participant with this configuration name.
    UnknownConfiguration(String),
    /// Reference to an undefined type.
    UnknownType(String),
    /// Type definition refers back to itself.
    RecursiveType(String),
    /// Structurally invalid type definition.
    InvalidType(String),
    /// Reference to an undefined QoS profile.
    UnknownQosProfile(String),
    /// Invalid QoS value.
    InvalidQos(String),
    /// Two readers or two writers share a name.
    DuplicateEntity(String),
    /// Empty configuration source.
    EmptySource,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => write!(f, "cannot read '{}': {}", path, message),
            ConfigError::Parse(msg) => write!(f, "parse error: {}", msg),
            ConfigError::UnknownConfiguration(name) => {
                write!(f, "configuration '{}' not found", name)
            }
            ConfigError::UnknownType(name) => write!(f, "unknown type '{}'", name),
            ConfigError::RecursiveType(chain) => write!(f, "recursive type: {}", chain),
            ConfigError::InvalidType(msg) => write!(f, "invalid type: {}", msg),
            ConfigError::UnknownQosProfile(name) => write!(f, "unknown QoS profile '{}'", name),
            ConfigError::InvalidQos(msg) => write!(f, "invalid QoS: {}", msg),
            ConfigError::DuplicateEntity(name) => write!(f, "duplicate entity '{}'", name),
            ConfigError::EmptySource => write!(f, "empty configuration source"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where configuration text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Inline document.
    Inline(String),
    /// Files, merged in order; later definitions win.
    Files(Vec<PathBuf>),
}

impl ConfigSource {
    /// Interpret a source string.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let trimmed = source.trim();
        if let Some(inline) = trimmed.strip_prefix(INLINE_PREFIX) {
            let inline = inline.trim();
            let body = inline
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(inline);
            return Ok(ConfigSource::Inline(body.to_string()));
        }
        let files: Vec<PathBuf> = trimmed
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
        if files.is_empty() {
            return Err(ConfigError::EmptySource);
        }
        Ok(ConfigSource::Files(files))
    }

    /// Read and merge the document(s).
    pub fn load(&self) -> Result<ConfigDocument, ConfigError> {
        match self {
            ConfigSource::Inline(text) => YamlLoader::parse_yaml(text),
            ConfigSource::Files(paths) => {
                let mut doc = ConfigDocument::default();
                for path in paths {
                    log::debug!("[config] loading {}", path.display());
                    YamlLoader::merge(&mut doc, YamlLoader::load_from_file(path)?);
                }
                Ok(doc)
            }
        }
    }
}

/// A resolved reader or writer.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub name: String,
    pub topic: String,
    pub type_desc: Arc<TypeDescriptor>,
    pub qos: EndpointQos,
}

/// A resolved participant.
#[derive(Debug, Clone)]
pub struct ParticipantConfig {
    pub name: String,
    pub domain_id: u32,
    pub writers: Vec<EndpointConfig>,
    pub readers: Vec<EndpointConfig>,
}

/// Load the participant `config_name` from `source`.
pub fn load_participant(config_name: &str, source: &str) -> Result<ParticipantConfig, ConfigError> {
    let doc = ConfigSource::parse(source)?.load()?;
    resolve_participant(&doc, config_name)
}

/// Resolve a participant from an already loaded document.
pub fn resolve_participant(
    doc: &ConfigDocument,
    config_name: &str,
) -> Result<ParticipantConfig, ConfigError> {
    let participant = doc
        .participants
        .get(config_name)
        .ok_or_else(|| ConfigError::UnknownConfiguration(config_name.to_string()))?;

    let mut resolver = TypeResolver::new(&doc.types);
    let writers = resolve_endpoints(doc, &mut resolver, &participant.writers)?;
    let readers = resolve_endpoints(doc, &mut resolver, &participant.readers)?;

    log::debug!(
        "[config] participant '{}' domain={} writers={} readers={}",
        config_name,
        participant.domain_id,
        writers.len(),
        readers.len()
    );

    Ok(ParticipantConfig {
        name: config_name.to_string(),
        domain_id: participant.domain_id,
        writers,
        readers,
    })
}

fn resolve_endpoints(
    doc: &ConfigDocument,
    resolver: &mut TypeResolver<'_>,
    endpoints: &[YamlEndpoint],
) -> Result<Vec<EndpointConfig>, ConfigError> {
    let mut names = HashSet::new();
    let mut resolved = Vec::with_capacity(endpoints.len());
    for ep in endpoints {
        if !names.insert(ep.name.as_str()) {
            return Err(ConfigError::DuplicateEntity(ep.name.clone()));
        }
        let type_desc = resolver.resolve(&ep.type_name)?;
        if !type_desc.is_struct() {
            return Err(ConfigError::InvalidType(format!(
                "topic type '{}' of '{}' is not a struct",
                ep.type_name, ep.name
            )));
        }
        resolved.push(EndpointConfig {
            name: ep.name.clone(),
            topic: ep.topic.clone(),
            type_desc,
            qos: YamlLoader::endpoint_qos(doc, ep)?,
        });
    }
    Ok(resolved)
}
