// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Domain Registry for in-process endpoint matching
//!
//! Every connector joins a domain; its readers and writers register here and
//! are bound to each other when they share (topic, type) and are compatible.
//!
//! # Architecture
//!
//! ```text
//! DomainRegistry (static global)
//! +-- domains: Mutex<HashMap<DomainId, Weak<DomainState>>>
//!
//! DomainState (one per domain, per process)
//! +-- domain_id: u32
//! +-- endpoints: RwLock<HashMap<MatchKey, Vec<LocalEndpoint>>>
//! +-- [strong ref held by each Connector]
//!
//! MatchKey
//! +-- topic_name: Arc<str>
//! +-- type_id: TypeId  (MD5-14 of the type name)
//! ```
//!
//! # Binding Flow
//!
//! 1. Writer registered -> bound to every compatible reader already present
//! 2. Reader registered -> bound to every compatible writer already present
//! 3. Reader dropped -> removed from its writers
//! 4. Writer dropped -> its readers see the writer disappear

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, Weak};

use super::endpoint::{endpoints_compatible, ReaderEndpoint, WriterEndpoint};
use super::guid::Guid;

/// Domain ID type
pub type DomainId = u32;

/// Type identifier for matching endpoints
///
/// MD5 hash of type_name, truncated to 14 bytes. Structural equality of the
/// descriptors is checked separately when binding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId([u8; 14]);

impl TypeId {
    /// Create TypeId from type name using MD5
    pub fn from_type_name(type_name: &str) -> Self {
        use md5::{Digest, Md5};
        let mut hasher = Md5::new();
        hasher.update(type_name.as_bytes());
        let result = hasher.finalize();
        let mut bytes = [0u8; 14];
        bytes.copy_from_slice(&result[..14]);
        Self(bytes)
    }

    /// Get raw bytes
    pub const fn as_bytes(&self) -> &[u8; 14] {
        &self.0
    }
}

impl std::fmt::Debug for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeId(")?;
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "...)")
    }
}

/// Match key for endpoint lookup
///
/// Two endpoints are candidates if they have the same (topic_name, type_id).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    /// Topic name
    pub topic_name: Arc<str>,
    /// Type identifier (MD5 of type name)
    pub type_id: TypeId,
}

impl MatchKey {
    /// Create match key from topic and type names
    pub fn from_names(topic_name: &str, type_name: &str) -> Self {
        Self {
            topic_name: Arc::from(topic_name),
            type_id: TypeId::from_type_name(type_name),
        }
    }
}

impl std::fmt::Debug for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchKey")
            .field("topic", &self.topic_name)
            .field("type_id", &self.type_id)
            .finish()
    }
}

/// Kind of local endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Reader,
    Writer,
}

/// Local endpoint entry in the registry
#[derive(Debug, Clone)]
enum LocalEndpoint {
    Writer(Arc<WriterEndpoint>),
    Reader(Arc<ReaderEndpoint>),
}

impl LocalEndpoint {
    fn guid(&self) -> Guid {
        match self {
            LocalEndpoint::Writer(w) => w.guid(),
            LocalEndpoint::Reader(r) => r.guid(),
        }
    }

    fn kind(&self) -> EndpointKind {
        match self {
            LocalEndpoint::Writer(_) => EndpointKind::Writer,
            LocalEndpoint::Reader(_) => EndpointKind::Reader,
        }
    }
}

/// Token returned when registering an endpoint
///
/// When dropped, automatically unregisters the endpoint from the domain.
pub struct BindToken {
    domain: Weak<DomainState>,
    key: MatchKey,
    guid: Guid,
}

impl BindToken {
    fn new(domain: &Arc<DomainState>, key: MatchKey, guid: Guid) -> Self {
        Self {
            domain: Arc::downgrade(domain),
            key,
            guid,
        }
    }
}

impl Drop for BindToken {
    fn drop(&mut self) {
        if let Some(domain) = self.domain.upgrade() {
            domain.unregister(&self.key, self.guid);
        }
    }
}

impl std::fmt::Debug for BindToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindToken")
            .field("key", &self.key)
            .field("guid", &self.guid)
            .finish()
    }
}

/// Domain state - holds all endpoints for a single domain
pub struct DomainState {
    /// Domain ID
    pub domain_id: DomainId,
    /// Endpoints grouped by (topic, type_id)
    endpoints: RwLock<HashMap<MatchKey, Vec<LocalEndpoint>>>,
}

impl DomainState {
    /// Create new domain state
    pub fn new(domain_id: DomainId) -> Self {
        Self {
            domain_id,
            endpoints: RwLock::new(HashMap::new()),
        }
    }

    /// Register a writer endpoint
    ///
    /// Returns a BindToken that unregisters on drop. Binds every existing
    /// compatible reader.
    pub fn register_writer(self: &Arc<Self>, writer: Arc<WriterEndpoint>) -> BindToken {
        let info = writer.info();
        let key = MatchKey::from_names(&info.topic, &info.type_desc.name);
        let mut endpoints = self.endpoints.write().unwrap_or_else(|e| e.into_inner());

        let entries = endpoints.entry(key.clone()).or_default();
        for existing in entries.iter() {
            if let LocalEndpoint::Reader(reader) = existing {
                if endpoints_compatible(info, reader.info()) {
                    writer.bind(reader);
                }
            }
        }

        let guid = writer.guid();
        entries.push(LocalEndpoint::Writer(writer));
        log::debug!(
            "[DomainRegistry] Registered writer {} on topic '{}' (domain {})",
            guid,
            key.topic_name,
            self.domain_id
        );
        BindToken::new(self, key, guid)
    }

    /// Register a reader endpoint
    ///
    /// Returns a BindToken that unregisters on drop. Binds to every existing
    /// compatible writer.
    pub fn register_reader(self: &Arc<Self>, reader: Arc<ReaderEndpoint>) -> BindToken {
        let info = reader.info();
        let key = MatchKey::from_names(&info.topic, &info.type_desc.name);
        let mut endpoints = self.endpoints.write().unwrap_or_else(|e| e.into_inner());

        let entries = endpoints.entry(key.clone()).or_default();
        for existing in entries.iter() {
            if let LocalEndpoint::Writer(writer) = existing {
                if endpoints_compatible(writer.info(), info) {
                    writer.bind(&reader);
                }
            }
        }

        let guid = reader.guid();
        entries.push(LocalEndpoint::Reader(reader));
        log::debug!(
            "[DomainRegistry] Registered reader {} on topic '{}' (domain {})",
            guid,
            key.topic_name,
            self.domain_id
        );
        BindToken::new(self, key, guid)
    }

    /// Unregister an endpoint (called by BindToken::drop)
    fn unregister(&self, key: &MatchKey, guid: Guid) {
        let mut endpoints = self.endpoints.write().unwrap_or_else(|e| e.into_inner());

        if let Some(entries) = endpoints.get_mut(key) {
            if let Some(pos) = entries.iter().position(|e| e.guid() == guid) {
                match entries.remove(pos) {
                    LocalEndpoint::Writer(writer) => writer.unbind_all(),
                    LocalEndpoint::Reader(reader) => {
                        for entry in entries.iter() {
                            if let LocalEndpoint::Writer(writer) = entry {
                                writer.unbind(&reader);
                            }
                        }
                    }
                }
            }

            // Clean up empty entry lists
            if entries.is_empty() {
                endpoints.remove(key);
            }
        }

        log::debug!(
            "[DomainRegistry] Unregistered endpoint {} from topic '{}'",
            guid,
            key.topic_name
        );
    }

    /// Get count of endpoints
    pub fn endpoint_count(&self) -> usize {
        let endpoints = self.endpoints.read().unwrap_or_else(|e| e.into_inner());
        endpoints.values().map(|v| v.len()).sum()
    }

    /// Get count of endpoints of one kind for a specific key
    pub fn endpoint_count_for_key(&self, key: &MatchKey, kind: EndpointKind) -> usize {
        let endpoints = self.endpoints.read().unwrap_or_else(|e| e.into_inner());
        endpoints
            .get(key)
            .map(|v| v.iter().filter(|e| e.kind() == kind).count())
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for DomainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainState")
            .field("domain_id", &self.domain_id)
            .field("endpoint_count", &self.endpoint_count())
            .finish()
    }
}

/// Global domain registry (singleton)
///
/// Thread-safe access to domain states across the process.
pub struct DomainRegistry {
    domains: Mutex<HashMap<DomainId, Weak<DomainState>>>,
}

impl DomainRegistry {
    fn new() -> Self {
        Self {
            domains: Mutex::new(HashMap::new()),
        }
    }

    /// Get the global registry instance
    pub fn global() -> &'static DomainRegistry {
        use std::sync::OnceLock;
        static REGISTRY: OnceLock<DomainRegistry> = OnceLock::new();
        REGISTRY.get_or_init(DomainRegistry::new)
    }

    /// Get or create domain state for a domain ID
    ///
    /// The caller (Connector) holds the returned Arc to keep the domain alive.
    pub fn get_or_create(&self, domain_id: DomainId) -> Arc<DomainState> {
        let mut domains = self.domains.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(weak) = domains.get(&domain_id) {
            if let Some(strong) = weak.upgrade() {
                return strong;
            }
        }

        let state = Arc::new(DomainState::new(domain_id));
        domains.insert(domain_id, Arc::downgrade(&state));

        log::info!(
            "[DomainRegistry] Created domain state for domain_id={}",
            domain_id
        );

        state
    }

    /// Try to get existing domain state
    pub fn get(&self, domain_id: DomainId) -> Option<Arc<DomainState>> {
        let domains = self.domains.lock().unwrap_or_else(|e| e.into_inner());
        domains.get(&domain_id).and_then(|w| w.upgrade())
    }

    /// Drop references to domains no connector uses any more
    pub fn cleanup_expired(&self) {
        let mut domains = self.domains.lock().unwrap_or_else(|e| e.into_inner());
        domains.retain(|_, weak| weak.strong_count() > 0);
    }
}
