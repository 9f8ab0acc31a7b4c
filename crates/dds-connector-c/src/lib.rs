// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Connector C FFI Bindings
//!
//! C-compatible entry points over [`dds_connector::Connector`].
//!
//! Every operation returns a [`ConnectorRetcode`]. On failure the message
//! and its [`ConnectorErrorKind`] are stored in a process-wide slot readable
//! through [`connector_get_last_error_message`] and
//! [`connector_get_last_error_kind`]. Several kinds share
//! `CONNECTOR_BAD_PARAMETER`; the kind tells them apart. A wait that times
//! out returns `CONNECTOR_TIMEOUT` and leaves the slot untouched.
//!
//! Strings handed out by this library are owned by the caller and must be
//! released with [`connector_free_string`].
//!
//! # Safety
//!
//! All public functions are `unsafe` and require the caller to uphold the
//! invariants documented in each function's safety comment.

mod instance;
mod logging;
mod sample;
mod wait;

pub use instance::*;
pub use logging::*;
pub use sample::*;
pub use wait::*;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::ptr;
use std::sync::{Arc, Mutex, MutexGuard};

use dds_connector::{Connector, ConnectorOptions, DynamicData, Error, SampleInfo};
use libc::{c_char, c_int};

/// Opaque handle to a connector
#[repr(C)]
pub struct DdsConnector {
    _private: [u8; 0],
}

/// Opaque handle to a connector input (data reader)
#[repr(C)]
pub struct DdsDataReader {
    _private: [u8; 0],
}

/// Opaque handle to a connector output (data writer)
#[repr(C)]
pub struct DdsDataWriter {
    _private: [u8; 0],
}

/// Opaque handle to a loaded sample
#[repr(C)]
pub struct DdsNativeSample {
    _private: [u8; 0],
}

/// Return codes for connector operations.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorRetcode {
    /// Operation completed successfully
    ConnectorOk = 0,
    /// Generic failure (configuration, runtime)
    ConnectorError = 1,
    /// Operation not supported for this member or configuration
    ConnectorUnsupported = 2,
    /// Bad argument: unknown entity, index, field, JSON or NULL pointer
    ConnectorBadParameter = 3,
    /// Per-thread object cap reached
    ConnectorOutOfResources = 5,
    /// Handle is NULL or already released
    ConnectorAlreadyDeleted = 9,
    /// Wait ended at its deadline (not an error)
    ConnectorTimeout = 10,
}

impl From<&Error> for ConnectorRetcode {
    fn from(e: &Error) -> Self {
        match e {
            Error::Configuration(_) | Error::Runtime(_) => ConnectorRetcode::ConnectorError,
            Error::EntityNotFound(_)
            | Error::IndexOutOfRange(_)
            | Error::FieldNotFound(_)
            | Error::TypeMismatch(_)
            | Error::InvalidJson(_)
            | Error::InvalidArgument(_) => ConnectorRetcode::ConnectorBadParameter,
            Error::UnsupportedOperation(_) => ConnectorRetcode::ConnectorUnsupported,
            Error::ResourceExhausted(_) => ConnectorRetcode::ConnectorOutOfResources,
        }
    }
}

/// Kind of the most recent failure, finer than its [`ConnectorRetcode`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorErrorKind {
    /// No failure recorded
    ConnectorErrorNone = 0,
    ConnectorErrorConfiguration = 1,
    ConnectorErrorRuntime = 2,
    ConnectorErrorEntityNotFound = 3,
    ConnectorErrorIndexOutOfRange = 4,
    ConnectorErrorFieldNotFound = 5,
    ConnectorErrorTypeMismatch = 6,
    ConnectorErrorInvalidJson = 7,
    ConnectorErrorInvalidArgument = 8,
    ConnectorErrorUnsupportedOperation = 9,
    ConnectorErrorResourceExhausted = 10,
    /// A NULL handle was passed
    ConnectorErrorAlreadyDeleted = 11,
}

impl From<&Error> for ConnectorErrorKind {
    fn from(e: &Error) -> Self {
        match e {
            Error::Configuration(_) => ConnectorErrorKind::ConnectorErrorConfiguration,
            Error::Runtime(_) => ConnectorErrorKind::ConnectorErrorRuntime,
            Error::EntityNotFound(_) => ConnectorErrorKind::ConnectorErrorEntityNotFound,
            Error::IndexOutOfRange(_) => ConnectorErrorKind::ConnectorErrorIndexOutOfRange,
            Error::FieldNotFound(_) => ConnectorErrorKind::ConnectorErrorFieldNotFound,
            Error::TypeMismatch(_) => ConnectorErrorKind::ConnectorErrorTypeMismatch,
            Error::InvalidJson(_) => ConnectorErrorKind::ConnectorErrorInvalidJson,
            Error::InvalidArgument(_) => ConnectorErrorKind::ConnectorErrorInvalidArgument,
            Error::UnsupportedOperation(_) => {
                ConnectorErrorKind::ConnectorErrorUnsupportedOperation
            }
            Error::ResourceExhausted(_) => ConnectorErrorKind::ConnectorErrorResourceExhausted,
        }
    }
}

/// Connector creation options. `0` disables, any other value enables.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DdsConnectorOptions {
    /// Inputs notify the connector-wide data wait (default 1)
    pub enable_on_data_event: c_int,
    /// Sample and element indexes start at 1 (default 0)
    pub one_based_sequence_indexing: c_int,
}

impl Default for DdsConnectorOptions {
    fn default() -> Self {
        let options = ConnectorOptions::default();
        Self {
            enable_on_data_event: c_int::from(options.enable_data_event),
            one_based_sequence_indexing: c_int::from(options.one_based_indexing),
        }
    }
}

impl From<DdsConnectorOptions> for ConnectorOptions {
    fn from(options: DdsConnectorOptions) -> Self {
        ConnectorOptions::default()
            .data_event(options.enable_on_data_event != 0)
            .one_based(options.one_based_sequence_indexing != 0)
    }
}

// ============================================================================
// Last error
// ============================================================================

struct LastError {
    kind: ConnectorErrorKind,
    message: Option<CString>,
}

static LAST_ERROR: Mutex<LastError> = Mutex::new(LastError {
    kind: ConnectorErrorKind::ConnectorErrorNone,
    message: None,
});

fn last_error_slot() -> MutexGuard<'static, LastError> {
    LAST_ERROR.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

pub(crate) fn set_last_error(kind: ConnectorErrorKind, message: &str) {
    let sanitized = message.replace('\0', " ");
    let mut slot = last_error_slot();
    slot.kind = kind;
    slot.message = CString::new(sanitized).ok();
}

/// Store the error message and map the error to its return code.
pub(crate) fn fail(e: &Error) -> ConnectorRetcode {
    log::debug!("[connector-c] {}", e);
    set_last_error(ConnectorErrorKind::from(e), &e.to_string());
    ConnectorRetcode::from(e)
}

pub(crate) fn finish(result: dds_connector::Result<()>) -> ConnectorRetcode {
    match result {
        Ok(()) => ConnectorRetcode::ConnectorOk,
        Err(e) => fail(&e),
    }
}

pub(crate) fn deleted(what: &str) -> ConnectorRetcode {
    set_last_error(
        ConnectorErrorKind::ConnectorErrorAlreadyDeleted,
        &format!("{} handle is NULL", what),
    );
    ConnectorRetcode::ConnectorAlreadyDeleted
}

// ============================================================================
// Argument helpers
// ============================================================================

/// Borrow a NUL-terminated UTF-8 argument.
///
/// # Safety
/// `ptr` must be NULL or a valid NUL-terminated string outliving `'a`.
pub(crate) unsafe fn c_str<'a>(ptr: *const c_char, what: &str) -> dds_connector::Result<&'a str> {
    if ptr.is_null() {
        return Err(Error::InvalidArgument(format!("{} is NULL", what)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| Error::InvalidArgument(format!("{} is not valid UTF-8", what)))
}

pub(crate) fn index(value: c_int) -> dds_connector::Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::IndexOutOfRange(format!("negative sample index {}", value)))
}

/// Hand a string to the caller; release with [`connector_free_string`].
pub(crate) fn into_c_string(value: String) -> dds_connector::Result<*mut c_char> {
    CString::new(value)
        .map(CString::into_raw)
        .map_err(|_| Error::Runtime("string contains an interior NUL byte".into()))
}

pub(crate) fn require_out<T>(out: *mut T, what: &str) -> dds_connector::Result<()> {
    if out.is_null() {
        Err(Error::InvalidArgument(format!("{} is NULL", what)))
    } else {
        Ok(())
    }
}

// ============================================================================
// Foreign connector
// ============================================================================

/// Input or output handle. Owned by its connector.
pub(crate) struct EntityRef {
    owner: *const ForeignConnector,
    name: String,
}

impl EntityRef {
    pub(crate) fn owner(&self) -> &ForeignConnector {
        // SAFETY: entity handles are stored inside their owner and released
        // with it, so the owner outlives every handle it issued.
        unsafe { &*self.owner }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

/// Sample copy handed out through `connector_get_native_sample`.
pub(crate) struct NativeSampleRef {
    pub(crate) data: Arc<DynamicData>,
    pub(crate) info: SampleInfo,
}

pub(crate) struct ForeignConnector {
    pub(crate) connector: Connector,
    readers: Mutex<HashMap<String, Box<EntityRef>>>,
    writers: Mutex<HashMap<String, Box<EntityRef>>>,
    native_samples: Mutex<HashMap<String, HashMap<usize, Box<NativeSampleRef>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl ForeignConnector {
    fn new(connector: Connector) -> Self {
        Self {
            connector,
            readers: Mutex::new(HashMap::new()),
            writers: Mutex::new(HashMap::new()),
            native_samples: Mutex::new(HashMap::new()),
        }
    }

    /// Stable handle for the named input, created on first use.
    pub(crate) fn reader_handle(&self, name: &str) -> dds_connector::Result<*mut DdsDataReader> {
        self.connector.get_input(name)?;
        let mut readers = lock(&self.readers);
        let entry = readers.entry(name.to_string()).or_insert_with(|| {
            Box::new(EntityRef {
                owner: self,
                name: name.to_string(),
            })
        });
        Ok(ptr::from_ref::<EntityRef>(&**entry).cast_mut().cast::<DdsDataReader>())
    }

    /// Stable handle for the named output, created on first use.
    pub(crate) fn writer_handle(&self, name: &str) -> dds_connector::Result<*mut DdsDataWriter> {
        self.connector.get_output(name)?;
        let mut writers = lock(&self.writers);
        let entry = writers.entry(name.to_string()).or_insert_with(|| {
            Box::new(EntityRef {
                owner: self,
                name: name.to_string(),
            })
        });
        Ok(ptr::from_ref::<EntityRef>(&**entry).cast_mut().cast::<DdsDataWriter>())
    }

    /// Handle to the copy of sample `index` of `input`, loaded on first use
    /// and kept alive until the input's next read, take or clear.
    pub(crate) fn pinned_sample<F>(
        &self,
        input: &str,
        index: usize,
        load: F,
    ) -> dds_connector::Result<*mut DdsNativeSample>
    where
        F: FnOnce() -> dds_connector::Result<NativeSampleRef>,
    {
        let mut pins = lock(&self.native_samples);
        let samples = pins.entry(input.to_string()).or_default();
        let boxed = match samples.entry(index) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Box::new(load()?)),
        };
        Ok(ptr::from_ref::<NativeSampleRef>(&**boxed)
            .cast_mut()
            .cast::<DdsNativeSample>())
    }

    pub(crate) fn release_samples(&self, input: &str) {
        lock(&self.native_samples).remove(input);
    }
}

/// Borrow the connector behind a handle.
///
/// # Safety
/// `handle` must be NULL or a live pointer from [`connector_new`].
pub(crate) unsafe fn connector_ref<'a>(handle: *mut DdsConnector) -> Option<&'a ForeignConnector> {
    handle.cast::<ForeignConnector>().as_ref()
}

/// # Safety
/// `handle` must be NULL or a live reader handle.
pub(crate) unsafe fn reader_ref<'a>(handle: *mut DdsDataReader) -> Option<&'a EntityRef> {
    handle.cast::<EntityRef>().as_ref()
}

/// # Safety
/// `handle` must be NULL or a live writer handle.
pub(crate) unsafe fn writer_ref<'a>(handle: *mut DdsDataWriter) -> Option<&'a EntityRef> {
    handle.cast::<EntityRef>().as_ref()
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Create a connector from a configuration.
///
/// `config_file` is a `;`-separated list of file paths, or an inline
/// document prefixed with `str://`. `options` may be NULL for defaults.
///
/// # Safety
/// - `config_name` and `config_file` must be valid null-terminated C strings.
/// - `options` must be NULL or point to a valid `DdsConnectorOptions`.
/// - The returned handle must be released with `connector_delete`.
///
/// # Returns
/// Opaque connector handle, or NULL on failure (see
/// `connector_get_last_error_message`).
#[no_mangle]
pub unsafe extern "C" fn connector_new(
    config_name: *const c_char,
    config_file: *const c_char,
    options: *const DdsConnectorOptions,
) -> *mut DdsConnector {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = env_logger::try_init();
    });

    let options = options.as_ref().copied().unwrap_or_default();
    let created = c_str(config_name, "config_name").and_then(|name| {
        let source = c_str(config_file, "config_file")?;
        Connector::new(name, source, options.into())
    });

    match created {
        Ok(connector) => {
            Box::into_raw(Box::new(ForeignConnector::new(connector))).cast::<DdsConnector>()
        }
        Err(e) => {
            fail(&e);
            ptr::null_mut()
        }
    }
}

/// Release a connector with all its entity and sample handles.
///
/// # Safety
/// `self_` must be NULL or a pointer from `connector_new` not yet deleted.
#[no_mangle]
pub unsafe extern "C" fn connector_delete(self_: *mut DdsConnector) {
    if !self_.is_null() {
        let _ = Box::from_raw(self_.cast::<ForeignConnector>());
    }
}

/// Copy of the most recent error message, or NULL if none was recorded.
///
/// # Safety
/// The returned string must be released with `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_get_last_error_message() -> *mut c_char {
    last_error_slot()
        .message
        .as_ref()
        .map_or(ptr::null_mut(), |message| message.clone().into_raw())
}

/// Kind of the most recent error, `CONNECTOR_ERROR_NONE` if none was
/// recorded.
#[no_mangle]
pub extern "C" fn connector_get_last_error_kind() -> ConnectorErrorKind {
    last_error_slot().kind
}

/// Release a string returned by this library.
///
/// # Safety
/// `value` must be NULL or a string returned by this library, released once.
#[no_mangle]
pub unsafe extern "C" fn connector_free_string(value: *mut c_char) {
    if !value.is_null() {
        let _ = CString::from_raw(value);
    }
}

/// Set the per-thread object cap for threads that have not used the API yet.
///
/// # Safety
/// Safe to call from any thread.
#[no_mangle]
pub unsafe extern "C" fn connector_set_max_objects_per_thread(value: c_int) -> ConnectorRetcode {
    finish(dds_connector::set_max_objects_per_thread(i64::from(value)))
}

/// Library version string
///
/// # Safety
/// The returned pointer is valid for the lifetime of the process (static storage).
#[no_mangle]
pub unsafe extern "C" fn connector_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr().cast::<c_char>()
}


#[cfg(test)]
mod tests {
    #![allow(clippy::all)]
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_connector_create_delete() {
        let _guard = serial();
        let connector = open(false);
        unsafe { connector_delete(connector) };
        unsafe { connector_delete(ptr::null_mut()) };
    }

    #[test]
    fn test_create_failure_records_message() {
        let _guard = serial();
        let name = CString::new("CApi::Missing").unwrap();
        let config = CString::new(CONFIG).unwrap();
        let connector = unsafe { connector_new(name.as_ptr(), config.as_ptr(), ptr::null()) };
        assert!(connector.is_null());
        assert!(last_error().contains("CApi::Missing"));

        let connector = unsafe { connector_new(ptr::null(), config.as_ptr(), ptr::null()) };
        assert!(connector.is_null());
        assert!(last_error().contains("config_name"));
    }

    #[test]
    fn test_default_options() {
        let options = DdsConnectorOptions::default();
        assert_eq!(options.enable_on_data_event, 1);
        assert_eq!(options.one_based_sequence_indexing, 0);
        let converted = ConnectorOptions::from(options);
        assert!(converted.enable_data_event);
        assert!(!converted.one_based_indexing);
    }

    #[test]
    fn test_retcode_mapping() {
        let cases = [
            (Error::Runtime("x".into()), ConnectorRetcode::ConnectorError),
            (Error::EntityNotFound("x".into()), ConnectorRetcode::ConnectorBadParameter),
            (Error::InvalidJson("x".into()), ConnectorRetcode::ConnectorBadParameter),
            (Error::UnsupportedOperation("x".into()), ConnectorRetcode::ConnectorUnsupported),
            (Error::ResourceExhausted("x".into()), ConnectorRetcode::ConnectorOutOfResources),
        ];
        for (e, code) in cases {
            assert_eq!(ConnectorRetcode::from(&e), code);
        }
        assert_eq!(
            ConnectorErrorKind::from(&Error::FieldNotFound("x".into())),
            ConnectorErrorKind::ConnectorErrorFieldNotFound
        );
        assert_eq!(
            ConnectorErrorKind::from(&Error::TypeMismatch("x".into())),
            ConnectorErrorKind::ConnectorErrorTypeMismatch
        );
        assert_eq!(ConnectorRetcode::ConnectorTimeout as i32, 10);
        assert_eq!(ConnectorRetcode::ConnectorAlreadyDeleted as i32, 9);
    }

    #[test]
    fn test_set_max_objects_rejects_zero() {
        let _guard = serial();
        assert_eq!(
            unsafe { connector_set_max_objects_per_thread(0) },
            ConnectorRetcode::ConnectorBadParameter
        );
        assert!(last_error().contains("Invalid argument"));
    }

    #[test]
    fn test_version() {
        let version = unsafe { CStr::from_ptr(connector_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}
