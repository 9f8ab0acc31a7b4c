// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connector API: named inputs and outputs over the in-process runtime.

mod connector;
mod index;
mod input;
mod objects;
mod output;
mod wait;
mod write_params;

pub use connector::{Connector, ConnectorOptions};
pub use index::IndexBase;
pub use input::{Input, NativeSample};
pub use objects::{
    max_objects_per_thread, objects_in_use, set_max_objects_per_thread, ObjectSlot,
    DEFAULT_MAX_OBJECTS_PER_THREAD,
};
pub use output::{NativeInstance, Output};
pub use wait::timeout_from_millis;
pub use write_params::WriteParams;

use crate::config::ConfigError;
use crate::dynamic::DynamicDataError;

/// Errors returned by connector operations.
///
/// A wait that times out is not an error; see
/// [`WaitOutcome`](crate::WaitOutcome).
///
/// # Example
///
/// ```rust,no_run
/// use dds_connector::{Connector, ConnectorOptions, Error};
///
/// match Connector::new("Lib::Missing", "connector.yaml", ConnectorOptions::default()) {
///     Err(Error::Configuration(e)) => println!("bad configuration: {}", e),
///     Err(e) => println!("other error: {}", e),
///     Ok(_) => println!("created"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration absent or malformed.
    Configuration(ConfigError),
    /// No input or output with this name.
    EntityNotFound(String),
    /// Sample (or element) index outside the valid range.
    IndexOutOfRange(String),
    /// Member path does not resolve against the type.
    FieldNotFound(String),
    /// Accessor kind disagrees with the member's declared kind.
    TypeMismatch(String),
    /// Malformed JSON or JSON incompatible with the type.
    InvalidJson(String),
    /// Operation not supported for this member or configuration.
    UnsupportedOperation(String),
    /// Argument outside its domain.
    InvalidArgument(String),
    /// Per-thread object cap reached.
    ResourceExhausted(String),
    /// Failure inside the runtime.
    Runtime(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Configuration(e) => write!(f, "Configuration error: {}", e),
            Error::EntityNotFound(name) => write!(f, "Entity not found: {}", name),
            Error::IndexOutOfRange(msg) => write!(f, "Index out of range: {}", msg),
            Error::FieldNotFound(path) => write!(f, "Field not found: {}", path),
            Error::TypeMismatch(msg) => write!(f, "Type mismatch: {}", msg),
            Error::InvalidJson(msg) => write!(f, "Invalid JSON: {}", msg),
            Error::UnsupportedOperation(msg) => write!(f, "Unsupported operation: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::ResourceExhausted(msg) => write!(f, "Resource exhausted: {}", msg),
            Error::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Configuration(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Configuration(e)
    }
}

impl From<DynamicDataError> for Error {
    fn from(e: DynamicDataError) -> Self {
        match e {
            DynamicDataError::FieldNotFound(path) => Error::FieldNotFound(path),
            DynamicDataError::TypeMismatch { expected, got } => {
                Error::TypeMismatch(format!("expected {}, got {}", expected, got))
            }
            DynamicDataError::InvalidValue(msg) => Error::TypeMismatch(msg),
            DynamicDataError::InvalidOperation(msg) => Error::UnsupportedOperation(msg),
            DynamicDataError::IndexOutOfBounds { index, length } => {
                Error::IndexOutOfRange(format!("element {} of {}", index, length))
            }
            e @ (DynamicDataError::SequenceTooLong { .. }
            | DynamicDataError::StringTooLong { .. }) => Error::InvalidArgument(e.to_string()),
            DynamicDataError::InvalidJson(msg) => Error::InvalidJson(msg),
        }
    }
}

/// Convenient alias for API results using the public `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_errors_map_to_taxonomy() {
        assert_eq!(
            Error::from(DynamicDataError::FieldNotFound("a.b".into())),
            Error::FieldNotFound("a.b".into())
        );
        assert!(matches!(
            Error::from(DynamicDataError::InvalidOperation("x".into())),
            Error::UnsupportedOperation(_)
        ));
        assert!(matches!(
            Error::from(DynamicDataError::StringTooLong { length: 5, max: 4 }),
            Error::InvalidArgument(_)
        ));
        assert!(matches!(
            Error::from(DynamicDataError::IndexOutOfBounds {
                index: 3,
                length: 1
            }),
            Error::IndexOutOfRange(_)
        ));
        assert!(matches!(
            Error::from(DynamicDataError::InvalidValue("1.5 is not integral".into())),
            Error::TypeMismatch(_)
        ));
    }

    #[test]
    fn test_display() {
        let e = Error::from(ConfigError::UnknownConfiguration("Lib::P".into()));
        assert_eq!(
            e.to_string(),
            "Configuration error: configuration 'Lib::P' not found"
        );
        assert_eq!(
            Error::EntityNotFound("Sub::R".into()).to_string(),
            "Entity not found: Sub::R"
        );
    }
}
