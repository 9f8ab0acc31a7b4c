// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logging initialization for the connector C bindings

use libc::c_char;

use super::{c_str, fail, set_last_error, ConnectorErrorKind, ConnectorRetcode};

/// Log level for connector logging
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorLogLevel {
    ConnectorLogOff = 0,
    ConnectorLogError = 1,
    ConnectorLogWarn = 2,
    ConnectorLogInfo = 3,
    ConnectorLogDebug = 4,
    ConnectorLogTrace = 5,
}

impl From<ConnectorLogLevel> for log::LevelFilter {
    fn from(level: ConnectorLogLevel) -> Self {
        match level {
            ConnectorLogLevel::ConnectorLogOff => log::LevelFilter::Off,
            ConnectorLogLevel::ConnectorLogError => log::LevelFilter::Error,
            ConnectorLogLevel::ConnectorLogWarn => log::LevelFilter::Warn,
            ConnectorLogLevel::ConnectorLogInfo => log::LevelFilter::Info,
            ConnectorLogLevel::ConnectorLogDebug => log::LevelFilter::Debug,
            ConnectorLogLevel::ConnectorLogTrace => log::LevelFilter::Trace,
        }
    }
}

fn installed(result: Result<(), log::SetLoggerError>) -> ConnectorRetcode {
    match result {
        Ok(()) => ConnectorRetcode::ConnectorOk,
        Err(e) => {
            set_last_error(
                ConnectorErrorKind::ConnectorErrorRuntime,
                &format!("logger already initialized: {}", e),
            );
            ConnectorRetcode::ConnectorError
        }
    }
}

/// Initialize logging with console output
///
/// Call before `connector_new`; afterwards a default logger is installed
/// and this returns `CONNECTOR_ERROR`.
///
/// # Safety
/// Must be called from a single thread during initialization.
///
/// # Example (C)
/// ```c
/// connector_logging_init(CONNECTOR_LOG_INFO);
/// ```
#[no_mangle]
pub unsafe extern "C" fn connector_logging_init(level: ConnectorLogLevel) -> ConnectorRetcode {
    let filter: log::LevelFilter = level.into();
    installed(
        env_logger::Builder::new()
            .filter_level(filter)
            .format_timestamp_millis()
            .try_init(),
    )
}

/// Initialize logging from `RUST_LOG`, falling back to `default_level`.
///
/// # Safety
/// Must be called from a single thread during initialization.
#[no_mangle]
pub unsafe extern "C" fn connector_logging_init_env(
    default_level: ConnectorLogLevel,
) -> ConnectorRetcode {
    let filter: log::LevelFilter = default_level.into();
    installed(
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(filter.to_string()),
        )
        .format_timestamp_millis()
        .try_init(),
    )
}

/// Initialize logging with a filter string (e.g. `"dds_connector=debug,warn"`)
///
/// # Safety
/// `filter` must be a valid null-terminated C string or NULL.
#[no_mangle]
pub unsafe extern "C" fn connector_logging_init_with_filter(
    filter: *const c_char,
) -> ConnectorRetcode {
    let filter = match c_str(filter, "filter") {
        Ok(filter) => filter,
        Err(e) => return fail(&e),
    };
    installed(
        env_logger::Builder::new()
            .parse_filters(filter)
            .format_timestamp_millis()
            .try_init(),
    )
}
