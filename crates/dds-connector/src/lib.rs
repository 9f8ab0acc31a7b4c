// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # dds-connector - named-entity access to DDS data
//!
//! A Connector is a participant created from a named configuration. Its
//! readers (inputs) and writers (outputs) are resolved by name, and sample
//! fields are reached through member paths or JSON, without generated types.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dds_connector::{Connector, ConnectorOptions, Result};
//! use std::time::Duration;
//!
//! fn main() -> Result<()> {
//!     let connector = Connector::new(
//!         "MyParticipantLibrary::MyParticipant",
//!         "connector.yaml",
//!         ConnectorOptions::default(),
//!     )?;
//!
//!     let output = connector.get_output("MyPublisher::MyWriter")?;
//!     output.set_json_instance(r#"{"temp": 42.5, "alarm": true}"#)?;
//!     output.write()?;
//!
//!     let input = connector.get_input("MySubscriber::MyReader")?;
//!     input.wait_for_data(Some(Duration::from_secs(5)))?;
//!     input.take()?;
//!     for i in 0..input.sample_count()? {
//!         println!("{}", input.get_json_sample(i)?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                           Connector API                             |
//! |   Connector -> Input (read/take/getters) | Output (setters/write)   |
//! +---------------------------------------------------------------------+
//! |                        In-process runtime                           |
//! |   DomainRegistry | Writer/Reader endpoints | History | Wait/Notify  |
//! +---------------------------------------------------------------------+
//! |                   Dynamic data + configuration                      |
//! |   TypeDescriptor | DynamicData | JSON bridge | YAML participants    |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`dds`] - Connector, inputs and outputs (start here)
//! - [`dynamic`] - Runtime types and sample values
//! - [`config`] - Configuration documents and type resolution
//! - [`domain`] - Endpoints, matching, sample delivery and waits
//! - [`qos`] - Reliability, durability, history and resource limits

pub mod config;
pub mod dds;
pub mod domain;
pub mod dynamic;
pub mod qos;

pub use config::ConfigError;
pub use dds::{
    max_objects_per_thread, set_max_objects_per_thread, timeout_from_millis, Connector,
    ConnectorOptions, Error, IndexBase, Input, NativeInstance, NativeSample, Output, Result,
    WriteParams, DEFAULT_MAX_OBJECTS_PER_THREAD,
};
pub use domain::{
    ChangeKind, InstanceState, MatchedEndpoint, SampleIdentity, SampleInfo, SampleState,
    ViewState, WaitOutcome,
};
pub use dynamic::{DynamicData, FieldValue, TypeDescriptor};
pub use qos::EndpointQos;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
