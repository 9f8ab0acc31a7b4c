// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic Types for connector samples
//!
//! Runtime type manipulation without compile-time type knowledge. Every
//! reader and writer carries a [`TypeDescriptor`] built from configuration;
//! samples are [`DynamicData`] values validated against it on each access.
//!
//! # Features
//!
//! - **TypeDescriptor**: Runtime type description (primitives, structs, sequences, etc.)
//! - **DynamicData**: Type-erased data container with path-based member access
//! - **Builder API**: Fluent interface for building type descriptors
//! - **JSON bridge**: Whole-sample and per-member JSON in both directions
//!
//! # Example
//!
//! ```rust
//! use dds_connector::dynamic::{DynamicData, MemberPath, PrimitiveKind, TypeDescriptorBuilder};
//! use std::sync::Arc;
//!
//! let descriptor = Arc::new(TypeDescriptorBuilder::new("SensorReading")
//!     .field("sensor_id", PrimitiveKind::U32)
//!     .field("temperature", PrimitiveKind::F64)
//!     .build());
//!
//! let mut data = DynamicData::new(&descriptor);
//! let temperature = MemberPath::parse("temperature").unwrap();
//! data.set_number(&temperature, 23.5).unwrap();
//! assert_eq!(data.get_number(&temperature).unwrap(), 23.5);
//! assert_eq!(data.to_json()["temperature"], 23.5);
//! ```

mod builder;
mod dynamic_data;
mod json;
mod path;
mod type_descriptor;
mod value;

pub use builder::{EnumBuilder, TypeDescriptorBuilder};
pub use dynamic_data::{member_type, DynamicData, DynamicDataError};
pub use json::value_to_json;
pub use path::{MemberPath, PathSegment};
pub use type_descriptor::{
    ArrayDescriptor, EnumDescriptor, EnumVariant, FieldDescriptor, PrimitiveKind,
    SequenceDescriptor, TypeDescriptor, TypeKind,
};
pub use value::{DynamicValue, FieldValue};
