// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process participant runtime.
//!
//! Readers and writers of every connector in the process meet in a
//! [`DomainState`]. Writers push [`Change`]s straight into the delivery
//! queues of their matched readers; there is no transport.

pub mod ack;
pub mod condition;
pub mod endpoint;
pub mod guid;
pub mod history;
pub mod matching;
pub mod registry;
pub mod sample;

pub use ack::{AckToken, AckTracker};
pub use condition::{DataSignal, WaitOutcome};
pub use endpoint::{EndpointInfo, ReaderEndpoint, WriterEndpoint};
pub use guid::Guid;
pub use history::LoanedSample;
pub use matching::{MatchState, MatchedEndpoint};
pub use registry::{BindToken, DomainId, DomainRegistry, DomainState, EndpointKind, MatchKey};
pub use sample::{
    Change, ChangeKind, InstanceHandle, InstanceState, SampleIdentity, SampleInfo, SampleState,
    ViewState,
};
