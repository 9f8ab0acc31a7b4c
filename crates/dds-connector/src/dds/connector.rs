// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The Connector: one participant and its named inputs and outputs.

use super::index::IndexBase;
use super::input::{Input, InputEntity};
use super::objects::ObjectSlot;
use super::output::{Output, OutputEntity};
use super::{Error, Result};
use crate::config::{load_participant, EndpointConfig};
use crate::domain::guid::{new_participant_prefix, ENTITY_KIND_READER, ENTITY_KIND_WRITER};
use crate::domain::{
    DataSignal, DomainRegistry, DomainState, EndpointInfo, Guid, ReaderEndpoint, WaitOutcome,
    WriterEndpoint,
};
use crate::dynamic::FieldValue;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Creation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorOptions {
    /// Readers raise the connector-wide "new data" notification.
    pub enable_data_event: bool,
    /// Sample and element indexes start at 1 instead of 0.
    pub one_based_indexing: bool,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            enable_data_event: true,
            one_based_indexing: false,
        }
    }
}

impl ConnectorOptions {
    pub fn one_based(mut self, enabled: bool) -> Self {
        self.one_based_indexing = enabled;
        self
    }

    pub fn data_event(mut self, enabled: bool) -> Self {
        self.enable_data_event = enabled;
        self
    }
}

/// A participant created from a named configuration.
///
/// Entities are resolved by name through [`Connector::get_input`] and
/// [`Connector::get_output`]; the returned handles borrow the connector.
/// Dropping the connector unregisters every entity.
///
/// # Example
///
/// ```rust,no_run
/// use dds_connector::{Connector, ConnectorOptions};
/// use std::time::Duration;
///
/// # fn main() -> dds_connector::Result<()> {
/// let connector = Connector::new(
///     "MyParticipantLibrary::MyParticipant",
///     "connector.yaml",
///     ConnectorOptions::default(),
/// )?;
///
/// let output = connector.get_output("MyPublisher::MyWriter")?;
/// output.set_number("temp", 42.5)?;
/// output.set_boolean("alarm", true)?;
/// output.write()?;
///
/// let input = connector.get_input("MySubscriber::MyReader")?;
/// if input.wait_for_data(Some(Duration::from_secs(5)))?.is_satisfied() {
///     input.take()?;
///     println!("temp = {}", input.get_number(0, "temp")?);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Connector {
    name: String,
    options: ConnectorOptions,
    index_base: IndexBase,
    inputs: HashMap<String, InputEntity>,
    outputs: HashMap<String, OutputEntity>,
    data_signal: Arc<DataSignal>,
    prefix: [u8; 12],
    // Declared last: entities unregister before the domain reference goes.
    domain: Arc<DomainState>,
}

impl Connector {
    /// Create the participant `config_name` described by `config_source`.
    ///
    /// `config_source` is either `str://<document>` or a `;`-separated list
    /// of YAML files.
    pub fn new(config_name: &str, config_source: &str, options: ConnectorOptions) -> Result<Self> {
        let participant = load_participant(config_name, config_source)?;
        let domain = DomainRegistry::global().get_or_create(participant.domain_id);
        let prefix = new_participant_prefix();
        let data_signal = Arc::new(DataSignal::new());
        let listener = options.enable_data_event.then(|| Arc::clone(&data_signal));

        // Entity ids are shared by writers and readers so no two collide.
        let mut next_entity: u32 = 1;

        let mut outputs = HashMap::with_capacity(participant.writers.len());
        for config in participant.writers {
            let guid = Guid::endpoint(prefix, next_entity, ENTITY_KIND_WRITER);
            next_entity += 1;
            let name = config.name.clone();
            let writer = WriterEndpoint::new(endpoint_info(guid, config));
            let token = domain.register_writer(Arc::clone(&writer));
            outputs.insert(name, OutputEntity::new(writer, token));
        }

        let mut inputs = HashMap::with_capacity(participant.readers.len());
        for config in participant.readers {
            let guid = Guid::endpoint(prefix, next_entity, ENTITY_KIND_READER);
            next_entity += 1;
            let name = config.name.clone();
            let reader = ReaderEndpoint::new(endpoint_info(guid, config), listener.clone());
            let token = domain.register_reader(Arc::clone(&reader));
            inputs.insert(name, InputEntity::new(reader, token));
        }

        log::info!(
            "[Connector] '{}' created on domain {} ({} outputs, {} inputs)",
            config_name,
            participant.domain_id,
            outputs.len(),
            inputs.len()
        );

        Ok(Self {
            name: participant.name,
            options,
            index_base: IndexBase::new(options.one_based_indexing),
            inputs,
            outputs,
            data_signal,
            prefix,
            domain,
        })
    }

    /// Configuration name this connector was created from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> ConnectorOptions {
        self.options
    }

    pub fn domain_id(&self) -> u32 {
        self.domain.domain_id
    }

    /// Participant GUID prefix as hex, the `participantId` of match reports.
    pub fn participant_id(&self) -> String {
        Guid::new(self.prefix, [0, 0, 1, 0xc1]).prefix_hex()
    }

    pub fn get_input(&self, name: &str) -> Result<Input<'_>> {
        let (name, entity) = self
            .inputs
            .get_key_value(name)
            .ok_or_else(|| Error::EntityNotFound(format!("input '{}'", name)))?;
        Ok(Input::new(name, entity, self.index_base))
    }

    pub fn get_output(&self, name: &str) -> Result<Output<'_>> {
        let (name, entity) = self
            .outputs
            .get_key_value(name)
            .ok_or_else(|| Error::EntityNotFound(format!("output '{}'", name)))?;
        Ok(Output::new(name, entity, self.index_base))
    }

    /// Input names, sorted.
    pub fn input_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.inputs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Output names, sorted.
    pub fn output_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.outputs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Wait until any input holds unread data.
    ///
    /// `None` waits forever and `Some(Duration::ZERO)` polls. Requires
    /// `enable_data_event`.
    pub fn wait_for_data(&self, timeout: Option<Duration>) -> Result<WaitOutcome<()>> {
        if !self.options.enable_data_event {
            return Err(Error::UnsupportedOperation(
                "connector-wide wait requires enable_data_event".into(),
            ));
        }
        let _slot = ObjectSlot::acquire()?;
        Ok(self
            .data_signal
            .wait_for(timeout, || self.inputs.values().any(|i| i.reader().has_unread())))
    }

    // Name-dispatched shorthands.

    pub fn read(&self, input: &str) -> Result<()> {
        self.get_input(input)?.read()
    }

    pub fn take(&self, input: &str) -> Result<()> {
        self.get_input(input)?.take()
    }

    pub fn clear(&self, input: &str) -> Result<()> {
        self.get_input(input)?.clear()
    }

    pub fn sample_count(&self, input: &str) -> Result<usize> {
        self.get_input(input)?.sample_count()
    }

    pub fn get_boolean(&self, input: &str, index: usize, path: &str) -> Result<bool> {
        self.get_input(input)?.get_boolean(index, path)
    }

    pub fn get_number(&self, input: &str, index: usize, path: &str) -> Result<f64> {
        self.get_input(input)?.get_number(index, path)
    }

    pub fn get_string(&self, input: &str, index: usize, path: &str) -> Result<String> {
        self.get_input(input)?.get_string(index, path)
    }

    pub fn get_value(&self, input: &str, index: usize, path: &str) -> Result<FieldValue> {
        self.get_input(input)?.get_value(index, path)
    }

    pub fn get_boolean_from_info(&self, input: &str, index: usize, name: &str) -> Result<bool> {
        self.get_input(input)?.get_info_boolean(index, name)
    }

    pub fn get_json_from_info(&self, input: &str, index: usize, name: &str) -> Result<String> {
        self.get_input(input)?.get_info_json(index, name)
    }

    pub fn get_json_sample(&self, input: &str, index: usize) -> Result<String> {
        self.get_input(input)?.get_json_sample(index)
    }

    pub fn get_json_member(&self, input: &str, index: usize, path: &str) -> Result<String> {
        self.get_input(input)?.get_json_member(index, path)
    }

    pub fn wait_for_data_on_reader(
        &self,
        input: &str,
        timeout: Option<Duration>,
    ) -> Result<WaitOutcome<()>> {
        self.get_input(input)?.wait_for_data(timeout)
    }

    pub fn wait_for_matched_publication(
        &self,
        input: &str,
        timeout: Option<Duration>,
    ) -> Result<WaitOutcome<i64>> {
        self.get_input(input)?.wait_for_matched_publication(timeout)
    }

    pub fn get_matched_publications(&self, input: &str) -> Result<String> {
        self.get_input(input)?.get_matched_publications()
    }

    pub fn set_boolean(&self, output: &str, path: &str, value: bool) -> Result<()> {
        self.get_output(output)?.set_boolean(path, value)
    }

    pub fn set_number(&self, output: &str, path: &str, value: f64) -> Result<()> {
        self.get_output(output)?.set_number(path, value)
    }

    pub fn set_string(&self, output: &str, path: &str, value: &str) -> Result<()> {
        self.get_output(output)?.set_string(path, value)
    }

    pub fn set_json_instance(&self, output: &str, json: &str) -> Result<()> {
        self.get_output(output)?.set_json_instance(json)
    }

    pub fn clear_member(&self, output: &str, path: &str) -> Result<()> {
        self.get_output(output)?.clear_member(path)
    }

    /// Write, with optional JSON write parameters.
    pub fn write(&self, output: &str, params_json: Option<&str>) -> Result<()> {
        let output = self.get_output(output)?;
        match params_json {
            Some(params) => output.write_with_params(params),
            None => output.write(),
        }
    }

    pub fn wait_for_acknowledgments(
        &self,
        output: &str,
        timeout: Option<Duration>,
    ) -> Result<WaitOutcome<u64>> {
        self.get_output(output)?.wait_for_acknowledgments(timeout)
    }

    pub fn wait_for_matched_subscription(
        &self,
        output: &str,
        timeout: Option<Duration>,
    ) -> Result<WaitOutcome<i64>> {
        self.get_output(output)?.wait_for_matched_subscription(timeout)
    }

    pub fn get_matched_subscriptions(&self, output: &str) -> Result<String> {
        self.get_output(output)?.get_matched_subscriptions()
    }
}

fn endpoint_info(guid: Guid, config: EndpointConfig) -> EndpointInfo {
    EndpointInfo {
        guid,
        name: config.name,
        topic: Arc::from(config.topic),
        type_desc: config.type_desc,
        qos: config.qos,
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("name", &self.name)
            .field("domain_id", &self.domain.domain_id)
            .field("options", &self.options)
            .field("inputs", &self.input_names())
            .field("outputs", &self.output_names())
            .finish()
    }
}

impl Drop for Connector {
    fn drop(&mut self) {
        log::debug!(
            "[Connector] '{}' destroyed ({} outputs, {} inputs)",
            self.name,
            self.outputs.len(),
            self.inputs.len()
        );
    }
}
