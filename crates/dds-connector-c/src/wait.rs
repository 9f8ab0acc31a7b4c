// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wait primitives and matched-endpoint queries.
//!
//! Timeouts are in milliseconds; a negative value waits forever. A wait
//! that reaches its deadline returns `CONNECTOR_TIMEOUT` without touching
//! the last-error slot.

use dds_connector::{timeout_from_millis, Input, Output, WaitOutcome};
use libc::{c_char, c_int};

use super::{
    connector_ref, deleted, fail, finish, into_c_string, reader_ref, require_out, writer_ref,
    ConnectorRetcode, DdsConnector, DdsDataReader, DdsDataWriter,
};

fn conclude<T, F>(result: dds_connector::Result<WaitOutcome<T>>, on_satisfied: F) -> ConnectorRetcode
where
    F: FnOnce(T) -> dds_connector::Result<()>,
{
    match result {
        Ok(WaitOutcome::Satisfied(value)) => finish(on_satisfied(value)),
        Ok(WaitOutcome::TimedOut) => ConnectorRetcode::ConnectorTimeout,
        Err(e) => fail(&e),
    }
}

/// # Safety
/// `reader` must be NULL or a live handle from `connector_get_datareader`.
unsafe fn on_reader<F>(reader: *mut DdsDataReader, op: F) -> ConnectorRetcode
where
    F: FnOnce(Input<'_>) -> ConnectorRetcode,
{
    let Some(entity) = reader_ref(reader) else {
        return deleted("reader");
    };
    match entity.owner().connector.get_input(entity.name()) {
        Ok(input) => op(input),
        Err(e) => fail(&e),
    }
}

/// # Safety
/// `writer` must be NULL or a live handle from `connector_get_datawriter`.
unsafe fn on_writer<F>(writer: *mut DdsDataWriter, op: F) -> ConnectorRetcode
where
    F: FnOnce(Output<'_>) -> ConnectorRetcode,
{
    let Some(entity) = writer_ref(writer) else {
        return deleted("writer");
    };
    match entity.owner().connector.get_output(entity.name()) {
        Ok(output) => op(output),
        Err(e) => fail(&e),
    }
}

/// Wait until any input of the connector has unread data.
///
/// # Safety
/// `self_` must be a valid pointer returned from `connector_new`.
///
/// # Returns
/// `CONNECTOR_OK`, `CONNECTOR_TIMEOUT`, or `CONNECTOR_UNSUPPORTED` when the
/// connector was created with `enable_on_data_event = 0`.
#[no_mangle]
pub unsafe extern "C" fn connector_wait_for_data(
    self_: *mut DdsConnector,
    timeout_ms: c_int,
) -> ConnectorRetcode {
    let Some(foreign) = connector_ref(self_) else {
        return deleted("connector");
    };
    let timeout = timeout_from_millis(i64::from(timeout_ms));
    conclude(foreign.connector.wait_for_data(timeout), |()| Ok(()))
}

/// Wait until this input has unread data.
///
/// # Safety
/// `reader` must be a valid handle from `connector_get_datareader`.
#[no_mangle]
pub unsafe extern "C" fn connector_wait_for_data_on_reader(
    reader: *mut DdsDataReader,
    timeout_ms: c_int,
) -> ConnectorRetcode {
    on_reader(reader, |input| {
        conclude(
            input.wait_for_data(timeout_from_millis(i64::from(timeout_ms))),
            |()| Ok(()),
        )
    })
}

/// Wait until every sample written so far is acknowledged by the matched
/// reliable readers.
///
/// # Safety
/// - `writer` must be a valid handle from `connector_get_datawriter`.
/// - `acknowledged` must be NULL or valid for writes; it receives the
///   writer's cumulative acknowledgment count.
#[no_mangle]
pub unsafe extern "C" fn connector_wait_for_acknowledgments(
    writer: *mut DdsDataWriter,
    timeout_ms: c_int,
    acknowledged: *mut u64,
) -> ConnectorRetcode {
    on_writer(writer, |output| {
        conclude(
            output.wait_for_acknowledgments(timeout_from_millis(i64::from(timeout_ms))),
            |count| {
                if !acknowledged.is_null() {
                    *acknowledged = count;
                }
                Ok(())
            },
        )
    })
}

fn change_to_c(change: i64) -> c_int {
    c_int::try_from(change).unwrap_or(if change < 0 { c_int::MIN } else { c_int::MAX })
}

/// Wait for the number of matched writers to change.
///
/// # Safety
/// - `reader` must be a valid handle from `connector_get_datareader`.
/// - `current_count_change` must be NULL or valid for writes; it receives
///   the signed change since the previous observation.
#[no_mangle]
pub unsafe extern "C" fn connector_wait_for_matched_publication(
    reader: *mut DdsDataReader,
    timeout_ms: c_int,
    current_count_change: *mut c_int,
) -> ConnectorRetcode {
    on_reader(reader, |input| {
        conclude(
            input.wait_for_matched_publication(timeout_from_millis(i64::from(timeout_ms))),
            |change| {
                if !current_count_change.is_null() {
                    *current_count_change = change_to_c(change);
                }
                Ok(())
            },
        )
    })
}

/// Wait for the number of matched readers to change.
///
/// # Safety
/// - `writer` must be a valid handle from `connector_get_datawriter`.
/// - `current_count_change` must be NULL or valid for writes; it receives
///   the signed change since the previous observation.
#[no_mangle]
pub unsafe extern "C" fn connector_wait_for_matched_subscription(
    writer: *mut DdsDataWriter,
    timeout_ms: c_int,
    current_count_change: *mut c_int,
) -> ConnectorRetcode {
    on_writer(writer, |output| {
        conclude(
            output.wait_for_matched_subscription(timeout_from_millis(i64::from(timeout_ms))),
            |change| {
                if !current_count_change.is_null() {
                    *current_count_change = change_to_c(change);
                }
                Ok(())
            },
        )
    })
}

/// Matched writers as a JSON array of
/// `{"participantId", "endpointName", "topicName"}` objects.
///
/// # Safety
/// - `reader` must be a valid handle from `connector_get_datareader`.
/// - `json_str` must be valid for writes; release the result with
///   `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_get_matched_publications(
    reader: *mut DdsDataReader,
    json_str: *mut *mut c_char,
) -> ConnectorRetcode {
    on_reader(reader, |input| {
        finish(require_out(json_str, "json_str").and_then(|()| {
            *json_str = into_c_string(input.get_matched_publications()?)?;
            Ok(())
        }))
    })
}

/// Matched readers as a JSON array of
/// `{"participantId", "endpointName", "topicName"}` objects.
///
/// # Safety
/// - `writer` must be a valid handle from `connector_get_datawriter`.
/// - `json_str` must be valid for writes; release the result with
///   `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_get_matched_subscriptions(
    writer: *mut DdsDataWriter,
    json_str: *mut *mut c_char,
) -> ConnectorRetcode {
    on_writer(writer, |output| {
        finish(require_out(json_str, "json_str").and_then(|()| {
            *json_str = into_c_string(output.get_matched_subscriptions()?)?;
            Ok(())
        }))
    })
}
