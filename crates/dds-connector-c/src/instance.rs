// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Output side: instance setters, write and the native instance.

use std::ptr;

use dds_connector::Output;
use libc::{c_char, c_double, c_int};

use super::{
    c_str, connector_ref, deleted, fail, finish, into_c_string, require_out, ConnectorRetcode,
    DdsConnector, DdsDataWriter, EntityRef, ForeignConnector,
};

/// Opaque handle to the staged instance of an output
#[repr(C)]
pub struct DdsNativeInstance {
    _private: [u8; 0],
}

/// Resolve the connector and the named output, then run `op`.
///
/// # Safety
/// `self_` must be NULL or a live connector; `entity` a valid C string.
pub(crate) unsafe fn on_output<F>(
    self_: *mut DdsConnector,
    entity: *const c_char,
    op: F,
) -> ConnectorRetcode
where
    F: FnOnce(&ForeignConnector, Output<'_>) -> dds_connector::Result<()>,
{
    let Some(foreign) = connector_ref(self_) else {
        return deleted("connector");
    };
    finish(c_str(entity, "entity_name").and_then(|name| {
        let output = foreign.connector.get_output(name)?;
        op(foreign, output)
    }))
}

/// Run `op` on the output behind a native instance handle.
///
/// # Safety
/// `instance` must be NULL or a live handle from `connector_get_native_instance`.
unsafe fn on_native_instance<F>(instance: *mut DdsNativeInstance, op: F) -> ConnectorRetcode
where
    F: FnOnce(Output<'_>) -> dds_connector::Result<()>,
{
    let Some(entity) = instance.cast::<EntityRef>().as_ref() else {
        return deleted("instance");
    };
    finish(
        entity
            .owner()
            .connector
            .get_output(entity.name())
            .and_then(op),
    )
}

/// Handle to a named output.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` must be a valid null-terminated C string.
/// - The handle is owned by the connector and released by `connector_delete`.
///
/// # Returns
/// Writer handle, or NULL if the output does not exist.
#[no_mangle]
pub unsafe extern "C" fn connector_get_datawriter(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
) -> *mut DdsDataWriter {
    let Some(foreign) = connector_ref(self_) else {
        deleted("connector");
        return ptr::null_mut();
    };
    match c_str(entity_name, "entity_name").and_then(|name| foreign.writer_handle(name)) {
        Ok(handle) => handle,
        Err(e) => {
            fail(&e);
            ptr::null_mut()
        }
    }
}

/// Set a numeric (or enum) member of the staged instance.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` and `name` must be valid null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn connector_set_number_into_samples(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    name: *const c_char,
    value: c_double,
) -> ConnectorRetcode {
    on_output(self_, entity_name, |_, output| {
        output.set_number(c_str(name, "name")?, value)
    })
}

/// Set a boolean member of the staged instance (0 is false).
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` and `name` must be valid null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn connector_set_boolean_into_samples(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    name: *const c_char,
    value: c_int,
) -> ConnectorRetcode {
    on_output(self_, entity_name, |_, output| {
        output.set_boolean(c_str(name, "name")?, value != 0)
    })
}

/// Set a string (or enum by name) member of the staged instance.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name`, `name` and `value` must be valid null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn connector_set_string_into_samples(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    name: *const c_char,
    value: *const c_char,
) -> ConnectorRetcode {
    on_output(self_, entity_name, |_, output| {
        output.set_string(c_str(name, "name")?, c_str(value, "value")?)
    })
}

/// Reset one member of the staged instance to its default.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` and `name` must be valid null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn connector_clear_member(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    name: *const c_char,
) -> ConnectorRetcode {
    on_output(self_, entity_name, |_, output| {
        output.clear_member(c_str(name, "name")?)
    })
}

/// Merge a JSON object into the staged instance. On failure the instance
/// is left unchanged.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` and `json` must be valid null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn connector_set_json_instance(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    json: *const c_char,
) -> ConnectorRetcode {
    on_output(self_, entity_name, |_, output| {
        output.set_json_instance(c_str(json, "json")?)
    })
}

/// Staged instance as JSON.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` must be a valid null-terminated C string.
/// - `json_str` must be valid for writes; release the result with
///   `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_get_json_instance(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    json_str: *mut *mut c_char,
) -> ConnectorRetcode {
    on_output(self_, entity_name, |_, output| {
        require_out(json_str, "json_str")?;
        *json_str = into_c_string(output.get_json_instance()?)?;
        Ok(())
    })
}

/// Publish the staged instance, then reset it.
///
/// `params_json` may be NULL, or a JSON object with `action`
/// (`"write"`, `"dispose"`, `"unregister"`), `source_timestamp`,
/// `identity` and `related_sample_identity`.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` must be a valid null-terminated C string.
/// - `params_json` must be NULL or a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn connector_write(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    params_json: *const c_char,
) -> ConnectorRetcode {
    on_output(self_, entity_name, |_, output| {
        if params_json.is_null() {
            output.write()
        } else {
            output.write_with_params(c_str(params_json, "params_json")?)
        }
    })
}

/// Handle to the staged instance of a named output.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` must be a valid null-terminated C string.
/// - `native_pointer` must be valid for writes. The handle is owned by the
///   connector and released by `connector_delete`.
#[no_mangle]
pub unsafe extern "C" fn connector_get_native_instance(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    native_pointer: *mut *mut DdsNativeInstance,
) -> ConnectorRetcode {
    on_output(self_, entity_name, |foreign, output| {
        require_out(native_pointer, "native_pointer")?;
        *native_pointer = foreign
            .writer_handle(output.name())?
            .cast::<DdsNativeInstance>();
        Ok(())
    })
}

/// Staged instance behind a native handle, as JSON.
///
/// # Safety
/// - `instance` must be a live handle from `connector_get_native_instance`.
/// - `json_str` must be valid for writes; release the result with
///   `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_native_instance_get_json(
    instance: *mut DdsNativeInstance,
    json_str: *mut *mut c_char,
) -> ConnectorRetcode {
    on_native_instance(instance, |output| {
        require_out(json_str, "json_str")?;
        let json = output.native_instance()?.to_json().to_string();
        *json_str = into_c_string(json)?;
        Ok(())
    })
}

/// Merge a JSON object into the staged instance behind a native handle.
///
/// # Safety
/// - `instance` must be a live handle from `connector_get_native_instance`.
/// - `json` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn connector_native_instance_set_json(
    instance: *mut DdsNativeInstance,
    json: *const c_char,
) -> ConnectorRetcode {
    on_native_instance(instance, |output| {
        output.set_json_instance(c_str(json, "json")?)
    })
}
