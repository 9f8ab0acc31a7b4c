// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Input side: read/take, sample getters and sample info.

use std::ptr;

use dds_connector::{Error, FieldValue, Input};
use libc::{c_char, c_double, c_int};
use serde_json::Value;

use super::{
    c_str, connector_ref, deleted, fail, finish, index, into_c_string, require_out,
    ConnectorRetcode, DdsConnector, DdsDataReader, DdsNativeSample, ForeignConnector,
    NativeSampleRef,
};

/// Kind of the value returned by the `get_any_*` getters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorAnyValueKind {
    /// No value (absent optional field)
    ConnectorAnyNone = 0,
    ConnectorAnyNumber = 1,
    ConnectorAnyBoolean = 2,
    /// String, or JSON text for composite values
    ConnectorAnyString = 3,
}

/// Resolve the connector and the named input, then run `op`.
///
/// # Safety
/// `self_` must be NULL or a live connector; `entity` a valid C string.
pub(crate) unsafe fn on_input<F>(
    self_: *mut DdsConnector,
    entity: *const c_char,
    op: F,
) -> ConnectorRetcode
where
    F: FnOnce(&ForeignConnector, Input<'_>) -> dds_connector::Result<()>,
{
    let Some(foreign) = connector_ref(self_) else {
        return deleted("connector");
    };
    finish(c_str(entity, "entity_name").and_then(|name| {
        let input = foreign.connector.get_input(name)?;
        op(foreign, input)
    }))
}

/// Write a scalar to whichever out-pointer matches its kind.
///
/// # Safety
/// Each out-pointer must be NULL or valid for writes.
unsafe fn store_any(
    value: FieldValue,
    number: *mut c_double,
    boolean: *mut c_int,
    string: *mut *mut c_char,
    kind: *mut ConnectorAnyValueKind,
) -> dds_connector::Result<()> {
    require_out(kind, "selected")?;
    match value {
        FieldValue::Number(v) => {
            require_out(number, "double_value_out")?;
            *number = v;
            *kind = ConnectorAnyValueKind::ConnectorAnyNumber;
        }
        FieldValue::Boolean(v) => {
            require_out(boolean, "bool_value_out")?;
            *boolean = c_int::from(v);
            *kind = ConnectorAnyValueKind::ConnectorAnyBoolean;
        }
        FieldValue::String(v) => {
            require_out(string, "string_value_out")?;
            *string = into_c_string(v)?;
            *kind = ConnectorAnyValueKind::ConnectorAnyString;
        }
    }
    Ok(())
}

// ============================================================================
// Entity access
// ============================================================================

/// Handle to a named input.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` must be a valid null-terminated C string.
/// - The handle is owned by the connector and released by `connector_delete`.
///
/// # Returns
/// Reader handle, or NULL if the input does not exist.
#[no_mangle]
pub unsafe extern "C" fn connector_get_datareader(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
) -> *mut DdsDataReader {
    let Some(foreign) = connector_ref(self_) else {
        deleted("connector");
        return ptr::null_mut();
    };
    match c_str(entity_name, "entity_name").and_then(|name| foreign.reader_handle(name)) {
        Ok(handle) => handle,
        Err(e) => {
            fail(&e);
            ptr::null_mut()
        }
    }
}

/// Load every available sample without removing it from the reader.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn connector_read(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |foreign, input| {
        input.read()?;
        foreign.release_samples(input.name());
        Ok(())
    })
}

/// Load every available sample, removing it from the reader.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn connector_take(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |foreign, input| {
        input.take()?;
        foreign.release_samples(input.name());
        Ok(())
    })
}

/// Forget the loaded samples. Native sample handles of this input are
/// released.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn connector_clear(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |foreign, input| {
        input.clear()?;
        foreign.release_samples(input.name());
        Ok(())
    })
}

/// Number of loaded samples.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` must be a valid null-terminated C string.
/// - `value` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn connector_get_sample_count(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    value: *mut c_double,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |_, input| {
        require_out(value, "value")?;
        *value = input.sample_count()? as c_double;
        Ok(())
    })
}

// ============================================================================
// Sample getters
// ============================================================================

/// Numeric member of a loaded sample.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` and `name` must be valid null-terminated C strings.
/// - `return_value` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn connector_get_number_from_sample(
    self_: *mut DdsConnector,
    return_value: *mut c_double,
    entity_name: *const c_char,
    sample_index: c_int,
    name: *const c_char,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |_, input| {
        require_out(return_value, "return_value")?;
        *return_value = input.get_number(index(sample_index)?, c_str(name, "name")?)?;
        Ok(())
    })
}

/// Boolean member of a loaded sample, as 0 or 1.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` and `name` must be valid null-terminated C strings.
/// - `return_value` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn connector_get_boolean_from_sample(
    self_: *mut DdsConnector,
    return_value: *mut c_int,
    entity_name: *const c_char,
    sample_index: c_int,
    name: *const c_char,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |_, input| {
        require_out(return_value, "return_value")?;
        let value = input.get_boolean(index(sample_index)?, c_str(name, "name")?)?;
        *return_value = c_int::from(value);
        Ok(())
    })
}

/// String member of a loaded sample.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` and `name` must be valid null-terminated C strings.
/// - `return_value` must be valid for writes; the string it receives must be
///   released with `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_get_string_from_sample(
    self_: *mut DdsConnector,
    return_value: *mut *mut c_char,
    entity_name: *const c_char,
    sample_index: c_int,
    name: *const c_char,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |_, input| {
        require_out(return_value, "return_value")?;
        let value = input.get_string(index(sample_index)?, c_str(name, "name")?)?;
        *return_value = into_c_string(value)?;
        Ok(())
    })
}

/// Any member of a loaded sample. `selected` tells which out-pointer was
/// written; composite members come back as JSON text.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` and `name` must be valid null-terminated C strings.
/// - Out-pointers must be valid for writes; a returned string must be
///   released with `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_get_any_from_sample(
    self_: *mut DdsConnector,
    double_value_out: *mut c_double,
    bool_value_out: *mut c_int,
    string_value_out: *mut *mut c_char,
    selected: *mut ConnectorAnyValueKind,
    entity_name: *const c_char,
    sample_index: c_int,
    name: *const c_char,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |_, input| {
        let i = index(sample_index)?;
        let name = c_str(name, "name")?;
        let value = match input.get_value(i, name) {
            Ok(value) => value,
            Err(Error::TypeMismatch(_)) => FieldValue::String(input.get_json_member(i, name)?),
            Err(e) => return Err(e),
        };
        store_any(value, double_value_out, bool_value_out, string_value_out, selected)
    })
}

/// Whole loaded sample as JSON.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` must be a valid null-terminated C string.
/// - `json_str` must be valid for writes; release the result with
///   `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_get_json_sample(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    sample_index: c_int,
    json_str: *mut *mut c_char,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |_, input| {
        require_out(json_str, "json_str")?;
        *json_str = into_c_string(input.get_json_sample(index(sample_index)?)?)?;
        Ok(())
    })
}

/// One member of a loaded sample as JSON.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` and `member_name` must be valid null-terminated C strings.
/// - `json_str` must be valid for writes; release the result with
///   `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_get_json_member(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    sample_index: c_int,
    member_name: *const c_char,
    json_str: *mut *mut c_char,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |_, input| {
        require_out(json_str, "json_str")?;
        let member = c_str(member_name, "member_name")?;
        *json_str = into_c_string(input.get_json_member(index(sample_index)?, member)?)?;
        Ok(())
    })
}

// ============================================================================
// Sample info
// ============================================================================

/// Boolean field of the sample info (`valid_data`).
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` and `name` must be valid null-terminated C strings.
/// - `return_value` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn connector_get_boolean_from_infos(
    self_: *mut DdsConnector,
    return_value: *mut c_int,
    entity_name: *const c_char,
    sample_index: c_int,
    name: *const c_char,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |_, input| {
        require_out(return_value, "return_value")?;
        let value = input.get_info_boolean(index(sample_index)?, c_str(name, "name")?)?;
        *return_value = c_int::from(value);
        Ok(())
    })
}

/// One sample info field as JSON.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` and `name` must be valid null-terminated C strings.
/// - `value` must be valid for writes; release the result with
///   `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_get_json_from_infos(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    sample_index: c_int,
    name: *const c_char,
    value: *mut *mut c_char,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |_, input| {
        require_out(value, "value")?;
        let json = input.get_info_json(index(sample_index)?, c_str(name, "name")?)?;
        *value = into_c_string(json)?;
        Ok(())
    })
}

/// Any sample info field. Scalars map to their kind, composite fields
/// come back as JSON text and absent fields as `CONNECTOR_ANY_NONE`.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` and `name` must be valid null-terminated C strings.
/// - Out-pointers must be valid for writes; a returned string must be
///   released with `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_get_any_from_info(
    self_: *mut DdsConnector,
    double_value_out: *mut c_double,
    bool_value_out: *mut c_int,
    string_value_out: *mut *mut c_char,
    selected: *mut ConnectorAnyValueKind,
    entity_name: *const c_char,
    sample_index: c_int,
    name: *const c_char,
) -> ConnectorRetcode {
    on_input(self_, entity_name, |_, input| {
        let name = c_str(name, "name")?;
        let json = input.get_info_json(index(sample_index)?, name)?;
        let value = serde_json::from_str::<Value>(&json)
            .map_err(|e| Error::Runtime(format!("sample info field '{}': {}", name, e)))?;
        let value = match value {
            Value::Null => {
                require_out(selected, "selected")?;
                *selected = ConnectorAnyValueKind::ConnectorAnyNone;
                return Ok(());
            }
            Value::Bool(b) => FieldValue::Boolean(b),
            Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or_default()),
            Value::String(s) => FieldValue::String(s),
            composite => FieldValue::String(composite.to_string()),
        };
        store_any(value, double_value_out, bool_value_out, string_value_out, selected)
    })
}

// ============================================================================
// Native samples
// ============================================================================

/// Direct handle to a loaded sample.
///
/// # Safety
/// - `self_` must be a valid pointer returned from `connector_new`.
/// - `entity_name` must be a valid null-terminated C string.
/// - The handle stays valid until the next read, take or clear on this
///   input, or until the connector is deleted.
///
/// # Returns
/// Sample handle, or NULL on failure. Repeated calls for the same index
/// return the same handle.
#[no_mangle]
pub unsafe extern "C" fn connector_get_native_sample(
    self_: *mut DdsConnector,
    entity_name: *const c_char,
    sample_index: c_int,
) -> *mut DdsNativeSample {
    let mut handle = ptr::null_mut();
    let code = on_input(self_, entity_name, |foreign, input| {
        let sample_index = index(sample_index)?;
        handle = foreign.pinned_sample(input.name(), sample_index, || {
            let sample = input.native_sample(sample_index)?;
            Ok(NativeSampleRef {
                data: sample.data().clone(),
                info: sample.info().clone(),
            })
        })?;
        Ok(())
    });
    if code == ConnectorRetcode::ConnectorOk {
        handle
    } else {
        ptr::null_mut()
    }
}

/// Data of a native sample as JSON.
///
/// # Safety
/// - `sample` must be a live handle from `connector_get_native_sample`.
/// - `json_str` must be valid for writes; release the result with
///   `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_native_sample_get_json(
    sample: *mut DdsNativeSample,
    json_str: *mut *mut c_char,
) -> ConnectorRetcode {
    let Some(sample) = sample.cast::<NativeSampleRef>().as_ref() else {
        return deleted("sample");
    };
    finish(require_out(json_str, "json_str").and_then(|()| {
        *json_str = into_c_string(sample.data.to_json().to_string())?;
        Ok(())
    }))
}

/// Info of a native sample as a JSON object.
///
/// # Safety
/// - `sample` must be a live handle from `connector_get_native_sample`.
/// - `json_str` must be valid for writes; release the result with
///   `connector_free_string`.
#[no_mangle]
pub unsafe extern "C" fn connector_native_sample_get_info_json(
    sample: *mut DdsNativeSample,
    json_str: *mut *mut c_char,
) -> ConnectorRetcode {
    let Some(sample) = sample.cast::<NativeSampleRef>().as_ref() else {
        return deleted("sample");
    };
    finish(require_out(json_str, "json_str").and_then(|()| {
        *json_str = into_c_string(sample.info.to_json().to_string())?;
        Ok(())
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::all)]
    use super::*;
    use crate::test_support::*;
    use crate::{
        connector_delete, connector_set_number_into_samples, connector_set_string_into_samples,
        connector_write, ConnectorErrorKind,
    };
    use std::ffi::CString;

    fn cs(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    unsafe fn publish(connector: *mut DdsConnector, temp: f64, label: &str) {
        let w = cs("Pub::W");
        assert_eq!(
            connector_set_number_into_samples(connector, w.as_ptr(), cs("temp").as_ptr(), temp),
            ConnectorRetcode::ConnectorOk
        );
        assert_eq!(
            connector_set_string_into_samples(
                connector,
                w.as_ptr(),
                cs("label").as_ptr(),
                cs(label).as_ptr()
            ),
            ConnectorRetcode::ConnectorOk
        );
        assert_eq!(
            connector_write(connector, w.as_ptr(), ptr::null()),
            ConnectorRetcode::ConnectorOk
        );
    }

    #[test]
    fn test_take_and_getters() {
        let _guard = serial();
        let connector = open(false);
        let r = cs("Sub::R");
        unsafe {
            publish(connector, 21.5, "kitchen");
            publish(connector, 22.5, "garage");
            assert_eq!(connector_take(connector, r.as_ptr()), ConnectorRetcode::ConnectorOk);

            let mut count = 0.0;
            assert_eq!(
                connector_get_sample_count(connector, r.as_ptr(), &mut count),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(count, 2.0);

            let mut temp = 0.0;
            assert_eq!(
                connector_get_number_from_sample(connector, &mut temp, r.as_ptr(), 1, cs("temp").as_ptr()),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(temp, 22.5);

            let mut alarm: c_int = -1;
            assert_eq!(
                connector_get_boolean_from_sample(connector, &mut alarm, r.as_ptr(), 0, cs("alarm").as_ptr()),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(alarm, 0);

            let mut label = ptr::null_mut();
            assert_eq!(
                connector_get_string_from_sample(connector, &mut label, r.as_ptr(), 0, cs("label").as_ptr()),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(take_string(label), "kitchen");

            let mut json = ptr::null_mut();
            assert_eq!(
                connector_get_json_member(connector, r.as_ptr(), 1, cs("label").as_ptr(), &mut json),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(take_string(json), "\"garage\"");

            let mut json = ptr::null_mut();
            assert_eq!(
                connector_get_json_sample(connector, r.as_ptr(), 0, &mut json),
                ConnectorRetcode::ConnectorOk
            );
            let sample: Value = serde_json::from_str(&take_string(json)).unwrap();
            assert_eq!(sample["temp"], 21.5);

            connector_delete(connector);
        }
    }

    #[test]
    fn test_getter_errors_set_last_error() {
        let _guard = serial();
        let connector = open(false);
        let r = cs("Sub::R");
        unsafe {
            publish(connector, 1.0, "a");
            connector_take(connector, r.as_ptr());

            let mut temp = 0.0;
            assert_eq!(
                connector_get_number_from_sample(connector, &mut temp, r.as_ptr(), 5, cs("temp").as_ptr()),
                ConnectorRetcode::ConnectorBadParameter
            );
            assert!(last_error().contains("Index out of range"));
            assert_eq!(
                crate::connector_get_last_error_kind(),
                ConnectorErrorKind::ConnectorErrorIndexOutOfRange
            );

            assert_eq!(
                connector_get_number_from_sample(connector, &mut temp, r.as_ptr(), -1, cs("temp").as_ptr()),
                ConnectorRetcode::ConnectorBadParameter
            );

            assert_eq!(
                connector_get_number_from_sample(connector, &mut temp, r.as_ptr(), 0, cs("nope").as_ptr()),
                ConnectorRetcode::ConnectorBadParameter
            );
            assert!(last_error().contains("nope"));
            assert_eq!(
                crate::connector_get_last_error_kind(),
                ConnectorErrorKind::ConnectorErrorFieldNotFound
            );

            assert_eq!(
                connector_get_number_from_sample(connector, &mut temp, r.as_ptr(), 0, cs("label").as_ptr()),
                ConnectorRetcode::ConnectorBadParameter
            );
            assert!(last_error().contains("Type mismatch"));
            assert_eq!(
                crate::connector_get_last_error_kind(),
                ConnectorErrorKind::ConnectorErrorTypeMismatch
            );

            assert_eq!(
                connector_take(connector, cs("Sub::Missing").as_ptr()),
                ConnectorRetcode::ConnectorBadParameter
            );
            assert!(last_error().contains("Sub::Missing"));
            assert_eq!(
                crate::connector_get_last_error_kind(),
                ConnectorErrorKind::ConnectorErrorEntityNotFound
            );

            assert_eq!(
                connector_take(ptr::null_mut(), r.as_ptr()),
                ConnectorRetcode::ConnectorAlreadyDeleted
            );
            assert_eq!(
                crate::connector_get_last_error_kind(),
                ConnectorErrorKind::ConnectorErrorAlreadyDeleted
            );
            assert_eq!(
                connector_get_sample_count(connector, r.as_ptr(), ptr::null_mut()),
                ConnectorRetcode::ConnectorBadParameter
            );

            connector_delete(connector);
        }
    }

    #[test]
    fn test_one_based_indexes() {
        let _guard = serial();
        let connector = open(true);
        let r = cs("Sub::R");
        unsafe {
            publish(connector, 5.0, "first");
            connector_take(connector, r.as_ptr());

            let mut temp = 0.0;
            assert_eq!(
                connector_get_number_from_sample(connector, &mut temp, r.as_ptr(), 1, cs("temp").as_ptr()),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(temp, 5.0);
            assert_eq!(
                connector_get_number_from_sample(connector, &mut temp, r.as_ptr(), 0, cs("temp").as_ptr()),
                ConnectorRetcode::ConnectorBadParameter
            );

            connector_delete(connector);
        }
    }

    #[test]
    fn test_any_getters() {
        let _guard = serial();
        let connector = open(false);
        let r = cs("Sub::R");
        unsafe {
            publish(connector, 7.5, "any");
            connector_take(connector, r.as_ptr());

            let mut number = 0.0;
            let mut boolean: c_int = -1;
            let mut string = ptr::null_mut();
            let mut kind = ConnectorAnyValueKind::ConnectorAnyNone;

            assert_eq!(
                connector_get_any_from_sample(
                    connector, &mut number, &mut boolean, &mut string, &mut kind,
                    r.as_ptr(), 0, cs("temp").as_ptr()
                ),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(kind, ConnectorAnyValueKind::ConnectorAnyNumber);
            assert_eq!(number, 7.5);

            assert_eq!(
                connector_get_any_from_sample(
                    connector, &mut number, &mut boolean, &mut string, &mut kind,
                    r.as_ptr(), 0, cs("label").as_ptr()
                ),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(kind, ConnectorAnyValueKind::ConnectorAnyString);
            assert_eq!(take_string(string), "any");

            assert_eq!(
                connector_get_any_from_info(
                    connector, &mut number, &mut boolean, &mut string, &mut kind,
                    r.as_ptr(), 0, cs("valid_data").as_ptr()
                ),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(kind, ConnectorAnyValueKind::ConnectorAnyBoolean);
            assert_eq!(boolean, 1);

            let mut string = ptr::null_mut();
            assert_eq!(
                connector_get_any_from_info(
                    connector, &mut number, &mut boolean, &mut string, &mut kind,
                    r.as_ptr(), 0, cs("instance_state").as_ptr()
                ),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(kind, ConnectorAnyValueKind::ConnectorAnyString);
            assert_eq!(take_string(string), "ALIVE");

            assert_eq!(
                connector_get_any_from_info(
                    connector, &mut number, &mut boolean, &mut string, &mut kind,
                    r.as_ptr(), 0, cs("related_sample_identity").as_ptr()
                ),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(kind, ConnectorAnyValueKind::ConnectorAnyNone);

            connector_delete(connector);
        }
    }

    #[test]
    fn test_infos() {
        let _guard = serial();
        let connector = open(false);
        let r = cs("Sub::R");
        unsafe {
            publish(connector, 1.0, "x");
            connector_read(connector, r.as_ptr());

            let mut valid: c_int = 0;
            assert_eq!(
                connector_get_boolean_from_infos(connector, &mut valid, r.as_ptr(), 0, cs("valid_data").as_ptr()),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(valid, 1);

            let mut json = ptr::null_mut();
            assert_eq!(
                connector_get_json_from_infos(connector, r.as_ptr(), 0, cs("sample_state").as_ptr(), &mut json),
                ConnectorRetcode::ConnectorOk
            );
            assert_eq!(take_string(json), "\"NOT_READ\"");

            let mut json = ptr::null_mut();
            assert_eq!(
                connector_get_json_from_infos(connector, r.as_ptr(), 0, cs("bogus").as_ptr(), &mut json),
                ConnectorRetcode::ConnectorBadParameter
            );
            assert!(json.is_null());

            connector_delete(connector);
        }
    }

    #[test]
    fn test_native_sample_and_reader_handle() {
        let _guard = serial();
        let connector = open(false);
        let r = cs("Sub::R");
        unsafe {
            let reader = connector_get_datareader(connector, r.as_ptr());
            assert!(!reader.is_null());
            assert_eq!(connector_get_datareader(connector, r.as_ptr()), reader);
            assert!(connector_get_datareader(connector, cs("Pub::W").as_ptr()).is_null());

            publish(connector, 3.25, "native");
            connector_take(connector, r.as_ptr());
            let sample = connector_get_native_sample(connector, r.as_ptr(), 0);
            assert!(!sample.is_null());

            // Polling the same sample reuses one pinned copy
            for _ in 0..100 {
                assert_eq!(connector_get_native_sample(connector, r.as_ptr(), 0), sample);
            }
            let foreign = crate::connector_ref(connector).unwrap();
            assert_eq!(crate::lock(&foreign.native_samples)["Sub::R"].len(), 1);

            let mut json = ptr::null_mut();
            assert_eq!(connector_native_sample_get_json(sample, &mut json), ConnectorRetcode::ConnectorOk);
            let data: Value = serde_json::from_str(&take_string(json)).unwrap();
            assert_eq!(data["label"], "native");

            let mut json = ptr::null_mut();
            assert_eq!(
                connector_native_sample_get_info_json(sample, &mut json),
                ConnectorRetcode::ConnectorOk
            );
            let info: Value = serde_json::from_str(&take_string(json)).unwrap();
            assert_eq!(info["valid_data"], true);

            assert!(connector_get_native_sample(connector, r.as_ptr(), 4).is_null());
            assert_eq!(
                connector_native_sample_get_json(ptr::null_mut(), &mut json),
                ConnectorRetcode::ConnectorAlreadyDeleted
            );

            connector_delete(connector);
        }
    }
}
