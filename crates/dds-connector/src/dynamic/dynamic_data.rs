// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DynamicData container for runtime data manipulation.

use crate::dynamic::{
    DynamicValue, FieldValue, MemberPath, PathSegment, PrimitiveKind, TypeDescriptor, TypeKind,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Errors for DynamicData operations.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicDataError {
    FieldNotFound(String),
    TypeMismatch { expected: String, got: String },
    InvalidOperation(String),
    IndexOutOfBounds { index: usize, length: usize },
    SequenceTooLong { length: usize, max: usize },
    StringTooLong { length: usize, max: usize },
    InvalidValue(String),
    InvalidJson(String),
}

impl fmt::Display for DynamicDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotFound(name) => write!(f, "Field not found: {}", name),
            Self::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Self::InvalidOperation(msg) => write!(f, "Invalid operation for type: {}", msg),
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "Index out of bounds: {} >= {}", index, length)
            }
            Self::SequenceTooLong { length, max } => {
                write!(f, "Sequence length exceeds maximum: {} > {}", length, max)
            }
            Self::StringTooLong { length, max } => {
                write!(f, "String length exceeds maximum: {} > {}", length, max)
            }
            Self::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            Self::InvalidJson(msg) => write!(f, "Invalid JSON: {}", msg),
        }
    }
}

impl std::error::Error for DynamicDataError {}

/// Dynamic data container with runtime type checking.
#[derive(Debug, Clone)]
pub struct DynamicData {
    /// Type descriptor.
    descriptor: Arc<TypeDescriptor>,
    /// Actual value.
    value: DynamicValue,
}

impl DynamicData {
    /// Create new DynamicData with default values.
    pub fn new(descriptor: &Arc<TypeDescriptor>) -> Self {
        Self {
            descriptor: descriptor.clone(),
            value: default_value(descriptor),
        }
    }

    /// Get the type descriptor.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Get the type name.
    pub fn type_name(&self) -> &str {
        &self.descriptor.name
    }

    /// Get the underlying value.
    pub fn value(&self) -> &DynamicValue {
        &self.value
    }

    /// Get mutable reference to value.
    pub fn value_mut(&mut self) -> &mut DynamicValue {
        &mut self.value
    }

    /// Reset every member to its type default.
    pub fn reset(&mut self) {
        self.value = default_value(&self.descriptor);
    }

    /// Copy holding only the key members of this sample; the rest are defaults.
    pub fn key_only(&self) -> Self {
        let mut out = Self::new(&self.descriptor);
        for field in self.descriptor.key_fields() {
            if let Some(v) = self.value.get_field(&field.name) {
                out.value.set_field(field.name.clone(), v.clone());
            }
        }
        out
    }

    /// Resolve a member for reading.
    pub fn member(
        &self,
        path: &MemberPath,
    ) -> Result<(&TypeDescriptor, &DynamicValue), DynamicDataError> {
        resolve(&self.descriptor, &self.value, path)
    }

    /// Read a boolean member.
    pub fn get_boolean(&self, path: &MemberPath) -> Result<bool, DynamicDataError> {
        let (desc, value) = self.member(path)?;
        value
            .as_bool()
            .ok_or_else(|| mismatch("boolean", desc.kind_name()))
    }

    /// Read a numeric or enum member; `#seq` yields the element count.
    pub fn get_number(&self, path: &MemberPath) -> Result<f64, DynamicDataError> {
        let (desc, value) = self.member(path)?;
        if path.is_length_query() {
            return value
                .as_sequence()
                .map(|items| items.len() as f64)
                .ok_or_else(|| mismatch("sequence", desc.kind_name()));
        }
        value
            .as_number()
            .ok_or_else(|| mismatch("number", desc.kind_name()))
    }

    /// Read a string or char member.
    pub fn get_string(&self, path: &MemberPath) -> Result<String, DynamicDataError> {
        let (desc, value) = self.member(path)?;
        match value {
            DynamicValue::String(s) => Ok(s.clone()),
            DynamicValue::Char(c) => Ok(c.to_string()),
            _ => Err(mismatch("string", desc.kind_name())),
        }
    }

    /// Read any scalar member.
    pub fn get_value(&self, path: &MemberPath) -> Result<FieldValue, DynamicDataError> {
        if path.is_length_query() {
            return self.get_number(path).map(FieldValue::Number);
        }
        let (desc, value) = self.member(path)?;
        FieldValue::from_dynamic(value).ok_or_else(|| mismatch("primitive", desc.kind_name()))
    }

    /// Write a boolean member.
    pub fn set_boolean(&mut self, path: &MemberPath, v: bool) -> Result<(), DynamicDataError> {
        let (desc, slot) = self.member_for_write(path)?;
        match desc.primitive_kind() {
            Some(PrimitiveKind::Bool) => {
                *slot = DynamicValue::Bool(v);
                Ok(())
            }
            _ => Err(mismatch(desc.kind_name(), "boolean")),
        }
    }

    /// Write a numeric or enum member.
    pub fn set_number(&mut self, path: &MemberPath, v: f64) -> Result<(), DynamicDataError> {
        let (desc, slot) = self.member_for_write(path)?;
        *slot = number_value(desc, v)?;
        Ok(())
    }

    /// Write a string, char or enum (by enumerator name) member.
    pub fn set_string(&mut self, path: &MemberPath, v: &str) -> Result<(), DynamicDataError> {
        let (desc, slot) = self.member_for_write(path)?;
        *slot = string_value(desc, v)?;
        Ok(())
    }

    /// Reset one member to its default. Sequences are emptied.
    pub fn clear_member(&mut self, path: &MemberPath) -> Result<(), DynamicDataError> {
        let (desc, slot) = resolve_mut(&self.descriptor, &mut self.value, path, false)?;
        match &desc.resolved().kind {
            TypeKind::Primitive(_) | TypeKind::Enum(_) | TypeKind::Sequence(_) => {
                *slot = default_value(desc);
                Ok(())
            }
            _ => Err(DynamicDataError::InvalidOperation(format!(
                "cannot clear {} member '{}'",
                desc.kind_name(),
                path
            ))),
        }
    }

    fn member_for_write(
        &mut self,
        path: &MemberPath,
    ) -> Result<(&TypeDescriptor, &mut DynamicValue), DynamicDataError> {
        if path.is_length_query() {
            return Err(DynamicDataError::InvalidOperation(format!(
                "'{}' is read-only",
                path
            )));
        }
        resolve_mut(&self.descriptor, &mut self.value, path, true)
    }
}

impl PartialEq for DynamicData {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.name == other.descriptor.name && self.value == other.value
    }
}

/// Check a path against a type without touching any value.
///
/// Element indexes are not bounds-checked here.
pub fn member_type<'a>(
    descriptor: &'a TypeDescriptor,
    path: &MemberPath,
) -> Result<&'a TypeDescriptor, DynamicDataError> {
    let mut desc = descriptor;
    for segment in path.segments() {
        desc = match (&desc.resolved().kind, segment) {
            (TypeKind::Struct(fields), PathSegment::Field(name)) => fields
                .iter()
                .find(|f| &f.name == name)
                .map(|f| f.type_desc.as_ref())
                .ok_or_else(|| not_found(path))?,
            (TypeKind::Sequence(seq), PathSegment::Index(_)) => seq.element_type.as_ref(),
            (TypeKind::Array(arr), PathSegment::Index(_)) => arr.element_type.as_ref(),
            _ => return Err(not_found(path)),
        };
    }
    Ok(desc)
}

fn resolve<'a>(
    descriptor: &'a TypeDescriptor,
    value: &'a DynamicValue,
    path: &MemberPath,
) -> Result<(&'a TypeDescriptor, &'a DynamicValue), DynamicDataError> {
    let mut desc = descriptor;
    let mut current = value;
    for segment in path.segments() {
        let (next_desc, next_value) = match (&desc.resolved().kind, segment) {
            (TypeKind::Struct(fields), PathSegment::Field(name)) => {
                let field = fields
                    .iter()
                    .find(|f| &f.name == name)
                    .ok_or_else(|| not_found(path))?;
                let v = current.get_field(name).ok_or_else(|| not_found(path))?;
                (field.type_desc.as_ref(), v)
            }
            (TypeKind::Sequence(seq), PathSegment::Index(i)) => {
                (seq.element_type.as_ref(), element(current, *i)?)
            }
            (TypeKind::Array(arr), PathSegment::Index(i)) => {
                (arr.element_type.as_ref(), element(current, *i)?)
            }
            _ => return Err(not_found(path)),
        };
        desc = next_desc;
        current = next_value;
    }
    Ok((desc, current))
}

fn element(value: &DynamicValue, index: usize) -> Result<&DynamicValue, DynamicDataError> {
    let items = value.as_sequence().unwrap_or(&[]);
    items.get(index).ok_or(DynamicDataError::IndexOutOfBounds {
        index,
        length: items.len(),
    })
}

/// Mutable resolution. With `grow`, an index equal to a sequence's length
/// appends a default element.
fn resolve_mut<'a>(
    descriptor: &'a TypeDescriptor,
    value: &'a mut DynamicValue,
    path: &MemberPath,
    grow: bool,
) -> Result<(&'a TypeDescriptor, &'a mut DynamicValue), DynamicDataError> {
    let mut desc = descriptor;
    let mut current = value;
    for segment in path.segments() {
        let resolved = desc.resolved();
        let (next_desc, next_value) = match (&resolved.kind, segment) {
            (TypeKind::Struct(fields), PathSegment::Field(name)) => {
                let field = fields
                    .iter()
                    .find(|f| &f.name == name)
                    .ok_or_else(|| not_found(path))?;
                let v = current
                    .get_field_mut(name)
                    .ok_or_else(|| not_found(path))?;
                (field.type_desc.as_ref(), v)
            }
            (TypeKind::Sequence(seq), PathSegment::Index(i)) => {
                let DynamicValue::Sequence(items) = current else {
                    return Err(mismatch("sequence", resolved.kind_name()));
                };
                if grow && *i == items.len() {
                    if let Some(max) = seq.max_length {
                        if items.len() >= max {
                            return Err(DynamicDataError::SequenceTooLong {
                                length: items.len() + 1,
                                max,
                            });
                        }
                    }
                    items.push(default_value(&seq.element_type));
                }
                let length = items.len();
                let item = items
                    .get_mut(*i)
                    .ok_or(DynamicDataError::IndexOutOfBounds { index: *i, length })?;
                (seq.element_type.as_ref(), item)
            }
            (TypeKind::Array(arr), PathSegment::Index(i)) => {
                let DynamicValue::Array(items) = current else {
                    return Err(mismatch("array", resolved.kind_name()));
                };
                let length = items.len();
                let item = items
                    .get_mut(*i)
                    .ok_or(DynamicDataError::IndexOutOfBounds { index: *i, length })?;
                (arr.element_type.as_ref(), item)
            }
            _ => return Err(not_found(path)),
        };
        desc = next_desc;
        current = next_value;
    }
    Ok((desc, current))
}

/// Default value for a type.
pub(crate) fn default_value(desc: &TypeDescriptor) -> DynamicValue {
    match &desc.resolved().kind {
        TypeKind::Primitive(p) => default_primitive(*p),
        TypeKind::Struct(fields) => {
            let mut map = HashMap::with_capacity(fields.len());
            for field in fields {
                map.insert(field.name.clone(), default_value(&field.type_desc));
            }
            DynamicValue::Struct(map)
        }
        TypeKind::Sequence(_) => DynamicValue::Sequence(Vec::new()),
        TypeKind::Array(arr) => {
            let elem_default = default_value(&arr.element_type);
            DynamicValue::Array(vec![elem_default; arr.length])
        }
        TypeKind::Enum(e) => match e.variants.first() {
            Some(v) => DynamicValue::Enum(v.value, v.name.clone()),
            None => DynamicValue::Enum(0, String::new()),
        },
        // resolved() never returns Nested
        TypeKind::Nested(inner) => default_value(inner),
    }
}

fn default_primitive(kind: PrimitiveKind) -> DynamicValue {
    match kind {
        PrimitiveKind::Bool => DynamicValue::Bool(false),
        PrimitiveKind::U8 => DynamicValue::U8(0),
        PrimitiveKind::U16 => DynamicValue::U16(0),
        PrimitiveKind::U32 => DynamicValue::U32(0),
        PrimitiveKind::U64 => DynamicValue::U64(0),
        PrimitiveKind::I8 => DynamicValue::I8(0),
        PrimitiveKind::I16 => DynamicValue::I16(0),
        PrimitiveKind::I32 => DynamicValue::I32(0),
        PrimitiveKind::I64 => DynamicValue::I64(0),
        PrimitiveKind::F32 => DynamicValue::F32(0.0),
        PrimitiveKind::F64 => DynamicValue::F64(0.0),
        PrimitiveKind::Char => DynamicValue::Char('\0'),
        PrimitiveKind::String { .. } => DynamicValue::String(String::new()),
    }
}

/// Convert a number for storage in a member of type `desc`.
pub(crate) fn number_value(desc: &TypeDescriptor, v: f64) -> Result<DynamicValue, DynamicDataError> {
    match &desc.resolved().kind {
        TypeKind::Primitive(kind) if kind.is_integer() => {
            let in_range = kind
                .integer_range()
                .is_some_and(|(min, end)| v >= min && v < end);
            if !v.is_finite() || v.fract() != 0.0 || !in_range {
                return Err(mismatch(kind.name(), &v.to_string()));
            }
            Ok(match kind {
                PrimitiveKind::U8 => DynamicValue::U8(v as u8),
                PrimitiveKind::U16 => DynamicValue::U16(v as u16),
                PrimitiveKind::U32 => DynamicValue::U32(v as u32),
                PrimitiveKind::U64 => DynamicValue::U64(v as u64),
                PrimitiveKind::I8 => DynamicValue::I8(v as i8),
                PrimitiveKind::I16 => DynamicValue::I16(v as i16),
                PrimitiveKind::I32 => DynamicValue::I32(v as i32),
                _ => DynamicValue::I64(v as i64),
            })
        }
        // NaN and infinities have no JSON form
        TypeKind::Primitive(PrimitiveKind::F32) => {
            let narrowed = v as f32;
            if !narrowed.is_finite() {
                return Err(mismatch("float32", &v.to_string()));
            }
            Ok(DynamicValue::F32(narrowed))
        }
        TypeKind::Primitive(PrimitiveKind::F64) => {
            if !v.is_finite() {
                return Err(mismatch("float64", &v.to_string()));
            }
            Ok(DynamicValue::F64(v))
        }
        TypeKind::Enum(e) => {
            let variant = (v.fract() == 0.0)
                .then(|| e.variant_by_value(v as i64))
                .flatten()
                .ok_or_else(|| {
                    DynamicDataError::InvalidValue(format!(
                        "{} is not an enumerator of {}",
                        v,
                        desc.resolved().name
                    ))
                })?;
            Ok(DynamicValue::Enum(variant.value, variant.name.clone()))
        }
        _ => Err(mismatch(desc.kind_name(), "number")),
    }
}

/// Convert a string for storage in a member of type `desc`.
pub(crate) fn string_value(desc: &TypeDescriptor, v: &str) -> Result<DynamicValue, DynamicDataError> {
    match &desc.resolved().kind {
        TypeKind::Primitive(PrimitiveKind::String { max_length }) => {
            let length = v.chars().count();
            if let Some(max) = max_length {
                if length > *max {
                    return Err(DynamicDataError::StringTooLong { length, max: *max });
                }
            }
            Ok(DynamicValue::String(v.to_string()))
        }
        TypeKind::Primitive(PrimitiveKind::Char) => {
            let mut chars = v.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(DynamicValue::Char(c)),
                _ => Err(DynamicDataError::InvalidValue(format!(
                    "char member needs exactly one character, got {:?}",
                    v
                ))),
            }
        }
        TypeKind::Enum(e) => e
            .variant(v)
            .map(|variant| DynamicValue::Enum(variant.value, variant.name.clone()))
            .ok_or_else(|| {
                DynamicDataError::InvalidValue(format!(
                    "'{}' is not an enumerator of {}",
                    v,
                    desc.resolved().name
                ))
            }),
        _ => Err(mismatch(desc.kind_name(), "string")),
    }
}

fn not_found(path: &MemberPath) -> DynamicDataError {
    DynamicDataError::FieldNotFound(path.to_string())
}

fn mismatch(expected: &str, got: &str) -> DynamicDataError {
    DynamicDataError::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::TypeDescriptorBuilder;

    fn path(p: &str) -> MemberPath {
        MemberPath::parse(p).expect("valid path")
    }

    fn sensor_type() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptorBuilder::new("Sensor")
                .key_field("id", PrimitiveKind::U16)
                .field("temp", PrimitiveKind::F64)
                .field("alarm", PrimitiveKind::Bool)
                .bounded_string_field("label", 4)
                .bounded_sequence_field("readings", PrimitiveKind::I32, 2)
                .array_field("flags", PrimitiveKind::Bool, 2)
                .build(),
        )
    }

    #[test]
    fn test_get_set_primitives() {
        let desc = sensor_type();
        let mut data = DynamicData::new(&desc);

        data.set_number(&path("temp"), 42.5).expect("set temp");
        data.set_boolean(&path("alarm"), true).expect("set alarm");
        data.set_string(&path("label"), "hot").expect("set label");

        assert_eq!(data.get_number(&path("temp")).expect("temp"), 42.5);
        assert!(data.get_boolean(&path("alarm")).expect("alarm"));
        assert_eq!(data.get_string(&path("label")).expect("label"), "hot");
        assert_eq!(
            data.get_value(&path("alarm")).expect("any"),
            FieldValue::Boolean(true)
        );
    }

    #[test]
    fn test_kind_mismatch_and_unknown_field() {
        let desc = sensor_type();
        let mut data = DynamicData::new(&desc);

        assert!(matches!(
            data.get_boolean(&path("temp")),
            Err(DynamicDataError::TypeMismatch { .. })
        ));
        assert!(matches!(
            data.set_string(&path("alarm"), "yes"),
            Err(DynamicDataError::TypeMismatch { .. })
        ));
        assert!(matches!(
            data.get_number(&path("pressure")),
            Err(DynamicDataError::FieldNotFound(_))
        ));
        assert!(matches!(
            data.get_number(&path("temp.x")),
            Err(DynamicDataError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_integer_range_checks() {
        let desc = sensor_type();
        let mut data = DynamicData::new(&desc);

        data.set_number(&path("id"), 65535.0).expect("max u16");
        assert!(data.set_number(&path("id"), 65536.0).is_err());
        assert!(data.set_number(&path("id"), -1.0).is_err());
        assert!(data.set_number(&path("id"), 1.5).is_err());
        assert_eq!(data.get_number(&path("id")).expect("id"), 65535.0);
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        let desc = sensor_type();
        let mut data = DynamicData::new(&desc);

        data.set_number(&path("temp"), 21.5).expect("finite");
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                data.set_number(&path("temp"), bad),
                Err(DynamicDataError::TypeMismatch { .. })
            ));
        }
        assert_eq!(data.get_number(&path("temp")).expect("temp"), 21.5);
    }

    #[test]
    fn test_sequence_append_and_bounds() {
        let desc = sensor_type();
        let mut data = DynamicData::new(&desc);

        data.set_number(&path("readings[0]"), 1.0).expect("append 0");
        data.set_number(&path("readings[1]"), 2.0).expect("append 1");
        assert_eq!(data.get_number(&path("#readings")).expect("len"), 2.0);

        // bounded to 2 elements
        assert!(matches!(
            data.set_number(&path("readings[2]"), 3.0),
            Err(DynamicDataError::SequenceTooLong { .. })
        ));
        // gaps are not filled
        data.clear_member(&path("readings")).expect("clear");
        assert!(matches!(
            data.set_number(&path("readings[1]"), 3.0),
            Err(DynamicDataError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            data.get_number(&path("readings[0]")),
            Err(DynamicDataError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_string_bound() {
        let desc = sensor_type();
        let mut data = DynamicData::new(&desc);
        assert!(matches!(
            data.set_string(&path("label"), "toolong"),
            Err(DynamicDataError::StringTooLong { length: 7, max: 4 })
        ));
    }

    #[test]
    fn test_clear_member() {
        let desc = sensor_type();
        let mut data = DynamicData::new(&desc);

        data.set_boolean(&path("alarm"), true).expect("set");
        data.clear_member(&path("alarm")).expect("clear");
        assert!(!data.get_boolean(&path("alarm")).expect("get"));

        data.set_boolean(&path("flags[1]"), true).expect("set element");
        data.clear_member(&path("flags[1]")).expect("clear element");
        assert!(!data.get_boolean(&path("flags[1]")).expect("get element"));

        assert!(matches!(
            data.clear_member(&path("flags")),
            Err(DynamicDataError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_key_only() {
        let desc = sensor_type();
        let mut data = DynamicData::new(&desc);
        data.set_number(&path("id"), 7.0).expect("id");
        data.set_number(&path("temp"), 99.0).expect("temp");

        let key = data.key_only();
        assert_eq!(key.get_number(&path("id")).expect("id"), 7.0);
        assert_eq!(key.get_number(&path("temp")).expect("temp"), 0.0);
    }

    #[test]
    fn test_member_type_ignores_bounds() {
        let desc = sensor_type();
        let elem = member_type(&desc, &path("readings[40]")).expect("schema path");
        assert_eq!(elem.primitive_kind(), Some(PrimitiveKind::I32));
        assert!(member_type(&desc, &path("nope")).is_err());
    }
}
