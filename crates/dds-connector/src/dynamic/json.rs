// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON bridge for DynamicData.
//!
//! Structs map to objects (members in declaration order), sequences and arrays
//! to arrays, enums to their numeric value and chars to one-character strings.

use crate::dynamic::dynamic_data::{default_value, number_value, string_value};
use crate::dynamic::{
    DynamicData, DynamicDataError, DynamicValue, MemberPath, PrimitiveKind, TypeDescriptor,
    TypeKind,
};
use serde_json::{Map, Number, Value};

impl DynamicData {
    /// Serialize the whole sample.
    pub fn to_json(&self) -> Value {
        value_to_json(self.descriptor(), self.value())
    }

    /// Serialize one member subtree.
    pub fn member_to_json(&self, path: &MemberPath) -> Result<Value, DynamicDataError> {
        if path.is_length_query() {
            return self.get_number(path).map(|len| Value::from(len as u64));
        }
        let (desc, value) = self.member(path)?;
        Ok(value_to_json(desc, value))
    }

    /// Apply the members present in `json`; absent members keep their value.
    pub fn apply_json(&mut self, json: &Value) -> Result<(), DynamicDataError> {
        let descriptor = self.descriptor().clone();
        apply(&descriptor, self.value_mut(), json, "")
    }

    /// Parse and apply a JSON document.
    pub fn apply_json_str(&mut self, json: &str) -> Result<(), DynamicDataError> {
        let parsed: Value =
            serde_json::from_str(json).map_err(|e| DynamicDataError::InvalidJson(e.to_string()))?;
        if !parsed.is_object() {
            return Err(DynamicDataError::InvalidJson(
                "sample must be a JSON object".into(),
            ));
        }
        self.apply_json(&parsed)
    }
}

fn number(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

/// Serialize a value of type `desc`.
pub fn value_to_json(desc: &TypeDescriptor, value: &DynamicValue) -> Value {
    match (&desc.resolved().kind, value) {
        (TypeKind::Struct(fields), DynamicValue::Struct(members)) => {
            let mut map = Map::with_capacity(fields.len());
            for field in fields {
                if let Some(member) = members.get(&field.name) {
                    map.insert(field.name.clone(), value_to_json(&field.type_desc, member));
                }
            }
            Value::Object(map)
        }
        (TypeKind::Sequence(seq), DynamicValue::Sequence(items)) => Value::Array(
            items
                .iter()
                .map(|item| value_to_json(&seq.element_type, item))
                .collect(),
        ),
        (TypeKind::Array(arr), DynamicValue::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| value_to_json(&arr.element_type, item))
                .collect(),
        ),
        (_, DynamicValue::Bool(v)) => Value::Bool(*v),
        (_, DynamicValue::U8(v)) => Value::from(*v),
        (_, DynamicValue::U16(v)) => Value::from(*v),
        (_, DynamicValue::U32(v)) => Value::from(*v),
        (_, DynamicValue::U64(v)) => Value::from(*v),
        (_, DynamicValue::I8(v)) => Value::from(*v),
        (_, DynamicValue::I16(v)) => Value::from(*v),
        (_, DynamicValue::I32(v)) => Value::from(*v),
        (_, DynamicValue::I64(v)) => Value::from(*v),
        (_, DynamicValue::F32(v)) => number(f64::from(*v)),
        (_, DynamicValue::F64(v)) => number(*v),
        (_, DynamicValue::Char(c)) => Value::String(c.to_string()),
        (_, DynamicValue::String(s)) => Value::String(s.clone()),
        (_, DynamicValue::Enum(v, _)) => Value::from(*v),
        // value shape disagrees with its descriptor
        _ => Value::Null,
    }
}

fn invalid(at: &str, msg: impl std::fmt::Display) -> DynamicDataError {
    if at.is_empty() {
        DynamicDataError::InvalidJson(msg.to_string())
    } else {
        DynamicDataError::InvalidJson(format!("{}: {}", at, msg))
    }
}

fn child(at: &str, name: &str) -> String {
    if at.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", at, name)
    }
}

fn apply(
    desc: &TypeDescriptor,
    slot: &mut DynamicValue,
    json: &Value,
    at: &str,
) -> Result<(), DynamicDataError> {
    if json.is_null() {
        *slot = default_value(desc);
        return Ok(());
    }

    match &desc.resolved().kind {
        TypeKind::Struct(fields) => {
            let Value::Object(object) = json else {
                return Err(invalid(at, "expected an object"));
            };
            for (name, member_json) in object {
                let field = fields
                    .iter()
                    .find(|f| &f.name == name)
                    .ok_or_else(|| invalid(at, format!("unknown member '{}'", name)))?;
                let member = slot
                    .get_field_mut(name)
                    .ok_or_else(|| invalid(at, format!("unknown member '{}'", name)))?;
                apply(&field.type_desc, member, member_json, &child(at, name))?;
            }
            Ok(())
        }
        TypeKind::Sequence(seq) => {
            let items = elements(&seq.element_type, json, at)?;
            if let Some(max) = seq.max_length {
                if items.len() > max {
                    return Err(invalid(
                        at,
                        format!("{} elements exceed the bound of {}", items.len(), max),
                    ));
                }
            }
            *slot = DynamicValue::Sequence(items);
            Ok(())
        }
        TypeKind::Array(arr) => {
            let items = elements(&arr.element_type, json, at)?;
            if items.len() != arr.length {
                return Err(invalid(
                    at,
                    format!("expected {} elements, got {}", arr.length, items.len()),
                ));
            }
            *slot = DynamicValue::Array(items);
            Ok(())
        }
        TypeKind::Enum(_) | TypeKind::Primitive(_) => {
            *slot = scalar(desc, json).map_err(|e| invalid(at, e))?;
            Ok(())
        }
        TypeKind::Nested(_) => Err(invalid(at, "unresolved nested type")),
    }
}

fn elements(
    element_type: &TypeDescriptor,
    json: &Value,
    at: &str,
) -> Result<Vec<DynamicValue>, DynamicDataError> {
    let Value::Array(items) = json else {
        return Err(invalid(at, "expected an array"));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut value = default_value(element_type);
            apply(element_type, &mut value, item, &format!("{}[{}]", at, i))?;
            Ok(value)
        })
        .collect()
}

fn scalar(desc: &TypeDescriptor, json: &Value) -> Result<DynamicValue, DynamicDataError> {
    match json {
        Value::Bool(b) if desc.primitive_kind() == Some(PrimitiveKind::Bool) => {
            Ok(DynamicValue::Bool(*b))
        }
        Value::Number(n) => {
            let v = n
                .as_f64()
                .ok_or_else(|| DynamicDataError::InvalidValue(n.to_string()))?;
            // 64-bit integers beyond 2^53 keep full precision
            match (&desc.resolved().kind, n.as_u64(), n.as_i64()) {
                (TypeKind::Primitive(PrimitiveKind::U64), Some(u), _) => {
                    Ok(DynamicValue::U64(u))
                }
                (TypeKind::Primitive(PrimitiveKind::I64), _, Some(i)) => {
                    Ok(DynamicValue::I64(i))
                }
                _ => number_value(desc, v),
            }
        }
        Value::String(s) => string_value(desc, s),
        other => Err(DynamicDataError::TypeMismatch {
            expected: desc.kind_name().to_string(),
            got: json_kind(other).to_string(),
        }),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{EnumDescriptor, EnumVariant, TypeDescriptorBuilder};
    use serde_json::json;
    use std::sync::Arc;

    fn shape_type() -> Arc<TypeDescriptor> {
        let fill = Arc::new(TypeDescriptor::new(
            "ShapeFillKind",
            TypeKind::Enum(EnumDescriptor::new(vec![
                EnumVariant::new("SOLID_FILL", 0),
                EnumVariant::new("TRANSPARENT_FILL", 1),
            ])),
        ));
        let point = Arc::new(
            TypeDescriptorBuilder::new("Point")
                .field("x", PrimitiveKind::I32)
                .field("y", PrimitiveKind::I32)
                .build(),
        );
        Arc::new(
            TypeDescriptorBuilder::new("Shape")
                .key_field("color", PrimitiveKind::String { max_length: Some(16) })
                .nested_field("origin", point.clone())
                .field_with_type("fill", fill)
                .field("angle", PrimitiveKind::F32)
                .sequence_of("trail", point)
                .array_field("tag", PrimitiveKind::Char, 2)
                .build(),
        )
    }

    #[test]
    fn test_to_json_declaration_order() {
        let data = DynamicData::new(&shape_type());
        let text = serde_json::to_string(&data.to_json()).expect("serialize");
        assert_eq!(
            text,
            r#"{"color":"","origin":{"x":0,"y":0},"fill":0,"angle":0.0,"trail":[],"tag":["\u0000","\u0000"]}"#
        );
    }

    #[test]
    fn test_apply_partial_json() {
        let mut data = DynamicData::new(&shape_type());
        data.apply_json(&json!({"color": "RED", "origin": {"x": 5}}))
            .expect("first apply");
        data.apply_json(&json!({"origin": {"y": 7}, "fill": "TRANSPARENT_FILL"}))
            .expect("second apply");

        let out = data.to_json();
        assert_eq!(out["color"], "RED");
        assert_eq!(out["origin"], json!({"x": 5, "y": 7}));
        assert_eq!(out["fill"], 1);
    }

    #[test]
    fn test_apply_sequences_and_arrays() {
        let mut data = DynamicData::new(&shape_type());
        data.apply_json(&json!({
            "trail": [{"x": 1, "y": 2}, {"x": 3}],
            "tag": ["a", "b"],
        }))
        .expect("apply");

        let out = data.to_json();
        assert_eq!(out["trail"], json!([{"x": 1, "y": 2}, {"x": 3, "y": 0}]));
        assert_eq!(out["tag"], json!(["a", "b"]));

        let err = data.apply_json(&json!({"tag": ["a"]})).unwrap_err();
        assert!(matches!(err, DynamicDataError::InvalidJson(_)));
    }

    #[test]
    fn test_apply_rejects_incompatible_json() {
        let mut data = DynamicData::new(&shape_type());
        for bad in [
            json!({"nope": 1}),
            json!({"origin": 3}),
            json!({"origin": {"x": 1.5}}),
            json!({"angle": "wide"}),
            json!({"fill": 9}),
            json!({"color": "ABCDEFGHIJKLMNOPQRSTUVWXYZ"}),
        ] {
            let err = data.apply_json(&bad).unwrap_err();
            assert!(
                matches!(err, DynamicDataError::InvalidJson(_)),
                "{} gave {:?}",
                bad,
                err
            );
        }
        assert!(data.apply_json_str("{not json").is_err());
        assert!(data.apply_json_str("[1, 2]").is_err());
    }

    #[test]
    fn test_null_resets_member() {
        let mut data = DynamicData::new(&shape_type());
        data.apply_json(&json!({"angle": 12.5})).expect("set");
        data.apply_json(&json!({"angle": null})).expect("reset");
        assert_eq!(data.to_json()["angle"], json!(0.0));
    }

    #[test]
    fn test_member_to_json() {
        let mut data = DynamicData::new(&shape_type());
        data.apply_json(&json!({"trail": [{"x": 4, "y": 5}]}))
            .expect("apply");
        let member = data
            .member_to_json(&MemberPath::parse("trail[0]").expect("path"))
            .expect("member");
        assert_eq!(member, json!({"x": 4, "y": 5}));
        let len = data
            .member_to_json(&MemberPath::parse("#trail").expect("path"))
            .expect("len");
        assert_eq!(len, json!(1));
    }

    #[test]
    fn test_u64_full_precision() {
        let desc = Arc::new(
            TypeDescriptorBuilder::new("Big")
                .field("n", PrimitiveKind::U64)
                .build(),
        );
        let mut data = DynamicData::new(&desc);
        data.apply_json(&json!({"n": u64::MAX})).expect("apply");
        assert_eq!(data.to_json()["n"], json!(u64::MAX));
    }
}
