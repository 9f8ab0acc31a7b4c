// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Resolution of configured type definitions into `TypeDescriptor`s.

use super::yaml::{YamlMember, YamlType};
use super::ConfigError;
use crate::dynamic::{
    ArrayDescriptor, EnumBuilder, FieldDescriptor, PrimitiveKind, SequenceDescriptor,
    TypeDescriptor, TypeDescriptorBuilder, TypeKind,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves named types on demand, caching each one.
pub struct TypeResolver<'a> {
    definitions: &'a HashMap<String, YamlType>,
    cache: HashMap<String, Arc<TypeDescriptor>>,
    in_progress: Vec<String>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(definitions: &'a HashMap<String, YamlType>) -> Self {
        Self {
            definitions,
            cache: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// Resolve a named type (struct or enum).
    pub fn resolve(&mut self, name: &str) -> Result<Arc<TypeDescriptor>, ConfigError> {
        if let Some(desc) = self.cache.get(name) {
            return Ok(Arc::clone(desc));
        }
        if self.in_progress.iter().any(|n| n == name) {
            let mut chain = self.in_progress.join(" -> ");
            chain.push_str(" -> ");
            chain.push_str(name);
            return Err(ConfigError::RecursiveType(chain));
        }
        let definitions = self.definitions;
        let def = definitions
            .get(name)
            .ok_or_else(|| ConfigError::UnknownType(name.to_string()))?;

        self.in_progress.push(name.to_string());
        let built = self.build(name, def);
        self.in_progress.pop();

        let desc = Arc::new(built?);
        log::debug!("[TypeResolver] resolved type '{}' ({})", name, desc.kind_name());
        self.cache.insert(name.to_string(), Arc::clone(&desc));
        Ok(desc)
    }

    fn build(&mut self, name: &str, def: &YamlType) -> Result<TypeDescriptor, ConfigError> {
        match (&def.members, &def.enumerators) {
            (Some(members), None) => {
                let mut builder = TypeDescriptorBuilder::new(name);
                let mut seen: Vec<&str> = Vec::with_capacity(members.len());
                for member in members {
                    if seen.contains(&member.name.as_str()) {
                        return Err(ConfigError::InvalidType(format!(
                            "{}: duplicate member '{}'",
                            name, member.name
                        )));
                    }
                    seen.push(&member.name);
                    builder = builder.member(self.member(name, member)?);
                }
                Ok(builder.build())
            }
            (None, Some(enumerators)) => {
                if enumerators.is_empty() {
                    return Err(ConfigError::InvalidType(format!(
                        "{}: enum has no enumerators",
                        name
                    )));
                }
                let builder = enumerators
                    .iter()
                    .fold(EnumBuilder::new(name), |b, e| match e.value {
                        Some(v) => b.variant_value(&e.name, v),
                        None => b.variant(&e.name),
                    });
                Ok(builder.build())
            }
            _ => Err(ConfigError::InvalidType(format!(
                "{}: declare exactly one of 'members' or 'enumerators'",
                name
            ))),
        }
    }

    fn member(&mut self, owner: &str, m: &YamlMember) -> Result<FieldDescriptor, ConfigError> {
        let mut type_desc = match PrimitiveKind::from_name(&m.type_name) {
            Some(PrimitiveKind::String { .. }) => Arc::new(TypeDescriptor::primitive(
                "",
                PrimitiveKind::String {
                    max_length: m.string_max_length,
                },
            )),
            Some(_) if m.string_max_length.is_some() => {
                return Err(ConfigError::InvalidType(format!(
                    "{}.{}: string_max_length on non-string member",
                    owner, m.name
                )))
            }
            Some(kind) => Arc::new(TypeDescriptor::primitive("", kind)),
            None => self.resolve(&m.type_name)?,
        };

        // Wrapping order: element, then sequence, then array dimensions
        // (first dimension outermost).
        if let Some(max) = m.sequence_max_length {
            let seq = match usize::try_from(max) {
                Ok(max) => SequenceDescriptor::bounded(type_desc, max),
                Err(_) => SequenceDescriptor::unbounded(type_desc),
            };
            type_desc = Arc::new(TypeDescriptor::new("", TypeKind::Sequence(seq)));
        }
        if let Some(ref dims) = m.array_dimensions {
            for &dim in dims.iter().rev() {
                if dim == 0 {
                    return Err(ConfigError::InvalidType(format!(
                        "{}.{}: array dimension must be positive",
                        owner, m.name
                    )));
                }
                let arr = ArrayDescriptor::new(type_desc, dim);
                type_desc = Arc::new(TypeDescriptor::new("", TypeKind::Array(arr)));
            }
        }

        let field = FieldDescriptor::new(&m.name, type_desc);
        if !m.key {
            return Ok(field);
        }
        let keyable = match &field.type_desc.resolved().kind {
            TypeKind::Primitive(_) | TypeKind::Enum(_) => true,
            _ => false,
        };
        if !keyable {
            return Err(ConfigError::InvalidType(format!(
                "{}.{}: key members must be primitive or enum",
                owner, m.name
            )));
        }
        Ok(field.key())
    }
}
