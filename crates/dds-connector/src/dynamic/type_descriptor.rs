// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.

use std::sync::Arc;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Char,
    String { max_length: Option<usize> },
}

impl PrimitiveKind {
    /// Check if this kind maps to a JSON number.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::F32 | Self::F64)
    }

    /// Check if this is one of the integer kinds.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
        )
    }

    /// Value range `[min, end)` of an integer kind.
    ///
    /// Both bounds are powers of two and therefore exact as `f64`, which
    /// `u64::MAX` and `i64::MAX` are not.
    pub fn integer_range(&self) -> Option<(f64, f64)> {
        match self {
            Self::U8 => Some((0.0, 256.0)),
            Self::U16 => Some((0.0, 65_536.0)),
            Self::U32 => Some((0.0, 4_294_967_296.0)),
            Self::U64 => Some((0.0, 18_446_744_073_709_551_616.0)),
            Self::I8 => Some((-128.0, 128.0)),
            Self::I16 => Some((-32_768.0, 32_768.0)),
            Self::I32 => Some((-2_147_483_648.0, 2_147_483_648.0)),
            Self::I64 => Some((-9_223_372_036_854_775_808.0, 9_223_372_036_854_775_808.0)),
            _ => None,
        }
    }

    /// Name used in configuration documents and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::Char => "char",
            Self::String { .. } => "string",
        }
    }

    /// Parse a primitive type name.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "boolean" | "bool" => Self::Bool,
            "octet" | "uint8" => Self::U8,
            "uint16" | "unsigned short" => Self::U16,
            "uint32" | "unsigned long" => Self::U32,
            "uint64" | "unsigned long long" => Self::U64,
            "int8" => Self::I8,
            "int16" | "short" => Self::I16,
            "int32" | "long" => Self::I32,
            "int64" | "long long" => Self::I64,
            "float32" | "float" => Self::F32,
            "float64" | "double" => Self::F64,
            "char" => Self::Char,
            "string" => Self::String { max_length: None },
            _ => return None,
        };
        Some(kind)
    }
}

/// Type kind enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Primitive type.
    Primitive(PrimitiveKind),
    /// Struct with named fields.
    Struct(Vec<FieldDescriptor>),
    /// Sequence (dynamic length).
    Sequence(SequenceDescriptor),
    /// Array (fixed length).
    Array(ArrayDescriptor),
    /// Enumeration.
    Enum(EnumDescriptor),
    /// Nested type reference.
    Nested(Arc<TypeDescriptor>),
}

/// A complete type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Type name.
    pub name: String,
    /// Type kind.
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Create a new type descriptor.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a primitive type descriptor.
    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, TypeKind::Primitive(kind))
    }

    /// Create a struct type descriptor.
    pub fn struct_type(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, TypeKind::Struct(fields))
    }

    /// Follow `Nested` references down to the concrete descriptor.
    pub fn resolved(&self) -> &TypeDescriptor {
        let mut current = self;
        while let TypeKind::Nested(inner) = &current.kind {
            current = inner;
        }
        current
    }

    /// Check if this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self.resolved().kind, TypeKind::Primitive(_))
    }

    /// Check if this is a struct type.
    pub fn is_struct(&self) -> bool {
        matches!(self.resolved().kind, TypeKind::Struct(_))
    }

    /// Primitive kind, if this resolves to one.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.resolved().kind {
            TypeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Get fields if this is a struct.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.resolved().kind {
            TypeKind::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    /// Top-level members flagged as instance key.
    pub fn key_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields().unwrap_or(&[]).iter().filter(|f| f.key)
    }

    /// Short description of the kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match &self.resolved().kind {
            TypeKind::Primitive(p) => p.name(),
            TypeKind::Struct(_) => "struct",
            TypeKind::Sequence(_) => "sequence",
            TypeKind::Array(_) => "array",
            TypeKind::Enum(_) => "enum",
            TypeKind::Nested(_) => "nested",
        }
    }
}

/// Field descriptor for struct members.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Field type.
    pub type_desc: Arc<TypeDescriptor>,
    /// Part of the instance key (@key annotation).
    pub key: bool,
}

impl FieldDescriptor {
    /// Create a new field descriptor.
    pub fn new(name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            type_desc,
            key: false,
        }
    }

    /// Mark as key member.
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }
}

/// Sequence type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDescriptor {
    /// Element type.
    pub element_type: Arc<TypeDescriptor>,
    /// Maximum length (None = unbounded).
    pub max_length: Option<usize>,
}

impl SequenceDescriptor {
    /// Create unbounded sequence.
    pub fn unbounded(element_type: Arc<TypeDescriptor>) -> Self {
        Self {
            element_type,
            max_length: None,
        }
    }

    /// Create bounded sequence.
    pub fn bounded(element_type: Arc<TypeDescriptor>, max_length: usize) -> Self {
        Self {
            element_type,
            max_length: Some(max_length),
        }
    }
}

/// Array type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDescriptor {
    /// Element type.
    pub element_type: Arc<TypeDescriptor>,
    /// Fixed length.
    pub length: usize,
}

impl ArrayDescriptor {
    /// Create array descriptor.
    pub fn new(element_type: Arc<TypeDescriptor>, length: usize) -> Self {
        Self {
            element_type,
            length,
        }
    }
}

/// Enumeration type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    /// Enum variants.
    pub variants: Vec<EnumVariant>,
}

impl EnumDescriptor {
    /// Create enum descriptor.
    pub fn new(variants: Vec<EnumVariant>) -> Self {
        Self { variants }
    }

    /// Get variant by name.
    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Get variant by value.
    pub fn variant_by_value(&self, value: i64) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.value == value)
    }
}

/// Enum variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    /// Variant name.
    pub name: String,
    /// Variant value.
    pub value: i64,
}

impl EnumVariant {
    /// Create enum variant.
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}
