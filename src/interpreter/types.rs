// sim -- a tree-walking interpreter for the Sim language
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use std::collections::{HashMap, HashSet};

use super::value::Value;

/// The five behavioural groups a built-in type can belong to. Operators are
/// dispatched per category, not per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    SignedInteger,
    UnsignedInteger,
    FloatingPoint,
    Bool,
    String,
}

/// Everything the interpreter knows about a built-in type: its zero value
/// (which also carries the type's name), its category, the bit width numeric
/// operands parse at, and the set of types it may implicitly widen into.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDesc {
    zero: Value,
    category: TypeCategory,
    bits: u32,
    implicit_casts: HashSet<String>,
}

impl TypeDesc {
    fn new(name: &str, zero_data: &str, category: TypeCategory, bits: u32, casts: &[&str]) -> Self {
        Self {
            zero: Value::new(name, zero_data),
            category,
            bits,
            implicit_casts: casts.iter().map(|cast| (*cast).to_owned()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        self.zero.type_name()
    }

    pub fn zero_value(&self) -> &Value {
        &self.zero
    }

    pub fn category(&self) -> TypeCategory {
        self.category
    }

    /// Bit width of numeric operands of this type. Only meaningful for the
    /// integer and floating point categories.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Whether this type implicitly widens into `other`. Casts are
    /// one-directional.
    pub fn casts_to(&self, other: &str) -> bool {
        self.implicit_casts.contains(other)
    }
}

/// The fixed catalog of built-in types.
pub fn builtin_types() -> HashMap<String, TypeDesc> {
    let signed: &[(&str, u32, &[&str])] = &[
        ("int", 32, &["int32", "int64"]),
        ("int8", 8, &["int", "int16", "int32", "int64"]),
        ("int16", 16, &["int", "int32", "int64"]),
        ("int32", 32, &["int", "int64"]),
        ("int64", 64, &[]),
    ];

    let unsigned: &[(&str, u32, &[&str])] = &[
        ("uint", 32, &["uint32", "uint64"]),
        ("byte", 8, &["uint", "uint8", "uint16", "uint32", "uint64"]),
        ("uint8", 8, &["byte", "uint", "uint16", "uint32", "uint64"]),
        ("uint16", 16, &["uint", "uint32", "uint64"]),
        ("uint32", 32, &["uint", "uint64"]),
        ("uint64", 64, &[]),
    ];

    let floats: &[(&str, u32, &[&str])] = &[
        ("float", 32, &["float32", "float64"]),
        ("float32", 32, &["float", "float64"]),
        ("float64", 64, &[]),
    ];

    let mut types = HashMap::new();

    for (name, bits, casts) in signed {
        types.insert(
            (*name).to_owned(),
            TypeDesc::new(name, "0", TypeCategory::SignedInteger, *bits, casts),
        );
    }
    for (name, bits, casts) in unsigned {
        types.insert(
            (*name).to_owned(),
            TypeDesc::new(name, "0", TypeCategory::UnsignedInteger, *bits, casts),
        );
    }
    for (name, bits, casts) in floats {
        types.insert(
            (*name).to_owned(),
            TypeDesc::new(name, "0.0", TypeCategory::FloatingPoint, *bits, casts),
        );
    }

    types.insert(
        "bool".to_owned(),
        TypeDesc::new("bool", "false", TypeCategory::Bool, 0, &[]),
    );
    types.insert(
        "string".to_owned(),
        TypeDesc::new("string", "\"\"", TypeCategory::String, 0, &[]),
    );

    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::context::ParseContext;
    use crate::interpreter::value::type_from_literal;

    #[test]
    fn catalog_is_complete() {
        let types = builtin_types();
        let expected = [
            "int", "int8", "int16", "int32", "int64", "uint", "byte", "uint8", "uint16", "uint32",
            "uint64", "float", "float32", "float64", "bool", "string",
        ];
        assert_eq!(types.len(), expected.len());
        for name in &expected {
            let type_data = types.get(*name).unwrap();
            assert_eq!(type_data.name(), *name);
        }
    }

    #[test]
    fn zero_values_validate_as_their_own_type() {
        for (name, type_data) in builtin_types() {
            let context = ParseContext::new(0, 0).with_type(type_data.clone());
            let inferred = type_from_literal(&context, type_data.zero_value().data());
            assert_eq!(inferred, name, "zero value of {} must validate", name);
        }
    }

    #[test]
    fn casts_are_one_directional() {
        let types = builtin_types();
        assert!(types["int"].casts_to("int64"));
        assert!(!types["int64"].casts_to("int"));
        assert!(types["byte"].casts_to("uint8"));
        assert!(types["uint8"].casts_to("byte"));
        assert!(types["float32"].casts_to("float64"));
        assert!(!types["float64"].casts_to("float32"));
        assert!(!types["bool"].casts_to("int"));
        assert!(!types["int"].casts_to("int"));
    }
}
