// sim -- a tree-walking interpreter for the Sim language
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use super::context::ParseContext;
use super::error::{RuntimeError, RuntimeResult};
use super::types::TypeCategory;

/// Type tag of an integer literal whose concrete type has not been pinned
/// down by its context yet.
pub const UNTYPED_INT: &str = "untyped int";
/// Same for float literals.
pub const UNTYPED_FLOAT: &str = "untyped float";

/// A Sim value: a type name together with the canonical textual form of the
/// datum. Keeping the data textual means values print exactly as they are
/// stored, and the typed accessors re-parse on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    type_name: String,
    data: String,
}

impl Value {
    pub fn new(type_name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            data: data.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// Untyped literal kinds become their concrete default type the moment
    /// they are stored in a variable.
    pub fn promote(self) -> Self {
        match self.type_name.as_str() {
            UNTYPED_INT => Value::new("int", self.data),
            UNTYPED_FLOAT => Value::new("float", self.data),
            _ => self,
        }
    }

    /// The value as a string. Strings keep their surrounding quotes, so this
    /// only checks that the quotes are there.
    pub fn as_str(&self, context: &ParseContext) -> RuntimeResult<&str> {
        if is_quoted(&self.data) {
            Ok(&self.data)
        } else {
            Err(self.data_type_error(context))
        }
    }

    /// The value as a signed integer of the given bit width.
    pub fn as_int(&self, context: &ParseContext, bits: u32) -> RuntimeResult<i64> {
        parse_int(&self.data, bits).ok_or_else(|| self.data_type_error(context))
    }

    /// The value as an unsigned integer of the given bit width.
    pub fn as_uint(&self, context: &ParseContext, bits: u32) -> RuntimeResult<u64> {
        parse_uint(&self.data, bits).ok_or_else(|| self.data_type_error(context))
    }

    /// The value as a float of the given bit width.
    pub fn as_float(&self, context: &ParseContext, bits: u32) -> RuntimeResult<f64> {
        parse_float(&self.data, bits).ok_or_else(|| self.data_type_error(context))
    }

    /// The value as a bool. Only the exact literals `true` and `false` count.
    pub fn as_bool(&self, context: &ParseContext) -> RuntimeResult<bool> {
        self.data
            .parse()
            .map_err(|_| self.data_type_error(context))
    }

    fn data_type_error(&self, context: &ParseContext) -> RuntimeError {
        RuntimeError::DataType {
            context: context.clone(),
            type_name: self.type_name.clone(),
        }
    }
}

/// A named cell holding a value. The name never changes, and the value may
/// only be replaced with one of the same type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    value: Value,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_parts(self) -> (String, Value) {
        (self.name, self.value)
    }
}

/// Infer the type of a literal from its text and the surrounding context.
///
/// Without context, numbers come out as the untyped kinds and are promoted
/// later. A bare literal can never pin down a specific integer or float
/// width, so when the context asks for a numeric type, the literal gets the
/// context's type if it parses in the right family. Returns an empty string
/// if no type fits.
pub fn type_from_literal(context: &ParseContext, literal: &str) -> String {
    match &context.active_type {
        None => {
            if parse_int(literal, 32).is_some() {
                return UNTYPED_INT.to_owned();
            }
            if parse_float(literal, 32).is_some() {
                return UNTYPED_FLOAT.to_owned();
            }
        }
        Some(active) => match active.category() {
            TypeCategory::SignedInteger | TypeCategory::UnsignedInteger => {
                if parse_uint(literal, 32).is_some()
                    && active.category() == TypeCategory::UnsignedInteger
                {
                    return active.name().to_owned();
                }
                if parse_int(literal, 32).is_some()
                    && active.category() == TypeCategory::SignedInteger
                {
                    return active.name().to_owned();
                }
            }
            TypeCategory::FloatingPoint => {
                if parse_float(literal, 32).is_some() {
                    return active.name().to_owned();
                }
            }
            TypeCategory::Bool | TypeCategory::String => {}
        },
    }

    if literal.parse::<bool>().is_ok() {
        return "bool".to_owned();
    }
    if is_quoted(literal) {
        return "string".to_owned();
    }

    String::new()
}

fn is_quoted(data: &str) -> bool {
    data.len() >= 2 && data.starts_with('"') && data.ends_with('"')
}

/// Base-10 parse of a signed integer, range-checked at the given bit width.
pub(super) fn parse_int(data: &str, bits: u32) -> Option<i64> {
    let num: i64 = data.parse().ok()?;
    if bits < 64 {
        let bound = 1i64 << (bits - 1);
        if num < -bound || num >= bound {
            return None;
        }
    }
    Some(num)
}

/// Base-10 parse of an unsigned integer, range-checked at the given bit width.
pub(super) fn parse_uint(data: &str, bits: u32) -> Option<u64> {
    let num: u64 = data.parse().ok()?;
    if bits < 64 && num >> bits != 0 {
        return None;
    }
    Some(num)
}

/// Parse a float at the given width. A 32-bit parse goes through `f32` so the
/// result carries exactly the precision the type has.
pub(super) fn parse_float(data: &str, bits: u32) -> Option<f64> {
    if bits == 32 {
        data.parse::<f32>().ok().map(f64::from)
    } else {
        data.parse::<f64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::types::builtin_types;

    fn context() -> ParseContext {
        ParseContext::new(0, 0)
    }

    fn context_for(type_name: &str) -> ParseContext {
        context().with_type(builtin_types()[type_name].clone())
    }

    #[test]
    fn literal_inference_without_context() {
        assert_eq!(type_from_literal(&context(), "0"), UNTYPED_INT);
        assert_eq!(type_from_literal(&context(), "-17"), UNTYPED_INT);
        assert_eq!(type_from_literal(&context(), "0.0"), UNTYPED_FLOAT);
        assert_eq!(type_from_literal(&context(), "-1.5"), UNTYPED_FLOAT);
        assert_eq!(type_from_literal(&context(), "true"), "bool");
        assert_eq!(type_from_literal(&context(), "false"), "bool");
        assert_eq!(type_from_literal(&context(), "\"test\""), "string");
        assert_eq!(type_from_literal(&context(), "unknown"), "");
        assert_eq!(type_from_literal(&context(), "\"unterminated"), "");
    }

    #[test]
    fn literal_inference_takes_the_contextual_type() {
        for (name, type_data) in builtin_types() {
            match type_data.category() {
                TypeCategory::SignedInteger | TypeCategory::UnsignedInteger => {
                    assert_eq!(type_from_literal(&context_for(&name), "0"), name);
                }
                TypeCategory::FloatingPoint => {
                    assert_eq!(type_from_literal(&context_for(&name), "0.0"), name);
                    // integer literals fit float contexts too
                    assert_eq!(type_from_literal(&context_for(&name), "20"), name);
                }
                TypeCategory::Bool | TypeCategory::String => {}
            }
        }
    }

    #[test]
    fn literal_inference_respects_signedness() {
        // A negative literal cannot become unsigned
        assert_eq!(type_from_literal(&context_for("uint"), "-5"), "");
        assert_eq!(type_from_literal(&context_for("int"), "-5"), "int");
        // A bool literal under an int context still comes out as bool
        assert_eq!(type_from_literal(&context_for("int"), "true"), "bool");
    }

    #[test]
    fn accessors_check_the_data() {
        let context = context();

        assert_eq!(Value::new("int", "10").as_int(&context, 32).unwrap(), 10);
        assert!(Value::new("int", "10.0").as_int(&context, 32).is_err());
        assert_eq!(Value::new("uint", "10").as_uint(&context, 32).unwrap(), 10);
        assert!(Value::new("uint", "-10").as_uint(&context, 32).is_err());
        assert_eq!(
            Value::new("float", "10.0").as_float(&context, 32).unwrap(),
            10.0
        );
        assert!(Value::new("float", "false").as_float(&context, 32).is_err());
        assert_eq!(Value::new("bool", "true").as_bool(&context).unwrap(), true);
        assert!(Value::new("bool", "10").as_bool(&context).is_err());
        assert_eq!(
            Value::new("string", "\"test string\"")
                .as_str(&context)
                .unwrap(),
            "\"test string\""
        );
        assert!(Value::new("string", "\"half open").as_str(&context).is_err());
        assert!(Value::new("string", "").as_str(&context).is_err());

        let err = Value::new("bool", "10").as_bool(&context).unwrap_err();
        assert_eq!(err.to_string(), "line 0:0: value is not of type bool");
    }

    #[test]
    fn accessors_respect_bit_widths() {
        let context = context();

        assert!(Value::new("byte", "256").as_uint(&context, 8).is_err());
        assert_eq!(Value::new("byte", "255").as_uint(&context, 8).unwrap(), 255);
        assert!(Value::new("int8", "128").as_int(&context, 8).is_err());
        assert_eq!(
            Value::new("int8", "-128").as_int(&context, 8).unwrap(),
            -128
        );
        assert!(Value::new("int", "2147483648").as_int(&context, 32).is_err());
        assert_eq!(
            Value::new("int64", "2147483648")
                .as_int(&context, 64)
                .unwrap(),
            2147483648
        );
        assert_eq!(
            Value::new("uint64", "18446744073709551615")
                .as_uint(&context, 64)
                .unwrap(),
            u64::MAX
        );
    }

    #[test]
    fn integer_values_round_trip() {
        let context = context();
        for (value, bits) in &[
            (0i64, 8),
            (-128, 8),
            (127, 8),
            (-32768, 16),
            (32767, 16),
            (-2147483648, 32),
            (2147483647, 32),
            (i64::MIN, 64),
            (i64::MAX, 64),
        ] {
            let text = value.to_string();
            assert_eq!(
                Value::new("int", text).as_int(&context, *bits).unwrap(),
                *value
            );
        }
    }

    #[test]
    fn untyped_values_promote() {
        assert_eq!(
            Value::new(UNTYPED_INT, "10").promote(),
            Value::new("int", "10")
        );
        assert_eq!(
            Value::new(UNTYPED_FLOAT, "1.5").promote(),
            Value::new("float", "1.5")
        );
        assert_eq!(
            Value::new("bool", "true").promote(),
            Value::new("bool", "true")
        );
    }
}
