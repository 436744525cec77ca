// sim -- a tree-walking interpreter for the Sim language
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Unary and binary operator resolution. Operands are dispatched on their
//! type's category; untyped literal kinds promote against the concrete type
//! on the other side of the operator.

use super::context::ParseContext;
use super::error::{RuntimeError, RuntimeResult};
use super::types::TypeCategory;
use super::value::{Value, UNTYPED_FLOAT, UNTYPED_INT};
use super::Interpreter;

impl<W> Interpreter<W> {
    /// Resolve a unary operation. Only `-` on the numeric categories is
    /// defined.
    pub fn resolve_unary(
        &self,
        context: &ParseContext,
        value: &Value,
        operator: &str,
    ) -> RuntimeResult<Value> {
        let type_name = value.type_name();
        let type_data = self.get_type(context, type_name)?;
        let bits = type_data.bits();

        match type_data.category() {
            TypeCategory::SignedInteger => {
                let num = value.as_int(context, bits)?;
                match operator {
                    "-" => Ok(Value::new(
                        type_name,
                        truncate_int(num.wrapping_neg(), bits).to_string(),
                    )),
                    _ => Err(unknown_operator(context, operator)),
                }
            }
            TypeCategory::UnsignedInteger => {
                let num = value.as_uint(context, bits)?;
                match operator {
                    // Negation wraps at the operand's width
                    "-" => Ok(Value::new(
                        type_name,
                        truncate_uint(num.wrapping_neg(), bits).to_string(),
                    )),
                    _ => Err(unknown_operator(context, operator)),
                }
            }
            TypeCategory::FloatingPoint => {
                let num = value.as_float(context, bits)?;
                match operator {
                    "-" => Ok(Value::new(type_name, format_float(-num, bits))),
                    _ => Err(unknown_operator(context, operator)),
                }
            }
            TypeCategory::Bool | TypeCategory::String => Err(RuntimeError::InvalidOperation {
                context: context.clone(),
                type_name: type_name.to_owned(),
            }),
        }
    }

    /// Resolve a binary operation between two values.
    pub fn resolve_binary(
        &self,
        left_context: &ParseContext,
        right_context: &ParseContext,
        left: &Value,
        right: &Value,
        operator: &str,
    ) -> RuntimeResult<Value> {
        let left_type = left.type_name();
        let right_type = right.type_name();

        if left_type != right_type {
            return self.resolve_mismatched_binary(
                left_context,
                right_context,
                left,
                right,
                operator,
            );
        }

        if left_type == UNTYPED_INT {
            return self.signed_integer_op(left_context, right_context, left, right, left_type, operator);
        }
        if left_type == UNTYPED_FLOAT {
            return self.float_op(left_context, right_context, left, right, left_type, operator);
        }

        match self.get_type(left_context, left_type)?.category() {
            TypeCategory::SignedInteger => {
                self.signed_integer_op(left_context, right_context, left, right, left_type, operator)
            }
            TypeCategory::UnsignedInteger => {
                self.unsigned_integer_op(left_context, right_context, left, right, left_type, operator)
            }
            TypeCategory::FloatingPoint => {
                self.float_op(left_context, right_context, left, right, left_type, operator)
            }
            TypeCategory::Bool => {
                self.bool_op(left_context, right_context, left, right, left_type, operator)
            }
            TypeCategory::String => {
                self.string_op(left_context, right_context, left, right, operator)
            }
        }
    }

    /// Unify operands of two different type names. An untyped int promotes to
    /// any concrete numeric type on the other side; an untyped float only to
    /// concrete float types. An untyped int against an untyped float makes
    /// both concrete `float`.
    fn resolve_mismatched_binary(
        &self,
        left_context: &ParseContext,
        right_context: &ParseContext,
        left: &Value,
        right: &Value,
        operator: &str,
    ) -> RuntimeResult<Value> {
        let left_type = left.type_name();
        let right_type = right.type_name();

        if left_type == UNTYPED_INT {
            let right_type = if right_type == UNTYPED_FLOAT {
                "float"
            } else {
                right_type
            };
            match self.get_type(right_context, right_type)?.category() {
                TypeCategory::SignedInteger => {
                    return self
                        .signed_integer_op(left_context, right_context, left, right, right_type, operator)
                }
                TypeCategory::UnsignedInteger => {
                    return self
                        .unsigned_integer_op(left_context, right_context, left, right, right_type, operator)
                }
                TypeCategory::FloatingPoint => {
                    return self.float_op(left_context, right_context, left, right, right_type, operator)
                }
                TypeCategory::Bool | TypeCategory::String => {}
            }
        }

        if right_type == UNTYPED_INT {
            let left_type = if left_type == UNTYPED_FLOAT {
                "float"
            } else {
                left_type
            };
            match self.get_type(left_context, left_type)?.category() {
                TypeCategory::SignedInteger => {
                    return self
                        .signed_integer_op(left_context, right_context, left, right, left_type, operator)
                }
                TypeCategory::UnsignedInteger => {
                    return self
                        .unsigned_integer_op(left_context, right_context, left, right, left_type, operator)
                }
                TypeCategory::FloatingPoint => {
                    return self.float_op(left_context, right_context, left, right, left_type, operator)
                }
                TypeCategory::Bool | TypeCategory::String => {}
            }
        }

        if left_type == UNTYPED_FLOAT {
            if let TypeCategory::FloatingPoint = self.get_type(right_context, right_type)?.category()
            {
                return self.float_op(left_context, right_context, left, right, right_type, operator);
            }
        }

        if right_type == UNTYPED_FLOAT {
            if let TypeCategory::FloatingPoint = self.get_type(left_context, left_type)?.category() {
                return self.float_op(left_context, right_context, left, right, left_type, operator);
            }
        }

        Err(RuntimeError::IncompatibleTypes {
            context: left_context.clone(),
            left_type: left_type.to_owned(),
            right_type: right_type.to_owned(),
        })
    }

    fn signed_integer_op(
        &self,
        left_context: &ParseContext,
        right_context: &ParseContext,
        left: &Value,
        right: &Value,
        type_name: &str,
        operator: &str,
    ) -> RuntimeResult<Value> {
        let bits = self.bits_of(type_name);
        let left = left.as_int(left_context, bits)?;
        let right = right.as_int(right_context, bits)?;

        match operator {
            "+" => Ok(int_value(type_name, left.wrapping_add(right), bits)),
            "-" => Ok(int_value(type_name, left.wrapping_sub(right), bits)),
            "*" => Ok(int_value(type_name, left.wrapping_mul(right), bits)),
            "/" => {
                if right == 0 {
                    return Err(divide_by_zero(right_context));
                }
                Ok(int_value(type_name, left.wrapping_div(right), bits))
            }
            "%" => {
                if right == 0 {
                    return Err(divide_by_zero(right_context));
                }
                Ok(int_value(type_name, left.wrapping_rem(right), bits))
            }
            ">" => Ok(bool_value(left > right)),
            "<" => Ok(bool_value(left < right)),
            ">=" => Ok(bool_value(left >= right)),
            "<=" => Ok(bool_value(left <= right)),
            "==" => Ok(bool_value(left == right)),
            "!=" => Ok(bool_value(left != right)),
            _ => Err(unknown_operator(left_context, operator)),
        }
    }

    fn unsigned_integer_op(
        &self,
        left_context: &ParseContext,
        right_context: &ParseContext,
        left: &Value,
        right: &Value,
        type_name: &str,
        operator: &str,
    ) -> RuntimeResult<Value> {
        let bits = self.bits_of(type_name);
        let left = left.as_uint(left_context, bits)?;
        let right = right.as_uint(right_context, bits)?;

        match operator {
            "+" => Ok(uint_value(type_name, left.wrapping_add(right), bits)),
            "-" => Ok(uint_value(type_name, left.wrapping_sub(right), bits)),
            "*" => Ok(uint_value(type_name, left.wrapping_mul(right), bits)),
            "/" => {
                if right == 0 {
                    return Err(divide_by_zero(right_context));
                }
                Ok(uint_value(type_name, left / right, bits))
            }
            "%" => {
                if right == 0 {
                    return Err(divide_by_zero(right_context));
                }
                Ok(uint_value(type_name, left % right, bits))
            }
            ">" => Ok(bool_value(left > right)),
            "<" => Ok(bool_value(left < right)),
            ">=" => Ok(bool_value(left >= right)),
            "<=" => Ok(bool_value(left <= right)),
            "==" => Ok(bool_value(left == right)),
            "!=" => Ok(bool_value(left != right)),
            _ => Err(unknown_operator(left_context, operator)),
        }
    }

    fn float_op(
        &self,
        left_context: &ParseContext,
        right_context: &ParseContext,
        left: &Value,
        right: &Value,
        type_name: &str,
        operator: &str,
    ) -> RuntimeResult<Value> {
        let bits = self.bits_of(type_name);
        let left = left.as_float(left_context, bits)?;
        let right = right.as_float(right_context, bits)?;

        match operator {
            "+" => Ok(Value::new(type_name, format_float(left + right, bits))),
            "-" => Ok(Value::new(type_name, format_float(left - right, bits))),
            "*" => Ok(Value::new(type_name, format_float(left * right, bits))),
            "/" => {
                if right == 0.0 {
                    return Err(divide_by_zero(right_context));
                }
                Ok(Value::new(type_name, format_float(left / right, bits)))
            }
            ">" => Ok(bool_value(left > right)),
            "<" => Ok(bool_value(left < right)),
            ">=" => Ok(bool_value(left >= right)),
            "<=" => Ok(bool_value(left <= right)),
            "==" => Ok(bool_value(left == right)),
            "!=" => Ok(bool_value(left != right)),
            // floats have no `%`
            _ => Err(unknown_operator(left_context, operator)),
        }
    }

    fn bool_op(
        &self,
        left_context: &ParseContext,
        right_context: &ParseContext,
        left: &Value,
        right: &Value,
        type_name: &str,
        operator: &str,
    ) -> RuntimeResult<Value> {
        let left = left.as_bool(left_context)?;
        let right = right.as_bool(right_context)?;

        match operator {
            "==" => Ok(Value::new(type_name, (left == right).to_string())),
            "!=" => Ok(Value::new(type_name, (left != right).to_string())),
            _ => Err(unknown_operator(left_context, operator)),
        }
    }

    fn string_op(
        &self,
        left_context: &ParseContext,
        right_context: &ParseContext,
        left: &Value,
        right: &Value,
        operator: &str,
    ) -> RuntimeResult<Value> {
        let left = left.as_str(left_context)?;
        let right = right.as_str(right_context)?;

        match operator {
            ">" => Ok(bool_value(left > right)),
            "<" => Ok(bool_value(left < right)),
            ">=" => Ok(bool_value(left >= right)),
            "<=" => Ok(bool_value(left <= right)),
            "==" => Ok(bool_value(left == right)),
            "!=" => Ok(bool_value(left != right)),
            _ => Err(unknown_operator(left_context, operator)),
        }
    }

    /// The parse width of operands of the given type. The untyped kinds are
    /// not registered and keep the default 32-bit width.
    fn bits_of(&self, type_name: &str) -> u32 {
        self.types.get(type_name).map_or(32, |t| t.bits())
    }
}

fn int_value(type_name: &str, num: i64, bits: u32) -> Value {
    Value::new(type_name, truncate_int(num, bits).to_string())
}

fn uint_value(type_name: &str, num: u64, bits: u32) -> Value {
    Value::new(type_name, truncate_uint(num, bits).to_string())
}

fn bool_value(value: bool) -> Value {
    Value::new("bool", value.to_string())
}

fn unknown_operator(context: &ParseContext, operator: &str) -> RuntimeError {
    RuntimeError::UnknownOperator {
        context: context.clone(),
        operator: operator.to_owned(),
    }
}

fn divide_by_zero(context: &ParseContext) -> RuntimeError {
    RuntimeError::DivideByZero {
        context: context.clone(),
    }
}

/// Wrap a signed result to two's complement at the given width.
fn truncate_int(num: i64, bits: u32) -> i64 {
    if bits >= 64 {
        num
    } else {
        let shift = 64 - bits;
        (num << shift) >> shift
    }
}

/// Wrap an unsigned result at the given width.
fn truncate_uint(num: u64, bits: u32) -> u64 {
    if bits >= 64 {
        num
    } else {
        num & ((1u64 << bits) - 1)
    }
}

/// Render a float in its compact decimal form at the value's width.
fn format_float(num: f64, bits: u32) -> String {
    if bits == 32 {
        format!("{}", num as f32)
    } else {
        format!("{}", num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ParseContext {
        ParseContext::new(0, 0)
    }

    fn interpreter() -> Interpreter<Vec<u8>> {
        Interpreter::new(Vec::new())
    }

    fn binary(left: Value, operator: &str, right: Value) -> RuntimeResult<Value> {
        interpreter().resolve_binary(&context(), &context(), &left, &right, operator)
    }

    #[test]
    fn negate_signed() {
        let interp = interpreter();
        let result = interp
            .resolve_unary(&context(), &Value::new("int", "10"), "-")
            .unwrap();
        assert_eq!(result, Value::new("int", "-10"));
    }

    #[test]
    fn negate_unsigned_wraps() {
        let interp = interpreter();
        let result = interp
            .resolve_unary(&context(), &Value::new("uint", "5"), "-")
            .unwrap();
        assert_eq!(result, Value::new("uint", "4294967291"));
        let result = interp
            .resolve_unary(&context(), &Value::new("byte", "5"), "-")
            .unwrap();
        assert_eq!(result, Value::new("byte", "251"));
        let result = interp
            .resolve_unary(&context(), &Value::new("uint", "0"), "-")
            .unwrap();
        assert_eq!(result, Value::new("uint", "0"));
    }

    #[test]
    fn negate_float_zero_keeps_the_sign() {
        let interp = interpreter();
        let result = interp
            .resolve_unary(&context(), &Value::new("float", "0.0"), "-")
            .unwrap();
        assert_eq!(result, Value::new("float", "-0"));
        let result = interp
            .resolve_unary(&context(), &Value::new("float", "1.5"), "-")
            .unwrap();
        assert_eq!(result, Value::new("float", "-1.5"));
    }

    #[test]
    fn negate_bool_is_invalid() {
        let interp = interpreter();
        let err = interp
            .resolve_unary(&context(), &Value::new("bool", "true"), "-")
            .unwrap_err();
        assert_eq!(err.to_string(), "line 0:0: invalid operation for type bool");
    }

    #[test]
    fn unary_rejects_untyped_operands() {
        // Untyped kinds are not registered, so unary dispatch cannot find them.
        let interp = interpreter();
        let err = interp
            .resolve_unary(&context(), &Value::new(UNTYPED_INT, "10"), "-")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 0:0: type untyped int is not declared in this scope"
        );
    }

    #[test]
    fn unary_unknown_operator() {
        let interp = interpreter();
        let err = interp
            .resolve_unary(&context(), &Value::new("int", "10"), "!")
            .unwrap_err();
        assert_eq!(err.to_string(), "line 0:0: unknown operator !");
    }

    #[test]
    fn integer_arithmetic_with_zero() {
        for type_name in &["int", "uint"] {
            let a = || Value::new(*type_name, "17");
            let zero = || Value::new(*type_name, "0");

            assert_eq!(binary(a(), "+", zero()).unwrap(), a());
            assert_eq!(binary(a(), "-", zero()).unwrap(), a());
            assert_eq!(
                binary(a(), "*", zero()).unwrap(),
                Value::new(*type_name, "0")
            );
            assert_eq!(
                binary(a(), "/", zero()).unwrap_err().to_string(),
                "line 0:0: divide by zero"
            );
            assert_eq!(
                binary(a(), "%", zero()).unwrap_err().to_string(),
                "line 0:0: divide by zero"
            );
        }
    }

    #[test]
    fn float_division_by_zero() {
        let err = binary(Value::new("float", "1.5"), "/", Value::new("float", "0.0")).unwrap_err();
        assert_eq!(err.to_string(), "line 0:0: divide by zero");
    }

    #[test]
    fn float_has_no_modulo() {
        let err = binary(Value::new("float", "1.5"), "%", Value::new("float", "0.5")).unwrap_err();
        assert_eq!(err.to_string(), "line 0:0: unknown operator %");
    }

    #[test]
    fn signed_arithmetic() {
        assert_eq!(
            binary(Value::new("int", "10"), "+", Value::new("int", "20")).unwrap(),
            Value::new("int", "30")
        );
        assert_eq!(
            binary(Value::new("int", "10"), "-", Value::new("int", "25")).unwrap(),
            Value::new("int", "-15")
        );
        assert_eq!(
            binary(Value::new("int", "-7"), "/", Value::new("int", "2")).unwrap(),
            Value::new("int", "-3")
        );
        assert_eq!(
            binary(Value::new("int", "-7"), "%", Value::new("int", "2")).unwrap(),
            Value::new("int", "-1")
        );
    }

    #[test]
    fn arithmetic_wraps_at_the_type_width() {
        assert_eq!(
            binary(Value::new("int8", "127"), "+", Value::new("int8", "1")).unwrap(),
            Value::new("int8", "-128")
        );
        assert_eq!(
            binary(Value::new("byte", "255"), "+", Value::new("byte", "1")).unwrap(),
            Value::new("byte", "0")
        );
        assert_eq!(
            binary(Value::new("uint", "5"), "-", Value::new("uint", "10")).unwrap(),
            Value::new("uint", "4294967291")
        );
        // 64-bit operands really parse at 64 bits
        assert_eq!(
            binary(
                Value::new("int64", "4294967296"),
                "+",
                Value::new("int64", "1")
            )
            .unwrap(),
            Value::new("int64", "4294967297")
        );
    }

    #[test]
    fn comparisons_against_self() {
        let cases: &[(&str, &str)] = &[("int", "17"), ("uint", "17"), ("string", "\"abc\"")];
        for (type_name, data) in cases {
            let value = || Value::new(*type_name, *data);
            for operator in &["==", "<=", ">="] {
                assert_eq!(
                    binary(value(), operator, value()).unwrap(),
                    Value::new("bool", "true"),
                    "{} {} {}",
                    data,
                    operator,
                    data
                );
            }
            for operator in &["!=", "<", ">"] {
                assert_eq!(
                    binary(value(), operator, value()).unwrap(),
                    Value::new("bool", "false"),
                    "{} {} {}",
                    data,
                    operator,
                    data
                );
            }
        }
    }

    #[test]
    fn string_comparison_is_lexicographic() {
        assert_eq!(
            binary(
                Value::new("string", "\"abc\""),
                "<",
                Value::new("string", "\"abd\"")
            )
            .unwrap(),
            Value::new("bool", "true")
        );
        assert_eq!(
            binary(
                Value::new("string", "\"b\""),
                ">",
                Value::new("string", "\"abc\"")
            )
            .unwrap(),
            Value::new("bool", "true")
        );
    }

    #[test]
    fn strings_cannot_be_added() {
        let err = binary(
            Value::new("string", "\"a\""),
            "+",
            Value::new("string", "\"b\""),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "line 0:0: unknown operator +");
    }

    #[test]
    fn bools_only_support_equality() {
        assert_eq!(
            binary(Value::new("bool", "true"), "==", Value::new("bool", "true")).unwrap(),
            Value::new("bool", "true")
        );
        assert_eq!(
            binary(Value::new("bool", "true"), "!=", Value::new("bool", "false")).unwrap(),
            Value::new("bool", "true")
        );
        let err = binary(Value::new("bool", "true"), "<", Value::new("bool", "false")).unwrap_err();
        assert_eq!(err.to_string(), "line 0:0: unknown operator <");
    }

    #[test]
    fn untyped_ints_adopt_the_concrete_side() {
        // untyped int + int -> int
        assert_eq!(
            binary(Value::new(UNTYPED_INT, "1"), "+", Value::new("int", "2")).unwrap(),
            Value::new("int", "3")
        );
        // uint + untyped int -> uint
        assert_eq!(
            binary(Value::new("uint", "2"), "+", Value::new(UNTYPED_INT, "1")).unwrap(),
            Value::new("uint", "3")
        );
        // untyped int + float -> float
        assert_eq!(
            binary(Value::new(UNTYPED_INT, "1"), "+", Value::new("float", "0.5")).unwrap(),
            Value::new("float", "1.5")
        );
    }

    #[test]
    fn untyped_int_and_untyped_float_make_a_float() {
        assert_eq!(
            binary(
                Value::new(UNTYPED_INT, "0"),
                "==",
                Value::new(UNTYPED_FLOAT, "0.0")
            )
            .unwrap(),
            Value::new("bool", "true")
        );
        assert_eq!(
            binary(
                Value::new(UNTYPED_FLOAT, "0.5"),
                "+",
                Value::new(UNTYPED_INT, "1")
            )
            .unwrap(),
            Value::new("float", "1.5")
        );
    }

    #[test]
    fn untyped_floats_only_adopt_float_types() {
        assert_eq!(
            binary(
                Value::new(UNTYPED_FLOAT, "0.5"),
                "+",
                Value::new("float64", "1.5")
            )
            .unwrap(),
            Value::new("float64", "2")
        );
        let err = binary(
            Value::new(UNTYPED_FLOAT, "0.5"),
            "+",
            Value::new("int", "1"),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 0:0: invalid operation between types untyped float and int"
        );
    }

    #[test]
    fn concrete_types_never_mix() {
        let err = binary(Value::new("int", "10"), ">", Value::new("float", "20")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 0:0: invalid operation between types int and float"
        );
        let err = binary(
            Value::new("int", "10"),
            "==",
            Value::new("int64", "10"),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 0:0: invalid operation between types int and int64"
        );
    }

    #[test]
    fn both_sides_untyped_ints_stay_untyped() {
        assert_eq!(
            binary(Value::new(UNTYPED_INT, "10"), "*", Value::new(UNTYPED_INT, "20")).unwrap(),
            Value::new(UNTYPED_INT, "200")
        );
    }

    #[test]
    fn truncation_helpers() {
        assert_eq!(truncate_int(130, 8), -126);
        assert_eq!(truncate_int(-1, 8), -1);
        assert_eq!(truncate_int(i64::MAX, 64), i64::MAX);
        assert_eq!(truncate_uint(256, 8), 0);
        assert_eq!(truncate_uint(u64::MAX, 64), u64::MAX);
    }

    #[test]
    fn float_formatting_is_compact() {
        assert_eq!(format_float(20.0, 32), "20");
        assert_eq!(format_float(-0.0, 32), "-0");
        assert_eq!(format_float(1.5, 32), "1.5");
        assert_eq!(format_float(2.0, 64), "2");
    }
}
