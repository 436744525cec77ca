// sim -- a tree-walking interpreter for the Sim language
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use snafu::Snafu;

use super::context::ParseContext;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Everything that can go wrong while a Sim program runs. Each variant keeps
/// the position of the code that caused it, so the rendered message always
/// starts with `line L:C`.
#[derive(Debug, Snafu)]
pub enum RuntimeError {
    #[snafu(display("{}: attempted to exit the global scope", context))]
    ExitGlobalScope { context: ParseContext },

    #[snafu(display("{}: type {} is not declared in this scope", context, type_name))]
    UnknownType {
        context: ParseContext,
        type_name: String,
    },

    /// A variable's already-stored type is missing from the registry. This
    /// should be unreachable while the registry is fixed, but the lookups
    /// stay defensive.
    #[snafu(display("{}: {} has an invalid type {:?}", context, var_name, type_name))]
    InvalidType {
        context: ParseContext,
        var_name: String,
        type_name: String,
    },

    #[snafu(display("{}: var {} is not declared in this scope", context, var_name))]
    UnknownVar {
        context: ParseContext,
        var_name: String,
    },

    #[snafu(display("{}: var {} is already declared in this scope", context, var_name))]
    VarExists {
        context: ParseContext,
        var_name: String,
    },

    #[snafu(display(
        "{}: cannot assign {} to {} of type {}",
        context,
        data,
        var_name,
        type_name
    ))]
    MismatchedTypeAssign {
        context: ParseContext,
        var_name: String,
        type_name: String,
        data: String,
    },

    /// A typed accessor was used on a value whose data does not parse as
    /// that type.
    #[snafu(display("{}: value is not of type {}", context, type_name))]
    DataType {
        context: ParseContext,
        type_name: String,
    },

    #[snafu(display("{}: invalid operation for type {}", context, type_name))]
    InvalidOperation {
        context: ParseContext,
        type_name: String,
    },

    #[snafu(display(
        "{}: invalid operation between types {} and {}",
        context,
        left_type,
        right_type
    ))]
    IncompatibleTypes {
        context: ParseContext,
        left_type: String,
        right_type: String,
    },

    #[snafu(display("{}: unknown operator {}", context, operator))]
    UnknownOperator {
        context: ParseContext,
        operator: String,
    },

    #[snafu(display("{}: divide by zero", context))]
    DivideByZero { context: ParseContext },

    #[snafu(display("{}: could not write output: {}", context, source))]
    Output {
        context: ParseContext,
        source: std::io::Error,
    },
}
