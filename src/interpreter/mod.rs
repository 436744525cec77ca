// sim -- a tree-walking interpreter for the Sim language
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The Sim runtime: the type catalog, the variable map with its scope stack,
//! and operator resolution. The tree walker in [`crate::eval`] drives these
//! primitives.

pub mod context;
pub mod error;
pub mod ops;
pub mod types;
pub mod value;

pub use context::ParseContext;
pub use error::{RuntimeError, RuntimeResult};
pub use types::{TypeCategory, TypeDesc};
pub use value::{type_from_literal, Value, Variable, UNTYPED_FLOAT, UNTYPED_INT};

use std::collections::HashMap;
use std::io::Write;

/// A scope only records which names were declared while it was the innermost
/// one, so that popping it can evict exactly those variables.
#[derive(Debug, Default)]
struct Scope {
    var_names: Vec<String>,
}

/// Interprets Sim by simulating a runtime environment, keeping track of
/// declared types, variables and scopes, and writing program output to the
/// given sink.
pub struct Interpreter<W> {
    types: HashMap<String, TypeDesc>,
    vars: HashMap<String, Variable>,
    scopes: Vec<Scope>,
    output: W,
}

impl<W> Interpreter<W> {
    pub fn new(output: W) -> Self {
        Self {
            types: types::builtin_types(),
            vars: HashMap::new(),
            // There is always a global scope
            scopes: vec![Scope::default()],
            output,
        }
    }

    /// The output sink, for reading back what the program printed.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Look up the descriptor of a type name.
    pub fn get_type(&self, context: &ParseContext, type_name: &str) -> RuntimeResult<&TypeDesc> {
        self.types
            .get(type_name)
            .ok_or_else(|| RuntimeError::UnknownType {
                context: context.clone(),
                type_name: type_name.to_owned(),
            })
    }

    /// Open a new innermost scope. Every push must be paired with a pop on
    /// all exit paths of the block that did the push.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Close the innermost scope, dropping all variables declared in it.
    /// The global scope cannot be popped.
    pub fn pop_scope(&mut self, context: &ParseContext) -> RuntimeResult<()> {
        if self.scopes.len() <= 1 {
            return Err(RuntimeError::ExitGlobalScope {
                context: context.clone(),
            });
        }

        if let Some(scope) = self.scopes.pop() {
            for name in &scope.var_names {
                self.vars.remove(name);
            }
        }

        Ok(())
    }

    /// Declare a new variable, owned by the current scope. Untyped values
    /// take their concrete default type, an empty datum becomes the type's
    /// zero value, and names must be unique across the whole scope stack.
    pub fn add_var(&mut self, context: &ParseContext, variable: Variable) -> RuntimeResult<()> {
        let (name, value) = variable.into_parts();
        let value = value.promote();

        let type_data = self.get_type(context, value.type_name())?.clone();
        let context = context.clone().with_type(type_data.clone());

        if self.vars.contains_key(&name) {
            return Err(RuntimeError::VarExists {
                context,
                var_name: name,
            });
        }

        let value = if value.data().is_empty() {
            Value::new(value.type_name(), type_data.zero_value().data())
        } else {
            value
        };

        if !self.validate(&context, &value) {
            return Err(RuntimeError::MismatchedTypeAssign {
                context,
                var_name: name,
                type_name: value.type_name().to_owned(),
                data: value.data().to_owned(),
            });
        }

        if let Some(scope) = self.scopes.last_mut() {
            scope.var_names.push(name.clone());
        }
        self.vars.insert(name.clone(), Variable::new(name, value));

        Ok(())
    }

    /// Look up a variable by name.
    pub fn get_var(&self, context: &ParseContext, var_name: &str) -> RuntimeResult<&Variable> {
        self.vars
            .get(var_name)
            .ok_or_else(|| RuntimeError::UnknownVar {
                context: context.clone(),
                var_name: var_name.to_owned(),
            })
    }

    /// Replace a variable's value. The variable's type is fixed at
    /// declaration; assigning a value of any other type fails.
    pub fn set_var(
        &mut self,
        context: &ParseContext,
        var_name: &str,
        value: Value,
    ) -> RuntimeResult<()> {
        let variable = match self.vars.get(var_name) {
            Some(variable) => variable,
            None => {
                return Err(RuntimeError::UnknownVar {
                    context: context.clone(),
                    var_name: var_name.to_owned(),
                })
            }
        };
        let var_type_name = variable.value().type_name().to_owned();

        let value = value.promote();

        if !self.types.contains_key(value.type_name()) {
            return Err(RuntimeError::InvalidType {
                context: context.clone(),
                var_name: var_name.to_owned(),
                type_name: value.type_name().to_owned(),
            });
        }

        let var_type = self.get_type(context, &var_type_name)?.clone();
        let context = context.clone().with_type(var_type);

        if value.type_name() != var_type_name || !self.validate(&context, &value) {
            return Err(RuntimeError::MismatchedTypeAssign {
                context,
                var_name: var_name.to_owned(),
                type_name: var_type_name,
                data: value.data().to_owned(),
            });
        }

        self.vars
            .insert(var_name.to_owned(), Variable::new(var_name, value));

        Ok(())
    }

    /// A snapshot of every variable the interpreter currently knows about,
    /// keyed by name.
    pub fn all_vars(&self) -> HashMap<String, Variable> {
        self.vars.clone()
    }

    /// A value is only valid if its data re-infers as its claimed type. This
    /// catches e.g. a value tagged `bool` carrying the text `10`.
    pub fn validate(&self, context: &ParseContext, value: &Value) -> bool {
        type_from_literal(context, value.data()) == value.type_name()
    }
}

impl<W: Write> Interpreter<W> {
    /// Append a line of program output to the sink.
    pub fn print_line(&mut self, context: &ParseContext, data: &str) -> RuntimeResult<()> {
        writeln!(self.output, "{}", data).map_err(|source| RuntimeError::Output {
            context: context.clone(),
            source,
        })
    }
}
