// sim -- a tree-walking interpreter for the Sim language
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use std::fmt;

use super::types::TypeDesc;

/// Context about the piece of source currently being evaluated. It attributes
/// errors to their source position, and carries the type that the surrounding
/// code expects, which primes literal type inference.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseContext {
    /// The type the enclosing declaration is about, if any.
    pub active_type: Option<TypeDesc>,
    line: usize,
    column: usize,
}

impl ParseContext {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            active_type: None,
            line,
            column,
        }
    }

    /// The same position, primed with the given type.
    pub fn with_type(mut self, type_data: TypeDesc) -> Self {
        self.active_type = Some(type_data);
        self
    }
}

impl fmt::Display for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}:{}", self.line, self.column)
    }
}
