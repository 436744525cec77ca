// sim -- a tree-walking interpreter for the Sim language
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Sim is a small statically typed imperative language. This crate contains
//! the whole pipeline: lexing and parsing Sim source into a tree, and walking
//! that tree with an interpreter that writes its output to a caller-supplied
//! sink.

// Language front-end
pub mod ast;
pub mod lexer;
pub mod line_map;
pub mod parser;

// Runtime
pub mod eval;
pub mod interpreter;
