// sim -- a tree-walking interpreter for the Sim language
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use crate::lexer::Span;

/// A piece of the tree together with the source range it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<T> {
    pub span: Span,
    pub data: T,
}

/// The top-level statement list of a Sim source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Node<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Block(Vec<Node<Stmt>>),
    If {
        condition: Node<Expr>,
        body: Box<Node<Stmt>>,
    },
    /// `loop { ... }` without a header runs until `break` or `return`.
    Loop {
        body: Box<Node<Stmt>>,
    },
    /// `loop <expr> { ... }` re-evaluates the guard before every iteration.
    ConditionalLoop {
        condition: Node<Expr>,
        body: Box<Node<Stmt>>,
    },
    /// `loop <var> = <min> to <max> { ... }` with an iterator variable scoped
    /// to the loop.
    CountedLoop {
        var: Node<String>,
        min: Node<Expr>,
        max: Node<Expr>,
        body: Box<Node<Stmt>>,
    },
    Declaration {
        type_name: Node<String>,
        name: Node<String>,
        init: Option<Node<Expr>>,
    },
    Assignment {
        name: Node<String>,
        op: Node<AssignOp>,
        value: Node<Expr>,
    },
    Print(Node<Expr>),
    Return,
    Break,
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A literal keeps its exact source text; its type is inferred during
    /// evaluation from the context it appears in.
    Literal(String),
    Variable(String),
    Paren(Box<Node<Expr>>),
    Unary {
        operator: Node<UnaryOp>,
        operand: Box<Node<Expr>>,
    },
    Binary {
        left: Box<Node<Expr>>,
        operator: Node<BinOp>,
        right: Box<Node<Expr>>,
    },
    // `and`/`or` are not `Binary`: they short-circuit.
    And {
        left: Box<Node<Expr>>,
        right: Box<Node<Expr>>,
    },
    Or {
        left: Box<Node<Expr>>,
        right: Box<Node<Expr>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Eq,
    NotEq,
}

impl BinOp {
    /// The operator as it appears in source code, which is also the form the
    /// interpreter dispatches on.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl AssignOp {
    /// For compound assignments, the binary operator that combines the old
    /// value with the right-hand side. Plain `=` has none.
    pub fn binary_symbol(self) -> Option<&'static str> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some("+"),
            AssignOp::Sub => Some("-"),
            AssignOp::Mul => Some("*"),
            AssignOp::Div => Some("/"),
            AssignOp::Rem => Some("%"),
        }
    }
}
