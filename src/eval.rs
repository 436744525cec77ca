// sim -- a tree-walking interpreter for the Sim language
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The tree walker: reduces statements to control flow signals and
//! expressions to values, against the state held by the interpreter.

use std::io::Write;

use crate::ast::{Expr, Node, Program, Stmt, UnaryOp};
use crate::interpreter::{
    type_from_literal, Interpreter, ParseContext, RuntimeResult, Value, Variable,
};
use crate::lexer::Span;
use crate::line_map::LineMap;

/// What statement evaluation tells the enclosing frame to do next. Loops
/// consume `Break`/`Continue`; `Return` and any other non-`Normal` signal
/// reaching the top level ends the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Normal,
    Return,
    Break,
    Continue,
}

/// Walks a parse tree, driving one interpreter instance.
pub struct Evaluator<'a, W> {
    interp: &'a mut Interpreter<W>,
    line_map: LineMap<'a>,
}

impl<'a, W: Write> Evaluator<'a, W> {
    /// The source is only needed to turn node spans back into line/column
    /// positions for error reporting.
    pub fn new(interp: &'a mut Interpreter<W>, source: &'a str) -> Self {
        Self {
            interp,
            line_map: LineMap::new(source),
        }
    }

    /// Evaluate the top-level statement list in order. Evaluation stops at
    /// the first error or the first non-normal control flow signal.
    pub fn run(&mut self, program: &Node<Program>) -> RuntimeResult<ControlFlow> {
        log::debug!(
            "evaluating {} top-level statements",
            program.data.statements.len()
        );
        self.eval_stmt_list(&program.data.statements)
    }

    fn context_at(&self, span: &Span) -> ParseContext {
        let pos = self.line_map.offset_to_pos(span.start);
        ParseContext::new(pos.line, pos.column)
    }

    fn eval_stmt_list(&mut self, statements: &[Node<Stmt>]) -> RuntimeResult<ControlFlow> {
        let mut flow = ControlFlow::Normal;
        for statement in statements {
            flow = self.eval_stmt(statement)?;
            if flow != ControlFlow::Normal {
                break;
            }
        }
        Ok(flow)
    }

    fn eval_stmt(&mut self, node: &Node<Stmt>) -> RuntimeResult<ControlFlow> {
        match &node.data {
            Stmt::Block(statements) => {
                let context = self.context_at(&node.span);
                self.interp.push_scope();
                let result = self.eval_stmt_list(statements);
                // The scope must go away on every exit path; a failing pop
                // supplants whatever the block produced.
                match self.interp.pop_scope(&context) {
                    Ok(()) => result,
                    Err(err) => Err(err),
                }
            }

            Stmt::If { condition, body } => {
                let context = self.context_at(&condition.span);
                let condition = self.eval_expr(&context, condition)?.as_bool(&context)?;
                if condition {
                    self.eval_stmt(body)
                } else {
                    Ok(ControlFlow::Normal)
                }
            }

            Stmt::Loop { body } => loop {
                let flow = self.eval_stmt(body)?;
                if matches!(flow, ControlFlow::Break | ControlFlow::Return) {
                    return Ok(flow);
                }
            },

            Stmt::ConditionalLoop { condition, body } => {
                let context = self.context_at(&condition.span);
                let mut iterations: u64 = 0;
                let mut flow = ControlFlow::Normal;
                loop {
                    let guard = self.eval_expr(&context, condition)?;
                    let condition_holds = match guard.as_bool(&context) {
                        Ok(value) => value,
                        // A guard that is not a bool may instead give the
                        // number of iterations to run.
                        Err(bool_err) => match guard.as_uint(&context, 32) {
                            Ok(max_iterations) => iterations < max_iterations,
                            Err(_) => return Err(bool_err),
                        },
                    };
                    if !condition_holds {
                        break;
                    }

                    flow = self.eval_stmt(body)?;
                    if matches!(flow, ControlFlow::Break | ControlFlow::Return) {
                        break;
                    }
                    iterations += 1;
                }
                Ok(flow)
            }

            Stmt::CountedLoop {
                var,
                min,
                max,
                body,
            } => {
                let var_context = self.context_at(&var.span);
                let min_context = self.context_at(&min.span);
                let max_context = self.context_at(&max.span);

                let min_value = self.eval_expr(&min_context, min)?;
                // Stepping the iterator uses the min expression's type, so an
                // untyped bound still unifies with the uint iterator.
                let min_type = min_value.type_name().to_owned();
                let min = min_value.as_uint(&min_context, 32)?;
                let max = self
                    .eval_expr(&max_context, max)?
                    .as_uint(&max_context, 32)?;

                self.interp.push_scope();
                let result =
                    self.counted_loop(&var_context, &min_context, var, &min_type, min, max, body);
                match self.interp.pop_scope(&var_context) {
                    Ok(()) => result,
                    Err(err) => Err(err),
                }
            }

            Stmt::Declaration {
                type_name,
                name,
                init,
            } => {
                let context = self.context_at(&node.span);
                let type_data = self.interp.get_type(&context, &type_name.data)?.clone();
                let context = context.with_type(type_data.clone());

                let value = match init {
                    Some(expr) => {
                        let expr_context = self.context_at(&expr.span).with_type(type_data);
                        self.eval_expr(&expr_context, expr)?
                    }
                    // `add_var` substitutes the type's zero value
                    None => Value::new(type_name.data.as_str(), ""),
                };

                self.interp
                    .add_var(&context, Variable::new(name.data.clone(), value))?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Assignment { name, op, value } => {
                let context = self.context_at(&node.span);
                let expr_context = self.context_at(&value.span);

                let variable = self.interp.get_var(&context, &name.data)?.clone();
                let mut result = self.eval_expr(&expr_context, value)?;

                if let Some(operator) = op.data.binary_symbol() {
                    result = self.interp.resolve_binary(
                        &context,
                        &expr_context,
                        variable.value(),
                        &result,
                        operator,
                    )?;
                }

                self.interp.set_var(&context, &name.data, result)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Print(expr) => {
                let context = self.context_at(&expr.span);
                let value = self.eval_expr(&context, expr)?;
                self.interp.print_line(&context, value.data())?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Return => Ok(ControlFlow::Return),
            Stmt::Break => Ok(ControlFlow::Break),
            Stmt::Continue => Ok(ControlFlow::Continue),
        }
    }

    /// The body of a counted loop, between the scope push and pop. The
    /// iterator always runs `max - min` times unless the body breaks or
    /// returns, but the body sees (and may overwrite) the variable.
    #[allow(clippy::too_many_arguments)]
    fn counted_loop(
        &mut self,
        var_context: &ParseContext,
        min_context: &ParseContext,
        var: &Node<String>,
        min_type: &str,
        min: u64,
        max: u64,
        body: &Node<Stmt>,
    ) -> RuntimeResult<ControlFlow> {
        // Loop iterators are always unsigned integers
        self.interp.add_var(
            min_context,
            Variable::new(var.data.clone(), Value::new("uint", min.to_string())),
        )?;

        for _ in min..max {
            let flow = self.eval_stmt(body)?;
            if matches!(flow, ControlFlow::Break | ControlFlow::Return) {
                break;
            }

            let value = self.interp.get_var(var_context, &var.data)?.value().clone();
            let next = self.interp.resolve_binary(
                var_context,
                min_context,
                &value,
                &Value::new(min_type, "1"),
                "+",
            )?;
            self.interp.set_var(var_context, &var.data, next)?;
        }

        Ok(ControlFlow::Normal)
    }

    /// Reduce an expression to a value. The context decides how bare literal
    /// results are typed.
    fn eval_expr(&mut self, context: &ParseContext, node: &Node<Expr>) -> RuntimeResult<Value> {
        match &node.data {
            Expr::Literal(text) => Ok(Value::new(type_from_literal(context, text), text.as_str())),

            Expr::Variable(name) => {
                let var_context = self.context_at(&node.span);
                Ok(self.interp.get_var(&var_context, name)?.value().clone())
            }

            Expr::Paren(inner) => {
                let inner_context = self.context_at(&inner.span);
                self.eval_expr(&inner_context, inner)
            }

            Expr::Unary { operator, operand } => {
                let operand_context = self.context_at(&operand.span);
                match operator.data {
                    UnaryOp::Negate => {
                        let value = self.eval_expr(&operand_context, operand)?;
                        self.interp.resolve_unary(&operand_context, &value, "-")
                    }
                    UnaryOp::Not => {
                        let value = self
                            .eval_expr(&operand_context, operand)?
                            .as_bool(&operand_context)?;
                        let text = (!value).to_string();
                        Ok(Value::new(type_from_literal(context, &text), text))
                    }
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left_context = self.context_at(&left.span);
                let right_context = self.context_at(&right.span);
                let left = self.eval_expr(&left_context, left)?;
                let right = self.eval_expr(&right_context, right)?;
                self.interp.resolve_binary(
                    &left_context,
                    &right_context,
                    &left,
                    &right,
                    operator.data.symbol(),
                )
            }

            Expr::And { left, right } => {
                let left_context = self.context_at(&left.span);
                let left = self.eval_expr(&left_context, left)?.as_bool(&left_context)?;
                // The right side only runs if the left side did not already
                // decide the result.
                let result = if !left {
                    false
                } else {
                    let right_context = self.context_at(&right.span);
                    self.eval_expr(&right_context, right)?
                        .as_bool(&right_context)?
                };
                let text = result.to_string();
                Ok(Value::new(type_from_literal(context, &text), text))
            }

            Expr::Or { left, right } => {
                let left_context = self.context_at(&left.span);
                let left = self.eval_expr(&left_context, left)?.as_bool(&left_context)?;
                let result = if left {
                    true
                } else {
                    let right_context = self.context_at(&right.span);
                    self.eval_expr(&right_context, right)?
                        .as_bool(&right_context)?
                };
                let text = result.to_string();
                Ok(Value::new(type_from_literal(context, &text), text))
            }
        }
    }
}
