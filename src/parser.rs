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
use std::ops::Range;

use logos::Logos;

use crate::ast::{self, AssignOp, BinOp, Node, UnaryOp};
use crate::lexer::{Span, Token};
use crate::line_map::{LineMap, Pos};


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub span: Span,
    pub pos: Range<Pos>,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}:{}: {}",
            self.pos.start.line, self.pos.start.column, self.message
        )
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
struct Prec(u16);

impl Prec {
    const LOWEST: Prec = Prec(0);
    const DISJUNCTIVE: Prec = Prec(1);
    const CONJUNCTIVE: Prec = Prec(2);
    const EQUALITY: Prec = Prec(3);
    const COMPARISON: Prec = Prec(4);
    const ADDITIVE: Prec = Prec(5);
    const MULTIPLICATIVE: Prec = Prec(6);
    const UNARY: Prec = Prec(7);
    const HIGHEST: Prec = Prec(8);

    fn succ(self) -> Prec {
        // this would be a parser bug:
        assert!(self < Self::HIGHEST);
        Prec(self.0 + 1)
    }
}

pub type Parse<T> = Result<Node<T>, ParseError>;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    current: usize,
    line_map: LineMap<'a>,
}

impl<'a> Parser<'a> {
    // Public interface

    /// Parse a whole Sim source file into its statement list.
    pub fn parse(source: &'a str) -> Parse<ast::Program> {
        Parser::new(source).parse_program()
    }

    // Private helpers

    fn new(source: &'a str) -> Self {
        Parser {
            source,
            tokens: Token::lexer(source).spanned().collect(),
            current: 0,
            line_map: LineMap::new(source),
        }
    }

    fn peek(&self) -> (Option<Token>, Span) {
        self.peek_ahead(0)
    }

    fn peek_second(&self) -> Option<Token> {
        self.peek_ahead(1).0
    }

    fn peek_ahead(&self, skip: usize) -> (Option<Token>, Span) {
        if let Some((token, span)) = self.tokens.get(self.current + skip) {
            (Some(*token), span.clone())
        } else {
            (None, self.eof())
        }
    }

    fn bump(&mut self) -> Option<(Token, Span)> {
        let result = self.tokens.get(self.current).cloned();
        if result.is_some() {
            self.current += 1;
        }
        result
    }

    fn expect(&mut self, expected: Token) -> Result<Span, ParseError> {
        match self.bump() {
            Some((token, span)) if token == expected => Ok(span),
            Some((token, span)) => Err(self.expected_but_got(span, &[expected], token)),
            None => Err(self.unexpected_eof(self.eof(), &[expected])),
        }
    }

    /// Skip over any run of newline/`;` tokens.
    fn skip_separators(&mut self) {
        while matches!(self.peek().0, Some(Token::Newline) | Some(Token::Semi)) {
            self.bump();
        }
    }

    fn eof(&self) -> Span {
        self.source.len()..self.source.len()
    }

    fn text(&self, span: &Span) -> &'a str {
        &self.source[span.clone()]
    }

    fn make_error(&self, span: Span, message: String) -> ParseError {
        ParseError {
            pos: self.line_map.offset_to_pos(span.start)..self.line_map.offset_to_pos(span.end),
            message,
            span,
        }
    }

    fn expected_but_got(&self, span: Span, expected: &[Token], got: Token) -> ParseError {
        self.make_error(
            span,
            format!("expected one of {:?}, but got {:?}", expected, got),
        )
    }

    fn expected_str_but_got(&self, span: Span, expected: &str, got: Token) -> ParseError {
        self.make_error(span, format!("expected {}, but got {:?}", expected, got))
    }

    fn unexpected_eof(&self, span: Span, expected: &[Token]) -> ParseError {
        self.make_error(
            span,
            format!("expected one of {:?}, but reached end of file", expected),
        )
    }

    fn unexpected_str_eof(&self, span: Span, expected: &str) -> ParseError {
        self.make_error(
            span,
            format!("expected {}, but reached end of file", expected),
        )
    }

    // Parse rules for statements

    fn parse_program(&mut self) -> Parse<ast::Program> {
        let statements = self.parse_stmt_list(None)?;
        Ok(Node {
            span: 0..self.source.len(),
            data: ast::Program { statements },
        })
    }

    /// Parse statements up to the given terminator (or the end of the file).
    /// Statements are separated by newlines or `;`, except that a statement
    /// ending in `}` does not need a separator after it.
    fn parse_stmt_list(&mut self, terminator: Option<Token>) -> Result<Vec<Node<ast::Stmt>>, ParseError> {
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            match (self.peek(), terminator) {
                ((None, _), None) => break,
                ((None, span), Some(term)) => return Err(self.unexpected_eof(span, &[term])),
                ((Some(token), _), Some(term)) if token == term => break,
                _ => {}
            }

            let statement = self.parse_stmt()?;
            let braced = ends_with_brace(&statement.data);
            statements.push(statement);

            if braced {
                continue;
            }
            match (self.peek(), terminator) {
                ((Some(Token::Newline), _), _) | ((Some(Token::Semi), _), _) => {}
                ((Some(token), _), Some(term)) if token == term => {}
                ((None, _), None) => {}
                ((None, span), Some(term)) => return Err(self.unexpected_eof(span, &[term])),
                ((Some(got), span), _) => {
                    return Err(self.expected_str_but_got(span, "end of statement", got))
                }
            }
        }
        Ok(statements)
    }

    fn parse_stmt(&mut self) -> Parse<ast::Stmt> {
        let (token, span) = self.peek();
        match token {
            Some(Token::LBrace) => self.parse_block(),
            Some(Token::If) => self.parse_if(),
            Some(Token::Loop) => self.parse_loop(),
            Some(Token::Print) => self.parse_print(),
            Some(Token::Return) => {
                self.bump();
                Ok(Node {
                    span,
                    data: ast::Stmt::Return,
                })
            }
            Some(Token::Break) => {
                self.bump();
                Ok(Node {
                    span,
                    data: ast::Stmt::Break,
                })
            }
            Some(Token::Continue) => {
                self.bump();
                Ok(Node {
                    span,
                    data: ast::Stmt::Continue,
                })
            }
            Some(Token::Ident) => self.parse_decl_or_assign(),
            Some(got) => Err(self.expected_str_but_got(span, "a statement", got)),
            None => Err(self.unexpected_str_eof(span, "a statement")),
        }
    }

    fn parse_block(&mut self) -> Parse<ast::Stmt> {
        let lbrace = self.expect(Token::LBrace)?;
        let statements = self.parse_stmt_list(Some(Token::RBrace))?;
        let rbrace = self.expect(Token::RBrace)?;
        Ok(Node {
            span: lbrace.start..rbrace.end,
            data: ast::Stmt::Block(statements),
        })
    }

    fn parse_if(&mut self) -> Parse<ast::Stmt> {
        let keyword = self.expect(Token::If)?;
        let condition = self.parse_expr()?;
        // The body may start on the following line
        self.skip_separators();
        let body = self.parse_stmt()?;
        Ok(Node {
            span: keyword.start..body.span.end,
            data: ast::Stmt::If {
                condition,
                body: Box::new(body),
            },
        })
    }

    fn parse_loop(&mut self) -> Parse<ast::Stmt> {
        let keyword = self.expect(Token::Loop)?;
        match self.peek().0 {
            // `loop i = <min> to <max>` declares an iterator
            Some(Token::Ident) if self.peek_second() == Some(Token::Assign) => {
                let var = self.parse_ident()?;
                self.expect(Token::Assign)?;
                let min = self.parse_expr()?;
                self.expect(Token::To)?;
                let max = self.parse_expr()?;
                self.skip_separators();
                let body = self.parse_stmt()?;
                Ok(Node {
                    span: keyword.start..body.span.end,
                    data: ast::Stmt::CountedLoop {
                        var,
                        min,
                        max,
                        body: Box::new(body),
                    },
                })
            }
            // A bare `loop` runs forever
            Some(Token::Newline) | Some(Token::Semi) | Some(Token::LBrace) => {
                self.skip_separators();
                let body = self.parse_stmt()?;
                Ok(Node {
                    span: keyword.start..body.span.end,
                    data: ast::Stmt::Loop {
                        body: Box::new(body),
                    },
                })
            }
            _ => {
                let condition = self.parse_expr()?;
                self.skip_separators();
                let body = self.parse_stmt()?;
                Ok(Node {
                    span: keyword.start..body.span.end,
                    data: ast::Stmt::ConditionalLoop {
                        condition,
                        body: Box::new(body),
                    },
                })
            }
        }
    }

    fn parse_print(&mut self) -> Parse<ast::Stmt> {
        let keyword = self.expect(Token::Print)?;
        self.expect(Token::LParen)?;
        let expr = self.parse_expr()?;
        let rparen = self.expect(Token::RParen)?;
        Ok(Node {
            span: keyword.start..rparen.end,
            data: ast::Stmt::Print(expr),
        })
    }

    /// Both declarations and assignments start with an identifier; the token
    /// after it decides which one we are looking at.
    fn parse_decl_or_assign(&mut self) -> Parse<ast::Stmt> {
        match self.peek_second() {
            Some(Token::Ident) => {
                let type_name = self.parse_ident()?;
                let name = self.parse_ident()?;
                let init = if let (Some(Token::Assign), _) = self.peek() {
                    self.bump();
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                let end = init
                    .as_ref()
                    .map_or(name.span.end, |expr| expr.span.end);
                Ok(Node {
                    span: type_name.span.start..end,
                    data: ast::Stmt::Declaration {
                        type_name,
                        name,
                        init,
                    },
                })
            }
            Some(token) if assign_op(token).is_some() => {
                let name = self.parse_ident()?;
                let (op, op_span) = match self.bump() {
                    Some((token, span)) => (assign_op(token), span),
                    None => (None, self.eof()),
                };
                let op = match op {
                    Some(op) => Node {
                        span: op_span,
                        data: op,
                    },
                    // unreachable thanks to the peek above, but do not panic
                    None => return Err(self.unexpected_str_eof(self.eof(), "an assignment operator")),
                };
                let value = self.parse_expr()?;
                Ok(Node {
                    span: name.span.start..value.span.end,
                    data: ast::Stmt::Assignment { name, op, value },
                })
            }
            Some(got) => {
                let (_, span) = self.peek_ahead(1);
                Err(self.expected_str_but_got(span, "a declaration or an assignment", got))
            }
            None => Err(self.unexpected_str_eof(self.eof(), "a declaration or an assignment")),
        }
    }

    fn parse_ident(&mut self) -> Parse<String> {
        let span = self.expect(Token::Ident)?;
        Ok(Node {
            span: span.clone(),
            data: self.text(&span).to_owned(),
        })
    }

    // Parse rules for expressions

    fn parse_expr(&mut self) -> Parse<ast::Expr> {
        self.parse_prec_expr(Prec::LOWEST)
    }

    fn parse_prec_expr(&mut self, min_prec: Prec) -> Parse<ast::Expr> {
        // Prefix rules
        let mut left = self.parse_prefix_expr()?;

        // Infix rules
        loop {
            // Our expression could already be complete here, so EOF is a valid possibility
            let (token, span) = match self.peek() {
                (None, _) => break,
                (Some(token), span) => (token, span),
            };

            left = match token {
                Token::Or if min_prec <= Prec::DISJUNCTIVE => {
                    self.bump();
                    let right = self.parse_prec_expr(Prec::DISJUNCTIVE.succ())?;
                    Node {
                        span: left.span.start..right.span.end,
                        data: ast::Expr::Or {
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                    }
                }
                Token::And if min_prec <= Prec::CONJUNCTIVE => {
                    self.bump();
                    let right = self.parse_prec_expr(Prec::CONJUNCTIVE.succ())?;
                    Node {
                        span: left.span.start..right.span.end,
                        data: ast::Expr::And {
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                    }
                }
                Token::EqEq if min_prec <= Prec::EQUALITY => {
                    self.parse_binary_operand(left, BinOp::Eq, span, Prec::EQUALITY.succ())?
                }
                Token::NotEq if min_prec <= Prec::EQUALITY => {
                    self.parse_binary_operand(left, BinOp::NotEq, span, Prec::EQUALITY.succ())?
                }
                Token::Less if min_prec <= Prec::COMPARISON => {
                    self.parse_binary_operand(left, BinOp::Less, span, Prec::COMPARISON.succ())?
                }
                Token::Greater if min_prec <= Prec::COMPARISON => {
                    self.parse_binary_operand(left, BinOp::Greater, span, Prec::COMPARISON.succ())?
                }
                Token::LessEq if min_prec <= Prec::COMPARISON => {
                    self.parse_binary_operand(left, BinOp::LessEq, span, Prec::COMPARISON.succ())?
                }
                Token::GreaterEq if min_prec <= Prec::COMPARISON => {
                    self.parse_binary_operand(left, BinOp::GreaterEq, span, Prec::COMPARISON.succ())?
                }
                Token::Plus if min_prec <= Prec::ADDITIVE => {
                    self.parse_binary_operand(left, BinOp::Add, span, Prec::ADDITIVE.succ())?
                }
                Token::Minus if min_prec <= Prec::ADDITIVE => {
                    self.parse_binary_operand(left, BinOp::Sub, span, Prec::ADDITIVE.succ())?
                }
                Token::Star if min_prec <= Prec::MULTIPLICATIVE => {
                    self.parse_binary_operand(left, BinOp::Mul, span, Prec::MULTIPLICATIVE.succ())?
                }
                Token::Slash if min_prec <= Prec::MULTIPLICATIVE => {
                    self.parse_binary_operand(left, BinOp::Div, span, Prec::MULTIPLICATIVE.succ())?
                }
                Token::Percent if min_prec <= Prec::MULTIPLICATIVE => {
                    self.parse_binary_operand(left, BinOp::Rem, span, Prec::MULTIPLICATIVE.succ())?
                }
                // any unexpected token is not consumed, this is a problem for the caller
                _ => break,
            }
        }

        Ok(left)
    }

    fn parse_binary_operand(
        &mut self,
        left: Node<ast::Expr>,
        op: BinOp,
        op_span: Span,
        right_prec: Prec,
    ) -> Parse<ast::Expr> {
        // assumes that the caller did not consume the operator yet
        self.bump();
        let right = self.parse_prec_expr(right_prec)?;
        Ok(Node {
            span: left.span.start..right.span.end,
            data: ast::Expr::Binary {
                left: Box::new(left),
                operator: Node {
                    span: op_span,
                    data: op,
                },
                right: Box::new(right),
            },
        })
    }

    fn parse_prefix_expr(&mut self) -> Parse<ast::Expr> {
        let (token, span) = match self.peek() {
            (None, span) => return Err(self.unexpected_str_eof(span, "an expression")),
            (Some(token), span) => (token, span),
        };
        match token {
            Token::Minus => self.parse_unary_operand(UnaryOp::Negate, span),
            Token::Not => self.parse_unary_operand(UnaryOp::Not, span),
            Token::LParen => {
                let lparen = self.expect(Token::LParen)?;
                let inner = self.parse_expr()?;
                let rparen = self.expect(Token::RParen)?;
                Ok(Node {
                    span: lparen.start..rparen.end,
                    data: ast::Expr::Paren(Box::new(inner)),
                })
            }
            Token::LitInt | Token::LitFloat | Token::LitBool | Token::LitString => {
                self.bump();
                Ok(Node {
                    span: span.clone(),
                    data: ast::Expr::Literal(self.text(&span).to_owned()),
                })
            }
            Token::Ident => {
                let name = self.parse_ident()?;
                Ok(Node {
                    span: name.span.clone(),
                    data: ast::Expr::Variable(name.data),
                })
            }
            Token::Error => Err(self.make_error(
                span.clone(),
                format!("unrecognized token {:?}", self.text(&span)),
            )),
            _ => Err(self.expected_str_but_got(span, "an expression", token)),
        }
    }

    fn parse_unary_operand(&mut self, op: UnaryOp, op_span: Span) -> Parse<ast::Expr> {
        // assumes that the caller did not consume the operator yet
        self.bump();
        let operand = self.parse_prec_expr(Prec::UNARY)?;
        Ok(Node {
            span: op_span.start..operand.span.end,
            data: ast::Expr::Unary {
                operator: Node {
                    span: op_span,
                    data: op,
                },
                operand: Box::new(operand),
            },
        })
    }
}

fn assign_op(token: Token) -> Option<AssignOp> {
    match token {
        Token::Assign => Some(AssignOp::Assign),
        Token::PlusAssign => Some(AssignOp::Add),
        Token::MinusAssign => Some(AssignOp::Sub),
        Token::StarAssign => Some(AssignOp::Mul),
        Token::SlashAssign => Some(AssignOp::Div),
        Token::PercentAssign => Some(AssignOp::Rem),
        _ => None,
    }
}

/// Whether a statement syntactically ends with a `}`, in which case the
/// separator after it may be omitted.
fn ends_with_brace(stmt: &ast::Stmt) -> bool {
    match stmt {
        ast::Stmt::Block(_) => true,
        ast::Stmt::If { body, .. }
        | ast::Stmt::Loop { body }
        | ast::Stmt::ConditionalLoop { body, .. }
        | ast::Stmt::CountedLoop { body, .. } => ends_with_brace(&body.data),
        _ => false,
    }
}
