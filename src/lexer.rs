// sim -- a tree-walking interpreter for the Sim language
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use logos::Logos;

// Re-exports
pub use logos::Span;

/// The tokens of the Sim surface syntax. Sim is line-oriented, so newlines
/// (and `;`) are real tokens rather than skipped whitespace.
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
#[logos(subpattern decimal = r"[0-9]+")]
pub enum Token {
    // Keywords
    #[token("if")]
    If,
    #[token("loop")]
    Loop,
    #[token("to")]
    To,
    #[token("print")]
    Print,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("not")]
    Not,
    #[token("and")]
    And,
    #[token("or")]
    Or,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,

    // Assignment operators
    #[token("=")]
    Assign,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("%=")]
    PercentAssign,

    // Grouping
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    // Statement separators
    #[token("\n")]
    Newline,
    #[token(";")]
    Semi,

    // Entities
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // Literals. The sign is part of a numeric literal, and string literals
    // keep their surrounding quotes all the way through evaluation.
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    LitString,
    #[regex(r"-?(?&decimal)")]
    LitInt,
    #[regex(r"-?(?&decimal)\.(?&decimal)")]
    LitFloat,
    #[token("true")]
    #[token("false")]
    LitBool,

    #[error]
    #[regex(r"[ \t\r\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)]
    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/", logos::skip)]
    Error,
}

#[cfg(test)]
mod tests {
    use super::Token;
    use expect_test::{expect, Expect};
    use logos::Logos;

    fn check(input: &str, output: Expect) {
        let lexer = Token::lexer(input);
        let tokens = lexer.spanned().collect::<Vec<_>>();
        let token_str = format!("{:?}", tokens);
        output.assert_eq(&token_str);
    }

    fn assert_lexable(input: &str) {
        let mut lexer = Token::lexer(input);
        while let Some(tok) = lexer.next() {
            if let Token::Error = tok {
                panic!("Could not lex {:?} at {:?}", lexer.slice(), lexer.span())
            }
        }
    }

    #[test]
    fn it_works() {
        assert_lexable(
            r#"
            int total = 0
            loop i = 0 to 10
            {
                if i % 2 == 0 {
                    total += i
                    continue
                }
                // odd numbers are skipped
                print(i)
            }
            print("done")
        "#,
        )
    }

    #[test]
    fn declaration() {
        check(
            "int a = 10",
            expect![[r#"[(Ident, 0..3), (Ident, 4..5), (Assign, 6..7), (LitInt, 8..10)]"#]],
        );
    }

    #[test]
    fn signed_literals() {
        check("10", expect![[r#"[(LitInt, 0..2)]"#]]);
        check("-10", expect![[r#"[(LitInt, 0..3)]"#]]);
        check("1.5", expect![[r#"[(LitFloat, 0..3)]"#]]);
        check("-1.5", expect![[r#"[(LitFloat, 0..4)]"#]]);
    }

    #[test]
    fn subtraction_needs_a_space() {
        // A `-` glued to a digit is part of the literal.
        check(
            "a - 5",
            expect![[r#"[(Ident, 0..1), (Minus, 2..3), (LitInt, 4..5)]"#]],
        );
        check("a -5", expect![[r#"[(Ident, 0..1), (LitInt, 2..4)]"#]]);
    }

    #[test]
    fn compound_assignment() {
        check(
            "a %= 2",
            expect![[r#"[(Ident, 0..1), (PercentAssign, 2..4), (LitInt, 5..6)]"#]],
        );
    }

    #[test]
    fn separators_are_tokens() {
        check(
            "a = 1; b = 2\n",
            expect![[
                r#"[(Ident, 0..1), (Assign, 2..3), (LitInt, 4..5), (Semi, 5..6), (Ident, 7..8), (Assign, 9..10), (LitInt, 11..12), (Newline, 12..13)]"#
            ]],
        );
    }

    #[test]
    fn strings() {
        check(r#""""#, expect![[r#"[(LitString, 0..2)]"#]]);
        check(r#""hello world""#, expect![[r#"[(LitString, 0..13)]"#]]);
        check(
            r#""so called \"world\"""#,
            expect![[r#"[(LitString, 0..21)]"#]],
        );
    }

    #[test]
    fn bools() {
        check("true", expect![[r#"[(LitBool, 0..4)]"#]]);
        check("false", expect![[r#"[(LitBool, 0..5)]"#]]);
        check("truer", expect![[r#"[(Ident, 0..5)]"#]]);
    }

    #[test]
    fn comments_are_skipped() {
        check(
            "a // trailing\nb",
            expect![[r#"[(Ident, 0..1), (Newline, 13..14), (Ident, 14..15)]"#]],
        );
        check(
            "a /* block **/ b",
            expect![[r#"[(Ident, 0..1), (Ident, 15..16)]"#]],
        );
    }
}
