//! Parser module for building the MiniJava AST from tokens.

pub mod ast;
mod expression;
mod statement;

pub use ast::*;
pub use expression::ExpressionParser;
pub use statement::StatementParser;

use crate::diagnostics::{codes, Diagnostic, DiagnosticReporter};
use crate::lexer::{Token, TokenKind};

/// Recursive descent parser for MiniJava.
///
/// Parsing stops at the first syntax error: the offending token is reported
/// and `parse` returns `None`.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    reporter: &'a mut DiagnosticReporter,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, reporter: &'a mut DiagnosticReporter) -> Self {
        Self {
            tokens,
            current: 0,
            reporter,
        }
    }

    /// Parse the entire program: `MainClass ClassDecl* EOF`
    pub fn parse(&mut self) -> Option<Program> {
        if self.tokens.is_empty() {
            return None;
        }

        let main_class = self.main_class()?;

        let mut classes = Vec::new();
        while !self.is_at_end() {
            classes.push(self.class_declaration()?);
        }

        Some(Program { main_class, classes })
    }

    /// Parse the entry class
    fn main_class(&mut self) -> Option<MainClass> {
        self.expect(TokenKind::Class, "expected 'class' to start the main class")?;
        let name = self.expect_identifier("expected main class name")?;
        self.expect(TokenKind::LeftBrace, "expected '{' after main class name")?;
        self.expect(TokenKind::Public, "expected 'public static void main'")?;
        self.expect(TokenKind::Static, "expected 'static' in main method")?;
        self.expect(TokenKind::Void, "expected 'void' in main method")?;
        self.expect(TokenKind::Main, "expected 'main'")?;
        self.expect(TokenKind::LeftParen, "expected '(' after 'main'")?;
        self.expect(TokenKind::String, "expected 'String[]' parameter")?;
        self.expect(TokenKind::LeftBracket, "expected '[' after 'String'")?;
        self.expect(TokenKind::RightBracket, "expected ']' after '['")?;
        let arg_name = self.expect_identifier("expected parameter name")?;
        self.expect(TokenKind::RightParen, "expected ')' after main parameter")?;
        self.expect(TokenKind::LeftBrace, "expected '{' to open main body")?;

        let locals = self.var_declarations()?;
        let body = self.statements_until_brace()?;

        self.expect(TokenKind::RightBrace, "expected '}' to close main body")?;
        self.expect(TokenKind::RightBrace, "expected '}' to close main class")?;

        Some(MainClass { name, arg_name, locals, body })
    }

    /// Parse `class Id [extends Id] { VarDecl* MethodDecl* }`
    fn class_declaration(&mut self) -> Option<ClassDecl> {
        self.expect(TokenKind::Class, "expected 'class'")?;
        let name = self.expect_identifier("expected class name")?;

        let parent = if self.match_token(TokenKind::Extends) {
            Some(self.expect_identifier("expected parent class name after 'extends'")?)
        } else {
            None
        };

        self.expect(TokenKind::LeftBrace, "expected '{' for class body")?;

        let fields = self.var_declarations()?;

        let mut methods = Vec::new();
        while self.check(TokenKind::Public) {
            methods.push(self.method_declaration()?);
        }

        self.expect(TokenKind::RightBrace, "expected '}' after class body")?;

        Some(ClassDecl { name, parent, fields, methods })
    }

    fn method_declaration(&mut self) -> Option<MethodDecl> {
        self.expect(TokenKind::Public, "expected 'public'")?;
        let return_type = self.parse_type()?;
        let name = self.expect_identifier("expected method name")?;
        self.expect(TokenKind::LeftParen, "expected '(' after method name")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                let type_spec = self.parse_type()?;
                let name = self.expect_identifier("expected parameter name")?;
                params.push(Param { type_spec, name });

                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen, "expected ')' after parameters")?;
        self.expect(TokenKind::LeftBrace, "expected '{' to open method body")?;

        let locals = self.var_declarations()?;
        let body = self.statements_until(TokenKind::Return)?;

        self.expect(TokenKind::Return, "expected 'return' at the end of the method")?;
        let return_expr = self.expression()?;
        self.expect(TokenKind::Semicolon, "expected ';' after return expression")?;
        self.expect(TokenKind::RightBrace, "expected '}' to close method body")?;

        Some(MethodDecl {
            return_type,
            name,
            params,
            locals,
            body,
            return_expr,
        })
    }

    /// Parse the leading run of `Type Id ;` declarations
    fn var_declarations(&mut self) -> Option<Vec<VarDecl>> {
        let mut decls = Vec::new();

        while self.is_var_decl_start() {
            let type_spec = self.parse_type()?;
            let name = self.expect_identifier("expected variable name")?;
            self.expect(TokenKind::Semicolon, "expected ';' after variable declaration")?;
            decls.push(VarDecl { type_spec, name });
        }

        Some(decls)
    }

    /// `int`, `boolean`, or `Id Id` begins a declaration; `Id =` begins a statement
    fn is_var_decl_start(&self) -> bool {
        match self.peek().kind {
            TokenKind::Int | TokenKind::Boolean => true,
            TokenKind::Identifier => self.peek_next_kind() == Some(TokenKind::Identifier),
            _ => false,
        }
    }

    /// Parse `int[] | boolean | int | Id`
    fn parse_type(&mut self) -> Option<TypeSpec> {
        let token = self.peek().clone();

        let ty = match token.kind {
            TokenKind::Int => {
                self.advance();
                if self.match_token(TokenKind::LeftBracket) {
                    self.expect(TokenKind::RightBracket, "expected ']' in 'int[]'")?;
                    Type::IntArray
                } else {
                    Type::Int
                }
            }
            TokenKind::Boolean => {
                self.advance();
                Type::Boolean
            }
            TokenKind::Identifier => {
                self.advance();
                Type::Class(token.lexeme.clone())
            }
            _ => {
                self.error_at_current(codes::EXPECTED_TYPE, "expected a type");
                return None;
            }
        };

        let span = token.span().merge(&self.previous().span());
        Some(TypeSpec { ty, span })
    }

    // === Helper methods ===

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.current + 1).map(|t| t.kind)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Option<&Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            self.error_at_current(codes::EXPECTED_TOKEN, message);
            None
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Option<Ident> {
        if self.check(TokenKind::Identifier) {
            let token = self.advance();
            Some(Ident::new(token.lexeme.clone(), token.span()))
        } else {
            self.error_at_current(codes::EXPECTED_IDENTIFIER, message);
            None
        }
    }

    fn error_at_current(&mut self, code: &str, message: &str) {
        let token = self.peek();
        let found = if token.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            format!("'{}'", token.lexeme)
        };
        let (offset, length) = (token.offset, token.length);

        self.reporter.report_with_label(
            Diagnostic::error(code, message),
            offset,
            length,
            &format!("found {}", found),
        );
    }
}
