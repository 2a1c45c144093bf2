//! Statement parser for MiniJava.

use super::expression::ExpressionParser;
use super::{Parser, Span, Stmt};
use crate::diagnostics::codes;
use crate::lexer::TokenKind;

/// Trait extension for statement parsing
pub trait StatementParser {
    fn statement(&mut self) -> Option<Stmt>;
}

impl<'a> StatementParser for Parser<'a> {
    fn statement(&mut self) -> Option<Stmt> {
        self.parse_statement()
    }
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        match self.peek().kind {
            TokenKind::LeftBrace => {
                self.advance();
                let statements = self.statements_until_brace()?;
                self.expect(TokenKind::RightBrace, "expected '}' after block")?;
                Some(Stmt::Block(statements))
            }

            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Println => self.print_statement(),
            TokenKind::Identifier => self.assignment_statement(),

            _ => {
                self.error_at_current(codes::EXPECTED_STATEMENT, "expected a statement");
                None
            }
        }
    }

    /// Statements up to (not including) the closing `}`
    pub(crate) fn statements_until_brace(&mut self) -> Option<Vec<Stmt>> {
        self.statements_until(TokenKind::RightBrace)
    }

    /// Statements up to `terminator`, a closing `}`, or end of input
    pub(crate) fn statements_until(&mut self, terminator: TokenKind) -> Option<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(terminator) && !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Some(statements)
    }

    fn keyword_span(&mut self) -> Span {
        self.advance().span()
    }

    fn if_statement(&mut self) -> Option<Stmt> {
        let span = self.keyword_span();

        self.expect(TokenKind::LeftParen, "expected '(' after 'if'")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after if condition")?;

        let then_branch = Box::new(self.parse_statement()?);
        self.expect(TokenKind::Else, "expected 'else' after if branch")?;
        let else_branch = Box::new(self.parse_statement()?);

        Some(Stmt::If {
            condition,
            then_branch,
            else_branch,
            span,
        })
    }

    fn while_statement(&mut self) -> Option<Stmt> {
        let span = self.keyword_span();

        self.expect(TokenKind::LeftParen, "expected '(' after 'while'")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after while condition")?;

        let body = Box::new(self.parse_statement()?);

        Some(Stmt::While { condition, body, span })
    }

    fn print_statement(&mut self) -> Option<Stmt> {
        let span = self.keyword_span();

        self.expect(TokenKind::LeftParen, "expected '(' after 'System.out.println'")?;
        let value = self.expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after println argument")?;
        self.expect(TokenKind::Semicolon, "expected ';' after println")?;

        Some(Stmt::Print { value, span })
    }

    /// `x = e;` or `x[i] = e;`
    fn assignment_statement(&mut self) -> Option<Stmt> {
        let target = self.expect_identifier("expected variable name")?;

        if self.match_token(TokenKind::LeftBracket) {
            let index = self.expression()?;
            self.expect(TokenKind::RightBracket, "expected ']' after array index")?;
            self.expect(TokenKind::Equal, "expected '=' in array assignment")?;
            let value = self.expression()?;
            self.expect(TokenKind::Semicolon, "expected ';' after assignment")?;
            return Some(Stmt::ArrayAssign { target, index, value });
        }

        self.expect(TokenKind::Equal, "expected '=' in assignment")?;
        let value = self.expression()?;
        self.expect(TokenKind::Semicolon, "expected ';' after assignment")?;

        Some(Stmt::Assign { target, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticReporter;
    use crate::lexer::Scanner;

    fn parse_stmt(source: &str) -> Option<Stmt> {
        let mut reporter = DiagnosticReporter::new("test.java", source);
        let tokens = Scanner::new(source, &mut reporter).scan_tokens();
        let mut parser = Parser::new(tokens, &mut reporter);
        parser.statement()
    }

    #[test]
    fn test_if_else() {
        let stmt = parse_stmt("if (a < b) x = 1; else { x = 2; y = 3; }").unwrap();
        match stmt {
            Stmt::If { else_branch, span, .. } => {
                assert_eq!(span.line, 1);
                assert!(matches!(*else_branch, Stmt::Block(ref s) if s.len() == 2));
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_array_assign() {
        let stmt = parse_stmt("arr[i + 1] = 7;").unwrap();
        assert!(matches!(stmt, Stmt::ArrayAssign { ref target, .. } if target.name == "arr"));
    }

    #[test]
    fn test_while_and_print() {
        let stmt = parse_stmt("while (i < 3) System.out.println(i);").unwrap();
        match stmt {
            Stmt::While { body, .. } => assert!(matches!(*body, Stmt::Print { .. })),
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_if_without_else_fails() {
        assert!(parse_stmt("if (c) x = 1;").is_none());
    }
}
