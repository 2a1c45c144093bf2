//! Expression parser for MiniJava.
//! Precedence climbing from `&&` (lowest) down to postfix forms.

use super::{BinaryOp, Expr, ExprKind, Parser, Span};
use crate::diagnostics::{codes, Diagnostic};
use crate::lexer::TokenKind;

/// Trait extension for expression parsing
pub trait ExpressionParser {
    fn expression(&mut self) -> Option<Expr>;
}

impl<'a> ExpressionParser for Parser<'a> {
    fn expression(&mut self) -> Option<Expr> {
        self.parse_and()
    }
}

impl<'a> Parser<'a> {
    /// Parse logical AND: a && b
    fn parse_and(&mut self) -> Option<Expr> {
        let mut expr = self.parse_comparison()?;

        while self.check(TokenKind::AmpersandAmpersand) {
            let op_span = self.advance().span();
            let right = self.parse_comparison()?;
            expr = binary(BinaryOp::And, expr, right, op_span);
        }

        Some(expr)
    }

    /// Parse comparison: a < b
    fn parse_comparison(&mut self) -> Option<Expr> {
        let mut expr = self.parse_term()?;

        while self.check(TokenKind::Less) {
            let op_span = self.advance().span();
            let right = self.parse_term()?;
            expr = binary(BinaryOp::Less, expr, right, op_span);
        }

        Some(expr)
    }

    /// Parse additive: a + b, a - b
    fn parse_term(&mut self) -> Option<Expr> {
        let mut expr = self.parse_factor()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let op_span = self.advance().span();
            let right = self.parse_factor()?;
            expr = binary(op, expr, right, op_span);
        }

        Some(expr)
    }

    /// Parse multiplicative: a * b
    fn parse_factor(&mut self) -> Option<Expr> {
        let mut expr = self.parse_unary()?;

        while self.check(TokenKind::Star) {
            let op_span = self.advance().span();
            let right = self.parse_unary()?;
            expr = binary(BinaryOp::Mul, expr, right, op_span);
        }

        Some(expr)
    }

    /// Parse unary: !a
    fn parse_unary(&mut self) -> Option<Expr> {
        if self.check(TokenKind::Bang) {
            let span = self.advance().span();
            let operand = self.parse_unary()?;
            let span = span.merge(&operand.span);
            return Some(Expr::new(ExprKind::Not(Box::new(operand)), span));
        }

        self.parse_postfix()
    }

    /// Parse postfix: a[i], a.length, a.m(args)
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.match_token(TokenKind::LeftBracket) {
                let index = self.expression()?;
                let close = self.expect(TokenKind::RightBracket, "expected ']' after index")?.span();
                let span = expr.span.merge(&close);
                expr = Expr::new(
                    ExprKind::ArrayLookup {
                        array: Box::new(expr),
                        index: Box::new(index),
                    },
                    span,
                );
            } else if self.match_token(TokenKind::Dot) {
                if self.check(TokenKind::Length) {
                    let span = expr.span.merge(&self.advance().span());
                    expr = Expr::new(ExprKind::ArrayLength(Box::new(expr)), span);
                    continue;
                }

                let method = self.expect_identifier("expected method name or 'length' after '.'")?;
                self.expect(TokenKind::LeftParen, "expected '(' after method name")?;
                let args = self.arguments()?;
                let span = method.span;
                expr = Expr::new(
                    ExprKind::Call {
                        receiver: Box::new(expr),
                        method,
                        args,
                    },
                    span,
                );
            } else {
                break;
            }
        }

        Some(expr)
    }

    /// Parse call arguments after '('
    fn arguments(&mut self) -> Option<Vec<Expr>> {
        let mut args = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen, "expected ')' after arguments")?;
        Some(args)
    }

    /// Parse primary expressions
    fn parse_primary(&mut self) -> Option<Expr> {
        let token = self.peek().clone();
        let span = token.span();

        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                match token.lexeme.parse::<i32>() {
                    Ok(value) => Some(Expr::new(ExprKind::IntLiteral(value), span)),
                    Err(_) => {
                        self.reporter.report_span(
                            Diagnostic::error(
                                codes::INVALID_NUMBER,
                                format!("integer literal '{}' is out of range", token.lexeme),
                            )
                            .with_help(format!("integer literals must not exceed {}", i32::MAX)),
                            span,
                            "",
                        );
                        None
                    }
                }
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::new(ExprKind::True, span))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::new(ExprKind::False, span))
            }
            TokenKind::This => {
                self.advance();
                Some(Expr::new(ExprKind::This, span))
            }
            TokenKind::Identifier => {
                self.advance();
                Some(Expr::new(ExprKind::Identifier(token.lexeme.clone()), span))
            }
            TokenKind::New => {
                self.advance();
                if self.match_token(TokenKind::Int) {
                    self.expect(TokenKind::LeftBracket, "expected '[' after 'new int'")?;
                    let size = self.expression()?;
                    let close = self.expect(TokenKind::RightBracket, "expected ']' after array size")?.span();
                    return Some(Expr::new(ExprKind::NewArray(Box::new(size)), span.merge(&close)));
                }

                let class = self.expect_identifier("expected class name or 'int' after 'new'")?;
                self.expect(TokenKind::LeftParen, "expected '(' after class name")?;
                let close = self.expect(TokenKind::RightParen, "expected ')' after '('")?.span();
                Some(Expr::new(ExprKind::NewObject(class), span.merge(&close)))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(TokenKind::RightParen, "expected ')' after expression")?;
                Some(expr)
            }
            _ => {
                self.error_at_current(codes::EXPECTED_EXPRESSION, "expected expression");
                None
            }
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr, op_span: Span) -> Expr {
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        op_span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticReporter;
    use crate::lexer::Scanner;

    fn parse_expr(source: &str) -> (Option<Expr>, DiagnosticReporter) {
        let mut reporter = DiagnosticReporter::new("test.java", source);
        let tokens = Scanner::new(source, &mut reporter).scan_tokens();
        let expr = Parser::new(tokens, &mut reporter).expression();
        (expr, reporter)
    }

    #[test]
    fn test_precedence() {
        let (expr, _) = parse_expr("1 + 2 * 3 < 10 && !b");
        match expr.unwrap().kind {
            ExprKind::Binary { op: BinaryOp::And, left, right } => {
                assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Less, .. }));
                assert!(matches!(right.kind, ExprKind::Not(_)));
            }
            other => panic!("expected &&, got {:?}", other),
        }
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let (expr, _) = parse_expr("10 - 3 - 2");
        match expr.unwrap().kind {
            ExprKind::Binary { op: BinaryOp::Sub, left, right } => {
                assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
                assert!(matches!(right.kind, ExprKind::IntLiteral(2)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_call_chain_and_length() {
        let (expr, _) = parse_expr("new C().make().length");
        match expr.unwrap().kind {
            ExprKind::ArrayLength(inner) => match inner.kind {
                ExprKind::Call { receiver, method, .. } => {
                    assert_eq!(method.name, "make");
                    assert!(matches!(receiver.kind, ExprKind::NewObject(ref c) if c.name == "C"));
                }
                other => panic!("expected call, got {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_call_arguments() {
        let (expr, _) = parse_expr("this.add(a[0], new int[5].length, (x))");
        match expr.unwrap().kind {
            ExprKind::Call { receiver, method, args } => {
                assert!(matches!(receiver.kind, ExprKind::This));
                assert_eq!(method.name, "add");
                assert_eq!(args.len(), 3);
                assert!(matches!(args[0].kind, ExprKind::ArrayLookup { .. }));
                assert!(matches!(args[1].kind, ExprKind::ArrayLength(_)));
                assert!(matches!(args[2].kind, ExprKind::Identifier(ref n) if n == "x"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_literal_overflow() {
        let (expr, reporter) = parse_expr("2147483648");
        assert!(expr.is_none());
        assert_eq!(reporter.diagnostics()[0].code, codes::INVALID_NUMBER);
    }
}
