//! Scanner for MiniJava source code tokenization.

use super::token::{lookup_keyword, Token, TokenKind};
use crate::diagnostics::{codes, Diagnostic, DiagnosticReporter};

const PRINTLN_TAIL: &str = ".out.println";

/// Scanner that produces tokens from source code
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_offset: usize,
    start_offset: usize,
    line: usize,
    line_start: usize,
    start_line: usize,
    start_column: usize,
    reporter: &'a mut DiagnosticReporter,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, reporter: &'a mut DiagnosticReporter) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_offset: 0,
            start_offset: 0,
            line: 1,
            line_start: 0,
            start_line: 1,
            start_column: 1,
            reporter,
        }
    }

    /// Tokenize the entire source
    pub fn scan_tokens(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;

            if token.kind != TokenKind::Error {
                tokens.push(token);
            }

            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Scan a single token
    fn scan_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start_offset = self.current_offset;
        self.start_line = self.line;
        self.start_column = self.current_offset - self.line_start + 1;

        match self.advance() {
            None => Token::eof(self.current_offset, self.start_line, self.start_column),
            Some((_, c)) => match c {
                '(' => self.make_token(TokenKind::LeftParen),
                ')' => self.make_token(TokenKind::RightParen),
                '{' => self.make_token(TokenKind::LeftBrace),
                '}' => self.make_token(TokenKind::RightBrace),
                '[' => self.make_token(TokenKind::LeftBracket),
                ']' => self.make_token(TokenKind::RightBracket),
                ',' => self.make_token(TokenKind::Comma),
                ';' => self.make_token(TokenKind::Semicolon),
                '.' => self.make_token(TokenKind::Dot),
                '+' => self.make_token(TokenKind::Plus),
                '-' => self.make_token(TokenKind::Minus),
                '*' => self.make_token(TokenKind::Star),
                '!' => self.make_token(TokenKind::Bang),
                '<' => self.make_token(TokenKind::Less),
                '=' => self.make_token(TokenKind::Equal),

                '&' => {
                    if self.match_char('&') {
                        self.make_token(TokenKind::AmpersandAmpersand)
                    } else {
                        self.error_token(c)
                    }
                }

                '0'..='9' => self.scan_number(),

                c if is_ident_start(c) => self.scan_identifier(),

                _ => self.error_token(c),
            },
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\n' | '\u{000C}') => {
                    self.advance();
                }
                Some('/') => {
                    let mut chars = self.chars.clone();
                    chars.next(); // consume '/'
                    match chars.peek() {
                        Some((_, '/')) => {
                            self.advance(); // '/'
                            self.advance(); // '/'
                            while self.peek().map_or(false, |c| c != '\n') {
                                self.advance();
                            }
                        }
                        Some((_, '*')) => {
                            let start = self.current_offset;
                            self.advance(); // '/'
                            self.advance(); // '*'
                            let mut closed = false;
                            while let Some((_, c)) = self.advance() {
                                if c == '*' && self.match_char('/') {
                                    closed = true;
                                    break;
                                }
                            }
                            if !closed {
                                self.reporter.report(
                                    Diagnostic::error(codes::UNTERMINATED_COMMENT, "unterminated block comment")
                                        .with_help("close the comment with '*/'"),
                                    start,
                                    2,
                                );
                            }
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((offset, c)) = result {
            self.current_offset = offset + c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.line_start = self.current_offset;
            }
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        let lexeme = &self.source[self.start_offset..self.current_offset];
        Token::new(
            kind,
            lexeme,
            self.start_offset,
            self.current_offset - self.start_offset,
            self.start_line,
            self.start_column,
        )
    }

    fn error_token(&mut self, c: char) -> Token {
        self.reporter.report(
            Diagnostic::error(codes::UNEXPECTED_CHARACTER, format!("unexpected character '{}'", c)),
            self.start_offset,
            c.len_utf8(),
        );
        self.make_token(TokenKind::Error)
    }

    fn scan_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }

        let ident = &self.source[self.start_offset..self.current_offset];
        if ident == "System" && self.at_println_tail() {
            for _ in PRINTLN_TAIL.chars() {
                self.advance();
            }
            return self.make_token(TokenKind::Println);
        }

        let kind = lookup_keyword(ident).unwrap_or(TokenKind::Identifier);
        self.make_token(kind)
    }

    /// `System.out.println` is a single token; `System` alone stays an identifier.
    fn at_println_tail(&self) -> bool {
        let rest = &self.source[self.current_offset..];
        rest.starts_with(PRINTLN_TAIL)
            && !rest[PRINTLN_TAIL.len()..]
                .chars()
                .next()
                .map_or(false, is_ident_continue)
    }

    fn scan_number(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        self.make_token(TokenKind::IntLiteral)
    }
}

// `_` cannot start an identifier, which keeps source names disjoint from
// generated IR temporaries.
fn is_ident_start(c: char) -> bool {
    unicode_xid::UnicodeXID::is_xid_start(c)
}

fn is_ident_continue(c: char) -> bool {
    unicode_xid::UnicodeXID::is_xid_continue(c)
}
