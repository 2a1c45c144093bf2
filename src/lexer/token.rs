//! Token definitions for the MiniJava lexer.

use crate::parser::ast::Span;
use std::fmt;

/// A token with its kind, lexeme, and position
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub offset: usize,
    pub length: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        offset: usize,
        length: usize,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            offset,
            length,
            line,
            column,
        }
    }

    pub fn eof(offset: usize, line: usize, column: usize) -> Self {
        Self::new(TokenKind::Eof, "", offset, 0, line, column)
    }

    pub fn span(&self) -> Span {
        Span::new(self.offset, self.length, self.line, self.column)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}('{}') @{}:{}", self.kind, self.lexeme, self.line, self.column)
    }
}

/// All token kinds in MiniJava
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    IntLiteral,
    Identifier,

    // Type keywords
    Int,
    Boolean,
    Void,
    String,

    // Declaration keywords
    Class,
    Public,
    Static,
    Main,
    Extends,

    // Statement and expression keywords
    If,
    Else,
    While,
    Return,
    Println,    // System.out.println
    Length,
    True,
    False,
    This,
    New,

    // Operators
    Plus,           // +
    Minus,          // -
    Star,           // *
    Bang,           // !
    Less,           // <
    Equal,          // =
    AmpersandAmpersand, // &&
    Dot,            // .
    Comma,          // ,
    Semicolon,      // ;

    // Delimiters
    LeftParen,      // (
    RightParen,     // )
    LeftBrace,      // {
    RightBrace,     // }
    LeftBracket,    // [
    RightBracket,   // ]

    // Special
    Eof,
    Error,
}

impl TokenKind {
    /// Check if this token can begin a type in a declaration
    pub fn starts_type(&self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Boolean | TokenKind::Identifier)
    }
}

/// Map string to keyword token kind
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "int" => Some(TokenKind::Int),
        "boolean" => Some(TokenKind::Boolean),
        "void" => Some(TokenKind::Void),
        "String" => Some(TokenKind::String),

        "class" => Some(TokenKind::Class),
        "public" => Some(TokenKind::Public),
        "static" => Some(TokenKind::Static),
        "main" => Some(TokenKind::Main),
        "extends" => Some(TokenKind::Extends),

        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "while" => Some(TokenKind::While),
        "return" => Some(TokenKind::Return),
        "length" => Some(TokenKind::Length),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "this" => Some(TokenKind::This),
        "new" => Some(TokenKind::New),

        _ => None,
    }
}
