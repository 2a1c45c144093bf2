//! Semantic errors raised by the populator and the type checker.

use thiserror::Error;

use crate::diagnostics::{codes, Diagnostic};
use crate::parser::{Span, Type};

/// What went wrong
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticErrorKind {
    #[error("Class named {0} already exists")]
    DuplicateClass(String),

    #[error("Class {parent} must be declared before class {class}")]
    ParentNotDeclared { class: String, parent: String },

    #[error("A method named {0} already exists in this scope")]
    DuplicateMethod(String),

    #[error("A variable named {0} already exists in this scope")]
    DuplicateVariable(String),

    #[error("Method {method} should have the same return and argument types as superclass methods with the same name")]
    IncompatibleOverride { method: String, parent: String },

    #[error("{0} has not been declared")]
    UndeclaredVariable(String),

    #[error("Class {0} has not been declared")]
    UndeclaredClass(String),

    #[error("Object of class {class} does not have a method {method}")]
    UndefinedMethod { class: String, method: String },

    #[error("Expression of type {0} is not an object")]
    NotAnObject(Type),

    #[error("'this' cannot be used inside the static main method")]
    ThisInStaticContext,

    #[error("{context} should be of type {expected}, found {found}")]
    TypeMismatch { context: String, expected: Type, found: Type },

    #[error("Method {method} should return {expected}, found {found}")]
    ReturnTypeMismatch { method: String, expected: Type, found: Type },

    #[error("Wrong argument number for method {method} call: expected {expected}, found {found}")]
    ArgumentCount { method: String, expected: usize, found: usize },

    #[error("Argument {index} of method {method} must be of type {expected} or a subclass of it, found {found}")]
    ArgumentType { method: String, index: usize, expected: Type, found: Type },

    #[error("internal error: could not enter scope {0}")]
    ScopeViolation(String),
}

/// A semantic error anchored at a source span
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error at line {}: {}", .span.line, .kind)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub span: Span,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    /// Diagnostic code for this error
    pub fn code(&self) -> &'static str {
        use SemanticErrorKind::*;
        match self.kind {
            DuplicateClass(_) | DuplicateMethod(_) | DuplicateVariable(_) => codes::DUPLICATE_DECLARATION,
            ParentNotDeclared { .. } => codes::PARENT_NOT_DECLARED,
            IncompatibleOverride { .. } => codes::INCOMPATIBLE_OVERRIDE,
            UndeclaredVariable(_) => codes::UNDEFINED_VARIABLE,
            UndeclaredClass(_) => codes::UNDEFINED_TYPE,
            UndefinedMethod { .. } => codes::UNDEFINED_METHOD,
            NotAnObject(_) => codes::NOT_AN_OBJECT,
            ThisInStaticContext => codes::STATIC_THIS,
            TypeMismatch { .. } | ArgumentType { .. } => codes::TYPE_MISMATCH,
            ReturnTypeMismatch { .. } => codes::RETURN_TYPE_MISMATCH,
            ArgumentCount { .. } => codes::ARGUMENT_COUNT_MISMATCH,
            ScopeViolation(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Diagnostic without location; the reporter attaches the source line
    pub fn to_diagnostic(&self) -> Diagnostic {
        use SemanticErrorKind::*;
        let diag = Diagnostic::error(self.code(), self.kind.to_string());

        match &self.kind {
            ParentNotDeclared { parent, .. } => {
                diag.with_help(format!("move the declaration of class {} above this class", parent))
            }
            IncompatibleOverride { parent, .. } => {
                diag.with_note(format!("overridden method is declared in class {}", parent))
            }
            TypeMismatch { expected: Type::Class(_), .. } | ArgumentType { expected: Type::Class(_), .. } => {
                diag.with_help("a class type accepts only that class or one of its subclasses")
            }
            ThisInStaticContext => diag.with_help("create an object with 'new' and call methods on it"),
            _ => diag,
        }
    }

    /// Label shown under the offending source text
    pub fn label(&self) -> &'static str {
        use SemanticErrorKind::*;
        match self.kind {
            DuplicateClass(_) | DuplicateMethod(_) | DuplicateVariable(_) => "redeclared here",
            ParentNotDeclared { .. } | UndeclaredVariable(_) | UndeclaredClass(_) => "not found",
            UndefinedMethod { .. } => "no such method",
            IncompatibleOverride { .. } => "signature differs from the inherited method",
            _ => "",
        }
    }
}
