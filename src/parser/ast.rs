//! Abstract Syntax Tree definitions for MiniJava.

use std::fmt;

/// Source span for tracking positions in error messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    /// Byte offset from start of source
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
    /// 1-based source line
    pub line: usize,
    /// 1-based byte column
    pub column: usize,
}

impl Span {
    pub fn new(offset: usize, length: usize, line: usize, column: usize) -> Self {
        Self { offset, length, line, column }
    }

    /// Create a span that covers both self and other, keeping the earlier position
    pub fn merge(&self, other: &Span) -> Span {
        let (first, _) = if self.offset <= other.offset { (self, other) } else { (other, self) };
        let end = (self.offset + self.length).max(other.offset + other.length);
        Span::new(first.offset, end - first.offset, first.line, first.column)
    }
}

/// An identifier occurrence with its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }
}

/// Static type of a MiniJava value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Boolean,
    IntArray,
    Class(String),
    /// Parameter type of the static entry method; not writable in source
    StringArray,
    /// Return type of the static entry method; not writable in source
    Void,
}

impl Type {
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Boolean => write!(f, "boolean"),
            Type::IntArray => write!(f, "int[]"),
            Type::Class(name) => write!(f, "{}", name),
            Type::StringArray => write!(f, "String[]"),
            Type::Void => write!(f, "void"),
        }
    }
}

/// A type written in a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub ty: Type,
    pub span: Span,
}

/// The root of the AST: the entry class followed by the other classes
#[derive(Debug, Clone)]
pub struct Program {
    pub main_class: MainClass,
    pub classes: Vec<ClassDecl>,
}

/// `class Main { public static void main(String[] args) { ... } }`
#[derive(Debug, Clone)]
pub struct MainClass {
    pub name: Ident,
    pub arg_name: Ident,
    pub locals: Vec<VarDecl>,
    pub body: Vec<Stmt>,
}

/// Class declaration, with optional `extends`
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: Ident,
    pub parent: Option<Ident>,
    pub fields: Vec<VarDecl>,
    pub methods: Vec<MethodDecl>,
}

/// Field or local variable declaration
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub type_spec: TypeSpec,
    pub name: Ident,
}

/// Method parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub type_spec: TypeSpec,
    pub name: Ident,
}

/// `public T m(params) { locals; statements; return e; }`
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub return_type: TypeSpec,
    pub name: Ident,
    pub params: Vec<Param>,
    pub locals: Vec<VarDecl>,
    pub body: Vec<Stmt>,
    pub return_expr: Expr,
}

/// Statements
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `{ s* }`
    Block(Vec<Stmt>),

    /// `x = e;`
    Assign {
        target: Ident,
        value: Expr,
    },

    /// `a[i] = e;`
    ArrayAssign {
        target: Ident,
        index: Expr,
        value: Expr,
    },

    /// `if (c) s else s`
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Box<Stmt>,
        span: Span,
    },

    /// `while (c) s`
    While {
        condition: Expr,
        body: Box<Stmt>,
        span: Span,
    },

    /// `System.out.println(e);`
    Print {
        value: Expr,
        span: Span,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Less,
    Add,
    Sub,
    Mul,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::And => "&&",
            BinaryOp::Less => "<",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
        };
        write!(f, "{}", s)
    }
}

/// An expression node with its source span
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Expression kinds
#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral(i32),
    True,
    False,
    Identifier(String),
    This,

    /// `new int[e]`
    NewArray(Box<Expr>),

    /// `new C()`
    NewObject(Ident),

    /// `!e`
    Not(Box<Expr>),

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `a[i]`
    ArrayLookup {
        array: Box<Expr>,
        index: Box<Expr>,
    },

    /// `a.length`
    ArrayLength(Box<Expr>),

    /// `o.m(args)`
    Call {
        receiver: Box<Expr>,
        method: Ident,
        args: Vec<Expr>,
    },
}
