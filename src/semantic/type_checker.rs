//! Type checker for MiniJava semantic analysis.
//!
//! Walks the program a second time, entering the same scopes the populator
//! registered, and computes a static type for every expression. The first
//! violation is returned as an error.

use super::error::{SemanticError, SemanticErrorKind};
use super::populator::ENTRY_METHOD;
use super::symbol_table::SymbolTable;
use crate::parser::*;

/// Type checker that validates the AST against a populated symbol table
pub struct TypeChecker<'a> {
    symbols: &'a mut SymbolTable,
}

impl<'a> TypeChecker<'a> {
    pub fn new(symbols: &'a mut SymbolTable) -> Self {
        Self { symbols }
    }

    /// Check an entire program
    pub fn check(&mut self, program: &Program) -> Result<(), SemanticError> {
        self.symbols.reset_cursor();
        self.check_main(&program.main_class)?;

        for class in &program.classes {
            self.check_class(class)?;
        }

        Ok(())
    }

    fn check_main(&mut self, main: &MainClass) -> Result<(), SemanticError> {
        self.enter(&main.name)?;
        self.enter(&Ident::new(ENTRY_METHOD, main.name.span))?;

        for local in &main.locals {
            self.check_declared_type(&local.type_spec)?;
        }
        for stmt in &main.body {
            self.check_stmt(stmt)?;
        }

        self.symbols.exit();
        self.symbols.exit();
        Ok(())
    }

    fn check_class(&mut self, class: &ClassDecl) -> Result<(), SemanticError> {
        self.enter(&class.name)?;

        for field in &class.fields {
            self.check_declared_type(&field.type_spec)?;
        }
        for method in &class.methods {
            self.check_method(method)?;
        }

        self.symbols.exit();
        Ok(())
    }

    fn check_method(&mut self, method: &MethodDecl) -> Result<(), SemanticError> {
        self.enter(&method.name)?;

        self.check_declared_type(&method.return_type)?;
        for param in &method.params {
            self.check_declared_type(&param.type_spec)?;
        }
        for local in &method.locals {
            self.check_declared_type(&local.type_spec)?;
        }

        for stmt in &method.body {
            self.check_stmt(stmt)?;
        }

        let found = self.check_expr(&method.return_expr)?;
        if found != method.return_type.ty {
            return Err(error(
                SemanticErrorKind::ReturnTypeMismatch {
                    method: method.name.name.clone(),
                    expected: method.return_type.ty.clone(),
                    found,
                },
                method.return_expr.span,
            ));
        }

        self.symbols.exit();
        Ok(())
    }

    /// Class names in type positions must be declared somewhere in the program
    fn check_declared_type(&self, spec: &TypeSpec) -> Result<(), SemanticError> {
        match &spec.ty {
            Type::Class(name) if !self.symbols.class_exists(name) => {
                Err(error(SemanticErrorKind::UndeclaredClass(name.clone()), spec.span))
            }
            _ => Ok(()),
        }
    }

    // === Statements ===

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::Block(statements) => {
                for stmt in statements {
                    self.check_stmt(stmt)?;
                }
                Ok(())
            }

            Stmt::Assign { target, value } => {
                let expected = self.lookup(target)?;
                let found = self.check_expr(value)?;
                if self.symbols.is_assignable(&expected, &found) {
                    Ok(())
                } else {
                    Err(mismatch(format!("Assignment to {}", target.name), expected, found, value.span))
                }
            }

            Stmt::ArrayAssign { target, index, value } => {
                let array = self.lookup(target)?;
                if array != Type::IntArray {
                    return Err(mismatch(target.name.clone(), Type::IntArray, array, target.span));
                }
                self.expect_type(index, Type::Int, "Array index")?;
                self.expect_type(value, Type::Int, format!("Assignment to {}[]", target.name))
            }

            Stmt::If { condition, then_branch, else_branch, .. } => {
                self.expect_type(condition, Type::Boolean, "If condition")?;
                self.check_stmt(then_branch)?;
                self.check_stmt(else_branch)
            }

            Stmt::While { condition, body, .. } => {
                self.expect_type(condition, Type::Boolean, "While condition")?;
                self.check_stmt(body)
            }

            Stmt::Print { value, .. } => self.expect_type(value, Type::Int, "Print argument"),
        }
    }

    // === Expressions ===

    fn check_expr(&mut self, expr: &Expr) -> Result<Type, SemanticError> {
        match &expr.kind {
            ExprKind::IntLiteral(_) => Ok(Type::Int),
            ExprKind::True | ExprKind::False => Ok(Type::Boolean),

            ExprKind::Identifier(name) => self.lookup(&Ident::new(name.clone(), expr.span)),

            ExprKind::This => {
                let in_static = self.symbols.current_method().map_or(false, |m| m.is_static);
                match self.symbols.current_class() {
                    Some(class) if !in_static => Ok(Type::Class(class.name.clone())),
                    _ => Err(error(SemanticErrorKind::ThisInStaticContext, expr.span)),
                }
            }

            ExprKind::NewArray(size) => {
                self.expect_type(size, Type::Int, "Array size")?;
                Ok(Type::IntArray)
            }

            ExprKind::NewObject(class) => {
                if self.symbols.class_exists(&class.name) {
                    Ok(Type::Class(class.name.clone()))
                } else {
                    Err(error(SemanticErrorKind::UndeclaredClass(class.name.clone()), class.span))
                }
            }

            ExprKind::Not(operand) => {
                self.expect_type(operand, Type::Boolean, "Operand of '!'")?;
                Ok(Type::Boolean)
            }

            ExprKind::Binary { op, left, right } => {
                let (operand, result) = match op {
                    BinaryOp::And => (Type::Boolean, Type::Boolean),
                    BinaryOp::Less => (Type::Int, Type::Boolean),
                    BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => (Type::Int, Type::Int),
                };
                let context = format!("Operand of '{}'", op);
                self.expect_type(left, operand.clone(), context.clone())?;
                self.expect_type(right, operand, context)?;
                Ok(result)
            }

            ExprKind::ArrayLookup { array, index } => {
                self.expect_type(array, Type::IntArray, "Indexed expression")?;
                self.expect_type(index, Type::Int, "Array index")?;
                Ok(Type::Int)
            }

            ExprKind::ArrayLength(array) => {
                self.expect_type(array, Type::IntArray, "Operand of '.length'")?;
                Ok(Type::Int)
            }

            ExprKind::Call { receiver, method, args } => self.check_call(receiver, method, args),
        }
    }

    fn check_call(&mut self, receiver: &Expr, method: &Ident, args: &[Expr]) -> Result<Type, SemanticError> {
        let receiver_ty = self.check_expr(receiver)?;
        let class = match receiver_ty {
            Type::Class(class) => class,
            other => return Err(error(SemanticErrorKind::NotAnObject(other), receiver.span)),
        };

        if !self.symbols.begin_call_lookup(&class, &method.name, method.span.line) {
            return Err(error(
                SemanticErrorKind::UndefinedMethod { class, method: method.name.clone() },
                method.span,
            ));
        }

        let result = self.check_call_args(method, args);
        self.symbols.end_call_lookup();
        result
    }

    /// Check arguments against the innermost pending call lookup
    fn check_call_args(&mut self, method: &Ident, args: &[Expr]) -> Result<Type, SemanticError> {
        let expected_count = self.symbols.call_method().map_or(0, |m| m.params.len());
        let count_error = || {
            error(
                SemanticErrorKind::ArgumentCount {
                    method: method.name.clone(),
                    expected: expected_count,
                    found: args.len(),
                },
                method.span,
            )
        };

        for (index, arg) in args.iter().enumerate() {
            let found = self.check_expr(arg)?;
            let Some(expected) = self.symbols.next_arg_type() else {
                return Err(count_error());
            };
            if !self.symbols.is_assignable(&expected, &found) {
                return Err(error(
                    SemanticErrorKind::ArgumentType {
                        method: method.name.clone(),
                        index: index + 1,
                        expected,
                        found,
                    },
                    arg.span,
                ));
            }
        }

        if !self.symbols.arg_count_matches() {
            return Err(count_error());
        }

        self.symbols
            .call_return_type()
            .ok_or_else(|| error(SemanticErrorKind::ScopeViolation(method.name.clone()), method.span))
    }

    // === Helpers ===

    /// The expression must have exactly `expected`
    fn expect_type(&mut self, expr: &Expr, expected: Type, context: impl Into<String>) -> Result<(), SemanticError> {
        let found = self.check_expr(expr)?;
        if found == expected {
            Ok(())
        } else {
            Err(mismatch(context.into(), expected, found, expr.span))
        }
    }

    fn lookup(&self, ident: &Ident) -> Result<Type, SemanticError> {
        self.symbols
            .lookup(&ident.name)
            .ok_or_else(|| error(SemanticErrorKind::UndeclaredVariable(ident.name.clone()), ident.span))
    }

    fn enter(&mut self, ident: &Ident) -> Result<(), SemanticError> {
        if self.symbols.enter(&ident.name) {
            Ok(())
        } else {
            Err(error(SemanticErrorKind::ScopeViolation(ident.name.clone()), ident.span))
        }
    }
}

fn error(kind: SemanticErrorKind, span: Span) -> SemanticError {
    SemanticError::new(kind, span)
}

fn mismatch(context: String, expected: Type, found: Type, span: Span) -> SemanticError {
    error(SemanticErrorKind::TypeMismatch { context, expected, found }, span)
}
