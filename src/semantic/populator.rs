//! First pass: register classes, members and scopes in the symbol table.
//!
//! Duplicate declarations, undeclared parents and incompatible overrides
//! are caught here; the first one aborts the pass.

use super::error::{SemanticError, SemanticErrorKind};
use super::symbol_table::SymbolTable;
use crate::parser::*;

pub const ENTRY_METHOD: &str = "main";

/// Builds the symbol table from a parsed program
pub struct Populator<'a> {
    symbols: &'a mut SymbolTable,
}

impl<'a> Populator<'a> {
    pub fn new(symbols: &'a mut SymbolTable) -> Self {
        Self { symbols }
    }

    pub fn populate(&mut self, program: &Program) -> Result<(), SemanticError> {
        self.symbols.reset_cursor();
        self.populate_main(&program.main_class)?;

        for class in &program.classes {
            self.populate_class(class)?;
        }

        tracing::debug!(classes = program.classes.len() + 1, "symbol table populated");
        Ok(())
    }

    fn populate_main(&mut self, main: &MainClass) -> Result<(), SemanticError> {
        if !self.symbols.declare_entry_class(&main.name.name) {
            return Err(error(SemanticErrorKind::DuplicateClass(main.name.name.clone()), main.name.span));
        }
        self.enter(&main.name)?;

        self.symbols.declare_entry_method(ENTRY_METHOD);
        self.enter(&Ident::new(ENTRY_METHOD, main.name.span))?;

        self.symbols.declare_param(&main.arg_name.name, Type::StringArray);
        for local in &main.locals {
            self.declare_var(local)?;
        }

        self.symbols.exit();
        self.symbols.exit();
        Ok(())
    }

    fn populate_class(&mut self, class: &ClassDecl) -> Result<(), SemanticError> {
        let name = &class.name.name;

        if let Some(parent) = &class.parent {
            if !self.symbols.class_exists(&parent.name) {
                return Err(error(
                    SemanticErrorKind::ParentNotDeclared {
                        class: name.clone(),
                        parent: parent.name.clone(),
                    },
                    parent.span,
                ));
            }
        }

        let parent = class.parent.as_ref().map(|p| p.name.as_str());
        if !self.symbols.declare_class(name, parent) {
            return Err(error(SemanticErrorKind::DuplicateClass(name.clone()), class.name.span));
        }
        tracing::trace!(class = %name, parent = ?parent, "declared class");

        self.enter(&class.name)?;

        for field in &class.fields {
            self.declare_var(field)?;
        }

        for method in &class.methods {
            self.populate_method(method)?;
        }

        self.symbols.exit();
        Ok(())
    }

    fn populate_method(&mut self, method: &MethodDecl) -> Result<(), SemanticError> {
        let name = &method.name.name;

        if !self.symbols.declare_method(method.return_type.ty.clone(), name) {
            return Err(error(SemanticErrorKind::DuplicateMethod(name.clone()), method.name.span));
        }
        self.enter(&method.name)?;

        for param in &method.params {
            if !self.symbols.declare_param(&param.name.name, param.type_spec.ty.clone()) {
                return Err(error(
                    SemanticErrorKind::DuplicateVariable(param.name.name.clone()),
                    param.name.span,
                ));
            }
        }

        if !self.symbols.check_override_polymorphism() {
            return Err(error(
                SemanticErrorKind::IncompatibleOverride {
                    method: name.clone(),
                    parent: self.overridden_owner(name),
                },
                method.name.span,
            ));
        }

        for local in &method.locals {
            self.declare_var(local)?;
        }

        self.symbols.exit();
        Ok(())
    }

    fn declare_var(&mut self, decl: &VarDecl) -> Result<(), SemanticError> {
        if self.symbols.declare_var(&decl.name.name, decl.type_spec.ty.clone()) {
            Ok(())
        } else {
            Err(error(SemanticErrorKind::DuplicateVariable(decl.name.name.clone()), decl.name.span))
        }
    }

    fn enter(&mut self, ident: &Ident) -> Result<(), SemanticError> {
        if self.symbols.enter(&ident.name) {
            Ok(())
        } else {
            Err(error(SemanticErrorKind::ScopeViolation(ident.name.clone()), ident.span))
        }
    }

    /// Class declaring the method that `name` overrides in the current class
    fn overridden_owner(&self, name: &str) -> String {
        self.symbols
            .current_class()
            .and_then(|class| class.parent.as_deref())
            .and_then(|parent| self.symbols.find_method(parent, name))
            .map(|m| m.owner.clone())
            .unwrap_or_default()
    }
}

fn error(kind: SemanticErrorKind, span: Span) -> SemanticError {
    SemanticError::new(kind, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::test_support::parse;

    fn populate(source: &str) -> Result<SymbolTable, SemanticError> {
        let program = parse(source);
        let mut symbols = SymbolTable::new();
        Populator::new(&mut symbols).populate(&program)?;
        Ok(symbols)
    }

    const MAIN: &str = "class Main { public static void main(String[] a) { } }\n";

    #[test]
    fn test_registers_classes_and_members() {
        let symbols = populate(&format!(
            "{}class A {{ int x; boolean y; public int get(int k, A other) {{ int t; return x; }} }}\n\
             class B extends A {{ int[] z; }}",
            MAIN
        ))
        .unwrap();

        let entry = symbols.entry_class().unwrap();
        assert_eq!(entry.name, "Main");
        let main = &entry.methods["main"];
        assert!(main.is_static);
        assert_eq!(main.params, vec![("a".to_string(), Type::StringArray)]);

        let a = symbols.class("A").unwrap();
        assert_eq!(a.fields.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        let get = &a.methods["get"];
        assert_eq!(get.return_type, Type::Int);
        assert_eq!(get.param_types().cloned().collect::<Vec<_>>(), vec![Type::Int, Type::Class("A".into())]);
        assert_eq!(get.locals.get("t"), Some(&Type::Int));

        assert_eq!(symbols.class("B").unwrap().parent.as_deref(), Some("A"));
        assert!(symbols.current_class().is_none());
    }

    #[test]
    fn test_duplicate_class() {
        let err = populate(&format!("{}class A {{ }}\nclass A {{ }}", MAIN)).unwrap_err();
        assert_eq!(err.kind, SemanticErrorKind::DuplicateClass("A".into()));
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn test_class_named_like_main_is_duplicate() {
        let err = populate(&format!("{}class Main {{ }}", MAIN)).unwrap_err();
        assert_eq!(err.kind, SemanticErrorKind::DuplicateClass("Main".into()));
    }

    #[test]
    fn test_parent_must_come_first() {
        let err = populate(&format!("{}class B extends A {{ }}\nclass A {{ }}", MAIN)).unwrap_err();
        assert_eq!(
            err.kind,
            SemanticErrorKind::ParentNotDeclared { class: "B".into(), parent: "A".into() }
        );
        assert_eq!(err.line(), 2);
        assert_eq!(err.to_string(), "Error at line 2: Class A must be declared before class B");
    }

    #[test]
    fn test_duplicate_method_reports_second_line() {
        let err = populate(&format!(
            "{}class A {{\n  public int f() {{ return 1; }}\n  public int f() {{ return 2; }}\n}}",
            MAIN
        ))
        .unwrap_err();
        assert_eq!(err.kind, SemanticErrorKind::DuplicateMethod("f".into()));
        assert_eq!(err.line(), 4);
    }

    #[test]
    fn test_duplicate_field_param_and_local() {
        let field = populate(&format!("{}class A {{ int x; boolean x; }}", MAIN)).unwrap_err();
        assert_eq!(field.kind, SemanticErrorKind::DuplicateVariable("x".into()));

        let param = populate(&format!("{}class A {{ public int f(int p, int p) {{ return p; }} }}", MAIN))
            .unwrap_err();
        assert_eq!(param.kind, SemanticErrorKind::DuplicateVariable("p".into()));

        let local = populate(&format!("{}class A {{ public int f(int p) {{ int p; return p; }} }}", MAIN))
            .unwrap_err();
        assert_eq!(local.kind, SemanticErrorKind::DuplicateVariable("p".into()));

        let main_local = populate("class Main { public static void main(String[] a) { int a; } }").unwrap_err();
        assert_eq!(main_local.kind, SemanticErrorKind::DuplicateVariable("a".into()));
    }

    #[test]
    fn test_local_may_shadow_field() {
        assert!(populate(&format!("{}class A {{ int x; public int f() {{ boolean x; return 0; }} }}", MAIN)).is_ok());
    }

    #[test]
    fn test_incompatible_override() {
        let err = populate(&format!(
            "{}class A {{ public int f(int a) {{ return a; }} }}\n\
             class B extends A {{ }}\n\
             class C extends B {{ public int f(boolean a) {{ return 0; }} }}",
            MAIN
        ))
        .unwrap_err();
        assert_eq!(
            err.kind,
            SemanticErrorKind::IncompatibleOverride { method: "f".into(), parent: "A".into() }
        );
        assert!(err.to_string().contains("Method f should have the same return and argument types"));
    }

    #[test]
    fn test_override_return_type_must_match() {
        let err = populate(&format!(
            "{}class A {{ public int f() {{ return 0; }} }}\n\
             class B extends A {{ public boolean f() {{ return true; }} }}",
            MAIN
        ))
        .unwrap_err();
        assert!(matches!(err.kind, SemanticErrorKind::IncompatibleOverride { .. }));
    }
}
