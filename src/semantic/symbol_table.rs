//! Symbol table for classes, their members, and the scope cursor.

use indexmap::IndexMap;
use crate::parser::Type;

/// Class registered in the symbol table
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub name: String,
    pub parent: Option<String>,
    /// Field name to type, in declaration order
    pub fields: IndexMap<String, Type>,
    /// Methods in declaration order
    pub methods: IndexMap<String, MethodEntry>,
    /// True for the implicit program-entry class
    pub is_entry: bool,
}

impl ClassEntry {
    fn new(name: &str, parent: Option<&str>, is_entry: bool) -> Self {
        Self {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            fields: IndexMap::new(),
            methods: IndexMap::new(),
            is_entry,
        }
    }
}

/// Method registered in a class
#[derive(Debug, Clone, PartialEq)]
pub struct MethodEntry {
    pub name: String,
    pub owner: String,
    pub return_type: Type,
    /// Parameters in call-site order
    pub params: Vec<(String, Type)>,
    pub locals: IndexMap<String, Type>,
    /// Only the entry method is static
    pub is_static: bool,
}

impl MethodEntry {
    pub fn param_types(&self) -> impl Iterator<Item = &Type> {
        self.params.iter().map(|(_, ty)| ty)
    }

    fn param(&self, name: &str) -> Option<&Type> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
    }

    fn declares(&self, name: &str) -> bool {
        self.locals.contains_key(name) || self.param(name).is_some()
    }

    /// Same return type and parameter-type sequence
    pub fn same_signature(&self, other: &MethodEntry) -> bool {
        self.return_type == other.return_type && self.param_types().eq(other.param_types())
    }
}

/// Where a resolved identifier lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    Local,
    Param,
    /// Field declared by the named class
    Field(String),
}

/// Result of resolving an identifier from a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub ty: Type,
    pub storage: Storage,
}

/// Pending call-site resolution
#[derive(Debug, Clone)]
struct CallFrame {
    owner: String,
    method: String,
    next_arg: usize,
}

/// Class table plus the scope cursor and call-resolution stack
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    classes: IndexMap<String, ClassEntry>,
    current_class: Option<String>,
    current_method: Option<String>,
    calls: Vec<CallFrame>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    // === Declarations ===

    /// Register a class. Fails if the name exists or the named parent does not.
    pub fn declare_class(&mut self, name: &str, parent: Option<&str>) -> bool {
        if self.classes.contains_key(name) {
            return false;
        }
        if let Some(parent) = parent {
            if !self.classes.contains_key(parent) {
                return false;
            }
        }

        self.classes.insert(name.to_string(), ClassEntry::new(name, parent, false));
        true
    }

    /// Register the program-entry class
    pub fn declare_entry_class(&mut self, name: &str) -> bool {
        if self.classes.contains_key(name) {
            return false;
        }

        self.classes.insert(name.to_string(), ClassEntry::new(name, None, true));
        true
    }

    /// Register a method in the entered class
    pub fn declare_method(&mut self, return_type: Type, name: &str) -> bool {
        self.insert_method(return_type, name, false)
    }

    /// Register the static entry method in the entered class
    pub fn declare_entry_method(&mut self, name: &str) -> bool {
        self.insert_method(Type::Void, name, true)
    }

    fn insert_method(&mut self, return_type: Type, name: &str, is_static: bool) -> bool {
        if self.current_method.is_some() {
            return false;
        }
        let Some(class) = self.current_class_mut() else {
            return false;
        };
        if class.methods.contains_key(name) {
            return false;
        }

        let entry = MethodEntry {
            name: name.to_string(),
            owner: class.name.clone(),
            return_type,
            params: Vec::new(),
            locals: IndexMap::new(),
            is_static,
        };
        class.methods.insert(name.to_string(), entry);
        true
    }

    /// Append a parameter to the entered method
    pub fn declare_param(&mut self, name: &str, ty: Type) -> bool {
        let Some(method) = self.current_method_mut() else {
            return false;
        };
        if method.declares(name) {
            return false;
        }

        method.params.push((name.to_string(), ty));
        true
    }

    /// Declare a local in the entered method, or a field when only a class is entered
    pub fn declare_var(&mut self, name: &str, ty: Type) -> bool {
        if self.current_method.is_some() {
            let Some(method) = self.current_method_mut() else {
                return false;
            };
            if method.declares(name) {
                return false;
            }
            method.locals.insert(name.to_string(), ty);
            return true;
        }

        let Some(class) = self.current_class_mut() else {
            return false;
        };
        if class.fields.contains_key(name) {
            return false;
        }
        class.fields.insert(name.to_string(), ty);
        true
    }

    // === Scope cursor ===

    /// Enter a class when at top level, or a method of the entered class
    pub fn enter(&mut self, name: &str) -> bool {
        if self.current_method.is_some() {
            return false;
        }

        match self.current_class.clone() {
            None => {
                if !self.classes.contains_key(name) {
                    return false;
                }
                self.current_class = Some(name.to_string());
                true
            }
            Some(class) => {
                let has_method = self.classes
                    .get(&class)
                    .map_or(false, |c| c.methods.contains_key(name));
                if has_method {
                    self.current_method = Some(name.to_string());
                }
                has_method
            }
        }
    }

    /// Leave the innermost entered scope
    pub fn exit(&mut self) {
        if self.current_method.take().is_none() {
            self.current_class = None;
        }
    }

    /// Return to top level and drop pending call lookups
    pub fn reset_cursor(&mut self) {
        self.current_class = None;
        self.current_method = None;
        self.calls.clear();
    }

    pub fn current_class(&self) -> Option<&ClassEntry> {
        self.current_class.as_deref().and_then(|name| self.classes.get(name))
    }

    pub fn current_method(&self) -> Option<&MethodEntry> {
        let method = self.current_method.as_deref()?;
        self.current_class()?.methods.get(method)
    }

    fn current_class_mut(&mut self) -> Option<&mut ClassEntry> {
        let name = self.current_class.as_deref()?;
        self.classes.get_mut(name)
    }

    fn current_method_mut(&mut self) -> Option<&mut MethodEntry> {
        let method = self.current_method.clone()?;
        self.current_class_mut()?.methods.get_mut(&method)
    }

    // === Lookup ===

    /// Type of an identifier visible from the cursor
    pub fn lookup(&self, id: &str) -> Option<Type> {
        self.resolve(id).map(|resolved| resolved.ty)
    }

    /// Resolve an identifier from the cursor
    pub fn resolve(&self, id: &str) -> Option<Resolved> {
        let class = self.current_class.as_deref()?;
        self.resolve_in(class, self.current_method.as_deref(), id)
    }

    /// Resolve an identifier as seen from `method` of `class`:
    /// local, then parameter, then fields up the inheritance chain.
    pub fn resolve_in(&self, class: &str, method: Option<&str>, id: &str) -> Option<Resolved> {
        if let Some(method) = method.and_then(|m| self.classes.get(class)?.methods.get(m)) {
            if let Some(ty) = method.locals.get(id) {
                return Some(Resolved { ty: ty.clone(), storage: Storage::Local });
            }
            if let Some(ty) = method.param(id) {
                return Some(Resolved { ty: ty.clone(), storage: Storage::Param });
            }
        }

        let (owner, ty) = self.find_field(class, id)?;
        Some(Resolved { ty: ty.clone(), storage: Storage::Field(owner.to_string()) })
    }

    /// Nearest declaration of a field, searching `class` then its ancestors
    pub fn find_field(&self, class: &str, name: &str) -> Option<(&str, &Type)> {
        self.ancestry(class)
            .find_map(|entry| entry.fields.get(name).map(|ty| (entry.name.as_str(), ty)))
    }

    /// Nearest declaration of a method, searching `class` then its ancestors
    pub fn find_method(&self, class: &str, name: &str) -> Option<&MethodEntry> {
        self.ancestry(class).find_map(|entry| entry.methods.get(name))
    }

    /// `class` followed by each ancestor, nearest first
    pub fn ancestry<'s>(&'s self, class: &str) -> impl Iterator<Item = &'s ClassEntry> + 's {
        let mut next = self.classes.get(class);
        std::iter::from_fn(move || {
            let entry = next?;
            next = entry.parent.as_deref().and_then(|p| self.classes.get(p));
            Some(entry)
        })
    }

    /// True when `b` is a strict ancestor of `a`
    pub fn is_subclass_of(&self, a: &str, b: &str) -> bool {
        self.ancestry(a).skip(1).any(|entry| entry.name == b)
    }

    /// Assignment compatibility: equal types, or a subclass into an ancestor
    pub fn is_assignable(&self, target: &Type, value: &Type) -> bool {
        match (target, value) {
            (Type::Class(t), Type::Class(v)) => t == v || self.is_subclass_of(v, t),
            _ => target == value,
        }
    }

    /// The entered method agrees with the nearest same-named ancestor method
    pub fn check_override_polymorphism(&self) -> bool {
        let (Some(class), Some(method)) = (self.current_class(), self.current_method()) else {
            return true;
        };
        let Some(parent) = class.parent.as_deref() else {
            return true;
        };

        match self.find_method(parent, &method.name) {
            Some(inherited) => inherited.same_signature(method),
            None => true,
        }
    }

    // === Call resolution ===

    /// Push a lookup for `method` on `class`. Returns false if no such method is visible.
    pub fn begin_call_lookup(&mut self, class: &str, method: &str, line: usize) -> bool {
        let Some(owner) = self.find_method(class, method).map(|m| m.owner.clone()) else {
            return false;
        };

        tracing::trace!(class, method, %owner, line, "call lookup");
        self.calls.push(CallFrame {
            owner,
            method: method.to_string(),
            next_arg: 0,
        });
        true
    }

    /// Expected type of the next argument of the innermost pending call
    pub fn next_arg_type(&mut self) -> Option<Type> {
        let index = self.calls.last()?.next_arg;
        let ty = self.call_method()?.params.get(index).map(|(_, ty)| ty.clone())?;
        if let Some(frame) = self.calls.last_mut() {
            frame.next_arg += 1;
        }
        Some(ty)
    }

    /// Every declared parameter of the innermost pending call has been consumed
    pub fn arg_count_matches(&self) -> bool {
        match (self.calls.last(), self.call_method()) {
            (Some(frame), Some(method)) => frame.next_arg == method.params.len(),
            _ => false,
        }
    }

    pub fn call_return_type(&self) -> Option<Type> {
        self.call_method().map(|m| m.return_type.clone())
    }

    /// The method being resolved by the innermost pending call
    pub fn call_method(&self) -> Option<&MethodEntry> {
        let frame = self.calls.last()?;
        self.classes.get(&frame.owner)?.methods.get(&frame.method)
    }

    pub fn end_call_lookup(&mut self) {
        self.calls.pop();
    }

    // === Accessors ===

    pub fn class(&self, name: &str) -> Option<&ClassEntry> {
        self.classes.get(name)
    }

    pub fn class_exists(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Classes in declaration order, entry class first
    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.values()
    }

    pub fn entry_class(&self) -> Option<&ClassEntry> {
        self.classes.values().find(|c| c.is_entry)
    }
}
