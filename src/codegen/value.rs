//! Typed IR values threaded through expression lowering.

use std::fmt;

use crate::parser::Type;
use crate::semantic::MethodEntry;

/// LLVM type of a lowered value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrType {
    I1,
    I32,
    I32Ptr,
    I8Ptr,
    Void,
}

impl IrType {
    pub fn of(ty: &Type) -> Self {
        match ty {
            Type::Int => IrType::I32,
            Type::Boolean => IrType::I1,
            Type::IntArray => IrType::I32Ptr,
            Type::Class(_) | Type::StringArray => IrType::I8Ptr,
            Type::Void => IrType::Void,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IrType::I1 => "i1",
            IrType::I32 => "i32",
            IrType::I32Ptr => "i32*",
            IrType::I8Ptr => "i8*",
            IrType::Void => "void",
        }
    }

    /// Type of a pointer to a slot holding this type
    pub fn slot(self) -> String {
        format!("{}*", self.name())
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An SSA value or constant together with its type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub ty: IrType,
    pub repr: String,
}

impl Value {
    pub fn new(ty: IrType, repr: impl Into<String>) -> Self {
        Self { ty, repr: repr.into() }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.repr)
    }
}

/// Result of lowering an expression: its value and, for objects, its static class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub value: Value,
    pub class: Option<String>,
}

impl Operand {
    pub fn plain(value: Value) -> Self {
        Self { value, class: None }
    }

    pub fn object(value: Value, class: impl Into<String>) -> Self {
        Self { value, class: Some(class.into()) }
    }
}

/// Function signature of a method body, receiver included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub ret: IrType,
    pub params: Vec<IrType>,
}

impl Signature {
    pub fn of(method: &MethodEntry) -> Self {
        Self {
            ret: IrType::of(&method.return_type),
            params: method.param_types().map(IrType::of).collect(),
        }
    }

    /// Function pointer type, e.g. `i32 (i8*,i32)*`
    pub fn fn_ptr(&self) -> String {
        let mut params = vec![IrType::I8Ptr.name()];
        params.extend(self.params.iter().map(|p| p.name()));
        format!("{} ({})*", self.ret, params.join(","))
    }
}

/// `%name`, quoted when the name is not a plain LLVM identifier
pub fn local_name(name: &str) -> String {
    with_sigil('%', name)
}

/// `@name`, quoted when the name is not a plain LLVM identifier
pub fn global_name(name: &str) -> String {
    with_sigil('@', name)
}

fn with_sigil(sigil: char, name: &str) -> String {
    let plain = name.chars().next().map_or(false, |c| !c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | '-'));
    if plain {
        format!("{}{}", sigil, name)
    } else {
        format!("{}\"{}\"", sigil, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(local_name("count"), "%count");
        assert_eq!(local_name(".count"), "%.count");
        assert_eq!(global_name("A.get"), "@A.get");
        assert_eq!(local_name("größe"), "%\"größe\"");
    }

    #[test]
    fn test_fn_ptr() {
        let sig = Signature { ret: IrType::I1, params: vec![IrType::I32, IrType::I32Ptr] };
        assert_eq!(sig.fn_ptr(), "i1 (i8*,i32,i32*)*");
        let none = Signature { ret: IrType::I8Ptr, params: vec![] };
        assert_eq!(none.fn_ptr(), "i8* (i8*)*");
    }
}
