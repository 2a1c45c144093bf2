//! Object layout: field byte offsets, vtable slots and object sizes.
//!
//! Every object starts with an 8-byte vtable pointer. Fields follow in
//! declaration order, parent fields first, with no alignment padding.
//! Method slots keep inherited indices; an override reuses its parent's
//! slot and new methods are appended. The static entry method takes no slot.

use std::fmt::Write;

use indexmap::IndexMap;

use super::symbol_table::{ClassEntry, SymbolTable};
use crate::parser::Type;

/// Size of the vtable pointer at the start of every object
pub const HEADER_SIZE: u32 = 8;

/// Size of one vtable slot
pub const SLOT_SIZE: u32 = 8;

/// Storage size of a value of type `ty`
pub fn type_size(ty: &Type) -> u32 {
    match ty {
        Type::Int => 4,
        Type::Boolean => 1,
        Type::IntArray | Type::Class(_) | Type::StringArray | Type::Void => 8,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSlot {
    /// Class that declares the field
    pub owner: String,
    pub name: String,
    pub ty: Type,
    /// Byte offset from the start of the object, header included
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSlot {
    pub name: String,
    /// Nearest class that defines the body for this slot
    pub implementer: String,
    pub slot: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLayout {
    pub class: String,
    pub fields: Vec<FieldSlot>,
    pub methods: Vec<MethodSlot>,
    /// Header plus all field bytes
    pub size: u32,
}

impl ClassLayout {
    fn root(class: &str) -> Self {
        Self {
            class: class.to_string(),
            fields: Vec::new(),
            methods: Vec::new(),
            size: HEADER_SIZE,
        }
    }

    /// Field visible from this class; later (more derived) declarations hide earlier ones
    pub fn field(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.iter().rev().find(|f| f.name == name)
    }

    /// Field declared by `owner`
    pub fn field_of(&self, owner: &str, name: &str) -> Option<&FieldSlot> {
        self.fields.iter().find(|f| f.owner == owner && f.name == name)
    }

    pub fn slot(&self, method: &str) -> Option<&MethodSlot> {
        self.methods.iter().find(|m| m.name == method)
    }

    pub fn vtable_len(&self) -> usize {
        self.methods.len()
    }

    /// Extend the parent's layout with this class's own members
    fn derive(parent: Option<&ClassLayout>, class: &ClassEntry) -> Self {
        let mut layout = parent.cloned().unwrap_or_else(|| ClassLayout::root(&class.name));
        layout.class = class.name.clone();

        for (name, ty) in &class.fields {
            layout.fields.push(FieldSlot {
                owner: class.name.clone(),
                name: name.clone(),
                ty: ty.clone(),
                offset: layout.size,
            });
            layout.size += type_size(ty);
        }

        for method in class.methods.values().filter(|m| !m.is_static) {
            match layout.methods.iter_mut().find(|slot| slot.name == method.name) {
                Some(slot) => slot.implementer = class.name.clone(),
                None => {
                    let slot = layout.methods.len();
                    layout.methods.push(MethodSlot {
                        name: method.name.clone(),
                        implementer: class.name.clone(),
                        slot,
                    });
                }
            }
        }

        layout
    }
}

/// Layout of one class, computed from the root of its chain
pub fn class_layout(symbols: &SymbolTable, class: &str) -> Option<ClassLayout> {
    let entry = symbols.class(class)?;
    let parent = match entry.parent.as_deref() {
        Some(parent) => Some(class_layout(symbols, parent)?),
        None => None,
    };
    Some(ClassLayout::derive(parent.as_ref(), entry))
}

/// Layouts of every class, in declaration order
pub fn all_layouts(symbols: &SymbolTable) -> IndexMap<String, ClassLayout> {
    let mut layouts: IndexMap<String, ClassLayout> = IndexMap::new();

    // parents are always declared before their children
    for class in symbols.classes() {
        let layout = {
            let parent = class.parent.as_deref().and_then(|p| layouts.get(p));
            ClassLayout::derive(parent, class)
        };
        layouts.insert(class.name.clone(), layout);
    }

    layouts
}

/// Field names and byte offsets, parent fields first
pub fn field_offsets(symbols: &SymbolTable, class: &str) -> Option<Vec<(String, u32)>> {
    let layout = class_layout(symbols, class)?;
    Some(layout.fields.into_iter().map(|f| (f.name, f.offset)).collect())
}

/// Method names and vtable slot indices
pub fn method_slots(symbols: &SymbolTable, class: &str) -> Option<Vec<(String, usize)>> {
    let layout = class_layout(symbols, class)?;
    Some(layout.methods.into_iter().map(|m| (m.name, m.slot)).collect())
}

/// Offsets printout for every class except the entry class.
///
/// Variable offsets are relative to the end of the header and list only the
/// class's own fields. Method offsets are `slot * 8` and list only methods
/// the class introduces.
pub fn offset_report(symbols: &SymbolTable) -> String {
    let layouts = all_layouts(symbols);
    let mut out = String::new();

    for class in symbols.classes().filter(|c| !c.is_entry) {
        let Some(layout) = layouts.get(&class.name) else {
            continue;
        };
        let inherited = class
            .parent
            .as_deref()
            .and_then(|p| layouts.get(p))
            .map_or(0, ClassLayout::vtable_len);

        let _ = writeln!(out, "\n-----------Class {}-----------", class.name);
        let _ = writeln!(out, "---Variables---");
        for field in layout.fields.iter().filter(|f| f.owner == class.name) {
            let _ = writeln!(out, "{}.{} : {}", class.name, field.name, field.offset - HEADER_SIZE);
        }

        let _ = writeln!(out, "---Methods---");
        for method in layout.methods.iter().skip(inherited) {
            let _ = writeln!(out, "{}.{} : {}", class.name, method.name, method.slot as u32 * SLOT_SIZE);
        }
    }

    out
}
