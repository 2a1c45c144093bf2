//! LLVM IR emitter for checked MiniJava programs.
//!
//! Objects are `i8*` blocks whose first 8 bytes point at the class vtable.
//! Arrays are `i32*` blocks holding the length followed by the elements.
//! Every element access is bounds checked and aborts through `@throw_oob`.

use std::collections::HashMap;
use std::fmt::Write;

use indexmap::IndexMap;

use super::error::CodegenError;
use super::value::{global_name, local_name, IrType, Operand, Signature, Value};
use crate::parser::*;
use crate::semantic::layout::{all_layouts, ClassLayout};
use crate::semantic::{Resolved, Storage, SymbolTable, ENTRY_METHOD};

const RUNTIME: &str = r#"declare i8* @calloc(i32, i32)
declare i32 @printf(i8*, ...)
declare void @exit(i32)

@_cint = constant [4 x i8] c"%d\0a\00"
@_cOOB = constant [15 x i8] c"Out of bounds\0a\00"
define void @print_int(i32 %i) {
	%_str = bitcast [4 x i8]* @_cint to i8*
	call i32 (i8*, ...) @printf(i8* %_str, i32 %i)
	ret void
}

define void @throw_oob() {
	%_str = bitcast [15 x i8]* @_cOOB to i8*
	call i32 (i8*, ...) @printf(i8* %_str)
	call void @exit(i32 1)
	ret void
}

"#;

/// Emits LLVM IR text for a type-checked program into any `fmt::Write` sink
pub struct LlvmEmitter<'a, W: Write> {
    symbols: &'a SymbolTable,
    out: &'a mut W,
    layouts: IndexMap<String, ClassLayout>,
    /// Slot signatures recorded while emitting vtables, keyed by (class, method)
    signatures: HashMap<(String, String), Signature>,
    temp_counter: usize,
    label_counter: usize,
    /// Label of the block instructions are currently appended to
    current_block: String,
    current_class: String,
    current_method: Option<String>,
}

impl<'a, W: Write> LlvmEmitter<'a, W> {
    pub fn new(symbols: &'a SymbolTable, out: &'a mut W) -> Self {
        Self {
            symbols,
            out,
            layouts: all_layouts(symbols),
            signatures: HashMap::new(),
            temp_counter: 0,
            label_counter: 0,
            current_block: String::new(),
            current_class: String::new(),
            current_method: None,
        }
    }

    /// Emit the whole module: vtables, runtime support, then every function
    pub fn emit(&mut self, program: &Program) -> Result<(), CodegenError> {
        self.emit_vtables()?;
        self.out.write_str(RUNTIME)?;

        self.emit_main(&program.main_class)?;

        for class in &program.classes {
            for method in &class.methods {
                self.emit_method(&class.name.name, method)?;
            }
        }

        Ok(())
    }

    // === Module level ===

    fn emit_vtables(&mut self) -> Result<(), CodegenError> {
        let symbols = self.symbols;

        for class in symbols.classes() {
            let layout = self
                .layouts
                .get(&class.name)
                .ok_or_else(|| CodegenError::UnknownClass(class.name.clone()))?;
            let vtable = vtable_name(&class.name);
            let len = layout.vtable_len();

            let mut entries = Vec::with_capacity(len);
            for slot in &layout.methods {
                let method = symbols
                    .class(&slot.implementer)
                    .and_then(|c| c.methods.get(&slot.name))
                    .ok_or_else(|| CodegenError::UnknownMethod {
                        class: slot.implementer.clone(),
                        method: slot.name.clone(),
                    })?;
                let signature = Signature::of(method);
                entries.push(format!(
                    "i8* bitcast ({} {} to i8*)",
                    signature.fn_ptr(),
                    function_name(&slot.implementer, &slot.name)
                ));
                self.signatures.insert((class.name.clone(), slot.name.clone()), signature);
            }

            if entries.is_empty() {
                writeln!(self.out, "{} = global [0 x i8*] []", vtable)?;
            } else {
                writeln!(self.out, "{} = global [{} x i8*] [", vtable, len)?;
                writeln!(self.out, "\t{}", entries.join(",\n\t"))?;
                writeln!(self.out, "]")?;
            }
        }

        writeln!(self.out)?;
        Ok(())
    }

    fn emit_main(&mut self, main: &MainClass) -> Result<(), CodegenError> {
        self.begin_function(&main.name.name, ENTRY_METHOD);
        writeln!(self.out, "define i32 @main() {{")?;
        self.start_entry_block()?;

        // the String[] parameter is never passed in; give it a null slot
        let slot = local_name(&main.arg_name.name);
        self.writeln(&format!("{} = alloca i8*", slot))?;
        self.writeln(&format!("store i8* null, i8** {}", slot))?;

        for local in &main.locals {
            self.emit_alloca(&local.name.name, &local.type_spec.ty)?;
        }
        for stmt in &main.body {
            self.emit_stmt(stmt)?;
        }

        self.writeln("ret i32 0")?;
        writeln!(self.out, "}}\n")?;
        Ok(())
    }

    fn emit_method(&mut self, class: &str, method: &MethodDecl) -> Result<(), CodegenError> {
        self.begin_function(class, &method.name.name);

        let symbol = function_name(class, &method.name.name);
        tracing::trace!(function = %symbol, "emitting function");

        let mut params = vec!["i8* %this".to_string()];
        for param in &method.params {
            params.push(format!(
                "{} {}",
                IrType::of(&param.type_spec.ty),
                local_name(&format!(".{}", param.name.name))
            ));
        }

        writeln!(
            self.out,
            "define {} {}({}) {{",
            IrType::of(&method.return_type.ty),
            symbol,
            params.join(", ")
        )?;
        self.start_entry_block()?;

        for param in &method.params {
            let ty = IrType::of(&param.type_spec.ty);
            self.emit_alloca(&param.name.name, &param.type_spec.ty)?;
            self.writeln(&format!(
                "store {} {}, {} {}",
                ty,
                local_name(&format!(".{}", param.name.name)),
                ty.slot(),
                local_name(&param.name.name)
            ))?;
        }
        for local in &method.locals {
            self.emit_alloca(&local.name.name, &local.type_spec.ty)?;
        }

        for stmt in &method.body {
            self.emit_stmt(stmt)?;
        }

        let result = self.emit_value(&method.return_expr)?;
        self.writeln(&format!("ret {}", result))?;
        writeln!(self.out, "}}\n")?;
        Ok(())
    }

    /// Reset per-function state
    fn begin_function(&mut self, class: &str, method: &str) {
        self.temp_counter = 0;
        self.label_counter = 0;
        self.current_class = class.to_string();
        self.current_method = Some(method.to_string());
    }

    fn start_entry_block(&mut self) -> Result<(), CodegenError> {
        let entry = self.new_label("entry");
        writeln!(self.out, "{}:", entry)?;
        self.current_block = entry;
        Ok(())
    }

    fn emit_alloca(&mut self, name: &str, ty: &Type) -> Result<(), CodegenError> {
        self.writeln(&format!("{} = alloca {}", local_name(name), IrType::of(ty)))
    }

    // === Statements ===

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Block(statements) => {
                for stmt in statements {
                    self.emit_stmt(stmt)?;
                }
                Ok(())
            }

            Stmt::Assign { target, value } => {
                let value = self.emit_value(value)?;
                let (ptr, ty) = self.variable_slot(&target.name)?;
                self.writeln(&format!("store {} {}, {} {}", ty, value.repr, ty.slot(), ptr))
            }

            Stmt::ArrayAssign { target, index, value } => {
                let array = self.emit_load_variable(&target.name)?.value;
                let index = self.emit_value(index)?;
                let value = self.emit_value(value)?;
                let element = self.emit_element_ptr(&array, &index)?;
                self.writeln(&format!("store i32 {}, i32* {}", value.repr, element))
            }

            Stmt::If { condition, then_branch, else_branch, .. } => {
                let cond = self.emit_value(condition)?;
                let then_label = self.new_label("if_then");
                let else_label = self.new_label("if_else");
                let end_label = self.new_label("if_end");

                self.writeln(&format!(
                    "br i1 {}, label %{}, label %{}",
                    cond.repr, then_label, else_label
                ))?;

                self.write_label(&then_label)?;
                self.emit_stmt(then_branch)?;
                self.writeln(&format!("br label %{}", end_label))?;

                self.write_label(&else_label)?;
                self.emit_stmt(else_branch)?;
                self.writeln(&format!("br label %{}", end_label))?;

                self.write_label(&end_label)
            }

            Stmt::While { condition, body, .. } => {
                let cond_label = self.new_label("loop_cond");
                let body_label = self.new_label("loop_body");
                let end_label = self.new_label("loop_end");

                self.writeln(&format!("br label %{}", cond_label))?;

                self.write_label(&cond_label)?;
                let cond = self.emit_value(condition)?;
                self.writeln(&format!(
                    "br i1 {}, label %{}, label %{}",
                    cond.repr, body_label, end_label
                ))?;

                self.write_label(&body_label)?;
                self.emit_stmt(body)?;
                self.writeln(&format!("br label %{}", cond_label))?;

                self.write_label(&end_label)
            }

            Stmt::Print { value, .. } => {
                let value = self.emit_value(value)?;
                self.writeln(&format!("call void (i32) @print_int(i32 {})", value.repr))
            }
        }
    }

    // === Expressions ===

    fn emit_value(&mut self, expr: &Expr) -> Result<Value, CodegenError> {
        Ok(self.emit_expr(expr)?.value)
    }

    fn emit_expr(&mut self, expr: &Expr) -> Result<Operand, CodegenError> {
        match &expr.kind {
            ExprKind::IntLiteral(n) => Ok(Operand::plain(Value::new(IrType::I32, n.to_string()))),
            ExprKind::True => Ok(Operand::plain(Value::new(IrType::I1, "1"))),
            ExprKind::False => Ok(Operand::plain(Value::new(IrType::I1, "0"))),

            ExprKind::Identifier(name) => self.emit_load_variable(name),

            ExprKind::This => Ok(Operand::object(
                Value::new(IrType::I8Ptr, "%this"),
                self.current_class.clone(),
            )),

            ExprKind::NewArray(size) => self.emit_new_array(size),

            ExprKind::NewObject(class) => self.emit_new_object(&class.name),

            ExprKind::Not(operand) => {
                let operand = self.emit_value(operand)?;
                let temp = self.new_temp();
                self.writeln(&format!("{} = xor i1 1, {}", temp, operand.repr))?;
                Ok(Operand::plain(Value::new(IrType::I1, temp)))
            }

            ExprKind::Binary { op, left, right } => {
                let Some((instr, ty)) = arithmetic(op) else {
                    return self.emit_and(left, right);
                };
                let left = self.emit_value(left)?;
                let right = self.emit_value(right)?;
                let temp = self.new_temp();
                self.writeln(&format!("{} = {} i32 {}, {}", temp, instr, left.repr, right.repr))?;
                Ok(Operand::plain(Value::new(ty, temp)))
            }

            ExprKind::ArrayLookup { array, index } => {
                let array = self.emit_value(array)?;
                let index = self.emit_value(index)?;
                let element = self.emit_element_ptr(&array, &index)?;
                let temp = self.new_temp();
                self.writeln(&format!("{} = load i32, i32* {}", temp, element))?;
                Ok(Operand::plain(Value::new(IrType::I32, temp)))
            }

            ExprKind::ArrayLength(array) => {
                let array = self.emit_value(array)?;
                let temp = self.new_temp();
                self.writeln(&format!("{} = load i32, i32* {}", temp, array.repr))?;
                Ok(Operand::plain(Value::new(IrType::I32, temp)))
            }

            ExprKind::Call { receiver, method, args } => self.emit_call(receiver, &method.name, args),
        }
    }

    /// Short-circuit `&&`: the right operand runs only when the left is true
    fn emit_and(&mut self, left: &Expr, right: &Expr) -> Result<Operand, CodegenError> {
        let left = self.emit_value(left)?;
        let left_block = self.current_block.clone();
        let rhs_label = self.new_label("and_rhs");
        let end_label = self.new_label("and_end");

        self.writeln(&format!(
            "br i1 {}, label %{}, label %{}",
            left.repr, rhs_label, end_label
        ))?;

        self.write_label(&rhs_label)?;
        let right = self.emit_value(right)?;
        let right_block = self.current_block.clone();
        self.writeln(&format!("br label %{}", end_label))?;

        self.write_label(&end_label)?;
        let temp = self.new_temp();
        self.writeln(&format!(
            "{} = phi i1 [ 0, %{} ], [ {}, %{} ]",
            temp, left_block, right.repr, right_block
        ))?;
        Ok(Operand::plain(Value::new(IrType::I1, temp)))
    }

    /// Bounds check `index` against the stored length and return the element pointer
    fn emit_element_ptr(&mut self, array: &Value, index: &Value) -> Result<String, CodegenError> {
        let length = self.new_temp();
        self.writeln(&format!("{} = load i32, i32* {}", length, array.repr))?;
        let in_bounds = self.new_temp();
        self.writeln(&format!("{} = icmp ult i32 {}, {}", in_bounds, index.repr, length))?;

        let ok_label = self.new_label("oob_ok");
        let err_label = self.new_label("oob_err");
        self.writeln(&format!(
            "br i1 {}, label %{}, label %{}",
            in_bounds, ok_label, err_label
        ))?;
        self.emit_abort_block(&err_label)?;

        self.write_label(&ok_label)?;
        let shifted = self.new_temp();
        self.writeln(&format!("{} = add i32 {}, 1", shifted, index.repr))?;
        let element = self.new_temp();
        self.writeln(&format!(
            "{} = getelementptr i32, i32* {}, i32 {}",
            element, array.repr, shifted
        ))?;
        Ok(element)
    }

    fn emit_new_array(&mut self, size: &Expr) -> Result<Operand, CodegenError> {
        let size = self.emit_value(size)?;

        let negative = self.new_temp();
        self.writeln(&format!("{} = icmp slt i32 {}, 0", negative, size.repr))?;
        let err_label = self.new_label("alloc_err");
        let ok_label = self.new_label("alloc_ok");
        self.writeln(&format!(
            "br i1 {}, label %{}, label %{}",
            negative, err_label, ok_label
        ))?;
        self.emit_abort_block(&err_label)?;

        self.write_label(&ok_label)?;
        let cells = self.new_temp();
        self.writeln(&format!("{} = add i32 {}, 1", cells, size.repr))?;
        let raw = self.new_temp();
        self.writeln(&format!("{} = call i8* @calloc(i32 4, i32 {})", raw, cells))?;
        let array = self.new_temp();
        self.writeln(&format!("{} = bitcast i8* {} to i32*", array, raw))?;
        self.writeln(&format!("store i32 {}, i32* {}", size.repr, array))?;

        Ok(Operand::plain(Value::new(IrType::I32Ptr, array)))
    }

    fn emit_new_object(&mut self, class: &str) -> Result<Operand, CodegenError> {
        let layout = self.layout(class)?;
        let (size, slots) = (layout.size, layout.vtable_len());

        let raw = self.new_temp();
        self.writeln(&format!("{} = call i8* @calloc(i32 1, i32 {})", raw, size))?;
        let header = self.new_temp();
        self.writeln(&format!("{} = bitcast i8* {} to i8***", header, raw))?;
        let vtable = self.new_temp();
        self.writeln(&format!(
            "{} = getelementptr [{n} x i8*], [{n} x i8*]* {}, i32 0, i32 0",
            vtable,
            vtable_name(class),
            n = slots
        ))?;
        self.writeln(&format!("store i8** {}, i8*** {}", vtable, header))?;

        Ok(Operand::object(Value::new(IrType::I8Ptr, raw), class))
    }

    /// Virtual dispatch through the vtable slot of the receiver's static class
    fn emit_call(&mut self, receiver: &Expr, method: &str, args: &[Expr]) -> Result<Operand, CodegenError> {
        let receiver = self.emit_expr(receiver)?;
        let class = receiver
            .class
            .clone()
            .ok_or_else(|| CodegenError::UntypedReceiver(method.to_string()))?;

        let unknown = || CodegenError::UnknownMethod { class: class.clone(), method: method.to_string() };
        let slot = self.layout(&class)?.slot(method).ok_or_else(unknown)?.slot;
        let signature = self
            .signatures
            .get(&(class.clone(), method.to_string()))
            .cloned()
            .ok_or_else(unknown)?;
        let result_class = self
            .symbols
            .find_method(&class, method)
            .ok_or_else(unknown)?
            .return_type
            .class_name()
            .map(str::to_string);

        let this = receiver.value.repr;
        let header = self.new_temp();
        self.writeln(&format!("{} = bitcast i8* {} to i8***", header, this))?;
        let vtable = self.new_temp();
        self.writeln(&format!("{} = load i8**, i8*** {}", vtable, header))?;
        let entry = self.new_temp();
        self.writeln(&format!("{} = getelementptr i8*, i8** {}, i32 {}", entry, vtable, slot))?;
        let raw_fn = self.new_temp();
        self.writeln(&format!("{} = load i8*, i8** {}", raw_fn, entry))?;
        let function = self.new_temp();
        self.writeln(&format!(
            "{} = bitcast i8* {} to {}",
            function,
            raw_fn,
            signature.fn_ptr()
        ))?;

        let mut call_args = vec![format!("i8* {}", this)];
        for arg in args {
            call_args.push(self.emit_value(arg)?.to_string());
        }

        let result = self.new_temp();
        self.writeln(&format!(
            "{} = call {} {}({})",
            result,
            signature.ret,
            function,
            call_args.join(", ")
        ))?;

        let value = Value::new(signature.ret, result);
        Ok(Operand { value, class: result_class })
    }

    // === Variables ===

    fn emit_load_variable(&mut self, name: &str) -> Result<Operand, CodegenError> {
        let class = self.resolve(name)?.ty.class_name().map(str::to_string);
        let (ptr, ty) = self.variable_slot(name)?;
        let temp = self.new_temp();
        self.writeln(&format!("{} = load {}, {} {}", temp, ty, ty.slot(), ptr))?;
        Ok(Operand { value: Value::new(ty, temp), class })
    }

    /// Pointer to the storage of `name` and the type stored there
    fn variable_slot(&mut self, name: &str) -> Result<(String, IrType), CodegenError> {
        let resolved = self.resolve(name)?;
        let ty = IrType::of(&resolved.ty);

        match resolved.storage {
            Storage::Local | Storage::Param => Ok((local_name(name), ty)),
            Storage::Field(owner) => {
                let offset = self
                    .layout(&owner)?
                    .field_of(&owner, name)
                    .map(|field| field.offset)
                    .ok_or_else(|| CodegenError::UnknownVariable {
                        class: owner.clone(),
                        name: name.to_string(),
                    })?;

                let byte_ptr = self.new_temp();
                self.writeln(&format!("{} = getelementptr i8, i8* %this, i32 {}", byte_ptr, offset))?;
                let typed_ptr = self.new_temp();
                self.writeln(&format!("{} = bitcast i8* {} to {}", typed_ptr, byte_ptr, ty.slot()))?;
                Ok((typed_ptr, ty))
            }
        }
    }

    fn resolve(&self, name: &str) -> Result<Resolved, CodegenError> {
        self.symbols
            .resolve_in(&self.current_class, self.current_method.as_deref(), name)
            .ok_or_else(|| CodegenError::UnknownVariable {
                class: self.current_class.clone(),
                name: name.to_string(),
            })
    }

    fn layout(&self, class: &str) -> Result<&ClassLayout, CodegenError> {
        self.layouts
            .get(class)
            .ok_or_else(|| CodegenError::UnknownClass(class.to_string()))
    }

    // === Helper methods ===

    fn emit_abort_block(&mut self, label: &str) -> Result<(), CodegenError> {
        self.write_label(label)?;
        self.writeln("call void @throw_oob()")?;
        self.writeln("unreachable")
    }

    fn new_temp(&mut self) -> String {
        let temp = format!("%_{}", self.temp_counter);
        self.temp_counter += 1;
        temp
    }

    fn new_label(&mut self, kind: &str) -> String {
        let label = format!("{}.{}", kind, self.label_counter);
        self.label_counter += 1;
        label
    }

    fn write_label(&mut self, label: &str) -> Result<(), CodegenError> {
        writeln!(self.out, "\n{}:", label)?;
        self.current_block = label.to_string();
        Ok(())
    }

    fn writeln(&mut self, s: &str) -> Result<(), CodegenError> {
        writeln!(self.out, "\t{}", s)?;
        Ok(())
    }
}

/// Instruction and result type of a non-short-circuit operator
fn arithmetic(op: &BinaryOp) -> Option<(&'static str, IrType)> {
    match op {
        BinaryOp::Less => Some(("icmp slt", IrType::I1)),
        BinaryOp::Add => Some(("add", IrType::I32)),
        BinaryOp::Sub => Some(("sub", IrType::I32)),
        BinaryOp::Mul => Some(("mul", IrType::I32)),
        BinaryOp::And => None,
    }
}

fn function_name(class: &str, method: &str) -> String {
    global_name(&format!("{}.{}", class, method))
}

fn vtable_name(class: &str) -> String {
    global_name(&format!(".{}_vtable", class))
}

#[cfg(test)]
mod tests {
    use crate::codegen::generate;
    use crate::semantic::analyze;
    use crate::semantic::test_support::parse;

    fn compile(source: &str) -> String {
        let program = parse(source);
        let symbols = analyze(&program).unwrap();
        generate(&program, &symbols).unwrap()
    }

    const SHAPES: &str = r#"
class Main {
    public static void main(String[] args) {
        System.out.println(new B().get(4));
    }
}
class A {
    int x;
    public int get(int n) { x = n; return x; }
    public boolean flag() { return true; }
}
class B extends A {
    boolean seen;
    public int get(int n) { seen = true; return n + 1; }
    public int extra() { return 0; }
}
"#;

    #[test]
    fn test_vtables() {
        let ir = compile(SHAPES);
        assert!(ir.contains("@.Main_vtable = global [0 x i8*] []"));
        assert!(ir.contains("@.A_vtable = global [2 x i8*] ["));
        assert!(ir.contains("@.B_vtable = global [3 x i8*] ["));
        assert!(ir.contains("i8* bitcast (i32 (i8*,i32)* @B.get to i8*)"));
        assert!(ir.contains("i8* bitcast (i1 (i8*)* @A.flag to i8*)"));
        assert!(ir.contains("i8* bitcast (i32 (i8*)* @B.extra to i8*)"));
    }

    #[test]
    fn test_function_shapes() {
        let ir = compile(SHAPES);
        assert!(ir.contains("define i32 @main() {"));
        assert!(ir.contains("define i32 @A.get(i8* %this, i32 %.n) {"));
        assert!(ir.contains("\t%n = alloca i32\n\tstore i32 %.n, i32* %n"));
        assert!(ir.contains("\tret i32 0"));
    }

    #[test]
    fn test_field_access_uses_layout_offset() {
        let ir = compile(SHAPES);
        // A.x sits right after the header, B.seen after A.x
        assert!(ir.contains("getelementptr i8, i8* %this, i32 8"));
        assert!(ir.contains("getelementptr i8, i8* %this, i32 12"));
        assert!(ir.contains("%_1 = bitcast i8* %_0 to i1*"));
    }

    #[test]
    fn test_new_object_and_dispatch() {
        let ir = compile(SHAPES);
        assert!(ir.contains("call i8* @calloc(i32 1, i32 13)"));
        assert!(ir.contains("getelementptr [3 x i8*], [3 x i8*]* @.B_vtable, i32 0, i32 0"));
        assert!(ir.contains("getelementptr i8*, i8** %_4, i32 0"));
        assert!(ir.contains("bitcast i8* %_6 to i32 (i8*,i32)*"));
        assert!(ir.contains("call i32 %_7(i8* %_0, i32 4)"));
        assert!(ir.contains("call void (i32) @print_int(i32 %_8)"));
    }

    #[test]
    fn test_array_bounds_checks() {
        let ir = compile(
            r#"
class Main {
    public static void main(String[] args) {
        int[] xs;
        xs = new int[3];
        xs[0] = 1;
        System.out.println(xs[2]);
    }
}
"#,
        );
        assert_eq!(ir.matches("icmp ult i32").count(), 2);
        assert_eq!(ir.matches("call void @throw_oob()").count(), 3);
        assert!(ir.contains("icmp slt i32 3, 0"));
        assert!(ir.contains("call i8* @calloc(i32 4, i32 %_1)"));
        assert!(ir.contains("\nalloc_err.1:\n\tcall void @throw_oob()\n\tunreachable"));
    }

    #[test]
    fn test_and_phi_uses_current_blocks() {
        let ir = compile(
            r#"
class Main {
    public static void main(String[] args) {
        boolean b;
        b = 1 < 2 && (2 < 3 && true);
        if (b) System.out.println(1); else System.out.println(0);
    }
}
"#,
        );
        assert!(ir.contains("phi i1 [ 0, %and_rhs.1 ], [ 1, %and_rhs.3 ]"));
        assert!(ir.contains("phi i1 [ 0, %entry.0 ], [ %_2, %and_end.4 ]"));
        assert!(ir.contains("br i1 %_4, label %if_then.5, label %if_else.6"));
    }

    #[test]
    fn test_while_retests_condition() {
        let ir = compile(
            r#"
class Main {
    public static void main(String[] args) {
        int i;
        i = 0;
        while (i < 3) i = i + 1;
    }
}
"#,
        );
        assert!(ir.contains("\tbr label %loop_cond.1\n\nloop_cond.1:"));
        assert!(ir.contains("br i1 %_1, label %loop_body.2, label %loop_end.3"));
        assert!(ir.contains("\tbr label %loop_cond.1\n\nloop_end.3:"));
    }
}
