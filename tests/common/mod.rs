// Shared helpers for integration tests: compile MiniJava through the public
// driver and execute the emitted IR with a small interpreter.
//
// The interpreter understands exactly the instruction forms mjc emits. Memory
// is a flat byte vector, pointers are offsets into it, and vtable slots hold
// function ids above FN_BASE.

#![allow(dead_code)]

use std::collections::HashMap;

use mjc::Driver;

const FN_BASE: i64 = 1 << 40;
const STEP_LIMIT: usize = 1_000_000;

/// Compile a program that must pass analysis, returning its IR
pub fn compile(source: &str) -> String {
    match Driver::new("test.java", source).compile() {
        Ok(compilation) => compilation.ir.expect("IR generation is on by default"),
        Err(diagnostics) => {
            let rendered: Vec<String> = diagnostics.iter().map(|d| d.to_string()).collect();
            panic!("compilation failed:\n{}", rendered.join("\n"));
        }
    }
}

/// Compile and execute, returning what the program printed and how it ended
pub fn run_source(source: &str) -> Run {
    run(&compile(source))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    OutOfBounds,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub output: Vec<i32>,
    pub outcome: Outcome,
}

/// Execute `@main` of an emitted module
pub fn run(ir: &str) -> Run {
    let mut machine = Machine::load(ir);
    match machine.call("@main", Vec::new()) {
        Ok(_) => Run { output: machine.output, outcome: Outcome::Finished },
        Err(Halt::OutOfBounds) => Run { output: machine.output, outcome: Outcome::OutOfBounds },
        Err(Halt::Fault(message)) => panic!("interpreter fault: {}\n--- IR ---\n{}", message, ir),
    }
}

enum Halt {
    OutOfBounds,
    Fault(String),
}

enum Flow {
    Next,
    Jump(String),
    Return(Option<i64>),
}

struct Function {
    params: Vec<String>,
    entry: String,
    blocks: HashMap<String, Vec<String>>,
}

struct Frame {
    regs: HashMap<String, i64>,
    previous_block: String,
}

struct Machine {
    functions: Vec<(String, Function)>,
    function_ids: HashMap<String, usize>,
    globals: HashMap<String, i64>,
    memory: Vec<u8>,
    output: Vec<i32>,
    steps: usize,
}

fn fault<T>(message: impl Into<String>) -> Result<T, Halt> {
    Err(Halt::Fault(message.into()))
}

fn size_of(ty: &str) -> usize {
    match ty {
        "i1" | "i8" => 1,
        "i32" => 4,
        t if t.ends_with('*') => 8,
        other => panic!("unsized type {}", other),
    }
}

/// Split `ty value` at the last space
fn typed(s: &str) -> (&str, &str) {
    s.trim().rsplit_once(' ').unwrap_or(("", s.trim()))
}

impl Machine {
    fn load(ir: &str) -> Self {
        let mut machine = Machine {
            functions: Vec::new(),
            function_ids: HashMap::new(),
            globals: HashMap::new(),
            // address 0 is null
            memory: vec![0; 8],
            output: Vec::new(),
            steps: 0,
        };

        let mut vtables: Vec<(String, Vec<String>)> = Vec::new();
        let mut lines = ir.lines();

        while let Some(line) = lines.next() {
            if line.starts_with('@') && line.contains(" = global [") {
                let name = line.split(" = ").next().unwrap_or_default().to_string();
                let mut entries = Vec::new();
                if !line.ends_with("[]") {
                    for entry in lines.by_ref() {
                        let entry = entry.trim();
                        if entry == "]" {
                            break;
                        }
                        let start = entry.find('@').expect("vtable entry names a function");
                        let end = entry.find(" to i8*").expect("vtable entry is a bitcast");
                        entries.push(entry[start..end].to_string());
                    }
                }
                vtables.push((name, entries));
            } else if let Some(header) = line.strip_prefix("define ") {
                let (name, function) = Self::parse_function(header, &mut lines);
                machine.function_ids.insert(name.clone(), machine.functions.len());
                machine.functions.push((name, function));
            }
        }

        for (name, entries) in vtables {
            let base = machine.alloc(entries.len() * 8);
            for (i, entry) in entries.iter().enumerate() {
                let id = machine.function_ids[entry.as_str()] as i64 + FN_BASE;
                machine.write(base as usize + i * 8, 8, id);
            }
            machine.globals.insert(name, base);
        }

        machine
    }

    fn parse_function<'a>(header: &str, lines: &mut impl Iterator<Item = &'a str>) -> (String, Function) {
        let at = header.find('@').expect("function has a global name");
        let open = header[at..].find('(').expect("function has a parameter list") + at;
        let close = header.rfind(')').expect("parameter list is closed");
        let name = header[at..open].to_string();
        let params = header[open + 1..close]
            .split(", ")
            .filter(|p| !p.is_empty())
            .map(|p| typed(p).1.to_string())
            .collect();

        let mut blocks: HashMap<String, Vec<String>> = HashMap::new();
        let mut entry = String::new();
        let mut current = String::new();

        for line in lines.by_ref() {
            if line == "}" {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            if !line.starts_with('\t') && line.ends_with(':') {
                current = line.trim_end_matches(':').to_string();
                if entry.is_empty() {
                    entry = current.clone();
                }
                blocks.insert(current.clone(), Vec::new());
                continue;
            }
            blocks.entry(current.clone()).or_default().push(line.trim().to_string());
        }

        (name, Function { params, entry, blocks })
    }

    // === Memory ===

    fn alloc(&mut self, size: usize) -> i64 {
        let addr = self.memory.len();
        let size = (size.max(1) + 7) / 8 * 8;
        self.memory.resize(addr + size, 0);
        addr as i64
    }

    fn check_addr(&self, addr: i64, size: usize) -> Result<usize, Halt> {
        if addr <= 0 || addr as usize + size > self.memory.len() {
            return fault(format!("invalid access of {} bytes at {}", size, addr));
        }
        Ok(addr as usize)
    }

    fn write(&mut self, addr: usize, size: usize, value: i64) {
        let bytes = value.to_le_bytes();
        self.memory[addr..addr + size].copy_from_slice(&bytes[..size]);
    }

    fn read(&self, addr: usize, size: usize) -> i64 {
        let mut bytes = [0u8; 8];
        bytes[..size].copy_from_slice(&self.memory[addr..addr + size]);
        match size {
            4 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64,
            _ => i64::from_le_bytes(bytes),
        }
    }

    // === Execution ===

    fn call(&mut self, name: &str, args: Vec<i64>) -> Result<Option<i64>, Halt> {
        let Some(&id) = self.function_ids.get(name) else {
            return fault(format!("unknown function {}", name));
        };

        let mut frame = Frame { regs: HashMap::new(), previous_block: String::new() };
        let (params, mut block) = {
            let function = &self.functions[id].1;
            (function.params.clone(), function.entry.clone())
        };
        if params.len() != args.len() {
            return fault(format!("{} expects {} arguments, got {}", name, params.len(), args.len()));
        }
        frame.regs.extend(params.into_iter().zip(args));

        loop {
            let Some(instructions) = self.functions[id].1.blocks.get(&block).cloned() else {
                return fault(format!("unknown block {} in {}", block, name));
            };

            let mut next = None;
            for instruction in &instructions {
                self.steps += 1;
                if self.steps > STEP_LIMIT {
                    return fault("step limit exceeded");
                }
                match self.step(&mut frame, instruction)? {
                    Flow::Next => {}
                    Flow::Jump(target) => {
                        next = Some(target);
                        break;
                    }
                    Flow::Return(value) => return Ok(value),
                }
            }

            let Some(target) = next else {
                return fault(format!("block {} in {} falls through", block, name));
            };
            frame.previous_block = std::mem::replace(&mut block, target);
        }
    }

    fn value(&self, frame: &Frame, operand: &str) -> Result<i64, Halt> {
        let operand = operand.trim();
        if operand.starts_with('%') {
            return frame
                .regs
                .get(operand)
                .copied()
                .ok_or_else(|| Halt::Fault(format!("undefined register {}", operand)));
        }
        if operand.starts_with('@') {
            return self
                .globals
                .get(operand)
                .copied()
                .ok_or_else(|| Halt::Fault(format!("undefined global {}", operand)));
        }
        if operand == "null" {
            return Ok(0);
        }
        operand
            .parse()
            .map_err(|_| Halt::Fault(format!("bad operand {}", operand)))
    }

    /// Two `, `-separated operands after a leading type, e.g. `i32 a, b`
    fn operands(&self, frame: &Frame, rest: &str) -> Result<(i64, i64), Halt> {
        let Some((_, values)) = rest.split_once(' ') else {
            return fault(format!("missing operands in {}", rest));
        };
        let Some((a, b)) = values.split_once(", ") else {
            return fault(format!("missing operands in {}", rest));
        };
        Ok((self.value(frame, a)?, self.value(frame, b)?))
    }

    fn step(&mut self, frame: &mut Frame, instruction: &str) -> Result<Flow, Halt> {
        if instruction.starts_with('%') {
            if let Some((dest, rhs)) = instruction.split_once(" = ") {
                let result = self.evaluate(frame, rhs)?;
                if let Some(result) = result {
                    frame.regs.insert(dest.to_string(), result);
                }
                return Ok(Flow::Next);
            }
        }

        if let Some(rest) = instruction.strip_prefix("store ") {
            let Some((value, ptr)) = rest.split_once(", ") else {
                return fault(format!("bad store {}", instruction));
            };
            let (ty, value) = typed(value);
            let value = self.value(frame, value)?;
            let addr = self.value(frame, typed(ptr).1)?;
            let size = size_of(ty);
            let addr = self.check_addr(addr, size)?;
            self.write(addr, size, value);
            return Ok(Flow::Next);
        }

        if let Some(rest) = instruction.strip_prefix("br ") {
            if let Some(label) = rest.strip_prefix("label %") {
                return Ok(Flow::Jump(label.to_string()));
            }
            let parts: Vec<&str> = rest.split(", ").collect();
            let [cond, then_label, else_label] = parts.as_slice() else {
                return fault(format!("bad branch {}", instruction));
            };
            let cond = self.value(frame, typed(cond).1)?;
            let target = if cond != 0 { then_label } else { else_label };
            return Ok(Flow::Jump(target.trim_start_matches("label %").to_string()));
        }

        if let Some(rest) = instruction.strip_prefix("ret ") {
            if rest == "void" {
                return Ok(Flow::Return(None));
            }
            return Ok(Flow::Return(Some(self.value(frame, typed(rest).1)?)));
        }

        if instruction.starts_with("call ") {
            self.evaluate(frame, instruction)?;
            return Ok(Flow::Next);
        }

        if instruction == "unreachable" {
            return fault("reached unreachable");
        }

        fault(format!("unsupported instruction {}", instruction))
    }

    fn evaluate(&mut self, frame: &mut Frame, rhs: &str) -> Result<Option<i64>, Halt> {
        let (op, rest) = rhs.split_once(' ').unwrap_or((rhs, ""));

        let result = match op {
            "alloca" => self.alloc(size_of(rest)),

            "load" => {
                let Some((ty, ptr)) = rest.split_once(", ") else {
                    return fault(format!("bad load {}", rhs));
                };
                let size = size_of(ty);
                let addr = self.value(frame, typed(ptr).1)?;
                let addr = self.check_addr(addr, size)?;
                self.read(addr, size)
            }

            "getelementptr" => {
                let parts: Vec<&str> = rest.split(", ").collect();
                if rest.starts_with('[') {
                    // address of a vtable's first slot
                    self.value(frame, typed(parts[1]).1)?
                } else {
                    let base = self.value(frame, typed(parts[1]).1)?;
                    let index = self.value(frame, typed(parts[2]).1)?;
                    base + index * size_of(parts[0]) as i64
                }
            }

            "bitcast" => {
                let Some((value, _)) = rest.split_once(" to ") else {
                    return fault(format!("bad bitcast {}", rhs));
                };
                self.value(frame, typed(value).1)?
            }

            "add" | "sub" | "mul" => {
                let (a, b) = self.operands(frame, rest)?;
                let (a, b) = (a as i32, b as i32);
                let result = match op {
                    "add" => a.wrapping_add(b),
                    "sub" => a.wrapping_sub(b),
                    _ => a.wrapping_mul(b),
                };
                result as i64
            }

            "xor" => {
                let (a, b) = self.operands(frame, rest)?;
                (a ^ b) & 1
            }

            "icmp" => {
                let Some((cond, operands)) = rest.split_once(' ') else {
                    return fault(format!("bad icmp {}", rhs));
                };
                let (a, b) = self.operands(frame, operands)?;
                let result = match cond {
                    "slt" => (a as i32) < (b as i32),
                    "ult" => (a as u32) < (b as u32),
                    other => return fault(format!("unsupported icmp {}", other)),
                };
                result as i64
            }

            "phi" => {
                let Some((_, incoming)) = rest.split_once(' ') else {
                    return fault(format!("bad phi {}", rhs));
                };
                let incoming = incoming.trim().trim_start_matches('[').trim_end_matches(']');
                let mut chosen = None;
                for pair in incoming.split("], [") {
                    let Some((value, block)) = pair.trim().split_once(", ") else {
                        return fault(format!("bad phi {}", rhs));
                    };
                    if block.trim_start_matches('%') == frame.previous_block {
                        chosen = Some(self.value(frame, value)?);
                    }
                }
                match chosen {
                    Some(value) => value,
                    None => return fault(format!("phi has no entry for {}", frame.previous_block)),
                }
            }

            "call" => return self.evaluate_call(frame, rest),

            other => return fault(format!("unsupported operation {}", other)),
        };

        Ok(Some(result))
    }

    fn evaluate_call(&mut self, frame: &mut Frame, rest: &str) -> Result<Option<i64>, Halt> {
        let Some(start) = rest.find(|c| c == '@' || c == '%') else {
            return fault(format!("call without callee: {}", rest));
        };
        let Some(open) = rest[start..].find('(').map(|i| i + start) else {
            return fault(format!("call without arguments: {}", rest));
        };
        let close = rest.rfind(')').unwrap_or(rest.len());
        let callee = &rest[start..open];

        let mut args = Vec::new();
        for arg in rest[open + 1..close].split(", ").filter(|a| !a.is_empty()) {
            args.push(self.value(frame, typed(arg).1)?);
        }

        match callee {
            "@calloc" => {
                let [count, size] = args.as_slice() else {
                    return fault("calloc takes two arguments");
                };
                Ok(Some(self.alloc((count * size) as usize)))
            }
            "@print_int" => {
                self.output.push(args[0] as i32);
                Ok(None)
            }
            "@throw_oob" => Err(Halt::OutOfBounds),
            _ => {
                let target = self.value(frame, callee)? - FN_BASE;
                let Some((name, _)) = self.functions.get(target as usize) else {
                    return fault(format!("{} is not a function pointer", callee));
                };
                let name = name.clone();
                self.call(&name, args)
            }
        }
    }
}
