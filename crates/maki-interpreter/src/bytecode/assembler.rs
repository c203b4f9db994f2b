// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Writes programs in the compiled format.
//!
//! There is no compiler front end; this is how tests and tools produce
//! programs. Tables are appended to as they are declared, and jumps refer
//! to [`Label`]s that are resolved in [`Assembler::finish`].
//!
//! ```
//! use maki_interpreter::bytecode::{Assembler, Opcode};
//!
//! let mut asm = Assembler::new();
//! let system = asm.class("System");
//! let sys = asm.system_variable(system);
//! let loaded = asm.method(system, "onScriptLoaded");
//! let entry = asm.label();
//! asm.bind(entry);
//! asm.on(sys, loaded, entry);
//! asm.op(Opcode::Return);
//!
//! let program = maki_interpreter::load(&asm.finish()).unwrap();
//! assert_eq!(program.bindings().len(), 1);
//! ```

use super::opcode::Opcode;
use crate::registry::ClassRegistry;

/// A code position, bound once with [`Assembler::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(usize);

#[derive(Debug, Clone)]
struct VariableRecord {
    ty: u8,
    object: u8,
    subclass: u16,
    init: [u16; 4],
    global: u8,
    system: u8,
}

/// Builder for one program image.
#[derive(Debug, Clone)]
pub struct Assembler {
    version: u16,
    extra: u32,
    classes: Vec<String>,
    methods: Vec<(u16, String)>,
    variables: Vec<VariableRecord>,
    constants: Vec<(u32, String)>,
    bindings: Vec<(u32, u32, Label)>,
    code: Vec<u8>,
    labels: Vec<Option<u32>>,
    fixups: Vec<(usize, Label)>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    /// An empty format-3 program.
    pub fn new() -> Self {
        Self {
            version: 3,
            extra: 0,
            classes: Vec::new(),
            methods: Vec::new(),
            variables: Vec::new(),
            constants: Vec::new(),
            bindings: Vec::new(),
            code: Vec::new(),
            labels: Vec::new(),
            fixups: Vec::new(),
        }
    }

    /// Sets the header version word.
    pub fn set_version(&mut self, version: u16) -> &mut Self {
        self.version = version;
        self
    }

    // ------------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------------

    /// Adds a catalogued class by name and returns its class-table index.
    /// Unknown names are written with an all-zero key.
    pub fn class(&mut self, name: &str) -> u32 {
        let key = ClassRegistry::standard()
            .describe_name(name)
            .map_or("00000000000000000000000000000000", |c| c.key);
        self.class_key(key)
    }

    /// Adds a class by its 32-character key.
    pub fn class_key(&mut self, key: &str) -> u32 {
        self.classes.push(key.to_ascii_lowercase());
        (self.classes.len() - 1) as u32
    }

    /// Adds a method-table entry.
    pub fn method(&mut self, class: u32, name: &str) -> u32 {
        self.methods.push((class as u16, name.to_string()));
        (self.methods.len() - 1) as u32
    }

    fn variable(&mut self, record: VariableRecord) -> u32 {
        self.variables.push(record);
        (self.variables.len() - 1) as u32
    }

    fn primitive(ty: u8, init: [u16; 4]) -> VariableRecord {
        VariableRecord {
            ty,
            object: 0,
            subclass: 0,
            init,
            global: 1,
            system: 0,
        }
    }

    /// An object variable of a class-table entry, initially null.
    pub fn object_variable(&mut self, class: u32) -> u32 {
        self.variable(VariableRecord {
            ty: class as u8,
            object: 1,
            ..Self::primitive(0, [0; 4])
        })
    }

    /// An object variable flagged as the System variable.
    pub fn system_variable(&mut self, class: u32) -> u32 {
        self.variable(VariableRecord {
            ty: class as u8,
            object: 1,
            system: 1,
            ..Self::primitive(0, [0; 4])
        })
    }

    /// An int variable.
    pub fn int(&mut self, value: i32) -> u32 {
        let bits = value as u32;
        self.variable(Self::primitive(
            2,
            [(bits & 0xffff) as u16, (bits >> 16) as u16, 0, 0],
        ))
    }

    /// A float variable.
    pub fn float(&mut self, value: f32) -> u32 {
        let bits = value.to_bits();
        self.variable(Self::primitive(
            3,
            [(bits & 0xffff) as u16, (bits >> 16) as u16, 0, 0],
        ))
    }

    /// A boolean variable.
    pub fn boolean(&mut self, value: bool) -> u32 {
        self.variable(Self::primitive(5, [u16::from(value), 0, 0, 0]))
    }

    /// A string variable with its constant.
    pub fn string(&mut self, value: &str) -> u32 {
        let v = self.variable(Self::primitive(6, [0; 4]));
        self.constants.push((v, value.to_string()));
        v
    }

    // ------------------------------------------------------------------------
    // Code
    // ------------------------------------------------------------------------

    /// A new unbound label.
    pub fn label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Binds `label` to the current code offset.
    pub fn bind(&mut self, label: Label) -> &mut Self {
        if let Some(slot) = self.labels.get_mut(label.0) {
            *slot = Some(self.code.len() as u32);
        }
        self
    }

    /// Current code offset.
    pub fn here(&self) -> u32 {
        self.code.len() as u32
    }

    /// Attaches the handler at `label` to `method` on the object in `variable`.
    pub fn on(&mut self, variable: u32, method: u32, label: Label) -> &mut Self {
        self.bindings.push((variable, method, label));
        self
    }

    /// An instruction without operand.
    pub fn op(&mut self, op: Opcode) -> &mut Self {
        self.code.push(op as u8);
        self
    }

    fn op_u32(&mut self, op: Opcode, operand: u32) -> &mut Self {
        self.code.push(op as u8);
        self.code.extend_from_slice(&operand.to_le_bytes());
        self
    }

    /// `push variable`
    pub fn push(&mut self, variable: u32) -> &mut Self {
        self.op_u32(Opcode::Push, variable)
    }

    /// `popTo variable`
    pub fn pop_to(&mut self, variable: u32) -> &mut Self {
        self.op_u32(Opcode::PopTo, variable)
    }

    /// A jump or `callGlobal` to `label`.
    pub fn jump(&mut self, op: Opcode, label: Label) -> &mut Self {
        self.code.push(op as u8);
        self.fixups.push((self.code.len(), label));
        self.code.extend_from_slice(&[0; 4]);
        self
    }

    /// `call method`, followed by a stack-protection marker.
    pub fn call(&mut self, method: u32) -> &mut Self {
        self.op_u32(Opcode::Call, method);
        self.code.extend_from_slice(&0xffff_0000u32.to_le_bytes());
        self
    }

    /// `callStrict method argc`
    pub fn call_strict(&mut self, method: u32, argc: u8) -> &mut Self {
        self.op_u32(Opcode::CallStrict, method);
        self.code.push(argc);
        self
    }

    /// `new class`
    pub fn new_instance(&mut self, class: u32) -> &mut Self {
        self.op_u32(Opcode::New, class)
    }

    /// Appends raw bytes to the code section.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.code.extend_from_slice(bytes);
        self
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// Serializes the program. Unbound labels point at the end of the code.
    pub fn finish(&self) -> Vec<u8> {
        let end = self.code.len() as u32;
        let resolve = |label: Label| self.labels.get(label.0).copied().flatten().unwrap_or(end);

        let mut code = self.code.clone();
        for &(at, label) in &self.fixups {
            let rel = i64::from(resolve(label)) - (at as i64 + 4);
            code[at..at + 4].copy_from_slice(&(rel as i32).to_le_bytes());
        }

        let mut out = Vec::with_capacity(64 + code.len());
        out.extend_from_slice(b"FG");
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.extra.to_le_bytes());

        put_u32(&mut out, self.classes.len());
        for key in &self.classes {
            for chunk in 0..4 {
                let word = key
                    .get(chunk * 8..chunk * 8 + 8)
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .unwrap_or(0);
                out.extend_from_slice(&word.to_le_bytes());
            }
        }

        put_u32(&mut out, self.methods.len());
        for (class, name) in &self.methods {
            out.extend_from_slice(&class.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            put_string(&mut out, name);
        }

        put_u32(&mut out, self.variables.len());
        for v in &self.variables {
            out.push(v.ty);
            out.push(v.object);
            out.extend_from_slice(&v.subclass.to_le_bytes());
            for init in v.init {
                out.extend_from_slice(&init.to_le_bytes());
            }
            out.push(v.global);
            out.push(v.system);
        }

        put_u32(&mut out, self.constants.len());
        for (variable, value) in &self.constants {
            out.extend_from_slice(&variable.to_le_bytes());
            put_string(&mut out, value);
        }

        put_u32(&mut out, self.bindings.len());
        for &(variable, method, label) in &self.bindings {
            out.extend_from_slice(&variable.to_le_bytes());
            out.extend_from_slice(&method.to_le_bytes());
            out.extend_from_slice(&resolve(label).to_le_bytes());
        }

        put_u32(&mut out, code.len());
        out.extend_from_slice(&code);
        out
    }
}

fn put_u32(out: &mut Vec<u8>, n: usize) {
    out.extend_from_slice(&(n as u32).to_le_bytes());
}

/// Latin-1; characters outside it are written as `?`.
fn put_string(out: &mut Vec<u8>, s: &str) {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    out.extend_from_slice(&bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{Operand, load};
    use crate::registry::ValueType;
    use crate::runtime::Value;

    #[test]
    fn test_primitive_initial_values() {
        let mut asm = Assembler::new();
        asm.class("System");
        let i = asm.int(-70000);
        let f = asm.float(1.5);
        let b = asm.boolean(true);
        let s = asm.string("caf\u{e9}");
        let program = load(&asm.finish()).unwrap();

        let vars = program.variables();
        assert_eq!(vars[i as usize].initial, Value::Int(-70000));
        assert_eq!(vars[f as usize].initial, Value::Float(1.5));
        assert_eq!(vars[f as usize].ty, ValueType::Float);
        assert_eq!(vars[b as usize].initial, Value::Boolean(true));
        assert_eq!(vars[s as usize].initial, Value::from("caf\u{e9}"));
    }

    #[test]
    fn test_labels_resolve_backwards_and_forwards() {
        let mut asm = Assembler::new();
        asm.class("System");
        let top = asm.label();
        let out = asm.label();
        asm.bind(top);
        asm.op(Opcode::Nop);
        asm.jump(Opcode::Jump, out);
        asm.jump(Opcode::Jump, top);
        asm.bind(out);
        asm.op(Opcode::Return);

        let program = load(&asm.finish()).unwrap();
        let code = program.code();
        assert_eq!(code[1].operand, Some(Operand::Target(3)));
        assert_eq!(code[2].operand, Some(Operand::Target(0)));
    }
}
