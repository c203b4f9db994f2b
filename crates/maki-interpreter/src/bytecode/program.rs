// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The loaded form of a compiled script.
//!
//! Every index stored here was validated by the loader, so the VM indexes
//! these tables directly.

use std::fmt;

use super::opcode::Opcode;
use crate::registry::{ClassId, FunctionDescriptor, ValueType, is_hook_name};
use crate::runtime::Value;

/// One entry of the class table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRef {
    /// 32-character class key as stored in the file.
    pub key: String,
    /// Resolved registry id.
    pub id: ClassId,
    /// Catalog name.
    pub name: &'static str,
}

/// One entry of the method table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    /// Index into the class table.
    pub class: usize,
    /// Name as spelled by the script.
    pub name: String,
    /// Catalog declaration, when the class chain declares the name.
    pub signature: Option<&'static FunctionDescriptor>,
}

impl MethodRef {
    /// Declared parameter count, if the catalog knows the method.
    pub fn arity(&self) -> Option<usize> {
        self.signature.map(FunctionDescriptor::arity)
    }

    /// Declared return type.
    pub fn returns(&self) -> Option<ValueType> {
        self.signature.and_then(FunctionDescriptor::returns)
    }

    /// Whether this is an event-handler name.
    pub fn is_hook(&self) -> bool {
        is_hook_name(&self.name)
    }
}

/// One global variable slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Declared type; object variables carry their class name.
    pub ty: ValueType,
    /// Class of an object variable.
    pub class: Option<ClassId>,
    /// Value the slot holds before any code runs.
    pub initial: Value,
    /// Declared at script scope.
    pub global: bool,
    /// Bound to the System singleton.
    pub system: bool,
}

/// A script function attached to an event of the object held by a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Variable whose value receives the event.
    pub variable: usize,
    /// Method-table entry naming the event.
    pub method: usize,
    /// Byte offset of the handler within the code section.
    pub offset: u32,
    /// Index of the handler's first instruction.
    pub entry: usize,
}

/// Decoded instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Variable-table index.
    Variable(usize),
    /// Instruction index of a jump or call target. Equal to the code length
    /// when the target is the end of the code section.
    Target(usize),
    /// Method-table index and the number of arguments the call pops.
    Call {
        /// Method-table index.
        method: usize,
        /// Arguments popped before the receiver.
        argc: usize,
    },
    /// Class-table index.
    Class(usize),
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Byte offset within the code section.
    pub offset: u32,
    /// Opcode.
    pub op: Opcode,
    /// Operand, for opcodes that carry one.
    pub operand: Option<Operand>,
}

/// A fully validated program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub(crate) version: u16,
    pub(crate) extra: u32,
    pub(crate) classes: Vec<ClassRef>,
    pub(crate) methods: Vec<MethodRef>,
    pub(crate) variables: Vec<Variable>,
    pub(crate) bindings: Vec<Binding>,
    pub(crate) code: Vec<Instruction>,
    pub(crate) code_len: u32,
    pub(crate) system_variable: Option<usize>,
}

impl Program {
    /// Raw header version word.
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Format major version (low byte of the version word).
    pub fn format_major(&self) -> u8 {
        (self.version & 0xff) as u8
    }

    /// The header's extra version word.
    pub fn extra(&self) -> u32 {
        self.extra
    }

    /// Class table.
    pub fn classes(&self) -> &[ClassRef] {
        &self.classes
    }

    /// Method table.
    pub fn methods(&self) -> &[MethodRef] {
        &self.methods
    }

    /// Variable table.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Event bindings, in file order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Decoded instructions.
    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    /// Size of the code section in bytes.
    pub fn code_len(&self) -> u32 {
        self.code_len
    }

    /// The variable bound to the System singleton.
    pub fn system_variable(&self) -> Option<usize> {
        self.system_variable
    }

    /// Instruction index starting at a code byte offset.
    pub fn instruction_at(&self, offset: u32) -> Option<usize> {
        self.code.binary_search_by_key(&offset, |i| i.offset).ok()
    }

    /// Class name and method name of a method-table entry.
    pub fn qualified_name(&self, method: usize) -> String {
        match self.methods.get(method) {
            Some(m) => {
                let class = self.classes.get(m.class).map_or("?", |c| c.name);
                format!("{class}.{}", m.name)
            }
            None => format!("method#{method}"),
        }
    }

    /// Human-readable operand, for disassembly.
    pub fn operand_text(&self, instruction: &Instruction) -> String {
        match instruction.operand {
            None => String::new(),
            Some(Operand::Variable(v)) => match self.variables.get(v) {
                Some(var) if var.system => format!("v{v} (System)"),
                Some(Variable {
                    ty: ValueType::Object(class),
                    ..
                }) => format!("v{v} ({class})"),
                Some(var) if !var.initial.is_void() => format!("v{v} = {}", literal(&var.initial)),
                _ => format!("v{v}"),
            },
            Some(Operand::Target(t)) => {
                let offset = self.code.get(t).map_or(self.code_len, |i| i.offset);
                format!("-> {offset:04x}")
            }
            Some(Operand::Call { method, argc }) => {
                format!("{}/{argc}", self.qualified_name(method))
            }
            Some(Operand::Class(c)) => self
                .classes
                .get(c)
                .map_or_else(|| format!("class#{c}"), |c| c.name.to_string()),
        }
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}  {}", self.offset, self.op)?;
        match self.operand {
            None => Ok(()),
            Some(Operand::Variable(v)) => write!(f, " v{v}"),
            Some(Operand::Target(t)) => write!(f, " @{t}"),
            Some(Operand::Call { method, argc }) => write!(f, " m{method}/{argc}"),
            Some(Operand::Class(c)) => write!(f, " c{c}"),
        }
    }
}
