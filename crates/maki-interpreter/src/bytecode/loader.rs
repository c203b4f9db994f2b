// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Single-pass decoder from program bytes to a [`Program`].

use maki_macros::{bail, ensure, try_unwrap};
use tracing::debug;

use super::opcode::{Opcode, OperandKind};
use super::program::{Binding, ClassRef, Instruction, MethodRef, Operand, Program, Variable};
use super::reader::Reader;
use crate::error::{LoadError, Malformed};
use crate::registry::{ClassId, ClassRegistry, ValueType};
use crate::runtime::Value;

/// File magic.
pub const MAGIC: [u8; 2] = *b"FG";

/// Format majors this loader reads.
pub const SUPPORTED_MAJORS: std::ops::RangeInclusive<u8> = 1..=4;

/// A u32 at least this large right after a call is a stack-protection marker.
pub const STACK_PROTECTION: u32 = 0xffff_0000;

const MAX_CLASSES: u32 = 256;
const MAX_METHODS: u32 = 1 << 16;
const MAX_VARIABLES: u32 = 1 << 16;
const MAX_CONSTANTS: u32 = 1 << 16;
const MAX_BINDINGS: u32 = 1 << 16;
const MAX_CODE: u32 = 16 << 20;

/// Decodes a program against the standard registry.
pub fn load(bytes: &[u8]) -> Result<Program, LoadError> {
    load_with(ClassRegistry::standard(), bytes)
}

/// Decodes a program, resolving classes against `registry`.
pub fn load_with(registry: &ClassRegistry, bytes: &[u8]) -> Result<Program, LoadError> {
    Loader {
        registry,
        reader: Reader::new(bytes),
    }
    .run()
}

struct Loader<'r, 'a> {
    registry: &'r ClassRegistry,
    reader: Reader<'a>,
}

/// A binding before its code offset is mapped to an instruction.
struct RawBinding {
    at: usize,
    variable: usize,
    method: usize,
    offset: u32,
}

impl Loader<'_, '_> {
    fn run(mut self) -> Result<Program, LoadError> {
        let (version, extra) = self.header()?;
        let classes = self.classes()?;
        let methods = self.methods(&classes)?;
        let mut variables = self.variables(&classes)?;
        self.constants(&mut variables)?;
        let raw_bindings = self.bindings(&variables, &methods)?;

        let code_start = self.reader.offset() + 4;
        let len = self.reader.count("code", MAX_CODE)?;
        let code = self.reader.bytes(len, "code")?;
        let instructions = decode(code, code_start, &variables, &methods, &classes)?;

        if self.reader.remaining() > 0 {
            return Err(self
                .reader
                .malformed(Malformed::TrailingBytes(self.reader.remaining())));
        }

        let mut bindings = Vec::with_capacity(raw_bindings.len());
        for raw in raw_bindings {
            let entry = instructions
                .binary_search_by_key(&raw.offset, |i| i.offset)
                .map_err(|_| {
                    self.reader
                        .malformed_at(raw.at, Malformed::CodeOffset(i64::from(raw.offset)))
                })?;
            bindings.push(Binding {
                variable: raw.variable,
                method: raw.method,
                offset: raw.offset,
                entry,
            });
        }

        let system_variable = variables.iter().position(|v| v.system).or_else(|| {
            variables
                .first()
                .and_then(|v| v.class)
                .filter(|&c| self.registry.descriptor(c).name == "System")
                .map(|_| 0)
        });

        debug!(
            version,
            classes = classes.len(),
            methods = methods.len(),
            variables = variables.len(),
            bindings = bindings.len(),
            instructions = instructions.len(),
            "program loaded"
        );

        Ok(Program {
            version,
            extra,
            classes,
            methods,
            variables,
            bindings,
            code: instructions,
            code_len: len as u32,
            system_variable,
        })
    }

    fn header(&mut self) -> Result<(u16, u32), LoadError> {
        let magic = self.reader.bytes(2, "header")?;
        if magic != MAGIC {
            return Err(self
                .reader
                .malformed_at(0, Malformed::BadMagic([magic[0], magic[1]])));
        }
        let version = self.reader.u16("header")?;
        if !SUPPORTED_MAJORS.contains(&((version & 0xff) as u8)) {
            return Err(self
                .reader
                .malformed_at(2, Malformed::UnsupportedVersion(version)));
        }
        let extra = self.reader.u32("header")?;
        Ok((version, extra))
    }

    fn classes(&mut self) -> Result<Vec<ClassRef>, LoadError> {
        let count = self.reader.count("classes", MAX_CLASSES)?;
        let mut classes = Vec::with_capacity(count);
        for _ in 0..count {
            let mut key = String::with_capacity(32);
            for _ in 0..4 {
                let word = self.reader.u32("classes")?;
                key.push_str(&format!("{word:08x}"));
            }
            let id = self
                .registry
                .class_id(&key)
                .map_err(|_| LoadError::UnknownClass { key: key.clone() })?;
            classes.push(ClassRef {
                name: self.registry.descriptor(id).name,
                key,
                id,
            });
        }
        Ok(classes)
    }

    fn methods(&mut self, classes: &[ClassRef]) -> Result<Vec<MethodRef>, LoadError> {
        let count = self.reader.count("methods", MAX_METHODS)?;
        let mut methods = Vec::with_capacity(count.min(self.reader.remaining()));
        for _ in 0..count {
            let at = self.reader.offset();
            let class_code = self.reader.u16("methods")?;
            let _reserved = self.reader.u16("methods")?;
            let name = self.reader.string("methods")?;
            let class = usize::from(class_code & 0xff);
            let Some(owner) = classes.get(class) else {
                return Err(self
                    .reader
                    .malformed_at(at, Malformed::ClassIndex(u32::from(class_code & 0xff))));
            };
            let signature = self
                .registry
                .resolve_function(owner.name, &name)
                .map(|(_, f)| f);
            methods.push(MethodRef {
                class,
                name,
                signature,
            });
        }
        Ok(methods)
    }

    fn variables(&mut self, classes: &[ClassRef]) -> Result<Vec<Variable>, LoadError> {
        let count = self.reader.count("variables", MAX_VARIABLES)?;
        let mut variables: Vec<Variable> = Vec::with_capacity(count.min(self.reader.remaining()));
        for _ in 0..count {
            let at = self.reader.offset();
            let ty = self.reader.u8("variables")?;
            let object = self.reader.u8("variables")?;
            let subclass = self.reader.u16("variables")?;
            let mut init = [0u16; 4];
            for slot in &mut init {
                *slot = self.reader.u16("variables")?;
            }
            let global = self.reader.u8("variables")? != 0;
            let system = self.reader.u8("variables")? != 0;

            let variable = if object != 0 {
                let Some(class) = classes.get(usize::from(ty)) else {
                    return Err(self
                        .reader
                        .malformed_at(at, Malformed::ClassIndex(u32::from(ty))));
                };
                object_variable(class.id, class.name, global, system)
            } else if subclass != 0 {
                let refined = variables
                    .get(usize::from(ty))
                    .and_then(|v| v.class.zip(class_name(&v.ty)));
                let Some((id, name)) = refined else {
                    return Err(self
                        .reader
                        .malformed_at(at, Malformed::VariableIndex(u32::from(ty))));
                };
                object_variable(id, name, global, system)
            } else {
                let (ty, initial) = match ty {
                    2 => (
                        ValueType::Int,
                        Value::Int((u32::from(init[0]) | u32::from(init[1]) << 16) as i32),
                    ),
                    3 | 4 => {
                        let bits = u32::from(init[1]) << 16 | u32::from(init[0]);
                        let ty = if ty == 3 {
                            ValueType::Float
                        } else {
                            ValueType::Double
                        };
                        (ty, Value::Float(f64::from(f32::from_bits(bits))))
                    }
                    5 => (ValueType::Boolean, Value::Boolean(init[0] != 0)),
                    6 => (ValueType::String, Value::String(String::new())),
                    other => bail!(self.reader.malformed_at(at, Malformed::PrimitiveType(other))),
                };
                Variable {
                    ty,
                    class: None,
                    initial,
                    global,
                    system,
                }
            };
            variables.push(variable);
        }
        Ok(variables)
    }

    fn constants(&mut self, variables: &mut [Variable]) -> Result<(), LoadError> {
        let count = self.reader.count("constants", MAX_CONSTANTS)?;
        for _ in 0..count {
            let at = self.reader.offset();
            let index = self.reader.u32("constants")?;
            let value = self.reader.string("constants")?;
            let Some(variable) = variables.get_mut(index as usize) else {
                return Err(self
                    .reader
                    .malformed_at(at, Malformed::VariableIndex(index)));
            };
            variable.initial = Value::String(value);
        }
        Ok(())
    }

    fn bindings(
        &mut self,
        variables: &[Variable],
        methods: &[MethodRef],
    ) -> Result<Vec<RawBinding>, LoadError> {
        let count = self.reader.count("bindings", MAX_BINDINGS)?;
        let mut bindings = Vec::with_capacity(count.min(self.reader.remaining()));
        for _ in 0..count {
            let at = self.reader.offset();
            let variable = self.reader.u32("bindings")?;
            let method = self.reader.u32("bindings")?;
            let offset = self.reader.u32("bindings")?;
            if variable as usize >= variables.len() {
                return Err(self
                    .reader
                    .malformed_at(at, Malformed::VariableIndex(variable)));
            }
            if method as usize >= methods.len() {
                return Err(self
                    .reader
                    .malformed_at(at + 4, Malformed::MethodIndex(method)));
            }
            bindings.push(RawBinding {
                at: at + 8,
                variable: variable as usize,
                method: method as usize,
                offset,
            });
        }
        Ok(bindings)
    }
}

fn object_variable(id: ClassId, name: &'static str, global: bool, system: bool) -> Variable {
    Variable {
        ty: ValueType::Object(name),
        class: Some(id),
        initial: Value::Null,
        global,
        system,
    }
}

fn class_name(ty: &ValueType) -> Option<&'static str> {
    match ty {
        ValueType::Object(name) => Some(name),
        _ => None,
    }
}

/// A jump whose target is resolved once every instruction is known.
struct PendingTarget {
    instruction: usize,
    at: usize,
    target: i64,
}

fn decode(
    code: &[u8],
    base: usize,
    variables: &[Variable],
    methods: &[MethodRef],
    classes: &[ClassRef],
) -> Result<Vec<Instruction>, LoadError> {
    let mut reader = Reader::new(code);
    let located = |offset: usize, reason: Malformed| LoadError::MalformedProgram {
        offset: base + offset,
        reason,
    };
    let truncated = |e: LoadError| match e {
        LoadError::MalformedProgram { offset, reason } => LoadError::MalformedProgram {
            offset: base + offset,
            reason,
        },
        other => other,
    };

    let mut instructions = Vec::new();
    let mut targets = Vec::new();
    while reader.remaining() > 0 {
        let at = reader.offset();
        let byte = reader.u8("code").map_err(truncated)?;
        let op = Opcode::try_from(byte).map_err(|b| located(at, Malformed::Opcode(b)))?;

        let operand = match op.operand() {
            OperandKind::None => None,
            OperandKind::Variable => {
                let v = reader.u32("code").map_err(truncated)?;
                ensure!(
                    (v as usize) < variables.len(),
                    located(at, Malformed::VariableIndex(v))
                );
                Some(Operand::Variable(v as usize))
            }
            OperandKind::Relative => {
                let rel = reader.u32("code").map_err(truncated)? as i32;
                targets.push(PendingTarget {
                    instruction: instructions.len(),
                    at,
                    target: reader.offset() as i64 + i64::from(rel),
                });
                Some(Operand::Target(0))
            }
            OperandKind::Method | OperandKind::MethodArgc => {
                let m = reader.u32("code").map_err(truncated)?;
                let method = try_unwrap!(
                    methods.get(m as usize),
                    located(at, Malformed::MethodIndex(m))
                );
                let argc = if op == Opcode::CallStrict {
                    let given = reader.u8("code").map_err(truncated)?;
                    match method.arity() {
                        Some(declared) if declared != usize::from(given) => {
                            let class = classes.get(method.class).map_or("?", |c| c.name);
                            return Err(located(
                                at,
                                Malformed::Arity {
                                    method: format!("{class}.{}", method.name),
                                    given,
                                    declared,
                                },
                            ));
                        }
                        _ => usize::from(given),
                    }
                } else {
                    method.arity().unwrap_or(0)
                };
                Some(Operand::Call {
                    method: m as usize,
                    argc,
                })
            }
            OperandKind::Class => {
                let c = reader.u32("code").map_err(truncated)?;
                ensure!(
                    (c as usize) < classes.len(),
                    located(at, Malformed::ClassIndex(c))
                );
                Some(Operand::Class(c as usize))
            }
        };

        if op.is_call() && reader.peek_u32().is_some_and(|next| next >= STACK_PROTECTION) {
            reader.bytes(4, "code").map_err(truncated)?;
        }

        instructions.push(Instruction {
            offset: at as u32,
            op,
            operand,
        });
    }

    for pending in targets {
        let end = code.len() as i64;
        let index = if pending.target == end {
            Some(instructions.len())
        } else if (0..end).contains(&pending.target) {
            instructions
                .binary_search_by_key(&(pending.target as u32), |i| i.offset)
                .ok()
        } else {
            None
        };
        let Some(index) = index else {
            return Err(located(pending.at, Malformed::CodeOffset(pending.target)));
        };
        instructions[pending.instruction].operand = Some(Operand::Target(index));
    }
    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maki_macros::assert_matches;

    const SYSTEM_KEY: [u32; 4] = [0xd6f50f64, 0x49b793fa, 0x66baf193, 0x983eaeef];

    /// Header + one System class + the given tail sections.
    fn image(tail: &[u8]) -> Vec<u8> {
        let mut out = b"FG".to_vec();
        out.extend_from_slice(&3u16.to_le_bytes());
        out.extend_from_slice(&0x17u32.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        for word in SYSTEM_KEY {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out.extend_from_slice(tail);
        out
    }

    fn empty_tail() -> Vec<u8> {
        // methods, variables, constants, bindings, code
        [0u32; 5].iter().flat_map(|n| n.to_le_bytes()).collect()
    }

    #[test]
    fn test_empty_program() {
        let program = load(&image(&empty_tail())).unwrap();
        assert_eq!(program.format_major(), 3);
        assert_eq!(program.extra(), 0x17);
        assert_eq!(program.classes()[0].name, "System");
        assert_eq!(program.classes()[0].key, "d6f50f6449b793fa66baf193983eaeef");
        assert!(program.code().is_empty());
        assert_eq!(program.system_variable(), None);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = image(&empty_tail());
        bytes[0] = b'X';
        assert_eq!(
            load(&bytes).unwrap_err().malformed(),
            Some(&Malformed::BadMagic([b'X', b'G']))
        );
    }

    #[test]
    fn test_version_range() {
        let mut bytes = image(&empty_tail());
        bytes[2] = 9;
        assert_matches!(
            load(&bytes).unwrap_err().malformed(),
            Some(Malformed::UnsupportedVersion(9))
        );
        bytes[2] = 4;
        bytes[3] = 0x7f;
        assert!(load(&bytes).is_ok());
    }

    #[test]
    fn test_unknown_class() {
        let mut bytes = image(&empty_tail());
        bytes[12] ^= 0xff;
        assert_matches!(load(&bytes), Err(LoadError::UnknownClass { .. }));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut tail = empty_tail();
        tail.push(0);
        assert_eq!(
            load(&image(&tail)).unwrap_err().malformed(),
            Some(&Malformed::TrailingBytes(1))
        );
    }

    #[test]
    fn test_truncated_section() {
        let tail = empty_tail();
        assert_matches!(
            load(&image(&tail[..6])).unwrap_err().malformed(),
            Some(Malformed::Truncated("variables"))
        );
    }

    #[test]
    fn test_stack_protection_marker_is_skipped() {
        let mut tail = Vec::new();
        // System.getTimeOfDay, no arguments
        tail.extend_from_slice(&1u32.to_le_bytes());
        tail.extend_from_slice(&0u16.to_le_bytes());
        tail.extend_from_slice(&0u16.to_le_bytes());
        let name = b"getTimeOfDay";
        tail.extend_from_slice(&(name.len() as u16).to_le_bytes());
        tail.extend_from_slice(name);
        // one System variable
        tail.extend_from_slice(&1u32.to_le_bytes());
        tail.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1]);
        tail.extend_from_slice(&0u32.to_le_bytes());
        tail.extend_from_slice(&0u32.to_le_bytes());
        let code = [1, 0, 0, 0, 0, 24, 0, 0, 0, 0, 0, 0, 0xff, 0xff, 33];
        tail.extend_from_slice(&(code.len() as u32).to_le_bytes());
        tail.extend_from_slice(&code);

        let program = load(&image(&tail)).unwrap();
        let ops: Vec<_> = program.code().iter().map(|i| i.op).collect();
        assert_eq!(ops, [Opcode::Push, Opcode::Call, Opcode::Return]);
        assert_eq!(program.code()[2].offset, 14);
        assert_eq!(program.system_variable(), Some(0));
    }
}
