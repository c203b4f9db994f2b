// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The compiled program format.
//!
//! ## Structure
//!
//! - `opcode` - The instruction set and operand encodings
//! - `reader` - Little-endian field reader with truncation reporting
//! - `loader` - Validating single-pass decoder
//! - `program` - The decoded, index-checked program
//! - `assembler` - Writer for the same format, used by tests and tools

mod assembler;
mod loader;
mod opcode;
mod program;
mod reader;

pub use assembler::{Assembler, Label};
pub use loader::{MAGIC, STACK_PROTECTION, SUPPORTED_MAJORS, load, load_with};
pub use opcode::{Opcode, OperandKind};
pub use program::{Binding, ClassRef, Instruction, MethodRef, Operand, Program, Variable};
