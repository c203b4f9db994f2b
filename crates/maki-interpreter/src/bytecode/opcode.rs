// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The instruction set.

use maki_macros::int_enum;

int_enum! {
    /// One-byte opcodes of the compiled format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Opcode: u8 {
        /// Push a variable reference.
        Push = 1,
        /// Discard the top of the stack.
        Pop = 2,
        /// Pop a value into a variable.
        PopTo = 3,
        /// Equality.
        Eq = 8,
        /// Inequality.
        Ne = 9,
        /// Greater than.
        Gt = 10,
        /// Greater or equal.
        Ge = 11,
        /// Less than.
        Lt = 12,
        /// Less or equal.
        Le = 13,
        /// Pop a condition and jump when it is false.
        JumpIfFalse = 16,
        /// Pop a condition and jump when it is true.
        JumpIfTrue = 17,
        /// Unconditional jump.
        Jump = 18,
        /// Call a method on a popped receiver.
        Call = 24,
        /// Call a script function.
        CallGlobal = 25,
        /// Return the top of the stack to the caller.
        Return = 33,
        /// Block marker.
        Nop = 40,
        /// Pop a value and a variable, assign, push the value back.
        Mov = 48,
        /// `v++`
        PostInc = 56,
        /// `v--`
        PostDec = 57,
        /// `++v`
        PreInc = 58,
        /// `--v`
        PreDec = 59,
        /// Addition, or concatenation for strings.
        Add = 64,
        /// Subtraction.
        Sub = 65,
        /// Multiplication.
        Mul = 66,
        /// Division.
        Div = 67,
        /// Remainder.
        Mod = 68,
        /// Bitwise and.
        BitAnd = 72,
        /// Bitwise or.
        BitOr = 73,
        /// Logical not.
        Not = 74,
        /// Arithmetic negation.
        Negate = 76,
        /// Logical and; both operands are already evaluated.
        LogAnd = 80,
        /// Logical or; both operands are already evaluated.
        LogOr = 81,
        /// Shift left.
        Shl = 88,
        /// Arithmetic shift right.
        Shr = 89,
        /// Instantiate a class-table entry.
        New = 96,
        /// Destroy the popped instance.
        Delete = 97,
        /// `Call` with an explicit argument count byte.
        CallStrict = 112,
    }
}

/// What follows an opcode byte in the code section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Nothing.
    None,
    /// u32 variable index.
    Variable,
    /// i32 offset relative to the end of the operand.
    Relative,
    /// u32 method index.
    Method,
    /// u32 method index followed by a u8 argument count.
    MethodArgc,
    /// u32 class-table index.
    Class,
}

impl OperandKind {
    /// Encoded size in bytes.
    pub fn width(self) -> usize {
        match self {
            OperandKind::None => 0,
            OperandKind::MethodArgc => 5,
            _ => 4,
        }
    }
}

impl Opcode {
    /// Operand encoding of this opcode.
    pub fn operand(self) -> OperandKind {
        match self {
            Opcode::Push | Opcode::PopTo => OperandKind::Variable,
            Opcode::JumpIfFalse | Opcode::JumpIfTrue | Opcode::Jump | Opcode::CallGlobal => {
                OperandKind::Relative
            }
            Opcode::Call => OperandKind::Method,
            Opcode::CallStrict => OperandKind::MethodArgc,
            Opcode::New => OperandKind::Class,
            _ => OperandKind::None,
        }
    }

    /// Whether a stack-protection marker may follow this instruction.
    pub fn is_call(self) -> bool {
        matches!(self, Opcode::Call | Opcode::CallStrict)
    }

    /// Disassembler name.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Push => "push",
            Opcode::Pop => "pop",
            Opcode::PopTo => "popto",
            Opcode::Eq => "eq",
            Opcode::Ne => "ne",
            Opcode::Gt => "gt",
            Opcode::Ge => "ge",
            Opcode::Lt => "lt",
            Opcode::Le => "le",
            Opcode::JumpIfFalse => "jumpiffalse",
            Opcode::JumpIfTrue => "jumpiftrue",
            Opcode::Jump => "jump",
            Opcode::Call => "call",
            Opcode::CallGlobal => "callglobal",
            Opcode::Return => "ret",
            Opcode::Nop => "nop",
            Opcode::Mov => "mov",
            Opcode::PostInc => "postinc",
            Opcode::PostDec => "postdec",
            Opcode::PreInc => "preinc",
            Opcode::PreDec => "predec",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Mod => "mod",
            Opcode::BitAnd => "and",
            Opcode::BitOr => "or",
            Opcode::Not => "not",
            Opcode::Negate => "neg",
            Opcode::LogAnd => "land",
            Opcode::LogOr => "lor",
            Opcode::Shl => "shl",
            Opcode::Shr => "shr",
            Opcode::New => "new",
            Opcode::Delete => "delete",
            Opcode::CallStrict => "strictcall",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
