// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the MAKI interpreter.
//!
//! Each layer has its own enum; [`Error`] wraps all of them for callers that
//! only want a single result type.

use thiserror::Error;

/// Class registry lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The key or name is not part of the catalog.
    #[error("unknown class '{0}'")]
    UnknownClass(String),
}

/// Structural problems found while decoding a binary program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformed {
    /// The file does not start with `FG`.
    #[error("bad magic {0:02x?}")]
    BadMagic([u8; 2]),

    /// The format major version is not one this loader understands.
    #[error("unsupported format version {0:#06x}")]
    UnsupportedVersion(u16),

    /// A section ended before all of its records were read.
    #[error("truncated {0} section")]
    Truncated(&'static str),

    /// A section declares more records than the loader accepts.
    #[error("{section} count {count} exceeds limit {limit}")]
    CountLimit {
        /// Section name.
        section: &'static str,
        /// Declared record count.
        count: u32,
        /// Accepted maximum.
        limit: u32,
    },

    /// Class-table index out of range.
    #[error("class index {0} out of range")]
    ClassIndex(u32),

    /// Variable-table index out of range.
    #[error("variable index {0} out of range")]
    VariableIndex(u32),

    /// Method-table index out of range.
    #[error("method index {0} out of range")]
    MethodIndex(u32),

    /// Variable declared with a primitive type code the format does not define.
    #[error("unknown primitive type {0}")]
    PrimitiveType(u8),

    /// Opcode byte outside the instruction set.
    #[error("unknown opcode {0}")]
    Opcode(u8),

    /// A jump, call or binding points outside the code or into an operand.
    #[error("code offset {0} is not an instruction boundary")]
    CodeOffset(i64),

    /// A call site passes a different argument count than the catalog declares.
    #[error("call to {method} passes {given} arguments, catalog declares {declared}")]
    Arity {
        /// Qualified method name.
        method: String,
        /// Count carried by the call site.
        given: u8,
        /// Count declared by the catalog.
        declared: usize,
    },

    /// Bytes left over after the code section.
    #[error("{0} trailing bytes")]
    TrailingBytes(usize),
}

/// Failures of [`crate::load`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The bytes are not a well-formed program.
    #[error("malformed program at byte {offset}: {reason}")]
    MalformedProgram {
        /// Byte offset where decoding stopped.
        offset: usize,
        /// What was wrong.
        reason: Malformed,
    },

    /// The class table names a class the registry does not know.
    #[error("program references unknown class '{key}'")]
    UnknownClass {
        /// The 32-character class key.
        key: String,
    },
}

impl LoadError {
    /// Returns the malformation reason, if this is a structural failure.
    pub fn malformed(&self) -> Option<&Malformed> {
        match self {
            LoadError::MalformedProgram { reason, .. } => Some(reason),
            LoadError::UnknownClass { .. } => None,
        }
    }
}

/// Mismatches between the native method tables and the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A declared function has no native implementation.
    #[error("{class}.{method} is declared but not implemented")]
    MissingMethod {
        /// Class name.
        class: String,
        /// Lowercase method name.
        method: String,
    },

    /// A native implementation has no catalog declaration.
    #[error("{class}.{method} is implemented but not declared")]
    UndeclaredMethod {
        /// Class name.
        class: String,
        /// Lowercase method name.
        method: String,
    },

    /// A class in the native tables is not in the catalog.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Call-time failures of the object model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    /// No class in the receiver's ancestor chain defines the method.
    #[error("{class}.{method} is not defined")]
    UndefinedMethod {
        /// Receiver class name.
        class: String,
        /// Requested method name.
        method: String,
    },

    /// A strict native rejected the shape of its arguments.
    #[error("{method}: {reason}")]
    ArgumentMismatch {
        /// Qualified method name.
        method: String,
        /// What was wrong.
        reason: String,
    },

    /// The receiver was destroyed.
    #[error("instance is no longer alive")]
    DeadInstance,

    /// Instantiating an uncatalogued class.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Faults that abort the current event delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionFault {
    /// An instruction needed more operands than the stack held.
    #[error("stack underflow at code offset {offset}")]
    StackUnderflow {
        /// Code offset of the faulting instruction.
        offset: u32,
    },

    /// An operand had the wrong kind of value.
    #[error("type mismatch at code offset {offset}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Code offset of the faulting instruction.
        offset: u32,
        /// What the instruction needed.
        expected: &'static str,
        /// What it got.
        found: &'static str,
    },

    /// A strict native rejected its arguments.
    #[error("call at code offset {offset} failed: {source}")]
    CallFailed {
        /// Code offset of the call.
        offset: u32,
        /// The rejected call.
        source: ObjectError,
    },

    /// Integer division or modulo by zero.
    #[error("division by zero at code offset {offset}")]
    DivisionByZero {
        /// Code offset of the faulting instruction.
        offset: u32,
    },

    /// Script functions nested deeper than the configured limit.
    #[error("call depth exceeded {limit}")]
    CallDepthExceeded {
        /// Configured limit.
        limit: usize,
    },

    /// The delivery executed more instructions than the configured budget.
    #[error("instruction budget of {budget} exhausted")]
    BudgetExhausted {
        /// Configured budget.
        budget: u64,
    },
}

/// Any interpreter error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Load failure.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Native table validation failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Object model failure.
    #[error(transparent)]
    Object(#[from] ObjectError),

    /// Execution fault.
    #[error(transparent)]
    Execution(#[from] ExecutionFault),
}

/// Result alias used across the crate's public API.
pub type Result<T> = std::result::Result<T, Error>;
