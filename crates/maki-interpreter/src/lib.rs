// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # maki-interpreter
//!
//! An interpreter for compiled MAKI skin scripts.
//!
//! ## Overview
//!
//! This crate reads the binary programs the skin compiler produces and runs
//! them against a faithful model of the skinning engine's class library:
//! - Class registry: the static catalog of classes and their signatures
//! - Object model: runtime classes, instances and the native methods
//! - Bytecode loader: a validating decoder for the program format
//! - VM: a single-threaded stack machine driven by host events
//!
//! Everything that would touch a real user interface goes through the
//! [`HostBridge`] trait instead.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use maki_interpreter::{NullHost, VmOptions, instantiate};
//!
//! let bytes = std::fs::read("skin/scripts/main.maki")?;
//! let mut vm = instantiate(&bytes, VmOptions::default(), None)?;
//! let mut host = NullHost;
//! vm.start(&mut host)?;
//! vm.tick(&mut host, 16)?;
//! vm.unload(&mut host)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bytecode;
pub mod error;
pub mod host;
pub mod natives;
pub mod registry;
pub mod runtime;
pub mod vm;

// Re-exports for convenience
pub use bytecode::{Program, load};
pub use error::{Error, ExecutionFault, LoadError, Result};
pub use host::{ElementId, ElementInfo, HostBridge, HostError, NullHost};
pub use registry::{ClassDescriptor, ClassRegistry};
pub use runtime::{ClassTable, ObjectModel, ObjectRef, Value};
pub use vm::{Vm, VmOptions};

/// Loads `bytes` and binds the program to a fresh object model over the
/// standard class table. `seed` fixes the `System.random` sequence.
pub fn instantiate(bytes: &[u8], options: VmOptions, seed: Option<u64>) -> Result<Vm> {
    let program = load(bytes)?;
    let model = ObjectModel::with_seed(ClassTable::standard()?, seed);
    Ok(Vm::new(program, model, options))
}
