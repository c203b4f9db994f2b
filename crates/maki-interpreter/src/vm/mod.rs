// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The stack machine that runs a loaded program against an object model.
//!
//! ## Structure
//!
//! - `interpreter` - The VM: event delivery, dispatch and the execution loop
//! - `frame` - Call frames and operand stack slots
//! - `ops` - Operator semantics on [`Value`](crate::runtime::Value)s

mod frame;
mod interpreter;
mod ops;

use serde::{Deserialize, Serialize};

pub use interpreter::Vm;

/// Execution limits and compatibility switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmOptions {
    /// Deepest nesting of script functions and handlers.
    pub max_call_depth: usize,
    /// Instructions one event delivery may execute.
    pub instruction_budget: u64,
    /// Conditions accept any value (zero, empty and null are false)
    /// instead of requiring a boolean.
    pub loose_truthiness: bool,
}

impl Default for VmOptions {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
            instruction_budget: 10_000_000,
            loose_truthiness: true,
        }
    }
}
