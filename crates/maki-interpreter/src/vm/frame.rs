// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

use crate::runtime::Value;

/// An operand stack entry.
///
/// `push` places a reference to a variable, not its value; the value is read
/// when the entry is consumed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    Variable(usize),
    Value(Value),
}

/// One activation of a script function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    /// Instruction to resume in the caller; `None` returns to the host.
    pub return_to: Option<usize>,
    /// Lowest stack height this activation has seen. Handlers pop their
    /// arguments from below the height they were entered at.
    pub base: usize,
}

impl Frame {
    pub(crate) fn new(return_to: Option<usize>, base: usize) -> Self {
        Self { return_to, base }
    }
}
