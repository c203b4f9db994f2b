// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The bytecode interpreter.

use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

use super::VmOptions;
use super::frame::{Frame, Slot};
use super::ops;
use crate::bytecode::{Opcode, Operand, Program};
use crate::error::{ExecutionFault, ObjectError};
use crate::host::HostBridge;
use crate::natives;
use crate::runtime::{ObjectModel, ObjectRef, Value};

/// Events one drain may deliver before the rest is left for the next one.
const MAX_CASCADE: usize = 65_536;

/// How a `return` left the current activation.
enum Unwind {
    /// Continue in the caller at this instruction.
    Resume(usize),
    /// The outermost activation of this `execute` finished.
    Finished(Value),
}

/// A loaded program bound to its object model.
///
/// The VM is driven from outside: [`start`](Self::start) once, then
/// [`deliver_event`](Self::deliver_event) and [`tick`](Self::tick) as the
/// host sees fit, and [`unload`](Self::unload) at the end. Every entry point
/// runs to completion before returning; events raised along the way are
/// queued and delivered afterwards, in order.
pub struct Vm {
    program: Arc<Program>,
    model: ObjectModel,
    options: VmOptions,
    variables: Vec<Value>,
    stack: Vec<Slot>,
    frames: Vec<Frame>,
    executed: u64,
}

impl std::fmt::Debug for Vm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vm")
            .field("variables", &self.variables.len())
            .field("stack", &self.stack.len())
            .field("frames", &self.frames.len())
            .field("model", &self.model)
            .finish()
    }
}

impl Vm {
    /// Binds `program` to `model`. The program's System variable receives
    /// the model's System singleton.
    pub fn new(program: impl Into<Arc<Program>>, model: ObjectModel, options: VmOptions) -> Self {
        let program = program.into();
        let variables = program
            .variables()
            .iter()
            .map(|v| v.initial.clone())
            .collect();
        let mut vm = Self {
            program,
            model,
            options,
            variables,
            stack: Vec::new(),
            frames: Vec::new(),
            executed: 0,
        };
        vm.system();
        vm
    }

    /// The loaded program.
    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    /// The object model.
    pub fn model(&self) -> &ObjectModel {
        &self.model
    }

    /// Mutable access to the object model, for hosts binding elements.
    pub fn model_mut(&mut self) -> &mut ObjectModel {
        &mut self.model
    }

    /// Active options.
    pub fn options(&self) -> &VmOptions {
        &self.options
    }

    /// Current variable values.
    pub fn variables(&self) -> &[Value] {
        &self.variables
    }

    /// Current value of one variable.
    pub fn variable(&self, index: usize) -> Option<&Value> {
        self.variables.get(index)
    }

    /// Overwrites a variable, converting numbers to its declared type.
    /// Returns the previous value, or `None` if there is no such variable.
    pub fn set_variable(&mut self, index: usize, value: Value) -> Option<Value> {
        let ty = self.program.variables().get(index)?.ty;
        let slot = self.variables.get_mut(index)?;
        Some(std::mem::replace(slot, value.coerce(Some(ty))))
    }

    /// Operand stack height; zero between deliveries.
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Active call frames; zero between deliveries.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The System singleton, created on demand and kept in the System variable.
    pub fn system(&mut self) -> ObjectRef {
        let system = self.model.system();
        if let Some(index) = self.program.system_variable() {
            if let Some(slot) = self.variables.get_mut(index) {
                *slot = Value::Object(system);
            }
        }
        system
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Delivers `System.onScriptLoaded`.
    pub fn start(&mut self, host: &mut dyn HostBridge) -> Result<(), ExecutionFault> {
        info!(
            bindings = self.program.bindings().len(),
            variables = self.variables.len(),
            "script starting"
        );
        let system = self.system();
        self.deliver_event(host, system, "onScriptLoaded", &[])
            .map(drop)
    }

    /// Delivers `System.onScriptUnloading`, then destroys every instance.
    ///
    /// Instances are destroyed even when the handler faults.
    pub fn unload(&mut self, host: &mut dyn HostBridge) -> Result<(), ExecutionFault> {
        let system = self.system();
        let outcome = self.deliver_event(host, system, "onScriptUnloading", &[]);

        let destroyed = self.model.len();
        self.model.clear();
        let program = Arc::clone(&self.program);
        for (slot, variable) in self.variables.iter_mut().zip(program.variables()) {
            if variable.class.is_some() {
                *slot = Value::Null;
            }
        }
        info!(destroyed, "script unloaded");
        outcome.map(drop)
    }

    // ========================================================================
    // Host entry points
    // ========================================================================

    /// Delivers an event to `target`, then everything it queued.
    ///
    /// Script handlers bound to the event replace the native default; without
    /// any, the native hook runs. A fault aborts the delivery it happened in;
    /// queued events are still delivered, and the first fault is returned.
    pub fn deliver_event(
        &mut self,
        host: &mut dyn HostBridge,
        target: ObjectRef,
        name: &str,
        args: &[Value],
    ) -> Result<Value, ExecutionFault> {
        let result = self.deliver(host, target, name, args);
        let drained = self.drain(host);
        let value = result?;
        drained?;
        Ok(value)
    }

    /// Delivers an event to whatever object a variable holds. Does nothing
    /// when the variable holds no object.
    pub fn deliver_to_variable(
        &mut self,
        host: &mut dyn HostBridge,
        variable: usize,
        name: &str,
        args: &[Value],
    ) -> Result<Value, ExecutionFault> {
        match self.variables.get(variable).and_then(Value::as_object) {
            Some(target) => self.deliver_event(host, target, name, args),
            None => {
                debug!(variable, event = name, "variable holds no object");
                Ok(Value::Void)
            }
        }
    }

    /// Advances time: fires due timers, completes finished target
    /// animations, then drains the queue.
    pub fn tick(&mut self, host: &mut dyn HostBridge, now_ms: u64) -> Result<(), ExecutionFault> {
        for timer in self.model.due_timers(now_ms) {
            self.model.emit(timer, "onTimer", Vec::new());
        }
        natives::gui::complete_targets(&mut self.model, host, now_ms);
        self.drain(host)
    }

    /// Runs the script function starting at instruction `entry` with `args`
    /// and returns its result.
    pub fn call_function(
        &mut self,
        host: &mut dyn HostBridge,
        entry: usize,
        args: &[Value],
    ) -> Result<Value, ExecutionFault> {
        self.executed = 0;
        let result = self.run_handlers(host, &[entry], args);
        if let Err(fault) = &result {
            self.abort(fault);
        }
        result
    }

    /// Entry instructions of the handlers bound to `name` on `target`, in
    /// binding order.
    pub fn handlers_for(&self, target: ObjectRef, name: &str) -> Vec<usize> {
        let program = &self.program;
        program
            .bindings()
            .iter()
            .filter(|b| {
                self.variables.get(b.variable) == Some(&Value::Object(target))
                    && program.methods()[b.method].name.eq_ignore_ascii_case(name)
            })
            .map(|b| b.entry)
            .collect()
    }

    fn deliver(
        &mut self,
        host: &mut dyn HostBridge,
        target: ObjectRef,
        name: &str,
        args: &[Value],
    ) -> Result<Value, ExecutionFault> {
        self.executed = 0;
        let handlers = self.handlers_for(target, name);
        debug!(%target, event = name, handlers = handlers.len(), "delivering event");

        let result = if handlers.is_empty() {
            self.model
                .invoke(host, target, name, args)
                .map_err(|source| ExecutionFault::CallFailed { offset: 0, source })
        } else {
            self.run_handlers(host, &handlers, args)
        };
        if let Err(fault) = &result {
            self.abort(fault);
        }
        result
    }

    fn drain(&mut self, host: &mut dyn HostBridge) -> Result<(), ExecutionFault> {
        let mut first = None;
        for _ in 0..MAX_CASCADE {
            let Some(event) = self.model.take_pending() else {
                return first.map_or(Ok(()), Err);
            };
            if let Err(fault) = self.deliver(host, event.target, &event.name, &event.args) {
                first.get_or_insert(fault);
            }
        }
        warn!(
            pending = self.model.pending_len(),
            "event cascade limit reached, deferring the rest"
        );
        first.map_or(Ok(()), Err)
    }

    fn abort(&mut self, fault: &ExecutionFault) {
        error!(%fault, depth = self.frames.len(), "script fault, delivery aborted");
        self.stack.clear();
        self.frames.clear();
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Runs each handler with its own copy of the arguments; the last
    /// handler's result is returned.
    fn run_handlers(
        &mut self,
        host: &mut dyn HostBridge,
        entries: &[usize],
        args: &[Value],
    ) -> Result<Value, ExecutionFault> {
        let mut result = Value::Void;
        for &entry in entries {
            let floor = self.stack.len();
            self.stack
                .extend(args.iter().rev().cloned().map(Slot::Value));
            result = self.execute(host, entry)?;
            self.stack.truncate(floor);
        }
        Ok(result)
    }

    fn enter(&mut self, return_to: Option<usize>) -> Result<(), ExecutionFault> {
        let limit = self.options.max_call_depth;
        if self.frames.len() >= limit {
            return Err(ExecutionFault::CallDepthExceeded { limit });
        }
        self.frames.push(Frame::new(return_to, self.stack.len()));
        Ok(())
    }

    fn leave(&mut self, value: Value) -> Unwind {
        let Some(frame) = self.frames.pop() else {
            return Unwind::Finished(value);
        };
        self.stack.truncate(frame.base.min(self.stack.len()));
        match frame.return_to {
            Some(ip) => {
                self.stack.push(Slot::Value(value));
                Unwind::Resume(ip)
            }
            None => Unwind::Finished(value),
        }
    }

    fn execute(&mut self, host: &mut dyn HostBridge, entry: usize) -> Result<Value, ExecutionFault> {
        let program = Arc::clone(&self.program);
        let code = program.code();
        let budget = self.options.instruction_budget;
        let loose = self.options.loose_truthiness;

        self.enter(None)?;
        let mut ip = entry;
        loop {
            let Some(&insn) = code.get(ip) else {
                // Running off the end of the code returns void.
                match self.leave(Value::Void) {
                    Unwind::Resume(next) => {
                        ip = next;
                        continue;
                    }
                    Unwind::Finished(value) => return Ok(value),
                }
            };

            self.executed += 1;
            if self.executed > budget {
                return Err(ExecutionFault::BudgetExhausted { budget });
            }
            let offset = insn.offset;
            trace!(
                offset,
                op = %insn.op,
                depth = self.frames.len(),
                stack = self.stack.len(),
                "exec"
            );
            ip += 1;

            match (insn.op, insn.operand) {
                (Opcode::Push, Some(Operand::Variable(v))) => {
                    self.stack.push(Slot::Variable(v));
                }
                (Opcode::Pop, _) => {
                    self.pop(offset)?;
                }
                (Opcode::PopTo, Some(Operand::Variable(v))) => {
                    let value = self.pop_value(offset)?;
                    self.assign(v, value);
                }
                (
                    op @ (Opcode::Eq
                    | Opcode::Ne
                    | Opcode::Gt
                    | Opcode::Ge
                    | Opcode::Lt
                    | Opcode::Le),
                    _,
                ) => {
                    let b = self.pop_value(offset)?;
                    let a = self.pop_value(offset)?;
                    let result = ops::compare(op, &a, &b).map_err(|f| f.at(offset))?;
                    self.stack.push(Slot::Value(Value::Boolean(result)));
                }
                (op @ (Opcode::JumpIfFalse | Opcode::JumpIfTrue), Some(Operand::Target(t))) => {
                    let condition = self.pop_value(offset)?;
                    let truth = ops::truthy(&condition, loose).map_err(|f| f.at(offset))?;
                    if truth == (op == Opcode::JumpIfTrue) {
                        ip = t;
                    }
                }
                (Opcode::Jump, Some(Operand::Target(t))) => {
                    ip = t;
                }
                (Opcode::Call | Opcode::CallStrict, Some(Operand::Call { method, argc })) => {
                    let mut args = Vec::with_capacity(argc);
                    for _ in 0..argc {
                        args.push(self.pop_value(offset)?);
                    }
                    let receiver = self.pop_value(offset)?;
                    let result = self.call_method(host, &program, offset, receiver, method, args)?;
                    self.stack.push(Slot::Value(result));
                }
                (Opcode::CallGlobal, Some(Operand::Target(t))) => {
                    self.enter(Some(ip))?;
                    ip = t;
                }
                (Opcode::Return, _) => {
                    let base = self.frames.last().map_or(0, |f| f.base);
                    let value = if self.stack.len() > base {
                        self.pop_value(offset)?
                    } else {
                        Value::Void
                    };
                    match self.leave(value) {
                        Unwind::Resume(next) => ip = next,
                        Unwind::Finished(value) => return Ok(value),
                    }
                }
                (Opcode::Nop, _) => {}
                (Opcode::Mov, _) => {
                    let value = self.pop_value(offset)?;
                    let target = self.pop_variable(offset)?;
                    self.assign(target, value);
                    let stored = self.read(Slot::Variable(target));
                    self.stack.push(Slot::Value(stored));
                }
                (
                    op @ (Opcode::PostInc | Opcode::PostDec | Opcode::PreInc | Opcode::PreDec),
                    _,
                ) => {
                    let target = self.pop_variable(offset)?;
                    let old = self.read(Slot::Variable(target));
                    let delta = if matches!(op, Opcode::PostInc | Opcode::PreInc) {
                        1
                    } else {
                        -1
                    };
                    let new = ops::step(&old, delta).map_err(|f| f.at(offset))?;
                    self.assign(target, new);
                    let pushed = if matches!(op, Opcode::PostInc | Opcode::PostDec) {
                        old
                    } else {
                        self.read(Slot::Variable(target))
                    };
                    self.stack.push(Slot::Value(pushed));
                }
                (
                    op @ (Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod),
                    _,
                ) => {
                    let b = self.pop_value(offset)?;
                    let a = self.pop_value(offset)?;
                    let result = ops::arithmetic(op, &a, &b).map_err(|f| f.at(offset))?;
                    self.stack.push(Slot::Value(result));
                }
                (op @ (Opcode::BitAnd | Opcode::BitOr | Opcode::Shl | Opcode::Shr), _) => {
                    let b = self.pop_value(offset)?;
                    let a = self.pop_value(offset)?;
                    let result = ops::bitwise(op, &a, &b).map_err(|f| f.at(offset))?;
                    self.stack.push(Slot::Value(result));
                }
                (Opcode::Not, _) => {
                    let value = self.pop_value(offset)?;
                    let truth = ops::truthy(&value, loose).map_err(|f| f.at(offset))?;
                    self.stack.push(Slot::Value(Value::Boolean(!truth)));
                }
                (Opcode::Negate, _) => {
                    let value = self.pop_value(offset)?;
                    let result = ops::negate(&value).map_err(|f| f.at(offset))?;
                    self.stack.push(Slot::Value(result));
                }
                (op @ (Opcode::LogAnd | Opcode::LogOr), _) => {
                    let b = self.pop_value(offset)?;
                    let a = self.pop_value(offset)?;
                    let a = ops::truthy(&a, loose).map_err(|f| f.at(offset))?;
                    let b = ops::truthy(&b, loose).map_err(|f| f.at(offset))?;
                    let result = if op == Opcode::LogAnd { a && b } else { a || b };
                    self.stack.push(Slot::Value(Value::Boolean(result)));
                }
                (Opcode::New, Some(Operand::Class(c))) => {
                    let class = program.classes()[c].id;
                    let instance = self.model.create_instance(class);
                    self.stack.push(Slot::Value(Value::Object(instance)));
                }
                (Opcode::Delete, _) => {
                    let value = self.pop_value(offset)?;
                    if let Value::Object(r) = value {
                        self.delete(host, r);
                    }
                    self.stack.push(Slot::Value(Value::Void));
                }
                (op, _) => {
                    return Err(ExecutionFault::TypeMismatch {
                        offset,
                        expected: "operand",
                        found: op.mnemonic(),
                    });
                }
            }
        }
    }

    /// Dispatches a method call: script overrides of hooks first, then the
    /// object model. Undefined methods and dead receivers yield the declared
    /// default.
    fn call_method(
        &mut self,
        host: &mut dyn HostBridge,
        program: &Program,
        offset: u32,
        receiver: Value,
        method: usize,
        args: Vec<Value>,
    ) -> Result<Value, ExecutionFault> {
        let method = &program.methods()[method];
        let target = match receiver {
            Value::Object(r) => r,
            Value::Null | Value::Void => {
                debug!(offset, method = %method.name, "call on null");
                return Ok(Value::default_for(method.returns()));
            }
            other => {
                return Err(ExecutionFault::TypeMismatch {
                    offset,
                    expected: "object",
                    found: other.type_name(),
                });
            }
        };

        if method.is_hook() {
            let handlers = self.handlers_for(target, &method.name);
            if !handlers.is_empty() {
                return self.run_handlers(host, &handlers, &args);
            }
        }

        match self.model.try_invoke(host, target, &method.name, &args) {
            Ok(value) => Ok(value),
            Err(e @ (ObjectError::UndefinedMethod { .. } | ObjectError::DeadInstance)) => {
                debug!(offset, %target, method = %method.name, error = %e, "call ignored");
                Ok(Value::default_for(method.returns()))
            }
            Err(source) => Err(ExecutionFault::CallFailed { offset, source }),
        }
    }

    fn delete(&mut self, host: &mut dyn HostBridge, r: ObjectRef) {
        let Some(instance) = self.model.destroy(r) else {
            return;
        };
        if let Some(element) = instance.element() {
            if let Err(err) = host.destroy(element) {
                debug!(%err, "host refused to destroy element");
            }
        }
    }

    // ========================================================================
    // Stack
    // ========================================================================

    fn pop(&mut self, offset: u32) -> Result<Slot, ExecutionFault> {
        let slot = self
            .stack
            .pop()
            .ok_or(ExecutionFault::StackUnderflow { offset })?;
        if let Some(frame) = self.frames.last_mut() {
            frame.base = frame.base.min(self.stack.len());
        }
        Ok(slot)
    }

    fn pop_value(&mut self, offset: u32) -> Result<Value, ExecutionFault> {
        let slot = self.pop(offset)?;
        Ok(self.read(slot))
    }

    fn pop_variable(&mut self, offset: u32) -> Result<usize, ExecutionFault> {
        match self.pop(offset)? {
            Slot::Variable(v) => Ok(v),
            Slot::Value(value) => Err(ExecutionFault::TypeMismatch {
                offset,
                expected: "variable",
                found: value.type_name(),
            }),
        }
    }

    fn read(&self, slot: Slot) -> Value {
        match slot {
            Slot::Variable(v) => self.variables.get(v).cloned().unwrap_or(Value::Void),
            Slot::Value(value) => value,
        }
    }

    fn assign(&mut self, variable: usize, value: Value) {
        let ty = self.program.variables().get(variable).map(|v| v.ty);
        if let Some(slot) = self.variables.get_mut(variable) {
            *slot = value.coerce(ty);
        }
    }
}
