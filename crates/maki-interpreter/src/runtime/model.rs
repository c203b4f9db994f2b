// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The object model: live instances, method dispatch and the event queue.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::class::{ClassTable, Method};
use super::heap::{Arena, ObjectRef};
use super::instance::{Instance, NativeState};
use super::value::Value;
use crate::error::{CatalogError, ObjectError, RegistryError};
use crate::host::{ElementId, ElementInfo, HostBridge};
use crate::natives::{NativeCall, NativeMethod};
use crate::registry::{ClassId, ValueType};

/// Class used for host elements whose class name the catalog does not know.
const FALLBACK_CLASS: &str = "GuiObject";

/// An event raised by a native, waiting for the current delivery to finish.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvent {
    /// Receiver.
    pub target: ObjectRef,
    /// Hook name.
    pub name: String,
    /// Arguments in declaration order.
    pub args: Vec<Value>,
}

/// Every live instance of one program, plus the state natives share.
pub struct ObjectModel {
    classes: Arc<ClassTable>,
    heap: Arena<Instance>,
    elements: FxHashMap<ElementId, ObjectRef>,
    pending: VecDeque<PendingEvent>,
    system: Option<ObjectRef>,
    rng: StdRng,
    next_serial: u64,
    clock_ms: u64,
}

impl std::fmt::Debug for ObjectModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectModel")
            .field("instances", &self.heap.len())
            .field("elements", &self.elements.len())
            .field("pending", &self.pending.len())
            .field("clock_ms", &self.clock_ms)
            .finish()
    }
}

impl ObjectModel {
    /// Creates an empty model over `classes`.
    pub fn new(classes: Arc<ClassTable>) -> Self {
        Self::with_seed(classes, None)
    }

    /// Creates an empty model whose `System.random` sequence is fixed by `seed`.
    pub fn with_seed(classes: Arc<ClassTable>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            classes,
            heap: Arena::new(),
            elements: FxHashMap::default(),
            pending: VecDeque::new(),
            system: None,
            rng,
            next_serial: 0,
            clock_ms: 0,
        }
    }

    /// A model over the standard class table.
    pub fn standard() -> Result<Self, CatalogError> {
        Ok(Self::new(ClassTable::standard()?))
    }

    /// The class table.
    pub fn classes(&self) -> &Arc<ClassTable> {
        &self.classes
    }

    // ========================================================================
    // Instances
    // ========================================================================

    /// Creates an instance of `class` not bound to any host element.
    pub fn create_instance(&mut self, class: ClassId) -> ObjectRef {
        self.allocate(class, None)
    }

    /// Creates an instance of the class with the given key.
    pub fn create_instance_by_key(&mut self, key: &str) -> Result<ObjectRef, ObjectError> {
        let class = self.classes.by_key(key)?;
        Ok(self.create_instance(class))
    }

    /// Creates an instance of the class with the given name.
    pub fn create_instance_by_name(&mut self, name: &str) -> Result<ObjectRef, ObjectError> {
        let class = self
            .classes
            .by_name(name)
            .ok_or_else(|| RegistryError::UnknownClass(name.to_string()))?;
        Ok(self.create_instance(class))
    }

    fn allocate(&mut self, class: ClassId, element: Option<ElementId>) -> ObjectRef {
        let state = NativeState::for_class(self.classes.registry(), class);
        let serial = self.next_serial;
        self.next_serial += 1;
        let r = self.heap.insert(Instance::new(class, element, serial, state));
        if let Some(element) = element {
            self.elements.insert(element, r);
        }
        trace!(
            instance = %r,
            class = self.classes.get(class).name(),
            "created instance"
        );
        r
    }

    /// Returns the instance mirroring a host element, creating it on first
    /// reference.
    pub fn bind_element(&mut self, info: &ElementInfo) -> ObjectRef {
        if let Some(r) = self.instance_for_element(info.element) {
            return r;
        }
        let class = self
            .classes
            .by_name(&info.class)
            .or_else(|| self.classes.by_name(FALLBACK_CLASS))
            .unwrap_or(ClassId::ROOT);
        if !self.classes.get(class).name().eq_ignore_ascii_case(&info.class) {
            debug!(class = %info.class, "host element of unknown class bound as GuiObject");
        }
        self.allocate(class, Some(info.element))
    }

    /// The instance bound to a host element, if it is still alive.
    pub fn instance_for_element(&self, element: ElementId) -> Option<ObjectRef> {
        self.elements
            .get(&element)
            .copied()
            .filter(|r| self.heap.contains(*r))
    }

    /// The System singleton, created on first use.
    pub fn system(&mut self) -> ObjectRef {
        if let Some(r) = self.system.filter(|r| self.heap.contains(*r)) {
            return r;
        }
        let r = self.bind_element(&ElementInfo::new(ElementId::SYSTEM, "System"));
        self.system = Some(r);
        r
    }

    /// The System singleton, if it exists.
    pub fn system_ref(&self) -> Option<ObjectRef> {
        self.system.filter(|r| self.heap.contains(*r))
    }

    /// Resolves a handle.
    pub fn instance(&self, r: ObjectRef) -> Option<&Instance> {
        self.heap.get(r)
    }

    /// Resolves a handle mutably.
    pub fn instance_mut(&mut self, r: ObjectRef) -> Option<&mut Instance> {
        self.heap.get_mut(r)
    }

    /// Whether the handle still refers to a live instance.
    pub fn is_alive(&self, r: ObjectRef) -> bool {
        self.heap.contains(r)
    }

    /// Class of a live instance.
    pub fn class_of(&self, r: ObjectRef) -> Option<ClassId> {
        self.heap.get(r).map(Instance::class)
    }

    /// Class name of a live instance.
    pub fn class_name_of(&self, r: ObjectRef) -> Result<&'static str, ObjectError> {
        self.class_of(r)
            .map(|c| self.classes.get(c).name())
            .ok_or(ObjectError::DeadInstance)
    }

    /// Whether a live instance is of class `ancestor` or derives from it.
    pub fn is_instance_of(&self, r: ObjectRef, ancestor: &str) -> bool {
        match (self.class_of(r), self.classes.by_name(ancestor)) {
            (Some(class), Some(ancestor)) => self.classes.is_a(class, ancestor),
            _ => false,
        }
    }

    /// Destroys an instance. Every other handle to it stops resolving.
    pub fn destroy(&mut self, r: ObjectRef) -> Option<Instance> {
        let instance = self.heap.remove(r)?;
        if let Some(element) = instance.element() {
            if self.elements.get(&element) == Some(&r) {
                self.elements.remove(&element);
            }
        }
        if self.system == Some(r) {
            self.system = None;
        }
        self.pending.retain(|e| e.target != r);
        trace!(instance = %r, "destroyed instance");
        Some(instance)
    }

    /// The host destroyed an element; drops the instance mirroring it.
    pub fn element_destroyed(&mut self, element: ElementId) -> Option<ObjectRef> {
        let r = self.elements.remove(&element)?;
        self.destroy(r).map(|_| r)
    }

    /// Destroys every instance and drops queued events.
    pub fn clear(&mut self) {
        for r in self.heap.handles() {
            self.heap.remove(r);
        }
        self.elements.clear();
        self.pending.clear();
        self.system = None;
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether no instances are alive.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Live instances with their handles, in slot order.
    pub fn instances(&self) -> impl Iterator<Item = (ObjectRef, &Instance)> {
        self.heap.iter()
    }

    // ========================================================================
    // Events and time
    // ========================================================================

    /// Queues an event for delivery after the current one.
    pub fn emit(&mut self, target: ObjectRef, name: impl Into<String>, args: Vec<Value>) {
        let name = name.into();
        trace!(target = %target, event = %name, "queued event");
        self.pending.push_back(PendingEvent { target, name, args });
    }

    /// Takes the oldest queued event.
    pub fn take_pending(&mut self) -> Option<PendingEvent> {
        self.pending.pop_front()
    }

    /// Number of queued events.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Host time of the last tick, in milliseconds.
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Advances the clock and returns every running timer whose deadline
    /// passed, ordered by deadline then creation. Each timer appears once,
    /// however many periods elapsed; the extra periods count as skipped.
    pub fn due_timers(&mut self, now_ms: u64) -> Vec<ObjectRef> {
        self.clock_ms = self.clock_ms.max(now_ms);
        let now = self.clock_ms;

        let mut due: Vec<(u64, u64, ObjectRef)> = self
            .heap
            .iter()
            .filter_map(|(r, instance)| match &instance.state {
                NativeState::Timer(t) if t.running && t.next_due <= now => {
                    Some((t.next_due, instance.serial(), r))
                }
                _ => None,
            })
            .collect();
        due.sort_unstable();

        for &(_, _, r) in &due {
            if let Some(NativeState::Timer(t)) = self.heap.get_mut(r).map(|i| &mut i.state) {
                t.advance(now);
            }
        }
        due.into_iter().map(|(_, _, r)| r).collect()
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Calls a method on an instance.
    ///
    /// Calling a method no class in the receiver's chain defines, or calling
    /// anything on a destroyed instance, is a silent no-op that returns void.
    /// Argument mismatches are still reported.
    pub fn invoke(
        &mut self,
        host: &mut dyn HostBridge,
        this: ObjectRef,
        name: &str,
        args: &[Value],
    ) -> Result<Value, ObjectError> {
        match self.try_invoke(host, this, name, args) {
            Err(e @ (ObjectError::UndefinedMethod { .. } | ObjectError::DeadInstance)) => {
                debug!(instance = %this, method = name, error = %e, "call ignored");
                Ok(Value::Void)
            }
            other => other,
        }
    }

    /// Calls a method, reporting undefined methods and dead receivers.
    pub fn try_invoke(
        &mut self,
        host: &mut dyn HostBridge,
        this: ObjectRef,
        name: &str,
        args: &[Value],
    ) -> Result<Value, ObjectError> {
        let classes = Arc::clone(&self.classes);
        let class = self.class_of(this).ok_or(ObjectError::DeadInstance)?;
        let method = classes
            .resolve(class, name)
            .ok_or_else(|| ObjectError::UndefinedMethod {
                class: classes.get(class).name().to_string(),
                method: name.to_string(),
            })?;
        self.call_method(host, this, method, args)
    }

    /// Runs a resolved native method.
    pub fn call_method(
        &mut self,
        host: &mut dyn HostBridge,
        this: ObjectRef,
        method: &Method,
        args: &[Value],
    ) -> Result<Value, ObjectError> {
        let args = validate_args(method, args)?;
        let returns = method.returns();
        let element = self.instance(this).and_then(Instance::element);

        let result = match method.native() {
            NativeMethod::Call(f) => {
                let mut call = NativeCall::new(self, host, this, &args, method);
                f(&mut call)?
            }
            NativeMethod::Hook => Value::default_for(returns),
            NativeMethod::ClassName(name) => Value::from(name),
            NativeMethod::Get(property) => {
                let from_host = element.and_then(|e| match host.query(e, property, &args) {
                    Ok(v) if !v.is_void() => Some(v),
                    Ok(_) => None,
                    Err(err) => {
                        debug!(%err, property, "host query failed");
                        None
                    }
                });
                from_host
                    .or_else(|| self.instance(this).and_then(|i| i.field(property)).cloned())
                    .unwrap_or_else(|| Value::default_for(returns))
            }
            NativeMethod::Set(property) => {
                let value = args.first().cloned().unwrap_or_default();
                if let Some(instance) = self.instance_mut(this) {
                    instance.set_field(property, value);
                }
                if let Some(e) = element {
                    if let Err(err) = host.mutate(e, property, &args) {
                        debug!(%err, property, "host mutation failed");
                    }
                }
                Value::Void
            }
            NativeMethod::Forward(action) => match element {
                Some(e) => forward(host, e, action, &args, returns.is_some()),
                None => Value::Void,
            },
            NativeMethod::Service(action) => {
                forward(host, ElementId::SYSTEM, action, &args, returns.is_some())
            }
        };
        Ok(result.coerce(returns))
    }
}

fn forward(
    host: &mut dyn HostBridge,
    element: ElementId,
    action: &str,
    args: &[Value],
    query: bool,
) -> Value {
    if query {
        return host.query(element, action, args).unwrap_or_else(|err| {
            debug!(%err, action, "host query failed");
            Value::Void
        });
    }
    if let Err(err) = host.mutate(element, action, args) {
        debug!(%err, action, "host mutation failed");
    }
    Value::Void
}

/// Checks and converts call arguments against a method's signature.
fn validate_args(method: &Method, args: &[Value]) -> Result<Vec<Value>, ObjectError> {
    let Some(signature) = method.signature() else {
        return Ok(args.to_vec());
    };
    let mismatch = |reason: String| ObjectError::ArgumentMismatch {
        method: method.name().to_string(),
        reason,
    };
    if args.len() != signature.arity() {
        return Err(mismatch(format!(
            "expected {} arguments, got {}",
            signature.arity(),
            args.len()
        )));
    }

    signature
        .parameter_types()
        .zip(args)
        .enumerate()
        .map(|(i, (ty, arg))| {
            convert_arg(ty, arg, method.is_lenient()).ok_or_else(|| {
                mismatch(format!(
                    "argument {} must be {}, found {}",
                    i + 1,
                    type_label(ty),
                    arg.type_name()
                ))
            })
        })
        .collect()
}

fn convert_arg(ty: ValueType, arg: &Value, lenient: bool) -> Option<Value> {
    match ty {
        ValueType::Any => Some(arg.clone()),
        t if t.is_numeric() => {
            let numeric = match arg {
                v if v.is_numeric() => v.clone(),
                Value::String(s) if lenient => Value::Float(Value::parse_number(s)?),
                _ => return None,
            };
            Some(numeric.coerce(Some(t)))
        }
        ValueType::String => match arg {
            Value::String(_) => Some(arg.clone()),
            v if lenient && v.is_numeric() => Some(Value::String(v.to_string())),
            _ => None,
        },
        // Catalog parameter classes are advisory; any handle (even a dead one) is accepted.
        ValueType::Object(_) => match arg {
            Value::Null | Value::Void => Some(Value::Null),
            Value::Object(_) => Some(arg.clone()),
            _ => None,
        },
        _ => Some(arg.clone()),
    }
}

fn type_label(ty: ValueType) -> &'static str {
    match ty {
        ValueType::Int => "int",
        ValueType::Float => "float",
        ValueType::Double => "double",
        ValueType::Boolean => "boolean",
        ValueType::String => "string",
        ValueType::Any => "any",
        ValueType::Object(name) => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullHost;

    fn model() -> ObjectModel {
        ObjectModel::with_seed(ClassTable::standard().unwrap(), Some(7))
    }

    #[test]
    fn test_get_class_name_is_own_name() {
        let mut model = model();
        let toggle = model.create_instance_by_name("ToggleButton").unwrap();
        let name = model
            .invoke(&mut NullHost, toggle, "getClassName", &[])
            .unwrap();
        assert_eq!(name, Value::from("ToggleButton"));
        assert_eq!(model.class_name_of(toggle).unwrap(), "ToggleButton");
    }

    #[test]
    fn test_undefined_method_is_silent() {
        let mut model = model();
        let timer = model.create_instance_by_name("Timer").unwrap();
        assert_eq!(
            model.invoke(&mut NullHost, timer, "explode", &[]).unwrap(),
            Value::Void
        );
        assert!(matches!(
            model.try_invoke(&mut NullHost, timer, "explode", &[]),
            Err(ObjectError::UndefinedMethod { .. })
        ));
    }

    #[test]
    fn test_dead_instance() {
        let mut model = model();
        let list = model.create_instance_by_name("List").unwrap();
        model.destroy(list);
        assert_eq!(
            model.try_invoke(&mut NullHost, list, "getNumItems", &[]),
            Err(ObjectError::DeadInstance)
        );
        assert_eq!(
            model.invoke(&mut NullHost, list, "getNumItems", &[]).unwrap(),
            Value::Void
        );
    }

    #[test]
    fn test_argument_mismatch() {
        let mut model = model();
        let system = model.system();
        let err = model
            .invoke(&mut NullHost, system, "strlen", &[Value::Int(3)])
            .unwrap_err();
        assert!(matches!(err, ObjectError::ArgumentMismatch { .. }));

        let err = model
            .invoke(&mut NullHost, system, "strlen", &[])
            .unwrap_err();
        assert!(matches!(err, ObjectError::ArgumentMismatch { .. }));
    }

    #[test]
    fn test_numeric_arguments_convert() {
        let mut model = model();
        let system = model.system();
        let result = model
            .invoke(&mut NullHost, system, "integerToString", &[Value::Float(4.7)])
            .unwrap();
        assert_eq!(result, Value::from("4"));
    }

    #[test]
    fn test_create_by_unknown_key() {
        let mut model = model();
        assert!(matches!(
            model.create_instance_by_key("ffffffffffffffffffffffffffffffff"),
            Err(ObjectError::Registry(RegistryError::UnknownClass(_)))
        ));
    }

    #[test]
    fn test_bind_element_reuses_instance() {
        let mut model = model();
        let info = ElementInfo::new(ElementId(5), "Button");
        let a = model.bind_element(&info);
        let b = model.bind_element(&info);
        assert_eq!(a, b);
        assert_eq!(model.class_name_of(a).unwrap(), "Button");

        let unknown = model.bind_element(&ElementInfo::new(ElementId(6), "Sparkles"));
        assert_eq!(model.class_name_of(unknown).unwrap(), "GuiObject");
    }

    #[test]
    fn test_element_destroyed_invalidates_handles() {
        let mut model = model();
        let a = model.bind_element(&ElementInfo::new(ElementId(9), "Layer"));
        model.emit(a, "onStartup", Vec::new());
        assert_eq!(model.element_destroyed(ElementId(9)), Some(a));
        assert!(!model.is_alive(a));
        assert_eq!(model.pending_len(), 0);
        assert_eq!(model.instance_for_element(ElementId(9)), None);
    }

    #[test]
    fn test_property_fallback_to_field() {
        let mut model = model();
        let text = model.create_instance_by_name("Text").unwrap();
        model
            .invoke(&mut NullHost, text, "setText", &[Value::from("hello")])
            .unwrap();
        assert_eq!(
            model.invoke(&mut NullHost, text, "getText", &[]).unwrap(),
            Value::from("hello")
        );
    }

    #[test]
    fn test_hook_returns_default() {
        let mut model = model();
        let button = model.create_instance_by_name("Button").unwrap();
        assert_eq!(
            model.invoke(&mut NullHost, button, "onLeftClick", &[]).unwrap(),
            Value::Void
        );
        let tree = model.create_instance_by_name("GuiTree").unwrap();
        assert_eq!(
            model
                .invoke(&mut NullHost, tree, "onWantAutoContextMenu", &[])
                .unwrap(),
            Value::Int(0)
        );
    }
}
