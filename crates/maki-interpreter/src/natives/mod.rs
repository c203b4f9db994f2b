// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Native method tables for every catalogued class.
//!
//! Each class contributes a table of `(lowercase name, MethodEntry)` pairs.
//! Most entries are one of the declarative shapes ([`hook`], [`get`],
//! [`set`], [`forward`], [`service`]); the rest are hand-written functions
//! taking a [`NativeCall`].
//!
//! Tables are grouped by area:
//! - System: strings, math, dates, settings, atoms
//! - Collections: List, BitList, Map, Region, PopupMenu, Timer
//! - GUI objects, containers, controls, layers
//! - GuiList and GuiTree models
//! - Config stores and host services

pub mod collections;
pub mod config;
pub mod containers;
pub mod controls;
pub mod gui;
pub mod guilist;
pub mod layers;
pub mod object;
pub mod system;
pub mod tree;

use std::fmt;

use tracing::debug;

use crate::error::ObjectError;
use crate::host::{ElementId, ElementInfo, HostBridge};
use crate::runtime::class::Method;
use crate::runtime::heap::ObjectRef;
use crate::runtime::instance::NativeState;
use crate::runtime::model::ObjectModel;
use crate::runtime::value::Value;

/// Signature of a hand-written native.
pub type NativeFn = fn(&mut NativeCall<'_>) -> Result<Value, ObjectError>;

/// How a native method is implemented.
#[derive(Clone, Copy)]
pub enum NativeMethod {
    /// Hand-written.
    Call(NativeFn),
    /// Overridable event; returns the declared default.
    Hook,
    /// Reads a property from the host, falling back to the stored field.
    Get(&'static str),
    /// Stores a property and mirrors it to the host.
    Set(&'static str),
    /// Sends an action to the instance's own host element. Queries when the
    /// method returns a value, mutates otherwise.
    Forward(&'static str),
    /// Like [`NativeMethod::Forward`], but always addressed to the
    /// application element.
    Service(&'static str),
    /// The per-class `getClassName`.
    ClassName(&'static str),
}

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeMethod::Call(_) => write!(f, "Call"),
            NativeMethod::Hook => write!(f, "Hook"),
            NativeMethod::Get(p) => write!(f, "Get({p})"),
            NativeMethod::Set(p) => write!(f, "Set({p})"),
            NativeMethod::Forward(a) => write!(f, "Forward({a})"),
            NativeMethod::Service(a) => write!(f, "Service({a})"),
            NativeMethod::ClassName(n) => write!(f, "ClassName({n})"),
        }
    }
}

/// One row of a class's method table.
#[derive(Debug, Clone, Copy)]
pub struct MethodEntry {
    pub(crate) native: NativeMethod,
    pub(crate) lenient: bool,
}

impl MethodEntry {
    /// Accepts numeric strings for numbers and numbers for strings.
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }
}

const fn entry(native: NativeMethod) -> MethodEntry {
    MethodEntry {
        native,
        lenient: false,
    }
}

/// A hand-written native.
pub fn call(f: NativeFn) -> MethodEntry {
    entry(NativeMethod::Call(f))
}

/// An overridable event with a default no-op.
pub fn hook() -> MethodEntry {
    entry(NativeMethod::Hook)
}

/// A property read.
pub fn get(property: &'static str) -> MethodEntry {
    entry(NativeMethod::Get(property))
}

/// A property write.
pub fn set(property: &'static str) -> MethodEntry {
    entry(NativeMethod::Set(property))
}

/// An action on the instance's host element.
pub fn forward(action: &'static str) -> MethodEntry {
    entry(NativeMethod::Forward(action))
}

/// An action on the application element.
pub fn service(action: &'static str) -> MethodEntry {
    entry(NativeMethod::Service(action))
}

/// Builds a method table.
macro_rules! methods {
    ($($name:literal => $entry:expr),* $(,)?) => {
        vec![$(($name, $entry)),*]
    };
}
pub(crate) use methods;

/// Method table for a class, by class name.
pub fn table_for(class: &str) -> Option<Vec<(&'static str, MethodEntry)>> {
    let table = match class {
        "Object" => object::object(),
        "System" => system::system(),
        "List" => collections::list(),
        "BitList" => collections::bit_list(),
        "Map" => collections::map(),
        "PopupMenu" => collections::popup_menu(),
        "Region" => collections::region(),
        "Timer" => collections::timer(),
        "GuiObject" => gui::gui_object(),
        "Container" => containers::container(),
        "Wac" => containers::wac(),
        "Group" => containers::group(),
        "Layout" => containers::layout(),
        "WindowHolder" => containers::window_holder(),
        "Component" => containers::component(),
        "ComponentBucket" => containers::component_bucket(),
        "GroupList" => containers::group_list(),
        "CfgGroup" => containers::cfg_group(),
        "Edit" => controls::edit(),
        "Slider" => controls::slider(),
        "Vis" => controls::vis(),
        "Browser" => controls::browser(),
        "Text" => controls::text(),
        "Button" => controls::button(),
        "ToggleButton" => controls::toggle_button(),
        "CheckBox" => controls::check_box(),
        "MenuButton" => controls::menu_button(),
        "DropDownList" => controls::drop_down_list(),
        "QueryList" => controls::query_list(),
        "MouseRedir" => controls::mouse_redir(),
        "LayoutStatus" => controls::layout_status(),
        "TabSheet" => controls::tab_sheet(),
        "Form" => controls::form(),
        "Frame" => controls::frame(),
        "EqVis" | "Status" | "Title" => methods![],
        "Layer" => layers::layer(),
        "AnimatedLayer" => layers::animated_layer(),
        "AlbumArtLayer" => layers::album_art_layer(),
        "GuiList" => guilist::gui_list(),
        "GuiTree" => tree::gui_tree(),
        "TreeItem" => tree::tree_item(),
        "Config" => config::config(),
        "ConfigItem" => config::config_item(),
        "ConfigAttribute" => config::config_attribute(),
        "WinampConfig" => config::winamp_config(),
        "WinampConfigGroup" => config::winamp_config_group(),
        "Application" => config::application(),
        "File" => config::file(),
        "PlEdit" => config::pl_edit(),
        "PlDir" => config::pl_dir(),
        _ => return None,
    };
    Some(table)
}

/// Error for an instance whose native state does not match its class.
pub(crate) fn state_mismatch(expected: &str) -> ObjectError {
    ObjectError::ArgumentMismatch {
        method: "this".to_string(),
        reason: format!("instance carries no {expected} state"),
    }
}

static VOID: Value = Value::Void;

/// Context handed to a hand-written native.
///
/// Arguments have already been checked and converted to the declared
/// parameter types, so the typed accessors only fall back to defaults for
/// out-of-range indices.
pub struct NativeCall<'a> {
    model: &'a mut ObjectModel,
    host: &'a mut dyn HostBridge,
    this: ObjectRef,
    args: &'a [Value],
    method: &'a Method,
}

impl<'a> NativeCall<'a> {
    pub(crate) fn new(
        model: &'a mut ObjectModel,
        host: &'a mut dyn HostBridge,
        this: ObjectRef,
        args: &'a [Value],
        method: &'a Method,
    ) -> Self {
        Self {
            model,
            host,
            this,
            args,
            method,
        }
    }

    /// The receiver.
    pub fn this(&self) -> ObjectRef {
        self.this
    }

    /// The method being run.
    pub fn method(&self) -> &Method {
        self.method
    }

    /// The object model.
    pub fn model(&mut self) -> &mut ObjectModel {
        &mut *self.model
    }

    /// The object model, read-only.
    pub fn model_ref(&self) -> &ObjectModel {
        &*self.model
    }

    // ========================================================================
    // Arguments
    // ========================================================================

    /// Raw argument.
    pub fn arg(&self, i: usize) -> &Value {
        self.args.get(i).unwrap_or(&VOID)
    }

    /// Integer argument.
    pub fn int(&self, i: usize) -> i32 {
        self.arg(i).as_i32().unwrap_or(0)
    }

    /// Floating-point argument.
    pub fn float(&self, i: usize) -> f64 {
        self.arg(i).as_f64().unwrap_or(0.0)
    }

    /// Boolean argument.
    pub fn boolean(&self, i: usize) -> bool {
        self.arg(i).to_boolean()
    }

    /// String argument.
    pub fn string(&self, i: usize) -> &str {
        self.arg(i).as_str().unwrap_or("")
    }

    /// Object argument that is still alive.
    pub fn object(&self, i: usize) -> Option<ObjectRef> {
        self.arg(i).as_object().filter(|r| self.model.is_alive(*r))
    }

    /// The declared default for this method's return type.
    pub fn default_return(&self) -> Value {
        Value::default_for(self.method.returns())
    }

    /// An argument error for this method.
    pub fn mismatch(&self, reason: impl Into<String>) -> ObjectError {
        ObjectError::ArgumentMismatch {
            method: self.method.name().to_string(),
            reason: reason.into(),
        }
    }

    // ========================================================================
    // Receiver state
    // ========================================================================

    /// Stored field of the receiver.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.model.instance(self.this).and_then(|i| i.field(name))
    }

    /// Stored field of the receiver, or `default`.
    pub fn field_or(&self, name: &str, default: impl Into<Value>) -> Value {
        self.field(name).cloned().unwrap_or_else(|| default.into())
    }

    /// Stores a field on the receiver.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        if let Some(instance) = self.model.instance_mut(self.this) {
            instance.set_field(name, value.into());
        }
    }

    /// Removes a field from the receiver.
    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.model
            .instance_mut(self.this)
            .and_then(|i| i.remove_field(name))
    }

    /// Object stored in a field, if it is still alive.
    pub fn object_field(&self, name: &str) -> Option<ObjectRef> {
        self.field(name)
            .and_then(Value::as_object)
            .filter(|r| self.model.is_alive(*r))
    }

    /// The receiver's native state.
    pub fn state(&mut self) -> Result<&mut NativeState, ObjectError> {
        self.model
            .instance_mut(self.this)
            .map(|i| &mut i.state)
            .ok_or(ObjectError::DeadInstance)
    }

    /// Host element the receiver mirrors.
    pub fn element(&self) -> Option<ElementId> {
        self.model.instance(self.this).and_then(|i| i.element())
    }

    /// Host element of another instance.
    pub fn element_of(&self, r: ObjectRef) -> Option<ElementId> {
        self.model.instance(r).and_then(|i| i.element())
    }

    // ========================================================================
    // Host
    // ========================================================================

    /// Queries the receiver's element. `None` when unbound, on failure, or
    /// when the host has nothing to say.
    pub fn query(&mut self, property: &str, args: &[Value]) -> Option<Value> {
        let element = self.element()?;
        self.query_element(element, property, args)
    }

    /// Queries any element.
    pub fn query_element(
        &mut self,
        element: ElementId,
        property: &str,
        args: &[Value],
    ) -> Option<Value> {
        match self.host.query(element, property, args) {
            Ok(v) if !v.is_void() => Some(v),
            Ok(_) => None,
            Err(err) => {
                debug!(%err, property, "host query failed");
                None
            }
        }
    }

    /// Integer answer to a query on any element.
    pub fn query_int(&mut self, element: ElementId, property: &str, args: &[Value]) -> Option<i32> {
        self.query_element(element, property, args)
            .and_then(|v| v.as_i32())
    }

    /// Mutates the receiver's element, if it has one.
    pub fn mutate(&mut self, property: &str, args: &[Value]) {
        if let Some(element) = self.element() {
            self.mutate_element(element, property, args);
        }
    }

    /// Mutates any element. Returns whether the host accepted it.
    pub fn mutate_element(&mut self, element: ElementId, property: &str, args: &[Value]) -> bool {
        match self.host.mutate(element, property, args) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, property, "host mutation failed");
                false
            }
        }
    }

    fn bind(&mut self, info: Option<ElementInfo>) -> Option<ObjectRef> {
        info.map(|info| self.model.bind_element(&info))
    }

    /// Finds a named element under `scope` and returns its instance.
    pub fn find(&mut self, scope: ElementId, id: &str) -> Option<ObjectRef> {
        let found = self.host.find(scope, id).unwrap_or_else(|err| {
            debug!(%err, id, "host find failed");
            None
        });
        self.bind(found)
    }

    /// Instances of an element's children, in host order.
    pub fn children(&mut self, element: ElementId) -> Vec<ObjectRef> {
        let children = self.host.children(element).unwrap_or_else(|err| {
            debug!(%err, "host children failed");
            Vec::new()
        });
        children
            .iter()
            .map(|info| self.model.bind_element(info))
            .collect()
    }

    /// Instances of an element's children whose class derives from `class`.
    pub fn children_of_class(&mut self, element: ElementId, class: &str) -> Vec<ObjectRef> {
        let children = self.children(element);
        children
            .into_iter()
            .filter(|r| self.model.is_instance_of(*r, class))
            .collect()
    }

    /// Instance of an element's parent.
    pub fn parent_of(&mut self, element: ElementId) -> Option<ObjectRef> {
        let parent = self.host.parent(element).unwrap_or_else(|err| {
            debug!(%err, "host parent failed");
            None
        });
        self.bind(parent)
    }

    /// The group owning the running script.
    pub fn script_group(&mut self) -> Option<ObjectRef> {
        let group = self.host.script_group().unwrap_or_else(|err| {
            debug!(%err, "host script group failed");
            None
        });
        self.bind(group)
    }

    /// Asks the host to instantiate a template.
    pub fn create_element(
        &mut self,
        class: &str,
        id: &str,
        parent: Option<ElementId>,
    ) -> Option<ObjectRef> {
        let created = self.host.create(class, id, parent).map_err(|err| {
            debug!(%err, class, id, "host create failed");
        });
        self.bind(created.ok())
    }

    /// Destroys another instance and its host element.
    pub fn destroy(&mut self, r: ObjectRef) {
        if let Some(element) = self.element_of(r) {
            if let Err(err) = self.host.destroy(element) {
                debug!(%err, "host destroy failed");
            }
        }
        self.model.destroy(r);
    }

    // ========================================================================
    // Instances and events
    // ========================================================================

    /// Creates an unbound instance of a named class.
    pub fn new_instance(&mut self, class: &str) -> Result<ObjectRef, ObjectError> {
        self.model.create_instance_by_name(class)
    }

    /// Queues an event on the receiver.
    pub fn emit(&mut self, name: &str, args: Vec<Value>) {
        self.model.emit(self.this, name, args);
    }

    /// Queues an event on another instance.
    pub fn emit_to(&mut self, target: ObjectRef, name: &str, args: Vec<Value>) {
        self.model.emit(target, name, args);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for the per-module native tests.

    use super::*;
    use crate::host::NullHost;
    use crate::runtime::class::ClassTable;

    pub(crate) struct Fixture {
        pub model: ObjectModel,
        pub host: NullHost,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                model: ObjectModel::with_seed(ClassTable::standard().unwrap(), Some(1)),
                host: NullHost,
            }
        }

        pub fn create(&mut self, class: &str) -> ObjectRef {
            self.model.create_instance_by_name(class).unwrap()
        }

        pub fn call(&mut self, this: ObjectRef, method: &str, args: &[Value]) -> Value {
            self.model
                .try_invoke(&mut self.host, this, method, args)
                .unwrap()
        }

        pub fn events(&mut self) -> Vec<(ObjectRef, String)> {
            std::iter::from_fn(|| self.model.take_pending())
                .map(|e| (e.target, e.name))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ClassRegistry;

    #[test]
    fn test_every_catalogued_class_has_a_table() {
        for class in ClassRegistry::standard().all_classes() {
            assert!(table_for(class.name).is_some(), "{}", class.name);
        }
    }

    #[test]
    fn test_table_names_are_lowercase() {
        for class in ClassRegistry::standard().all_classes() {
            for (name, _) in table_for(class.name).unwrap() {
                assert_eq!(name, name.to_ascii_lowercase(), "{}.{}", class.name, name);
            }
        }
    }
}
