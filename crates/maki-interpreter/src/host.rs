// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The boundary to the rendering host.
//!
//! Native methods never touch a UI toolkit directly. Everything that needs
//! the host goes through [`HostBridge`], keyed by the host's own element
//! handles. Every call is fallible because the element may already be gone;
//! callers degrade failures to default values.

use thiserror::Error;

use crate::runtime::value::Value;

/// Host-side handle of a UI element or service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl ElementId {
    /// The application itself: the System object's counterpart.
    pub const SYSTEM: ElementId = ElementId(0);
}

/// A host element together with the script class it should appear as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    /// Host handle.
    pub element: ElementId,
    /// Class name from the catalog (`Layout`, `Button`, ...).
    pub class: String,
}

impl ElementInfo {
    /// Creates an element description.
    pub fn new(element: ElementId, class: impl Into<String>) -> Self {
        Self {
            element,
            class: class.into(),
        }
    }
}

/// Failures reported by a host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The element was destroyed on the host side.
    #[error("element {0:?} no longer exists")]
    Gone(ElementId),

    /// The element has no such property or action.
    #[error("element {element:?} does not support '{property}'")]
    Unsupported {
        /// Target element.
        element: ElementId,
        /// Property or action name.
        property: String,
    },

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// Capabilities the interpreter needs from its host.
///
/// Only [`mutate`](Self::mutate) and [`query`](Self::query) are required; the
/// structural lookups default to "nothing there".
pub trait HostBridge {
    /// Sets a property or performs an action on an element.
    fn mutate(&mut self, element: ElementId, property: &str, args: &[Value])
    -> Result<(), HostError>;

    /// Reads a property, optionally parameterized.
    fn query(
        &mut self,
        element: ElementId,
        property: &str,
        args: &[Value],
    ) -> Result<Value, HostError>;

    /// Looks up a named descendant of `scope`.
    fn find(&mut self, scope: ElementId, id: &str) -> Result<Option<ElementInfo>, HostError> {
        let _ = (scope, id);
        Ok(None)
    }

    /// Direct children of an element, in host order.
    fn children(&mut self, element: ElementId) -> Result<Vec<ElementInfo>, HostError> {
        let _ = element;
        Ok(Vec::new())
    }

    /// Parent of an element.
    fn parent(&mut self, element: ElementId) -> Result<Option<ElementInfo>, HostError> {
        let _ = element;
        Ok(None)
    }

    /// Instantiates a new element of `class` from the template named `id`.
    fn create(
        &mut self,
        class: &str,
        id: &str,
        parent: Option<ElementId>,
    ) -> Result<ElementInfo, HostError> {
        let _ = (id, parent);
        Err(HostError::Unsupported {
            element: ElementId::SYSTEM,
            property: format!("create {class}"),
        })
    }

    /// Destroys an element the script deleted.
    fn destroy(&mut self, element: ElementId) -> Result<(), HostError> {
        let _ = element;
        Ok(())
    }

    /// The group that owns the running script.
    fn script_group(&mut self) -> Result<Option<ElementInfo>, HostError> {
        Ok(None)
    }
}

/// A host that accepts every mutation and answers every query with void.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl HostBridge for NullHost {
    fn mutate(&mut self, _: ElementId, _: &str, _: &[Value]) -> Result<(), HostError> {
        Ok(())
    }

    fn query(&mut self, _: ElementId, _: &str, _: &[Value]) -> Result<Value, HostError> {
        Ok(Value::Void)
    }
}
