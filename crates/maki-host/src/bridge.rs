// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! An in-memory element tree implementing [`HostBridge`].
//!
//! Stands in for a real skin renderer in the CLI and in tests. Properties
//! set by scripts are stored per element and read back by queries; every
//! mutation is also appended to a log.
//!
//! A layout can be described in TOML:
//!
//! ```toml
//! [[element]]
//! id = "main"
//! class = "Layout"
//! script_group = true
//!
//! [[element]]
//! id = "play"
//! class = "Button"
//! parent = "main"
//! properties = { x = 10, y = 4, text = "Play" }
//! ```

use std::collections::BTreeMap;

use maki_interpreter::{ElementId, ElementInfo, HostBridge, HostError, Value};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::trace;

use crate::error::{Result, SessionError};

/// One element of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Catalog class the element appears as.
    pub class: String,
    /// Template or object id, searched by `findObject`.
    pub id: String,
    /// Containing element; `None` only for the application root.
    pub parent: Option<ElementId>,
    /// Children in creation order.
    pub children: Vec<ElementId>,
    properties: FxHashMap<String, Value>,
}

impl Element {
    fn new(class: &str, id: &str, parent: Option<ElementId>) -> Self {
        Self {
            class: class.to_string(),
            id: id.to_string(),
            parent,
            children: Vec::new(),
            properties: FxHashMap::default(),
        }
    }

    /// A stored property, looked up case-insensitively.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(&name.to_ascii_lowercase())
    }
}

/// A recorded `mutate` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    /// Target element.
    pub element: ElementId,
    /// Property or action.
    pub property: String,
    /// Arguments as passed.
    pub args: Vec<Value>,
}

/// The in-memory host.
#[derive(Debug, Clone)]
pub struct MemoryBridge {
    elements: BTreeMap<ElementId, Element>,
    next_id: u64,
    script_group: Option<ElementId>,
    mutations: Vec<Mutation>,
}

impl Default for MemoryBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct LayoutFile {
    #[serde(default)]
    element: Vec<ElementSpec>,
}

#[derive(Debug, Deserialize)]
struct ElementSpec {
    id: String,
    class: String,
    parent: Option<String>,
    #[serde(default)]
    script_group: bool,
    #[serde(default)]
    properties: BTreeMap<String, toml::Value>,
}

impl MemoryBridge {
    /// A tree holding only the application root.
    pub fn new() -> Self {
        let mut elements = BTreeMap::new();
        elements.insert(ElementId::SYSTEM, Element::new("Application", "", None));
        Self {
            elements,
            next_id: 1,
            script_group: None,
            mutations: Vec::new(),
        }
    }

    /// Builds a tree from a TOML layout. Parents must be declared before
    /// their children.
    pub fn from_layout(text: &str) -> Result<Self> {
        let file: LayoutFile =
            toml::from_str(text).map_err(|e| SessionError::Layout(e.to_string()))?;
        let mut bridge = Self::new();
        let mut ids: FxHashMap<String, ElementId> = FxHashMap::default();

        for spec in file.element {
            let parent = match &spec.parent {
                Some(name) => *ids
                    .get(&name.to_ascii_lowercase())
                    .ok_or_else(|| SessionError::Layout(format!("unknown parent '{name}'")))?,
                None => ElementId::SYSTEM,
            };
            let element = bridge.add(&spec.class, &spec.id, parent);
            for (name, value) in &spec.properties {
                let value = from_toml(value).ok_or_else(|| {
                    SessionError::Layout(format!("unsupported value for '{}.{name}'", spec.id))
                })?;
                bridge.set_property(element, name, value);
            }
            if spec.script_group {
                bridge.set_script_group(element);
            }
            ids.insert(spec.id.to_ascii_lowercase(), element);
        }
        Ok(bridge)
    }

    /// Adds an element under `parent` and returns its handle.
    pub fn add(&mut self, class: &str, id: &str, parent: ElementId) -> ElementId {
        let element = ElementId(self.next_id);
        self.next_id += 1;
        let parent = if self.elements.contains_key(&parent) {
            parent
        } else {
            ElementId::SYSTEM
        };
        self.elements
            .insert(element, Element::new(class, id, Some(parent)));
        if let Some(p) = self.elements.get_mut(&parent) {
            p.children.push(element);
        }
        trace!(element = element.0, class, id, "element added");
        element
    }

    /// Removes an element and its subtree. Returns every removed handle,
    /// the element itself first.
    pub fn remove(&mut self, element: ElementId) -> Vec<ElementId> {
        if element == ElementId::SYSTEM || !self.elements.contains_key(&element) {
            return Vec::new();
        }
        let parent = self.elements.get(&element).and_then(|e| e.parent);
        if let Some(p) = parent.and_then(|p| self.elements.get_mut(&p)) {
            p.children.retain(|c| *c != element);
        }

        let mut removed = Vec::new();
        let mut pending = vec![element];
        while let Some(next) = pending.pop() {
            if let Some(e) = self.elements.remove(&next) {
                pending.extend(e.children.iter().rev());
                removed.push(next);
            }
        }
        if self.script_group.is_some_and(|g| removed.contains(&g)) {
            self.script_group = None;
        }
        removed
    }

    /// Marks the group that owns the script.
    pub fn set_script_group(&mut self, element: ElementId) {
        self.script_group = Some(element);
    }

    /// An element, if it exists.
    pub fn element(&self, element: ElementId) -> Option<&Element> {
        self.elements.get(&element)
    }

    /// Number of elements, the application root included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether only the application root is left.
    pub fn is_empty(&self) -> bool {
        self.elements.len() <= 1
    }

    /// Host description of an element.
    pub fn info(&self, element: ElementId) -> Option<ElementInfo> {
        self.elements
            .get(&element)
            .map(|e| ElementInfo::new(element, e.class.clone()))
    }

    /// The first element with `id`, in creation order.
    pub fn lookup(&self, id: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, e)| e.id.eq_ignore_ascii_case(id))
            .map(|(handle, _)| *handle)
    }

    /// A stored property.
    pub fn property(&self, element: ElementId, name: &str) -> Option<&Value> {
        self.elements.get(&element)?.property(name)
    }

    /// Stores a property without logging a mutation.
    pub fn set_property(&mut self, element: ElementId, name: &str, value: Value) {
        if let Some(e) = self.elements.get_mut(&element) {
            e.properties.insert(name.to_ascii_lowercase(), value);
        }
    }

    /// Mutations received so far.
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Takes the mutation log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    fn get(&self, element: ElementId) -> std::result::Result<&Element, HostError> {
        self.elements.get(&element).ok_or(HostError::Gone(element))
    }

    /// Breadth-first search below `scope` for an id.
    fn search(&self, scope: ElementId, id: &str) -> Option<ElementId> {
        let mut queue: std::collections::VecDeque<ElementId> =
            self.elements.get(&scope)?.children.iter().copied().collect();
        while let Some(next) = queue.pop_front() {
            let Some(e) = self.elements.get(&next) else {
                continue;
            };
            if e.id.eq_ignore_ascii_case(id) {
                return Some(next);
            }
            queue.extend(e.children.iter().copied());
        }
        None
    }
}

impl HostBridge for MemoryBridge {
    fn mutate(
        &mut self,
        element: ElementId,
        property: &str,
        args: &[Value],
    ) -> std::result::Result<(), HostError> {
        self.get(element)?;
        self.mutations.push(Mutation {
            element,
            property: property.to_string(),
            args: args.to_vec(),
        });
        let value = args.first().cloned().unwrap_or_default();
        self.set_property(element, property, value);
        Ok(())
    }

    fn query(
        &mut self,
        element: ElementId,
        property: &str,
        _args: &[Value],
    ) -> std::result::Result<Value, HostError> {
        Ok(self.get(element)?.property(property).cloned().unwrap_or_default())
    }

    fn find(
        &mut self,
        scope: ElementId,
        id: &str,
    ) -> std::result::Result<Option<ElementInfo>, HostError> {
        self.get(scope)?;
        Ok(self.search(scope, id).and_then(|e| self.info(e)))
    }

    fn children(&mut self, element: ElementId) -> std::result::Result<Vec<ElementInfo>, HostError> {
        Ok(self
            .get(element)?
            .children
            .iter()
            .filter_map(|c| self.info(*c))
            .collect())
    }

    fn parent(&mut self, element: ElementId) -> std::result::Result<Option<ElementInfo>, HostError> {
        Ok(self
            .get(element)?
            .parent
            .filter(|p| *p != ElementId::SYSTEM)
            .and_then(|p| self.info(p)))
    }

    fn create(
        &mut self,
        class: &str,
        id: &str,
        parent: Option<ElementId>,
    ) -> std::result::Result<ElementInfo, HostError> {
        let parent = parent.unwrap_or(ElementId::SYSTEM);
        self.get(parent)?;
        let element = self.add(class, id, parent);
        Ok(ElementInfo::new(element, class))
    }

    fn destroy(&mut self, element: ElementId) -> std::result::Result<(), HostError> {
        self.get(element)?;
        self.remove(element);
        Ok(())
    }

    fn script_group(&mut self) -> std::result::Result<Option<ElementInfo>, HostError> {
        Ok(self.script_group.and_then(|g| self.info(g)))
    }
}

fn from_toml(value: &toml::Value) -> Option<Value> {
    match value {
        toml::Value::String(s) => Some(Value::from(s.as_str())),
        toml::Value::Integer(i) => i32::try_from(*i).ok().map(Value::Int),
        toml::Value::Float(f) => Some(Value::Float(*f)),
        toml::Value::Boolean(b) => Some(Value::Boolean(*b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"
        [[element]]
        id = "main"
        class = "Layout"
        script_group = true

        [[element]]
        id = "controls"
        class = "Group"
        parent = "main"

        [[element]]
        id = "play"
        class = "Button"
        parent = "controls"
        properties = { x = 10, text = "Play" }
    "#;

    #[test]
    fn test_layout_builds_tree() {
        let mut bridge = MemoryBridge::from_layout(LAYOUT).unwrap();
        assert_eq!(bridge.len(), 4);

        let group = bridge.script_group().unwrap().unwrap();
        assert_eq!(group.class, "Layout");

        let play = bridge.find(group.element, "PLAY").unwrap().unwrap();
        assert_eq!(play.class, "Button");
        assert_eq!(bridge.property(play.element, "x"), Some(&Value::Int(10)));

        let parent = bridge.parent(play.element).unwrap().unwrap();
        assert_eq!(bridge.element(parent.element).unwrap().id, "controls");
    }

    #[test]
    fn test_layout_rejects_unknown_parent() {
        let err = MemoryBridge::from_layout(
            r#"
            [[element]]
            id = "a"
            class = "Group"
            parent = "nowhere"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Layout(_)));
    }

    #[test]
    fn test_mutate_then_query() {
        let mut bridge = MemoryBridge::new();
        let text = bridge.add("Text", "title", ElementId::SYSTEM);

        bridge.mutate(text, "text", &[Value::from("hi")]).unwrap();
        assert_eq!(bridge.query(text, "TEXT", &[]).unwrap(), Value::from("hi"));
        assert_eq!(bridge.query(text, "alpha", &[]).unwrap(), Value::Void);
        assert_eq!(bridge.mutations().len(), 1);
    }

    #[test]
    fn test_remove_takes_subtree() {
        let mut bridge = MemoryBridge::from_layout(LAYOUT).unwrap();
        let controls = bridge.lookup("controls").unwrap();
        let play = bridge.lookup("play").unwrap();

        assert_eq!(bridge.remove(controls), vec![controls, play]);
        assert_eq!(bridge.len(), 2);
        assert_eq!(
            bridge.mutate(play, "x", &[Value::Int(1)]),
            Err(HostError::Gone(play))
        );
        assert!(bridge.remove(ElementId::SYSTEM).is_empty());
    }

    #[test]
    fn test_create_under_parent() {
        let mut bridge = MemoryBridge::new();
        let group = bridge.add("Group", "g", ElementId::SYSTEM);
        let info = bridge.create("Button", "extra", Some(group)).unwrap();
        let children = bridge.children(group).unwrap();
        assert_eq!(children, vec![info]);
        assert!(bridge.create("Button", "x", Some(ElementId(999))).is_err());
    }
}
