// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The class registry: a static catalog of every class a compiled script
//! may reference.
//!
//! Classes are keyed by the 32-character lowercase GUID string the compiler
//! writes into a program's class table. Function names keep the catalog's
//! spelling; lookups go through [`FunctionDescriptor::key`], the lowercase
//! form, since the script language is case-insensitive.

mod catalog;

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::error::RegistryError;

/// One declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDescriptor {
    /// Type name as spelled in the catalog (`Int`, `String`, `GuiObject`, ...).
    pub ty: &'static str,
    /// Parameter name.
    pub name: &'static str,
}

/// One declared function of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionDescriptor {
    /// Function name as spelled in the catalog.
    pub name: &'static str,
    /// Declared parameters, in call order.
    pub parameters: &'static [ParamDescriptor],
    /// Declared return type, `None` for functions that return nothing.
    pub return_type: Option<&'static str>,
}

impl FunctionDescriptor {
    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Lowercase lookup key.
    pub fn key(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Whether scripts may override this function as an event handler.
    pub fn is_hook(&self) -> bool {
        is_hook_name(self.name)
    }

    /// Declared return type, parsed.
    pub fn returns(&self) -> Option<ValueType> {
        self.return_type.map(ValueType::parse)
    }

    /// Declared parameter types, parsed.
    pub fn parameter_types(&self) -> impl Iterator<Item = ValueType> + '_ {
        self.parameters.iter().map(|p| ValueType::parse(p.ty))
    }
}

/// Returns true for event-handler names: `on*` and the `fx_on*` layer callbacks.
pub fn is_hook_name(name: &str) -> bool {
    let lower = name.as_bytes();
    let starts = |prefix: &[u8]| {
        lower.len() > prefix.len() && lower[..prefix.len()].eq_ignore_ascii_case(prefix)
    };
    starts(b"on") || starts(b"fx_on")
}

/// Immutable description of one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDescriptor {
    /// 32-character lowercase class key.
    pub key: &'static str,
    /// Class name.
    pub name: &'static str,
    /// Parent class name; `None` only for the root.
    pub parent: Option<&'static str>,
    /// Functions declared by this class (not including inherited ones).
    pub functions: &'static [FunctionDescriptor],
}

impl ClassDescriptor {
    /// Finds a function declared by this class, case-insensitively.
    pub fn function(&self, name: &str) -> Option<&'static FunctionDescriptor> {
        self.functions
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// Types that appear in function signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// 32-bit signed integer.
    Int,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Boolean.
    Boolean,
    /// String.
    String,
    /// Untyped slot; accepts anything.
    Any,
    /// Reference to an instance of the named class.
    Object(&'static str),
}

impl ValueType {
    /// Parses a catalog type name. Names that are not primitives are classes.
    pub fn parse(name: &'static str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "int" => ValueType::Int,
            "float" => ValueType::Float,
            "double" => ValueType::Double,
            "boolean" | "bool" => ValueType::Boolean,
            "string" => ValueType::String,
            "any" => ValueType::Any,
            _ => ValueType::Object(name),
        }
    }

    /// True for the numeric family (including booleans).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Int | ValueType::Float | ValueType::Double | ValueType::Boolean
        )
    }
}

/// Index of a class within the registry; also indexes the runtime class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(usize);

impl ClassId {
    /// The root class; the catalog lists it first.
    pub const ROOT: ClassId = ClassId(0);

    /// Position within [`ClassRegistry::all_classes`].
    pub fn index(self) -> usize {
        self.0
    }
}

/// Lookup structure over the static catalog.
#[derive(Debug)]
pub struct ClassRegistry {
    classes: &'static [ClassDescriptor],
    by_key: FxHashMap<&'static str, usize>,
    by_name: FxHashMap<String, usize>,
}

static STANDARD: LazyLock<ClassRegistry> =
    LazyLock::new(|| ClassRegistry::from_catalog(catalog::CLASSES));

impl ClassRegistry {
    /// The standard catalog shipped with the interpreter.
    pub fn standard() -> &'static ClassRegistry {
        &STANDARD
    }

    fn from_catalog(classes: &'static [ClassDescriptor]) -> Self {
        let by_key = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.key, i))
            .collect();
        let by_name = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.to_ascii_lowercase(), i))
            .collect();
        Self {
            classes,
            by_key,
            by_name,
        }
    }

    /// Describes the class with the given key (case-insensitive).
    pub fn describe(&self, key: &str) -> Result<&'static ClassDescriptor, RegistryError> {
        self.position(key)
            .map(|i| &self.classes[i])
            .ok_or_else(|| RegistryError::UnknownClass(key.to_string()))
    }

    /// Describes the class with the given name (case-insensitive).
    pub fn describe_name(&self, name: &str) -> Result<&'static ClassDescriptor, RegistryError> {
        self.position_of_name(name)
            .map(|i| &self.classes[i])
            .ok_or_else(|| RegistryError::UnknownClass(name.to_string()))
    }

    /// Every catalogued class, root first.
    pub fn all_classes(&self) -> impl Iterator<Item = &'static ClassDescriptor> + '_ {
        self.classes.iter()
    }

    /// Index of a class key within [`Self::all_classes`].
    pub fn position(&self, key: &str) -> Option<usize> {
        match self.by_key.get(key) {
            Some(&i) => Some(i),
            None => self.by_key.get(key.to_ascii_lowercase().as_str()).copied(),
        }
    }

    /// Resolves a class key to its id.
    pub fn class_id(&self, key: &str) -> Result<ClassId, RegistryError> {
        self.position(key)
            .map(ClassId)
            .ok_or_else(|| RegistryError::UnknownClass(key.to_string()))
    }

    /// Resolves a class name to its id.
    pub fn class_id_of_name(&self, name: &str) -> Option<ClassId> {
        self.position_of_name(name).map(ClassId)
    }

    /// Descriptor for an id handed out by this registry.
    pub fn descriptor(&self, id: ClassId) -> &'static ClassDescriptor {
        &self.classes[id.0]
    }

    /// Index of a class name within [`Self::all_classes`].
    pub fn position_of_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(&name.to_ascii_lowercase()).copied()
    }

    /// Descriptor at an index returned by [`Self::position`].
    pub fn get(&self, index: usize) -> Option<&'static ClassDescriptor> {
        self.classes.get(index)
    }

    /// Number of catalogued classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Walks from `name` to the root, yielding each descriptor.
    pub fn ancestry(&self, name: &str) -> Ancestry<'_> {
        Ancestry {
            registry: self,
            next: self.position_of_name(name),
        }
    }

    /// Whether `name` is `ancestor` or derives from it.
    pub fn is_a(&self, name: &str, ancestor: &str) -> bool {
        self.ancestry(name)
            .any(|c| c.name.eq_ignore_ascii_case(ancestor))
    }

    /// Finds a function on `class` or the nearest ancestor declaring it.
    pub fn resolve_function(
        &self,
        class: &str,
        function: &str,
    ) -> Option<(&'static ClassDescriptor, &'static FunctionDescriptor)> {
        self.ancestry(class)
            .find_map(|c| c.function(function).map(|f| (c, f)))
    }
}

/// Iterator returned by [`ClassRegistry::ancestry`].
pub struct Ancestry<'a> {
    registry: &'a ClassRegistry,
    next: Option<usize>,
}

impl Iterator for Ancestry<'_> {
    type Item = &'static ClassDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.registry.classes.get(self.next?)?;
        self.next = current
            .parent
            .and_then(|p| self.registry.position_of_name(p));
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_single_root() {
        let roots: Vec<_> = ClassRegistry::standard()
            .all_classes()
            .filter(|c| c.parent.is_none())
            .collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "Object");
        assert_eq!(ClassRegistry::standard().descriptor(ClassId::ROOT).name, "Object");
    }

    #[test]
    fn test_parents_are_catalogued() {
        let registry = ClassRegistry::standard();
        for class in registry.all_classes() {
            if let Some(parent) = class.parent {
                assert!(
                    registry.describe_name(parent).is_ok(),
                    "{} has unknown parent {}",
                    class.name,
                    parent
                );
            }
        }
    }

    #[test]
    fn test_keys_and_names_unique() {
        let registry = ClassRegistry::standard();
        let keys: FxHashSet<_> = registry.all_classes().map(|c| c.key).collect();
        let names: FxHashSet<_> = registry
            .all_classes()
            .map(|c| c.name.to_ascii_lowercase())
            .collect();
        assert_eq!(keys.len(), registry.len());
        assert_eq!(names.len(), registry.len());
    }

    #[test]
    fn test_keys_are_lowercase_hex() {
        for class in ClassRegistry::standard().all_classes() {
            assert_eq!(class.key.len(), 32, "{}", class.name);
            assert!(
                class
                    .key
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
                "{}",
                class.name
            );
        }
    }

    #[test]
    fn test_no_duplicate_functions_per_class() {
        for class in ClassRegistry::standard().all_classes() {
            let mut seen = FxHashSet::default();
            for f in class.functions {
                assert!(seen.insert(f.key()), "{}.{} declared twice", class.name, f.name);
            }
        }
    }

    #[test]
    fn test_describe_unknown() {
        let err = ClassRegistry::standard()
            .describe("00000000000000000000000000000000")
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownClass("00000000000000000000000000000000".into())
        );
    }

    #[test]
    fn test_describe_is_case_insensitive() {
        let registry = ClassRegistry::standard();
        let system = registry.describe_name("system").unwrap();
        let upper = system.key.to_ascii_uppercase();
        assert_eq!(registry.describe(&upper).unwrap().name, "System");
    }

    #[test]
    fn test_ancestry_and_resolution() {
        let registry = ClassRegistry::standard();
        let chain: Vec<_> = registry.ancestry("ToggleButton").map(|c| c.name).collect();
        assert_eq!(chain, ["ToggleButton", "Button", "GuiObject", "Object"]);
        assert!(registry.is_a("Layout", "Group"));
        assert!(!registry.is_a("Group", "Layout"));

        let (owner, f) = registry.resolve_function("ToggleButton", "SETALPHA").unwrap();
        assert_eq!(owner.name, "GuiObject");
        assert_eq!(f.arity(), 1);
    }

    #[test]
    fn test_value_type_parse() {
        assert_eq!(ValueType::parse("Int"), ValueType::Int);
        assert_eq!(ValueType::parse("Boolean"), ValueType::Boolean);
        assert_eq!(ValueType::parse("GuiObject"), ValueType::Object("GuiObject"));
        assert!(ValueType::parse("Double").is_numeric());
        assert!(!ValueType::parse("String").is_numeric());
    }

    #[test]
    fn test_hook_names() {
        assert!(is_hook_name("onLeftClick"));
        assert!(is_hook_name("fx_onGetPixelR"));
        assert!(!is_hook_name("on"));
        assert!(!is_hook_name("getOnTop"));
    }
}
