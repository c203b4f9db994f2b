// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime classes: one per catalog descriptor, each with its own method
//! table, resolved through the parent chain.
//!
//! The table is validated against the catalog when it is built. A declared
//! function without a native entry, or a native entry the catalog does not
//! declare, refuses to build. `getclassname` is the one exception: every
//! class gets its own entry answering its own name.

use std::sync::{Arc, LazyLock};

use rustc_hash::FxHashMap;

use crate::error::{CatalogError, RegistryError};
use crate::natives::{self, MethodEntry, NativeMethod};
use crate::registry::{
    ClassDescriptor, ClassId, ClassRegistry, FunctionDescriptor, ValueType, is_hook_name,
};

/// Name of the per-class method every class answers.
pub const GET_CLASS_NAME: &str = "getclassname";

/// One resolvable method.
#[derive(Debug, Clone)]
pub struct Method {
    name: &'static str,
    owner: ClassId,
    signature: Option<&'static FunctionDescriptor>,
    native: NativeMethod,
    lenient: bool,
}

impl Method {
    /// Name as spelled in the catalog.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Class whose table holds this method.
    pub fn owner(&self) -> ClassId {
        self.owner
    }

    /// Catalog signature.
    pub fn signature(&self) -> Option<&'static FunctionDescriptor> {
        self.signature
    }

    /// Native implementation.
    pub fn native(&self) -> NativeMethod {
        self.native
    }

    /// Whether numeric strings and numbers are converted into each other
    /// instead of rejected.
    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// Declared parameter count.
    pub fn arity(&self) -> usize {
        self.signature.map_or(0, FunctionDescriptor::arity)
    }

    /// Declared return type.
    pub fn returns(&self) -> Option<ValueType> {
        match self.native {
            NativeMethod::ClassName(_) => Some(ValueType::String),
            _ => self.signature.and_then(FunctionDescriptor::returns),
        }
    }

    /// Whether scripts may override this method.
    pub fn is_hook(&self) -> bool {
        is_hook_name(self.name)
    }
}

/// A class at run time.
#[derive(Debug)]
pub struct RuntimeClass {
    id: ClassId,
    descriptor: &'static ClassDescriptor,
    parent: Option<ClassId>,
    methods: FxHashMap<String, Method>,
}

impl RuntimeClass {
    /// Id shared with the registry.
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Class name.
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Catalog descriptor.
    pub fn descriptor(&self) -> &'static ClassDescriptor {
        self.descriptor
    }

    /// Parent class, `None` for the root.
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// Looks up a method in this class's own table only.
    pub fn own_method(&self, key: &str) -> Option<&Method> {
        self.methods.get(key)
    }

    /// Lowercase names in this class's own table.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

/// All runtime classes, indexed by [`ClassId`].
#[derive(Debug)]
pub struct ClassTable {
    registry: &'static ClassRegistry,
    classes: Vec<RuntimeClass>,
}

static STANDARD: LazyLock<Result<Arc<ClassTable>, CatalogError>> = LazyLock::new(|| {
    ClassTable::build(ClassRegistry::standard(), natives::table_for).map(Arc::new)
});

impl ClassTable {
    /// The standard catalog with the standard native tables.
    pub fn standard() -> Result<Arc<ClassTable>, CatalogError> {
        STANDARD.clone()
    }

    /// Builds and validates a class table.
    pub fn build<F>(registry: &'static ClassRegistry, tables: F) -> Result<Self, CatalogError>
    where
        F: Fn(&str) -> Option<Vec<(&'static str, MethodEntry)>>,
    {
        let mut classes = Vec::with_capacity(registry.len());
        for (index, descriptor) in registry.all_classes().enumerate() {
            let id = registry
                .class_id_of_name(descriptor.name)
                .ok_or_else(|| RegistryError::UnknownClass(descriptor.name.to_string()))?;
            debug_assert_eq!(id.index(), index);
            let parent = match descriptor.parent {
                Some(name) => Some(
                    registry
                        .class_id_of_name(name)
                        .ok_or_else(|| RegistryError::UnknownClass(name.to_string()))?,
                ),
                None => None,
            };
            let methods = Self::build_methods(registry, id, descriptor, tables(descriptor.name))?;
            classes.push(RuntimeClass {
                id,
                descriptor,
                parent,
                methods,
            });
        }
        Ok(Self { registry, classes })
    }

    fn build_methods(
        registry: &ClassRegistry,
        id: ClassId,
        descriptor: &'static ClassDescriptor,
        table: Option<Vec<(&'static str, MethodEntry)>>,
    ) -> Result<FxHashMap<String, Method>, CatalogError> {
        let mut methods = FxHashMap::default();
        for (name, entry) in table.unwrap_or_default() {
            let declared = descriptor
                .function(name)
                .filter(|_| name != GET_CLASS_NAME && name == name.to_ascii_lowercase());
            let Some(signature) = declared else {
                return Err(CatalogError::UndeclaredMethod {
                    class: descriptor.name.to_string(),
                    method: name.to_string(),
                });
            };
            let method = Method {
                name: signature.name,
                owner: id,
                signature: Some(signature),
                native: entry.native,
                lenient: entry.lenient,
            };
            if methods.insert(name.to_string(), method).is_some() {
                return Err(CatalogError::UndeclaredMethod {
                    class: descriptor.name.to_string(),
                    method: format!("{name} (duplicate)"),
                });
            }
        }

        for function in descriptor.functions {
            let key = function.key();
            if key != GET_CLASS_NAME && !methods.contains_key(&key) {
                return Err(CatalogError::MissingMethod {
                    class: descriptor.name.to_string(),
                    method: key,
                });
            }
        }

        let signature = registry
            .resolve_function(descriptor.name, GET_CLASS_NAME)
            .map(|(_, f)| f);
        methods.insert(
            GET_CLASS_NAME.to_string(),
            Method {
                name: signature.map_or("getClassName", |f| f.name),
                owner: id,
                signature,
                native: NativeMethod::ClassName(descriptor.name),
                lenient: false,
            },
        );
        Ok(methods)
    }

    /// The registry this table was built from.
    pub fn registry(&self) -> &'static ClassRegistry {
        self.registry
    }

    /// Class by id.
    pub fn get(&self, id: ClassId) -> &RuntimeClass {
        &self.classes[id.index()]
    }

    /// Class id by name.
    pub fn by_name(&self, name: &str) -> Option<ClassId> {
        self.registry.class_id_of_name(name)
    }

    /// Class id by key.
    pub fn by_key(&self, key: &str) -> Result<ClassId, RegistryError> {
        self.registry.class_id(key)
    }

    /// The parent of a class.
    pub fn parent(&self, id: ClassId) -> Option<&RuntimeClass> {
        self.get(id).parent.map(|p| self.get(p))
    }

    /// Resolves a method by walking from `id` toward the root.
    pub fn resolve(&self, id: ClassId, name: &str) -> Option<&Method> {
        let key = name.to_ascii_lowercase();
        let mut current = Some(id);
        while let Some(class) = current.map(|c| self.get(c)) {
            if let Some(method) = class.methods.get(&key) {
                return Some(method);
            }
            current = class.parent;
        }
        None
    }

    /// Whether `id` is `ancestor` or derives from it.
    pub fn is_a(&self, id: ClassId, ancestor: ClassId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.get(c).parent;
        }
        false
    }

    /// All classes, in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &RuntimeClass> {
        self.classes.iter()
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::natives::hook;

    fn table() -> Arc<ClassTable> {
        ClassTable::standard().expect("standard table validates")
    }

    #[test]
    fn test_resolve_walks_parents() {
        let table = table();
        let layout = table.by_name("Layout").unwrap();
        let show = table.resolve(layout, "Show").unwrap();
        assert_eq!(show.owner(), table.by_name("GuiObject").unwrap());
        assert_eq!(show.name(), "show");
    }

    #[test]
    fn test_get_class_name_is_per_class() {
        let table = table();
        for class in table.iter() {
            let method = class.own_method(GET_CLASS_NAME).unwrap();
            assert_eq!(method.owner(), class.id());
            assert!(matches!(method.native(), NativeMethod::ClassName(n) if n == class.name()));
        }
    }

    #[test]
    fn test_unknown_method_does_not_resolve() {
        let table = table();
        let button = table.by_name("Button").unwrap();
        assert!(table.resolve(button, "fly").is_none());
    }

    #[test]
    fn test_is_a() {
        let table = table();
        let toggle = table.by_name("ToggleButton").unwrap();
        let gui = table.by_name("GuiObject").unwrap();
        assert!(table.is_a(toggle, gui));
        assert!(!table.is_a(gui, toggle));
    }

    #[test]
    fn test_missing_method_rejected() {
        let err = ClassTable::build(ClassRegistry::standard(), |_| None).unwrap_err();
        assert!(matches!(err, CatalogError::MissingMethod { .. }));
    }

    #[test]
    fn test_undeclared_method_rejected() {
        let err = ClassTable::build(ClassRegistry::standard(), |name| {
            let mut table = natives::table_for(name)?;
            if name == "Timer" {
                table.push(("explode", hook()));
            }
            Some(table)
        })
        .unwrap_err();
        assert_eq!(
            err,
            CatalogError::UndeclaredMethod {
                class: "Timer".into(),
                method: "explode".into()
            }
        );
    }
}
