//! Catalog conformance tests
//!
//! The runtime class table must agree with the static catalog exactly: every
//! declared function implemented, nothing implemented that is not declared,
//! and every class answering its own name.

use std::collections::BTreeSet;

use maki_interpreter::bytecode::{Assembler, Opcode};
use maki_interpreter::error::LoadError;
use maki_interpreter::registry::ClassRegistry;
use maki_interpreter::runtime::class::GET_CLASS_NAME;
use maki_interpreter::{ClassTable, NullHost, ObjectModel, Value, VmOptions, Vm, load};
use maki_macros::assert_matches;

fn model() -> ObjectModel {
    ObjectModel::with_seed(ClassTable::standard().unwrap(), Some(42))
}

#[test]
fn test_every_class_answers_its_own_name() {
    let mut model = model();
    for class in ClassRegistry::standard().all_classes() {
        let instance = model.create_instance_by_key(class.key).unwrap();
        let name = model
            .invoke(&mut NullHost, instance, "getClassName", &[])
            .unwrap();
        assert_eq!(name, Value::from(class.name), "class {}", class.name);
    }
}

#[test]
fn test_parent_chain_matches_catalog() {
    let table = ClassTable::standard().unwrap();
    let mut model = model();
    let mut roots = 0;
    for runtime in table.iter() {
        let descriptor = runtime.descriptor();
        match (table.parent(runtime.id()), descriptor.parent) {
            (Some(parent), Some(expected)) => {
                let instance = model.create_instance(parent.id());
                let name = model
                    .invoke(&mut NullHost, instance, "getclassname", &[])
                    .unwrap();
                assert_eq!(name, Value::from(expected), "parent of {}", descriptor.name);
            }
            (None, None) => roots += 1,
            (actual, expected) => panic!(
                "{}: runtime parent {:?}, catalog parent {:?}",
                descriptor.name,
                actual.map(|p| p.name()),
                expected
            ),
        }
    }
    assert_eq!(roots, 1);
}

#[test]
fn test_implemented_methods_match_declared_functions() {
    let table = ClassTable::standard().unwrap();

    let declared: BTreeSet<String> = ClassRegistry::standard()
        .all_classes()
        .flat_map(|c| {
            c.functions
                .iter()
                .map(move |f| format!("{}.{}", c.name, f.key()))
        })
        .filter(|pair| !pair.ends_with(&format!(".{GET_CLASS_NAME}")))
        .collect();

    let implemented: BTreeSet<String> = table
        .iter()
        .flat_map(|c| {
            c.method_names()
                .filter(|m| *m != GET_CLASS_NAME)
                .map(|m| format!("{}.{m}", c.name()))
                .collect::<Vec<_>>()
        })
        .collect();

    let missing: Vec<_> = declared.difference(&implemented).collect();
    let extra: Vec<_> = implemented.difference(&declared).collect();
    assert!(missing.is_empty(), "declared but not implemented: {missing:?}");
    assert!(extra.is_empty(), "implemented but not declared: {extra:?}");
}

#[test]
fn test_inherited_method_matches_parent_behavior() {
    let registry = ClassRegistry::standard();
    let mut model = model();

    let base = model.create_instance_by_name("GuiObject").unwrap();
    model
        .invoke(&mut NullHost, base, "setAlpha", &[Value::Int(77)])
        .unwrap();
    let expected = model.invoke(&mut NullHost, base, "getAlpha", &[]).unwrap();
    assert_eq!(expected, Value::Int(77));

    for class in registry
        .all_classes()
        .filter(|c| c.name != "GuiObject" && registry.is_a(c.name, "GuiObject"))
    {
        let instance = model.create_instance_by_name(class.name).unwrap();
        model
            .invoke(&mut NullHost, instance, "setAlpha", &[Value::Int(77)])
            .unwrap();
        let alpha = model
            .invoke(&mut NullHost, instance, "getAlpha", &[])
            .unwrap();
        assert_eq!(alpha, expected, "class {}", class.name);
    }
}

#[test]
fn test_undeclared_method_returns_default() {
    let mut model = model();
    for class in ClassRegistry::standard().all_classes() {
        let instance = model.create_instance_by_key(class.key).unwrap();
        let result = model.invoke(&mut NullHost, instance, "noSuchMethodAnywhere", &[Value::Int(1)]);
        assert_eq!(result, Ok(Value::Void), "class {}", class.name);
    }
}

#[test]
fn test_minimal_program_returns_one() {
    let mut asm = Assembler::new();
    asm.class("System");
    let one = asm.int(1);
    asm.push(one).op(Opcode::Return);

    let program = load(&asm.finish()).unwrap();
    assert_eq!(program.classes().len(), 1);
    assert_eq!(program.code().len(), 2);

    let mut vm = Vm::new(program, model(), VmOptions::default());
    let result = vm.call_function(&mut NullHost, 0, &[]).unwrap();
    assert_eq!(result, Value::Int(1));
    assert_eq!(vm.stack_len(), 0);
    assert_eq!(vm.depth(), 0);
}

#[test]
fn test_unknown_class_key_is_rejected() {
    let mut asm = Assembler::new();
    asm.class("System");
    asm.class_key("0123456789abcdef0123456789abcdef");
    asm.op(Opcode::Return);

    assert_matches!(
        load(&asm.finish()),
        Err(LoadError::UnknownClass { ref key }) if key == "0123456789abcdef0123456789abcdef"
    );
}

#[test]
fn test_script_override_replaces_native_hook() {
    let mut asm = Assembler::new();
    let gui_tree = asm.class("GuiTree");
    let tree = asm.object_variable(gui_tree);
    let want_menu = asm.method(gui_tree, "onWantAutoContextMenu");
    let seven = asm.int(7);
    let calls = asm.int(0);

    let handler = asm.label();
    asm.bind(handler);
    asm.push(calls).op(Opcode::PostInc).op(Opcode::Pop);
    asm.push(seven).op(Opcode::Return);
    asm.on(tree, want_menu, handler);

    let program = load(&asm.finish()).unwrap();
    let mut vm = Vm::new(program, model(), VmOptions::default());
    let mut host = NullHost;

    let plain = vm.model_mut().create_instance_by_name("GuiTree").unwrap();
    let bound = vm.model_mut().create_instance_by_name("GuiTree").unwrap();
    vm.set_variable(tree as usize, Value::Object(bound));

    // The native default answers 0; the override answers 7, once.
    assert_eq!(
        vm.deliver_event(&mut host, plain, "onWantAutoContextMenu", &[]),
        Ok(Value::Int(0))
    );
    assert_eq!(
        vm.deliver_event(&mut host, bound, "onWantAutoContextMenu", &[]),
        Ok(Value::Int(7))
    );
    assert_eq!(vm.variable(calls as usize), Some(&Value::Int(1)));
}
