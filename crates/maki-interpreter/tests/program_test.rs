//! Loader and VM behavior on assembled programs

use maki_interpreter::bytecode::{Assembler, Opcode};
use maki_interpreter::error::{ExecutionFault, LoadError, Malformed};
use maki_interpreter::{ClassTable, NullHost, ObjectModel, Value, Vm, VmOptions, load};
use maki_macros::{assert_err, assert_matches, assert_ok};

fn model() -> ObjectModel {
    ObjectModel::with_seed(ClassTable::standard().unwrap(), Some(3))
}

fn vm_with(asm: &Assembler, options: VmOptions) -> Vm {
    Vm::new(load(&asm.finish()).unwrap(), model(), options)
}

fn vm(asm: &Assembler) -> Vm {
    vm_with(asm, VmOptions::default())
}

fn malformed(asm: &Assembler) -> Malformed {
    match load(&asm.finish()) {
        Err(LoadError::MalformedProgram { reason, .. }) => reason,
        other => panic!("expected a malformed program, got {other:?}"),
    }
}

/// A program with the System class at index 0.
fn system_program() -> Assembler {
    let mut asm = Assembler::new();
    asm.class("System");
    asm
}

// ============================================================================
// Expressions and control flow
// ============================================================================

#[test]
fn test_arithmetic_and_assignment() {
    let mut asm = system_program();
    let three = asm.int(3);
    let four = asm.int(4);
    let two = asm.int(2);
    let out = asm.int(0);
    asm.push(out).push(three).push(four).op(Opcode::Add);
    asm.push(two).op(Opcode::Mul).op(Opcode::Mov).op(Opcode::Pop);
    asm.push(out).op(Opcode::Return);

    let mut vm = vm(&asm);
    assert_eq!(vm.call_function(&mut NullHost, 0, &[]), Ok(Value::Int(14)));
    assert_eq!(vm.variable(out as usize), Some(&Value::Int(14)));
}

#[test]
fn test_string_concatenation() {
    let mut asm = system_program();
    let prefix = asm.string("track ");
    let n = asm.int(4);
    asm.push(prefix).push(n).op(Opcode::Add).op(Opcode::Return);

    let mut vm = vm(&asm);
    assert_eq!(
        vm.call_function(&mut NullHost, 0, &[]),
        Ok(Value::from("track 4"))
    );
}

#[test]
fn test_loop_sums_one_to_ten() {
    let mut asm = system_program();
    let i = asm.int(0);
    let sum = asm.int(0);
    let ten = asm.int(10);
    let top = asm.label();
    let done = asm.label();

    asm.bind(top);
    asm.push(i).push(ten).op(Opcode::Lt).jump(Opcode::JumpIfFalse, done);
    asm.push(i).op(Opcode::PreInc).op(Opcode::Pop);
    asm.push(sum).push(sum).push(i).op(Opcode::Add).op(Opcode::Mov).op(Opcode::Pop);
    asm.jump(Opcode::Jump, top);
    asm.bind(done);
    asm.push(sum).op(Opcode::Return);

    let mut vm = vm(&asm);
    assert_eq!(vm.call_function(&mut NullHost, 0, &[]), Ok(Value::Int(55)));
}

#[test]
fn test_call_global_passes_arguments_and_result() {
    let mut asm = system_program();
    let five = asm.int(5);
    let param = asm.int(0);
    let double = asm.label();

    asm.push(five).jump(Opcode::CallGlobal, double).op(Opcode::Return);
    asm.bind(double);
    asm.pop_to(param).push(param).push(param).op(Opcode::Add).op(Opcode::Return);

    let mut vm = vm(&asm);
    assert_eq!(vm.call_function(&mut NullHost, 0, &[]), Ok(Value::Int(10)));
    assert_eq!(vm.stack_len(), 0);
}

#[test]
fn test_increment_forms() {
    let mut asm = system_program();
    let n = asm.int(5);
    let a = asm.int(0);
    let b = asm.int(0);
    // a = n++; b = --n;
    asm.push(a).push(n).op(Opcode::PostInc).op(Opcode::Mov).op(Opcode::Pop);
    asm.push(b).push(n).op(Opcode::PreDec).op(Opcode::Mov).op(Opcode::Pop);
    asm.op(Opcode::Return);

    let mut vm = vm(&asm);
    assert_ok!(vm.call_function(&mut NullHost, 0, &[]));
    assert_eq!(vm.variable(a as usize), Some(&Value::Int(5)));
    assert_eq!(vm.variable(b as usize), Some(&Value::Int(5)));
    assert_eq!(vm.variable(n as usize), Some(&Value::Int(5)));
}

#[test]
fn test_float_variable_keeps_its_type() {
    let mut asm = system_program();
    let f = asm.float(0.0);
    let seven = asm.int(7);
    asm.push(f).push(seven).op(Opcode::Mov).op(Opcode::Return);

    let mut vm = vm(&asm);
    assert_eq!(vm.call_function(&mut NullHost, 0, &[]), Ok(Value::Float(7.0)));
}

// ============================================================================
// Method calls
// ============================================================================

#[test]
fn test_native_call_argument_order() {
    let mut asm = system_program();
    let sys = asm.system_variable(0);
    let s = asm.string("a,b,c");
    let sep = asm.string(",");
    let one = asm.int(1);
    let get_token = asm.method(0, "getToken");
    asm.push(sys).push(one).push(sep).push(s).call(get_token).op(Opcode::Return);
    let strict = asm.label();
    asm.bind(strict);
    asm.push(sys).push(one).push(sep).push(s);
    asm.call_strict(get_token, 3).op(Opcode::Return);

    let mut vm = vm(&asm);
    assert_eq!(vm.call_function(&mut NullHost, 0, &[]), Ok(Value::from("b")));
    let entry = vm.program().code().len() - 6;
    assert_eq!(
        vm.call_function(&mut NullHost, entry, &[]),
        Ok(Value::from("b"))
    );
}

#[test]
fn test_undefined_method_yields_default_and_continues() {
    let mut asm = system_program();
    let sys = asm.system_variable(0);
    let one = asm.int(1);
    let missing = asm.method(0, "fooBar");
    asm.push(sys).call(missing).op(Opcode::Pop);
    asm.push(sys).push(one).call_strict(missing, 1).op(Opcode::Pop);
    asm.push(one).op(Opcode::Return);

    let mut vm = vm(&asm);
    assert_eq!(vm.call_function(&mut NullHost, 0, &[]), Ok(Value::Int(1)));
}

#[test]
fn test_call_on_null_yields_declared_default() {
    let mut asm = system_program();
    let gui = asm.class("GuiObject");
    let obj = asm.object_variable(gui);
    let get_alpha = asm.method(gui, "getAlpha");
    asm.push(obj).call(get_alpha).op(Opcode::Return);

    let mut vm = vm(&asm);
    assert_eq!(vm.call_function(&mut NullHost, 0, &[]), Ok(Value::Int(0)));
}

#[test]
fn test_strict_native_mismatch_faults() {
    let mut asm = system_program();
    let sys = asm.system_variable(0);
    let n = asm.int(3);
    let strlen = asm.method(0, "strlen");
    asm.push(sys).push(n).call(strlen).op(Opcode::Return);

    let mut vm = vm(&asm);
    assert_matches!(
        vm.call_function(&mut NullHost, 0, &[]),
        Err(ExecutionFault::CallFailed { offset: 10, .. })
    );
}

#[test]
fn test_new_and_delete() {
    let mut asm = system_program();
    let list_class = asm.class("List");
    let list = asm.object_variable(list_class);
    asm.push(list).new_instance(list_class).op(Opcode::Mov).op(Opcode::Pop);
    asm.push(list).op(Opcode::Delete).op(Opcode::Pop);
    asm.op(Opcode::Return);

    let mut vm = vm(&asm);
    let before = vm.model().len();
    assert_ok!(vm.call_function(&mut NullHost, 0, &[]));
    let handle = vm.variable(list as usize).and_then(Value::as_object).unwrap();
    assert!(!vm.model().is_alive(handle));
    assert_eq!(vm.model().len(), before);
}

// ============================================================================
// Faults
// ============================================================================

#[test]
fn test_stack_underflow_resets_and_recovers() {
    let mut asm = system_program();
    let one = asm.int(1);
    asm.op(Opcode::Pop);
    asm.push(one).op(Opcode::Return);

    let mut vm = vm(&asm);
    assert_eq!(
        vm.call_function(&mut NullHost, 0, &[]),
        Err(ExecutionFault::StackUnderflow { offset: 0 })
    );
    assert_eq!(vm.stack_len(), 0);
    assert_eq!(vm.depth(), 0);
    assert_eq!(vm.call_function(&mut NullHost, 1, &[]), Ok(Value::Int(1)));
}

#[test]
fn test_integer_division_by_zero() {
    let mut asm = system_program();
    let one = asm.int(1);
    let zero = asm.int(0);
    asm.push(one).push(zero).op(Opcode::Div).op(Opcode::Return);

    let mut vm = vm(&asm);
    assert_eq!(
        vm.call_function(&mut NullHost, 0, &[]),
        Err(ExecutionFault::DivisionByZero { offset: 10 })
    );
}

#[test]
fn test_instruction_budget() {
    let mut asm = system_program();
    let top = asm.label();
    asm.bind(top);
    asm.jump(Opcode::Jump, top);

    let options = VmOptions {
        instruction_budget: 1_000,
        ..VmOptions::default()
    };
    let mut vm = vm_with(&asm, options);
    assert_eq!(
        vm.call_function(&mut NullHost, 0, &[]),
        Err(ExecutionFault::BudgetExhausted { budget: 1_000 })
    );
}

#[test]
fn test_call_depth_limit() {
    let mut asm = system_program();
    let top = asm.label();
    asm.bind(top);
    asm.jump(Opcode::CallGlobal, top);

    let options = VmOptions {
        max_call_depth: 8,
        ..VmOptions::default()
    };
    let mut vm = vm_with(&asm, options);
    assert_eq!(
        vm.call_function(&mut NullHost, 0, &[]),
        Err(ExecutionFault::CallDepthExceeded { limit: 8 })
    );
    assert_eq!(vm.depth(), 0);
}

#[test]
fn test_strict_truthiness() {
    let mut asm = system_program();
    let one = asm.int(1);
    let end = asm.label();
    asm.push(one).jump(Opcode::JumpIfFalse, end);
    asm.bind(end);
    asm.op(Opcode::Return);

    let options = VmOptions {
        loose_truthiness: false,
        ..VmOptions::default()
    };
    let mut strict = vm_with(&asm, options);
    assert_eq!(
        strict.call_function(&mut NullHost, 0, &[]),
        Err(ExecutionFault::TypeMismatch {
            offset: 5,
            expected: "boolean",
            found: "int",
        })
    );
    assert_ok!(vm(&asm).call_function(&mut NullHost, 0, &[]));
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_handler_receives_arguments_in_order() {
    let mut asm = system_program();
    let gui = asm.class("GuiObject");
    let obj = asm.object_variable(gui);
    let on_resize = asm.method(gui, "onResize");
    let slots: Vec<u32> = (0..4).map(|_| asm.int(0)).collect();
    let handler = asm.label();
    asm.bind(handler);
    for &slot in &slots {
        asm.pop_to(slot);
    }
    asm.op(Opcode::Return);
    asm.on(obj, on_resize, handler);

    let mut vm = vm(&asm);
    let target = vm.model_mut().create_instance_by_name("GuiObject").unwrap();
    vm.set_variable(obj as usize, Value::Object(target));

    let args = [Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)];
    assert_ok!(vm.deliver_event(&mut NullHost, target, "onresize", &args));
    let seen: Vec<_> = slots
        .iter()
        .map(|&s| vm.variable(s as usize).cloned().unwrap())
        .collect();
    assert_eq!(seen, args);
}

/// `onScriptLoaded` creates a button and clicks it; the click handler counts.
/// Returns the button and counter variables.
fn click_program() -> (Assembler, u32, u32) {
    let mut asm = system_program();
    let sys = asm.system_variable(0);
    let button_class = asm.class("Button");
    let button = asm.object_variable(button_class);
    let clicks = asm.int(0);
    let loaded = asm.method(0, "onScriptLoaded");
    let left_click = asm.method(button_class, "leftClick");
    let on_left_click = asm.method(button_class, "onLeftClick");

    let on_loaded = asm.label();
    asm.bind(on_loaded);
    asm.push(button)
        .new_instance(button_class)
        .op(Opcode::Mov)
        .op(Opcode::Pop);
    asm.push(button).call(left_click).op(Opcode::Pop);
    asm.push(clicks).op(Opcode::Return);

    let on_click = asm.label();
    asm.bind(on_click);
    asm.push(clicks).op(Opcode::PreInc).op(Opcode::Pop);
    asm.op(Opcode::Return);

    asm.on(sys, loaded, on_loaded);
    asm.on(button, on_left_click, on_click);
    (asm, button, clicks)
}

#[test]
fn test_queued_events_run_after_the_current_delivery() {
    let (asm, _, clicks) = click_program();
    let mut vm = vm(&asm);
    let system = vm.system();

    // The handler observes the counter before the click is delivered.
    assert_eq!(
        vm.deliver_event(&mut NullHost, system, "onScriptLoaded", &[]),
        Ok(Value::Int(0))
    );
    assert_eq!(vm.variable(clicks as usize), Some(&Value::Int(1)));
    assert_eq!(vm.model().pending_len(), 0);
}

#[test]
fn test_start_and_unload() {
    let mut asm = system_program();
    let sys = asm.system_variable(0);
    let flags = asm.int(0);
    let ten = asm.int(10);
    let loaded = asm.method(0, "onScriptLoaded");
    let unloading = asm.method(0, "onScriptUnloading");

    let on_loaded = asm.label();
    asm.bind(on_loaded);
    asm.push(flags).op(Opcode::PreInc).op(Opcode::Pop).op(Opcode::Return);
    let on_unloading = asm.label();
    asm.bind(on_unloading);
    asm.push(flags).push(flags).push(ten).op(Opcode::Add);
    asm.op(Opcode::Mov).op(Opcode::Pop).op(Opcode::Return);
    asm.on(sys, loaded, on_loaded);
    asm.on(sys, unloading, on_unloading);

    let mut vm = vm(&asm);
    assert_ok!(vm.start(&mut NullHost));
    assert_eq!(vm.variable(flags as usize), Some(&Value::Int(1)));
    vm.model_mut().create_instance_by_name("Timer").unwrap();

    assert_ok!(vm.unload(&mut NullHost));
    assert_eq!(vm.variable(flags as usize), Some(&Value::Int(11)));
    assert!(vm.model().is_empty());
    assert_eq!(vm.variable(sys as usize), Some(&Value::Null));
}

#[test]
fn test_timer_fires_once_per_tick() {
    let mut asm = system_program();
    let timer_class = asm.class("Timer");
    let timer = asm.object_variable(timer_class);
    let hundred = asm.int(100);
    let fired = asm.int(0);
    let set_delay = asm.method(timer_class, "setDelay");
    let start = asm.method(timer_class, "start");
    let on_timer = asm.method(timer_class, "onTimer");

    asm.push(timer).new_instance(timer_class).op(Opcode::Mov).op(Opcode::Pop);
    asm.push(timer).push(hundred).call(set_delay).op(Opcode::Pop);
    asm.push(timer).call(start).op(Opcode::Pop);
    asm.op(Opcode::Return);
    let handler = asm.label();
    asm.bind(handler);
    asm.push(fired).op(Opcode::PreInc).op(Opcode::Pop).op(Opcode::Return);
    asm.on(timer, on_timer, handler);

    let mut vm = vm(&asm);
    assert_ok!(vm.call_function(&mut NullHost, 0, &[]));

    assert_ok!(vm.tick(&mut NullHost, 50));
    assert_eq!(vm.variable(fired as usize), Some(&Value::Int(0)));
    assert_ok!(vm.tick(&mut NullHost, 100));
    assert_eq!(vm.variable(fired as usize), Some(&Value::Int(1)));
    assert_ok!(vm.tick(&mut NullHost, 450));
    assert_eq!(vm.variable(fired as usize), Some(&Value::Int(2)));
}

#[test]
fn test_fault_in_handler_leaves_session_usable() {
    let (mut asm, button_var, clicks) = click_program();
    let on_right_up = asm.method(1, "onRightButtonUp");
    let broken = asm.label();
    asm.bind(broken);
    asm.op(Opcode::Pop).op(Opcode::Return);
    asm.on(button_var, on_right_up, broken);

    let mut vm = vm(&asm);
    assert_ok!(vm.start(&mut NullHost));
    let button = vm
        .variable(button_var as usize)
        .and_then(Value::as_object)
        .unwrap();

    let fault = assert_err!(vm.deliver_event(&mut NullHost, button, "onRightButtonUp", &[]));
    assert_matches!(fault, ExecutionFault::StackUnderflow { .. });
    assert_eq!(vm.stack_len(), 0);

    assert_ok!(vm.deliver_event(&mut NullHost, button, "onLeftClick", &[]));
    assert_eq!(vm.variable(clicks as usize), Some(&Value::Int(2)));
}

// ============================================================================
// Load-time validation
// ============================================================================

#[test]
fn test_strict_call_arity_checked_at_load() {
    let mut asm = system_program();
    let sys = asm.system_variable(0);
    let get_token = asm.method(0, "getToken");
    asm.push(sys).call_strict(get_token, 2).op(Opcode::Return);

    assert_eq!(
        malformed(&asm),
        Malformed::Arity {
            method: "System.getToken".to_string(),
            given: 2,
            declared: 3,
        }
    );
}

#[test]
fn test_jump_into_operand_is_rejected() {
    let mut asm = system_program();
    asm.raw(&[Opcode::Jump as u8, 0xfd, 0xff, 0xff, 0xff]);
    assert_eq!(malformed(&asm), Malformed::CodeOffset(2));

    let mut asm = system_program();
    asm.raw(&[Opcode::Jump as u8, 100, 0, 0, 0]);
    assert_eq!(malformed(&asm), Malformed::CodeOffset(105));
}

#[test]
fn test_binding_must_start_an_instruction() {
    let mut asm = system_program();
    let sys = asm.system_variable(0);
    let loaded = asm.method(0, "onScriptLoaded");
    asm.raw(&[Opcode::Push as u8]);
    let inside = asm.label();
    asm.bind(inside);
    asm.raw(&[0, 0, 0, 0]);
    asm.on(sys, loaded, inside);

    assert_eq!(malformed(&asm), Malformed::CodeOffset(1));
}

#[test]
fn test_bad_indices_and_opcodes() {
    let mut asm = system_program();
    asm.push(99);
    assert_eq!(malformed(&asm), Malformed::VariableIndex(99));

    let mut asm = system_program();
    asm.call(0);
    assert_eq!(malformed(&asm), Malformed::MethodIndex(0));

    let mut asm = system_program();
    asm.new_instance(4);
    assert_eq!(malformed(&asm), Malformed::ClassIndex(4));

    let mut asm = system_program();
    asm.method(3, "getToken");
    assert_eq!(malformed(&asm), Malformed::ClassIndex(3));

    let mut asm = system_program();
    asm.raw(&[99]);
    assert_eq!(malformed(&asm), Malformed::Opcode(99));
}

#[test]
fn test_truncated_operand() {
    let mut asm = system_program();
    asm.int(0);
    asm.raw(&[Opcode::Push as u8, 0, 0]);
    assert_eq!(malformed(&asm), Malformed::Truncated("code"));
}
