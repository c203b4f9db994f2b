//! Native methods on elements whose host rejects every request

use maki_interpreter::bytecode::{Assembler, Opcode};
use maki_interpreter::{
    ClassTable, ElementId, ElementInfo, HostBridge, HostError, ObjectModel, ObjectRef, Value, Vm,
    VmOptions, load,
};

/// Fails every call and counts them.
#[derive(Default)]
struct FailingHost {
    calls: usize,
}

impl FailingHost {
    fn fail(&mut self, element: ElementId) -> HostError {
        self.calls += 1;
        HostError::Gone(element)
    }
}

impl HostBridge for FailingHost {
    fn mutate(&mut self, element: ElementId, _: &str, _: &[Value]) -> Result<(), HostError> {
        Err(self.fail(element))
    }

    fn query(&mut self, element: ElementId, _: &str, _: &[Value]) -> Result<Value, HostError> {
        Err(self.fail(element))
    }

    fn find(&mut self, scope: ElementId, _: &str) -> Result<Option<ElementInfo>, HostError> {
        Err(self.fail(scope))
    }

    fn children(&mut self, element: ElementId) -> Result<Vec<ElementInfo>, HostError> {
        Err(self.fail(element))
    }

    fn parent(&mut self, element: ElementId) -> Result<Option<ElementInfo>, HostError> {
        Err(self.fail(element))
    }

    fn create(
        &mut self,
        _: &str,
        _: &str,
        parent: Option<ElementId>,
    ) -> Result<ElementInfo, HostError> {
        Err(self.fail(parent.unwrap_or(ElementId::SYSTEM)))
    }

    fn destroy(&mut self, element: ElementId) -> Result<(), HostError> {
        Err(self.fail(element))
    }

    fn script_group(&mut self) -> Result<Option<ElementInfo>, HostError> {
        Err(self.fail(ElementId::SYSTEM))
    }
}

fn model() -> ObjectModel {
    ObjectModel::with_seed(ClassTable::standard().unwrap(), Some(5))
}

fn button(model: &mut ObjectModel) -> ObjectRef {
    model.bind_element(&ElementInfo::new(ElementId(42), "Button"))
}

#[test]
fn test_invoke_falls_back_to_local_state() {
    let mut model = model();
    let mut host = FailingHost::default();
    let obj = button(&mut model);

    assert_eq!(
        model.invoke(&mut host, obj, "setAlpha", &[Value::Int(3)]),
        Ok(Value::Void)
    );
    assert_eq!(
        model.invoke(&mut host, obj, "getAlpha", &[]),
        Ok(Value::Int(3))
    );
    assert_eq!(model.invoke(&mut host, obj, "show", &[]), Ok(Value::Void));
    assert_eq!(
        model.invoke(&mut host, obj, "getParentLayout", &[]),
        Ok(Value::Null)
    );
    assert!(host.calls > 0);
}

#[test]
fn test_script_calls_survive_host_failures() {
    let mut asm = Assembler::new();
    asm.class("System");
    let button_class = asm.class("Button");
    let obj = asm.object_variable(button_class);
    let three = asm.int(3);
    let set_alpha = asm.method(button_class, "setAlpha");
    let get_alpha = asm.method(button_class, "getAlpha");
    let show = asm.method(button_class, "show");
    let get_parent_layout = asm.method(button_class, "getParentLayout");

    // obj.setAlpha(3); obj.show(); return obj.getAlpha();
    asm.push(obj).push(three).call(set_alpha).op(Opcode::Pop);
    asm.push(obj).call(show).op(Opcode::Pop);
    asm.push(obj).call(get_alpha).op(Opcode::Return);
    // return obj.getParentLayout();
    asm.push(obj).call(get_parent_layout).op(Opcode::Return);

    let mut vm = Vm::new(load(&asm.finish()).unwrap(), model(), VmOptions::default());
    let target = button(vm.model_mut());
    vm.set_variable(obj as usize, Value::Object(target));

    let mut host = FailingHost::default();
    assert_eq!(vm.call_function(&mut host, 0, &[]), Ok(Value::Int(3)));
    let entry = vm.program().code().len() - 3;
    assert_eq!(vm.call_function(&mut host, entry, &[]), Ok(Value::Null));
    assert_eq!(vm.stack_len(), 0);
    assert!(host.calls > 0);
}
