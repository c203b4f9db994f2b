//! Session and event loop behavior against the in-memory host

use std::io::Write;
use std::time::Duration;

use maki_host::{
    Config, EventLoop, EventTarget, HostEvent, LoopStats, MemoryBridge, Session, SessionError,
};
use maki_interpreter::bytecode::{Assembler, Opcode};
use maki_interpreter::error::ExecutionFault;
use maki_interpreter::{ElementId, Value};
use maki_macros::{assert_matches, assert_ok};

const LAYOUT: &str = r#"
    [[element]]
    id = "main"
    class = "Layout"
    script_group = true

    [[element]]
    id = "play"
    class = "Button"
    parent = "main"
"#;

/// Variables of [`player_program`].
struct Player {
    button: usize,
    clicks: usize,
    ticks: usize,
}

/// On load: finds the `play` button, sets its alpha and starts a 50ms
/// timer. Counts button clicks and timer ticks.
fn player_program() -> (Vec<u8>, Player) {
    let mut asm = Assembler::new();
    let system = asm.class("System");
    let gui = asm.class("GuiObject");
    let button_class = asm.class("Button");
    let timer_class = asm.class("Timer");

    let sys = asm.system_variable(system);
    let button = asm.object_variable(button_class);
    let timer = asm.object_variable(timer_class);
    let clicks = asm.int(0);
    let ticks = asm.int(0);
    let play = asm.string("play");
    let alpha = asm.int(50);
    let delay = asm.int(50);

    let loaded = asm.method(system, "onScriptLoaded");
    let script_group = asm.method(system, "getScriptGroup");
    let find_object = asm.method(gui, "findObject");
    let set_alpha = asm.method(gui, "setAlpha");
    let on_left_click = asm.method(button_class, "onLeftClick");
    let set_delay = asm.method(timer_class, "setDelay");
    let start = asm.method(timer_class, "start");
    let on_timer = asm.method(timer_class, "onTimer");

    let on_loaded = asm.label();
    asm.bind(on_loaded);
    // button = getScriptGroup().findObject("play")
    asm.push(button).push(sys).call(script_group);
    asm.push(play).call(find_object).op(Opcode::Mov).op(Opcode::Pop);
    asm.push(button).push(alpha).call(set_alpha).op(Opcode::Pop);
    asm.push(timer).new_instance(timer_class).op(Opcode::Mov).op(Opcode::Pop);
    asm.push(timer).push(delay).call(set_delay).op(Opcode::Pop);
    asm.push(timer).call(start).op(Opcode::Pop);
    asm.op(Opcode::Return);

    let on_click = asm.label();
    asm.bind(on_click);
    asm.push(clicks).op(Opcode::PreInc).op(Opcode::Return);

    let on_tick = asm.label();
    asm.bind(on_tick);
    asm.push(ticks).op(Opcode::PreInc).op(Opcode::Pop).op(Opcode::Return);

    asm.on(sys, loaded, on_loaded);
    asm.on(button, on_left_click, on_click);
    asm.on(timer, on_timer, on_tick);

    let vars = Player {
        button: button as usize,
        clicks: clicks as usize,
        ticks: ticks as usize,
    };
    (asm.finish(), vars)
}

fn started() -> (Session, Player) {
    let (bytes, vars) = player_program();
    let bridge = MemoryBridge::from_layout(LAYOUT).unwrap();
    let mut session = Session::from_bytes(&bytes, &Config::default())
        .unwrap()
        .with_bridge(bridge);
    assert_ok!(session.start());
    (session, vars)
}

fn int(session: &Session, variable: usize) -> Value {
    session.vm().variable(variable).cloned().unwrap()
}

#[test]
fn test_open_reads_file() {
    let (bytes, _) = player_program();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();

    let session = assert_ok!(Session::open(file.path(), &Config::default()));
    assert_eq!(session.vm().program().bindings().len(), 3);
    assert!(!session.is_started());

    let missing = Session::open(&file.path().with_extension("gone"), &Config::default());
    assert_matches!(missing, Err(SessionError::Io { .. }));
}

#[test]
fn test_start_binds_layout_elements() {
    let (session, vars) = started();
    let play = session.bridge().lookup("play").unwrap();

    let button = session.vm().variable(vars.button).and_then(Value::as_object);
    assert!(button.is_some());
    assert_eq!(session.vm().model().instance_for_element(play), button);
    assert_eq!(session.bridge().property(play, "alpha"), Some(&Value::Int(50)));
}

#[test]
fn test_element_event_reaches_script_handler() {
    let (mut session, vars) = started();
    let play = session.bridge().lookup("play").unwrap();

    let event = HostEvent::new(EventTarget::Element(play), "onLeftClick");
    assert_eq!(session.dispatch(&event).unwrap(), Value::Int(1));
    let by_variable: HostEvent = format!("{}:onLeftClick", vars.button).parse().unwrap();
    assert_ok!(session.dispatch(&by_variable));
    assert_eq!(int(&session, vars.clicks), Value::Int(2));
}

#[test]
fn test_unknown_targets() {
    let (mut session, _) = started();
    let err = session
        .dispatch(&HostEvent::new(EventTarget::Variable(999), "onTimer"))
        .unwrap_err();
    assert_matches!(err, SessionError::UnknownTarget(_));

    let err = session
        .dispatch(&HostEvent::new(EventTarget::Element(ElementId(777)), "onTimer"))
        .unwrap_err();
    assert_matches!(err, SessionError::UnknownTarget(_));
}

#[test]
fn test_advance_fires_timer() {
    let (mut session, vars) = started();
    assert_ok!(session.advance(40));
    assert_eq!(int(&session, vars.ticks), Value::Int(0));
    assert_ok!(session.advance(10));
    assert_eq!(int(&session, vars.ticks), Value::Int(1));
    assert_ok!(session.advance(120));
    assert_eq!(int(&session, vars.ticks), Value::Int(2));
    assert_eq!(session.clock_ms(), 170);
}

#[test]
fn test_destroyed_element_invalidates_instance() {
    let (mut session, vars) = started();
    let main = session.bridge().lookup("main").unwrap();
    let play = session.bridge().lookup("play").unwrap();
    let button = session
        .vm()
        .variable(vars.button)
        .and_then(Value::as_object)
        .unwrap();

    // The layout was found through getScriptGroup, so it is bound too.
    assert_eq!(session.destroy_element(main), 2);
    assert!(!session.vm().model().is_alive(button));

    let err = session
        .dispatch(&HostEvent::new(EventTarget::Element(play), "onLeftClick"))
        .unwrap_err();
    assert_matches!(err, SessionError::UnknownTarget(_));
    // The variable still holds the dead handle; the event is dropped.
    let event = HostEvent::new(EventTarget::Variable(vars.button), "onLeftClick");
    assert_eq!(session.dispatch(&event).unwrap(), Value::Void);
}

#[test]
fn test_fault_leaves_session_usable() {
    let mut asm = Assembler::new();
    let system = asm.class("System");
    let sys = asm.system_variable(system);
    let count = asm.int(0);
    let broken = asm.method(system, "onQuit");
    let fine = asm.method(system, "onScriptLoaded");

    let on_broken = asm.label();
    asm.bind(on_broken);
    asm.op(Opcode::Pop).op(Opcode::Return);
    let on_fine = asm.label();
    asm.bind(on_fine);
    asm.push(count).op(Opcode::PreInc).op(Opcode::Pop).op(Opcode::Return);
    asm.on(sys, broken, on_broken);
    asm.on(sys, fine, on_fine);

    let mut session = Session::from_bytes(&asm.finish(), &Config::default()).unwrap();
    let err = session
        .dispatch(&"system:onQuit".parse().unwrap())
        .unwrap_err();
    assert!(err.is_fault());
    assert_matches!(
        err,
        SessionError::Execution(ExecutionFault::StackUnderflow { .. })
    );

    assert_ok!(session.start());
    assert_eq!(int(&session, count as usize), Value::Int(1));
}

#[test]
fn test_unload_destroys_instances() {
    let (mut session, _) = started();
    assert!(!session.vm().model().is_empty());
    assert_ok!(session.unload());
    assert!(session.vm().model().is_empty());
    assert!(!session.is_started());
}

#[test]
fn test_config_limits_apply() {
    let mut asm = Assembler::new();
    asm.class("System");
    let top = asm.label();
    asm.bind(top);
    asm.jump(Opcode::Jump, top);

    let mut config = Config::default();
    config.set("instruction_budget", "500").unwrap();
    let mut session = Session::from_bytes(&asm.finish(), &config).unwrap();
    let fault = session.vm_mut().call_function(&mut MemoryBridge::new(), 0, &[]);
    assert_eq!(fault, Err(ExecutionFault::BudgetExhausted { budget: 500 }));
}

#[tokio::test(start_paused = true)]
async fn test_event_loop_ticks_timers() {
    let (mut session, vars) = started();
    let mut event_loop = EventLoop::new(Duration::from_millis(16));

    let stats = event_loop.run(&mut session, Some(10)).await;
    assert_eq!(stats.ticks, 10);
    assert_eq!(stats.faults, 0);
    assert_eq!(session.clock_ms(), 160);
    // Due at 50, 100 and 150; seen at 64, 112 and 160.
    assert_eq!(int(&session, vars.ticks), Value::Int(3));
}

#[tokio::test(start_paused = true)]
async fn test_event_loop_advances_by_elapsed_time() {
    let (mut session, vars) = started();
    let mut event_loop = EventLoop::new(Duration::from_millis(16));

    // Stall the runtime past several tick periods.
    tokio::spawn(async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        tokio::time::advance(Duration::from_millis(100)).await;
    });

    let stats = event_loop.run(&mut session, Some(1)).await;
    assert_eq!(stats.ticks, 1);
    assert_eq!(session.clock_ms(), 101);
    assert_eq!(int(&session, vars.ticks), Value::Int(1));
}

#[tokio::test(start_paused = true)]
async fn test_event_loop_delivers_then_stops() {
    let (bytes, vars) = player_program();
    let bridge = MemoryBridge::from_layout(LAYOUT).unwrap();
    let mut session = Session::from_bytes(&bytes, &Config::default())
        .unwrap()
        .with_bridge(bridge);
    let mut event_loop = EventLoop::new(Duration::from_millis(16));
    let handle = event_loop.handle();

    let click: HostEvent = format!("{}:onLeftClick", vars.button).parse().unwrap();
    assert!(handle.send(click.clone()));
    assert!(handle.send(click));
    handle.stop();

    let stats = event_loop.run(&mut session, None).await;
    assert!(session.is_started());
    assert_eq!(
        stats,
        LoopStats {
            ticks: 0,
            events: 2,
            faults: 0,
        }
    );
    assert_eq!(int(&session, vars.clicks), Value::Int(2));
}
