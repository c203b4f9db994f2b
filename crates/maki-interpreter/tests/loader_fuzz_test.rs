//! Property tests: the loader rejects garbage without panicking, and what
//! it accepts the VM can run without panicking.

use maki_interpreter::bytecode::{Assembler, Opcode};
use maki_interpreter::{NullHost, VmOptions, instantiate, load};
use proptest::collection::vec;
use proptest::prelude::*;

/// A small valid program touching most sections.
fn sample() -> Vec<u8> {
    let mut asm = Assembler::new();
    let system = asm.class("System");
    let sys = asm.system_variable(system);
    let name = asm.string("sample");
    let n = asm.int(3);
    let loaded = asm.method(system, "onScriptLoaded");
    let strlen = asm.method(system, "strlen");
    let entry = asm.label();
    asm.bind(entry);
    asm.push(n).push(sys).push(name).call(strlen).op(Opcode::Add);
    asm.op(Opcode::Return);
    asm.on(sys, loaded, entry);
    asm.finish()
}

proptest! {
    #[test]
    fn test_load_never_panics(bytes in vec(any::<u8>(), 0..512)) {
        let _ = load(&bytes);
    }

    #[test]
    fn test_header_prefixed_garbage_never_panics(tail in vec(any::<u8>(), 0..256)) {
        let mut bytes = b"FG\x03\x00\x00\x00\x00\x00".to_vec();
        bytes.extend_from_slice(&tail);
        let _ = load(&bytes);
    }

    #[test]
    fn test_mutated_program_never_panics(
        edits in vec((any::<prop::sample::Index>(), any::<u8>()), 1..8),
    ) {
        let mut bytes = sample();
        for (index, byte) in edits {
            let at = index.index(bytes.len());
            bytes[at] = byte;
        }
        let options = VmOptions {
            instruction_budget: 10_000,
            ..VmOptions::default()
        };
        if let Ok(mut vm) = instantiate(&bytes, options, Some(1)) {
            let _ = vm.start(&mut NullHost);
            let _ = vm.tick(&mut NullHost, 1_000);
            let _ = vm.unload(&mut NullHost);
            prop_assert_eq!(vm.stack_len(), 0);
            prop_assert_eq!(vm.depth(), 0);
        }
    }

    #[test]
    fn test_truncated_program_is_rejected(cut in 1usize..64) {
        let bytes = sample();
        let keep = bytes.len().saturating_sub(cut);
        prop_assert!(load(&bytes[..keep]).is_err());
    }
}

#[test]
fn test_sample_program_runs() {
    let mut vm = instantiate(&sample(), VmOptions::default(), None).unwrap();
    assert!(vm.start(&mut NullHost).is_ok());
}
