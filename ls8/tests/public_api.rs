//! Exercises the crate's public surface the way a frontend does: assemble
//! programs from the exported instruction encoding and drive the engine.

use ls8::isa::{self, ADD, DIV, HLT, LDI};
use ls8::{Cpu, State, VmError};

#[test]
fn isa_exports_encoding_helpers() {
    assert_eq!(isa::instruction_length(LDI), 3);
    assert_eq!(isa::instruction_length(HLT), 1);
    assert!(!isa::sets_pc(ADD));
    assert!(isa::sets_pc(isa::JMP));
}

#[test]
fn add_program_runs_to_halt() {
    let mut cpu = Cpu::new();
    cpu.load(&[LDI, 0, 8, LDI, 1, 9, ADD, 0, 1, HLT]).unwrap();
    assert_eq!(cpu.step().unwrap(), State::Running);
    cpu.run().unwrap();
}

#[test]
fn division_by_zero_surfaces_as_error() {
    let mut cpu = Cpu::new();
    cpu.load(&[LDI, 0, 10, DIV, 0, 1, HLT]).unwrap();
    assert!(matches!(cpu.run(), Err(VmError::DivisionByZero)));
}
