
use crate::harness::load;
use common::asm::Reg;
use common::constants::DEFAULT_MAX_STEPS;

#[test]
fn breakpoint_stops_before_executing() {
    let (mut cpu, prog) = load(r#"
        .ORIG 0
        MOV #1, R0
    stop:
        INC R0
        HALT
    "#);
    let stop = *prog.symbols.get("STOP").unwrap();
    cpu.add_breakpoint(stop);
    cpu.run(DEFAULT_MAX_STEPS).unwrap();

    assert!(cpu.break_hit());
    assert_eq!(cpu.break_addr(), stop);
    assert_eq!(cpu.reg_read_word(Reg::R0), 1);
    assert!(!cpu.halted());
    assert_eq!(cpu.pc(), stop);
}

#[test]
fn breakpoint_at_entry() {
    let (mut cpu, _) = load(r#"
        .ORIG 0
        MOV #1, R0
        MOV #2, R1
        HALT
    "#);
    cpu.add_breakpoint(0);
    cpu.run(DEFAULT_MAX_STEPS).unwrap();
    assert!(cpu.break_hit());
    assert_eq!(cpu.break_addr(), 0);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0);
    assert!(!cpu.halted());
}

#[test]
fn stepping_past_a_breakpoint_resumes() {
    let (mut cpu, prog) = load(r#"
        .ORIG 0
        MOV #1, R0
    stop:
        INC R0
        HALT
    "#);
    let stop = *prog.symbols.get("STOP").unwrap();
    cpu.add_breakpoint(stop);
    cpu.run(DEFAULT_MAX_STEPS).unwrap();
    assert!(cpu.break_hit());

    // Single-step over the breakpoint, then run to completion.
    cpu.step().unwrap();
    cpu.run(DEFAULT_MAX_STEPS).unwrap();
    assert!(cpu.halted());
    assert_eq!(cpu.reg_read_word(Reg::R0), 2);
}
