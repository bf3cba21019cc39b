
use crate::harness::run;
use common::asm::Reg;
use common::constants::STACK_INIT;

#[test]
fn jsr_rts_round_trip() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0, R0
        JSR R5, sub
        HALT
    sub:
        INC R0
        RTS R5
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 1);
    assert!(cpu.halted());
    // A matched JSR/RTS pair leaves the stack where it was.
    assert_eq!(cpu.reg_read_word(Reg::SP), STACK_INIT);
}

#[test]
fn link_register_survives_nesting() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0, R0
        JSR R5, outer
        HALT
    outer:
        INC R0
        JSR R5, inner
        INC R0
        RTS R5
    inner:
        INC R0
        RTS R5
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 3);
    assert_eq!(cpu.reg_read_word(Reg::SP), STACK_INIT);
}

#[test]
fn return_value_in_link_register() {
    // The link register holds the return address while the callee runs.
    let cpu = run(r#"
        .ORIG 0
        JSR R5, sub
    back:
        HALT
    sub:
        MOV R5, R1
        RTS R5
    "#);
    let back = 4; // JSR takes two words
    assert_eq!(cpu.reg_read_word(Reg::R1), back);
    assert_eq!(cpu.pc(), back + 2);
}
