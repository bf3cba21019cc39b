
use crate::flags::{check_flags, Z};
use crate::harness::run;
use common::asm::Reg;

#[test]
fn countdown_loop() {
    let cpu = run(r#"
        .ORIG 0
        MOV #5, R0
    loop:
        DEC R0
        BNE loop
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0);
    check_flags(&cpu, Z);
    assert!(cpu.halted());
}

#[test]
fn br_is_unconditional() {
    let cpu = run(r#"
        .ORIG 0
        MOV #1, R0
        BR over
        MOV #2, R0
    over:
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 1);
}

#[test]
fn beq_taken_and_not_taken() {
    let cpu = run(r#"
        .ORIG 0
        MOV #5, R0
        MOV #5, R1
        CMP R0, R1
        BEQ equal
        MOV #1, R2
    equal:
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R2), 0);

    let cpu = run(r#"
        .ORIG 0
        MOV #5, R0
        MOV #6, R1
        CMP R0, R1
        BEQ equal
        MOV #1, R2
    equal:
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R2), 1);
}

#[test]
fn backward_branch_target() {
    // A branch back over an already-executed region lands where the label
    // was bound, not a word off.
    let cpu = run(r#"
        .ORIG 0x100
        MOV #0, R0
        MOV #3, R1
    again:
        INC R0
        DEC R1
        BNE again
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 3);
}
