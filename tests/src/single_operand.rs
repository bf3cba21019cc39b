
use crate::flags::{check_flags, C, N, V, Z};
use crate::harness::run;
use common::asm::Reg;

#[test]
fn clr() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0xABCD, R0
        CLR R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0);
    check_flags(&cpu, Z);
}

#[test]
fn clrb_preserves_high_byte() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x1234, R0
        CLRB R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0x1200);
    check_flags(&cpu, Z);
}

#[test]
fn inc_overflow_at_top_of_signed_range() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x7FFF, R0
        INC R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0x8000);
    check_flags(&cpu, N | V);

    let cpu = run(r#"
        .ORIG 0
        MOV #0xFFFF, R0
        INC R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0);
    check_flags(&cpu, Z);
}

#[test]
fn dec_overflow_at_bottom_of_signed_range() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x8000, R0
        DEC R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0x7FFF);
    check_flags(&cpu, V);
}

#[test]
fn inc_keeps_carry() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0xFFFF, R0
        ADD #1, R0
        INC R0
        HALT
    "#);
    // The carry from ADD survives the INC.
    assert_eq!(cpu.reg_read_word(Reg::R0), 1);
    check_flags(&cpu, C);
}

#[test]
fn tst() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x8000, R0
        TST R0
        HALT
    "#);
    check_flags(&cpu, N);

    let cpu = run(r#"
        .ORIG 0
        MOV #1, R0
        TST R0
        HALT
    "#);
    check_flags(&cpu, 0);
}

#[test]
fn asl() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x4000, R0
        ASL R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0x8000);
    check_flags(&cpu, N | V);
}

#[test]
fn asr_keeps_sign() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x8001, R0
        ASR R0
        HALT
    "#);
    // V = N xor C cancels here.
    assert_eq!(cpu.reg_read_word(Reg::R0), 0xC000);
    check_flags(&cpu, N | C);
}

#[test]
fn rotate_through_carry() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0xFFFF, R0
        ADD #1, R0
        ROL R0
        HALT
    "#);
    // ADD leaves C=1, which rotates into bit 0.
    assert_eq!(cpu.reg_read_word(Reg::R0), 1);
    check_flags(&cpu, 0);

    let cpu = run(r#"
        .ORIG 0
        MOV #1, R0
        ROR R0
        ROR R0
        HALT
    "#);
    // Bit 0 leaves through C and re-enters at the top.
    assert_eq!(cpu.reg_read_word(Reg::R0), 0x8000);
    check_flags(&cpu, N | V);
}

#[test]
fn byte_variants() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x127F, R0
        INCB R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0x1280);
    check_flags(&cpu, N | V);

    let cpu = run(r#"
        .ORIG 0
        MOV #0x1280, R0
        DECB R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0x127F);
    check_flags(&cpu, V);

    let cpu = run(r#"
        .ORIG 0
        MOV #0x1200, R0
        TSTB R0
        HALT
    "#);
    check_flags(&cpu, Z);
}

#[test]
fn single_operand_on_memory() {
    let cpu = run(r#"
        .ORIG 0
        MOV #41, @#0x800
        INC @#0x800
        MOV #0x800, R1
        INCB (R1)
        HALT
    "#);
    assert_eq!(cpu.mem_read_word(0x800), 43);
}
