
use crate::flags::{check_flags, C, N, V, Z};
use crate::harness::run;
use common::asm::Reg;

#[test]
fn mov_immediate() {
    let cpu = run(r#"
        .ORIG 0
        MOV #1234, R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 1234);
    assert!(cpu.halted());
}

#[test]
fn mov_sets_nz_only() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x8000, R0
        HALT
    "#);
    check_flags(&cpu, N);

    let cpu = run(r#"
        .ORIG 0
        MOV #0, R0
        HALT
    "#);
    check_flags(&cpu, Z);
}

#[test]
fn add_then_sub() {
    let cpu = run(r#"
        .ORIG 0
        MOV #10, R0
        MOV #3, R1
        ADD R0, R1
        SUB #2, R1
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R1), 11);
}

#[test]
fn add_overflow_and_carry() {
    // 0x7FFF + 1: signed overflow, no carry.
    let cpu = run(r#"
        .ORIG 0
        MOV #0x7FFF, R0
        ADD #1, R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0x8000);
    check_flags(&cpu, N | V);

    // 0xFFFF + 1: carry out, no signed overflow.
    let cpu = run(r#"
        .ORIG 0
        MOV #0xFFFF, R0
        ADD #1, R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0);
    check_flags(&cpu, Z | C);
}

#[test]
fn sub_borrow() {
    let cpu = run(r#"
        .ORIG 0
        MOV #3, R0
        SUB #5, R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0xFFFE);
    check_flags(&cpu, N | C);
}

#[test]
fn cmp_leaves_operands_alone() {
    let cpu = run(r#"
        .ORIG 0
        MOV #5, R0
        MOV #5, R1
        CMP R0, R1
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 5);
    assert_eq!(cpu.reg_read_word(Reg::R1), 5);
    check_flags(&cpu, Z);
}

#[test]
fn bit_bic_bis() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x00F0, R0
        MOV #0x0F0F, R1
        BIT R0, R1
        BIC R0, R1
        BIS #0x0003, R1
        HALT
    "#);
    // BIT 0x00F0 & 0x0F0F is nonzero; BIC clears no live bits here.
    assert_eq!(cpu.reg_read_word(Reg::R1), 0x0F0F);
    check_flags(&cpu, 0);

    let cpu = run(r#"
        .ORIG 0
        MOV #0x00FF, R0
        MOV #0x0FF0, R1
        BIC R0, R1
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R1), 0x0F00);
}

#[test]
fn bit_discards_result() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x0F00, R0
        MOV #0x00F0, R1
        BIT R0, R1
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R1), 0x00F0);
    check_flags(&cpu, Z);
}

#[test]
fn movb_sign_extends_to_register() {
    let cpu = run(r#"
        .ORIG 0
        MOVB #0x80, R1
        MOVB #0x7F, R2
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R1), 0xFF80);
    assert_eq!(cpu.reg_read_word(Reg::R2), 0x007F);
}

#[test]
fn byte_ops_touch_one_byte_of_memory() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x1234, R0
        MOV #0x700, R1
        MOV R0, (R1)
        MOVB #0xAB, (R1)
        HALT
    "#);
    assert_eq!(cpu.mem_read_word(0x700), 0x12AB);
}

#[test]
fn bisb_on_register_keeps_high_byte() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x1234, R0
        BISB #0x80, R0
        HALT
    "#);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0x12B4);
}

#[test]
fn cmpb() {
    let cpu = run(r#"
        .ORIG 0
        MOV #0x1202, R0
        MOV #0x3402, R1
        CMPB R0, R1
        HALT
    "#);
    // Only the low bytes are compared.
    check_flags(&cpu, Z);
}
