
use crate::flags::{check_flags, Z};
use crate::harness::{run_output, run_with_input};
use common::asm::Reg;

#[test]
fn putc() {
    let (_, out) = run_output(r#"
        .ORIG 0
        MOV #72, R0
        TRAP #1
        MOV #105, R0
        TRAP #1
        HALT
    "#);
    assert_eq!(out, "Hi");
}

#[test]
fn getc() {
    let (cpu, _) = run_with_input(
        r#"
        .ORIG 0
        TRAP #2
        HALT
    "#,
        b"Z",
    );
    assert_eq!(cpu.reg_read_word(Reg::R0), b'Z' as u16);
    check_flags(&cpu, 0);
}

#[test]
fn getc_eof() {
    let (cpu, _) = run_with_input(
        r#"
        .ORIG 0
        TRAP #2
        HALT
    "#,
        b"",
    );
    assert_eq!(cpu.reg_read_word(Reg::R0), 0);
    check_flags(&cpu, Z);
}

#[test]
fn puts() {
    let (cpu, out) = run_output(r#"
        .ORIG 0
        MOV #msg, R0
        TRAP #3
        HALT
    msg:
        .WORD 0x6948
        .WORD 0x0000
    "#);
    assert_eq!(out, "Hi");
    assert!(cpu.halted());
}

#[test]
fn print_signed_and_hex() {
    let (cpu, out) = run_output(r#"
        .ORIG 0
        MOV # -123, R0
        TRAP #4
        MOV #0x2A, R0
        TRAP #6
        HALT
    "#);
    assert_eq!(out, "-1230x2a");
    assert!(cpu.halted());
}

#[test]
fn print_unsigned() {
    let (_, out) = run_output(r#"
        .ORIG 0
        MOV #65535, R0
        TRAP #7
        HALT
    "#);
    assert_eq!(out, "65535");
}

#[test]
fn println() {
    let (_, out) = run_output(r#"
        .ORIG 0
        MOV #msg, R0
        TRAP #8
        HALT
    msg:
        .WORD 0x6948
        .WORD 0x0000
    "#);
    assert_eq!(out, "Hi\n");
}

#[test]
fn read_line() {
    let (cpu, out) = run_with_input(
        r#"
        .ORIG 0
        MOV #buf, R0
        MOV #6, R1
        TRAP #5
        MOV R0, R2
        MOV #buf, R0
        TRAP #3
        HALT
    buf:
        .WORD 0
        .WORD 0
        .WORD 0
    "#,
        b"hello\n",
    );
    assert_eq!(cpu.reg_read_word(Reg::R2), 5);
    assert_eq!(out, b"hello");
}

#[test]
fn read_line_stops_at_newline() {
    let (cpu, out) = run_with_input(
        r#"
        .ORIG 0
        MOV #buf, R0
        MOV #16, R1
        TRAP #5
        MOV R0, R2
        MOV #buf, R0
        TRAP #3
        HALT
    buf:
        .WORD 0
        .WORD 0
        .WORD 0
        .WORD 0
        .WORD 0
        .WORD 0
        .WORD 0
        .WORD 0
    "#,
        b"ab\ncd",
    );
    // The newline is consumed but not stored.
    assert_eq!(cpu.reg_read_word(Reg::R2), 2);
    assert_eq!(out, b"ab");
}

#[test]
fn read_line_empty_input_sets_z() {
    let (cpu, _) = run_with_input(
        r#"
        .ORIG 0
        MOV #buf, R0
        MOV #6, R1
        TRAP #5
        HALT
    buf:
        .WORD 0
        .WORD 0
        .WORD 0
    "#,
        b"",
    );
    assert_eq!(cpu.reg_read_word(Reg::R0), 0);
    check_flags(&cpu, Z);
}

#[test]
fn read_int_and_hex() {
    let (cpu, _) = run_with_input(
        r#"
        .ORIG 0
        TRAP #9
        MOV R0, R2
        TRAP #10
        MOV R0, R3
        HALT
    "#,
        b"  -42 0x1A ",
    );
    assert_eq!(cpu.reg_read_word(Reg::R2) as i16, -42);
    assert_eq!(cpu.reg_read_word(Reg::R3), 0x001A);
}

#[test]
fn read_int_no_digits_sets_z() {
    let (cpu, _) = run_with_input(
        r#"
        .ORIG 0
        TRAP #9
        HALT
    "#,
        b"   ",
    );
    assert_eq!(cpu.reg_read_word(Reg::R0), 0);
    check_flags(&cpu, Z);
}

#[test]
fn read_hex_without_prefix() {
    let (cpu, _) = run_with_input(
        r#"
        .ORIG 0
        TRAP #10
        HALT
    "#,
        b"FFff ",
    );
    assert_eq!(cpu.reg_read_word(Reg::R0), 0xFFFF);
}

#[test]
fn unknown_vector_is_a_noop() {
    let (cpu, out) = run_output(r#"
        .ORIG 0
        MOV #7, R0
        TRAP #99
        HALT
    "#);
    assert!(cpu.halted());
    assert_eq!(cpu.reg_read_word(Reg::R0), 7);
    assert!(out.is_empty());
}
