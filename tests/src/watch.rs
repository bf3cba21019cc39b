
use std::sync::Arc;

use crate::harness::load;
use common::constants::DEFAULT_MAX_STEPS;
use emu_lib::io::PipeSink;

fn run_with_watch(asm: &str, start: u16, end: u16, trace_all: bool) -> Vec<String> {
    let (mut cpu, _) = load(asm);
    let sink = Arc::new(PipeSink::new());
    cpu.set_watch_sink(sink.clone());
    {
        let watch = cpu.watch_mut();
        watch.enabled = !trace_all;
        watch.trace_all = trace_all;
        watch.start = start;
        watch.end = end;
    }
    cpu.run(DEFAULT_MAX_STEPS).unwrap();
    sink.take()
}

const PROG: &str = r#"
    .ORIG 0
    MOV #0x0100, R1
    MOV #0x00AA, (R1)
    MOV (R1), R0
    HALT
"#;

#[test]
fn watched_range_logs_reads_and_writes() {
    let lines = run_with_watch(PROG, 0x100, 0x100, false);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "MEM W PC=0x0008 addr=0x0100 size=2 val=0x00aa");
    assert_eq!(lines[1], "MEM R PC=0x000a addr=0x0100 size=2 val=0x00aa");
}

#[test]
fn out_of_range_accesses_are_silent() {
    let lines = run_with_watch(PROG, 0x200, 0x2FF, false);
    assert!(lines.is_empty());
}

#[test]
fn range_is_inclusive() {
    let lines = run_with_watch(PROG, 0x0F0, 0x100, false);
    assert_eq!(lines.len(), 2);
    let lines = run_with_watch(PROG, 0x100, 0x1FF, false);
    assert_eq!(lines.len(), 2);
}

#[test]
fn trace_all_logs_every_data_access() {
    let lines = run_with_watch(PROG, 0, 0, true);
    // The same two data accesses; instruction fetches are not data.
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.contains("addr=0x0100")));
}

#[test]
fn byte_accesses_log_size_one() {
    let lines = run_with_watch(
        r#"
        .ORIG 0
        MOV #0x0100, R1
        MOVB #0x7F, (R1)
        HALT
    "#,
        0x100,
        0x100,
        false,
    );
    assert_eq!(lines, ["MEM W PC=0x0008 addr=0x0100 size=1 val=0x7f"]);
}
