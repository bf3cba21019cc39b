
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::process::ExitCode;

use as_lib::numbers::parse_number;
use as_lib::{assemble, Program};
use common::asm::Reg;
use common::constants::{DEFAULT_MAX_STEPS, STACK_INIT};
use disassembler::disassemble;
use emu_lib::Cpu;

use clap::error::ErrorKind;
use clap::Parser;

/// PDP-11 educational emulator: assembles a source file and runs it.
#[derive(Parser)]
#[command(name = "pdp11sim")]
struct Args {
    /// Assembly source file
    input: String,

    /// Maximum number of instructions to execute
    max_steps: Option<u64>,

    /// Disassemble each instruction before executing it
    #[arg(long)]
    trace: bool,

    /// Log every memory access
    #[arg(long)]
    trace_mem: bool,

    /// Log data accesses in an inclusive address range
    #[arg(long, value_name = "addr[:len]")]
    watch: Option<String>,

    /// Write a symbol map file (one "0xADDR NAME" line per symbol)
    #[arg(long, value_name = "file")]
    map: Option<String>,

    /// Print the symbol table as JSON
    #[arg(long)]
    dump_symbols: bool,

    /// Stop before executing a label or address (repeatable)
    #[arg(long = "break", value_name = "label|0xADDR")]
    breakpoints: Vec<String>,
}

const EXIT_USAGE: u8 = 1;
const EXIT_RUNTIME: u8 = 2;

fn parse_watch(text: &str) -> Option<(u16, u16)> {
    let (addr_text, len_text) = match text.split_once(':') {
        Some((addr, len)) => (addr, Some(len)),
        None => (text, None),
    };
    let addr = parse_number(addr_text)? as u16;
    let len = match len_text {
        Some(len) => parse_number(len)?,
        None => 1,
    };
    if len < 1 {
        return None;
    }
    Some((addr, addr.wrapping_add(len as u16 - 1)))
}

fn resolve_break(text: &str, symbols: &HashMap<String, u16>) -> Option<u16> {
    match parse_number(text) {
        Some(addr) => Some(addr as u16),
        None => symbols.get(&text.to_uppercase()).copied(),
    }
}

fn write_map(path: &str, prog: &Program) -> std::io::Result<()> {
    let mut symbols: Vec<(&String, &u16)> = prog.symbols.iter().collect();
    symbols.sort_by_key(|(name, addr)| (**addr, (*name).clone()));

    let mut out = fs::File::create(path)?;
    for (name, addr) in symbols {
        writeln!(out, "0x{addr:04x} {name}")?;
    }
    Ok(())
}

fn print_summary(cpu: &Cpu) {
    if cpu.break_hit() {
        println!("BREAK at 0x{:04x}", cpu.break_addr());
    }
    println!("HALT={}", if cpu.halted() { "yes" } else { "no" });
    for (i, reg) in [
        Reg::R0,
        Reg::R1,
        Reg::R2,
        Reg::R3,
        Reg::R4,
        Reg::R5,
        Reg::SP,
        Reg::PC,
    ]
    .iter()
    .enumerate()
    {
        println!("R{i}=0x{:04x}", cpu.reg_read_word(*reg));
    }
    let status = cpu.status();
    println!(
        "N={} Z={} V={} C={}",
        status.get_negative() as u8,
        status.get_zero() as u8,
        status.get_overflow() as u8,
        status.get_carry() as u8
    );
}

fn run(args: &Args) -> u8 {
    let source = match fs::read_to_string(&args.input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: {}: {err}", args.input);
            return EXIT_RUNTIME;
        }
    };

    let prog = match assemble(&source) {
        Ok(prog) => prog,
        Err(err) => {
            eprintln!("Error: {err}");
            return EXIT_RUNTIME;
        }
    };

    if args.dump_symbols {
        println!("{}", serde_json::to_string(&prog.symbols).unwrap());
    }

    if let Some(path) = &args.map {
        if let Err(err) = write_map(path, &prog) {
            eprintln!("Error: {path}: {err}");
            return EXIT_RUNTIME;
        }
    }

    let mut cpu = Cpu::new();
    cpu.load_words(prog.start, &prog.words);
    cpu.reg_write_word(Reg::PC, prog.start);
    cpu.reg_write_word(Reg::SP, STACK_INIT);

    if args.trace_mem {
        cpu.watch_mut().trace_all = true;
    }
    if let Some(watch) = &args.watch {
        let Some((start, end)) = parse_watch(watch) else {
            eprintln!("Invalid --watch value: {watch}");
            return EXIT_USAGE;
        };
        let w = cpu.watch_mut();
        w.enabled = true;
        w.start = start;
        w.end = end;
    }
    for text in &args.breakpoints {
        let Some(addr) = resolve_break(text, &prog.symbols) else {
            eprintln!("Invalid --break value: {text}");
            return EXIT_USAGE;
        };
        cpu.add_breakpoint(addr);
    }

    let max_steps = args.max_steps.unwrap_or(DEFAULT_MAX_STEPS);
    let result = if args.trace {
        let mut result = Ok(());
        for _ in 0..max_steps {
            if cpu.halted() {
                break;
            }
            if cpu.at_breakpoint() {
                cpu.note_break();
                break;
            }
            println!("PC=0x{:04x}  {}", cpu.pc(), disassemble(cpu.memory(), cpu.pc()));
            result = cpu.step();
            if result.is_err() {
                break;
            }
        }
        result
    } else {
        cpu.run(max_steps)
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        return EXIT_RUNTIME;
    }

    print_summary(&cpu);
    0
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_USAGE,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    ExitCode::from(run(&args))
}
