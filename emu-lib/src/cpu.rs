
use std::collections::HashSet;
use std::fs::File;
use std::sync::Arc;

use common::asm::{Reg, NUM_REGS};
use common::decoder::decode;
use common::mem::Memory;

use log::{debug, trace};
use num_traits::ToPrimitive;
use thiserror::Error;

use crate::io::{Console, StdioConsole, StdoutSink, WatchSink};
use crate::status::Status;

// Fatal runtime errors; they abort the current run. Trap-level failures are
// reported in-band through r0 and the Z flag instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmuError {
    #[error("unimplemented instruction 0x{word:04x} at PC=0x{pc:04x}")]
    Unimplemented { pc: u16, word: u16 },
}

// Inclusive logical address range whose reads and writes get logged, or
// every access when trace_all is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemWatch {
    pub enabled: bool,
    pub trace_all: bool,
    pub start: u16,
    pub end: u16,
}

// The whole machine: registers, condition codes, the banked memory, the
// open-file table, and the debug facilities. Host I/O arrives through the
// Console trait; watch output leaves through the WatchSink trait, so the
// core never touches the process environment directly.
pub struct Cpu {
    pub(crate) regs: [u16; NUM_REGS],
    pub(crate) status: Status,
    pub(crate) halted: bool,
    pub(crate) mem_bank: u8,
    pub(crate) mem: Memory,
    pub(crate) console: Arc<dyn Console>,
    pub(crate) files: Vec<Option<File>>,
    watch: MemWatch,
    watch_sink: Arc<dyn WatchSink>,
    breakpoints: HashSet<u16>,
    break_hit: bool,
    break_addr: u16,
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            regs: [0; NUM_REGS],
            status: Status::new(),
            halted: false,
            mem_bank: 0,
            mem: Memory::new(),
            console: Arc::new(StdioConsole),
            files: Vec::new(),
            watch: MemWatch::default(),
            watch_sink: Arc::new(StdoutSink),
            breakpoints: HashSet::new(),
            break_hit: false,
            break_addr: 0,
        }
    }

    // Clears all machine state except memory contents and the I/O wiring.
    pub fn reset(&mut self) {
        self.regs = [0; NUM_REGS];
        self.status = Status::new();
        self.halted = false;
        self.mem_bank = 0;
        self.files.clear();
        self.watch = MemWatch::default();
        self.breakpoints.clear();
        self.break_hit = false;
        self.break_addr = 0;
    }

    pub fn set_console(&mut self, console: Arc<dyn Console>) {
        self.console = console;
    }

    pub fn set_watch_sink(&mut self, sink: Arc<dyn WatchSink>) {
        self.watch_sink = sink;
    }

    // Place an assembled word image into the code bank.
    pub fn load_words(&mut self, start: u16, words: &[u16]) {
        for (i, word) in words.iter().enumerate() {
            self.write_word_code(start.wrapping_add((i * 2) as u16), *word);
        }
    }

    ///////////////////////////////////////////////////////////////////////////
    // Registers

    pub fn reg_read_word(&self, reg: Reg) -> u16 {
        self.regs[reg.to_usize().unwrap()]
    }

    pub fn reg_write_word(&mut self, reg: Reg, val: u16) {
        trace!("reg: writing 0x{val:04x} to {reg:?}");
        self.regs[reg.to_usize().unwrap()] = val;
    }

    pub fn reg_read_byte(&self, reg: Reg) -> u8 {
        self.reg_read_word(reg) as u8
    }

    // Low byte only; the high byte is preserved.
    pub fn reg_write_byte(&mut self, reg: Reg, val: u8) {
        let old = self.reg_read_word(reg);
        self.reg_write_word(reg, (old & !0xff) | val as u16);
    }

    pub fn pc(&self) -> u16 {
        self.reg_read_word(Reg::PC)
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn mem_bank(&self) -> u8 {
        self.mem_bank
    }

    pub fn set_mem_bank(&mut self, bank: u8) {
        self.mem_bank = bank & 0x3;
    }

    ///////////////////////////////////////////////////////////////////////////
    // Memory. Data accesses go through the selected bank and the watch
    // filter; code accesses always hit bank 0 and are never logged.

    pub fn mem_read_byte(&self, addr: u16) -> u8 {
        let val = self.mem.read_byte(self.mem_bank, addr);
        self.watch_log('R', addr, 1, val as u16);
        val
    }

    pub fn mem_write_byte(&mut self, addr: u16, val: u8) {
        trace!("mem: writing 0x{val:02x} to 0x{addr:04x} (byte, bank {})", self.mem_bank);
        self.mem.write_byte(self.mem_bank, addr, val);
        self.watch_log('W', addr, 1, val as u16);
    }

    pub fn mem_read_word(&self, addr: u16) -> u16 {
        let val = self.mem.read_word(self.mem_bank, addr);
        self.watch_log('R', addr, 2, val);
        val
    }

    pub fn mem_write_word(&mut self, addr: u16, val: u16) {
        trace!("mem: writing 0x{val:04x} to 0x{addr:04x} (word, bank {})", self.mem_bank);
        self.mem.write_word(self.mem_bank, addr, val);
        self.watch_log('W', addr, 2, val);
    }

    pub fn read_word_code(&self, addr: u16) -> u16 {
        self.mem.read_word(0, addr)
    }

    pub fn write_word_code(&mut self, addr: u16, val: u16) {
        self.mem.write_word(0, addr, val);
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    fn watch_log(&self, dir: char, addr: u16, size: u16, val: u16) {
        let watch = &self.watch;
        let hit = watch.trace_all || (watch.enabled && addr >= watch.start && addr <= watch.end);
        if !hit {
            return;
        }
        let text = if size == 1 {
            format!(
                "MEM {dir} PC=0x{:04x} addr=0x{addr:04x} size=1 val=0x{val:02x}",
                self.pc()
            )
        } else {
            format!(
                "MEM {dir} PC=0x{:04x} addr=0x{addr:04x} size=2 val=0x{val:04x}",
                self.pc()
            )
        };
        self.watch_sink.line(&text);
    }

    pub fn watch(&self) -> MemWatch {
        self.watch
    }

    pub fn watch_mut(&mut self) -> &mut MemWatch {
        &mut self.watch
    }

    ///////////////////////////////////////////////////////////////////////////
    // Breakpoints

    pub fn add_breakpoint(&mut self, addr: u16) {
        self.breakpoints.insert(addr);
    }

    pub fn at_breakpoint(&self) -> bool {
        !self.breakpoints.is_empty() && self.breakpoints.contains(&self.pc())
    }

    pub fn break_hit(&self) -> bool {
        self.break_hit
    }

    pub fn break_addr(&self) -> u16 {
        self.break_addr
    }

    pub fn note_break(&mut self) {
        self.break_hit = true;
        self.break_addr = self.pc();
    }

    ///////////////////////////////////////////////////////////////////////////
    // The fetch/decode/execute loop

    pub(crate) fn fetch_word(&mut self) -> u16 {
        let val = self.read_word_code(self.pc());
        self.reg_write_word(Reg::PC, self.pc().wrapping_add(2));
        val
    }

    pub fn step(&mut self) -> Result<(), EmuError> {
        if self.halted {
            return Ok(());
        }

        let pc = self.pc();
        let word = self.fetch_word();
        let Some(ins) = decode(word) else {
            return Err(EmuError::Unimplemented { pc, word });
        };
        debug!("PC=0x{pc:04x}: {ins:?}");
        self.exec(&ins);
        Ok(())
    }

    // Runs until a halt, a breakpoint, an unimplemented encoding, or the
    // step budget runs out, whichever comes first. A breakpoint sets the
    // sticky break_hit/break_addr pair and returns without executing.
    pub fn run(&mut self, max_steps: u64) -> Result<(), EmuError> {
        for _ in 0..max_steps {
            if self.halted {
                break;
            }
            if self.at_breakpoint() {
                self.note_break();
                return Ok(());
            }
            self.step()?;
        }
        Ok(())
    }

    pub fn run_at(&mut self, pc: u16, max_steps: u64) -> Result<(), EmuError> {
        self.reg_write_word(Reg::PC, pc);
        self.run(max_steps)
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
