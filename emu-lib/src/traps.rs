
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use common::asm::{Reg, TrapIns};

use log::trace;

use crate::cpu::Cpu;
use crate::io::Console;

type TrapHandler = fn(&mut Cpu);

// The host service table. Adding a vector is adding a row.
const TRAP_TABLE: &[(u8, TrapHandler)] = &[
    (1, Cpu::trap_putc),
    (2, Cpu::trap_getc),
    (3, Cpu::trap_puts),
    (4, Cpu::trap_print_dec),
    (5, Cpu::trap_read_line),
    (6, Cpu::trap_print_hex),
    (7, Cpu::trap_print_udec),
    (8, Cpu::trap_println),
    (9, Cpu::trap_read_int),
    (10, Cpu::trap_read_hex),
    (20, Cpu::trap_open),
    (21, Cpu::trap_read_file),
    (22, Cpu::trap_write_file),
    (23, Cpu::trap_close),
    (24, Cpu::trap_seek),
    (25, Cpu::trap_tell),
    (26, Cpu::trap_bank),
];

const BAD_HANDLE: u16 = 0xFFFF;
const MAX_PATH: u16 = 1024;

impl Cpu {
    pub(crate) fn exec_trap_ins(&mut self, ins: &TrapIns) {
        trace!("trap #{}", ins.vector);
        if let Some((_, handler)) = TRAP_TABLE.iter().find(|(vec, _)| *vec == ins.vector) {
            handler(self);
        }
        // Unknown vectors are a no-op.
    }

    // In-band result: r0 and Z, with N/V/C cleared.
    fn trap_result(&mut self, val: u16, zero: bool) {
        self.reg_write_word(Reg::R0, val);
        self.status.set_zero(zero);
        self.status.set_negative(false);
        self.status.set_overflow(false);
        self.status.set_carry(false);
    }

    fn put_str(&mut self, text: &str) {
        for byte in text.bytes() {
            self.console.out_char(byte);
        }
    }

    ///////////////////////////////////////////////////////////////////////////
    // Console services

    fn trap_putc(&mut self) {
        let val = self.reg_read_word(Reg::R0) as u8;
        self.console.out_char(val);
    }

    fn trap_getc(&mut self) {
        match self.console.in_char() {
            Some(ch) => self.trap_result(ch as u16, false),
            None => self.trap_result(0, true),
        }
    }

    fn trap_puts(&mut self) {
        let mut addr = self.reg_read_word(Reg::R0);
        loop {
            let ch = self.mem_read_byte(addr);
            if ch == 0 {
                break;
            }
            self.console.out_char(ch);
            addr = addr.wrapping_add(1);
        }
    }

    fn trap_print_dec(&mut self) {
        let val = self.reg_read_word(Reg::R0) as i16;
        self.put_str(&val.to_string());
    }

    fn trap_read_line(&mut self) {
        let console = Arc::clone(&self.console);
        let addr = self.reg_read_word(Reg::R0);
        let max = self.reg_read_word(Reg::R1);

        let mut count: u16 = 0;
        let mut saw_char = false;
        while count + 1 < max {
            let Some(ch) = console.in_char() else {
                break;
            };
            saw_char = true;
            if ch == b'\n' {
                break;
            }
            self.mem_write_byte(addr.wrapping_add(count), ch);
            count += 1;
        }
        if max > 0 {
            self.mem_write_byte(addr.wrapping_add(count), 0);
        }
        self.trap_result(count, !saw_char && count == 0);
    }

    fn trap_print_hex(&mut self) {
        let val = self.reg_read_word(Reg::R0);
        self.put_str(&format!("0x{val:x}"));
    }

    fn trap_print_udec(&mut self) {
        let val = self.reg_read_word(Reg::R0);
        self.put_str(&val.to_string());
    }

    fn trap_println(&mut self) {
        self.trap_puts();
        self.console.out_char(b'\n');
    }

    fn trap_read_int(&mut self) {
        let console = Arc::clone(&self.console);

        let mut ch = console.in_char();
        while matches!(ch, Some(c) if c.is_ascii_whitespace()) {
            ch = console.in_char();
        }
        let Some(first) = ch else {
            self.trap_result(0, true);
            return;
        };

        let mut sign = 1i32;
        if first == b'-' {
            sign = -1;
            ch = console.in_char();
        } else if first == b'+' {
            ch = console.in_char();
        }

        let mut any = false;
        let mut value = 0i32;
        while let Some(c) = ch {
            if !c.is_ascii_digit() {
                break;
            }
            any = true;
            value = value.wrapping_mul(10).wrapping_add((c - b'0') as i32);
            ch = console.in_char();
        }

        if any {
            self.trap_result(sign.wrapping_mul(value) as u16, false);
        } else {
            self.trap_result(0, true);
        }
    }

    fn trap_read_hex(&mut self) {
        let console = Arc::clone(&self.console);

        let mut ch = console.in_char();
        while matches!(ch, Some(c) if c.is_ascii_whitespace()) {
            ch = console.in_char();
        }
        if ch.is_none() {
            self.trap_result(0, true);
            return;
        }

        if ch == Some(b'0') {
            let next = console.in_char();
            if next == Some(b'x') || next == Some(b'X') {
                ch = console.in_char();
            } else {
                ch = next;
            }
        }

        let mut any = false;
        let mut value: u16 = 0;
        while let Some(c) = ch {
            let digit = match c {
                b'0'..=b'9' => c - b'0',
                b'a'..=b'f' => 10 + (c - b'a'),
                b'A'..=b'F' => 10 + (c - b'A'),
                _ => break,
            };
            any = true;
            value = (value << 4) | digit as u16;
            ch = console.in_char();
        }

        if any {
            self.trap_result(value, false);
        } else {
            self.trap_result(0, true);
        }
    }

    ///////////////////////////////////////////////////////////////////////////
    // File services

    fn has_file(&self, handle: u16) -> bool {
        (handle as usize) < self.files.len() && self.files[handle as usize].is_some()
    }

    fn trap_open(&mut self) {
        let addr = self.reg_read_word(Reg::R0);
        let mode = self.reg_read_word(Reg::R1);

        let mut path = Vec::new();
        for i in 0..MAX_PATH {
            let ch = self.mem_read_byte(addr.wrapping_add(i));
            if ch == 0 {
                break;
            }
            path.push(ch);
        }
        let path = String::from_utf8_lossy(&path).into_owned();

        let mut options = OpenOptions::new();
        match mode {
            1 => options.write(true).create(true).truncate(true),
            2 => options.append(true).create(true),
            3 => options.read(true).write(true),
            _ => options.read(true),
        };

        match options.open(&path) {
            Ok(file) => {
                let handle = match self.files.iter().position(|f| f.is_none()) {
                    Some(slot) => slot,
                    None => {
                        self.files.push(None);
                        self.files.len() - 1
                    }
                };
                self.files[handle] = Some(file);
                self.trap_result(handle as u16, false);
            }
            Err(_) => self.trap_result(BAD_HANDLE, true),
        }
    }

    fn trap_read_file(&mut self) {
        let handle = self.reg_read_word(Reg::R0);
        let addr = self.reg_read_word(Reg::R1);
        let max = self.reg_read_word(Reg::R2);

        if !self.has_file(handle) || max == 0 {
            self.trap_result(0, true);
            return;
        }

        let mut buf = vec![0u8; max as usize];
        let mut count = 0usize;
        let file = self.files[handle as usize].as_mut().unwrap();
        while count < buf.len() {
            match file.read(&mut buf[count..]) {
                Ok(0) => break,
                Ok(n) => count += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }

        for (i, byte) in buf[..count].iter().enumerate() {
            self.mem_write_byte(addr.wrapping_add(i as u16), *byte);
        }
        self.trap_result(count as u16, count == 0);
    }

    fn trap_write_file(&mut self) {
        let handle = self.reg_read_word(Reg::R0);
        let addr = self.reg_read_word(Reg::R1);
        let len = self.reg_read_word(Reg::R2);

        if !self.has_file(handle) {
            self.trap_result(0, true);
            return;
        }

        let mut buf = Vec::with_capacity(len as usize);
        for i in 0..len {
            buf.push(self.mem_read_byte(addr.wrapping_add(i)));
        }

        let file = self.files[handle as usize].as_mut().unwrap();
        match file.write_all(&buf) {
            // A zero-length write reports r0 = 0 with Z set, same as the
            // error path; callers cannot tell them apart.
            Ok(()) => self.trap_result(len, len == 0),
            Err(_) => self.trap_result(0, true),
        }
    }

    fn trap_close(&mut self) {
        let handle = self.reg_read_word(Reg::R0);
        if !self.has_file(handle) {
            self.trap_result(BAD_HANDLE, true);
            return;
        }
        self.files[handle as usize] = None;
        self.trap_result(0, false);
    }

    fn trap_seek(&mut self) {
        let handle = self.reg_read_word(Reg::R0);
        let off = self.reg_read_word(Reg::R1) as i16;
        let whence = self.reg_read_word(Reg::R2);

        if !self.has_file(handle) {
            self.trap_result(BAD_HANDLE, true);
            return;
        }

        let file = self.files[handle as usize].as_mut().unwrap();
        let result = match whence {
            1 => file.seek(SeekFrom::Current(off as i64)),
            2 => file.seek(SeekFrom::End(off as i64)),
            _ => seek_from_start(file, off),
        };
        match result {
            Ok(_) => self.trap_result(0, false),
            Err(_) => self.trap_result(BAD_HANDLE, true),
        }
    }

    fn trap_tell(&mut self) {
        let handle = self.reg_read_word(Reg::R0);
        if !self.has_file(handle) {
            self.trap_result(BAD_HANDLE, true);
            return;
        }

        let file = self.files[handle as usize].as_mut().unwrap();
        match file.stream_position() {
            Ok(pos) => self.trap_result(pos as u16, false),
            Err(_) => self.trap_result(BAD_HANDLE, true),
        }
    }

    fn trap_bank(&mut self) {
        let bank = self.reg_read_word(Reg::R0);
        self.set_mem_bank(bank as u8);
        self.trap_result(0, false);
    }
}

fn seek_from_start(file: &mut File, off: i16) -> io::Result<u64> {
    if off < 0 {
        return Err(io::Error::from(io::ErrorKind::InvalidInput));
    }
    file.seek(SeekFrom::Start(off as u64))
}
