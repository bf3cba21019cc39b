
use std::collections::VecDeque;
use std::io::{stdin, stdout, Read, Write};
use std::sync::Mutex;

// The host side of the console traps: one blocking byte in, one byte out.
// None from in_char means end of input.
pub trait Console: Send + Sync {
    fn in_char(&self) -> Option<u8>;
    fn out_char(&self, val: u8);
}

#[derive(Default, Clone, Copy)]
pub struct StdioConsole;

impl Console for StdioConsole {
    fn in_char(&self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match stdin().lock().read(&mut buf) {
            Ok(1) => Some(buf[0]),
            _ => None,
        }
    }

    fn out_char(&self, val: u8) {
        let mut out = stdout().lock();
        out.write_all(&[val]).unwrap();
        out.flush().unwrap();
    }
}

// In-memory console for tests: feed input up front, inspect output after.
#[derive(Default)]
pub struct PipeConsole {
    input: Mutex<VecDeque<u8>>,
    output: Mutex<Vec<u8>>,
}

impl PipeConsole {
    pub fn new() -> PipeConsole {
        Default::default()
    }

    pub fn with_input(input: &[u8]) -> PipeConsole {
        let console = PipeConsole::new();
        console.push_input(input);
        console
    }

    pub fn push_input(&self, bytes: &[u8]) {
        self.input.lock().unwrap().extend(bytes.iter().copied());
    }

    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut self.output.lock().unwrap())
    }
}

impl Console for PipeConsole {
    fn in_char(&self) -> Option<u8> {
        self.input.lock().unwrap().pop_front()
    }

    fn out_char(&self, val: u8) {
        self.output.lock().unwrap().push(val);
    }
}

////////////////////////////////////////////////////////////////////////////////

// Where memory-watch lines go. The CLI wires this to stdout.
pub trait WatchSink: Send + Sync {
    fn line(&self, text: &str);
}

#[derive(Default, Clone, Copy)]
pub struct StdoutSink;

impl WatchSink for StdoutSink {
    fn line(&self, text: &str) {
        println!("{text}");
    }
}

#[derive(Default)]
pub struct PipeSink {
    lines: Mutex<Vec<String>>,
}

impl PipeSink {
    pub fn new() -> PipeSink {
        Default::default()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut self.lines.lock().unwrap())
    }
}

impl WatchSink for PipeSink {
    fn line(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }
}
