//! Console line framing.
//!
//! Accepts `\r`, `\n` or `\r\n` as terminators, treats BS/DEL as erase, and
//! drops blank lines. A line longer than the buffer is discarded whole and
//! reported once its terminator arrives.

use heapless::Vec;
use pdmotor_common::consts::COMMAND_LINE_CAPACITY;
use pdmotor_common::error::CommandError;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

#[derive(Debug, Default)]
pub struct LineFramer<const N: usize = COMMAND_LINE_CAPACITY> {
    buf: Vec<u8, N>,
    overflowed: bool,
    after_cr: bool,
    completed: bool,
}

impl<const N: usize> LineFramer<N> {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflowed: false,
            after_cr: false,
            completed: false,
        }
    }

    /// Feed one byte. Returns a completed, trimmed line when `byte`
    /// terminates a non-blank one.
    ///
    /// The returned line borrows the framer and stays valid until the next
    /// call.
    pub fn push(&mut self, byte: u8) -> Option<Result<&str, CommandError>> {
        if self.completed {
            self.buf.clear();
            self.completed = false;
        }

        let after_cr = std::mem::replace(&mut self.after_cr, byte == b'\r');
        match byte {
            b'\n' if after_cr => None,
            b'\r' | b'\n' => self.terminate(),
            BACKSPACE | DELETE => {
                if !self.overflowed {
                    self.buf.pop();
                }
                None
            }
            _ => {
                if !self.overflowed && self.buf.push(byte).is_err() {
                    self.overflowed = true;
                }
                None
            }
        }
    }

    fn terminate(&mut self) -> Option<Result<&str, CommandError>> {
        if self.overflowed {
            self.overflowed = false;
            self.buf.clear();
            return Some(Err(CommandError::LineTooLong { capacity: N }));
        }
        self.completed = true;
        match std::str::from_utf8(&self.buf) {
            Ok(line) => {
                let line = line.trim();
                (!line.is_empty()).then_some(Ok(line))
            }
            Err(_) => Some(Err(CommandError::UnknownVerb(
                String::from_utf8_lossy(&self.buf).into_owned(),
            ))),
        }
    }

    /// Bytes buffered for the line in progress.
    pub fn pending(&self) -> usize {
        if self.completed { 0 } else { self.buf.len() }
    }
}
