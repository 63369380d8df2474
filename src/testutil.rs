//! Shared fakes for the serial channel and the scheduler clock.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};

use crate::time::{Monotonic, Ticks};

/// Serial channel fake: scripted receive bytes, captured transmit bytes and
/// an optionally latched receiver fault that reports once.
pub struct TestSerial {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    fault: bool,
}

#[derive(Debug)]
pub struct TestSerialError;

impl embedded_io::Error for TestSerialError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl TestSerial {
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            tx: Vec::new(),
            fault: false,
        }
    }

    pub fn with_input(input: &[u8]) -> Self {
        let mut serial = Self::new();
        serial.rx.extend(input);
        serial
    }

    /// Simulate a latched receiver fault (e.g. an overrun).
    pub fn latch_fault(&mut self) {
        self.fault = true;
    }

    /// Everything the code under test transmitted.
    pub fn output(&self) -> String {
        String::from_utf8(self.tx.clone()).expect("transmitted non-UTF-8")
    }
}

impl ErrorType for TestSerial {
    type Error = TestSerialError;
}

impl ReadReady for TestSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        if self.fault {
            self.fault = false;
            return Err(TestSerialError);
        }
        Ok(!self.rx.is_empty())
    }
}

impl Read for TestSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.rx.pop_front() {
            Some(byte) if !buf.is_empty() => {
                buf[0] = byte;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

impl Write for TestSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Clock fake reading a shared millisecond counter.
pub struct TestClock(Rc<Cell<u64>>);

impl Monotonic for TestClock {
    fn now(&self) -> Ticks {
        Ticks::from_millis(self.0.get())
    }
}

/// Delay fake that advances the shared counter instead of sleeping, so
/// timeouts elapse instantly in tests.
pub struct TestDelay(Rc<Cell<u64>>);

impl DelayNs for TestDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.set(self.0.get() + u64::from(ns) / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.set(self.0.get() + u64::from(ms));
    }
}

/// A clock and a delay driving the same counter.
pub fn clock_pair() -> (TestClock, TestDelay) {
    let counter = Rc::new(Cell::new(0));
    (TestClock(counter.clone()), TestDelay(counter))
}
