use embedded_hal::delay::DelayNs;
use embedded_io::{Read, ReadReady};
use heapless::String;

use crate::time::Monotonic;

/// Line buffer capacity. Collection stops one short of this so a truncated
/// line always stays in bounds.
pub const LINE_CAPACITY: usize = 64;

/// Accumulates serial bytes into a bounded line buffer.
///
/// Printable ASCII is kept, CR or LF completes the line, anything else is
/// dropped. When no byte is ready the reader yields for a millisecond so the
/// rest of the system keeps running, and after `timeout_ms` without a
/// terminator the partial input is discarded and no line is reported.
pub struct LineReader {
    buf: String<LINE_CAPACITY>,
    timeout_ms: u32,
}

impl LineReader {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            buf: String::new(),
            timeout_ms,
        }
    }

    /// Collect one line. `None` means the timeout elapsed first.
    ///
    /// A line that fills the buffer to capacity−1 is handed back as complete
    /// even without a terminator; the leftover bytes stay in the channel for
    /// the next cycle.
    pub fn read_line<S, D, M>(
        &mut self,
        serial: &mut S,
        delay: &mut D,
        clock: &M,
    ) -> Option<&str>
    where
        S: Read + ReadReady,
        D: DelayNs,
        M: Monotonic,
    {
        self.buf.clear();
        let start = clock.now();

        let received = loop {
            match serial.read_ready() {
                Ok(true) => {
                    let mut byte = [0u8; 1];
                    match serial.read(&mut byte) {
                        Ok(n) if n > 0 => {
                            let c = byte[0];
                            if c == b'\r' || c == b'\n' {
                                break true;
                            }
                            if (32..=126).contains(&c) {
                                let _ = self.buf.push(c as char);
                                if self.buf.len() == LINE_CAPACITY - 1 {
                                    break true;
                                }
                            }
                        }
                        _ => {}
                    }
                }
                // Nothing ready (or the receiver is faulted): yield briefly
                // instead of spinning.
                Ok(false) | Err(_) => delay.delay_ms(1),
            }

            if clock.now().millis_since(start) > self.timeout_ms as u64 {
                self.buf.clear();
                break false;
            }
        };

        if received {
            Some(self.buf.as_str())
        } else {
            None
        }
    }
}
