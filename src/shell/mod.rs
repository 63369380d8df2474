//! Line-oriented command shell.
//!
//! Grammar is whitespace-separated tokens, first token selects the command
//! (case-sensitive): `g` for a status block, `read <reg> <len>` and
//! `write <reg> <value>` for raw register access. Integer arguments accept
//! decimal or `0x`-prefixed hex and are truncated to one byte. Every received
//! line is echoed back before its result; all results are serial output.

pub mod line;

use core::fmt::Write as _;

use embedded_hal::i2c::I2c;
use embedded_io::Write;
use heapless::String;

use crate::bq76920::{Bq76920, Error};
use crate::status::StatusReporter;

pub use line::{LineReader, LINE_CAPACITY};

/// Raw register reads are capped at this many bytes.
pub const MAX_READ_LEN: u8 = 8;

/// One parsed command line. Borrows the line it was parsed from and is
/// executed immediately, never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// `g`: full status report.
    Status,
    /// `read <reg> <len>`, length already clamped to [`MAX_READ_LEN`].
    ReadRegister { reg: u8, len: u8 },
    /// `write <reg> <value>`.
    WriteRegister { reg: u8, value: u8 },
    /// Unrecognized first token.
    Unknown(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// The tokenizer produced no command token (blank line).
    Empty,
    /// `read` with missing or unparsable arguments.
    InvalidRead,
    /// `write` with missing or unparsable arguments.
    InvalidWrite,
}

/// Map a line to a command. Pure; no side effects on any buffer.
pub fn parse_line(line: &str) -> Result<Command<'_>, ParseError> {
    let mut tokens = line.split_whitespace();
    let cmd = tokens.next().ok_or(ParseError::Empty)?;
    match cmd {
        "g" => Ok(Command::Status),
        "write" => {
            let reg = tokens.next().and_then(parse_int);
            let value = tokens.next().and_then(parse_int);
            match (reg, value) {
                (Some(reg), Some(value)) => Ok(Command::WriteRegister { reg, value }),
                _ => Err(ParseError::InvalidWrite),
            }
        }
        "read" => {
            let reg = tokens.next().and_then(parse_int);
            let len = tokens.next().and_then(parse_int);
            match (reg, len) {
                (Some(reg), Some(len)) => Ok(Command::ReadRegister {
                    reg,
                    len: len.min(MAX_READ_LEN),
                }),
                _ => Err(ParseError::InvalidRead),
            }
        }
        other => Ok(Command::Unknown(other)),
    }
}

/// Decimal or `0x`/`0X`-prefixed hex, truncated to one byte.
fn parse_int(token: &str) -> Option<u8> {
    let value = if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        token.parse::<u32>().ok()?
    };
    Some(value as u8)
}

/// Echo the line, then parse and dispatch it.
///
/// Bus failures surface as the protocol's fixed text responses; only serial
/// write errors propagate, and those just end the current poll cycle.
pub fn execute<I2C, E, S>(
    bq: &mut Bq76920<I2C>,
    reporter: &StatusReporter,
    serial: &mut S,
    line: &str,
) -> Result<(), S::Error>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
    S: Write,
{
    serial.write_all(b"CMD Received: ")?;
    serial.write_all(line.as_bytes())?;
    serial.write_all(b"\r\n")?;

    match parse_line(line) {
        Ok(Command::Status) => {
            serial.write_all(b"Status Triggered\r\n")?;
            reporter.report(bq, serial)
        }
        Ok(Command::WriteRegister { reg, value }) => match bq.write_register(reg, value) {
            Ok(()) => serial.write_all(b"ACK\r\n"),
            Err(_) => serial.write_all(b"WRITE FAIL\r\n"),
        },
        Ok(Command::ReadRegister { reg, len }) => {
            let mut buf = [0u8; MAX_READ_LEN as usize];
            let buf = &mut buf[..len as usize];
            match bq.read_registers(reg, buf) {
                Ok(()) => write_hex_bytes(serial, buf),
                Err(Error::Command(_)) => serial.write_all(b"READ CMD FAIL\r\n"),
                Err(Error::Data(_)) => serial.write_all(b"READ FAIL\r\n"),
            }
        }
        Ok(Command::Unknown(_)) => serial.write_all(b"Unknown command\r\n"),
        Err(ParseError::Empty) => serial.write_all(b"CMD Parse Error\r\n"),
        Err(ParseError::InvalidWrite) => serial.write_all(b"Invalid write format\r\n"),
        Err(ParseError::InvalidRead) => serial.write_all(b"Invalid read format\r\n"),
    }
}

fn write_hex_bytes<S: Write>(serial: &mut S, data: &[u8]) -> Result<(), S::Error> {
    for byte in data {
        let mut s: String<8> = String::new();
        let _ = write!(&mut s, "0x{:02X} ", byte);
        serial.write_all(s.as_bytes())?;
    }
    serial.write_all(b"\r\n")
}
