//! Polling task core for a TI BQ76920 battery monitor.
//!
//! The crate covers everything between the two-wire bus and the serial line:
//! a register-level [`bq76920::Bq76920`] driver, a line-oriented command shell
//! (`g` / `read` / `write`), a coulomb-counted state-of-charge estimator and a
//! three-stage status report. The [`poller::Poller`] ties them together into
//! the single cooperative task loop the firmware runs.
//!
//! Platform pieces stay outside: the bus is any blocking
//! [`embedded_hal::i2c::I2c`], the serial port any [`embedded_io`] channel
//! with a readiness check, idle waits go through
//! [`embedded_hal::delay::DelayNs`] and the scheduler tick counter hides
//! behind [`time::Monotonic`].

#![cfg_attr(not(test), no_std)]

pub mod bq76920;
pub mod config;
pub mod poller;
pub mod shell;
pub mod soc;
pub mod status;
pub mod time;

#[cfg(test)]
mod testutil;

pub use bq76920::{Bq76920, Calibration, Error};
pub use config::{MonitorConfig, ThermistorConfig};
pub use poller::Poller;
pub use soc::ChargeEstimator;
pub use status::StatusReporter;
