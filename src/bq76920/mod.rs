//! Driver for the TI BQ76920 battery monitor front-end.

pub mod device;
pub mod regs;
pub mod types;

pub use device::Bq76920;
pub use types::{Calibration, Error, I2C_ADDR_7BIT};
