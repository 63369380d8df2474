//! Types shared by the BQ76920 driver and the layers above it.

/// 7-bit I²C address of the BQ76920.
pub const I2C_ADDR_7BIT: u8 = 0x08;

/// Error type for the BQ76920 driver.
///
/// Register access on this part is a register-pointer write followed by the
/// data transfer; the two phases fail independently and the command protocol
/// reports them differently, so the error keeps them apart.
#[derive(Debug)]
pub enum Error<E> {
    /// The register-pointer write did not complete.
    Command(E),
    /// The data transfer did not complete.
    Data(E),
}

/// Factory ADC calibration, read once at startup and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Cell ADC gain in µV per LSB.
    pub gain_uv_per_lsb: u16,
    /// Cell ADC offset in mV.
    pub offset_mv: i8,
}

impl Calibration {
    /// Decode the three calibration registers (datasheet §8.5.4).
    ///
    /// Gain is a 5-bit value split across ADCGAIN1[2:0] (low 3 bits) and
    /// ADCGAIN2[3:2] (high 2 bits), offset from the nominal 365 µV/LSB.
    pub(crate) fn from_regs(gain1: u8, offset: u8, gain2: u8) -> Self {
        let gain_bits = (((gain2 as u16 >> 2) & 0x03) << 3) | (gain1 as u16 & 0x07);
        Self {
            gain_uv_per_lsb: gain_bits + 365,
            offset_mv: offset as i8,
        }
    }

    /// Cell voltage in mV for a raw 14-bit ADC reading.
    pub fn cell_mv(&self, raw: u16) -> i32 {
        (raw as u32 * self.gain_uv_per_lsb as u32 / 1000) as i32 + self.offset_mv as i32
    }
}

impl Default for Calibration {
    /// Nominal gain with zero offset, used until the real values are read.
    fn default() -> Self {
        Self {
            gain_uv_per_lsb: 365,
            offset_mv: 0,
        }
    }
}
