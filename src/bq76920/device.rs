use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::regs::{ctrl, reg};
use super::types::{Calibration, Error};

/// Register-level driver for the TI **BQ76920** battery monitor front-end.
///
/// Every access is a blocking two-wire transaction; the part never sees more
/// than one transaction at a time because the polling task is its sole owner.
pub struct Bq76920<I2C> {
    i2c: I2C,
    addr: u8, // 7-bit I²C address
}

impl<I2C, E> Bq76920<I2C>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// Write one register: register address byte followed by the value.
    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<E>> {
        self.i2c
            .write(self.addr, &[register, value])
            .map_err(Error::Data)
    }

    /// Read `buf.len()` consecutive registers starting at `register`.
    ///
    /// The register pointer is set with a one-byte write, then the data is
    /// clocked out; the two phases report failure separately.
    pub fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.i2c
            .write(self.addr, &[register])
            .map_err(Error::Command)?;
        self.i2c.read(self.addr, buf).map_err(Error::Data)
    }

    fn read_u16(&mut self, register: u8) -> Result<u16, Error<E>> {
        let mut buf = [0u8; 2];
        self.read_registers(register, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// The ten-byte VC1_HI..VC5_LO block, raw.
    pub fn cell_block(&mut self) -> Result<[u8; 10], Error<E>> {
        let mut buf = [0u8; 10];
        self.read_registers(reg::VC1_HI, &mut buf)?;
        Ok(buf)
    }

    /// Raw pack voltage ADC reading (BAT_HI/BAT_LO pair).
    pub fn pack_voltage_raw(&mut self) -> Result<u16, Error<E>> {
        self.read_u16(reg::BAT_HI)
    }

    /// Raw TS1 thermistor ADC reading.
    pub fn ts1_raw(&mut self) -> Result<u16, Error<E>> {
        self.read_u16(reg::TS1_HI)
    }

    /// Signed coulomb-counter sample (CC_HI/CC_LO pair).
    pub fn coulomb_count(&mut self) -> Result<i16, Error<E>> {
        Ok(self.read_u16(reg::CC_HI)? as i16)
    }

    /// One-shot bring-up: enable the ADC, external TS1 and the coulomb
    /// counter, then switch the CHG/DSG FETs on. Not supervised afterwards.
    pub fn enable<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<E>> {
        self.write_register(reg::SYS_CTRL1, ctrl::SYS_CTRL1_ENABLE)?;
        // settle before the FET control write
        delay.delay_ms(2);
        self.write_register(reg::SYS_CTRL2, ctrl::SYS_CTRL2_FETS_ON)
    }

    /// Read the factory ADC gain/offset calibration registers.
    pub fn read_calibration(&mut self) -> Result<Calibration, Error<E>> {
        let mut gain1 = [0u8; 1];
        let mut offset = [0u8; 1];
        let mut gain2 = [0u8; 1];
        self.read_registers(reg::ADCGAIN1, &mut gain1)?;
        self.read_registers(reg::ADCOFFSET, &mut offset)?;
        self.read_registers(reg::ADCGAIN2, &mut gain2)?;
        Ok(Calibration::from_regs(gain1[0], offset[0], gain2[0]))
    }

    /// Release the bus handle.
    pub fn release(self) -> I2C {
        self.i2c
    }
}
