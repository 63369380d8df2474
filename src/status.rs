//! Human-readable status block: cell voltages, pack voltage, external
//! thermistor temperature.

use core::fmt::Write as _;

use embedded_hal::i2c::I2c;
use embedded_io::Write;
use heapless::String;

use crate::bq76920::{Bq76920, Calibration};
use crate::config::ThermistorConfig;

/// Raw readings below this indicate a floating/disconnected input.
const CELL_RAW_FLOOR: u16 = 10;
/// Computed cell voltages above this are out of range for a Li-ion cell.
const CELL_MV_CEIL: i32 = 5000;
/// Fixed pack-voltage LSB weight in mV (BAT_HI/LO).
const PACK_LSB_MV: f32 = 1.9;
/// Fixed TS1 LSB weight in volts (50 µV).
const TS1_LSB_V: f32 = 50e-6;

/// Cell channel slots reported in the status block. VC2..VC4 are shorted
/// together on this board for the 3-cell configuration, so only the first
/// two pairs and VC5 carry real cells.
const REPORTED_SLOTS: [usize; 3] = [0, 1, 4];

/// Formats the status block for the `g` command.
///
/// The three stages (cells, pack voltage, thermistor) run independently: a
/// bus failure drops that stage's output and the report moves on.
pub struct StatusReporter {
    cal: Calibration,
    thermistor: ThermistorConfig,
}

impl StatusReporter {
    pub fn new(cal: Calibration, thermistor: ThermistorConfig) -> Self {
        Self { cal, thermistor }
    }

    /// Install the calibration read from the device at startup.
    pub fn set_calibration(&mut self, cal: Calibration) {
        self.cal = cal;
    }

    pub fn calibration(&self) -> Calibration {
        self.cal
    }

    pub fn report<I2C, E, S>(&self, bq: &mut Bq76920<I2C>, serial: &mut S) -> Result<(), S::Error>
    where
        I2C: I2c<Error = E>,
        E: core::fmt::Debug,
        S: Write,
    {
        serial.write_all(b"\r\n======== BQ76920 Status ========\r\n")?;

        if let Ok(block) = bq.cell_block() {
            serial.write_all(b"Cell Voltages:\r\n")?;
            for slot in REPORTED_SLOTS {
                let raw = u16::from_be_bytes([block[slot * 2], block[slot * 2 + 1]]);
                let mut s: String<48> = String::new();
                match cell_voltage_mv(&self.cal, raw) {
                    Some(mv) => {
                        let _ = write!(&mut s, "  C{}: {} mV (raw: 0x{:04X})\r\n", slot + 1, mv, raw);
                    }
                    None => {
                        let _ = write!(&mut s, "  C{}: ERROR (raw: 0x{:04X})\r\n", slot + 1, raw);
                    }
                }
                serial.write_all(s.as_bytes())?;
            }
        }

        if let Ok(raw) = bq.pack_voltage_raw() {
            let mv = (raw as f32 * PACK_LSB_MV) as u32;
            let mut s: String<48> = String::new();
            let _ = write!(&mut s, "Pack Voltage: {} mV (raw: 0x{:04X})\r\n", mv, raw);
            serial.write_all(s.as_bytes())?;
        }

        self.report_external_temp(bq, serial)?;

        serial.write_all(b"================================\r\n")
    }

    /// TS1 thermistor stage. A bus failure aborts only this stage.
    fn report_external_temp<I2C, E, S>(
        &self,
        bq: &mut Bq76920<I2C>,
        serial: &mut S,
    ) -> Result<(), S::Error>
    where
        I2C: I2c<Error = E>,
        E: core::fmt::Debug,
        S: Write,
    {
        let raw = match bq.ts1_raw() {
            Ok(raw) => raw,
            Err(_) => return Ok(()),
        };

        let v_ts1 = raw as f32 * TS1_LSB_V;
        let r_therm = thermistor_resistance(&self.thermistor, v_ts1);
        let temp_c = thermistor_temp_c(&self.thermistor, r_therm);

        serial.write_all(b"External Temperature Sensor:\r\n")?;
        let mut s: String<128> = String::new();
        let _ = write!(
            &mut s,
            "  Voltage:    {:.3} V\r\n  Resistance: {:.0} Ohms\r\n  Temp:       {:.2} C (raw: 0x{:04X})\r\n",
            v_ts1, r_therm, temp_c, raw
        );
        serial.write_all(s.as_bytes())
    }
}

/// Calibrated cell voltage, or `None` for the error state (disconnected or
/// out-of-range channel).
pub(crate) fn cell_voltage_mv(cal: &Calibration, raw: u16) -> Option<i32> {
    let mv = cal.cell_mv(raw);
    if raw < CELL_RAW_FLOOR || mv > CELL_MV_CEIL {
        None
    } else {
        Some(mv)
    }
}

/// NTC resistance from the sensed voltage via the pull-up divider.
pub(crate) fn thermistor_resistance(cfg: &ThermistorConfig, v_sense: f32) -> f32 {
    (v_sense * cfg.pullup_ohms) / (cfg.bias_v - v_sense)
}

/// Beta parametric model: resistance to °C.
pub(crate) fn thermistor_temp_c(cfg: &ThermistorConfig, r_therm: f32) -> f32 {
    let temp_k = 1.0 / (1.0 / cfg.t0_kelvin + (1.0 / cfg.beta) * libm::logf(r_therm / cfg.r0_ohms));
    temp_k - 273.15
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bq76920::I2C_ADDR_7BIT;
    use crate::testutil::TestSerial;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use embedded_hal::i2c::ErrorKind as I2cErrorKind;

    fn bus_error() -> I2cErrorKind {
        I2cErrorKind::Other
    }

    fn cal_365() -> Calibration {
        Calibration {
            gain_uv_per_lsb: 365,
            offset_mv: 0,
        }
    }

    fn therm() -> ThermistorConfig {
        ThermistorConfig::default()
    }

    /// Full happy-path transaction set: cell block, pack pair, TS1 pair.
    fn all_stages() -> Vec<I2cTransaction> {
        vec![
            I2cTransaction::write(I2C_ADDR_7BIT, vec![0x0C]),
            I2cTransaction::read(
                I2C_ADDR_7BIT,
                // VC1 = 0x03E8 (1000), VC2 = 0x0005 (error), VC5 = 0x3A98 (error, >5 V)
                vec![0x03, 0xE8, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x3A, 0x98],
            ),
            I2cTransaction::write(I2C_ADDR_7BIT, vec![0x2A]),
            I2cTransaction::read(I2C_ADDR_7BIT, vec![0x17, 0x70]), // 6000 raw -> 11400 mV
            I2cTransaction::write(I2C_ADDR_7BIT, vec![0x2C]),
            I2cTransaction::read(I2C_ADDR_7BIT, vec![0x4E, 0x20]), // 20000 raw -> 1.000 V
        ]
    }

    #[test]
    fn cell_conversion_matches_reference_values() {
        assert_eq!(cell_voltage_mv(&cal_365(), 1000), Some(365));
        // below the raw floor
        assert_eq!(cell_voltage_mv(&cal_365(), 5), None);
        // above 5000 mV
        assert_eq!(cell_voltage_mv(&cal_365(), 20000), None);
        let offset = Calibration {
            gain_uv_per_lsb: 380,
            offset_mv: -30,
        };
        assert_eq!(cell_voltage_mv(&offset, 10000), Some(3770));
    }

    #[test]
    fn divider_and_beta_model_match_reference_math() {
        let cfg = therm();
        let r = thermistor_resistance(&cfg, 1.0);
        assert!((r - 6666.6667).abs() < 1e-3 * 6666.6667);

        let expected_k = 1.0f64 / (1.0 / 298.15 + (1.0 / 3435.0) * (r as f64 / 10_000.0).ln());
        let t = thermistor_temp_c(&cfg, r);
        assert!((t as f64 - (expected_k - 273.15)).abs() < 1e-3);
    }

    #[test]
    fn full_report_formats_every_stage() {
        let mut bq = Bq76920::new(I2cMock::new(&all_stages()), I2C_ADDR_7BIT);
        let reporter = StatusReporter::new(cal_365(), therm());
        let mut serial = TestSerial::new();
        reporter.report(&mut bq, &mut serial).unwrap();
        let out = serial.output();

        assert!(out.starts_with("\r\n======== BQ76920 Status ========\r\n"));
        assert!(out.contains("Cell Voltages:\r\n"));
        assert!(out.contains("  C1: 365 mV (raw: 0x03E8)\r\n"));
        assert!(out.contains("  C2: ERROR (raw: 0x0005)\r\n"));
        assert!(out.contains("  C5: ERROR (raw: 0x3A98)\r\n"));
        assert!(out.contains("Pack Voltage: 11400 mV (raw: 0x1770)\r\n"));
        assert!(out.contains("External Temperature Sensor:\r\n"));
        assert!(out.contains("  Voltage:    1.000 V\r\n"));
        assert!(out.contains("  Resistance: 6667 Ohms\r\n"));
        assert!(out.ends_with("================================\r\n"));
        bq.release().done();
    }

    #[test]
    fn report_is_idempotent_for_unchanged_registers() {
        let mut transactions = all_stages();
        transactions.extend(all_stages());
        let mut bq = Bq76920::new(I2cMock::new(&transactions), I2C_ADDR_7BIT);
        let reporter = StatusReporter::new(cal_365(), therm());

        let mut first = TestSerial::new();
        reporter.report(&mut bq, &mut first).unwrap();
        let mut second = TestSerial::new();
        reporter.report(&mut bq, &mut second).unwrap();
        assert_eq!(first.output(), second.output());
        bq.release().done();
    }

    #[test]
    fn failed_cell_stage_is_omitted_but_report_continues() {
        let transactions = vec![
            I2cTransaction::write(I2C_ADDR_7BIT, vec![0x0C]).with_error(bus_error()),
            I2cTransaction::write(I2C_ADDR_7BIT, vec![0x2A]),
            I2cTransaction::read(I2C_ADDR_7BIT, vec![0x17, 0x70]),
            I2cTransaction::write(I2C_ADDR_7BIT, vec![0x2C]),
            I2cTransaction::read(I2C_ADDR_7BIT, vec![0x4E, 0x20]),
        ];
        let mut bq = Bq76920::new(I2cMock::new(&transactions), I2C_ADDR_7BIT);
        let reporter = StatusReporter::new(cal_365(), therm());
        let mut serial = TestSerial::new();
        reporter.report(&mut bq, &mut serial).unwrap();
        let out = serial.output();

        assert!(!out.contains("Cell Voltages:"));
        assert!(out.contains("Pack Voltage: 11400 mV"));
        assert!(out.contains("External Temperature Sensor:"));
        assert!(out.ends_with("================================\r\n"));
        bq.release().done();
    }

    #[test]
    fn failed_thermistor_stage_still_closes_the_block() {
        let transactions = vec![
            I2cTransaction::write(I2C_ADDR_7BIT, vec![0x0C]).with_error(bus_error()),
            I2cTransaction::write(I2C_ADDR_7BIT, vec![0x2A]).with_error(bus_error()),
            I2cTransaction::write(I2C_ADDR_7BIT, vec![0x2C]).with_error(bus_error()),
        ];
        let mut bq = Bq76920::new(I2cMock::new(&transactions), I2C_ADDR_7BIT);
        let reporter = StatusReporter::new(cal_365(), therm());
        let mut serial = TestSerial::new();
        reporter.report(&mut bq, &mut serial).unwrap();
        assert_eq!(
            serial.output(),
            "\r\n======== BQ76920 Status ========\r\n================================\r\n"
        );
        bq.release().done();
    }
}
