//! Coulomb-counted state-of-charge estimation.

use embedded_hal::i2c::I2c;

use crate::bq76920::Bq76920;
use crate::config::MonitorConfig;
use crate::time::Ticks;

/// Result of one successful charge update, reported every poll cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChargeSample {
    pub current_a: f32,
    pub soc_percent: f32,
}

/// Integrates the coulomb-counter register into remaining capacity.
///
/// The counter is a signed voltage sample across the shunt; positive means
/// discharge. Each update converts it to amps, scales by the elapsed time and
/// subtracts the resulting charge from the remaining capacity, clamped into
/// `[0, nominal]`. A rough estimator: there is no initial-SoC measurement, so
/// the pack is assumed full at task start.
pub struct ChargeEstimator {
    remaining_mah: f32,
    soc_percent: f32,
    last_update: Option<Ticks>,
    capacity_mah: f32,
    shunt_ohms: f32,
    cc_gain_uv: f32,
}

impl ChargeEstimator {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            remaining_mah: config.nominal_capacity_mah,
            soc_percent: 100.0,
            last_update: None,
            capacity_mah: config.nominal_capacity_mah,
            shunt_ohms: config.shunt_ohms,
            cc_gain_uv: config.cc_gain_uv,
        }
    }

    pub fn remaining_mah(&self) -> f32 {
        self.remaining_mah
    }

    pub fn soc_percent(&self) -> f32 {
        self.soc_percent
    }

    /// One integration step at tick `now`.
    ///
    /// The first call has no previous timestamp and uses 1.0 s elapsed as a
    /// bootstrap default. A bus failure skips the update for this cycle:
    /// capacity and percentage keep their previous values, nothing is
    /// reported and nothing is retried until the next cycle.
    pub fn update<I2C, E>(&mut self, bq: &mut Bq76920<I2C>, now: Ticks) -> Option<ChargeSample>
    where
        I2C: I2c<Error = E>,
        E: core::fmt::Debug,
    {
        let dt_s = match self.last_update {
            None => 1.0,
            Some(prev) => now.millis_since(prev) as f32 / 1000.0,
        };
        self.last_update = Some(now);

        let cc_raw = bq.coulomb_count().ok()?;

        let cc_voltage_v = cc_raw as f32 * self.cc_gain_uv * 1e-6;
        let current_a = cc_voltage_v / self.shunt_ohms;
        // positive current = discharge
        let delta_mah = current_a * dt_s * 1000.0 / 3600.0;

        self.remaining_mah = (self.remaining_mah - delta_mah).clamp(0.0, self.capacity_mah);
        self.soc_percent = self.remaining_mah / self.capacity_mah * 100.0;

        Some(ChargeSample {
            current_a,
            soc_percent: self.soc_percent,
        })
    }
}
