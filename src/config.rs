//! Pack and board parameters, gathered in one place instead of scattered
//! literals. Construct once at startup and hand to [`crate::Poller::new`].

/// Everything the monitor task needs to know about the pack and board.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MonitorConfig {
    /// Usable pack capacity when full, from the cell chemistry datasheet.
    pub nominal_capacity_mah: f32,
    /// Sense resistor between SRP and SRN.
    pub shunt_ohms: f32,
    /// Coulomb-counter LSB weight across the shunt.
    pub cc_gain_uv: f32,
    /// How long the line reader waits for a terminator before giving up.
    pub line_timeout_ms: u32,
    pub thermistor: ThermistorConfig,
}

/// External NTC wiring and Beta-model constants for the TS1 input.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermistorConfig {
    /// Bias rail feeding the divider (REGOUT).
    pub bias_v: f32,
    /// Pull-up from the bias rail to TS1.
    pub pullup_ohms: f32,
    /// Beta constant of the NTC.
    pub beta: f32,
    /// NTC resistance at the reference temperature.
    pub r0_ohms: f32,
    /// Reference temperature in Kelvin (25 °C).
    pub t0_kelvin: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            nominal_capacity_mah: 3200.0,
            shunt_ohms: 0.01,
            cc_gain_uv: 369.0,
            line_timeout_ms: 2000,
            thermistor: ThermistorConfig::default(),
        }
    }
}

impl Default for ThermistorConfig {
    fn default() -> Self {
        Self {
            bias_v: 2.5,
            pullup_ohms: 10_000.0,
            beta: 3435.0,
            r0_ohms: 10_000.0,
            t0_kelvin: 298.15,
        }
    }
}
