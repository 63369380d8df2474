//! Register addresses and bit values for the BQ76920.
#![allow(dead_code)]

/// Register map subset used by the monitor task. (datasheet §8.5)
pub mod reg {
    // --- Control ---
    /// System control 1: ADC_EN, TEMP_SEL, CC_EN bits
    pub const SYS_CTRL1: u8 = 0x04;
    /// System control 2: CHG_ON / DSG_ON bits
    pub const SYS_CTRL2: u8 = 0x05;

    // --- Voltages ---
    /// Cell 1 voltage high byte; VC1..VC5 pairs run through 0x15
    pub const VC1_HI: u8 = 0x0C;
    /// Pack voltage high byte (1.9 mV units after the fixed scaling)
    pub const BAT_HI: u8 = 0x2A;

    // --- Temperature ---
    /// TS1 thermistor reading high byte (50 µV units)
    pub const TS1_HI: u8 = 0x2C;

    // --- Coulomb counter ---
    /// Coulomb counter high byte (signed 16-bit pair with CC_LO)
    pub const CC_HI: u8 = 0x32;
    pub const CC_LO: u8 = 0x33;

    // --- Factory calibration ---
    /// ADC gain bits 3..1
    pub const ADCGAIN1: u8 = 0x50;
    /// ADC offset, signed mV
    pub const ADCOFFSET: u8 = 0x51;
    /// ADC gain bits 4..3 (in bits 3..2 of the register)
    pub const ADCGAIN2: u8 = 0x59;
}

/// Bring-up values written once at task start.
pub mod ctrl {
    /// ADC_EN + TEMP_SEL (external TS1) + CC_EN.
    pub const SYS_CTRL1_ENABLE: u8 = 0x19;
    /// CHG_ON + DSG_ON.
    pub const SYS_CTRL2_FETS_ON: u8 = 0xC0;
}
