//! Fixed-point scaling between module registers and volts/amps.
//!
//! Module registers hold unsigned 16-bit counts. The resolution of one count
//! differs between module variants, so it is configurable per module.

/// Resolution of one register count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingFactors {
    /// Millivolts per count (e.g. 10 means raw value is in centivolts).
    pub voltage_resolution_mv: u32,
    /// Milliamps per count.
    pub current_resolution_ma: u32,
}

impl Default for ScalingFactors {
    /// 10 mV and 1 mA per count.
    fn default() -> Self {
        Self {
            voltage_resolution_mv: 10,
            current_resolution_ma: 1,
        }
    }
}

impl ScalingFactors {
    pub const fn new(voltage_resolution_mv: u32, current_resolution_ma: u32) -> Self {
        Self {
            voltage_resolution_mv,
            current_resolution_ma,
        }
    }

    /// Convert volts to a raw voltage register value, rounding to the nearest count.
    #[inline]
    pub fn volts_to_raw(&self, volts: f32) -> u16 {
        to_counts(volts, self.voltage_resolution_mv)
    }

    #[inline]
    pub fn raw_to_volts(&self, raw: u16) -> f32 {
        from_counts(raw, self.voltage_resolution_mv)
    }

    /// Convert amps to a raw current register value, rounding to the nearest count.
    #[inline]
    pub fn amps_to_raw(&self, amps: f32) -> u16 {
        to_counts(amps, self.current_resolution_ma)
    }

    #[inline]
    pub fn raw_to_amps(&self, raw: u16) -> f32 {
        from_counts(raw, self.current_resolution_ma)
    }
}

// Float to int casts saturate, negative inputs end up as 0.
fn to_counts(value: f32, milli_per_count: u32) -> u16 {
    (value * 1000.0 / milli_per_count as f32 + 0.5) as u16
}

fn from_counts(raw: u16, milli_per_count: u32) -> f32 {
    (raw as u32 * milli_per_count) as f32 / 1000.0
}
