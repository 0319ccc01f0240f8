//! Bus clock and wait configuration
//!
//! Everything here is a compile-time constant in practice: the core clock is
//! fixed by the board and the bus frequency by the attached devices. The
//! types are `Copy` and the constructors `const` so a chip crate can build
//! its configuration in a `const` and reject unstable settings at build time.
//!
//! SCL frequency = CPU clock / (16 + 2 * TWBR * prescaler). With the
//! prescaler fixed at 1 the divisor is `(cpu_hz / bus_hz - 16) / 2`; for a
//! 16 MHz part on a 400 kHz bus that is 12.

use avrtwi_hal::BusFrequency;

/// Default core clock (Arduino Uno/Nano class boards)
pub const DEFAULT_CPU_HZ: u32 = 16_000_000;

/// Default polling budget for each bounded wait
pub const DEFAULT_WAIT_BUDGET: u32 = 0xFF;

/// TWBR must be above this value for stable bus timing
pub const MIN_STABLE_BIT_RATE: u8 = 10;

/// How byte transfers wait for the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitPolicy {
    /// START and address phases are bounded; byte transfers wait for the
    /// hardware without limit and STOP never reports a timeout
    #[default]
    Faithful,
    /// Every wait is bounded by the budget and every timeout is reported
    Bounded,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The core clock is less than 16 bus periods; no divisor can reach
    /// the requested bus frequency
    BusTooFast,
    /// The divisor does not fit TWBR without a prescaler
    BitRateOverflow {
        /// Divisor that was computed
        divisor: u32,
    },
    /// The divisor is at or below the stability floor
    Unstable {
        /// Divisor that was computed
        bit_rate: u8,
    },
}

/// TWI master configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TwiConfig {
    /// Core clock in Hz
    pub cpu_hz: u32,
    /// Target SCL frequency
    pub bus: BusFrequency,
    /// Polling iterations allowed for each bounded wait
    pub wait_budget: u32,
    /// Wait discipline for byte transfers and STOP
    pub policy: WaitPolicy,
}

impl Default for TwiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CPU_HZ, BusFrequency::FAST)
    }
}

impl TwiConfig {
    /// Create a configuration with the default budget and faithful waits
    pub const fn new(cpu_hz: u32, bus: BusFrequency) -> Self {
        Self {
            cpu_hz,
            bus,
            wait_budget: DEFAULT_WAIT_BUDGET,
            policy: WaitPolicy::Faithful,
        }
    }

    /// Replace the polling budget
    pub const fn with_wait_budget(self, wait_budget: u32) -> Self {
        Self {
            wait_budget,
            ..self
        }
    }

    /// Replace the wait policy
    pub const fn with_policy(self, policy: WaitPolicy) -> Self {
        Self { policy, ..self }
    }

    /// Unclamped divisor, or `None` if the bus is faster than the core
    /// clock allows
    const fn divisor(&self) -> Option<u32> {
        match self.cpu_hz.checked_div(self.bus.hz) {
            Some(ratio) if ratio >= 16 => Some((ratio - 16) / 2),
            _ => None,
        }
    }

    /// Value to program into TWBR
    ///
    /// Saturates at both ends; use [`TwiConfig::validate`] or
    /// [`TwiConfig::is_stable`] to find out whether it is usable.
    pub const fn bit_rate(&self) -> u8 {
        match self.divisor() {
            Some(divisor) if divisor > u8::MAX as u32 => u8::MAX,
            Some(divisor) => divisor as u8,
            None => 0,
        }
    }

    /// Whether the divisor fits TWBR and clears the stability floor
    pub const fn is_stable(&self) -> bool {
        match self.divisor() {
            Some(divisor) => divisor <= u8::MAX as u32 && divisor > MIN_STABLE_BIT_RATE as u32,
            None => false,
        }
    }

    /// Check the configuration and return the TWBR value
    pub fn validate(&self) -> Result<u8, ConfigError> {
        let divisor = self.divisor().ok_or(ConfigError::BusTooFast)?;
        let bit_rate = u8::try_from(divisor).map_err(|_| ConfigError::BitRateOverflow { divisor })?;

        if bit_rate <= MIN_STABLE_BIT_RATE {
            return Err(ConfigError::Unstable { bit_rate });
        }

        Ok(bit_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_mode_at_16mhz() {
        let config = TwiConfig::new(16_000_000, BusFrequency::FAST);
        assert_eq!(config.bit_rate(), 12);
        assert_eq!(config.validate(), Ok(12));
        assert!(config.is_stable());
    }

    #[test]
    fn test_standard_mode_at_16mhz() {
        let config = TwiConfig::new(16_000_000, BusFrequency::STANDARD);
        assert_eq!(config.bit_rate(), 72);
        assert!(config.is_stable());
    }

    #[test]
    fn test_default_config() {
        let config = TwiConfig::default();
        assert_eq!(config.cpu_hz, DEFAULT_CPU_HZ);
        assert_eq!(config.bus, BusFrequency::FAST);
        assert_eq!(config.wait_budget, DEFAULT_WAIT_BUDGET);
        assert_eq!(config.policy, WaitPolicy::Faithful);
    }

    #[test]
    fn test_unstable_divisor() {
        // 8 MHz / 400 kHz = 20 -> (20 - 16) / 2 = 2
        let config = TwiConfig::new(8_000_000, BusFrequency::FAST);
        assert_eq!(config.bit_rate(), 2);
        assert_eq!(config.validate(), Err(ConfigError::Unstable { bit_rate: 2 }));
        assert!(!config.is_stable());

        // Exactly on the floor is still unstable
        let config = TwiConfig::new(36 * 100_000, BusFrequency::STANDARD);
        assert_eq!(config.bit_rate(), MIN_STABLE_BIT_RATE);
        assert!(!config.is_stable());
    }

    #[test]
    fn test_fast_plus_unstable_at_16mhz() {
        let config = TwiConfig::new(16_000_000, BusFrequency::FAST_PLUS);
        assert_eq!(config.validate(), Err(ConfigError::Unstable { bit_rate: 0 }));
    }

    #[test]
    fn test_bus_too_fast() {
        let config = TwiConfig::new(1_000_000, BusFrequency::FAST);
        assert_eq!(config.bit_rate(), 0);
        assert_eq!(config.validate(), Err(ConfigError::BusTooFast));

        let config = TwiConfig::new(16_000_000, BusFrequency::from_hz(0));
        assert_eq!(config.validate(), Err(ConfigError::BusTooFast));
    }

    #[test]
    fn test_bit_rate_overflow() {
        // 16 MHz / 10 kHz = 1600 -> 792, needs a prescaler
        let config = TwiConfig::new(16_000_000, BusFrequency::from_hz(10_000));
        assert_eq!(config.bit_rate(), u8::MAX);
        assert_eq!(
            config.validate(),
            Err(ConfigError::BitRateOverflow { divisor: 792 })
        );
        assert!(!config.is_stable());
    }

    #[test]
    fn test_builders() {
        let config = TwiConfig::default()
            .with_wait_budget(10)
            .with_policy(WaitPolicy::Bounded);
        assert_eq!(config.wait_budget, 10);
        assert_eq!(config.policy, WaitPolicy::Bounded);
        assert_eq!(config.bit_rate(), 12);
    }

    #[test]
    fn test_const_evaluation() {
        const CONFIG: TwiConfig = TwiConfig::new(20_000_000, BusFrequency::FAST);
        const BIT_RATE: u8 = CONFIG.bit_rate();
        const STABLE: bool = CONFIG.is_stable();
        assert_eq!(BIT_RATE, 17);
        assert!(STABLE);
    }
}
