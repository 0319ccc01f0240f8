//! Board clock and bus configuration
//!
//! The core clock comes from a cargo feature; the bus frequency defaults to
//! fast mode except on 8 MHz parts, where 400 kHz would need a TWBR of 2.

use avrtwi_core::TwiConfig;
use avrtwi_hal::BusFrequency;

#[cfg(any(
    all(feature = "cpu-8mhz", feature = "cpu-16mhz"),
    all(feature = "cpu-8mhz", feature = "cpu-20mhz"),
    all(feature = "cpu-16mhz", feature = "cpu-20mhz"),
))]
compile_error!("select exactly one cpu-* feature (use default-features = false)");

/// Core clock in Hz
pub const CPU_HZ: u32 = if cfg!(feature = "cpu-8mhz") {
    8_000_000
} else if cfg!(feature = "cpu-20mhz") {
    20_000_000
} else {
    16_000_000
};

/// SCL frequency
pub const BUS: BusFrequency = if cfg!(any(feature = "standard-mode", feature = "cpu-8mhz")) {
    BusFrequency::STANDARD
} else {
    BusFrequency::FAST
};

/// Configuration used by [`crate::take_master`]
pub const BUS_CONFIG: TwiConfig = TwiConfig::new(CPU_HZ, BUS);

const _: () = assert!(
    BUS_CONFIG.is_stable(),
    "TWBR must be above 10 for stable operation; lower the bus frequency"
);
