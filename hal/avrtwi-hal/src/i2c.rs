//! I2C bus framing and clock presets
//!
//! Types shared by every layer that talks about the bus itself rather than
//! about a particular register.

/// Highest 7-bit slave address
pub const MAX_ADDRESS: u8 = 0x7F;

/// Transfer direction, encoded in the R/W bit of the address frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Direction {
    /// Master transmits to the slave (R/W = 0)
    Write = 0,
    /// Master receives from the slave (R/W = 1)
    Read = 1,
}

impl Direction {
    /// Value of the R/W bit
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Build the address frame (SLA+R/W) for a 7-bit slave address
    ///
    /// The address is shifted into bits 7..1; a stray eighth bit falls off
    /// the top exactly as it would on the wire.
    pub const fn address_frame(self, address: u8) -> u8 {
        (address << 1) | self.bit()
    }
}

/// Check that an address fits the 7-bit addressing range
pub const fn is_valid_address(address: u8) -> bool {
    address <= MAX_ADDRESS
}

/// SCL bus frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusFrequency {
    /// Clock frequency in Hz
    pub hz: u32,
}

impl Default for BusFrequency {
    fn default() -> Self {
        Self::FAST
    }
}

impl BusFrequency {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { hz: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { hz: 400_000 };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self { hz: 1_000_000 };

    /// Arbitrary bus frequency in Hz
    pub const fn from_hz(hz: u32) -> Self {
        Self { hz }
    }
}
