//! TWI register block abstraction
//!
//! The engine only ever touches four registers of the TWI block. They are
//! addressed by name so the same transaction code can drive memory-mapped
//! hardware or a simulated peripheral.

/// TWI registers used in master mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Bit rate register (TWBR)
    BitRate,
    /// Status register (TWSR): status code in bits 7..3, prescaler in bits 1..0
    Status,
    /// Data register (TWDR)
    Data,
    /// Control register (TWCR)
    Control,
}

/// Access to the TWI register block
///
/// Implementations must perform every access, in order, with no caching:
/// the engine polls [`Register::Control`] in tight loops and relies on each
/// read observing the current hardware value. Reads take `&mut self`
/// because reading TWDR and TWSR has side effects on real silicon and on the
/// simulator.
pub trait TwiRegisters {
    /// Read the current value of a register
    fn read(&mut self, reg: Register) -> u8;

    /// Write a value to a register
    fn write(&mut self, reg: Register, value: u8);
}

impl<T: TwiRegisters + ?Sized> TwiRegisters for &mut T {
    fn read(&mut self, reg: Register) -> u8 {
        T::read(self, reg)
    }

    fn write(&mut self, reg: Register, value: u8) {
        T::write(self, reg, value)
    }
}

/// TWCR - control register bits
pub mod twcr {
    /// TWI interrupt flag; set by hardware when an operation completes,
    /// cleared by writing a one
    pub const TWINT: u8 = 1 << 7;
    /// Enable acknowledge
    pub const TWEA: u8 = 1 << 6;
    /// START condition request
    pub const TWSTA: u8 = 1 << 5;
    /// STOP condition request; cleared by hardware once STOP is on the bus
    pub const TWSTO: u8 = 1 << 4;
    /// Write collision flag
    pub const TWWC: u8 = 1 << 3;
    /// Enable the interface and take over the SDA/SCL pins
    pub const TWEN: u8 = 1 << 2;
    /// Interrupt enable
    pub const TWIE: u8 = 1 << 0;
}

/// TWSR - status register fields
pub mod twsr {
    /// Status code bits (7..3)
    pub const STATUS_MASK: u8 = 0xF8;
    /// Prescaler bits (1..0)
    pub const PRESCALER_MASK: u8 = 0x03;
    /// Prescaler value 1
    pub const PRESCALER_1: u8 = 0x00;
}
