//! ATmega328P support for the avrtwi master engine
//!
//! This crate provides the memory-mapped TWI register block and the
//! board clock constants for ATmega328P parts (Arduino Uno, Nano, Pro Mini).
//!
//! # Features
//!
//! - `cpu-16mhz` (default), `cpu-8mhz`, `cpu-20mhz` - Core clock
//! - `standard-mode` - 100 kHz bus instead of 400 kHz
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! ```ignore
//! use avrtwi_hal::Direction;
//!
//! let mut twi = avrtwi_hal_atmega328p::take_master().unwrap();
//! twi.start(0x50, Direction::Write)?;
//! twi.write_byte(0xAA)?;
//! twi.stop(0x50)?;
//! ```

#![no_std]

pub mod clock;
pub mod i2c;

use avrtwi_core::TwiMaster;

// Re-export shared types from avrtwi-hal and avrtwi-core
pub use avrtwi_core::{TwiConfig, TwiError, WaitPolicy};
pub use avrtwi_hal::{BusFrequency, Direction};
pub use clock::{BUS_CONFIG, CPU_HZ};
pub use i2c::Twi;

/// Take the TWI block and return an initialized master
///
/// Returns `None` if the block was already taken.
pub fn take_master() -> Option<TwiMaster<Twi>> {
    take_master_with(BUS_CONFIG)
}

/// Take the TWI block and return a master initialized with `config`
pub fn take_master_with(config: TwiConfig) -> Option<TwiMaster<Twi>> {
    let mut master = TwiMaster::new(Twi::take()?, config);
    master.init();
    Some(master)
}
