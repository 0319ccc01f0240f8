//! AVR two-wire interface hardware abstraction
//!
//! This crate defines the register-level seam between the bus transaction
//! engine and the silicon. Chip crates implement [`TwiRegisters`] over the
//! memory-mapped TWI block; host tests implement it with a simulated
//! peripheral.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  avrtwi-core (TwiMaster engine)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  avrtwi-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ avrtwi-hal-   │       │ avrtwi-core:: │
//! │  atmega328p   │       │   sim (host)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Contents
//!
//! - [`registers::TwiRegisters`] - Access to TWBR, TWSR, TWDR and TWCR
//! - [`status::TwiStatus`] - Decoded master-mode status codes
//! - [`i2c::Direction`], [`i2c::BusFrequency`] - Bus framing and clock presets

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod registers;
pub mod status;

// Re-export key types at crate root for convenience
pub use i2c::{BusFrequency, Direction};
pub use registers::{Register, TwiRegisters};
pub use status::TwiStatus;
