//! Board-agnostic TWI (I2C) master transaction engine
//!
//! This crate contains the bus logic that does not depend on a particular
//! chip, only on the [`avrtwi_hal::TwiRegisters`] seam:
//!
//! - Bus clock configuration and bit-rate divisor math
//! - The bounded polling primitive shared by every hardware wait
//! - The transaction engine (START, address framing, byte transfer, STOP)
//! - Transaction state tracking and the error taxonomy
//! - A simulated peripheral for host-side tests (`sim` feature)
//!
//! A transaction is composed by the caller:
//!
//! ```text
//! start(addr, dir) ──► [write_byte | read_byte_nack]* ──► stop(addr)
//! ```
//!
//! Nothing is retried internally. Every failure is returned to the caller,
//! who decides whether to back off, retry or abandon; after any failure the
//! bus must be released with `stop` before the next `start`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to later modules
mod fmt;

pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod wait;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use config::{ConfigError, TwiConfig, WaitPolicy};
pub use engine::TwiMaster;
pub use error::{Phase, TwiError};
pub use state::{Event, TransactionState};
