//! Events that trigger state transitions

use avrtwi_hal::Direction;

use crate::error::TwiError;

/// Bus events reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// START or repeated START went out
    StartSent,
    /// The slave acknowledged its address
    AddressAcked(Direction),
    /// A data byte was transmitted or received
    ByteTransferred,
    /// STOP was requested and the bus released
    Stopped,
    /// A phase failed
    Failed(TwiError),
}
