//! Transaction errors
//!
//! Failures are kept distinct per phase so the caller can tell a wedged bus
//! (timeout) from a bus in the wrong state (protocol error) from a missing
//! device (address NACK) and choose between retrying, backing off or giving
//! up.

use avrtwi_hal::TwiStatus;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Bus phase in which a wait ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Waiting for the START condition
    Start,
    /// Waiting for the address frame
    Address,
    /// Waiting for a transmitted data byte
    Data,
    /// Waiting for a received data byte
    Read,
    /// Waiting for the STOP condition to clear
    Stop,
}

/// Errors returned by the transaction engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TwiError {
    /// The hardware did not complete the phase within the wait budget
    BusTimeout(Phase),
    /// The status after START was neither START nor repeated START
    ProtocolError(TwiStatus),
    /// The slave did not acknowledge its address (absent or busy)
    AddressNotAcknowledged(TwiStatus),
    /// The slave rejected a written byte, or the bus reported any other
    /// status after the transfer
    DataNotAcknowledged(TwiStatus),
}

impl TwiError {
    /// Legacy numeric result code
    ///
    /// START timeout 9, bad START status 8, address timeout 7, address NACK
    /// 6, data NACK 1. Timeouts that only exist under
    /// [`WaitPolicy::Bounded`](crate::WaitPolicy::Bounded) use 5 (data),
    /// 4 (read) and 3 (stop). Success is 0.
    pub fn code(&self) -> u8 {
        match self {
            Self::BusTimeout(Phase::Start) => 9,
            Self::ProtocolError(_) => 8,
            Self::BusTimeout(Phase::Address) => 7,
            Self::AddressNotAcknowledged(_) => 6,
            Self::BusTimeout(Phase::Data) => 5,
            Self::BusTimeout(Phase::Read) => 4,
            Self::BusTimeout(Phase::Stop) => 3,
            Self::DataNotAcknowledged(_) => 1,
        }
    }

    /// Status register contents that caused the error, if any
    pub fn status(&self) -> Option<TwiStatus> {
        match self {
            Self::BusTimeout(_) => None,
            Self::ProtocolError(status)
            | Self::AddressNotAcknowledged(status)
            | Self::DataNotAcknowledged(status) => Some(*status),
        }
    }
}

impl embedded_hal::i2c::Error for TwiError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::BusTimeout(_) => ErrorKind::Other,
            Self::ProtocolError(TwiStatus::ArbitrationLost)
            | Self::AddressNotAcknowledged(TwiStatus::ArbitrationLost)
            | Self::DataNotAcknowledged(TwiStatus::ArbitrationLost) => ErrorKind::ArbitrationLoss,
            Self::ProtocolError(_) => ErrorKind::Bus,
            Self::AddressNotAcknowledged(_) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            Self::DataNotAcknowledged(TwiStatus::DataWriteNack) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
            }
            Self::DataNotAcknowledged(TwiStatus::BusError) => ErrorKind::Bus,
            Self::DataNotAcknowledged(_) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
        }
    }
}
