//! TWI status codes
//!
//! The status register reports the outcome of the last bus operation in its
//! upper five bits. Master-mode codes (ATmega328P datasheet, TWI chapter):

use crate::registers::twsr::STATUS_MASK;

/// Decoded TWSR status, prescaler bits masked away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TwiStatus {
    /// Illegal START or STOP on the bus (0x00)
    BusError,
    /// START transmitted (0x08)
    Start,
    /// Repeated START transmitted (0x10)
    RepeatedStart,
    /// SLA+W transmitted, ACK received (0x18)
    AddressWriteAck,
    /// SLA+W transmitted, NACK received (0x20)
    AddressWriteNack,
    /// Data byte transmitted, ACK received (0x28)
    DataWriteAck,
    /// Data byte transmitted, NACK received (0x30)
    DataWriteNack,
    /// Arbitration lost in SLA+R/W or data (0x38)
    ArbitrationLost,
    /// SLA+R transmitted, ACK received (0x40)
    AddressReadAck,
    /// SLA+R transmitted, NACK received (0x48)
    AddressReadNack,
    /// Data byte received, ACK returned (0x50)
    DataReadAck,
    /// Data byte received, NACK returned (0x58)
    DataReadNack,
    /// No relevant state information, TWINT not set (0xF8)
    NoInfo,
    /// Any other code (slave-mode states)
    Other(u8),
}

impl TwiStatus {
    /// Decode a raw TWSR value
    pub const fn from_raw(twsr: u8) -> Self {
        match twsr & STATUS_MASK {
            0x00 => Self::BusError,
            0x08 => Self::Start,
            0x10 => Self::RepeatedStart,
            0x18 => Self::AddressWriteAck,
            0x20 => Self::AddressWriteNack,
            0x28 => Self::DataWriteAck,
            0x30 => Self::DataWriteNack,
            0x38 => Self::ArbitrationLost,
            0x40 => Self::AddressReadAck,
            0x48 => Self::AddressReadNack,
            0x50 => Self::DataReadAck,
            0x58 => Self::DataReadNack,
            0xF8 => Self::NoInfo,
            code => Self::Other(code),
        }
    }

    /// The status code as it appears in TWSR (prescaler bits zero)
    pub const fn raw(self) -> u8 {
        match self {
            Self::BusError => 0x00,
            Self::Start => 0x08,
            Self::RepeatedStart => 0x10,
            Self::AddressWriteAck => 0x18,
            Self::AddressWriteNack => 0x20,
            Self::DataWriteAck => 0x28,
            Self::DataWriteNack => 0x30,
            Self::ArbitrationLost => 0x38,
            Self::AddressReadAck => 0x40,
            Self::AddressReadNack => 0x48,
            Self::DataReadAck => 0x50,
            Self::DataReadNack => 0x58,
            Self::NoInfo => 0xF8,
            Self::Other(code) => code & STATUS_MASK,
        }
    }

    /// START or repeated START went out on the bus
    pub fn is_start(self) -> bool {
        matches!(self, Self::Start | Self::RepeatedStart)
    }

    /// The addressed slave acknowledged its address
    pub fn is_address_ack(self) -> bool {
        matches!(self, Self::AddressWriteAck | Self::AddressReadAck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prescaler_bits_masked() {
        assert_eq!(TwiStatus::from_raw(0x08), TwiStatus::Start);
        assert_eq!(TwiStatus::from_raw(0x0B), TwiStatus::Start);
        assert_eq!(TwiStatus::from_raw(0x2C), TwiStatus::DataWriteAck);
        assert_eq!(TwiStatus::from_raw(0xFF), TwiStatus::NoInfo);
    }

    #[test]
    fn test_master_table_codes() {
        let table = [
            (0x00, TwiStatus::BusError),
            (0x08, TwiStatus::Start),
            (0x10, TwiStatus::RepeatedStart),
            (0x18, TwiStatus::AddressWriteAck),
            (0x20, TwiStatus::AddressWriteNack),
            (0x28, TwiStatus::DataWriteAck),
            (0x30, TwiStatus::DataWriteNack),
            (0x38, TwiStatus::ArbitrationLost),
            (0x40, TwiStatus::AddressReadAck),
            (0x48, TwiStatus::AddressReadNack),
            (0x50, TwiStatus::DataReadAck),
            (0x58, TwiStatus::DataReadNack),
            (0xF8, TwiStatus::NoInfo),
        ];

        for (code, status) in table {
            assert_eq!(TwiStatus::from_raw(code), status);
            assert_eq!(status.raw(), code);
        }
    }

    #[test]
    fn test_slave_codes_are_other() {
        // SLA+W received in slave-receiver mode
        assert_eq!(TwiStatus::from_raw(0x60), TwiStatus::Other(0x60));
        assert_eq!(TwiStatus::Other(0x60).raw(), 0x60);
    }

    #[test]
    fn test_start_and_address_predicates() {
        assert!(TwiStatus::Start.is_start());
        assert!(TwiStatus::RepeatedStart.is_start());
        assert!(!TwiStatus::ArbitrationLost.is_start());
        assert!(TwiStatus::AddressWriteAck.is_address_ack());
        assert!(TwiStatus::AddressReadAck.is_address_ack());
        assert!(!TwiStatus::AddressWriteNack.is_address_ack());
    }
}
