//! Transaction state machine
//!
//! ```text
//! Idle ──► Started ──► AddressSent ──► Transferring ◄─┐
//!  ▲                                        │  └──────┘
//!  └──────────────── stop ◄─────────────────┘
//! ```
//!
//! Any failure moves to `Error`, which only `stop` leaves.

use avrtwi_hal::Direction;

use super::events::Event;
use crate::error::TwiError;

/// Where the current transaction stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionState {
    /// Bus released, no transaction open
    #[default]
    Idle,
    /// START on the bus, no slave addressed yet
    Started,
    /// Slave acknowledged its address
    AddressSent(Direction),
    /// At least one data byte moved
    Transferring(Direction),
    /// A phase failed; release the bus with `stop`
    Error(TwiError),
}

impl TransactionState {
    /// Check if a transaction is open (bus held by this master)
    pub fn in_transaction(&self) -> bool {
        !matches!(self, TransactionState::Idle)
    }

    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, TransactionState::Error(_))
    }

    /// Direction of the addressed slave, if any
    pub fn direction(&self) -> Option<Direction> {
        match self {
            TransactionState::AddressSent(dir) | TransactionState::Transferring(dir) => Some(*dir),
            _ => None,
        }
    }

    /// Check if a byte may be written in this state
    pub fn can_write(&self) -> bool {
        self.direction() == Some(Direction::Write)
    }

    /// Check if a byte may be read in this state
    pub fn can_read(&self) -> bool {
        self.direction() == Some(Direction::Read)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use TransactionState::*;

        match (self, event) {
            // Failure and release apply everywhere
            (_, Failed(err)) => Error(err),
            (_, Stopped) => Idle,

            // Error is sticky until the bus is released
            (Error(_), _) => self,

            // START from idle, or repeated START mid-transaction
            (_, StartSent) => Started,

            (Started, AddressAcked(dir)) => AddressSent(dir),

            (AddressSent(dir), ByteTransferred) | (Transferring(dir), ByteTransferred) => {
                Transferring(dir)
            }

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avrtwi_hal::TwiStatus;

    use crate::error::Phase;

    #[test]
    fn test_write_transaction_flow() {
        let state = TransactionState::Idle;

        let started = state.transition(Event::StartSent);
        assert_eq!(started, TransactionState::Started);

        let addressed = started.transition(Event::AddressAcked(Direction::Write));
        assert_eq!(addressed, TransactionState::AddressSent(Direction::Write));
        assert!(addressed.can_write());
        assert!(!addressed.can_read());

        let transferring = addressed.transition(Event::ByteTransferred);
        assert_eq!(transferring, TransactionState::Transferring(Direction::Write));

        // Self-loop on further bytes
        let transferring = transferring.transition(Event::ByteTransferred);
        assert_eq!(transferring, TransactionState::Transferring(Direction::Write));

        let idle = transferring.transition(Event::Stopped);
        assert_eq!(idle, TransactionState::Idle);
    }

    #[test]
    fn test_repeated_start() {
        let state = TransactionState::Transferring(Direction::Write);
        let restarted = state.transition(Event::StartSent);
        assert_eq!(restarted, TransactionState::Started);

        let addressed = restarted.transition(Event::AddressAcked(Direction::Read));
        assert!(addressed.can_read());
    }

    #[test]
    fn test_failure_from_any_state() {
        let err = TwiError::BusTimeout(Phase::Start);
        let states = [
            TransactionState::Idle,
            TransactionState::Started,
            TransactionState::AddressSent(Direction::Read),
            TransactionState::Transferring(Direction::Write),
        ];

        for state in states {
            let next = state.transition(Event::Failed(err));
            assert_eq!(next, TransactionState::Error(err));
            assert!(next.is_error());
        }
    }

    #[test]
    fn test_error_only_left_by_stop() {
        let err = TwiError::AddressNotAcknowledged(TwiStatus::AddressWriteNack);
        let state = TransactionState::Error(err);

        assert_eq!(state.transition(Event::StartSent), state);
        assert_eq!(state.transition(Event::ByteTransferred), state);
        assert_eq!(
            state.transition(Event::AddressAcked(Direction::Write)),
            state
        );
        assert_eq!(state.transition(Event::Stopped), TransactionState::Idle);
    }

    #[test]
    fn test_out_of_order_events_ignored() {
        // Byte without an addressed slave
        let state = TransactionState::Started;
        assert_eq!(state.transition(Event::ByteTransferred), state);

        // Address ack without START
        let state = TransactionState::Idle;
        assert_eq!(
            state.transition(Event::AddressAcked(Direction::Write)),
            state
        );
    }

    #[test]
    fn test_in_transaction() {
        assert!(!TransactionState::Idle.in_transaction());
        assert!(TransactionState::Started.in_transaction());
        assert!(TransactionState::Error(TwiError::BusTimeout(Phase::Stop)).in_transaction());
    }
}
