//! Bus transaction engine
//!
//! [`TwiMaster`] owns the TWI register block and drives it through the
//! master-transmitter and master-receiver sequences:
//!
//! 1. `start` - START, wait, check status; SLA+R/W, wait, check status
//! 2. `write_byte` / `read_byte_nack` - one data byte per call
//! 3. `stop` - STOP, wait for the hardware to clear TWSTO
//!
//! The START and address waits are always bounded by the configured budget.
//! Under [`WaitPolicy::Faithful`] the byte transfers wait for TWINT without
//! limit and `stop` gives up silently; [`WaitPolicy::Bounded`] bounds those
//! waits too and reports the extra timeouts.

use avrtwi_hal::i2c::is_valid_address;
use avrtwi_hal::registers::{twcr, twsr};
use avrtwi_hal::{Direction, Register, TwiRegisters, TwiStatus};

use crate::config::{TwiConfig, WaitPolicy};
use crate::error::{Phase, TwiError};
use crate::state::{Event, TransactionState};
use crate::wait::{wait_for_flag, wait_forever, WaitBudget};

/// TWI bus master
///
/// There is one of these per physical TWI block. It is not `Clone`; pass it
/// by `&mut` to whatever needs the bus.
pub struct TwiMaster<R> {
    regs: R,
    config: TwiConfig,
    state: TransactionState,
}

impl<R: TwiRegisters> TwiMaster<R> {
    /// Wrap a register block
    ///
    /// Does not touch the hardware; call [`TwiMaster::init`] before the
    /// first transaction.
    pub fn new(regs: R, config: TwiConfig) -> Self {
        Self {
            regs,
            config,
            state: TransactionState::Idle,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &TwiConfig {
        &self.config
    }

    /// Current transaction state
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Borrow the register block
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Give the register block back
    pub fn free(self) -> R {
        self.regs
    }

    /// Program the bus clock
    ///
    /// Clears the prescaler and writes the bit-rate divisor. The pins are
    /// not driven until the first `start`. Safe to call repeatedly; the
    /// divisor only depends on the configuration.
    pub fn init(&mut self) {
        let bit_rate = self.config.bit_rate();
        if !self.config.is_stable() {
            warn!("twi: bit rate {} outside the stable range", bit_rate);
        }

        self.regs.write(Register::Status, twsr::PRESCALER_1);
        self.regs.write(Register::BitRate, bit_rate);
        debug!("twi: TWBR={} for {} Hz bus", bit_rate, self.config.bus.hz);
    }

    /// Open a transaction with the slave at `address`
    ///
    /// Sends START (or repeated START if a transaction is already open) and
    /// the address frame. On success the bus is held until [`TwiMaster::stop`].
    pub fn start(&mut self, address: u8, direction: Direction) -> Result<(), TwiError> {
        if self.state.is_error() {
            warn!("twi: start after a failure without stop ({})", self.state);
        }
        if !is_valid_address(address) {
            warn!("twi: address {=u8:#x} is not 7-bit", address);
        }

        // START
        self.regs
            .write(Register::Control, twcr::TWEN | twcr::TWINT | twcr::TWSTA);
        self.wait_bounded(Phase::Start)?;

        let status = self.status();
        if !status.is_start() {
            return Err(self.fail(TwiError::ProtocolError(status)));
        }
        self.record(Event::StartSent);

        // SLA+R/W
        self.regs
            .write(Register::Data, direction.address_frame(address));
        self.regs.write(Register::Control, twcr::TWINT | twcr::TWEN);
        self.wait_bounded(Phase::Address)?;

        let status = self.status();
        let expected = match direction {
            Direction::Write => TwiStatus::AddressWriteAck,
            Direction::Read => TwiStatus::AddressReadAck,
        };
        if status != expected {
            return Err(self.fail(TwiError::AddressNotAcknowledged(status)));
        }

        trace!("twi: addressed {=u8:#x} ({})", address, direction);
        self.record(Event::AddressAcked(direction));
        Ok(())
    }

    /// Transmit one byte to the addressed slave
    ///
    /// Only valid after a successful `start` with [`Direction::Write`]. Any
    /// status other than "data transmitted, ACK received" is reported as
    /// [`TwiError::DataNotAcknowledged`].
    pub fn write_byte(&mut self, data: u8) -> Result<(), TwiError> {
        if !self.state.can_write() {
            warn!("twi: write_byte in state {}", self.state);
        }

        self.regs.write(Register::Data, data);
        self.regs.write(Register::Control, twcr::TWINT | twcr::TWEN);
        self.wait_transfer(Phase::Data)?;

        match self.status() {
            TwiStatus::DataWriteAck => {
                self.record(Event::ByteTransferred);
                Ok(())
            }
            status => Err(self.fail(TwiError::DataNotAcknowledged(status))),
        }
    }

    /// Receive one byte and answer NACK
    ///
    /// The NACK tells the slave this is the last byte of the read; follow
    /// with `stop` or a repeated `start`. Only valid after a successful
    /// `start` with [`Direction::Read`]. Never fails under
    /// [`WaitPolicy::Faithful`].
    pub fn read_byte_nack(&mut self) -> Result<u8, TwiError> {
        if !self.state.can_read() {
            warn!("twi: read_byte_nack in state {}", self.state);
        }

        // TWEA clear: NACK after the byte
        self.regs.write(Register::Control, twcr::TWINT | twcr::TWEN);
        self.wait_transfer(Phase::Read)?;

        self.record(Event::ByteTransferred);
        Ok(self.regs.read(Register::Data))
    }

    /// Close the transaction and release the bus
    ///
    /// `_address` is accepted for symmetry with `start`; the hardware does
    /// not need it. The wait for TWSTO to clear is bounded. When it runs out
    /// the call returns anyway under [`WaitPolicy::Faithful`] and the bus
    /// may still be held; [`WaitPolicy::Bounded`] reports
    /// [`TwiError::BusTimeout`] with [`Phase::Stop`].
    pub fn stop(&mut self, _address: u8) -> Result<(), TwiError> {
        self.regs
            .write(Register::Control, twcr::TWEN | twcr::TWINT | twcr::TWSTO);

        let mut budget = WaitBudget::new(self.config.wait_budget);
        let regs = &mut self.regs;
        let released = wait_for_flag(
            || regs.read(Register::Control) & twcr::TWSTO == 0,
            &mut budget,
        );

        if released {
            self.record(Event::Stopped);
            return Ok(());
        }

        warn!(
            "twi: STOP still pending after {} polls",
            self.config.wait_budget
        );
        match self.config.policy {
            WaitPolicy::Faithful => {
                self.record(Event::Stopped);
                Ok(())
            }
            WaitPolicy::Bounded => Err(self.fail(TwiError::BusTimeout(Phase::Stop))),
        }
    }

    fn status(&mut self) -> TwiStatus {
        TwiStatus::from_raw(self.regs.read(Register::Status))
    }

    fn twint_set(regs: &mut R) -> bool {
        regs.read(Register::Control) & twcr::TWINT != 0
    }

    /// Wait for TWINT within the budget
    fn wait_bounded(&mut self, phase: Phase) -> Result<(), TwiError> {
        let mut budget = WaitBudget::new(self.config.wait_budget);
        let regs = &mut self.regs;
        if wait_for_flag(|| Self::twint_set(regs), &mut budget) {
            Ok(())
        } else {
            Err(self.fail(TwiError::BusTimeout(phase)))
        }
    }

    /// Wait for TWINT after a byte transfer, per the wait policy
    fn wait_transfer(&mut self, phase: Phase) -> Result<(), TwiError> {
        match self.config.policy {
            WaitPolicy::Faithful => {
                let regs = &mut self.regs;
                wait_forever(|| Self::twint_set(regs));
                Ok(())
            }
            WaitPolicy::Bounded => self.wait_bounded(phase),
        }
    }

    fn record(&mut self, event: Event) {
        self.state = self.state.transition(event);
    }

    fn fail(&mut self, err: TwiError) -> TwiError {
        warn!("twi: {}", err);
        self.record(Event::Failed(err));
        err
    }
}
