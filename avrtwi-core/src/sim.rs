//! Simulated TWI peripheral
//!
//! Implements [`TwiRegisters`] with a single scripted slave on the bus, so
//! the engine (and code built on it) can be tested on the host. Each read of
//! the control register counts as one polling iteration and advances the
//! simulated hardware by one step.

use avrtwi_hal::registers::{twcr, twsr};
use avrtwi_hal::{Direction, Register, TwiRegisters, TwiStatus};
use heapless::Vec;

use crate::error::Phase;

/// Polls before a simulated operation completes
pub const DEFAULT_LATENCY: u32 = 3;

/// Bytes the simulated slave keeps
pub const RECEIVE_CAPACITY: usize = 64;

/// How the simulated slave responds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaveBehavior {
    /// Acknowledges its address and every byte
    Present,
    /// Nobody answers the address
    Absent,
    /// Acknowledges the address and the first `after` bytes, then NACKs
    DataNack {
        /// Bytes accepted before the first NACK
        after: usize,
    },
    /// The bus reports this status instead of START
    BadStart(TwiStatus),
    /// The hardware never finishes this phase
    Stall(Phase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    After(u32),
    Never,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    completion: Completion,
    phase: Phase,
    status: TwiStatus,
    read: Option<u8>,
}

const fn slot(phase: Phase) -> usize {
    match phase {
        Phase::Start => 0,
        Phase::Address => 1,
        Phase::Data => 2,
        Phase::Read => 3,
        Phase::Stop => 4,
    }
}

/// Simulated TWI block with one slave attached
#[derive(Debug, Clone)]
pub struct SimTwi {
    behavior: SlaveBehavior,
    latency: [u32; 5],
    reserved: u8,
    bit_rate: u8,
    bit_rate_writes: u32,
    prescaler: u8,
    control: u8,
    data: u8,
    status: TwiStatus,
    pending: Option<Pending>,
    phase: Phase,
    bus_held: bool,
    expect_address: bool,
    addressed: Option<Direction>,
    last_frame: Option<u8>,
    received: Vec<u8, RECEIVE_CAPACITY>,
    read_value: u8,
    polls: [u32; 5],
}

impl Default for SimTwi {
    fn default() -> Self {
        Self::new(SlaveBehavior::Present)
    }
}

impl SimTwi {
    /// Create a simulated bus with the given slave
    pub fn new(behavior: SlaveBehavior) -> Self {
        Self {
            behavior,
            latency: [DEFAULT_LATENCY; 5],
            reserved: 0,
            bit_rate: 0,
            bit_rate_writes: 0,
            prescaler: 0,
            control: 0,
            data: 0,
            status: TwiStatus::NoInfo,
            pending: None,
            phase: Phase::Start,
            bus_held: false,
            expect_address: false,
            addressed: None,
            last_frame: None,
            received: Vec::new(),
            read_value: 0,
            polls: [0; 5],
        }
    }

    /// Set the completion latency of every phase
    pub fn with_latency(mut self, polls: u32) -> Self {
        self.latency = [polls; 5];
        self
    }

    /// Set the completion latency of one phase
    pub fn with_phase_latency(mut self, phase: Phase, polls: u32) -> Self {
        self.latency[slot(phase)] = polls;
        self
    }

    /// Byte the slave returns on reads
    pub fn with_read_value(mut self, value: u8) -> Self {
        self.read_value = value;
        self
    }

    /// Extra bits OR'd into every TWSR read (prescaler and reserved bits)
    pub fn with_status_noise(mut self, bits: u8) -> Self {
        self.reserved = bits & !twsr::STATUS_MASK;
        self
    }

    /// Swap the slave behavior mid-test
    pub fn set_behavior(&mut self, behavior: SlaveBehavior) {
        self.behavior = behavior;
    }

    /// Last value written to TWBR
    pub fn bit_rate(&self) -> u8 {
        self.bit_rate
    }

    /// Number of TWBR writes
    pub fn bit_rate_writes(&self) -> u32 {
        self.bit_rate_writes
    }

    /// Prescaler bits last written to TWSR
    pub fn prescaler(&self) -> u8 {
        self.prescaler
    }

    /// Status of the last completed operation
    pub fn status(&self) -> TwiStatus {
        self.status
    }

    /// The bus is released (no START outstanding)
    pub fn is_bus_idle(&self) -> bool {
        !self.bus_held
    }

    /// Direction the slave was addressed with, while addressed
    pub fn addressed(&self) -> Option<Direction> {
        self.addressed
    }

    /// Last address frame (SLA+R/W) put on the bus
    pub fn last_address_frame(&self) -> Option<u8> {
        self.last_frame
    }

    /// Bytes the slave has received, NACKed ones included
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Control register polls spent in a phase
    pub fn polls(&self, phase: Phase) -> u32 {
        self.polls[slot(phase)]
    }

    /// Control register polls across all phases
    pub fn total_polls(&self) -> u32 {
        self.polls.iter().sum()
    }

    /// Forget poll counts
    pub fn reset_polls(&mut self) {
        self.polls = [0; 5];
    }

    fn schedule(&mut self, phase: Phase, status: TwiStatus, read: Option<u8>) {
        let completion = if self.behavior == SlaveBehavior::Stall(phase) {
            Completion::Never
        } else {
            Completion::After(self.latency[slot(phase)])
        };

        self.phase = phase;
        self.pending = Some(Pending {
            completion,
            phase,
            status,
            read,
        });
    }

    fn on_control(&mut self, value: u8) {
        // Writing a one to TWINT clears the flag
        self.control = value & !twcr::TWINT;

        if value & twcr::TWEN == 0 {
            self.pending = None;
            return;
        }

        if value & twcr::TWSTO != 0 {
            self.addressed = None;
            self.expect_address = false;
            self.schedule(Phase::Stop, TwiStatus::NoInfo, None);
        } else if value & twcr::TWSTA != 0 {
            let status = match self.behavior {
                SlaveBehavior::BadStart(status) => status,
                _ if self.bus_held => TwiStatus::RepeatedStart,
                _ => TwiStatus::Start,
            };
            self.bus_held = true;
            self.addressed = None;
            self.expect_address = true;
            self.schedule(Phase::Start, status, None);
        } else if value & twcr::TWINT != 0 {
            if self.expect_address {
                self.address_phase();
            } else {
                self.data_phase(value);
            }
        }
    }

    fn address_phase(&mut self) {
        self.expect_address = false;
        let frame = self.data;
        self.last_frame = Some(frame);

        let direction = if frame & 0x01 != 0 {
            Direction::Read
        } else {
            Direction::Write
        };
        let acked = self.behavior != SlaveBehavior::Absent;

        let status = match (direction, acked) {
            (Direction::Write, true) => TwiStatus::AddressWriteAck,
            (Direction::Write, false) => TwiStatus::AddressWriteNack,
            (Direction::Read, true) => TwiStatus::AddressReadAck,
            (Direction::Read, false) => TwiStatus::AddressReadNack,
        };
        if acked {
            self.addressed = Some(direction);
        }
        self.schedule(Phase::Address, status, None);
    }

    fn data_phase(&mut self, control: u8) {
        match self.addressed {
            Some(Direction::Write) => {
                let accepted = match self.behavior {
                    SlaveBehavior::DataNack { after } => self.received.len() < after,
                    _ => true,
                };
                // Overflow just drops bytes; tests never send that many
                let _ = self.received.push(self.data);

                let status = if accepted {
                    TwiStatus::DataWriteAck
                } else {
                    TwiStatus::DataWriteNack
                };
                self.schedule(Phase::Data, status, None);
            }
            Some(Direction::Read) => {
                let status = if control & twcr::TWEA != 0 {
                    TwiStatus::DataReadAck
                } else {
                    TwiStatus::DataReadNack
                };
                self.schedule(Phase::Read, status, Some(self.read_value));
            }
            None => self.schedule(Phase::Data, TwiStatus::NoInfo, None),
        }
    }

    fn advance(&mut self) {
        let Some(mut pending) = self.pending else {
            return;
        };

        match pending.completion {
            Completion::Never => {}
            Completion::After(0) => {
                self.pending = None;
                self.complete(pending);
            }
            Completion::After(n) => {
                pending.completion = Completion::After(n - 1);
                self.pending = Some(pending);
            }
        }
    }

    fn complete(&mut self, pending: Pending) {
        if pending.phase == Phase::Stop {
            self.control &= !twcr::TWSTO;
            self.bus_held = false;
            return;
        }

        self.status = pending.status;
        if let Some(byte) = pending.read {
            self.data = byte;
        }
        self.control |= twcr::TWINT;
    }
}

impl TwiRegisters for SimTwi {
    fn read(&mut self, reg: Register) -> u8 {
        match reg {
            Register::BitRate => self.bit_rate,
            Register::Status => self.status.raw() | self.prescaler | self.reserved,
            Register::Data => self.data,
            Register::Control => {
                self.polls[slot(self.phase)] += 1;
                self.advance();
                self.control
            }
        }
    }

    fn write(&mut self, reg: Register, value: u8) {
        match reg {
            Register::BitRate => {
                self.bit_rate = value;
                self.bit_rate_writes += 1;
            }
            Register::Status => self.prescaler = value & twsr::PRESCALER_MASK,
            Register::Data => self.data = value,
            Register::Control => self.on_control(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_until_flag(sim: &mut SimTwi, flag: u8) -> u32 {
        let mut polls = 0;
        while sim.read(Register::Control) & flag == 0 {
            polls += 1;
            assert!(polls < 1000, "simulated flag never set");
        }
        polls + 1
    }

    #[test]
    fn test_start_completes_after_latency() {
        let mut sim = SimTwi::new(SlaveBehavior::Present).with_latency(3);
        sim.write(
            Register::Control,
            twcr::TWINT | twcr::TWSTA | twcr::TWEN,
        );

        assert_eq!(poll_until_flag(&mut sim, twcr::TWINT), 4);
        assert_eq!(sim.status(), TwiStatus::Start);
        assert!(!sim.is_bus_idle());
    }

    #[test]
    fn test_second_start_is_repeated() {
        let mut sim = SimTwi::new(SlaveBehavior::Present).with_latency(0);
        sim.write(Register::Control, twcr::TWINT | twcr::TWSTA | twcr::TWEN);
        poll_until_flag(&mut sim, twcr::TWINT);
        sim.write(Register::Control, twcr::TWINT | twcr::TWSTA | twcr::TWEN);
        poll_until_flag(&mut sim, twcr::TWINT);
        assert_eq!(sim.status(), TwiStatus::RepeatedStart);
    }

    #[test]
    fn test_stop_clears_twsto_and_releases_bus() {
        let mut sim = SimTwi::new(SlaveBehavior::Present).with_latency(1);
        sim.write(Register::Control, twcr::TWINT | twcr::TWSTA | twcr::TWEN);
        poll_until_flag(&mut sim, twcr::TWINT);

        sim.write(Register::Control, twcr::TWINT | twcr::TWSTO | twcr::TWEN);
        assert_ne!(sim.read(Register::Control) & twcr::TWSTO, 0);
        assert_eq!(sim.read(Register::Control) & twcr::TWSTO, 0);
        assert!(sim.is_bus_idle());
    }

    #[test]
    fn test_status_noise_only_in_low_bits() {
        let mut sim = SimTwi::new(SlaveBehavior::Present).with_status_noise(0xFF);
        assert_eq!(sim.read(Register::Status), 0xF8 | 0x07);
    }

    #[test]
    fn test_stalled_phase_never_completes() {
        let mut sim = SimTwi::new(SlaveBehavior::Stall(Phase::Start));
        sim.write(Register::Control, twcr::TWINT | twcr::TWSTA | twcr::TWEN);
        for _ in 0..500 {
            assert_eq!(sim.read(Register::Control) & twcr::TWINT, 0);
        }
        assert_eq!(sim.polls(Phase::Start), 500);
    }
}
