//! Memory-mapped TWI register block
//!
//! The ATmega328P TWI registers live in extended I/O space and are only
//! reachable with LD/ST, so every access is a volatile load or store.

use core::ptr;

use avrtwi_hal::{Register, TwiRegisters};
use portable_atomic::{AtomicBool, Ordering};

/// TWI register addresses (data space)
pub mod addr {
    /// TWI bit rate register
    pub const TWBR: usize = 0xB8;
    /// TWI status register
    pub const TWSR: usize = 0xB9;
    /// TWI (slave) address register
    pub const TWAR: usize = 0xBA;
    /// TWI data register
    pub const TWDR: usize = 0xBB;
    /// TWI control register
    pub const TWCR: usize = 0xBC;
}

static TAKEN: AtomicBool = AtomicBool::new(false);

/// Handle to the one TWI block
///
/// Owning a `Twi` is the permission to touch the TWI registers; there is
/// never more than one unless [`Twi::steal`] is used.
#[derive(Debug)]
pub struct Twi {
    _private: (),
}

impl Twi {
    /// Take the TWI block
    ///
    /// Returns `Some` the first time it is called and `None` after that.
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self { _private: () })
        }
    }

    /// Create a handle regardless of whether one already exists
    ///
    /// # Safety
    ///
    /// The caller must make sure no other `Twi` is used while this one is
    /// alive; two handles interleaving register writes corrupt both
    /// transactions.
    pub unsafe fn steal() -> Self {
        TAKEN.store(true, Ordering::Release);
        Self { _private: () }
    }

    /// Data-space address of a register
    pub const fn address(reg: Register) -> usize {
        match reg {
            Register::BitRate => addr::TWBR,
            Register::Status => addr::TWSR,
            Register::Data => addr::TWDR,
            Register::Control => addr::TWCR,
        }
    }
}

impl TwiRegisters for Twi {
    fn read(&mut self, reg: Register) -> u8 {
        // SAFETY: the address is one of the fixed TWI registers of this part,
        // always mapped, and `self` is the only handle touching it
        unsafe { ptr::read_volatile(Self::address(reg) as *const u8) }
    }

    fn write(&mut self, reg: Register, value: u8) {
        // SAFETY: as for `read`
        unsafe { ptr::write_volatile(Self::address(reg) as *mut u8, value) }
    }
}
