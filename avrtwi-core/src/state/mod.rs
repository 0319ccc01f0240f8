//! Transaction state tracking
//!
//! Follows a transaction through START, address and data phases. The
//! engine records every step here; the state is diagnostic and never
//! blocks an operation, since pairing `start` with `stop` is the caller's
//! contract.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::TransactionState;
