//! Development peer for the ERC20 token contract.
//!
//! Hosts the contract over an in-process versioned world state, simulates
//! each transaction in isolation and commits it with MVCC validation.

pub mod config;
pub mod errors;
pub mod invoke;
pub mod server;
pub mod world_state;

pub use invoke::{Function, InvokeError, LedgerHost, TxReceipt};
pub use world_state::{CommitError, WorldState};
