//! ERC20-style fungible token ledger.
//!
//! Balances, allowances and token metadata live in the host's world state
//! as string values. Balances are keyed by `balance` composite keys over the
//! account id, allowances by `allowance` composite keys over owner then
//! spender. Zero balances and allowances are stored as absent keys.

mod admin;
mod allowance;
mod balance;
mod contract;
mod error;
mod event;
mod metadata;
mod storage_types;

pub mod shim;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;


pub use crate::admin::MINTER_ORG_MSP_ID;
pub use crate::contract::{Token, TokenTrait};
pub use crate::error::{ContractError, ContractResult, ErrorKind};
pub use crate::event::{ApprovalEvent, TransferEvent, APPROVAL_EVENT, NULL_ACCOUNT, TRANSFER_EVENT};
pub use crate::storage_types::{
    ALLOWANCE_PREFIX, BALANCE_PREFIX, DECIMALS_KEY, NAME_KEY, SYMBOL_KEY, TOTAL_SUPPLY_KEY,
};
