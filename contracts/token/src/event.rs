use serde::{Deserialize, Serialize};

use crate::error::{ContractError, ContractResult};
use crate::shim::ChaincodeStub;

/// Account used as the counterparty of mints and burns.
pub const NULL_ACCOUNT: &str = "0x0";

pub const TRANSFER_EVENT: &str = "Transfer";
pub const APPROVAL_EVENT: &str = "Approval";

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub from: String,
    pub to: String,
    pub value: i64,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ApprovalEvent {
    pub owner: String,
    pub spender: String,
    pub value: i64,
}

fn emit<T: Serialize>(stub: &mut dyn ChaincodeStub, name: &str, event: &T) -> ContractResult<()> {
    let payload = serde_json::to_vec(event)
        .map_err(|e| ContractError::EventEncoding(format!("{name}: {e}")))?;
    stub.set_event(name, payload)?;
    Ok(())
}

pub fn emit_transfer(
    stub: &mut dyn ChaincodeStub,
    from: &str,
    to: &str,
    value: i64,
) -> ContractResult<()> {
    let event = TransferEvent {
        from: from.to_string(),
        to: to.to_string(),
        value,
    };
    emit(stub, TRANSFER_EVENT, &event)
}

pub fn emit_approval(
    stub: &mut dyn ChaincodeStub,
    owner: &str,
    spender: &str,
    value: i64,
) -> ContractResult<()> {
    let event = ApprovalEvent {
        owner: owner.to_string(),
        spender: spender.to_string(),
        value,
    };
    emit(stub, APPROVAL_EVENT, &event)
}
