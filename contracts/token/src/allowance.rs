use crate::error::{ContractError, ContractResult};
use crate::shim::ChaincodeStub;
use crate::storage_types::{read_amount, write_amount_or_remove, AllowanceDataKey, DataKey};

fn allowance_key(stub: &dyn ChaincodeStub, owner: &str, spender: &str) -> ContractResult<String> {
    Ok(DataKey::Allowance(AllowanceDataKey { owner, spender }).to_state_key(stub)?)
}

pub fn read_allowance(
    stub: &mut dyn ChaincodeStub,
    owner: &str,
    spender: &str,
) -> ContractResult<i64> {
    let key = allowance_key(&*stub, owner, spender)?;
    read_amount(stub, &key)
}

/// Replace the allowance. A zero allowance removes the key.
pub fn write_allowance(
    stub: &mut dyn ChaincodeStub,
    owner: &str,
    spender: &str,
    amount: i64,
) -> ContractResult<()> {
    if amount < 0 {
        return Err(ContractError::invalid("allowance amount must not be negative"));
    }
    let key = allowance_key(&*stub, owner, spender)?;
    write_amount_or_remove(stub, &key, amount)
}

/// Fail unless `spender` may move at least `amount` of `owner`'s tokens.
/// Returns the allowance left over once `amount` is spent.
pub fn check_allowance(
    stub: &mut dyn ChaincodeStub,
    owner: &str,
    spender: &str,
    amount: i64,
) -> ContractResult<i64> {
    let allowance = read_allowance(stub, owner, spender)?;
    if allowance < amount {
        return Err(ContractError::InsufficientAllowance);
    }
    Ok(allowance - amount)
}
