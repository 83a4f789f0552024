use crate::error::{ContractError, ContractResult};
use crate::shim::ChaincodeStub;
use crate::storage_types::{read_amount, write_amount_or_remove, DataKey};

pub fn read_balance(stub: &mut dyn ChaincodeStub, account: &str) -> ContractResult<i64> {
    let key = DataKey::Balance(account).to_state_key(&*stub)?;
    read_amount(stub, &key)
}

fn write_balance(stub: &mut dyn ChaincodeStub, account: &str, amount: i64) -> ContractResult<()> {
    let key = DataKey::Balance(account).to_state_key(&*stub)?;
    write_amount_or_remove(stub, &key, amount)
}

/// Credit `amount` to `account`. Returns the new balance.
pub fn receive_balance(
    stub: &mut dyn ChaincodeStub,
    account: &str,
    amount: i64,
) -> ContractResult<i64> {
    let balance = read_balance(stub, account)?;
    let updated = balance
        .checked_add(amount)
        .ok_or_else(|| ContractError::invalid("balance overflow"))?;
    write_balance(stub, account, updated)?;
    Ok(updated)
}

/// Debit `amount` from `account`, failing with `insufficient` if it holds less.
pub fn spend_balance(
    stub: &mut dyn ChaincodeStub,
    account: &str,
    amount: i64,
    insufficient: ContractError,
) -> ContractResult<i64> {
    let balance = read_balance(stub, account)?;
    if balance < amount {
        return Err(insufficient);
    }
    let updated = balance - amount;
    write_balance(stub, account, updated)?;
    Ok(updated)
}

/// Move `amount` between two accounts.
///
/// Both balances are read and the new values computed before either is
/// written, so a failure leaves the ledger untouched. Moving tokens to the
/// same account validates the amount and writes nothing.
pub fn transfer_balance(
    stub: &mut dyn ChaincodeStub,
    from: &str,
    to: &str,
    amount: i64,
) -> ContractResult<()> {
    if amount <= 0 {
        return Err(ContractError::invalid("invalid transfer amount"));
    }

    let from_balance = read_balance(stub, from)?;
    if from_balance < amount {
        return Err(ContractError::InsufficientBalance);
    }
    if from == to {
        tracing::debug!(account = %from, amount, "self transfer, balance unchanged");
        return Ok(());
    }

    let to_balance = read_balance(stub, to)?;
    let new_to_balance = to_balance
        .checked_add(amount)
        .ok_or_else(|| ContractError::invalid("balance overflow"))?;
    let new_from_balance = from_balance - amount;

    write_balance(stub, from, new_from_balance)?;
    write_balance(stub, to, new_to_balance)?;

    tracing::debug!(
        from = %from,
        to = %to,
        amount,
        from_balance = new_from_balance,
        to_balance = new_to_balance,
        "balances updated"
    );
    Ok(())
}
