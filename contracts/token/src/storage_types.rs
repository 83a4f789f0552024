use crate::error::{parse_stored, ContractResult};
use crate::shim::{ChaincodeStub, StubError};

pub const NAME_KEY: &str = "name";
pub const SYMBOL_KEY: &str = "symbol";
pub const DECIMALS_KEY: &str = "decimals";
pub const TOTAL_SUPPLY_KEY: &str = "totalSupply";
pub const BALANCE_PREFIX: &str = "balance";
pub const ALLOWANCE_PREFIX: &str = "allowance";

#[derive(Clone, Copy, Debug)]
pub struct AllowanceDataKey<'a> {
    pub owner: &'a str,
    pub spender: &'a str,
}

/// Every key the contract reads or writes.
#[derive(Clone, Copy, Debug)]
pub enum DataKey<'a> {
    Allowance(AllowanceDataKey<'a>),
    Balance(&'a str),
    // Metadata keys
    Name,
    Symbol,
    Decimals,
    TotalSupply,
}

impl DataKey<'_> {
    /// Render the key as stored in the world state.
    pub fn to_state_key(&self, stub: &dyn ChaincodeStub) -> Result<String, StubError> {
        let key = match self {
            DataKey::Allowance(AllowanceDataKey { owner, spender }) => stub
                .create_composite_key(ALLOWANCE_PREFIX, &[*owner, *spender])?
                .to_string(),
            DataKey::Balance(account) => stub
                .create_composite_key(BALANCE_PREFIX, &[*account])?
                .to_string(),
            DataKey::Name => NAME_KEY.to_string(),
            DataKey::Symbol => SYMBOL_KEY.to_string(),
            DataKey::Decimals => DECIMALS_KEY.to_string(),
            DataKey::TotalSupply => TOTAL_SUPPLY_KEY.to_string(),
        };
        Ok(key)
    }
}

/// Read a string value, treating an empty value as absent.
pub(crate) fn read_string(
    stub: &mut dyn ChaincodeStub,
    key: &str,
) -> ContractResult<Option<String>> {
    Ok(stub.get_string_state(key)?.filter(|v| !v.is_empty()))
}

/// Read an integer value; absent or empty means zero.
pub(crate) fn read_amount(stub: &mut dyn ChaincodeStub, key: &str) -> ContractResult<i64> {
    match read_string(stub, key)? {
        Some(value) => parse_stored(key, &value),
        None => Ok(0),
    }
}

/// Store an amount, deleting the key instead of storing zero.
pub(crate) fn write_amount_or_remove(
    stub: &mut dyn ChaincodeStub,
    key: &str,
    amount: i64,
) -> ContractResult<()> {
    if amount > 0 {
        stub.put_string_state(key, &amount.to_string())?;
    } else {
        stub.del_state(key)?;
    }
    Ok(())
}
