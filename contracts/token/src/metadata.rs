use crate::error::{ContractError, ContractResult};
use crate::shim::ChaincodeStub;
use crate::storage_types::{read_amount, read_string, DataKey};

fn read_attribute(
    stub: &mut dyn ChaincodeStub,
    key: DataKey<'_>,
    label: &'static str,
) -> ContractResult<String> {
    let key = key.to_state_key(&*stub)?;
    read_string(stub, &key)?.ok_or(ContractError::AttributeNotFound(label))
}

fn write_attribute(
    stub: &mut dyn ChaincodeStub,
    key: DataKey<'_>,
    value: &str,
) -> ContractResult<()> {
    let key = key.to_state_key(&*stub)?;
    // Read first so concurrent overwrites conflict at commit.
    let previous = read_string(stub, &key)?;
    stub.put_string_state(&key, value)?;
    tracing::trace!(key = %key, ?previous, "attribute written");
    Ok(())
}

pub fn read_name(stub: &mut dyn ChaincodeStub) -> ContractResult<String> {
    read_attribute(stub, DataKey::Name, "Token name")
}

pub fn write_name(stub: &mut dyn ChaincodeStub, name: &str) -> ContractResult<()> {
    write_attribute(stub, DataKey::Name, name)
}

pub fn read_symbol(stub: &mut dyn ChaincodeStub) -> ContractResult<String> {
    read_attribute(stub, DataKey::Symbol, "Token symbol")
}

pub fn write_symbol(stub: &mut dyn ChaincodeStub, symbol: &str) -> ContractResult<()> {
    write_attribute(stub, DataKey::Symbol, symbol)
}

pub fn read_decimal(stub: &mut dyn ChaincodeStub) -> ContractResult<u32> {
    let raw = read_attribute(stub, DataKey::Decimals, "Decimal")?;
    raw.parse::<u32>().map_err(|e| {
        ContractError::invalid(format!("stored decimals {raw:?} is not a number: {e}"))
    })
}

/// Stored verbatim. Validation happens when the value is read back.
pub fn write_decimal(stub: &mut dyn ChaincodeStub, decimals: &str) -> ContractResult<()> {
    write_attribute(stub, DataKey::Decimals, decimals)
}

/// Zero until the first mint.
pub fn read_total_supply(stub: &mut dyn ChaincodeStub) -> ContractResult<i64> {
    let key = DataKey::TotalSupply.to_state_key(&*stub)?;
    read_amount(stub, &key)
}

pub fn write_total_supply(stub: &mut dyn ChaincodeStub, supply: i64) -> ContractResult<()> {
    if supply < 0 {
        return Err(ContractError::invalid(format!(
            "total supply cannot become negative ({supply})"
        )));
    }
    let key = DataKey::TotalSupply.to_state_key(&*stub)?;
    stub.put_string_state(&key, &supply.to_string())?;
    Ok(())
}
