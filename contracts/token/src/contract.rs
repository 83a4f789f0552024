use crate::admin::{caller_account, require_minter, MINTER_ORG_MSP_ID};
use crate::allowance::{check_allowance, read_allowance, write_allowance};
use crate::balance::{read_balance, receive_balance, spend_balance, transfer_balance};
use crate::error::{parse_amount, ContractError, ContractResult};
use crate::event::{emit_approval, emit_transfer, NULL_ACCOUNT};
use crate::metadata::{
    read_decimal, read_name, read_symbol, read_total_supply, write_decimal, write_name,
    write_symbol, write_total_supply,
};
use crate::shim::Context;

/// Public surface of the token ledger.
///
/// Amounts travel as decimal strings and are parsed to `i64`. Mutating
/// operations return `true` on success; any failure leaves the world state
/// as it was before the call.
pub trait TokenTrait {
    fn set_options(
        &self,
        ctx: &mut Context<'_>,
        name: &str,
        symbol: &str,
        decimals: &str,
    ) -> ContractResult<bool>;
    fn token_name(&self, ctx: &mut Context<'_>) -> ContractResult<String>;
    fn token_symbol(&self, ctx: &mut Context<'_>) -> ContractResult<String>;
    fn decimals(&self, ctx: &mut Context<'_>) -> ContractResult<u32>;
    fn total_supply(&self, ctx: &mut Context<'_>) -> ContractResult<i64>;
    fn balance_of(&self, ctx: &mut Context<'_>, account: &str) -> ContractResult<i64>;
    fn transfer(&self, ctx: &mut Context<'_>, to: &str, amount: &str) -> ContractResult<bool>;
    fn transfer_from(
        &self,
        ctx: &mut Context<'_>,
        from: &str,
        to: &str,
        amount: &str,
    ) -> ContractResult<bool>;
    fn approve(&self, ctx: &mut Context<'_>, spender: &str, amount: &str) -> ContractResult<bool>;
    fn allowance(&self, ctx: &mut Context<'_>, owner: &str, spender: &str) -> ContractResult<i64>;
    fn mint(&self, ctx: &mut Context<'_>, amount: &str) -> ContractResult<bool>;
    fn burn(&self, ctx: &mut Context<'_>, amount: &str) -> ContractResult<bool>;
    fn client_account_id(&self, ctx: &mut Context<'_>) -> ContractResult<String>;
}

#[derive(Debug, Clone)]
pub struct Token {
    minter_msp_id: String,
}

impl Token {
    pub fn new() -> Self {
        Self::with_minter(MINTER_ORG_MSP_ID)
    }

    /// Token whose mint/burn rights belong to `minter_msp_id`.
    pub fn with_minter(minter_msp_id: impl Into<String>) -> Self {
        Self {
            minter_msp_id: minter_msp_id.into(),
        }
    }

    pub fn minter_msp_id(&self) -> &str {
        &self.minter_msp_id
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenTrait for Token {
    fn set_options(
        &self,
        ctx: &mut Context<'_>,
        name: &str,
        symbol: &str,
        decimals: &str,
    ) -> ContractResult<bool> {
        let stub = ctx.stub();
        write_name(stub, name)?;
        write_symbol(stub, symbol)?;
        write_decimal(stub, decimals)?;
        tracing::debug!(
            token_name = %name,
            symbol = %symbol,
            decimals = %decimals,
            "token options set"
        );
        Ok(true)
    }

    fn token_name(&self, ctx: &mut Context<'_>) -> ContractResult<String> {
        read_name(ctx.stub())
    }

    fn token_symbol(&self, ctx: &mut Context<'_>) -> ContractResult<String> {
        read_symbol(ctx.stub())
    }

    fn decimals(&self, ctx: &mut Context<'_>) -> ContractResult<u32> {
        read_decimal(ctx.stub())
    }

    fn total_supply(&self, ctx: &mut Context<'_>) -> ContractResult<i64> {
        read_total_supply(ctx.stub())
    }

    fn balance_of(&self, ctx: &mut Context<'_>, account: &str) -> ContractResult<i64> {
        read_balance(ctx.stub(), account)
    }

    fn transfer(&self, ctx: &mut Context<'_>, to: &str, amount: &str) -> ContractResult<bool> {
        let from = caller_account(ctx.client_identity());
        let amount = parse_amount(amount)?;
        let stub = ctx.stub();

        transfer_balance(stub, &from, to, amount)?;
        emit_transfer(stub, &from, to, amount)?;

        tracing::debug!(from = %from, to = %to, amount, "transfer");
        Ok(true)
    }

    fn transfer_from(
        &self,
        ctx: &mut Context<'_>,
        from: &str,
        to: &str,
        amount: &str,
    ) -> ContractResult<bool> {
        let spender = caller_account(ctx.client_identity());
        let amount = parse_amount(amount)?;
        if amount <= 0 {
            return Err(ContractError::invalid("invalid transfer amount"));
        }
        let stub = ctx.stub();

        let remaining = check_allowance(stub, from, &spender, amount)?;
        // Balances move first; the allowance is only touched once they have.
        transfer_balance(stub, from, to, amount)?;
        write_allowance(stub, from, &spender, remaining)?;
        emit_transfer(stub, from, to, amount)?;

        tracing::debug!(
            spender = %spender,
            from = %from,
            to = %to,
            amount,
            remaining,
            "transfer from"
        );
        Ok(true)
    }

    fn approve(&self, ctx: &mut Context<'_>, spender: &str, amount: &str) -> ContractResult<bool> {
        let owner = caller_account(ctx.client_identity());
        let amount = parse_amount(amount)?;
        if amount < 0 {
            return Err(ContractError::invalid("approve amount must be a non-negative integer"));
        }
        let stub = ctx.stub();

        let previous = read_allowance(stub, &owner, spender)?;
        write_allowance(stub, &owner, spender, amount)?;
        emit_approval(stub, &owner, spender, amount)?;

        tracing::debug!(owner = %owner, spender = %spender, previous, amount, "approve");
        Ok(true)
    }

    fn allowance(&self, ctx: &mut Context<'_>, owner: &str, spender: &str) -> ContractResult<i64> {
        read_allowance(ctx.stub(), owner, spender)
    }

    fn mint(&self, ctx: &mut Context<'_>, amount: &str) -> ContractResult<bool> {
        require_minter(ctx.client_identity(), &self.minter_msp_id)?;
        let minter = caller_account(ctx.client_identity());
        let amount = parse_amount(amount)?;
        if amount <= 0 {
            return Err(ContractError::invalid("mint amount must be a positive integer"));
        }
        let stub = ctx.stub();

        // Total supply bounds every balance, so a supply that does not
        // overflow guarantees the balance credit will not either.
        let supply = read_total_supply(stub)?;
        let new_supply = supply
            .checked_add(amount)
            .ok_or_else(|| ContractError::invalid("total supply overflow"))?;
        let balance = receive_balance(stub, &minter, amount)?;
        write_total_supply(stub, new_supply)?;
        emit_transfer(stub, NULL_ACCOUNT, &minter, amount)?;

        tracing::debug!(minter = %minter, amount, balance, total_supply = new_supply, "mint");
        Ok(true)
    }

    fn burn(&self, ctx: &mut Context<'_>, amount: &str) -> ContractResult<bool> {
        require_minter(ctx.client_identity(), &self.minter_msp_id)?;
        let minter = caller_account(ctx.client_identity());
        let amount = parse_amount(amount)?;
        if amount <= 0 {
            return Err(ContractError::invalid("burn amount must be a positive integer"));
        }
        let stub = ctx.stub();

        if read_balance(stub, &minter)? < amount {
            return Err(ContractError::InsufficientBurnBalance);
        }
        let supply = read_total_supply(stub)?;
        let new_supply = supply
            .checked_sub(amount)
            .filter(|s| *s >= 0)
            .ok_or_else(|| {
                ContractError::invalid(format!(
                    "total supply cannot become negative ({supply} - {amount})"
                ))
            })?;
        let balance = spend_balance(stub, &minter, amount, ContractError::InsufficientBurnBalance)?;
        write_total_supply(stub, new_supply)?;
        emit_transfer(stub, &minter, NULL_ACCOUNT, amount)?;

        tracing::debug!(minter = %minter, amount, balance, total_supply = new_supply, "burn");
        Ok(true)
    }

    fn client_account_id(&self, ctx: &mut Context<'_>) -> ContractResult<String> {
        Ok(caller_account(ctx.client_identity()))
    }
}
