use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use erc20_token_contract::shim::{ClientIdentity, Context, X509Identity};
use erc20_token_contract::{ContractError, ContractResult, Token, TokenTrait};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use utoipa::ToSchema;

use crate::world_state::{CommitError, Version, WorldState};

#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function} expects {expected} argument(s), got {got}")]
    Arity {
        function: &'static str,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// Contract functions reachable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    SetOptions,
    TokenName,
    TokenSymbol,
    Decimals,
    TotalSupply,
    BalanceOf,
    Transfer,
    TransferFrom,
    Approve,
    Allowance,
    Mint,
    Burn,
    ClientAccountId,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "setOptions" => Self::SetOptions,
            "tokenName" => Self::TokenName,
            "tokenSymbol" => Self::TokenSymbol,
            "decimals" => Self::Decimals,
            "totalSupply" => Self::TotalSupply,
            "balanceOf" => Self::BalanceOf,
            "transfer" => Self::Transfer,
            "transferFrom" => Self::TransferFrom,
            "approve" => Self::Approve,
            "allowance" => Self::Allowance,
            "mint" => Self::Mint,
            "burn" => Self::Burn,
            "getClientAccountID" | "clientAccountID" => Self::ClientAccountId,
            _ => return None,
        };
        Some(function)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SetOptions => "setOptions",
            Self::TokenName => "tokenName",
            Self::TokenSymbol => "tokenSymbol",
            Self::Decimals => "decimals",
            Self::TotalSupply => "totalSupply",
            Self::BalanceOf => "balanceOf",
            Self::Transfer => "transfer",
            Self::TransferFrom => "transferFrom",
            Self::Approve => "approve",
            Self::Allowance => "allowance",
            Self::Mint => "mint",
            Self::Burn => "burn",
            Self::ClientAccountId => "getClientAccountID",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Self::TokenName
            | Self::TokenSymbol
            | Self::Decimals
            | Self::TotalSupply
            | Self::ClientAccountId => 0,
            Self::BalanceOf | Self::Mint | Self::Burn => 1,
            Self::Transfer | Self::Approve | Self::Allowance => 2,
            Self::SetOptions | Self::TransferFrom => 3,
        }
    }

    /// Queries are evaluated but never committed.
    pub fn is_query(self) -> bool {
        matches!(
            self,
            Self::TokenName
                | Self::TokenSymbol
                | Self::Decimals
                | Self::TotalSupply
                | Self::BalanceOf
                | Self::Allowance
                | Self::ClientAccountId
        )
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventRecord {
    #[schema(example = "Transfer")]
    pub name: String,
    /// Decoded JSON payload, or the raw payload as a string if it is not JSON.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TxReceipt {
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")]
    pub tx_id: String,
    #[schema(example = "transfer")]
    pub function: String,
    /// String-encoded return value.
    #[schema(example = "true")]
    pub payload: String,
    pub committed: bool,
    /// Ledger height after the transaction.
    #[schema(value_type = u64)]
    pub block_height: Version,
    pub event: Option<EventRecord>,
}

/// Runs contract transactions against a shared world state.
pub struct LedgerHost {
    state: Arc<WorldState>,
    token: Token,
    sequence: AtomicU64,
}

impl LedgerHost {
    pub fn new(token: Token) -> Self {
        Self::with_state(Arc::new(WorldState::new()), token)
    }

    pub fn with_state(state: Arc<WorldState>, token: Token) -> Self {
        Self {
            state,
            token,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> &Arc<WorldState> {
        &self.state
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Simulate `function` as `identity` and commit the result if it mutates state.
    pub fn invoke(
        &self,
        identity: &X509Identity,
        function: &str,
        args: &[String],
    ) -> Result<TxReceipt, InvokeError> {
        let function = Function::from_name(function)
            .ok_or_else(|| InvokeError::UnknownFunction(function.to_string()))?;
        if args.len() != function.arity() {
            return Err(InvokeError::Arity {
                function: function.name(),
                expected: function.arity(),
                got: args.len(),
            });
        }
        let tx_id = self.next_tx_id(identity);

        let mut simulator = self.state.simulator();
        let result = {
            let mut ctx = Context::new(&mut simulator, identity);
            self.dispatch(&mut ctx, function, args)
        };
        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    tx_id = %tx_id,
                    function = function.name(),
                    error = %e,
                    "transaction rejected"
                );
                return Err(e.into());
            }
        };
        let (rwset, event) = simulator.into_parts();

        let (committed, block_height) = if function.is_query() {
            (false, self.state.height())
        } else {
            if let Some(key) = rwset.blind_writes().next() {
                tracing::warn!(tx_id = %tx_id, key = ?key, "blind write");
            }
            let height = self.state.commit(&rwset).map_err(|e| {
                tracing::warn!(
                    tx_id = %tx_id,
                    function = function.name(),
                    error = %e,
                    "commit failed"
                );
                e
            })?;
            tracing::info!(
                tx_id = %tx_id,
                function = function.name(),
                client = %identity.id(),
                height,
                "transaction committed"
            );
            (true, height)
        };

        let event = event.map(|event| EventRecord {
            payload: serde_json::from_slice(&event.payload).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&event.payload).into_owned())
            }),
            name: event.name,
        });

        Ok(TxReceipt {
            tx_id,
            function: function.name().to_string(),
            payload,
            committed,
            block_height,
            event,
        })
    }

    fn dispatch(
        &self,
        ctx: &mut Context<'_>,
        function: Function,
        args: &[String],
    ) -> ContractResult<String> {
        let token = &self.token;
        let payload = match function {
            Function::SetOptions => token
                .set_options(ctx, &args[0], &args[1], &args[2])?
                .to_string(),
            Function::TokenName => token.token_name(ctx)?,
            Function::TokenSymbol => token.token_symbol(ctx)?,
            Function::Decimals => token.decimals(ctx)?.to_string(),
            Function::TotalSupply => token.total_supply(ctx)?.to_string(),
            Function::BalanceOf => token.balance_of(ctx, &args[0])?.to_string(),
            Function::Transfer => token.transfer(ctx, &args[0], &args[1])?.to_string(),
            Function::TransferFrom => token
                .transfer_from(ctx, &args[0], &args[1], &args[2])?
                .to_string(),
            Function::Approve => token.approve(ctx, &args[0], &args[1])?.to_string(),
            Function::Allowance => token.allowance(ctx, &args[0], &args[1])?.to_string(),
            Function::Mint => token.mint(ctx, &args[0])?.to_string(),
            Function::Burn => token.burn(ctx, &args[0])?.to_string(),
            Function::ClientAccountId => token.client_account_id(ctx)?,
        };
        Ok(payload)
    }

    /// Hex SHA-256 over the creator id and a host-local sequence number.
    fn next_tx_id(&self, identity: &X509Identity) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let mut hasher = Sha256::new();
        hasher.update(identity.id().as_bytes());
        hasher.update(sequence.to_be_bytes());
        hex::encode(hasher.finalize())
    }
}
