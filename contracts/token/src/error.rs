use thiserror::Error;

use crate::shim::StubError;

/// Broad failure classes surfaced to the caller of a contract operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    PermissionDenied,
    InsufficientFunds,
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// A required token attribute has never been set.
    #[error("Sorry ! {0} not found")]
    AttributeNotFound(&'static str),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("client is not authorized to mint/burn")]
    Unauthorized,

    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("client does not have enough tokens to burn")]
    InsufficientBurnBalance,

    #[error("spender does not have enough allowance")]
    InsufficientAllowance,

    #[error("failed to encode event: {0}")]
    EventEncoding(String),

    #[error("Stub error: {0}")]
    Stub(#[from] StubError),
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AttributeNotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Unauthorized => ErrorKind::PermissionDenied,
            Self::InsufficientBalance
            | Self::InsufficientBurnBalance
            | Self::InsufficientAllowance => ErrorKind::InsufficientFunds,
            Self::Stub(StubError::InvalidCompositeKey(_) | StubError::InvalidKey(_)) => {
                ErrorKind::InvalidArgument
            }
            Self::EventEncoding(_) | Self::Stub(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

pub type ContractResult<T> = Result<T, ContractError>;

/// Parse a decimal amount argument into a signed 64-bit integer.
pub(crate) fn parse_amount(value: &str) -> ContractResult<i64> {
    value
        .parse::<i64>()
        .map_err(|e| ContractError::invalid(format!("failed to parse amount {value:?}: {e}")))
}

/// Parse a stored decimal value. Corrupt state is reported as an internal failure.
pub(crate) fn parse_stored(key: &str, value: &str) -> ContractResult<i64> {
    value
        .parse::<i64>()
        .map_err(|_| ContractError::Stub(StubError::CorruptValue(key.to_string())))
}
