use crate::error::{ContractError, ContractResult};
use crate::shim::ClientIdentity;

/// Organization whose members may mint and burn.
pub const MINTER_ORG_MSP_ID: &str = "Org1MSP";

/// Check that the caller belongs to the minting organization.
pub fn require_minter(identity: &dyn ClientIdentity, minter_msp_id: &str) -> ContractResult<()> {
    if identity.msp_id() != minter_msp_id {
        tracing::warn!(
            msp_id = %identity.msp_id(),
            minter = %minter_msp_id,
            "mint/burn rejected"
        );
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

/// The account acting in operations that take no explicit owner.
pub fn caller_account(identity: &dyn ClientIdentity) -> String {
    identity.id()
}
