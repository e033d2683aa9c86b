//! Router allowance checks ahead of each swap.

use crate::client::{ChainClient, TxHandle};
use crate::contracts::ContractCall;
use core_logic::{short_hash, CoreError, LogSink};
use ethers::types::{Address, U256};
use ethers::utils::format_ether;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStatus {
    AlreadySufficient,
    Approved(TxHandle),
}

/// Makes sure `spender` may pull at least `required` of `token` from `owner`.
///
/// Below the requirement, the spender is approved for `U256::MAX` and the
/// approval is awaited before returning.
pub async fn ensure_allowance(
    client: &dyn ChainClient,
    log: &dyn LogSink,
    token: Address,
    owner: Address,
    spender: Address,
    required: U256,
) -> Result<ApprovalStatus, CoreError> {
    let current = client.allowance(token, owner, spender).await?;
    if current >= required {
        log.append("Token already approved.");
        return Ok(ApprovalStatus::AlreadySufficient);
    }

    log.append(&format!(
        "Approval needed for token {} (allowance {})",
        short_hash(&format!("{:?}", token)),
        format_ether(current)
    ));

    let tx = client
        .call_contract(ContractCall::Approve {
            token,
            spender,
            amount: U256::MAX,
        })
        .await?;
    log.append(&format!("Approval sent. Tx hash: {}", tx.short_hash()));

    client.wait(&tx).await?;
    log.append("Approval succeeded.");

    Ok(ApprovalStatus::Approved(tx))
}
