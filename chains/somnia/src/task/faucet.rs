use crate::client::TxReceipt;
use crate::config::Token;
use crate::contracts::ContractCall;
use crate::task::WorkflowContext;
use core_logic::{cancellable_sleep, CoreError, RunOutcome, RunStats};
use ethers::types::U256;

/// Whole tokens minted per claim.
pub const FAUCET_AMOUNT: u64 = 1000;

pub struct FaucetWorkflow {
    ctx: WorkflowContext,
}

impl FaucetWorkflow {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    /// `true` while a claim or an auto swap is in progress.
    pub fn is_blocked(&self) -> bool {
        self.ctx.controllers.faucet.is_running() || self.ctx.controllers.swap.is_running()
    }

    /// Mints `FAUCET_AMOUNT` of `token` to the own address.
    pub async fn claim(&self, token: Token) -> RunOutcome {
        if self.ctx.controllers.swap.is_running() {
            self.log_blocked();
            return RunOutcome::Rejected;
        }
        let Some(guard) = self.ctx.controllers.faucet.try_start() else {
            self.log_blocked();
            return RunOutcome::Rejected;
        };

        self.ctx.log(&format!("Claiming {} faucet...", token));

        let mut stats = RunStats::default();
        match self.mint(token).await {
            Ok(_) => {
                stats.success += 1;
                self.ctx.log(&format!("Claim Faucet {} succeeded!", token));
            }
            Err(e) => {
                stats.failed += 1;
                self.ctx
                    .log(&format!("Claim Faucet {} failed: {}", token, e));
                return RunOutcome::Aborted(stats);
            }
        }

        let cooled = cancellable_sleep(self.ctx.pacing.faucet_cooldown.sample(), guard.token()).await;
        self.ctx.refresh_wallet().await;

        if cooled {
            RunOutcome::Completed(stats)
        } else {
            RunOutcome::Cancelled(stats)
        }
    }

    async fn mint(&self, token: Token) -> Result<TxReceipt, CoreError> {
        let address = self.ctx.tokens.require(token)?;
        let client = self.ctx.client.as_ref();

        let tx = client
            .call_contract(ContractCall::Mint {
                token: address,
                to: client.address(),
                amount: U256::from(FAUCET_AMOUNT) * U256::exp10(18),
            })
            .await?;
        self.ctx
            .log(&format!("Transaction sent. Tx hash: {}", tx.short_hash()));

        Ok(client.wait(&tx).await?)
    }

    fn log_blocked(&self) {
        self.ctx.log(
            "A transaction is in progress. Stop it before claiming from the faucet.",
        );
    }
}
