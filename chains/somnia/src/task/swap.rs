use crate::approval::ensure_allowance;
use crate::client::TxReceipt;
use crate::config::Token;
use crate::contracts::{ContractCall, SwapParams};
use crate::task::WorkflowContext;
use core_logic::{cancellable_sleep, CoreError, RunOutcome, RunStats};
use ethers::types::{Address, U256};
use rand::Rng;
use tracing::debug;

/// Smallest and largest swap size, in whole tokens.
pub const SWAP_AMOUNT_RANGE: (u64, u64) = (100, 500);

/// Uniform amount in `SWAP_AMOUNT_RANGE` whole tokens, scaled to 18 decimals.
pub fn random_swap_amount() -> U256 {
    let whole = rand::thread_rng().gen_range(SWAP_AMOUNT_RANGE.0..=SWAP_AMOUNT_RANGE.1);
    U256::from(whole) * U256::exp10(18)
}

/// Ping -> Pong or Pong -> Ping with equal probability.
pub fn random_direction() -> (Token, Token) {
    let token_in = if rand::random::<bool>() {
        Token::Ping
    } else {
        Token::Pong
    };
    (token_in, token_in.other())
}

pub struct SwapWorkflow {
    ctx: WorkflowContext,
}

impl SwapWorkflow {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Runs `total_swaps` paced Ping/Pong swaps until done or stopped.
    pub async fn run(&self, total_swaps: u64) -> RunOutcome {
        let Some(guard) = self.ctx.controllers.swap.try_start() else {
            self.ctx
                .log("Auto Swap is already running. Stop it before starting a new one.");
            return RunOutcome::Rejected;
        };

        let tokens = &self.ctx.tokens;
        if let Err(e) = tokens.require(Token::Ping).and(tokens.require(Token::Pong)) {
            self.ctx.log(&format!("Error on Auto Swap: {}", e));
            return RunOutcome::Aborted(RunStats::default());
        }

        self.ctx
            .log(&format!("Starting Auto Swap for {} swaps.", total_swaps));

        let mut stats = RunStats::default();
        let mut cancelled = false;

        for i in 1..=total_swaps {
            if guard.is_cancelled() {
                self.ctx.log("Auto Swap cancelled.");
                cancelled = true;
                break;
            }

            let (token_in, token_out) = random_direction();
            let amount = random_swap_amount();
            self.ctx.log(&format!(
                "Swap {}: swapping {} {} -> {}",
                i,
                amount / U256::exp10(18),
                token_in,
                token_out
            ));

            match self.swap_once(i, token_in, token_out, amount).await {
                Ok(receipt) => {
                    stats.success += 1;
                    debug!("Swap {} mined in block {:?}", i, receipt.block_number);
                    self.ctx.log(&format!("Swap {} succeeded.", i));
                    self.ctx.refresh_wallet().await;
                }
                Err(e) => {
                    stats.failed += 1;
                    self.ctx.log(&format!("Swap {} failed: {}", i, e));
                }
            }

            if i < total_swaps {
                let delay = self.ctx.pacing.swap.sample();
                self.ctx.log(&format!(
                    "Waiting {} seconds before the next swap...",
                    delay.as_secs()
                ));
                if !cancellable_sleep(delay, guard.token()).await {
                    self.ctx.log("Auto Swap cancelled.");
                    cancelled = true;
                    break;
                }
            }
        }

        self.ctx.log("Auto Swap finished.");
        if cancelled {
            RunOutcome::Cancelled(stats)
        } else {
            RunOutcome::Completed(stats)
        }
    }

    async fn swap_once(
        &self,
        i: u64,
        token_in: Token,
        token_out: Token,
        amount: U256,
    ) -> Result<TxReceipt, CoreError> {
        let client = self.ctx.client.as_ref();
        let owner = client.address();
        let token_in: Address = self.ctx.tokens.require(token_in)?;
        let token_out: Address = self.ctx.tokens.require(token_out)?;

        ensure_allowance(
            client,
            self.ctx.log.as_ref(),
            token_in,
            owner,
            self.ctx.router,
            amount,
        )
        .await?;

        let params = SwapParams::exact_input(token_in, token_out, self.ctx.fee, owner, amount);
        let tx = client
            .call_contract(ContractCall::ExactInputSingle {
                router: self.ctx.router,
                params,
            })
            .await?;
        self.ctx
            .log(&format!("Swap {} sent. Tx hash: {}", i, tx.short_hash()));

        Ok(client.wait(&tx).await?)
    }
}
