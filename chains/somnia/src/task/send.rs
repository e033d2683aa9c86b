use crate::client::TxReceipt;
use crate::task::{AddressPool, WorkflowContext};
use core_logic::{cancellable_sleep, short_hash, CoreError, RunOutcome, RunStats};
use ethers::types::{Address, U256};
use ethers::utils::{parse_ether, ConversionError};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AmountError {
    #[error("'{0}' is not a plain decimal amount")]
    NotDecimal(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// ASCII digits with at most one `.` and at least one digit.
fn is_plain_decimal(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
        && s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && s.bytes().filter(|&b| b == b'.').count() <= 1
}

/// Native-currency amount as the operator typed it, plus its wei value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeAmount {
    display: String,
    wei: U256,
}

impl NativeAmount {
    pub fn parse(raw: &str) -> Result<Self, AmountError> {
        let display = raw.trim().to_string();
        if !is_plain_decimal(&display) {
            return Err(AmountError::NotDecimal(display));
        }
        let wei = parse_ether(&display)?;
        Ok(Self { display, wei })
    }

    pub fn wei(&self) -> U256 {
        self.wei
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }
}

impl fmt::Display for NativeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

pub struct SendWorkflow {
    ctx: WorkflowContext,
}

impl SendWorkflow {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Sends `amount` to a random pool address, `total_sends` times.
    ///
    /// The first failed transfer ends the run.
    pub async fn run_random(&self, total_sends: u64, amount: NativeAmount) -> RunOutcome {
        let Some(guard) = self.ctx.controllers.send.try_start() else {
            self.log_busy();
            return RunOutcome::Rejected;
        };

        let pool = AddressPool::load(&self.ctx.address_file, self.ctx.log.as_ref());
        if pool.is_empty() {
            self.ctx.log("Address list is empty.");
            return RunOutcome::Aborted(RunStats::default());
        }

        self.ctx.log(&format!(
            "Starting Auto Send to random addresses for {} transfers.",
            total_sends
        ));

        let mut stats = RunStats::default();
        let mut cancelled = false;

        for i in 1..=total_sends {
            if guard.is_cancelled() {
                self.ctx.log("Auto Send cancelled.");
                cancelled = true;
                break;
            }

            let Some(target) = pool.choose() else {
                break;
            };
            self.ctx.log(&format!(
                "Auto Send: sending {} {} to {:?}",
                amount, self.ctx.native_symbol, target
            ));

            let label = format!("Auto Send {}/{}", i, total_sends);
            if let Err(e) = self.transfer(target, &amount, &label).await {
                stats.failed += 1;
                self.ctx.log(&format!("Error on Auto Send: {}", e));
                return RunOutcome::Aborted(stats);
            }
            stats.success += 1;
            self.ctx.log(&format!(
                "Auto Send {}/{} to {:?} succeeded.",
                i, total_sends, target
            ));
            self.ctx.refresh_wallet().await;

            if i < total_sends {
                let delay = self.ctx.pacing.send.sample();
                self.ctx.log(&format!(
                    "Waiting {} seconds before the next transfer...",
                    delay.as_secs()
                ));
                if !cancellable_sleep(delay, guard.token()).await {
                    self.ctx.log("Auto Send cancelled.");
                    cancelled = true;
                    break;
                }
            }
        }

        self.ctx.log("Auto Send finished.");
        if cancelled {
            RunOutcome::Cancelled(stats)
        } else {
            RunOutcome::Completed(stats)
        }
    }

    /// One transfer to an operator-chosen address.
    pub async fn send_to(&self, target: Address, amount: NativeAmount) -> RunOutcome {
        let Some(_guard) = self.ctx.controllers.send.try_start() else {
            self.log_busy();
            return RunOutcome::Rejected;
        };

        self.ctx.log(&format!(
            "Sending {} {} to {:?}",
            amount, self.ctx.native_symbol, target
        ));

        let mut stats = RunStats::default();
        if let Err(e) = self.transfer(target, &amount, "Transaction").await {
            stats.failed += 1;
            self.ctx.log(&format!("Error on Send Token: {}", e));
            return RunOutcome::Aborted(stats);
        }

        stats.success += 1;
        self.ctx.log(&format!(
            "Transfer to {} succeeded.",
            short_hash(&format!("{:?}", target))
        ));
        self.ctx.refresh_wallet().await;
        RunOutcome::Completed(stats)
    }

    async fn transfer(
        &self,
        target: Address,
        amount: &NativeAmount,
        label: &str,
    ) -> Result<TxReceipt, CoreError> {
        let client = self.ctx.client.as_ref();
        let tx = client.send_native(target, amount.wei()).await?;
        self.ctx
            .log(&format!("{} sent. Tx hash: {}", label, tx.short_hash()));
        Ok(client.wait(&tx).await?)
    }

    fn log_busy(&self) {
        self.ctx
            .log("Auto Send is already running. Stop it before starting a new one.");
    }
}
