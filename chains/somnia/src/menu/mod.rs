//! Menu commands, operator input parsing and command dispatch.
//!
//! Rendering and key handling live in [`prompt`]; everything here is plain
//! data and can be driven without a terminal.

use crate::config::Token;
use crate::task::{FaucetWorkflow, NativeAmount, SendWorkflow, SwapWorkflow, WorkflowContext};
use core_logic::RunOutcome;
use ethers::types::{Address, U256};
use ethers::utils::parse_ether;
use std::future::Future;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

pub mod prompt;

pub use self::prompt::{run, DialoguerPrompt};

/// Smallest and largest amount accepted for random sends.
pub const RANDOM_SEND_MIN: &str = "0.0001";
pub const RANDOM_SEND_MAX: &str = "0.01";

const DISABLED: &str = " (disabled)";

/// Source of operator-entered values. `None` means the operator cancelled.
pub trait ParameterSource {
    fn ask(&self, prompt: &str) -> Option<String>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Input is invalid or was cancelled.")]
    Cancelled,

    #[error("Invalid {0}.")]
    InvalidCount(&'static str),

    #[error("Amount must be a number.")]
    InvalidAmount,

    #[error("Amount must be between {min} and {max} {symbol}.")]
    OutOfRange {
        min: &'static str,
        max: &'static str,
        symbol: String,
    },

    #[error("Invalid address: '{0}'")]
    InvalidAddress(String),
}

/// Positive integer count; `what` names it in the error ("swap count").
pub fn parse_count(raw: &str, what: &'static str) -> Result<u64, InputError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(InputError::InvalidCount(what)),
    }
}

/// Any non-negative decimal amount of the native currency.
pub fn parse_amount(raw: &str) -> Result<NativeAmount, InputError> {
    NativeAmount::parse(raw).map_err(|_| InputError::InvalidAmount)
}

/// Amount for random sends, bounded to `[RANDOM_SEND_MIN, RANDOM_SEND_MAX]`.
pub fn parse_random_send_amount(raw: &str, symbol: &str) -> Result<NativeAmount, InputError> {
    let amount = parse_amount(raw)?;
    let min = parse_ether(RANDOM_SEND_MIN).unwrap_or_else(|_| U256::zero());
    let max = parse_ether(RANDOM_SEND_MAX).unwrap_or_else(|_| U256::zero());

    if amount.wei() < min || amount.wei() > max {
        return Err(InputError::OutOfRange {
            min: RANDOM_SEND_MIN,
            max: RANDOM_SEND_MAX,
            symbol: symbol.to_string(),
        });
    }
    Ok(amount)
}

pub fn parse_target(raw: &str) -> Result<Address, InputError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<Address>()
        .map_err(|_| InputError::InvalidAddress(trimmed.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainCommand {
    AutoSwap,
    ClaimFaucet,
    AutoSend,
    ClearLogs,
    Refresh,
    Exit,
}

impl MainCommand {
    pub const ALL: [MainCommand; 6] = [
        MainCommand::AutoSwap,
        MainCommand::ClaimFaucet,
        MainCommand::AutoSend,
        MainCommand::ClearLogs,
        MainCommand::Refresh,
        MainCommand::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MainCommand::AutoSwap => "Somnia Auto Swap",
            MainCommand::ClaimFaucet => "Claim Faucet",
            MainCommand::AutoSend => "Auto Send Token",
            MainCommand::ClearLogs => "Clear Transaction Logs",
            MainCommand::Refresh => "Refresh",
            MainCommand::Exit => "Exit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapCommand {
    Start,
    Stop,
    ClearLogs,
    Back,
    Exit,
}

impl SwapCommand {
    /// Entries shown for the given swap run activity. Stop only appears while active.
    pub fn entries(active: bool) -> Vec<(Self, String)> {
        let mut entries = vec![(SwapCommand::Start, with_state("Auto Swap Ping & Pong", active))];
        if active {
            entries.push((SwapCommand::Stop, "Stop Transaction".to_string()));
        }
        entries.push((SwapCommand::ClearLogs, MainCommand::ClearLogs.label().to_string()));
        entries.push((SwapCommand::Back, "Back To Main Menu".to_string()));
        entries.push((SwapCommand::Exit, MainCommand::Exit.label().to_string()));
        entries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaucetCommand {
    Claim(Token),
    Stop,
    ClearLogs,
    Back,
    Exit,
}

impl FaucetCommand {
    /// `blocked` is true while a claim or an auto swap is running.
    pub fn entries(blocked: bool) -> Vec<(Self, String)> {
        let mut entries = vec![
            (
                FaucetCommand::Claim(Token::Ping),
                with_state("Claim Faucet Ping", blocked),
            ),
            (
                FaucetCommand::Claim(Token::Pong),
                with_state("Claim Faucet Pong", blocked),
            ),
        ];
        if blocked {
            entries.push((FaucetCommand::Stop, "Stop Transaction".to_string()));
        }
        entries.push((FaucetCommand::ClearLogs, MainCommand::ClearLogs.label().to_string()));
        entries.push((FaucetCommand::Back, "Back To Main Menu".to_string()));
        entries.push((FaucetCommand::Exit, MainCommand::Exit.label().to_string()));
        entries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendCommand {
    RandomAddress,
    ChosenAddress,
    Stop,
    ClearLogs,
    Back,
    Exit,
}

impl SendCommand {
    pub fn entries(active: bool) -> Vec<(Self, String)> {
        let mut entries = vec![
            (
                SendCommand::RandomAddress,
                with_state("Auto Send Random Address", active),
            ),
            (
                SendCommand::ChosenAddress,
                with_state("Send To Chosen Address", active),
            ),
        ];
        if active {
            entries.push((SendCommand::Stop, "Stop Transaction".to_string()));
        }
        entries.push((SendCommand::ClearLogs, MainCommand::ClearLogs.label().to_string()));
        entries.push((SendCommand::Back, "Back To Main Menu".to_string()));
        entries.push((SendCommand::Exit, MainCommand::Exit.label().to_string()));
        entries
    }
}

fn with_state(label: &str, disabled: bool) -> String {
    if disabled {
        format!("{}{}", label, DISABLED)
    } else {
        label.to_string()
    }
}

/// What the menu loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Stay,
    Open(MainCommand),
    Back,
    Exit,
}

/// Dispatches menu commands onto the workflows.
///
/// Runs on a blocking thread; workflows are spawned onto `runtime` so the
/// menu stays responsive while they run.
pub struct App {
    ctx: WorkflowContext,
    runtime: Handle,
}

impl App {
    pub const NOTHING_RUNNING: &'static str = "No transaction is running.";
    pub const BUSY: &'static str = "A transaction is in progress, cannot start a new one.";
    pub const SWAP_STOP_ELSEWHERE: &'static str =
        "Auto Swap is running. Stop it from the Auto Swap menu.";

    pub fn new(ctx: WorkflowContext, runtime: Handle) -> Self {
        Self { ctx, runtime }
    }

    pub fn context(&self) -> &WorkflowContext {
        &self.ctx
    }

    pub fn wallet_panel(&self) -> String {
        self.ctx.wallet.snapshot().to_string()
    }

    pub fn swap_entries(&self) -> Vec<(SwapCommand, String)> {
        SwapCommand::entries(self.ctx.controllers.swap.is_running())
    }

    pub fn faucet_entries(&self) -> Vec<(FaucetCommand, String)> {
        FaucetCommand::entries(FaucetWorkflow::new(self.ctx.clone()).is_blocked())
    }

    pub fn send_entries(&self) -> Vec<(SendCommand, String)> {
        SendCommand::entries(self.ctx.controllers.send.is_running())
    }

    /// Main menu commands. Must not be called from inside the runtime (Refresh blocks on it).
    pub fn handle_main(&self, command: MainCommand) -> Flow {
        match command {
            MainCommand::AutoSwap | MainCommand::ClaimFaucet | MainCommand::AutoSend => {
                Flow::Open(command)
            }
            MainCommand::ClearLogs => {
                self.ctx.log.clear();
                Flow::Stay
            }
            MainCommand::Refresh => {
                let ctx = self.ctx.clone();
                self.runtime.block_on(async move {
                    ctx.refresh_wallet().await;
                });
                self.ctx.log("Refreshed");
                Flow::Stay
            }
            MainCommand::Exit => Flow::Exit,
        }
    }

    pub fn handle_swap(&self, command: SwapCommand, params: &dyn ParameterSource) -> Flow {
        match command {
            SwapCommand::Start => {
                if self.ctx.controllers.swap.is_running() {
                    self.ctx.log(Self::BUSY);
                    return Flow::Stay;
                }
                let Some(total) = self.read(params, "Number of swaps", |raw| {
                    parse_count(raw, "swap count")
                }) else {
                    return Flow::Stay;
                };
                let workflow = SwapWorkflow::new(self.ctx.clone());
                self.spawn(async move { workflow.run(total).await });
                Flow::Stay
            }
            SwapCommand::Stop => {
                if self.ctx.controllers.swap.request_stop() {
                    self.ctx.log("Stop requested for Auto Swap.");
                } else {
                    self.ctx.log(Self::NOTHING_RUNNING);
                }
                Flow::Stay
            }
            SwapCommand::ClearLogs => self.clear_logs(),
            SwapCommand::Back => Flow::Back,
            SwapCommand::Exit => Flow::Exit,
        }
    }

    pub fn handle_faucet(&self, command: FaucetCommand) -> Flow {
        match command {
            FaucetCommand::Claim(token) => {
                let workflow = FaucetWorkflow::new(self.ctx.clone());
                if workflow.is_blocked() {
                    self.ctx.log(
                        "A transaction is in progress. Stop it before claiming from the faucet.",
                    );
                    return Flow::Stay;
                }
                self.spawn(async move { workflow.claim(token).await });
                Flow::Stay
            }
            FaucetCommand::Stop => {
                let controllers = &self.ctx.controllers;
                if controllers.faucet.request_stop() {
                    self.ctx.log("Stop requested for Claim Faucet.");
                } else if controllers.swap.is_running() {
                    self.ctx.log(Self::SWAP_STOP_ELSEWHERE);
                } else {
                    self.ctx.log(Self::NOTHING_RUNNING);
                }
                Flow::Stay
            }
            FaucetCommand::ClearLogs => self.clear_logs(),
            FaucetCommand::Back => Flow::Back,
            FaucetCommand::Exit => Flow::Exit,
        }
    }

    pub fn handle_send(&self, command: SendCommand, params: &dyn ParameterSource) -> Flow {
        match command {
            SendCommand::RandomAddress => {
                if self.ctx.controllers.send.is_running() {
                    self.ctx.log(Self::BUSY);
                    return Flow::Stay;
                }
                let Some(total) = self.read(params, "Number of transfers", |raw| {
                    parse_count(raw, "transfer count")
                }) else {
                    return Flow::Stay;
                };
                let symbol = self.ctx.native_symbol.clone();
                let prompt = format!(
                    "Amount of {} to send (min {}, max {})",
                    symbol, RANDOM_SEND_MIN, RANDOM_SEND_MAX
                );
                let Some(amount) =
                    self.read(params, &prompt, |raw| parse_random_send_amount(raw, &symbol))
                else {
                    return Flow::Stay;
                };
                let workflow = SendWorkflow::new(self.ctx.clone());
                self.spawn(async move { workflow.run_random(total, amount).await });
                Flow::Stay
            }
            SendCommand::ChosenAddress => {
                if self.ctx.controllers.send.is_running() {
                    self.ctx.log(Self::BUSY);
                    return Flow::Stay;
                }
                let Some(target) = self.read(params, "Target address", parse_target) else {
                    return Flow::Stay;
                };
                let prompt = format!("Amount of {} to send", self.ctx.native_symbol);
                let Some(amount) = self.read(params, &prompt, parse_amount) else {
                    return Flow::Stay;
                };
                let workflow = SendWorkflow::new(self.ctx.clone());
                self.spawn(async move { workflow.send_to(target, amount).await });
                Flow::Stay
            }
            SendCommand::Stop => {
                if self.ctx.controllers.send.request_stop() {
                    self.ctx.log("Stop requested for Auto Send.");
                } else {
                    self.ctx.log(Self::NOTHING_RUNNING);
                }
                Flow::Stay
            }
            SendCommand::ClearLogs => self.clear_logs(),
            SendCommand::Back => Flow::Back,
            SendCommand::Exit => Flow::Exit,
        }
    }

    /// Asks once and parses. Cancellation and parse errors are logged, never retried.
    fn read<T>(
        &self,
        params: &dyn ParameterSource,
        prompt: &str,
        parse: impl Fn(&str) -> Result<T, InputError>,
    ) -> Option<T> {
        let result = params
            .ask(prompt)
            .ok_or(InputError::Cancelled)
            .and_then(|raw| parse(&raw));
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.ctx.log(&e.to_string());
                None
            }
        }
    }

    fn spawn<F>(&self, run: F) -> JoinHandle<RunOutcome>
    where
        F: Future<Output = RunOutcome> + Send + 'static,
    {
        self.runtime.spawn(async move {
            let outcome = run.await;
            debug!(
                "Workflow ended: {} after {} steps",
                outcome,
                outcome.stats().total()
            );
            outcome
        })
    }

    fn clear_logs(&self) -> Flow {
        self.ctx.log.clear();
        Flow::Stay
    }
}
