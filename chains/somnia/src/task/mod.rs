use crate::client::ChainClient;
use crate::config::{Pacing, SomniaConfig, TokenSet};
use crate::wallet::WalletBoard;
use core_logic::{ConfigError, LogSink, RunController};
use ethers::types::Address;
use std::path::PathBuf;
use std::sync::Arc;

pub mod address_pool;
pub mod faucet;
pub mod send;
pub mod swap;

pub use self::address_pool::AddressPool;
pub use self::faucet::FaucetWorkflow;
pub use self::send::{AmountError, NativeAmount, SendWorkflow};
pub use self::swap::SwapWorkflow;

pub use core_logic::{RunOutcome, RunStats};

/// One controller per workflow kind.
#[derive(Debug, Clone)]
pub struct Controllers {
    pub swap: RunController,
    pub faucet: RunController,
    pub send: RunController,
}

impl Default for Controllers {
    fn default() -> Self {
        Self {
            swap: RunController::new("swap"),
            faucet: RunController::new("faucet"),
            send: RunController::new("send"),
        }
    }
}

/// Everything a workflow needs, cloned into each spawned run.
#[derive(Clone)]
pub struct WorkflowContext {
    pub client: Arc<dyn ChainClient>,
    pub wallet: WalletBoard,
    pub log: Arc<dyn LogSink>,
    pub tokens: TokenSet,
    pub router: Address,
    pub fee: u32,
    pub native_symbol: String,
    pub pacing: Pacing,
    pub address_file: PathBuf,
    pub controllers: Controllers,
}

impl WorkflowContext {
    pub fn from_config(
        config: &SomniaConfig,
        client: Arc<dyn ChainClient>,
        wallet: WalletBoard,
        log: Arc<dyn LogSink>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            wallet,
            log,
            tokens: config.tokens()?,
            router: config.router()?,
            fee: config.swap_fee_tier,
            native_symbol: config.native_symbol.clone(),
            pacing: config.pacing(),
            address_file: PathBuf::from(&config.address_file),
            controllers: Controllers::default(),
        })
    }

    pub fn log(&self, message: &str) {
        self.log.append(message);
    }

    /// Refreshes the wallet board. Failures are already logged by the board.
    pub async fn refresh_wallet(&self) -> bool {
        self.wallet
            .refresh(self.client.as_ref(), &self.tokens, self.log.as_ref())
            .await
            .is_ok()
    }
}
