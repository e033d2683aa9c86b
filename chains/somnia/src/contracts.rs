//! ABI fragments and the closed set of contract calls the tool submits.

use anyhow::{Context, Result};
use ethers::abi::Abi;
use ethers::contract::BaseContract;
use ethers::types::{Address, Bytes, U256};

/// Faucet token surface: mint-to-self, balances, allowances.
pub const TOKEN_ABI: &str = r#"[
    {"type":"function","name":"mint","stateMutability":"payable","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[]},
    {"type":"function","name":"balanceOf","stateMutability":"view","inputs":[{"name":"owner","type":"address"}],"outputs":[{"name":"","type":"uint256"}]},
    {"type":"function","name":"allowance","stateMutability":"view","inputs":[{"name":"owner","type":"address"},{"name":"spender","type":"address"}],"outputs":[{"name":"","type":"uint256"}]},
    {"type":"function","name":"approve","stateMutability":"nonpayable","inputs":[{"name":"spender","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}]}
]"#;

/// Single-hop exact-input router entry point.
pub const ROUTER_ABI: &str = r#"[
    {"type":"function","name":"exactInputSingle","stateMutability":"payable",
     "inputs":[{"name":"params","type":"tuple","internalType":"struct ExactInputSingleParams","components":[
        {"name":"tokenIn","type":"address","internalType":"address"},
        {"name":"tokenOut","type":"address","internalType":"address"},
        {"name":"fee","type":"uint24","internalType":"uint24"},
        {"name":"recipient","type":"address","internalType":"address"},
        {"name":"amountIn","type":"uint256","internalType":"uint256"},
        {"name":"amountOutMinimum","type":"uint256","internalType":"uint256"},
        {"name":"sqrtPriceLimitX96","type":"uint160","internalType":"uint160"}
     ]}],
     "outputs":[{"name":"amountOut","type":"uint256","internalType":"uint256"}]}
]"#;

/// Parsed token and router ABIs, shared by every encoder.
#[derive(Debug, Clone)]
pub struct Abis {
    pub token: BaseContract,
    pub router: BaseContract,
}

impl Abis {
    pub fn load() -> Result<Self> {
        let token: Abi = serde_json::from_str(TOKEN_ABI).context("Invalid token ABI")?;
        let router: Abi = serde_json::from_str(ROUTER_ABI).context("Invalid router ABI")?;
        Ok(Self {
            token: token.into(),
            router: router.into(),
        })
    }
}

/// Arguments of `exactInputSingle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    pub sqrt_price_limit_x96: U256,
}

impl SwapParams {
    /// Exact-input swap with no minimum output and no price limit.
    ///
    /// Both guards are always zero.
    pub fn exact_input(
        token_in: Address,
        token_out: Address,
        fee: u32,
        recipient: Address,
        amount_in: U256,
    ) -> Self {
        Self {
            token_in,
            token_out,
            fee,
            recipient,
            amount_in,
            amount_out_minimum: U256::zero(),
            sqrt_price_limit_x96: U256::zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Mint {
        token: Address,
        to: Address,
        amount: U256,
    },
    ExactInputSingle {
        router: Address,
        params: SwapParams,
    },
}

impl ContractCall {
    pub fn target(&self) -> Address {
        match self {
            ContractCall::Approve { token, .. } | ContractCall::Mint { token, .. } => *token,
            ContractCall::ExactInputSingle { router, .. } => *router,
        }
    }

    /// Native value attached to the call. The payable entry points are called without value.
    pub fn value(&self) -> U256 {
        U256::zero()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContractCall::Approve { .. } => "approve",
            ContractCall::Mint { .. } => "mint",
            ContractCall::ExactInputSingle { .. } => "exactInputSingle",
        }
    }

    pub fn encode(&self, abis: &Abis) -> Result<Bytes> {
        let data = match self {
            ContractCall::Approve { spender, amount, .. } => {
                abis.token.encode("approve", (*spender, *amount))?
            }
            ContractCall::Mint { to, amount, .. } => abis.token.encode("mint", (*to, *amount))?,
            ContractCall::ExactInputSingle { params, .. } => {
                let tuple = (
                    params.token_in,
                    params.token_out,
                    params.fee,
                    params.recipient,
                    params.amount_in,
                    params.amount_out_minimum,
                    params.sqrt_price_limit_x96,
                );
                // Wrapped once more so the struct is encoded as a single tuple argument
                abis.router.encode("exactInputSingle", (tuple,))?
            }
        };
        Ok(data)
    }
}
