//! Chain access: RPC connectivity, the signing key, balance/allowance reads
//! and transaction submission.

use crate::config::SomniaConfig;
use crate::contracts::{Abis, ContractCall};
use async_trait::async_trait;
use core_logic::{short_hash, ConfigError, CoreError, NetworkError, TransactionError, WalletError};
use ethers::prelude::*;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use zeroize::Zeroizing;

pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// A submitted transaction. Outcome is known only after [`ChainClient::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHandle {
    pub hash: TxHash,
}

impl TxHandle {
    pub fn new(hash: TxHash) -> Self {
        Self { hash }
    }

    pub fn short_hash(&self) -> String {
        short_hash(&format!("{:?}", self.hash))
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.hash)
    }
}

/// Confirmed, successful transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the signing key.
    fn address(&self) -> Address;

    async fn native_balance(&self) -> Result<U256, NetworkError>;

    async fn token_balance(&self, token: Address) -> Result<U256, NetworkError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, NetworkError>;

    /// Plain native-currency transfer.
    async fn send_native(&self, to: Address, amount: U256) -> Result<TxHandle, TransactionError>;

    async fn call_contract(&self, call: ContractCall) -> Result<TxHandle, TransactionError>;

    /// Suspends until the transaction is mined. Fails if it reverted or never showed up.
    async fn wait(&self, tx: &TxHandle) -> Result<TxReceipt, TransactionError>;
}

/// Accepts a key with or without `0x`, returns it `0x`-prefixed.
pub fn normalize_private_key(raw: &str) -> Result<Zeroizing<String>, WalletError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if body.len() != 64 {
        return Err(WalletError::InvalidKeyLength { length: body.len() });
    }
    if hex::decode(body).is_err() {
        return Err(WalletError::InvalidKeyFormat);
    }

    Ok(Zeroizing::new(format!("0x{}", body)))
}

/// [`ChainClient`] backed by an ethers HTTP provider and a local signer.
pub struct EvmChainClient {
    client: Arc<SignerClient>,
    abis: Abis,
    endpoint: String,
    poll_interval: Duration,
    receipt_retries: usize,
}

impl EvmChainClient {
    /// Binds the configured signing key to the configured RPC endpoint.
    pub async fn connect(config: &SomniaConfig) -> Result<Self, CoreError> {
        let rpc_url = config
            .rpc_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::missing("RPC_URL"))?;
        let url = reqwest::Url::parse(rpc_url).map_err(|_| ConfigError::InvalidRpcUrl {
            url: rpc_url.to_string(),
        })?;

        let raw_key = config
            .private_key
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::missing("PRIVATE_KEY"))?;
        let key = normalize_private_key(raw_key)?;
        let wallet = key
            .parse::<LocalWallet>()
            .map_err(|_| WalletError::InvalidKeyFormat)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.rpc_timeout_secs))
            .build()
            .map_err(|e| NetworkError::Rpc {
                endpoint: rpc_url.to_string(),
                reason: e.to_string(),
            })?;
        let provider = Provider::new(Http::new_with_client(url, http))
            .interval(Duration::from_millis(config.receipt_poll_ms));

        let chain_id = match config.chain_id {
            Some(id) => id,
            None => provider
                .get_chainid()
                .await
                .map_err(|e| NetworkError::Rpc {
                    endpoint: rpc_url.to_string(),
                    reason: e.to_string(),
                })?
                .as_u64(),
        };
        debug!("Connected to {} (chain id {})", rpc_url, chain_id);

        let client = SignerMiddleware::new(provider, wallet.with_chain_id(chain_id));

        Ok(Self {
            client: Arc::new(client),
            abis: Abis::load().map_err(|e| ConfigError::invalid("ABI", e.to_string()))?,
            endpoint: rpc_url.to_string(),
            poll_interval: Duration::from_millis(config.receipt_poll_ms),
            receipt_retries: config.receipt_retries,
        })
    }

    fn rpc_error(&self, e: impl fmt::Display) -> NetworkError {
        NetworkError::Rpc {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        }
    }

    fn token_contract(&self, token: Address) -> Contract<SignerClient> {
        Contract::new(token, self.abis.token.clone(), self.client.clone())
    }

    async fn submit(&self, tx: TransactionRequest) -> Result<TxHandle, TransactionError> {
        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| TransactionError::Submit {
                reason: e.to_string(),
            })?;
        Ok(TxHandle::new(pending.tx_hash()))
    }
}

#[async_trait]
impl ChainClient for EvmChainClient {
    fn address(&self) -> Address {
        self.client.address()
    }

    async fn native_balance(&self) -> Result<U256, NetworkError> {
        self.client
            .get_balance(self.address(), None)
            .await
            .map_err(|e| self.rpc_error(e))
    }

    async fn token_balance(&self, token: Address) -> Result<U256, NetworkError> {
        self.token_contract(token)
            .method::<_, U256>("balanceOf", self.address())
            .map_err(|e| self.rpc_error(e))?
            .call()
            .await
            .map_err(|e| self.rpc_error(e))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, NetworkError> {
        self.token_contract(token)
            .method::<_, U256>("allowance", (owner, spender))
            .map_err(|e| self.rpc_error(e))?
            .call()
            .await
            .map_err(|e| self.rpc_error(e))
    }

    async fn send_native(&self, to: Address, amount: U256) -> Result<TxHandle, TransactionError> {
        let tx = TransactionRequest::new()
            .from(self.address())
            .to(to)
            .value(amount);
        self.submit(tx).await
    }

    async fn call_contract(&self, call: ContractCall) -> Result<TxHandle, TransactionError> {
        let data = call
            .encode(&self.abis)
            .map_err(|e| TransactionError::Submit {
                reason: format!("{:#}", e),
            })?;
        debug!("Submitting {} to {:?}", call.name(), call.target());

        let tx = TransactionRequest::new()
            .from(self.address())
            .to(call.target())
            .data(data)
            .value(call.value());
        self.submit(tx).await
    }

    async fn wait(&self, tx: &TxHandle) -> Result<TxReceipt, TransactionError> {
        let hash = format!("{:?}", tx.hash);
        let receipt = PendingTransaction::new(tx.hash, self.client.provider())
            .interval(self.poll_interval)
            .retries(self.receipt_retries)
            .confirmations(1)
            .await
            .map_err(|e| TransactionError::Receipt {
                hash: hash.clone(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| TransactionError::Timeout { hash: hash.clone() })?;

        if receipt.status != Some(U64::from(1)) {
            return Err(TransactionError::Reverted { hash });
        }

        Ok(TxReceipt {
            hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
            gas_used: receipt.gas_used,
        })
    }
}
