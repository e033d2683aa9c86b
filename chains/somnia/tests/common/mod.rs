#![allow(dead_code)]

use async_trait::async_trait;
use core_logic::{LogBook, NetworkError, TransactionError};
use ethers::types::{Address, TxHash, U256};
use somnia_project::client::{ChainClient, TxHandle, TxReceipt};
use somnia_project::config::{Pacing, TokenSet};
use somnia_project::contracts::ContractCall;
use somnia_project::task::{Controllers, WorkflowContext};
use somnia_project::wallet::{WalletBoard, WalletState};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const PING: Address = Address::repeat_byte(0xa1);
pub const PONG: Address = Address::repeat_byte(0xb2);
pub const ROUTER: Address = Address::repeat_byte(0xcc);
pub const OWNER: Address = Address::repeat_byte(0x11);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Native { to: Address, amount: U256 },
    Contract(ContractCall),
}

type Hook = Arc<dyn Fn(usize) + Send + Sync>;

#[derive(Default)]
struct State {
    default_allowance: U256,
    allowances: HashMap<Address, U256>,
    native: U256,
    submitted: Vec<(TxHash, Submitted)>,
    native_queries: usize,
    confirmed_swaps: usize,
    confirmed_transfers: usize,
    fail_swaps: bool,
    fail_transfers: bool,
    fail_balance: bool,
    failing_tokens: HashSet<Address>,
    on_swap_confirmed: Option<Hook>,
    on_transfer_confirmed: Option<Hook>,
}

/// Recording [`ChainClient`] double. Every submission succeeds unless told otherwise.
pub struct MockChain {
    state: Mutex<State>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                native: U256::exp10(18),
                ..State::default()
            }),
        }
    }

    pub fn with_allowance(self, allowance: U256) -> Self {
        self.state.lock().unwrap().default_allowance = allowance;
        self
    }

    pub fn failing_swaps(self) -> Self {
        self.state.lock().unwrap().fail_swaps = true;
        self
    }

    pub fn failing_transfers(self) -> Self {
        self.state.lock().unwrap().fail_transfers = true;
        self
    }

    pub fn failing_balance(self) -> Self {
        self.state.lock().unwrap().fail_balance = true;
        self
    }

    /// Balance queries for `token` fail; other tokens still answer.
    pub fn failing_token(self, token: Address) -> Self {
        self.state.lock().unwrap().failing_tokens.insert(token);
        self
    }

    /// Called with the running count of confirmed native transfers.
    pub fn on_transfer_confirmed(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        self.state.lock().unwrap().on_transfer_confirmed = Some(Arc::new(hook));
    }

    /// Called with the running count of confirmed swaps.
    pub fn on_swap_confirmed(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        self.state.lock().unwrap().on_swap_confirmed = Some(Arc::new(hook));
    }

    pub fn submitted(&self) -> Vec<Submitted> {
        let state = self.state.lock().unwrap();
        state.submitted.iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn swaps(&self) -> usize {
        self.count(|c| matches!(c, ContractCall::ExactInputSingle { .. }))
    }

    pub fn approvals(&self) -> usize {
        self.count(|c| matches!(c, ContractCall::Approve { .. }))
    }

    pub fn mints(&self) -> Vec<ContractCall> {
        self.submitted()
            .into_iter()
            .filter_map(|s| match s {
                Submitted::Contract(c @ ContractCall::Mint { .. }) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn transfers(&self) -> Vec<(Address, U256)> {
        self.submitted()
            .into_iter()
            .filter_map(|s| match s {
                Submitted::Native { to, amount } => Some((to, amount)),
                _ => None,
            })
            .collect()
    }

    pub fn native_queries(&self) -> usize {
        self.state.lock().unwrap().native_queries
    }

    fn count(&self, pred: impl Fn(&ContractCall) -> bool) -> usize {
        self.submitted()
            .iter()
            .filter(|s| matches!(s, Submitted::Contract(c) if pred(c)))
            .count()
    }

    fn record(&self, state: &mut State, submitted: Submitted) -> TxHandle {
        let hash = TxHash::from_low_u64_be(state.submitted.len() as u64 + 1);
        state.submitted.push((hash, submitted));
        TxHandle::new(hash)
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn address(&self) -> Address {
        OWNER
    }

    async fn native_balance(&self) -> Result<U256, NetworkError> {
        let mut state = self.state.lock().unwrap();
        state.native_queries += 1;
        if state.fail_balance {
            return Err(NetworkError::Rpc {
                endpoint: "mock".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(state.native)
    }

    async fn token_balance(&self, token: Address) -> Result<U256, NetworkError> {
        if self.state.lock().unwrap().failing_tokens.contains(&token) {
            return Err(NetworkError::Rpc {
                endpoint: "mock".to_string(),
                reason: "execution reverted".to_string(),
            });
        }
        Ok(U256::from(1000u64) * U256::exp10(18))
    }

    async fn allowance(
        &self,
        token: Address,
        _owner: Address,
        _spender: Address,
    ) -> Result<U256, NetworkError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .allowances
            .get(&token)
            .copied()
            .unwrap_or(state.default_allowance))
    }

    async fn send_native(&self, to: Address, amount: U256) -> Result<TxHandle, TransactionError> {
        let mut state = self.state.lock().unwrap();
        let handle = self.record(&mut state, Submitted::Native { to, amount });
        if state.fail_transfers {
            return Err(TransactionError::Submit {
                reason: "insufficient funds".to_string(),
            });
        }
        Ok(handle)
    }

    async fn call_contract(&self, call: ContractCall) -> Result<TxHandle, TransactionError> {
        let mut state = self.state.lock().unwrap();
        if let ContractCall::Approve { token, amount, .. } = &call {
            state.allowances.insert(*token, *amount);
        }
        Ok(self.record(&mut state, Submitted::Contract(call)))
    }

    async fn wait(&self, tx: &TxHandle) -> Result<TxReceipt, TransactionError> {
        let hook = {
            let mut state = self.state.lock().unwrap();
            let submitted = state
                .submitted
                .iter()
                .find(|(hash, _)| *hash == tx.hash)
                .map(|(_, s)| s.clone());
            match submitted {
                Some(Submitted::Contract(ContractCall::ExactInputSingle { .. })) => {
                    if state.fail_swaps {
                        return Err(TransactionError::Reverted {
                            hash: format!("{:?}", tx.hash),
                        });
                    }
                    state.confirmed_swaps += 1;
                    state
                        .on_swap_confirmed
                        .clone()
                        .map(|hook| (hook, state.confirmed_swaps))
                }
                Some(Submitted::Native { .. }) => {
                    state.confirmed_transfers += 1;
                    state
                        .on_transfer_confirmed
                        .clone()
                        .map(|hook| (hook, state.confirmed_transfers))
                }
                _ => None,
            }
        };

        if let Some((hook, confirmed)) = hook {
            hook(confirmed);
        }

        Ok(TxReceipt {
            hash: tx.hash,
            block_number: Some(1),
            gas_used: Some(U256::from(21_000u64)),
        })
    }
}

/// Workflow context over `chain` with both tokens configured and no pacing.
pub fn context(chain: Arc<MockChain>, address_file: PathBuf) -> (WorkflowContext, LogBook) {
    let log = LogBook::new();
    let ctx = WorkflowContext {
        client: chain,
        wallet: WalletBoard::new(WalletState::empty("Somnia Testnet", "STT")),
        log: Arc::new(log.clone()),
        tokens: TokenSet {
            ping: Some(PING),
            pong: Some(PONG),
        },
        router: ROUTER,
        fee: 500,
        native_symbol: "STT".to_string(),
        pacing: Pacing::immediate(),
        address_file,
        controllers: Controllers::default(),
    };
    (ctx, log)
}
