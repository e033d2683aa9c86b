//! Wallet panel state and balance refresh.

use crate::client::ChainClient;
use crate::config::{Token, TokenSet};
use colored::Colorize;
use core_logic::{short_hash, LogSink, NetworkError};
use ethers::types::{Address, U256};
use ethers::utils::format_ether;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletState {
    pub address: Option<Address>,
    pub native: U256,
    pub ping: U256,
    pub pong: U256,
    pub network: String,
    pub native_symbol: String,
}

impl WalletState {
    /// No address yet, all balances zero.
    pub fn empty(network: impl Into<String>, native_symbol: impl Into<String>) -> Self {
        Self {
            address: None,
            native: U256::zero(),
            ping: U256::zero(),
            pong: U256::zero(),
            network: network.into(),
            native_symbol: native_symbol.into(),
        }
    }

    pub fn token_balance(&self, token: Token) -> U256 {
        match token {
            Token::Ping => self.ping,
            Token::Pong => self.pong,
        }
    }

    fn set_token_balance(&mut self, token: Token, value: U256) {
        match token {
            Token::Ping => self.ping = value,
            Token::Pong => self.pong = value,
        }
    }
}

impl fmt::Display for WalletState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let address = self
            .address
            .map(|a| short_hash(&format!("{:?}", a)))
            .unwrap_or_else(|| "-".to_string());

        writeln!(f, "{}", "Wallet Information".bold().cyan())?;
        writeln!(f, "  {:<8} {}", "Address", address.yellow())?;
        writeln!(
            f,
            "  {:<8} {}",
            self.native_symbol,
            format_ether(self.native).green()
        )?;
        writeln!(f, "  {:<8} {}", "Ping", format_ether(self.ping).green())?;
        writeln!(f, "  {:<8} {}", "Pong", format_ether(self.pong).green())?;
        write!(f, "  {:<8} {}", "Network", self.network.magenta())
    }
}

/// Shared, always-readable wallet state. Each publish bumps the revision.
#[derive(Debug, Clone)]
pub struct WalletBoard {
    state: Arc<RwLock<WalletState>>,
    revision: Arc<AtomicU64>,
}

impl WalletBoard {
    pub const UPDATED: &'static str = "Balances & wallet updated!";

    pub fn new(initial: WalletState) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
            revision: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn snapshot(&self) -> WalletState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn publish(&self, state: WalletState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
        self.revision.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of successful publishes so far.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Re-reads the native balance and every configured token balance.
    ///
    /// A failed token query keeps that token's previous value. A failed
    /// native query fails the whole refresh and leaves the board untouched.
    pub async fn refresh(
        &self,
        client: &dyn ChainClient,
        tokens: &TokenSet,
        log: &dyn LogSink,
    ) -> Result<WalletState, NetworkError> {
        let mut next = self.snapshot();

        let native = match client.native_balance().await {
            Ok(v) => v,
            Err(e) => {
                log.append(&format!("Failed to fetch wallet data: {}", e));
                return Err(NetworkError::BalanceQuery {
                    reason: e.to_string(),
                });
            }
        };
        next.address = Some(client.address());
        next.native = native;

        for token in [Token::Ping, Token::Pong] {
            let Some(address) = tokens.get(token) else {
                continue;
            };
            match client.token_balance(address).await {
                Ok(v) => next.set_token_balance(token, v),
                Err(e) => log.append(&format!("Failed to fetch {} balance: {}", token, e)),
            }
        }

        self.publish(next.clone());
        debug!("Wallet board at revision {}", self.revision());
        log.append(Self::UPDATED);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        let state = WalletState::empty("Somnia Testnet", "STT");
        assert!(state.address.is_none());
        assert!(state.native.is_zero());
        assert_eq!(state.token_balance(Token::Pong), U256::zero());
    }

    #[test]
    fn test_publish_bumps_revision() {
        let board = WalletBoard::new(WalletState::empty("Somnia Testnet", "STT"));
        assert_eq!(board.revision(), 0);

        let mut state = board.snapshot();
        state.ping = U256::exp10(18);
        board.publish(state);

        assert_eq!(board.revision(), 1);
        assert_eq!(board.snapshot().ping, U256::exp10(18));
    }

    #[test]
    fn test_panel_shows_short_address_and_balances() {
        colored::control::set_override(false);
        let mut state = WalletState::empty("Somnia Testnet", "STT");
        state.address = Some(Address::repeat_byte(0x11));
        state.native = U256::exp10(18);

        let panel = state.to_string();
        assert!(panel.contains("0x1111...1111"));
        assert!(panel.contains("STT"));
        assert!(panel.contains("1.000000000000000000"));
        assert!(panel.contains("Somnia Testnet"));
    }
}
