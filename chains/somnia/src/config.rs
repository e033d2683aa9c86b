use anyhow::Result;
use config::{Config, Environment, File};
use core_logic::{ConfigError, Pause};
use ethers::types::Address;
use serde::Deserialize;
use std::fmt;

pub const DEFAULT_RPC_URL: &str = "https://dream-rpc.somnia.network";
pub const DEFAULT_ROUTER: &str = "0x6AAC14f090A35EeA150705f72D90E4CDC4a49b2C";

#[derive(Debug, Deserialize, Clone)]
pub struct SomniaConfig {
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub ping_token_address: Option<String>,
    #[serde(default)]
    pub pong_token_address: Option<String>,
    pub network_name: String,
    pub native_symbol: String,
    pub router_address: String,
    pub swap_fee_tier: u32,
    pub address_file: String,
    #[serde(default)]
    pub chain_id: Option<u64>,
    pub rpc_timeout_secs: u64,
    pub receipt_poll_ms: u64,
    pub receipt_retries: usize,
    pub swap_delay_min_ms: u64,
    pub swap_delay_max_ms: u64,
    pub send_delay_min_ms: u64,
    pub send_delay_max_ms: u64,
    pub faucet_cooldown_ms: u64,
}

impl SomniaConfig {
    /// Loads `path` (optional TOML) with environment variables layered on top.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Self::defaults()?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::default())
            .build()?;

        let config: Self = settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults only, ignoring files and environment.
    pub fn from_defaults() -> Result<Self> {
        let config: Self = Self::defaults()?
            .build()?
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("rpc_url", DEFAULT_RPC_URL)?
            .set_default("network_name", "Somnia Testnet")?
            .set_default("native_symbol", "STT")?
            .set_default("router_address", DEFAULT_ROUTER)?
            .set_default("swap_fee_tier", 500)?
            .set_default("address_file", "randomaddress.txt")?
            .set_default("rpc_timeout_secs", 30)?
            .set_default("receipt_poll_ms", 1000)?
            .set_default("receipt_retries", 10)?
            .set_default("swap_delay_min_ms", 20_000)?
            .set_default("swap_delay_max_ms", 50_000)?
            .set_default("send_delay_min_ms", 5_000)?
            .set_default("send_delay_max_ms", 10_000)?
            .set_default("faucet_cooldown_ms", 5_000)?)
    }

    /// Checks every address and range up front so a bad value halts startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.router()?;
        self.tokens()?;
        if self.swap_delay_min_ms > self.swap_delay_max_ms {
            return Err(ConfigError::invalid(
                "SWAP_DELAY_MIN_MS",
                "must not exceed SWAP_DELAY_MAX_MS",
            ));
        }
        if self.send_delay_min_ms > self.send_delay_max_ms {
            return Err(ConfigError::invalid(
                "SEND_DELAY_MIN_MS",
                "must not exceed SEND_DELAY_MAX_MS",
            ));
        }
        Ok(())
    }

    pub fn router(&self) -> Result<Address, ConfigError> {
        parse_address("ROUTER_ADDRESS", &self.router_address)
    }

    pub fn tokens(&self) -> Result<TokenSet, ConfigError> {
        Ok(TokenSet {
            ping: parse_optional_address("PING_TOKEN_ADDRESS", self.ping_token_address.as_deref())?,
            pong: parse_optional_address("PONG_TOKEN_ADDRESS", self.pong_token_address.as_deref())?,
        })
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            swap: Pause::new(self.swap_delay_min_ms, self.swap_delay_max_ms),
            send: Pause::new(self.send_delay_min_ms, self.send_delay_max_ms),
            faucet_cooldown: Pause::fixed(self.faucet_cooldown_ms),
        }
    }
}

fn parse_address(field: &str, raw: &str) -> Result<Address, ConfigError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| ConfigError::invalid(field, format!("'{}' is not an address: {}", raw, e)))
}

fn parse_optional_address(field: &str, raw: Option<&str>) -> Result<Option<Address>, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_address(field, value).map(Some),
    }
}

/// The two faucet tokens traded against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Ping,
    Pong,
}

impl Token {
    pub fn other(self) -> Self {
        match self {
            Token::Ping => Token::Pong,
            Token::Pong => Token::Ping,
        }
    }

    pub fn env_key(self) -> &'static str {
        match self {
            Token::Ping => "PING_TOKEN_ADDRESS",
            Token::Pong => "PONG_TOKEN_ADDRESS",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ping => write!(f, "Ping"),
            Token::Pong => write!(f, "Pong"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenSet {
    pub ping: Option<Address>,
    pub pong: Option<Address>,
}

impl TokenSet {
    pub fn get(&self, token: Token) -> Option<Address> {
        match token {
            Token::Ping => self.ping,
            Token::Pong => self.pong,
        }
    }

    pub fn require(&self, token: Token) -> Result<Address, ConfigError> {
        self.get(token)
            .ok_or_else(|| ConfigError::missing(token.env_key()))
    }
}

/// Delays between consecutive steps of each workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub swap: Pause,
    pub send: Pause,
    pub faucet_cooldown: Pause,
}

impl Pacing {
    /// No waiting at all; used by tests and dry runs.
    pub const fn immediate() -> Self {
        Self {
            swap: Pause::fixed(0),
            send: Pause::fixed(0),
            faucet_cooldown: Pause::fixed(0),
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            swap: Pause::new(20_000, 50_000),
            send: Pause::new(5_000, 10_000),
            faucet_cooldown: Pause::fixed(5_000),
        }
    }
}
