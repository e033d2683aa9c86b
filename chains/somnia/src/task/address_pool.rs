//! Recipient addresses for the random-send workflow.
//!
//! The pool is re-read from disk on every random-send run so edits to the
//! file take effect without a restart.

use core_logic::LogSink;
use ethers::types::Address;
use rand::seq::SliceRandom;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPool {
    addresses: Vec<Address>,
}

impl AddressPool {
    /// Reads `path`. A missing or unreadable file yields an empty pool and one log line.
    pub fn load(path: &Path, log: &dyn LogSink) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, &path.display().to_string(), log),
            Err(e) => {
                log.append(&format!(
                    "Failed to read address file {}: {}",
                    path.display(),
                    e
                ));
                Self::default()
            }
        }
    }

    /// One address per line; blank lines are ignored, invalid lines skipped with a warning.
    pub fn parse(content: &str, source: &str, log: &dyn LogSink) -> Self {
        let addresses = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(i, line)| {
                let trimmed = line.trim();
                match trimmed.parse::<Address>() {
                    Ok(addr) => Some(addr),
                    Err(e) => {
                        warn!("Invalid address at line {} in {}: {}", i + 1, source, e);
                        log.append(&format!(
                            "Skipping invalid address at line {}: '{}'",
                            i + 1,
                            trimmed
                        ));
                        None
                    }
                }
            })
            .collect();

        Self { addresses }
    }

    /// Uniform pick, with replacement across calls.
    pub fn choose(&self) -> Option<Address> {
        self.addresses.choose(&mut rand::thread_rng()).copied()
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
