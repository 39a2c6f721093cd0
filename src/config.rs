//! Run configuration for the conformance runner.
//!
//! A fixture file describes how to run one flat program image: where to
//! load it, where execution starts, and what the harness should watch for.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid fixture file: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Address the image is copied to.
    pub load_addr: u16,

    /// Entry point. When unset, execution starts at the image's reset
    /// vector.
    pub entry: Option<u16>,

    /// Interrupt feedback register. When set, bit 1 of this byte requests
    /// an NMI and bit 0 an IRQ; the runner clears the bit and raises the
    /// line after every instruction.
    pub feedback_addr: Option<u16>,

    /// Expected trap address. When set, the runner's exit status reflects
    /// whether the program parked there.
    pub success_addr: Option<u16>,

    /// Tick budget before giving up on a trap.
    pub max_ticks: u64,

    /// Print a trace line per instruction.
    pub trace: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        // Defaults match the functional conformance image: loaded at zero,
        // entered at $0400, expected to park at $336D.
        Self {
            load_addr: 0x0000,
            entry: Some(0x0400),
            feedback_addr: None,
            success_addr: Some(0x336D),
            max_ticks: 500_000_000,
            trace: false,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
