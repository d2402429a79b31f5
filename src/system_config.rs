//! # JSON Configuration
//!
//! Simulation settings and memory images are plain JSON documents.
//!
//! ## Simulation settings
//!
//! ```json
//! {
//!   "gate_reaction": "deferred",
//!   "clock_hz": 10.0
//! }
//! ```
//!
//! Both keys are optional. `gate_reaction` selects how pure gates react to
//! input changes (`immediate` by default); every other component always
//! reacts through the agenda.
//!
//! ## Memory images
//!
//! ```json
//! {
//!   "addr_bits": 4,
//!   "data_bits": 8,
//!   "origin": 0,
//!   "words": [177, 1, 224, 0]
//! }
//! ```
//!
//! A programming tool loads an image and writes it through the memory's
//! `store` side channel:
//!
//! ```rust
//! use rusty_logic::components::memory::rom::Memory;
//! use rusty_logic::system_config::MemoryImage;
//! use rusty_logic::Circuit;
//!
//! let image = MemoryImage::from_json_str(
//!     r#"{"addr_bits": 4, "data_bits": 8, "words": [1, 2, 3]}"#,
//! ).expect("valid image");
//! let mut circuit = Circuit::new();
//! let rom = circuit.add(Memory::new(4, 8)).unwrap();
//! rom.program(&mut circuit, &image).unwrap();
//! assert_eq!(rom.load(&circuit, 2).unwrap(), 3);
//! ```

use crate::component::Reaction;
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_clock_hz() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub gate_reaction: Reaction,
    #[serde(default = "default_clock_hz")]
    pub clock_hz: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            gate_reaction: Reaction::Immediate,
            clock_hz: default_clock_hz(),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        SimConfig::from_json_str(&json)
    }

    fn validate(&self) -> Result<()> {
        if !(self.clock_hz.is_finite() && self.clock_hz > 0.0) {
            return Err(SimError::Config(format!(
                "clock_hz must be positive, got {}",
                self.clock_hz
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryImage {
    pub addr_bits: usize,
    pub data_bits: usize,
    #[serde(default)]
    pub origin: usize,
    pub words: Vec<u32>,
}

impl MemoryImage {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        MemoryImage::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
