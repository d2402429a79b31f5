//! # Rusty Logic Library
//!
//! A discrete-event digital logic simulator written in Rust.
//!
//! This library provides:
//! - Ternary signals (0, 1, undefined) carried by wires and buses
//! - Directional connectors that negotiate shared wires between components
//! - A FIFO agenda for delta-cycle settling of sequential logic
//! - Gates, flip-flops, 74HC-series chips, memory, clock and switches
//! - JSON configuration for simulation settings and memory images

pub mod agenda;
pub mod bus;
pub mod circuit;
pub mod component;
pub mod components;
pub mod connection;
pub mod error;
pub mod signal;
pub mod system_config;
pub mod types;
pub mod wire;

// Re-export commonly used items for easier importing
pub use bus::Bus;
pub use circuit::Circuit;
pub use component::{Component, PinIo, PinKind, PinSpec, Reaction};
pub use connection::{Direction, Endpoint};
pub use error::{Result, SimError};
pub use signal::Signal;
pub use system_config::{MemoryImage, SimConfig};
pub use types::{ComponentId, ConnectorId, Handle, ProbeId, WireId};
pub use wire::Listener;
