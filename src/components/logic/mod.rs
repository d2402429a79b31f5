pub mod gates;

pub use gates::{AndGate, Inverter, Nand3Gate, NandGate, OrGate};
