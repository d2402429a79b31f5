//! 74HC283 4-bit binary full adder with fast carry.
//!
//! ```text
//!        +---+--+---+
//!     S2 |1  +--+ 16| VCC
//!     B2 |2       15| B3
//!     A2 |3       14| A3
//!     S1 |4       13| S3
//!     A1 |5       12| A4
//!     B1 |6       11| B4
//!     C0 |7       10| S4
//!    GND |8        9| C4
//!        +----------+
//! ```
//!
//! Internally a ripple of four full adders; only the sum bits and the final
//! carry are visible.

use crate::bus::Bus;
use crate::circuit::Circuit;
use crate::component::{pin_wire, Component, PinSpec};
use crate::components::composite::FullAdder;
use crate::error::Result;
use crate::types::{ComponentId, ConnectorId, Handle};

#[derive(Debug, Default)]
pub struct Ic74hc283 {
    stages: Vec<ComponentId>,
}

impl Ic74hc283 {
    pub const S2: usize = 0;
    pub const B2: usize = 1;
    pub const A2: usize = 2;
    pub const S1: usize = 3;
    pub const A1: usize = 4;
    pub const B1: usize = 5;
    pub const C0: usize = 6;
    pub const C4: usize = 8;
    pub const S4: usize = 9;
    pub const B4: usize = 10;
    pub const A4: usize = 11;
    pub const S3: usize = 12;
    pub const A3: usize = 13;
    pub const B3: usize = 14;

    const A: [usize; 4] = [Self::A1, Self::A2, Self::A3, Self::A4];
    const B: [usize; 4] = [Self::B1, Self::B2, Self::B3, Self::B4];
    const S: [usize; 4] = [Self::S1, Self::S2, Self::S3, Self::S4];

    pub fn new() -> Self {
        Ic74hc283::default()
    }

    /// Full-adder stages, least significant first
    pub fn stages(&self) -> &[ComponentId] {
        &self.stages
    }
}

impl Component for Ic74hc283 {
    fn name(&self) -> &str {
        "74HC283"
    }

    fn pins(&self) -> Vec<PinSpec> {
        vec![
            PinSpec::output("S2"),
            PinSpec::input("B2"),
            PinSpec::input("A2"),
            PinSpec::output("S1"),
            PinSpec::input("A1"),
            PinSpec::input("B1"),
            PinSpec::input("C0"),
            PinSpec::gnd(),
            PinSpec::output("C4"),
            PinSpec::output("S4"),
            PinSpec::input("B4"),
            PinSpec::input("A4"),
            PinSpec::output("S3"),
            PinSpec::input("A3"),
            PinSpec::input("B3"),
            PinSpec::vcc(),
        ]
    }

    fn elaborate(&mut self, circuit: &mut Circuit, pins: &[Option<ConnectorId>]) -> Result<()> {
        let mut carry = pin_wire(circuit, pins, Self::C0)?;
        for bit in 0..4 {
            let carry_out = if bit == 3 {
                pin_wire(circuit, pins, Self::C4)?
            } else {
                circuit.new_wire()
            };
            let a = pin_wire(circuit, pins, Self::A[bit])?;
            let b = pin_wire(circuit, pins, Self::B[bit])?;
            let s = pin_wire(circuit, pins, Self::S[bit])?;
            let stage = circuit.add_wired(
                FullAdder::new(),
                &[a.into(), b.into(), carry.into(), s.into(), carry_out.into()],
            )?;
            self.stages.push(stage.id());
            carry = carry_out;
        }
        Ok(())
    }
}

impl Handle<Ic74hc283> {
    pub fn connect_a(&self, circuit: &mut Circuit, bus: &Bus) -> Result<()> {
        circuit.connect_bus(*self, &["A1", "A2", "A3", "A4"], bus.wires())
    }

    pub fn connect_b(&self, circuit: &mut Circuit, bus: &Bus) -> Result<()> {
        circuit.connect_bus(*self, &["B1", "B2", "B3", "B4"], bus.wires())
    }

    pub fn connect_s(&self, circuit: &mut Circuit, bus: &Bus) -> Result<()> {
        circuit.connect_bus(*self, &["S1", "S2", "S3", "S4"], bus.wires())
    }
}
