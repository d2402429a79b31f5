//! Adders assembled from primitive gates.
//!
//! These parts have no reaction of their own: construction instantiates
//! gates wired to the inner wires of the adder's pins, and ordinary
//! propagation through that network does the arithmetic.

use crate::circuit::Circuit;
use crate::component::{pin_wire, Component, PinSpec};
use crate::components::logic::gates::{AndGate, Inverter, OrGate};
use crate::error::Result;
use crate::types::{ComponentId, ConnectorId};

/// Half adder: `A`, `B` -> `S` (sum), `C` (carry)
#[derive(Debug, Default)]
pub struct HalfAdder {
    elements: Vec<ComponentId>,
}

impl HalfAdder {
    pub const A: usize = 0;
    pub const B: usize = 1;
    pub const S: usize = 2;
    pub const C: usize = 3;

    pub fn new() -> Self {
        HalfAdder::default()
    }

    /// Gates making up the adder, in construction order
    pub fn elements(&self) -> &[ComponentId] {
        &self.elements
    }
}

impl Component for HalfAdder {
    fn name(&self) -> &str {
        "HA"
    }

    fn pins(&self) -> Vec<PinSpec> {
        vec![
            PinSpec::input("A"),
            PinSpec::input("B"),
            PinSpec::output("S"),
            PinSpec::output("C"),
        ]
    }

    fn elaborate(&mut self, circuit: &mut Circuit, pins: &[Option<ConnectorId>]) -> Result<()> {
        let a = pin_wire(circuit, pins, Self::A)?;
        let b = pin_wire(circuit, pins, Self::B)?;
        let s = pin_wire(circuit, pins, Self::S)?;
        let c = pin_wire(circuit, pins, Self::C)?;
        let (any, not_both) = (circuit.new_wire(), circuit.new_wire());

        // S = (A OR B) AND NOT (A AND B)
        self.elements = vec![
            circuit.add_wired(OrGate::new(), &[a.into(), b.into(), any.into()])?.id(),
            circuit.add_wired(AndGate::new(), &[a.into(), b.into(), c.into()])?.id(),
            circuit.add_wired(Inverter::new(), &[c.into(), not_both.into()])?.id(),
            circuit.add_wired(AndGate::new(), &[any.into(), not_both.into(), s.into()])?.id(),
        ];
        Ok(())
    }
}

/// Full adder: `A`, `B`, `C_IN` -> `S`, `C_OUT`
#[derive(Debug, Default)]
pub struct FullAdder {
    elements: Vec<ComponentId>,
}

impl FullAdder {
    pub const A: usize = 0;
    pub const B: usize = 1;
    pub const C_IN: usize = 2;
    pub const S: usize = 3;
    pub const C_OUT: usize = 4;

    pub fn new() -> Self {
        FullAdder::default()
    }

    pub fn elements(&self) -> &[ComponentId] {
        &self.elements
    }
}

impl Component for FullAdder {
    fn name(&self) -> &str {
        "FA"
    }

    fn pins(&self) -> Vec<PinSpec> {
        vec![
            PinSpec::input("A"),
            PinSpec::input("B"),
            PinSpec::input("C_IN"),
            PinSpec::output("S"),
            PinSpec::output("C_OUT"),
        ]
    }

    fn elaborate(&mut self, circuit: &mut Circuit, pins: &[Option<ConnectorId>]) -> Result<()> {
        let a = pin_wire(circuit, pins, Self::A)?;
        let b = pin_wire(circuit, pins, Self::B)?;
        let c_in = pin_wire(circuit, pins, Self::C_IN)?;
        let s = pin_wire(circuit, pins, Self::S)?;
        let c_out = pin_wire(circuit, pins, Self::C_OUT)?;
        let (partial, c1, c2) = (circuit.new_wire(), circuit.new_wire(), circuit.new_wire());

        self.elements = vec![
            circuit
                .add_wired(HalfAdder::new(), &[b.into(), c_in.into(), partial.into(), c1.into()])?
                .id(),
            circuit
                .add_wired(HalfAdder::new(), &[a.into(), partial.into(), s.into(), c2.into()])?
                .id(),
            circuit.add_wired(OrGate::new(), &[c1.into(), c2.into(), c_out.into()])?.id(),
        ];
        Ok(())
    }
}
