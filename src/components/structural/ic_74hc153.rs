//! 74HC153 dual 4-input multiplexer.
//!
//! ```text
//!        +---+--+---+
//!  G_1_B |1  +--+ 16| VCC
//!      B |2       15| G_2_B
//!   C3_1 |3       14| A
//!   C2_1 |4       13| C3_2
//!   C1_1 |5       12| C2_2
//!   C0_1 |6       11| C1_2
//!    Y_1 |7       10| C0_2
//!    GND |8        9| Y_2
//!        +----------+
//! ```

use crate::bus::Bus;
use crate::circuit::Circuit;
use crate::component::{Component, PinIo, PinSpec};
use crate::error::Result;
use crate::signal::Signal;
use crate::types::Handle;

#[derive(Debug, Default)]
pub struct Ic74hc153;

/// Pin positions of one selector section
struct Section {
    enable_b: usize,
    inputs: [usize; 4],
    output: usize,
}

impl Ic74hc153 {
    pub const G_1_B: usize = 0;
    pub const B: usize = 1;
    pub const C3_1: usize = 2;
    pub const C2_1: usize = 3;
    pub const C1_1: usize = 4;
    pub const C0_1: usize = 5;
    pub const Y_1: usize = 6;
    pub const Y_2: usize = 8;
    pub const C0_2: usize = 9;
    pub const C1_2: usize = 10;
    pub const C2_2: usize = 11;
    pub const C3_2: usize = 12;
    pub const A: usize = 13;
    pub const G_2_B: usize = 14;

    const SECTIONS: [Section; 2] = [
        Section {
            enable_b: Self::G_1_B,
            inputs: [Self::C0_1, Self::C1_1, Self::C2_1, Self::C3_1],
            output: Self::Y_1,
        },
        Section {
            enable_b: Self::G_2_B,
            inputs: [Self::C0_2, Self::C1_2, Self::C2_2, Self::C3_2],
            output: Self::Y_2,
        },
    ];

    pub fn new() -> Self {
        Ic74hc153
    }
}

impl Component for Ic74hc153 {
    fn name(&self) -> &str {
        "74HC153"
    }

    fn pins(&self) -> Vec<PinSpec> {
        vec![
            PinSpec::input("G_1_B"),
            PinSpec::input("B"),
            PinSpec::input("C3_1"),
            PinSpec::input("C2_1"),
            PinSpec::input("C1_1"),
            PinSpec::input("C0_1"),
            PinSpec::output("Y_1"),
            PinSpec::gnd(),
            PinSpec::output("Y_2"),
            PinSpec::input("C0_2"),
            PinSpec::input("C1_2"),
            PinSpec::input("C2_2"),
            PinSpec::input("C3_2"),
            PinSpec::input("A"),
            PinSpec::input("G_2_B"),
            PinSpec::vcc(),
        ]
    }

    fn react(&mut self, io: &mut PinIo<'_>) -> Result<()> {
        let select = io.get_word(&[Self::A, Self::B])?;

        for section in &Self::SECTIONS {
            if io.get(section.enable_b)? == Signal::High {
                io.set(section.output, Signal::Low)?;
                continue;
            }
            // Undefined select stops the whole evaluation; outputs not yet
            // written keep their previous value.
            let Some(index) = select else {
                return Ok(());
            };
            let y = io.get(section.inputs[index as usize])?;
            io.set(section.output, y)?;
        }
        Ok(())
    }
}

impl Handle<Ic74hc153> {
    /// Binds `C0_1`..`C3_1` to a 4-wire bus.
    pub fn connect_c1(&self, circuit: &mut Circuit, bus: &Bus) -> Result<()> {
        circuit.connect_bus(*self, &["C0_1", "C1_1", "C2_1", "C3_1"], bus.wires())
    }

    /// Binds `C0_2`..`C3_2` to a 4-wire bus.
    pub fn connect_c2(&self, circuit: &mut Circuit, bus: &Bus) -> Result<()> {
        circuit.connect_bus(*self, &["C0_2", "C1_2", "C2_2", "C3_2"], bus.wires())
    }
}
