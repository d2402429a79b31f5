//! 74HC161 presettable synchronous 4-bit binary counter.
//!
//! ```text
//!        +---+--+---+
//!  CLR_B |1  +--+ 16| VCC
//!     CK |2       15| CO
//!      A |3       14| QA
//!      B |4       13| QB
//!      C |5       12| QC
//!      D |6       11| QD
//!    ENP |7       10| ENT
//!    GND |8        9| LD_B
//!        +----------+
//! ```

use crate::bus::Bus;
use crate::circuit::Circuit;
use crate::component::{Component, PinIo, PinSpec};
use crate::error::{Result, SimError};
use crate::signal::Signal;
use crate::types::Handle;

#[derive(Debug)]
pub struct Ic74hc161 {
    counter: u8,
    carry: bool,
    prev_ck: Signal,
}

impl Ic74hc161 {
    pub const CLR_B: usize = 0;
    pub const CK: usize = 1;
    pub const A: usize = 2;
    pub const B: usize = 3;
    pub const C: usize = 4;
    pub const D: usize = 5;
    pub const ENP: usize = 6;
    pub const LD_B: usize = 8;
    pub const ENT: usize = 9;
    pub const QD: usize = 10;
    pub const QC: usize = 11;
    pub const QB: usize = 12;
    pub const QA: usize = 13;
    pub const CO: usize = 14;

    const INPUTS: [usize; 4] = [Self::A, Self::B, Self::C, Self::D];
    const OUTPUTS: [usize; 4] = [Self::QA, Self::QB, Self::QC, Self::QD];

    pub fn new() -> Self {
        Ic74hc161 {
            counter: 0,
            carry: false,
            prev_ck: Signal::Undefined,
        }
    }

    pub fn value(&self) -> u8 {
        self.counter
    }

    pub fn carry(&self) -> bool {
        self.carry
    }

    fn load(&mut self, io: &PinIo<'_>) -> Result<()> {
        let value = io.get_word(&Self::INPUTS)?.ok_or_else(|| {
            SimError::InvalidSignal(format!("{}: load with undefined inputs", io.label()))
        })?;
        self.counter = value as u8;
        Ok(())
    }

    fn count_up(&mut self) {
        self.counter = (self.counter + 1) % 16;
        self.carry = self.counter == 0;
    }

    fn emit(&self, io: &mut PinIo<'_>) -> Result<()> {
        io.set_word(&Self::OUTPUTS, u32::from(self.counter))?;
        io.set(Self::CO, Signal::from_bool(self.carry))
    }
}

impl Default for Ic74hc161 {
    fn default() -> Self {
        Ic74hc161::new()
    }
}

impl Component for Ic74hc161 {
    fn name(&self) -> &str {
        "74HC161"
    }

    fn pins(&self) -> Vec<PinSpec> {
        vec![
            PinSpec::input("CLR_B"),
            PinSpec::input("CK"),
            PinSpec::input("A"),
            PinSpec::input("B"),
            PinSpec::input("C"),
            PinSpec::input("D"),
            PinSpec::input("ENP"),
            PinSpec::gnd(),
            PinSpec::input("LD_B"),
            PinSpec::input("ENT"),
            PinSpec::output("QD"),
            PinSpec::output("QC"),
            PinSpec::output("QB"),
            PinSpec::output("QA"),
            PinSpec::output("CO"),
            PinSpec::vcc(),
        ]
    }

    fn power_on(&mut self, io: &mut PinIo<'_>) -> Result<()> {
        self.emit(io)
    }

    fn react(&mut self, io: &mut PinIo<'_>) -> Result<()> {
        let ck = io.get(Self::CK)?;
        let rising = self.prev_ck == Signal::Low && ck == Signal::High;
        self.prev_ck = ck;

        if io.get(Self::CLR_B)? == Signal::Low {
            self.counter = 0;
            self.carry = false;
            return self.emit(io);
        }
        if !rising {
            return Ok(());
        }

        if io.get(Self::LD_B)? == Signal::Low {
            self.load(io)?;
            self.emit(io)
        } else if io.get(Self::ENP)? == Signal::High && io.get(Self::ENT)? == Signal::High {
            self.count_up();
            self.emit(io)
        } else {
            Ok(())
        }
    }
}

impl Handle<Ic74hc161> {
    /// Binds `A`..`D` to a 4-wire bus, least significant first.
    pub fn connect_input(&self, circuit: &mut Circuit, bus: &Bus) -> Result<()> {
        circuit.connect_bus(*self, &["A", "B", "C", "D"], bus.wires())
    }

    /// Binds `QA`..`QD` to a 4-wire bus, least significant first.
    pub fn connect_output(&self, circuit: &mut Circuit, bus: &Bus) -> Result<()> {
        circuit.connect_bus(*self, &["QA", "QB", "QC", "QD"], bus.wires())
    }

    pub fn value(&self, circuit: &Circuit) -> Result<u8> {
        Ok(circuit.component(*self)?.value())
    }

    pub fn carry(&self, circuit: &Circuit) -> Result<bool> {
        Ok(circuit.component(*self)?.carry())
    }
}
