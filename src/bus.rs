use crate::circuit::Circuit;
use crate::error::{Result, SimError};
use crate::signal::{pack, Signal};
use crate::types::WireId;

const WORD_BITS: usize = u32::BITS as usize;

/// Fixed-width ordered group of wires read and written as one integer.
///
/// Bit 0 is wire 0. The width never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bus {
    wires: Vec<WireId>,
}

impl Bus {
    pub fn from_wires(wires: Vec<WireId>) -> Self {
        Bus { wires }
    }

    pub fn width(&self) -> usize {
        self.wires.len()
    }

    pub fn wires(&self) -> &[WireId] {
        &self.wires
    }

    pub fn wire(&self, index: usize) -> Result<WireId> {
        self.wires
            .get(index)
            .copied()
            .ok_or_else(|| SimError::out_of_range("bus", index, self.wires.len()))
    }

    pub fn signals(&self, circuit: &Circuit) -> Result<Vec<Signal>> {
        self.wires.iter().map(|&wire| circuit.signal(wire)).collect()
    }

    pub fn set_signals(&self, circuit: &mut Circuit, signals: &[Signal]) -> Result<()> {
        if signals.len() != self.width() {
            return Err(SimError::out_of_range("bus signals", signals.len(), self.width()));
        }
        for (&wire, &signal) in self.wires.iter().zip(signals) {
            circuit.set_signal(wire, signal)?;
        }
        Ok(())
    }

    /// Integer value, `None` as soon as one bit is undefined
    ///
    /// Buses wider than 32 bits have no integer form and fail with `OutOfRange`.
    pub fn value(&self, circuit: &Circuit) -> Result<Option<u32>> {
        if self.width() > WORD_BITS {
            return Err(SimError::out_of_range("bus width", self.width(), WORD_BITS));
        }
        Ok(pack(&self.signals(circuit)?))
    }

    pub fn set_value(&self, circuit: &mut Circuit, value: u32) -> Result<()> {
        self.check_fits(value)?;
        for (bit, &wire) in self.wires.iter().enumerate() {
            circuit.set_signal(wire, Signal::bit(value, bit))?;
        }
        Ok(())
    }

    /// Like `set_value`, with every bit applied through the agenda
    pub fn set_delayed_value(&self, circuit: &mut Circuit, value: u32) -> Result<()> {
        self.check_fits(value)?;
        for (bit, &wire) in self.wires.iter().enumerate() {
            circuit.set_delayed_signal(wire, Signal::bit(value, bit))?;
        }
        Ok(())
    }

    fn check_fits(&self, value: u32) -> Result<()> {
        let fits = u32::try_from(self.width())
            .ok()
            .and_then(|width| 1u32.checked_shl(width))
            .map_or(true, |limit| value < limit);
        if fits {
            Ok(())
        } else {
            Err(SimError::out_of_range("bus value", value as usize, self.width()))
        }
    }
}

impl Circuit {
    pub fn bus(&mut self, width: usize) -> Bus {
        Bus::from_wires((0..width).map(|_| self.new_wire()).collect())
    }

    pub fn named_bus(&mut self, name: &str, width: usize) -> Bus {
        Bus::from_wires(
            (0..width)
                .map(|i| self.named_wire(format!("{}[{}]", name, i)))
                .collect(),
        )
    }
}
