//! Manually operated inputs.

use crate::bus::Bus;
use crate::circuit::Circuit;
use crate::component::{Component, PinIo, PinSpec};
use crate::error::{Result, SimError};
use crate::signal::Signal;
use crate::types::Handle;

/// Momentary push button with output `Y`.
///
/// `Y` carries the normal level while released and its complement while
/// held down. Pressing or releasing schedules a reaction, so the new level
/// appears once the agenda drains.
#[derive(Debug)]
pub struct PushSwitch {
    normal: Signal,
    pushed: bool,
}

impl PushSwitch {
    pub const Y: usize = 0;

    /// A normally-low button unless `normal` is `High`.
    pub fn new(normal: Signal) -> Self {
        let normal = if normal == Signal::High {
            Signal::High
        } else {
            Signal::Low
        };
        PushSwitch {
            normal,
            pushed: false,
        }
    }

    pub fn is_pushed(&self) -> bool {
        self.pushed
    }
}

impl Default for PushSwitch {
    fn default() -> Self {
        PushSwitch::new(Signal::Low)
    }
}

impl Component for PushSwitch {
    fn name(&self) -> &str {
        "PUSH"
    }

    fn pins(&self) -> Vec<PinSpec> {
        vec![PinSpec::output("Y")]
    }

    fn react(&mut self, io: &mut PinIo<'_>) -> Result<()> {
        let level = if self.pushed {
            self.normal.not()
        } else {
            self.normal
        };
        io.set(Self::Y, level)
    }
}

impl Handle<PushSwitch> {
    pub fn down(&self, circuit: &mut Circuit) -> Result<()> {
        self.press(circuit, true)
    }

    pub fn up(&self, circuit: &mut Circuit) -> Result<()> {
        self.press(circuit, false)
    }

    fn press(&self, circuit: &mut Circuit, pushed: bool) -> Result<()> {
        circuit.operate(*self, |switch, io| {
            switch.pushed = pushed;
            io.schedule()
        })
    }
}

/// Single-pole double-throw switch: `L1`, `L2` -> `C`.
#[derive(Debug, Default)]
pub struct Switch {
    thrown: bool,
}

impl Switch {
    pub const L1: usize = 0;
    pub const L2: usize = 1;
    pub const C: usize = 2;

    pub fn new() -> Self {
        Switch::default()
    }

    /// `true` while `C` follows `L2`
    pub fn is_thrown(&self) -> bool {
        self.thrown
    }
}

impl Component for Switch {
    fn name(&self) -> &str {
        "SW"
    }

    fn pins(&self) -> Vec<PinSpec> {
        vec![PinSpec::input("L1"), PinSpec::input("L2"), PinSpec::output("C")]
    }

    fn react(&mut self, io: &mut PinIo<'_>) -> Result<()> {
        let source = if self.thrown { Self::L2 } else { Self::L1 };
        let level = io.get(source)?;
        io.set(Self::C, level)
    }
}

impl Handle<Switch> {
    pub fn toggle(&self, circuit: &mut Circuit) -> Result<()> {
        circuit.operate(*self, |switch, io| {
            switch.thrown = !switch.thrown;
            io.schedule()
        })
    }
}

/// Bank of `N` independent toggles driving `Y0..Y(N-1)`.
///
/// All outputs start low. Changes are applied to the outputs at once,
/// without going through the agenda.
#[derive(Debug, Clone)]
pub struct DipSwitch {
    state: Vec<bool>,
}

impl DipSwitch {
    pub fn new(count: usize) -> Self {
        DipSwitch {
            state: vec![false; count],
        }
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn is_on(&self, index: usize) -> Result<bool> {
        self.state
            .get(index)
            .copied()
            .ok_or_else(|| SimError::out_of_range("dip switch", index, self.state.len()))
    }

    /// Switch positions packed into an integer, position 0 least significant
    pub fn value(&self) -> u32 {
        self.state
            .iter()
            .enumerate()
            .take(32)
            .fold(0, |acc, (i, &on)| acc | (u32::from(on) << i))
    }

    fn update(&mut self, io: &mut PinIo<'_>, index: usize, f: impl FnOnce(bool) -> bool) -> Result<()> {
        let limit = self.state.len();
        let position = self
            .state
            .get_mut(index)
            .ok_or_else(|| SimError::out_of_range(format!("{} switch", io.label()), index, limit))?;
        *position = f(*position);
        io.set(index, Signal::from_bool(*position))
    }
}

impl Component for DipSwitch {
    fn name(&self) -> &str {
        "DIPSW"
    }

    fn pins(&self) -> Vec<PinSpec> {
        (0..self.state.len())
            .map(|i| PinSpec::output(format!("Y{}", i)))
            .collect()
    }

    fn power_on(&mut self, io: &mut PinIo<'_>) -> Result<()> {
        for (i, &on) in self.state.iter().enumerate() {
            io.set(i, Signal::from_bool(on))?;
        }
        Ok(())
    }
}

impl Handle<DipSwitch> {
    pub fn on(&self, circuit: &mut Circuit, index: usize) -> Result<()> {
        circuit.operate(*self, |dip, io| dip.update(io, index, |_| true))
    }

    pub fn off(&self, circuit: &mut Circuit, index: usize) -> Result<()> {
        circuit.operate(*self, |dip, io| dip.update(io, index, |_| false))
    }

    pub fn toggle(&self, circuit: &mut Circuit, index: usize) -> Result<()> {
        circuit.operate(*self, |dip, io| dip.update(io, index, |on| !on))
    }

    /// Sets every position from an integer, position 0 least significant.
    pub fn set_value(&self, circuit: &mut Circuit, value: u32) -> Result<()> {
        circuit.operate(*self, |dip, io| {
            for index in 0..dip.len() {
                let on = index < 32 && (value >> index) & 1 == 1;
                dip.update(io, index, |_| on)?;
            }
            Ok(())
        })
    }

    pub fn connect_bus(&self, circuit: &mut Circuit, bus: &Bus) -> Result<()> {
        let names: Vec<String> = (0..circuit.component(*self)?.len())
            .map(|i| format!("Y{}", i))
            .collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        circuit.connect_bus(*self, &names, bus.wires())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal::{High, Low, Undefined};

    #[test]
    fn test_push_switch_levels() {
        let mut circuit = Circuit::new();
        let y = circuit.new_wire();
        let button = circuit.add_wired(PushSwitch::new(High), &[y.into()]).unwrap();
        assert_eq!(circuit.signal(y).unwrap(), Undefined);

        button.down(&mut circuit).unwrap();
        assert_eq!(circuit.signal(y).unwrap(), Undefined);
        circuit.start().unwrap();
        assert_eq!(circuit.signal(y).unwrap(), Low);

        button.up(&mut circuit).unwrap();
        circuit.start().unwrap();
        assert_eq!(circuit.signal(y).unwrap(), High);
        assert!(!circuit.component(button).unwrap().is_pushed());
    }

    #[test]
    fn test_switch_follows_selected_input() {
        let mut circuit = Circuit::new();
        let [l1, l2, c] = [0; 3].map(|_| circuit.new_wire());
        let switch = circuit
            .add_wired(Switch::new(), &[l1.into(), l2.into(), c.into()])
            .unwrap();
        circuit.set_signal(l1, High).unwrap();
        circuit.set_signal(l2, Low).unwrap();
        circuit.start().unwrap();
        assert_eq!(circuit.signal(c).unwrap(), High);

        switch.toggle(&mut circuit).unwrap();
        circuit.start().unwrap();
        assert_eq!(circuit.signal(c).unwrap(), Low);

        circuit.set_signal(l2, High).unwrap();
        circuit.start().unwrap();
        assert_eq!(circuit.signal(c).unwrap(), High);
    }

    #[test]
    fn test_dip_switch_drives_bus() {
        let mut circuit = Circuit::new();
        let dip = circuit.add(DipSwitch::new(4)).unwrap();
        let bus = circuit.bus(4);
        dip.connect_bus(&mut circuit, &bus).unwrap();
        assert_eq!(bus.value(&circuit).unwrap(), Some(0));

        dip.on(&mut circuit, 0).unwrap();
        dip.toggle(&mut circuit, 3).unwrap();
        assert_eq!(bus.value(&circuit).unwrap(), Some(0b1001));

        dip.off(&mut circuit, 0).unwrap();
        assert_eq!(circuit.component(dip).unwrap().value(), 0b1000);

        dip.set_value(&mut circuit, 0b0110).unwrap();
        assert_eq!(bus.value(&circuit).unwrap(), Some(0b0110));
    }

    #[test]
    fn test_dip_switch_index_out_of_range() {
        let mut circuit = Circuit::new();
        let dip = circuit.add(DipSwitch::new(4)).unwrap();
        assert!(matches!(
            dip.on(&mut circuit, 4),
            Err(SimError::OutOfRange { index: 4, limit: 4, .. })
        ));
        assert!(circuit.component(dip).unwrap().is_on(4).is_err());
    }
}
