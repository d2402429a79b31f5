use crate::circuit::Circuit;
use crate::connection::Direction;
use crate::error::{Result, SimError};
use crate::signal::{pack, Signal};
use crate::types::{ComponentId, ConnectorId, WireId};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::borrow::Cow;

/// Kind of a physical pin position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinKind {
    Input,
    Output,
    /// Power pin (VCC/GND); occupies a position but carries no connector
    Supply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSpec {
    pub name: Cow<'static, str>,
    pub kind: PinKind,
}

impl PinSpec {
    pub fn input(name: impl Into<Cow<'static, str>>) -> Self {
        PinSpec {
            name: name.into(),
            kind: PinKind::Input,
        }
    }

    pub fn output(name: impl Into<Cow<'static, str>>) -> Self {
        PinSpec {
            name: name.into(),
            kind: PinKind::Output,
        }
    }

    pub fn vcc() -> Self {
        PinSpec {
            name: Cow::Borrowed("VCC"),
            kind: PinKind::Supply,
        }
    }

    pub fn gnd() -> Self {
        PinSpec {
            name: Cow::Borrowed("GND"),
            kind: PinKind::Supply,
        }
    }

    pub(crate) fn direction(&self) -> Option<Direction> {
        match self.kind {
            PinKind::Input => Some(Direction::Input),
            PinKind::Output => Some(Direction::Output),
            PinKind::Supply => None,
        }
    }
}

/// When a component's reaction runs after one of its inputs changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    /// Synchronously, inside the notification that changed the input
    #[default]
    Immediate,
    /// As a unit on the agenda, run when the agenda is drained
    Deferred,
}

pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Contract for every circuit element.
///
/// A component declares its pins once; the circuit creates one connector
/// per non-supply pin, in declaration order, and hands the component a
/// `PinIo` view over them whenever it must react.
pub trait Component: AsAny {
    /// Part name used in diagnostics
    fn name(&self) -> &str;

    /// Physical pin layout, fixed for the component's lifetime
    fn pins(&self) -> Vec<PinSpec>;

    /// Pure gates follow the configured gate scheduling; everything else
    /// reacts deferred.
    fn combinational(&self) -> bool {
        false
    }

    /// Recomputes outputs from the current inputs.
    fn react(&mut self, _io: &mut PinIo<'_>) -> Result<()> {
        Ok(())
    }

    /// Builds an internal network out of other components.
    ///
    /// Runs once, right after the connectors exist and before any external
    /// wiring.
    fn elaborate(&mut self, _circuit: &mut Circuit, _pins: &[Option<ConnectorId>]) -> Result<()> {
        Ok(())
    }

    /// Drives initial outputs after registration.
    fn power_on(&mut self, _io: &mut PinIo<'_>) -> Result<()> {
        Ok(())
    }
}

/// Inner wire behind a pin position, for `elaborate` implementations.
pub fn pin_wire(circuit: &Circuit, pins: &[Option<ConnectorId>], position: usize) -> Result<WireId> {
    let connector = pins
        .get(position)
        .copied()
        .flatten()
        .ok_or_else(|| SimError::unknown_pin("component", format!("PIN{}", position + 1)))?;
    circuit.inner_wire(connector)
}

/// A component's window onto its own connectors during a reaction.
pub struct PinIo<'a> {
    circuit: &'a mut Circuit,
    owner: ComponentId,
    label: &'a str,
    pins: &'a [Option<ConnectorId>],
}

impl<'a> PinIo<'a> {
    pub(crate) fn new(
        circuit: &'a mut Circuit,
        owner: ComponentId,
        label: &'a str,
        pins: &'a [Option<ConnectorId>],
    ) -> Self {
        PinIo {
            circuit,
            owner,
            label,
            pins,
        }
    }

    fn connector(&self, pin: usize) -> Result<ConnectorId> {
        self.pins
            .get(pin)
            .copied()
            .flatten()
            .ok_or_else(|| SimError::unknown_pin(self.label, format!("PIN{}", pin + 1)))
    }

    /// Inner wire of a pin, for components that wire sub-elements to it
    pub fn wire(&self, pin: usize) -> Result<WireId> {
        self.circuit.inner_wire(self.connector(pin)?)
    }

    pub fn get(&self, pin: usize) -> Result<Signal> {
        self.circuit.connector_signal(self.connector(pin)?)
    }

    pub fn set(&mut self, pin: usize, signal: Signal) -> Result<()> {
        let connector = self.connector(pin)?;
        self.circuit.set_connector_signal(connector, signal)
    }

    /// Reads pins (least significant first) as an integer
    pub fn get_word(&self, pins: &[usize]) -> Result<Option<u32>> {
        let signals = pins
            .iter()
            .map(|&pin| self.get(pin))
            .collect::<Result<Vec<_>>>()?;
        Ok(pack(&signals))
    }

    /// Drives pins (least significant first) from an integer
    pub fn set_word(&mut self, pins: &[usize], value: u32) -> Result<()> {
        for (bit, &pin) in pins.iter().enumerate() {
            self.set(pin, Signal::bit(value, bit))?;
        }
        Ok(())
    }

    /// Requests the owner's own reaction, honoring its scheduling mode.
    pub fn schedule(&mut self) -> Result<()> {
        self.circuit.trigger(self.owner)
    }

    pub fn label(&self) -> &str {
        self.label
    }

    pub fn circuit(&self) -> &Circuit {
        &*self.circuit
    }
}
