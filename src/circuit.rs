//! # Circuit arena
//!
//! `Circuit` owns every wire, connector and component of one simulated
//! circuit. Everything else refers to them through the small index types in
//! [`crate::types`], so notification chains never need shared ownership.
//!
//! ## Propagation
//!
//! - `set_signal` applies a new value and notifies listeners synchronously;
//!   writing the value a wire already carries is a no-op.
//! - `set_delayed_signal` queues the same apply-and-notify on the agenda.
//! - Components react either immediately or as agenda units, see
//!   [`Reaction`].
//! - `start` drains the agenda in FIFO order.
//!
//! ```rust
//! use rusty_logic::components::logic::gates::AndGate;
//! use rusty_logic::{Circuit, Signal};
//!
//! let mut circuit = Circuit::new();
//! let and = circuit.add(AndGate::new()).unwrap();
//! let (a, b, y) = (circuit.new_wire(), circuit.new_wire(), circuit.new_wire());
//! circuit.connect(and, "A", a).unwrap();
//! circuit.connect(and, "B", b).unwrap();
//! circuit.connect(and, "Y", y).unwrap();
//!
//! circuit.set_signal(a, Signal::High).unwrap();
//! circuit.set_signal(b, Signal::High).unwrap();
//! circuit.start().unwrap();
//! assert_eq!(circuit.signal(y).unwrap(), Signal::High);
//! ```

use crate::agenda::{Agenda, Task};
use crate::component::{Component, PinIo, PinSpec, Reaction};
use crate::connection::Endpoint;
use crate::error::{Result, SimError};
use crate::signal::Signal;
use crate::system_config::SimConfig;
use crate::types::{ComponentId, ConnectorId, Handle, ProbeId, WireId};
use crate::wire::{Listener, Wire};
use log::{debug, trace};
use std::any::type_name;
use std::rc::Rc;

type Probe = Box<dyn FnMut(WireId, Signal)>;

struct Slot {
    label: Rc<str>,
    specs: Vec<PinSpec>,
    pins: Rc<[Option<ConnectorId>]>,
    reaction: Reaction,
    component: Option<Box<dyn Component>>,
    // An immediate reaction requested while the component was already running.
    pending: bool,
}

// Arena lengths before a registration.
#[derive(Clone, Copy)]
struct Mark {
    wires: usize,
    connectors: usize,
    slots: usize,
    probes: usize,
}

impl Mark {
    fn of(circuit: &Circuit) -> Self {
        Mark {
            wires: circuit.wires.len(),
            connectors: circuit.connectors.len(),
            slots: circuit.slots.len(),
            probes: circuit.probes.len(),
        }
    }
}

pub struct Circuit {
    pub(crate) wires: Vec<Wire>,
    pub(crate) connectors: Vec<crate::connection::Connector>,
    slots: Vec<Slot>,
    probes: Vec<Probe>,
    agenda: Agenda,
    config: SimConfig,
}

impl Default for Circuit {
    fn default() -> Self {
        Circuit::new()
    }
}

impl Circuit {
    pub fn new() -> Self {
        Circuit::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        Circuit {
            wires: Vec::new(),
            connectors: Vec::new(),
            slots: Vec::new(),
            probes: Vec::new(),
            agenda: Agenda::new(),
            config,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }


    pub fn new_wire(&mut self) -> WireId {
        let name = format!("Wire{}", self.wires.len());
        self.named_wire(name)
    }

    pub fn named_wire(&mut self, name: impl Into<String>) -> WireId {
        let id = WireId(self.wires.len());
        self.wires.push(Wire::new(name.into()));
        id
    }

    pub fn wire(&self, id: WireId) -> Result<&Wire> {
        self.wires
            .get(id.0)
            .ok_or_else(|| SimError::out_of_range("wire", id.0, self.wires.len()))
    }

    pub(crate) fn wire_mut(&mut self, id: WireId) -> Result<&mut Wire> {
        let count = self.wires.len();
        self.wires
            .get_mut(id.0)
            .ok_or_else(|| SimError::out_of_range("wire", id.0, count))
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    pub fn signal(&self, id: WireId) -> Result<Signal> {
        Ok(self.wire(id)?.signal())
    }

    /// Applies a value and notifies listeners before returning.
    pub fn set_signal(&mut self, id: WireId, signal: Signal) -> Result<()> {
        if self.wire(id)?.signal() == signal {
            return Ok(());
        }
        trace!("{} <- {}", id, signal);
        self.wire_mut(id)?.apply(signal);
        self.notify(id)
    }

    /// Queues the apply-and-notify as one agenda unit.
    pub fn set_delayed_signal(&mut self, id: WireId, signal: Signal) -> Result<()> {
        if self.wire(id)?.signal() == signal {
            return Ok(());
        }
        self.agenda.add(Task::Apply { wire: id, signal });
        Ok(())
    }

    pub fn add_change_listener(&mut self, id: WireId, listener: Listener) -> Result<()> {
        self.wire_mut(id)?.add_listener(listener)
    }

    pub fn remove_change_listener(&mut self, id: WireId, listener: Listener) -> Result<()> {
        self.wire_mut(id)?.remove_listener(listener)
    }

    pub fn listeners(&self, id: WireId) -> Result<&[Listener]> {
        Ok(self.wire(id)?.listeners())
    }

    /// Registers an external observer; attach it with `add_change_listener`.
    pub fn probe(&mut self, observer: impl FnMut(WireId, Signal) + 'static) -> ProbeId {
        let id = ProbeId(self.probes.len());
        self.probes.push(Box::new(observer));
        id
    }

    /// Registers an observer and attaches it to `wire` in one step.
    pub fn watch(
        &mut self,
        wire: WireId,
        observer: impl FnMut(WireId, Signal) + 'static,
    ) -> Result<ProbeId> {
        let id = self.probe(observer);
        self.add_change_listener(wire, Listener::Probe(id))?;
        Ok(id)
    }

    fn notify(&mut self, id: WireId) -> Result<()> {
        let listeners = self.wire(id)?.listeners().to_vec();
        for listener in listeners {
            self.dispatch(listener, id)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, listener: Listener, wire: WireId) -> Result<()> {
        match listener {
            Listener::Connector(connector) => self.connector_action(connector),
            Listener::Component(component) => self.trigger(component),
            Listener::Probe(probe) => {
                let signal = self.signal(wire)?;
                if let Some(observer) = self.probes.get_mut(probe.0) {
                    observer(wire, signal);
                }
                Ok(())
            }
        }
    }


    /// Queues an arbitrary unit of work.
    pub fn delay(&mut self, unit: impl FnOnce(&mut Circuit) -> Result<()> + 'static) {
        self.agenda.add(Task::Call(Box::new(unit)));
    }

    /// Drains the agenda until it is empty or `stop` is called.
    ///
    /// Calling `start` from inside a unit while the drain is active does
    /// nothing. An error aborts the drain and leaves later units queued.
    pub fn start(&mut self) -> Result<()> {
        if !self.agenda.begin() {
            return Ok(());
        }
        let result = self.drain();
        self.agenda.finish();
        result
    }

    fn drain(&mut self) -> Result<()> {
        while self.agenda.is_running() {
            let Some(task) = self.agenda.pop() else {
                break;
            };
            trace!("agenda: {:?}", task);
            match task {
                Task::Apply { wire, signal } => {
                    self.wire_mut(wire)?.apply(signal);
                    self.notify(wire)?;
                }
                Task::React(id) => self.react(id)?,
                Task::Call(unit) => unit(self)?,
            }
        }
        Ok(())
    }

    /// Halts the drain after the unit currently executing.
    pub fn stop(&mut self) {
        self.agenda.stop();
    }

    pub fn is_running(&self) -> bool {
        self.agenda.is_running()
    }

    /// Number of units waiting on the agenda
    pub fn pending(&self) -> usize {
        self.agenda.len()
    }


    pub fn add<T: Component>(&mut self, component: T) -> Result<Handle<T>> {
        self.add_wired(component, &[])
    }

    /// Registers a component and connects `endpoints` to its pins by
    /// physical position. Supply positions consume an endpoint without
    /// connecting it; trailing pins stay unconnected.
    pub fn add_wired<T: Component>(
        &mut self,
        mut component: T,
        endpoints: &[Endpoint],
    ) -> Result<Handle<T>> {
        let id = ComponentId(self.slots.len());
        let specs = component.pins();
        let label: Rc<str> = Rc::from(format!("{}#{}", component.name(), id.0));

        for (i, spec) in specs.iter().enumerate() {
            if specs[..i].iter().any(|other| other.name == spec.name) {
                return Err(SimError::Config(format!(
                    "{} declares pin {} twice",
                    label, spec.name
                )));
            }
        }

        let reaction = if component.combinational() {
            self.config.gate_reaction
        } else {
            Reaction::Deferred
        };
        let mark = Mark::of(self);
        self.slots.push(Slot {
            label: label.clone(),
            specs: Vec::new(),
            pins: Rc::from(Vec::new()),
            reaction,
            component: None,
            pending: false,
        });

        let pins = match self.build(id, &label, &mut component, specs) {
            Ok(pins) => pins,
            Err(err) => {
                debug!("registration of {} failed: {}", label, err);
                self.rollback(mark);
                return Err(err);
            }
        };
        self.slots[id.0].component = Some(Box::new(component));
        if std::mem::take(&mut self.slots[id.0].pending) {
            self.react(id)?;
        }

        for (position, endpoint) in endpoints.iter().enumerate() {
            if let Some(connector) = pins.get(position).copied().flatten() {
                self.connect_connector(connector, *endpoint)?;
            }
        }

        Ok(Handle::new(id))
    }

    fn build<T: Component>(
        &mut self,
        id: ComponentId,
        label: &Rc<str>,
        component: &mut T,
        specs: Vec<PinSpec>,
    ) -> Result<Rc<[Option<ConnectorId>]>> {
        let mut pins = Vec::with_capacity(specs.len());
        for spec in &specs {
            let connector = match spec.direction() {
                Some(direction) => Some(self.create_connector(id, &spec.name, direction)?),
                None => None,
            };
            pins.push(connector);
        }
        let pins: Rc<[Option<ConnectorId>]> = Rc::from(pins);
        self.slots[id.0].specs = specs;
        self.slots[id.0].pins = pins.clone();

        debug!("registered {} with {} pins", label, pins.len());

        component.elaborate(self, &pins)?;
        component.power_on(&mut PinIo::new(self, id, label, &pins))?;
        Ok(pins)
    }

    /// Forgets everything created since `mark`, including listeners and
    /// queued units that refer to it.
    fn rollback(&mut self, mark: Mark) {
        self.wires.truncate(mark.wires);
        self.connectors.truncate(mark.connectors);
        self.slots.truncate(mark.slots);
        self.probes.truncate(mark.probes);
        for wire in &mut self.wires {
            wire.retain_listeners(|listener| match *listener {
                Listener::Connector(id) => id.0 < mark.connectors,
                Listener::Component(id) => id.0 < mark.slots,
                Listener::Probe(id) => id.0 < mark.probes,
            });
        }
        self.agenda.retain(|task| match task {
            Task::Apply { wire, .. } => wire.0 < mark.wires,
            Task::React(id) => id.0 < mark.slots,
            Task::Call(_) => true,
        });
    }

    fn slot(&self, id: ComponentId) -> Result<&Slot> {
        self.slots
            .get(id.0)
            .ok_or_else(|| SimError::UnknownComponent(id.to_string()))
    }

    pub fn component_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn component_label(&self, id: ComponentId) -> String {
        self.slots
            .get(id.0)
            .map_or_else(|| id.to_string(), |slot| slot.label.to_string())
    }

    pub fn reaction(&self, component: impl Into<ComponentId>) -> Result<Reaction> {
        Ok(self.slot(component.into())?.reaction)
    }

    pub fn set_reaction(&mut self, component: impl Into<ComponentId>, reaction: Reaction) -> Result<()> {
        let id = component.into();
        self.slot(id)?;
        self.slots[id.0].reaction = reaction;
        Ok(())
    }

    /// Runs or schedules a component's reaction according to its mode.
    pub(crate) fn trigger(&mut self, id: ComponentId) -> Result<()> {
        match self.slot(id)?.reaction {
            Reaction::Immediate => self.react(id),
            Reaction::Deferred => {
                self.agenda.add(Task::React(id));
                Ok(())
            }
        }
    }

    fn react(&mut self, id: ComponentId) -> Result<()> {
        let slot = self
            .slots
            .get_mut(id.0)
            .ok_or_else(|| SimError::UnknownComponent(id.to_string()))?;
        let Some(mut component) = slot.component.take() else {
            slot.pending = true;
            return Ok(());
        };
        let (label, pins) = (slot.label.clone(), slot.pins.clone());

        trace!("react {}", label);
        let result = loop {
            let outcome = component.react(&mut PinIo::new(self, id, &label, &pins));
            if outcome.is_err() || !std::mem::take(&mut self.slots[id.0].pending) {
                break outcome;
            }
        };
        self.slots[id.0].component = Some(component);
        result
    }

    /// Runs `f` against the concrete component behind `handle` with access
    /// to its pins. Used for side channels such as memory programming and
    /// switch operation.
    pub fn operate<T: Component, R>(
        &mut self,
        handle: Handle<T>,
        f: impl FnOnce(&mut T, &mut PinIo<'_>) -> Result<R>,
    ) -> Result<R> {
        let id = handle.id();
        let slot = self
            .slots
            .get_mut(id.0)
            .ok_or_else(|| SimError::UnknownComponent(id.to_string()))?;
        let (label, pins) = (slot.label.clone(), slot.pins.clone());
        let mut component = slot
            .component
            .take()
            .ok_or_else(|| SimError::UnknownComponent(format!("{} is busy", label)))?;

        let result = match <dyn Component as crate::component::AsAny>::as_any_mut(component.as_mut())
            .downcast_mut::<T>()
        {
            Some(typed) => f(typed, &mut PinIo::new(self, id, &label, &pins)),
            None => Err(SimError::UnknownComponent(format!(
                "{} is not a {}",
                label,
                type_name::<T>()
            ))),
        };
        self.slots[id.0].component = Some(component);

        let pending = std::mem::take(&mut self.slots[id.0].pending);
        let value = result?;
        if pending {
            self.react(id)?;
        }
        Ok(value)
    }

    /// Borrows the concrete component behind `handle` for inspection.
    pub fn component<T: Component>(&self, handle: Handle<T>) -> Result<&T> {
        let slot = self.slot(handle.id())?;
        let component = slot
            .component
            .as_ref()
            .ok_or_else(|| SimError::UnknownComponent(format!("{} is busy", slot.label)))?;
        <dyn Component as crate::component::AsAny>::as_any(component.as_ref())
            .downcast_ref::<T>()
            .ok_or_else(|| {
                SimError::UnknownComponent(format!("{} is not a {}", slot.label, type_name::<T>()))
            })
    }


    /// Looks a pin up by name, or by physical number as `PIN<n>`.
    pub fn pin(&self, component: impl Into<ComponentId>, name: &str) -> Result<ConnectorId> {
        let slot = self.slot(component.into())?;
        let position = slot
            .specs
            .iter()
            .position(|spec| spec.name == name)
            .or_else(|| {
                name.strip_prefix("PIN")
                    .and_then(|n| n.parse::<usize>().ok())
                    .and_then(|n| n.checked_sub(1))
            });

        position
            .and_then(|p| slot.pins.get(p).copied().flatten())
            .ok_or_else(|| SimError::unknown_pin(slot.label.to_string(), name))
    }

    /// Pin names in physical order, supply pins included
    pub fn pin_names(&self, component: impl Into<ComponentId>) -> Result<Vec<String>> {
        Ok(self
            .slot(component.into())?
            .specs
            .iter()
            .map(|spec| spec.name.to_string())
            .collect())
    }

    pub fn connect(
        &mut self,
        component: impl Into<ComponentId>,
        pin: &str,
        peer: impl Into<Endpoint>,
    ) -> Result<()> {
        let connector = self.pin(component, pin)?;
        self.connect_connector(connector, peer)
    }

    /// Binds an ordered pin group to an ordered wire sequence.
    pub fn connect_bus(
        &mut self,
        component: impl Into<ComponentId>,
        pins: &[&str],
        wires: &[WireId],
    ) -> Result<()> {
        if wires.len() != pins.len() {
            return Err(SimError::out_of_range("bus width", wires.len(), pins.len()));
        }
        let id = component.into();
        for (pin, wire) in pins.iter().zip(wires) {
            self.connect(id, pin, *wire)?;
        }
        Ok(())
    }

    pub fn connector_signal(&self, id: ConnectorId) -> Result<Signal> {
        self.signal(self.connector(id)?.inner())
    }

    /// Drives an output connector; inputs are sinks and refuse the write.
    pub fn set_connector_signal(&mut self, id: ConnectorId, signal: Signal) -> Result<()> {
        let connector = self.connector(id)?;
        if connector.is_input() {
            return Err(SimError::ConnectionConflict(format!(
                "cannot drive input {}",
                self.describe(id)
            )));
        }
        let inner = connector.inner();
        self.set_signal(inner, signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_unchanged_value_is_a_noop() {
        let mut circuit = Circuit::new();
        let wire = circuit.new_wire();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        circuit
            .watch(wire, move |_, signal| log.borrow_mut().push(signal))
            .unwrap();

        circuit.set_signal(wire, Signal::High).unwrap();
        circuit.set_signal(wire, Signal::High).unwrap();
        assert_eq!(*seen.borrow(), vec![Signal::High]);
    }

    #[test]
    fn test_delayed_signal_waits_for_start() {
        let mut circuit = Circuit::new();
        let wire = circuit.new_wire();

        circuit.set_delayed_signal(wire, Signal::Low).unwrap();
        assert_eq!(circuit.signal(wire).unwrap(), Signal::Undefined);
        assert_eq!(circuit.pending(), 1);

        circuit.start().unwrap();
        assert_eq!(circuit.signal(wire).unwrap(), Signal::Low);
        assert_eq!(circuit.pending(), 0);
    }

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let mut circuit = Circuit::new();
        let wire = circuit.new_wire();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in 0..3 {
            let order = order.clone();
            circuit
                .watch(wire, move |_, _| order.borrow_mut().push(tag))
                .unwrap();
        }

        circuit.set_signal(wire, Signal::Low).unwrap();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_agenda_is_breadth_first() {
        let mut circuit = Circuit::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let (first, second) = (order.clone(), order.clone());
        circuit.delay(move |c| {
            first.borrow_mut().push("a");
            let nested = first.clone();
            c.delay(move |_| {
                nested.borrow_mut().push("c");
                Ok(())
            });
            Ok(())
        });
        circuit.delay(move |_| {
            second.borrow_mut().push("b");
            Ok(())
        });

        circuit.start().unwrap();
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_stop_leaves_remaining_units_queued() {
        let mut circuit = Circuit::new();
        let wire = circuit.new_wire();
        circuit.delay(|c| {
            c.stop();
            Ok(())
        });
        circuit.set_delayed_signal(wire, Signal::High).unwrap();

        circuit.start().unwrap();
        assert_eq!(circuit.pending(), 1);
        assert_eq!(circuit.signal(wire).unwrap(), Signal::Undefined);

        circuit.start().unwrap();
        assert_eq!(circuit.signal(wire).unwrap(), Signal::High);
    }

    #[test]
    fn test_nested_start_is_a_noop() {
        let mut circuit = Circuit::new();
        let wire = circuit.new_wire();
        circuit.delay(move |c| {
            c.set_delayed_signal(wire, Signal::High)?;
            c.start()?;
            assert_eq!(c.signal(wire)?, Signal::Undefined);
            Ok(())
        });

        circuit.start().unwrap();
        assert_eq!(circuit.signal(wire).unwrap(), Signal::High);
    }

    #[test]
    fn test_unknown_wire() {
        let circuit = Circuit::new();
        assert!(matches!(
            circuit.signal(WireId(4)),
            Err(SimError::OutOfRange { .. })
        ));
    }

    // Builds an inverter on its pin, queues a reaction, then refuses to power on.
    struct Faulty;

    impl Component for Faulty {
        fn name(&self) -> &str {
            "FAULTY"
        }

        fn pins(&self) -> Vec<PinSpec> {
            vec![PinSpec::input("A"), PinSpec::output("Y")]
        }

        fn elaborate(&mut self, circuit: &mut Circuit, pins: &[Option<ConnectorId>]) -> Result<()> {
            let a = crate::component::pin_wire(circuit, pins, 0)?;
            let y = crate::component::pin_wire(circuit, pins, 1)?;
            circuit.add_wired(
                crate::components::logic::Inverter::new(),
                &[a.into(), y.into()],
            )?;
            Ok(())
        }

        fn power_on(&mut self, io: &mut PinIo<'_>) -> Result<()> {
            io.schedule()?;
            Err(SimError::Config("refusing to power on".to_string()))
        }
    }

    #[test]
    fn test_failed_registration_leaves_no_trace() {
        let mut circuit = Circuit::new();
        let input = circuit.new_wire();

        assert!(matches!(
            circuit.add_wired(Faulty, &[input.into()]),
            Err(SimError::Config(_))
        ));
        assert_eq!(circuit.component_count(), 0);
        assert_eq!(circuit.connectors.len(), 0);
        assert_eq!(circuit.wires.len(), 1);
        assert_eq!(circuit.pending(), 0);
        assert!(circuit.wire(input).unwrap().listeners().is_empty());

        let output = circuit.new_wire();
        let gate = circuit
            .add_wired(
                crate::components::logic::Inverter::new(),
                &[input.into(), output.into()],
            )
            .unwrap();
        assert_eq!(gate.id(), ComponentId(0));
        circuit.set_signal(input, Signal::Low).unwrap();
        circuit.start().unwrap();
        assert_eq!(circuit.signal(output).unwrap(), Signal::High);
    }
}
