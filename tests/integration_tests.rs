//! Integration Tests
//!
//! Whole-circuit scenarios built only through the public construction
//! surface: pins, connect/bus helpers and the agenda.

use rusty_logic::components::{
    AndGate, Clock, FullAdder, Ic74hc153, Ic74hc161, Ic74hc283, Inverter, Memory, OrGate,
};
use rusty_logic::{Circuit, Direction, Listener, Reaction, SimConfig, SimError, Signal};
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_and_gate_scenario() {
        let mut circuit = Circuit::new();
        let and = circuit.add(AndGate::new()).unwrap();
        let (a, b, y) = (circuit.new_wire(), circuit.new_wire(), circuit.new_wire());
        circuit.connect(and, "A", a).unwrap();
        circuit.connect(and, "B", b).unwrap();
        circuit.connect(and, "Y", y).unwrap();

        circuit.set_signal(a, Signal::High).unwrap();
        circuit.set_signal(b, Signal::High).unwrap();
        circuit.start().unwrap();
        assert_eq!(circuit.signal(y).unwrap(), Signal::High);

        circuit.set_signal(b, Signal::Low).unwrap();
        assert_eq!(circuit.signal(y).unwrap(), Signal::Low);
    }

    #[test]
    fn test_four_bit_adder_exhaustive() {
        let mut circuit = Circuit::new();
        let adder = circuit.add(Ic74hc283::new()).unwrap();
        let (a, b, s) = (circuit.bus(4), circuit.bus(4), circuit.bus(4));
        let (c0, c4) = (circuit.new_wire(), circuit.new_wire());
        adder.connect_a(&mut circuit, &a).unwrap();
        adder.connect_b(&mut circuit, &b).unwrap();
        adder.connect_s(&mut circuit, &s).unwrap();
        circuit.connect(adder, "C0", c0).unwrap();
        circuit.connect(adder, "C4", c4).unwrap();

        for x in 0..16u32 {
            for y in 0..16u32 {
                for c in 0..2u32 {
                    a.set_value(&mut circuit, x).unwrap();
                    b.set_value(&mut circuit, y).unwrap();
                    circuit.set_signal(c0, Signal::bit(c, 0)).unwrap();
                    circuit.start().unwrap();

                    let total = x + y + c;
                    assert_eq!(s.value(&circuit).unwrap(), Some(total % 16), "{} + {} + {}", x, y, c);
                    assert_eq!(
                        circuit.signal(c4).unwrap(),
                        Signal::from_bool(total >= 16),
                        "{} + {} + {}",
                        x,
                        y,
                        c
                    );
                }
            }
        }
    }

    #[test]
    fn test_memory_scenario() {
        let mut circuit = Circuit::new();
        let rom = circuit.add(Memory::new(4, 8)).unwrap();
        let (addr, data) = (circuit.bus(4), circuit.bus(8));
        rom.connect_addr_bus(&mut circuit, &addr).unwrap();
        rom.connect_data_bus(&mut circuit, &data).unwrap();

        rom.store(&mut circuit, 10, 255).unwrap();
        addr.set_value(&mut circuit, 10).unwrap();
        circuit.start().unwrap();
        assert_eq!(data.value(&circuit).unwrap(), Some(255));
    }

    #[test]
    fn test_counter_driven_by_clock() {
        let mut circuit = Circuit::new();
        let clock = circuit.add(Clock::new()).unwrap();
        let counter = circuit.add(Ic74hc161::new()).unwrap();
        let high = circuit.named_wire("VCC");
        circuit.set_signal(high, Signal::High).unwrap();

        let ck_out = circuit.pin(clock, "CK").unwrap();
        let ck_in = circuit.pin(counter, "CK").unwrap();
        circuit.connect_connector(ck_in, ck_out).unwrap();
        for pin in ["CLR_B", "LD_B", "ENP", "ENT"] {
            circuit.connect(counter, pin, high).unwrap();
        }
        let (q, co) = (circuit.bus(4), circuit.new_wire());
        counter.connect_output(&mut circuit, &q).unwrap();
        circuit.connect(counter, "CO", co).unwrap();
        circuit.start().unwrap();

        let mut carries = 0;
        for edge in 1..=16u32 {
            clock.next(&mut circuit).unwrap();
            clock.next(&mut circuit).unwrap();
            assert_eq!(q.value(&circuit).unwrap(), Some(edge % 16));
            if circuit.signal(co).unwrap() == Signal::High {
                carries += 1;
            }
        }
        assert_eq!(carries, 1);
        assert_eq!(circuit.signal(co).unwrap(), Signal::High);
    }

    #[test]
    fn test_mux_keeps_stale_output_while_gates_propagate_undefined() {
        let mut circuit = Circuit::new();
        let mux = circuit.add(Ic74hc153::new()).unwrap();
        let not = circuit.add(Inverter::new()).unwrap();
        let [a, b, g1, y1, not_y] = [0; 5].map(|_| circuit.new_wire());
        for (pin, wire) in [("A", a), ("B", b), ("G_1_B", g1), ("Y_1", y1)] {
            circuit.connect(mux, pin, wire).unwrap();
        }
        circuit.connect(not, "A", a).unwrap();
        circuit.connect(not, "Y", not_y).unwrap();
        let c1 = circuit.bus(4);
        mux.connect_c1(&mut circuit, &c1).unwrap();

        c1.set_value(&mut circuit, 0b0010).unwrap();
        for (wire, signal) in [(g1, Signal::Low), (a, Signal::High), (b, Signal::Low)] {
            circuit.set_signal(wire, signal).unwrap();
        }
        circuit.start().unwrap();
        assert_eq!(circuit.signal(y1).unwrap(), Signal::High);

        circuit.set_signal(a, Signal::Undefined).unwrap();
        circuit.start().unwrap();
        assert_eq!(circuit.signal(y1).unwrap(), Signal::High);
        assert_eq!(circuit.signal(not_y).unwrap(), Signal::Undefined);
    }
}

#[cfg(test)]
mod negotiation_tests {
    use super::*;

    #[test]
    fn test_output_to_input_synthesizes_shared_wire() {
        for forward in [true, false] {
            let mut circuit = Circuit::new();
            let driver = circuit.add(Inverter::new()).unwrap();
            let sink = circuit.add(Inverter::new()).unwrap();
            let out = circuit.pin(driver, "Y").unwrap();
            let inp = circuit.pin(sink, "A").unwrap();
            assert_eq!(circuit.connector(out).unwrap().direction(), Direction::Output);

            if forward {
                circuit.connect_connector(out, inp).unwrap();
            } else {
                circuit.connect_connector(inp, out).unwrap();
            }

            let shared = circuit.outer_wire(out).unwrap().unwrap();
            assert_eq!(circuit.outer_wire(inp).unwrap(), Some(shared));
            assert_eq!(circuit.listeners(shared).unwrap(), &[Listener::Connector(inp)]);
        }
    }

    #[test]
    fn test_unbound_side_adopts_existing_wire() {
        let mut circuit = Circuit::new();
        let driver = circuit.add(Inverter::new()).unwrap();
        let sink = circuit.add(Inverter::new()).unwrap();
        let net = circuit.new_wire();
        circuit.connect(sink, "A", net).unwrap();

        let out = circuit.pin(driver, "Y").unwrap();
        let inp = circuit.pin(sink, "A").unwrap();
        circuit.connect_connector(inp, out).unwrap();
        assert_eq!(circuit.outer_wire(out).unwrap(), Some(net));

        let input = circuit.new_wire();
        circuit.connect(driver, "A", input).unwrap();
        circuit.set_signal(input, Signal::Low).unwrap();
        assert_eq!(circuit.signal(net).unwrap(), Signal::High);
    }

    #[test]
    fn test_conflicting_connections() {
        let mut circuit = Circuit::new();
        let first = circuit.add(OrGate::new()).unwrap();
        let second = circuit.add(OrGate::new()).unwrap();

        let (y1, y2) = (circuit.pin(first, "Y").unwrap(), circuit.pin(second, "Y").unwrap());
        assert!(matches!(
            circuit.connect_connector(y1, y2),
            Err(SimError::ConnectionConflict(_))
        ));

        let (a1, a2) = (circuit.pin(first, "A").unwrap(), circuit.pin(second, "A").unwrap());
        assert!(matches!(
            circuit.connect_connector(a1, a2),
            Err(SimError::ConnectionConflict(_))
        ));

        let (w1, w2) = (circuit.new_wire(), circuit.new_wire());
        circuit.connect_connector(y1, w1).unwrap();
        assert!(matches!(
            circuit.connect_connector(y1, w2),
            Err(SimError::ConnectionConflict(_))
        ));

        let b2 = circuit.pin(second, "B").unwrap();
        circuit.connect_connector(b2, w2).unwrap();
        assert!(matches!(
            circuit.connect_connector(y1, b2),
            Err(SimError::ConnectionConflict(_))
        ));
    }

    #[test]
    fn test_unknown_pin_and_input_write() {
        let mut circuit = Circuit::new();
        let and = circuit.add(AndGate::new()).unwrap();
        let wire = circuit.new_wire();
        assert!(matches!(
            circuit.connect(and, "Q", wire),
            Err(SimError::UnknownPin { .. })
        ));

        let a = circuit.pin(and, "A").unwrap();
        assert!(matches!(
            circuit.set_connector_signal(a, Signal::High),
            Err(SimError::ConnectionConflict(_))
        ));
    }

    #[test]
    fn test_bind_propagates_current_value() {
        let mut circuit = Circuit::new();
        let not = circuit.add(Inverter::new()).unwrap();
        let (a, y) = (circuit.new_wire(), circuit.new_wire());
        circuit.set_signal(a, Signal::Low).unwrap();

        circuit.connect(not, "A", a).unwrap();
        circuit.connect(not, "Y", y).unwrap();
        assert_eq!(circuit.signal(y).unwrap(), Signal::High);
    }
}

#[cfg(test)]
mod scheduling_tests {
    use super::*;

    #[test]
    fn test_deferred_gates_settle_on_start() {
        let config = SimConfig {
            gate_reaction: Reaction::Deferred,
            ..SimConfig::default()
        };
        let mut circuit = Circuit::with_config(config);
        let [a, b, c_in, s, c_out] = [0; 5].map(|_| circuit.new_wire());
        let adder = circuit
            .add_wired(
                FullAdder::new(),
                &[a.into(), b.into(), c_in.into(), s.into(), c_out.into()],
            )
            .unwrap();
        assert_eq!(circuit.reaction(adder).unwrap(), Reaction::Deferred);

        for wire in [a, b, c_in] {
            circuit.set_signal(wire, Signal::High).unwrap();
        }
        assert_eq!(circuit.signal(s).unwrap(), Signal::Undefined);
        circuit.start().unwrap();
        assert_eq!(circuit.signal(s).unwrap(), Signal::High);
        assert_eq!(circuit.signal(c_out).unwrap(), Signal::High);
    }

    #[test]
    fn test_per_instance_reaction_override() {
        let mut circuit = Circuit::new();
        let (a, y) = (circuit.new_wire(), circuit.new_wire());
        let not = circuit.add_wired(Inverter::new(), &[a.into(), y.into()]).unwrap();
        assert_eq!(circuit.reaction(not).unwrap(), Reaction::Immediate);

        circuit.set_reaction(not, Reaction::Deferred).unwrap();
        circuit.set_signal(a, Signal::High).unwrap();
        assert_eq!(circuit.signal(y).unwrap(), Signal::Undefined);
        assert_eq!(circuit.pending(), 1);
        circuit.start().unwrap();
        assert_eq!(circuit.signal(y).unwrap(), Signal::Low);
    }

    fn watchdog(remaining: usize, circuit: &mut Circuit) -> rusty_logic::Result<()> {
        if remaining == 0 {
            circuit.stop();
        } else {
            circuit.delay(move |c| watchdog(remaining - 1, c));
        }
        Ok(())
    }

    #[test]
    fn test_oscillator_is_bounded_only_by_stop() {
        let mut circuit = Circuit::with_config(SimConfig {
            gate_reaction: Reaction::Deferred,
            ..SimConfig::default()
        });
        let ring = circuit.new_wire();
        circuit.add_wired(Inverter::new(), &[ring.into(), ring.into()]).unwrap();

        let toggles = Rc::new(RefCell::new(0));
        let seen = toggles.clone();
        circuit.watch(ring, move |_, _| *seen.borrow_mut() += 1).unwrap();

        circuit.set_signal(ring, Signal::Low).unwrap();
        circuit.delay(|c| watchdog(10, c));
        circuit.start().unwrap();

        assert!(!circuit.is_running());
        assert!(circuit.pending() > 0);
        assert!(*toggles.borrow() >= 10);
    }
}
