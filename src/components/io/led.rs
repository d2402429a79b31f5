use crate::circuit::Circuit;
use crate::component::{Component, PinSpec};
use crate::error::Result;
use crate::signal::Signal;
use crate::types::Handle;

/// Indicator lamp on input `A`; lit only while `A` is 1.
#[derive(Debug, Default)]
pub struct Led;

impl Led {
    pub const A: usize = 0;

    pub fn new() -> Self {
        Led
    }
}

impl Component for Led {
    fn name(&self) -> &str {
        "LED"
    }

    fn pins(&self) -> Vec<PinSpec> {
        vec![PinSpec::input("A")]
    }
}

impl Handle<Led> {
    pub fn level(&self, circuit: &Circuit) -> Result<Signal> {
        let pin = circuit.pin(*self, "A")?;
        circuit.connector_signal(pin)
    }

    pub fn is_lit(&self, circuit: &Circuit) -> Result<bool> {
        Ok(self.level(circuit)? == Signal::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_follows_input() {
        let mut circuit = Circuit::new();
        let a = circuit.new_wire();
        let led = circuit.add_wired(Led::new(), &[a.into()]).unwrap();
        assert!(!led.is_lit(&circuit).unwrap());

        circuit.set_signal(a, Signal::High).unwrap();
        assert!(led.is_lit(&circuit).unwrap());
        circuit.set_signal(a, Signal::Undefined).unwrap();
        assert_eq!(led.level(&circuit).unwrap(), Signal::Undefined);
        assert!(!led.is_lit(&circuit).unwrap());
    }
}
