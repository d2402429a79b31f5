use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::{interval, MissedTickBehavior};

use crate::circuit::Circuit;
use crate::component::{Component, PinIo, PinSpec};
use crate::error::{Result, SimError};
use crate::signal::Signal;
use crate::types::Handle;

/// Callback run after every half-period; `Break` halts a free-running clock.
pub type ClockListener = Box<dyn FnMut(&Circuit, Signal) -> ControlFlow<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockListenerId(usize);

/// Stops a free-running clock from outside the task driving it.
#[derive(Debug, Clone)]
pub struct ClockStopper {
    running: Arc<AtomicBool>,
}

impl ClockStopper {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Square-wave source with a single output `CK`.
///
/// The level starts at 1 without being driven, so the first `next` drives
/// `CK` low and the second one produces the first rising edge.
pub struct Clock {
    signal: Signal,
    hz: f64,
    running: Arc<AtomicBool>,
    listeners: Vec<(ClockListenerId, ClockListener)>,
    next_listener: usize,
}

impl Clock {
    pub const CK: usize = 0;

    pub fn new() -> Self {
        Clock::with_hz(1.0)
    }

    pub fn with_hz(hz: f64) -> Self {
        Clock {
            signal: Signal::High,
            hz,
            running: Arc::new(AtomicBool::new(false)),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn hz(&self) -> f64 {
        self.hz
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn half_period(&self) -> Result<Duration> {
        Clock::period_for(self.hz)
    }

    /// Half-period for `hz`; the frequency must be positive and its period
    /// representable as a `Duration`.
    fn period_for(hz: f64) -> Result<Duration> {
        if !(hz.is_finite() && hz > 0.0) {
            return Err(SimError::Config(format!("clock frequency must be positive, got {}", hz)));
        }
        Duration::try_from_secs_f64(0.5 / hz).map_err(|err| {
            SimError::Config(format!("clock frequency {} Hz is out of range: {}", hz, err))
        })
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::new()
    }
}

impl Component for Clock {
    fn name(&self) -> &str {
        "CLOCK"
    }

    fn pins(&self) -> Vec<PinSpec> {
        vec![PinSpec::output("CK")]
    }

    fn power_on(&mut self, _io: &mut PinIo<'_>) -> Result<()> {
        self.half_period().map(|_| ())
    }
}

impl Handle<Clock> {
    /// Advances one half-period: toggles `CK`, settles the circuit, then
    /// notifies clock listeners in registration order.
    pub fn next(&self, circuit: &mut Circuit) -> Result<()> {
        let signal = circuit.operate(*self, |clock, io| {
            clock.signal = clock.signal.not();
            io.set(Clock::CK, clock.signal)?;
            Ok(clock.signal)
        })?;
        circuit.start()?;

        let mut listeners =
            circuit.operate(*self, |clock, _| Ok(std::mem::take(&mut clock.listeners)))?;
        let mut halted = false;
        for (_, listener) in listeners.iter_mut() {
            if listener(&*circuit, signal).is_break() {
                halted = true;
            }
        }
        circuit.operate(*self, |clock, io| {
            clock.listeners = listeners;
            if halted && clock.is_running() {
                warn!("{} halted by clock listener", io.label());
                clock.running.store(false, Ordering::SeqCst);
            }
            Ok(())
        })
    }

    /// Runs the clock at `hz` on the current tokio runtime until it is
    /// stopped by `stop`, a `ClockStopper` or a listener returning `Break`.
    ///
    /// Returns immediately when the clock is already running.
    pub async fn start(&self, circuit: &mut Circuit, hz: f64) -> Result<()> {
        self.set_hz(circuit, hz)?;
        let running = circuit.component(*self)?.running.clone();
        if running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!("clock {} started at {} Hz", self.id(), hz);

        let result = self.run(circuit, &running).await;
        running.store(false, Ordering::SeqCst);
        debug!("clock {} stopped", self.id());
        result
    }

    async fn run(&self, circuit: &mut Circuit, running: &AtomicBool) -> Result<()> {
        let mut period = self.half_period(circuit)?;
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick of a fresh interval completes immediately
        ticker.tick().await;

        while running.load(Ordering::SeqCst) {
            ticker.tick().await;
            if !running.load(Ordering::SeqCst) {
                break;
            }
            self.next(circuit)?;

            let current = self.half_period(circuit)?;
            if current != period {
                period = current;
                ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker.tick().await;
            }
        }
        Ok(())
    }

    pub fn stop(&self, circuit: &Circuit) -> Result<()> {
        circuit.component(*self)?.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    pub fn stopper(&self, circuit: &Circuit) -> Result<ClockStopper> {
        Ok(ClockStopper {
            running: circuit.component(*self)?.running.clone(),
        })
    }

    /// Changes the frequency; a running clock picks it up after its next
    /// half-period.
    pub fn set_hz(&self, circuit: &mut Circuit, hz: f64) -> Result<()> {
        Clock::period_for(hz)?;
        circuit.operate(*self, |clock, _| {
            clock.hz = hz;
            Ok(())
        })
    }

    pub fn is_running(&self, circuit: &Circuit) -> Result<bool> {
        Ok(circuit.component(*self)?.is_running())
    }

    pub fn half_period(&self, circuit: &Circuit) -> Result<Duration> {
        circuit.component(*self)?.half_period()
    }

    pub fn add_clock_listener(
        &self,
        circuit: &mut Circuit,
        listener: impl FnMut(&Circuit, Signal) -> ControlFlow<()> + 'static,
    ) -> Result<ClockListenerId> {
        circuit.operate(*self, |clock, _| {
            let id = ClockListenerId(clock.next_listener);
            clock.next_listener += 1;
            clock.listeners.push((id, Box::new(listener)));
            Ok(id)
        })
    }

    pub fn remove_clock_listener(&self, circuit: &mut Circuit, id: ClockListenerId) -> Result<()> {
        circuit.operate(*self, |clock, io| {
            let position = clock
                .listeners
                .iter()
                .position(|(registered, _)| *registered == id)
                .ok_or_else(|| {
                    SimError::ListenerConflict(format!(
                        "clock listener {} is not registered on {}",
                        id.0,
                        io.label()
                    ))
                })?;
            clock.listeners.remove(position);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_first_next_drives_low() {
        let mut circuit = Circuit::new();
        let ck = circuit.new_wire();
        let clock = circuit.add(Clock::new()).unwrap();
        circuit.connect(clock, "CK", ck).unwrap();
        assert_eq!(circuit.signal(ck).unwrap(), Signal::Undefined);

        clock.next(&mut circuit).unwrap();
        assert_eq!(circuit.signal(ck).unwrap(), Signal::Low);
        clock.next(&mut circuit).unwrap();
        assert_eq!(circuit.signal(ck).unwrap(), Signal::High);
    }

    #[test]
    fn test_listeners_see_each_half_period() {
        let mut circuit = Circuit::new();
        let clock = circuit.add(Clock::new()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let id = clock
            .add_clock_listener(&mut circuit, move |_, signal| {
                log.borrow_mut().push(signal);
                ControlFlow::Continue(())
            })
            .unwrap();

        clock.next(&mut circuit).unwrap();
        clock.next(&mut circuit).unwrap();
        assert_eq!(*seen.borrow(), vec![Signal::Low, Signal::High]);

        clock.remove_clock_listener(&mut circuit, id).unwrap();
        clock.next(&mut circuit).unwrap();
        assert_eq!(seen.borrow().len(), 2);
        assert!(matches!(
            clock.remove_clock_listener(&mut circuit, id),
            Err(SimError::ListenerConflict(_))
        ));
    }

    #[test]
    fn test_frequency_validation() {
        let mut circuit = Circuit::new();
        let clock = circuit.add(Clock::new()).unwrap();
        clock.set_hz(&mut circuit, 50.0).unwrap();
        assert_eq!(clock.half_period(&circuit).unwrap(), Duration::from_millis(10));
        assert!(matches!(clock.set_hz(&mut circuit, 0.0), Err(SimError::Config(_))));
        assert!(!clock.is_running(&circuit).unwrap());
    }

    #[test]
    fn test_extreme_frequencies_are_rejected() {
        let mut circuit = Circuit::new();
        let clock = circuit.add(Clock::new()).unwrap();
        assert!(matches!(clock.set_hz(&mut circuit, 1e-20), Err(SimError::Config(_))));
        assert!(matches!(clock.set_hz(&mut circuit, f64::NAN), Err(SimError::Config(_))));
        assert_eq!(clock.half_period(&circuit).unwrap(), Duration::from_millis(500));

        assert!(matches!(Clock::with_hz(0.0).half_period(), Err(SimError::Config(_))));
        assert!(matches!(
            circuit.add(Clock::with_hz(1e-20)),
            Err(SimError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_listener_break_stops_free_running_clock() {
        let mut circuit = Circuit::new();
        let clock = circuit.add(Clock::new()).unwrap();
        let count = Rc::new(RefCell::new(0));
        let ticks = count.clone();
        clock
            .add_clock_listener(&mut circuit, move |_, _| {
                *ticks.borrow_mut() += 1;
                if *ticks.borrow() == 6 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();

        clock.start(&mut circuit, 1000.0).await.unwrap();
        assert_eq!(*count.borrow(), 6);
        assert!(!clock.is_running(&circuit).unwrap());
        assert_eq!(circuit.component(clock).unwrap().signal(), Signal::High);
    }
}
