use crate::error::{Result, SimError};
use crate::signal::Signal;
use crate::types::{ComponentId, ConnectorId, ProbeId};
use std::fmt;

/// Something notified when a wire changes value.
///
/// Listeners are plain indices into the circuit arena, so a wire never
/// owns the connector or component it notifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    /// Connector copying the value across its inner/outer boundary
    Connector(ConnectorId),
    /// Component whose reaction runs when one of its inputs changes
    Component(ComponentId),
    /// External observer (LED lamp, trace recorder, test counter)
    Probe(ProbeId),
}

impl fmt::Display for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listener::Connector(id) => write!(f, "connector {}", id.index()),
            Listener::Component(id) => write!(f, "component {}", id),
            Listener::Probe(id) => write!(f, "probe {}", id.0),
        }
    }
}

/// Signal carrier with an ordered, duplicate-free listener list.
#[derive(Debug, Clone)]
pub struct Wire {
    name: String,
    signal: Signal,
    listeners: Vec<Listener>,
}

impl Wire {
    pub fn new(name: String) -> Self {
        Wire {
            name,
            signal: Signal::Undefined,
            listeners: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub(crate) fn apply(&mut self, signal: Signal) {
        self.signal = signal;
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn add_listener(&mut self, listener: Listener) -> Result<()> {
        if self.listeners.contains(&listener) {
            return Err(SimError::ListenerConflict(format!(
                "{} already listens on {}",
                listener, self.name
            )));
        }
        self.listeners.push(listener);
        Ok(())
    }

    pub fn remove_listener(&mut self, listener: Listener) -> Result<()> {
        let position = self
            .listeners
            .iter()
            .position(|l| *l == listener)
            .ok_or_else(|| {
                SimError::ListenerConflict(format!(
                    "{} does not listen on {}",
                    listener, self.name
                ))
            })?;
        self.listeners.remove(position);
        Ok(())
    }

    pub(crate) fn retain_listeners(&mut self, keep: impl FnMut(&Listener) -> bool) {
        self.listeners.retain(keep);
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.signal)?;
        if !self.listeners.is_empty() {
            write!(f, " [{} listeners]", self.listeners.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_creation() {
        let wire = Wire::new("W".to_string());
        assert_eq!(wire.name(), "W");
        assert_eq!(wire.signal(), Signal::Undefined);
        assert!(wire.listeners().is_empty());
    }

    #[test]
    fn test_listener_order_and_duplicates() {
        let mut wire = Wire::new("W".to_string());
        let first = Listener::Component(ComponentId(2));
        let second = Listener::Connector(ConnectorId(0));

        wire.add_listener(first).unwrap();
        wire.add_listener(second).unwrap();
        assert_eq!(wire.listeners(), &[first, second]);

        assert!(matches!(
            wire.add_listener(first),
            Err(SimError::ListenerConflict(_))
        ));
    }

    #[test]
    fn test_remove_missing_listener() {
        let mut wire = Wire::new("W".to_string());
        let probe = Listener::Probe(ProbeId(0));

        assert!(matches!(
            wire.remove_listener(probe),
            Err(SimError::ListenerConflict(_))
        ));

        wire.add_listener(probe).unwrap();
        wire.remove_listener(probe).unwrap();
        assert!(wire.listeners().is_empty());
    }
}
