//! Connector negotiation.
//!
//! Every connector owns an inner wire seen by its component. Binding gives it
//! an outer wire shared with the rest of the net. Inputs copy outer to inner,
//! outputs copy inner to outer.

use crate::circuit::Circuit;
use crate::error::{Result, SimError};
use crate::types::{ComponentId, ConnectorId, WireId};
use crate::wire::Listener;
use log::debug;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// Directional terminal owned by exactly one component.
#[derive(Debug, Clone)]
pub struct Connector {
    name: String,
    owner: ComponentId,
    direction: Direction,
    inner: WireId,
    outer: Option<WireId>,
}

impl Connector {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> ComponentId {
        self.owner
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }

    pub fn inner(&self) -> WireId {
        self.inner
    }

    pub fn outer(&self) -> Option<WireId> {
        self.outer
    }
}

/// The far side of a connection: a bare wire or another connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Wire(WireId),
    Connector(ConnectorId),
}

impl From<WireId> for Endpoint {
    fn from(wire: WireId) -> Self {
        Endpoint::Wire(wire)
    }
}

impl From<ConnectorId> for Endpoint {
    fn from(connector: ConnectorId) -> Self {
        Endpoint::Connector(connector)
    }
}

impl Circuit {
    /// Creates a connector with a fresh inner wire.
    ///
    /// Outputs listen on their own inner wire so component writes are pushed
    /// outward; inputs notify their owner when the inner wire changes.
    pub(crate) fn create_connector(
        &mut self,
        owner: ComponentId,
        name: &str,
        direction: Direction,
    ) -> Result<ConnectorId> {
        let id = ConnectorId(self.connectors.len());
        let inner = self.named_wire(format!("{}.{}", owner, name));
        self.connectors.push(Connector {
            name: name.to_string(),
            owner,
            direction,
            inner,
            outer: None,
        });

        let listener = match direction {
            Direction::Output => Listener::Connector(id),
            Direction::Input => Listener::Component(owner),
        };
        self.wire_mut(inner)?.add_listener(listener)?;
        Ok(id)
    }

    pub fn connector(&self, id: ConnectorId) -> Result<&Connector> {
        self.connectors
            .get(id.0)
            .ok_or_else(|| SimError::out_of_range("connector", id.0, self.connectors.len()))
    }

    pub fn inner_wire(&self, id: ConnectorId) -> Result<WireId> {
        Ok(self.connector(id)?.inner)
    }

    pub fn outer_wire(&self, id: ConnectorId) -> Result<Option<WireId>> {
        Ok(self.connector(id)?.outer)
    }

    /// Binds a connector to a wire or negotiates a shared wire with a peer.
    pub fn connect_connector(&mut self, id: ConnectorId, peer: impl Into<Endpoint>) -> Result<()> {
        let wire = match peer.into() {
            Endpoint::Wire(wire) => {
                self.wire(wire)?;
                if self.connector(id)?.outer.is_some() {
                    return Err(SimError::ConnectionConflict(format!(
                        "connector {} is already bound",
                        self.describe(id)
                    )));
                }
                wire
            }
            Endpoint::Connector(other) => {
                let (me, peer) = (self.connector(id)?, self.connector(other)?);
                if me.is_output() && peer.is_output() {
                    return Err(SimError::ConnectionConflict(format!(
                        "output {} <=> output {}",
                        self.describe(id),
                        self.describe(other)
                    )));
                }
                if me.is_input() && peer.is_input() {
                    return Err(SimError::ConnectionConflict(format!(
                        "input {} <=> input {}",
                        self.describe(id),
                        self.describe(other)
                    )));
                }

                match (me.outer, peer.outer) {
                    (Some(_), None) => return self.connect_connector(other, id),
                    (None, Some(wire)) => wire,
                    (None, None) => {
                        let wire = self.named_wire(format!(
                            "{}~{}",
                            self.describe(id),
                            self.describe(other)
                        ));
                        debug!("synthesized {} for {}", wire, self.describe(id));
                        self.connect_connector(other, wire)?;
                        wire
                    }
                    (Some(_), Some(_)) => {
                        return Err(SimError::ConnectionConflict(format!(
                            "{} and {} are both wired already",
                            self.describe(id),
                            self.describe(other)
                        )))
                    }
                }
            }
        };

        self.bind(id, wire)
    }

    fn bind(&mut self, id: ConnectorId, wire: WireId) -> Result<()> {
        let connector = &mut self.connectors[id.0];
        connector.outer = Some(wire);
        let is_input = connector.is_input();

        debug!("bound {} to {}", self.describe(id), wire);

        if is_input {
            self.wire_mut(wire)?.add_listener(Listener::Connector(id))?;
        }
        self.connector_action(id)
    }

    /// Copies the signal across the connector in its fixed direction.
    pub(crate) fn connector_action(&mut self, id: ConnectorId) -> Result<()> {
        let connector = self.connector(id)?;
        let Some(outer) = connector.outer else {
            return Ok(());
        };
        let (inner, direction) = (connector.inner, connector.direction);
        let (inner_signal, outer_signal) = (self.signal(inner)?, self.signal(outer)?);
        if inner_signal == outer_signal {
            return Ok(());
        }

        match direction {
            Direction::Input => self.set_signal(inner, outer_signal),
            Direction::Output => self.set_signal(outer, inner_signal),
        }
    }

    pub(crate) fn describe(&self, id: ConnectorId) -> String {
        match self.connectors.get(id.0) {
            Some(connector) => {
                let owner = self.component_label(connector.owner);
                format!("{}.{}", owner, connector.name)
            }
            None => format!("connector {}", id.0),
        }
    }
}
