use thiserror::Error;

/// Errors raised while building or driving a circuit.
///
/// All of these are construction or stimulus mistakes: they surface at the
/// point of violation and nothing already applied is rolled back.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    #[error("connection conflict: {0}")]
    ConnectionConflict(String),

    #[error("{component} has no pin named {pin}")]
    UnknownPin { component: String, pin: String },

    #[error("{what}: index {index} out of range (limit {limit})")]
    OutOfRange {
        what: String,
        index: usize,
        limit: usize,
    },

    #[error("listener conflict: {0}")]
    ListenerConflict(String),

    #[error("unknown component {0}")]
    UnknownComponent(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn out_of_range(what: impl Into<String>, index: usize, limit: usize) -> Self {
        SimError::OutOfRange {
            what: what.into(),
            index,
            limit,
        }
    }

    pub(crate) fn unknown_pin(component: impl Into<String>, pin: impl Into<String>) -> Self {
        SimError::UnknownPin {
            component: component.into(),
            pin: pin.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
