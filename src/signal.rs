use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ternary logic level carried by every wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Option<u8>", try_from = "Option<u8>")]
pub enum Signal {
    Low,
    High,
    #[default]
    Undefined,
}

impl Signal {
    pub fn to_str(&self) -> &'static str {
        match self {
            Signal::Low => "Low",
            Signal::High => "High",
            Signal::Undefined => "Undefined",
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Signal::Low => '0',
            Signal::High => '1',
            Signal::Undefined => 'X',
        }
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            Signal::High
        } else {
            Signal::Low
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Signal::Low => Some(false),
            Signal::High => Some(true),
            Signal::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        *self != Signal::Undefined
    }

    /// Bit `index` of `value` as a defined signal
    pub fn bit(value: u32, index: usize) -> Self {
        let shifted = u32::try_from(index).ok().and_then(|i| value.checked_shr(i));
        Signal::from_bool(shifted.map_or(false, |v| v & 1 == 1))
    }

    pub fn not(self) -> Self {
        match self {
            Signal::Low => Signal::High,
            Signal::High => Signal::Low,
            Signal::Undefined => Signal::Undefined,
        }
    }

    // No short circuit: Low AND Undefined is still Undefined.
    pub fn and(self, other: Signal) -> Self {
        match (self.to_bool(), other.to_bool()) {
            (Some(a), Some(b)) => Signal::from_bool(a && b),
            _ => Signal::Undefined,
        }
    }

    pub fn or(self, other: Signal) -> Self {
        match (self.to_bool(), other.to_bool()) {
            (Some(a), Some(b)) => Signal::from_bool(a || b),
            _ => Signal::Undefined,
        }
    }

    pub fn nand(self, other: Signal) -> Self {
        self.and(other).not()
    }

    pub fn nand3(self, b: Signal, c: Signal) -> Self {
        match (self.to_bool(), b.to_bool(), c.to_bool()) {
            (Some(a), Some(b), Some(c)) => Signal::from_bool(!(a && b && c)),
            _ => Signal::Undefined,
        }
    }
}

/// Packs signals (least significant first) into an integer, `None` if any
/// bit is undefined or a high bit does not fit in 32 bits.
pub fn pack(signals: &[Signal]) -> Option<u32> {
    signals.iter().enumerate().try_fold(0u32, |acc, (i, s)| match s.to_bool()? {
        false => Some(acc),
        true => u32::try_from(i)
            .ok()
            .and_then(|i| 1u32.checked_shl(i))
            .map(|mask| acc | mask),
    })
}

impl std::ops::Not for Signal {
    type Output = Signal;

    fn not(self) -> Signal {
        Signal::not(self)
    }
}

impl From<bool> for Signal {
    fn from(value: bool) -> Self {
        Signal::from_bool(value)
    }
}

impl From<Option<bool>> for Signal {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Signal::Undefined, Signal::from_bool)
    }
}

impl From<Signal> for Option<u8> {
    fn from(signal: Signal) -> Self {
        signal.to_bool().map(u8::from)
    }
}

impl TryFrom<u8> for Signal {
    type Error = SimError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Signal::Low),
            1 => Ok(Signal::High),
            other => Err(SimError::InvalidSignal(other.to_string())),
        }
    }
}

impl TryFrom<i64> for Signal {
    type Error = SimError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Signal::Low),
            1 => Ok(Signal::High),
            other => Err(SimError::InvalidSignal(other.to_string())),
        }
    }
}

impl TryFrom<Option<u8>> for Signal {
    type Error = SimError;

    fn try_from(value: Option<u8>) -> Result<Self, Self::Error> {
        value.map_or(Ok(Signal::Undefined), Signal::try_from)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
