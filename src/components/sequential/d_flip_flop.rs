use crate::component::{Component, PinIo, PinSpec};
use crate::error::Result;
use crate::signal::Signal;

/// Edge-triggered D flip-flop with asynchronous active-low clear and preset.
///
/// Priority on every evaluation: `CLR_B`, then `PR_B`, then a rising `CK`
/// edge latching `D`. The previous clock sample is refreshed on every
/// evaluation whichever branch fired.
#[derive(Debug)]
pub struct DFlipFlop {
    prev_ck: Signal,
}

impl DFlipFlop {
    pub const CK: usize = 0;
    pub const D: usize = 1;
    pub const CLR_B: usize = 2;
    pub const PR_B: usize = 3;
    pub const Q: usize = 4;
    pub const Q_B: usize = 5;

    pub fn new() -> Self {
        DFlipFlop {
            prev_ck: Signal::Undefined,
        }
    }

    fn drive(io: &mut PinIo<'_>, q: Signal) -> Result<()> {
        io.set(Self::Q, q)?;
        io.set(Self::Q_B, q.not())
    }
}

impl Default for DFlipFlop {
    fn default() -> Self {
        DFlipFlop::new()
    }
}

impl Component for DFlipFlop {
    fn name(&self) -> &str {
        "DFF"
    }

    fn pins(&self) -> Vec<PinSpec> {
        vec![
            PinSpec::input("CK"),
            PinSpec::input("D"),
            PinSpec::input("CLR_B"),
            PinSpec::input("PR_B"),
            PinSpec::output("Q"),
            PinSpec::output("Q_B"),
        ]
    }

    fn react(&mut self, io: &mut PinIo<'_>) -> Result<()> {
        let ck = io.get(Self::CK)?;

        if io.get(Self::CLR_B)? == Signal::Low {
            Self::drive(io, Signal::Low)?;
        } else if io.get(Self::PR_B)? == Signal::Low {
            Self::drive(io, Signal::High)?;
        } else if self.prev_ck == Signal::Low && ck == Signal::High {
            // Undefined D latches as undefined on both outputs
            let d = io.get(Self::D)?;
            Self::drive(io, d)?;
        }

        self.prev_ck = ck;
        Ok(())
    }
}
