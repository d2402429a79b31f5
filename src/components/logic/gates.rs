//! Combinational gates over ternary logic.
//!
//! Any undefined operand makes the output undefined, even where ordinary
//! boolean logic could decide the result from one known operand.

use crate::component::{Component, PinIo, PinSpec};
use crate::error::Result;

/// NOT gate: `A` -> `Y`
#[derive(Debug, Default)]
pub struct Inverter;

impl Inverter {
    pub const A: usize = 0;
    pub const Y: usize = 1;

    pub fn new() -> Self {
        Inverter
    }
}

impl Component for Inverter {
    fn name(&self) -> &str {
        "NOT"
    }

    fn pins(&self) -> Vec<PinSpec> {
        vec![PinSpec::input("A"), PinSpec::output("Y")]
    }

    fn combinational(&self) -> bool {
        true
    }

    fn react(&mut self, io: &mut PinIo<'_>) -> Result<()> {
        let y = io.get(Self::A)?.not();
        io.set(Self::Y, y)
    }
}

macro_rules! two_input_gate {
    ($(#[$doc:meta])* $gate:ident, $part:literal, $op:ident) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $gate;

        impl $gate {
            pub const A: usize = 0;
            pub const B: usize = 1;
            pub const Y: usize = 2;

            pub fn new() -> Self {
                $gate
            }
        }

        impl Component for $gate {
            fn name(&self) -> &str {
                $part
            }

            fn pins(&self) -> Vec<PinSpec> {
                vec![PinSpec::input("A"), PinSpec::input("B"), PinSpec::output("Y")]
            }

            fn combinational(&self) -> bool {
                true
            }

            fn react(&mut self, io: &mut PinIo<'_>) -> Result<()> {
                let y = io.get(Self::A)?.$op(io.get(Self::B)?);
                io.set(Self::Y, y)
            }
        }
    };
}

two_input_gate!(
    /// Two-input AND: `A`, `B` -> `Y`
    AndGate,
    "AND",
    and
);
two_input_gate!(
    /// Two-input OR: `A`, `B` -> `Y`
    OrGate,
    "OR",
    or
);
two_input_gate!(
    /// Two-input NAND: `A`, `B` -> `Y`
    NandGate,
    "NAND",
    nand
);

/// Three-input NAND: `A`, `B`, `C` -> `Y`
#[derive(Debug, Default)]
pub struct Nand3Gate;

impl Nand3Gate {
    pub const A: usize = 0;
    pub const B: usize = 1;
    pub const C: usize = 2;
    pub const Y: usize = 3;

    pub fn new() -> Self {
        Nand3Gate
    }
}

impl Component for Nand3Gate {
    fn name(&self) -> &str {
        "NAND3"
    }

    fn pins(&self) -> Vec<PinSpec> {
        vec![
            PinSpec::input("A"),
            PinSpec::input("B"),
            PinSpec::input("C"),
            PinSpec::output("Y"),
        ]
    }

    fn combinational(&self) -> bool {
        true
    }

    fn react(&mut self, io: &mut PinIo<'_>) -> Result<()> {
        let y = io
            .get(Self::A)?
            .nand3(io.get(Self::B)?, io.get(Self::C)?);
        io.set(Self::Y, y)
    }
}
