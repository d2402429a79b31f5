// Component families
pub mod clock;
pub mod composite;
pub mod io;
pub mod logic;
pub mod memory;
pub mod sequential;
pub mod structural;

// Re-export the parts
pub use clock::{Clock, ClockStopper};
pub use composite::{FullAdder, HalfAdder};
pub use io::{DipSwitch, Led, PushSwitch, Switch};
pub use logic::{AndGate, Inverter, Nand3Gate, NandGate, OrGate};
pub use memory::Memory;
pub use sequential::{DFlipFlop, Ic74hc161};
pub use structural::{Ic74hc153, Ic74hc283};
