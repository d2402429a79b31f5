pub mod generic_clock;

pub use generic_clock::{Clock, ClockListener, ClockListenerId, ClockStopper};
