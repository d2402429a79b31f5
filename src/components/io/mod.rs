pub mod led;
pub mod switches;

pub use led::Led;
pub use switches::{DipSwitch, PushSwitch, Switch};
