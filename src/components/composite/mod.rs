pub mod adders;

pub use adders::{FullAdder, HalfAdder};
