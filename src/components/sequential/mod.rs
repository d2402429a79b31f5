pub mod d_flip_flop;
pub mod ic_74hc161;

pub use d_flip_flop::DFlipFlop;
pub use ic_74hc161::Ic74hc161;
