pub mod ic_74hc153;
pub mod ic_74hc283;

pub use ic_74hc153::Ic74hc153;
pub use ic_74hc283::Ic74hc283;
