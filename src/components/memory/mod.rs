pub mod rom;

pub use rom::Memory;
