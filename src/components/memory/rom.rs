//! Addressable read-only memory.
//!
//! The simulated interface has address inputs `A0..` and data outputs
//! `D0..` only. Contents are written through the `store` side channel by
//! programming tools, never through pins.

use crate::bus::Bus;
use crate::circuit::Circuit;
use crate::component::{Component, PinIo, PinSpec};
use crate::error::{Result, SimError};
use crate::system_config::MemoryImage;
use crate::types::Handle;
use log::debug;

/// Widest address supported; keeps the backing store allocatable
pub const MAX_ADDR_BITS: usize = 20;
pub const MAX_DATA_BITS: usize = 32;

#[derive(Debug, Clone)]
pub struct Memory {
    addr_bits: usize,
    data_bits: usize,
    words: Vec<u32>,
}

impl Memory {
    /// Memory covering the whole address space, `2^addr_bits` words.
    pub fn new(addr_bits: usize, data_bits: usize) -> Self {
        let capacity = 1usize << addr_bits.min(MAX_ADDR_BITS);
        Memory::with_capacity(addr_bits, data_bits, capacity)
    }

    /// Memory holding only `capacity` words; reading an address at or
    /// beyond it is `OutOfRange`.
    pub fn with_capacity(addr_bits: usize, data_bits: usize, capacity: usize) -> Self {
        let limit = 1usize << addr_bits.min(MAX_ADDR_BITS);
        Memory {
            addr_bits,
            data_bits,
            words: vec![0; capacity.min(limit)],
        }
    }

    pub fn addr_bits(&self) -> usize {
        self.addr_bits
    }

    pub fn data_bits(&self) -> usize {
        self.data_bits
    }

    pub fn capacity(&self) -> usize {
        self.words.len()
    }

    pub fn load(&self, addr: usize) -> Result<u32> {
        self.words
            .get(addr)
            .copied()
            .ok_or_else(|| SimError::out_of_range("memory address", addr, self.words.len()))
    }

    pub fn store(&mut self, addr: usize, value: u32) -> Result<()> {
        if self.data_bits < MAX_DATA_BITS && value >> self.data_bits != 0 {
            return Err(SimError::out_of_range(
                "memory word",
                value as usize,
                1 << self.data_bits,
            ));
        }
        let capacity = self.words.len();
        let word = self
            .words
            .get_mut(addr)
            .ok_or_else(|| SimError::out_of_range("memory address", addr, capacity))?;
        *word = value;
        Ok(())
    }

    fn address_pins(&self) -> Vec<usize> {
        (0..self.addr_bits).collect()
    }

    fn data_pins(&self) -> Vec<usize> {
        (self.addr_bits..self.addr_bits + self.data_bits).collect()
    }
}

impl Component for Memory {
    fn name(&self) -> &str {
        "MEM"
    }

    fn pins(&self) -> Vec<PinSpec> {
        let address = (0..self.addr_bits).map(|i| PinSpec::input(format!("A{}", i)));
        let data = (0..self.data_bits).map(|i| PinSpec::output(format!("D{}", i)));
        address.chain(data).collect()
    }

    fn power_on(&mut self, io: &mut PinIo<'_>) -> Result<()> {
        if self.addr_bits > MAX_ADDR_BITS || self.data_bits > MAX_DATA_BITS {
            return Err(SimError::Config(format!(
                "{}: {}x{} exceeds {}x{}",
                io.label(),
                self.addr_bits,
                self.data_bits,
                MAX_ADDR_BITS,
                MAX_DATA_BITS
            )));
        }
        Ok(())
    }

    fn react(&mut self, io: &mut PinIo<'_>) -> Result<()> {
        // Any undefined address bit leaves the data outputs as they were
        let Some(addr) = io.get_word(&self.address_pins())? else {
            return Ok(());
        };
        let value = self.load(addr as usize)?;
        io.set_word(&self.data_pins(), value)
    }
}

impl Handle<Memory> {
    pub fn load(&self, circuit: &Circuit, addr: usize) -> Result<u32> {
        circuit.component(*self)?.load(addr)
    }

    /// Writes one word without touching the data pins.
    pub fn store(&self, circuit: &mut Circuit, addr: usize, value: u32) -> Result<()> {
        circuit.operate(*self, |memory, _| memory.store(addr, value))
    }

    /// Writes a whole image starting at its origin.
    pub fn program(&self, circuit: &mut Circuit, image: &MemoryImage) -> Result<()> {
        circuit.operate(*self, |memory, io| {
            if image.addr_bits != memory.addr_bits || image.data_bits > memory.data_bits {
                return Err(SimError::Config(format!(
                    "{}x{} image does not fit {} ({}x{})",
                    image.addr_bits,
                    image.data_bits,
                    io.label(),
                    memory.addr_bits,
                    memory.data_bits
                )));
            }
            for (offset, &word) in image.words.iter().enumerate() {
                memory.store(image.origin + offset, word)?;
            }
            debug!("programmed {} words into {}", image.words.len(), io.label());
            Ok(())
        })
    }

    pub fn connect_addr_bus(&self, circuit: &mut Circuit, bus: &Bus) -> Result<()> {
        let width = circuit.component(*self)?.addr_bits;
        self.connect_group(circuit, 'A', width, bus)
    }

    pub fn connect_data_bus(&self, circuit: &mut Circuit, bus: &Bus) -> Result<()> {
        let width = circuit.component(*self)?.data_bits;
        self.connect_group(circuit, 'D', width, bus)
    }

    fn connect_group(&self, circuit: &mut Circuit, prefix: char, width: usize, bus: &Bus) -> Result<()> {
        let names: Vec<String> = (0..width).map(|i| format!("{}{}", prefix, i)).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        circuit.connect_bus(*self, &names, bus.wires())
    }
}
