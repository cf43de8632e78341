// src/backend.rs

//! Hardware abstraction for the USART driver.
//!
//! The goal of this module is to hide the memory-mapped register access
//! details behind a lightweight trait so that the higher level line-control
//! logic can be exercised against a fake register file on the host.

use crate::constants::register_offset;

/// Registers that the USART driver interacts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Status register
    Sr,
    /// Data register
    Dr,
    /// Baud rate register
    Brr,
    /// Control register 1 (word length, parity, enables)
    Cr1,
    /// Control register 2 (stop bits)
    Cr2,
    /// Control register 3 (hardware flow control)
    Cr3,
}

impl Register {
    /// Byte offset of the register from the peripheral base address.
    #[inline]
    pub const fn offset(self) -> usize {
        match self {
            Register::Sr => register_offset::SR,
            Register::Dr => register_offset::DR,
            Register::Brr => register_offset::BRR,
            Register::Cr1 => register_offset::CR1,
            Register::Cr2 => register_offset::CR2,
            Register::Cr3 => register_offset::CR3,
        }
    }
}

/// Minimal abstraction over USART register access.
pub trait RegisterAccess {
    /// Read the current value of a USART register.
    fn read(&mut self, register: Register) -> u32;
    /// Write a value to a USART register.
    fn write(&mut self, register: Register, value: u32);
}

/// Memory-mapped implementation backed by volatile accesses.
///
/// One value of this type exists per physical USART instance; it is resolved
/// through [`Peripheral::register_block`](crate::instance::Peripheral) and
/// cannot be fabricated with an arbitrary address. Copies alias the same
/// hardware state, so two handles resolved from the same selector observe
/// each other's register writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmioRegisterBlock {
    base: usize,
}

impl MmioRegisterBlock {
    /// Create a handle over a peripheral base address.
    ///
    /// Crate-private: only the instance resolver hands out register blocks,
    /// which keeps every reachable handle pointing at real hardware.
    pub(crate) const fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the register block.
    #[inline]
    #[must_use]
    pub const fn base_address(&self) -> usize {
        self.base
    }
}

impl RegisterAccess for MmioRegisterBlock {
    #[inline]
    fn read(&mut self, register: Register) -> u32 {
        // SAFETY: `base` comes from the instance resolver's fixed address
        // table, so `base + offset` is a valid, aligned USART register.
        // Volatile is required: the hardware mutates these cells.
        unsafe { core::ptr::read_volatile((self.base + register.offset()) as *const u32) }
    }

    #[inline]
    fn write(&mut self, register: Register, value: u32) {
        // SAFETY: same addressing argument as `read`; writes to the USART
        // register file cannot violate memory safety.
        unsafe { core::ptr::write_volatile((self.base + register.offset()) as *mut u32, value) }
    }
}
