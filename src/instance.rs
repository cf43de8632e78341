// src/instance.rs

//! Instance selection for the USART peripherals
//!
//! The STM32F1 parts this driver targets expose three USART blocks. The
//! resolver maps the closed [`Peripheral`] set to the fixed register-block
//! addresses, so every handle reachable through this module points at real
//! hardware; there is no way to conjure a block at an arbitrary address.

use crate::backend::MmioRegisterBlock;

/// USART1 base address (APB2)
const USART1_BASE: usize = 0x4001_3800;
/// USART2 base address (APB1)
const USART2_BASE: usize = 0x4000_4400;
/// USART3 base address (APB1)
const USART3_BASE: usize = 0x4000_4800;

/// The USART instances physically present on the target device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peripheral {
    /// USART1, clocked from PCLK2
    Usart1,
    /// USART2, clocked from PCLK1
    Usart2,
    /// USART3, clocked from PCLK1
    Usart3,
}

impl Peripheral {
    /// Resolve this selector to its register block.
    ///
    /// Pure lookup: constant-time, deterministic, no side effect, no failure
    /// path. Resolving the same selector twice yields handles over the same
    /// underlying hardware state, so a reconfiguration through one handle is
    /// observed through the other.
    #[must_use]
    pub fn register_block(self) -> MmioRegisterBlock {
        #[cfg(feature = "logging")]
        log::trace!("resolving register block for {:?}", self);

        MmioRegisterBlock::new(self.base_address())
    }

    /// Base address of this instance's register block.
    #[inline]
    #[must_use]
    pub const fn base_address(self) -> usize {
        match self {
            Peripheral::Usart1 => USART1_BASE,
            Peripheral::Usart2 => USART2_BASE,
            Peripheral::Usart3 => USART3_BASE,
        }
    }

    /// The peripheral clock feeding this instance's baud-rate generator.
    ///
    /// USART1 sits on APB2; USART2 and USART3 sit on APB1. The frequencies
    /// themselves come from the clock-configuration collaborator via
    /// [`Clocks`]; this driver only routes, it never programs the clock tree.
    #[inline]
    #[must_use]
    pub const fn clock(self, clocks: &Clocks) -> u32 {
        match self {
            Peripheral::Usart1 => clocks.pclk2_hz,
            Peripheral::Usart2 | Peripheral::Usart3 => clocks.pclk1_hz,
        }
    }
}

/// Peripheral bus clock frequencies, as configured by the clock tree.
///
/// Produced by the external clock-configuration layer and consumed read-only
/// here as the input to baud-rate divisor computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clocks {
    /// APB1 peripheral clock frequency in Hz
    pub pclk1_hz: u32,
    /// APB2 peripheral clock frequency in Hz
    pub pclk2_hz: u32,
}

impl Clocks {
    /// Describe an already-configured clock tree.
    #[must_use]
    pub const fn new(pclk1_hz: u32, pclk2_hz: u32) -> Self {
        Self { pclk1_hz, pclk2_hz }
    }
}
