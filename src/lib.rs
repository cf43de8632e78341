// src/lib.rs

//! Blocking USART driver for STM32F1-class microcontrollers
//!
//! Provides serial communication over the three on-chip USART blocks with:
//! - Enumerated line parameters (baud rate, parity, stop bits, word length,
//!   RTS/CTS flow control) encoded into the hardware registers
//! - Blocking, in-order byte transmit and receive
//! - Checked and bounded-wait transfer variants as documented extensions
//! - An optional global console with `print!`-style macros
//!
//! # Scope
//!
//! The driver programs the USART register block and nothing else. Clock-tree
//! setup, pin alternate-function routing and interrupt controller
//! configuration belong to their own layers; the clock layer's output is
//! consumed here as a [`Clocks`] value. Interrupt- and DMA-driven transfer
//! are out of scope, as is any payload wider than a byte.
//!
//! # Blocking model
//!
//! Transmit and receive spin on the hardware-ready flags with no timeout and
//! no suspension point. On an unclocked or absent peripheral they block
//! forever; that is the documented cost of the zero-overhead base contract.
//! The `*_with_timeout` variants exist for callers that need a bound.
//!
//! # Sharing
//!
//! A [`Usart`] holds no lock. Two handles resolved from the same
//! [`Peripheral`] alias the same hardware, and interleaving calls through
//! them is a register-level race the integration layer must prevent, either
//! by construction or with something like the [`console`] module's mutex.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

#[cfg(test)]
extern crate std;

pub mod backend;
pub mod config;
pub mod console;
pub mod constants;
pub mod error;
pub mod instance;
pub mod timeout;
pub mod usart;

pub use backend::{MmioRegisterBlock, Register, RegisterAccess};
pub use config::{BaudRate, FlowControl, LineConfig, Parity, StopBits, WordLength};
pub use constants::Status;
pub use error::LineError;
pub use instance::{Clocks, Peripheral};
pub use timeout::{TimeoutConfig, TimeoutError};
pub use usart::Usart;
