// src/constants.rs

//! Register bit definitions for the USART register file
//!
//! Single source of truth for every mask the configuration encoders and the
//! line controller use. Offsets and bit positions follow the STM32F1
//! reference manual USART chapter.

/// Byte offsets of the registers from the peripheral base address
pub mod register_offset {
    /// Status register
    pub const SR: usize = 0x00;
    /// Data register
    pub const DR: usize = 0x04;
    /// Baud rate register
    pub const BRR: usize = 0x08;
    /// Control register 1
    pub const CR1: usize = 0x0C;
    /// Control register 2
    pub const CR2: usize = 0x10;
    /// Control register 3
    pub const CR3: usize = 0x14;
}

/// Status register (SR) bits
pub mod sr {
    /// Parity error
    pub const PE: u32 = 1 << 0;
    /// Framing error
    pub const FE: u32 = 1 << 1;
    /// Noise error
    pub const NE: u32 = 1 << 2;
    /// Overrun error
    pub const ORE: u32 = 1 << 3;
    /// Idle line detected
    pub const IDLE: u32 = 1 << 4;
    /// Read data register not empty
    pub const RXNE: u32 = 1 << 5;
    /// Transmission complete
    pub const TC: u32 = 1 << 6;
    /// Transmit data register empty
    pub const TXE: u32 = 1 << 7;
    /// LIN break detected
    pub const LBD: u32 = 1 << 8;
    /// CTS line toggled
    pub const CTS: u32 = 1 << 9;
}

/// Control register 1 (CR1) bits
pub mod cr1 {
    /// Receiver enable
    pub const RE: u32 = 1 << 2;
    /// Transmitter enable
    pub const TE: u32 = 1 << 3;
    /// Parity selection (set = odd)
    pub const PS: u32 = 1 << 9;
    /// Parity control enable
    pub const PCE: u32 = 1 << 10;
    /// Word length (set = 9-bit frame)
    pub const M: u32 = 1 << 12;
    /// USART enable
    pub const UE: u32 = 1 << 13;
}

/// Control register 2 (CR2) bits
pub mod cr2 {
    /// Stop bit field position
    pub const STOP_SHIFT: u32 = 12;
    /// Stop bit field mask, STOP[13:12]
    pub const STOP_MASK: u32 = 0b11 << STOP_SHIFT;
}

/// Control register 3 (CR3) bits
pub mod cr3 {
    /// RTS enable
    pub const RTSE: u32 = 1 << 8;
    /// CTS enable
    pub const CTSE: u32 = 1 << 9;
}

/// Baud rate register (BRR) fields
pub mod brr {
    /// Integer divisor position
    pub const MANTISSA_SHIFT: u32 = 4;
    /// Integer divisor, DIV_Mantissa[15:4]
    pub const MANTISSA_MASK: u32 = 0xFFF << MANTISSA_SHIFT;
    /// Fractional divisor (sixteenths), DIV_Fraction[3:0]
    pub const FRACTION_MASK: u32 = 0xF;
}

bitflags::bitflags! {
    /// Snapshot of the status register.
    ///
    /// Reading the flags has no side effect on the hardware; the error flags
    /// are cleared by the SR-read-then-DR-read sequence the hardware defines,
    /// which `receive` performs naturally.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u32 {
        /// Parity error
        const PARITY_ERROR = sr::PE;
        /// Framing error
        const FRAMING_ERROR = sr::FE;
        /// Noise detected on a received frame
        const NOISE = sr::NE;
        /// Receiver overrun
        const OVERRUN = sr::ORE;
        /// Idle line detected
        const IDLE = sr::IDLE;
        /// A received byte is waiting in the data register
        const RX_NOT_EMPTY = sr::RXNE;
        /// Last transmission fully shifted out
        const TX_COMPLETE = sr::TC;
        /// Transmit data register ready for the next byte
        const TX_EMPTY = sr::TXE;
        /// LIN break detected
        const LIN_BREAK = sr::LBD;
        /// CTS line toggled
        const CTS_CHANGED = sr::CTS;
    }
}

impl Status {
    /// Any of the receiver error conditions (parity, framing, noise, overrun).
    #[inline]
    #[must_use]
    pub fn has_line_error(self) -> bool {
        self.intersects(
            Status::PARITY_ERROR | Status::FRAMING_ERROR | Status::NOISE | Status::OVERRUN,
        )
    }
}
