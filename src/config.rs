// src/config.rs

//! Line configuration for the USART driver
//!
//! A [`LineConfig`] is a fully-specified value object: five closed enums, no
//! optional field, no driver-side default. The caller builds one, hands it to
//! [`Usart::init`](crate::usart::Usart::init), and may discard it afterwards;
//! the register state it produced is all that matters from then on.
//!
//! Each field encodes into its control register independently of the others.
//! The one hardware coupling is word length and parity: the frame
//! auto-extends, see [`LineConfig::cr1_bits`].

use crate::constants::{brr, cr1, cr2, cr3};

/// Hardware flow control on the RTS/CTS lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    /// No hardware flow control
    None,
    /// Request-to-send only
    Rts,
    /// Clear-to-send only
    Cts,
    /// Both RTS and CTS
    RtsCts,
}

/// Parity bit generation and checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    /// No parity bit
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

/// Supported line speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaudRate {
    /// 9600 bits per second
    Baud9600,
    /// 115200 bits per second
    Baud115200,
    /// 57600 bits per second
    Baud57600,
    /// 38400 bits per second
    Baud38400,
}

impl BaudRate {
    /// The requested line speed in bits per second.
    #[inline]
    #[must_use]
    pub const fn hz(self) -> u32 {
        match self {
            BaudRate::Baud9600 => 9_600,
            BaudRate::Baud115200 => 115_200,
            BaudRate::Baud57600 => 57_600,
            BaudRate::Baud38400 => 38_400,
        }
    }
}

/// Number of stop bits appended to each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    /// 1 stop bit
    One,
    /// 2 stop bits
    Two,
    /// 0.5 stop bit
    Half,
    /// 1.5 stop bits
    OneAndHalf,
}

/// Data bits per frame, including the parity bit when parity is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordLength {
    /// 8-bit frame
    Eight,
    /// 9-bit frame
    Nine,
}

/// A complete line configuration.
///
/// Every field must be set; there is no partial or default configuration.
/// The closed enum domains make a malformed configuration unrepresentable,
/// so [`Usart::init`](crate::usart::Usart::init) has no validation branch
/// and no failure path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    /// RTS/CTS hardware flow control mode
    pub flow_control: FlowControl,
    /// Parity mode
    pub parity: Parity,
    /// Line speed
    pub baud_rate: BaudRate,
    /// Stop bit count
    pub stop_bits: StopBits,
    /// Frame width
    pub word_length: WordLength,
}

impl LineConfig {
    /// Encode the word-length and parity fields into their CR1 bits.
    ///
    /// Word length and parity are coupled in hardware: the parity bit is the
    /// most significant bit of the frame. This driver auto-extends the frame,
    /// so enabling parity with [`WordLength::Eight`] sets the 9-bit frame
    /// format (M bit) and all 8 data bits survive next to the parity bit.
    /// With [`WordLength::Nine`] and parity enabled the ninth bit *is* the
    /// parity bit; the payload stays the 8 data bits the byte API carries.
    #[must_use]
    pub fn cr1_bits(&self) -> u32 {
        let mut bits = 0;

        let nine_bit_frame =
            self.word_length == WordLength::Nine || self.parity != Parity::None;
        if nine_bit_frame {
            bits |= cr1::M;
        }

        match self.parity {
            Parity::None => {}
            Parity::Even => bits |= cr1::PCE,
            Parity::Odd => bits |= cr1::PCE | cr1::PS,
        }

        bits
    }

    /// Encode the stop-bit field into its CR2 bits.
    #[must_use]
    pub fn cr2_bits(&self) -> u32 {
        let stop = match self.stop_bits {
            StopBits::One => 0b00,
            StopBits::Half => 0b01,
            StopBits::Two => 0b10,
            StopBits::OneAndHalf => 0b11,
        };
        stop << cr2::STOP_SHIFT
    }

    /// Encode the flow-control field into its CR3 bits.
    ///
    /// RTS and CTS enable independently; the combined mode sets both.
    #[must_use]
    pub fn cr3_bits(&self) -> u32 {
        match self.flow_control {
            FlowControl::None => 0,
            FlowControl::Rts => cr3::RTSE,
            FlowControl::Cts => cr3::CTSE,
            FlowControl::RtsCts => cr3::RTSE | cr3::CTSE,
        }
    }

    /// Compute the baud rate register value for a peripheral clock.
    ///
    /// With 16x oversampling the generator divides the peripheral clock by
    /// `16 * USARTDIV`, where USARTDIV is a fixed-point number stored as
    /// DIV_Mantissa[15:4].DIV_Fraction[3:0]. The whole register is therefore
    /// `pclk / baud` in sixteenths, rounded to nearest. Truncating instead
    /// would bias the effective rate high-side clocks out of tolerance.
    #[must_use]
    pub fn brr_value(&self, pclk_hz: u32) -> u32 {
        let baud = self.baud_rate.hz();
        let divider = (pclk_hz + baud / 2) / baud;
        divider & (brr::MANTISSA_MASK | brr::FRACTION_MASK)
    }
}
