// src/error.rs

//! Error types for USART receive operations

use crate::constants::Status;

/// Hardware-detected receive error.
///
/// The blocking [`receive`](crate::usart::Usart::receive) deliberately does
/// not surface these; only the
/// [`receive_checked`](crate::usart::Usart::receive_checked) extension does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineError {
    /// Parity check failed on the received frame
    Parity,
    /// Stop bit not found where expected
    Framing,
    /// Noise detected on the line during reception
    Noise,
    /// A byte arrived before the previous one was read
    Overrun,
}

impl LineError {
    /// Map a status snapshot to the highest-priority error it reports.
    ///
    /// Overrun wins over the per-frame errors: it means data was already
    /// lost, whereas the others describe a single suspect frame.
    #[must_use]
    pub fn from_status(status: Status) -> Option<Self> {
        if status.contains(Status::OVERRUN) {
            Some(LineError::Overrun)
        } else if status.contains(Status::FRAMING_ERROR) {
            Some(LineError::Framing)
        } else if status.contains(Status::NOISE) {
            Some(LineError::Noise)
        } else if status.contains(Status::PARITY_ERROR) {
            Some(LineError::Parity)
        } else {
            None
        }
    }
}

impl core::fmt::Display for LineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LineError::Parity => write!(f, "parity error on received frame"),
            LineError::Framing => write!(f, "framing error on received frame"),
            LineError::Noise => write!(f, "noise detected on received frame"),
            LineError::Overrun => write!(f, "receiver overrun, data lost"),
        }
    }
}
