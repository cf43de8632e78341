// src/console.rs

//! Global console over one USART instance
//!
//! The line controller itself holds no lock (see [`crate::usart`]); this
//! module is the mutual-exclusion boundary for callers that want a shared,
//! `print!`-style sink. One instance is parked behind a spin mutex and the
//! crate-root [`uart_print!`](crate::uart_print) /
//! [`uart_println!`](crate::uart_println) macros write through it.
//!
//! # Locking
//!
//! The mutex serializes whole formatted writes, so concurrent callers get
//! interleaved lines rather than interleaved bytes. A blocked transmit holds
//! the lock for the duration of its busy-wait.

use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

use crate::backend::MmioRegisterBlock;
use crate::config::LineConfig;
use crate::instance::{Clocks, Peripheral};
use crate::usart::Usart;

/// Console state tracking with atomic operations for thread safety
static CONSOLE_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Global console protected by Mutex
static CONSOLE: Mutex<Option<Usart<MmioRegisterBlock>>> = Mutex::new(None);

/// Console initialization result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// The console was already initialized; the line was not reconfigured
    AlreadyInitialized,
}

impl core::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConsoleError::AlreadyInitialized => write!(f, "console already initialized"),
        }
    }
}

/// Reserve the one-time initialization slot.
fn claim() -> Result<(), ConsoleError> {
    CONSOLE_INITIALIZED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .map(|_| ())
        .map_err(|_| ConsoleError::AlreadyInitialized)
}

/// Configure a USART instance and install it as the global console.
///
/// Safe to call from racing contexts: exactly one caller wins, the rest get
/// `AlreadyInitialized` and the line is not reconfigured under them.
pub fn init(
    peripheral: Peripheral,
    config: &LineConfig,
    clocks: &Clocks,
) -> Result<(), ConsoleError> {
    claim()?;

    let usart = Usart::open(peripheral, config, clocks);
    *CONSOLE.lock() = Some(usart);

    #[cfg(feature = "logging")]
    log::debug!("console installed on {:?}", peripheral);

    Ok(())
}

/// Whether [`init`] has completed successfully.
#[inline]
#[must_use]
pub fn is_initialized() -> bool {
    CONSOLE_INITIALIZED.load(Ordering::Acquire)
}

/// Run a closure against the console, if one is installed.
pub fn with_console<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut Usart<MmioRegisterBlock>) -> R,
{
    let mut guard = CONSOLE.lock();
    guard.as_mut().map(f)
}

#[doc(hidden)]
pub fn print_impl(args: core::fmt::Arguments) {
    use core::fmt::Write;
    // No console yet: drop the output rather than fault. Matches the usual
    // early-boot window where nothing is listening anyway.
    let _ = with_console(|usart| usart.write_fmt(args));
}

/// Prints to the host through the console USART.
#[macro_export]
macro_rules! uart_print {
    ($($arg:tt)*) => {
        $crate::console::print_impl(format_args!($($arg)*));
    };
}

/// Prints to the host through the console USART, appending a newline.
#[macro_export]
macro_rules! uart_println {
    () => ($crate::uart_print!("\n"));
    ($fmt:expr) => ($crate::uart_print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::uart_print!(concat!($fmt, "\n"), $($arg)*));
}
