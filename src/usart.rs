// src/usart.rs

//! Line controller: configuration and blocking byte transfer
//!
//! [`Usart`] owns a register block handle and drives it through the blocking
//! transmit/receive protocol. The type holds no lock and never allocates;
//! if several execution contexts share one instance, serialization belongs
//! to the integration layer (see [`console`](crate::console)), not here.

use crate::backend::{MmioRegisterBlock, Register, RegisterAccess};
use crate::config::LineConfig;
use crate::constants::{cr1, sr, Status};
use crate::error::LineError;
use crate::instance::{Clocks, Peripheral};
use crate::timeout::{poll_with_timeout, poll_with_timeout_value, TimeoutConfig, TimeoutError};

/// A configured USART line.
pub struct Usart<B: RegisterAccess> {
    block: B,
}

impl Usart<MmioRegisterBlock> {
    /// Resolve a peripheral instance and initialize it in one step.
    ///
    /// Routes the right bus clock (PCLK2 for USART1, PCLK1 otherwise) into
    /// the baud-rate generator, then runs [`Usart::init`] on the resolved
    /// register block.
    #[must_use]
    pub fn open(peripheral: Peripheral, config: &LineConfig, clocks: &Clocks) -> Self {
        let pclk_hz = peripheral.clock(clocks);
        Self::init(peripheral.register_block(), config, pclk_hz)
    }
}

impl<B: RegisterAccess> Usart<B> {
    /// Program every line parameter and enable the peripheral.
    ///
    /// `pclk_hz` is the peripheral input clock for this instance, as
    /// configured by the clock-tree collaborator.
    ///
    /// The write order is load-bearing. Line-format fields latch only while
    /// the peripheral is disabled, so the sequence is: disable, program
    /// BRR/CR2/CR3 and the CR1 format bits, enable transmitter and receiver,
    /// and set the peripheral-enable bit strictly last.
    ///
    /// There is no failure path: a malformed configuration cannot be
    /// constructed, and the write sequence is idempotent because each
    /// register is written whole. Re-initializing while a transfer is in
    /// flight on the same hardware is a register-level race the caller must
    /// avoid.
    pub fn init(mut block: B, config: &LineConfig, pclk_hz: u32) -> Self {
        // Disable first so the format fields below take effect.
        block.write(Register::Cr1, 0);

        block.write(Register::Brr, config.brr_value(pclk_hz));
        block.write(Register::Cr2, config.cr2_bits());
        block.write(Register::Cr3, config.cr3_bits());

        let format = config.cr1_bits();
        block.write(Register::Cr1, format);
        block.write(Register::Cr1, format | cr1::TE | cr1::RE);
        block.write(Register::Cr1, format | cr1::TE | cr1::RE | cr1::UE);

        #[cfg(feature = "logging")]
        log::debug!(
            "usart line up: {:?} baud, {:?} parity, {:?} stop, {:?} data, {:?} flow",
            config.baud_rate,
            config.parity,
            config.stop_bits,
            config.word_length,
            config.flow_control
        );

        Self { block }
    }

    /// Send one byte, blocking until the hardware accepts it.
    ///
    /// Busy-polls the transmit-data-register-empty flag, then writes the
    /// byte. Returns once the byte has moved into the shift logic, not once
    /// it has finished on the wire; bytes go out in call order.
    ///
    /// Known limitation: there is no timeout. An unclocked or unresponsive
    /// peripheral blocks the caller indefinitely. See
    /// [`transmit_with_timeout`](Self::transmit_with_timeout) for the
    /// bounded variant.
    pub fn transmit(&mut self, byte: u8) {
        while self.block.read(Register::Sr) & sr::TXE == 0 {
            core::hint::spin_loop();
        }
        self.block.write(Register::Dr, u32::from(byte));
    }

    /// Receive one byte, blocking until one arrives.
    ///
    /// Busy-polls the receive-data-register-not-empty flag, then reads the
    /// data register. Hardware error flags (parity, framing, noise, overrun)
    /// are not surfaced here; use [`receive_checked`](Self::receive_checked)
    /// when they matter. Same unbounded-blocking caveat as
    /// [`transmit`](Self::transmit).
    pub fn receive(&mut self) -> u8 {
        while self.block.read(Register::Sr) & sr::RXNE == 0 {
            core::hint::spin_loop();
        }
        (self.block.read(Register::Dr) & 0xFF) as u8
    }

    /// Send every byte of a slice in order.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.transmit(byte);
        }
    }

    /// Non-blocking receive: a byte if one is waiting. Extension beyond the
    /// blocking base contract.
    pub fn try_receive(&mut self) -> Option<u8> {
        if self.block.read(Register::Sr) & sr::RXNE == 0 {
            return None;
        }
        Some((self.block.read(Register::Dr) & 0xFF) as u8)
    }

    /// Blocking receive that surfaces hardware error flags. Extension beyond
    /// the base contract, whose `receive` returns only the data byte.
    ///
    /// On error the data register is still read, completing the SR-then-DR
    /// sequence that clears the sticky flags, and the suspect byte is
    /// discarded.
    pub fn receive_checked(&mut self) -> Result<u8, LineError> {
        loop {
            let status = self.status();
            if let Some(error) = LineError::from_status(status) {
                let _ = self.block.read(Register::Dr);
                return Err(error);
            }
            if status.contains(Status::RX_NOT_EMPTY) {
                return Ok((self.block.read(Register::Dr) & 0xFF) as u8);
            }
            core::hint::spin_loop();
        }
    }

    /// Bounded-wait transmit. Extension: the base contract stays unbounded,
    /// this variant gives up once `config` is exhausted.
    pub fn transmit_with_timeout(
        &mut self,
        byte: u8,
        config: TimeoutConfig,
    ) -> Result<(), TimeoutError> {
        let block = &mut self.block;
        poll_with_timeout(config, || block.read(Register::Sr) & sr::TXE != 0).into_result()?;
        block.write(Register::Dr, u32::from(byte));
        Ok(())
    }

    /// Bounded-wait receive. Extension, same contract note as
    /// [`transmit_with_timeout`](Self::transmit_with_timeout).
    pub fn receive_with_timeout(&mut self, config: TimeoutConfig) -> Result<u8, TimeoutError> {
        let block = &mut self.block;
        poll_with_timeout_value(config, |_| {
            if block.read(Register::Sr) & sr::RXNE != 0 {
                Some((block.read(Register::Dr) & 0xFF) as u8)
            } else {
                None
            }
        })
        .into_result()
    }

    /// Snapshot of the status register.
    pub fn status(&mut self) -> Status {
        Status::from_bits_truncate(self.block.read(Register::Sr))
    }

    /// Release the underlying register block.
    pub fn free(self) -> B {
        self.block
    }
}

impl<B: RegisterAccess> core::fmt::Write for Usart<B> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BaudRate, FlowControl, Parity, StopBits, WordLength};
    use crate::constants::{cr2, cr3};
    use crate::timeout::Backoff;
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Register file fake: TXE always ready, RXNE driven by a queue, every
    /// write recorded in order.
    struct FakeBlock {
        cr1: u32,
        cr2: u32,
        cr3: u32,
        brr: u32,
        sr_errors: u32,
        rx: VecDeque<u32>,
        tx: Vec<u32>,
        writes: Vec<(Register, u32)>,
    }

    impl FakeBlock {
        fn new() -> Self {
            Self {
                cr1: 0,
                cr2: 0,
                cr3: 0,
                brr: 0,
                sr_errors: 0,
                rx: VecDeque::new(),
                tx: Vec::new(),
                writes: Vec::new(),
            }
        }
    }

    impl RegisterAccess for FakeBlock {
        fn read(&mut self, register: Register) -> u32 {
            match register {
                Register::Sr => {
                    let mut value = sr::TXE | self.sr_errors;
                    if !self.rx.is_empty() {
                        value |= sr::RXNE;
                    }
                    value
                }
                Register::Dr => {
                    self.sr_errors = 0;
                    self.rx.pop_front().unwrap_or(0)
                }
                Register::Brr => self.brr,
                Register::Cr1 => self.cr1,
                Register::Cr2 => self.cr2,
                Register::Cr3 => self.cr3,
            }
        }

        fn write(&mut self, register: Register, value: u32) {
            self.writes.push((register, value));
            match register {
                Register::Sr => {}
                Register::Dr => self.tx.push(value),
                Register::Brr => self.brr = value,
                Register::Cr1 => self.cr1 = value,
                Register::Cr2 => self.cr2 = value,
                Register::Cr3 => self.cr3 = value,
            }
        }
    }

    fn test_config() -> LineConfig {
        LineConfig {
            flow_control: FlowControl::RtsCts,
            parity: Parity::Odd,
            baud_rate: BaudRate::Baud115200,
            stop_bits: StopBits::Two,
            word_length: WordLength::Eight,
        }
    }

    const PCLK: u32 = 36_000_000;

    #[test]
    fn test_init_programs_every_line_parameter() {
        let usart = Usart::init(FakeBlock::new(), &test_config(), PCLK);
        let block = usart.free();

        assert_eq!(block.brr, 313); // round(36e6 / 115200) = round(312.5)
        assert_eq!(block.cr2 & cr2::STOP_MASK, 0b10 << cr2::STOP_SHIFT);
        assert_eq!(block.cr3, cr3::RTSE | cr3::CTSE);
        // Odd parity over an 8-bit word auto-extends the frame.
        assert_eq!(
            block.cr1,
            cr1::M | cr1::PCE | cr1::PS | cr1::TE | cr1::RE | cr1::UE
        );
    }

    #[test]
    fn test_init_enables_peripheral_last() {
        let usart = Usart::init(FakeBlock::new(), &test_config(), PCLK);
        let block = usart.free();

        // First write disables the peripheral so format fields latch.
        assert_eq!(block.writes[0], (Register::Cr1, 0));

        // UE appears exactly once, in the final write, after TE/RE.
        let ue_positions: Vec<usize> = block
            .writes
            .iter()
            .enumerate()
            .filter(|&(_, &(register, value))| register == Register::Cr1 && value & cr1::UE != 0)
            .map(|(position, _)| position)
            .collect();
        assert_eq!(ue_positions, [block.writes.len() - 1]);

        let (_, final_cr1) = block.writes[block.writes.len() - 1];
        assert_eq!(final_cr1 & (cr1::TE | cr1::RE), cr1::TE | cr1::RE);
    }

    #[test]
    fn test_init_twice_is_idempotent() {
        let once = Usart::init(FakeBlock::new(), &test_config(), PCLK).free();

        let twice = Usart::init(FakeBlock::new(), &test_config(), PCLK).free();
        let twice = Usart::init(twice, &test_config(), PCLK).free();

        assert_eq!(once.cr1, twice.cr1);
        assert_eq!(once.cr2, twice.cr2);
        assert_eq!(once.cr3, twice.cr3);
        assert_eq!(once.brr, twice.brr);
    }

    #[test]
    fn test_transmit_preserves_call_order() {
        let mut usart = Usart::init(FakeBlock::new(), &test_config(), PCLK);
        usart.write_bytes(&[0x41, 0x42, 0x43]);
        let block = usart.free();
        assert_eq!(block.tx, [0x41, 0x42, 0x43]);
    }

    #[test]
    fn test_receive_returns_queued_bytes_in_order() {
        let mut block = FakeBlock::new();
        block.rx.extend([0xDE, 0xAD]);
        let mut usart = Usart::init(block, &test_config(), PCLK);
        assert_eq!(usart.receive(), 0xDE);
        assert_eq!(usart.receive(), 0xAD);
    }

    #[test]
    fn test_try_receive_on_idle_line() {
        let mut usart = Usart::init(FakeBlock::new(), &test_config(), PCLK);
        assert_eq!(usart.try_receive(), None);

        let mut block = usart.free();
        block.rx.push_back(0x55);
        let mut usart = Usart::init(block, &test_config(), PCLK);
        assert_eq!(usart.try_receive(), Some(0x55));
    }

    #[test]
    fn test_receive_checked_clean_byte() {
        let mut block = FakeBlock::new();
        block.rx.push_back(0x7F);
        let mut usart = Usart::init(block, &test_config(), PCLK);
        assert_eq!(usart.receive_checked(), Ok(0x7F));
    }

    #[test]
    fn test_receive_checked_surfaces_overrun() {
        let mut block = FakeBlock::new();
        block.rx.push_back(0x00);
        block.sr_errors = sr::ORE;
        let mut usart = Usart::init(block, &test_config(), PCLK);
        assert_eq!(usart.receive_checked(), Err(LineError::Overrun));
        // The flag-clearing DR read consumed the suspect byte.
        assert_eq!(usart.try_receive(), None);
    }

    #[test]
    fn test_receive_with_timeout_expires_on_silent_line() {
        let mut usart = Usart::init(FakeBlock::new(), &test_config(), PCLK);
        let config = TimeoutConfig {
            max_iterations: 25,
            backoff: Backoff::None,
        };
        assert_eq!(
            usart.receive_with_timeout(config),
            Err(TimeoutError { iterations: 25 })
        );
    }

    #[test]
    fn test_transmit_with_timeout_on_ready_hardware() {
        let mut usart = Usart::init(FakeBlock::new(), &test_config(), PCLK);
        let result = usart.transmit_with_timeout(0x21, TimeoutConfig::default_timeout());
        assert_eq!(result, Ok(()));
        assert_eq!(usart.free().tx, [0x21]);
    }

    #[test]
    fn test_fmt_write_goes_out_as_bytes() {
        use core::fmt::Write;
        let mut usart = Usart::init(FakeBlock::new(), &test_config(), PCLK);
        write!(usart, "ok {}", 7).unwrap();
        let sent: Vec<u8> = usart.free().tx.iter().map(|&w| w as u8).collect();
        assert_eq!(sent, b"ok 7");
    }
}
