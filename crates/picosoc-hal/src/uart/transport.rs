//! Polled byte transport over the UART rings
//!
//! Reading the data register pops one byte from the RX ring and writing it
//! pushes one byte into the TX ring; in both cases the hardware advances the
//! pointer. Software never writes a pointer directly, it only decides from
//! the status word whether the access is allowed.

use super::status::{OverflowFlags, UartStatusWord};
use crate::error::{Error, Result};
use crate::poll::{Spin, WaitStrategy};
use crate::port::{regs, RegisterPort};

/// Byte-level UART transport with blocking-poll semantics
///
/// Blocking calls poll the status register and hand control to the wait
/// strategy `W` between polls. With the default [`Spin`] they block forever;
/// [`crate::poll::BoundedPolls`] turns them into timeouts.
#[derive(Debug)]
pub struct UartRingTransport<P, W = Spin> {
    port: P,
    wait: W,
    /// Overflow flags the caller has already acknowledged
    acknowledged: OverflowFlags,
    /// Overflow flags already reported in the log
    logged: OverflowFlags,
}

impl<P: RegisterPort> UartRingTransport<P> {
    /// Create a transport that blocks without timeout
    pub fn new(port: P) -> Self {
        Self::with_wait(port, Spin)
    }
}

impl<P: RegisterPort, W: WaitStrategy> UartRingTransport<P, W> {
    /// Create a transport with a custom wait strategy
    pub fn with_wait(port: P, wait: W) -> Self {
        Self {
            port,
            wait,
            acknowledged: OverflowFlags::empty(),
            logged: OverflowFlags::empty(),
        }
    }

    /// Get a mutable reference to the wait strategy
    pub fn wait_strategy_mut(&mut self) -> &mut W {
        &mut self.wait
    }

    /// Release the register port
    pub fn into_inner(self) -> P {
        self.port
    }

    /// Read and decode the status register (one register read)
    pub fn status_snapshot(&mut self) -> UartStatusWord {
        let status = UartStatusWord::from_bits(self.port.read_word(regs::UART_STATUS));
        let fresh = status.overflow() - self.logged;
        if !fresh.is_empty() {
            log::warn!("UART overflow latched: {:?}", fresh);
            self.logged |= fresh;
        }
        status
    }

    /// Receive one byte if the RX ring has data
    pub fn try_receive_byte(&mut self) -> Option<u8> {
        if self.status_snapshot().rx().is_empty() {
            return None;
        }
        Some(self.port.read_word(regs::UART_DATA) as u8)
    }

    /// Receive one byte, polling until the RX ring has data
    ///
    /// Only fails if the wait strategy gives up.
    pub fn receive_byte_blocking(&mut self) -> Result<u8> {
        loop {
            if let Some(byte) = self.try_receive_byte() {
                return Ok(byte);
            }
            self.wait.wait()?;
        }
    }

    /// Send one byte if the TX ring has room
    ///
    /// Returns false (and writes nothing) when the ring is full.
    pub fn try_send_byte(&mut self, byte: u8) -> bool {
        if self.status_snapshot().tx().is_full() {
            return false;
        }
        self.port.write_word(regs::UART_DATA, byte as u32);
        true
    }

    /// Send one byte, polling until the TX ring has room
    pub fn send_byte_blocking(&mut self, byte: u8) -> Result<()> {
        while !self.try_send_byte(byte) {
            self.wait.wait()?;
        }
        Ok(())
    }

    /// Send a slice of bytes, blocking on each one
    pub fn send_bytes_blocking(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.send_byte_blocking(byte)?;
        }
        Ok(())
    }

    /// Get the sticky overflow flags currently latched by the hardware
    pub fn overflow(&mut self) -> OverflowFlags {
        self.status_snapshot().overflow()
    }

    /// Latched overflow flags the caller has not acknowledged yet
    pub fn pending_overflow(&mut self) -> OverflowFlags {
        self.overflow() - self.acknowledged
    }

    /// Acknowledge the currently latched overflow flags
    ///
    /// The hardware keeps the flags set until reset, so acknowledgement is
    /// tracked here. After a ring has been acknowledged, further data loss
    /// on that ring cannot be detected until the next reset.
    ///
    /// Returns the flags that were newly acknowledged.
    pub fn acknowledge_overflow(&mut self) -> OverflowFlags {
        let pending = self.pending_overflow();
        self.acknowledged |= pending;
        if !pending.is_empty() {
            log::debug!("UART overflow acknowledged: {:?}", pending);
        }
        pending
    }
}

impl<P, W> embedded_io::ErrorType for UartRingTransport<P, W> {
    type Error = Error;
}

impl<P: RegisterPort, W: WaitStrategy> embedded_io::Read for UartRingTransport<P, W> {
    /// Blocks for the first byte, then drains whatever else is buffered
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.receive_byte_blocking()?;
        let mut count = 1;
        while count < buf.len() {
            match self.try_receive_byte() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

impl<P: RegisterPort, W: WaitStrategy> embedded_io::ReadReady for UartRingTransport<P, W> {
    fn read_ready(&mut self) -> Result<bool> {
        Ok(!self.status_snapshot().rx().is_empty())
    }
}

impl<P: RegisterPort, W: WaitStrategy> embedded_io::Write for UartRingTransport<P, W> {
    /// Blocks for the first byte, then fills the remaining TX space
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.send_byte_blocking(buf[0])?;
        let mut count = 1;
        while count < buf.len() && self.try_send_byte(buf[count]) {
            count += 1;
        }
        Ok(count)
    }

    /// Bytes already in the TX ring are owned by the hardware
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<P: RegisterPort, W: WaitStrategy> embedded_io::WriteReady for UartRingTransport<P, W> {
    fn write_ready(&mut self) -> Result<bool> {
        Ok(!self.status_snapshot().tx().is_full())
    }
}
