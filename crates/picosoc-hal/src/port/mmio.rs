//! Volatile access to the physical register map
//!
//! On PicoSoC the peripherals sit at fixed physical addresses with no MMU in
//! between, so a port is just an address window that is accessed through
//! `read_volatile`/`write_volatile`.
//!
//! # Safety
//!
//! Creating an [`Mmio`] asserts that the window really is device memory and
//! that no other handle covers the same registers. Both constructors are
//! therefore `unsafe`; after construction, access is safe.

use super::{regs, RegisterPort};

/// An owned window of memory-mapped registers
#[derive(Debug)]
pub struct Mmio {
    /// First byte address of the window
    base: u32,
    /// Size of the window in bytes
    size: u32,
}

impl Mmio {
    /// Take ownership of the register window `base..base + size`
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    /// - The range is valid device memory on the running SoC
    /// - No other `Mmio` covers any part of the range
    pub const unsafe fn new(base: u32, size: u32) -> Self {
        Self { base, size }
    }

    /// Get the first address of this window
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Get the size of this window in bytes
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    fn check(&self, address: u32) {
        debug_assert!(
            address >= self.base && address + 4 <= self.base + self.size,
            "register 0x{:08X} outside window 0x{:08X}+0x{:X}",
            address,
            self.base,
            self.size
        );
        debug_assert!(address & 3 == 0, "unaligned 32-bit access");
    }
}

impl RegisterPort for Mmio {
    #[inline]
    fn read_word(&mut self, address: u32) -> u32 {
        self.check(address);
        unsafe { core::ptr::read_volatile(address as usize as *const u32) }
    }

    #[inline]
    fn write_word(&mut self, address: u32, value: u32) {
        self.check(address);
        unsafe { core::ptr::write_volatile(address as usize as *mut u32, value) }
    }
}

/// All PicoSoC peripherals, one owning handle each
#[derive(Debug)]
pub struct Peripherals {
    /// SPI flash controller configuration / manual pin register
    pub spi: Mmio,
    /// UART status and data registers
    pub uart: Mmio,
    /// LED output register
    pub leds: Mmio,
}

impl Peripherals {
    /// Create handles for the whole register map
    ///
    /// # Safety
    ///
    /// Must be called at most once; every returned handle assumes exclusive
    /// ownership of its registers.
    pub unsafe fn steal() -> Self {
        Self {
            spi: Mmio::new(regs::SPI_CTRL, regs::UART_STATUS - regs::SPI_CTRL),
            uart: Mmio::new(
                regs::UART_STATUS,
                regs::SPI_UART_BASE + regs::SPI_UART_SIZE - regs::UART_STATUS,
            ),
            leds: Mmio::new(regs::LEDS, regs::LEDS_SIZE),
        }
    }
}
