//! Bitbang SPI over the `spimemio` manual-mode pins
//!
//! With the memio enable bit cleared, the low half of the SPI control
//! register drives the flash pins directly: IO0..IO3 values in bits 0..=3,
//! CLK in bit 4, CS# in bit 5 and the IO output enables in bits 8..=11.
//! Reading the register returns the live pin levels, which is how MISO
//! (IO1) is sampled.
//!
//! [`BitbangSpiMaster`] is the minimal pin interface and [`single`] holds
//! the single-wire helpers built on it. [`ManualPins`] implements the
//! interface on top of a [`RegisterPort`].

use crate::port::{regs, RegisterPort};

/// Trait for low-level bitbang SPI operations
pub trait BitbangSpiMaster {
    /// Set chip select (CS is active low, so `active=true` means CS=0)
    fn set_cs(&mut self, active: bool);

    /// Set clock line value
    fn set_sck(&mut self, high: bool);

    /// Set MOSI/IO0 line value
    fn set_mosi(&mut self, high: bool);

    /// Get MISO/IO1 line value
    fn get_miso(&mut self) -> bool;

    /// Delay for half a clock period
    fn half_period_delay(&mut self) {}

    /// Optional: Set SCK and MOSI atomically (optimization)
    ///
    /// Default implementation calls `set_sck` then `set_mosi`.
    fn set_sck_set_mosi(&mut self, sck: bool, mosi: bool) {
        self.set_sck(sck);
        self.set_mosi(mosi);
    }

    /// Optional: Set SCK and get MISO atomically (optimization)
    ///
    /// Default implementation calls `set_sck` then `get_miso`.
    fn set_sck_get_miso(&mut self, sck: bool) -> bool {
        self.set_sck(sck);
        self.get_miso()
    }
}

/// Bitbang helper functions for single-wire I/O (SPI mode 0, MSB first)
pub mod single {
    use super::BitbangSpiMaster;

    /// Shift `out` onto MOSI while sampling MISO; returns the byte read
    pub fn transfer_byte<M: BitbangSpiMaster + ?Sized>(master: &mut M, out: u8) -> u8 {
        let mut byte = 0u8;
        for i in (0..8).rev() {
            master.set_sck_set_mosi(false, (out >> i) & 1 != 0);
            master.half_period_delay();
            let miso = master.set_sck_get_miso(true);
            master.half_period_delay();
            byte = (byte << 1) | miso as u8;
        }
        byte
    }

    /// Write a byte, discarding whatever the chip drives back
    pub fn write_byte<M: BitbangSpiMaster + ?Sized>(master: &mut M, byte: u8) {
        transfer_byte(master, byte);
    }

    /// Full-duplex exchange of a buffer, in place
    pub fn transfer_in_place<M: BitbangSpiMaster + ?Sized>(master: &mut M, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = transfer_byte(master, *byte);
        }
    }
}

/// Manual-mode pin access through the SPI control register
///
/// Entering manual mode disables memory-mapped flash reads. Code running
/// while a `ManualPins` is alive must therefore not execute from flash.
pub struct ManualPins<'a, P: RegisterPort + ?Sized> {
    port: &'a mut P,
    /// Register bits above the pin byte, fixed while in manual mode
    upper: u32,
    /// Current pin byte (IO values, CLK, CS#)
    pins: u32,
}

impl<'a, P: RegisterPort + ?Sized> ManualPins<'a, P> {
    /// Deselect the chip, enable the IO0 driver and switch to manual mode
    pub fn enter(port: &'a mut P) -> Self {
        port.modify_word(
            regs::SPI_CTRL,
            regs::SPI_CTRL_MANUAL_MASK,
            regs::SPI_CTRL_IO0_OE | regs::SPI_CTRL_CS,
        );
        let value = port.modify_word(regs::SPI_CTRL, regs::SPI_CTRL_BYTE3_MASK, 0);
        Self {
            port,
            upper: value & !regs::SPI_CTRL_PIN_MASK,
            pins: regs::SPI_CTRL_CS,
        }
    }

    /// Deselect the chip and hand the flash back to the memio controller
    pub fn release(self) {
        self.port
            .write_word(regs::SPI_CTRL, self.upper | regs::SPI_CTRL_CS);
        self.port.modify_word(
            regs::SPI_CTRL,
            regs::SPI_CTRL_BYTE3_MASK,
            regs::SPI_CTRL_MEMIO_EN,
        );
    }

    /// Deselect the chip and drive CLK and IO0 low, ending a frame
    pub fn deselect(&mut self) {
        self.pins = regs::SPI_CTRL_CS;
        self.flush();
    }

    fn update(&mut self, bit: u32, high: bool) {
        if high {
            self.pins |= bit;
        } else {
            self.pins &= !bit;
        }
    }

    fn flush(&mut self) {
        self.port.write_word(regs::SPI_CTRL, self.upper | self.pins);
    }
}

impl<P: RegisterPort + ?Sized> BitbangSpiMaster for ManualPins<'_, P> {
    fn set_cs(&mut self, active: bool) {
        self.update(regs::SPI_CTRL_CS, !active);
        self.flush();
    }

    fn set_sck(&mut self, high: bool) {
        self.update(regs::SPI_CTRL_CLK, high);
        self.flush();
    }

    fn set_mosi(&mut self, high: bool) {
        self.update(regs::SPI_CTRL_IO0, high);
        self.flush();
    }

    fn get_miso(&mut self) -> bool {
        self.port.read_word(regs::SPI_CTRL) & regs::SPI_CTRL_IO1 != 0
    }

    fn set_sck_set_mosi(&mut self, sck: bool, mosi: bool) {
        self.update(regs::SPI_CTRL_CLK, sck);
        self.update(regs::SPI_CTRL_IO0, mosi);
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records pin writes; MISO echoes MOSI
    #[derive(Default)]
    struct Loopback {
        value: u32,
        clock_edges: usize,
    }

    impl RegisterPort for Loopback {
        fn read_word(&mut self, _address: u32) -> u32 {
            let mosi = self.value & regs::SPI_CTRL_IO0;
            (self.value & !regs::SPI_CTRL_IO1) | (mosi << 1)
        }

        fn write_word(&mut self, _address: u32, value: u32) {
            if value & regs::SPI_CTRL_CLK != 0 && self.value & regs::SPI_CTRL_CLK == 0 {
                self.clock_edges += 1;
            }
            self.value = value;
        }
    }

    #[test]
    fn test_transfer_loopback() {
        let mut port = Loopback {
            value: 0x8024_0000,
            ..Loopback::default()
        };
        let mut buf = [0xa5, 0x3c, 0x00, 0xff];
        {
            let mut pins = ManualPins::enter(&mut port);
            assert_eq!(pins.port.read_word(regs::SPI_CTRL) >> 24, 0);
            pins.set_cs(true);
            single::transfer_in_place(&mut pins, &mut buf);
            pins.release();
        }

        assert_eq!(buf, [0xa5, 0x3c, 0x00, 0xff]);
        assert_eq!(port.clock_edges, 32);
        // Memio back on, configuration untouched, chip deselected
        assert_eq!(
            port.value,
            0x8024_0000 | regs::SPI_CTRL_IO0_OE | regs::SPI_CTRL_CS
        );
    }
}
