//! Flash command exchange
//!
//! Commands are issued by bitbanging the flash pins through the SPI control
//! register. An exchange clocks a buffer out MSB first and overwrites each
//! byte with what the chip drove back during the same eight clocks, so for
//! a read the response starts at index 1 (index 0 held the opcode).
//!
//! There are no retries and no error detection: an absent or misbehaving
//! chip simply reads back as `0x00` or `0xFF`.
//!
//! # Running from RAM
//!
//! Memory-mapped flash reads are disabled for the duration of every
//! exchange. On hardware that executes from flash, the firmware must link
//! the code reachable from [`FlashRegisterAccessor::transfer`] into RAM.

use super::bitbang::{single, BitbangSpiMaster, ManualPins};
use super::opcodes;
use super::status::{FlashStatus, Status1, Status2, Status3};
use crate::error::{Error, Result};
use crate::port::RegisterPort;

/// Maximum number of response bytes [`FlashRegisterAccessor::read_bytes`] returns
pub const MAX_RESPONSE_LEN: usize = 32;

/// Number of response bytes read for the device ID dump
pub const DEVICE_ID_LEN: usize = 16;

/// JEDEC manufacturer and device identification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct JedecId {
    /// Manufacturer ID (0xEF = Winbond)
    pub manufacturer: u8,
    /// Memory type byte
    pub memory_type: u8,
    /// Capacity byte (log2 of the size in bytes)
    pub capacity: u8,
}

impl JedecId {
    /// Memory type and capacity as one 16-bit device ID
    pub fn device_id(&self) -> u16 {
        ((self.memory_type as u16) << 8) | (self.capacity as u16)
    }

    /// Flash size in bytes, if the capacity byte is a plausible exponent
    pub fn size(&self) -> Option<u32> {
        1u32.checked_shl(self.capacity as u32)
    }
}

/// Issues commands to the flash chip and reads back registers
#[derive(Debug)]
pub struct FlashRegisterAccessor<P> {
    port: P,
}

impl<P: RegisterPort> FlashRegisterAccessor<P> {
    /// Create an accessor on the SPI control register port
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// Get a mutable reference to the register port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Release the register port
    pub fn into_inner(self) -> P {
        self.port
    }

    /// Exchange `buf` with the chip, in place
    ///
    /// If `wren` is given, that opcode is sent in its own chip-select frame
    /// first (e.g. [`opcodes::WREN`] or [`opcodes::VWREN`]).
    pub fn transfer(&mut self, buf: &mut [u8], wren: Option<u8>) {
        log::trace!(
            "flash exchange: opcode 0x{:02X}, {} bytes, wren {:?}",
            buf.first().copied().unwrap_or(0),
            buf.len(),
            wren
        );

        let mut pins = ManualPins::enter(&mut self.port);

        if let Some(cmd) = wren {
            pins.set_cs(true);
            single::write_byte(&mut pins, cmd);
            pins.deselect();
        }

        if !buf.is_empty() {
            pins.set_cs(true);
            single::transfer_in_place(&mut pins, buf);
        }

        pins.release();
    }

    /// Send `opcode` and return the single response byte
    pub fn read_status_register(&mut self, opcode: u8) -> u8 {
        let mut buf = [opcode, 0];
        self.transfer(&mut buf, None);
        buf[1]
    }

    /// Send `opcode` followed by `len` dummy bytes and return the response
    pub fn read_bytes(
        &mut self,
        opcode: u8,
        len: usize,
    ) -> Result<heapless::Vec<u8, MAX_RESPONSE_LEN>> {
        if len > MAX_RESPONSE_LEN {
            return Err(Error::BufferTooSmall);
        }

        let mut buf = [0u8; MAX_RESPONSE_LEN + 1];
        buf[0] = opcode;
        self.transfer(&mut buf[..=len], None);

        let mut response = heapless::Vec::new();
        response
            .extend_from_slice(&buf[1..=len])
            .map_err(|_| Error::BufferTooSmall)?;
        Ok(response)
    }

    /// Read the 16-byte response to the JEDEC ID command
    ///
    /// The first three bytes are the JEDEC ID; what follows is chip-specific.
    pub fn read_device_id(&mut self) -> [u8; DEVICE_ID_LEN] {
        let mut buf = [0u8; DEVICE_ID_LEN + 1];
        buf[0] = opcodes::RDID;
        self.transfer(&mut buf, None);

        let mut id = [0u8; DEVICE_ID_LEN];
        id.copy_from_slice(&buf[1..]);
        id
    }

    /// Read the JEDEC ID
    pub fn read_jedec_id(&mut self) -> JedecId {
        let mut buf = [opcodes::RDID, 0, 0, 0];
        self.transfer(&mut buf, None);
        JedecId {
            manufacturer: buf[1],
            memory_type: buf[2],
            capacity: buf[3],
        }
    }

    /// Read the status register 1
    pub fn read_status1(&mut self) -> Status1 {
        Status1::from_bits_retain(self.read_status_register(opcodes::RDSR))
    }

    /// Read the status register 2
    pub fn read_status2(&mut self) -> Status2 {
        Status2::from_bits_retain(self.read_status_register(opcodes::RDSR2))
    }

    /// Read the status register 3
    pub fn read_status3(&mut self) -> Status3 {
        Status3::from_bits_retain(self.read_status_register(opcodes::RDSR3))
    }

    /// Read all three status registers
    pub fn read_all_status(&mut self) -> FlashStatus {
        FlashStatus {
            sr1: self.read_status1(),
            sr2: self.read_status2(),
            sr3: self.read_status3(),
        }
    }

    /// Write status register 2 without touching its non-volatile copy
    ///
    /// Sends Volatile SR Write Enable (`0x50`) then WRSR2 (`0x31`). The value
    /// is lost on power cycle.
    pub fn write_status_register2_volatile(&mut self, value: u8) {
        let mut buf = [opcodes::WRSR2, value];
        self.transfer(&mut buf, Some(opcodes::VWREN));
    }

    /// Set the chip's Quad Enable bit (volatile)
    ///
    /// Required before the controller may switch to a quad mode.
    pub fn set_quad_enable(&mut self) {
        let sr2 = self.read_status2();
        log::debug!("setting flash QE (SR2 was 0x{:02X})", sr2.bits());
        self.write_status_register2_volatile((sr2 | Status2::QE).bits());
    }
}
