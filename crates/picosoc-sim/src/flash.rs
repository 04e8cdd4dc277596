//! Bit-level SPI flash chip model
//!
//! The model sits on the manual-mode pins of the SPI control register: it
//! sees chip select edges and rising clock edges, samples IO0 and drives
//! IO1. Only the commands the firmware issues are implemented.

use picosoc_hal::flash::{opcodes, Status1};

/// Configuration for the simulated flash chip
#[derive(Debug, Clone)]
pub struct FlashConfig {
    /// Bytes returned by the JEDEC ID command; later bytes read as 0x00
    pub id: Vec<u8>,
    /// Initial status registers 1, 2, 3
    pub status: [u8; 3],
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            id: vec![0xEF, 0x40, 0x18], // Winbond W25Q128
            status: [0x00, 0x00, 0x60],
        }
    }
}

/// A frame in progress (chip selected)
#[derive(Debug, Default)]
struct Frame {
    bytes: Vec<u8>,
    shift_in: u8,
    bit: u8,
    out: u8,
}

/// Simulated SPI flash
#[derive(Debug)]
pub struct SimFlash {
    config: FlashConfig,
    status: [u8; 3],
    write_enabled: bool,
    volatile_write_enabled: bool,
    frame: Option<Frame>,
    history: Vec<Vec<u8>>,
}

impl SimFlash {
    /// Create a flash chip from `config`
    pub fn new(config: FlashConfig) -> Self {
        Self {
            status: config.status,
            config,
            write_enabled: false,
            volatile_write_enabled: false,
            frame: None,
            history: Vec::new(),
        }
    }

    /// Current status registers 1, 2, 3 (SR1 includes the WEL bit)
    pub fn status(&self) -> [u8; 3] {
        let mut status = self.status;
        if self.write_enabled {
            status[0] |= Status1::WEL.bits();
        }
        status
    }

    /// Overwrite the status registers
    pub fn set_status(&mut self, status: [u8; 3]) {
        self.status = status;
    }

    /// Every completed frame, as received on MOSI
    pub fn history(&self) -> &[Vec<u8>] {
        &self.history
    }

    /// Returns true while chip select is asserted
    pub fn selected(&self) -> bool {
        self.frame.is_some()
    }

    /// Chip select asserted
    pub fn select(&mut self) {
        self.frame = Some(Frame::default());
    }

    /// Chip select released: execute the command received
    pub fn deselect(&mut self) {
        let Some(frame) = self.frame.take() else {
            return;
        };
        if frame.bytes.is_empty() {
            return;
        }
        self.execute(&frame.bytes);
        self.history.push(frame.bytes);
    }

    /// Rising clock edge with `mosi` on IO0; returns the level driven on IO1
    pub fn clock(&mut self, mosi: bool) -> bool {
        let Some(mut frame) = self.frame.take() else {
            return false;
        };
        if frame.bit == 0 {
            frame.out = self.response(&frame.bytes);
        }
        let miso = frame.out & (0x80 >> frame.bit) != 0;

        frame.shift_in = (frame.shift_in << 1) | mosi as u8;
        frame.bit += 1;
        if frame.bit == 8 {
            frame.bytes.push(frame.shift_in);
            frame.shift_in = 0;
            frame.bit = 0;
        }

        self.frame = Some(frame);
        miso
    }

    /// Byte driven during byte `received.len()` of the frame
    fn response(&self, received: &[u8]) -> u8 {
        let Some(&opcode) = received.first() else {
            return 0x00;
        };
        let index = received.len() - 1;
        match opcode {
            opcodes::RDID => self.config.id.get(index).copied().unwrap_or(0x00),
            // Status registers are output continuously
            opcodes::RDSR => self.status()[0],
            opcodes::RDSR2 => self.status()[1],
            opcodes::RDSR3 => self.status()[2],
            _ => 0xFF,
        }
    }

    fn execute(&mut self, bytes: &[u8]) {
        let volatile = core::mem::take(&mut self.volatile_write_enabled);
        let may_write = volatile || self.write_enabled;

        match bytes {
            [opcodes::WREN] => self.write_enabled = true,
            [opcodes::VWREN] => self.volatile_write_enabled = true,
            [opcodes::WRSR, sr1, rest @ ..] if may_write => {
                self.status[0] = *sr1;
                if let Some(sr2) = rest.first() {
                    self.status[1] = *sr2;
                }
                self.write_enabled = false;
            }
            [opcodes::WRSR2, sr2, ..] if may_write => {
                self.status[1] = *sr2;
                self.write_enabled = false;
            }
            [opcodes::WRSR3, sr3, ..] if may_write => {
                self.status[2] = *sr3;
                self.write_enabled = false;
            }
            [opcode, ..] => log::trace!("sim flash: opcode 0x{:02X} ignored", opcode),
            [] => {}
        }
    }
}
