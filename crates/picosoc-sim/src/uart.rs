//! Simulated UART rings

use picosoc_hal::uart::{RingState, UartStatusWord, RING_SLOTS};

/// One 128-slot hardware ring with head/tail pointers and an equal flag
#[derive(Debug, Clone)]
pub struct Ring {
    slots: [u8; RING_SLOTS],
    head: u8,
    tail: u8,
    equal: bool,
    overflow: bool,
}

impl Default for Ring {
    fn default() -> Self {
        Self {
            slots: [0; RING_SLOTS],
            head: 0,
            tail: 0,
            equal: false,
            overflow: false,
        }
    }
}

impl Ring {
    /// Decoded pointer state, as the status register reports it
    pub fn state(&self) -> RingState {
        RingState {
            head: self.head,
            tail: self.tail,
            equal: self.equal,
            overflow: self.overflow,
        }
    }

    /// Start the ring at an arbitrary pointer position (empty)
    pub fn reset_to(&mut self, pointer: u8) {
        self.head = pointer & 0x7f;
        self.tail = self.head;
        self.equal = false;
    }

    /// Push a byte; on a full ring the byte is dropped and overflow latched
    pub fn push(&mut self, byte: u8) -> bool {
        if self.state().is_full() {
            if !self.overflow {
                log::debug!("sim ring overflow");
            }
            self.overflow = true;
            return false;
        }
        self.slots[self.head as usize] = byte;
        self.head = (self.head + 1) & 0x7f;
        self.equal = self.head == self.tail;
        true
    }

    /// Pop the oldest byte
    pub fn pop(&mut self) -> Option<u8> {
        if self.state().is_empty() {
            return None;
        }
        let byte = self.slots[self.tail as usize];
        self.tail = (self.tail + 1) & 0x7f;
        self.equal = false;
        Some(byte)
    }
}

/// UART with an RX ring (host to SoC) and a TX ring (SoC to host)
#[derive(Debug, Clone, Default)]
pub struct SimUart {
    /// Bytes waiting for the firmware to read
    pub rx: Ring,
    /// Bytes the firmware wrote, waiting for the line
    pub tx: Ring,
}

impl SimUart {
    /// Current status register value
    pub fn status(&self) -> UartStatusWord {
        UartStatusWord::new(self.rx.state(), self.tx.state())
    }
}
