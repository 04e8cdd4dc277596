//! UART ring-buffer status word
//!
//! The UART keeps one 128-slot hardware ring per direction. Its status
//! register packs both rings' pointers into one word:
//!
//! | Bits   | Field        |
//! |--------|--------------|
//! | 0..=6  | RX tail      |
//! | 7..=13 | RX head      |
//! | 14..=20| TX tail      |
//! | 21..=27| TX head      |
//! | 28     | RX equal flag|
//! | 29     | TX equal flag|
//! | 30     | RX overflow  |
//! | 31     | TX overflow  |
//!
//! When head and tail coincide the ring is either empty or full; the equal
//! flag tells which (0 = empty, 1 = full). There is no occupancy counter, so
//! every consumer has to go through [`RingState`] rather than compare the
//! pointers directly.

use bitflags::bitflags;

/// Number of slots in each hardware ring
pub const RING_SLOTS: usize = 128;

const POINTER_MASK: u32 = 0x7f;

const TAIL_RX_SHIFT: u32 = 0;
const HEAD_RX_SHIFT: u32 = 7;
const TAIL_TX_SHIFT: u32 = 14;
const HEAD_TX_SHIFT: u32 = 21;
const EQUAL_RX_BIT: u32 = 1 << 28;
const EQUAL_TX_BIT: u32 = 1 << 29;
const OVERFLOW_RX_BIT: u32 = 1 << 30;
const OVERFLOW_TX_BIT: u32 = 1 << 31;

bitflags! {
    /// Sticky overflow flags
    ///
    /// Once set, a flag stays set until the SoC is reset. By the time it is
    /// observed, data has already been dropped.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OverflowFlags: u8 {
        /// RX ring overflowed: incoming bytes were dropped
        const RX = 1 << 0;
        /// TX ring overflowed: outgoing bytes were dropped
        const TX = 1 << 1;
    }
}

/// Decoded state of one hardware ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct RingState {
    /// Write pointer (7 bits)
    pub head: u8,
    /// Read pointer (7 bits)
    pub tail: u8,
    /// Equal flag: with `head == tail`, set means full, clear means empty
    pub equal: bool,
    /// Sticky overflow flag
    pub overflow: bool,
}

impl RingState {
    /// Returns true if the ring holds no data
    pub const fn is_empty(&self) -> bool {
        self.head == self.tail && !self.equal
    }

    /// Returns true if every slot is occupied
    pub const fn is_full(&self) -> bool {
        self.head == self.tail && self.equal
    }

    /// Number of occupied slots (0..=128)
    pub const fn len(&self) -> usize {
        if self.is_full() {
            RING_SLOTS
        } else {
            (self.head.wrapping_sub(self.tail) as usize) & (RING_SLOTS - 1)
        }
    }

    /// Number of free slots (0..=128)
    pub const fn free(&self) -> usize {
        RING_SLOTS - self.len()
    }
}

/// Raw UART status register value
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct UartStatusWord(u32);

impl UartStatusWord {
    /// Wrap a raw register value
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Encode the two ring states into a register value
    ///
    /// Pointers are truncated to 7 bits.
    pub const fn new(rx: RingState, tx: RingState) -> Self {
        let mut bits = ((rx.tail as u32 & POINTER_MASK) << TAIL_RX_SHIFT)
            | ((rx.head as u32 & POINTER_MASK) << HEAD_RX_SHIFT)
            | ((tx.tail as u32 & POINTER_MASK) << TAIL_TX_SHIFT)
            | ((tx.head as u32 & POINTER_MASK) << HEAD_TX_SHIFT);
        if rx.equal {
            bits |= EQUAL_RX_BIT;
        }
        if tx.equal {
            bits |= EQUAL_TX_BIT;
        }
        if rx.overflow {
            bits |= OVERFLOW_RX_BIT;
        }
        if tx.overflow {
            bits |= OVERFLOW_TX_BIT;
        }
        Self(bits)
    }

    /// Get the raw register value
    pub const fn bits(&self) -> u32 {
        self.0
    }

    const fn pointer(&self, shift: u32) -> u8 {
        ((self.0 >> shift) & POINTER_MASK) as u8
    }

    /// RX ring read pointer
    pub const fn tail_rx(&self) -> u8 {
        self.pointer(TAIL_RX_SHIFT)
    }

    /// RX ring write pointer
    pub const fn head_rx(&self) -> u8 {
        self.pointer(HEAD_RX_SHIFT)
    }

    /// TX ring read pointer
    pub const fn tail_tx(&self) -> u8 {
        self.pointer(TAIL_TX_SHIFT)
    }

    /// TX ring write pointer
    pub const fn head_tx(&self) -> u8 {
        self.pointer(HEAD_TX_SHIFT)
    }

    /// Decode the receive ring
    pub const fn rx(&self) -> RingState {
        RingState {
            head: self.head_rx(),
            tail: self.tail_rx(),
            equal: self.0 & EQUAL_RX_BIT != 0,
            overflow: self.0 & OVERFLOW_RX_BIT != 0,
        }
    }

    /// Decode the transmit ring
    pub const fn tx(&self) -> RingState {
        RingState {
            head: self.head_tx(),
            tail: self.tail_tx(),
            equal: self.0 & EQUAL_TX_BIT != 0,
            overflow: self.0 & OVERFLOW_TX_BIT != 0,
        }
    }

    /// Get both sticky overflow flags
    pub fn overflow(&self) -> OverflowFlags {
        let mut flags = OverflowFlags::empty();
        flags.set(OverflowFlags::RX, self.0 & OVERFLOW_RX_BIT != 0);
        flags.set(OverflowFlags::TX, self.0 & OVERFLOW_TX_BIT != 0);
        flags
    }
}

impl core::fmt::Debug for UartStatusWord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UartStatusWord")
            .field("bits", &format_args!("0x{:08X}", self.0))
            .field("rx", &self.rx())
            .field("tx", &self.tx())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_positions() {
        // tailRX=1, headRX=2, tailTX=3, headTX=4, all flags set
        let bits = 1 | (2 << 7) | (3 << 14) | (4 << 21) | (0xf << 28);
        let word = UartStatusWord::from_bits(bits);

        assert_eq!(word.tail_rx(), 1);
        assert_eq!(word.head_rx(), 2);
        assert_eq!(word.tail_tx(), 3);
        assert_eq!(word.head_tx(), 4);
        assert!(word.rx().equal);
        assert!(word.tx().equal);
        assert_eq!(word.overflow(), OverflowFlags::RX | OverflowFlags::TX);
    }

    #[test]
    fn test_encode_matches_decode() {
        let rx = RingState {
            head: 0x7f,
            tail: 0x00,
            equal: false,
            overflow: true,
        };
        let tx = RingState {
            head: 0x15,
            tail: 0x6a,
            equal: true,
            overflow: false,
        };
        let word = UartStatusWord::new(rx, tx);

        assert_eq!(word.rx(), rx);
        assert_eq!(word.tx(), tx);
        assert_eq!(word.overflow(), OverflowFlags::RX);
    }

    #[test]
    fn test_fullness_whole_domain() {
        for head in 0..RING_SLOTS as u8 {
            for tail in 0..RING_SLOTS as u8 {
                for equal in [false, true] {
                    let state = RingState {
                        head,
                        tail,
                        equal,
                        overflow: false,
                    };

                    // Decode through the register for both rings
                    let word = UartStatusWord::new(state, state);
                    for ring in [word.rx(), word.tx()] {
                        assert_eq!(ring.is_full(), head == tail && equal);
                        assert_eq!(ring.is_empty(), head == tail && !equal);

                        let expected = if head == tail {
                            if equal {
                                RING_SLOTS
                            } else {
                                0
                            }
                        } else {
                            (head as usize + RING_SLOTS - tail as usize) % RING_SLOTS
                        };
                        assert_eq!(ring.len(), expected);
                        assert_eq!(ring.free(), RING_SLOTS - expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_equal_flag_ignored_when_pointers_differ() {
        let state = RingState {
            head: 5,
            tail: 3,
            equal: true,
            overflow: false,
        };
        assert!(!state.is_full());
        assert!(!state.is_empty());
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_wrapped_pointers() {
        let state = RingState {
            head: 2,
            tail: 126,
            equal: false,
            overflow: false,
        };
        assert_eq!(state.len(), 4);
        assert_eq!(state.free(), 124);
    }
}
