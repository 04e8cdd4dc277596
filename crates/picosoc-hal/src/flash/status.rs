//! Flash status register decoding
//!
//! The W25Q family exposes three 8-bit status registers. Each bit has a
//! fixed position, so decoding is a positional bit map.

use bitflags::bitflags;

bitflags! {
    /// Status Register 1 (read with `0x05`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status1: u8 {
        /// Erase/write in progress
        const BUSY = 1 << 0;
        /// Write Enable Latch
        const WEL  = 1 << 1;
        /// Block Protect bit 0
        const BP0  = 1 << 2;
        /// Block Protect bit 1
        const BP1  = 1 << 3;
        /// Block Protect bit 2
        const BP2  = 1 << 4;
        /// Top/Bottom Protect
        const TB   = 1 << 5;
        /// Sector/Block Protect
        const SEC  = 1 << 6;
        /// Status Register Protect
        const SRP  = 1 << 7;
    }
}

bitflags! {
    /// Status Register 2 (read with `0x35`)
    ///
    /// Bit 2 is reserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status2: u8 {
        /// Status Register Lock
        const SRL = 1 << 0;
        /// Quad Enable - IO2/IO3 act as data pins
        const QE  = 1 << 1;
        /// Security Register Lock bit 1
        const LB1 = 1 << 3;
        /// Security Register Lock bit 2
        const LB2 = 1 << 4;
        /// Security Register Lock bit 3
        const LB3 = 1 << 5;
        /// Complement Protect
        const CMP = 1 << 6;
        /// Erase/Program Suspend status
        const SUS = 1 << 7;
    }
}

bitflags! {
    /// Status Register 3 (read with `0x15`)
    ///
    /// Bits 0, 1, 3 and 4 are reserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status3: u8 {
        /// Write Protect Selection
        const WPS  = 1 << 2;
        /// Output Driver Strength bit 0
        const DRV0 = 1 << 5;
        /// Output Driver Strength bit 1
        const DRV1 = 1 << 6;
        /// HOLD#/RESET# pin function
        const HOLD = 1 << 7;
    }
}

/// One named bit of a status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBit {
    /// Bit number across all three registers (S0..S23)
    pub index: u8,
    /// Datasheet name, `None` for reserved bits
    pub name: Option<&'static str>,
    /// Current value
    pub set: bool,
}

const SR1_NAMES: [Option<&str>; 8] = [
    Some("BUSY"),
    Some("WEL"),
    Some("BP0"),
    Some("BP1"),
    Some("BP2"),
    Some("TB"),
    Some("SEC"),
    Some("SRP"),
];
const SR2_NAMES: [Option<&str>; 8] = [
    Some("SRL"),
    Some("QE"),
    None,
    Some("LB1"),
    Some("LB2"),
    Some("LB3"),
    Some("CMP"),
    Some("SUS"),
];
const SR3_NAMES: [Option<&str>; 8] = [
    None,
    None,
    Some("WPS"),
    None,
    None,
    Some("DRV0"),
    Some("DRV1"),
    Some("HOLD"),
];

/// Snapshot of all three status registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlashStatus {
    /// Status Register 1
    pub sr1: Status1,
    /// Status Register 2
    pub sr2: Status2,
    /// Status Register 3
    pub sr3: Status3,
}

impl FlashStatus {
    /// Decode from raw register bytes; reserved bits are kept
    pub const fn from_bytes(sr1: u8, sr2: u8, sr3: u8) -> Self {
        Self {
            sr1: Status1::from_bits_retain(sr1),
            sr2: Status2::from_bits_retain(sr2),
            sr3: Status3::from_bits_retain(sr3),
        }
    }

    /// Returns true if the chip is in quad mode (QE set)
    pub fn quad_enabled(&self) -> bool {
        self.sr2.contains(Status2::QE)
    }

    /// All 24 bits, S0 first, in datasheet order
    pub fn bits(&self) -> impl Iterator<Item = StatusBit> {
        let regs = [
            (self.sr1.bits(), &SR1_NAMES),
            (self.sr2.bits(), &SR2_NAMES),
            (self.sr3.bits(), &SR3_NAMES),
        ];
        regs.into_iter().enumerate().flat_map(|(reg, (value, names))| {
            (0..8u8).map(move |bit| StatusBit {
                index: reg as u8 * 8 + bit,
                name: names[bit as usize],
                set: value & (1 << bit) != 0,
            })
        })
    }
}
