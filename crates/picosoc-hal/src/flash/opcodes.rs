//! SPI flash opcodes used by the PicoSoC firmware
//!
//! These are the standard JEDEC / Winbond W25Q command bytes for the
//! commands this crate issues.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any non-volatile write
pub const WREN: u8 = 0x06;
/// Write Enable for Volatile Status Register
pub const VWREN: u8 = 0x50;

// ============================================================================
// Status register operations
// ============================================================================

/// Read Status Register 1
pub const RDSR: u8 = 0x05;
/// Read Status Register 2
pub const RDSR2: u8 = 0x35;
/// Read Status Register 3
pub const RDSR3: u8 = 0x15;
/// Write Status Register 1
pub const WRSR: u8 = 0x01;
/// Write Status Register 2
pub const WRSR2: u8 = 0x31;
/// Write Status Register 3
pub const WRSR3: u8 = 0x11;

// ============================================================================
// Identification
// ============================================================================

/// Read JEDEC ID (manufacturer + device ID)
pub const RDID: u8 = 0x9F;

// ============================================================================
// Memory-mapped read commands issued by the controller
// ============================================================================

/// Read Data (single-wire mode)
pub const READ: u8 = 0x03;
/// Dual I/O Read (1-2-2)
pub const DIOR: u8 = 0xBB;
/// Quad I/O Read (1-4-4)
pub const QIOR: u8 = 0xEB;
/// DTR Quad I/O Read
pub const DTR_QIOR: u8 = 0xED;
