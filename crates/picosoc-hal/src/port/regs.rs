//! PicoSoC register map and bit definitions
//!
//! Addresses are byte addresses of 32-bit registers. Bit definitions for
//! the SPI control register follow the `spimemio` controller layout.

// ============================================================================
// Register addresses
// ============================================================================

/// SPI flash controller configuration / manual pin control (read/write)
pub const SPI_CTRL: u32 = 0x0200_0000;
/// UART ring-buffer status (read-only)
pub const UART_STATUS: u32 = 0x0200_0004;
/// UART data, byte in the low 8 bits (read pops RX, write pushes TX)
pub const UART_DATA: u32 = 0x0200_0008;
/// LED output (write-only)
pub const LEDS: u32 = 0x0300_0000;

/// First address of the SPI/UART register block
pub const SPI_UART_BASE: u32 = SPI_CTRL;
/// Size of the SPI/UART register block in bytes
pub const SPI_UART_SIZE: u32 = 0x0c;
/// Size of the LED register block in bytes
pub const LEDS_SIZE: u32 = 0x04;

// ============================================================================
// SPI control register - manual mode pins (bits 0..=11)
// ============================================================================

/// IO0 value (MOSI in single-wire mode)
pub const SPI_CTRL_IO0: u32 = 1 << 0;
/// IO1 value (MISO in single-wire mode, read back from the pin)
pub const SPI_CTRL_IO1: u32 = 1 << 1;
/// Serial clock
pub const SPI_CTRL_CLK: u32 = 1 << 4;
/// Chip select, active low
pub const SPI_CTRL_CS: u32 = 1 << 5;
/// IO0 output enable
pub const SPI_CTRL_IO0_OE: u32 = 1 << 8;
/// Mask of the manual-mode pin byte written per clock edge
pub const SPI_CTRL_PIN_MASK: u32 = 0x0000_00ff;
/// Mask of the manual-mode half word (pins + output enables)
pub const SPI_CTRL_MANUAL_MASK: u32 = 0x0000_ffff;

// ============================================================================
// SPI control register - configuration (bits 16..=31)
// ============================================================================

/// Shift of the latency (dummy cycle) field
pub const SPI_CTRL_LATENCY_SHIFT: u32 = 16;
/// Latency field mask (4 bits)
pub const SPI_CTRL_LATENCY_MASK: u32 = 0xf << SPI_CTRL_LATENCY_SHIFT;
/// Continuous read mode enable
pub const SPI_CTRL_CRM: u32 = 1 << 20;
/// Quad SPI enable
pub const SPI_CTRL_QSPI: u32 = 1 << 21;
/// Double data rate enable (only meaningful together with QSPI)
pub const SPI_CTRL_DDR: u32 = 1 << 22;
/// Dual I/O enable
pub const SPI_CTRL_DUAL: u32 = 1 << 23;
/// Mode field: latency, CRM and the signalling-mode bits
pub const SPI_CTRL_MODE_MASK: u32 = 0x00ff_0000;
/// Byte 3 of the register (memio enable lives in its top bit)
pub const SPI_CTRL_BYTE3_MASK: u32 = 0xff00_0000;
/// Memory-mapped flash reads enabled; clear for manual pin control
pub const SPI_CTRL_MEMIO_EN: u32 = 1 << 31;
