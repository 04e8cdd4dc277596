//! Error types for picosoc-hal
//!
//! Register I/O cannot fail observably, so the taxonomy here only covers
//! precondition checks, bounded polling and buffer sizing.

use thiserror::Error;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    // Flash mode errors
    /// Quad mode requested but the chip's QE bit (status register 2) is clear
    #[error("flash quad enable (QE) bit is not set")]
    QuadNotEnabled,
    /// QSPI enable did not read back as set before enabling DDR
    #[error("QSPI enable not confirmed by the SPI control register")]
    QspiNotConfirmed,
    /// Mode bit patterns overlap, leave the mode field or set DDR without QSPI
    #[error("invalid flash mode encoding")]
    InvalidModeEncoding,

    // Polling errors
    /// A bounded wait strategy ran out of polls
    #[error("operation timed out")]
    Timeout,

    // Buffer errors
    /// Requested response does not fit the fixed-capacity buffer
    #[error("buffer too small")]
    BufferTooSmall,
}

impl embedded_io::Error for Error {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Self::Timeout => embedded_io::ErrorKind::TimedOut,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
