//! Ring-buffered UART
//!
//! This module decodes the UART status word and provides a polled byte
//! transport on top of it.

mod status;
mod transport;

pub use status::{OverflowFlags, RingState, UartStatusWord, RING_SLOTS};
pub use transport::UartRingTransport;
