//! SPI flash interface
//!
//! This module provides the command exchange with the flash chip
//! ([`FlashRegisterAccessor`]) and the mode state machine of the `spimemio`
//! controller ([`FlashModeController`]).

mod accessor;
pub mod bitbang;
mod controller;
mod mode;
pub mod opcodes;
mod status;

pub use accessor::{FlashRegisterAccessor, JedecId, DEVICE_ID_LEN, MAX_RESPONSE_LEN};
pub use controller::FlashModeController;
pub use mode::{FlashMode, ModeEncoding, SpiControlWord};
pub use status::{FlashStatus, Status1, Status2, Status3, StatusBit};
