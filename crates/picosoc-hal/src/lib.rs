//! picosoc-hal - Register-level peripheral access for PicoSoC
//!
//! This crate owns the memory-mapped peripherals of a PicoRV32-based SoC:
//! the ring-buffered UART and the `spimemio` SPI flash controller. It is
//! `no_std` and strictly polled; there is no interrupt or DMA support.
//!
//! Every component takes its register port by constructor injection, so
//! the same code runs against physical registers ([`port::Mmio`]) and
//! against a simulated register file in tests.
//!
//! # Features
//!
//! - `std` - Enable `serde` derives on the configuration and decoded types
//!
//! # Example
//!
//! ```ignore
//! use picosoc_hal::flash::{FlashMode, FlashModeController, FlashRegisterAccessor};
//! use picosoc_hal::port::Peripherals;
//! use picosoc_hal::uart::UartRingTransport;
//!
//! let p = unsafe { Peripherals::steal() };
//! let mut uart = UartRingTransport::new(p.uart);
//! let mut flash = FlashModeController::new(FlashRegisterAccessor::new(p.spi));
//!
//! flash.accessor_mut().set_quad_enable();
//! flash.set_mode(FlashMode::QuadDdr)?;
//! uart.send_bytes_blocking(b"flash in QDDR mode\r\n")?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod flash;
pub mod led;
pub mod poll;
pub mod port;
pub mod uart;

pub use error::{Error, Result};
