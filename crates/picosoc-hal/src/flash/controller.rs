//! Flash interface mode state machine
//!
//! The controller starts in [`FlashMode::Spi`] (the `spimemio` reset
//! default) and moves between modes by rewriting the mode field of the SPI
//! control register. It never caches the mode: every transition is a
//! read-modify-write of the live register, and [`FlashModeController::mode`]
//! decodes the register each time.
//!
//! Transitions are one-way register writes with no rollback:
//!
//! | Target    | Precondition                                      |
//! |-----------|---------------------------------------------------|
//! | `Spi`     | none (recovery path)                              |
//! | `Dual`    | none                                              |
//! | `Quad`    | chip QE bit set (status register 2)               |
//! | `QuadDdr` | reaches `Quad` first, then QSPI must read back set |
//!
//! Continuous read mode is a separate bit and never changes the mode.

use super::accessor::FlashRegisterAccessor;
use super::mode::{FlashMode, ModeEncoding, SpiControlWord};
use super::status::Status2;
use crate::error::{Error, Result};
use crate::port::{regs, RegisterPort};

/// Drives the SPI control register between flash modes
#[derive(Debug)]
pub struct FlashModeController<P> {
    flash: FlashRegisterAccessor<P>,
    encoding: ModeEncoding,
}

impl<P: RegisterPort> FlashModeController<P> {
    /// Create a controller with the PicoSoC mode encoding
    pub fn new(flash: FlashRegisterAccessor<P>) -> Self {
        Self {
            flash,
            encoding: ModeEncoding::PICOSOC,
        }
    }

    /// Create a controller with a custom mode encoding
    pub fn with_encoding(flash: FlashRegisterAccessor<P>, encoding: ModeEncoding) -> Result<Self> {
        encoding.validate()?;
        Ok(Self { flash, encoding })
    }

    /// Get the mode encoding in use
    pub fn encoding(&self) -> &ModeEncoding {
        &self.encoding
    }

    /// Get a mutable reference to the flash accessor
    pub fn accessor_mut(&mut self) -> &mut FlashRegisterAccessor<P> {
        &mut self.flash
    }

    /// Release the flash accessor
    pub fn into_inner(self) -> FlashRegisterAccessor<P> {
        self.flash
    }

    /// Read the SPI control register
    pub fn control_word(&mut self) -> SpiControlWord {
        SpiControlWord::from_bits(self.flash.port_mut().read_word(regs::SPI_CTRL))
    }

    /// Decode the current mode from the live register
    ///
    /// Returns `None` if the mode field holds a pattern this encoding does
    /// not produce.
    pub fn mode(&mut self) -> Option<FlashMode> {
        let word = self.control_word();
        self.encoding.decode(word)
    }

    /// Switch to `target`, running whatever checks that mode requires
    pub fn set_mode(&mut self, target: FlashMode) -> Result<()> {
        match target {
            FlashMode::Spi => {
                self.enter_spi();
                Ok(())
            }
            FlashMode::Dual => {
                self.enter_dual();
                Ok(())
            }
            FlashMode::Quad => self.enter_quad(),
            FlashMode::QuadDdr => self.enter_quad_ddr(),
        }
    }

    /// Return to single-wire mode; always legal
    pub fn enter_spi(&mut self) {
        self.write_mode(FlashMode::Spi);
    }

    /// Switch to dual I/O mode
    ///
    /// Dual I/O reads need no chip-side configuration on the W25Q family,
    /// so this is a controller-only change.
    pub fn enter_dual(&mut self) {
        self.write_mode(FlashMode::Dual);
    }

    /// Switch to quad I/O mode
    ///
    /// Fails with [`Error::QuadNotEnabled`] and leaves the register untouched
    /// if the chip's QE bit is clear; the chip would otherwise treat IO2/IO3
    /// as WP#/HOLD# and misread the bus.
    pub fn enter_quad(&mut self) -> Result<()> {
        let sr2 = self.flash.read_status2();
        if !sr2.contains(Status2::QE) {
            log::warn!(
                "refusing quad mode: QE clear (SR2 0x{:02X})",
                sr2.bits()
            );
            return Err(Error::QuadNotEnabled);
        }
        self.write_mode(FlashMode::Quad);
        Ok(())
    }

    /// Switch to quad DDR mode
    ///
    /// Goes through quad mode first if not already there, then confirms
    /// that QSPI reads back as enabled before setting DDR.
    pub fn enter_quad_ddr(&mut self) -> Result<()> {
        if self.mode() != Some(FlashMode::Quad) {
            self.enter_quad()?;
        }

        let word = self.control_word();
        if !word.qspi_enabled() {
            log::warn!("refusing DDR: QSPI not set in {:?}", word);
            return Err(Error::QspiNotConfirmed);
        }

        self.write_mode(FlashMode::QuadDdr);
        Ok(())
    }

    /// Set the continuous read mode bit; the flash mode is unchanged
    pub fn enable_continuous_read(&mut self) {
        self.flash
            .port_mut()
            .modify_word(regs::SPI_CTRL, 0, regs::SPI_CTRL_CRM);
        log::debug!("flash CRM on");
    }

    /// Clear the continuous read mode bit; the flash mode is unchanged
    pub fn disable_continuous_read(&mut self) {
        self.flash
            .port_mut()
            .modify_word(regs::SPI_CTRL, regs::SPI_CTRL_CRM, 0);
        log::debug!("flash CRM off");
    }

    /// Flip the continuous read mode bit and return its new state
    pub fn toggle_continuous_read(&mut self) -> bool {
        if self.control_word().crm_enabled() {
            self.disable_continuous_read();
            false
        } else {
            self.enable_continuous_read();
            true
        }
    }

    fn write_mode(&mut self, mode: FlashMode) {
        let pattern = self.encoding.pattern(mode);
        let value = self
            .flash
            .port_mut()
            .modify_word(regs::SPI_CTRL, regs::SPI_CTRL_MODE_MASK, pattern);
        log::debug!("flash mode -> {} (SPI_CTRL 0x{:08X})", mode, value);
    }
}
