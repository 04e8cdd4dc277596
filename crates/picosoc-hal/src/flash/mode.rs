//! Flash interface modes and the SPI control word

use crate::error::{Error, Result};
use crate::port::regs;

/// Electrical mode of the flash interface
///
/// Represents how the memio controller talks to the flash when serving
/// memory-mapped reads, from single-wire to quad DDR.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum FlashMode {
    /// Standard SPI: one data line (controller reset default)
    #[default]
    Spi,
    /// Dual I/O: address and data on 2 lines
    Dual,
    /// Quad I/O: address and data on 4 lines
    Quad,
    /// Quad I/O with data on both clock edges
    QuadDdr,
}

impl FlashMode {
    /// All modes, in order of increasing throughput
    pub const ALL: [FlashMode; 4] = [Self::Spi, Self::Dual, Self::Quad, Self::QuadDdr];

    /// Returns the number of data lines used
    pub const fn data_lines(&self) -> u8 {
        match self {
            Self::Spi => 1,
            Self::Dual => 2,
            Self::Quad | Self::QuadDdr => 4,
        }
    }

    /// Returns true if this mode transfers on both clock edges
    pub const fn is_ddr(&self) -> bool {
        matches!(self, Self::QuadDdr)
    }

    /// Returns true if this mode requires the chip's QE bit
    pub const fn requires_quad(&self) -> bool {
        matches!(self, Self::Quad | Self::QuadDdr)
    }
}

impl core::fmt::Display for FlashMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FlashMode::Spi => write!(f, "SPI"),
            FlashMode::Dual => write!(f, "Dual I/O"),
            FlashMode::Quad => write!(f, "Quad I/O"),
            FlashMode::QuadDdr => write!(f, "Quad DDR"),
        }
    }
}

/// Raw SPI control register value
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct SpiControlWord(u32);

impl SpiControlWord {
    /// Wrap a raw register value
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Get the raw register value
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Read latency (dummy cycles) configured for the current mode
    pub const fn latency(&self) -> u8 {
        ((self.0 & regs::SPI_CTRL_LATENCY_MASK) >> regs::SPI_CTRL_LATENCY_SHIFT) as u8
    }

    /// Continuous read mode enabled
    pub const fn crm_enabled(&self) -> bool {
        self.0 & regs::SPI_CTRL_CRM != 0
    }

    /// Quad SPI enabled
    pub const fn qspi_enabled(&self) -> bool {
        self.0 & regs::SPI_CTRL_QSPI != 0
    }

    /// Double data rate enabled
    pub const fn ddr_enabled(&self) -> bool {
        self.0 & regs::SPI_CTRL_DDR != 0
    }

    /// Dual I/O enabled
    pub const fn dual_enabled(&self) -> bool {
        self.0 & regs::SPI_CTRL_DUAL != 0
    }

    /// Memory-mapped flash reads enabled (clear while bitbanging)
    pub const fn memio_enabled(&self) -> bool {
        self.0 & regs::SPI_CTRL_MEMIO_EN != 0
    }

    /// Mode field without the CRM bit
    pub const fn mode_bits(&self) -> u32 {
        self.0 & regs::SPI_CTRL_MODE_MASK & !regs::SPI_CTRL_CRM
    }
}

impl core::fmt::Debug for SpiControlWord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpiControlWord")
            .field("bits", &format_args!("0x{:08X}", self.0))
            .field("latency", &self.latency())
            .field("ddr", &self.ddr_enabled())
            .field("qspi", &self.qspi_enabled())
            .field("dual", &self.dual_enabled())
            .field("crm", &self.crm_enabled())
            .finish()
    }
}

/// Per-mode bit patterns for the mode field of the SPI control register
///
/// A pattern covers latency, QSPI, DDR and dual bits (bits 16..=23). CRM is
/// not part of any pattern; writing a pattern clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeEncoding {
    /// Single-wire pattern
    pub spi: u32,
    /// Dual I/O pattern
    pub dual: u32,
    /// Quad I/O pattern
    pub quad: u32,
    /// Quad DDR pattern
    pub quad_ddr: u32,
}

impl ModeEncoding {
    /// PicoSoC `spimemio` patterns with W25Q dummy-cycle counts
    pub const PICOSOC: Self = Self {
        spi: 0x0000_0000,
        dual: regs::SPI_CTRL_DUAL,
        quad: regs::SPI_CTRL_QSPI | (4 << regs::SPI_CTRL_LATENCY_SHIFT),
        quad_ddr: regs::SPI_CTRL_DDR | regs::SPI_CTRL_QSPI | (7 << regs::SPI_CTRL_LATENCY_SHIFT),
    };

    /// Bit pattern for `mode`
    pub const fn pattern(&self, mode: FlashMode) -> u32 {
        match mode {
            FlashMode::Spi => self.spi,
            FlashMode::Dual => self.dual,
            FlashMode::Quad => self.quad,
            FlashMode::QuadDdr => self.quad_ddr,
        }
    }

    /// Decode the mode from a control word (`None` for unknown patterns)
    pub fn decode(&self, word: SpiControlWord) -> Option<FlashMode> {
        FlashMode::ALL
            .into_iter()
            .find(|&mode| self.pattern(mode) == word.mode_bits())
    }

    /// Check the encoding before it is used
    ///
    /// Every pattern must stay inside the mode field, leave CRM alone and be
    /// distinct; DDR must only appear together with QSPI, and only the quad
    /// patterns may set QSPI.
    pub fn validate(&self) -> Result<()> {
        let field = regs::SPI_CTRL_MODE_MASK & !regs::SPI_CTRL_CRM;
        for mode in FlashMode::ALL {
            let word = SpiControlWord::from_bits(self.pattern(mode));
            if word.bits() & !field != 0
                || (word.ddr_enabled() && !word.qspi_enabled())
                || word.qspi_enabled() != mode.requires_quad()
            {
                return Err(Error::InvalidModeEncoding);
            }
            for other in FlashMode::ALL {
                if other != mode && self.pattern(other) == word.bits() {
                    return Err(Error::InvalidModeEncoding);
                }
            }
        }
        Ok(())
    }
}

impl Default for ModeEncoding {
    fn default() -> Self {
        Self::PICOSOC
    }
}
