//! LED output register

use crate::port::{regs, RegisterPort};

/// Write-only LED bank
///
/// Bit `n` drives LED `n`. The register cannot be read back, so the last
/// written value is kept here.
#[derive(Debug)]
pub struct LedPort<P> {
    port: P,
    value: u32,
}

impl<P: RegisterPort> LedPort<P> {
    /// Create an LED port; the LEDs keep their state until the first write
    pub fn new(port: P) -> Self {
        Self { port, value: 0 }
    }

    /// Drive all LEDs from `bits`
    pub fn set(&mut self, bits: u32) {
        self.value = bits;
        self.port.write_word(regs::LEDS, bits);
    }

    /// Last value written
    pub fn value(&self) -> u32 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::testing::RegisterFile;

    #[test]
    fn test_set_writes_register() {
        let mut file = RegisterFile::default();
        {
            let mut leds = LedPort::new(&mut file);
            leds.set(0b0001);
            assert_eq!(leds.value(), 0b0001);
        }
        assert_eq!(file.read_word(regs::LEDS), 0b0001);
        assert_eq!(file.read_word(regs::SPI_CTRL), 0);
    }
}
