//! Register port abstraction
//!
//! A [`RegisterPort`] is the only way components touch hardware state. It
//! performs 32-bit accesses at absolute physical addresses; the addresses
//! themselves are defined in [`regs`].

mod mmio;
pub mod regs;

pub use mmio::{Mmio, Peripherals};

/// Word-wide access to memory-mapped registers
///
/// Both operations are side-effecting and must not be cached, merged or
/// reordered across calls. They cannot fail: an address outside the
/// peripheral is a programmer error, not a runtime condition.
///
/// Methods take `&mut self` so that a multi-step read-modify-write sequence
/// holds exclusive access to the port for its whole duration.
pub trait RegisterPort {
    /// Read the 32-bit register at `address`
    fn read_word(&mut self, address: u32) -> u32;

    /// Write `value` to the 32-bit register at `address`
    fn write_word(&mut self, address: u32, value: u32);

    /// Read-modify-write: clear `mask`, then set `bits`
    ///
    /// Returns the value written.
    fn modify_word(&mut self, address: u32, mask: u32, bits: u32) -> u32 {
        let value = (self.read_word(address) & !mask) | bits;
        self.write_word(address, value);
        value
    }
}

impl<P: RegisterPort + ?Sized> RegisterPort for &mut P {
    fn read_word(&mut self, address: u32) -> u32 {
        (**self).read_word(address)
    }

    fn write_word(&mut self, address: u32, value: u32) {
        (**self).write_word(address, value)
    }
}
