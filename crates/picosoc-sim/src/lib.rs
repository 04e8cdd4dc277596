//! picosoc-sim - Simulated PicoSoC register file
//!
//! [`SimSoc`] implements [`RegisterPort`] on top of a model of the
//! peripherals: the UART rings, the `spimemio` control register with a
//! bit-level SPI flash chip behind its manual-mode pins, and the LED
//! register. It lets the HAL run unmodified on a host.
//!
//! Components share one `&SimSoc`, the same way they would share the
//! physical register map:
//!
//! ```ignore
//! let soc = SimSoc::new(SimConfig::default());
//! let mut uart = UartRingTransport::new(&soc);
//! let mut flash = FlashModeController::new(FlashRegisterAccessor::new(&soc));
//!
//! soc.inject_rx(b"ping");
//! ```

mod flash;
mod uart;

pub use flash::{FlashConfig, SimFlash};
pub use uart::{Ring, SimUart};

use std::cell::RefCell;

use picosoc_hal::port::{regs, RegisterPort};
use picosoc_hal::uart::UartStatusWord;

/// Configuration for the simulated SoC
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Flash chip model
    pub flash: FlashConfig,
    /// SPI control register value after reset
    pub spi_ctrl_reset: u32,
    /// SPI control bits the controller does not implement (always read 0)
    pub spi_ctrl_unimplemented: u32,
    /// Initial RX/TX ring pointer
    pub uart_pointer: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            flash: FlashConfig::default(),
            spi_ctrl_reset: regs::SPI_CTRL_MEMIO_EN,
            spi_ctrl_unimplemented: 0,
            uart_pointer: 0,
        }
    }
}

#[derive(Debug)]
struct State {
    spi_ctrl: u32,
    spi_ctrl_unimplemented: u32,
    spi_writes: usize,
    miso: bool,
    flash: SimFlash,
    uart: SimUart,
    leds: u32,
}

impl State {
    fn write_spi_ctrl(&mut self, value: u32) {
        let old = self.spi_ctrl;
        let value = value & !self.spi_ctrl_unimplemented;
        self.spi_ctrl = value;
        self.spi_writes += 1;

        if value & regs::SPI_CTRL_MEMIO_EN != 0 {
            // Controller owns the pins again
            self.flash.deselect();
            return;
        }

        let cs_low = value & regs::SPI_CTRL_CS == 0;
        if cs_low && !self.flash.selected() {
            self.flash.select();
        } else if !cs_low && self.flash.selected() {
            self.flash.deselect();
        }

        let rising = old & regs::SPI_CTRL_CLK == 0 && value & regs::SPI_CTRL_CLK != 0;
        if cs_low && rising {
            self.miso = self.flash.clock(value & regs::SPI_CTRL_IO0 != 0);
        }
    }

    fn read_spi_ctrl(&self) -> u32 {
        if self.spi_ctrl & regs::SPI_CTRL_MEMIO_EN != 0 {
            return self.spi_ctrl;
        }
        let io1 = if self.miso { regs::SPI_CTRL_IO1 } else { 0 };
        (self.spi_ctrl & !regs::SPI_CTRL_IO1) | io1
    }
}

/// Simulated PicoSoC peripherals
#[derive(Debug)]
pub struct SimSoc {
    state: RefCell<State>,
}

impl SimSoc {
    /// Create a SoC in its reset state
    pub fn new(config: SimConfig) -> Self {
        let mut uart = SimUart::default();
        uart.rx.reset_to(config.uart_pointer);
        uart.tx.reset_to(config.uart_pointer);

        Self {
            state: RefCell::new(State {
                spi_ctrl: config.spi_ctrl_reset & !config.spi_ctrl_unimplemented,
                spi_ctrl_unimplemented: config.spi_ctrl_unimplemented,
                spi_writes: 0,
                miso: false,
                flash: SimFlash::new(config.flash),
                uart,
                leds: 0,
            }),
        }
    }

    /// Current SPI control register value
    pub fn spi_ctrl(&self) -> u32 {
        self.state.borrow().spi_ctrl
    }

    /// Number of writes to the SPI control register so far
    pub fn spi_writes(&self) -> usize {
        self.state.borrow().spi_writes
    }

    /// Last value written to the LED register
    pub fn leds(&self) -> u32 {
        self.state.borrow().leds
    }

    /// Flash status registers 1, 2, 3
    pub fn flash_status(&self) -> [u8; 3] {
        self.state.borrow().flash.status()
    }

    /// Overwrite the flash status registers
    pub fn set_flash_status(&self, status: [u8; 3]) {
        self.state.borrow_mut().flash.set_status(status);
    }

    /// Commands the flash chip has received, one entry per chip-select frame
    pub fn flash_history(&self) -> Vec<Vec<u8>> {
        self.state.borrow().flash.history().to_vec()
    }

    /// Current UART status word
    pub fn uart_status(&self) -> UartStatusWord {
        self.state.borrow().uart.status()
    }

    /// Deliver bytes from the line into the RX ring
    ///
    /// Returns how many were accepted; the rest are lost and latch the RX
    /// overflow flag.
    pub fn inject_rx(&self, bytes: &[u8]) -> usize {
        let mut state = self.state.borrow_mut();
        bytes.iter().filter(|&&b| state.uart.rx.push(b)).count()
    }

    /// Take every byte waiting in the TX ring
    pub fn drain_tx(&self) -> Vec<u8> {
        let mut state = self.state.borrow_mut();
        std::iter::from_fn(|| state.uart.tx.pop()).collect()
    }

    /// Feed the TX ring back into the RX ring; returns bytes moved
    pub fn loopback(&self) -> usize {
        let bytes = self.drain_tx();
        self.inject_rx(&bytes)
    }

    fn read(&self, address: u32) -> u32 {
        let mut state = self.state.borrow_mut();
        match address {
            regs::SPI_CTRL => state.read_spi_ctrl(),
            regs::UART_STATUS => state.uart.status().bits(),
            regs::UART_DATA => state.uart.rx.pop().unwrap_or(0) as u32,
            regs::LEDS => 0,
            _ => panic!("read from unmapped register 0x{:08X}", address),
        }
    }

    fn write(&self, address: u32, value: u32) {
        let mut state = self.state.borrow_mut();
        match address {
            regs::SPI_CTRL => state.write_spi_ctrl(value),
            regs::UART_STATUS => log::warn!("write to read-only UART status ignored"),
            regs::UART_DATA => {
                state.uart.tx.push(value as u8);
            }
            regs::LEDS => state.leds = value,
            _ => panic!("write to unmapped register 0x{:08X}", address),
        }
    }
}

impl Default for SimSoc {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl RegisterPort for &SimSoc {
    fn read_word(&mut self, address: u32) -> u32 {
        self.read(address)
    }

    fn write_word(&mut self, address: u32, value: u32) {
        self.write(address, value)
    }
}

impl RegisterPort for SimSoc {
    fn read_word(&mut self, address: u32) -> u32 {
        self.read(address)
    }

    fn write_word(&mut self, address: u32, value: u32) {
        self.write(address, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picosoc_hal::flash::{
        FlashMode, FlashModeController, FlashRegisterAccessor, ModeEncoding, Status1, Status2,
    };
    use picosoc_hal::led::LedPort;
    use picosoc_hal::poll::BoundedPolls;
    use picosoc_hal::uart::{OverflowFlags, UartRingTransport, RING_SLOTS};
    use picosoc_hal::Error;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn quad_capable() -> SimSoc {
        SimSoc::new(SimConfig {
            flash: FlashConfig {
                status: [0x00, Status2::QE.bits(), 0x60],
                ..FlashConfig::default()
            },
            ..SimConfig::default()
        })
    }

    fn controller(soc: &SimSoc) -> FlashModeController<&SimSoc> {
        FlashModeController::new(FlashRegisterAccessor::new(soc))
    }

    // ------------------------------------------------------------------
    // UART
    // ------------------------------------------------------------------

    #[test]
    fn test_uart_fifo_order() {
        init();
        let soc = SimSoc::default();
        let mut uart = UartRingTransport::new(&soc);

        assert_eq!(soc.inject_rx(b"hello"), 5);
        let received: Vec<u8> = (0..5).filter_map(|_| uart.try_receive_byte()).collect();
        assert_eq!(received, b"hello");
        assert_eq!(uart.try_receive_byte(), None);

        uart.send_bytes_blocking(b"world").unwrap();
        assert_eq!(soc.drain_tx(), b"world");
    }

    #[test]
    fn test_uart_full_rx_ring_across_wrap() {
        init();
        let soc = SimSoc::new(SimConfig {
            uart_pointer: 120,
            ..SimConfig::default()
        });
        let mut uart = UartRingTransport::new(&soc);

        let data: Vec<u8> = (0..RING_SLOTS as u8).collect();
        assert_eq!(soc.inject_rx(&data), RING_SLOTS);

        let rx = soc.uart_status().rx();
        assert_eq!(rx.head, rx.tail);
        assert!(rx.is_full());
        assert!(uart.overflow().is_empty());

        // Full ring still reads back in order
        for &expected in &data {
            assert_eq!(uart.receive_byte_blocking(), Ok(expected));
        }
        assert!(soc.uart_status().rx().is_empty());
    }

    #[test]
    fn test_uart_overflow_latch_and_acknowledge() {
        init();
        let soc = SimSoc::default();
        let mut uart = UartRingTransport::new(&soc);

        let data = [0x55u8; RING_SLOTS + 1];
        assert_eq!(soc.inject_rx(&data), RING_SLOTS);
        assert_eq!(uart.pending_overflow(), OverflowFlags::RX);

        // Draining does not clear the hardware flag
        while uart.try_receive_byte().is_some() {}
        assert_eq!(uart.overflow(), OverflowFlags::RX);

        assert_eq!(uart.acknowledge_overflow(), OverflowFlags::RX);
        assert!(uart.pending_overflow().is_empty());
    }

    #[test]
    fn test_uart_send_refused_when_tx_full() {
        init();
        let soc = SimSoc::default();
        let mut uart = UartRingTransport::with_wait(&soc, BoundedPolls::new(4));

        for i in 0..RING_SLOTS {
            assert!(uart.try_send_byte(i as u8));
        }
        assert!(!uart.try_send_byte(0xff));
        assert_eq!(uart.send_byte_blocking(0xff), Err(Error::Timeout));

        // Software never overruns the ring
        assert!(uart.overflow().is_empty());
        assert_eq!(soc.drain_tx().len(), RING_SLOTS);
        assert!(uart.try_send_byte(0xff));
    }

    #[test]
    fn test_uart_blocking_receive_times_out() {
        init();
        let soc = SimSoc::default();
        let mut uart = UartRingTransport::with_wait(&soc, BoundedPolls::new(10));
        assert_eq!(uart.receive_byte_blocking(), Err(Error::Timeout));

        soc.inject_rx(b"x");
        uart.wait_strategy_mut().reset();
        assert_eq!(uart.receive_byte_blocking(), Ok(b'x'));
    }

    #[test]
    fn test_uart_embedded_io() {
        use embedded_io::{Read, ReadReady, Write};

        init();
        let soc = SimSoc::default();
        let mut uart = UartRingTransport::with_wait(&soc, BoundedPolls::new(16));

        uart.write_all(b"ping").unwrap();
        uart.flush().unwrap();
        assert_eq!(soc.loopback(), 4);

        assert!(uart.read_ready().unwrap());
        let mut buf = [0u8; 8];
        let n = uart.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");
        assert!(!uart.read_ready().unwrap());
    }

    // ------------------------------------------------------------------
    // Flash register access
    // ------------------------------------------------------------------

    #[test]
    fn test_status1_decode() {
        init();
        let soc = SimSoc::default();
        soc.set_flash_status([0b1010_0101, 0x00, 0x00]);
        let mut flash = FlashRegisterAccessor::new(&soc);

        let sr1 = flash.read_status1();
        assert_eq!(sr1.bits(), 0b1010_0101);
        assert_eq!(sr1, Status1::BUSY | Status1::BP0 | Status1::TB | Status1::SRP);

        let set: Vec<u8> = flash
            .read_all_status()
            .bits()
            .filter(|bit| bit.set)
            .map(|bit| bit.index)
            .collect();
        assert_eq!(set, [0, 2, 5, 7]);

        // Memory-mapped reads are back on after the exchange
        assert_ne!(soc.spi_ctrl() & regs::SPI_CTRL_MEMIO_EN, 0);
    }

    #[test]
    fn test_device_id() {
        init();
        let soc = SimSoc::default();
        let mut flash = FlashRegisterAccessor::new(&soc);

        let id = flash.read_device_id();
        assert_eq!(&id[..3], &[0xEF, 0x40, 0x18]);
        assert!(id[3..].iter().all(|&b| b == 0));

        let jedec = flash.read_jedec_id();
        assert_eq!(jedec.manufacturer, 0xEF);
        assert_eq!(jedec.device_id(), 0x4018);
        assert_eq!(jedec.size(), Some(16 * 1024 * 1024));

        let frames = soc.flash_history();
        assert_eq!(frames[0].len(), 17);
        assert_eq!(frames[0][0], 0x9F);
    }

    #[test]
    fn test_read_bytes_limit() {
        init();
        let soc = SimSoc::default();
        let mut flash = FlashRegisterAccessor::new(&soc);

        let response = flash.read_bytes(0x9F, 3).unwrap();
        assert_eq!(response.as_slice(), &[0xEF, 0x40, 0x18]);

        let writes = soc.spi_writes();
        assert_eq!(flash.read_bytes(0x9F, 33), Err(Error::BufferTooSmall));
        assert_eq!(soc.spi_writes(), writes);
    }

    #[test]
    fn test_set_quad_enable() {
        init();
        let soc = SimSoc::default();
        let mut flash = FlashRegisterAccessor::new(&soc);
        assert!(!flash.read_all_status().quad_enabled());

        flash.set_quad_enable();
        assert!(flash.read_status2().contains(Status2::QE));
        assert_eq!(soc.flash_status()[1], Status2::QE.bits());

        let frames = soc.flash_history();
        assert!(frames.contains(&vec![0x50]));
        assert!(frames.contains(&vec![0x31, Status2::QE.bits()]));
    }

    // ------------------------------------------------------------------
    // Flash mode controller
    // ------------------------------------------------------------------

    #[test]
    fn test_starts_in_spi() {
        init();
        let soc = SimSoc::default();
        let mut flash = controller(&soc);
        assert_eq!(flash.mode(), Some(FlashMode::Spi));
        assert!(!flash.control_word().crm_enabled());
    }

    #[test]
    fn test_quad_refused_without_qe() {
        init();
        let soc = SimSoc::default();
        let mut flash = controller(&soc);

        assert_eq!(flash.enter_quad(), Err(Error::QuadNotEnabled));
        assert_eq!(flash.set_mode(FlashMode::QuadDdr), Err(Error::QuadNotEnabled));
        assert_eq!(flash.mode(), Some(FlashMode::Spi));
        assert_eq!(soc.spi_ctrl() & regs::SPI_CTRL_MODE_MASK, 0);
    }

    #[test]
    fn test_quad_after_set_quad_enable() {
        init();
        let soc = SimSoc::default();
        let mut flash = controller(&soc);

        flash.accessor_mut().set_quad_enable();
        flash.enter_quad().unwrap();
        assert_eq!(flash.mode(), Some(FlashMode::Quad));
    }

    #[test]
    fn test_every_transition() {
        init();
        for from in FlashMode::ALL {
            for to in FlashMode::ALL {
                let soc = quad_capable();
                let mut flash = controller(&soc);

                flash.set_mode(from).unwrap();
                flash.set_mode(to).unwrap();

                let word = flash.control_word();
                assert_eq!(flash.mode(), Some(to), "{} -> {}", from, to);
                assert!(!word.ddr_enabled() || word.qspi_enabled());
                assert_eq!(word.qspi_enabled(), to.requires_quad());
                assert!(word.memio_enabled());
            }
        }
    }

    #[test]
    fn test_enter_spi_idempotent() {
        init();
        let soc = quad_capable();
        let mut flash = controller(&soc);
        flash.set_mode(FlashMode::Quad).unwrap();

        flash.enter_spi();
        let first = soc.spi_ctrl();
        flash.enter_spi();
        assert_eq!(soc.spi_ctrl(), first);
    }

    #[test]
    fn test_spi_round_trip_clears_mode_bits() {
        init();
        let soc = quad_capable();
        let mut flash = controller(&soc);

        flash.enter_spi();
        flash.enter_quad().unwrap();
        flash.enter_quad_ddr().unwrap();
        assert!(flash.control_word().ddr_enabled());
        flash.enter_spi();

        let bits = regs::SPI_CTRL_CRM | regs::SPI_CTRL_QSPI | regs::SPI_CTRL_DDR;
        assert_eq!(soc.spi_ctrl() & bits, 0);
        assert_eq!(flash.mode(), Some(FlashMode::Spi));
    }

    #[test]
    fn test_crm_toggle_keeps_mode() {
        init();
        for mode in FlashMode::ALL {
            let soc = quad_capable();
            let mut flash = controller(&soc);
            flash.set_mode(mode).unwrap();

            assert!(flash.toggle_continuous_read());
            assert!(flash.control_word().crm_enabled());
            assert_eq!(flash.mode(), Some(mode));

            assert!(!flash.toggle_continuous_read());
            assert!(!flash.control_word().crm_enabled());
            assert_eq!(flash.mode(), Some(mode));
        }
    }

    #[test]
    fn test_mode_write_clears_crm() {
        init();
        let soc = quad_capable();
        let mut flash = controller(&soc);

        flash.enable_continuous_read();
        flash.enter_dual();
        assert!(!flash.control_word().crm_enabled());
        assert_eq!(flash.mode(), Some(FlashMode::Dual));
    }

    #[test]
    fn test_ddr_needs_qspi_readback() {
        init();
        let soc = SimSoc::new(SimConfig {
            flash: FlashConfig {
                status: [0x00, Status2::QE.bits(), 0x00],
                ..FlashConfig::default()
            },
            spi_ctrl_unimplemented: regs::SPI_CTRL_QSPI,
            ..SimConfig::default()
        });
        let mut flash = controller(&soc);

        assert_eq!(flash.enter_quad_ddr(), Err(Error::QspiNotConfirmed));
        assert!(!flash.control_word().ddr_enabled());
    }

    #[test]
    fn test_custom_encoding() {
        init();
        let soc = quad_capable();
        let encoding = ModeEncoding {
            quad: regs::SPI_CTRL_QSPI | (8 << regs::SPI_CTRL_LATENCY_SHIFT),
            ..ModeEncoding::PICOSOC
        };
        let mut flash =
            FlashModeController::with_encoding(FlashRegisterAccessor::new(&soc), encoding).unwrap();

        flash.enter_quad().unwrap();
        assert_eq!(flash.control_word().latency(), 8);
        assert_eq!(flash.mode(), Some(FlashMode::Quad));

        let invalid = ModeEncoding {
            dual: regs::SPI_CTRL_DDR,
            ..ModeEncoding::PICOSOC
        };
        assert!(matches!(
            FlashModeController::with_encoding(FlashRegisterAccessor::new(&soc), invalid),
            Err(Error::InvalidModeEncoding)
        ));
    }

    // ------------------------------------------------------------------
    // LEDs
    // ------------------------------------------------------------------

    #[test]
    fn test_leds() {
        let soc = SimSoc::default();
        let mut leds = LedPort::new(&soc);
        leds.set(0b0101);
        assert_eq!(soc.leds(), 0b0101);
        assert_eq!(leds.value(), 0b0101);
    }
}
