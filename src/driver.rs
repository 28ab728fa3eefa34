//! Hardware seams: the raw touch source and the millisecond clock.

use embedded_hal::spi::SpiDevice;

use crate::{calibration::RAW_FULL_SCALE, types::RawSample};

/// Anything that can produce one raw touch reading per call.
pub trait TouchSource {
    type Error;

    /// `Ok(None)` means no contact, which is distinct from a bus failure.
    fn read_raw(&mut self) -> Result<Option<RawSample>, Self::Error>;
}

/// Monotonic millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// [`Clock`] backed by the embassy time driver.
#[cfg(feature = "embassy")]
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy")]
impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}

const XPT2046_CMD_X: u8 = 0xD0;
const XPT2046_CMD_Y: u8 = 0x90;
const XPT2046_CMD_Z1: u8 = 0xB0;
const XPT2046_CMD_Z2: u8 = 0xC0;

/// XPT2046 resistive touch controller on an SPI bus.
///
/// Every conversion is a three byte transfer: the control byte, then the
/// 12-bit result clocked back left aligned in the next two bytes.
pub struct Xpt2046<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Xpt2046<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    pub fn release(self) -> SPI {
        self.spi
    }

    fn convert(&mut self, command: u8) -> Result<u16, SPI::Error> {
        let mut rx = [0u8; 3];
        self.spi.transfer(&mut rx, &[command, 0, 0])?;
        Ok((((rx[1] as u16) << 8) | rx[2] as u16) >> 3)
    }

    /// Touch pressure estimate: `z1 + 4095 - z2`. Zero when nothing presses
    /// the panel.
    pub fn read_pressure(&mut self) -> Result<u16, SPI::Error> {
        let z1 = self.convert(XPT2046_CMD_Z1)? as u32;
        let z2 = self.convert(XPT2046_CMD_Z2)? as u32;
        let pressure = (z1 + RAW_FULL_SCALE as u32).saturating_sub(z2);
        Ok(pressure.min(u16::MAX as u32) as u16)
    }
}

impl<SPI: SpiDevice> TouchSource for Xpt2046<SPI> {
    type Error = SPI::Error;

    fn read_raw(&mut self) -> Result<Option<RawSample>, Self::Error> {
        let pressure = self.read_pressure()?;
        if pressure == 0 {
            return Ok(None);
        }
        let x = self.convert(XPT2046_CMD_X)?;
        let y = self.convert(XPT2046_CMD_Y)?;
        Ok(Some(RawSample { x, y, pressure }))
    }
}
