//! Other on-board peripherals of the ESP32-2432S028R.
//!
//! The RGB status LED sits on GPIO 4 (red), 16 (green) and 17 (blue) and is
//! wired active-low; it can be driven as plain pins or as PWM channels. The
//! display backlight is on GPIO 21, active-high. The speaker amplifier is fed
//! from a PWM channel on GPIO 26 and the light sensor (LDR) is on ADC GPIO 34.

use core::fmt;

use embedded_hal::{
    delay::DelayNs,
    digital::OutputPin,
    pwm::{ErrorType, SetDutyCycle},
};
use fixed::types::I32F32;

use crate::calibration::Fx;

/// An LED that can be switched off, used by [`Board::shutdown`].
pub trait StatusLed {
    type Error;

    fn off(&mut self) -> Result<(), Self::Error>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LedColor {
    #[default]
    Off,
    Red,
    Green,
    Blue,
    /// Red and green.
    Yellow,
    /// Red and blue.
    Magenta,
    /// Green and blue.
    Cyan,
    White,
}

impl LedColor {
    /// Channels lit, as `(red, green, blue)`.
    pub fn channels(self) -> (bool, bool, bool) {
        match self {
            LedColor::Off => (false, false, false),
            LedColor::Red => (true, false, false),
            LedColor::Green => (false, true, false),
            LedColor::Blue => (false, false, true),
            LedColor::Yellow => (true, true, false),
            LedColor::Magenta => (true, false, true),
            LedColor::Cyan => (false, true, true),
            LedColor::White => (true, true, true),
        }
    }
}

pub struct RgbLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    color: LedColor,
}

impl<R, G, B, E> RgbLed<R, G, B>
where
    R: OutputPin<Error = E>,
    G: OutputPin<Error = E>,
    B: OutputPin<Error = E>,
{
    /// Takes the three channel pins and switches the LED off.
    pub fn new(red: R, green: G, blue: B) -> Result<Self, E> {
        let mut led = Self {
            red,
            green,
            blue,
            color: LedColor::Off,
        };
        led.off()?;
        Ok(led)
    }

    pub fn set(&mut self, color: LedColor) -> Result<(), E> {
        let (red, green, blue) = color.channels();
        drive_active_low(&mut self.red, red)?;
        drive_active_low(&mut self.green, green)?;
        drive_active_low(&mut self.blue, blue)?;
        self.color = color;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), E> {
        self.set(LedColor::Off)
    }

    pub fn color(&self) -> LedColor {
        self.color
    }

    pub fn release(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }
}

impl<R, G, B, E> StatusLed for RgbLed<R, G, B>
where
    R: OutputPin<Error = E>,
    G: OutputPin<Error = E>,
    B: OutputPin<Error = E>,
{
    type Error = E;

    fn off(&mut self) -> Result<(), E> {
        RgbLed::off(self)
    }
}

fn drive_active_low<P: OutputPin>(pin: &mut P, lit: bool) -> Result<(), P::Error> {
    if lit {
        pin.set_low()
    } else {
        pin.set_high()
    }
}

pub struct Backlight<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Backlight<P> {
    /// Takes the backlight pin and turns the panel light on.
    pub fn new(pin: P) -> Result<Self, P::Error> {
        let mut backlight = Self { pin, on: false };
        backlight.set(true)?;
        Ok(backlight)
    }

    pub fn set(&mut self, on: bool) -> Result<(), P::Error> {
        if on {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

/// The RGB LED on three PWM channels, 0 to 255 per channel.
pub struct PwmRgbLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    levels: (u8, u8, u8),
}

impl<R, G, B, E> PwmRgbLed<R, G, B>
where
    R: SetDutyCycle<Error = E>,
    G: SetDutyCycle<Error = E>,
    B: SetDutyCycle<Error = E>,
{
    pub fn new(red: R, green: G, blue: B) -> Result<Self, E> {
        let mut led = Self {
            red,
            green,
            blue,
            levels: (0, 0, 0),
        };
        led.off()?;
        Ok(led)
    }

    pub fn set_rgb(&mut self, red: u8, green: u8, blue: u8) -> Result<(), E> {
        dim_active_low(&mut self.red, red)?;
        dim_active_low(&mut self.green, green)?;
        dim_active_low(&mut self.blue, blue)?;
        self.levels = (red, green, blue);
        Ok(())
    }

    /// Lit channels at full brightness.
    pub fn set(&mut self, color: LedColor) -> Result<(), E> {
        let level = |lit: bool| if lit { u8::MAX } else { 0 };
        let (red, green, blue) = color.channels();
        self.set_rgb(level(red), level(green), level(blue))
    }

    pub fn off(&mut self) -> Result<(), E> {
        self.set_rgb(0, 0, 0)
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        self.levels
    }

    pub fn release(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }
}

impl<R, G, B, E> StatusLed for PwmRgbLed<R, G, B>
where
    R: SetDutyCycle<Error = E>,
    G: SetDutyCycle<Error = E>,
    B: SetDutyCycle<Error = E>,
{
    type Error = E;

    fn off(&mut self) -> Result<(), E> {
        PwmRgbLed::off(self)
    }
}

fn dim_active_low<P: SetDutyCycle>(channel: &mut P, level: u8) -> Result<(), P::Error> {
    channel.set_duty_cycle_fraction(u16::from(u8::MAX - level), u16::from(u8::MAX))
}

/// A PWM channel whose frequency can be retuned at run time.
///
/// `embedded-hal` only abstracts the duty cycle, so HALs implement this for
/// the channel that drives the speaker.
pub trait ToneFrequency: ErrorType {
    fn set_frequency_hz(&mut self, frequency_hz: u32) -> Result<(), Self::Error>;
}

/// Speaker behind the board's amplifier. Gain is the PWM duty on a 0 to
/// [`Speaker::MAX_GAIN`] scale.
pub struct Speaker<P> {
    pin: P,
    gain: u16,
}

impl<P: SetDutyCycle> Speaker<P> {
    pub const MAX_GAIN: u16 = 1023;
    pub const DEFAULT_GAIN: u16 = 512;

    /// Takes the speaker channel and silences it.
    pub fn new(pin: P) -> Result<Self, P::Error> {
        Self::with_gain(pin, Self::DEFAULT_GAIN)
    }

    pub fn with_gain(pin: P, gain: u16) -> Result<Self, P::Error> {
        let mut speaker = Self {
            pin,
            gain: gain.min(Self::MAX_GAIN),
        };
        speaker.silence()?;
        Ok(speaker)
    }

    pub fn gain(&self) -> u16 {
        self.gain
    }

    pub fn set_gain(&mut self, gain: u16) {
        self.gain = gain.min(Self::MAX_GAIN);
    }

    pub fn silence(&mut self) -> Result<(), P::Error> {
        self.pin.set_duty_cycle_fully_off()
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: SetDutyCycle + ToneFrequency> Speaker<P> {
    /// Plays a tone and blocks for its duration. `gain` of `None` uses the
    /// configured gain.
    pub fn play_tone<D: DelayNs>(
        &mut self,
        delay: &mut D,
        frequency_hz: u32,
        duration_ms: u32,
        gain: Option<u16>,
    ) -> Result<(), P::Error> {
        let gain = gain.unwrap_or(self.gain).min(Self::MAX_GAIN);
        log::trace!(
            "board: tone frequency_hz={} duration_ms={} gain={}",
            frequency_hz,
            duration_ms,
            gain
        );
        self.pin.set_frequency_hz(frequency_hz)?;
        self.pin.set_duty_cycle_fraction(gain, Self::MAX_GAIN)?;
        delay.delay_ms(duration_ms);
        self.silence()
    }
}

/// One-shot analog read of a 16-bit scaled sample.
///
/// `embedded-hal` 1.0 has no ADC trait; HALs implement this for the LDR
/// channel.
pub trait AnalogInput {
    type Error;

    fn read_u16(&mut self) -> Result<u16, Self::Error>;
}

/// The board's light sensor. The LDR reads higher the darker it gets.
pub struct LightSensor<A> {
    adc: A,
}

impl<A: AnalogInput> LightSensor<A> {
    pub fn new(adc: A) -> Self {
        Self { adc }
    }

    /// Darkness from 0 (bright) to 1 (dark).
    pub fn darkness(&mut self) -> Result<Fx, A::Error> {
        let raw = self.adc.read_u16()?;
        let ratio = I32F32::from_num(raw) / I32F32::from_num(u16::MAX);
        Ok(ratio.to_num())
    }

    pub fn release(self) -> A {
        self.adc
    }
}

/// Failure of one output during [`Board::shutdown`].
#[derive(Debug, PartialEq, Eq)]
pub enum ShutdownError<L, B, S> {
    Led(L),
    Backlight(B),
    Speaker(S),
}

impl<L: fmt::Debug, B: fmt::Debug, S: fmt::Debug> fmt::Display for ShutdownError<L, B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownError::Led(e) => write!(f, "led shutdown failed: {:?}", e),
            ShutdownError::Backlight(e) => write!(f, "backlight shutdown failed: {:?}", e),
            ShutdownError::Speaker(e) => write!(f, "speaker shutdown failed: {:?}", e),
        }
    }
}

/// The board outputs that need switching off before power-down.
pub struct Board<L, BL, S> {
    pub led: L,
    pub backlight: Backlight<BL>,
    pub speaker: Speaker<S>,
}

impl<L, BL, S> Board<L, BL, S>
where
    L: StatusLed,
    BL: OutputPin,
    S: SetDutyCycle,
{
    pub fn new(led: L, backlight: Backlight<BL>, speaker: Speaker<S>) -> Self {
        Self {
            led,
            backlight,
            speaker,
        }
    }

    /// Silences the speaker, darkens the LED and turns the backlight off.
    /// Every output is attempted; the first failure is returned.
    pub fn shutdown(&mut self) -> Result<(), ShutdownError<L::Error, BL::Error, S::Error>> {
        let speaker = self.speaker.silence().map_err(ShutdownError::Speaker);
        let led = self.led.off().map_err(ShutdownError::Led);
        let backlight = self.backlight.set(false).map_err(ShutdownError::Backlight);
        log::info!(
            "board: shutdown speaker_ok={} led_ok={} backlight_ok={}",
            speaker.is_ok(),
            led.is_ok(),
            backlight.is_ok()
        );
        speaker.and(led).and(backlight)
    }
}
