//! The combined display and touch surface.

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    primitives::Rectangle,
    Pixel,
};

use crate::{
    calibration::CalibrationProfile,
    config::TouchConfig,
    driver::{Clock, TouchSource},
    error::{self, Error},
    pipeline::GesturePipeline,
    trace::PollTrace,
    types::{GestureEvent, GesturePhase, TouchPoint},
};

/// A display and its touch panel, driven as one device.
///
/// Drawing is forwarded untouched to the wrapped display, so any
/// `embedded-graphics` primitive can target a `TouchDisplay` directly.
/// Touch input is only read from [`poll`](Self::poll); nothing runs in the
/// background.
pub struct TouchDisplay<'a, D, T, C> {
    display: &'a mut D,
    touch: &'a mut T,
    clock: C,
    pipeline: GesturePipeline,
}

impl<'a, D, T, C> TouchDisplay<'a, D, T, C>
where
    D: DrawTarget + OriginDimensions,
    T: TouchSource,
    C: Clock,
{
    pub fn new(
        display: &'a mut D,
        touch: &'a mut T,
        clock: C,
        profile: CalibrationProfile,
        config: TouchConfig,
    ) -> Self {
        let pipeline = GesturePipeline::new(profile, display.size(), config);
        Self {
            display,
            touch,
            clock,
            pipeline,
        }
    }

    /// Reference board calibration with the default thresholds.
    pub fn with_defaults(display: &'a mut D, touch: &'a mut T, clock: C) -> Self {
        Self::new(
            display,
            touch,
            clock,
            CalibrationProfile::DEFAULT,
            TouchConfig::DEFAULT,
        )
    }

    /// Reads the touch panel once and advances gesture recognition.
    ///
    /// A read failure leaves all gesture state as it was; the next
    /// successful poll carries on from there.
    pub fn poll(&mut self) -> error::Result<Option<GestureEvent>, T::Error> {
        let now_ms = self.clock.now_ms();
        self.poll_at(now_ms)
    }

    /// [`poll`](Self::poll) with an explicit timestamp instead of the clock.
    pub fn poll_at(&mut self, now_ms: u64) -> error::Result<Option<GestureEvent>, T::Error> {
        let raw = match self.touch.read_raw() {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("touch: read_failed now_ms={}", now_ms);
                return Err(Error::SensorUnavailable(err));
            }
        };
        Ok(self.pipeline.tick(now_ms, raw))
    }

    /// Replaces the calibration, dropping any gesture in progress.
    pub fn set_calibration(&mut self, profile: CalibrationProfile) {
        self.pipeline.set_profile(profile);
    }

    pub fn calibration(&self) -> &CalibrationProfile {
        self.pipeline.profile()
    }

    /// Re-reads the display size, e.g. after the driver was rotated.
    pub fn refresh_bounds(&mut self) {
        let size = self.display.size();
        self.pipeline.set_bounds(size);
    }

    /// Position of the current contact, if a finger is down.
    pub fn last_point(&self) -> Option<TouchPoint> {
        self.pipeline.last_point()
    }

    pub fn phase(&self) -> GesturePhase {
        self.pipeline.phase()
    }

    pub fn last_trace(&self) -> PollTrace {
        self.pipeline.last_trace()
    }

    pub fn display(&self) -> &D {
        self.display
    }

    /// Direct driver access, for calls beyond `DrawTarget` such as
    /// rotation. Call [`refresh_bounds`](Self::refresh_bounds) after
    /// changing the display size.
    pub fn display_mut(&mut self) -> &mut D {
        self.display
    }
}

impl<D, T, C> OriginDimensions for TouchDisplay<'_, D, T, C>
where
    D: OriginDimensions,
{
    fn size(&self) -> Size {
        self.display.size()
    }
}

impl<D, T, C> DrawTarget for TouchDisplay<'_, D, T, C>
where
    D: DrawTarget + OriginDimensions,
{
    type Color = D::Color;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.display.draw_iter(pixels)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.display.fill_contiguous(area, colors)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.display.fill_solid(area, color)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.display.clear(color)
    }
}
