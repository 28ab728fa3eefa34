use std::{cell::Cell, collections::VecDeque, convert::Infallible};

use cyd_touch::{
    CalibrationProfile, CalibrationTransform, Clock, Error, GestureEvent, GesturePhase,
    RawSample, TouchConfig, TouchDisplay, TouchSource,
};
use embedded_graphics::{
    pixelcolor::{Rgb565, RgbColor},
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};

struct FakeDisplay {
    size: Size,
    pixels: Vec<(Point, Rgb565)>,
}

impl FakeDisplay {
    fn portrait() -> Self {
        Self {
            size: Size::new(240, 320),
            pixels: Vec::new(),
        }
    }
}

impl OriginDimensions for FakeDisplay {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for FakeDisplay {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.pixels
            .extend(pixels.into_iter().map(|Pixel(point, color)| (point, color)));
        Ok(())
    }
}

#[derive(Default)]
struct ScriptedTouch {
    script: VecDeque<Result<Option<RawSample>, &'static str>>,
    reads: usize,
}

impl ScriptedTouch {
    fn push(&mut self, sample: Option<RawSample>, polls: usize) {
        for _ in 0..polls {
            self.script.push_back(Ok(sample));
        }
    }

    fn fail(&mut self) {
        self.script.push_back(Err("spi bus"));
    }
}

impl TouchSource for ScriptedTouch {
    type Error = &'static str;

    fn read_raw(&mut self) -> Result<Option<RawSample>, Self::Error> {
        self.reads += 1;
        self.script.pop_front().unwrap_or(Ok(None))
    }
}

#[derive(Default)]
struct StepClock {
    now_ms: Cell<u64>,
}

impl StepClock {
    fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

impl Clock for StepClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

const PRESS: RawSample = RawSample::new(100, 100, 50);

fn poll_all<D, T, C>(
    surface: &mut TouchDisplay<'_, D, T, C>,
    clock: &StepClock,
    polls: usize,
) -> Vec<Result<Option<GestureEvent>, Error<T::Error>>>
where
    D: DrawTarget + OriginDimensions,
    T: TouchSource,
    C: Clock,
{
    let mut results = Vec::new();
    for _ in 0..polls {
        results.push(surface.poll());
        clock.advance(20);
    }
    results
}

#[test]
fn drawing_goes_straight_to_display() {
    let mut display = FakeDisplay::portrait();
    let mut touch = ScriptedTouch::default();
    let clock = StepClock::default();
    let mut surface = TouchDisplay::with_defaults(&mut display, &mut touch, &clock);

    assert_eq!(surface.size(), Size::new(240, 320));
    Rectangle::new(Point::new(10, 20), Size::new(2, 3))
        .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
        .draw(&mut surface)
        .unwrap();
    Pixel(Point::new(5, 5), Rgb565::BLUE).draw(&mut surface).unwrap();

    assert_eq!(surface.display().pixels.len(), 7);
    assert!(display
        .pixels
        .contains(&(Point::new(11, 22), Rgb565::RED)));
    assert_eq!(display.pixels.last(), Some(&(Point::new(5, 5), Rgb565::BLUE)));
    assert_eq!(touch.reads, 0);
}

#[test]
fn short_press_polls_into_single_tap() {
    let mut display = FakeDisplay::portrait();
    let mut touch = ScriptedTouch::default();
    touch.push(Some(PRESS), 3);
    touch.push(None, 2);
    let clock = StepClock::default();
    let mut surface = TouchDisplay::with_defaults(&mut display, &mut touch, &clock);

    let results = poll_all(&mut surface, &clock, 5);
    let expected = CalibrationTransform::new(CalibrationProfile::DEFAULT, Size::new(240, 320))
        .map(PRESS, 40)
        .unwrap();
    assert_eq!(results[..4], [Ok(None), Ok(None), Ok(None), Ok(None)]);
    assert_eq!(results[4], Ok(Some(GestureEvent::SingleTap { point: expected })));
    assert_eq!(surface.phase(), GesturePhase::Idle);
    drop(surface);
    assert_eq!(touch.reads, 5);
}

#[test]
fn read_failure_is_reported_and_state_kept() {
    let mut display = FakeDisplay::portrait();
    let mut touch = ScriptedTouch::default();
    touch.push(Some(PRESS), 2);
    touch.fail();
    touch.push(Some(PRESS), 1);
    touch.push(None, 2);
    let clock = StepClock::default();
    let mut surface = TouchDisplay::with_defaults(&mut display, &mut touch, &clock);

    let results = poll_all(&mut surface, &clock, 2);
    assert!(results.iter().all(|result| *result == Ok(None)));
    let before = surface.last_trace();

    let failed = surface.poll();
    clock.advance(20);
    assert_eq!(failed, Err(Error::SensorUnavailable("spi bus")));
    assert_eq!(surface.last_trace(), before);
    assert_eq!(surface.phase(), GesturePhase::OneDownWaitSecond);

    let results = poll_all(&mut surface, &clock, 3);
    assert!(matches!(results[2], Ok(Some(GestureEvent::SingleTap { .. }))));
}

#[test]
fn idle_panel_never_emits() {
    let mut display = FakeDisplay::portrait();
    let mut touch = ScriptedTouch::default();
    let clock = StepClock::default();
    let mut surface = TouchDisplay::with_defaults(&mut display, &mut touch, &clock);

    for now_ms in (0..20_000).step_by(20) {
        assert_eq!(surface.poll_at(now_ms), Ok(None));
    }
    assert_eq!(surface.phase(), GesturePhase::Idle);
    assert_eq!(surface.last_point(), None);
}

#[test]
fn rotation_is_picked_up_by_refresh_bounds() {
    let mut display = FakeDisplay::portrait();
    let mut touch = ScriptedTouch::default();
    touch.push(Some(RawSample::new(100, 100, 80)), 3);
    let clock = StepClock::default();
    let mut surface = TouchDisplay::new(
        &mut display,
        &mut touch,
        &clock,
        CalibrationProfile::DEFAULT,
        TouchConfig::DEFAULT,
    );

    surface.display_mut().size = Size::new(320, 240);
    surface.set_calibration(CalibrationProfile::LANDSCAPE);
    surface.refresh_bounds();
    assert_eq!(surface.calibration(), &CalibrationProfile::LANDSCAPE);

    poll_all(&mut surface, &clock, 3);
    let point = surface.last_point().unwrap();
    assert_eq!((point.x, point.y), (319, 239));
}
