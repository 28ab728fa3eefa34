//! Raw sample to gesture pipeline, independent of any hardware.
//!
//! Each tick runs one poll's worth of data through the pressure gate,
//! calibration, the contact tracker and the classifier, in that order.

use embedded_graphics::geometry::Size;

use crate::{
    calibration::{CalibrationProfile, CalibrationTransform},
    config::TouchConfig,
    debounce::ContactTracker,
    gesture::GestureClassifier,
    trace::PollTrace,
    types::{GestureEvent, GesturePhase, RawSample, TouchPoint},
};

pub struct GesturePipeline {
    transform: CalibrationTransform,
    tracker: ContactTracker,
    classifier: GestureClassifier,
    pressure_threshold: u16,
    last_point: Option<TouchPoint>,
    last_trace: PollTrace,
}

impl GesturePipeline {
    pub fn new(profile: CalibrationProfile, bounds: Size, config: TouchConfig) -> Self {
        Self {
            transform: CalibrationTransform::new(profile, bounds),
            tracker: ContactTracker::new(config.debounce),
            classifier: GestureClassifier::new(config.gesture),
            pressure_threshold: config.debounce.pressure_threshold,
            last_point: None,
            last_trace: PollTrace::default(),
        }
    }

    pub fn tick(&mut self, now_ms: u64, raw: Option<RawSample>) -> Option<GestureEvent> {
        let present = raw
            .filter(|raw| raw.pressure >= self.pressure_threshold)
            .and_then(|raw| self.transform.map(raw, now_ms));

        let frame = self.tracker.update(now_ms, present);
        if frame.count() == 0 {
            self.last_point = None;
        } else if let Some(point) = frame.latest {
            self.last_point = Some(point);
        }

        let event = self.classifier.tick(&frame);
        self.last_trace = PollTrace {
            now_ms,
            present: present.is_some(),
            contact_count: frame.count() as u8,
            pending_count: frame.pending,
            ignored_samples: frame.ignored_samples,
            phase: self.classifier.phase(),
        };
        event
    }

    /// Drops all contacts and any gesture in progress.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.classifier.reset();
        self.last_point = None;
    }

    pub fn profile(&self) -> &CalibrationProfile {
        self.transform.profile()
    }

    /// Swaps the calibration. Contacts tracked under the old mapping are
    /// dropped.
    pub fn set_profile(&mut self, profile: CalibrationProfile) {
        self.transform.set_profile(profile);
        self.reset();
    }

    pub fn bounds(&self) -> Size {
        self.transform.bounds()
    }

    pub fn set_bounds(&mut self, bounds: Size) {
        if bounds != self.transform.bounds() {
            self.transform.set_bounds(bounds);
            self.reset();
        }
    }

    /// Latest calibrated position of a stable contact, `None` once released.
    pub fn last_point(&self) -> Option<TouchPoint> {
        self.last_point
    }

    pub fn phase(&self) -> GesturePhase {
        self.classifier.phase()
    }

    pub fn last_trace(&self) -> PollTrace {
        self.last_trace
    }
}
