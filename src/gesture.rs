//! Gesture classification over debounced contact frames.

use statig::blocking::IntoStateMachineExt as _;

mod hsm;

use hsm::GestureHsm;

use crate::{
    config::GestureConfig,
    debounce::ContactFrame,
    types::{GestureEvent, GesturePhase, TouchPoint},
};

/// What the state machine needs from a frame, built by reference so ticks
/// never copy the frame's contact list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ContactSummary {
    now_ms: u64,
    count: u8,
    /// Earliest first-seen time among the stable contacts.
    first_seen_ms: u64,
    /// Latest matched sample time among the stable contacts.
    last_seen_ms: u64,
    /// Positions in slot order; only the first `count` are meaningful.
    points: [TouchPoint; 2],
}

impl ContactSummary {
    fn from_frame(frame: &ContactFrame) -> Self {
        let mut summary = Self {
            now_ms: frame.now_ms,
            first_seen_ms: frame.now_ms,
            ..Self::default()
        };
        for (index, tracked) in frame.contacts.iter().take(2).enumerate() {
            let contact = &tracked.contact;
            summary.first_seen_ms = summary.first_seen_ms.min(contact.first_seen_ms);
            summary.last_seen_ms = summary.last_seen_ms.max(contact.last_seen_ms);
            summary.points[index] = contact.point;
            summary.count += 1;
        }
        summary
    }
}

#[derive(Clone, Copy, Debug)]
enum GestureHsmEvent {
    Frame(ContactSummary),
    Reset,
}

#[derive(Default)]
struct DispatchContext {
    event: Option<GestureEvent>,
}

impl DispatchContext {
    fn emit(&mut self, event: GestureEvent) {
        // One event per tick; the first one wins.
        if self.event.is_none() {
            self.event = Some(event);
        }
    }
}

pub struct GestureClassifier {
    machine: statig::blocking::StateMachine<GestureHsm>,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureConfig::DEFAULT)
    }
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            machine: GestureHsm::new(config).state_machine(),
        }
    }

    /// Advances the state machine by one poll. Returns at most one gesture.
    pub fn tick(&mut self, frame: &ContactFrame) -> Option<GestureEvent> {
        let mut context = DispatchContext::default();
        let event = GestureHsmEvent::Frame(ContactSummary::from_frame(frame));
        self.machine.handle_with_context(&event, &mut context);
        context.event
    }

    /// Abandons any gesture in progress without emitting it.
    pub fn reset(&mut self) {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&GestureHsmEvent::Reset, &mut context);
    }

    pub fn phase(&self) -> GesturePhase {
        self.machine.inner().phase()
    }

    pub fn config(&self) -> &GestureConfig {
        self.machine.inner().config()
    }
}
