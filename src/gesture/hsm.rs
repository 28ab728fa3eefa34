use super::*;
use statig::prelude::*;

pub(super) struct GestureHsm {
    config: GestureConfig,
    phase: GesturePhase,
    /// Earliest first-seen time among the contacts of this gesture.
    started_ms: u64,
    first_stable_ms: u64,
    last_seen_ms: u64,
    last_point: TouchPoint,
    pair: [TouchPoint; 2],
    /// Frames seen since the first contact stabilized.
    wait_polls: u8,
    second_seen: bool,
    pair_broken: bool,
}

impl GestureHsm {
    pub(super) fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: GesturePhase::Idle,
            started_ms: 0,
            first_stable_ms: 0,
            last_seen_ms: 0,
            last_point: TouchPoint::default(),
            pair: [TouchPoint::default(); 2],
            wait_polls: 0,
            second_seen: false,
            pair_broken: false,
        }
    }

    pub(super) fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub(super) fn config(&self) -> &GestureConfig {
        &self.config
    }

    fn enter(&mut self, now_ms: u64, phase: GesturePhase) {
        if self.phase != phase {
            log::debug!(
                "gesture: phase now_ms={} from={} to={}",
                now_ms,
                self.phase.label(),
                phase.label()
            );
        }
        self.phase = phase;
    }

    fn observe(&mut self, frame: &ContactSummary) {
        self.last_seen_ms = self.last_seen_ms.max(frame.last_seen_ms);
        if frame.count >= 1 {
            self.last_point = frame.points[0];
        }
        if frame.count >= 2 {
            self.pair = frame.points;
        }
    }

    fn begin_single(&mut self, frame: &ContactSummary) {
        self.started_ms = frame.first_seen_ms;
        self.first_stable_ms = frame.now_ms;
        self.last_seen_ms = 0;
        self.wait_polls = 0;
        self.second_seen = false;
        self.pair_broken = false;
        self.observe(frame);
    }

    fn begin_pair(&mut self, frame: &ContactSummary) {
        self.started_ms = self.started_ms.min(frame.first_seen_ms);
        self.pair_broken = false;
        self.observe(frame);
    }

    fn begin_pair_from_idle(&mut self, frame: &ContactSummary) {
        self.begin_single(frame);
        self.begin_pair(frame);
    }

    // The second contact of an alternating pair stabilizes one poll after
    // the first, however slow the poll cadence is.
    fn pairing_open(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.first_stable_ms) < self.config.pairing_window_ms
            || self.wait_polls <= 1
    }

    fn hold_ms(&self) -> u64 {
        self.last_seen_ms.saturating_sub(self.started_ms)
    }

    fn finish_single(&mut self, context: &mut DispatchContext, now_ms: u64) {
        let hold_ms = self.hold_ms();
        if !self.second_seen && hold_ms < self.config.tap_max_ms {
            let point = self.last_point;
            log::debug!(
                "gesture: single_tap now_ms={} x={} y={} hold_ms={}",
                now_ms,
                point.x,
                point.y,
                hold_ms
            );
            context.emit(GestureEvent::SingleTap { point });
        } else {
            log::debug!(
                "gesture: single_dropped now_ms={} hold_ms={} second_seen={}",
                now_ms,
                hold_ms,
                self.second_seen
            );
        }
        self.enter(now_ms, GesturePhase::Idle);
    }

    fn finish_pair(&mut self, context: &mut DispatchContext, now_ms: u64) {
        let hold_ms = self.hold_ms();
        if hold_ms < self.config.long_press_ms {
            let [point_a, point_b] = self.pair;
            log::debug!(
                "gesture: two_finger_tap now_ms={} a=({},{}) b=({},{}) hold_ms={}",
                now_ms,
                point_a.x,
                point_a.y,
                point_b.x,
                point_b.y,
                hold_ms
            );
            context.emit(GestureEvent::TwoFingerTap { point_a, point_b });
        }
        self.enter(now_ms, GesturePhase::Idle);
    }

    fn emit_long_press(&mut self, context: &mut DispatchContext, now_ms: u64) {
        let held = now_ms.saturating_sub(self.started_ms);
        let duration_ms = u32::try_from(held).unwrap_or(u32::MAX);
        let [point_a, point_b] = self.pair;
        log::debug!(
            "gesture: two_finger_long_press now_ms={} duration_ms={}",
            now_ms,
            duration_ms
        );
        context.emit(GestureEvent::TwoFingerLongPress {
            point_a,
            point_b,
            duration_ms,
        });
        self.enter(now_ms, GesturePhase::TwoDownLong);
    }

    fn abandon(&mut self) {
        if self.phase != GesturePhase::Idle {
            log::debug!("gesture: reset from={}", self.phase.label());
        }
        self.phase = GesturePhase::Idle;
        self.second_seen = false;
        self.pair_broken = false;
    }
}

#[state_machine(initial = "State::idle()")]
impl GestureHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        let _ = context;
        match event {
            GestureHsmEvent::Frame(frame) => match frame.count {
                0 => Handled,
                1 => {
                    self.begin_single(frame);
                    self.enter(frame.now_ms, GesturePhase::OneDownWaitSecond);
                    Transition(State::one_down_wait_second())
                }
                _ => {
                    self.begin_pair_from_idle(frame);
                    self.enter(frame.now_ms, GesturePhase::TwoDown);
                    Transition(State::two_down())
                }
            },
            GestureHsmEvent::Reset => Handled,
        }
    }

    #[state(superstate = "engaged")]
    fn one_down_wait_second(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Frame(frame) => {
                self.wait_polls = self.wait_polls.saturating_add(1);
                let window_open = self.pairing_open(frame.now_ms);
                match frame.count {
                    0 => {
                        self.finish_single(context, frame.now_ms);
                        Transition(State::idle())
                    }
                    1 => {
                        self.observe(frame);
                        if window_open {
                            Handled
                        } else {
                            self.enter(frame.now_ms, GesturePhase::OneDown);
                            Transition(State::one_down())
                        }
                    }
                    _ if window_open => {
                        self.begin_pair(frame);
                        self.enter(frame.now_ms, GesturePhase::TwoDown);
                        Transition(State::two_down())
                    }
                    _ => {
                        self.second_seen = true;
                        self.observe(frame);
                        self.enter(frame.now_ms, GesturePhase::OneDown);
                        Transition(State::one_down())
                    }
                }
            }
            GestureHsmEvent::Reset => Super,
        }
    }

    #[state(superstate = "engaged")]
    fn one_down(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Frame(frame) => {
                if frame.count == 0 {
                    self.finish_single(context, frame.now_ms);
                    return Transition(State::idle());
                }
                if frame.count >= 2 && !self.second_seen {
                    // Too late to pair; the hold is no longer a tap.
                    log::debug!("gesture: late_second now_ms={}", frame.now_ms);
                    self.second_seen = true;
                }
                self.observe(frame);
                Handled
            }
            GestureHsmEvent::Reset => Super,
        }
    }

    #[state(superstate = "engaged")]
    fn two_down(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Frame(frame) => match frame.count {
                0 => {
                    self.finish_pair(context, frame.now_ms);
                    Transition(State::idle())
                }
                1 => {
                    self.pair_broken = true;
                    self.observe(frame);
                    Handled
                }
                _ => {
                    self.observe(frame);
                    let held = frame.now_ms.saturating_sub(self.started_ms);
                    if !self.pair_broken && held >= self.config.long_press_ms {
                        self.emit_long_press(context, frame.now_ms);
                        return Transition(State::two_down_long());
                    }
                    Handled
                }
            },
            GestureHsmEvent::Reset => Super,
        }
    }

    #[state(superstate = "engaged")]
    fn two_down_long(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        let _ = context;
        match event {
            GestureHsmEvent::Frame(frame) => {
                if frame.count == 0 {
                    self.enter(frame.now_ms, GesturePhase::Idle);
                    return Transition(State::idle());
                }
                self.observe(frame);
                Handled
            }
            GestureHsmEvent::Reset => Super,
        }
    }

    #[superstate]
    fn engaged(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        let _ = context;
        match event {
            GestureHsmEvent::Reset => {
                self.abandon();
                Transition(State::idle())
            }
            _ => Super,
        }
    }
}
