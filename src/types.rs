/// Most contacts tracked at once. The panel reports one point per read, so a
/// second finger is inferred from alternating samples.
pub const MAX_CONTACTS: usize = 2;

/// Uncalibrated touch reading in panel ADC units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSample {
    pub x: u16,
    pub y: u16,
    pub pressure: u16,
}

impl RawSample {
    pub const fn new(x: u16, y: u16, pressure: u16) -> Self {
        Self { x, y, pressure }
    }

    /// The controller reads back `0,0` when the pen lifts mid-conversion.
    pub fn is_unset(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Calibrated position in display pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
    /// Monotonic timestamp of the sample this point was computed from.
    pub t_ms: u64,
}

impl TouchPoint {
    pub const fn new(x: u16, y: u16, t_ms: u64) -> Self {
        Self { x, y, t_ms }
    }

    pub fn squared_distance(&self, other: &TouchPoint) -> i32 {
        let dx = self.x as i32 - other.x as i32;
        let dy = self.y as i32 - other.y as i32;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    pub fn within(&self, other: &TouchPoint, radius_px: u16) -> bool {
        let radius = radius_px as i32;
        self.squared_distance(other) <= radius.saturating_mul(radius)
    }
}

/// One finger's presence, from first matching sample to release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    /// Most recent calibrated sample matched to this contact.
    pub point: TouchPoint,
    pub first_seen_ms: u64,
    pub last_seen_ms: u64,
    /// Set once enough consistent samples have been seen.
    pub stable: bool,
    /// Matching samples observed while pending.
    pub samples: u8,
}

impl Contact {
    pub(crate) fn pending(point: TouchPoint) -> Self {
        Self {
            point,
            first_seen_ms: point.t_ms,
            last_seen_ms: point.t_ms,
            stable: false,
            samples: 1,
        }
    }

    pub(crate) fn observe(&mut self, point: TouchPoint) {
        self.point = point;
        self.last_seen_ms = point.t_ms;
        self.samples = self.samples.saturating_add(1);
    }

    pub fn held_ms(&self) -> u64 {
        self.last_seen_ms.saturating_sub(self.first_seen_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureEvent {
    SingleTap {
        point: TouchPoint,
    },
    TwoFingerTap {
        point_a: TouchPoint,
        point_b: TouchPoint,
    },
    /// Emitted once, when the hold crosses the long-press threshold.
    TwoFingerLongPress {
        point_a: TouchPoint,
        point_b: TouchPoint,
        duration_ms: u32,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GesturePhase {
    #[default]
    Idle,
    OneDownWaitSecond,
    OneDown,
    TwoDown,
    TwoDownLong,
}

impl GesturePhase {
    pub fn label(self) -> &'static str {
        match self {
            GesturePhase::Idle => "idle",
            GesturePhase::OneDownWaitSecond => "one_down_wait_second",
            GesturePhase::OneDown => "one_down",
            GesturePhase::TwoDown => "two_down",
            GesturePhase::TwoDownLong => "two_down_long",
        }
    }
}
