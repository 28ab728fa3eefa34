/// Presence filtering and contact tracking thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Consecutive matching present polls before a contact is accepted.
    pub press_polls: u8,
    /// Consecutive absent polls before all contacts are released.
    pub release_polls: u8,
    /// Raw pressure at or above this counts as contact.
    pub pressure_threshold: u16,
    /// Distance from a pending contact's first sample that later samples may
    /// land at and still count toward promotion.
    pub stable_tolerance_px: u16,
    /// How far a stable contact may move between matching samples.
    pub match_radius_px: u16,
    /// A contact that has missed at least two present polls and has not been
    /// matched for this long is released while others persist.
    pub contact_grace_ms: u64,
}

impl DebounceConfig {
    pub const DEFAULT: Self = Self {
        press_polls: 2,
        release_polls: 2,
        pressure_threshold: 20,
        stable_tolerance_px: 12,
        match_radius_px: 40,
        contact_grace_ms: 120,
    };
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Gesture timing windows, all in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureConfig {
    /// A second contact stabilizing this soon after the first pairs with it.
    pub pairing_window_ms: u64,
    /// Longest single-contact hold still reported as a tap.
    pub tap_max_ms: u64,
    /// Two-contact hold that arms the long press.
    pub long_press_ms: u64,
}

impl GestureConfig {
    pub const DEFAULT: Self = Self {
        pairing_window_ms: 100,
        tap_max_ms: 800,
        long_press_ms: 800,
    };
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchConfig {
    pub debounce: DebounceConfig,
    pub gesture: GestureConfig,
}

impl TouchConfig {
    pub const DEFAULT: Self = Self {
        debounce: DebounceConfig::DEFAULT,
        gesture: GestureConfig::DEFAULT,
    };
}
