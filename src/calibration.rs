//! Raw panel to display pixel mapping.
//!
//! The XPT2046 reports 12-bit positions along the panel's own axes. A
//! [`CalibrationProfile`] describes how those axes line up with the display:
//! whether they are swapped, which ones run backwards, and the per-axis
//! scale and offset into pixels. Inversion is applied to the raw value first
//! (`RAW_FULL_SCALE - raw`), then `pixel = round(raw * scale + offset)`, then
//! the result is clamped to the display.

use embedded_graphics::geometry::Size;
use fixed::types::{I16F16, I32F32};

use crate::types::{RawSample, TouchPoint};

/// Fixed-point scalar used for calibration math.
pub type Fx = I16F16;

/// Full scale of a 12-bit XPT2046 conversion.
pub const RAW_FULL_SCALE: u16 = 4095;

const fn fx(value: f64) -> Fx {
    let scaled = value * 65536.0;
    let rounded = if scaled < 0.0 {
        scaled - 0.5
    } else {
        scaled + 0.5
    };
    Fx::from_bits(rounded as i32)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Portrait,
    PortraitFlipped,
    Landscape,
    LandscapeFlipped,
}

impl Orientation {
    /// Whether panel X drives display Y.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Orientation::Landscape | Orientation::LandscapeFlipped)
    }

    // Display axes running against the panel's raw axes on the reference
    // board, as (display x mirrored, display y mirrored).
    fn mirrored(self) -> (bool, bool) {
        match self {
            Orientation::Portrait => (false, true),
            Orientation::PortraitFlipped => (true, false),
            Orientation::Landscape => (true, true),
            Orientation::LandscapeFlipped => (false, false),
        }
    }
}

/// Raw readings at the visible edges of the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelExtents {
    pub x_min: u16,
    pub x_max: u16,
    pub y_min: u16,
    pub y_max: u16,
}

impl PanelExtents {
    /// Measured on an ESP32-2432S028R.
    pub const REFERENCE: Self = Self {
        x_min: 100,
        x_max: 1962,
        y_min: 100,
        y_max: 1900,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationProfile {
    pub x_scale: Fx,
    pub x_offset: Fx,
    pub y_scale: Fx,
    pub y_offset: Fx,
    pub swap_axes: bool,
    pub invert_x: bool,
    pub invert_y: bool,
}

impl CalibrationProfile {
    /// Reference board (ESP32-2432S028R, 240x320) in portrait orientation.
    /// The panel's Y axis runs opposite to the display's.
    pub const DEFAULT: Self = Self::PORTRAIT;

    pub const PORTRAIT: Self = Self {
        x_scale: fx(0.128_893_663),
        x_offset: fx(-12.889_366),
        y_scale: fx(0.177_777_778),
        y_offset: fx(-391.222_222),
        swap_axes: false,
        invert_x: false,
        invert_y: true,
    };

    pub const PORTRAIT_FLIPPED: Self = Self {
        x_scale: fx(0.128_893_663),
        x_offset: fx(-275.930_183),
        y_scale: fx(0.177_777_778),
        y_offset: fx(-17.777_778),
        swap_axes: false,
        invert_x: true,
        invert_y: false,
    };

    pub const LANDSCAPE: Self = Self {
        x_scale: fx(0.177_777_778),
        x_offset: fx(-391.222_222),
        y_scale: fx(0.128_893_663),
        y_offset: fx(-275.930_183),
        swap_axes: true,
        invert_x: true,
        invert_y: true,
    };

    pub const LANDSCAPE_FLIPPED: Self = Self {
        x_scale: fx(0.177_777_778),
        x_offset: fx(-17.777_778),
        y_scale: fx(0.128_893_663),
        y_offset: fx(-12.889_366),
        swap_axes: true,
        invert_x: false,
        invert_y: false,
    };

    /// Reference board preset for a display orientation.
    pub const fn for_orientation(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Portrait => Self::PORTRAIT,
            Orientation::PortraitFlipped => Self::PORTRAIT_FLIPPED,
            Orientation::Landscape => Self::LANDSCAPE,
            Orientation::LandscapeFlipped => Self::LANDSCAPE_FLIPPED,
        }
    }

    /// Builds a profile from measured raw extents for a display of `size`
    /// (already rotated for `orientation`).
    ///
    /// Returns `None` when an extent is empty or the resulting constants do
    /// not fit [`Fx`].
    pub fn from_extents(
        extents: PanelExtents,
        size: Size,
        orientation: Orientation,
    ) -> Option<Self> {
        let swap_axes = orientation.swaps_axes();
        let (mirror_x, mirror_y) = orientation.mirrored();
        // After a swap, display x is driven by raw y and vice versa.
        let ((x_lo, x_hi), (y_lo, y_hi)) = if swap_axes {
            (
                (extents.y_min, extents.y_max),
                (extents.x_min, extents.x_max),
            )
        } else {
            (
                (extents.x_min, extents.x_max),
                (extents.y_min, extents.y_max),
            )
        };
        let (x_scale, x_offset) = axis_constants(x_lo, x_hi, size.width, mirror_x)?;
        let (y_scale, y_offset) = axis_constants(y_lo, y_hi, size.height, mirror_y)?;
        Some(Self {
            x_scale,
            x_offset,
            y_scale,
            y_offset,
            swap_axes,
            invert_x: mirror_x,
            invert_y: mirror_y,
        })
    }
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// pixel = (raw - lo) * scale, or for a mirrored axis
// pixel = (extent - 1) - (raw - lo) * scale, rewritten over the inverted raw
// value (RAW_FULL_SCALE - raw) so the transform only ever adds an offset.
fn axis_constants(lo: u16, hi: u16, extent: u32, mirrored: bool) -> Option<(Fx, Fx)> {
    if hi <= lo || extent == 0 {
        return None;
    }
    let extent = Fx::checked_from_num(extent)?;
    let span = Fx::checked_from_num(hi - lo)?;
    let scale = extent.checked_div(span)?;
    let lo_px = Fx::checked_from_num(lo)?.checked_mul(scale)?;
    let offset = if mirrored {
        let full_px = Fx::checked_from_num(RAW_FULL_SCALE)?.checked_mul(scale)?;
        extent
            .checked_sub(Fx::ONE)?
            .checked_add(lo_px)?
            .checked_sub(full_px)?
    } else {
        lo_px.checked_neg()?
    };
    Some((scale, offset))
}

/// Applies a [`CalibrationProfile`] within the current display bounds.
#[derive(Clone, Copy, Debug)]
pub struct CalibrationTransform {
    profile: CalibrationProfile,
    width: u16,
    height: u16,
}

impl CalibrationTransform {
    pub fn new(profile: CalibrationProfile, bounds: Size) -> Self {
        let mut transform = Self {
            profile,
            width: 0,
            height: 0,
        };
        transform.set_bounds(bounds);
        transform
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    pub fn set_profile(&mut self, profile: CalibrationProfile) {
        self.profile = profile;
    }

    pub fn bounds(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }

    /// Re-reads display bounds, e.g. after the display was rotated.
    pub fn set_bounds(&mut self, bounds: Size) {
        self.width = u16::try_from(bounds.width).unwrap_or(u16::MAX);
        self.height = u16::try_from(bounds.height).unwrap_or(u16::MAX);
    }

    /// Maps a raw sample to a display pixel.
    ///
    /// Out-of-range samples are clamped to the display. `None` means the
    /// sample is malformed (an unset `0,0` reading, or arithmetic overflow
    /// from a bad profile) and should be treated as no contact.
    pub fn map(&self, raw: RawSample, t_ms: u64) -> Option<TouchPoint> {
        if raw.is_unset() {
            return None;
        }
        let profile = &self.profile;
        let (raw_x, raw_y) = if profile.swap_axes {
            (raw.y, raw.x)
        } else {
            (raw.x, raw.y)
        };
        let x = scale_axis(
            mirror(raw_x, profile.invert_x),
            profile.x_scale,
            profile.x_offset,
        )?;
        let y = scale_axis(
            mirror(raw_y, profile.invert_y),
            profile.y_scale,
            profile.y_offset,
        )?;
        Some(TouchPoint {
            x: clamp_axis(x, self.width),
            y: clamp_axis(y, self.height),
            t_ms,
        })
    }
}

fn mirror(raw: u16, invert: bool) -> i32 {
    if invert {
        RAW_FULL_SCALE as i32 - raw as i32
    } else {
        raw as i32
    }
}

// Widened so any u16 reading survives the multiply and can be clamped.
fn scale_axis(raw: i32, scale: Fx, offset: Fx) -> Option<i32> {
    let value = I32F32::checked_from_num(raw)?
        .checked_mul(I32F32::from_num(scale))?
        .checked_add(I32F32::from_num(offset))?
        .checked_round()?;
    value.checked_to_num::<i32>()
}

fn clamp_axis(value: i32, extent: u16) -> u16 {
    if extent == 0 {
        return 0;
    }
    value.clamp(0, extent as i32 - 1) as u16
}
