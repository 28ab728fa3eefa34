//! Display and gesture surface for ESP32 "cheap yellow display" boards.
//!
//! The board pairs an SPI color LCD with an XPT2046 resistive touch panel.
//! This crate lets application code treat both as one device: drawing goes
//! straight through to an `embedded-graphics` display driver, while raw
//! touch samples are debounced, calibrated into display pixels and
//! classified into [`GestureEvent`]s.
//!
//! ```no_run
//! # use cyd_touch::{Clock, TouchDisplay, TouchSource};
//! # fn demo<D, T, C>(display: &mut D, touch: &mut T, clock: C)
//! # where
//! #     D: embedded_graphics::draw_target::DrawTarget
//! #         + embedded_graphics::geometry::OriginDimensions,
//! #     T: TouchSource,
//! #     T::Error: core::fmt::Debug,
//! #     C: Clock,
//! # {
//! let mut surface = TouchDisplay::with_defaults(display, touch, clock);
//! loop {
//!     match surface.poll() {
//!         Ok(Some(event)) => log::info!("gesture: {:?}", event),
//!         Ok(None) => {}
//!         Err(err) => log::warn!("touch: {}", err),
//!     }
//! }
//! # }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod calibration;
pub mod config;
pub mod debounce;
pub mod device;
pub mod driver;
pub mod error;
pub mod gesture;
pub mod pipeline;
pub mod trace;
pub mod types;

pub use board::{
    AnalogInput, Backlight, Board, LedColor, LightSensor, PwmRgbLed, RgbLed, ShutdownError,
    Speaker, StatusLed, ToneFrequency,
};
pub use calibration::{CalibrationProfile, CalibrationTransform, Fx, Orientation, PanelExtents};
pub use config::{DebounceConfig, GestureConfig, TouchConfig};
pub use debounce::{ContactFrame, ContactTracker};
pub use device::TouchDisplay;
pub use driver::{Clock, TouchSource, Xpt2046};
pub use error::{Error, Result};
pub use gesture::GestureClassifier;
pub use pipeline::GesturePipeline;
pub use trace::PollTrace;
pub use types::{Contact, GestureEvent, GesturePhase, RawSample, TouchPoint};

#[cfg(feature = "embassy")]
pub use driver::EmbassyClock;
