use core::fmt;

/// Failure surfaced by [`TouchDisplay::poll`](crate::TouchDisplay::poll).
///
/// `E` is the touch source's own error type.
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The touch controller could not be read this poll. Gesture state was
    /// left untouched.
    SensorUnavailable(E),
}

impl<E> From<E> for Error<E> {
    fn from(value: E) -> Self {
        Self::SensorUnavailable(value)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SensorUnavailable(e) => write!(f, "touch sensor unavailable: {:?}", e),
        }
    }
}

pub type Result<T, E> = core::result::Result<T, Error<E>>;
