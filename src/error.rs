// src/error.rs

//! Error types for the drawing and world-loop API.

use std::fmt;
use std::io;

/// Errors surfaced by `Canvas` and the world loop.
#[derive(Debug)]
pub enum WorldError {
    /// A `big_bang` argument was out of range.
    InvalidArgument {
        /// Parameter name, e.g. `"width"`.
        parameter: &'static str,
        /// 1-based argument position.
        position: usize,
        /// The rejected value, rendered for the message.
        value: String,
    },
    /// A blocking hand-off lost all of its producers before a value arrived.
    InterruptedWait,
    /// Writing a screenshot failed.
    Io(io::Error),
    /// Encoding a screenshot failed.
    Image(String),
    /// The window toolkit could not be started.
    Display(String),
}

impl WorldError {
    pub(crate) fn invalid_argument(
        parameter: &'static str,
        position: usize,
        value: impl fmt::Display,
    ) -> Self {
        WorldError::InvalidArgument {
            parameter,
            position,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::InvalidArgument {
                parameter,
                position,
                value,
            } => write!(
                f,
                "big_bang(width, height, tick_seconds) expects argument {} ({}) to be greater than 0, given {}",
                position, parameter, value
            ),
            WorldError::InterruptedWait => write!(f, "blocking wait was interrupted"),
            WorldError::Io(e) => write!(f, "I/O failure: {}", e),
            WorldError::Image(msg) => write!(f, "image encoding failure: {}", msg),
            WorldError::Display(msg) => write!(f, "display unavailable: {}", msg),
        }
    }
}

impl std::error::Error for WorldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorldError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WorldError {
    fn from(err: io::Error) -> Self {
        WorldError::Io(err)
    }
}

impl From<image::ImageError> for WorldError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => WorldError::Io(e),
            other => WorldError::Image(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_names_parameter_and_value() {
        let err = WorldError::invalid_argument("height", 2, -5);
        let msg = err.to_string();
        assert!(msg.contains("argument 2"));
        assert!(msg.contains("height"));
        assert!(msg.contains("-5"));
    }
}
