//! Error types.

use std::error;
use std::fmt;

use crate::pdfcairo_log;
use crate::session::Session;

/// Errors that can happen while rendering a page.
///
/// Only unrecoverable situations are returned as errors.  Running out of memory
/// for a single image is reported through an [`ErrorReporter`] and the image is
/// skipped, so that the rest of the page still renders.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderingError {
    /// An error from the rendering backend.
    Rendering(String),

    /// Not enough memory was available for rendering.
    OutOfMemory(String),

    /// The sequence of callbacks violated the backend's invariants, for example
    /// painting a transparency group that was never ended.
    InvalidState(String),
}

/// What every drawing callback returns.
pub type DeviceResult = Result<(), RenderingError>;

impl error::Error for RenderingError {}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RenderingError::Rendering(ref s) => write!(f, "rendering error: {s}"),
            RenderingError::OutOfMemory(ref s) => write!(f, "out of memory: {s}"),
            RenderingError::InvalidState(ref s) => write!(f, "invalid backend state: {s}"),
        }
    }
}

impl From<cairo::Error> for RenderingError {
    fn from(e: cairo::Error) -> RenderingError {
        match e {
            cairo::Error::NoMemory | cairo::Error::InvalidSize => {
                RenderingError::OutOfMemory(format!("{e:?}"))
            }
            _ => RenderingError::Rendering(format!("{e:?}")),
        }
    }
}

impl From<cairo::BorrowError> for RenderingError {
    fn from(e: cairo::BorrowError) -> RenderingError {
        match e {
            cairo::BorrowError::Cairo(e) => e.into(),
            _ => RenderingError::Rendering(String::from("surface data is already borrowed")),
        }
    }
}

/// How serious a condition reported to an [`ErrorReporter`] is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Receives recoverable problems found while rendering.
pub trait ErrorReporter {
    fn report(&self, severity: Severity, message: &str);
}

/// Default reporter; writes reports to the session log.
pub struct LogReporter {
    session: Session,
}

impl LogReporter {
    pub fn new(session: Session) -> Self {
        LogReporter { session }
    }
}

impl ErrorReporter for LogReporter {
    fn report(&self, severity: Severity, message: &str) {
        pdfcairo_log!(self.session, "({severity}: {message})");
    }
}
