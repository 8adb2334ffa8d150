//! Tracks metadata for a rendering session.

use std::sync::Arc;

use crate::log;

/// Metadata for a rendering session.
///
/// A backend is created before any page is drawn, and there is no other place
/// where the library may keep track of things like whether logging is on.
/// This struct provides that context.  It is cheap to clone; clones share
/// the same data.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    log_enabled: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                log_enabled: log::log_enabled(),
            }),
        }
    }

    /// A session with logging turned off, regardless of the environment.
    pub fn new_for_test_suite() -> Self {
        Self {
            inner: Arc::new(SessionInner { log_enabled: false }),
        }
    }

    pub fn log_enabled(&self) -> bool {
        self.inner.log_enabled
    }
}
