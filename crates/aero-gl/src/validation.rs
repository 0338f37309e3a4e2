use std::fmt;

use thiserror::Error;

use crate::handle::Handle;

/// A draw-time precondition the legacy API would have rejected.
///
/// Reported, never enforced: the draw still goes ahead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("draw called without a bound program")]
    NoProgram,
    #[error("draw called with program {0:?} that is not successfully linked")]
    ProgramNotLinked(Handle),
    #[error("vertex attribute {attribute} is enabled but binding {binding} has no buffer")]
    AttributeWithoutBuffer { attribute: u32, binding: u32 },
    #[error("draw framebuffer {framebuffer:?} is incomplete (status {status:#06x})")]
    FramebufferIncomplete { framebuffer: Handle, status: u32 },
}

pub type ValidationCallback = Box<dyn FnMut(&ValidationError) + Send>;

/// Holds the enable flag and where reports go.
pub struct Validator {
    enabled: bool,
    callback: ValidationCallback,
}

impl Validator {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            callback: Box::new(log_validation_error),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_callback(&mut self, callback: ValidationCallback) {
        self.callback = callback;
    }

    pub fn report(&mut self, error: &ValidationError) {
        if self.enabled {
            (self.callback)(error);
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

fn log_validation_error(error: &ValidationError) {
    tracing::warn!(%error, "legacy GL validation failure");
}
