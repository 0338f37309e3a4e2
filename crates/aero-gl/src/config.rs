/// How a [`crate::StateStore`] guards its [`crate::GlState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThreadingMode {
    /// One owner, no lock. The usual case: a render thread drives the tracker.
    #[default]
    SingleThreaded,
    /// The whole store sits behind one exclusive lock.
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateConfig {
    /// Report draw-time precondition violations through the validation callback.
    pub validation: bool,
    pub threading: ThreadingMode,
    /// Frames a deleted GPU object waits before it is handed to the destroyer.
    pub deletion_delay_frames: u64,
}

impl StateConfig {
    pub const DEFAULT_DELETION_DELAY_FRAMES: u64 = 3;

    /// Defaults overridden by `AERO_GL_VALIDATION`, `AERO_GL_LOCKED` and
    /// `AERO_GL_DELETION_DELAY_FRAMES`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if env_var_truthy("AERO_GL_VALIDATION") {
            config.validation = true;
        }
        if env_var_truthy("AERO_GL_LOCKED") {
            config.threading = ThreadingMode::Locked;
        }
        if let Ok(raw) = std::env::var("AERO_GL_DELETION_DELAY_FRAMES") {
            match raw.trim().parse::<u64>() {
                Ok(frames) => config.deletion_delay_frames = frames,
                Err(_) => tracing::warn!(
                    value = %raw,
                    "ignoring unparsable AERO_GL_DELETION_DELAY_FRAMES"
                ),
            }
        }
        config
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            validation: false,
            threading: ThreadingMode::SingleThreaded,
            deletion_delay_frames: Self::DEFAULT_DELETION_DELAY_FRAMES,
        }
    }
}

fn env_var_truthy(name: &str) -> bool {
    let Ok(raw) = std::env::var(name) else {
        return false;
    };

    let v = raw.trim();
    v == "1"
        || v.eq_ignore_ascii_case("true")
        || v.eq_ignore_ascii_case("yes")
        || v.eq_ignore_ascii_case("on")
}
