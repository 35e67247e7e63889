//! Execution phases of a frame.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named stage in the frame order, holding an ordered list of systems.
///
/// `Setup` runs once before the first frame, the six frame phases repeat
/// every frame, and `Cleanup` / `PostCleanup` run once at shutdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Runs once before the first frame.
    Setup,
    /// First phase of every frame.
    PreUpdate,
    /// Main simulation phase.
    Update,
    /// Runs after the simulation.
    PostUpdate,
    /// Prepares render data.
    PreRender,
    /// Submits render work.
    Render,
    /// Last phase of every frame.
    PostRender,
    /// Runs once at shutdown.
    Cleanup,
    /// Runs once after [`Phase::Cleanup`].
    PostCleanup,
}

impl Phase {
    /// Number of phases.
    pub const COUNT: usize = 9;

    /// Every phase in execution order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Setup,
        Self::PreUpdate,
        Self::Update,
        Self::PostUpdate,
        Self::PreRender,
        Self::Render,
        Self::PostRender,
        Self::Cleanup,
        Self::PostCleanup,
    ];

    /// Phases that repeat every frame, in order.
    pub const FRAME: [Self; 6] = [
        Self::PreUpdate,
        Self::Update,
        Self::PostUpdate,
        Self::PreRender,
        Self::Render,
        Self::PostRender,
    ];

    /// Phases that run once at shutdown, in order.
    pub const SHUTDOWN: [Self; 2] = [Self::Cleanup, Self::PostCleanup];

    /// Position of this phase in [`Phase::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name of the phase.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Setup => "Setup",
            Self::PreUpdate => "PreUpdate",
            Self::Update => "Update",
            Self::PostUpdate => "PostUpdate",
            Self::PreRender => "PreRender",
            Self::Render => "Render",
            Self::PostRender => "PostRender",
            Self::Cleanup => "Cleanup",
            Self::PostCleanup => "PostCleanup",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
