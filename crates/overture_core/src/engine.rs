//! # Engine Driver
//!
//! Owns the [`World`] and the [`Scheduler`] and drives the phase order:
//!
//! ```text
//! Setup
//! loop { PreUpdate → Update → PostUpdate → PreRender → Render → PostRender }
//! Cleanup → PostCleanup
//! ```
//!
//! The loop ends when a system calls [`World::request_exit`] or when
//! `max_frames` frames have run.

use crate::config::EngineConfig;
use crate::ecs::World;
use crate::error::ScheduleResult;
use crate::schedule::{Phase, Scheduler, System};

/// The world, its systems and the loop that runs them.
///
/// # Example
///
/// ```rust
/// use overture_core::{Engine, EngineConfig, FnSystem, Phase, World};
///
/// let mut engine = Engine::with_config(EngineConfig {
///     max_frames: Some(3),
///     ..EngineConfig::default()
/// });
/// engine
///     .register(Phase::Update, FnSystem::new("noop", |_: &World| {}))
///     .unwrap();
///
/// assert_eq!(engine.run().unwrap(), 3);
/// ```
#[derive(Debug)]
pub struct Engine {
    world: World,
    scheduler: Scheduler,
    config: EngineConfig,
    set_up: bool,
}

impl Engine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine from a configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            world: World::with_config(config.world.clone()),
            scheduler: Scheduler::with_config(config.scheduler.clone()),
            config,
            set_up: false,
        }
    }

    /// The world shared by every system.
    #[inline]
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The scheduler.
    #[inline]
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Appends `system` to `phase`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::AlreadyArmed`](crate::ScheduleError::AlreadyArmed)
    /// once the engine has started.
    pub fn register(&mut self, phase: Phase, system: impl System + 'static) -> ScheduleResult<()> {
        self.scheduler.register(phase, system)
    }

    /// Prepends `system` to `phase`.
    ///
    /// # Errors
    ///
    /// See [`Engine::register`].
    pub fn register_front(&mut self, phase: Phase, system: impl System + 'static) -> ScheduleResult<()> {
        self.scheduler.register_front(phase, system)
    }

    /// Arms the scheduler and runs [`Phase::Setup`].
    ///
    /// Setup runs at most once per engine; later calls, including the one
    /// made by [`Engine::run`], do nothing.
    ///
    /// # Errors
    ///
    /// Propagates arming errors.
    pub fn setup(&mut self) -> ScheduleResult<()> {
        if self.set_up {
            return Ok(());
        }
        self.scheduler.arm()?;
        self.scheduler.run(Phase::Setup, &self.world)?;
        self.set_up = true;
        Ok(())
    }

    /// Runs one frame: every phase of [`Phase::FRAME`] in order.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotArmed`](crate::ScheduleError::NotArmed)
    /// before [`Engine::setup`].
    pub fn step(&self) -> ScheduleResult<()> {
        for phase in Phase::FRAME {
            self.scheduler.run(phase, &self.world)?;
        }
        Ok(())
    }

    /// Runs [`Phase::Cleanup`] and [`Phase::PostCleanup`].
    ///
    /// # Errors
    ///
    /// See [`Engine::step`].
    pub fn shutdown(&self) -> ScheduleResult<()> {
        for phase in Phase::SHUTDOWN {
            self.scheduler.run(phase, &self.world)?;
        }
        Ok(())
    }

    /// Runs setup (unless [`Engine::setup`] already did), the frame loop and
    /// shutdown. Returns the number of frames.
    ///
    /// # Errors
    ///
    /// Propagates arming errors.
    pub fn run(&mut self) -> ScheduleResult<u64> {
        self.setup()?;
        tracing::info!(entities = self.world.len(), max_frames = ?self.config.max_frames, "engine started");

        let mut frames = 0u64;
        while !self.world.exit_requested() && self.config.max_frames.map_or(true, |max| frames < max) {
            self.step()?;
            frames += 1;
        }

        self.shutdown()?;
        tracing::info!(frames, exit_requested = self.world.exit_requested(), "engine stopped");
        Ok(frames)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
