//! # Configuration
//!
//! Tunables for the world, the scheduler and the engine loop.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! max_frames = 600
//!
//! [world]
//! initial_capacity = 4096
//! lazy_registration = true
//!
//! [scheduler]
//! worker_threads = 4
//! conflict_policy = "reject"
//! parallel_phases = ["Update", "Render"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schedule::Phase;

/// Default number of entity slots reserved up front.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// World tunables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Entity slots reserved at creation.
    pub initial_capacity: usize,
    /// Register unseen component types on first attach or query.
    ///
    /// When `false`, every type must be registered explicitly with
    /// [`World::register`](crate::World::register).
    pub lazy_registration: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            lazy_registration: true,
        }
    }
}

/// What arming does when two systems of a parallel phase conflict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Split conflicting systems into separate batches and log a warning.
    #[default]
    Batch,
    /// Fail arming with [`ScheduleError::AccessConflict`](crate::ScheduleError::AccessConflict).
    Reject,
}

/// Scheduler tunables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Worker threads for parallel phases. `0` means one per CPU.
    pub worker_threads: usize,
    /// Handling of access conflicts inside parallel phases.
    pub conflict_policy: ConflictPolicy,
    /// Phases the engine runs with the parallel runner.
    pub parallel_phases: Vec<Phase>,
}

impl SchedulerConfig {
    /// Checks whether `phase` is run in parallel by the engine.
    #[must_use]
    pub fn is_parallel(&self, phase: Phase) -> bool {
        self.parallel_phases.contains(&phase)
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// World tunables.
    pub world: WorldConfig,
    /// Scheduler tunables.
    pub scheduler: SchedulerConfig,
    /// Stop after this many frames even if no system requested exit.
    pub max_frames: Option<u64>,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for unusable values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise see
    /// [`EngineConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Checks values that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.initial_capacity == 0 {
            return Err(ConfigError::Invalid(
                "world.initial_capacity must be greater than zero".into(),
            ));
        }
        if self.max_frames == Some(0) {
            return Err(ConfigError::Invalid("max_frames must be greater than zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.world.initial_capacity, DEFAULT_INITIAL_CAPACITY);
        assert!(config.world.lazy_registration);
        assert_eq!(config.scheduler.conflict_policy, ConflictPolicy::Batch);
    }

    #[test]
    fn test_full_document() {
        let config = EngineConfig::from_toml_str(
            r#"
            max_frames = 10

            [world]
            initial_capacity = 16
            lazy_registration = false

            [scheduler]
            worker_threads = 2
            conflict_policy = "reject"
            parallel_phases = ["Update", "Render"]
            "#,
        )
        .unwrap();

        assert_eq!(config.max_frames, Some(10));
        assert_eq!(config.world.initial_capacity, 16);
        assert!(!config.world.lazy_registration);
        assert_eq!(config.scheduler.worker_threads, 2);
        assert_eq!(config.scheduler.conflict_policy, ConflictPolicy::Reject);
        assert!(config.scheduler.is_parallel(Phase::Update));
        assert!(!config.scheduler.is_parallel(Phase::PreUpdate));
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = EngineConfig::from_toml_str("[world]\ninitial_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = EngineConfig::from_toml_str("[scheduler]\nparallel_phases = [\"Tick\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/nonexistent/overture.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
