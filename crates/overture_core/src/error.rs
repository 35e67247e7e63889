//! # Core Error Types
//!
//! All errors that can be reported by the entity store, the scheduler and the
//! configuration loader.
//!
//! Store errors are recoverable: the failing operation is a no-op, the
//! condition is logged through `tracing` at the call site and the error is
//! returned to the caller. Allocation failure is not represented here; the
//! global allocator aborts the process, which is the only safe outcome when a
//! registration resize cannot complete.

use thiserror::Error;

use crate::ecs::{ComponentKind, EntityId};
use crate::schedule::Phase;

/// Coarse classification of store errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The entity or component being addressed does not exist.
    NotFound,
    /// The caller misused a handle or an API (stale handle, double detach).
    Usage,
}

/// Errors that can occur in entity store, registry and query operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The handle was never issued by this world.
    #[error("entity {0} does not exist")]
    EntityNotFound(EntityId),

    /// The handle refers to an entity that has been destroyed.
    #[error("entity {0} has been destroyed")]
    StaleEntity(EntityId),

    /// The entity is alive but does not carry the component.
    #[error("entity {entity} has no {component} component")]
    ComponentNotFound {
        /// The entity that was queried.
        entity: EntityId,
        /// Type name of the missing component.
        component: &'static str,
    },

    /// Detach was requested for a component that is not attached.
    #[error("cannot detach {component} from entity {entity}: not attached")]
    ComponentNotAttached {
        /// The entity the component was removed from.
        entity: EntityId,
        /// Type name of the component.
        component: &'static str,
    },

    /// The component type has not been registered and lazy registration is off.
    #[error("component {0} is not registered")]
    UnregisteredComponent(&'static str),

    /// A raw component kind id does not name a registered kind.
    #[error("unknown component kind {0}")]
    UnknownKind(ComponentKind),

    /// A raw payload does not have the registered size of its kind.
    #[error("payload for {component} is {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// Type name of the component.
        component: &'static str,
        /// Registered size in bytes.
        expected: usize,
        /// Size of the supplied payload.
        actual: usize,
    },
}

impl EcsError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::EntityNotFound(_)
            | Self::ComponentNotFound { .. }
            | Self::UnregisteredComponent(_)
            | Self::UnknownKind(_) => ErrorCategory::NotFound,
            Self::StaleEntity(_)
            | Self::ComponentNotAttached { .. }
            | Self::SizeMismatch { .. } => ErrorCategory::Usage,
        }
    }
}

/// Result type for store operations.
pub type EcsResult<T> = Result<T, EcsError>;

/// Errors raised while registering, arming or running systems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Systems can only be registered before the scheduler is armed.
    #[error("scheduler is already armed; register systems before arming")]
    AlreadyArmed,

    /// A phase was run before the scheduler was armed.
    #[error("scheduler is not armed")]
    NotArmed,

    /// Two systems of a parallel phase touch the same component.
    #[error("systems `{first}` and `{second}` conflict on {component} in phase {phase}")]
    AccessConflict {
        /// Phase both systems are registered in.
        phase: Phase,
        /// Name of the earlier registered system.
        first: String,
        /// Name of the later registered system.
        second: String,
        /// Type name of the contested component.
        component: &'static str,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Result type for scheduler operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for the expected schema.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// The configuration parsed but contains an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let id = EntityId::new(3, 1);
        assert_eq!(EcsError::EntityNotFound(id).category(), ErrorCategory::NotFound);
        assert_eq!(EcsError::StaleEntity(id).category(), ErrorCategory::Usage);
        assert_eq!(
            EcsError::ComponentNotAttached { entity: id, component: "Position" }.category(),
            ErrorCategory::Usage
        );
    }

    #[test]
    fn test_error_messages() {
        let err = EcsError::SizeMismatch { component: "Velocity", expected: 8, actual: 4 };
        assert_eq!(err.to_string(), "payload for Velocity is 4 bytes, expected 8");
    }
}
