//! System abstractions.
//!
//! A system is a unit of logic registered into a [`Phase`](super::Phase).
//! It receives the shared [`World`] and declares the components it touches
//! so the scheduler can keep conflicting systems out of the same parallel
//! batch.

use std::fmt;

use super::access::Access;
use crate::ecs::{Component, World};

/// A unit of executable logic operating on the world.
///
/// Systems must be `Send + Sync` so a parallel phase can run them on worker
/// threads. A panic inside [`System::run`] is not caught by the scheduler.
pub trait System: Send + Sync {
    /// Human-readable name, used in logs and conflict reports.
    fn name(&self) -> &str;

    /// Components this system reads and writes.
    fn access(&self) -> Access;

    /// Executes the system.
    fn run(&self, world: &World);
}

/// A [`System`] backed by a closure.
///
/// # Example
///
/// ```rust,ignore
/// let mover = FnSystem::new("movement", |world: &World| {
///     for entity in world.query::<(Position, Velocity)>().unwrap() {
///         let velocity = world.get::<Velocity>(entity).unwrap();
///         world.with_mut(entity, |p: &mut Position| p.x += velocity.dx).unwrap();
///     }
/// })
/// .writes::<Position>()
/// .reads::<Velocity>();
/// ```
pub struct FnSystem<F>
where
    F: Fn(&World) + Send + Sync + 'static,
{
    name: String,
    access: Access,
    f: F,
}

impl<F> FnSystem<F>
where
    F: Fn(&World) + Send + Sync + 'static,
{
    /// Wraps `f` with an empty access declaration.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            access: Access::new(),
            f,
        }
    }

    /// Declares shared access to `C`.
    #[must_use]
    pub fn reads<C: Component>(mut self) -> Self {
        self.access = self.access.read::<C>();
        self
    }

    /// Declares exclusive access to `C`.
    #[must_use]
    pub fn writes<C: Component>(mut self) -> Self {
        self.access = self.access.write::<C>();
        self
    }

    /// Declares that the system may touch anything.
    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.access = self.access.exclusive();
        self
    }
}

impl<F> System for FnSystem<F>
where
    F: Fn(&World) + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn access(&self) -> Access {
        self.access.clone()
    }

    fn run(&self, world: &World) {
        (self.f)(world);
    }
}

impl<F> fmt::Debug for FnSystem<F>
where
    F: Fn(&World) + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSystem")
            .field("name", &self.name)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}
