//! # OVERTURE Core
//!
//! Entity Component System kernel with a phase scheduler:
//! - Growable signatures recording which component kinds an entity has
//! - Component kinds assigned on first use, never reused
//! - Generation-checked entity handles over recycled slots
//! - Snapshot queries with superset matching
//! - Per-phase systems, run in order or as fork-joined parallel batches
//!
//! ## Architecture Rules
//!
//! 1. **One owned world** - no process-wide state; worlds are independent
//! 2. **Plain-old-data components** - every component is `bytemuck::Pod`
//! 3. **Declared access** - systems state what they read and write, and the
//!    scheduler never runs conflicting systems side by side
//!
//! ## Example
//!
//! ```rust
//! use bytemuck::{Pod, Zeroable};
//! use overture_core::{Component, Engine, EngineConfig, FnSystem, Phase, World};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
//! #[repr(C)]
//! struct Position { x: i32, y: i32 }
//! impl Component for Position {}
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
//! #[repr(C)]
//! struct Velocity { dx: i32, dy: i32 }
//! impl Component for Velocity {}
//!
//! let mut engine = Engine::with_config(EngineConfig {
//!     max_frames: Some(1),
//!     ..EngineConfig::default()
//! });
//!
//! let world = engine.world();
//! let e = world.create();
//! world.attach(e, Position { x: 0, y: 0 }).unwrap();
//! world.attach(e, Velocity { dx: 1, dy: 1 }).unwrap();
//!
//! engine
//!     .register(
//!         Phase::Update,
//!         FnSystem::new("movement", |world: &World| {
//!             for entity in world.query::<(Position, Velocity)>().unwrap() {
//!                 let v = world.get::<Velocity>(entity).unwrap();
//!                 world
//!                     .with_mut(entity, |p: &mut Position| {
//!                         p.x += v.dx;
//!                         p.y += v.dy;
//!                     })
//!                     .unwrap();
//!             }
//!         })
//!         .writes::<Position>()
//!         .reads::<Velocity>(),
//!     )
//!     .unwrap();
//!
//! engine.run().unwrap();
//! assert_eq!(engine.world().get::<Position>(e).unwrap(), Position { x: 1, y: 1 });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod schedule;

pub use config::{ConflictPolicy, EngineConfig, SchedulerConfig, WorldConfig};
pub use ecs::{
    Component, ComponentInfo, ComponentKind, ComponentRead, ComponentWrite, EntityId, Filter,
    Signature, Snapshot, World,
};
pub use engine::Engine;
pub use error::{ConfigError, EcsError, EcsResult, ErrorCategory, ScheduleError, ScheduleResult};
pub use schedule::{Access, FnSystem, Phase, Scheduler, System};
