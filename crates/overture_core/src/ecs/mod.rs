//! # Entity Component System
//!
//! Entities are generation-checked handles, components are plain-old-data
//! values stored in one pool per type, and signatures record which kinds each
//! entity carries.
//!
//! ## Design Philosophy
//!
//! - Component kinds are assigned on first use and never reused
//! - Signatures grow with the registry; existing entities are widened in place
//! - Queries return snapshots of handles, never live views
//! - The [`World`] is the only owner of all of it

mod component;
mod entity;
mod query;
mod registry;
mod signature;
mod storage;
mod world;

pub use component::{Component, ComponentInfo, ComponentKind};
pub use entity::{EntityId, EntityStore};
pub use query::{ComponentSet, Filter, Snapshot};
pub use registry::ComponentRegistry;
pub use signature::{width_for, Signature};
pub use storage::{ComponentPool, ComponentRead, ComponentWrite};
pub use world::World;
