//! # ECS World
//!
//! The single owned context that bundles the component registry, the entity
//! store and the component pools.
//!
//! Every operation takes `&self`: the world is internally synchronized so
//! systems running on different workers can share it.
//!
//! ## Locking
//!
//! - One `RwLock` guards the registry and the entity table
//! - One `RwLock` per component pool
//! - A world operation never holds two of these at once
//!
//! Structural changes (attach, detach, destroy) touch the entity table and a
//! pool one after the other. Pool slots are generation-tagged, so a value left
//! in a pool by an entity that died in between is never visible to the next
//! occupant of the slot.
//!
//! Guards handed out by [`World::read`], [`World::write`], [`World::with`] and
//! [`World::with_mut`] hold a pool lock. While holding one, do not call other
//! world operations on the same component type; use the guard instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::component::{Component, ComponentInfo, ComponentKind};
use super::entity::{EntityId, EntityStore};
use super::query::{self, ComponentSet, Filter, Snapshot};
use super::registry::ComponentRegistry;
use super::signature::Signature;
use super::storage::{Column, ComponentPool, ComponentRead, ComponentWrite};
use crate::config::WorldConfig;
use crate::error::{EcsError, EcsResult};

/// Registry and entity table, guarded together so that registering a kind
/// and widening every signature happen atomically.
struct WorldState {
    registry: ComponentRegistry,
    entities: EntityStore,
}

/// The ECS World - container for all entities and components.
///
/// # Example
///
/// ```rust
/// use bytemuck::{Pod, Zeroable};
/// use overture_core::{Component, World};
///
/// #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
/// #[repr(C)]
/// struct Position {
///     x: i32,
///     y: i32,
/// }
/// impl Component for Position {}
///
/// let world = World::new();
/// let entity = world.create();
/// world.attach(entity, Position { x: 1, y: 2 }).unwrap();
///
/// assert_eq!(world.get::<Position>(entity).unwrap(), Position { x: 1, y: 2 });
/// assert_eq!(world.query::<(Position,)>().unwrap().as_slice(), &[entity]);
/// ```
pub struct World {
    state: RwLock<WorldState>,
    exit_requested: AtomicBool,
    config: WorldConfig,
}

impl World {
    /// Creates a world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a world with the given configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            state: RwLock::new(WorldState {
                registry: ComponentRegistry::new(),
                entities: EntityStore::with_capacity(config.initial_capacity),
            }),
            exit_requested: AtomicBool::new(false),
            config,
        }
    }

    /// Returns the configuration this world was created with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Registers `C`, or returns its existing kind.
    ///
    /// A new kind widens the signature of every existing entity and gives it
    /// an empty slot in the new pool before the lock is released.
    pub fn register<C: Component>(&self) -> ComponentKind {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let (kind, created) = state.registry.register::<C>(state.entities.slot_count());
        if created {
            state.entities.resize_signatures(state.registry.signature_width());
        }
        kind
    }

    /// Returns the kind of `C`, if registered.
    #[must_use]
    pub fn kind_of<C: Component>(&self) -> Option<ComponentKind> {
        self.state.read().registry.kind_of::<C>()
    }

    /// Returns the kind of `C`, registering it if lazy registration is on.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] if `C` is unknown and lazy
    /// registration is disabled.
    pub fn kind_or_register<C: Component>(&self) -> EcsResult<ComponentKind> {
        if let Some(kind) = self.kind_of::<C>() {
            return Ok(kind);
        }
        if self.config.lazy_registration {
            Ok(self.register::<C>())
        } else {
            Err(EcsError::UnregisteredComponent(C::type_name()))
        }
    }

    /// Returns the layout recorded for `kind`.
    #[must_use]
    pub fn component_info(&self, kind: ComponentKind) -> Option<ComponentInfo> {
        self.state.read().registry.info(kind).copied()
    }

    /// Number of registered component kinds.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.state.read().registry.len()
    }

    /// Current signature width in bytes.
    #[must_use]
    pub fn signature_width(&self) -> usize {
        self.state.read().registry.signature_width()
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity with no components.
    pub fn create(&self) -> EntityId {
        let id = self.state.write().entities.create();
        tracing::trace!(entity = %id, "created entity");
        id
    }

    /// Destroys an entity and drops every component attached to it.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] or [`EcsError::EntityNotFound`] if the
    /// handle does not name a live entity. Nothing changes in that case.
    pub fn destroy(&self, id: EntityId) -> EcsResult<()> {
        logged("destroy", || {
            let columns: Vec<Column> = {
                let mut guard = self.state.write();
                let state = &mut *guard;
                let signature = state.entities.destroy(id)?;
                signature
                    .kinds()
                    .filter_map(|kind| state.registry.column(kind).cloned())
                    .collect()
            };
            for column in &columns {
                column.erased().remove(id);
            }
            tracing::trace!(entity = %id, components = columns.len(), "destroyed entity");
            Ok(())
        })
    }

    /// Checks whether `id` names a live entity.
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.state.read().entities.is_alive(id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().entities.len()
    }

    /// Checks whether no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().entities.is_empty()
    }

    /// All live entities in creation order.
    #[must_use]
    pub fn entities(&self) -> Snapshot {
        query::scan(&self.state.read().entities, &Signature::zero(0), None)
    }

    /// Returns a copy of the signature of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] or [`EcsError::EntityNotFound`] for
    /// handles that do not name a live entity.
    pub fn signature(&self, id: EntityId) -> EcsResult<Signature> {
        logged("signature", || self.state.read().entities.signature(id).cloned())
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches a copy of `value` to `id`, replacing any previous `C`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] / [`EcsError::EntityNotFound`] for a bad handle
    /// - [`EcsError::UnregisteredComponent`] if `C` is unknown and lazy
    ///   registration is disabled
    pub fn attach<C: Component>(&self, id: EntityId, value: C) -> EcsResult<()> {
        self.attach_boxed(id, Box::new(value))
    }

    /// Attaches `value` to `id`, adopting the allocation instead of copying.
    ///
    /// The stored component lives at the address of the adopted box.
    ///
    /// # Errors
    ///
    /// See [`World::attach`].
    pub fn attach_boxed<C: Component>(&self, id: EntityId, value: Box<C>) -> EcsResult<()> {
        logged("attach", || {
            // A bad handle must not register the kind.
            self.state.read().entities.validate(id)?;
            let kind = self.kind_or_register::<C>()?;
            let pool = {
                let state = self.state.read();
                state.entities.validate(id)?;
                typed_pool::<C>(&state.registry, kind)?
            };
            pool.write().insert(id, value);

            let marked = self.state.write().entities.set_kind(id, kind);
            if marked.is_err() {
                // Destroyed between insert and mark.
                pool.write().remove(id);
            }
            marked
        })
    }

    /// Attaches a component from its raw bytes.
    ///
    /// `bytes` must be exactly the registered size of `kind`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::UnknownKind`] if `kind` is not registered
    /// - [`EcsError::SizeMismatch`] if `bytes` has the wrong length
    /// - [`EcsError::StaleEntity`] / [`EcsError::EntityNotFound`] for a bad handle
    pub fn attach_bytes(&self, id: EntityId, kind: ComponentKind, bytes: &[u8]) -> EcsResult<()> {
        logged("attach_bytes", || {
            let column = {
                let state = self.state.read();
                state.entities.validate(id)?;
                state.registry.column(kind).cloned().ok_or(EcsError::UnknownKind(kind))?
            };
            column
                .erased()
                .insert_bytes(id, bytes)
                .map_err(|expected| EcsError::SizeMismatch {
                    component: column.info.name,
                    expected,
                    actual: bytes.len(),
                })?;

            let marked = self.state.write().entities.set_kind(id, kind);
            if marked.is_err() {
                column.erased().remove(id);
            }
            marked
        })
    }

    /// Returns a copy of the `C` attached to `id`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::ComponentNotFound`] if `id` has no `C`
    /// - [`EcsError::StaleEntity`] / [`EcsError::EntityNotFound`] for a bad handle
    pub fn get<C: Component>(&self, id: EntityId) -> EcsResult<C> {
        self.with(id, |value: &C| *value)
    }

    /// Returns the raw bytes of the component of `kind` attached to `id`.
    ///
    /// # Errors
    ///
    /// See [`World::get`]; additionally [`EcsError::UnknownKind`].
    pub fn get_bytes(&self, id: EntityId, kind: ComponentKind) -> EcsResult<Vec<u8>> {
        logged("get_bytes", || {
            let column = {
                let state = self.state.read();
                let column = state.registry.column(kind).cloned().ok_or(EcsError::UnknownKind(kind))?;
                if !state.entities.signature(id)?.contains(kind) {
                    return Err(EcsError::ComponentNotFound { entity: id, component: column.info.name });
                }
                column
            };
            column
                .erased()
                .read_bytes(id)
                .ok_or(EcsError::ComponentNotFound { entity: id, component: column.info.name })
        })
    }

    /// Checks whether `id` is alive and has a `C`.
    #[must_use]
    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        let state = self.state.read();
        state
            .registry
            .kind_of::<C>()
            .zip(state.entities.signature(id).ok())
            .is_some_and(|(kind, signature)| signature.contains(kind))
    }

    /// Calls `f` with a reference to the `C` attached to `id`.
    ///
    /// # Errors
    ///
    /// See [`World::get`].
    pub fn with<C: Component, R>(&self, id: EntityId, f: impl FnOnce(&C) -> R) -> EcsResult<R> {
        logged("get", || {
            let pool = self.attached_pool::<C>(id)?;
            let guard = pool.read();
            let value = guard.get(id).ok_or(EcsError::ComponentNotFound {
                entity: id,
                component: C::type_name(),
            })?;
            Ok(f(value))
        })
    }

    /// Calls `f` with a mutable reference to the `C` attached to `id`.
    ///
    /// # Errors
    ///
    /// See [`World::get`].
    pub fn with_mut<C: Component, R>(&self, id: EntityId, f: impl FnOnce(&mut C) -> R) -> EcsResult<R> {
        logged("get_mut", || {
            let pool = self.attached_pool::<C>(id)?;
            let mut guard = pool.write();
            let value = guard.get_mut(id).ok_or(EcsError::ComponentNotFound {
                entity: id,
                component: C::type_name(),
            })?;
            Ok(f(value))
        })
    }

    /// Detaches the `C` of `id` and returns it.
    ///
    /// # Errors
    ///
    /// - [`EcsError::ComponentNotAttached`] if `id` has no `C` (double detach)
    /// - [`EcsError::StaleEntity`] / [`EcsError::EntityNotFound`] for a bad handle
    pub fn detach<C: Component>(&self, id: EntityId) -> EcsResult<C> {
        logged("detach", || {
            let not_attached = EcsError::ComponentNotAttached {
                entity: id,
                component: C::type_name(),
            };
            let pool = {
                let mut guard = self.state.write();
                let state = &mut *guard;
                state.entities.validate(id)?;
                let kind = state.registry.kind_of::<C>().ok_or_else(|| not_attached.clone())?;
                if !state.entities.clear_kind(id, kind)? {
                    return Err(not_attached);
                }
                typed_pool::<C>(&state.registry, kind)?
            };
            let value = pool.write().remove(id).ok_or(not_attached)?;
            Ok(*value)
        })
    }

    /// Detaches the component of `kind` from `id`, dropping it.
    ///
    /// # Errors
    ///
    /// - [`EcsError::UnknownKind`] if `kind` is not registered
    /// - [`EcsError::ComponentNotAttached`] if the bit is already clear
    /// - [`EcsError::StaleEntity`] / [`EcsError::EntityNotFound`] for a bad handle
    pub fn detach_kind(&self, id: EntityId, kind: ComponentKind) -> EcsResult<()> {
        logged("detach", || {
            let column = {
                let mut guard = self.state.write();
                let state = &mut *guard;
                let column = state.registry.column(kind).cloned().ok_or(EcsError::UnknownKind(kind))?;
                if !state.entities.clear_kind(id, kind)? {
                    return Err(EcsError::ComponentNotAttached {
                        entity: id,
                        component: column.info.name,
                    });
                }
                column
            };
            column.erased().remove(id);
            Ok(())
        })
    }

    /// Locks the whole `C` pool for reading.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] if `C` is unknown and lazy
    /// registration is disabled.
    pub fn read<C: Component>(&self) -> EcsResult<ComponentRead<C>> {
        Ok(self.pool::<C>()?.read_arc())
    }

    /// Locks the whole `C` pool for writing.
    ///
    /// The guard allows mutating components in place; attaching and detaching
    /// still go through the world.
    ///
    /// # Errors
    ///
    /// See [`World::read`].
    pub fn write<C: Component>(&self) -> EcsResult<ComponentWrite<C>> {
        Ok(self.pool::<C>()?.write_arc())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Entities whose signature is a superset of `query`, in creation order.
    #[must_use]
    pub fn filter(&self, query: &Signature) -> Snapshot {
        query::scan(&self.state.read().entities, query, None)
    }

    /// Entities that carry every component of `S`.
    ///
    /// Querying a type no entity ever had is not an error: with lazy
    /// registration on it is registered and the result is empty.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] if a type is unknown and
    /// lazy registration is disabled.
    pub fn query<S: ComponentSet>(&self) -> EcsResult<Snapshot> {
        let kinds = logged("query", || S::kinds(self))?;
        Ok(self.filter(&Signature::from_kinds(0, kinds)))
    }

    /// Entities matching a [`Filter`].
    ///
    /// # Errors
    ///
    /// See [`World::query`].
    pub fn run_filter(&self, filter: &Filter) -> EcsResult<Snapshot> {
        let (with, without) = logged("query", || filter.signatures(self))?;
        Ok(query::scan(&self.state.read().entities, &with, Some(&without)))
    }

    // =========================================================================
    // Run control
    // =========================================================================

    /// Asks the engine loop to stop after the current frame.
    pub fn request_exit(&self) {
        self.exit_requested.store(true, Ordering::Release);
    }

    /// Checks whether a system asked the engine loop to stop.
    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.exit_requested.load(Ordering::Acquire)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Pool of `C`, if `id` is alive and its signature has the bit.
    fn attached_pool<C: Component>(&self, id: EntityId) -> EcsResult<Arc<RwLock<ComponentPool<C>>>> {
        let state = self.state.read();
        let signature = state.entities.signature(id)?;
        let not_found = || EcsError::ComponentNotFound {
            entity: id,
            component: C::type_name(),
        };
        let kind = state.registry.kind_of::<C>().ok_or_else(not_found)?;
        if !signature.contains(kind) {
            return Err(not_found());
        }
        typed_pool::<C>(&state.registry, kind)
    }

    fn pool<C: Component>(&self) -> EcsResult<Arc<RwLock<ComponentPool<C>>>> {
        let kind = self.kind_or_register::<C>()?;
        typed_pool::<C>(&self.state.read().registry, kind)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("World")
            .field("entities", &state.entities.len())
            .field("components", &state.registry)
            .field("exit_requested", &self.exit_requested())
            .finish_non_exhaustive()
    }
}

fn typed_pool<C: Component>(
    registry: &ComponentRegistry,
    kind: ComponentKind,
) -> EcsResult<Arc<RwLock<ComponentPool<C>>>> {
    registry
        .column(kind)
        .and_then(Column::typed::<C>)
        .ok_or(EcsError::UnregisteredComponent(C::type_name()))
}

/// Runs a world operation and reports its failure through `tracing`.
fn logged<T>(operation: &'static str, f: impl FnOnce() -> EcsResult<T>) -> EcsResult<T> {
    let result = f();
    if let Err(err) = &result {
        tracing::warn!(operation, category = ?err.category(), error = %err, "world operation failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::{Pod, Zeroable};

    #[allow(dead_code)]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Position {
        x: i32,
        y: i32,
    }
    impl Component for Position {}

    #[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Health(u32);
    impl Component for Health {}

    #[allow(dead_code)]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Tag(u8);
    impl Component for Tag {}

    #[test]
    fn test_world_creation() {
        let world = World::new();
        assert!(world.is_empty());
        assert_eq!(world.component_count(), 0);
        assert_eq!(world.signature_width(), 0);
        assert!(!world.exit_requested());
    }

    #[test]
    fn test_attach_get_detach() {
        let world = World::new();
        let e = world.create();

        world.attach(e, Position { x: 3, y: 4 }).unwrap();
        assert!(world.has::<Position>(e));
        assert_eq!(world.get::<Position>(e).unwrap(), Position { x: 3, y: 4 });

        assert_eq!(world.detach::<Position>(e).unwrap(), Position { x: 3, y: 4 });
        assert!(!world.has::<Position>(e));
        assert_eq!(
            world.get::<Position>(e),
            Err(EcsError::ComponentNotFound { entity: e, component: Position::type_name() })
        );
        assert_eq!(
            world.detach::<Position>(e),
            Err(EcsError::ComponentNotAttached { entity: e, component: Position::type_name() })
        );
    }

    #[test]
    fn test_reattach_replaces() {
        let world = World::new();
        let e = world.create();
        world.attach(e, Health(10)).unwrap();
        world.attach(e, Health(20)).unwrap();

        assert_eq!(world.get::<Health>(e).unwrap(), Health(20));
        assert_eq!(world.read::<Health>().unwrap().len(), 1);
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let world = World::new();
        let e = world.create();
        world.attach(e, Health(1)).unwrap();
        world.destroy(e).unwrap();

        assert!(!world.is_alive(e));
        assert_eq!(world.attach(e, Health(2)), Err(EcsError::StaleEntity(e)));
        assert_eq!(world.get::<Health>(e), Err(EcsError::StaleEntity(e)));
        assert_eq!(world.destroy(e), Err(EcsError::StaleEntity(e)));
        assert!(world.read::<Health>().unwrap().is_empty());

        // The recycled slot starts empty.
        let reused = world.create();
        assert_eq!(reused.index(), e.index());
        assert!(!world.has::<Health>(reused));
    }

    #[test]
    fn test_failed_attach_does_not_register() {
        let world = World::new();
        let e = world.create();
        world.destroy(e).unwrap();

        assert_eq!(world.attach(e, Tag(1)), Err(EcsError::StaleEntity(e)));
        assert_eq!(world.component_count(), 0);
        assert_eq!(world.signature_width(), 0);
        assert_eq!(world.kind_of::<Tag>(), None);

        let unknown = EntityId::new(99, 0);
        assert_eq!(world.attach(unknown, Tag(1)), Err(EcsError::EntityNotFound(unknown)));
        assert_eq!(world.component_count(), 0);
    }

    #[test]
    fn test_registration_resizes_existing_entities() {
        let world = World::new();
        let early: Vec<_> = (0..10).map(|_| world.create()).collect();
        assert_eq!(world.signature(early[0]).unwrap().width(), 0);

        world.register::<Position>();
        world.register::<Health>();
        world.register::<Tag>();
        assert_eq!(world.component_count(), 3);
        assert_eq!(world.signature_width(), 1);

        for e in &early {
            assert_eq!(world.signature(*e).unwrap().width(), 1);
            assert!(!world.has::<Tag>(*e));
        }
        assert!(world.query::<(Tag,)>().unwrap().is_empty());

        world.attach(early[4], Tag(1)).unwrap();
        assert_eq!(world.query::<(Tag,)>().unwrap().as_slice(), &[early[4]]);
    }

    #[test]
    fn test_strict_registration() {
        let world = World::with_config(WorldConfig {
            lazy_registration: false,
            ..WorldConfig::default()
        });
        let e = world.create();

        assert_eq!(
            world.attach(e, Tag(1)),
            Err(EcsError::UnregisteredComponent(Tag::type_name()))
        );
        assert!(world.query::<(Tag,)>().is_err());

        world.register::<Tag>();
        world.attach(e, Tag(1)).unwrap();
        assert_eq!(world.query::<(Tag,)>().unwrap().len(), 1);
    }

    #[test]
    fn test_raw_bytes() {
        let world = World::new();
        let kind = world.register::<Position>();
        let e = world.create();

        let payload = bytemuck::bytes_of(&Position { x: -1, y: 9 }).to_vec();
        world.attach_bytes(e, kind, &payload).unwrap();
        assert_eq!(world.get::<Position>(e).unwrap(), Position { x: -1, y: 9 });
        assert_eq!(world.get_bytes(e, kind).unwrap(), payload);

        assert_eq!(
            world.attach_bytes(e, kind, &[0; 3]),
            Err(EcsError::SizeMismatch { component: Position::type_name(), expected: 8, actual: 3 })
        );

        let unknown = ComponentKind::from_raw(42).unwrap();
        assert_eq!(world.attach_bytes(e, unknown, &payload), Err(EcsError::UnknownKind(unknown)));

        world.detach_kind(e, kind).unwrap();
        assert!(world.get_bytes(e, kind).is_err());
    }

    #[test]
    fn test_destroy_drops_components() {
        let world = World::new();
        let a = world.create();
        let b = world.create();
        world.attach(a, Position::default()).unwrap();
        world.attach(a, Health(5)).unwrap();
        world.attach(b, Health(6)).unwrap();

        world.destroy(a).unwrap();
        assert_eq!(world.read::<Position>().unwrap().len(), 0);
        assert_eq!(world.read::<Health>().unwrap().len(), 1);
        assert_eq!(world.entities().as_slice(), &[b]);
    }

    #[test]
    fn test_write_guard_iteration() {
        let world = World::new();
        let entities: Vec<_> = (0..4).map(|_| world.create()).collect();
        for (i, e) in entities.iter().enumerate() {
            world.attach(*e, Health(u32::try_from(i).unwrap())).unwrap();
        }

        {
            let mut health = world.write::<Health>().unwrap();
            for (_, h) in health.iter_mut() {
                h.0 += 100;
            }
        }
        assert_eq!(world.get::<Health>(entities[3]).unwrap(), Health(103));

        world.with_mut(entities[0], |h: &mut Health| h.0 = 0).unwrap();
        assert_eq!(world.with(entities[0], |h: &Health| h.0).unwrap(), 0);
    }

    #[test]
    fn test_filter_without() {
        let world = World::new();
        let plain = world.create();
        let tagged = world.create();
        world.attach(plain, Position::default()).unwrap();
        world.attach(tagged, Position::default()).unwrap();
        world.attach(tagged, Tag(1)).unwrap();

        let filter = Filter::new().with::<Position>().without::<Tag>();
        assert_eq!(world.run_filter(&filter).unwrap().as_slice(), &[plain]);
        assert_eq!(world.query::<(Position, Tag)>().unwrap().as_slice(), &[tagged]);
    }

    #[test]
    fn test_request_exit() {
        let world = World::new();
        world.request_exit();
        assert!(world.exit_requested());
    }
}
