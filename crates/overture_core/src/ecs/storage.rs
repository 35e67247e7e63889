//! # Component Storage
//!
//! One pool per registered component kind, indexed by entity slot.
//!
//! ```text
//! Pool<Position>:  [ (gen 0, Box<P>) | empty | (gen 3, Box<P>) | ... ]
//!                      entity slot 0   slot 1      slot 2
//! ```
//!
//! - Each occupied slot owns its component through a `Box`, so a component
//!   never lives in the frame that constructed it
//! - Each slot remembers the generation of the entity that owns it; lookups
//!   with a stale handle miss instead of aliasing a recycled slot
//! - Pools are shared behind `parking_lot` locks so that systems running on
//!   different workers can lock different pools independently

use std::any::Any;
use std::sync::Arc;

use parking_lot::{ArcRwLockReadGuard, ArcRwLockWriteGuard, RawRwLock, RwLock};

use super::component::{Component, ComponentInfo};
use super::entity::EntityId;

/// Shared read access to every instance of one component type.
pub type ComponentRead<C> = ArcRwLockReadGuard<RawRwLock, ComponentPool<C>>;

/// Exclusive write access to every instance of one component type.
pub type ComponentWrite<C> = ArcRwLockWriteGuard<RawRwLock, ComponentPool<C>>;

/// An occupied pool slot.
struct Slot<C> {
    generation: u32,
    value: Box<C>,
}

/// Storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust,ignore
/// let mut positions = world.write::<Position>()?;
/// for (entity, position) in positions.iter_mut() {
///     position.x += 1;
/// }
/// ```
pub struct ComponentPool<C: Component> {
    /// Sparse slots, one per entity index.
    slots: Vec<Option<Slot<C>>>,
    /// Number of occupied slots.
    len: usize,
}

impl<C: Component> ComponentPool<C> {
    /// Creates a pool with `slots` empty slots.
    #[must_use]
    pub fn with_slots(slots: usize) -> Self {
        let mut pool = Self {
            slots: Vec::new(),
            len: 0,
        };
        pool.reserve_slots(slots);
        pool
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the pool holds no components.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, occupied or not.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Grows the pool to at least `slots` empty slots.
    pub fn reserve_slots(&mut self, slots: usize) {
        if slots > self.slots.len() {
            self.slots.resize_with(slots, || None);
        }
    }

    /// Stores a component for `entity`, adopting the box without copying.
    ///
    /// Returns the component previously stored for the same entity. A value
    /// left behind by a destroyed entity in the same slot is dropped.
    pub fn insert(&mut self, entity: EntityId, value: Box<C>) -> Option<Box<C>> {
        let index = entity.index() as usize;
        self.reserve_slots(index + 1);

        let previous = self.slots[index].replace(Slot {
            generation: entity.generation(),
            value,
        });

        match previous {
            Some(slot) if slot.generation == entity.generation() => Some(slot.value),
            Some(_) => None,
            None => {
                self.len += 1;
                None
            }
        }
    }

    /// Gets the component of `entity`.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&C> {
        match self.slots.get(entity.index() as usize)? {
            Some(slot) if slot.generation == entity.generation() => Some(&slot.value),
            _ => None,
        }
    }

    /// Gets the component of `entity` mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut C> {
        match self.slots.get_mut(entity.index() as usize)? {
            Some(slot) if slot.generation == entity.generation() => Some(&mut slot.value),
            _ => None,
        }
    }

    /// Checks whether `entity` has a stored component.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.get(entity).is_some()
    }

    /// Removes and returns the component of `entity`.
    ///
    /// Nothing is removed if the slot belongs to a different generation.
    pub fn remove(&mut self, entity: EntityId) -> Option<Box<C>> {
        let slot = self.slots.get_mut(entity.index() as usize)?;
        if slot.as_ref()?.generation != entity.generation() {
            return None;
        }
        self.len -= 1;
        slot.take().map(|slot| slot.value)
    }

    /// Iterates over stored components in entity index order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let slot = slot.as_ref()?;
            let id = EntityId::new(u32::try_from(index).ok()?, slot.generation);
            Some((id, &*slot.value))
        })
    }

    /// Iterates mutably over stored components in entity index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let slot = slot.as_mut()?;
            let id = EntityId::new(u32::try_from(index).ok()?, slot.generation);
            Some((id, &mut *slot.value))
        })
    }
}

/// Type-erased operations the world needs on every pool.
pub(crate) trait ErasedPool: Send + Sync {
    /// Drops the component of `entity`, if any.
    fn remove(&self, entity: EntityId) -> bool;

    /// Copies a raw payload into the slot of `entity`.
    ///
    /// On a size mismatch nothing is stored and the registered size is
    /// returned as the error.
    fn insert_bytes(&self, entity: EntityId, bytes: &[u8]) -> Result<(), usize>;

    /// Copies the component of `entity` out as raw bytes.
    fn read_bytes(&self, entity: EntityId) -> Option<Vec<u8>>;
}

impl<C: Component> ErasedPool for RwLock<ComponentPool<C>> {
    fn remove(&self, entity: EntityId) -> bool {
        self.write().remove(entity).is_some()
    }

    fn insert_bytes(&self, entity: EntityId, bytes: &[u8]) -> Result<(), usize> {
        let value: C = bytemuck::try_pod_read_unaligned(bytes)
            .map_err(|_| std::mem::size_of::<C>())?;
        self.write().insert(entity, Box::new(value));
        Ok(())
    }

    fn read_bytes(&self, entity: EntityId) -> Option<Vec<u8>> {
        self.read()
            .get(entity)
            .map(|value| bytemuck::bytes_of(value).to_vec())
    }
}

/// A registered kind together with its pool.
///
/// The same pool is reachable twice: typed, for generic access, and erased,
/// for operations driven by a kind id.
#[derive(Clone)]
pub(crate) struct Column {
    pub(crate) info: ComponentInfo,
    typed: Arc<dyn Any + Send + Sync>,
    erased: Arc<dyn ErasedPool>,
}

impl Column {
    /// Creates the column for `C` with `slots` empty slots.
    pub(crate) fn new<C: Component>(info: ComponentInfo, slots: usize) -> Self {
        let pool = Arc::new(RwLock::new(ComponentPool::<C>::with_slots(slots)));
        Self {
            info,
            typed: Arc::clone(&pool) as Arc<dyn Any + Send + Sync>,
            erased: pool,
        }
    }

    /// Returns the typed pool, or `None` if `C` is not this column's type.
    pub(crate) fn typed<C: Component>(&self) -> Option<Arc<RwLock<ComponentPool<C>>>> {
        Arc::clone(&self.typed).downcast().ok()
    }

    pub(crate) fn erased(&self) -> &dyn ErasedPool {
        &*self.erased
    }
}
