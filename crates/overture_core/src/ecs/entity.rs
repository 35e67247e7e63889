//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into the slot table and the component pools
//! - A generation counter for safe reuse
//!
//! The [`EntityStore`] owns the slot table: liveness, generations, each
//! entity's signature and the insertion order used for deterministic
//! iteration. Component payloads live in the pools, see
//! [`storage`](super::storage).

use std::fmt;

use super::component::ComponentKind;
use super::signature::Signature;
use crate::error::{EcsError, EcsResult};

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into the slot table
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-1)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the packed 64-bit representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}

/// One row of the slot table.
#[derive(Clone, Debug)]
struct EntitySlot {
    /// Generation of the current (or last) occupant.
    generation: u32,
    /// Whether this slot is currently alive.
    alive: bool,
    /// Component kinds attached to the occupant.
    signature: Signature,
}

/// Slot table for all entities of a world.
///
/// This store guarantees:
/// - Every live signature is as wide as the current kind count
/// - Handles of destroyed entities never resolve again
/// - [`EntityStore::iter`] yields live entities in creation order
#[derive(Debug, Default)]
pub struct EntityStore {
    /// All entity slots, dead ones included.
    slots: Vec<EntitySlot>,
    /// Free list of entity indices for reuse.
    free_indices: Vec<u32>,
    /// Live entities in creation order.
    order: Vec<EntityId>,
    /// Current signature width in bytes.
    width: usize,
}

impl EntityStore {
    /// Creates an empty store with room for `capacity` entities.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_indices: Vec::new(),
            order: Vec::with_capacity(capacity),
            width: 0,
        }
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Checks whether no entity is alive.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the number of slots ever allocated.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the current signature width in bytes.
    #[inline]
    #[must_use]
    pub const fn signature_width(&self) -> usize {
        self.width
    }

    /// Creates an empty entity with a zero signature of the current width.
    ///
    /// Reuses a freed slot when one is available, bumping its generation so
    /// old handles to that slot go stale.
    pub fn create(&mut self) -> EntityId {
        let id = if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.alive = true;
            slot.signature = Signature::zero(self.width);
            EntityId::new(index, slot.generation)
        } else {
            let index = u32::try_from(self.slots.len())
                .ok()
                .filter(|index| *index != u32::MAX)
                .unwrap_or_else(|| panic!("entity index space exhausted"));
            self.slots.push(EntitySlot {
                generation: 0,
                alive: true,
                signature: Signature::zero(self.width),
            });
            EntityId::new(index, 0)
        };

        self.order.push(id);
        id
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.resolve(id).is_ok()
    }

    /// Validates a handle.
    ///
    /// # Errors
    ///
    /// - [`EcsError::EntityNotFound`] if the handle was never issued
    /// - [`EcsError::StaleEntity`] if the entity has been destroyed
    pub fn validate(&self, id: EntityId) -> EcsResult<()> {
        self.resolve(id).map(|_| ())
    }

    /// Returns the signature of a live entity.
    ///
    /// # Errors
    ///
    /// See [`EntityStore::validate`].
    pub fn signature(&self, id: EntityId) -> EcsResult<&Signature> {
        self.resolve(id).map(|slot| &slot.signature)
    }

    /// Sets the bit for `kind` on a live entity.
    ///
    /// # Errors
    ///
    /// See [`EntityStore::validate`].
    pub fn set_kind(&mut self, id: EntityId, kind: ComponentKind) -> EcsResult<()> {
        self.resolve_mut(id)?.signature.set(kind);
        Ok(())
    }

    /// Clears the bit for `kind` on a live entity.
    ///
    /// Returns whether the bit was set before.
    ///
    /// # Errors
    ///
    /// See [`EntityStore::validate`].
    pub fn clear_kind(&mut self, id: EntityId, kind: ComponentKind) -> EcsResult<bool> {
        let slot = self.resolve_mut(id)?;
        let was_set = slot.signature.contains(kind);
        slot.signature.clear(kind);
        Ok(was_set)
    }

    /// Destroys an entity, returning the signature it had.
    ///
    /// The slot goes onto the free list; the caller releases the components
    /// named by the returned signature.
    ///
    /// # Errors
    ///
    /// See [`EntityStore::validate`].
    pub fn destroy(&mut self, id: EntityId) -> EcsResult<Signature> {
        let width = self.width;
        let slot = self.resolve_mut(id)?;
        slot.alive = false;
        let signature = std::mem::replace(&mut slot.signature, Signature::zero(width));

        self.free_indices.push(id.index());
        // Creation order is kept, so removal is a linear search.
        if let Some(position) = self.order.iter().position(|e| *e == id) {
            self.order.remove(position);
        }
        Ok(signature)
    }

    /// Zero-extends every signature to `width` bytes.
    ///
    /// Called while the registry is locked, whenever a new kind is registered.
    pub fn resize_signatures(&mut self, width: usize) {
        if width <= self.width {
            return;
        }
        self.width = width;
        for slot in &mut self.slots {
            slot.signature.resize(width);
        }
    }

    /// Iterates over live entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.order.iter().copied()
    }

    /// Iterates over live entities with their signatures, in creation order.
    pub fn iter_signatures(&self) -> impl Iterator<Item = (EntityId, &Signature)> + '_ {
        self.order
            .iter()
            .map(move |id| (*id, &self.slots[id.index() as usize].signature))
    }

    fn resolve(&self, id: EntityId) -> EcsResult<&EntitySlot> {
        let slot = self
            .slots
            .get(id.index() as usize)
            .filter(|_| !id.is_null())
            .ok_or(EcsError::EntityNotFound(id))?;
        if slot.alive && slot.generation == id.generation() {
            Ok(slot)
        } else if id.generation() <= slot.generation {
            Err(EcsError::StaleEntity(id))
        } else {
            Err(EcsError::EntityNotFound(id))
        }
    }

    fn resolve_mut(&mut self, id: EntityId) -> EcsResult<&mut EntitySlot> {
        self.resolve(id)?;
        Ok(&mut self.slots[id.index() as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(id: u32) -> ComponentKind {
        ComponentKind::from_raw(id).unwrap()
    }

    #[test]
    fn test_entity_id_roundtrip() {
        let id = EntityId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
        assert_eq!(id.to_string(), "12345v67890");
    }

    #[test]
    fn test_create_destroy_reuse() {
        let mut store = EntityStore::with_capacity(4);

        let a = store.create();
        let b = store.create();
        assert_eq!(store.len(), 2);
        assert!(store.is_alive(a));

        store.destroy(a).unwrap();
        assert!(!store.is_alive(a));
        assert_eq!(store.validate(a), Err(EcsError::StaleEntity(a)));

        // Spawn again - should reuse the slot
        let c = store.create();
        assert_eq!(c.index(), a.index());
        assert_ne!(c.generation(), a.generation());
        assert_eq!(store.iter().collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn test_unknown_handles() {
        let store = EntityStore::default();
        let never = EntityId::new(7, 0);
        assert_eq!(store.validate(never), Err(EcsError::EntityNotFound(never)));
        assert_eq!(
            store.validate(EntityId::NULL),
            Err(EcsError::EntityNotFound(EntityId::NULL))
        );
    }

    #[test]
    fn test_signature_bits() {
        let mut store = EntityStore::default();
        store.resize_signatures(1);
        let id = store.create();

        store.set_kind(id, kind(3)).unwrap();
        assert!(store.signature(id).unwrap().contains(kind(3)));

        assert!(store.clear_kind(id, kind(3)).unwrap());
        assert!(!store.clear_kind(id, kind(3)).unwrap());
    }

    #[test]
    fn test_resize_reaches_existing_entities() {
        let mut store = EntityStore::default();
        let early = store.create();
        assert_eq!(store.signature(early).unwrap().width(), 0);

        store.resize_signatures(2);
        assert_eq!(store.signature(early).unwrap().width(), 2);
        assert!(store.signature(early).unwrap().is_empty());

        let late = store.create();
        assert_eq!(store.signature(late).unwrap().width(), 2);
    }

    #[test]
    fn test_destroy_returns_signature() {
        let mut store = EntityStore::default();
        store.resize_signatures(1);
        let id = store.create();
        store.set_kind(id, kind(1)).unwrap();
        store.set_kind(id, kind(2)).unwrap();

        let signature = store.destroy(id).unwrap();
        assert_eq!(signature.kinds().collect::<Vec<_>>(), vec![kind(1), kind(2)]);
        assert_eq!(store.destroy(id), Err(EcsError::StaleEntity(id)));
    }
}
