//! # Queries
//!
//! Turns a set of component types into a signature and collects every entity
//! whose signature is a superset of it.
//!
//! Query results are [`Snapshot`]s: the handles that matched at call time,
//! in creation order. Later creates and destroys do not change a snapshot.
//! Handles in a snapshot are generation-checked, so reading through a handle
//! whose entity was destroyed afterwards reports
//! [`StaleEntity`](crate::EcsError::StaleEntity) instead of touching a
//! recycled slot.

use super::component::{Component, ComponentKind};
use super::entity::{EntityId, EntityStore};
use super::signature::Signature;
use super::world::World;
use crate::error::EcsResult;

type KindResolver = fn(&World) -> EcsResult<ComponentKind>;

/// Handles that matched a query at the moment it ran.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    entities: Vec<EntityId>,
}

impl Snapshot {
    /// Number of matched entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Checks whether nothing matched.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Matched handles in creation order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[EntityId] {
        &self.entities
    }

    /// Checks whether `entity` matched.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    /// Iterates over matched handles.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }
}

impl IntoIterator for Snapshot {
    type Item = EntityId;
    type IntoIter = std::vec::IntoIter<EntityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = EntityId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, EntityId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter().copied()
    }
}

/// Scans `store` in creation order.
///
/// An entity matches when its signature is a superset of `with` and shares no
/// bit with `without`.
pub(crate) fn scan(store: &EntityStore, with: &Signature, without: Option<&Signature>) -> Snapshot {
    let entities = store
        .iter_signatures()
        .filter(|(_, signature)| signature.matches(with))
        .filter(|(_, signature)| without.map_or(true, |without| !signature.intersects(without)))
        .map(|(id, _)| id)
        .collect();
    Snapshot { entities }
}

/// A tuple of component types, used to build a query signature.
///
/// Implemented for tuples of one to eight components.
pub trait ComponentSet {
    /// Resolves every type to its kind, registering unseen types if the world
    /// allows lazy registration.
    ///
    /// # Errors
    ///
    /// Returns [`UnregisteredComponent`](crate::EcsError::UnregisteredComponent)
    /// if a type is unknown and lazy registration is disabled.
    fn kinds(world: &World) -> EcsResult<Vec<ComponentKind>>;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn kinds(world: &World) -> EcsResult<Vec<ComponentKind>> {
                Ok(vec![$(world.kind_or_register::<$name>()?),+])
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

/// Query builder with required and excluded component types.
///
/// # Example
///
/// ```rust,ignore
/// let movers = Filter::new()
///     .with::<Position>()
///     .with::<Velocity>()
///     .without::<Frozen>();
/// for entity in world.run_filter(&movers)? {
///     // ...
/// }
/// ```
#[derive(Clone, Default)]
pub struct Filter {
    with: Vec<KindResolver>,
    without: Vec<KindResolver>,
}

impl Filter {
    /// Creates a filter that matches every entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires component `C`.
    #[must_use]
    pub fn with<C: Component>(mut self) -> Self {
        self.with.push(World::kind_or_register::<C>);
        self
    }

    /// Excludes entities carrying component `C`.
    #[must_use]
    pub fn without<C: Component>(mut self) -> Self {
        self.without.push(World::kind_or_register::<C>);
        self
    }

    /// Builds the `(with, without)` signatures against `world`.
    ///
    /// # Errors
    ///
    /// See [`ComponentSet::kinds`].
    pub fn signatures(&self, world: &World) -> EcsResult<(Signature, Signature)> {
        let build = |resolvers: &[KindResolver]| -> EcsResult<Signature> {
            let kinds = resolvers
                .iter()
                .map(|resolve| resolve(world))
                .collect::<EcsResult<Vec<_>>>()?;
            Ok(Signature::from_kinds(0, kinds))
        };
        Ok((build(&self.with)?, build(&self.without)?))
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("with", &self.with.len())
            .field("without", &self.without.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(id: u32) -> ComponentKind {
        ComponentKind::from_raw(id).unwrap()
    }

    #[test]
    fn test_scan_superset_in_creation_order() {
        let mut store = EntityStore::default();
        store.resize_signatures(1);

        let abc = store.create();
        let ab = store.create();
        let a = store.create();
        for k in [1, 2, 3] {
            store.set_kind(abc, kind(k)).unwrap();
        }
        store.set_kind(ab, kind(1)).unwrap();
        store.set_kind(ab, kind(2)).unwrap();
        store.set_kind(a, kind(1)).unwrap();

        let query = Signature::from_kinds(1, [kind(1), kind(2)]);
        let snapshot = scan(&store, &query, None);
        assert_eq!(snapshot.as_slice(), &[abc, ab]);

        let excluded = Signature::from_kinds(1, [kind(3)]);
        let snapshot = scan(&store, &query, Some(&excluded));
        assert_eq!(snapshot.as_slice(), &[ab]);
    }

    #[test]
    fn test_scan_empty_result() {
        let mut store = EntityStore::default();
        store.resize_signatures(1);
        store.create();

        let snapshot = scan(&store, &Signature::from_kinds(1, [kind(4)]), None);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.iter().count(), 0);
    }

    #[test]
    fn test_snapshot_is_detached_from_store() {
        let mut store = EntityStore::default();
        let first = store.create();
        let snapshot = scan(&store, &Signature::zero(0), None);

        store.create();
        store.destroy(first).unwrap();
        assert_eq!(snapshot.as_slice(), &[first]);
    }
}
