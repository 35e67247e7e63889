//! # Component Registry
//!
//! Assigns each component type a [`ComponentKind`] on first use and owns the
//! pool that stores its instances.
//!
//! Kinds are handed out as `1, 2, 3, ...` in registration order and are never
//! unregistered. The number of registered kinds `K` fixes the signature width
//! (`⌈K/8⌉` bytes); the world widens every entity signature in the same
//! critical section that registers a new kind.

use std::any::TypeId;
use std::collections::HashMap;

use super::component::{Component, ComponentInfo, ComponentKind};
use super::signature::width_for;
use super::storage::Column;

/// Registry of component kinds for one world.
#[derive(Default)]
pub struct ComponentRegistry {
    /// Columns indexed by `kind.index()`.
    columns: Vec<Column>,
    /// Type to kind lookup.
    by_type: HashMap<TypeId, ComponentKind>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered kinds.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Checks whether no kind has been registered yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Signature width in bytes for the current kind count.
    #[inline]
    #[must_use]
    pub fn signature_width(&self) -> usize {
        width_for(self.columns.len())
    }

    /// Returns the kind of `C`, if registered.
    #[must_use]
    pub fn kind_of<C: Component>(&self) -> Option<ComponentKind> {
        self.by_type.get(&TypeId::of::<C>()).copied()
    }

    /// Returns the layout recorded for `kind`.
    #[must_use]
    pub fn info(&self, kind: ComponentKind) -> Option<&ComponentInfo> {
        self.columns.get(kind.index()).map(|column| &column.info)
    }

    /// Iterates over every registered kind in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.columns.iter().map(|column| &column.info)
    }

    /// Registers `C`, or returns its existing kind.
    ///
    /// The boolean is `true` when the kind was created by this call. A new
    /// pool starts with `slots` empty slots so every existing entity already
    /// has an (empty) slot for it.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX - 1` kinds are registered.
    pub fn register<C: Component>(&mut self, slots: usize) -> (ComponentKind, bool) {
        if let Some(kind) = self.kind_of::<C>() {
            return (kind, false);
        }

        let kind = u32::try_from(self.columns.len() + 1)
            .ok()
            .and_then(ComponentKind::from_raw)
            .unwrap_or_else(|| panic!("component kind space exhausted"));

        let info = ComponentInfo::of::<C>(kind);
        self.columns.push(Column::new::<C>(info, slots));
        self.by_type.insert(info.type_id, kind);

        tracing::debug!(kind = kind.id(), component = info.name, size = info.size, "registered component");
        (kind, true)
    }

    pub(crate) fn column(&self, kind: ComponentKind) -> Option<&Column> {
        self.columns.get(kind.index())
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
