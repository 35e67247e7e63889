//! Declared component access of a system.
//!
//! Two systems conflict when either writes a component the other reads or
//! writes. The scheduler never runs conflicting systems in the same parallel
//! batch.

use std::any::TypeId;

use crate::ecs::Component;

/// Component name reported for conflicts with an exclusive system.
pub const WORLD_ACCESS: &str = "World";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    type_id: TypeId,
    name: &'static str,
}

impl Entry {
    fn of<C: Component>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: C::type_name(),
        }
    }
}

/// Read and write sets of a system.
///
/// The default access is empty: the system touches no components and never
/// conflicts with anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Access {
    reads: Vec<Entry>,
    writes: Vec<Entry>,
    exclusive: bool,
}

impl Access {
    /// Creates an empty access set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares shared access to `C`.
    #[must_use]
    pub fn read<C: Component>(mut self) -> Self {
        let entry = Entry::of::<C>();
        if !self.writes.contains(&entry) && !self.reads.contains(&entry) {
            self.reads.push(entry);
        }
        self
    }

    /// Declares exclusive access to `C`. Supersedes a read of `C`.
    #[must_use]
    pub fn write<C: Component>(mut self) -> Self {
        let entry = Entry::of::<C>();
        self.reads.retain(|e| *e != entry);
        if !self.writes.contains(&entry) {
            self.writes.push(entry);
        }
        self
    }

    /// Declares access to the whole world, conflicting with every system.
    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Checks whether this access covers the whole world.
    #[must_use]
    pub const fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Names of components read.
    pub fn reads(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.reads.iter().map(|e| e.name)
    }

    /// Names of components written.
    pub fn writes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.writes.iter().map(|e| e.name)
    }

    /// Returns the first component both sets contend on, if any.
    ///
    /// Shared reads never conflict.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> Option<&'static str> {
        if self.exclusive || other.exclusive {
            return Some(WORLD_ACCESS);
        }
        let contended = |writes: &[Entry], touched: &[Entry]| {
            writes
                .iter()
                .find(|w| touched.iter().any(|t| t.type_id == w.type_id))
                .map(|w| w.name)
        };
        contended(&self.writes, &other.writes)
            .or_else(|| contended(&self.writes, &other.reads))
            .or_else(|| contended(&other.writes, &self.reads))
    }
}
