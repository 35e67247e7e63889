//! # Component System
//!
//! Components are pure data containers with no behavior.
//! They must be plain old data so the store can copy them byte for byte.

use std::any::TypeId;
use std::fmt;
use std::num::NonZeroU32;

use bytemuck::Pod;

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Pod`: Plain old data, fixed layout, bitwise copyable
/// - `Send + Sync`: Systems may read them from worker threads
///
/// The layout is fixed once the type is registered with a world; the
/// registered size is what raw byte payloads are checked against.
///
/// # Example
///
/// ```rust
/// use bytemuck::{Pod, Zeroable};
/// use overture_core::Component;
///
/// #[derive(Clone, Copy, Default, Pod, Zeroable)]
/// #[repr(C)]
/// struct Health {
///     current: i32,
///     max: i32,
/// }
///
/// impl Component for Health {}
/// ```
pub trait Component: Pod + Send + Sync {
    /// Human-readable name used in diagnostics.
    #[must_use]
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Stable identity of a registered component type.
///
/// Kinds are 1-based: `0` is reserved for "unregistered" and can never be
/// constructed. Bit `kind - 1` of a [`Signature`](super::Signature)
/// represents the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ComponentKind(NonZeroU32);

impl ComponentKind {
    /// Creates a kind from a raw 1-based id. Returns `None` for `0`.
    #[inline]
    #[must_use]
    pub const fn from_raw(id: u32) -> Option<Self> {
        match NonZeroU32::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Returns the raw 1-based id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0.get()
    }

    /// Returns the 0-based bit / column index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Layout and identity recorded for a kind at registration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentInfo {
    /// The assigned kind.
    pub kind: ComponentKind,
    /// Rust type identity.
    pub type_id: TypeId,
    /// Type name, for diagnostics.
    pub name: &'static str,
    /// Size of one instance in bytes.
    pub size: usize,
    /// Alignment requirement.
    pub align: usize,
}

impl ComponentInfo {
    /// Describes `C` under the given kind.
    #[must_use]
    pub fn of<C: Component>(kind: ComponentKind) -> Self {
        Self {
            kind,
            type_id: TypeId::of::<C>(),
            name: C::type_name(),
            size: std::mem::size_of::<C>(),
            align: std::mem::align_of::<C>(),
        }
    }
}
