//! Host surface handles
//!
//! The drawable target is owned by the host windowing system. The session only
//! keeps a [`SurfaceHandle`]: an opaque identifier plus the last size the host
//! reported. It never owns or dereferences the underlying native object.

use std::fmt;

/// Opaque identifier assigned by the host to a native surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Non-owning reference to a host surface.
///
/// Valid between the host's "surface changed" callback and the matching
/// "surface destroyed" callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHandle {
    id: SurfaceId,
    width: u32,
    height: u32,
}

impl SurfaceHandle {
    /// Create a handle for the host surface `id` at the given size.
    pub fn new(id: SurfaceId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Same native surface, possibly at a different size.
    pub fn same_surface(&self, other: &SurfaceHandle) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{})", self.id, self.width, self.height)
    }
}

/// Surface callbacks as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Surface object exists but has no configured size yet.
    Created,
    /// Surface was created or resized; always follows `Created`.
    Changed(SurfaceHandle),
    /// Surface is gone. Hosts may deliver this more than once.
    Destroyed,
}
