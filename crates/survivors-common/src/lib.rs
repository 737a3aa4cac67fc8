//! # Survivors Common
//!
//! Common types shared by the survivors simulation crates:
//! - Geometry (`Vec2`, `Rect`, `normalize`)
//! - Entity IDs used for weak relations between entities
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
}

pub use prelude::*;
