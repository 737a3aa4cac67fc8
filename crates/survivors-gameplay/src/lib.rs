//! # Survivors Gameplay
//!
//! The simulation core of a top-down survival action game.
//!
//! This crate provides:
//! - Combat entities (player and monsters) with sub-step movement
//! - Monster variants: chaser, charger and boss
//! - Weapons with level-based stat tables and firing cadence
//! - Attacks with pierce, immunity windows and optional homing
//! - Collectables (XP and healing) with XP condensation
//! - The level-up menu and the session state machine
//!
//! Rendering, input polling and asset loading are external collaborators;
//! the core only exposes the data they need (see [`render`] and [`input`]).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod attack;
pub mod clock;
pub mod collectable;
pub mod config;
pub mod constants;
pub mod entity;
pub mod events;
pub mod game_state;
pub mod input;
pub mod level_up;
pub mod monster;
pub mod render;
pub mod session;
pub mod spawn;
pub mod weapon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::attack::*;
    pub use crate::clock::*;
    pub use crate::collectable::*;
    pub use crate::config::*;
    pub use crate::entity::*;
    pub use crate::events::*;
    pub use crate::game_state::*;
    pub use crate::input::*;
    pub use crate::level_up::*;
    pub use crate::monster::*;
    pub use crate::render::*;
    pub use crate::session::*;
    pub use crate::spawn::*;
    pub use crate::weapon::*;
}

pub use prelude::*;
