//! # Escape Rules
//!
//! The data crate of the escape-room game: the theme catalog (rooms, puzzles,
//! interactables), session records, difficulty mechanics and the offline
//! solvability check. It holds no engine logic.

pub mod mechanics;
pub mod naming;
pub mod session;
pub mod solvability;
pub mod world;

pub use mechanics::*;
pub use naming::*;
pub use session::*;
pub use solvability::*;
pub use world::*;
