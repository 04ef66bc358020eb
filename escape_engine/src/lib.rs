//! # Escape Engine
//!
//! Runs escape-room sessions over the static world in `escape_rules`:
//! parses player intent, resolves puzzle attempts, moves players between
//! rooms and persists every change through pluggable stores.
//!
//! ## Core Components
//!
//! - **engine**: The [`GameEngine`] facade; one locked read-modify-write per action
//! - **resolution**: Puzzle gating, answer comparison and success effects
//! - **intent**: Free-text command parsing and answer normalization
//! - **options**: Context-aware action suggestions
//! - **hints**: Difficulty-budgeted, rate-limited hints
//! - **ports** / **adapters**: Storage, clock and description seams with in-memory defaults
//! - **describe**: Room description generation with static fallback

pub mod adapters;
pub mod config;
pub mod describe;
pub mod engine;
pub mod error;
pub mod hints;
pub mod intent;
pub mod options;
pub mod ports;
pub mod resolution;

pub use adapters::*;
pub use config::*;
pub use describe::*;
pub use engine::*;
pub use error::*;
pub use hints::*;
pub use intent::*;
pub use options::*;
pub use ports::*;
pub use resolution::*;
