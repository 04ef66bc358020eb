//! In-process implementations of the collaborator ports.

mod clock;
mod memory;

pub use clock::*;
pub use memory::*;
