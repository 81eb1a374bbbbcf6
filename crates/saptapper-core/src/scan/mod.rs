//! Signature scanning over ROM images.

pub mod constants;
mod free_space;
mod pattern;
mod signature;

pub use free_space::*;
pub use pattern::*;
pub use signature::*;
