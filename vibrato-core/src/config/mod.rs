//! Configuration types
//!
//! Board-agnostic machine configuration, loaded from TOML text.

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;
