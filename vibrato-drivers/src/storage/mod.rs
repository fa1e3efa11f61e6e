//! Plan storage implementations

pub mod memory;

pub use memory::MemoryPlanStore;
