//! Document store adapters.

mod local;
mod memory;

pub use local::{LocalDocStore, LocalStaticLookup};
pub use memory::MemoryDocStore;
