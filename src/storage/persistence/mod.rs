//! Persistence backend implementations.

mod filesystem;
mod memory;

pub use filesystem::JsonFileBackend;
pub use memory::MemoryBackend;
