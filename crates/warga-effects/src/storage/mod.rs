//! Storage effect handlers

pub mod memory;

pub use memory::MemoryStorageHandler;
