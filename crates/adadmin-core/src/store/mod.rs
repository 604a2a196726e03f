// # Store Implementations
//
// This module provides implementations of the Store trait for
// different backing media.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
