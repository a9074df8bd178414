//! Record layer implementations.

mod memory;

pub use memory::InMemoryVideoRepository;
