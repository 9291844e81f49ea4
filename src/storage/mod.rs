mod memory;

pub use memory::KeyedStore;
