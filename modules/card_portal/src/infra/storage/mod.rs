pub mod kv;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
