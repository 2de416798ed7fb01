pub mod jsonl;

pub use jsonl::JsonlStore;
