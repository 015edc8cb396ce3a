/// Use mimalloc as the global allocator for both binaries.
/// Deduplicating tens of millions of short words means constant small
/// allocations; mimalloc's thread-local caching is 2-3x faster than glibc
/// malloc for that pattern.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod buffer;
pub mod chunk;
pub mod common;
pub mod engine;
pub mod error;
pub mod trie;
pub mod words;
pub mod worker;
