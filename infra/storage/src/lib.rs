//! Sandboxed storage over a single directory tree.
//!
//! # Core Features
//!
//! - **Sandbox Security**: paths are relative to the root and checked against the physical,
//!   canonicalized root, so `..` sequences and symlinks cannot escape.
//! - **Atomic Writes**: unique temp write + `fsync` + `rename`, so a crash never leaves a
//!   half-written file behind.
//! - **Discovery**: recursive, sorted file listing filtered by extension.
//! - **Self-Healing**: stale temporary files are purged when the storage is opened.
//!
//! The handle is synchronous; callers on an async runtime should move calls onto a
//! blocking pool.

mod builder;
mod engine;
mod error;
mod maintenance;
mod sandbox;

pub use builder::{NoRoot, StorageBuilder, WithRoot};
pub use engine::{Storage, StorageInner};
pub use error::{StorageError, StorageErrorExt};
