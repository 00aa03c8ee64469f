//! Utility functions and helpers for the ml4scm-rs library.

pub mod archive;

pub use archive::{load_or_create, load_or_create_keyed, ArchiveKey};
