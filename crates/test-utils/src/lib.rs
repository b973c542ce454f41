//! Shared test utilities for the om-viewer workspace.
//!
//! This crate provides:
//! - In-memory reader fakes ([`MockReader`], [`MockOpener`])
//! - Cube generators with predictable values
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod generators;
pub mod mock;

pub use generators::*;
pub use mock::*;
