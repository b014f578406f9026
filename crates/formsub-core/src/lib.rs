//! Core types and trait definitions for the formsub submission store.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the value normalizer, the submission record, the store abstraction (plus
//! an in-memory backend) and the service that ties them together.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod memory;
pub mod service;
pub mod store;
pub mod submission;
pub mod value;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use service::SubmissionService;
pub use store::SubmissionStore;
pub use submission::Submission;
pub use value::{FormData, NormalizedValue, Normalizer};
