//! Shared types and models for the point-of-sale backend
//!
//! This crate contains types shared between the backend, the checkout
//! screen (via WASM), and other components of the system. It performs no I/O.

pub mod billing;
pub mod format;
pub mod models;
pub mod types;
pub mod validation;

pub use billing::*;
pub use models::*;
pub use types::*;
pub use validation::*;
