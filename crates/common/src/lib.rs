//! Shared vocabulary types used across all parley crates.

pub mod types;

pub use types::InboundMessage;
