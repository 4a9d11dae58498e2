//! Shared pattern utilities: error normalization and build fingerprinting.

pub mod fingerprint;
pub mod normalize;

pub use fingerprint::{fingerprint, key_dependencies};
pub use normalize::normalize_error;
