//! Shared utilities.
//!
//! Common utilities used across the crate including test helpers.

#[cfg(test)]
pub mod testutil;
