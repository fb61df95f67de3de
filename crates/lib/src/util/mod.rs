//! Shared utilities.
//!
//! Currently only cross-platform helpers for tests that spawn real processes.

#[cfg(test)]
pub mod testutil;
