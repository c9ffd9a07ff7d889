//! Integration tests for opchain crates.
//!
//! End-to-end checks that records flow through normalization, the
//! processors and the renderer into the expected command lines.

#[cfg(test)]
mod properties;
