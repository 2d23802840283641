// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Invalid tracker configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The slot table needs a power-of-two capacity of at least two.
    #[error("slot capacity must be a power of two and at least 2 (capacity: {0})")]
    InvalidCapacity(usize),
    /// Handles are shifted right before hashing; the shift must leave bits.
    #[error("handle shift must be below 32 (shift: {0})")]
    InvalidHandleShift(u32),
    /// The tracking radius sizes the spatial index cells.
    #[error("tracking radius must be finite and strictly positive (radius: {0})")]
    InvalidRadius(f32),
    /// Default angular tolerance for matching.
    #[error("angular tolerance must be finite and strictly positive (tolerance: {0})")]
    InvalidAngularTolerance(f32),
    /// The configuration text could not be parsed.
    #[error("failed to parse tracker configuration")]
    Parse(#[from] serde_json::Error),
}

/// Failure of a sampler thread.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// The sampler thread panicked; its producer is lost.
    #[error("sampler thread panicked")]
    Panicked,
}
