//! Engine-wide error type.
//!
//! Failures are grouped into the four kinds of spec.md §7: input
//! validation, capacity exhaustion, cooperative abort (surfaced as a
//! result status rather than an error, see [`crate::stats::Status`]), and
//! algorithmic overflow. Refinement and search never panic on a
//! well-formed graph; anything that can go wrong surfaces here.

use thiserror::Error;

/// Errors the engine can report. Never produced mid-refinement on
/// well-formed input — only at construction, validation, or decode time.
#[derive(Debug, Error)]
pub enum Error {
    /// An edge endpoint is outside `0..n`.
    #[error("edge endpoint {vertex} is out of range for a graph with {n} vertices")]
    VertexOutOfRange { vertex: usize, n: usize },

    /// The caller-supplied initial partition is malformed: a position is
    /// duplicated, missing, or `lab` is not a permutation of `0..n`.
    #[error("initial partition is invalid: {reason}")]
    InvalidPartition { reason: String },

    /// A `Permutation::from_array` input was not a bijection on `0..n`.
    #[error("array of length {len} is not a permutation of 0..{len}")]
    NotAPermutation { len: usize },

    /// `n` exceeds the platform's representable range (`n >= 2^30`, spec.md §3).
    #[error("n = {n} exceeds the maximum representable vertex count (2^30)")]
    CapacityExceeded { n: usize },

    /// The runtime lacks big-integer support needed for an exact group
    /// order. Unreachable with `num-bigint` linked in; kept because the
    /// spec requires the variant to exist rather than silently truncating.
    #[error("exact group order requires big-integer support, which this build lacks")]
    NoBigIntSupport,

    /// A graph6/sparse6/digraph6 payload could not be decoded.
    #[error("failed to decode {format} at byte offset {offset}: {message}")]
    Decode { format: &'static str, offset: usize, message: String },

    /// An I/O failure while reading or writing a graph file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;
