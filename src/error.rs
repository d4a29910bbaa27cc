//
// Copyright (c) 2025 Nathan Fiedler
//

use thiserror::Error;

/// Errors raised by the fallible operations of [`DynamicArray`](crate::DynamicArray).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArrayError {
    /// Requested an initial capacity that can never be allocated.
    #[error("illegal capacity: {capacity}")]
    InvalidArgument { capacity: usize },
    /// Positional access outside of `0..=len`.
    #[error("index (is {index}) should be <= len (is {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// Growth would exceed the maximum feasible allocation.
    #[error("required array length {required} is too large")]
    CapacityOverflow { required: usize },
}
