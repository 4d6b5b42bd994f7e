use std::fmt::Display;

/// Errors produced when acquiring raw storage.
///
/// Element operations (`Clone`, `Default`, closures handed to `resize_with`)
/// are the caller's code and fail by panicking; everything the crate itself
/// can fail at is an allocation, and allocations fail with a value of this
/// type instead of aborting or panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The system allocator could not provide a block for this many elements.
    AllocFailed { capacity: usize },
    /// The requested capacity does not fit in a single allocation.
    CapacityOverflow { capacity: usize },
    /// Zero-sized element types have no meaningful raw storage.
    ZeroSizedElement,
}

impl Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::AllocFailed { capacity } => {
                write!(f, "Allocator refused a block for {} elements", capacity)
            }
            StorageError::CapacityOverflow { capacity } => {
                write!(f, "Capacity of {} elements exceeds the maximum allocation size", capacity)
            }
            StorageError::ZeroSizedElement => {
                Display::fmt("Zero-sized element types cannot be stored", f)
            }
        }
    }
}

impl std::error::Error for StorageError {}

#[cfg(test)]
mod error {
    use super::StorageError;

    #[test]
    fn messages_carry_the_requested_capacity() {
        let message = format!("{}", StorageError::AllocFailed { capacity: 12 });
        assert!(message.contains("12"), "{}", message);
        let message = format!("{}", StorageError::CapacityOverflow { capacity: 7 });
        assert!(message.contains("7"), "{}", message);
    }
}
