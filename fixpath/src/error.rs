// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can occur while building or flattening a path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PathError {
    /// A point lies outside the bounding box the path was created with.
    #[error("point ({0}, {1}) lies outside the path bounding box")]
    OutOfBounds(i32, i32),
    /// A relative move overflowed, or started from a position outside the fixed range.
    #[error("coordinate is outside the representable range")]
    LimitCheck,
    /// A floating point coordinate was NaN.
    #[error("coordinate is not a number")]
    InvalidCoordinate,
    /// A flattening policy cannot be used.
    #[error("invalid sample policy: {0}")]
    InvalidPolicy(&'static str),

    /// The operation needs a current point and there is none.
    #[error("no current point")]
    NoCurrentPoint,
    /// The path handle has already been freed.
    #[error("path has been released")]
    Released,
    /// The storage is not in a state that allows the operation.
    #[error("invalid path state: {0}")]
    InvalidState(&'static str),

    /// Failed to allocate a segment, subpath or copy of shared storage.
    #[error("failed to allocate path storage")]
    Allocation(#[from] TryReserveError),

    /// An internal consistency check failed.
    ///
    /// Valid geometric input never produces this; it indicates a defect in the
    /// geometry pipeline or illegal sharing of local storage.
    #[error("internal path error: {0}")]
    Internal(&'static str),
}

/// Broad classification of a [`PathError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected; the path is unchanged.
    Validation,
    /// The path was not in a state that allows the operation; the path is unchanged.
    State,
    /// Allocation failed; the enclosing drawing operation should be abandoned.
    Resource,
    /// An invariant was violated. Not recoverable.
    Invariant,
}

impl PathError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfBounds(..)
            | Self::LimitCheck
            | Self::InvalidCoordinate
            | Self::InvalidPolicy(_) => {
                ErrorKind::Validation
            }
            Self::NoCurrentPoint | Self::Released | Self::InvalidState(_) => ErrorKind::State,
            Self::Allocation(_) => ErrorKind::Resource,
            Self::Internal(_) => ErrorKind::Invariant,
        }
    }

    /// Returns `true` for invariant violations.
    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Invariant
    }

    /// Creates an [`PathError::Internal`] and logs it.
    pub(crate) fn internal(what: &'static str) -> Self {
        log::error!("path invariant violated: {what}");
        Self::Internal(what)
    }
}

/// Specialization of `Result` for [`PathError`].
pub type Result<T, E = PathError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(PathError::OutOfBounds(0, 0).kind(), ErrorKind::Validation);
        assert_eq!(PathError::NoCurrentPoint.kind(), ErrorKind::State);
        assert_eq!(PathError::Released.kind(), ErrorKind::State);
        assert!(PathError::Internal("x").is_internal());
        assert!(!PathError::LimitCheck.is_internal());
    }

    #[test]
    fn allocation_errors_convert() {
        let err = Vec::<u64>::new().try_reserve(usize::MAX).unwrap_err();
        let err: PathError = err.into();
        assert_eq!(err.kind(), ErrorKind::Resource);
    }
}
