//! Internal helper macros.

/// Returns early with the given error when the predicate does not hold.
///
/// Like `assert!`, but produces an `Err` instead of a panic. Used for
/// argument validation at the public API boundary.
///
/// # Example
///
/// ```ignore
/// ensure!(source.is_open(), ResponseError::invalid_source("source is closed"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
