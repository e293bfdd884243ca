//! Result type alias for PhiGuard
//!
//! This module provides a convenient Result type alias that uses PhiError
//! as the error type.

use super::errors::PhiError;

/// Result type alias for PhiGuard operations
///
/// # Examples
///
/// ```
/// use phiguard::domain::result::Result;
/// use phiguard::domain::errors::PhiError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PhiError::UnsupportedPolicy("shred".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PhiError>;
