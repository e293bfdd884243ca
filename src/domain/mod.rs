//! Domain types shared across PhiGuard.
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, PhiError>`]:
//!
//! ```rust
//! use phiguard::domain::{PhiError, Result};
//! use phiguard::phi::HandlingPolicy;
//!
//! fn example() -> Result<HandlingPolicy> {
//!     // Unknown policies are rejected before any text is touched
//!     let policy: HandlingPolicy = "redact".parse()?;
//!     Ok(policy)
//! }
//! ```

pub mod errors;
pub mod result;

pub use errors::PhiError;
pub use result::Result;
