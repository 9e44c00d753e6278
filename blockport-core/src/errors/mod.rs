//! Domain-specific error types for blockport-core
//!
//! # Error Categories
//!
//! - **ImportError**: partial import pipeline failures, tagged with the stage
//!   and entity they were raised for
//! - **CoreError**: the facade error returned by [`crate::AppContext`]
//!   operations, carrying a coarse [`CoreErrorKind`] plus structured fields
//!
//! ## Using in Functions
//!
//! ```rust
//! use blockport::errors::{CoreError, CoreErrorKind, ImportError};
//!
//! fn load(id: i32) -> Result<(), ImportError> {
//!     Err(ImportError::not_found("page", id))
//! }
//!
//! let err: CoreError = load(7).unwrap_err().into();
//! assert_eq!(err.kind(), CoreErrorKind::NotFound);
//! ```

pub mod core_error;
pub mod import;

pub use core_error::{CoreError, CoreErrorKind};
pub use import::{ImportError, ImportStage, StageResultExt};

/// Result type alias for facade operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type alias for import pipeline operations
pub type ImportResult<T> = Result<T, ImportError>;
