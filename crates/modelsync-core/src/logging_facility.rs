//! Structured logging
//!
//! Operations are bracketed by `log_op_start!` and `log_op_end!` (or
//! `log_op_error!`), all sharing the field keys in `core_types::schema`.
//! Binaries pick an output format once through [`init`]; tests record events
//! with [`init_test_capture`].
//!
//! ```rust
//! use modelsync_core::logging_facility::{init, Profile};
//!
//! init(Profile::Production);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
