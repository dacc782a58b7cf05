//! # Error Types
//!
//! Error handling for the device listener.
//!
//! Protocol violations (bad version, out-of-range length, truncated payload
//! header) are deliberately *not* represented here: the frame codec reports
//! them as `None` and the session skips the offending frame without closing
//! the connection. This module covers the genuinely fallible paths: I/O,
//! configuration loading, and device-directory parsing.
//!
//! All errors implement `std::error::Error` for interoperability.

use std::io;
use thiserror::Error;

/// Primary error type for listener operations.
#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Device directory error: {0}")]
    Directory(String),
}

/// Type alias for Results using ListenerError
pub type Result<T> = std::result::Result<T, ListenerError>;
