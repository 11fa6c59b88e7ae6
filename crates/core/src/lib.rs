//! Core types shared by every tagsync crate.
//!
//! - [`Error`] / [`Result`]: the typed error vocabulary for parsing,
//!   validation and file handling
//! - [`Attr`]: a tri-state string attribute that keeps "unknown",
//!   "absent" and "present" apart

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod attr;
pub mod error;
pub mod result;

pub use attr::Attr;
pub use error::Error;
pub use result::Result;
