// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.
//!
//! The bit-packing state machine in [`crate::io`] never fails on its own: pushing and popping
//! code-words is infallible by construction. The only way a stream operation can fail is if a
//! caller-supplied `emit`, `fetch`, or `allocate` callback fails, in which case the error is
//! passed through unchanged rather than interpreted or retried.

use std::error::Error as StdError;
use std::fmt;
use std::ops::Deref;
use std::result;

/// `Error` provides an enumeration of all possible errors reported by `bitio-core`.
#[derive(Debug)]
pub enum Error {
    /// A caller-supplied `emit`, `fetch`, or `allocate` callback failed.
    Callback(Box<dyn StdError + Send + Sync>),
    /// A `pop`, `discard`, or `align` call demanded more bits than a `fetch` callback could
    /// supply (it returned `Ok(None)`).
    EndOfStream,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Callback(ref err) => write!(f, "stream callback failed: {}", err),
            Error::EndOfStream => write!(f, "no more packets available"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Callback(ref err) => Some(err.deref()),
            Error::EndOfStream => None,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to wrap a failed `emit`/`fetch`/`allocate` callback in an [`Error`].
pub fn callback_error<T>(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Result<T> {
    Err(Error::Callback(err.into()))
}

/// Convenience function for a `pop`/`discard`/`align` call that ran out of input.
pub fn end_of_stream<T>() -> Result<T> {
    Err(Error::EndOfStream)
}
