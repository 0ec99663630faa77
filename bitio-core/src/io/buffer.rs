// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An owned, fixed-capacity region of bytes that push and pop streams write into and read out of.
//!
//! A [`Buffer`] is move-only and carries an optional release callback that runs when the buffer is
//! dropped, which lets a caller recycle the backing storage (a pool, a ring of packets, a network
//! send) rather than simply freeing it.

use std::fmt;
use std::ops::{Deref, DerefMut};

/// An owned region of bytes, optionally paired with a callback that runs when it is dropped.
///
/// `Buffer` never exposes its storage by reference to more than one owner at a time; the owning
/// [`Packet`](super::Packet) treats it as a plain `Box<[u8]>` via `Deref`/`DerefMut`, and the
/// on-drop callback exists purely so a caller can reclaim or recycle the storage.
pub struct Buffer {
    data: Box<[u8]>,
    on_drop: Option<Box<dyn FnOnce(Box<[u8]>) + Send>>,
}

impl Buffer {
    /// Creates a buffer of `len` zeroed bytes with no release callback.
    pub fn new(len: usize) -> Self {
        Buffer { data: vec![0u8; len].into_boxed_slice(), on_drop: None }
    }

    /// Takes ownership of an existing byte vector with no release callback.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Buffer { data: data.into_boxed_slice(), on_drop: None }
    }

    /// Takes ownership of an existing byte vector, running `on_drop` with the storage once this
    /// buffer (and anything it was moved into) is finally dropped.
    ///
    /// This is the safe counterpart of the original's raw-pointer-plus-custom-deleter
    /// constructor: instead of an unsafe deleter function pointer, the caller supplies an
    /// ordinary closure.
    pub fn with_on_drop<F>(data: Vec<u8>, on_drop: F) -> Self
    where
        F: FnOnce(Box<[u8]>) + Send + 'static,
    {
        Buffer { data: data.into_boxed_slice(), on_drop: Some(Box::new(on_drop)) }
    }

    /// The number of bytes in this buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if this buffer has zero capacity.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the buffer and returns the backing storage, skipping the release callback.
    ///
    /// Used when a buffer is being handed off to another owner (for example, `emit`) rather than
    /// released back to its origin.
    pub fn into_inner(mut self) -> Box<[u8]> {
        self.on_drop = None;
        std::mem::replace(&mut self.data, Box::new([]))
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer").field("len", &self.data.len()).finish()
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            let data = std::mem::replace(&mut self.data, Box::new([]));
            on_drop(data);
        }
    }
}
