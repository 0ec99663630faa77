// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bit-granular, packet-oriented streaming I/O.
//!
//! [`PushStream`] packs 1-32 bit code-words, MSB-first, into a sequence of fixed-capacity
//! [`Packet`]s; [`PopStream`] unpacks them again. Neither type knows or cares where a packet's
//! storage comes from or where it ends up: both are driven entirely by caller-supplied
//! `allocate`/`emit`/`fetch` callbacks, so a memory queue, a socket, and a file all look the same
//! from here. Both streams come in a [`Forward`] and a [`Reverse`] flavour, see [`direction`] for
//! what that means.

pub mod buffer;
pub mod direction;
pub mod packet;
pub mod pop_stream;
pub mod push_stream;

pub use buffer::Buffer;
pub use direction::{Direction, Forward, Reverse};
pub use packet::Packet;
pub use pop_stream::PopStream;
pub use push_stream::PushStream;
