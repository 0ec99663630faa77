// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A packet: a [`Buffer`] plus the range of bit offsets within it that are actually in use.

use std::marker::PhantomData;

use super::buffer::Buffer;
use super::direction::{Direction, Forward, Reverse};

/// A fixed-capacity [`Buffer`] together with the bit offsets, within that buffer, that a push or
/// pop stream has written or still has left to read.
///
/// For a [`Forward`] packet, `start_bit <= end_bit`, and valid data occupies the half-open bit
/// range `[start_bit, end_bit)`, counting up from the low end of the buffer. For a [`Reverse`]
/// packet the roles of `start_bit` and `end_bit` are swapped: valid data occupies
/// `(end_bit, start_bit]`, counting down from the high end. This lets [`into_opposite`]
/// (`Packet::into_opposite`) reinterpret a packet written in one direction as input for the other
/// by nothing more than swapping the two offsets.
pub struct Packet<D: Direction> {
    buffer: Buffer,
    start_bit: i64,
    end_bit: i64,
    _direction: PhantomData<D>,
}

impl<D: Direction> Packet<D> {
    /// Wraps `buffer` with the given start and end bit offsets.
    pub fn new(buffer: Buffer, start_bit: i64, end_bit: i64) -> Self {
        Packet { buffer, start_bit, end_bit, _direction: PhantomData }
    }

    /// Creates an empty packet over `buffer` positioned at the direction's natural origin: bit 0
    /// for [`Forward`], or the last bit for [`Reverse`].
    pub fn empty(buffer: Buffer) -> Self {
        let bit_len = (buffer.len() as i64) * 8;
        let origin = if D::IS_FORWARD { 0 } else { bit_len };
        Packet { buffer, start_bit: origin, end_bit: origin, _direction: PhantomData }
    }

    /// The underlying byte storage.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// The underlying byte storage, mutably.
    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    /// The bit offset data starts at.
    pub fn start_bit(&self) -> i64 {
        self.start_bit
    }

    /// The bit offset data ends at (exclusive, in the direction of travel).
    pub fn end_bit(&self) -> i64 {
        self.end_bit
    }

    /// Sets the end offset, in the direction of travel, of the valid data in this packet.
    pub fn set_end_bit(&mut self, end_bit: i64) {
        self.end_bit = end_bit;
    }

    /// The number of valid bits currently held by this packet.
    pub fn bit_len(&self) -> i64 {
        (self.end_bit - self.start_bit).abs()
    }

    /// The number of whole bytes touched by the valid bit range, rounding up.
    pub fn size(&self) -> usize {
        ((self.bit_len() + 7) / 8) as usize
    }

    /// Consumes this packet and returns its underlying buffer, discarding offset bookkeeping.
    pub fn into_buffer(self) -> Buffer {
        self.buffer
    }
}

impl Packet<Forward> {
    /// Reinterprets a packet written forward as input for a reverse-direction consumer, by
    /// swapping the start and end offsets. No bytes move.
    pub fn into_opposite(self) -> Packet<Reverse> {
        Packet {
            buffer: self.buffer,
            start_bit: self.end_bit,
            end_bit: self.start_bit,
            _direction: PhantomData,
        }
    }
}

impl Packet<Reverse> {
    /// Reinterprets a packet written in reverse as input for a forward-direction consumer, by
    /// swapping the start and end offsets. No bytes move.
    pub fn into_opposite(self) -> Packet<Forward> {
        Packet {
            buffer: self.buffer,
            start_bit: self.end_bit,
            end_bit: self.start_bit,
            _direction: PhantomData,
        }
    }
}
