// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Packs variable-width code-words into a sequence of fixed-capacity packets.

use std::marker::PhantomData;

use log::trace;

use crate::errors::Result;
use crate::util::bits::is_in_range;

use super::buffer::Buffer;
use super::direction::{Direction, Forward, Reverse};
use super::packet::Packet;

/// Allocates a fresh, zeroed buffer of the given byte capacity.
pub type AllocateFn = Box<dyn FnMut(usize) -> Result<Buffer> + Send>;

/// A packet filled with `Forward`-direction data.
pub type EmitForwardFn = Box<dyn FnMut(Packet<Forward>) -> Result<()> + Send>;

/// A packet filled with `Reverse`-direction data.
pub type EmitReverseFn = Box<dyn FnMut(Packet<Reverse>) -> Result<()> + Send>;

/// Packs 1-32 bit code-words, MSB-first, into a sequence of packets of fixed byte capacity.
///
/// `PushStream` never interprets, frames, or compresses the code-words it is given; it only
/// concatenates them into a continuous MSB-first bitstream and slices that bitstream into
/// fixed-size packets, handing each full packet to an `emit` callback and asking an `allocate`
/// callback for the next one. Where the bitstream's bytes actually end up, and where fresh packet
/// storage comes from, is entirely up to those two callbacks.
///
/// The `D` type parameter selects whether packets fill from their low end towards their high end
/// ([`Forward`]) or from their high end towards their low end ([`Reverse`]); see [`Direction`].
pub struct PushStream<D: Direction> {
    allocate: AllocateFn,
    emit: Box<dyn FnMut(Packet<D>) -> Result<()> + Send>,
    capacity_bits: i64,
    packet: Option<Packet<D>>,
    staging: u64,
    staging_bits: u32,
    total_pushed_bits: u64,
    _direction: PhantomData<D>,
}

impl PushStream<Forward> {
    /// Creates a forward-direction push stream. `allocate` is called once immediately to obtain
    /// the first packet, and again every time a packet fills up; `capacity` is the fixed byte
    /// capacity every allocated packet is expected to have.
    pub fn new(capacity: usize, allocate: AllocateFn, emit: EmitForwardFn) -> Result<Self> {
        PushStream::new_impl(capacity, allocate, emit)
    }
}

impl PushStream<Reverse> {
    /// Creates a reverse-direction push stream. See [`PushStream::<Forward>::new`].
    pub fn new(capacity: usize, allocate: AllocateFn, emit: EmitReverseFn) -> Result<Self> {
        PushStream::new_impl(capacity, allocate, emit)
    }
}

impl<D: Direction> PushStream<D> {
    fn new_impl(
        capacity: usize,
        mut allocate: AllocateFn,
        emit: Box<dyn FnMut(Packet<D>) -> Result<()> + Send>,
    ) -> Result<Self> {
        debug_assert!(capacity % 4 == 0, "packet capacity must be a multiple of 4 bytes");

        let buffer = allocate(capacity)?;
        let packet = Packet::empty(buffer);

        Ok(PushStream {
            allocate,
            emit,
            capacity_bits: (capacity as i64) * 8,
            packet: Some(packet),
            staging: 0,
            staging_bits: 0,
            total_pushed_bits: 0,
            _direction: PhantomData,
        })
    }

    /// Pushes a `width`-bit code-word, 1 <= `width` <= 32.
    ///
    /// Only the low `width` bits of `code` may be set; in a debug build, a violation of either
    /// precondition trips a `debug_assert`. In a release build the result is unspecified, per the
    /// infallible-by-construction contract of the bit-packing core: the only way this call can
    /// fail is if the `emit` or `allocate` callback it may invoke fails.
    pub fn push(&mut self, code: u32, width: u32) -> Result<()> {
        debug_assert!(is_in_range(width, 1, 32), "bit width out of range: {width}");
        debug_assert!(width == 32 || (code >> width) == 0, "code has high bits set: {code:#x}");

        self.staging = (self.staging << width) | u64::from(code);
        self.staging_bits += width;
        self.total_pushed_bits += u64::from(width);

        if self.staging_bits >= 32 {
            let shift = self.staging_bits - 32;
            let word = (self.staging >> shift) as u32;
            self.staging &= (1u64 << shift) - 1;
            self.staging_bits = shift;
            self.write_word(word)?;
        }

        Ok(())
    }

    /// Pads the bitstream with zero bits, if necessary, until the total number of bits pushed so
    /// far is a multiple of eight.
    ///
    /// Calling `align` when already byte-aligned is a no-op; it never emits a spurious padding
    /// byte.
    pub fn align(&mut self) -> Result<()> {
        let misaligned = self.staging_bits % 8;
        if misaligned != 0 {
            self.push(0, 8 - misaligned)?;
        }
        Ok(())
    }

    /// The total number of bits pushed so far, including any not yet flushed to a packet.
    pub fn size(&self) -> u64 {
        self.total_pushed_bits
    }

    /// Pads any residual bits out to a whole byte and emits the current packet, even if it is not
    /// full.
    ///
    /// The padding bits are appended after the real data (hidden at the tail of the bitstream);
    /// nothing in the packet records how many of the final byte's bits are padding, so the
    /// original code-word count must be tracked independently by the caller.
    pub fn flush(&mut self) -> Result<()> {
        if self.staging_bits > 0 {
            let word = (self.staging as u32) << (32 - self.staging_bits);
            let bytes = word.to_be_bytes();
            let residual_bytes = ((self.staging_bits + 7) / 8) as usize;

            self.write_chunk(&bytes[..residual_bytes])?;

            self.staging = 0;
            self.staging_bits = 0;
        }

        self.emit_current_if_nonempty()
    }

    fn write_word(&mut self, word: u32) -> Result<()> {
        self.write_chunk(&word.to_be_bytes())
    }

    /// Writes a contiguous run of bytes (at most 4) as a single block.
    ///
    /// For [`Forward`], the block lands ascending at the current write cursor. For [`Reverse`],
    /// the cursor is first moved back by the block's length, and the block then lands ascending
    /// from that new, lower position — so within the block, byte order is always normal
    /// (big-endian); only the block's *position* walks backward.
    fn write_chunk(&mut self, bytes: &[u8]) -> Result<()> {
        let len_bits = (bytes.len() as i64) * 8;

        let full = {
            let packet = self.packet.as_mut().expect("push stream always holds a packet");
            let buf = packet.buffer_mut();

            if D::IS_FORWARD {
                let start = (packet.end_bit() / 8) as usize;
                buf[start..start + bytes.len()].copy_from_slice(bytes);
                packet.set_end_bit(packet.end_bit() + len_bits);
                packet.end_bit() >= self.capacity_bits
            }
            else {
                let new_end_bit = packet.end_bit() - len_bits;
                let start = (new_end_bit / 8) as usize;
                buf[start..start + bytes.len()].copy_from_slice(bytes);
                packet.set_end_bit(new_end_bit);
                packet.end_bit() <= 0
            }
        };

        if full {
            self.emit_current_if_nonempty()?;
            let buffer = (self.allocate)(self.capacity_bits as usize / 8)?;
            self.packet = Some(Packet::empty(buffer));
        }

        Ok(())
    }

    fn emit_current_if_nonempty(&mut self) -> Result<()> {
        let is_origin = {
            let packet = self.packet.as_ref().expect("push stream always holds a packet");
            packet.bit_len() == 0
        };

        if is_origin {
            return Ok(());
        }

        if let Some(packet) = self.packet.take() {
            trace!("emitting packet of {} bytes", packet.size());
            (self.emit)(packet)?;
        }

        Ok(())
    }
}

impl<D: Direction> Drop for PushStream<D> {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            log::error!("failed to flush push stream on drop: {err}");
        }
    }
}
