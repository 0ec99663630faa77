// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unpacks variable-width code-words back out of a sequence of fixed-capacity packets.

use std::marker::PhantomData;

use crate::errors::{end_of_stream, Result};
use crate::util::bits::is_in_range;

use super::direction::{Direction, Forward, Reverse};
use super::packet::Packet;

/// Supplies the next packet of input, or `Ok(None)` once the underlying source is exhausted.
pub type FetchForwardFn = Box<dyn FnMut() -> Result<Option<Packet<Forward>>> + Send>;

/// Supplies the next packet of input, or `Ok(None)` once the underlying source is exhausted.
pub type FetchReverseFn = Box<dyn FnMut() -> Result<Option<Packet<Reverse>>> + Send>;

/// Unpacks 1-32 bit code-words, MSB-first, back out of a sequence of packets.
///
/// `PopStream` is the mirror image of [`PushStream`](super::PushStream): it asks a `fetch`
/// callback for packets as it runs out of buffered bits, and otherwise has no idea where those
/// packets come from. It does not frame, checksum, or otherwise validate its input; a caller
/// popping more bits than were ever pushed simply observes [`crate::errors::Error::EndOfStream`]
/// once the `fetch` callback runs dry.
pub struct PopStream<D: Direction> {
    fetch: Box<dyn FnMut() -> Result<Option<Packet<D>>> + Send>,
    packet: Option<Packet<D>>,
    read_bit: i64,
    staging: u64,
    staging_bits: u32,
    total_consumed_bits: u64,
    _direction: PhantomData<D>,
}

impl PopStream<Forward> {
    /// Creates a forward-direction pop stream.
    pub fn new(fetch: FetchForwardFn) -> Self {
        PopStream::new_impl(fetch)
    }
}

impl PopStream<Reverse> {
    /// Creates a reverse-direction pop stream.
    pub fn new(fetch: FetchReverseFn) -> Self {
        PopStream::new_impl(fetch)
    }
}

impl<D: Direction> PopStream<D> {
    fn new_impl(fetch: Box<dyn FnMut() -> Result<Option<Packet<D>>> + Send>) -> Self {
        PopStream {
            fetch,
            packet: None,
            read_bit: 0,
            staging: 0,
            staging_bits: 0,
            total_consumed_bits: 0,
            _direction: PhantomData,
        }
    }

    /// Pops a `width`-bit code-word, 1 <= `width` <= 32, MSB-first.
    ///
    /// Fails with [`crate::errors::Error::EndOfStream`] if the `fetch` callback runs out of
    /// packets before `width` bits are available, or with
    /// [`crate::errors::Error::Callback`] if `fetch` itself fails.
    pub fn pop(&mut self, width: u32) -> Result<u32> {
        debug_assert!(is_in_range(width, 1, 32), "bit width out of range: {width}");

        self.fill_staging(width)?;

        let shift = self.staging_bits - width;
        let mask = mask_for(width);
        let code = ((self.staging >> shift) & mask) as u32;

        self.staging &= (1u64 << shift) - 1;
        self.staging_bits = shift;
        self.total_consumed_bits += u64::from(width);

        Ok(code)
    }

    /// Pops a single bit as a `bool`.
    pub fn pop_bit(&mut self) -> Result<bool> {
        Ok(self.pop(1)? != 0)
    }

    /// Returns the next `width` bits without consuming them, or `Ok(None)` if the stream has no
    /// more input.
    ///
    /// Unlike [`pop`](Self::pop), running out of input while peeking is not an error: there is
    /// nothing wrong with asking whether more data exists.
    pub fn peek(&mut self, width: u32) -> Result<Option<u32>> {
        debug_assert!(is_in_range(width, 1, 32), "bit width out of range: {width}");

        match self.fill_staging(width) {
            Ok(()) => {
                let shift = self.staging_bits - width;
                let mask = mask_for(width);
                Ok(Some(((self.staging >> shift) & mask) as u32))
            }
            Err(crate::errors::Error::EndOfStream) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Discards `count` bits without returning them.
    pub fn discard(&mut self, mut count: u64) -> Result<()> {
        while count > 0 {
            let chunk = count.min(32) as u32;
            self.pop(chunk)?;
            count -= u64::from(chunk);
        }
        Ok(())
    }

    /// Discards bits, if necessary, until the total number of bits popped so far is a multiple of
    /// eight.
    ///
    /// Calling `align` when already byte-aligned is a no-op.
    pub fn align(&mut self) -> Result<()> {
        let misaligned = (self.total_consumed_bits % 8) as u32;
        if misaligned != 0 {
            self.pop(8 - misaligned)?;
        }
        Ok(())
    }

    /// The total number of bits popped so far.
    pub fn size_consumed(&self) -> u64 {
        self.total_consumed_bits
    }

    fn fill_staging(&mut self, width: u32) -> Result<()> {
        while self.staging_bits < width {
            let (chunk, len) = self.read_chunk()?;
            for &byte in &chunk[..len] {
                self.staging = (self.staging << 8) | u64::from(byte);
                self.staging_bits += 8;
            }
        }
        Ok(())
    }

    /// Reads the next run of up to 4 bytes available in the current packet as a single block,
    /// fetching a fresh packet first if the current one is exhausted.
    ///
    /// This mirrors [`PushStream::write_chunk`](super::push_stream::PushStream): for [`Reverse`],
    /// the cursor moves back by the block's length before the block is read ascending from that
    /// new position, so a block's internal byte order always comes out the same as it was
    /// written, regardless of which end of the buffer it sits at.
    fn read_chunk(&mut self) -> Result<([u8; 4], usize)> {
        loop {
            let remaining_bits = match self.packet.as_ref() {
                Some(packet) => {
                    if D::IS_FORWARD {
                        packet.end_bit() - self.read_bit
                    }
                    else {
                        self.read_bit - packet.end_bit()
                    }
                }
                None => 0,
            };

            if remaining_bits > 0 {
                let chunk_bytes = (remaining_bits.min(32) / 8) as usize;
                let packet = self.packet.as_ref().expect("checked above");

                let mut chunk = [0u8; 4];

                if D::IS_FORWARD {
                    let start = (self.read_bit / 8) as usize;
                    chunk[..chunk_bytes].copy_from_slice(&packet.buffer()[start..start + chunk_bytes]);
                    self.read_bit += (chunk_bytes as i64) * 8;
                }
                else {
                    let new_read_bit = self.read_bit - (chunk_bytes as i64) * 8;
                    let start = (new_read_bit / 8) as usize;
                    chunk[..chunk_bytes].copy_from_slice(&packet.buffer()[start..start + chunk_bytes]);
                    self.read_bit = new_read_bit;
                }

                return Ok((chunk, chunk_bytes));
            }

            match (self.fetch)()? {
                Some(next) => {
                    self.read_bit = next.start_bit();
                    self.packet = Some(next);
                }
                None => return end_of_stream(),
            }
        }
    }
}

fn mask_for(width: u32) -> u64 {
    if width == 64 {
        u64::MAX
    }
    else {
        (1u64 << width) - 1
    }
}
