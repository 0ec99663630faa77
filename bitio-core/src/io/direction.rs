// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Forward and reverse stream directions.
//!
//! The forward and reverse push/pop streams are mirror images of each other, differing only in
//! where the write/read cursor starts, which way it moves, and how a packet's offsets are laid
//! out. Rather than duplicating the bit-packing state machine once per direction, [`PushStream`](
//! super::PushStream) and [`PopStream`](super::PopStream) are generic over a [`Direction`] marker
//! type and dispatch on [`Direction::IS_FORWARD`] at the handful of places the two actually
//! diverge.

use std::fmt::Debug;

mod private {
    pub trait Sealed {}
    impl Sealed for super::Forward {}
    impl Sealed for super::Reverse {}
}

/// A stream direction: [`Forward`] or [`Reverse`].
///
/// This trait is sealed; `Forward` and `Reverse` are its only implementations.
pub trait Direction: private::Sealed + Copy + Clone + Debug + Default + 'static {
    /// The direction obtained by reinterpreting a packet written in this direction.
    type Opposite: Direction<Opposite = Self>;

    /// `true` for [`Forward`], `false` for [`Reverse`].
    const IS_FORWARD: bool;
}

/// Bits flow from low address to high address; new code-words occupy higher bit positions in the
/// staging word before a spill.
#[derive(Debug, Clone, Copy, Default)]
pub struct Forward;

/// Bits flow from high address to low address; the mirror image of [`Forward`]. Useful for
/// codecs that generate output tail-first, such as arithmetic coders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reverse;

impl Direction for Forward {
    type Opposite = Reverse;
    const IS_FORWARD: bool = true;
}

impl Direction for Reverse {
    type Opposite = Forward;
    const IS_FORWARD: bool = false;
}
