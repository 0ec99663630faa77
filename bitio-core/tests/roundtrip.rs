// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end push/pop round-trip scenarios, backed by an in-memory packet queue.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use bitio_core::io::pop_stream::{FetchForwardFn, FetchReverseFn};
use bitio_core::io::push_stream::{AllocateFn, EmitForwardFn, EmitReverseFn};
use bitio_core::io::{Buffer, Forward, Packet, PopStream, PushStream, Reverse};

const CAPACITY: usize = 1024;

/// Wires a `PushStream<Forward>` to a `PopStream<Forward>` through a shared in-memory queue.
fn forward_queue() -> (PushStream<Forward>, PopStream<Forward>) {
    let queue = Arc::new(Mutex::new(VecDeque::<Packet<Forward>>::new()));

    let push_queue = Arc::clone(&queue);
    let allocate: AllocateFn = Box::new(|len| Ok(Buffer::new(len)));
    let emit: EmitForwardFn = Box::new(move |packet| {
        push_queue.lock().unwrap().push_back(packet);
        Ok(())
    });

    let pop_queue = Arc::clone(&queue);
    let fetch: FetchForwardFn = Box::new(move || Ok(pop_queue.lock().unwrap().pop_front()));

    (PushStream::<Forward>::new(CAPACITY, allocate, emit).unwrap(), PopStream::<Forward>::new(fetch))
}

/// Wires a `PushStream<Reverse>` to a `PopStream<Reverse>` through a shared in-memory queue.
fn reverse_queue() -> (PushStream<Reverse>, PopStream<Reverse>) {
    let queue = Arc::new(Mutex::new(VecDeque::<Packet<Reverse>>::new()));

    let push_queue = Arc::clone(&queue);
    let allocate: AllocateFn = Box::new(|len| Ok(Buffer::new(len)));
    let emit: EmitReverseFn = Box::new(move |packet| {
        push_queue.lock().unwrap().push_back(packet);
        Ok(())
    });

    let pop_queue = Arc::clone(&queue);
    let fetch: FetchReverseFn = Box::new(move || Ok(pop_queue.lock().unwrap().pop_front()));

    (PushStream::<Reverse>::new(CAPACITY, allocate, emit).unwrap(), PopStream::<Reverse>::new(fetch))
}

#[test]
fn basic_round_trip_forward() {
    let (mut push, mut pop) = forward_queue();

    const N: u32 = 1 << 16;
    for i in 0..N {
        push.push(i, 32).unwrap();
    }
    push.flush().unwrap();

    for i in 0..N {
        assert_eq!(pop.pop(32).unwrap(), i);
    }
}

#[test]
fn basic_round_trip_reverse() {
    let (mut push, mut pop) = reverse_queue();

    const N: u32 = 1 << 16;
    for i in 0..N {
        push.push(i, 32).unwrap();
    }
    push.flush().unwrap();

    for i in 0..N {
        assert_eq!(pop.pop(32).unwrap(), i);
    }
}

#[test]
fn mixed_width_codes_round_trip() {
    let codes: [(u32, u32); 5] =
        [(0x5, 3), (0x3FF, 10), (0x1, 1), (0xCAFE, 16), (0xDEADBEEF, 32)];

    let (mut push, mut pop) = forward_queue();
    for &(code, width) in &codes {
        push.push(code, width).unwrap();
    }
    let total_bits: u64 = codes.iter().map(|&(_, w)| u64::from(w)).sum();
    assert_eq!(push.size(), total_bits);
    push.flush().unwrap();

    for &(code, width) in &codes {
        assert_eq!(pop.pop(width).unwrap(), code);
    }
    assert_eq!(pop.size_consumed(), total_bits);
}

#[test]
fn cross_packet_straddle_forward() {
    let queue = Arc::new(Mutex::new(VecDeque::<Packet<Forward>>::new()));
    let fetch_count = Arc::new(Mutex::new(0usize));

    let push_queue = Arc::clone(&queue);
    let allocate: AllocateFn = Box::new(|len| Ok(Buffer::new(len)));
    let emit: EmitForwardFn = Box::new(move |packet| {
        push_queue.lock().unwrap().push_back(packet);
        Ok(())
    });

    let mut push = PushStream::<Forward>::new(16, allocate, emit).unwrap();

    for _ in 0..31 {
        push.push(0xF, 4).unwrap();
    }
    push.push(0x1FF, 9).unwrap();
    push.flush().unwrap();

    let pop_queue = Arc::clone(&queue);
    let pop_fetch_count = Arc::clone(&fetch_count);
    let fetch: FetchForwardFn = Box::new(move || {
        *pop_fetch_count.lock().unwrap() += 1;
        Ok(pop_queue.lock().unwrap().pop_front())
    });
    let mut pop = PopStream::<Forward>::new(fetch);

    for _ in 0..31 {
        assert_eq!(pop.pop(4).unwrap(), 0xF);
    }
    assert_eq!(pop.pop(9).unwrap(), 0x1FF);
    assert_eq!(*fetch_count.lock().unwrap(), 2);
}

#[test]
fn flush_on_destruction_emits_one_packet() {
    let queue = Arc::new(Mutex::new(VecDeque::<Packet<Forward>>::new()));
    let push_queue = Arc::clone(&queue);

    let allocate: AllocateFn = Box::new(|len| Ok(Buffer::new(len)));
    let emit: EmitForwardFn = Box::new(move |packet| {
        push_queue.lock().unwrap().push_back(packet);
        Ok(())
    });

    {
        let mut push = PushStream::<Forward>::new(CAPACITY, allocate, emit).unwrap();
        push.push(0x1, 1).unwrap();
    }

    let packets = queue.lock().unwrap();
    assert_eq!(packets.len(), 1);
    // flush() pads the residual bit out to a whole byte before emitting.
    assert_eq!(packets[0].bit_len(), 8);
    assert_eq!(packets[0].buffer()[0], 0x80);
}

#[test]
fn reverse_direction_cross_consumer_reverses_sequence() {
    let queue = Arc::new(Mutex::new(VecDeque::<Packet<Reverse>>::new()));
    let push_queue = Arc::clone(&queue);

    let allocate: AllocateFn = Box::new(|len| Ok(Buffer::new(len)));
    let emit: EmitReverseFn = Box::new(move |packet| {
        push_queue.lock().unwrap().push_back(packet);
        Ok(())
    });

    let mut push = PushStream::<Reverse>::new(CAPACITY, allocate, emit).unwrap();
    const N: u32 = 1024;
    for i in 0..N {
        push.push(i, 32).unwrap();
    }
    push.flush().unwrap();

    let mut reversed: VecDeque<Packet<Forward>> = {
        let mut collected: Vec<Packet<Reverse>> = queue.lock().unwrap().drain(..).collect();
        collected.reverse();
        collected.into_iter().map(|packet| packet.into_opposite()).collect()
    };

    let fetch: FetchForwardFn = Box::new(move || Ok(reversed.pop_front()));
    let mut pop = PopStream::<Forward>::new(fetch);

    for i in (0..N).rev() {
        assert_eq!(pop.pop(32).unwrap(), i);
    }
}

#[test]
fn peek_does_not_advance_the_cursor() {
    let (mut push, mut pop) = forward_queue();
    push.push(0xABCD, 16).unwrap();
    push.flush().unwrap();

    assert_eq!(pop.peek(16).unwrap(), Some(0xABCD));
    assert_eq!(pop.peek(16).unwrap(), Some(0xABCD));
    assert_eq!(pop.pop(16).unwrap(), 0xABCD);
    assert_eq!(pop.peek(16).unwrap(), None);
}

#[test]
fn alignment_is_idempotent() {
    let (mut push, mut pop) = forward_queue();
    push.push(0b101, 3).unwrap();
    push.push(0, 5).unwrap();
    push.push(0xFF, 8).unwrap();
    push.flush().unwrap();

    assert_eq!(pop.pop(3).unwrap(), 0b101);
    pop.align().unwrap();
    assert_eq!(pop.size_consumed() % 8, 0);
    // Already aligned: a second call consumes nothing further.
    pop.align().unwrap();
    assert_eq!(pop.size_consumed(), 8);
    assert_eq!(pop.pop(8).unwrap(), 0xFF);
}

#[test]
fn randomized_round_trip_both_directions() {
    for &forward in &[true, false] {
        let mut rng = SmallRng::seed_from_u64(0xC0FF_EE42);
        let codes: Vec<(u32, u32)> = (0..5000)
            .map(|_| {
                let width = rng.random_range(1..=32u32);
                let code = if width == 32 { rng.random::<u32>() } else { rng.random_range(0..(1u32 << width)) };
                (code, width)
            })
            .collect();

        if forward {
            let (mut push, mut pop) = forward_queue();
            for &(code, width) in &codes {
                push.push(code, width).unwrap();
            }
            push.flush().unwrap();
            for &(code, width) in &codes {
                assert_eq!(pop.pop(width).unwrap(), code);
            }
        }
        else {
            let (mut push, mut pop) = reverse_queue();
            for &(code, width) in &codes {
                push.push(code, width).unwrap();
            }
            push.flush().unwrap();
            for &(code, width) in &codes {
                assert_eq!(pop.pop(width).unwrap(), code);
            }
        }
    }
}
