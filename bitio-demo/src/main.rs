// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Pushes a run of fixed-width integers through a [`PushStream`]/[`PopStream`] pair connected by
//! an in-memory packet queue, then pops them all back out and reports throughput.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use bitio_core::errors::Result;
use bitio_core::io::{Buffer, Forward, Packet, PopStream, PushStream, Reverse};

use clap::{Parser, ValueEnum};
use log::info;

const NUM_INTEGERS_TO_PUSH: u64 = 1 << 23;
const NUM_BITS_PER_PUSH: u32 = 32;

#[derive(Copy, Clone, Eq, PartialEq, ValueEnum)]
enum StreamDirection {
    Forward,
    Reverse,
}

#[derive(Parser)]
#[command(name = "bitio-demo", about = "bitio-core push/pop throughput demo")]
struct Args {
    /// Number of 32-bit code-words to push and pop.
    #[arg(long, default_value_t = NUM_INTEGERS_TO_PUSH)]
    count: u64,

    /// Byte capacity of each packet. Must be a multiple of 4.
    #[arg(long, default_value_t = 1 << 16)]
    packet_size: usize,

    /// Which stream direction to exercise.
    #[arg(long, value_enum, default_value_t = StreamDirection::Forward)]
    direction: StreamDirection,
}

fn main() {
    pretty_env_logger::init();

    let args = Args::parse();

    let result = match args.direction {
        StreamDirection::Forward => run::<Forward>(args.count, args.packet_size),
        StreamDirection::Reverse => run::<Reverse>(args.count, args.packet_size),
    };

    if let Err(err) = result {
        eprintln!("demo failed: {err}");
        std::process::exit(1);
    }
}

fn run<D>(count: u64, packet_size: usize) -> Result<()>
where
    D: bitio_core::io::Direction + 'static,
    PushStream<D>: PushStreamExt<D>,
    PopStream<D>: PopStreamExt<D>,
{
    let queue = Arc::new(Mutex::new(VecDeque::<Packet<D>>::new()));

    let push_queue = Arc::clone(&queue);
    let allocate = Box::new(|len: usize| Ok(Buffer::new(len)));
    let mut push = PushStream::<D>::build(packet_size, allocate, move |packet| {
        push_queue.lock().unwrap().push_back(packet);
        Ok(())
    })?;

    let push_start = Instant::now();
    for i in 0..count {
        push.push((i & 0xFFFF_FFFF) as u32, NUM_BITS_PER_PUSH)?;
    }
    push.flush()?;
    let push_elapsed = push_start.elapsed();

    info!(
        "pushed {count} code-words ({} bits) in {push_elapsed:?}",
        push.size()
    );

    let pop_queue = Arc::clone(&queue);
    let mut pop = PopStream::<D>::build(move || Ok(pop_queue.lock().unwrap().pop_front()));

    let pop_start = Instant::now();
    for i in 0..count {
        let value = pop.pop(NUM_BITS_PER_PUSH)?;
        let expected = (i & 0xFFFF_FFFF) as u32;
        if value != expected {
            panic!("round-trip mismatch at index {i}: expected {expected:#x}, got {value:#x}");
        }
    }
    let pop_elapsed = pop_start.elapsed();

    info!("popped and verified {count} code-words in {pop_elapsed:?}");

    let total_bits = pop.size_consumed();
    let push_rate = total_bits as f64 / push_elapsed.as_secs_f64() / 8.0 / 1_000_000.0;
    let pop_rate = total_bits as f64 / pop_elapsed.as_secs_f64() / 8.0 / 1_000_000.0;
    println!("push throughput: {push_rate:.1} MB/s");
    println!("pop throughput:  {pop_rate:.1} MB/s");

    Ok(())
}

/// Lets [`run`] construct a [`PushStream`] generically over direction despite `PushStream::new`
/// taking a differently-typed `emit` callback per direction.
trait PushStreamExt<D: bitio_core::io::Direction>: Sized {
    fn build<A, E>(capacity: usize, allocate: A, emit: E) -> Result<Self>
    where
        A: FnMut(usize) -> Result<Buffer> + Send + 'static,
        E: FnMut(Packet<D>) -> Result<()> + Send + 'static;
}

impl PushStreamExt<Forward> for PushStream<Forward> {
    fn build<A, E>(capacity: usize, allocate: A, emit: E) -> Result<Self>
    where
        A: FnMut(usize) -> Result<Buffer> + Send + 'static,
        E: FnMut(Packet<Forward>) -> Result<()> + Send + 'static,
    {
        PushStream::<Forward>::new(capacity, Box::new(allocate), Box::new(emit))
    }
}

impl PushStreamExt<Reverse> for PushStream<Reverse> {
    fn build<A, E>(capacity: usize, allocate: A, emit: E) -> Result<Self>
    where
        A: FnMut(usize) -> Result<Buffer> + Send + 'static,
        E: FnMut(Packet<Reverse>) -> Result<()> + Send + 'static,
    {
        PushStream::<Reverse>::new(capacity, Box::new(allocate), Box::new(emit))
    }
}

/// Mirror of [`PushStreamExt`] for [`PopStream`].
trait PopStreamExt<D: bitio_core::io::Direction>: Sized {
    fn build<F>(fetch: F) -> Self
    where
        F: FnMut() -> Result<Option<Packet<D>>> + Send + 'static;
}

impl PopStreamExt<Forward> for PopStream<Forward> {
    fn build<F>(fetch: F) -> Self
    where
        F: FnMut() -> Result<Option<Packet<Forward>>> + Send + 'static,
    {
        PopStream::<Forward>::new(Box::new(fetch))
    }
}

impl PopStreamExt<Reverse> for PopStream<Reverse> {
    fn build<F>(fetch: F) -> Self
    where
        F: FnMut() -> Result<Option<Packet<Reverse>>> + Send + 'static,
    {
        PopStream::<Reverse>::new(Box::new(fetch))
    }
}
