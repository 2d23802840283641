// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Running a [`FrameProducer`] on its own thread.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::info;

use crate::error::SamplerError;
use crate::handoff::FrameProducer;
use crate::source::WorldSource;

/// How the sampler waits for the host's next tick.
pub trait TickPort: Send {
    /// Block or yield until the host is ready for another sample.
    fn wait_next_tick(&mut self);
}

/// Yield the thread once per tick.
#[derive(Copy, Clone, Debug, Default)]
pub struct YieldNow;

impl TickPort for YieldNow {
    fn wait_next_tick(&mut self) {
        thread::yield_now();
    }
}

impl<F: FnMut() + Send> TickPort for F {
    fn wait_next_tick(&mut self) {
        self();
    }
}

#[derive(Debug)]
struct Lifecycle {
    stop_requested: AtomicBool,
    running: AtomicBool,
}

/// Clears the running flag when the sampler loop exits, even by unwinding.
struct Running<'a>(&'a AtomicBool);

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Spawns sampler threads.
#[derive(Copy, Clone, Debug)]
pub struct SamplerThread;

impl SamplerThread {
    /// Tick `producer` against `source` on a new thread until stopped.
    ///
    /// The loop samples, then waits on `port`, and checks for a stop request
    /// before every sample.
    pub fn spawn<S, P>(producer: FrameProducer, source: S, port: P) -> io::Result<SamplerHandle>
    where
        S: WorldSource + Send + 'static,
        P: TickPort + 'static,
    {
        let lifecycle = Arc::new(Lifecycle {
            stop_requested: AtomicBool::new(false),
            running: AtomicBool::new(true),
        });
        let shared = Arc::clone(&lifecycle);
        let thread = thread::Builder::new()
            .name("reident-sampler".into())
            .spawn(move || run(producer, source, port, &shared))?;
        Ok(SamplerHandle {
            lifecycle,
            thread: Some(thread),
        })
    }
}

fn run<S: WorldSource, P: TickPort>(
    mut producer: FrameProducer,
    mut source: S,
    mut port: P,
    lifecycle: &Lifecycle,
) -> FrameProducer {
    let _running = Running(&lifecycle.running);
    info!("sampler started");
    while !lifecycle.stop_requested.load(Ordering::Acquire) {
        producer.tick(&mut source);
        port.wait_next_tick();
    }
    info!(ticks = producer.ticks(), "sampler stopped");
    producer
}

/// Control over a running sampler thread.
///
/// Dropping the handle stops the thread and waits for it.
#[derive(Debug)]
pub struct SamplerHandle {
    lifecycle: Arc<Lifecycle>,
    thread: Option<JoinHandle<FrameProducer>>,
}

impl SamplerHandle {
    /// Ask the sampler to stop after its current tick.
    ///
    /// Returns whether it has already exited.
    pub fn request_stop(&self) -> bool {
        self.lifecycle.stop_requested.store(true, Ordering::Release);
        self.has_stopped()
    }

    /// Whether the sampler loop has exited.
    pub fn has_stopped(&self) -> bool {
        !self.lifecycle.running.load(Ordering::Acquire)
    }

    /// Stop the sampler, wait for it and take the producer back.
    pub fn join(mut self) -> Result<FrameProducer, SamplerError> {
        self.request_stop();
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| SamplerError::Panicked),
            None => Err(SamplerError::Panicked),
        }
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.request_stop();
            // A panic on the sampler thread has already been reported there.
            drop(thread.join());
        }
    }
}
