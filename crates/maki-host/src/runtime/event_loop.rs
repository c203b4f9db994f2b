// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The host's main loop.
//!
//! Interleaves timer ticks with events arriving on a channel. The session is
//! only ever touched from the task running the loop, so deliveries never
//! overlap.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::session::Session;
use crate::error::Result;
use crate::event::HostEvent;

/// Messages accepted by the loop.
#[derive(Debug)]
pub enum LoopMessage {
    /// Deliver an event.
    Event(HostEvent),
    /// Leave the loop after the current step.
    Stop,
}

/// Sending side of the loop's channel.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    tx: mpsc::UnboundedSender<LoopMessage>,
}

impl LoopHandle {
    /// Queues an event. Returns false once the loop is gone.
    pub fn send(&self, event: HostEvent) -> bool {
        self.tx.send(LoopMessage::Event(event)).is_ok()
    }

    /// Asks the loop to stop.
    pub fn stop(&self) {
        let _ = self.tx.send(LoopMessage::Stop);
    }
}

/// What a run of the loop did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    /// Timer ticks processed.
    pub ticks: u64,
    /// Events delivered.
    pub events: u64,
    /// Deliveries or ticks that failed.
    pub faults: u64,
}

/// Tick-driven event loop.
#[derive(Debug)]
pub struct EventLoop {
    interval: Duration,
    tx: mpsc::UnboundedSender<LoopMessage>,
    rx: mpsc::UnboundedReceiver<LoopMessage>,
}

impl EventLoop {
    /// Creates a loop ticking every `interval`.
    pub fn new(interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            interval: interval.max(Duration::from_millis(1)),
            tx,
            rx,
        }
    }

    /// A handle for feeding the loop from other tasks.
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            tx: self.tx.clone(),
        }
    }

    /// Tick period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs until a handle sends [`LoopMessage::Stop`] or `max_ticks` ticks
    /// have passed. Starts the session first if needed.
    ///
    /// Each tick advances the session clock by the time that actually passed,
    /// so a slow delivery or a skipped tick does not slow script time down.
    ///
    /// Failures are logged and counted; they do not end the loop.
    pub async fn run(&mut self, session: &mut Session, max_ticks: Option<u64>) -> LoopStats {
        let mut stats = LoopStats::default();
        if !session.is_started() {
            record(&mut stats, session.start());
        }

        let step = self.interval.as_millis() as u64;
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;
        let origin = Instant::now();
        let mut advanced: u64 = 0;

        info!(interval_ms = step, ?max_ticks, "event loop running");
        loop {
            if max_ticks.is_some_and(|max| stats.ticks >= max) {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    stats.ticks += 1;
                    let elapsed = origin.elapsed().as_millis() as u64;
                    let delta = elapsed.saturating_sub(advanced);
                    advanced = elapsed;
                    record(&mut stats, session.advance(delta));
                }
                message = self.rx.recv() => match message {
                    Some(LoopMessage::Event(event)) => {
                        debug!(%event, "host event");
                        stats.events += 1;
                        record(&mut stats, session.dispatch(&event).map(drop));
                    }
                    Some(LoopMessage::Stop) | None => break,
                },
            }
        }
        info!(
            ticks = stats.ticks,
            events = stats.events,
            faults = stats.faults,
            "event loop stopped"
        );
        stats
    }
}

fn record(stats: &mut LoopStats, outcome: Result<()>) {
    if let Err(err) = outcome {
        stats.faults += 1;
        warn!(%err, "delivery failed");
    }
}
