//! Guided breathing: a two-phase oscillator driven by a tokio interval.
//!
//! The timer knows nothing about the wizard. Its background task only sends
//! [`BreathTick`]s; the owner feeds them back through [`BreathingTimer::on_tick`],
//! which is where the phase actually flips.

use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

pub const DEFAULT_BREATH_INTERVAL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathPhase {
    Inhale,
    Exhale,
}

impl BreathPhase {
    pub fn toggled(self) -> Self {
        match self {
            BreathPhase::Inhale => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::Inhale,
        }
    }
}

impl fmt::Display for BreathPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreathPhase::Inhale => f.write_str("Breathe in..."),
            BreathPhase::Exhale => f.write_str("Breathe out..."),
        }
    }
}

/// Sent once per interval. `run` identifies the `start()` it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathTick {
    pub run: u64,
}

pub struct BreathingTimer {
    interval: Duration,
    phase: BreathPhase,
    run: u64,
    task: Option<JoinHandle<()>>,
    ticks: mpsc::UnboundedSender<BreathTick>,
}

impl BreathingTimer {
    pub fn new(interval: Duration) -> (Self, mpsc::UnboundedReceiver<BreathTick>) {
        let (ticks, rx) = mpsc::unbounded_channel();
        let timer = BreathingTimer {
            interval,
            phase: BreathPhase::Inhale,
            run: 0,
            task: None,
            ticks,
        };
        (timer, rx)
    }

    /// Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        self.stop();
        self.run += 1;
        self.phase = BreathPhase::Inhale;

        let run = self.run;
        let now = Instant::now();
        let (first, period) = match now.checked_add(self.interval) {
            Some(first) => (first, self.interval),
            None => {
                warn!(
                    interval_secs = self.interval.as_secs(),
                    "breath interval out of range, using default"
                );
                (now + DEFAULT_BREATH_INTERVAL, DEFAULT_BREATH_INTERVAL)
            }
        };
        let ticks = self.ticks.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(first, period);
            loop {
                interval.tick().await;
                if ticks.send(BreathTick { run }).is_err() {
                    break;
                }
            }
        }));
        debug!(run, interval_ms = period.as_millis() as u64, "breathing started");
    }

    /// Cancels the ticker. Safe to call when already stopped.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(run = self.run, "breathing stopped");
        }
    }

    /// Applies a tick, returning the new phase. Ticks from an earlier run or
    /// arriving after `stop()` are ignored.
    pub fn on_tick(&mut self, tick: BreathTick) -> Option<BreathPhase> {
        if !self.is_active() || tick.run != self.run {
            return None;
        }
        self.phase = self.phase.toggled();
        Some(self.phase)
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }
}

impl Drop for BreathingTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
