use std::{sync::Weak, time::Duration};

use parking_lot::Mutex;
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

use super::engine::GameInner;

const TICK: Duration = Duration::from_secs(1);

/// Cancellable once-per-second turn timer.
///
/// Each arm bumps the generation, so a tick that races a re-arm sees a stale
/// generation and does nothing.
pub(crate) struct Countdown {
    runtime: Option<Handle>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl Countdown {
    pub(crate) fn new(runtime: Option<Handle>) -> Self {
        Self {
            runtime,
            task: None,
            generation: 0,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancel any running timer and start a fresh one against `game`.
    pub(crate) fn arm(&mut self, game: Weak<Mutex<GameInner>>) {
        self.disarm();
        let Some(runtime) = &self.runtime else {
            return;
        };
        let generation = self.generation;
        self.task = Some(runtime.spawn(run(game, generation)));
        debug!(generation, "Countdown armed");
    }

    /// Stop the timer for good. Later arms are no-ops.
    pub(crate) fn release(&mut self) {
        self.disarm();
        if self.runtime.take().is_some() {
            debug!("Countdown released");
        }
    }

    /// Stop the timer. Safe to call repeatedly.
    pub(crate) fn disarm(&mut self) {
        self.generation += 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.disarm();
    }
}

async fn run(game: Weak<Mutex<GameInner>>, generation: u64) {
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(game) = game.upgrade() else {
            return;
        };
        let live = game.lock().tick(generation);
        if !live {
            return;
        }
    }
}
