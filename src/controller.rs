//! Live/paused polling driven by a single repeating timer.
//!
//! Every poll runs in its own detached task. `start` spawns the first one
//! directly, then arms the timer one period later. The timer task waits for
//! each tick's poll, so ticks of one timer never overlap. Aborting the timer
//! drops that wait without cancelling the poll: an in-flight poll still
//! lands once, later ticks never fire.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::config::clamp_interval_ms;
use crate::logging;
use crate::session::{PollState, Session};

pub struct PollingController {
    session: Arc<Session>,
    interval_ms: u64,
    timer: Option<JoinHandle<()>>,
}

impl PollingController {
    pub fn new(session: Session, interval_ms: u64) -> Self {
        let interval_ms = clamp_interval_ms(interval_ms);
        session.set_interval_ms(interval_ms);
        Self {
            session: Arc::new(session),
            interval_ms,
            timer: None,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn state(&self) -> PollState {
        if self.timer.is_some() {
            PollState::Live
        } else {
            PollState::Paused
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Go live: poll now, then once per interval. No-op when already live.
    /// Must be called within a tokio runtime.
    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }
        spawn_poll(Arc::clone(&self.session));
        self.arm(Instant::now() + self.interval());
        self.session.set_poll_state(PollState::Live);
    }

    /// Pause. A poll already in flight still completes.
    pub fn stop(&mut self) {
        if self.disarm() {
            self.session.set_poll_state(PollState::Paused);
        }
    }

    pub fn toggle(&mut self) {
        match self.state() {
            PollState::Live => self.stop(),
            PollState::Paused => self.start(),
        }
    }

    /// Change the period. When live, the old timer is replaced and the next
    /// tick comes one full new period from now.
    pub fn set_interval(&mut self, ms: u64) {
        self.interval_ms = clamp_interval_ms(ms);
        self.session.set_interval_ms(self.interval_ms);
        if self.disarm() {
            self.arm(Instant::now() + self.interval());
        }
    }

    fn arm(&mut self, first_tick: Instant) {
        debug_assert!(self.timer.is_none());
        let ticker = interval_at(first_tick, self.interval());
        self.timer = Some(tokio::spawn(run_timer(Arc::clone(&self.session), ticker)));
        logging::log_timer("timer_armed", self.interval_ms);
    }

    fn disarm(&mut self) -> bool {
        match self.timer.take() {
            Some(handle) => {
                handle.abort();
                logging::log_timer("timer_disarmed", self.interval_ms);
                true
            }
            None => false,
        }
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }
}

/// Run one poll step detached from the caller. A panic inside the step is
/// recorded as the session's last error.
fn spawn_poll(session: Arc<Session>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let poll_session = Arc::clone(&session);
        let poll = tokio::spawn(async move { poll_session.poll_once().await });
        if let Err(err) = poll.await {
            session.record_failure(format!("poll task failed: {}", err));
        }
    })
}

async fn run_timer(session: Arc<Session>, mut ticker: Interval) {
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let _ = spawn_poll(Arc::clone(&session)).await;
    }
}
