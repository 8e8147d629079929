//! Dashboard session: the series, the last error and the endpoint settings,
//! shared between the controller's timer and whoever renders.
//!
//! Every mutation publishes a fresh [`SessionSnapshot`] on a watch channel.
//! The mutex is never held across an await.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

use crate::clock::Clock;
use crate::config::{clamp_capacity, validate_url, ConfigError, DashboardConfig};
use crate::extract::extract_number;
use crate::fetch::JsonFetcher;
use crate::logging::{self, v_str, ProfileScope};
use crate::series::{Aggregate, Sample, SeriesBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    Paused,
    Live,
}

/// What a single poll step did.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Appended { value: f64 },
    Failed { message: String },
    /// Endpoint changed while the fetch was in flight.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: PollState,
    pub samples: Vec<Sample>,
    pub aggregate: Option<Aggregate>,
    pub last_error: Option<String>,
    pub url: String,
    pub path: String,
    pub capacity: usize,
    pub interval_ms: u64,
    pub revision: u64,
}

struct SessionState {
    series: SeriesBuffer,
    last_error: Option<String>,
    url: String,
    path: String,
    generation: u64,
    poll_state: PollState,
    interval_ms: u64,
    revision: u64,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.poll_state,
            samples: self.series.snapshot(),
            aggregate: self.series.aggregate(),
            last_error: self.last_error.clone(),
            url: self.url.clone(),
            path: self.path.clone(),
            capacity: self.series.capacity(),
            interval_ms: self.interval_ms,
            revision: self.revision,
        }
    }
}

pub struct Session {
    fetcher: Arc<dyn JsonFetcher>,
    clock: Arc<dyn Clock>,
    inner: Mutex<SessionState>,
    updates: watch::Sender<SessionSnapshot>,
}

impl Session {
    pub fn new(cfg: &DashboardConfig, fetcher: Arc<dyn JsonFetcher>, clock: Arc<dyn Clock>) -> Self {
        let state = SessionState {
            series: SeriesBuffer::new(clamp_capacity(cfg.capacity)),
            last_error: None,
            url: cfg.url.clone(),
            path: cfg.path.clone(),
            generation: 0,
            poll_state: PollState::Paused,
            interval_ms: cfg.interval_ms,
            revision: 0,
        };
        let (updates, _) = watch::channel(state.snapshot());
        Self {
            fetcher,
            clock,
            inner: Mutex::new(state),
            updates,
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, state: &mut SessionState) {
        state.revision += 1;
        self.updates.send_replace(state.snapshot());
    }

    /// Receives a snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state().snapshot()
    }

    pub fn samples(&self) -> Vec<Sample> {
        self.state().series.snapshot()
    }

    pub fn aggregate(&self) -> Option<Aggregate> {
        self.state().series.aggregate()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    pub fn poll_state(&self) -> PollState {
        self.state().poll_state
    }

    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    pub fn endpoint(&self) -> (String, String) {
        let s = self.state();
        (s.url.clone(), s.path.clone())
    }

    /// Point the session at a new endpoint. Clears the series; polls still
    /// in flight for the old endpoint are discarded.
    pub fn set_endpoint(&self, url: &str, path: &str) -> Result<(), ConfigError> {
        let url = url.trim();
        validate_url(url)?;
        let mut s = self.state();
        s.url = url.to_string();
        s.path = path.to_string();
        s.last_error = None;
        s.series.clear();
        s.generation += 1;
        logging::log_endpoint_changed(url, path);
        self.publish(&mut s);
        Ok(())
    }

    /// Clamps into the user-facing range and returns the applied capacity.
    pub fn set_capacity(&self, n: usize) -> usize {
        let capacity = clamp_capacity(n);
        let mut s = self.state();
        s.series.set_capacity(capacity);
        logging::log_series("capacity_changed", capacity, s.series.len());
        self.publish(&mut s);
        capacity
    }

    /// Empties the series. A poll already in flight still lands.
    pub fn clear(&self) {
        let mut s = self.state();
        s.series.clear();
        logging::log_series("cleared", s.series.capacity(), 0);
        self.publish(&mut s);
    }

    pub(crate) fn set_poll_state(&self, poll_state: PollState) {
        let mut s = self.state();
        s.poll_state = poll_state;
        self.publish(&mut s);
    }

    pub(crate) fn set_interval_ms(&self, interval_ms: u64) {
        let mut s = self.state();
        s.interval_ms = interval_ms;
        self.publish(&mut s);
    }

    pub(crate) fn record_failure(&self, message: String) {
        let mut s = self.state();
        logging::log_poll_failed(&s.url, &message);
        s.last_error = Some(message);
        self.publish(&mut s);
    }

    /// Fetch, extract and append once. Never fails: errors land in
    /// `last_error`. URL, path and generation are captured up front.
    pub async fn poll_once(&self) -> PollOutcome {
        let (url, path, generation) = {
            let s = self.state();
            (s.url.clone(), s.path.clone(), s.generation)
        };
        let _scope = ProfileScope::with_context("poll_once", &[("url", v_str(&url))]);

        let result = self.fetcher.fetch(&url).await;

        let mut s = self.state();
        if s.generation != generation {
            logging::log_poll_discarded(&url, generation, s.generation);
            return PollOutcome::Discarded;
        }
        let outcome = match result {
            Ok(body) => {
                let value = extract_number(&body, &path);
                s.series.append(Sample::new(self.clock.now(), value, body));
                s.last_error = None;
                logging::log_poll_ok(&url, &path, value, s.series.len());
                PollOutcome::Appended { value }
            }
            Err(err) => {
                let message = err.to_string();
                logging::log_poll_failed(&url, &message);
                s.last_error = Some(message.clone());
                PollOutcome::Failed { message }
            }
        };
        self.publish(&mut s);
        outcome
    }
}
