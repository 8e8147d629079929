use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 20;

/// One timestamped observation from a successful poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub raw: Value,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64, raw: Value) -> Self {
        Self { timestamp, value, raw }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregate {
    pub last: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Bounded FIFO of samples. `len() <= capacity()` always holds.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl Default for SeriesBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SeriesBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        self.evict();
    }

    /// Zero is raised to one. Shrinking drops the oldest samples immediately.
    pub fn set_capacity(&mut self, n: usize) {
        self.capacity = n.max(1);
        self.evict();
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn aggregate(&self) -> Option<Aggregate> {
        let last = self.samples.back()?.value;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for s in &self.samples {
            if s.value < min {
                min = s.value;
            }
            if s.value > max {
                max = s.value;
            }
            sum += s.value;
        }
        Some(Aggregate {
            last,
            min,
            max,
            mean: sum / self.samples.len() as f64,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict(&mut self) {
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }
}
