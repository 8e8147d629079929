//! Plain-text rendering of session snapshots and sampled functions.

use crate::sampler::PlotPoint;
use crate::session::{PollState, SessionSnapshot};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One block character per value, scaled between min and max.
pub fn sparkline(values: &[f64]) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|v| {
            if span <= 0.0 || !span.is_finite() {
                return BARS[BARS.len() / 2];
            }
            let idx = (((v - min) / span) * (BARS.len() - 1) as f64).round() as usize;
            BARS[idx.min(BARS.len() - 1)]
        })
        .collect()
}

pub fn status_line(snap: &SessionSnapshot) -> String {
    let state = match snap.state {
        PollState::Live => "LIVE",
        PollState::Paused => "PAUSED",
    };
    let stats = match snap.aggregate {
        Some(a) => format!(
            "last={:.4} min={:.4} max={:.4} mean={:.4}",
            a.last, a.min, a.max, a.mean
        ),
        None => "no data".to_string(),
    };
    let values: Vec<f64> = snap.samples.iter().map(|s| s.value).collect();
    let mut line = format!(
        "[{}] {}/{} {} {}",
        state,
        snap.samples.len(),
        snap.capacity,
        stats,
        sparkline(&values)
    );
    if let Some(err) = &snap.last_error {
        line.push_str(&format!(" error: {}", err));
    }
    line
}

/// Newest first, the way the dashboard table lists readings.
pub fn sample_table(snap: &SessionSnapshot) -> String {
    let mut out = String::from("time                      value\n");
    for s in snap.samples.iter().rev() {
        out.push_str(&format!(
            "{}  {:.4}\n",
            s.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            s.value
        ));
    }
    out
}

pub fn plot_table(points: &[PlotPoint]) -> String {
    let with_derivative = points.iter().any(|p| p.derivative.is_some());
    let cell = |v: Option<f64>| v.map(|v| format!("{:>12.6}", v)).unwrap_or_else(|| format!("{:>12}", "-"));
    let mut out = if with_derivative {
        format!("{:>12} {:>12} {:>12}\n", "x", "y", "dy/dx")
    } else {
        format!("{:>12} {:>12}\n", "x", "y")
    };
    for p in points {
        out.push_str(&format!("{:>12.6} {}", p.x, cell(p.y)));
        if with_derivative {
            out.push(' ');
            out.push_str(&cell(p.derivative));
        }
        out.push('\n');
    }
    out
}
