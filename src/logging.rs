//! Structured logging for the polling dashboard.
//!
//! Every record is one JSON line on stderr (stdout belongs to the renderer).
//! When `LOG_DIR` is set, records are also appended to
//! `LOG_DIR/<run_id>/events.jsonl`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl Level {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_LEVEL").as_deref().unwrap_or("info"))
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "trace" => Level::Trace,
            "debug" => Level::Debug,
            "warn" => Level::Warn,
            "error" => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

// =============================================================================
// Log Domains (categories for filtering)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Poll,    // Fetch + extract outcomes
    Timer,   // Arm / disarm of the repeating tick
    Series,  // Buffer clears and capacity changes
    Config,  // Endpoint changes
    System,  // Startup, shutdown
    Profile, // Timing scopes
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Poll => "poll",
            Domain::Timer => "timer",
            Domain::Series => "series",
            Domain::Config => "config",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        domain_enabled(std::env::var("LOG_DOMAINS").ok().as_deref(), *self)
    }
}

fn domain_enabled(filter: Option<&str>, domain: Domain) -> bool {
    match filter {
        None | Some("all") => true,
        Some(domains) => domains.split(',').any(|d| d.trim() == domain.as_str()),
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

struct RunContext {
    run_id: String,
    sink: Option<RunSink>,
}

/// File sink for one run: `<base>/<run_id>/events.jsonl`.
pub struct RunSink {
    path: PathBuf,
    events: Mutex<BufWriter<File>>,
}

impl RunSink {
    pub fn open(base: &Path, run_id: &str) -> io::Result<Self> {
        let run_dir = base.join(run_id);
        create_dir_all(&run_dir)?;
        let path = run_dir.join("events.jsonl");
        let file = File::create(&path)?;
        Ok(Self {
            path,
            events: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_line(&self, line: &str) {
        if let Ok(mut w) = self.events.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let sink = std::env::var("LOG_DIR").ok().and_then(|base| {
            RunSink::open(Path::new(&base), &run_id)
                .map_err(|err| eprintln!("[log] failed to open run log under {}: {}", base, err))
                .ok()
        });
        RunContext { run_id, sink }
    })
}

fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["url", "path", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    let ctx = ensure_run_context();
    let line = render_record(&ctx.run_id, level, domain, event, fields);
    if let Some(sink) = &ctx.sink {
        sink.write_line(&line);
    }
    eprintln!("{}", line);
}

/// Build the JSON line for one record.
pub fn render_record(
    run_id: &str,
    level: Level,
    domain: Domain,
    event: &str,
    fields: Map<String, Value>,
) -> String {
    let (mut top, data) = split_fields(fields);
    let msg = top.remove("msg").unwrap_or(Value::String(String::new()));

    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(run_id));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry).to_string()
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_poll_ok(url: &str, path: &str, value: f64, retained: usize) {
    log(
        Level::Debug,
        Domain::Poll,
        "poll_ok",
        obj(&[
            ("url", v_str(url)),
            ("path", v_str(path)),
            ("value", v_num(value)),
            ("retained", json!(retained)),
        ]),
    );
}

pub fn log_poll_failed(url: &str, error: &str) {
    log(
        Level::Warn,
        Domain::Poll,
        "poll_failed",
        obj(&[("url", v_str(url)), ("msg", v_str(error))]),
    );
}

pub fn log_poll_discarded(url: &str, started_gen: u64, current_gen: u64) {
    log(
        Level::Info,
        Domain::Poll,
        "poll_discarded",
        obj(&[
            ("url", v_str(url)),
            ("started_generation", json!(started_gen)),
            ("current_generation", json!(current_gen)),
        ]),
    );
}

pub fn log_timer(event: &str, interval_ms: u64) {
    log(
        Level::Debug,
        Domain::Timer,
        event,
        obj(&[("interval_ms", json!(interval_ms))]),
    );
}

pub fn log_series(event: &str, capacity: usize, retained: usize) {
    log(
        Level::Info,
        Domain::Series,
        event,
        obj(&[("capacity", json!(capacity)), ("retained", json!(retained))]),
    );
}

pub fn log_endpoint_changed(url: &str, path: &str) {
    log(
        Level::Info,
        Domain::Config,
        "endpoint_changed",
        obj(&[("url", v_str(url)), ("path", v_str(path))]),
    );
}

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Emits elapsed time for a labelled scope on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self {
            label,
            context: obj(fields),
            started: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = std::mem::take(&mut self.context);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_level_parse_defaults_to_info() {
        assert_eq!(Level::parse("debug"), Level::Debug);
        assert_eq!(Level::parse("nonsense"), Level::Info);
    }

    #[test]
    fn test_domain_filter() {
        assert!(domain_enabled(None, Domain::Poll));
        assert!(domain_enabled(Some("all"), Domain::Timer));
        assert!(domain_enabled(Some("poll, timer"), Domain::Timer));
        assert!(!domain_enabled(Some("poll"), Domain::Series));
    }

    #[test]
    fn test_record_lifts_top_level_keys() {
        let line = render_record(
            "r-test",
            Level::Warn,
            Domain::Poll,
            "poll_failed",
            obj(&[("url", v_str("http://x")), ("msg", v_str("boom")), ("n", v_num(1.0))]),
        );
        let rec: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(rec["run_id"], "r-test");
        assert_eq!(rec["lvl"], "WARN");
        assert_eq!(rec["component"], "poll");
        assert_eq!(rec["url"], "http://x");
        assert_eq!(rec["msg"], "boom");
        assert_eq!(rec["data"]["n"], 1.0);
        assert!(rec["data"].get("url").is_none());
    }

    #[test]
    fn test_run_sink_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RunSink::open(dir.path(), "r-1").unwrap();
        sink.write_line("{\"a\":1}");
        sink.write_line("{\"a\":2}");
        let body = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(body.lines().count(), 2);
        assert!(sink.path().ends_with("r-1/events.jsonl"));
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }
}
