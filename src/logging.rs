//! Structured JSONL logging for tooling and human-readable stderr output.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (~/.bench-teleport/logs/bench-teleport.jsonl) - structured for parsing
//! - **Pretty to stderr** - human-readable for developers
//!
//! # Usage
//!
//! ```rust,ignore
//! use bench_teleport::logging;
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init();
//! logging::set_debug(config.get_debug_log());
//!
//! // Use tracing macros directly
//! tracing::info!(event_type = "bench_event", scene = "Town_01", "Bench recorded");
//! ```
//!
//! # JSONL Output Format
//!
//! Each line is a valid JSON object:
//! ```json
//! {"timestamp":"2026-03-02T10:30:45.123Z","level":"INFO","target":"bench_teleport::teleport","fields":{"event_type":"teleport_event","phase":"arrived","scene":"Town_02"}}
//! ```

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

// =============================================================================
// In-memory log buffer for status display
// =============================================================================

static LOG_BUFFER: OnceLock<Mutex<VecDeque<String>>> = OnceLock::new();
const MAX_LOG_LINES: usize = 50;

const LOG_FILE_NAME: &str = "bench-teleport.jsonl";

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

fn env_filter(debug: bool) -> EnvFilter {
    let default_directive = if debug {
        "info,bench_teleport=debug"
    } else {
        "info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Initialize the dual-output logging system at the default `info` filter.
///
/// Call before loading config so loader warnings are captured, then apply
/// the configured level with [`set_debug`].
///
/// Returns a guard that MUST be kept alive for the duration of the program.
pub fn init() -> LoggingGuard {
    let _ = LOG_BUFFER.set(Mutex::new(VecDeque::with_capacity(MAX_LOG_LINES)));

    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);

    let (filter_layer, filter_handle) = reload::Layer::new(env_filter(false));

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path);

    // Without a log file the JSON layer is absent and stderr still works
    let (json_layer, file_guard) = match file {
        Ok(file) => {
            // Non-blocking so a slow disk never stalls the tick
            let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

            let json_layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE);
            (Some(json_layer), Some(file_guard))
        }
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file, logging to stderr only: {}", e);
            (None, None)
        }
    };

    let installed = tracing_subscriber::registry()
        .with(filter_layer)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .is_ok();
    if installed {
        let _ = FILTER_HANDLE.set(filter_handle);
    }

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Raise (or lower) this crate's default filter to `debug`. `RUST_LOG`
/// still wins when set. No-op before [`init`].
pub fn set_debug(debug: bool) {
    let Some(handle) = FILTER_HANDLE.get() else {
        return;
    };
    match handle.reload(env_filter(debug)) {
        Ok(()) => {
            // `debug` collides with `tracing::field::debug` inside the macro.
            let enabled = debug;
            tracing::debug!(debug = enabled, "Log filter updated")
        }
        Err(e) => eprintln!("[LOGGING] Failed to update log filter: {}", e),
    }
}

/// Get the log directory path (~/.bench-teleport/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".bench-teleport").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("bench-teleport-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

fn add_to_buffer(category: &str, message: &str) {
    if let Some(buffer) = LOG_BUFFER.get() {
        let mut buf = buffer.lock();
        if buf.len() >= MAX_LOG_LINES {
            buf.pop_front();
        }
        buf.push_back(format!("[{}] {}", category, message));
    }
}

/// Get recent log lines for status display
pub fn get_recent_logs() -> Vec<String> {
    LOG_BUFFER
        .get()
        .map(|buffer| buffer.lock().iter().cloned().collect())
        .unwrap_or_default()
}

/// Get the last N log lines, newest first
pub fn get_last_logs(n: usize) -> Vec<String> {
    LOG_BUFFER
        .get()
        .map(|buffer| buffer.lock().iter().rev().take(n).cloned().collect())
        .unwrap_or_default()
}

// =============================================================================
// STRUCTURED LOGGING HELPERS
// =============================================================================

/// Log a registry mutation (recorded, merged, removed, renamed, ...)
pub fn log_bench_event(action: &str, scene: &str, marker: &str, details: Option<&str>) {
    let msg = match details {
        Some(d) => format!("{} {}|{} - {}", action, scene, marker, d),
        None => format!("{} {}|{}", action, scene, marker),
    };
    add_to_buffer("BENCH", &msg);

    tracing::info!(
        event_type = "bench_event",
        action = action,
        scene = scene,
        marker = marker,
        details = details,
        "{}",
        msg
    );
}

/// Log a teleport state-machine milestone
pub fn log_teleport_event(phase: &str, scene: &str, details: Option<&str>) {
    let msg = match details {
        Some(d) => format!("{} {} - {}", phase, scene, d),
        None => format!("{} {}", phase, scene),
    };
    add_to_buffer("TELEPORT", &msg);

    tracing::info!(
        event_type = "teleport_event",
        phase = phase,
        scene = scene,
        details = details,
        "Teleport {}",
        msg
    );
}

/// Log a classified key gesture
pub fn log_input_event(channel: &str, gesture: &str) {
    tracing::debug!(
        event_type = "input_event",
        channel = channel,
        gesture = gesture,
        "Input {} {}",
        channel,
        gesture
    );
}

/// Log an error with structured fields and context
pub fn log_error(category: &str, error: &str, context: Option<&str>) {
    let msg = match context {
        Some(ctx) => format!("{}: {} (context: {})", category, error, ctx),
        None => format!("{}: {}", category, error),
    };
    add_to_buffer("ERROR", &msg);

    tracing::error!(
        event_type = "error",
        category = category,
        error_message = error,
        context = context,
        "{}",
        msg
    );
}
