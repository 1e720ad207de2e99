//! Console output: throttled progress lines during the load phase and
//! the end-of-run summary. All output goes to stderr so the report
//! path on stdout stays scriptable.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::report::progress::{ProgressEvent, ProgressSink};
use crate::report::LoadResults;

/// Format a single progress line for display. Deterministic,
/// unit-testable.
#[must_use]
pub fn format_progress_line(done: usize, total: usize) -> String {
    format!("Iteration {}/{}...", done, total)
}

/// Minimum interval between progress updates to avoid log spam.
const PROGRESS_MIN_INTERVAL_MS: u64 = 200;

/// For large runs, emit at most every this many iterations (10% step).
pub(crate) fn progress_step(total: usize) -> usize {
    if total <= 10 {
        1
    } else {
        std::cmp::max(1, total / 10)
    }
}

/// Returns a progress sink that throttles updates and prints to stderr.
/// Skips runs of a single iteration. Always emits on done == total.
pub fn default_progress_sink(total: usize) -> Option<ProgressSink> {
    if total <= 1 {
        return None;
    }
    let step = progress_step(total);
    let state = Arc::new(Mutex::new(ThrottleState { last_emit: None }));
    Some(Arc::new(move |ev: ProgressEvent| {
        if ev.total == 0 {
            return;
        }
        let now = Instant::now();
        let should_emit = {
            let mut g = state.lock().expect("progress throttle lock");
            let emit_final = ev.done == ev.total;
            let emit_step = ev.done % step == 0 || ev.done == 1;
            let interval_ok = g
                .last_emit
                .map(|t| {
                    now.saturating_duration_since(t)
                        >= Duration::from_millis(PROGRESS_MIN_INTERVAL_MS)
                })
                .unwrap_or(true);
            let ok = emit_final || (emit_step && interval_ok);
            if ok {
                g.last_emit = Some(now);
            }
            ok
        };
        if should_emit {
            eprintln!("{}", format_progress_line(ev.done, ev.total));
        }
    }))
}

struct ThrottleState {
    last_emit: Option<Instant>,
}

/// End-of-run summary: check counts, pass rate, per-scenario mix,
/// latency spread.
pub fn print_summary(results: &LoadResults) {
    eprintln!();
    for (name, count) in &results.by_scenario {
        eprintln!("  {:<28} {:>6}", name, count);
    }
    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!(
        "Checks: {} passed, {} failed, {} error ({:.1}% pass rate)",
        results.passes,
        results.failures,
        results.errors,
        results.pass_rate * 100.0
    );
    eprintln!(
        "Latency ms: min={} p50={} p95={} max={}",
        results.latency_ms.min,
        results.latency_ms.p50,
        results.latency_ms.p95,
        results.latency_ms.max
    );
}

/// Seed footer, for reproducing a run's scenario draws.
pub fn print_run_footer(seed: u64) {
    eprintln!("Seed: {}", seed);
}
