//! Progress reporting for the load phase. The engine emits done/total
//! in completion order; the console layer consumes via a sink.

use std::sync::Arc;

/// One progress update: how many iterations are done and total count.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
}

/// Sink for progress events. The engine calls this each time an
/// iteration completes. Implementations may throttle.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
