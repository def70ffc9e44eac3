//! Metrics sink boundary.
//!
//! Core DB logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between execution logic
//! and the global metrics state.
use crate::obs::metrics::{self, EventReport};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Get,
    Put,
    Delete,
    Range,
    Contains,
    AddIndex,
    RemoveIndex,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent<'a> {
    ExecStart {
        kind: ExecKind,
        collection: &'a str,
    },
    ExecFinish {
        kind: ExecKind,
        collection: &'a str,
        rows_touched: u64,
    },
    RowsScanned {
        collection: &'a str,
        rows_scanned: u64,
    },
    IndexDelta {
        collection: &'a str,
        inserts: u64,
        removes: u64,
    },
    FanoutDelta {
        collection: &'a str,
        inserts: u64,
        removes: u64,
    },
    Backfill {
        collection: &'a str,
        rows: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::ExecStart { kind, collection } => {
                metrics::with_state_mut(|m| {
                    let ops = &mut m.ops;
                    let slot = match kind {
                        ExecKind::Get => &mut ops.get_calls,
                        ExecKind::Put => &mut ops.put_calls,
                        ExecKind::Delete => &mut ops.delete_calls,
                        ExecKind::Range => &mut ops.range_calls,
                        ExecKind::Contains => &mut ops.contains_calls,
                        ExecKind::AddIndex => &mut ops.add_index_calls,
                        ExecKind::RemoveIndex => &mut ops.remove_index_calls,
                    };
                    *slot = slot.saturating_add(1);

                    let entry = metrics::collection_mut(m, collection);
                    match kind {
                        ExecKind::Get => entry.get_calls = entry.get_calls.saturating_add(1),
                        ExecKind::Put => entry.put_calls = entry.put_calls.saturating_add(1),
                        ExecKind::Delete => {
                            entry.delete_calls = entry.delete_calls.saturating_add(1);
                        }
                        ExecKind::Range | ExecKind::Contains => {
                            entry.range_calls = entry.range_calls.saturating_add(1);
                        }
                        ExecKind::AddIndex | ExecKind::RemoveIndex => {}
                    }
                });
            }

            MetricsEvent::ExecFinish {
                kind,
                collection,
                rows_touched,
            } => {
                metrics::with_state_mut(|m| {
                    match kind {
                        ExecKind::Get | ExecKind::Range | ExecKind::Contains => {
                            m.ops.rows_loaded = m.ops.rows_loaded.saturating_add(rows_touched);
                            let entry = metrics::collection_mut(m, collection);
                            entry.rows_loaded = entry.rows_loaded.saturating_add(rows_touched);
                        }
                        ExecKind::Put => {
                            m.ops.rows_written = m.ops.rows_written.saturating_add(rows_touched);
                        }
                        ExecKind::Delete => {
                            m.ops.rows_deleted = m.ops.rows_deleted.saturating_add(rows_touched);
                        }
                        ExecKind::AddIndex | ExecKind::RemoveIndex => {}
                    }
                });
            }

            MetricsEvent::RowsScanned {
                collection,
                rows_scanned,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.rows_scanned = m.ops.rows_scanned.saturating_add(rows_scanned);
                    let entry = metrics::collection_mut(m, collection);
                    entry.rows_scanned = entry.rows_scanned.saturating_add(rows_scanned);
                });
            }

            MetricsEvent::IndexDelta {
                collection,
                inserts,
                removes,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.index_inserts = m.ops.index_inserts.saturating_add(inserts);
                    m.ops.index_removes = m.ops.index_removes.saturating_add(removes);
                    let entry = metrics::collection_mut(m, collection);
                    entry.index_inserts = entry.index_inserts.saturating_add(inserts);
                    entry.index_removes = entry.index_removes.saturating_add(removes);
                });
            }

            MetricsEvent::FanoutDelta {
                collection,
                inserts,
                removes,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.fanout_inserts = m.ops.fanout_inserts.saturating_add(inserts);
                    m.ops.fanout_removes = m.ops.fanout_removes.saturating_add(removes);
                    let entry = metrics::collection_mut(m, collection);
                    entry.fanout_inserts = entry.fanout_inserts.saturating_add(inserts);
                    entry.fanout_removes = entry.fanout_removes.saturating_add(removes);
                });
            }

            MetricsEvent::Backfill { rows, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.backfill_rows = m.ops.backfill_rows.saturating_add(rows);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous sink is restored on every exit path, including unwind.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

/// Span
/// RAII guard that emits start/finish metrics events for one engine call.
/// Ensures finish accounting happens even on early return.

pub(crate) struct Span<'a> {
    kind: ExecKind,
    collection: &'a str,
    rows: u64,
}

impl<'a> Span<'a> {
    #[must_use]
    /// Start a metrics span for a specific collection and operation kind.
    pub(crate) fn new(kind: ExecKind, collection: &'a str) -> Self {
        record(MetricsEvent::ExecStart { kind, collection });

        Self {
            kind,
            collection,
            rows: 0,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span<'_> {
    fn drop(&mut self) {
        record(MetricsEvent::ExecFinish {
            kind: self.kind,
            collection: self.collection,
            rows_touched: self.rows,
        });
    }
}

///
/// TESTS
///
