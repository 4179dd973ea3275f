//! Event log reporter — request counts, failure rate, latency.
//!
//! Aggregates the JSONL event log for `codementor log`.

use std::collections::HashMap;
use std::path::Path;

use crate::catalog::Subject;
use crate::events::{self, EventEntry, EventKind};

/// Summary over a slice of the event log.
#[derive(Debug, Default)]
pub struct Summary {
    pub total_events: usize,
    pub requests: usize,
    pub failures: usize,
    pub storage_errors: usize,
    pub avg_latency_ms: Option<u64>,
    pub subjects: Vec<SubjectStat>,
    /// Most recent failures, newest first.
    pub recent_failures: Vec<EventEntry>,
}

impl Summary {
    /// Share of model calls that failed, as a percentage.
    pub fn failure_pct(&self) -> f64 {
        let calls = self.requests + self.failures;
        if calls == 0 {
            0.0
        } else {
            (self.failures as f64 / calls as f64) * 100.0
        }
    }
}

/// Per-subject request counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectStat {
    pub subject: Subject,
    pub requests: usize,
    pub failures: usize,
}

const RECENT_FAILURES: usize = 5;

/// Summarize the log at `path`, optionally limited to the last `days` days.
pub fn summarize(path: &Path, days: Option<u32>) -> Summary {
    let entries = events::read_entries_since_days(path, days);
    build_summary(&entries)
}

fn build_summary(entries: &[EventEntry]) -> Summary {
    let mut summary = Summary {
        total_events: entries.len(),
        ..Summary::default()
    };

    let mut latency_total: u64 = 0;
    let mut latency_count: u64 = 0;
    let mut per_subject: HashMap<Subject, (usize, usize)> = HashMap::new();

    for entry in entries {
        match entry.kind {
            EventKind::Request => {
                summary.requests += 1;
                if let Some(ms) = entry.latency_ms {
                    latency_total += ms;
                    latency_count += 1;
                }
                if let Some(subject) = entry.subject {
                    per_subject.entry(subject).or_default().0 += 1;
                }
            }
            EventKind::RequestFailed => {
                summary.failures += 1;
                if let Some(subject) = entry.subject {
                    per_subject.entry(subject).or_default().1 += 1;
                }
            }
            EventKind::Storage => summary.storage_errors += 1,
            _ => {}
        }
    }

    if latency_count > 0 {
        summary.avg_latency_ms = Some(latency_total / latency_count);
    }

    summary.subjects = Subject::ALL
        .iter()
        .filter_map(|subject| {
            per_subject
                .get(subject)
                .map(|&(requests, failures)| SubjectStat {
                    subject: *subject,
                    requests,
                    failures,
                })
        })
        .collect();

    summary.recent_failures = entries
        .iter()
        .rev()
        .filter(|e| e.kind == EventKind::RequestFailed)
        .take(RECENT_FAILURES)
        .cloned()
        .collect();

    summary
}
