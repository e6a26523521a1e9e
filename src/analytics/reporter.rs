//! Aggregation of the request log for `repair-ai stats`.

use std::collections::HashMap;
use std::path::Path;

use crate::analytics::logger::{self, RequestLogEntry};

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Stats {
    pub total_requests: usize,
    pub source_distribution: SourceDistribution,
    pub operation_stats: Vec<OperationStat>,
}

/// Per-operation aggregated statistics.
#[derive(Debug, Clone)]
pub struct OperationStat {
    pub operation: String,
    pub count: usize,
    pub live: usize,
    pub fallback: usize,
    pub demo: usize,
    pub unreachable: usize,
    /// Mean latency over successful live responses only; 0.0 when there were
    /// none.
    pub avg_live_latency_ms: f64,
}

/// Where results came from. A live attempt that failed without a fallback
/// (a refused or erroring health check) counts as `unreachable`.
#[derive(Debug, Default)]
pub struct SourceDistribution {
    pub live: usize,
    pub fallback: usize,
    pub demo: usize,
    pub unreachable: usize,
}

impl SourceDistribution {
    pub fn total(&self) -> usize {
        self.live + self.fallback + self.demo + self.unreachable
    }

    /// Percentage for a given count, 0.0 if total is zero.
    pub fn pct(&self, count: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (count as f64 / total as f64) * 100.0
        }
    }

    fn record(&mut self, entry: &RequestLogEntry) {
        match entry.source.as_str() {
            "live" if entry.success => self.live += 1,
            "live" => self.unreachable += 1,
            "demo" => self.demo += 1,
            _ => self.fallback += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Stats computation
// ---------------------------------------------------------------------------

/// Compute stats from the log at `path`, optionally limited to the last
/// `days` days.
pub fn compute_stats(path: &Path, days: Option<u32>) -> Stats {
    let entries = logger::read_entries_since_days(path, days);
    build_stats(&entries)
}

fn build_stats(entries: &[RequestLogEntry]) -> Stats {
    let mut source_distribution = SourceDistribution::default();
    let mut groups: HashMap<&str, Vec<&RequestLogEntry>> = HashMap::new();

    for entry in entries {
        source_distribution.record(entry);
        groups.entry(&entry.operation).or_default().push(entry);
    }

    let mut operation_stats: Vec<OperationStat> = groups
        .into_iter()
        .map(|(operation, group)| {
            let mut dist = SourceDistribution::default();
            for e in &group {
                dist.record(e);
            }

            let live_latencies: Vec<u64> = group
                .iter()
                .filter(|e| e.source == "live" && e.success)
                .map(|e| e.latency_ms)
                .collect();
            let avg_live_latency_ms = if live_latencies.is_empty() {
                0.0
            } else {
                live_latencies.iter().sum::<u64>() as f64 / live_latencies.len() as f64
            };

            OperationStat {
                operation: operation.to_string(),
                count: group.len(),
                live: dist.live,
                fallback: dist.fallback,
                demo: dist.demo,
                unreachable: dist.unreachable,
                avg_live_latency_ms,
            }
        })
        .collect();

    operation_stats.sort_by(|a, b| b.count.cmp(&a.count).then(a.operation.cmp(&b.operation)));

    Stats {
        total_requests: entries.len(),
        source_distribution,
        operation_stats,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries() -> Vec<RequestLogEntry> {
        vec![
            RequestLogEntry::new("ask", "live", true, 200),
            RequestLogEntry::new("ask", "live", true, 400),
            RequestLogEntry::new("ask", "fallback", false, 5).with_detail("connection refused"),
            RequestLogEntry::new("detect", "fallback", false, 7),
            RequestLogEntry::new("status", "demo", true, 0),
        ]
    }

    #[test]
    fn totals_and_distribution() {
        let stats = build_stats(&sample_entries());
        assert_eq!(stats.total_requests, 5);
        assert_eq!(stats.source_distribution.live, 2);
        assert_eq!(stats.source_distribution.fallback, 2);
        assert_eq!(stats.source_distribution.demo, 1);
        assert!((stats.source_distribution.pct(2) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn operations_sorted_by_count() {
        let stats = build_stats(&sample_entries());
        let names: Vec<&str> = stats
            .operation_stats
            .iter()
            .map(|s| s.operation.as_str())
            .collect();
        assert_eq!(names, vec!["ask", "detect", "status"]);
    }

    #[test]
    fn latency_averages_live_only() {
        let stats = build_stats(&sample_entries());
        let ask = &stats.operation_stats[0];
        assert_eq!(ask.count, 3);
        assert_eq!(ask.fallback, 1);
        assert!((ask.avg_live_latency_ms - 300.0).abs() < f64::EPSILON);

        let detect = &stats.operation_stats[1];
        assert_eq!(detect.avg_live_latency_ms, 0.0);
    }

    #[test]
    fn failed_health_checks_are_not_live() {
        let stats = build_stats(&[
            RequestLogEntry::new("status", "live", false, 10_000)
                .with_detail("Connection failed: timed out"),
            RequestLogEntry::new("status", "live", true, 20),
            RequestLogEntry::new("health", "live", false, 3),
        ]);

        assert_eq!(stats.source_distribution.live, 1);
        assert_eq!(stats.source_distribution.unreachable, 2);
        assert_eq!(stats.source_distribution.fallback, 0);

        let status = &stats.operation_stats[0];
        assert_eq!(status.operation, "status");
        assert_eq!((status.live, status.unreachable), (1, 1));
        assert!((status.avg_live_latency_ms - 20.0).abs() < f64::EPSILON);

        let health = &stats.operation_stats[1];
        assert_eq!(health.live, 0);
        assert_eq!(health.avg_live_latency_ms, 0.0);
    }

    #[test]
    fn empty_log() {
        let stats = build_stats(&[]);
        assert_eq!(stats.total_requests, 0);
        assert!(stats.operation_stats.is_empty());
        assert_eq!(stats.source_distribution.pct(0), 0.0);
    }
}
