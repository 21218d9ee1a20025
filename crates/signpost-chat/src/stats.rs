//! In-process interaction statistics.
//!
//! Users are only ever stored as SHA-256 hashes of their id.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use sha2::{Digest, Sha256};
use tracing::warn;

use signpost_core::types::UserId;

use crate::metrics::MetricsCollector;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Users not seen for this long no longer count as active.
const ACTIVITY_WINDOW_HOURS: i64 = 24;

/// Minimum time between sweeps of stale activity entries.
const PRUNE_INTERVAL_MINUTES: i64 = 10;

/// Hash of a user id: SHA-256 over its 10-byte big-endian two's complement
/// encoding, hex encoded.
pub fn hash_user(user_id: UserId) -> String {
    let sign = if user_id < 0 { 0xff } else { 0x00 };
    let mut bytes = [sign; 10];
    bytes[2..].copy_from_slice(&user_id.to_be_bytes());
    hex::encode(Sha256::digest(bytes))
}

#[derive(Debug, Default)]
struct Counters {
    last_seen: HashMap<String, DateTime<Utc>>,
    interactions: HashMap<String, u64>,
    searches: u64,
    empty_searches: u64,
    last_reload: Option<(DateTime<Utc>, String)>,
    last_pruned: Option<DateTime<Utc>>,
}

impl Counters {
    fn touch(&mut self, user_id: UserId, at: DateTime<Utc>) {
        self.last_seen.insert(hash_user(user_id), at);
        let due = self
            .last_pruned
            .map_or(true, |pruned| at - pruned >= Duration::minutes(PRUNE_INTERVAL_MINUTES));
        if due {
            self.prune(at);
        }
    }

    /// Forget users last seen outside the activity window ending at `now`.
    fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::hours(ACTIVITY_WINDOW_HOURS);
        self.last_seen.retain(|_, seen| *seen > cutoff);
        self.last_pruned = Some(now);
    }
}

/// Point-in-time view of the statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    pub started_at: DateTime<Utc>,
    pub uptime: Duration,
    pub last_reload: Option<(DateTime<Utc>, String)>,
    pub active_1h: usize,
    pub active_3h: usize,
    pub active_24h: usize,
    pub searches: u64,
    pub empty_searches: u64,
    /// Most visited nodes, most visited first.
    pub top_nodes: Vec<(String, u64)>,
    /// Zone the start and reload times are shown in.
    pub timezone: Tz,
}

impl StatsReport {
    pub fn render(&self) -> String {
        let local = |at: &DateTime<Utc>| at.with_timezone(&self.timezone).format(DATETIME_FORMAT);
        let mut out = String::new();
        let _ = writeln!(out, "Start time: {}", local(&self.started_at));
        let _ = writeln!(out, "Uptime: {}", format_uptime(self.uptime));
        if let Some((at, who)) = &self.last_reload {
            let _ = writeln!(out, "Last conversation reload: {} ({})", local(at), who);
        }
        let _ = writeln!(out, "Total users:");
        let _ = writeln!(out, "\t- 1h: {}", self.active_1h);
        let _ = writeln!(out, "\t- 3h: {}", self.active_3h);
        let _ = writeln!(out, "\t- 24h: {}", self.active_24h);
        let _ = writeln!(out, "Searches: {} ({} without results)", self.searches, self.empty_searches);
        let _ = write!(out, "Top {} interactions:", self.top_nodes.len());
        for (node, count) in &self.top_nodes {
            let _ = write!(out, "\n\t- {}: {}", node, count);
        }
        out
    }
}

fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.num_seconds().max(0);
    let days = secs / 86_400;
    let rest = secs % 86_400;
    let hms = format!("{}:{:02}:{:02}", rest / 3600, (rest % 3600) / 60, rest % 60);
    match days {
        0 => hms,
        1 => format!("1 day, {}", hms),
        n => format!("{} days, {}", n, hms),
    }
}

/// Metrics collector keeping counters in memory.
#[derive(Debug)]
pub struct InteractionStats {
    started_at: DateTime<Utc>,
    top_nodes: usize,
    timezone: Tz,
    counters: Mutex<Counters>,
}

impl InteractionStats {
    pub fn new(top_nodes: usize) -> Self {
        Self::started_at(Utc::now(), top_nodes)
    }

    pub fn started_at(started_at: DateTime<Utc>, top_nodes: usize) -> Self {
        Self {
            started_at,
            top_nodes,
            timezone: Tz::UTC,
            counters: Mutex::new(Counters::default()),
        }
    }

    /// Show times in `timezone` instead of UTC.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Number of users currently remembered for the activity counts.
    pub fn tracked_users(&self) -> usize {
        self.counters.lock().map_or(0, |counters| counters.last_seen.len())
    }

    pub fn record_interaction_at(&self, user_id: UserId, node: &str, at: DateTime<Utc>) {
        let Ok(mut counters) = self.counters.lock() else {
            warn!("Statistics lock poisoned, dropping interaction");
            return;
        };
        counters.touch(user_id, at);
        *counters.interactions.entry(node.to_string()).or_insert(0) += 1;
    }

    pub fn reloaded_at(&self, reloader: &str, at: DateTime<Utc>) {
        if let Ok(mut counters) = self.counters.lock() {
            counters.last_reload = Some((at, reloader.to_string()));
        }
    }

    /// Statistics as of `now`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Option<StatsReport> {
        let mut counters = self.counters.lock().ok()?;
        counters.prune(now);

        let active_within = |window: Duration| {
            counters
                .last_seen
                .values()
                .filter(|seen| **seen > now - window)
                .count()
        };

        let mut top: Vec<(String, u64)> = counters
            .interactions
            .iter()
            .map(|(node, count)| (node.clone(), *count))
            .collect();
        top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top.truncate(self.top_nodes);

        Some(StatsReport {
            started_at: self.started_at,
            uptime: now - self.started_at,
            last_reload: counters.last_reload.clone(),
            active_1h: active_within(Duration::hours(1)),
            active_3h: active_within(Duration::hours(3)),
            active_24h: active_within(Duration::days(1)),
            searches: counters.searches,
            empty_searches: counters.empty_searches,
            top_nodes: top,
            timezone: self.timezone,
        })
    }
}

impl MetricsCollector for InteractionStats {
    fn record_interaction(&self, user_id: UserId, node: &str) {
        self.record_interaction_at(user_id, node, Utc::now());
    }

    fn record_search(&self, user_id: UserId, _query: &str, result_count: usize) {
        if let Ok(mut counters) = self.counters.lock() {
            counters.touch(user_id, Utc::now());
            counters.searches += 1;
            if result_count == 0 {
                counters.empty_searches += 1;
            }
        }
    }

    fn conversation_reloaded(&self, reloader: &str) {
        self.reloaded_at(reloader, Utc::now());
    }

    fn report(&self) -> Option<String> {
        self.snapshot(Utc::now()).map(|report| report.render())
    }
}
