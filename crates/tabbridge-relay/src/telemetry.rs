//! Bounded telemetry buffers.
//!
//! The extension pushes network, console and performance records one-way;
//! the RPC-facing query layer reads them back. No correlation with command
//! records. Each category keeps at most its configured capacity, evicting
//! oldest-first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::RelayConfig;

/// Telemetry category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryKind {
    Network,
    Console,
    Performance,
}

impl TelemetryKind {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetryKind::Network => "network",
            TelemetryKind::Console => "console",
            TelemetryKind::Performance => "performance",
        }
    }
}

impl std::str::FromStr for TelemetryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "network" => Ok(TelemetryKind::Network),
            "console" => Ok(TelemetryKind::Console),
            "performance" => Ok(TelemetryKind::Performance),
            other => Err(format!("Unknown telemetry kind: {}", other)),
        }
    }
}

/// A single pushed telemetry record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    /// Originating tab, when the extension reports one.
    pub tab_id: Option<String>,
    /// Server-side arrival time.
    pub timestamp: DateTime<Utc>,
    /// Opaque payload.
    pub data: serde_json::Value,
}

/// Query over one telemetry category.
#[derive(Debug, Clone, Default)]
pub struct TelemetryQuery {
    /// Keep only records from this tab.
    pub tab_id: Option<String>,
    /// Keep only records whose serialized payload contains this substring.
    pub contains: Option<String>,
    /// Maximum number of records returned, taken from the most recent end.
    /// `None` returns everything that matched.
    pub limit: Option<usize>,
}

/// Fixed-capacity FIFO buffer.
struct Buffer {
    capacity: usize,
    entries: VecDeque<TelemetryRecord>,
}

impl Buffer {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    fn push(&mut self, record: TelemetryRecord) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(record);
    }
}

/// Per-category bounded telemetry storage.
pub struct TelemetryStore {
    network: RwLock<Buffer>,
    console: RwLock<Buffer>,
    performance: RwLock<Buffer>,
    last_update: RwLock<Option<DateTime<Utc>>>,
}

impl TelemetryStore {
    /// Create buffers with the configured capacities.
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            network: RwLock::new(Buffer::new(config.network_buffer_capacity)),
            console: RwLock::new(Buffer::new(config.console_buffer_capacity)),
            performance: RwLock::new(Buffer::new(config.performance_buffer_capacity)),
            last_update: RwLock::new(None),
        }
    }

    fn buffer(&self, kind: TelemetryKind) -> &RwLock<Buffer> {
        match kind {
            TelemetryKind::Network => &self.network,
            TelemetryKind::Console => &self.console,
            TelemetryKind::Performance => &self.performance,
        }
    }

    /// Append a record, evicting the oldest entry past capacity.
    pub async fn push(&self, kind: TelemetryKind, tab_id: Option<String>, data: serde_json::Value) {
        let record = TelemetryRecord {
            tab_id,
            timestamp: Utc::now(),
            data,
        };

        self.buffer(kind).write().await.push(record);
        *self.last_update.write().await = Some(Utc::now());
    }

    /// Filtered snapshot of one category, most recent `limit` entries.
    pub async fn query(&self, kind: TelemetryKind, query: &TelemetryQuery) -> Vec<TelemetryRecord> {
        let buffer = self.buffer(kind).read().await;

        let matched: Vec<&TelemetryRecord> = buffer
            .entries
            .iter()
            .filter(|record| match &query.tab_id {
                Some(tab) => record.tab_id.as_deref() == Some(tab.as_str()),
                None => true,
            })
            .filter(|record| match &query.contains {
                Some(needle) => record.data.to_string().contains(needle.as_str()),
                None => true,
            })
            .collect();

        let start = match query.limit {
            Some(limit) => matched.len().saturating_sub(limit),
            None => 0,
        };
        matched[start..].iter().map(|r| (*r).clone()).collect()
    }

    /// Number of records currently held in one category.
    pub async fn len(&self, kind: TelemetryKind) -> usize {
        self.buffer(kind).read().await.entries.len()
    }

    /// Capacity of one category.
    pub async fn capacity(&self, kind: TelemetryKind) -> usize {
        self.buffer(kind).read().await.capacity
    }

    /// Arrival time of the most recent push across all categories.
    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.read().await
    }
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
