// Telemetry data domain models
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of samples retained per metric.
pub const HISTORY_CAPACITY: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Unix time in milliseconds.
    pub timestamp: i64,
    pub value: f64,
}

impl DataPoint {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareMetric {
    pub id: String,
    pub name: String,
    pub current_value: f64,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub history: VecDeque<DataPoint>,
}

impl HardwareMetric {
    pub fn new(id: String, name: String, unit: String, min: f64, max: f64, initial: f64) -> Self {
        Self {
            id,
            name,
            current_value: initial.clamp(min, max),
            unit,
            min,
            max,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Clamp `value` into the metric's bounds, make it current and append it
    /// to the history, evicting the oldest samples past capacity.
    pub fn record(&mut self, timestamp: i64, value: f64) {
        let value = value.clamp(self.min, self.max);
        self.current_value = value;
        self.history.push_back(DataPoint::new(timestamp, value));
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
    }
}
