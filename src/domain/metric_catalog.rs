// Fixed catalog of simulated hardware metrics
use std::ops::RangeInclusive;

/// Signal model family a metric's simulated values follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricClass {
    Temperature,
    Load,
    Frequency,
    Network,
    FanSpeed,
    Other,
}

#[derive(Debug, Clone)]
pub struct MetricSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub class: MetricClass,
    /// Range the initial value is drawn from.
    pub seed: RangeInclusive<f64>,
    pub min: f64,
    pub max: f64,
}

const fn spec(
    id: &'static str,
    name: &'static str,
    unit: &'static str,
    class: MetricClass,
    seed: RangeInclusive<f64>,
    min: f64,
    max: f64,
) -> MetricSpec {
    MetricSpec {
        id,
        name,
        unit,
        class,
        seed,
        min,
        max,
    }
}

const TEMP_SEED: RangeInclusive<f64> = 45.0..=65.0;
const FREQ_SEED: RangeInclusive<f64> = 2.5..=4.0;
const NETWORK_SEED: RangeInclusive<f64> = 0.0..=50.0;
const DEFAULT_SEED: RangeInclusive<f64> = 20.0..=80.0;

pub static METRIC_CATALOG: [MetricSpec; 14] = [
    spec("cpu-temp", "CPU Temperature", "°C", MetricClass::Temperature, TEMP_SEED, 30.0, 85.0),
    spec("cpu-load", "CPU Load", "%", MetricClass::Load, DEFAULT_SEED, 0.0, 100.0),
    spec("cpu-freq", "CPU Frequency", "GHz", MetricClass::Frequency, FREQ_SEED, 1.5, 4.8),
    spec("gpu-temp", "GPU Temperature", "°C", MetricClass::Temperature, TEMP_SEED, 30.0, 85.0),
    spec("gpu-load", "GPU Load", "%", MetricClass::Load, DEFAULT_SEED, 0.0, 100.0),
    spec("gpu-freq", "GPU Frequency", "GHz", MetricClass::Frequency, FREQ_SEED, 1.5, 4.8),
    spec("ram-usage", "RAM Usage", "%", MetricClass::Other, DEFAULT_SEED, 0.0, 100.0),
    spec("vram-usage", "VRAM Usage", "%", MetricClass::Other, DEFAULT_SEED, 0.0, 100.0),
    spec("disk-usage", "Disk Usage", "%", MetricClass::Other, DEFAULT_SEED, 0.0, 100.0),
    spec("disk-temp", "Disk Temperature", "°C", MetricClass::Temperature, TEMP_SEED, 30.0, 85.0),
    spec("network-up", "Network Upload", "MB/s", MetricClass::Network, NETWORK_SEED, 0.0, 100.0),
    spec("network-down", "Network Download", "MB/s", MetricClass::Network, NETWORK_SEED, 0.0, 100.0),
    spec("fan-speed", "Fan Speed", "RPM", MetricClass::FanSpeed, 1200.0..=2000.0, 500.0, 3000.0),
    spec("power-draw", "Power Draw", "W", MetricClass::Other, 150.0..=250.0, 50.0, 350.0),
];

/// Temperature metrics a fan follows, in order of preference.
pub const FAN_PAIRED_TEMPERATURES: [&str; 2] = ["cpu-temp", "gpu-temp"];

pub fn find_spec(id: &str) -> Option<&'static MetricSpec> {
    METRIC_CATALOG.iter().find(|s| s.id == id)
}
