// Synthetic signal models driving the simulated metrics
use super::metric_catalog::MetricClass;
use rand::Rng;
use std::f64::consts::TAU;

const NETWORK_BURST_PROBABILITY: f64 = 0.1;

/// Slow periodic drift: `amplitude * sin(2πt / period)`.
fn drift(t_secs: f64, period_secs: f64, amplitude: f64) -> f64 {
    amplitude * (TAU * t_secs / period_secs).sin()
}

fn noise<R: Rng>(rng: &mut R, half_width: f64) -> f64 {
    rng.random_range(-half_width..=half_width)
}

/// Change to apply to a metric of `class` at time `t_secs`.
///
/// `paired_temperature` is only consulted for fan speed: the current value of
/// the temperature the fan follows, if one exists.
pub fn delta<R: Rng>(
    class: MetricClass,
    t_secs: f64,
    paired_temperature: Option<f64>,
    rng: &mut R,
) -> f64 {
    match class {
        MetricClass::Temperature => drift(t_secs, 30.0, 3.0) + noise(rng, 1.0),
        MetricClass::Load => drift(t_secs, 10.0, 15.0) + noise(rng, 5.0),
        MetricClass::Frequency => drift(t_secs, 20.0, 0.5) + noise(rng, 0.1),
        MetricClass::Network => {
            if rng.random_bool(NETWORK_BURST_PROBABILITY) {
                rng.random_range(0.0..=30.0)
            } else {
                noise(rng, 2.5)
            }
        }
        MetricClass::FanSpeed => match paired_temperature {
            Some(temp) => 20.0 * (temp - 50.0) + noise(rng, 50.0),
            None => noise(rng, 100.0),
        },
        MetricClass::Other => noise(rng, 2.5),
    }
}
