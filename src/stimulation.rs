use serde::{Deserialize, Serialize};

/// A rectangular current pulse injected into `u`.
/// Active on the half-open window `[t_start, t_start + duration)`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stimulation {
    t_start: f64,
    duration: f64,
    amplitude: f64,
}

impl Stimulation {
    pub fn new(t_start: f64, duration: f64, amplitude: f64) -> Stimulation {
        Stimulation {
            t_start,
            duration,
            amplitude,
        }
    }

    /// `count` identical pulses, the j-th starting at `t_start + j * period`
    pub fn periodic(
        t_start: f64,
        period: f64,
        count: usize,
        duration: f64,
        amplitude: f64,
    ) -> Vec<Stimulation> {
        (0..count)
            .map(|j| Stimulation::new(t_start + j as f64 * period, duration, amplitude))
            .collect()
    }

    pub fn t_start(&self) -> f64 {
        self.t_start
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn evaluate(&self, t: f64) -> f64 {
        if self.t_start <= t && t < self.t_start + self.duration {
            self.amplitude
        } else {
            0.0
        }
    }
}

/// Overlapping protocols simply add up
pub fn total_stimulus(stimulations: &[Stimulation], t: f64) -> f64 {
    stimulations.iter().map(|stim| stim.evaluate(t)).sum()
}
