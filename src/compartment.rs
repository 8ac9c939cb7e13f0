use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::channels::{fast_gate_derivative, slow_gate_derivative, Currents};
use crate::error::{FentonKarmaError, Result};
use crate::parameters::{default_parameters, default_state, Parameters, State, Variable};
use crate::stimulation::{total_stimulus, Stimulation};

/// What `run` does when a state variable leaves its `StateBounds`
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeCheck {
    #[default]
    Off,
    Warn,
    Strict,
}

#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StateBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for StateBounds {
    fn default() -> Self {
        StateBounds { min: -0.1, max: 1.1 }
    }
}

impl StateBounds {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Recorded post-step values, one entry per completed step.
/// All three sequences always have the same length.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct History {
    u: Vec<f64>,
    v: Vec<f64>,
    w: Vec<f64>,
}

impl History {
    fn reserve(&mut self, additional: usize) {
        self.u.reserve(additional);
        self.v.reserve(additional);
        self.w.reserve(additional);
    }

    fn record(&mut self, state: &State) {
        self.u.push(state.u);
        self.v.push(state.v);
        self.w.push(state.w);
    }

    pub fn u(&self) -> &[f64] {
        &self.u
    }

    pub fn v(&self) -> &[f64] {
        &self.v
    }

    pub fn w(&self) -> &[f64] {
        &self.w
    }

    pub fn get(&self, variable: Variable) -> &[f64] {
        match variable {
            Variable::U => &self.u,
            Variable::V => &self.v,
            Variable::W => &self.w,
        }
    }

    pub fn len(&self) -> usize {
        self.u.len()
    }

    pub fn is_empty(&self) -> bool {
        self.u.is_empty()
    }

    fn times(&self, dt: f64) -> Vec<f64> {
        (0..self.len()).map(|i| i as f64 * dt).collect()
    }
}

/// Fenton-Karma model in 0D: a single cell with no diffusion.
///
/// Advanced with fixed-step explicit Euler. Within a step the gates move first,
/// driven by the old `u`; the potential then moves using the new gates.
#[derive(Debug, Clone)]
pub struct FentonKarma0D {
    dt: f64,
    parameters: Parameters,
    initial_state: State,
    state: State,
    stimulations: Vec<Stimulation>,
    history: History,
    range_check: RangeCheck,
    bounds: StateBounds,
    range_warnings: usize,
}

fn validate_dt(dt: f64) -> Result<()> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(FentonKarmaError::InvalidConfiguration(format!(
            "dt must be finite and > 0, got {}",
            dt
        )));
    }
    Ok(())
}

/// Upper bound on history entries reserved up front; longer runs grow as they go
const MAX_PREALLOCATED_STEPS: usize = 1 << 20;

/// Number of whole steps covering `t_max`, rounded to nearest
pub fn step_count(t_max: f64, dt: f64) -> Result<usize> {
    validate_dt(dt)?;
    if !t_max.is_finite() || t_max < 0.0 {
        return Err(FentonKarmaError::InvalidConfiguration(format!(
            "t_max must be finite and >= 0, got {}",
            t_max
        )));
    }
    let n_steps = (t_max / dt).round();
    if n_steps >= usize::MAX as f64 {
        return Err(FentonKarmaError::InvalidConfiguration(format!(
            "t_max / dt = {} steps does not fit in a step counter",
            n_steps
        )));
    }
    Ok(n_steps as usize)
}

impl FentonKarma0D {
    /// Default parameters, resting initial state
    pub fn new(dt: f64, stimulations: Vec<Stimulation>) -> Result<FentonKarma0D> {
        validate_dt(dt)?;
        debug!(
            "New 0D model: dt = {}, {} stimulation protocol(s)",
            dt,
            stimulations.len()
        );
        Ok(FentonKarma0D {
            dt,
            parameters: default_parameters(),
            initial_state: default_state(),
            state: default_state(),
            stimulations,
            history: History::default(),
            range_check: RangeCheck::Off,
            bounds: StateBounds::default(),
            range_warnings: 0,
        })
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Result<FentonKarma0D> {
        parameters.validate()?;
        self.parameters = parameters;
        Ok(self)
    }

    /// Also resets the current state and clears any history
    pub fn with_initial_state(mut self, initial_state: State) -> Result<FentonKarma0D> {
        initial_state.validate()?;
        self.initial_state = initial_state;
        self.reset();
        Ok(self)
    }

    pub fn with_range_check(
        mut self,
        range_check: RangeCheck,
        bounds: StateBounds,
    ) -> Result<FentonKarma0D> {
        if !(bounds.min.is_finite() && bounds.max.is_finite() && bounds.min <= bounds.max) {
            return Err(FentonKarmaError::InvalidConfiguration(format!(
                "state bounds must be finite with min <= max, got [{}, {}]",
                bounds.min, bounds.max
            )));
        }
        self.range_check = range_check;
        self.bounds = bounds;
        Ok(self)
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn stimulations(&self) -> &[Stimulation] {
        &self.stimulations
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Time axis `i * dt` matching each recorded history entry
    pub fn times(&self) -> Vec<f64> {
        self.history.times(self.dt)
    }

    /// Out-of-range values reported since the last reset (`RangeCheck::Warn` only)
    pub fn range_warnings(&self) -> usize {
        self.range_warnings
    }

    /// Back to the initial state with an empty history
    pub fn reset(&mut self) {
        self.state = self.initial_state;
        self.history = History::default();
        self.range_warnings = 0;
    }

    /// Advances the state by one `dt`. `i` is the step index; the stimulus is
    /// sampled at `i * dt`, the start of the step.
    pub fn step(&mut self, i: usize) {
        let p = &self.parameters;
        let dt = self.dt;
        let State { u, v, w } = self.state;

        // Gates from the pre-step u
        let v = v + dt * fast_gate_derivative(v, u, p.u_c, p.tau_v_m, p.tau_v_p);
        let w = w + dt * slow_gate_derivative(w, u, p.u_c, p.tau_w_m, p.tau_w_p);

        // Currents from the updated gates and the pre-step u
        let currents = Currents::compute(u, v, w, p);
        let stimulus = total_stimulus(&self.stimulations, i as f64 * dt);
        let u = u + dt * (currents.net() + stimulus);

        self.state = State { u, v, w };
    }

    /// Runs `round(t_max / dt)` steps, recording the post-step state after each.
    ///
    /// The step index restarts at 0 on every call; the history keeps growing.
    /// An invalid `t_max` is rejected before anything is recorded.
    pub fn run(&mut self, t_max: f64) -> Result<()> {
        let n_steps = step_count(t_max, self.dt)?;
        info!(
            "Running {} steps (dt = {}, t_max = {}, {} stimulation protocol(s))",
            n_steps,
            self.dt,
            t_max,
            self.stimulations.len()
        );

        self.history.reserve(n_steps.min(MAX_PREALLOCATED_STEPS));

        for i in 0..n_steps {
            self.step(i);
            self.history.record(&self.state);
            self.check_range(i)?;
        }

        match self.history.u().iter().copied().minmax().into_option() {
            Some((trough, peak)) => info!(
                "Run complete: {} entries recorded, u in [{:.4}, {:.4}]",
                self.history.len(),
                trough,
                peak
            ),
            None => info!("Run complete: nothing recorded"),
        }
        Ok(())
    }

    fn check_range(&mut self, step: usize) -> Result<()> {
        if self.range_check == RangeCheck::Off {
            return Ok(());
        }
        for variable in Variable::ALL {
            let value = self.state.get(variable);
            if self.bounds.contains(value) {
                continue;
            }
            match self.range_check {
                RangeCheck::Strict => {
                    return Err(FentonKarmaError::OutOfRangeState {
                        variable,
                        value,
                        step,
                    });
                }
                _ => {
                    self.range_warnings += 1;
                    warn!(
                        "{} = {} outside [{}, {}] at step {}",
                        variable, value, self.bounds.min, self.bounds.max, step
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{
        fast_inward_current, net_current, slow_inward_current, slow_outward_current,
    };

    #[test]
    fn test_rejects_bad_dt() {
        for dt in [0.0, -0.01, f64::NAN, f64::INFINITY] {
            let result = FentonKarma0D::new(dt, Vec::new());
            assert!(
                matches!(result, Err(FentonKarmaError::InvalidConfiguration(_))),
                "dt = {}",
                dt
            );
        }
    }

    #[test]
    fn test_rejects_bad_t_max_without_recording() {
        let mut model = FentonKarma0D::new(0.01, Vec::new()).unwrap();
        assert!(model.run(-1.0).is_err());
        assert!(model.run(f64::NAN).is_err());
        assert!(model.history().is_empty());
    }

    #[test]
    fn test_step_count_rounds_to_nearest() {
        assert_eq!(step_count(1.0, 0.01).unwrap(), 100);
        assert_eq!(step_count(0.014, 0.01).unwrap(), 1);
        assert_eq!(step_count(0.016, 0.01).unwrap(), 2);
        assert_eq!(step_count(0.0, 0.01).unwrap(), 0);
    }

    #[test]
    fn test_step_count_rejects_overflowing_runs() {
        assert!(matches!(
            step_count(1e300, 0.01),
            Err(FentonKarmaError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            step_count(1.0, 1e-320),
            Err(FentonKarmaError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_huge_t_max_is_a_configuration_error() {
        let mut model = FentonKarma0D::new(0.01, Vec::new()).unwrap();
        let result = model.run(1e20);
        assert!(matches!(result, Err(FentonKarmaError::InvalidConfiguration(_))));
        assert!(model.history().is_empty());
    }

    #[test]
    fn test_step_updates_gates_before_potential() {
        let p = default_parameters();
        let dt = 0.01;
        let start = State { u: 0.5, v: 0.8, w: 0.9 };
        let mut model = FentonKarma0D::new(dt, Vec::new())
            .unwrap()
            .with_initial_state(start)
            .unwrap();
        model.step(0);

        let v = start.v + dt * fast_gate_derivative(start.v, start.u, p.u_c, p.tau_v_m, p.tau_v_p);
        let w = start.w + dt * slow_gate_derivative(start.w, start.u, p.u_c, p.tau_w_m, p.tau_w_p);
        let j_fi = fast_inward_current(start.u, v, p.u_c, p.tau_d);
        let j_so = slow_outward_current(start.u, p.u_c, p.tau_o, p.tau_r);
        let j_si = slow_inward_current(start.u, w, p.k, p.uc_si, p.tau_si);
        let u = start.u + dt * net_current(j_fi, j_so, j_si);

        assert_eq!(model.state().v, v);
        assert_eq!(model.state().w, w);
        assert_eq!(model.state().u, u);
    }

    #[test]
    fn test_stimulus_sampled_at_step_start() {
        let dt = 0.5;
        // Active on [0.5, 1.0): hit by step 1 only
        let stim = Stimulation::new(0.5, 0.5, 1.0);
        let mut model = FentonKarma0D::new(dt, vec![stim]).unwrap();

        model.step(0);
        assert!(model.state().u.abs() < 1e-6);
        model.step(1);
        assert!(model.state().u > 0.4);
    }

    #[test]
    fn test_run_records_one_entry_per_step() {
        let mut model = FentonKarma0D::new(0.01, vec![Stimulation::new(0.0, 0.2, 1.0)]).unwrap();
        model.run(1.0).unwrap();
        let history = model.history();
        assert_eq!(history.len(), 100);
        for variable in Variable::ALL {
            assert_eq!(history.get(variable).len(), 100);
        }
        assert_eq!(history.u().last().copied(), Some(model.state().u));
        let times = model.times();
        assert_eq!(times.len(), 100);
        assert_eq!(times[0], 0.0);
        assert!((times[99] - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_run_appends_and_reset_clears() {
        let mut model = FentonKarma0D::new(0.1, Vec::new()).unwrap();
        model.run(1.0).unwrap();
        model.run(0.5).unwrap();
        assert_eq!(model.history().len(), 15);

        model.reset();
        assert!(model.history().is_empty());
        assert_eq!(*model.state(), default_state());
    }

    #[test]
    fn test_with_parameters_validates() {
        let mut bad = default_parameters();
        bad.tau_d = -1.0;
        let result = FentonKarma0D::new(0.01, Vec::new()).unwrap().with_parameters(bad);
        assert!(result.is_err());
    }

    #[test]
    fn test_strict_range_check_aborts() {
        let start = State { u: 1.5, v: 1.0, w: 1.0 };
        let mut model = FentonKarma0D::new(0.01, Vec::new())
            .unwrap()
            .with_initial_state(start)
            .unwrap()
            .with_range_check(RangeCheck::Strict, StateBounds::default())
            .unwrap();
        let err = model.run(1.0).unwrap_err();
        assert!(matches!(
            err,
            FentonKarmaError::OutOfRangeState { variable: Variable::U, step: 0, .. }
        ));
    }

    #[test]
    fn test_warn_range_check_keeps_running() {
        let start = State { u: 1.5, v: 1.0, w: 1.0 };
        let mut model = FentonKarma0D::new(0.01, Vec::new())
            .unwrap()
            .with_initial_state(start)
            .unwrap()
            .with_range_check(RangeCheck::Warn, StateBounds::default())
            .unwrap();
        model.run(1.0).unwrap();
        assert_eq!(model.history().len(), 100);

        // u starts above 1.1 and is pulled back towards 1 within a few steps
        let warnings = model.range_warnings();
        assert!(warnings >= 1 && warnings < 100, "warnings = {}", warnings);
        assert!(StateBounds::default().contains(model.state().u));

        model.reset();
        assert_eq!(model.range_warnings(), 0);
    }

    #[test]
    fn test_off_range_check_reports_nothing() {
        let start = State { u: 1.5, v: 1.0, w: 1.0 };
        let mut model = FentonKarma0D::new(0.01, Vec::new())
            .unwrap()
            .with_initial_state(start)
            .unwrap();
        model.run(1.0).unwrap();
        assert_eq!(model.range_warnings(), 0);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let bounds = StateBounds { min: 1.0, max: 0.0 };
        let result = FentonKarma0D::new(0.01, Vec::new())
            .unwrap()
            .with_range_check(RangeCheck::Warn, bounds);
        assert!(result.is_err());
    }
}
