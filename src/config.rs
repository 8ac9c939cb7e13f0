//! TOML description of a single run.
//!
//! ```toml
//! dt = 0.01
//! t_max = 400.0
//! range_check = "warn"
//!
//! [parameters]
//! tau_d = 0.25
//!
//! [initial_state]
//! u = 0.0
//!
//! [[stimulations]]
//! t_start = 0.1
//! duration = 0.2
//! amplitude = 1.0
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::compartment::{step_count, FentonKarma0D, RangeCheck, StateBounds};
use crate::error::Result;
use crate::parameters::{default_parameters, State};
use crate::stimulation::Stimulation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub dt: f64,
    pub t_max: f64,
    /// Overrides applied on top of the default parameter set
    pub parameters: HashMap<String, f64>,
    pub initial_state: State,
    pub stimulations: Vec<Stimulation>,
    pub range_check: RangeCheck,
    pub bounds: StateBounds,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            dt: 0.01,
            t_max: 400.0,
            parameters: HashMap::new(),
            initial_state: State::default(),
            stimulations: Vec::new(),
            range_check: RangeCheck::Off,
            bounds: StateBounds::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(contents: &str) -> Result<SimulationConfig> {
        let config: SimulationConfig = toml::from_str(contents)?;
        debug!(
            "Parsed config: dt = {}, t_max = {}, {} override(s), {} stimulation(s)",
            config.dt,
            config.t_max,
            config.parameters.len(),
            config.stimulations.len()
        );
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SimulationConfig> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validated model ready for `run(self.t_max)`. `t_max` is checked here as
    /// well so a bad config fails before any step runs.
    pub fn build(&self) -> Result<FentonKarma0D> {
        step_count(self.t_max, self.dt)?;
        let parameters = default_parameters().with_overrides(&self.parameters)?;
        FentonKarma0D::new(self.dt, self.stimulations.clone())?
            .with_parameters(parameters)?
            .with_initial_state(self.initial_state)?
            .with_range_check(self.range_check, self.bounds)
    }

    /// Builds and runs to `t_max`
    pub fn simulate(&self) -> Result<FentonKarma0D> {
        let mut model = self.build()?;
        model.run(self.t_max)?;
        Ok(model)
    }
}
