///
/// Parameter set and state vector of the Fenton-Karma model.
/// Defaults are the MLR-I fit from Fenton & Karma (1998), https://doi.org/10.1063/1.166311
///

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FentonKarmaError, Result};

/// One of the three recorded state variables
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    /// Membrane potential
    U,
    /// Fast recovery gate
    V,
    /// Slow recovery gate
    W,
}

impl Variable {
    pub const ALL: [Variable; 3] = [Variable::U, Variable::V, Variable::W];

    pub fn name(self) -> &'static str {
        match self {
            Variable::U => "u",
            Variable::V => "v",
            Variable::W => "w",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Suprathreshold repolarization time constant
    pub tau_r: f64,
    /// Subthreshold repolarization time constant
    pub tau_o: f64,
    /// Depolarization time constant
    pub tau_d: f64,
    /// Slow inward time constant
    pub tau_si: f64,
    pub tau_v_m: f64,
    pub tau_v_p: f64,
    pub tau_w_m: f64,
    pub tau_w_p: f64,
    /// Steepness of the slow inward activation
    pub k: f64,
    /// Excitation threshold shared by the fast inward current, slow outward current and both gates
    pub u_c: f64,
    /// Activation midpoint of the slow inward current
    pub uc_si: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        default_parameters()
    }
}

pub fn default_parameters() -> Parameters {
    Parameters {
        tau_r: 130.0,
        tau_o: 12.5,
        tau_d: 0.172,
        tau_si: 127.0,
        tau_v_m: 18.2,
        tau_v_p: 10.0,
        tau_w_m: 80.0,
        tau_w_p: 1020.0,
        k: 10.0,
        u_c: 0.13,
        uc_si: 0.85,
    }
}

impl Parameters {
    pub const NAMES: [&'static str; 11] = [
        "tau_r", "tau_o", "tau_d", "tau_si", "tau_v_m", "tau_v_p", "tau_w_m", "tau_w_p", "k",
        "u_c", "uc_si",
    ];

    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "tau_r" => self.tau_r,
            "tau_o" => self.tau_o,
            "tau_d" => self.tau_d,
            "tau_si" => self.tau_si,
            "tau_v_m" => self.tau_v_m,
            "tau_v_p" => self.tau_v_p,
            "tau_w_m" => self.tau_w_m,
            "tau_w_p" => self.tau_w_p,
            "k" => self.k,
            "u_c" => self.u_c,
            "uc_si" => self.uc_si,
            _ => return None,
        };
        Some(value)
    }

    fn slot(&mut self, name: &str) -> Option<&mut f64> {
        let slot = match name {
            "tau_r" => &mut self.tau_r,
            "tau_o" => &mut self.tau_o,
            "tau_d" => &mut self.tau_d,
            "tau_si" => &mut self.tau_si,
            "tau_v_m" => &mut self.tau_v_m,
            "tau_v_p" => &mut self.tau_v_p,
            "tau_w_m" => &mut self.tau_w_m,
            "tau_w_p" => &mut self.tau_w_p,
            "k" => &mut self.k,
            "u_c" => &mut self.u_c,
            "uc_si" => &mut self.uc_si,
            _ => return None,
        };
        Some(slot)
    }

    /// (name, value) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        Self::NAMES.iter().filter_map(move |&name| self.get(name).map(|value| (name, value)))
    }

    /// Builds a full parameter set from a plain mapping. Every key in `NAMES` is required.
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Parameters> {
        let missing: Vec<&str> = Self::NAMES
            .iter()
            .copied()
            .filter(|name| !map.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(FentonKarmaError::InvalidConfiguration(format!(
                "missing parameters: {}",
                missing.join(", ")
            )));
        }
        default_parameters().with_overrides(map)
    }

    /// Replaces only the given keys, leaving the rest untouched
    pub fn with_overrides(mut self, overrides: &HashMap<String, f64>) -> Result<Parameters> {
        for (name, value) in overrides {
            let slot = self.slot(name).ok_or_else(|| {
                FentonKarmaError::InvalidConfiguration(format!("unknown parameter: {}", name))
            })?;
            *slot = *value;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let time_constants = [
            ("tau_r", self.tau_r),
            ("tau_o", self.tau_o),
            ("tau_d", self.tau_d),
            ("tau_si", self.tau_si),
            ("tau_v_m", self.tau_v_m),
            ("tau_v_p", self.tau_v_p),
            ("tau_w_m", self.tau_w_m),
            ("tau_w_p", self.tau_w_p),
        ];
        for (name, value) in time_constants {
            if !value.is_finite() || value <= 0.0 {
                return Err(FentonKarmaError::InvalidConfiguration(format!(
                    "{} must be a finite positive time constant, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [("k", self.k), ("u_c", self.u_c), ("uc_si", self.uc_si)] {
            if !value.is_finite() {
                return Err(FentonKarmaError::InvalidConfiguration(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct State {
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

impl Default for State {
    fn default() -> Self {
        default_state()
    }
}

/// Resting state: u=0 with both gates fully recovered
pub fn default_state() -> State {
    State {
        u: 0.0,
        v: 1.0,
        w: 1.0,
    }
}

impl State {
    pub fn get(&self, variable: Variable) -> f64 {
        match variable {
            Variable::U => self.u,
            Variable::V => self.v,
            Variable::W => self.w,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for variable in Variable::ALL {
            let value = self.get(variable);
            if !value.is_finite() {
                return Err(FentonKarmaError::InvalidConfiguration(format!(
                    "initial {} must be finite, got {}",
                    variable, value
                )));
            }
        }
        Ok(())
    }
}
