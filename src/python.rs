use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::FentonKarmaError;

impl From<FentonKarmaError> for PyErr {
    fn from(err: FentonKarmaError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Python module exposing the 0D model: `Stimulation(t_start, duration, amplitude)` and
/// `FentonKarma0D(dt, stimulations)` with `step`, `run` and a `history` dict.
#[pymodule]
pub mod fenton_karma_rs {
    use std::collections::HashMap;

    use pyo3::prelude::*;

    use crate::compartment::FentonKarma0D;
    use crate::parameters::{default_parameters, Variable};
    use crate::stimulation::Stimulation;

    #[pyclass(name = "Stimulation", frozen)]
    pub struct PyStimulation {
        inner: Stimulation,
    }

    #[pymethods]
    impl PyStimulation {
        #[new]
        fn new(t_start: f64, duration: f64, amplitude: f64) -> Self {
            PyStimulation {
                inner: Stimulation::new(t_start, duration, amplitude),
            }
        }

        #[getter]
        fn t_start(&self) -> f64 {
            self.inner.t_start()
        }

        #[getter]
        fn duration(&self) -> f64 {
            self.inner.duration()
        }

        #[getter]
        fn amplitude(&self) -> f64 {
            self.inner.amplitude()
        }

        fn stim(&self, t: f64) -> f64 {
            self.inner.evaluate(t)
        }
    }

    #[pyclass(name = "FentonKarma0D")]
    pub struct PyFentonKarma0D {
        inner: FentonKarma0D,
    }

    #[pymethods]
    impl PyFentonKarma0D {
        #[new]
        #[pyo3(signature = (dt, stimulations, parameters = None))]
        fn new(
            dt: f64,
            stimulations: Vec<PyRef<'_, PyStimulation>>,
            parameters: Option<HashMap<String, f64>>,
        ) -> PyResult<Self> {
            let stimulations = stimulations.iter().map(|stim| stim.inner).collect();
            let mut model = FentonKarma0D::new(dt, stimulations)?;
            if let Some(overrides) = parameters {
                model = model.with_parameters(default_parameters().with_overrides(&overrides)?)?;
            }
            Ok(PyFentonKarma0D { inner: model })
        }

        #[getter]
        fn dt(&self) -> f64 {
            self.inner.dt()
        }

        #[getter]
        fn variables(&self) -> HashMap<&'static str, f64> {
            let state = self.inner.state();
            Variable::ALL
                .iter()
                .map(|&var| (var.name(), state.get(var)))
                .collect()
        }

        #[getter]
        fn parameters(&self) -> HashMap<&'static str, f64> {
            self.inner.parameters().iter().collect()
        }

        #[getter]
        fn history(&self) -> HashMap<&'static str, Vec<f64>> {
            let history = self.inner.history();
            Variable::ALL
                .iter()
                .map(|&var| (var.name(), history.get(var).to_vec()))
                .collect()
        }

        fn step(&mut self, i: usize) {
            self.inner.step(i);
        }

        fn run(&mut self, t_max: f64) -> PyResult<()> {
            Ok(self.inner.run(t_max)?)
        }

        fn reset(&mut self) {
            self.inner.reset();
        }
    }
}
