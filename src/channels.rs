///
/// The channels define the dynamics that take place within the cell.
/// Three phenomenological currents drive the potential `u`, two gates `v` and `w` recover it.
/// Based on: Fenton & Karma (1998), https://doi.org/10.1063/1.166311
///
/// Every threshold uses the same closed-above step: at exactly `u == u_c` the
/// above-threshold branch is taken and the below-threshold branch is not.
///

use crate::parameters::Parameters;

/// Unit step, 1 for x >= 0
#[inline]
pub fn heaviside(x: f64) -> f64 {
    if x >= 0.0 { 1.0 } else { 0.0 }
}

/// (below, above) weights for `u` against `u_c`; always one of (1, 0) or (0, 1)
#[inline]
fn regime(u: f64, u_c: f64) -> (f64, f64) {
    let above = heaviside(u - u_c);
    (1.0 - above, above)
}

/// Rate of change of `u` before stimulus injection
#[inline]
pub fn net_current(j_fi: f64, j_so: f64, j_si: f64) -> f64 {
    -(j_fi + j_so + j_si)
}

/// Rapid depolarization, zero below `u_c`
#[inline]
pub fn fast_inward_current(u: f64, v: f64, u_c: f64, tau_d: f64) -> f64 {
    -(v * heaviside(u - u_c) * (1.0 - u) * (u - u_c)) / tau_d
}

/// Linear repolarization below `u_c`, constant at or above it
#[inline]
pub fn slow_outward_current(u: f64, u_c: f64, tau_o: f64, tau_r: f64) -> f64 {
    let (below, above) = regime(u, u_c);
    u * below / tau_o + above / tau_r
}

/// Calcium-like plateau current with a smooth tanh activation
#[inline]
pub fn slow_inward_current(u: f64, w: f64, k: f64, uc_si: f64, tau_si: f64) -> f64 {
    -w * (1.0 + (k * (u - uc_si)).tanh()) / (2.0 * tau_si)
}

/// Gate relaxes towards 1 below threshold and decays towards 0 above it
#[inline]
fn gate_derivative(x: f64, u: f64, u_c: f64, tau_minus: f64, tau_plus: f64) -> f64 {
    let (below, above) = regime(u, u_c);
    below * (1.0 - x) / tau_minus - above * x / tau_plus
}

#[inline]
pub fn fast_gate_derivative(v: f64, u: f64, u_c: f64, tau_v_m: f64, tau_v_p: f64) -> f64 {
    gate_derivative(v, u, u_c, tau_v_m, tau_v_p)
}

#[inline]
pub fn slow_gate_derivative(w: f64, u: f64, u_c: f64, tau_w_m: f64, tau_w_p: f64) -> f64 {
    gate_derivative(w, u, u_c, tau_w_m, tau_w_p)
}

/// The three transmembrane currents at one instant
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Currents {
    pub fast_inward: f64,
    pub slow_outward: f64,
    pub slow_inward: f64,
}

impl Currents {
    pub fn compute(u: f64, v: f64, w: f64, p: &Parameters) -> Currents {
        Currents {
            fast_inward: fast_inward_current(u, v, p.u_c, p.tau_d),
            slow_outward: slow_outward_current(u, p.u_c, p.tau_o, p.tau_r),
            slow_inward: slow_inward_current(u, w, p.k, p.uc_si, p.tau_si),
        }
    }

    pub fn net(&self) -> f64 {
        net_current(self.fast_inward, self.slow_outward, self.slow_inward)
    }
}
