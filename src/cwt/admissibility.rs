//! Admissibility constants
//!
//! Numerical integration of the wavelet over positive frequencies, for
//! rescaling the inverse transform.
//!
//! # References
//! - S. Mallat, Wavelet Tour of Signal Processing, 3rd ed., Eq. 4.67
//! - I. Daubechies, J. Lu, H.T. Wu, Synchrosqueezed Wavelet Transforms, Eq. 3

use num_complex::Complex64;
use std::str::FromStr;
use tracing::warn;

use super::errors::{CwtError, CwtResult};
use super::wavelets::{WaveletFn, WaveletSpec};

/// Which inverse formula the constant is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmKind {
    /// Two-integral inverse: `C_psi`
    Cwt,
    /// One-integral inverse: `R_psi`
    Ssq,
}

impl FromStr for AdmKind {
    type Err = CwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cwt" => Ok(AdmKind::Cwt),
            "ssq" => Ok(AdmKind::Ssq),
            _ => Err(CwtError::invalid(format!("kind must be 'cwt' or 'ssq' (got '{}')", s))),
        }
    }
}

/// Points per grid
const BASE_POINTS: usize = 10_000;
/// Integrand magnitude (relative to its peak) treated as zero
const NEGLECT_TH: f64 = 1e-15;
/// Split point between the log-spaced and linear grids
const W_SPLIT: f64 = 0.1;
/// Lower integration limit
const W_MIN: f64 = 1e-15;

/// `integral(conj(psih(w)) / w, w=0..inf)`
pub fn adm_ssq(wavelet: &WaveletFn) -> f64 {
    let c = integrate_analytic(|w| wavelet.eval_scalar(w).conj() / w);
    real_part(c, "adm_ssq")
}

/// `integral(|psih(w)|^2 / w, w=0..inf)`
pub fn adm_cwt(wavelet: &WaveletFn) -> f64 {
    let c = integrate_analytic(|w| Complex64::new(wavelet.eval_scalar(w).norm_sqr() / w, 0.0));
    real_part(c, "adm_cwt")
}

/// Admissibility constant of a wavelet spec
pub fn admissibility_constant(spec: &WaveletSpec, kind: AdmKind) -> CwtResult<f64> {
    let wavelet = WaveletFn::from_spec(spec)?;
    Ok(match kind {
        AdmKind::Cwt => adm_cwt(&wavelet),
        AdmKind::Ssq => adm_ssq(&wavelet),
    })
}

fn real_part(c: Complex64, what: &str) -> f64 {
    if c.im.abs() > 1e-15 && c.im.abs() > 1e-8 * c.re.abs() {
        warn!(re = c.re, im = c.im, "{}: complex admissibility constant, using real part", what);
    }
    c.re
}

/// Integrate a function that is zero for negative inputs and decays toward
/// +inf (e.g. an analytic wavelet), with the trapezoidal rule.
///
/// `[W_MIN, W_SPLIT]` is integrated on a log-spaced grid (handles `1/w`),
/// the rest on linear grids of growing extent until the integrand has
/// decayed over a sufficiently long tail.
fn integrate_analytic<F>(int_fn: F) -> Complex64
where
    F: Fn(f64) -> Complex64,
{
    let log_lo = W_MIN.log10();
    let log_hi = W_SPLIT.log10();
    let t_low: Vec<f64> = (0..BASE_POINTS)
        .map(|i| 10f64.powf(log_lo + (log_hi - log_lo) * i as f64 / (BASE_POINTS - 1) as f64))
        .collect();
    let y_low: Vec<Complex64> = t_low.iter().map(|&t| int_fn(t)).collect();
    let int_low = trapz(&y_low, &t_low);

    let limits = [(20.0, 1), (80.0, 4), (160.0, 8), (640.0, 16)];
    let mut result = None;
    for (i, &(mxlim, m)) in limits.iter().enumerate() {
        let n = BASE_POINTS * m;
        let t: Vec<f64> = (0..n)
            .map(|k| W_SPLIT + (mxlim - W_SPLIT) * k as f64 / (n - 1) as f64)
            .collect();
        let y: Vec<Complex64> = t.iter().map(|&t| int_fn(t)).collect();
        let converged = has_decayed(&y, 1000 * m);
        result = Some((y, t));
        if converged {
            break;
        }
        if i == limits.len() - 1 {
            warn!(mxlim, "integrand did not decay sufficiently; admissibility constant may be inaccurate");
        }
    }

    match result {
        Some((y, t)) => int_low + trapz(&y, &t),
        None => int_low,
    }
}

/// True if, past the integrand's peak, at least `min_tail` trailing samples
/// are negligible and the integrand isn't a flatline.
fn has_decayed(y: &[Complex64], min_tail: usize) -> bool {
    let mags: Vec<f64> = y.iter().map(|c| c.norm()).collect();
    let (max_idx, peak) = mags
        .iter()
        .copied()
        .enumerate()
        .fold((0, 0.0), |acc, (i, v)| if v > acc.1 { (i, v) } else { acc });
    if peak <= 0.0 || mags.iter().sum::<f64>() < 1e-5 {
        return false;
    }
    // last index past the peak that is still above threshold
    let last_significant = mags[max_idx..]
        .iter()
        .rposition(|&v| v >= NEGLECT_TH * peak)
        .map_or(max_idx, |i| i + max_idx);
    mags.len() - 1 - last_significant >= min_tail
}

fn trapz(y: &[Complex64], x: &[f64]) -> Complex64 {
    y.windows(2)
        .zip(x.windows(2))
        .map(|(yw, xw)| (yw[0] + yw[1]) * (0.5 * (xw[1] - xw[0])))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_trapz_linear() {
        let x: Vec<f64> = (0..=10).map(|i| i as f64 / 10.0).collect();
        let y: Vec<Complex64> = x.iter().map(|&v| Complex64::new(2.0 * v, v)).collect();
        let int = trapz(&y, &x);
        assert_relative_eq!(int.re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(int.im, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_morlet_adm_cwt() {
        // |psih|^2 ~ pi^(-1/2) exp(-(w - mu)^2); E[1/w] under N(mu, 1/2)
        let mu: f64 = 6.0;
        let expected = (1.0 + 0.5 / mu.powi(2) + 0.75 / mu.powi(4)) / mu;
        let c = adm_cwt(&WaveletFn::morlet(mu).unwrap());
        assert_relative_eq!(c, expected, max_relative = 1e-3);
    }

    #[test]
    fn test_morlet_adm_ssq() {
        // psih ~ pi^(-1/4) exp(-(w - mu)^2 / 2); E[1/w] under N(mu, 1)
        let mu: f64 = 6.0;
        let e_inv = (1.0 + 1.0 / mu.powi(2) + 3.0 / mu.powi(4) + 15.0 / mu.powi(6)) / mu;
        let expected = PI.powf(-0.25) * (2.0 * PI).sqrt() * e_inv;
        let c = adm_ssq(&WaveletFn::morlet(mu).unwrap());
        assert_relative_eq!(c, expected, max_relative = 1e-3);
    }

    #[test]
    fn test_constants_positive_for_builtins() {
        for name in ["morlet", "bump", "cmhat", "hhhat"] {
            let spec = WaveletSpec::named(name);
            let css = admissibility_constant(&spec, AdmKind::Ssq).unwrap();
            let cpsi = admissibility_constant(&spec, AdmKind::Cwt).unwrap();
            assert!(css > 0.0 && css.is_finite(), "{}: {}", name, css);
            assert!(cpsi > 0.0 && cpsi.is_finite(), "{}: {}", name, cpsi);
        }
    }

    #[test]
    fn test_unsupported_spec() {
        let spec = WaveletSpec::named("not_a_wavelet");
        assert!(admissibility_constant(&spec, AdmKind::Cwt).is_err());
    }

    #[test]
    fn test_has_decayed() {
        let y: Vec<Complex64> = (0..5000)
            .map(|i| Complex64::new((-((i as f64 - 100.0) / 10.0).powi(2)).exp(), 0.0))
            .collect();
        assert!(has_decayed(&y, 1000));
        let flat = vec![Complex64::new(1.0, 0.0); 5000];
        assert!(!has_decayed(&flat, 1000));
    }
}
