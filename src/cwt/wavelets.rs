//! Wavelet function generation
//!
//! Analytic wavelets defined directly in the Fourier domain, the FFT-bin
//! frequency grid they are sampled on, and the `Wavelet` sampler that binds
//! the two together.
//!
//! | Wavelet | Parameters (default)      |
//! |---------|---------------------------|
//! | morlet  | mu (6)                    |
//! | bump    | mu (5), s (1), om (0)     |
//! | cmhat   | mu (1), s (1)             |
//! | hhhat   | mu (5)                    |

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use super::errors::{CwtError, CwtResult};
use super::utils::apply_spectral_reversal;

/// pi^(-1/4)
const PI_POW_NEG_QUARTER: f64 = 0.751_125_544_464_942_5;
/// Normalizer of the bump wavelet
const BUMP_NORM: f64 = 0.443_993_816_053_287;
/// Half-width of the bump support, in units of `s`
const BUMP_SUPPORT: f64 = 0.999;

/// User-supplied Fourier-domain wavelet, `psih(w)` with `w = scale * xi`
#[derive(Clone)]
pub struct CustomWavelet {
    name: String,
    f: Arc<dyn Fn(f64) -> Complex64 + Send + Sync>,
}

impl CustomWavelet {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(f64) -> Complex64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomWavelet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomWavelet").field("name", &self.name).finish()
    }
}

/// Wavelet specification, as accepted by `cwt` / `icwt`
///
/// Either a builtin wavelet name with optional parameter overrides
/// (e.g. `("morlet", [("mu", 5.0)])`), or a custom function.
#[derive(Debug, Clone)]
pub enum WaveletSpec {
    Named {
        name: String,
        params: Vec<(String, f64)>,
    },
    Custom(CustomWavelet),
}

impl WaveletSpec {
    /// Builtin wavelet with default parameters
    pub fn named(name: impl Into<String>) -> Self {
        WaveletSpec::Named {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Builtin wavelet with parameter overrides
    pub fn with_params(name: impl Into<String>, params: &[(&str, f64)]) -> Self {
        WaveletSpec::Named {
            name: name.into(),
            params: params.iter().map(|&(k, v)| (k.to_string(), v)).collect(),
        }
    }

    pub fn custom<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(f64) -> Complex64 + Send + Sync + 'static,
    {
        WaveletSpec::Custom(CustomWavelet::new(name, f))
    }
}

impl Default for WaveletSpec {
    fn default() -> Self {
        WaveletSpec::named("morlet")
    }
}

impl From<&str> for WaveletSpec {
    fn from(name: &str) -> Self {
        WaveletSpec::named(name)
    }
}

/// A resolved wavelet: concrete family member with precomputed constants
#[derive(Debug, Clone)]
pub enum WaveletFn {
    Morlet { mu: f64, cs: f64, ks: f64 },
    Bump { mu: f64, s: f64, om: f64 },
    Cmhat { mu: f64, s: f64 },
    Hhhat { mu: f64 },
    Custom(CustomWavelet),
}

impl WaveletFn {
    /// Resolve a `WaveletSpec` once into a callable
    pub fn from_spec(spec: &WaveletSpec) -> CwtResult<Self> {
        let (name, params) = match spec {
            WaveletSpec::Custom(custom) => return Ok(WaveletFn::Custom(custom.clone())),
            WaveletSpec::Named { name, params } => (name.as_str(), params.as_slice()),
        };

        match name {
            "morlet" => {
                let [mu] = parse_params(name, params, [("mu", 6.0)])?;
                WaveletFn::morlet(mu)
            }
            "bump" => {
                let [mu, s, om] = parse_params(name, params, [("mu", 5.0), ("s", 1.0), ("om", 0.0)])?;
                WaveletFn::bump(mu, s, om)
            }
            "cmhat" => {
                let [mu, s] = parse_params(name, params, [("mu", 1.0), ("s", 1.0)])?;
                WaveletFn::cmhat(mu, s)
            }
            "hhhat" => {
                let [mu] = parse_params(name, params, [("mu", 5.0)])?;
                Ok(WaveletFn::Hhhat { mu })
            }
            _ => Err(CwtError::UnsupportedWavelet {
                name: name.to_string(),
            }),
        }
    }

    /// Morlet with DC-leakage correction, so it stays admissible for finite `mu`
    pub fn morlet(mu: f64) -> CwtResult<Self> {
        let cs = (1.0 + (-mu * mu).exp() - 2.0 * (-0.75 * mu * mu).exp()).powf(-0.5);
        if !cs.is_finite() {
            return Err(CwtError::invalid(format!("morlet: mu must be nonzero (got {})", mu)));
        }
        let ks = (-0.5 * mu * mu).exp();
        Ok(WaveletFn::Morlet { mu, cs, ks })
    }

    pub fn bump(mu: f64, s: f64, om: f64) -> CwtResult<Self> {
        if s <= 0.0 {
            return Err(CwtError::invalid(format!("bump: s must be > 0 (got {})", s)));
        }
        Ok(WaveletFn::Bump { mu, s, om })
    }

    pub fn cmhat(mu: f64, s: f64) -> CwtResult<Self> {
        if s <= 0.0 {
            return Err(CwtError::invalid(format!("cmhat: s must be > 0 (got {})", s)));
        }
        Ok(WaveletFn::Cmhat { mu, s })
    }

    pub fn name(&self) -> &str {
        match self {
            WaveletFn::Morlet { .. } => "morlet",
            WaveletFn::Bump { .. } => "bump",
            WaveletFn::Cmhat { .. } => "cmhat",
            WaveletFn::Hhhat { .. } => "hhhat",
            WaveletFn::Custom(custom) => custom.name(),
        }
    }

    /// Evaluate `psih(w)` at a single (already scaled) frequency
    #[inline]
    pub fn eval_scalar(&self, w: f64) -> Complex64 {
        match *self {
            WaveletFn::Morlet { mu, cs, ks } => {
                let v = (-0.5 * (mu - w).powi(2)).exp() - ks * (-0.5 * w * w).exp();
                Complex64::new(cs * PI_POW_NEG_QUARTER * v, 0.0)
            }
            WaveletFn::Bump { mu, s, om } => {
                let wt = (w - mu) / s;
                if wt.abs() < BUMP_SUPPORT {
                    let amp = (-1.0 / (1.0 - wt * wt)).exp() / (s * BUMP_NORM);
                    Complex64::from_polar(amp, 2.0 * PI * om * w)
                } else {
                    Complex64::new(0.0, 0.0)
                }
            }
            WaveletFn::Cmhat { mu, s } => {
                let wt = w - mu;
                if wt >= 0.0 {
                    let v = 2.0 * (2.0f64 / 3.0).sqrt()
                        * PI_POW_NEG_QUARTER
                        * s.powf(2.5)
                        * wt
                        * wt
                        * (-s * s * wt * wt / 2.0).exp();
                    Complex64::new(v, 0.0)
                } else {
                    Complex64::new(0.0, 0.0)
                }
            }
            WaveletFn::Hhhat { mu } => {
                let wt = w - mu;
                // 1 + sign(wt)
                let gate = if wt > 0.0 {
                    2.0
                } else if wt < 0.0 {
                    0.0
                } else {
                    1.0
                };
                let v = 2.0 / 5f64.sqrt()
                    * PI_POW_NEG_QUARTER
                    * wt
                    * (1.0 + wt)
                    * (-0.5 * wt * wt).exp()
                    * gate;
                Complex64::new(v, 0.0)
            }
            WaveletFn::Custom(ref custom) => (custom.f)(w),
        }
    }

    /// Vectorized evaluation over an array of scaled frequencies
    pub fn eval(&self, w: &ArrayView1<f64>) -> Array1<Complex64> {
        w.mapv(|w| self.eval_scalar(w))
    }
}

/// Match user parameters against the family's defaults
fn parse_params<const K: usize>(
    name: &str,
    params: &[(String, f64)],
    defaults: [(&str, f64); K],
) -> CwtResult<[f64; K]> {
    let mut values = defaults.map(|(_, v)| v);
    for (key, value) in params {
        let idx = defaults
            .iter()
            .position(|(k, _)| *k == key.as_str())
            .ok_or_else(|| {
                let allowed: Vec<&str> = defaults.iter().map(|(k, _)| *k).collect();
                CwtError::invalid(format!(
                    "{}: unknown parameter '{}' (expected one of: {})",
                    name,
                    key,
                    allowed.join(", ")
                ))
            })?;
        if !value.is_finite() {
            return Err(CwtError::invalid(format!(
                "{}: parameter '{}' must be finite (got {})",
                name, key, value
            )));
        }
        values[idx] = *value;
    }
    Ok(values)
}

/// FFT-bin angular frequencies, scaled by `scale`
///
/// ```text
/// N=128: [0, 1, 2, ..., 64, -63, -62, ..., -1] * (2*pi / N) * scale
/// N=129: [0, 1, 2, ..., 64, -64, -63, ..., -1] * (2*pi / N) * scale
/// ```
pub fn xi(scale: f64, n: usize) -> Array1<f64> {
    let h = scale * (2.0 * PI) / n as f64;
    Array1::from_shape_fn(n, |i| {
        if i <= n / 2 {
            i as f64 * h
        } else {
            (i as f64 - n as f64) * h
        }
    })
}

/// Fourier-domain wavelet sampler
///
/// Holds the resolved wavelet and the unit-scale frequency grid for a
/// default length `N`, so that `at_scale` only has to rescale.
///
/// # Example
/// ```
/// use rust_cwt::cwt::wavelets::{Wavelet, WaveletSpec};
///
/// let psihfn = Wavelet::new(&WaveletSpec::with_params("morlet", &[("mu", 7.0)]), 1024).unwrap();
/// let psih = psihfn.at_scale(8.0);
/// assert_eq!(psih.len(), 1024);
/// ```
#[derive(Debug, Clone)]
pub struct Wavelet {
    func: WaveletFn,
    xi: Array1<f64>,
}

impl Wavelet {
    pub const SUPPORTED: [&'static str; 4] = ["morlet", "bump", "cmhat", "hhhat"];

    pub fn new(spec: &WaveletSpec, n: usize) -> CwtResult<Self> {
        if n == 0 {
            return Err(CwtError::invalid("wavelet grid length N must be > 0"));
        }
        Ok(Self {
            func: WaveletFn::from_spec(spec)?,
            xi: xi(1.0, n),
        })
    }

    pub fn name(&self) -> &str {
        self.func.name()
    }

    pub fn func(&self) -> &WaveletFn {
        &self.func
    }

    /// Length of the cached grid
    pub fn n(&self) -> usize {
        self.xi.len()
    }

    /// Cached unit-scale frequency grid
    pub fn xi(&self) -> &Array1<f64> {
        &self.xi
    }

    /// `psih(w)` at explicit frequencies, bypassing the grid
    pub fn eval(&self, w: &ArrayView1<f64>) -> Array1<Complex64> {
        self.func.eval(w)
    }

    /// `psih(scale * xi)` on the cached grid
    pub fn at_scale(&self, scale: f64) -> Array1<Complex64> {
        self.xi.mapv(|x| self.func.eval_scalar(scale * x))
    }

    /// `psih(scale * xi)` on a grid of length `n`; regenerates the grid
    /// unless `n` matches the cached one.
    pub fn at_scale_n(&self, scale: f64, n: usize) -> Array1<Complex64> {
        if n == self.n() {
            return self.at_scale(scale);
        }
        self.func.eval(&xi(scale, n).view())
    }

    /// Sampled filter at `scale` and length `n`, spectrally reversed and
    /// L1 (unit gain) or L2 (`sqrt(scale)`) normalized
    pub fn filter(&self, scale: f64, n: usize, l1_norm: bool) -> Array1<Complex64> {
        let mut psih = self.at_scale_n(scale, n);
        if !l1_norm {
            let norm = scale.sqrt();
            psih.mapv_inplace(|c| c * norm);
        }
        apply_spectral_reversal(&mut psih);
        psih
    }
}

/// Discretized (sampled) wavelet in the Fourier domain, as used by the
/// convolution-theorem CWT
///
/// # Arguments
/// * `wavelet` - Wavelet spec
/// * `n` - Filter length; must be a power of 2
/// * `scale` - Wavelet scale
/// * `l1_norm` - L1 (true) or L2 (false) normalization
pub fn wfilth(wavelet: &WaveletSpec, n: usize, scale: f64, l1_norm: bool) -> CwtResult<Array1<Complex64>> {
    if !n.is_power_of_two() {
        return Err(CwtError::invalid(format!("N must be a power of 2 (got {})", n)));
    }
    Ok(Wavelet::new(wavelet, n)?.filter(scale, n, l1_norm))
}

/// `wfilth` plus the frequency-domain time-derivative filter `(i * xi / dt) * psih`
pub fn wfilth_with_derivative(
    wavelet: &WaveletSpec,
    n: usize,
    scale: f64,
    l1_norm: bool,
    dt: f64,
) -> CwtResult<(Array1<Complex64>, Array1<Complex64>)> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(CwtError::invalid(format!("dt must be > 0 (got {})", dt)));
    }
    let psih = wfilth(wavelet, n, scale, l1_norm)?;
    let dpsih = derivative_filter(&xi(1.0, n), &psih, dt);
    Ok((psih, dpsih))
}

/// `(i * xi / dt) * psih`, with `xi` at unit scale
pub fn derivative_filter(xi: &Array1<f64>, psih: &Array1<Complex64>, dt: f64) -> Array1<Complex64> {
    Array1::from_shape_fn(psih.len(), |k| Complex64::new(0.0, xi[k] / dt) * psih[k])
}
