//! Wavelet properties
//!
//! Center frequency and time/frequency resolution of a sampled wavelet,
//! measured on the same discrete grid the transform uses.

use ndarray::{Array1, ArrayView1};
use std::str::FromStr;

use super::errors::{CwtError, CwtResult};
use super::utils::FftPair;
use super::wavelets::{Wavelet, WaveletSpec};

/// Definition of "center frequency"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrequencyKind {
    /// Mean of `w` weighted by `|psih(w)|^2`
    #[default]
    Energy,
    /// `w` at which `|psih(w)|` peaks
    Peak,
}

impl FromStr for FrequencyKind {
    type Err = CwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "energy" => Ok(FrequencyKind::Energy),
            "peak" => Ok(FrequencyKind::Peak),
            _ => Err(CwtError::invalid(format!(
                "kind must be 'energy' or 'peak' (got '{}')",
                s
            ))),
        }
    }
}

fn check_args(scale: f64, n: usize) -> CwtResult<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CwtError::invalid(format!("scale must be > 0 (got {})", scale)));
    }
    if n < 2 {
        return Err(CwtError::invalid(format!("N must be >= 2 (got {})", n)));
    }
    Ok(())
}

/// Non-negative unit-scale frequencies and `|psih(scale * w)|^2` on them
fn positive_spectrum(psihfn: &Wavelet, scale: f64) -> (Array1<f64>, Array1<f64>) {
    let n = psihfn.n();
    let w = psihfn.xi().slice(ndarray::s![..=n / 2]).to_owned();
    let energy = psihfn.eval(&w.mapv(|v| v * scale).view()).mapv(|c| c.norm_sqr());
    (w, energy)
}

/// Weighted mean and standard deviation of `x` under weights `p`
fn weighted_moments(x: &ArrayView1<f64>, p: &ArrayView1<f64>) -> CwtResult<(f64, f64)> {
    let total = p.sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(CwtError::invalid("wavelet has zero energy on this grid"));
    }
    let mean = x.iter().zip(p.iter()).map(|(&x, &p)| x * p).sum::<f64>() / total;
    let var = x
        .iter()
        .zip(p.iter())
        .map(|(&x, &p)| (x - mean).powi(2) * p)
        .sum::<f64>()
        / total;
    Ok((mean, var.sqrt()))
}

/// Center frequency of the wavelet at `scale`, in radians per sample
///
/// # Arguments
/// * `wavelet` - Wavelet spec
/// * `scale` - Wavelet scale
/// * `n` - Grid length
/// * `kind` - `Energy` (weighted mean) or `Peak` (argmax)
pub fn center_frequency(
    wavelet: &WaveletSpec,
    scale: f64,
    n: usize,
    kind: FrequencyKind,
) -> CwtResult<f64> {
    check_args(scale, n)?;
    let psihfn = Wavelet::new(wavelet, n)?;
    let (w, energy) = positive_spectrum(&psihfn, scale);
    match kind {
        FrequencyKind::Energy => weighted_moments(&w.view(), &energy.view()).map(|(m, _)| m),
        FrequencyKind::Peak => {
            let (imax, peak) = energy
                .iter()
                .copied()
                .enumerate()
                .fold((0, 0.0), |acc, (i, v)| if v > acc.1 { (i, v) } else { acc });
            if peak <= 0.0 {
                return Err(CwtError::invalid("wavelet has zero energy on this grid"));
            }
            Ok(w[imax])
        }
    }
}

/// Frequency-domain standard deviation of the wavelet at `scale`
///
/// With `nondim`, divided by the energy center frequency.
pub fn freq_resolution(wavelet: &WaveletSpec, scale: f64, n: usize, nondim: bool) -> CwtResult<f64> {
    check_args(scale, n)?;
    let psihfn = Wavelet::new(wavelet, n)?;
    let (w, energy) = positive_spectrum(&psihfn, scale);
    let (center, std_w) = weighted_moments(&w.view(), &energy.view())?;
    Ok(if nondim { std_w / center } else { std_w })
}

/// Time-domain standard deviation of the wavelet at `scale`, in samples
///
/// The wavelet is brought to time with an inverse FFT and measured over
/// circular lags `[0, 1, ..., N/2, -(N/2 - 1), ..., -1]`. With `nondim`,
/// multiplied by the energy center frequency.
pub fn time_resolution(wavelet: &WaveletSpec, scale: f64, n: usize, nondim: bool) -> CwtResult<f64> {
    check_args(scale, n)?;
    let psihfn = Wavelet::new(wavelet, n)?;
    let psi = FftPair::new(n).ifft(psihfn.at_scale(scale));

    let t = Array1::from_shape_fn(n, |k| if k <= n / 2 { k as f64 } else { k as f64 - n as f64 });
    let (_, std_t) = weighted_moments(&t.view(), &psi.mapv(|c| c.norm_sqr()).view())?;
    if !nondim {
        return Ok(std_t);
    }
    let (w, energy) = positive_spectrum(&psihfn, scale);
    let (center, _) = weighted_moments(&w.view(), &energy.view())?;
    Ok(std_t * center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_morlet_center_frequency() {
        let spec = WaveletSpec::default();
        let peak = center_frequency(&spec, 10.0, 4096, FrequencyKind::Peak).unwrap();
        let energy = center_frequency(&spec, 10.0, 4096, FrequencyKind::Energy).unwrap();
        // bin width 2*pi/4096 ~ 1.5e-3
        assert_relative_eq!(peak, 0.6, max_relative = 5e-3);
        assert_relative_eq!(energy, 0.6, max_relative = 5e-3);
    }

    #[test]
    fn test_center_frequency_scales_inversely() {
        let spec = WaveletSpec::named("bump");
        let f4 = center_frequency(&spec, 4.0, 2048, FrequencyKind::Energy).unwrap();
        let f8 = center_frequency(&spec, 8.0, 2048, FrequencyKind::Energy).unwrap();
        assert_relative_eq!(f4 / f8, 2.0, max_relative = 1e-2);
    }

    #[test]
    fn test_morlet_heisenberg() {
        // gaussian envelope: std_w = 1 / (a * sqrt 2), std_t = a / sqrt 2
        let spec = WaveletSpec::default();
        let a = 10.0;
        let std_w = freq_resolution(&spec, a, 2048, false).unwrap();
        let std_t = time_resolution(&spec, a, 2048, false).unwrap();
        assert_relative_eq!(std_w, 1.0 / (a * 2f64.sqrt()), max_relative = 1e-2);
        assert_relative_eq!(std_t, a / 2f64.sqrt(), max_relative = 1e-2);
        assert_relative_eq!(std_w * std_t, 0.5, max_relative = 2e-2);
    }

    #[test]
    fn test_nondim_is_scale_invariant() {
        let spec = WaveletSpec::default();
        let t1 = time_resolution(&spec, 8.0, 2048, true).unwrap();
        let t2 = time_resolution(&spec, 16.0, 2048, true).unwrap();
        assert_relative_eq!(t1, t2, max_relative = 1e-2);
        let f1 = freq_resolution(&spec, 8.0, 2048, true).unwrap();
        let f2 = freq_resolution(&spec, 16.0, 2048, true).unwrap();
        assert_relative_eq!(f1, f2, max_relative = 1e-2);
    }

    #[test]
    fn test_invalid_args() {
        let spec = WaveletSpec::default();
        assert!(center_frequency(&spec, 0.0, 1024, FrequencyKind::Energy).is_err());
        assert!(freq_resolution(&spec, -1.0, 1024, false).is_err());
        assert!(time_resolution(&spec, 1.0, 1, false).is_err());
        assert!("median".parse::<FrequencyKind>().is_err());
    }

    #[test]
    fn test_zero_energy() {
        // bump with support far above Nyquist at this scale
        let spec = WaveletSpec::with_params("bump", &[("mu", 50.0), ("s", 1.0)]);
        let err = center_frequency(&spec, 1.0, 256, FrequencyKind::Energy).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
