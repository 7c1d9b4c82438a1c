//! Core CWT algorithm implementation
//!
//! Forward continuous wavelet transform via the convolution theorem: the
//! wavelet is sampled directly in the Fourier domain and multiplied with the
//! FFT of the padded input. Also returns the time-derivative of the
//! transform, computed by frequency-domain differentiation.
//!
//! # References
//! - S. Mallat, Wavelet Tour of Signal Processing, 3rd ed., Sec. 4.3.3
//! - G. Thakur, E. Brevdo, N.-S. Fučkar, H.-T. Wu, The Synchrosqueezing
//!   algorithm for time-varying spectral analysis, Sec. IIIA-B

use ndarray::{s, Array1, Array2, ArrayView1};
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::errors::{CwtError, CwtResult};
use super::options::CwtOptions;
use super::scales::{process_scales, ScaleSpec, Scales, DEFAULT_NV};
use super::utils::{ifftshift, padsignal, replace_at_inf_or_nan, FftPair};
use super::wavelets::{derivative_filter, Wavelet, WaveletSpec};

/// CWT output structure
#[derive(Debug, Clone)]
pub struct CwtOutput {
    /// CWT coefficients (num_scales, signal_length); rows = scales, cols = timeshifts
    pub wx: Array2<Complex64>,
    /// Scales at which the CWT was computed
    pub scales: Scales,
    /// Time-derivative of `wx`, same shape
    pub dwx: Array2<Complex64>,
    /// Mean of the input; the CWT needs scale=inf to capture it
    pub x_mean: f64,
}

/// Compute CWT for a single scale
///
/// # Arguments
/// * `xh` - FFT of the zero-mean, padded signal
/// * `psihfn` - Wavelet sampler built for `xh.len()`
/// * `scale` - Current scale value
/// * `dt` - Sampling period
/// * `plans` - FFT plans for `xh.len()`
///
/// # Algorithm
/// 1. Sample the wavelet at `scale * xi`, with `(-1)^k` spectral reversal
/// 2. `ifftshift(ifft(xh * psih))` -> transform row
/// 3. Same with `(i * xi / dt) * psih` -> derivative row
///
/// Returns full-length (padded) rows, L1-normalized.
pub fn cwt_single_scale(
    xh: &Array1<Complex64>,
    psihfn: &Wavelet,
    scale: f64,
    dt: f64,
    plans: &FftPair,
) -> (Array1<Complex64>, Array1<Complex64>) {
    let n = xh.len();
    let psih = psihfn.filter(scale, n, true);

    let xcpsi = ifftshift(&plans.ifft(xh * &psih).view());

    let dpsih = derivative_filter(psihfn.xi(), &psih, dt);
    let dxcpsi = ifftshift(&plans.ifft(&dpsih * xh).view());

    (xcpsi, dxcpsi)
}

/// Compute CWT for multiple scales (parallelized)
///
/// Each scale is independent; rows are computed with rayon and returned in
/// scale order.
pub fn cwt_multi_scale(
    xh: &Array1<Complex64>,
    psihfn: &Wavelet,
    scales: &Array1<f64>,
    dt: f64,
    plans: &FftPair,
) -> Vec<(Array1<Complex64>, Array1<Complex64>)> {
    scales
        .to_vec()
        .into_par_iter()
        .map(|scale| cwt_single_scale(xh, psihfn, scale, dt, plans))
        .collect()
}

/// Forward continuous wavelet transform
///
/// # Arguments
/// * `x` - Input signal
/// * `wavelet` - Wavelet spec (builtin name with params, or custom function)
/// * `scales` - `Log`, `Linear` or an explicit ascending array
/// * `opts` - Sampling period, voices, normalization, padding
///
/// # Returns
/// `CwtOutput` with `wx.nrows() == scales.len()` and `wx.ncols() == len(x)`
/// (padded length if `opts.rpadded`).
///
/// # Errors
/// `InvalidArgument` on `dt <= 0`, an empty or too short signal, malformed
/// wavelet or scales; `UnsupportedWavelet` on an unknown name. NaN/inf
/// samples are zeroed with a warning.
///
/// # Example
/// ```
/// use ndarray::Array1;
/// use rust_cwt::cwt::{cwt, CwtOptions, ScaleSpec, WaveletSpec};
///
/// let x = Array1::from_shape_fn(256, |i| (i as f64 * 0.3).sin());
/// let out = cwt(&x.view(), &WaveletSpec::default(), &ScaleSpec::Log, &CwtOptions::default()).unwrap();
/// assert_eq!(out.wx.dim(), (out.scales.len(), 256));
/// ```
pub fn cwt(
    x: &ArrayView1<f64>,
    wavelet: &WaveletSpec,
    scales: &ScaleSpec,
    opts: &CwtOptions,
) -> CwtResult<CwtOutput> {
    let dt = opts.dt;
    if !dt.is_finite() || dt <= 0.0 {
        return Err(CwtError::invalid(format!("`dt` must be > 0 (got {})", dt)));
    }
    if x.is_empty() {
        return Err(CwtError::invalid("input signal is empty"));
    }

    let mut x = x.to_owned();
    let replaced = replace_at_inf_or_nan(&mut x.view_mut(), 0.0);
    if replaced > 0 {
        warn!(count = replaced, "found NaN or inf values in `x`; will zero");
    }

    let x_mean = x.mean().unwrap_or(0.0);
    let n = x.len();
    let (mut xpad, big_n, n1, _n2) = padsignal(&x.view(), opts.padtype);

    let nv = match scales {
        ScaleSpec::Array(_) => opts.nv,
        _ => Some(opts.nv.unwrap_or(DEFAULT_NV)),
    };
    let scales = process_scales(scales, n, nv, None)?;
    let psihfn = Wavelet::new(wavelet, big_n)?;

    debug!(
        n,
        padded = big_n,
        num_scales = scales.len(),
        wavelet = psihfn.name(),
        "computing CWT"
    );

    let pad_mean = xpad.mean().unwrap_or(0.0);
    xpad -= pad_mean;
    let plans = FftPair::new(big_n);
    let xh = plans.fft_real(&xpad.view());

    let rows = cwt_multi_scale(&xh, &psihfn, &scales.values, dt, &plans);

    let (start, width) = if opts.rpadded { (0, big_n) } else { (n1, n) };
    let mut wx = Array2::zeros((scales.len(), width));
    let mut dwx = Array2::zeros((scales.len(), width));
    for (i, (row, drow)) in rows.into_iter().enumerate() {
        // normalize energy per L2 wavelet norm, else already L1-normalized
        let norm = if opts.l1_norm { 1.0 } else { scales.values[i].sqrt() };
        wx.row_mut(i)
            .zip_mut_with(&row.slice(s![start..start + width]), |w, &c| *w = c * norm);
        dwx.row_mut(i)
            .zip_mut_with(&drow.slice(s![start..start + width]), |w, &c| *w = c * norm);
    }

    Ok(CwtOutput {
        wx,
        scales,
        dwx,
        x_mean,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn tone(n: usize, f: f64) -> Array1<f64> {
        Array1::from_shape_fn(n, |i| (2.0 * PI * f * i as f64).cos())
    }

    #[test]
    fn test_cwt_output_shape() {
        let x = tone(500, 0.05);
        let out = cwt(&x.view(), &WaveletSpec::default(), &ScaleSpec::Log, &CwtOptions::default()).unwrap();
        // floor(log2(500)) - 1 = 7 octaves, 32 voices
        assert_eq!(out.scales.len(), 224);
        assert_eq!(out.wx.dim(), (224, 500));
        assert_eq!(out.dwx.dim(), (224, 500));
    }

    #[test]
    fn test_cwt_rpadded_shape() {
        let x = tone(500, 0.05);
        let opts = CwtOptions::default().with_rpadded(true).with_nv(8);
        let out = cwt(&x.view(), &WaveletSpec::default(), &ScaleSpec::Log, &opts).unwrap();
        assert_eq!(out.wx.dim(), (56, 1024));
        assert_eq!(out.dwx.dim(), (56, 1024));
    }

    #[test]
    fn test_cwt_peak_scale() {
        // morlet (mu=6) responds most at scale ~ mu / omega
        let f = 0.05;
        let x = tone(1024, f);
        let out = cwt(&x.view(), &WaveletSpec::default(), &ScaleSpec::Log, &CwtOptions::default()).unwrap();
        let mid = 512;
        let (imax, _) = out
            .wx
            .column(mid)
            .iter()
            .map(|c| c.norm())
            .enumerate()
            .fold((0, 0.0), |acc, (i, v)| if v > acc.1 { (i, v) } else { acc });
        let expected = 6.0 / (2.0 * PI * f);
        let found = out.scales.values[imax];
        assert!((found / expected - 1.0).abs() < 0.05, "{} vs {}", found, expected);
    }

    #[test]
    fn test_cwt_derivative_of_tone() {
        // d/dt of a tone at omega has magnitude omega * |Wx| at the center
        let f = 0.04;
        let x = tone(1024, f);
        let out = cwt(&x.view(), &WaveletSpec::default(), &ScaleSpec::Log, &CwtOptions::default()).unwrap();
        let omega = 2.0 * PI * f;
        let row = 6.0 / omega;
        let i = out
            .scales
            .values
            .iter()
            .position(|&a| a >= row)
            .unwrap();
        let w = out.wx[[i, 512]];
        let dw = out.dwx[[i, 512]];
        assert_abs_diff_eq!(dw.norm() / w.norm(), omega, epsilon = 5e-3);
    }

    #[test]
    fn test_cwt_dt_scales_derivative() {
        let x = tone(256, 0.1);
        let base = cwt(&x.view(), &WaveletSpec::default(), &ScaleSpec::Log, &CwtOptions::default()).unwrap();
        let half = cwt(
            &x.view(),
            &WaveletSpec::default(),
            &ScaleSpec::Log,
            &CwtOptions::default().with_dt(0.5),
        )
        .unwrap();
        assert_eq!(base.wx, half.wx);
        assert_abs_diff_eq!(half.dwx[[40, 100]].re, 2.0 * base.dwx[[40, 100]].re, epsilon = 1e-12);
    }

    #[test]
    fn test_cwt_invalid_dt() {
        let x = tone(128, 0.1);
        for dt in [0.0, -1.0, f64::NAN] {
            let err = cwt(
                &x.view(),
                &WaveletSpec::default(),
                &ScaleSpec::Log,
                &CwtOptions::default().with_dt(dt),
            )
            .unwrap_err();
            assert!(matches!(err, CwtError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_cwt_sanitizes_non_finite() {
        let mut x = tone(256, 0.1);
        let clean = cwt(&x.view(), &WaveletSpec::default(), &ScaleSpec::Log, &CwtOptions::default()).unwrap();
        x[10] = f64::NAN;
        x[20] = f64::INFINITY;
        let out = cwt(&x.view(), &WaveletSpec::default(), &ScaleSpec::Log, &CwtOptions::default()).unwrap();
        assert!(out.wx.iter().all(|c| c.re.is_finite() && c.im.is_finite()));
        assert_eq!(out.wx.dim(), clean.wx.dim());
    }

    #[test]
    fn test_cwt_explicit_scales() {
        let x = tone(256, 0.1);
        let scales = Array1::from_shape_fn(20, |k| ((k + 1) as f64 / 4.0).exp2());
        let out = cwt(
            &x.view(),
            &WaveletSpec::with_params("bump", &[("mu", 5.0)]),
            &ScaleSpec::Array(scales.clone()),
            &CwtOptions::default(),
        )
        .unwrap();
        assert_eq!(out.scales.values, scales);
        assert_eq!(out.scales.nv, Some(4));
        assert_eq!(out.wx.nrows(), 20);
    }
}
