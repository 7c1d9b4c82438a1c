//! Inverse CWT
//!
//! Reconstructs the signal from its transform, either by the one-integral
//! formula (sum of real parts over scales) or the two-integral formula
//! (each row re-convolved with the conjugate wavelet, then summed).
//!
//! # References
//! - I. Daubechies, J. Lu, H.T. Wu, Synchrosqueezed Wavelet Transforms, Eq. 3
//! - S. Mallat, Wavelet Tour of Signal Processing, 3rd ed., Thm. 4.4

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::debug;

use super::admissibility::{adm_cwt, adm_ssq};
use super::errors::{CwtError, CwtResult};
use super::options::IcwtOptions;
use super::scales::{process_scales, ScaleSpec, ScaleType};
use super::utils::{ifftshift, p2up, PadType, FftPair};
use super::wavelets::{Wavelet, WaveletSpec};

/// Per-scale divisor `norm(a)` of the inverse sum
///
/// ```text
/// spacing  l1_norm  one_int  two_int
/// log      true     1        1
/// linear   true     a        a
/// log      false    a^0.5    a
/// linear   false    a^1.5    a^2
/// ```
pub fn icwt_norm(scaletype: ScaleType, l1_norm: bool, one_int: bool) -> fn(f64) -> f64 {
    match (scaletype, l1_norm, one_int) {
        (ScaleType::Log, true, _) => |_| 1.0,
        (ScaleType::Linear, true, _) => |a| a,
        (ScaleType::Log, false, true) => f64::sqrt,
        (ScaleType::Log, false, false) => |a| a,
        (ScaleType::Linear, false, true) => |a| a.powf(1.5),
        (ScaleType::Linear, false, false) => |a| a * a,
    }
}

/// One-integral inverse: `sum_i Re(Wx_i) / norm(a_i)`
///
/// Unnormalized; the caller applies `2 / C_psi` and the integration step.
pub fn icwt_1int(
    wx: &ArrayView2<Complex64>,
    scales: &ArrayView1<f64>,
    norm: fn(f64) -> f64,
) -> Array1<f64> {
    let mut x = Array1::zeros(wx.ncols());
    for (row, &a) in wx.outer_iter().zip(scales.iter()) {
        let na = norm(a);
        x.zip_mut_with(&row, |acc, c| *acc += c.re / na);
    }
    x
}

/// Two-integral inverse for one scale:
/// `Re(ifftshift(ifft(fft(Wx_a) * conj(psih_a))))`
pub fn icwt_single_scale(
    row: &ArrayView1<Complex64>,
    psihfn: &Wavelet,
    scale: f64,
    l1_norm: bool,
    plans: &FftPair,
) -> Array1<f64> {
    let psih = psihfn.filter(scale, plans.len(), l1_norm);
    let spectrum = plans.fft(row) * &psih.mapv(|c| c.conj());
    ifftshift(&plans.ifft(spectrum).view()).mapv(|c| c.re)
}

/// Two-integral inverse over all scales
///
/// Rows are inverted in parallel; the sum runs in row order so the result
/// doesn't depend on the thread count.
pub fn icwt_2int(
    wx: &ArrayView2<Complex64>,
    scales: &ArrayView1<f64>,
    psihfn: &Wavelet,
    l1_norm: bool,
    norm: fn(f64) -> f64,
) -> Array1<f64> {
    let plans = FftPair::new(wx.ncols());
    let parts: Vec<Array1<f64>> = (0..wx.nrows())
        .into_par_iter()
        .map(|i| {
            let a = scales[i];
            icwt_single_scale(&wx.row(i), psihfn, a, l1_norm, &plans) / norm(a)
        })
        .collect();

    let mut x = Array1::zeros(wx.ncols());
    for xa in &parts {
        x += xa;
    }
    x
}

/// Inverse continuous wavelet transform
///
/// # Arguments
/// * `wx` - Transform, `(na, n')`; `n'` is `x_len` or, if `opts.rpadded`,
///   the padded length
/// * `wavelet` - Same wavelet as the forward transform
/// * `scales` - Same scales as the forward transform; `Log`/`Linear` are
///   regenerated from `x_len` and `na`
/// * `opts` - Inverse options; `l1_norm` must match the forward transform
///
/// # Returns
/// Reconstructed signal of length `x_len`.
///
/// # Errors
/// `ShapeMismatch` if the scales don't resolve to `na` values (including
/// generated log scales when `na` is not a whole number of voices per
/// octave) or the time axis length is inconsistent with `x_len`;
/// `InvalidArgument` / `UnsupportedWavelet` on bad arguments.
pub fn icwt(
    wx: &ArrayView2<Complex64>,
    wavelet: &WaveletSpec,
    scales: &ScaleSpec,
    opts: &IcwtOptions,
) -> CwtResult<Array1<f64>> {
    let (na, ncols) = wx.dim();
    let x_len = opts.x_len.unwrap_or(ncols);
    if x_len == 0 {
        return Err(CwtError::invalid("x_len must be > 0"));
    }

    let scales = process_scales(scales, x_len, opts.nv, Some(na))?;
    if scales.len() != na {
        return Err(CwtError::ShapeMismatch {
            expected: na,
            got: scales.len(),
        });
    }

    let (big_n, n1, n2) = p2up(x_len);
    let expected_cols = if opts.rpadded { big_n } else { x_len };
    if ncols != expected_cols {
        return Err(CwtError::ShapeMismatch {
            expected: expected_cols,
            got: ncols,
        });
    }
    if opts.padtype != PadType::Zero {
        debug!(padtype = %opts.padtype, "icwt pads with zeros only; ignoring padtype");
    }

    let psihfn = Wavelet::new(wavelet, big_n)?;
    let norm = icwt_norm(scales.scaletype, opts.l1_norm, opts.one_int);

    debug!(
        na,
        x_len,
        padded = big_n,
        one_int = opts.one_int,
        scaletype = %scales.scaletype,
        "computing inverse CWT"
    );

    let wx_padded = if opts.rpadded {
        wx.to_owned()
    } else {
        let mut padded = Array2::zeros((na, n1 + ncols + n2));
        padded.slice_mut(s![.., n1..n1 + ncols]).assign(wx);
        padded
    };

    let (mut x, cpsi) = if opts.one_int {
        (
            icwt_1int(&wx_padded.view(), &scales.values.view(), norm),
            adm_ssq(psihfn.func()),
        )
    } else {
        (
            icwt_2int(
                &wx_padded.view(),
                &scales.values.view(),
                &psihfn,
                opts.l1_norm,
                norm,
            ),
            adm_cwt(psihfn.func()),
        )
    };

    x *= 2.0 / cpsi * scales.integration_step();
    x += opts.x_mean;
    Ok(x.slice(s![n1..n1 + x_len]).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cwt::core::cwt;
    use crate::cwt::options::CwtOptions;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn signal(n: usize) -> Array1<f64> {
        Array1::from_shape_fn(n, |i| {
            let t = i as f64;
            (2.0 * PI * 0.03 * t).cos() + 0.5 * (2.0 * PI * 0.11 * t).sin()
        })
    }

    fn rel_err(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
        let num: f64 = (a - b).mapv(|v| v * v).sum();
        let den: f64 = b.mapv(|v| v * v).sum();
        (num / den).sqrt()
    }

    #[test]
    fn test_norm_table() {
        let a = 4.0;
        assert_eq!(icwt_norm(ScaleType::Log, true, true)(a), 1.0);
        assert_eq!(icwt_norm(ScaleType::Log, true, false)(a), 1.0);
        assert_eq!(icwt_norm(ScaleType::Linear, true, true)(a), 4.0);
        assert_eq!(icwt_norm(ScaleType::Log, false, true)(a), 2.0);
        assert_eq!(icwt_norm(ScaleType::Log, false, false)(a), 4.0);
        assert_eq!(icwt_norm(ScaleType::Linear, false, true)(a), 8.0);
        assert_eq!(icwt_norm(ScaleType::Linear, false, false)(a), 16.0);
    }

    #[test]
    fn test_round_trip_one_int() {
        let x = signal(512);
        let out = cwt(&x.view(), &WaveletSpec::default(), &ScaleSpec::Log, &CwtOptions::default()).unwrap();
        let opts = IcwtOptions::default().with_x_mean(out.x_mean);
        let xrec = icwt(&out.wx.view(), &WaveletSpec::default(), &ScaleSpec::Log, &opts).unwrap();
        assert_eq!(xrec.len(), 512);
        let inner = s![64..448];
        let err = rel_err(&xrec.slice(inner).to_owned(), &x.slice(inner).to_owned());
        assert!(err < 0.05, "relative error {}", err);
    }

    #[test]
    fn test_round_trip_two_int() {
        let x = signal(512);
        let out = cwt(&x.view(), &WaveletSpec::default(), &ScaleSpec::Log, &CwtOptions::default()).unwrap();
        let opts = IcwtOptions::default()
            .with_one_int(false)
            .with_x_mean(out.x_mean);
        let xrec = icwt(&out.wx.view(), &WaveletSpec::default(), &ScaleSpec::Log, &opts).unwrap();
        let inner = s![64..448];
        let err = rel_err(&xrec.slice(inner).to_owned(), &x.slice(inner).to_owned());
        assert!(err < 0.05, "relative error {}", err);
    }

    #[test]
    fn test_rpadded_round_trip() {
        let x = signal(300);
        let fwd = CwtOptions::default().with_rpadded(true);
        let out = cwt(&x.view(), &WaveletSpec::default(), &ScaleSpec::Log, &fwd).unwrap();
        assert_eq!(out.wx.ncols(), 512);
        let opts = IcwtOptions::default()
            .with_rpadded(true)
            .with_x_len(300)
            .with_x_mean(out.x_mean);
        let xrec = icwt(&out.wx.view(), &WaveletSpec::default(), &ScaleSpec::Log, &opts).unwrap();
        assert_eq!(xrec.len(), 300);
        assert_abs_diff_eq!(xrec[150], x[150], epsilon = 0.05);
    }

    #[test]
    fn test_scale_count_mismatch() {
        // 1024 samples -> 9 octaves; 100 rows can't be split into whole voices
        let wx = Array2::<Complex64>::zeros((100, 1024));
        let err = icwt(&wx.view(), &WaveletSpec::default(), &ScaleSpec::Log, &IcwtOptions::default()).unwrap_err();
        assert!(matches!(err, CwtError::ShapeMismatch { expected: 99, got: 100 }));

        let explicit = Array1::from_shape_fn(10, |k| ((k + 1) as f64 / 4.0).exp2());
        let err = icwt(
            &wx.view(),
            &WaveletSpec::default(),
            &ScaleSpec::Array(explicit),
            &IcwtOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CwtError::ShapeMismatch { expected: 100, got: 10 }));
    }

    #[test]
    fn test_time_axis_mismatch() {
        // 500 samples -> 7 octaves, 8 voices
        let wx = Array2::<Complex64>::zeros((56, 500));
        let opts = IcwtOptions::default().with_rpadded(true).with_x_len(500);
        let err = icwt(&wx.view(), &WaveletSpec::default(), &ScaleSpec::Log, &opts).unwrap_err();
        assert!(matches!(err, CwtError::ShapeMismatch { expected: 1024, got: 500 }));
    }

    #[test]
    fn test_zero_transform_returns_mean() {
        let wx = Array2::<Complex64>::zeros((56, 256));
        let opts = IcwtOptions::default().with_x_mean(3.0);
        let x = icwt(&wx.view(), &WaveletSpec::default(), &ScaleSpec::Log, &opts).unwrap();
        assert!(x.iter().all(|&v| v == 3.0));
    }
}
