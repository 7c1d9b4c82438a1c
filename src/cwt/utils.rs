//! Utility functions for CWT
//!
//! Signal padding, power-of-2 pad lengths, FFT plan handling, shifts and
//! NaN/Inf repair.

use ndarray::{Array1, ArrayView1, ArrayViewMut1};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::errors::CwtError;

/// Signal extension mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadType {
    /// Zeros on both sides
    Zero,
    /// Mirror including the edge sample: `[3, 2, 1 | 1, 2, 3, 4, 5 | 5, 4, 3]`
    #[default]
    Symmetric,
    /// Repeat the edge sample
    Replicate,
    /// Wrap around (periodic extension)
    Circular,
}

impl FromStr for PadType {
    type Err = CwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(PadType::Zero),
            "symmetric" => Ok(PadType::Symmetric),
            "replicate" => Ok(PadType::Replicate),
            "circular" => Ok(PadType::Circular),
            _ => Err(CwtError::invalid(format!(
                "padtype must be one of: zero, symmetric, replicate, circular (got '{}')",
                s
            ))),
        }
    }
}

impl fmt::Display for PadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PadType::Zero => "zero",
            PadType::Symmetric => "symmetric",
            PadType::Replicate => "replicate",
            PadType::Circular => "circular",
        };
        f.write_str(name)
    }
}

impl PadType {
    /// Index into the original signal for (possibly out-of-range) position `k`,
    /// or `None` where the extension is zero.
    fn source_index(self, k: isize, n: usize) -> Option<usize> {
        let n_i = n as isize;
        if (0..n_i).contains(&k) {
            return Some(k as usize);
        }
        match self {
            PadType::Zero => None,
            PadType::Replicate => Some(if k < 0 { 0 } else { n - 1 }),
            PadType::Circular => Some(k.rem_euclid(n_i) as usize),
            PadType::Symmetric => {
                // period 2n: x0..x(n-1), x(n-1)..x0
                let m = k.rem_euclid(2 * n_i);
                Some(if m < n_i { m } else { 2 * n_i - 1 - m } as usize)
            }
        }
    }
}

/// Next power of 2 and left/right pad lengths centering the original `n` samples
///
/// # Formula
/// ```text
/// N  = 2^(1 + round(log2(n)))
/// n2 = floor((N - n) / 2)
/// n1 = n2 + n % 2
/// ```
pub fn p2up(n: usize) -> (usize, usize, usize) {
    let exponent = 1 + (n.max(1) as f64).log2().round() as u32;
    let up = 2_usize.pow(exponent);
    let n2 = (up - n) / 2;
    let n1 = n2 + n % 2;
    debug_assert_eq!(n1 + n + n2, up);
    (up, n1, n2)
}

/// Pad `signal` with `n1` samples on the left and `n2` on the right
///
/// # Examples
/// ```text
/// signal: [1, 2, 3, 4, 5], n1 = n2 = 3, Symmetric
/// result: [3, 2, 1, 1, 2, 3, 4, 5, 5, 4, 3]
/// ```
pub fn pad(signal: &ArrayView1<f64>, n1: usize, n2: usize, padtype: PadType) -> Array1<f64> {
    let n = signal.len();
    if n == 0 {
        return Array1::zeros(n1 + n2);
    }
    Array1::from_shape_fn(n1 + n + n2, |j| {
        padtype
            .source_index(j as isize - n1 as isize, n)
            .map_or(0.0, |i| signal[i])
    })
}

/// Pad `x` to the next power of 2 (per `p2up`)
///
/// # Returns
/// `(xpad, N, n1, n2)`; the original samples are `xpad[n1..n1 + len(x)]`.
pub fn padsignal(x: &ArrayView1<f64>, padtype: PadType) -> (Array1<f64>, usize, usize, usize) {
    let (up, n1, n2) = p2up(x.len());
    (pad(x, n1, n2, padtype), up, n1, n2)
}

/// Replace NaN and +/-inf values in place; returns the number replaced
pub fn replace_at_inf_or_nan(x: &mut ArrayViewMut1<f64>, replacement: f64) -> usize {
    let mut count = 0;
    x.iter_mut().filter(|v| !v.is_finite()).for_each(|v| {
        *v = replacement;
        count += 1;
    });
    count
}

/// IFFT Shift (numpy.fft.ifftshift); rotates left by `n / 2`
pub fn ifftshift<T: Clone>(arr: &ArrayView1<T>) -> Array1<T> {
    let n = arr.len();
    let mid = n / 2;
    Array1::from_shape_fn(n, |i| arr[(i + mid) % n].clone())
}

/// Multiply by `(-1)^k`: frequency-domain spectral reversal, which centers
/// the time-domain wavelet at `N / 2`
pub fn apply_spectral_reversal(psih: &mut Array1<Complex64>) {
    psih.iter_mut().skip(1).step_by(2).for_each(|c| *c = -*c);
}

/// Forward/inverse FFT plans for one transform length
///
/// `Arc` lets every rayon worker share the same plans.
#[derive(Clone)]
pub struct FftPair {
    fft: Arc<dyn Fft<f64>>,
    ifft: Arc<dyn Fft<f64>>,
    n: usize,
}

impl FftPair {
    pub fn new(n: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(n),
            ifft: planner.plan_fft_inverse(n),
            n,
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// FFT of a real signal
    pub fn fft_real(&self, x: &ArrayView1<f64>) -> Array1<Complex64> {
        let mut buffer: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        self.fft.process(&mut buffer);
        Array1::from_vec(buffer)
    }

    /// FFT of a complex signal
    pub fn fft(&self, x: &ArrayView1<Complex64>) -> Array1<Complex64> {
        let mut buffer = x.to_vec();
        self.fft.process(&mut buffer);
        Array1::from_vec(buffer)
    }

    /// Normalized inverse FFT (numpy.fft.ifft convention)
    pub fn ifft(&self, x: Array1<Complex64>) -> Array1<Complex64> {
        let mut buffer = x.to_vec();
        self.ifft.process(&mut buffer);
        let norm = 1.0 / self.n as f64;
        buffer.iter_mut().for_each(|c| *c *= norm);
        Array1::from_vec(buffer)
    }
}

impl fmt::Debug for FftPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftPair").field("n", &self.n).finish()
    }
}
