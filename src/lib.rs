//! # Rust CWT - Continuous Wavelet Transform
//!
//! FFT-based forward CWT with its time-derivative, and the one- and
//! two-integral inverse transforms, for analytic wavelets (morlet, bump,
//! cmhat, hhhat) or user-supplied Fourier-domain wavelets.
//!
//! ```
//! use ndarray::Array1;
//! use rust_cwt::{cwt, icwt, CwtOptions, IcwtOptions, ScaleSpec, WaveletSpec};
//!
//! let x = Array1::from_shape_fn(512, |i| (0.2 * i as f64).cos());
//! let wavelet = WaveletSpec::default();
//! let out = cwt(&x.view(), &wavelet, &ScaleSpec::Log, &CwtOptions::default()).unwrap();
//! let opts = IcwtOptions::default().with_x_mean(out.x_mean);
//! let xrec = icwt(&out.wx.view(), &wavelet, &ScaleSpec::Log, &opts).unwrap();
//! assert_eq!(xrec.len(), 512);
//! ```

pub mod cwt;

pub use cwt::{
    cwt, icwt, CwtError, CwtOptions, CwtOutput, CwtResult, IcwtOptions, PadType, ScaleSpec,
    ScaleType, Scales, WaveletSpec,
};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition
#[cfg(feature = "python")]
#[pymodule]
fn _rust_cwt(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(cwt::cwt_py, m)?)?;
    m.add_function(wrap_pyfunction!(cwt::icwt_py, m)?)?;

    Ok(())
}
