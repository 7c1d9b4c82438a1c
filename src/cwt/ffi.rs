//! Python FFI bindings for CWT
//!
//! Provides Python-callable functions using PyO3.

use std::collections::HashMap;

use num_complex::Complex64;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use super::core::cwt;
use super::errors::CwtError;
use super::inverse::icwt;
use super::options::{CwtOptions, IcwtOptions};
use super::scales::ScaleSpec;
use super::utils::PadType;
use super::wavelets::WaveletSpec;

fn to_py_err(e: CwtError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn wavelet_spec(name: &str, params: Option<HashMap<String, f64>>) -> WaveletSpec {
    let mut params: Vec<(String, f64)> = params.unwrap_or_default().into_iter().collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));
    WaveletSpec::Named {
        name: name.to_string(),
        params,
    }
}

/// `"log"`, `"linear"` or a 1D array of scales
fn scale_spec(scales: Option<&Bound<'_, PyAny>>) -> PyResult<ScaleSpec> {
    let Some(scales) = scales else {
        return Ok(ScaleSpec::Log);
    };
    if let Ok(name) = scales.extract::<String>() {
        return name.parse::<ScaleSpec>().map_err(to_py_err);
    }
    let values: PyReadonlyArray1<f64> = scales
        .extract()
        .map_err(|_| PyValueError::new_err("`scales` must be 'log', 'linear' or a 1D float array"))?;
    Ok(ScaleSpec::Array(values.as_array().to_owned()))
}

/// Python-callable forward CWT
///
/// # Arguments
/// * `x` - Input signal (1D numpy array)
/// * `wavelet` - Wavelet name: morlet, bump, cmhat, hhhat (default: "morlet")
/// * `wavelet_params` - Dict overriding the wavelet's parameters, e.g. `{"mu": 5.0}`
/// * `scales` - "log", "linear" or a 1D array (default: "log")
/// * `dt` - Sampling period (default: 1.0)
/// * `nv` - Voices per octave (default: 32 for generated log scales)
/// * `l1_norm` - L1 (True) or L2 (False) normalization
/// * `padtype` - "symmetric", "replicate", "circular" or "zero"
/// * `rpadded` - Return padded coefficients (default: False)
///
/// # Returns
/// Tuple of (Wx, scales, dWx, x_mean):
/// - Wx: CWT coefficients, complex (num_scales, len(x))
/// - scales: Scales used (1D array)
/// - dWx: Time-derivative of Wx, same shape
/// - x_mean: Mean of `x`, for the inverse
///
/// # Example (Python)
/// ```python
/// import _rust_cwt
/// import numpy as np
///
/// x = np.cos(2 * np.pi * 0.05 * np.arange(1024))
/// Wx, scales, dWx, x_mean = _rust_cwt.cwt_py(x, "morlet", nv=16)
/// ```
#[pyfunction]
// `scales=None` resolves to "log"
#[pyo3(
    signature = (x, wavelet="morlet", wavelet_params=None, scales=None, dt=1.0, nv=None, l1_norm=true, padtype="symmetric", rpadded=false),
    text_signature = "(x, wavelet='morlet', wavelet_params=None, scales='log', dt=1.0, nv=None, l1_norm=True, padtype='symmetric', rpadded=False)"
)]
#[allow(clippy::too_many_arguments)]
pub fn cwt_py<'py>(
    py: Python<'py>,
    x: PyReadonlyArray1<f64>,
    wavelet: &str,
    wavelet_params: Option<HashMap<String, f64>>,
    scales: Option<&Bound<'py, PyAny>>,
    dt: f64,
    nv: Option<usize>,
    l1_norm: bool,
    padtype: &str,
    rpadded: bool,
) -> PyResult<(
    Bound<'py, PyArray2<Complex64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray2<Complex64>>,
    f64,
)> {
    let x = x.as_array().to_owned();
    let wavelet = wavelet_spec(wavelet, wavelet_params);
    let scales = scale_spec(scales)?;
    let opts = CwtOptions {
        dt,
        nv,
        l1_norm,
        padtype: padtype.parse::<PadType>().map_err(to_py_err)?,
        rpadded,
    };

    let output = cwt(&x.view(), &wavelet, &scales, &opts).map_err(to_py_err)?;

    Ok((
        output.wx.into_pyarray(py),
        output.scales.values.into_pyarray(py),
        output.dwx.into_pyarray(py),
        output.x_mean,
    ))
}

/// Python-callable inverse CWT
///
/// # Arguments
/// * `wx` - CWT coefficients (num_scales, n), complex
/// * `wavelet` / `wavelet_params` - Same wavelet as the forward transform
/// * `scales` - Same scales as the forward transform (default: "log")
/// * `one_int` - One-integral (True) or two-integral (False) inverse
/// * `x_len` - Length of the original signal (default: `wx.shape[1]`)
/// * `x_mean` - Mean of the original signal, added back
/// * `padtype` - Accepted for compatibility; zero padding is always used
/// * `rpadded` - Whether `wx` carries the forward transform's padding
/// * `l1_norm` - Must match the forward transform
/// * `nv` - Voices per octave (default: inferred)
///
/// # Returns
/// Reconstructed signal (1D array of length `x_len`)
#[pyfunction]
#[pyo3(
    signature = (wx, wavelet="morlet", wavelet_params=None, scales=None, one_int=true, x_len=None, x_mean=0.0, padtype="zero", rpadded=false, l1_norm=true, nv=None),
    text_signature = "(wx, wavelet='morlet', wavelet_params=None, scales='log', one_int=True, x_len=None, x_mean=0.0, padtype='zero', rpadded=False, l1_norm=True, nv=None)"
)]
#[allow(clippy::too_many_arguments)]
pub fn icwt_py<'py>(
    py: Python<'py>,
    wx: PyReadonlyArray2<Complex64>,
    wavelet: &str,
    wavelet_params: Option<HashMap<String, f64>>,
    scales: Option<&Bound<'py, PyAny>>,
    one_int: bool,
    x_len: Option<usize>,
    x_mean: f64,
    padtype: &str,
    rpadded: bool,
    l1_norm: bool,
    nv: Option<usize>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let wavelet = wavelet_spec(wavelet, wavelet_params);
    let scales = scale_spec(scales)?;
    let opts = IcwtOptions {
        one_int,
        x_len,
        x_mean,
        padtype: padtype.parse::<PadType>().map_err(to_py_err)?,
        rpadded,
        l1_norm,
        nv,
    };

    let x = icwt(&wx.as_array(), &wavelet, &scales, &opts).map_err(to_py_err)?;
    Ok(x.into_pyarray(py))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wavelet_spec_from_params() {
        let mut params = HashMap::new();
        params.insert("s".to_string(), 2.0);
        params.insert("mu".to_string(), 4.0);
        match wavelet_spec("bump", Some(params)) {
            WaveletSpec::Named { name, params } => {
                assert_eq!(name, "bump");
                assert_eq!(params, vec![("mu".to_string(), 4.0), ("s".to_string(), 2.0)]);
            }
            WaveletSpec::Custom(_) => panic!("expected a named wavelet"),
        }
    }

    #[test]
    fn test_default_scales_are_log() {
        assert_eq!(scale_spec(None).unwrap(), ScaleSpec::Log);
    }
}
