//! Scale discretization
//!
//! Builds the ascending scale array for the transform, either as powers of 2
//! spaced by `1/nv` (log) or linearly, and infers the spacing of user arrays.

use ndarray::Array1;
use std::fmt;
use std::str::FromStr;

use super::errors::{CwtError, CwtResult};

/// Default number of voices per octave
pub const DEFAULT_NV: usize = 32;

/// Scale spacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleType {
    Log,
    Linear,
}

impl FromStr for ScaleType {
    type Err = CwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(ScaleType::Log),
            "linear" => Ok(ScaleType::Linear),
            _ => Err(CwtError::invalid(format!(
                "scales, if string, must be one of: log, linear (got '{}')",
                s
            ))),
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScaleType::Log => "log",
            ScaleType::Linear => "linear",
        })
    }
}

/// How scales are requested: generated with a given spacing, or explicit
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScaleSpec {
    #[default]
    Log,
    Linear,
    Array(Array1<f64>),
}

impl From<ScaleType> for ScaleSpec {
    fn from(scaletype: ScaleType) -> Self {
        match scaletype {
            ScaleType::Log => ScaleSpec::Log,
            ScaleType::Linear => ScaleSpec::Linear,
        }
    }
}

impl From<Array1<f64>> for ScaleSpec {
    fn from(scales: Array1<f64>) -> Self {
        ScaleSpec::Array(scales)
    }
}

impl From<&Scales> for ScaleSpec {
    fn from(scales: &Scales) -> Self {
        ScaleSpec::Array(scales.values.clone())
    }
}

impl FromStr for ScaleSpec {
    type Err = CwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<ScaleType>().map(ScaleSpec::from)
    }
}

/// Resolved scales and the spacing metadata the inverse transform needs
#[derive(Debug, Clone, PartialEq)]
pub struct Scales {
    /// Ascending scale values, one per transform row
    pub values: Array1<f64>,
    pub scaletype: ScaleType,
    /// Voices per octave; `Some` for log spacing
    pub nv: Option<usize>,
}

impl Scales {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Integration step of the inverse transform:
    /// `ln(scales[1] / scales[0])` for log spacing, `scales[1] - scales[0]`
    /// for linear. A single log scale falls back to `ln(2^(1/nv))`.
    pub fn integration_step(&self) -> f64 {
        match self.scaletype {
            ScaleType::Log if self.values.len() > 1 => (self.values[1] / self.values[0]).ln(),
            ScaleType::Log => {
                let nv = self.nv.unwrap_or(DEFAULT_NV) as f64;
                std::f64::consts::LN_2 / nv
            }
            ScaleType::Linear if self.values.len() > 1 => self.values[1] - self.values[0],
            ScaleType::Linear => 1.0,
        }
    }
}

/// Number of octaves spanned by generated scales for a signal of length `n`
fn num_octaves(n: usize) -> CwtResult<usize> {
    let noct = if n == 0 { 0 } else { (n as f64).log2().floor() as i64 - 1 };
    if noct < 1 {
        return Err(CwtError::invalid(format!(
            "signal length must be >= 4 to generate scales (got {})",
            n
        )));
    }
    Ok(noct as usize)
}

/// Build (or validate) the scale array
///
/// # Arguments
/// * `spec` - `Log`, `Linear` or an explicit array
/// * `n` - Length of the (unpadded) signal
/// * `nv` - Voices per octave (log spacing)
/// * `na` - Number of scales; inferred from `nv` if `None`
///
/// # Scheme
/// ```text
/// noct   = floor(log2(n)) - 1
/// log    : scales = 2^([1, 2, ..., na] / nv),  na = noct * nv
/// linear : scales = linspace(1, 2^noct, na),    na = 2^noct
/// ```
pub fn process_scales(
    spec: &ScaleSpec,
    n: usize,
    nv: Option<usize>,
    na: Option<usize>,
) -> CwtResult<Scales> {
    if nv == Some(0) {
        return Err(CwtError::invalid("nv must be > 0"));
    }
    if na == Some(0) {
        return Err(CwtError::invalid("number of scales must be > 0"));
    }

    match spec {
        ScaleSpec::Array(values) => infer_scaletype(values, nv),
        ScaleSpec::Log => {
            let noct = num_octaves(n)?;
            let (na, nv) = match (na, nv) {
                (Some(na), Some(nv)) => (na, nv),
                (None, Some(nv)) => (noct * nv, nv),
                (Some(na), None) => {
                    // na comes from the transform's row count
                    if na % noct != 0 {
                        return Err(CwtError::ShapeMismatch {
                            expected: noct * (na / noct).max(1),
                            got: na,
                        });
                    }
                    (na, na / noct)
                }
                (None, None) => {
                    return Err(CwtError::invalid(
                        "must pass one of `na`, `nv` if scales aren't an array",
                    ))
                }
            };
            let values = Array1::from_shape_fn(na, |k| ((k + 1) as f64 / nv as f64).exp2());
            Ok(Scales {
                values,
                scaletype: ScaleType::Log,
                nv: Some(nv),
            })
        }
        ScaleSpec::Linear => {
            let noct = num_octaves(n)?;
            let max_scale = 2f64.powi(noct as i32);
            let na = na.unwrap_or(max_scale as usize);
            let values = if na == 1 {
                Array1::from_elem(1, 1.0)
            } else {
                Array1::linspace(1.0, max_scale, na)
            };
            Ok(Scales {
                values,
                scaletype: ScaleType::Linear,
                nv: None,
            })
        }
    }
}

/// Validate an explicit scale array and infer its spacing
///
/// `nv` of a log-spaced array is `1 / log2(scales[1] / scales[0])`, rounded.
/// The inverse integrates with the array's actual ratio, so non-dyadic
/// ratios (e.g. `1.1^k`) still reconstruct at unit gain.
fn infer_scaletype(values: &Array1<f64>, nv: Option<usize>) -> CwtResult<Scales> {
    if values.is_empty() {
        return Err(CwtError::invalid("scales array must not be empty"));
    }
    if values.iter().any(|&a| !(a.is_finite() && a > 0.0)) {
        return Err(CwtError::invalid("scales must be positive and finite"));
    }
    if values.windows(2).into_iter().any(|w| w[1] <= w[0]) {
        return Err(CwtError::invalid("scales must be strictly ascending"));
    }

    if values.len() == 1 {
        return Ok(Scales {
            values: values.clone(),
            scaletype: ScaleType::Log,
            nv: Some(nv.unwrap_or(DEFAULT_NV)),
        });
    }

    if values.len() == 2 {
        return Err(CwtError::invalid(
            "cannot infer spacing of 2 scales; pass at least 3",
        ));
    }

    let max_second_diff = |v: &Array1<f64>| {
        v.windows(3)
            .into_iter()
            .map(|w| (w[2] - 2.0 * w[1] + w[0]).abs())
            .fold(0.0, f64::max)
    };

    let scale_max = values[values.len() - 1];
    if max_second_diff(values) <= 1e-10 * scale_max {
        return Ok(Scales {
            values: values.clone(),
            scaletype: ScaleType::Linear,
            nv: None,
        });
    }

    let log_values = values.mapv(f64::ln);
    if max_second_diff(&log_values) < 1e-12 {
        let inferred = (1.0 / (values[1].log2() - values[0].log2())).round() as usize;
        if inferred == 0 {
            return Err(CwtError::invalid(
                "log-spaced scales must have at least one voice per octave",
            ));
        }
        if let Some(nv) = nv {
            if nv != inferred {
                return Err(CwtError::invalid(format!(
                    "nv used in scales differs from nv passed ({} != {})",
                    inferred, nv
                )));
            }
        }
        return Ok(Scales {
            values: values.clone(),
            scaletype: ScaleType::Log,
            nv: Some(inferred),
        });
    }

    Err(CwtError::invalid(
        "could not infer scale spacing; scales must be log or linearly spaced",
    ))
}
