//! Transform options
//!
//! Defaults match the keyword defaults of the Python bindings.

use super::utils::PadType;

/// Forward transform options
#[derive(Debug, Clone, PartialEq)]
pub struct CwtOptions {
    /// Sampling period
    pub dt: f64,
    /// Voices per octave for generated log scales (32 if `None`)
    pub nv: Option<usize>,
    /// L1 (default) or L2 normalization
    pub l1_norm: bool,
    /// Pad scheme applied to the input
    pub padtype: PadType,
    /// Return padded `Wx` / `dWx` instead of trimming to `len(x)`
    pub rpadded: bool,
}

impl Default for CwtOptions {
    fn default() -> Self {
        Self {
            dt: 1.0,
            nv: None,
            l1_norm: true,
            padtype: PadType::Symmetric,
            rpadded: false,
        }
    }
}

impl CwtOptions {
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_nv(mut self, nv: usize) -> Self {
        self.nv = Some(nv);
        self
    }

    pub fn with_l1_norm(mut self, l1_norm: bool) -> Self {
        self.l1_norm = l1_norm;
        self
    }

    pub fn with_padtype(mut self, padtype: PadType) -> Self {
        self.padtype = padtype;
        self
    }

    pub fn with_rpadded(mut self, rpadded: bool) -> Self {
        self.rpadded = rpadded;
        self
    }
}

/// Inverse transform options
#[derive(Debug, Clone, PartialEq)]
pub struct IcwtOptions {
    /// One-integral (default, analytic wavelets) or two-integral inverse
    pub one_int: bool,
    /// Length of the original signal; `Wx.ncols()` if `None`
    pub x_len: Option<usize>,
    /// Mean of the original signal, added back after inversion
    pub x_mean: f64,
    /// Pad scheme along the time axis; only zero padding is applied
    pub padtype: PadType,
    /// Whether `Wx` already carries the forward transform's padding
    pub rpadded: bool,
    /// Must match the forward transform
    pub l1_norm: bool,
    /// Voices per octave; inferred from the number of rows if `None`
    pub nv: Option<usize>,
}

impl Default for IcwtOptions {
    fn default() -> Self {
        Self {
            one_int: true,
            x_len: None,
            x_mean: 0.0,
            padtype: PadType::Zero,
            rpadded: false,
            l1_norm: true,
            nv: None,
        }
    }
}

impl IcwtOptions {
    pub fn with_one_int(mut self, one_int: bool) -> Self {
        self.one_int = one_int;
        self
    }

    pub fn with_x_len(mut self, x_len: usize) -> Self {
        self.x_len = Some(x_len);
        self
    }

    pub fn with_x_mean(mut self, x_mean: f64) -> Self {
        self.x_mean = x_mean;
        self
    }

    pub fn with_padtype(mut self, padtype: PadType) -> Self {
        self.padtype = padtype;
        self
    }

    pub fn with_rpadded(mut self, rpadded: bool) -> Self {
        self.rpadded = rpadded;
        self
    }

    pub fn with_l1_norm(mut self, l1_norm: bool) -> Self {
        self.l1_norm = l1_norm;
        self
    }

    pub fn with_nv(mut self, nv: usize) -> Self {
        self.nv = Some(nv);
        self
    }
}
