//! # CWT (Continuous Wavelet Transform) Module
//!
//! Forward and inverse continuous wavelet transform of 1D signals, computed
//! via FFT convolution with analytic wavelets sampled in the Fourier domain.
//! The forward transform also yields the time-derivative `dWx`.

pub mod admissibility;
pub mod core;
pub mod errors;
pub mod inverse;
pub mod options;
pub mod properties;
pub mod scales;
pub mod utils;
pub mod wavelets;

#[cfg(feature = "python")]
pub mod ffi;

// Re-export main functions
pub use self::admissibility::{adm_cwt, adm_ssq, admissibility_constant, AdmKind};
pub use self::core::{cwt, CwtOutput};
pub use self::errors::{CwtError, CwtResult};
pub use self::inverse::icwt;
pub use self::options::{CwtOptions, IcwtOptions};
pub use self::properties::{center_frequency, freq_resolution, time_resolution, FrequencyKind};
pub use self::scales::{process_scales, ScaleSpec, ScaleType, Scales};
pub use self::utils::{p2up, padsignal, replace_at_inf_or_nan, PadType};
pub use self::wavelets::{wfilth, wfilth_with_derivative, CustomWavelet, Wavelet, WaveletSpec};

#[cfg(feature = "python")]
pub use self::ffi::{cwt_py, icwt_py};
