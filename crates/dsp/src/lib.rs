// Copyright 2025-2026 CEMAXECUTER LLC

pub mod average;
pub mod fft;
pub mod power;
pub mod sweep;
pub mod window;

pub use average::SpectrumAverager;
pub use fft::{frequency_axis, SpectrumAnalyzer};
pub use window::Window;
